use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Counts from a single pipeline run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildStats {
    pub raw_edges: usize,
    pub entities: usize,
    pub collapsed_external: usize,
    pub collapsed_infra: usize,
    pub aggregated_edges: usize,
    pub pruned_entities: usize,
    pub primary_namespaces: usize,
    pub system_namespaces: usize,
    pub total_cost_usd: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Metrics {
    pub builds_total: u64,
    pub raw_edges_total: u64,
    pub refresh_success_total: u64,
    pub refresh_failure_total: u64,
    /// Responses dropped because a newer refresh had started
    pub refresh_superseded_total: u64,
    pub last_build: Option<BuildStats>,
}

#[derive(Clone)]
pub struct MetricsCollector {
    metrics: Arc<RwLock<Metrics>>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            metrics: Arc::new(RwLock::new(Metrics::default())),
        }
    }

    pub async fn record_build(&self, stats: &BuildStats) {
        let mut metrics = self.metrics.write().await;
        metrics.builds_total += 1;
        metrics.raw_edges_total += stats.raw_edges as u64;
        metrics.last_build = Some(stats.clone());
    }

    pub async fn record_refresh_success(&self) {
        self.metrics.write().await.refresh_success_total += 1;
    }

    pub async fn record_refresh_failure(&self) {
        self.metrics.write().await.refresh_failure_total += 1;
    }

    pub async fn record_superseded(&self) {
        self.metrics.write().await.refresh_superseded_total += 1;
    }

    pub async fn get_metrics(&self) -> Metrics {
        self.metrics.read().await.clone()
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_record_build_keeps_last_stats() {
        let collector = MetricsCollector::new();

        let first = BuildStats {
            raw_edges: 4,
            ..Default::default()
        };
        let second = BuildStats {
            raw_edges: 6,
            aggregated_edges: 2,
            ..Default::default()
        };

        collector.record_build(&first).await;
        collector.record_build(&second).await;

        let metrics = collector.get_metrics().await;
        assert_eq!(metrics.builds_total, 2);
        assert_eq!(metrics.raw_edges_total, 10);
        assert_eq!(metrics.last_build, Some(second));
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let collector = MetricsCollector::new();
        let shared = collector.clone();

        shared.record_refresh_success().await;
        shared.record_refresh_failure().await;
        shared.record_superseded().await;
        shared.record_superseded().await;

        let metrics = collector.get_metrics().await;
        assert_eq!(metrics.refresh_success_total, 1);
        assert_eq!(metrics.refresh_failure_total, 1);
        assert_eq!(metrics.refresh_superseded_total, 2);
    }
}
