use crate::metrics::collector::{Metrics, MetricsCollector};
use crate::Result;
use prometheus::{Encoder, Gauge, IntCounter, IntGauge, Opts, Registry, TextEncoder};

/// Renders collector snapshots in the Prometheus text exposition format
pub struct PrometheusExporter {
    collector: MetricsCollector,
}

fn counter(registry: &Registry, name: &str, help: &str, value: u64) -> Result<()> {
    let counter = IntCounter::with_opts(Opts::new(name, help))?;
    counter.inc_by(value);
    registry.register(Box::new(counter))?;
    Ok(())
}

fn gauge(registry: &Registry, name: &str, help: &str, value: usize) -> Result<()> {
    let gauge = IntGauge::with_opts(Opts::new(name, help))?;
    gauge.set(i64::try_from(value).unwrap_or(i64::MAX));
    registry.register(Box::new(gauge))?;
    Ok(())
}

impl PrometheusExporter {
    pub fn new(collector: MetricsCollector) -> Self {
        Self { collector }
    }

    pub async fn format_current_metrics(&self) -> Result<String> {
        let metrics = self.collector.get_metrics().await;
        self.format_metrics(&metrics)
    }

    pub fn format_metrics(&self, metrics: &Metrics) -> Result<String> {
        let registry = Registry::new();

        counter(
            &registry,
            "netcost_builds_total",
            "Topology graphs built",
            metrics.builds_total,
        )?;
        counter(
            &registry,
            "netcost_raw_edges_total",
            "Raw network edges processed across all builds",
            metrics.raw_edges_total,
        )?;
        counter(
            &registry,
            "netcost_refresh_success_total",
            "Refreshes that published a new snapshot",
            metrics.refresh_success_total,
        )?;
        counter(
            &registry,
            "netcost_refresh_failure_total",
            "Refreshes whose fetch failed",
            metrics.refresh_failure_total,
        )?;
        counter(
            &registry,
            "netcost_refresh_superseded_total",
            "Responses discarded because a newer refresh was in flight",
            metrics.refresh_superseded_total,
        )?;

        if let Some(stats) = &metrics.last_build {
            let gauges = [
                ("netcost_last_raw_edges", "Raw edges in the last build", stats.raw_edges),
                ("netcost_last_entities", "Distinct entities in the last build", stats.entities),
                (
                    "netcost_last_collapsed_external",
                    "External endpoints folded into the other bucket",
                    stats.collapsed_external,
                ),
                (
                    "netcost_last_collapsed_infra",
                    "Infra endpoints folded into the other bucket",
                    stats.collapsed_infra,
                ),
                (
                    "netcost_last_aggregated_edges",
                    "Aggregated edges in the last build",
                    stats.aggregated_edges,
                ),
                (
                    "netcost_last_pruned_entities",
                    "Entities dropped for having no edges",
                    stats.pruned_entities,
                ),
                (
                    "netcost_last_primary_namespaces",
                    "Primary namespace containers",
                    stats.primary_namespaces,
                ),
                (
                    "netcost_last_system_namespaces",
                    "System namespace containers",
                    stats.system_namespaces,
                ),
            ];
            for (name, help, value) in gauges {
                gauge(&registry, name, help, value)?;
            }

            let cost = Gauge::with_opts(Opts::new(
                "netcost_last_egress_cost_usd",
                "Estimated egress cost of the last build in USD",
            ))?;
            cost.set(stats.total_cost_usd);
            registry.register(Box::new(cost))?;
        }

        let mut buffer = Vec::new();
        TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::BuildStats;

    #[test]
    fn test_counters_without_build() {
        let exporter = PrometheusExporter::new(MetricsCollector::new());
        let metrics = Metrics {
            builds_total: 3,
            refresh_superseded_total: 1,
            ..Default::default()
        };

        let text = exporter.format_metrics(&metrics).unwrap();

        assert!(text.contains("# TYPE netcost_builds_total counter"));
        assert!(text.contains("netcost_builds_total 3"));
        assert!(text.contains("netcost_refresh_superseded_total 1"));
        assert!(!text.contains("netcost_last_raw_edges"));
    }

    #[tokio::test]
    async fn test_exports_last_build() {
        let collector = MetricsCollector::new();
        collector
            .record_build(&BuildStats {
                raw_edges: 12,
                aggregated_edges: 5,
                total_cost_usd: 1.5,
                ..Default::default()
            })
            .await;

        let text = PrometheusExporter::new(collector)
            .format_current_metrics()
            .await
            .unwrap();

        assert!(text.contains("netcost_last_raw_edges 12"));
        assert!(text.contains("netcost_last_aggregated_edges 5"));
        assert!(text.contains("# TYPE netcost_last_egress_cost_usd gauge"));
        assert!(text.contains("netcost_last_egress_cost_usd 1.5"));
    }
}
