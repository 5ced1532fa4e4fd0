//! Last-request-wins refresh
//!
//! Every `refresh` call takes a new generation. A response that arrives after a
//! newer refresh has started is discarded. A failed fetch leaves the previous
//! snapshot in place so readers keep seeing the last good graph.

use super::source::EdgeSource;
use crate::metrics::MetricsCollector;
use crate::topology::{Topology, TopologyBuilder};
use crate::Result;
use netcost_common::TopologyRequest;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// An immutable, published build
#[derive(Debug, Clone)]
pub struct TopologySnapshot {
    pub generation: u64,
    pub request: TopologyRequest,
    pub cluster_id: String,
    /// Edges matching the request on the provider side, before the limit
    pub total_edges: usize,
    pub requested_limit: u32,
    pub topology: Topology,
}

#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    Updated(Arc<TopologySnapshot>),
    Superseded { generation: u64, latest: u64 },
}

pub struct TopologyRefresher<S> {
    source: S,
    builder: TopologyBuilder,
    generation: AtomicU64,
    current: RwLock<Option<Arc<TopologySnapshot>>>,
    metrics: MetricsCollector,
}

impl<S: EdgeSource> TopologyRefresher<S> {
    pub fn new(source: S, builder: TopologyBuilder) -> Self {
        Self {
            source,
            builder,
            generation: AtomicU64::new(0),
            current: RwLock::new(None),
            metrics: MetricsCollector::new(),
        }
    }

    pub fn with_metrics(mut self, metrics: MetricsCollector) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn latest_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Last published snapshot, if any refresh has succeeded
    pub async fn current(&self) -> Option<Arc<TopologySnapshot>> {
        self.current.read().await.clone()
    }

    async fn superseded(&self, generation: u64) -> RefreshOutcome {
        let latest = self.latest_generation();
        info!(
            "Discarding response for refresh {} from {}, refresh {} is newer",
            generation,
            self.source.describe(),
            latest
        );
        self.metrics.record_superseded().await;
        RefreshOutcome::Superseded { generation, latest }
    }

    pub async fn refresh(&self, request: &TopologyRequest) -> Result<RefreshOutcome> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let fetched = self.source.fetch(request).await;
        if self.latest_generation() != generation {
            return Ok(self.superseded(generation).await);
        }

        let response = match fetched {
            Ok(response) => response,
            Err(e) => {
                warn!(
                    "Refresh {} from {} failed, keeping last snapshot: {}",
                    generation,
                    self.source.describe(),
                    e
                );
                self.metrics.record_refresh_failure().await;
                return Err(e);
            }
        };

        let topology = self.builder.build(&response.edges);
        let snapshot = Arc::new(TopologySnapshot {
            generation,
            request: request.clone(),
            cluster_id: response.cluster_id,
            total_edges: response.total_edges,
            requested_limit: response.requested_limit,
            topology,
        });

        let mut current = self.current.write().await;
        if self.latest_generation() != generation {
            drop(current);
            return Ok(self.superseded(generation).await);
        }
        *current = Some(snapshot.clone());
        drop(current);

        self.metrics.record_build(&snapshot.topology.stats).await;
        self.metrics.record_refresh_success().await;
        info!(
            "Published refresh {}: {} nodes, {} edges",
            generation,
            snapshot.topology.graph.nodes.len(),
            snapshot.topology.graph.edges.len()
        );

        Ok(RefreshOutcome::Updated(snapshot))
    }
}
