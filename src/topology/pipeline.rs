use super::aggregate::{AggregatedEdge, EdgeAggregator};
use super::classify::{classify_endpoint, ResourceEntity};
use super::graph::{GraphEdge, TopologyGraph};
use super::layout::LayoutEngine;
use super::ranking::UsageRanking;
use crate::config::{Config, LayoutConfig, TopologyConfig};
use crate::metrics::BuildStats;
use netcost_common::{NetworkEdge, Side};
use std::collections::HashSet;
use tracing::debug;

/// Everything produced by one pipeline run
#[derive(Debug, Clone, Default)]
pub struct Topology {
    /// Entity registry in first-seen order, before pruning
    pub entities: Vec<ResourceEntity>,
    pub edges: Vec<AggregatedEdge>,
    pub graph: TopologyGraph,
    pub stats: BuildStats,
}

#[derive(Debug, Clone, Default)]
pub struct TopologyBuilder {
    topology: TopologyConfig,
    layout: LayoutConfig,
}

impl TopologyBuilder {
    pub fn new(config: &Config) -> Self {
        Self {
            topology: config.topology.clone(),
            layout: config.layout.clone(),
        }
    }

    pub fn build(&self, edges: &[NetworkEdge]) -> Topology {
        let ranking = UsageRanking::from_edges(
            edges,
            self.topology.max_external_endpoints,
            self.topology.max_infra_endpoints,
        );
        debug!(
            "Ranked endpoints: {} external and {} infra collapsed",
            ranking.collapsed_external(),
            ranking.collapsed_infra()
        );

        let mut entities = Vec::new();
        let mut seen = HashSet::new();
        let mut aggregator = EdgeAggregator::new();

        for edge in edges {
            let src = classify_endpoint(edge, Side::Src, &ranking);
            let dst = classify_endpoint(edge, Side::Dst, &ranking);

            aggregator.add(edge, &src, &dst);

            for entity in [src, dst] {
                if seen.insert(entity.id.clone()) {
                    entities.push(entity);
                }
            }
        }

        let aggregated = aggregator.into_edges();
        debug!(
            "Classified {} raw edges into {} entities and {} aggregated edges",
            edges.len(),
            entities.len(),
            aggregated.len()
        );

        let layout = LayoutEngine::new(&self.layout, &self.topology.system_namespaces)
            .layout(&entities, &aggregated);
        debug!(
            "Laid out {} nodes, pruned {} entities",
            layout.nodes.len(),
            layout.pruned_entities
        );

        let total_cost_usd: f64 = edges.iter().map(|edge| edge.egress_cost_usd).sum();

        let stats = BuildStats {
            raw_edges: edges.len(),
            entities: entities.len(),
            collapsed_external: ranking.collapsed_external(),
            collapsed_infra: ranking.collapsed_infra(),
            aggregated_edges: aggregated.len(),
            pruned_entities: layout.pruned_entities,
            primary_namespaces: layout.primary_namespaces(),
            system_namespaces: layout.system_namespaces(),
            total_cost_usd,
        };

        let graph = TopologyGraph {
            nodes: layout.nodes,
            edges: aggregated.iter().map(GraphEdge::from).collect(),
            total_cost_usd,
        };

        Topology {
            entities,
            edges: aggregated,
            graph,
            stats,
        }
    }
}

/// Build a renderer-ready graph with default limits and spacing
pub fn build_topology(edges: &[NetworkEdge]) -> TopologyGraph {
    TopologyBuilder::new(&Config::default()).build(edges).graph
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pod_edge(src: (&str, &str), dst: (&str, &str), cost: f64) -> NetworkEdge {
        NetworkEdge {
            src_namespace: Some(src.0.to_string()),
            src_pod_name: Some(src.1.to_string()),
            dst_namespace: Some(dst.0.to_string()),
            dst_pod_name: Some(dst.1.to_string()),
            bytes_sent: 1000,
            egress_cost_usd: cost,
            connection_count: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_input_builds_empty_graph() {
        let topology = TopologyBuilder::default().build(&[]);
        assert!(topology.graph.is_empty());
        assert_eq!(topology.stats, BuildStats::default());
    }

    #[test]
    fn test_builder_default_matches_config_default() {
        let edges = vec![pod_edge(("a", "web-0"), ("b", "db-0"), 0.0)];
        assert_eq!(
            TopologyBuilder::default().build(&edges).graph,
            build_topology(&edges)
        );
    }

    #[test]
    fn test_replicas_merge_into_one_edge() {
        let edges = vec![
            pod_edge(("shop", "web-7d9f8c6b5-abcde"), ("shop", "db-0"), 0.0),
            pod_edge(("shop", "web-7d9f8c6b5-fghij"), ("shop", "db-0"), 0.0),
        ];

        let topology = TopologyBuilder::default().build(&edges);

        assert_eq!(topology.edges.len(), 1);
        assert_eq!(topology.edges[0].bytes_sent, 2000);
        assert_eq!(topology.entities.len(), 2);
        assert_eq!(topology.stats.primary_namespaces, 1);
        assert!(topology
            .graph
            .edge("src:deployment:shop/web->dst:statefulset:shop/db")
            .is_some());
    }

    #[test]
    fn test_stats_sum_raw_cost() {
        let edges = vec![
            pod_edge(("a", "x"), ("b", "y"), 0.25),
            pod_edge(("a", "x"), ("b", "y"), 0.5),
        ];

        let topology = TopologyBuilder::default().build(&edges);

        assert_eq!(topology.stats.raw_edges, 2);
        assert_eq!(topology.stats.aggregated_edges, 1);
        assert!((topology.graph.total_cost_usd - 0.75).abs() < 1e-9);
        assert_eq!(topology.graph.edges[0].label, "$0.75");
    }

    #[test]
    fn test_system_limits_come_from_config() {
        let mut config = Config::default();
        config.topology.system_namespaces = vec!["shop".to_string()];

        let edges = vec![pod_edge(("shop", "web-0"), ("shop", "db-0"), 0.0)];
        let topology = TopologyBuilder::new(&config).build(&edges);

        assert_eq!(topology.stats.primary_namespaces, 0);
        assert_eq!(topology.stats.system_namespaces, 1);
    }
}
