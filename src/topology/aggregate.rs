//! Edge aggregation
//!
//! Raw edges that resolve to the same pair of merge keys collapse into one
//! `AggregatedEdge`. Traffic to or from an external entity is attributed to the
//! other side's namespace container instead of its individual workload.

use super::classify::ResourceEntity;
use netcost_common::NetworkEdge;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

pub const NAMESPACE_PREFIX: &str = "namespace:";

/// Id of the layout container holding every entity of a namespace
pub fn namespace_container_id(namespace: &str) -> String {
    format!("{}{}", NAMESPACE_PREFIX, namespace)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Egress,
    Ingress,
    Internal,
}

impl Direction {
    /// Direction implied by which side, if any, is external
    pub fn between(src: &ResourceEntity, dst: &ResourceEntity) -> Self {
        if src.is_external() {
            Direction::Ingress
        } else if dst.is_external() {
            Direction::Egress
        } else {
            Direction::Internal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Egress => "egress",
            Direction::Ingress => "ingress",
            Direction::Internal => "internal",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Merge keys for a classified edge: `(source, destination)`
pub fn merge_endpoints(src: &ResourceEntity, dst: &ResourceEntity) -> (String, String) {
    let source_id = if dst.is_external() && !src.namespace.is_empty() {
        namespace_container_id(&src.namespace)
    } else {
        src.id.clone()
    };

    let destination_id = if src.is_external() && !dst.namespace.is_empty() {
        namespace_container_id(&dst.namespace)
    } else {
        dst.id.clone()
    };

    (source_id, destination_id)
}

/// All raw flows between two merge keys
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedEdge {
    pub source_id: String,
    pub destination_id: String,
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub egress_cost_usd: f64,
    pub connection_count: u64,
    pub is_external: bool,
    pub is_cross_az: bool,
    pub direction: Direction,
}

impl AggregatedEdge {
    /// Contribution of a single raw edge
    pub fn from_edge(edge: &NetworkEdge, src: &ResourceEntity, dst: &ResourceEntity) -> Self {
        let (source_id, destination_id) = merge_endpoints(src, dst);

        Self {
            source_id,
            destination_id,
            bytes_sent: edge.bytes_sent,
            bytes_received: edge.bytes_received,
            egress_cost_usd: edge.egress_cost_usd,
            connection_count: edge.connection_count,
            is_external: edge.is_external_destination() || src.is_external(),
            is_cross_az: edge.is_cross_az(),
            direction: Direction::between(src, dst),
        }
    }

    pub fn id(&self) -> String {
        format!("{}->{}", self.source_id, self.destination_id)
    }

    pub fn total_bytes(&self) -> u64 {
        self.bytes_sent.saturating_add(self.bytes_received)
    }

    /// Fold another contribution for the same key into this edge
    pub fn merge(&mut self, other: &AggregatedEdge) {
        self.bytes_sent = self.bytes_sent.saturating_add(other.bytes_sent);
        self.bytes_received = self.bytes_received.saturating_add(other.bytes_received);
        self.egress_cost_usd += other.egress_cost_usd;
        self.connection_count = self.connection_count.saturating_add(other.connection_count);
        self.is_cross_az |= other.is_cross_az;
        self.is_external |= other.is_external;
        // egress/ingress are sticky once set
        if self.direction == Direction::Internal {
            self.direction = other.direction;
        }
    }
}

/// Aggregates classified edges by merge key, preserving first-seen order
#[derive(Debug, Default)]
pub struct EdgeAggregator {
    index: HashMap<String, usize>,
    edges: Vec<AggregatedEdge>,
    edges_processed: u64,
}

impl EdgeAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one raw edge given the entities its two sides resolved to
    pub fn add(&mut self, edge: &NetworkEdge, src: &ResourceEntity, dst: &ResourceEntity) {
        self.edges_processed += 1;

        let contribution = AggregatedEdge::from_edge(edge, src, dst);
        let key = contribution.id();

        match self.index.get(&key) {
            Some(&position) => self.edges[position].merge(&contribution),
            None => {
                self.index.insert(key, self.edges.len());
                self.edges.push(contribution);
            }
        }
    }

    /// Number of distinct aggregated edges
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Number of raw edges folded in so far
    pub fn edges_processed(&self) -> u64 {
        self.edges_processed
    }

    pub fn into_edges(self) -> Vec<AggregatedEdge> {
        self.edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::k8s::ResourceKind;

    fn entity(id: &str, kind: ResourceKind, namespace: &str) -> ResourceEntity {
        ResourceEntity {
            id: id.to_string(),
            title: id.to_string(),
            kind,
            namespace: namespace.to_string(),
            collapsed: false,
        }
    }

    fn edge(sent: u64, received: u64, cost: f64, connections: u64) -> NetworkEdge {
        NetworkEdge {
            bytes_sent: sent,
            bytes_received: received,
            egress_cost_usd: cost,
            connection_count: connections,
            ..Default::default()
        }
    }

    #[test]
    fn test_external_traffic_keys_on_namespace_container() {
        let src = entity("src:deployment:payments/api", ResourceKind::Deployment, "payments");
        let dst = entity("external:api.stripe.com", ResourceKind::External, "external");

        assert_eq!(
            merge_endpoints(&src, &dst),
            (
                "namespace:payments".to_string(),
                "external:api.stripe.com".to_string()
            )
        );
        assert_eq!(
            merge_endpoints(&dst, &src),
            (
                "external:api.stripe.com".to_string(),
                "namespace:payments".to_string()
            )
        );
    }

    #[test]
    fn test_internal_traffic_keys_on_entities() {
        let src = entity("src:deployment:payments/api", ResourceKind::Deployment, "payments");
        let dst = entity("dst:statefulset:billing/db", ResourceKind::StatefulSet, "billing");

        assert_eq!(
            merge_endpoints(&src, &dst),
            (src.id.clone(), dst.id.clone())
        );
        assert_eq!(Direction::between(&src, &dst), Direction::Internal);
    }

    #[test]
    fn test_merge_sums_and_ors() {
        let src = entity("src:pod:a/a", ResourceKind::Pod, "a");
        let dst = entity("dst:pod:b/b", ResourceKind::Pod, "b");

        let mut cross = edge(10, 5, 0.02, 1);
        cross.src_availability_zone = Some("us-east-1a".to_string());
        cross.dst_availability_zone = Some("us-east-1b".to_string());

        let mut aggregator = EdgeAggregator::new();
        aggregator.add(&edge(100, 50, 0.5, 2), &src, &dst);
        aggregator.add(&cross, &src, &dst);

        assert_eq!(aggregator.len(), 1);
        assert_eq!(aggregator.edges_processed(), 2);

        let merged = &aggregator.into_edges()[0];
        assert_eq!(merged.bytes_sent, 110);
        assert_eq!(merged.bytes_received, 55);
        assert!((merged.egress_cost_usd - 0.52).abs() < 1e-9);
        assert_eq!(merged.connection_count, 3);
        assert!(merged.is_cross_az);
        assert!(!merged.is_external);
    }

    #[test]
    fn test_direction_is_sticky() {
        let mut merged = AggregatedEdge {
            source_id: "a".to_string(),
            destination_id: "b".to_string(),
            bytes_sent: 0,
            bytes_received: 0,
            egress_cost_usd: 0.0,
            connection_count: 0,
            is_external: false,
            is_cross_az: false,
            direction: Direction::Internal,
        };

        let mut egress = merged.clone();
        egress.direction = Direction::Egress;
        let internal = merged.clone();

        merged.merge(&egress);
        assert_eq!(merged.direction, Direction::Egress);

        merged.merge(&internal);
        assert_eq!(merged.direction, Direction::Egress);
    }

    #[test]
    fn test_merge_is_order_independent() {
        let src = entity("src:pod:a/a", ResourceKind::Pod, "a");
        let dst = entity("external:x.io", ResourceKind::External, "external");
        let inputs = [edge(1, 2, 0.25, 1), edge(3, 4, 0.5, 2), edge(5, 6, 0.125, 3)];

        let mut forward = EdgeAggregator::new();
        for e in &inputs {
            forward.add(e, &src, &dst);
        }
        let mut backward = EdgeAggregator::new();
        for e in inputs.iter().rev() {
            backward.add(e, &src, &dst);
        }

        assert_eq!(forward.into_edges(), backward.into_edges());
    }
}
