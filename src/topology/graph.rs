//! Renderer-facing topology output

use super::aggregate::{AggregatedEdge, Direction};
use super::style;
use crate::k8s::ResourceKind;
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// What a graph node draws: a namespace container or a resolved entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Namespace,
    Resource(ResourceKind),
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Namespace => "namespace",
            NodeKind::Resource(kind) => kind.as_str(),
        }
    }
}

impl Serialize for NodeKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    pub kind: NodeKind,
    pub title: String,
    pub namespace: String,
    /// Containing namespace node; `position` is then relative to it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub position: Position,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child_count: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    pub id: String,
    pub source_id: String,
    pub destination_id: String,
    pub label: String,
    pub cost_usd: f64,
    pub stroke_weight: f64,
    pub stroke_color: String,
    pub dashed: bool,
    pub animated: bool,
    pub direction: Direction,
    pub cross_az: bool,
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub connection_count: u64,
}

impl From<&AggregatedEdge> for GraphEdge {
    fn from(edge: &AggregatedEdge) -> Self {
        Self {
            id: edge.id(),
            source_id: edge.source_id.clone(),
            destination_id: edge.destination_id.clone(),
            label: style::edge_label(edge),
            cost_usd: edge.egress_cost_usd,
            stroke_weight: style::edge_width(edge),
            stroke_color: style::edge_color(edge).to_string(),
            dashed: style::is_dashed(edge),
            animated: style::is_animated(edge),
            direction: edge.direction,
            cross_az: edge.is_cross_az,
            bytes_sent: edge.bytes_sent,
            bytes_received: edge.bytes_received,
            connection_count: edge.connection_count,
        }
    }
}

/// Positioned nodes and styled edges ready for a declarative graph renderer
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologyGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    /// Egress cost summed over the raw input edges
    pub total_cost_usd: f64,
}

impl TopologyGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&GraphEdge> {
        self.edges.iter().find(|edge| edge.id == id)
    }
}
