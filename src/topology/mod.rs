//! Cost-aware network topology
//!
//! Raw flow edges go through four pure stages:
//! 1. `ranking`: one pass over all edges to find the busiest external and infra endpoints
//! 2. `classify`: each edge endpoint resolves to a `ResourceEntity`
//! 3. `aggregate`: edges between the same pair of entities merge into one `AggregatedEdge`
//! 4. `layout`: surviving entities are placed in external / primary / system tiers
//!
//! `style` maps aggregated edges to visual encodings and `pipeline` wires the
//! stages together into a renderer-facing `TopologyGraph`.

pub mod aggregate;
pub mod classify;
pub mod graph;
pub mod layout;
pub mod pipeline;
pub mod ranking;
pub mod style;

pub use aggregate::{AggregatedEdge, Direction, EdgeAggregator};
pub use classify::{classify_endpoint, ResourceEntity};
pub use graph::{GraphEdge, GraphNode, NodeKind, Position, Size, TopologyGraph};
pub use layout::{Layout, LayoutEngine, NamespaceGroup};
pub use pipeline::{build_topology, Topology, TopologyBuilder};
pub use ranking::UsageRanking;
