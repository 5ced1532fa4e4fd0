//! Deterministic tiered layout
//!
//! Tiers from top to bottom:
//! - external endpoints in a single wrapped row
//! - primary namespaces as a grid of containers
//! - system namespaces as a second grid
//!
//! Each container sizes itself to a near-square grid of its children. Child
//! positions are relative to their container. Given the same entities and edges
//! the output is identical on every run.

use super::aggregate::{namespace_container_id, AggregatedEdge};
use super::classify::{ResourceEntity, UNKNOWN_NAMESPACE};
use super::graph::{GraphNode, NodeKind, Position, Size};
use crate::config::LayoutConfig;
use crate::k8s::is_system_namespace;
use std::collections::{BTreeMap, HashSet};

/// A namespace container and the grid it lays its children out in
#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceGroup {
    pub name: String,
    pub child_count: usize,
    pub columns: usize,
    pub size: Size,
    pub position: Position,
    pub system: bool,
}

impl NamespaceGroup {
    pub fn id(&self) -> String {
        namespace_container_id(&self.name)
    }

    /// Whether a child-relative position falls inside this container
    pub fn contains(&self, local: &Position) -> bool {
        (0.0..=self.size.width).contains(&local.x) && (0.0..=self.size.height).contains(&local.y)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    /// External entities, then namespace containers, then contained entities
    pub nodes: Vec<GraphNode>,
    pub groups: Vec<NamespaceGroup>,
    /// Entities dropped because no aggregated edge references them
    pub pruned_entities: usize,
}

impl Layout {
    pub fn primary_namespaces(&self) -> usize {
        self.groups.iter().filter(|group| !group.system).count()
    }

    pub fn system_namespaces(&self) -> usize {
        self.groups.iter().filter(|group| group.system).count()
    }
}

#[derive(Default)]
struct TierOutput {
    containers: Vec<GraphNode>,
    children: Vec<GraphNode>,
    groups: Vec<NamespaceGroup>,
}

fn entity_node(entity: &ResourceEntity, parent_id: Option<String>, position: Position) -> GraphNode {
    GraphNode {
        id: entity.id.clone(),
        kind: NodeKind::Resource(entity.kind),
        title: entity.title.clone(),
        namespace: entity.namespace.clone(),
        parent_id,
        position,
        size: None,
        child_count: None,
    }
}

pub struct LayoutEngine<'a> {
    config: &'a LayoutConfig,
    system_namespaces: &'a [String],
}

impl<'a> LayoutEngine<'a> {
    pub fn new(config: &'a LayoutConfig, system_namespaces: &'a [String]) -> Self {
        Self {
            config,
            system_namespaces,
        }
    }

    /// Position every entity referenced by an edge
    pub fn layout(&self, entities: &[ResourceEntity], edges: &[AggregatedEdge]) -> Layout {
        let active: HashSet<&str> = edges
            .iter()
            .flat_map(|edge| [edge.source_id.as_str(), edge.destination_id.as_str()])
            .collect();

        let mut external: Vec<&ResourceEntity> = Vec::new();
        let mut members: BTreeMap<&str, Vec<&ResourceEntity>> = BTreeMap::new();
        let mut pruned_entities = 0;

        for entity in entities {
            if !active.contains(entity.id.as_str()) {
                pruned_entities += 1;
                continue;
            }
            if entity.is_external() {
                external.push(entity);
                continue;
            }
            let namespace = if entity.namespace.is_empty() {
                UNKNOWN_NAMESPACE
            } else {
                entity.namespace.as_str()
            };
            members.entry(namespace).or_default().push(entity);
        }

        let (system, primary): (Vec<&str>, Vec<&str>) = members
            .keys()
            .copied()
            .partition(|namespace| is_system_namespace(namespace, self.system_namespaces));
        let columns = if primary.len() > 6 { 3 } else { 2 };

        let mut nodes = Vec::new();
        let external_height = self.place_external(&external, &mut nodes);

        let mut tiers = TierOutput::default();
        let primary_top = external_height + self.config.tier_gap;
        let primary_height =
            self.place_tier(&primary, &members, primary_top, columns, false, &mut tiers);
        let system_top = primary_top + primary_height.max(0.0) + self.config.tier_gap;
        self.place_tier(&system, &members, system_top, columns, true, &mut tiers);

        nodes.extend(tiers.containers);
        nodes.extend(tiers.children);

        Layout {
            nodes,
            groups: tiers.groups,
            pruned_entities,
        }
    }

    /// Lay out external entities in a wrapped row; returns the row block height
    fn place_external(&self, external: &[&ResourceEntity], nodes: &mut Vec<GraphNode>) -> f64 {
        if external.is_empty() {
            return 0.0;
        }

        let spacing = self.config.node_spacing;
        let padding = self.config.external_row_padding;
        let columns = external.len().clamp(2, 6);

        for (index, entity) in external.iter().enumerate() {
            let col = index % columns;
            let row = index / columns;
            let position = Position::new(
                col as f64 * (spacing + self.config.external_column_gap),
                padding + row as f64 * spacing,
            );
            nodes.push(entity_node(entity, None, position));
        }

        external.len().div_ceil(columns) as f64 * spacing + padding * 2.0
    }

    /// Child grid columns and container size for a namespace
    fn group_dimensions(&self, child_count: usize) -> (usize, Size) {
        let config = self.config;
        let columns = ((child_count.max(1) as f64).sqrt().ceil() as usize).clamp(2, 4);
        let rows = child_count.div_ceil(columns).max(1);

        let size = Size {
            width: (columns as f64 * config.node_spacing + config.group_padding * 2.0)
                .max(config.min_group_width),
            height: rows as f64 * config.node_spacing
                + config.group_padding * 2.0
                + config.group_header_height,
        };

        (columns, size)
    }

    /// Lay out one tier of namespace containers; returns the tier height
    fn place_tier(
        &self,
        namespaces: &[&str],
        members: &BTreeMap<&str, Vec<&ResourceEntity>>,
        top: f64,
        columns: usize,
        system: bool,
        out: &mut TierOutput,
    ) -> f64 {
        let config = self.config;
        let mut row_heights: Vec<f64> = Vec::new();
        let mut groups = Vec::with_capacity(namespaces.len());

        for (index, namespace) in namespaces.iter().enumerate() {
            let mut children = members.get(namespace).cloned().unwrap_or_default();
            children.sort_by(|a, b| {
                a.kind
                    .as_str()
                    .cmp(b.kind.as_str())
                    .then_with(|| a.title.cmp(&b.title))
                    .then_with(|| a.id.cmp(&b.id))
            });

            let (child_columns, size) = self.group_dimensions(children.len());

            let row = index / columns;
            if row_heights.len() <= row {
                row_heights.push(0.0);
            }
            row_heights[row] = row_heights[row].max(size.height);

            let container_id = namespace_container_id(namespace);
            for (idx, child) in children.iter().enumerate() {
                let position = Position::new(
                    config.group_padding + (idx % child_columns) as f64 * config.node_spacing,
                    config.group_padding
                        + config.group_header_height
                        + (idx / child_columns) as f64 * config.node_spacing,
                );
                out.children
                    .push(entity_node(child, Some(container_id.clone()), position));
            }

            groups.push(NamespaceGroup {
                name: namespace.to_string(),
                child_count: children.len(),
                columns: child_columns,
                size,
                position: Position::default(),
                system,
            });
        }

        let mut row_offsets = Vec::with_capacity(row_heights.len());
        let mut offset = 0.0;
        for row in 0..row_heights.len() {
            if row > 0 {
                offset += row_heights[row - 1] + config.namespace_gap;
            }
            row_offsets.push(offset);
        }

        for (index, group) in groups.iter_mut().enumerate() {
            let col = index % columns;
            let row = index / columns;
            group.position = Position::new(
                col as f64 * (config.namespace_column_width + config.namespace_gap),
                top + row_offsets[row],
            );

            out.containers.push(GraphNode {
                id: group.id(),
                kind: NodeKind::Namespace,
                title: group.name.clone(),
                namespace: group.name.clone(),
                parent_id: None,
                position: group.position,
                size: Some(group.size),
                child_count: Some(group.child_count),
            });
        }

        out.groups.extend(groups);

        if row_heights.is_empty() {
            return 0.0;
        }
        row_heights.iter().sum::<f64>() + config.namespace_gap * (row_heights.len() - 1) as f64
    }
}
