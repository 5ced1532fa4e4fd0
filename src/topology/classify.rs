//! Endpoint classification
//!
//! Each side of an edge is resolved to a semantic entity by an ordered chain
//! of rules. The first rule that matches wins; the chain ends in a total
//! `unknown` fallback so every endpoint classifies.
//!
//! Entity ids are derived from edge fields only, so two edges describing the
//! same thing always resolve to the same entity.

use super::ranking::{
    external_usage_key, infra_usage_key, UsageRanking, OTHER_EXTERNAL_ID, OTHER_INFRA_ID,
};
use crate::k8s::{parse_workload_from_pod, ResourceKind};
use netcost_common::{Endpoint, NetworkEdge, Side};
use serde::Serialize;

pub const EXTERNAL_NAMESPACE: &str = "external";
pub const INFRA_NAMESPACE: &str = "infrastructure";
pub const UNKNOWN_NAMESPACE: &str = "unknown";

/// A classified, uniquely identified endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceEntity {
    pub id: String,
    pub title: String,
    pub kind: ResourceKind,
    pub namespace: String,
    /// Catch-all bucket standing in for long-tail endpoints
    pub collapsed: bool,
}

impl ResourceEntity {
    fn new(id: String, title: &str, kind: ResourceKind, namespace: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
            kind,
            namespace: namespace.to_string(),
            collapsed: false,
        }
    }

    fn bucket(id: &str, title: &str, kind: ResourceKind, namespace: &str) -> Self {
        Self {
            collapsed: true,
            ..Self::new(id.to_string(), title, kind, namespace)
        }
    }

    pub fn is_external(&self) -> bool {
        self.kind == ResourceKind::External
    }
}

/// One endpoint under classification
pub struct SideView<'e> {
    pub edge: &'e NetworkEdge,
    pub side: Side,
    pub endpoint: Endpoint<'e>,
}

impl<'e> SideView<'e> {
    pub fn new(edge: &'e NetworkEdge, side: Side) -> Self {
        Self {
            edge,
            side,
            endpoint: edge.endpoint(side),
        }
    }
}

type Rule = fn(&SideView<'_>, &UsageRanking) -> Option<ResourceEntity>;

/// Classification rules in precedence order
const RULES: [Rule; 5] = [external_rule, service_rule, workload_rule, node_rule, ip_rule];

/// Resolve one side of an edge to its entity
pub fn classify_endpoint(
    edge: &NetworkEdge,
    side: Side,
    ranking: &UsageRanking,
) -> ResourceEntity {
    let view = SideView::new(edge, side);
    RULES
        .iter()
        .find_map(|rule| rule(&view, ranking))
        .unwrap_or_else(|| unknown_rule(&view))
}

/// Destination marked external by the provider
pub fn external_rule(view: &SideView<'_>, ranking: &UsageRanking) -> Option<ResourceEntity> {
    if view.side != Side::Dst || !view.edge.is_external_destination() {
        return None;
    }

    let key = external_usage_key(view.edge)?;
    if !ranking.keeps_external(&key) {
        return Some(ResourceEntity::bucket(
            OTHER_EXTERNAL_ID,
            "Other external IPs",
            ResourceKind::External,
            EXTERNAL_NAMESPACE,
        ));
    }

    let title = view
        .endpoint
        .dns_name
        .or(view.endpoint.ip)
        .unwrap_or("External");
    Some(ResourceEntity::new(
        key,
        title,
        ResourceKind::External,
        EXTERNAL_NAMESPACE,
    ))
}

/// First `namespace/name` entry of a services annotation
fn first_service(services: &str) -> Option<(&str, &str)> {
    let first = services.split(',').next()?.trim();
    let mut parts = first.split('/');
    let namespace = parts.next().unwrap_or("");
    let name = parts.next().unwrap_or("");
    if name.is_empty() {
        return None;
    }
    Some((namespace, name))
}

/// Service endpoint without a concrete pod
pub fn service_rule(view: &SideView<'_>, _ranking: &UsageRanking) -> Option<ResourceEntity> {
    let endpoint = &view.endpoint;
    if endpoint.pod_name.is_some() {
        return None;
    }

    let (parsed_namespace, name) = first_service(endpoint.services?)?;
    let namespace = endpoint
        .namespace
        .or(Some(parsed_namespace).filter(|ns| !ns.is_empty()))?;

    Some(ResourceEntity::new(
        format!("{}:service:{}/{}", view.side, namespace, name),
        name,
        ResourceKind::Service,
        namespace,
    ))
}

/// Pod attributed to its owning workload
pub fn workload_rule(view: &SideView<'_>, _ranking: &UsageRanking) -> Option<ResourceEntity> {
    let namespace = view.endpoint.namespace?;
    let pod = view.endpoint.pod_name?;
    let workload = parse_workload_from_pod(pod);

    Some(ResourceEntity::new(
        format!(
            "{}:{}:{}/{}",
            view.side,
            workload.kind.as_str(),
            namespace,
            workload.name
        ),
        &workload.name,
        workload.kind,
        namespace,
    ))
}

fn infra_bucket(
    view: &SideView<'_>,
    ranking: &UsageRanking,
    kind: ResourceKind,
) -> Option<ResourceEntity> {
    let key = infra_usage_key(&view.endpoint)?;
    if ranking.keeps_infra(&key) {
        return None;
    }
    Some(ResourceEntity::bucket(
        OTHER_INFRA_ID,
        "Other infra endpoints",
        kind,
        INFRA_NAMESPACE,
    ))
}

/// Node endpoint with no pod identity
pub fn node_rule(view: &SideView<'_>, ranking: &UsageRanking) -> Option<ResourceEntity> {
    let node = view.endpoint.node_name?;

    if let Some(bucket) = infra_bucket(view, ranking, ResourceKind::Node) {
        return Some(bucket);
    }

    Some(ResourceEntity::new(
        format!("{}:node:{}", view.side, node),
        node,
        ResourceKind::Node,
        INFRA_NAMESPACE,
    ))
}

/// Bare IP endpoint, titled by its DNS name when known
pub fn ip_rule(view: &SideView<'_>, ranking: &UsageRanking) -> Option<ResourceEntity> {
    let address = view.endpoint.dns_name.or(view.endpoint.ip)?;

    if let Some(bucket) = infra_bucket(view, ranking, ResourceKind::Ip) {
        return Some(bucket);
    }

    Some(ResourceEntity::new(
        format!("{}:ip:{}", view.side, address),
        address,
        ResourceKind::Ip,
        INFRA_NAMESPACE,
    ))
}

pub fn unknown_rule(view: &SideView<'_>) -> ResourceEntity {
    ResourceEntity::new(
        format!("{}:unknown", view.side),
        "Unknown",
        ResourceKind::Unknown,
        UNKNOWN_NAMESPACE,
    )
}
