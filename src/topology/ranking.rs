//! Usage ranking for long-tail endpoint collapse
//!
//! External destinations and infrastructure endpoints (bare nodes and IPs) are
//! ranked by combined sent+received bytes across the whole edge set. Only the
//! top-K of each pool keep their own identity during classification; the rest
//! share a catch-all bucket.

use netcost_common::{Endpoint, NetworkEdge, Side};
use std::collections::{HashMap, HashSet};

pub const OTHER_EXTERNAL_ID: &str = "external:other";
pub const OTHER_INFRA_ID: &str = "infra:other";

/// Ranking key for an external destination, if the edge has one
pub fn external_usage_key(edge: &NetworkEdge) -> Option<String> {
    if !edge.is_external_destination() {
        return None;
    }
    let dst = edge.endpoint(Side::Dst);
    let host = dst.dns_name.or(dst.ip).unwrap_or("unknown");
    Some(format!("external:{}", host))
}

/// Ranking key for a node or IP endpoint that carries no pod identity
pub fn infra_usage_key(endpoint: &Endpoint<'_>) -> Option<String> {
    if endpoint.namespace.is_some() || endpoint.pod_name.is_some() {
        return None;
    }
    if let Some(node) = endpoint.node_name {
        return Some(format!("infra:node:{}", node));
    }
    endpoint
        .ip
        .or(endpoint.dns_name)
        .map(|ip| format!("infra:ip:{}", ip))
}

/// Byte totals per key, remembering first-seen order for tie-breaking
#[derive(Debug, Default)]
struct UsageTally {
    order: Vec<String>,
    totals: HashMap<String, u64>,
}

impl UsageTally {
    fn add(&mut self, key: String, bytes: u64) {
        match self.totals.get_mut(&key) {
            Some(total) => *total = total.saturating_add(bytes),
            None => {
                self.totals.insert(key.clone(), bytes);
                self.order.push(key);
            }
        }
    }

    fn len(&self) -> usize {
        self.order.len()
    }

    /// Keys with the highest totals; equal totals keep first-seen order
    fn top(&self, k: usize) -> HashSet<String> {
        let mut ranked: Vec<(&String, u64)> = self
            .order
            .iter()
            .map(|key| (key, self.totals.get(key).copied().unwrap_or(0)))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
            .into_iter()
            .take(k)
            .map(|(key, _)| key.clone())
            .collect()
    }
}

/// Immutable snapshot of which endpoints keep their own identity
#[derive(Debug, Clone, Default)]
pub struct UsageRanking {
    top_external: HashSet<String>,
    top_infra: HashSet<String>,
    external_seen: usize,
    infra_seen: usize,
}

impl UsageRanking {
    /// Rank every external and infra endpoint in the edge set
    pub fn from_edges(edges: &[NetworkEdge], max_external: usize, max_infra: usize) -> Self {
        let mut external = UsageTally::default();
        let mut infra = UsageTally::default();

        for edge in edges {
            let bytes = edge.total_bytes();

            if let Some(key) = external_usage_key(edge) {
                external.add(key, bytes);
            }

            for side in Side::BOTH {
                if let Some(key) = infra_usage_key(&edge.endpoint(side)) {
                    infra.add(key, bytes);
                }
            }
        }

        Self {
            top_external: external.top(max_external),
            top_infra: infra.top(max_infra),
            external_seen: external.len(),
            infra_seen: infra.len(),
        }
    }

    pub fn keeps_external(&self, key: &str) -> bool {
        self.top_external.contains(key)
    }

    pub fn keeps_infra(&self, key: &str) -> bool {
        self.top_infra.contains(key)
    }

    /// Distinct external endpoints folded into `external:other`
    pub fn collapsed_external(&self) -> usize {
        self.external_seen - self.top_external.len()
    }

    /// Distinct infra endpoints folded into `infra:other`
    pub fn collapsed_infra(&self) -> usize {
        self.infra_seen - self.top_infra.len()
    }
}
