//! User-facing filters and the query sent to the flow provider

use netcost_common::{Lookback, TopologyRequest};

pub const DEFAULT_EDGE_LIMIT: i64 = 500;
pub const DEFAULT_MIN_COST_USD: f64 = 0.01;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Filter values as a user enters them; any of them may be out of range
#[derive(Debug, Clone, PartialEq)]
pub struct TopologyFilters {
    pub lookback: Lookback,
    pub namespaces: Vec<String>,
    pub limit: i64,
    pub min_cost_usd: f64,
    pub min_bytes_mb: f64,
    pub min_connections: i64,
}

impl Default for TopologyFilters {
    fn default() -> Self {
        Self {
            lookback: Lookback::default(),
            namespaces: Vec::new(),
            limit: DEFAULT_EDGE_LIMIT,
            min_cost_usd: DEFAULT_MIN_COST_USD,
            min_bytes_mb: 0.0,
            min_connections: 0,
        }
    }
}

fn positive(value: f64) -> Option<f64> {
    (value.is_finite() && value > 0.0).then_some(value)
}

impl TopologyFilters {
    /// Sanitised request; zero and invalid bounds are left out
    pub fn to_request(&self) -> TopologyRequest {
        let min_bytes = positive(self.min_bytes_mb)
            .map(|mb| (mb * BYTES_PER_MB).round() as u64)
            .filter(|bytes| *bytes > 0);

        TopologyRequest {
            lookback: self.lookback,
            namespaces: normalize_namespaces(&self.namespaces),
            limit: u32::try_from(self.limit.clamp(0, u32::MAX as i64))
                .ok()
                .filter(|limit| *limit > 0),
            min_cost_usd: positive(self.min_cost_usd),
            min_bytes,
            min_connections: u64::try_from(self.min_connections)
                .ok()
                .filter(|count| *count > 0),
        }
    }
}

/// Split a comma-separated namespace list
pub fn parse_namespace_list(raw: &str) -> Vec<String> {
    normalize_namespaces(&[raw])
}

/// Split on commas, trim, drop empties and duplicates while keeping order
pub fn normalize_namespaces<S: AsRef<str>>(entries: &[S]) -> Vec<String> {
    let mut namespaces: Vec<String> = Vec::new();

    for entry in entries {
        for name in entry.as_ref().split(',').map(str::trim) {
            if !name.is_empty() && !namespaces.iter().any(|existing| existing == name) {
                namespaces.push(name.to_string());
            }
        }
    }

    namespaces
}

/// Query string pairs for `GET /api/network/topology`
pub fn query_pairs(
    request: &TopologyRequest,
    cluster_id: Option<&str>,
) -> Vec<(&'static str, String)> {
    let mut pairs = vec![("lookback", request.lookback.as_str().to_string())];

    for namespace in &request.namespaces {
        pairs.push(("namespace", namespace.clone()));
    }
    if let Some(limit) = request.limit {
        pairs.push(("limit", limit.to_string()));
    }
    if let Some(cost) = request.min_cost_usd {
        pairs.push(("minCost", cost.to_string()));
    }
    if let Some(bytes) = request.min_bytes {
        pairs.push(("minBytes", bytes.to_string()));
    }
    if let Some(connections) = request.min_connections {
        pairs.push(("minConnections", connections.to_string()));
    }
    if let Some(cluster) = cluster_id.filter(|id| !id.is_empty()) {
        pairs.push(("clusterId", cluster.to_string()));
    }

    pairs
}
