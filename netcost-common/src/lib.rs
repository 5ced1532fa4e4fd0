//! Shared network-flow wire types for netcost
//!
//! This crate defines the structures exchanged with the cost dashboard API:
//! - `NetworkEdge`: one observed flow between two endpoints in a time window
//! - `TopologyRequest` / `TopologyResponse`: the topology query and its reply
//! - `NamespaceList`: namespaces known to the dashboard, for filter pickers
//!
//! Field names follow the API's camelCase JSON. Every endpoint field is
//! optional on the wire and empty strings are treated as absent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Destination kind reported for traffic leaving the cluster
pub const EXTERNAL_KIND: &str = "external";

/// One network flow aggregated by the data provider over the lookback window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkEdge {
    pub src_namespace: Option<String>,
    pub src_pod_name: Option<String>,
    pub src_node_name: Option<String>,
    pub src_ip: Option<String>,
    pub src_dns_name: Option<String>,
    pub src_availability_zone: Option<String>,
    pub dst_namespace: Option<String>,
    pub dst_pod_name: Option<String>,
    pub dst_node_name: Option<String>,
    pub dst_ip: Option<String>,
    pub dst_dns_name: Option<String>,
    pub dst_availability_zone: Option<String>,
    pub dst_kind: Option<String>,
    pub dst_services: Option<String>,
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub egress_cost_usd: f64,
    pub connection_count: u64,
}

/// Which end of a flow an endpoint sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Src,
    Dst,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Src, Side::Dst];

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Src => "src",
            Side::Dst => "dst",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Borrowed view of one side of a `NetworkEdge` with empty strings filtered out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Endpoint<'a> {
    pub namespace: Option<&'a str>,
    pub pod_name: Option<&'a str>,
    pub node_name: Option<&'a str>,
    pub ip: Option<&'a str>,
    pub dns_name: Option<&'a str>,
    pub availability_zone: Option<&'a str>,
    /// Comma-separated `namespace/name` service annotations (destination only)
    pub services: Option<&'a str>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

impl NetworkEdge {
    /// Resolve the populated fields of one side of this edge
    pub fn endpoint(&self, side: Side) -> Endpoint<'_> {
        match side {
            Side::Src => Endpoint {
                namespace: present(&self.src_namespace),
                pod_name: present(&self.src_pod_name),
                node_name: present(&self.src_node_name),
                ip: present(&self.src_ip),
                dns_name: present(&self.src_dns_name),
                availability_zone: present(&self.src_availability_zone),
                services: None,
            },
            Side::Dst => Endpoint {
                namespace: present(&self.dst_namespace),
                pod_name: present(&self.dst_pod_name),
                node_name: present(&self.dst_node_name),
                ip: present(&self.dst_ip),
                dns_name: present(&self.dst_dns_name),
                availability_zone: present(&self.dst_availability_zone),
                services: present(&self.dst_services),
            },
        }
    }

    /// True when the provider marked the destination as outside the cluster
    pub fn is_external_destination(&self) -> bool {
        self.dst_kind.as_deref() == Some(EXTERNAL_KIND)
    }

    /// Combined sent and received bytes, the metric used for usage ranking
    pub fn total_bytes(&self) -> u64 {
        self.bytes_sent.saturating_add(self.bytes_received)
    }

    /// Both sides report a zone and the zones differ
    pub fn is_cross_az(&self) -> bool {
        match (
            present(&self.src_availability_zone),
            present(&self.dst_availability_zone),
        ) {
            (Some(src), Some(dst)) => src != dst,
            _ => false,
        }
    }
}

/// Lookback window accepted by the topology endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lookback {
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[default]
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "6h")]
    SixHours,
    #[serde(rename = "24h")]
    OneDay,
}

impl Lookback {
    pub const ALL: [Lookback; 4] = [
        Lookback::FifteenMinutes,
        Lookback::OneHour,
        Lookback::SixHours,
        Lookback::OneDay,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Lookback::FifteenMinutes => "15m",
            Lookback::OneHour => "1h",
            Lookback::SixHours => "6h",
            Lookback::OneDay => "24h",
        }
    }

    pub fn duration(&self) -> Duration {
        match self {
            Lookback::FifteenMinutes => Duration::from_secs(15 * 60),
            Lookback::OneHour => Duration::from_secs(60 * 60),
            Lookback::SixHours => Duration::from_secs(6 * 60 * 60),
            Lookback::OneDay => Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl fmt::Display for Lookback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a lookback string is not one of the supported windows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLookbackError(pub String);

impl fmt::Display for ParseLookbackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unsupported lookback '{}' (expected one of 15m, 1h, 6h, 24h)",
            self.0
        )
    }
}

impl std::error::Error for ParseLookbackError {}

impl FromStr for Lookback {
    type Err = ParseLookbackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Lookback::ALL
            .into_iter()
            .find(|lookback| lookback.as_str() == trimmed)
            .ok_or_else(|| ParseLookbackError(s.to_string()))
    }
}

/// Query sent to the network-flow provider
///
/// Optional bounds are omitted when absent. Numeric bounds are never negative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologyRequest {
    pub lookback: Lookback,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub namespaces: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_cost_usd: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_connections: Option<u64>,
}

/// Reply from the network-flow provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TopologyResponse {
    pub cluster_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub edges: Vec<NetworkEdge>,
    pub total_edges: usize,
    pub requested_limit: u32,
    pub timestamp: Option<DateTime<Utc>>,
}

impl TopologyResponse {
    /// Wrap a bare edge list, as produced by offline captures
    pub fn from_edges(edges: Vec<NetworkEdge>) -> Self {
        let total_edges = edges.len();
        Self {
            edges,
            total_edges,
            ..Default::default()
        }
    }
}

/// Namespace records returned by the cost API
///
/// Accepts a bare array of namespace cost records or an object wrapping
/// them under `records`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "NamespacePayload")]
pub struct NamespaceList {
    pub records: Vec<NamespaceRecord>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NamespacePayload {
    Records(Vec<NamespaceRecord>),
    Wrapped {
        #[serde(default)]
        records: Vec<NamespaceRecord>,
    },
}

impl From<NamespacePayload> for NamespaceList {
    fn from(payload: NamespacePayload) -> Self {
        match payload {
            NamespacePayload::Records(records) | NamespacePayload::Wrapped { records } => {
                Self { records }
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamespaceRecord {
    pub namespace: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_deserializes_camel_case_with_missing_fields() {
        let json = r#"{
            "srcNamespace": "payments",
            "srcPodName": "payments-7d9f8c6b5d-x4k2p",
            "dstKind": "external",
            "dstDnsName": "api.stripe.com",
            "bytesSent": 1000,
            "egressCostUsd": 0.05
        }"#;

        let edge: NetworkEdge = serde_json::from_str(json).expect("valid edge");
        assert_eq!(edge.src_namespace.as_deref(), Some("payments"));
        assert_eq!(edge.bytes_sent, 1000);
        assert_eq!(edge.bytes_received, 0);
        assert_eq!(edge.connection_count, 0);
        assert!(edge.is_external_destination());
    }

    #[test]
    fn test_endpoint_filters_empty_strings() {
        let edge = NetworkEdge {
            src_namespace: Some(String::new()),
            src_pod_name: Some("worker".to_string()),
            dst_services: Some("billing/api".to_string()),
            ..Default::default()
        };

        let src = edge.endpoint(Side::Src);
        assert_eq!(src.namespace, None);
        assert_eq!(src.pod_name, Some("worker"));
        assert_eq!(src.services, None);

        let dst = edge.endpoint(Side::Dst);
        assert_eq!(dst.services, Some("billing/api"));
    }

    #[test]
    fn test_cross_az_requires_both_zones() {
        let mut edge = NetworkEdge {
            src_availability_zone: Some("us-east-1a".to_string()),
            ..Default::default()
        };
        assert!(!edge.is_cross_az());

        edge.dst_availability_zone = Some("us-east-1a".to_string());
        assert!(!edge.is_cross_az());

        edge.dst_availability_zone = Some("us-east-1b".to_string());
        assert!(edge.is_cross_az());
    }

    #[test]
    fn test_lookback_parse_and_display() {
        assert_eq!("6h".parse::<Lookback>(), Ok(Lookback::SixHours));
        assert_eq!(Lookback::FifteenMinutes.to_string(), "15m");
        assert_eq!(Lookback::default(), Lookback::OneHour);
        assert_eq!(Lookback::OneDay.duration(), Duration::from_secs(86_400));
        assert!("2h".parse::<Lookback>().is_err());
    }

    #[test]
    fn test_request_omits_absent_bounds() {
        let request = TopologyRequest {
            lookback: Lookback::OneHour,
            limit: Some(500),
            ..Default::default()
        };

        let json = serde_json::to_value(&request).expect("serializable");
        assert_eq!(json["lookback"], "1h");
        assert_eq!(json["limit"], 500);
        assert!(json.get("minBytes").is_none());
        assert!(json.get("namespaces").is_none());
    }

    #[test]
    fn test_namespace_list_accepts_bare_and_wrapped_records() {
        let bare = r#"[{"namespace":"payments","team":"core","hourlyCost":1.5}]"#;
        let list: NamespaceList = serde_json::from_str(bare).expect("bare array");
        assert_eq!(list.records[0].namespace, "payments");

        let wrapped = r#"{"records":[{"namespace":"billing"}]}"#;
        let list: NamespaceList = serde_json::from_str(wrapped).expect("wrapped records");
        assert_eq!(list.records[0].namespace, "billing");

        let empty: NamespaceList = serde_json::from_str("{}").expect("empty object");
        assert!(empty.records.is_empty());
    }
}
