use super::client::TopologyClient;
use crate::Result;
use async_trait::async_trait;
use netcost_common::{NetworkEdge, TopologyRequest, TopologyResponse};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Anything that can answer a topology request
#[async_trait]
pub trait EdgeSource: Send + Sync {
    async fn fetch(&self, request: &TopologyRequest) -> Result<TopologyResponse>;

    /// Human-readable origin, for logs
    fn describe(&self) -> String;
}

#[async_trait]
impl EdgeSource for TopologyClient {
    async fn fetch(&self, request: &TopologyRequest) -> Result<TopologyResponse> {
        self.fetch_topology(request).await
    }

    fn describe(&self) -> String {
        self.base_url().to_string()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Payload {
    Edges(Vec<NetworkEdge>),
    Response(TopologyResponse),
}

/// Parse either a full topology response or a bare edge array
pub fn parse_payload(contents: &str) -> Result<TopologyResponse> {
    let payload: Payload = serde_json::from_str(contents)?;
    Ok(match payload {
        Payload::Edges(edges) => TopologyResponse::from_edges(edges),
        Payload::Response(response) => response,
    })
}

/// Whether an edge passes the request's bounds; lookback is not applied
pub fn matches_request(edge: &NetworkEdge, request: &TopologyRequest) -> bool {
    if !request.namespaces.is_empty() {
        let in_scope = [&edge.src_namespace, &edge.dst_namespace]
            .into_iter()
            .flatten()
            .any(|ns| request.namespaces.iter().any(|wanted| wanted == ns));
        if !in_scope {
            return false;
        }
    }

    request
        .min_cost_usd
        .map_or(true, |min| edge.egress_cost_usd >= min)
        && request
            .min_bytes
            .map_or(true, |min| edge.total_bytes() >= min)
        && request
            .min_connections
            .map_or(true, |min| edge.connection_count >= min)
}

/// Edges captured to disk, filtered locally
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl EdgeSource for FileSource {
    async fn fetch(&self, request: &TopologyRequest) -> Result<TopologyResponse> {
        let contents = tokio::fs::read_to_string(&self.path).await?;
        let mut response = parse_payload(&contents)?;

        let received = response.edges.len();
        response.edges.retain(|edge| matches_request(edge, request));
        response.total_edges = response.edges.len();

        if let Some(limit) = request.limit {
            response.edges.truncate(limit as usize);
            response.requested_limit = limit;
        }

        debug!(
            "Loaded {} edges from {}, {} after filters",
            received,
            self.path.display(),
            response.edges.len()
        );
        Ok(response)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn edge(ns: &str, cost: f64, bytes: u64, connections: u64) -> NetworkEdge {
        NetworkEdge {
            src_namespace: Some(ns.to_string()),
            bytes_sent: bytes,
            egress_cost_usd: cost,
            connection_count: connections,
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_bare_array() {
        let response = parse_payload(r#"[{"srcNamespace":"a","bytesSent":10}]"#).unwrap();
        assert_eq!(response.edges.len(), 1);
        assert_eq!(response.total_edges, 1);
    }

    #[test]
    fn test_parse_response_object() {
        let response = parse_payload(
            r#"{"clusterId":"prod","edges":[],"totalEdges":42,"requestedLimit":500}"#,
        )
        .unwrap();
        assert_eq!(response.cluster_id, "prod");
        assert_eq!(response.total_edges, 42);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_payload("not json").is_err());
    }

    #[test]
    fn test_matches_request_bounds() {
        let request = TopologyRequest {
            namespaces: vec!["shop".to_string()],
            min_cost_usd: Some(0.1),
            min_bytes: Some(100),
            min_connections: Some(2),
            ..Default::default()
        };

        assert!(matches_request(&edge("shop", 0.2, 200, 3), &request));
        assert!(!matches_request(&edge("other", 0.2, 200, 3), &request));
        assert!(!matches_request(&edge("shop", 0.05, 200, 3), &request));
        assert!(!matches_request(&edge("shop", 0.2, 50, 3), &request));
        assert!(!matches_request(&edge("shop", 0.2, 200, 1), &request));
    }

    #[tokio::test]
    async fn test_file_source_filters_and_limits() {
        let edges = vec![
            edge("a", 1.0, 10, 1),
            edge("b", 0.0, 10, 1),
            edge("c", 2.0, 10, 1),
            edge("d", 3.0, 10, 1),
        ];
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", serde_json::to_string(&edges).unwrap()).unwrap();

        let source = FileSource::new(file.path());
        let request = TopologyRequest {
            limit: Some(2),
            min_cost_usd: Some(0.5),
            ..Default::default()
        };

        let response = source.fetch(&request).await.unwrap();
        assert_eq!(response.total_edges, 3);
        assert_eq!(response.requested_limit, 2);
        assert_eq!(response.edges.len(), 2);
        assert_eq!(response.edges[0].src_namespace.as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let source = FileSource::new("/nonexistent/edges.json");
        assert!(source.fetch(&TopologyRequest::default()).await.is_err());
    }
}
