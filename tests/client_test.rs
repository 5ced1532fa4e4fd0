// HTTP client and refresher tests against a mock dashboard API.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use netcost::ingest::{RefreshOutcome, TopologyClient, TopologyFilters, TopologyRefresher};
use netcost::{TopologyBuilder, TopologyError};
use netcost_common::{Lookback, TopologyRequest};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup(cluster_id: Option<&str>) -> (MockServer, TopologyClient) {
    let server = MockServer::start().await;
    let client = TopologyClient::from_reqwest(
        &server.uri(),
        reqwest::Client::new(),
        cluster_id.map(str::to_string),
    )
    .unwrap();
    (server, client)
}

fn topology_body() -> serde_json::Value {
    json!({
        "clusterId": "prod-eu",
        "start": "2026-10-18T10:00:00Z",
        "end": "2026-10-18T11:00:00Z",
        "timestamp": "2026-10-18T11:00:05Z",
        "totalEdges": 7,
        "requestedLimit": 500,
        "edges": [
            {
                "srcNamespace": "payments",
                "srcPodName": "payments-7d9f8c6b5d-x4k2p",
                "dstKind": "external",
                "dstDnsName": "api.stripe.com",
                "bytesSent": 1000,
                "bytesReceived": 0,
                "egressCostUsd": 0.05,
                "connectionCount": 3
            },
            {
                "srcNamespace": "payments",
                "srcPodName": "payments-7d9f8c6b5d-x4k2p",
                "dstNamespace": "billing",
                "dstPodName": "billing-0",
                "bytesSent": 500
            }
        ]
    })
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_topology_sends_filters() {
    let (server, client) = setup(Some("prod-eu")).await;

    Mock::given(method("GET"))
        .and(path("/api/network/topology"))
        .and(query_param("lookback", "6h"))
        .and(query_param("namespace", "payments"))
        .and(query_param("limit", "500"))
        .and(query_param("minCost", "0.01"))
        .and(query_param("minBytes", "1048576"))
        .and(query_param("clusterId", "prod-eu"))
        .respond_with(ResponseTemplate::new(200).set_body_json(topology_body()))
        .mount(&server)
        .await;

    let request = TopologyFilters {
        lookback: Lookback::SixHours,
        namespaces: vec!["payments".to_string()],
        min_bytes_mb: 1.0,
        ..Default::default()
    }
    .to_request();

    let response = client.fetch_topology(&request).await.unwrap();

    assert_eq!(response.cluster_id, "prod-eu");
    assert_eq!(response.total_edges, 7);
    assert_eq!(response.edges.len(), 2);
    assert_eq!(response.edges[0].connection_count, 3);
    assert_eq!(response.edges[1].egress_cost_usd, 0.0);
    assert!(response.timestamp.is_some());
}

#[tokio::test]
async fn test_list_namespaces_sorted_and_deduplicated() {
    let (server, client) = setup(None).await;

    Mock::given(method("GET"))
        .and(path("/api/cost/namespaces"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [
                { "namespace": "payments" },
                { "namespace": "" },
                { "namespace": "billing" },
                { "namespace": "payments" }
            ]
        })))
        .mount(&server)
        .await;

    let namespaces = client.list_namespaces().await.unwrap();
    assert_eq!(namespaces, vec!["billing", "payments"]);
}

#[tokio::test]
async fn test_list_namespaces_accepts_bare_cost_array() {
    let (server, client) = setup(None).await;

    Mock::given(method("GET"))
        .and(path("/api/cost/namespaces"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "namespace": "payments", "team": "core", "env": "prod", "hourlyCost": 1.25 },
            { "namespace": "billing", "team": "finance", "env": "prod", "hourlyCost": 0.4 }
        ])))
        .mount(&server)
        .await;

    let namespaces = client.list_namespaces().await.unwrap();
    assert_eq!(namespaces, vec!["billing", "payments"]);
}

#[tokio::test]
async fn test_refresher_builds_snapshot() {
    let (server, client) = setup(None).await;

    Mock::given(method("GET"))
        .and(path("/api/network/topology"))
        .respond_with(ResponseTemplate::new(200).set_body_json(topology_body()))
        .mount(&server)
        .await;

    let refresher = TopologyRefresher::new(client, TopologyBuilder::default());
    let outcome = refresher
        .refresh(&TopologyRequest::default())
        .await
        .unwrap();

    let RefreshOutcome::Updated(snapshot) = outcome else {
        panic!("single refresh cannot be superseded");
    };
    assert_eq!(snapshot.cluster_id, "prod-eu");
    assert_eq!(snapshot.total_edges, 7);
    assert_eq!(snapshot.topology.graph.edges.len(), 2);
    assert!(snapshot
        .topology
        .graph
        .edge("namespace:payments->external:api.stripe.com")
        .is_some());
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_error_body_is_surfaced() {
    let (server, client) = setup(None).await;

    Mock::given(method("GET"))
        .and(path("/api/network/topology"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid lookback"))
        .mount(&server)
        .await;

    let err = client
        .fetch_topology(&TopologyRequest::default())
        .await
        .unwrap_err();

    match err {
        TopologyError::ApiError { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "invalid lookback");
        }
        other => panic!("expected ApiError, got {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_error_body_uses_status() {
    let (server, client) = setup(None).await;

    Mock::given(method("GET"))
        .and(path("/api/cost/namespaces"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client.list_namespaces().await.unwrap_err();
    assert!(matches!(
        err,
        TopologyError::ApiError { status: 503, ref message } if message == "Request failed with 503"
    ));
}

#[tokio::test]
async fn test_malformed_body_is_json_error() {
    let (server, client) = setup(None).await;

    Mock::given(method("GET"))
        .and(path("/api/network/topology"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = client
        .fetch_topology(&TopologyRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, TopologyError::JsonError(_)));
}

#[tokio::test]
async fn test_failed_refresh_keeps_snapshot() {
    let (server, client) = setup(None).await;

    Mock::given(method("GET"))
        .and(path("/api/network/topology"))
        .respond_with(ResponseTemplate::new(200).set_body_json(topology_body()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/network/topology"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let refresher = TopologyRefresher::new(client, TopologyBuilder::default());
    let request = TopologyRequest::default();

    refresher.refresh(&request).await.unwrap();
    assert!(refresher.refresh(&request).await.is_err());

    let current = refresher.current().await.expect("last good snapshot");
    assert_eq!(current.generation, 1);
    assert_eq!(current.topology.graph.edges.len(), 2);
}
