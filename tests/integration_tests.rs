//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: parameters → HTTP requests → records / cursors

use hcb_connector::config::ConnectorConfig;
use hcb_connector::engine::{ActionEngine, ExecuteConfig, OutputRecord};
use hcb_connector::http::{HttpClient, HttpClientConfig, Transport};
use hcb_connector::pagination::{PageFetcher, PaginationConfig};
use hcb_connector::params::JsonParameters;
use hcb_connector::resources::{Resource, TriggerResource};
use hcb_connector::state::{PollCursor, StateManager};
use hcb_connector::trigger::{IncrementalPoller, PollMode, PollerConfig, TieBreak, TriggerTarget};
use hcb_connector::types::FetchQuery;
use hcb_connector::Error;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport() -> Arc<dyn Transport> {
    Arc::new(HttpClient::new().unwrap())
}

fn fetcher(server: &MockServer) -> PageFetcher {
    PageFetcher::new(transport(), PaginationConfig::with_base_url(server.uri()))
}

fn page_of(start: usize, count: usize) -> Value {
    Value::Array(
        (start..start + count)
            .map(|i| json!({"id": format!("txn_{i}"), "amount_cents": i}))
            .collect(),
    )
}

async fn mount_page(server: &MockServer, route: &str, page: &str, total: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .and(query_param("page", page))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-total-pages", total)
                .set_body_json(body),
        )
        .expect(1)
        .mount(server)
        .await;
}

// ============================================================================
// Page Fetcher Integration Tests
// ============================================================================

#[tokio::test]
async fn test_fetch_all_walks_every_page() {
    let server = MockServer::start().await;
    let route = "/api/v3/organizations/hq/transactions";

    mount_page(&server, route, "1", "3", page_of(0, 100)).await;
    mount_page(&server, route, "2", "3", page_of(100, 100)).await;
    mount_page(&server, route, "3", "3", page_of(200, 50)).await;

    let endpoint = Resource::Transaction.list_endpoint(Some("hq")).unwrap();
    let items = fetcher(&server)
        .fetch_all(&endpoint, &FetchQuery::new())
        .await
        .unwrap();

    assert_eq!(items.len(), 250);
    assert_eq!(items[0]["id"], "txn_0");
    assert_eq!(items[249]["id"], "txn_249");
}

#[tokio::test]
async fn test_fetch_all_stops_without_total_pages_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/organizations"))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_of(0, 100)))
        .expect(1)
        .mount(&server)
        .await;

    let endpoint = Resource::Organization.list_endpoint(None).unwrap();
    let items = fetcher(&server)
        .fetch_all(&endpoint, &FetchQuery::new())
        .await
        .unwrap();

    assert_eq!(items.len(), 100);
}

#[tokio::test]
async fn test_fetch_all_propagates_mid_walk_failure() {
    let server = MockServer::start().await;
    let route = "/api/v3/organizations/hq/donations";

    mount_page(&server, route, "1", "2", page_of(0, 100)).await;
    Mock::given(method("GET"))
        .and(path(route))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let endpoint = Resource::Donation.list_endpoint(Some("hq")).unwrap();
    let err = fetcher(&server)
        .fetch_all(&endpoint, &FetchQuery::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 502, .. }));
}

#[tokio::test]
async fn test_fetch_limited_truncates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/organizations/hq/card_charges"))
        .and(query_param("per_page", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_of(0, 8)))
        .expect(1)
        .mount(&server)
        .await;

    let endpoint = Resource::CardCharge.list_endpoint(Some("hq")).unwrap();
    let items = fetcher(&server)
        .fetch_limited(&endpoint, &FetchQuery::new(), 5)
        .await
        .unwrap();

    assert_eq!(items.len(), 5);
    assert_eq!(items[4]["id"], "txn_4");
}

// ============================================================================
// Action Engine Integration Tests
// ============================================================================

#[tokio::test]
async fn test_execute_multiple_organizations() {
    let server = MockServer::start().await;

    for (org, body) in [("hq", page_of(0, 2)), ("bank", page_of(10, 1))] {
        Mock::given(method("GET"))
            .and(path(format!("/api/v3/organizations/{org}/invoices")))
            .and(query_param("expand", "sponsor"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&server)
            .await;
    }

    let params = JsonParameters::from_json_str(
        r#"{
            "parameters": {"resource": "invoice", "operation": "getAll", "limit": 10, "expand": "sponsor"},
            "items": [{"organizationId": "hq"}, {"organizationId": "bank"}]
        }"#,
    )
    .unwrap();

    let mut engine = ActionEngine::new(fetcher(&server));
    let records = engine.execute(&params, params.item_count()).await.unwrap();

    let paired: Vec<_> = records.iter().map(|r| r.paired_item.item).collect();
    assert_eq!(paired, vec![0, 0, 1]);
    assert_eq!(records[2].json["id"], "txn_10");
}

#[tokio::test]
async fn test_execute_continue_on_fail_with_http_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/transfers/xfr_missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v3/transfers/xfr_ok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "xfr_ok"})))
        .mount(&server)
        .await;

    let params = JsonParameters::from_json_str(
        r#"{
            "parameters": {"resource": "transfer", "operation": "get"},
            "items": [{"resourceId": "xfr_missing"}, {"resourceId": "xfr_ok"}]
        }"#,
    )
    .unwrap();

    let mut engine = ActionEngine::new(fetcher(&server))
        .with_config(ExecuteConfig::new().with_continue_on_fail(true));
    let records = engine.execute(&params, 2).await.unwrap();

    assert_eq!(
        records,
        vec![
            OutputRecord::error("HTTP 404: Not found", 0),
            OutputRecord::new(json!({"id": "xfr_ok"}), 1),
        ]
    );
}

// ============================================================================
// Polling Trigger Integration Tests
// ============================================================================

#[tokio::test]
async fn test_poll_cycle_persists_cursor_to_disk() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("state.json");
    let route = "/api/v3/organizations/hq/transactions";

    Mock::given(method("GET"))
        .and(path(route))
        .and(query_param("per_page", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "txn_b", "date": "2024-05-02"},
            {"id": "txn_a", "date": "2024-05-01"}
        ])))
        .mount(&server)
        .await;

    let poller = IncrementalPoller::new(
        transport(),
        PollerConfig::with_base_url(server.uri()).tie_break(TieBreak::LastItemId),
        TriggerTarget::new(TriggerResource::Transaction, "hq"),
    );

    let state = StateManager::from_file(&state_path).unwrap();
    let first = poller
        .poll_with_state(&state, PollMode::Trigger)
        .await
        .unwrap();
    assert_eq!(first.items(), &[json!({"id": "txn_b", "date": "2024-05-02"})]);

    // A fresh process sees the saved cursor and nothing new
    let reloaded = StateManager::from_file(&state_path).unwrap();
    assert_eq!(
        reloaded.get_cursor("transaction:hq").await,
        PollCursor::at("2024-05-02").with_id("txn_b")
    );
    let second = poller
        .poll_with_state(&reloaded, PollMode::Trigger)
        .await
        .unwrap();
    assert!(second.is_nothing());

    server.reset().await;
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "txn_d", "date": "2024-05-04"},
            {"id": "txn_c", "date": "2024-05-03"},
            {"id": "txn_b", "date": "2024-05-02"}
        ])))
        .mount(&server)
        .await;

    let third = poller
        .poll_with_state(&reloaded, PollMode::Trigger)
        .await
        .unwrap();
    let ids: Vec<_> = third.items().iter().map(|i| i["id"].clone()).collect();
    assert_eq!(ids, vec![json!("txn_d"), json!("txn_c")]);
}

#[tokio::test]
async fn test_poll_failure_keeps_stored_cursor() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/organizations/hq/donations"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .mount(&server)
        .await;

    let state = StateManager::in_memory();
    state
        .set_cursor("donation:hq", PollCursor::at("2024-01-01"))
        .await
        .unwrap();

    let poller = IncrementalPoller::new(
        transport(),
        PollerConfig::with_base_url(server.uri()),
        TriggerTarget::new(TriggerResource::Donation, "hq"),
    );
    let err = poller
        .poll_with_state(&state, PollMode::Trigger)
        .await
        .unwrap_err();

    assert!(err.is_transport());
    assert_eq!(
        state.get_cursor("donation:hq").await,
        PollCursor::at("2024-01-01")
    );
}

// ============================================================================
// Configuration Integration Tests
// ============================================================================

#[tokio::test]
async fn test_yaml_config_drives_client_and_fetcher() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/activities"))
        .and(query_param("per_page", "25"))
        .and(header("X-Request-Source", "integration"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-pages", "1")
                .set_body_json(page_of(0, 3)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let yaml = format!(
        r"
base_url: {}
http:
  timeout_secs: 5
  headers:
    X-Request-Source: integration
pagination:
  page_size: 25
  total_pages_header: x-pages
",
        server.uri()
    );
    let config = ConnectorConfig::from_yaml_str(&yaml).unwrap();

    let client = HttpClient::with_config(HttpClientConfig::from(&config.http)).unwrap();
    assert_eq!(client.config().timeout, Duration::from_secs(5));

    let fetcher = PageFetcher::new(Arc::new(client), PaginationConfig::from(&config));
    let endpoint = Resource::Activity.list_endpoint(None).unwrap();
    let items = fetcher
        .fetch_all(&endpoint, &FetchQuery::new())
        .await
        .unwrap();

    assert_eq!(items.len(), 3);
}
