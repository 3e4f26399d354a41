//! Tests for the HTTP client module

use super::*;
use crate::error::Error;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpClient {
    let config = HttpClientConfig::builder()
        .base_url(server.uri())
        .bearer_token("test-token")
        .no_rate_limit()
        .build();
    HttpClient::with_config(config).unwrap()
}

// ============================================================================
// Config / Budget Tests
// ============================================================================

#[test]
fn test_config_defaults_to_api_budget() {
    let config = HttpClientConfig::default();
    assert_eq!(config.timeout, Duration::from_secs(60));
    assert_eq!(config.requests_per_minute, Some(3000));
    assert!(config.bearer_token.is_none());

    let client = HttpClient::with_config(config).unwrap();
    assert_eq!(
        client.budget().map(RequestBudget::requests_per_minute),
        Some(DEFAULT_REQUESTS_PER_MINUTE)
    );
}

#[test]
fn test_no_rate_limit() {
    let config = HttpClientConfig::builder()
        .requests_per_minute(10)
        .no_rate_limit()
        .build();
    let client = HttpClient::with_config(config).unwrap();
    assert!(client.budget().is_none());
}

#[test]
fn test_budget_allows_a_minute_of_burst() {
    let budget = RequestBudget::per_minute(5);
    for _ in 0..5 {
        assert!(budget.try_acquire());
    }
    assert!(!budget.try_acquire());
}

#[test]
fn test_zero_budget_is_raised_to_one() {
    let budget = RequestBudget::per_minute(0);
    assert_eq!(budget.requests_per_minute(), 1);
    assert!(budget.try_acquire());
}

#[test]
fn test_resolve() {
    let config = HttpClientConfig::builder()
        .base_url("https://cloud.getdbt.com/api/")
        .build();
    let client = HttpClient::with_config(config).unwrap();

    assert_eq!(
        client.resolve("/v2/accounts/1/projects/"),
        "https://cloud.getdbt.com/api/v2/accounts/1/projects/"
    );
    assert_eq!(
        client.resolve("https://other.example.com/x"),
        "https://other.example.com/x"
    );
}

// ============================================================================
// Request Tests
// ============================================================================

#[tokio::test]
async fn test_get_json_sends_bearer_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/accounts/1/projects/"))
        .and(header("Authorization", "Bearer test-token"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{"id": 1}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let body: serde_json::Value = client.get_json("/v2/accounts/1/projects/").await.unwrap();

    assert_eq!(body["data"][0]["id"], 1);
}

#[tokio::test]
async fn test_requests_take_budget_slots() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/accounts/1/projects/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})))
        .expect(2)
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url(mock_server.uri())
        .requests_per_minute(2)
        .build();
    let client = HttpClient::with_config(config).unwrap();
    for _ in 0..2 {
        let _: serde_json::Value = client.get_json("/v2/accounts/1/projects/").await.unwrap();
    }

    assert!(!client.budget().unwrap().try_acquire());
}

#[tokio::test]
async fn test_non_success_status_is_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid token"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .get_json::<serde_json::Value>("/missing")
        .await
        .unwrap_err();

    match err {
        Error::HttpStatus { status, body, url } => {
            assert_eq!(status, 401);
            assert_eq!(body, "Invalid token");
            assert!(url.ends_with("/missing"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    assert!(client
        .get_json::<serde_json::Value>("/flaky")
        .await
        .is_err());
}

#[tokio::test]
async fn test_invalid_json_body_is_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bad"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result: crate::Result<serde_json::Value> = client.get_json("/bad").await;
    assert!(matches!(result, Err(Error::Http(_))));
}
