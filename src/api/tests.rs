//! Tests for the API module

use super::*;
use crate::http::{HttpClient, HttpClientConfig};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> DbtCloudClient {
    let http = HttpClient::with_config(
        HttpClientConfig::builder()
            .bearer_token("tkn")
            .no_rate_limit()
            .build(),
    )
    .unwrap();
    DbtCloudClient::with_http(http, &format!("{}/api", server.uri()), "1")
}

fn list(data: serde_json::Value) -> ResponseTemplate {
    let count = data.as_array().map_or(0, Vec::len);
    ResponseTemplate::new(200).set_body_json(json!({
        "data": data,
        "extra": {"pagination": {"count": count, "total_count": count}}
    }))
}

#[test]
fn test_project_filter() {
    let all = ProjectFilter::all();
    assert!(all.is_all());
    assert!(all.allows(99));

    let some = ProjectFilter::new([1, 2]);
    assert!(some.allows(2));
    assert!(!some.allows(3));

    let kept = some
        .retain(vec![
            json!({"id": 10, "project_id": 1}),
            json!({"id": 11, "project_id": 3}),
            json!({"id": 12}),
        ])
        .unwrap();
    assert_eq!(kept, vec![json!({"id": 10, "project_id": 1})]);
}

#[test]
fn test_connection_family() {
    assert_eq!(
        connection_family(&json!({"type": "snowflake"})).unwrap(),
        "snowflake"
    );
    let adapter = json!({
        "type": "adapter",
        "details": {"connection_details": {"fields": {"type": {"value": "databricks"}}}}
    });
    assert_eq!(connection_family(&adapter).unwrap(), "adapter/databricks");

    let broken = json!({"type": "adapter", "details": {}});
    assert!(connection_family(&broken).is_err());
}

#[test]
fn test_new_validates_inputs() {
    assert!(DbtCloudClient::new("not a url", "t", "1").is_err());
    assert!(DbtCloudClient::new(DEFAULT_HOST_URL, "t", "").is_err());

    let client = DbtCloudClient::new(DEFAULT_HOST_URL, "t", "42").unwrap();
    assert_eq!(client.account_id(), "42");
    assert_eq!(client.deploy_url(), "https://cloud.getdbt.com");
}

#[tokio::test]
async fn test_projects_filtered_and_authenticated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/accounts/1/projects/"))
        .and(header("Authorization", "Bearer tkn"))
        .respond_with(list(json!([{"id": 1}, {"id": 2}, {"id": 3}])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let projects = client.projects(&ProjectFilter::new([2])).await.unwrap();
    assert_eq!(projects, vec![json!({"id": 2})]);
}

#[tokio::test]
async fn test_credentials_skip_unknown_projects() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/accounts/1/projects/"))
        .respond_with(list(json!([{"id": 1}])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/accounts/1/credentials/"))
        .respond_with(list(json!([
            {"id": 5, "project_id": 1, "type": "snowflake"},
            {"id": 6, "project_id": 404, "type": "snowflake"}
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let credentials = client.credentials(&ProjectFilter::all()).await.unwrap();
    assert_eq!(credentials.len(), 1);
    assert_eq!(credentials[0]["id"], 5);
}

#[tokio::test]
async fn test_active_connections_by_family() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/accounts/1/projects/"))
        .respond_with(list(json!([
            {"id": 1, "connection": {"id": 10, "type": "snowflake"}},
            {"id": 2, "connection": {"id": 20, "type": "bigquery"}},
            {"id": 3, "connection": null}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/accounts/1/projects/1/connections/10/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": {"id": 10, "project_id": 1, "type": "snowflake"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let connections = client
        .active_connections(&ProjectFilter::all(), &["snowflake", "postgres"])
        .await
        .unwrap();
    assert_eq!(connections.len(), 1);
    assert_eq!(connections[0]["id"], 10);
}

#[tokio::test]
async fn test_environment_variables_returns_variables() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(
            "/api/v3/accounts/1/projects/7/environment-variables/environment/",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "environments": ["project", "Prod"],
                "variables": {"DBT_X": {"project": {"id": 1, "value": "a"}}}
            }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let vars = client.environment_variables(7).await.unwrap();
    assert_eq!(vars["DBT_X"]["project"]["value"], "a");
}

#[tokio::test]
async fn test_global_connections_fetch_details() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/accounts/1/connections/"))
        .respond_with(list(json!([{"id": 3, "name": "wh"}])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/accounts/1/connections/3/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"id": 3, "name": "wh", "adapter_version": "snowflake_v0", "config": {"account": "acme"}}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let connections = client.global_connections().await.unwrap();
    assert_eq!(connections[0]["config"]["account"], "acme");
}
