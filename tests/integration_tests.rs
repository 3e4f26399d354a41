//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: command line → dbt Cloud API → HCL output

use clap::Parser;
use dbtcloud_terraforming::cli::{Cli, Runner};
use dbtcloud_terraforming::Error;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn page(data: serde_json::Value, total_count: usize) -> ResponseTemplate {
    let count = data.as_array().map_or(0, Vec::len);
    ResponseTemplate::new(200).set_body_json(json!({
        "data": data,
        "extra": {"pagination": {"count": count, "total_count": total_count}}
    }))
}

fn schema_file() -> NamedTempFile {
    let schema = json!({
        "format_version": "1.0",
        "provider_schemas": {
            "registry.terraform.io/dbt-labs/dbtcloud": {
                "resource_schemas": {
                    "dbtcloud_project": {
                        "version": 0,
                        "block": {
                            "attributes": {
                                "id": {"type": "string", "computed": true},
                                "name": {"type": "string", "required": true},
                                "description": {"type": "string", "optional": true}
                            }
                        }
                    },
                    "dbtcloud_environment": {
                        "version": 0,
                        "block": {
                            "attributes": {
                                "id": {"type": "string", "computed": true},
                                "environment_id": {"type": "number", "computed": true},
                                "project_id": {"type": "number", "required": true},
                                "name": {"type": "string", "required": true},
                                "type": {"type": "string", "required": true},
                                "credential_id": {"type": "number", "optional": true}
                            }
                        }
                    },
                    "dbtcloud_snowflake_credential": {
                        "version": 0,
                        "block": {
                            "attributes": {
                                "id": {"type": "string", "computed": true},
                                "credential_id": {"type": "number", "computed": true},
                                "project_id": {"type": "number", "required": true},
                                "auth_type": {"type": "string", "required": true},
                                "user": {"type": "string", "optional": true},
                                "password": {"type": "string", "optional": true, "sensitive": true},
                                "schema": {"type": "string", "required": true},
                                "num_threads": {"type": "number", "required": true}
                            }
                        }
                    }
                }
            }
        }
    });

    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{schema}").unwrap();
    file
}

async fn mount_account(server: &MockServer) {
    // second page of projects, requested with the offset of the first
    Mock::given(method("GET"))
        .and(path("/api/v2/accounts/1/projects/"))
        .and(query_param("offset", "1"))
        .respond_with(page(json!([{"id": 2, "name": "Marketing"}]), 2))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v2/accounts/1/projects/"))
        .respond_with(page(json!([{"id": 1, "name": "Analytics", "description": ""}]), 2))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v3/accounts/1/environments/"))
        .respond_with(page(
            json!([{
                "id": 20,
                "project_id": 1,
                "name": "Prod",
                "type": "deployment",
                "credentials_id": 42,
                "credentials": {"id": 42, "type": "snowflake"}
            }]),
            1,
        ))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v3/accounts/1/credentials/"))
        .respond_with(page(
            json!([{
                "id": 42,
                "project_id": 1,
                "type": "snowflake",
                "auth_type": "password",
                "user": "dbt",
                "schema": "analytics",
                "threads": 4
            }]),
            1,
        ))
        .mount(server)
        .await;
}

fn cli(server: &MockServer, schema: &NamedTempFile, extra: &[&str]) -> Cli {
    let host_url = format!("{}/api", server.uri());
    let schema_path = schema.path().to_string_lossy().to_string();
    let mut args = vec![
        "dbtcloud-terraforming".to_string(),
        "--account".to_string(),
        "1".to_string(),
        "--token".to_string(),
        "tkn".to_string(),
        "--host-url".to_string(),
        host_url,
        "--schema-file".to_string(),
        schema_path,
        "--resource-types".to_string(),
        "dbtcloud_project,dbtcloud_snowflake_credential,dbtcloud_environment".to_string(),
    ];
    args.extend(extra.iter().map(ToString::to_string));
    Cli::try_parse_from(args).unwrap()
}

// ============================================================================
// End-to-end Tests
// ============================================================================

#[tokio::test]
async fn test_genimport_linked_account() {
    let server = MockServer::start().await;
    mount_account(&server).await;
    let schema = schema_file();

    let cli = cli(
        &server,
        &schema,
        &[
            "--linked-resource-types",
            "dbtcloud_project,dbtcloud_snowflake_credential",
            "genimport",
        ],
    );
    let output = Runner::new(cli).execute().await.unwrap();

    assert!(output.starts_with(
        "resource \"dbtcloud_project\" \"terraform_managed_resource_1\" {\n  name = \"Analytics\"\n}\n\n\
         resource \"dbtcloud_project\" \"terraform_managed_resource_2\" {\n  name = \"Marketing\"\n}\n"
    ));
    assert!(output.contains(
        r#"resource "dbtcloud_snowflake_credential" "terraform_managed_resource_42" {
  auth_type = "password"
  num_threads = 4
  password = var.dbtcloud_snowflake_credential_password_42
  project_id = dbtcloud_project.terraform_managed_resource_1.id
  schema = "analytics"
  user = "dbt"
}"#
    ));
    assert!(output.contains(
        r#"resource "dbtcloud_environment" "terraform_managed_resource_20" {
  credential_id = dbtcloud_snowflake_credential.terraform_managed_resource_42.credential_id
  name = "Prod"
  project_id = dbtcloud_project.terraform_managed_resource_1.id
  type = "deployment"
}"#
    ));
    assert!(output.contains("variable \"dbtcloud_snowflake_credential_password_42\" {\n  type = string\n"));
    assert!(output.contains("# dbtcloud_snowflake_credential_password_42 = \"\"\n"));
    assert!(output.contains(
        "import {\n  to = dbtcloud_environment.terraform_managed_resource_20\n  id = \"1:20\"\n}\n"
    ));

    // the whole document is valid HCL: 4 resources, 1 variable, 4 imports
    let body = hcl::parse(&output).unwrap();
    assert_eq!(body.into_blocks().count(), 9);
}

#[tokio::test]
async fn test_placeholder_secrets_and_commands_to_file() {
    let server = MockServer::start().await;
    mount_account(&server).await;
    let schema = schema_file();
    let dir = tempfile::tempdir().unwrap();
    let output_path = dir.path().join("main.tf");
    let output_arg = output_path.to_string_lossy().to_string();

    let cli = cli(
        &server,
        &schema,
        &[
            "--secrets=false",
            "--modern-import-block=false",
            "--output",
            output_arg.as_str(),
            "genimport",
        ],
    );
    Runner::new(cli).run().await.unwrap();

    let output = std::fs::read_to_string(&output_path).unwrap();
    assert!(output.contains("  password = \"---TBD---\"\n"));
    assert!(!output.contains("variable "));
    // no linking requested, ids stay literal
    assert!(output.contains("  credential_id = 42\n"));
    assert!(output.ends_with(
        "terraform import dbtcloud_snowflake_credential.terraform_managed_resource_42 42\n\
         terraform import dbtcloud_environment.terraform_managed_resource_20 1:20\n"
    ));
}

#[tokio::test]
async fn test_settings_file_fills_missing_flags() {
    let server = MockServer::start().await;
    mount_account(&server).await;

    let mut settings = NamedTempFile::new().unwrap();
    writeln!(
        settings,
        "account_id: 1\ntoken: tkn\nhost_url: \"{}/api\"\nresource_types: [dbtcloud_project]\nprojects: [2]",
        server.uri()
    )
    .unwrap();
    let settings_path = settings.path().to_string_lossy().to_string();

    let cli = Cli::try_parse_from([
        "dbtcloud-terraforming",
        "--config",
        settings_path.as_str(),
        "--modern-import-block=false",
        "import",
    ])
    .unwrap();
    let output = Runner::new(cli).execute().await.unwrap();

    assert_eq!(
        output,
        "terraform import dbtcloud_project.terraform_managed_resource_2 2\n"
    );
}

#[tokio::test]
async fn test_api_failure_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;
    let schema = schema_file();

    let cli = cli(&server, &schema, &["generate"]);
    let err = Runner::new(cli).execute().await.unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 403, .. }));
}

#[tokio::test]
async fn test_missing_schema_file() {
    let cli = Cli::try_parse_from([
        "dbtcloud-terraforming",
        "--account",
        "1",
        "--token",
        "tkn",
        "--host-url",
        "https://cloud.getdbt.com/api",
        "--resource-types",
        "all",
        "--schema-file",
        "/nonexistent/schema.json",
        "generate",
    ])
    .unwrap();

    assert!(matches!(
        Runner::new(cli).execute().await,
        Err(Error::FileNotFound { .. })
    ));
}
