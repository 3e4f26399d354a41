//! Tests for CLI module

use super::*;
use crate::error::Error;
use crate::import::ImportStyle;
use crate::secrets::SecretMode;
use clap::Parser;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test]
fn test_parse_generate() {
    let cli = Cli::try_parse_from([
        "dbtcloud-terraforming",
        "generate",
        "--account",
        "12",
        "--resource-types",
        "dbtcloud_project,dbtcloud_job",
        "--linked-resource-types",
        "all",
        "-p",
        "1,2",
        "--parameterize-jobs",
        "--modern-import-block=false",
    ])
    .unwrap();

    assert_eq!(cli.command, Commands::Generate);
    let settings = cli.settings();
    assert_eq!(settings.account_id.as_deref(), Some("12"));
    assert_eq!(settings.projects, vec![1, 2]);
    assert_eq!(
        settings.resource_types,
        vec!["dbtcloud_project".to_string(), "dbtcloud_job".to_string()]
    );

    let config = settings.run_config().unwrap();
    assert!(config.parameterize_jobs);
    assert_eq!(config.import_style, ImportStyle::Command);
    assert_eq!(config.secret_mode, SecretMode::Variables);
}

#[test]
fn test_parse_secrets_off() {
    let cli = Cli::try_parse_from([
        "dbtcloud-terraforming",
        "--secrets=false",
        "--resource-types",
        "all",
        "genimport",
    ])
    .unwrap();
    assert_eq!(cli.command, Commands::Genimport);
    assert_eq!(
        cli.settings().run_config().unwrap().secret_mode,
        SecretMode::Placeholder
    );
}

#[test]
fn test_unknown_command() {
    assert!(Cli::try_parse_from(["dbtcloud-terraforming", "plan"]).is_err());
}

#[tokio::test]
async fn test_resource_types_command() {
    let cli = Cli::try_parse_from(["dbtcloud-terraforming", "resource-types"]).unwrap();
    let text = Runner::new(cli).execute().await.unwrap();

    assert_eq!(text.lines().count(), 19);
    assert!(text.starts_with("dbtcloud_project\t:id\n"));
    assert!(text.contains("dbtcloud_environment_variable\t:project_id::name\n"));
}

#[tokio::test]
async fn test_import_without_resource_types_fails() {
    let cli = Cli::try_parse_from([
        "dbtcloud-terraforming",
        "import",
        "--account",
        "1",
        "--token",
        "tkn",
    ])
    .unwrap();
    assert!(matches!(
        Runner::new(cli).execute().await,
        Err(Error::InvalidConfigValue { .. })
    ));
}

#[tokio::test]
async fn test_import_command() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/accounts/1/projects/"))
        .and(header("Authorization", "Bearer tkn"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": 7, "name": "Analytics"}],
            "extra": {"pagination": {"count": 1, "total_count": 1}}
        })))
        .mount(&server)
        .await;

    let host_url = format!("{}/api", server.uri());
    let cli = Cli::try_parse_from([
        "dbtcloud-terraforming",
        "import",
        "--account",
        "1",
        "--token",
        "tkn",
        "--host-url",
        host_url.as_str(),
        "--resource-types",
        "dbtcloud_project",
    ])
    .unwrap();

    assert_eq!(
        Runner::new(cli).execute().await.unwrap(),
        "import {\n  to = dbtcloud_project.terraform_managed_resource_7\n  id = \"7\"\n}\n"
    );
}
