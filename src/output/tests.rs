//! Tests for output module

use super::*;
use pretty_assertions::assert_eq;
use std::path::Path;

#[test]
fn test_target_from_path() {
    assert_eq!(OutputTarget::from_path(None), OutputTarget::Stdout);
    assert_eq!(
        OutputTarget::from_path(Some(Path::new("main.tf"))),
        OutputTarget::File("main.tf".into())
    );
}

#[tokio::test]
async fn test_file_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("main.tf");
    std::fs::write(&path, "old content that is longer").unwrap();

    let target = OutputTarget::File(path.clone());
    write_output(&target, "resource \"a\" \"b\" {}\n").await.unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "resource \"a\" \"b\" {}\n");
}

#[tokio::test]
async fn test_missing_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let target = OutputTarget::File(dir.path().join("missing").join("main.tf"));
    assert!(write_output(&target, "x").await.is_err());
}
