#![allow(clippy::unwrap_used)]
//! YAML configuration flowing through a whole conversion.

#[path = "helpers/mod.rs"]
mod helpers;

use std::io::Write;

use helpers::fixtures;
use snapinator::{ConvertConfig, ConvertError, ReadOptions, Snapinator, WorkspaceScale};

fn write_config(yaml: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_loaded_config_drives_conversion() {
    let file = write_config("app_name: Classroom\nworkspace_scale:\n  x: 1.0\n  y: 1.0\n");
    let config = ConvertConfig::load(file.path()).unwrap();
    assert_eq!(config.workspace_scale, WorkspaceScale { x: 1.0, y: 1.0 });

    let xml = Snapinator::new(config)
        .convert("game", &fixtures::sb3_archive(), ReadOptions::default())
        .await
        .unwrap();
    assert!(xml.starts_with(r#"<project name="game" app="Classroom""#));
    // Unscaled workspace coordinates.
    assert!(xml.contains(r#"<script x="48" y="90">"#));
}

#[test]
fn test_unknown_key_is_rejected() {
    let file = write_config("asset_server: http://localhost\n");
    let err = ConvertConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, ConvertError::Config(_)));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ConvertConfig::load(&dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, ConvertError::Io(_)));
}
