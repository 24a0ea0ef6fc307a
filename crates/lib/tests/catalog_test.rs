//! # Discovery, Catalog and Configuration Tests

use anyhow::Result;
use serde_json::json;
use std::fs;
use tempfile::tempdir;
use wpstats::{Catalog, StreamId, StreamRegistry, TapConfig, TapError};

#[test]
fn test_discover_lists_every_stream_selected() {
    let catalog = Catalog::discover(&StreamRegistry::new());

    let ids: Vec<&str> = catalog
        .streams
        .iter()
        .map(|entry| entry.tap_stream_id.as_str())
        .collect();
    assert_eq!(
        ids,
        vec!["active_versions", "active_installs", "downloads", "downloads_summary", "info"]
    );
    assert_eq!(catalog.selected_streams().count(), 5);
}

#[test]
fn test_discovered_schema_types_follow_field_kinds() {
    let catalog = Catalog::discover(&StreamRegistry::new());
    let info = catalog.get("info").unwrap();

    let properties = &info.schema["properties"];
    assert_eq!(properties["rating"]["type"], json!(["null", "integer"]));
    assert_eq!(properties["version"]["type"], json!(["null", "string"]));
    assert_eq!(properties["timestamp"]["format"], json!("date-time"));
    assert_eq!(properties.as_object().unwrap().len(), 16);
    assert_eq!(info.key_properties, vec!["plugin", "timestamp"]);
}

#[test]
fn test_key_properties_are_automatic() {
    let catalog = Catalog::discover(&StreamRegistry::new());
    let downloads = catalog.get("downloads").unwrap();

    let inclusion = |name: &str| {
        downloads
            .metadata
            .iter()
            .find(|entry| entry.breadcrumb == vec!["properties".to_string(), name.to_string()])
            .and_then(|entry| entry.metadata.get("inclusion").cloned())
    };
    assert_eq!(inclusion("date"), Some(json!("automatic")));
    assert_eq!(inclusion("downloads"), Some(json!("available")));
}

#[test]
fn test_catalog_file_controls_selection() -> Result<()> {
    // --- Arrange ---
    let mut catalog = Catalog::discover(&StreamRegistry::new());
    for entry in catalog.streams.iter_mut() {
        if entry.tap_stream_id != "downloads" {
            entry.metadata[0]
                .metadata
                .insert("selected".to_string(), json!(false));
        }
    }
    let dir = tempdir()?;
    let path = dir.path().join("catalog.json");
    fs::write(&path, serde_json::to_string(&catalog)?)?;

    // --- Act ---
    let loaded = Catalog::from_path(&path)?;

    // --- Assert ---
    let selected: Vec<&str> = loaded
        .selected_streams()
        .map(|entry| entry.tap_stream_id.as_str())
        .collect();
    assert_eq!(selected, vec!["downloads"]);
    Ok(())
}

/// Streams without metadata fall back to a `selected` flag on the schema.
#[test]
fn test_legacy_schema_selection() -> Result<()> {
    let catalog: Catalog = serde_json::from_value(json!({
        "streams": [
            { "tap_stream_id": "info", "stream": "info", "schema": { "selected": true } },
            { "tap_stream_id": "downloads", "stream": "downloads", "schema": {} }
        ]
    }))?;
    let selected: Vec<&str> = catalog
        .selected_streams()
        .map(|entry| entry.tap_stream_id.as_str())
        .collect();
    assert_eq!(selected, vec!["info"]);
    Ok(())
}

/// A legacy schema flag still selects a stream whose metadata says otherwise.
#[test]
fn test_metadata_and_schema_selection_are_combined() -> Result<()> {
    let catalog: Catalog = serde_json::from_value(json!({
        "streams": [
            {
                "tap_stream_id": "info",
                "stream": "info",
                "schema": { "selected": true },
                "metadata": [{ "breadcrumb": [], "metadata": { "selected": false } }]
            },
            {
                "tap_stream_id": "downloads",
                "stream": "downloads",
                "schema": { "selected": false },
                "metadata": [{ "breadcrumb": [], "metadata": { "selected": true } }]
            },
            {
                "tap_stream_id": "active_versions",
                "stream": "active_versions",
                "schema": {},
                "metadata": [{ "breadcrumb": [], "metadata": { "selected": false } }]
            }
        ]
    }))?;
    let selected: Vec<&str> = catalog
        .selected_streams()
        .map(|entry| entry.tap_stream_id.as_str())
        .collect();
    assert_eq!(selected, vec!["info", "downloads"]);
    Ok(())
}

#[test]
fn test_stream_ids_round_trip_through_names() {
    for id in StreamId::ALL {
        assert_eq!(id.to_string().parse::<StreamId>().unwrap(), id);
    }
    assert!(matches!(
        "mysql".parse::<StreamId>(),
        Err(TapError::UnknownStream(name)) if name == "mysql"
    ));
}

#[test]
fn test_registry_definitions() {
    let registry = StreamRegistry::new();
    let summary = registry.definition(StreamId::DownloadsSummary).unwrap();
    let targets: Vec<&str> = summary.fields.iter().map(|field| field.target()).collect();
    assert_eq!(
        targets,
        vec!["today", "yesterday", "last_week", "all_time", "plugin", "timestamp"]
    );
}

// --- Configuration ---

#[test]
fn test_config_accepts_a_single_plugin() -> Result<()> {
    let config = TapConfig::from_json(r#"{ "plugins": "wordpress-seo" }"#)?;
    assert_eq!(config.plugins, vec!["wordpress-seo"]);
    assert_eq!(config.limit, 730);
    assert_eq!(config.api_url, "https://api.wordpress.org");
    Ok(())
}

#[test]
fn test_config_accepts_a_plugin_list_and_overrides() -> Result<()> {
    let config = TapConfig::from_json(
        r#"{ "plugins": ["wordpress-seo", "akismet"], "limit": 30, "api_url": "http://localhost:8080" }"#,
    )?;
    assert_eq!(config.plugins, vec!["wordpress-seo", "akismet"]);
    assert_eq!(config.limit, 30);
    assert_eq!(config.api_url, "http://localhost:8080");
    Ok(())
}

#[test]
fn test_config_rejects_missing_or_empty_plugins() {
    assert!(matches!(TapConfig::from_json("{}"), Err(TapError::Config(_))));
    assert!(matches!(
        TapConfig::from_json(r#"{ "plugins": [] }"#),
        Err(TapError::Config(_))
    ));
    assert!(matches!(
        TapConfig::from_json(r#"{ "plugins": [" "] }"#),
        Err(TapError::Config(_))
    ));
}

#[test]
fn test_config_from_path() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{ "plugins": ["akismet"] }"#)?;

    let config = TapConfig::from_path(&path)?;
    assert_eq!(config, TapConfig::new(["akismet"]));

    let missing = TapConfig::from_path(dir.path().join("nope.json"));
    assert!(matches!(missing, Err(TapError::Io(_))));
    Ok(())
}
