//! # Catalog
//!
//! Discovery builds a Singer catalog from the [`StreamRegistry`]. In sync mode a
//! catalog (discovered, or loaded from a file) decides which streams are synced:
//! a stream is selected when its top-level metadata or its schema carries
//! `"selected": true`.

use crate::errors::TapError;
use crate::streams::{StreamDefinition, StreamRegistry};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub streams: Vec<CatalogEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub tap_stream_id: String,
    pub stream: String,
    #[serde(default)]
    pub key_properties: Vec<String>,
    pub schema: Value,
    #[serde(default)]
    pub metadata: Vec<MetadataEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub breadcrumb: Vec<String>,
    pub metadata: Map<String, Value>,
}

impl CatalogEntry {
    fn from_definition(definition: &StreamDefinition) -> Self {
        let name = definition.id.to_string();
        let key_properties: Vec<String> = definition
            .key_properties
            .iter()
            .map(|key| key.to_string())
            .collect();

        let mut metadata = vec![MetadataEntry {
            breadcrumb: Vec::new(),
            metadata: json_object(json!({
                "selected": true,
                "inclusion": "available",
                "table-key-properties": key_properties,
            })),
        }];
        metadata.extend(definition.fields.iter().map(|field| {
            let inclusion = if definition.key_properties.contains(&field.target()) {
                "automatic"
            } else {
                "available"
            };
            MetadataEntry {
                breadcrumb: vec!["properties".to_string(), field.target().to_string()],
                metadata: json_object(json!({ "inclusion": inclusion })),
            }
        }));

        Self {
            tap_stream_id: name.clone(),
            stream: name,
            key_properties,
            schema: definition.json_schema(),
            metadata,
        }
    }

    /// Whether the stream is selected for sync.
    ///
    /// Either the top-level metadata or a legacy `"selected"` flag on the schema
    /// selects the stream.
    pub fn is_selected(&self) -> bool {
        let metadata_selected = self
            .metadata
            .iter()
            .find(|entry| entry.breadcrumb.is_empty())
            .and_then(|entry| entry.metadata.get("selected"))
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let schema_selected = self
            .schema
            .get("selected")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        metadata_selected || schema_selected
    }
}

fn json_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

impl Catalog {
    /// Builds the catalog advertised in discovery mode. Every stream is selected.
    pub fn discover(registry: &StreamRegistry) -> Self {
        info!("Discover");
        let streams = registry.iter().map(CatalogEntry::from_definition).collect();
        Self { streams }
    }

    /// Loads a catalog file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TapError> {
        let path = path.as_ref();
        debug!("Loading catalog from: {}", path.display());
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn selected_streams(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.streams.iter().filter(|entry| entry.is_selected())
    }

    pub fn get(&self, tap_stream_id: &str) -> Option<&CatalogEntry> {
        self.streams
            .iter()
            .find(|entry| entry.tap_stream_id == tap_stream_id)
    }
}
