//! # Stream Registry
//!
//! The declarative description of every output stream: which fields it has, what
//! they are coerced to, and which of them form the key. The registry is built once
//! at startup and handed to the components that need it.

use crate::clean::{FieldKind, FieldSpec};
use crate::errors::TapError;
use crate::types::StreamId;
use serde_json::{json, Map, Value};

/// A named output stream and its field mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamDefinition {
    pub id: StreamId,
    pub key_properties: Vec<&'static str>,
    pub fields: Vec<FieldSpec>,
}

impl StreamDefinition {
    /// Builds the JSON schema advertised for this stream during discovery.
    pub fn json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|field| {
                let json_type = field.kind.map_or("string", |kind| kind.json_type());
                let mut property = Map::new();
                property.insert(
                    "type".to_string(),
                    if field.nullable {
                        json!(["null", json_type])
                    } else {
                        json!(json_type)
                    },
                );
                if let Some(format) = field.format {
                    property.insert("format".to_string(), json!(format));
                }
                (field.target().to_string(), Value::Object(property))
            })
            .collect();

        json!({
            "type": ["null", "object"],
            "additionalProperties": false,
            "properties": properties,
        })
    }
}

fn string(source: &'static str) -> FieldSpec {
    FieldSpec::new(source).kind(FieldKind::String)
}

fn integer(source: &'static str) -> FieldSpec {
    FieldSpec::new(source).kind(FieldKind::Integer)
}

fn number(source: &'static str) -> FieldSpec {
    FieldSpec::new(source).kind(FieldKind::Number)
}

fn timestamp() -> FieldSpec {
    string("timestamp").format("date-time")
}

fn date() -> FieldSpec {
    string("date").format("date")
}

/// The immutable set of stream definitions.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamRegistry {
    streams: Vec<StreamDefinition>,
}

impl StreamRegistry {
    pub fn new() -> Self {
        let streams = vec![
            StreamDefinition {
                id: StreamId::ActiveVersions,
                key_properties: vec!["plugin", "version", "timestamp"],
                fields: vec![
                    string("version"),
                    number("percentage"),
                    string("plugin"),
                    timestamp(),
                ],
            },
            StreamDefinition {
                id: StreamId::ActiveInstalls,
                key_properties: vec!["plugin", "date"],
                fields: vec![date(), number("percentage"), string("plugin")],
            },
            StreamDefinition {
                id: StreamId::Downloads,
                key_properties: vec!["plugin", "date"],
                fields: vec![date(), integer("downloads"), string("plugin")],
            },
            StreamDefinition {
                id: StreamId::DownloadsSummary,
                key_properties: vec!["plugin", "timestamp"],
                fields: vec![
                    integer("today"),
                    integer("yesterday"),
                    integer("last_week"),
                    integer("all_time"),
                    string("plugin"),
                    timestamp(),
                ],
            },
            StreamDefinition {
                id: StreamId::Info,
                key_properties: vec!["plugin", "timestamp"],
                fields: vec![
                    string("plugin"),
                    timestamp(),
                    integer("active_installs"),
                    integer("downloaded"),
                    string("last_updated"),
                    integer("num_ratings"),
                    integer("rating"),
                    integer("ratings_0"),
                    integer("ratings_1"),
                    integer("ratings_2"),
                    integer("ratings_3"),
                    integer("ratings_4"),
                    integer("ratings_5"),
                    integer("support_threads"),
                    integer("support_threads_resolved"),
                    string("version"),
                ],
            },
        ];
        Self { streams }
    }

    /// Returns the definition for `id`.
    pub fn definition(&self, id: StreamId) -> Result<&StreamDefinition, TapError> {
        self.streams
            .iter()
            .find(|stream| stream.id == id)
            .ok_or_else(|| TapError::UnknownStream(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &StreamDefinition> {
        self.streams.iter()
    }
}

impl Default for StreamRegistry {
    fn default() -> Self {
        Self::new()
    }
}
