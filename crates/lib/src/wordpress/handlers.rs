//! # Stream Handlers
//!
//! One [`StreamHandler`] per output stream. A handler knows which endpoint serves
//! its stream, how to split a raw response into intermediate rows, and which
//! stream-specific fix-ups to apply before the generic [`clean_row`] pass.

use crate::clean::{clean_row, display_value, format_float, round_to, timestamp_now, FieldKind};
use crate::errors::TapError;
use crate::streams::{StreamDefinition, StreamRegistry};
use crate::types::{Record, Row, StreamId};
use crate::wordpress::endpoints;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Plugin fields hoisted from the first `plugins` entry of the info response.
const INFO_FIELDS: [&str; 8] = [
    "active_installs",
    "downloaded",
    "last_updated",
    "num_ratings",
    "rating",
    "support_threads",
    "support_threads_resolved",
    "version",
];

/// Fetch-and-shape behaviour of a single output stream.
pub trait StreamHandler: Send + Sync {
    fn definition(&self) -> &StreamDefinition;

    fn stream(&self) -> StreamId {
        self.definition().id
    }

    /// The endpoint path for `plugin`.
    fn path(&self, plugin: &str, limit: u32) -> String {
        endpoints::render(endpoints::template(self.stream()), plugin, limit)
    }

    /// Splits a raw response into intermediate rows.
    fn rows(&self, plugin: &str, raw: Value) -> Result<Vec<Row>, TapError>;

    /// Applies the stream's fix-ups and cleans the row against its definition.
    fn clean(&self, row: Row) -> Result<Record, TapError> {
        clean_row(&row, &self.definition().fields)
    }
}

/// Ensures the raw response is a JSON object.
fn expect_object(
    stream: StreamId,
    plugin: &str,
    raw: Value,
) -> Result<Map<String, Value>, TapError> {
    match raw {
        Value::Object(map) => Ok(map),
        other => Err(TapError::MalformedResponse {
            stream,
            plugin: plugin.to_string(),
            reason: format!("expected a JSON object, got {other}"),
        }),
    }
}

/// Turns a `key -> value` mapping into one row per entry.
fn entries_to_rows(
    stream: StreamId,
    plugin: &str,
    raw: Value,
    key_field: &str,
    value_field: &str,
    shape_value: impl Fn(Value) -> Value,
) -> Result<Vec<Row>, TapError> {
    let entries = expect_object(stream, plugin, raw)?;
    Ok(entries
        .into_iter()
        .map(|(key, value)| {
            let mut row = Row::new();
            row.insert(key_field.to_string(), Value::String(key));
            row.insert(value_field.to_string(), shape_value(value));
            row.insert("plugin".to_string(), Value::String(plugin.to_string()));
            row
        })
        .collect())
}

/// Rounds an active version share to four decimals and renders it as text,
/// e.g. `12.345678` becomes `"12.3457"`.
pub fn normalize_version_percentage(value: &Value) -> Result<String, TapError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|f| f.is_finite())
    .ok_or_else(|| TapError::Conversion {
        value: display_value(value),
        kind: FieldKind::Number,
        reason: "not a number".to_string(),
    })?;
    Ok(format_float(round_to(parsed, 4)))
}

/// Strips the trend markers the active installs endpoint appends to its values:
/// trailing `-` characters first, then trailing `+` characters.
pub fn normalize_install_percentage(value: &str) -> &str {
    value.trim_end_matches('-').trim_end_matches('+')
}

fn stamp(row: &mut Row) {
    row.insert("timestamp".to_string(), Value::String(timestamp_now()));
}

pub struct ActiveVersionsHandler {
    definition: StreamDefinition,
}

impl StreamHandler for ActiveVersionsHandler {
    fn definition(&self) -> &StreamDefinition {
        &self.definition
    }

    fn rows(&self, plugin: &str, raw: Value) -> Result<Vec<Row>, TapError> {
        entries_to_rows(self.stream(), plugin, raw, "version", "percentage", |v| v)
    }

    fn clean(&self, mut row: Row) -> Result<Record, TapError> {
        stamp(&mut row);
        let percentage = row.get("percentage").cloned().unwrap_or(Value::Null);
        row.insert(
            "percentage".to_string(),
            Value::String(normalize_version_percentage(&percentage)?),
        );
        clean_row(&row, &self.definition.fields)
    }
}

pub struct ActiveInstallsHandler {
    definition: StreamDefinition,
}

impl StreamHandler for ActiveInstallsHandler {
    fn definition(&self) -> &StreamDefinition {
        &self.definition
    }

    fn rows(&self, plugin: &str, raw: Value) -> Result<Vec<Row>, TapError> {
        entries_to_rows(self.stream(), plugin, raw, "date", "percentage", |v| {
            Value::String(display_value(&v))
        })
    }

    fn clean(&self, mut row: Row) -> Result<Record, TapError> {
        if let Some(Value::String(percentage)) = row.get("percentage") {
            let normalized = normalize_install_percentage(percentage).to_string();
            row.insert("percentage".to_string(), Value::String(normalized));
        }
        clean_row(&row, &self.definition.fields)
    }
}

pub struct DownloadsHandler {
    definition: StreamDefinition,
}

impl StreamHandler for DownloadsHandler {
    fn definition(&self) -> &StreamDefinition {
        &self.definition
    }

    fn rows(&self, plugin: &str, raw: Value) -> Result<Vec<Row>, TapError> {
        entries_to_rows(self.stream(), plugin, raw, "date", "downloads", |v| v)
    }
}

pub struct DownloadsSummaryHandler {
    definition: StreamDefinition,
}

impl StreamHandler for DownloadsSummaryHandler {
    fn definition(&self) -> &StreamDefinition {
        &self.definition
    }

    fn rows(&self, plugin: &str, raw: Value) -> Result<Vec<Row>, TapError> {
        let mut row = expect_object(self.stream(), plugin, raw)?;
        row.insert("plugin".to_string(), Value::String(plugin.to_string()));
        Ok(vec![row])
    }

    fn clean(&self, mut row: Row) -> Result<Record, TapError> {
        stamp(&mut row);
        clean_row(&row, &self.definition.fields)
    }
}

pub struct InfoHandler {
    definition: StreamDefinition,
}

impl InfoHandler {
    /// Copies the metadata of the first plugin in the `plugins` list onto the row.
    fn hoist_plugin_data(row: &mut Row) -> Result<(), TapError> {
        let plugin = row
            .get("plugin")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let plugins = row
            .get("plugins")
            .and_then(Value::as_array)
            .ok_or_else(|| TapError::MalformedResponse {
                stream: StreamId::Info,
                plugin: plugin.clone(),
                reason: "response has no `plugins` list".to_string(),
            })?;
        let data = plugins
            .first()
            .cloned()
            .ok_or_else(|| TapError::PluginNotFound(plugin.clone()))?;

        for field in INFO_FIELDS {
            let value = data.get(field).cloned().unwrap_or(Value::Null);
            row.insert(field.to_string(), value);
        }
        let ratings = data.get("ratings");
        for stars in 0..=5 {
            let value = ratings
                .and_then(|r| r.get(stars.to_string().as_str()))
                .cloned()
                .unwrap_or(Value::Null);
            row.insert(format!("ratings_{stars}"), value);
        }
        Ok(())
    }
}

impl StreamHandler for InfoHandler {
    fn definition(&self) -> &StreamDefinition {
        &self.definition
    }

    fn rows(&self, plugin: &str, raw: Value) -> Result<Vec<Row>, TapError> {
        let mut row = expect_object(self.stream(), plugin, raw)?;
        row.insert("plugin".to_string(), Value::String(plugin.to_string()));
        Ok(vec![row])
    }

    fn clean(&self, mut row: Row) -> Result<Record, TapError> {
        stamp(&mut row);
        Self::hoist_plugin_data(&mut row)?;
        clean_row(&row, &self.definition.fields)
    }
}

/// Resolves a [`StreamId`] to its handler. Built once per run.
pub struct HandlerRegistry {
    handlers: HashMap<StreamId, Box<dyn StreamHandler>>,
}

impl HandlerRegistry {
    pub fn new(streams: &StreamRegistry) -> Self {
        let handlers = streams
            .iter()
            .map(|definition| {
                let definition = definition.clone();
                let handler: Box<dyn StreamHandler> = match definition.id {
                    StreamId::ActiveVersions => Box::new(ActiveVersionsHandler { definition }),
                    StreamId::ActiveInstalls => Box::new(ActiveInstallsHandler { definition }),
                    StreamId::Downloads => Box::new(DownloadsHandler { definition }),
                    StreamId::DownloadsSummary => {
                        Box::new(DownloadsSummaryHandler { definition })
                    }
                    StreamId::Info => Box::new(InfoHandler { definition }),
                };
                (handler.stream(), handler)
            })
            .collect();
        Self { handlers }
    }

    pub fn get(&self, id: StreamId) -> Result<&dyn StreamHandler, TapError> {
        self.handlers
            .get(&id)
            .map(|handler| handler.as_ref())
            .ok_or_else(|| TapError::UnknownStream(id.to_string()))
    }
}
