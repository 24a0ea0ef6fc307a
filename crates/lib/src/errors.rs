use crate::clean::FieldKind;
use crate::types::StreamId;
use thiserror::Error;

/// Custom error types for the tap.
///
/// Every variant aborts the run: nothing is retried or downgraded to a warning.
#[derive(Error, Debug)]
pub enum TapError {
    /// Transport failure or a non-success status from the WordPress.org API.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A field value could not be coerced to its declared type.
    #[error("Could not convert {value} to {kind}: {reason}")]
    Conversion {
        value: String,
        kind: FieldKind,
        reason: String,
    },

    /// The plugin directory returned no plugin for the requested slug.
    #[error("Plugin not found: {0}")]
    PluginNotFound(String),

    /// The response does not have the shape the stream expects.
    #[error("Unexpected response for stream '{stream}' and plugin '{plugin}': {reason}")]
    MalformedResponse {
        stream: StreamId,
        plugin: String,
        reason: String,
    },

    #[error("Unknown stream: {0}")]
    UnknownStream(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
