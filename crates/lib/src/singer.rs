//! # Singer Messages
//!
//! The two Singer message types this tap emits, and the writer that frames them
//! as JSON lines.

use crate::errors::TapError;
use crate::types::Record;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{self, Stdout, Write};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    Schema {
        stream: String,
        schema: Value,
        key_properties: Vec<String>,
    },
    Record {
        stream: String,
        record: Record,
        time_extracted: String,
    },
}

impl Message {
    pub fn schema(stream: &str, schema: Value, key_properties: Vec<String>) -> Self {
        Message::Schema {
            stream: stream.to_string(),
            schema,
            key_properties,
        }
    }

    pub fn record(stream: &str, record: Record, time_extracted: DateTime<Utc>) -> Self {
        Message::Record {
            stream: stream.to_string(),
            record,
            time_extracted: time_extracted
                .format("%Y-%m-%dT%H:%M:%S%.6fZ")
                .to_string(),
        }
    }

    pub fn stream(&self) -> &str {
        match self {
            Message::Schema { stream, .. } | Message::Record { stream, .. } => stream,
        }
    }
}

/// Destination for Singer messages.
pub trait MessageWriter {
    fn write_message(&mut self, message: &Message) -> Result<(), TapError>;
}

/// Writes each message as one line of JSON and flushes after every message.
pub struct JsonLinesWriter<W: Write> {
    inner: W,
}

impl JsonLinesWriter<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> JsonLinesWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> MessageWriter for JsonLinesWriter<W> {
    fn write_message(&mut self, message: &Message) -> Result<(), TapError> {
        serde_json::to_writer(&mut self.inner, message)?;
        self.inner.write_all(b"\n")?;
        self.inner.flush()?;
        Ok(())
    }
}
