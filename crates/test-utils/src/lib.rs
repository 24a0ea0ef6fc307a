//! # Shared Test Utilities
//!
//! Canned WordPress.org API payloads, helpers to serve them from a `wiremock`
//! server, and a message writer that records what a sync emits.

use serde_json::{json, Value};
use std::sync::Once;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};
use wpstats::{Message, MessageWriter, Record, StreamId, TapConfig, TapError};

static INIT: Once = Once::new();

/// Initializes the tracing subscriber once per test binary.
pub fn setup_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

/// A configuration pointing at `server` for `plugins`.
pub fn test_config(server: &MockServer, plugins: &[&str]) -> TapConfig {
    TapConfig::new(plugins.iter().copied()).with_api_url(server.uri())
}

// --- Recording Writer ---

/// Collects every message in memory.
#[derive(Debug, Default, Clone)]
pub struct RecordingWriter {
    pub messages: Vec<Message>,
}

impl RecordingWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the streams a schema was written for, in order.
    pub fn schema_streams(&self) -> Vec<String> {
        self.messages
            .iter()
            .filter_map(|message| match message {
                Message::Schema { stream, .. } => Some(stream.clone()),
                Message::Record { .. } => None,
            })
            .collect()
    }

    /// The records written for `stream`, in order.
    pub fn records(&self, stream: &str) -> Vec<&Record> {
        self.messages
            .iter()
            .filter_map(|message| match message {
                Message::Record {
                    stream: name,
                    record,
                    ..
                } if name == stream => Some(record),
                _ => None,
            })
            .collect()
    }
}

impl MessageWriter for RecordingWriter {
    fn write_message(&mut self, message: &Message) -> Result<(), TapError> {
        self.messages.push(message.clone());
        Ok(())
    }
}

// --- Canned API Payloads ---

pub fn active_versions_body() -> Value {
    json!({ "22.1": 61.234567, "22.0": 20.5, "21.9": 18.265433 })
}

pub fn active_installs_body() -> Value {
    json!({ "2024-05-01": "0.5-", "2024-05-02": "1.25+", "2024-05-03": "2" })
}

pub fn downloads_body() -> Value {
    json!({ "2024-05-01": "1523", "2024-05-02": "1498", "2024-05-03": "0" })
}

pub fn downloads_summary_body() -> Value {
    json!({ "today": "812", "yesterday": "1498", "last_week": "10234", "all_time": "742001" })
}

pub fn info_body(slug: &str) -> Value {
    json!({
        "info": { "page": 1, "pages": 1, "results": 1 },
        "plugins": [{
            "name": "Test Plugin",
            "slug": slug,
            "version": "22.1",
            "rating": 96,
            "ratings": { "5": 25000, "4": 900, "3": 300, "2": 150, "1": 700 },
            "num_ratings": 27050,
            "support_threads": 120,
            "support_threads_resolved": 0,
            "active_installs": 5000000,
            "downloaded": 350000000,
            "last_updated": "2024-05-01 9:12am GMT",
            "tags": { "seo": "SEO" }
        }]
    })
}

// --- Mock API ---

/// The request path (without query) serving `stream`.
pub fn stream_path(stream: StreamId) -> &'static str {
    match stream {
        StreamId::ActiveVersions => "/stats/plugin/1.0/",
        StreamId::ActiveInstalls => "/stats/plugin/1.0/active-installs.php",
        StreamId::Downloads | StreamId::DownloadsSummary => "/stats/plugin/1.0/downloads.php",
        StreamId::Info => "/plugins/info/1.2/",
    }
}

/// A mock matching `stream`'s endpoint for `plugin`.
pub fn stream_mock(stream: StreamId, plugin: &str) -> wiremock::MockBuilder {
    let builder = Mock::given(method("GET")).and(path(stream_path(stream)));
    match stream {
        StreamId::Info => builder.and(query_param("request[search]", plugin)),
        StreamId::DownloadsSummary => builder
            .and(query_param("slug", plugin))
            .and(query_param("historical_summary", "1")),
        StreamId::Downloads => builder
            .and(query_param("slug", plugin))
            .and(query_param_is_missing("historical_summary")),
        _ => builder.and(query_param("slug", plugin)),
    }
}

/// Serves `body` for `stream` and `plugin`, expecting exactly `calls` requests.
pub async fn mount_stream(
    server: &MockServer,
    stream: StreamId,
    plugin: &str,
    body: Value,
    calls: u64,
) {
    stream_mock(stream, plugin)
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(calls)
        .mount(server)
        .await;
}

/// Serves the canned payload of every stream for `plugin`, once each.
pub async fn mount_all_streams(server: &MockServer, plugin: &str) {
    mount_stream(server, StreamId::ActiveVersions, plugin, active_versions_body(), 1).await;
    mount_stream(server, StreamId::ActiveInstalls, plugin, active_installs_body(), 1).await;
    mount_stream(server, StreamId::DownloadsSummary, plugin, downloads_summary_body(), 1).await;
    mount_stream(server, StreamId::Downloads, plugin, downloads_body(), 1).await;
    mount_stream(server, StreamId::Info, plugin, info_body(plugin), 1).await;
}
