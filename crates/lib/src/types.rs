use crate::errors::TapError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// An intermediate, flat row built from a raw API response before cleaning.
pub type Row = Map<String, Value>;

/// A cleaned row, holding exactly one key per field of its stream definition.
pub type Record = Map<String, Value>;

/// The output streams this tap knows how to produce.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum StreamId {
    /// Share of active installs per plugin version.
    ActiveVersions,
    /// Daily growth of active installs.
    ActiveInstalls,
    /// Daily download counts.
    Downloads,
    /// Today / yesterday / last week / all time download totals.
    DownloadsSummary,
    /// Plugin metadata from the plugin directory.
    Info,
}

impl StreamId {
    /// All streams, in discovery order.
    pub const ALL: [StreamId; 5] = [
        StreamId::ActiveVersions,
        StreamId::ActiveInstalls,
        StreamId::Downloads,
        StreamId::DownloadsSummary,
        StreamId::Info,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StreamId::ActiveVersions => "active_versions",
            StreamId::ActiveInstalls => "active_installs",
            StreamId::Downloads => "downloads",
            StreamId::DownloadsSummary => "downloads_summary",
            StreamId::Info => "info",
        }
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StreamId {
    type Err = TapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StreamId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| TapError::UnknownStream(s.to_string()))
    }
}
