//! # Tap Configuration
//!
//! The configuration is a JSON file passed on the command line. Only `plugins` is
//! required; it may be a single slug or a list of slugs.
//!
//! ```json
//! { "plugins": ["wordpress-seo", "akismet"], "limit": 365 }
//! ```

use crate::errors::TapError;
use crate::wordpress::client::DEFAULT_USER_AGENT;
use crate::wordpress::endpoints::{API_BASE_URL, DEFAULT_LIMIT};
use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TapConfig {
    /// Plugin slugs to fetch statistics for.
    #[serde(deserialize_with = "one_or_many")]
    pub plugins: Vec<String>,
    /// Number of days of history requested from the history endpoints.
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Base URL of the API host.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// `User-Agent` header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

fn default_api_url() -> String {
    API_BASE_URL.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(plugin) => vec![plugin],
        OneOrMany::Many(plugins) => plugins,
    })
}

impl TapConfig {
    /// Creates a configuration for `plugins` with every other setting at its default.
    pub fn new<I, S>(plugins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            plugins: plugins.into_iter().map(Into::into).collect(),
            limit: DEFAULT_LIMIT,
            api_url: default_api_url(),
            user_agent: default_user_agent(),
        }
    }

    pub fn with_api_url(self, api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..self
        }
    }

    pub fn with_limit(self, limit: u32) -> Self {
        Self { limit, ..self }
    }

    /// Parses and validates a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, TapError> {
        let config: TapConfig =
            serde_json::from_str(json).map_err(|e| TapError::Config(e.to_string()))?;
        config.validate()
    }

    /// Reads, parses and validates the configuration file at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TapError> {
        let path = path.as_ref();
        debug!("Loading configuration from: {}", path.display());
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Checks that at least one plugin is configured and that no slug is blank.
    pub fn validate(self) -> Result<Self, TapError> {
        if self.plugins.is_empty() {
            return Err(TapError::Config(
                "at least one plugin must be configured".to_string(),
            ));
        }
        if self.plugins.iter().any(|plugin| plugin.trim().is_empty()) {
            return Err(TapError::Config("plugin slugs must not be empty".to_string()));
        }
        if self.api_url.trim().is_empty() {
            return Err(TapError::Config("api_url must not be empty".to_string()));
        }
        Ok(self)
    }
}
