use crate::config::TapConfig;
use crate::errors::TapError;
use crate::types::{Record, Row};
use crate::wordpress::handlers::StreamHandler;
use futures::future;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use reqwest::Client as ReqwestClient;
use serde_json::Value;
use tracing::{debug, info};

/// Browser-like `User-Agent` sent with every request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/74.0.3729.131 Safari/537.36";

/// A client for the WordPress.org plugin statistics API.
///
/// One HTTP client is shared by every request of a run. Requests are issued one
/// at a time and are never retried.
#[derive(Clone, Debug)]
pub struct WordPressClient {
    client: ReqwestClient,
    api_url: String,
    plugins: Vec<String>,
    limit: u32,
}

impl WordPressClient {
    /// Creates a new `WordPressClient` for the plugins in `config`.
    pub fn new(config: &TapConfig) -> Result<Self, TapError> {
        let client = ReqwestClient::builder()
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            plugins: config.plugins.clone(),
            limit: config.limit,
        })
    }

    /// Fetches `path` from the API host and decodes the JSON body.
    ///
    /// A non-success status is returned as [`TapError::Http`].
    pub async fn load(&self, path: &str) -> Result<Value, TapError> {
        let url = format!("{}{}", self.api_url, path);
        info!("Loading: {}", url);
        let response = self.client.get(&url).send().await?.error_for_status()?;
        Ok(response.json::<Value>().await?)
    }

    /// Yields the cleaned records of `handler`'s stream for every configured plugin.
    ///
    /// The stream is lazy: a plugin's endpoint is only requested once the records
    /// of the previous plugin have been consumed. Calling this again issues fresh
    /// requests.
    pub fn records<'a>(
        &'a self,
        handler: &'a dyn StreamHandler,
    ) -> BoxStream<'a, Result<Record, TapError>> {
        stream::iter(self.plugins.iter())
            .then(move |plugin| async move {
                let path = handler.path(plugin, self.limit);
                let raw = self.load(&path).await?;
                let rows = handler.rows(plugin, raw)?;
                debug!(
                    stream = %handler.stream(),
                    plugin = %plugin,
                    rows = rows.len(),
                    "Reshaped response"
                );
                Ok::<_, TapError>(stream::iter(rows.into_iter().map(Ok::<Row, TapError>)))
            })
            .try_flatten()
            .and_then(move |row| future::ready(handler.clean(row)))
            .boxed()
    }
}
