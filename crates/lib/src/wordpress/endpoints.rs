use crate::types::StreamId;

/// Host of the public WordPress.org API.
pub const API_BASE_URL: &str = "https://api.wordpress.org";

/// Days of history requested from the active installs and downloads endpoints.
pub const DEFAULT_LIMIT: u32 = 730;

pub const ENDPOINT_ACTIVE_VERSIONS: &str = "/stats/plugin/1.0/?slug=:plugin:";
pub const ENDPOINT_ACTIVE_INSTALLS: &str =
    "/stats/plugin/1.0/active-installs.php?slug=:plugin:&limit=:limit:";
pub const ENDPOINT_DOWNLOADS: &str = "/stats/plugin/1.0/downloads.php?slug=:plugin:&limit=:limit:";
pub const ENDPOINT_DOWNLOADS_SUMMARY: &str =
    "/stats/plugin/1.0/downloads.php?slug=:plugin:&historical_summary=1";
pub const ENDPOINT_INFO: &str =
    "/plugins/info/1.2/?action=query_plugins&request[per_page]=1&request[search]=:plugin:";

/// The path template for `stream`.
pub fn template(stream: StreamId) -> &'static str {
    match stream {
        StreamId::ActiveVersions => ENDPOINT_ACTIVE_VERSIONS,
        StreamId::ActiveInstalls => ENDPOINT_ACTIVE_INSTALLS,
        StreamId::Downloads => ENDPOINT_DOWNLOADS,
        StreamId::DownloadsSummary => ENDPOINT_DOWNLOADS_SUMMARY,
        StreamId::Info => ENDPOINT_INFO,
    }
}

/// Substitutes `:plugin:` and `:limit:` in `template`.
///
/// Slugs are assumed to be URL-safe and are not escaped.
pub fn render(template: &str, plugin: &str, limit: u32) -> String {
    template
        .replace(":plugin:", plugin)
        .replace(":limit:", &limit.to_string())
}
