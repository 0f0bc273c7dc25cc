use std::path::PathBuf;

/// Where the active configuration was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "file {}", path.display()),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// Immutable process configuration, built once at startup and passed into
/// every task.
#[derive(Clone)]
pub struct AppConfig {
    pub source: ConfigSource,
    pub chat_webhook_url: Option<String>,
    pub system_webhook_url: Option<String>,
    pub youtube_default_user_id: Option<String>,
    pub bilibili_default_uid: Option<String>,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    /// Ceiling on concurrent detail fetches during enrichment.
    pub enrich_concurrency: usize,
    /// Pause held by each enrichment worker after its fetch completes.
    pub enrich_pacing_ms: u64,
    /// Maximum number of content items taken from a creator listing.
    pub content_limit: usize,
    pub render_url: Option<String>,
    pub render_wait_ms: u64,
}

pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
pub const DEFAULT_MAX_RETRIES: u32 = 2;
pub const DEFAULT_RETRY_BACKOFF_BASE_MS: u64 = 500;
pub const DEFAULT_ENRICH_CONCURRENCY: usize = 5;
pub const DEFAULT_ENRICH_PACING_MS: u64 = 100;
pub const DEFAULT_CONTENT_LIMIT: usize = 10;
pub const DEFAULT_RENDER_WAIT_MS: u64 = 3_000;

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("source", &self.source)
            .field(
                "chat_webhook_url",
                &self.chat_webhook_url.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "system_webhook_url",
                &self.system_webhook_url.as_ref().map(|_| "[redacted]"),
            )
            .field("youtube_default_user_id", &self.youtube_default_user_id)
            .field("bilibili_default_uid", &self.bilibili_default_uid)
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("enrich_concurrency", &self.enrich_concurrency)
            .field("enrich_pacing_ms", &self.enrich_pacing_ms)
            .field("content_limit", &self.content_limit)
            .field("render_url", &self.render_url)
            .field("render_wait_ms", &self.render_wait_ms)
            .finish()
    }
}
