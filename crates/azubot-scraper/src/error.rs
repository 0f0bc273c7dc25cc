use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by {domain} (retry after {retry_after_secs}s)")]
    RateLimited {
        domain: String,
        retry_after_secs: u64,
    },

    #[error("page not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("refusing to fetch {url}: host {host} is not in the allow-list")]
    DomainNotAllowed { url: String, host: String },

    #[error("too many redirects starting from {url}")]
    TooManyRedirects { url: String },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid CSS selector \"{selector}\": {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("API error for {context}: code {code}: {message}")]
    Api {
        context: String,
        code: i64,
        message: String,
    },

    #[error("nothing extracted for {context}: {reason}")]
    Extraction { context: String, reason: String },

    #[error("rendered fetch requested for {url} but no renderer is configured")]
    RendererUnavailable { url: String },

    #[error("render service failed for {url}: {reason}")]
    Render { url: String, reason: String },
}
