//! HTTP retrieval shared by every source.
//!
//! [`Fetcher`] owns the connection pool, the retry policy, and the optional
//! headless renderer. Per-request behaviour (allow-list, header overrides,
//! rendering) travels in [`FetchOptions`]. [`Collector`] layers selector and
//! script callbacks on top of a fetch.

mod collector;

use std::sync::Arc;
use std::time::Duration;

use reqwest::redirect::Policy;
use reqwest::Client;
use serde::de::DeserializeOwned;

use azubot_core::AppConfig;

use crate::error::ScraperError;
use crate::rate_limit::retry_with_backoff;
use crate::render::{decode_script, RenderRequest, Renderer, ScriptOutcome};

pub use collector::Collector;

/// Per-request settings.
///
/// An empty `allowed_domains` list allows every host.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub allowed_domains: Vec<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub accept: Option<String>,
    pub render: Option<RenderRequest>,
}

impl FetchOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn allow_domain(mut self, host: &str) -> Self {
        self.allowed_domains.push(host.to_owned());
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = Some(user_agent.to_owned());
        self
    }

    #[must_use]
    pub fn referer(mut self, referer: &str) -> Self {
        self.referer = Some(referer.to_owned());
        self
    }

    #[must_use]
    pub fn accept(mut self, accept: &str) -> Self {
        self.accept = Some(accept.to_owned());
        self
    }

    /// Routes the request through the headless renderer.
    #[must_use]
    pub fn rendered(mut self, wait: Duration, script: Option<&str>) -> Self {
        self.render = Some(RenderRequest {
            wait,
            script: script.map(str::to_owned),
        });
        self
    }
}

/// A fetched page or API body.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// Final URL after redirects.
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
    /// Document title reported by the renderer; `None` for plain fetches.
    pub title: Option<String>,
    script: Option<ScriptOutcome<serde_json::Value>>,
}

impl RawResponse {
    /// Whether the body should be parsed as HTML.
    #[must_use]
    pub fn is_html(&self) -> bool {
        match &self.content_type {
            Some(ct) => ct.contains("html"),
            None => self.body.trim_start().starts_with('<'),
        }
    }

    /// Decodes the result of the script evaluated during a rendered fetch.
    pub fn evaluate<T: DeserializeOwned>(&self) -> ScriptOutcome<T> {
        decode_script(self.script.as_ref())
    }
}

/// Shared HTTP client with retry and optional rendering.
///
/// Cheap to clone; clones share the connection pool and renderer.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    /// Never follows redirects; used when an allow-list is set so every hop
    /// can be checked.
    pinned: Client,
    max_retries: u32,
    backoff_base_ms: u64,
    renderer: Option<Arc<dyn Renderer>>,
}

impl Fetcher {
    /// Creates a `Fetcher` with the given timeout, default `User-Agent`, and
    /// retry policy.
    ///
    /// `max_retries` is the number of additional attempts after the first
    /// failure for retriable errors (429, 5xx, network errors). Set to `0` to
    /// disable retries.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, ScraperError> {
        let builder = || {
            Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .connect_timeout(Duration::from_secs(10))
                .user_agent(user_agent)
        };
        let client = builder().build()?;
        let pinned = builder().redirect(Policy::none()).build()?;
        Ok(Self {
            client,
            pinned,
            max_retries,
            backoff_base_ms,
            renderer: None,
        })
    }

    /// Builds a `Fetcher` from the process configuration. No renderer is
    /// attached; see [`Fetcher::with_renderer`].
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, ScraperError> {
        Self::new(
            config.request_timeout_secs,
            &config.user_agent,
            config.max_retries,
            config.retry_backoff_base_ms,
        )
    }

    #[must_use]
    pub fn with_renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    #[must_use]
    pub fn has_renderer(&self) -> bool {
        self.renderer.is_some()
    }

    /// Fetches `url`, retrying transient failures.
    ///
    /// The allow-list is checked before any network activity, and again for
    /// every redirect hop before it is followed.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidUrl`] / [`ScraperError::DomainNotAllowed`]: refused up front.
    /// - [`ScraperError::RateLimited`]: HTTP 429 after all retries.
    /// - [`ScraperError::NotFound`]: HTTP 404.
    /// - [`ScraperError::UnexpectedStatus`]: any other non-2xx status.
    /// - [`ScraperError::Http`]: network failure after all retries.
    /// - [`ScraperError::RendererUnavailable`] / [`ScraperError::Render`]: rendered fetches only.
    pub async fn fetch(
        &self,
        url: &str,
        options: &FetchOptions,
    ) -> Result<RawResponse, ScraperError> {
        check_allowed(url, &options.allowed_domains)?;

        if let Some(request) = &options.render {
            return self.fetch_rendered(url, request).await;
        }

        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.fetch_once(url, options)
        })
        .await
    }

    /// Fetches `url` and decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Everything [`Fetcher::fetch`] returns, plus
    /// [`ScraperError::Deserialize`] when the body does not match `T`.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        options: &FetchOptions,
    ) -> Result<T, ScraperError> {
        let response = self.fetch(url, options).await?;
        serde_json::from_str(&response.body).map_err(|e| ScraperError::Deserialize {
            context: url.to_owned(),
            source: e,
        })
    }

    async fn fetch_once(
        &self,
        url: &str,
        options: &FetchOptions,
    ) -> Result<RawResponse, ScraperError> {
        let response = if options.allowed_domains.is_empty() {
            get_request(&self.client, url, options).send().await?
        } else {
            self.follow_pinned(url, options).await?
        };
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(0);
            return Err(ScraperError::RateLimited {
                domain: host_of(url).unwrap_or_else(|| url.to_owned()),
                retry_after_secs,
            });
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ScraperError::NotFound {
                url: url.to_owned(),
            });
        }

        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response.text().await?;

        Ok(RawResponse {
            url: final_url,
            status: status.as_u16(),
            content_type,
            body,
            title: None,
            script: None,
        })
    }

    /// Follows redirects by hand so an allowed host cannot bounce the fetch
    /// to one outside the allow-list.
    async fn follow_pinned(
        &self,
        url: &str,
        options: &FetchOptions,
    ) -> Result<reqwest::Response, ScraperError> {
        let mut target = url.to_owned();
        for _ in 0..=MAX_REDIRECTS {
            let response = get_request(&self.pinned, &target, options).send().await?;
            if !response.status().is_redirection() {
                return Ok(response);
            }
            let Some(location) = response
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|v| v.to_str().ok())
            else {
                return Ok(response);
            };
            let next = response
                .url()
                .join(location)
                .map_err(|e| ScraperError::InvalidUrl {
                    url: location.to_owned(),
                    reason: e.to_string(),
                })?;
            check_allowed(next.as_str(), &options.allowed_domains)?;
            tracing::debug!(from = %target, to = %next, "following redirect");
            target = next.into();
        }
        Err(ScraperError::TooManyRedirects { url: url.to_owned() })
    }

    async fn fetch_rendered(
        &self,
        url: &str,
        request: &RenderRequest,
    ) -> Result<RawResponse, ScraperError> {
        let renderer = self
            .renderer
            .as_ref()
            .ok_or_else(|| ScraperError::RendererUnavailable {
                url: url.to_owned(),
            })?;
        let page = renderer.render(url, request).await?;
        Ok(RawResponse {
            url: page.url,
            status: 200,
            content_type: Some("text/html".to_owned()),
            body: page.html,
            title: Some(page.title),
            script: page.script,
        })
    }
}

const MAX_REDIRECTS: usize = 10;

fn get_request(client: &Client, url: &str, options: &FetchOptions) -> reqwest::RequestBuilder {
    let mut request = client.get(url);
    if let Some(user_agent) = &options.user_agent {
        request = request.header(reqwest::header::USER_AGENT, user_agent);
    }
    if let Some(referer) = &options.referer {
        request = request.header(reqwest::header::REFERER, referer);
    }
    if let Some(accept) = &options.accept {
        request = request.header(reqwest::header::ACCEPT, accept);
    }
    request
}

fn host_of(url: &str) -> Option<String> {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
}

fn check_allowed(url: &str, allowed: &[String]) -> Result<(), ScraperError> {
    let parsed = reqwest::Url::parse(url).map_err(|e| ScraperError::InvalidUrl {
        url: url.to_owned(),
        reason: e.to_string(),
    })?;
    if allowed.is_empty() {
        return Ok(());
    }
    let host = parsed.host_str().unwrap_or_default();
    if allowed.iter().any(|d| d.eq_ignore_ascii_case(host)) {
        Ok(())
    } else {
        Err(ScraperError::DomainNotAllowed {
            url: url.to_owned(),
            host: host.to_owned(),
        })
    }
}
