//! Headless-browser rendering behind a trait seam.
//!
//! Some profile counters only exist after client-side script has run. A
//! [`Renderer`] loads a page in a real browser, waits, optionally evaluates a
//! script, and returns the final HTML plus the script result. The bundled
//! [`HttpRenderer`] talks to an external render service over JSON.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ScraperError;

/// What to do once the page has loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderRequest {
    /// Time to let client-side script settle before reading the DOM.
    pub wait: Duration,
    /// JavaScript expression evaluated in the page; its value is returned as JSON.
    pub script: Option<String>,
}

/// Result of evaluating a script inside a rendered page.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptOutcome<T> {
    Value(T),
    Failed(String),
}

impl<T> ScriptOutcome<T> {
    /// Returns the value, discarding the failure reason.
    pub fn ok(self) -> Option<T> {
        match self {
            ScriptOutcome::Value(value) => Some(value),
            ScriptOutcome::Failed(_) => None,
        }
    }
}

/// A page after client-side rendering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedPage {
    /// Final URL after redirects.
    pub url: String,
    pub html: String,
    pub title: String,
    /// `None` when no script was requested.
    pub script: Option<ScriptOutcome<serde_json::Value>>,
}

impl RenderedPage {
    /// Decodes the script result into a typed record.
    ///
    /// A missing script, a script that threw, and a value of the wrong shape
    /// all come back as [`ScriptOutcome::Failed`].
    pub fn evaluate<T: DeserializeOwned>(&self) -> ScriptOutcome<T> {
        decode_script(self.script.as_ref())
    }
}

pub(crate) fn decode_script<T: DeserializeOwned>(
    script: Option<&ScriptOutcome<serde_json::Value>>,
) -> ScriptOutcome<T> {
    match script {
        None => ScriptOutcome::Failed("no script was evaluated".to_owned()),
        Some(ScriptOutcome::Failed(reason)) => ScriptOutcome::Failed(reason.clone()),
        Some(ScriptOutcome::Value(value)) => match serde_json::from_value(value.clone()) {
            Ok(decoded) => ScriptOutcome::Value(decoded),
            Err(e) => ScriptOutcome::Failed(format!("unexpected script result shape: {e}")),
        },
    }
}

/// Loads pages in a headless browser.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Navigates to `url` and returns the settled page.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Render`] when navigation fails. A script that
    /// throws is not an error; it is reported through
    /// [`RenderedPage::script`].
    async fn render(&self, url: &str, request: &RenderRequest)
        -> Result<RenderedPage, ScraperError>;
}

#[derive(Debug, Serialize)]
struct RenderServiceRequest<'a> {
    url: &'a str,
    wait_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    script: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct RenderServiceResponse {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    html: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
}

/// [`Renderer`] backed by a render service that accepts
/// `POST {url, wait_ms, script}` and answers `{url, html, title, result, error}`.
pub struct HttpRenderer {
    client: Client,
    endpoint: String,
}

impl HttpRenderer {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the HTTP client cannot be built.
    pub fn new(endpoint: &str, timeout_secs: u64) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_owned(),
        })
    }
}

#[async_trait]
impl Renderer for HttpRenderer {
    async fn render(
        &self,
        url: &str,
        request: &RenderRequest,
    ) -> Result<RenderedPage, ScraperError> {
        let body = RenderServiceRequest {
            url,
            wait_ms: u64::try_from(request.wait.as_millis()).unwrap_or(u64::MAX),
            script: request.script.as_deref(),
        };
        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| ScraperError::Render {
                url: url.to_owned(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ScraperError::Render {
                url: url.to_owned(),
                reason: format!("render service returned {status}: {}", detail.trim()),
            });
        }

        let raw = response.text().await?;
        let parsed: RenderServiceResponse =
            serde_json::from_str(&raw).map_err(|e| ScraperError::Deserialize {
                context: format!("render service response for {url}"),
                source: e,
            })?;

        let script = match (&request.script, parsed.error, parsed.result) {
            (None, _, _) => None,
            (Some(_), Some(error), _) => Some(ScriptOutcome::Failed(error)),
            (Some(_), None, Some(value)) => Some(ScriptOutcome::Value(value)),
            (Some(_), None, None) => Some(ScriptOutcome::Failed(
                "script produced no value".to_owned(),
            )),
        };

        Ok(RenderedPage {
            url: parsed.url.unwrap_or_else(|| url.to_owned()),
            html: parsed.html,
            title: parsed.title,
            script,
        })
    }
}
