use scraper::{ElementRef, Html, Selector};

use crate::error::ScraperError;
use crate::pattern::selector;

use super::{FetchOptions, Fetcher, RawResponse};

type ResponseCallback<S> = Box<dyn Fn(&mut S, &RawResponse) + Send + Sync>;
type ElementCallback<S> = Box<dyn Fn(&mut S, ElementRef<'_>) + Send + Sync>;
type ScriptCallback<S> = Box<dyn Fn(&mut S, &str) + Send + Sync>;

enum Handler<S> {
    Response(ResponseCallback<S>),
    Element {
        selector: Selector,
        callback: ElementCallback<S>,
    },
    Script(ScriptCallback<S>),
}

/// Fetches a page and feeds it to registered callbacks.
///
/// Callbacks receive a caller-owned state value `S` and run in registration
/// order. Element and script callbacks only run for HTML bodies; a non-2xx
/// response never reaches any callback.
pub struct Collector<'f, S> {
    fetcher: &'f Fetcher,
    options: FetchOptions,
    handlers: Vec<Handler<S>>,
}

impl<'f, S> Collector<'f, S> {
    #[must_use]
    pub fn new(fetcher: &'f Fetcher, options: FetchOptions) -> Self {
        Self {
            fetcher,
            options,
            handlers: Vec::new(),
        }
    }

    /// Called once with the whole response.
    pub fn on_response<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(&mut S, &RawResponse) + Send + Sync + 'static,
    {
        self.handlers.push(Handler::Response(Box::new(callback)));
        self
    }

    /// Called once per element matching `css`, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidSelector`] if `css` does not parse.
    pub fn on_html<F>(&mut self, css: &str, callback: F) -> Result<&mut Self, ScraperError>
    where
        F: Fn(&mut S, ElementRef<'_>) + Send + Sync + 'static,
    {
        self.handlers.push(Handler::Element {
            selector: selector(css)?,
            callback: Box::new(callback),
        });
        Ok(self)
    }

    /// Called once per `<script>` block with its text content.
    pub fn on_script<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(&mut S, &str) + Send + Sync + 'static,
    {
        self.handlers.push(Handler::Script(Box::new(callback)));
        self
    }

    /// Fetches `url` and runs every handler against the response.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Fetcher::fetch`]; state is untouched in
    /// that case.
    pub async fn visit(&self, url: &str, state: &mut S) -> Result<RawResponse, ScraperError> {
        let response = self.fetcher.fetch(url, &self.options).await?;
        self.dispatch(&response, state);
        Ok(response)
    }

    /// Runs the handlers against an already-fetched response.
    pub fn dispatch(&self, response: &RawResponse, state: &mut S) {
        let document = (response.is_html()
            && self
                .handlers
                .iter()
                .any(|h| !matches!(h, Handler::Response(_))))
        .then(|| Html::parse_document(&response.body));

        for handler in &self.handlers {
            match handler {
                Handler::Response(callback) => callback(state, response),
                Handler::Element { selector, callback } => {
                    if let Some(document) = &document {
                        for element in document.select(selector) {
                            callback(state, element);
                        }
                    }
                }
                Handler::Script(callback) => {
                    if let Some(document) = &document {
                        for element in document.select(&SCRIPT) {
                            let text: String = element.text().collect();
                            callback(state, &text);
                        }
                    }
                }
            }
        }
    }
}

static SCRIPT: std::sync::LazyLock<Selector> =
    std::sync::LazyLock::new(|| Selector::parse("script").expect("valid selector"));
