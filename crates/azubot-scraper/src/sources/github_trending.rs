//! GitHub trending repositories.

use std::sync::LazyLock;

use scraper::{ElementRef, Selector};

use azubot_core::TrendingEntry;

use crate::error::ScraperError;
use crate::fetch::{Collector, FetchOptions, Fetcher};
use crate::pattern::{last_attr, last_text};

pub const GITHUB_BASE_URL: &str = "https://github.com";

static REPO_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h2 a").expect("valid selector"));
static STARS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href$='/stargazers']").expect("valid selector"));
static LANGUAGE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span[itemprop='programmingLanguage']").expect("valid selector"));
static DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p").expect("valid selector"));

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn extract_repo(row: ElementRef<'_>, base: &str) -> Option<TrendingEntry> {
    let href = last_attr(row, &REPO_LINK, "href")?;
    let path: String = href
        .trim_start_matches('/')
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if path.is_empty() {
        return None;
    }
    Some(TrendingEntry {
        link: format!("{base}/{path}"),
        title: path,
        stars: last_text(row, &STARS).unwrap_or_default(),
        language: non_empty(last_text(row, &LANGUAGE)),
        description: non_empty(last_text(row, &DESCRIPTION)),
    })
}

/// Scraper for `github.com/trending`.
pub struct GithubTrending<'f> {
    fetcher: &'f Fetcher,
    base_url: String,
}

impl<'f> GithubTrending<'f> {
    #[must_use]
    pub fn new(fetcher: &'f Fetcher) -> Self {
        Self::with_base_url(fetcher, GITHUB_BASE_URL)
    }

    #[must_use]
    pub fn with_base_url(fetcher: &'f Fetcher, base_url: &str) -> Self {
        Self {
            fetcher,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Fetches every repository row on the trending page, in page order.
    ///
    /// # Errors
    ///
    /// Returns any fetch error from the trending page.
    pub async fn fetch_trending(&self) -> Result<Vec<TrendingEntry>, ScraperError> {
        let mut collector = Collector::new(self.fetcher, FetchOptions::new());
        let base = self.base_url.clone();
        collector.on_html("article.Box-row", move |entries: &mut Vec<TrendingEntry>, row| {
            entries.extend(extract_repo(row, &base));
        })?;

        let mut entries = Vec::new();
        let url = format!("{}/trending", self.base_url);
        collector.visit(&url, &mut entries).await?;
        tracing::info!(count = entries.len(), "github trending scraped");
        Ok(entries)
    }
}
