//! Bounded-concurrency enrichment of coarse records from per-item detail
//! fetches.
//!
//! Each detail result is merged into its record as soon as it arrives, so a
//! cancelled run leaves every already-merged record intact. A failed detail
//! fetch is logged and the coarse record kept.

use std::future::Future;
use std::time::Duration;

use futures::stream::{self, StreamExt};

use azubot_core::{fill, AppConfig, ContentItem, VocaloidEntry};

use crate::error::ScraperError;

/// A record that can be filled in from a detail lookup.
pub trait Enrichable {
    type Detail;

    /// Key passed to the detail fetcher.
    fn enrichment_key(&self) -> String;

    /// Merges a detail result under the first-writer-wins rule.
    fn absorb(&mut self, detail: Self::Detail);
}

impl Enrichable for ContentItem {
    type Detail = ContentItem;

    fn enrichment_key(&self) -> String {
        self.id.clone()
    }

    fn absorb(&mut self, detail: ContentItem) {
        self.merge(detail);
    }
}

impl Enrichable for VocaloidEntry {
    /// Preferred PV link.
    type Detail = String;

    fn enrichment_key(&self) -> String {
        self.id.to_string()
    }

    fn absorb(&mut self, detail: String) {
        fill(&mut self.pv_url, Some(detail));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrichOptions {
    /// Maximum detail fetches in flight. Clamped to at least 1.
    pub concurrency: usize,
    /// Pause each worker holds after its fetch, before yielding its slot.
    pub pacing: Duration,
}

impl EnrichOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            concurrency: config.enrich_concurrency,
            pacing: Duration::from_millis(config.enrich_pacing_ms),
        }
    }
}

/// Outcome counts for one enrichment run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichReport {
    pub attempted: usize,
    pub enriched: usize,
    pub failed: usize,
}

/// Fetches a detail record for every item in `items` with at most
/// `options.concurrency` fetches in flight, merging each result into its
/// item as it completes.
///
/// Item order is preserved. Failures never abort the run.
pub async fn enrich<T, F, Fut>(
    items: &mut [T],
    options: EnrichOptions,
    fetch_detail: F,
) -> EnrichReport
where
    T: Enrichable,
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<T::Detail, ScraperError>>,
{
    let keys: Vec<(usize, String)> = items
        .iter()
        .map(|item| item.enrichment_key())
        .enumerate()
        .collect();
    let fetch_detail = &fetch_detail;
    let pacing = options.pacing;

    let mut completions = stream::iter(keys)
        .map(|(index, key)| async move {
            let result = fetch_detail(key.clone()).await;
            if !pacing.is_zero() {
                tokio::time::sleep(pacing).await;
            }
            (index, key, result)
        })
        .buffer_unordered(options.concurrency.max(1));

    let mut report = EnrichReport::default();
    while let Some((index, key, result)) = completions.next().await {
        report.attempted += 1;
        match result {
            Ok(detail) => {
                items[index].absorb(detail);
                report.enriched += 1;
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "detail fetch failed, keeping coarse record");
                report.failed += 1;
            }
        }
    }

    tracing::debug!(
        attempted = report.attempted,
        enriched = report.enriched,
        failed = report.failed,
        "enrichment finished"
    );
    report
}
