//! YouTube channel, uploads, and watch-page scrapers.
//!
//! Everything is read from server-rendered markup and the `ytInitialData`
//! blob; no API key is involved.

mod channel;
mod detail;
mod identity;
mod videos;

use azubot_core::{parse_magnitude, CreatorReport};

use crate::enrich::{enrich, EnrichOptions, EnrichReport};
use crate::error::ScraperError;
use crate::fetch::Fetcher;

pub use identity::ChannelIdentity;

pub const YOUTUBE_BASE_URL: &str = "https://www.youtube.com";
pub const THUMBNAIL_BASE_URL: &str = "https://img.youtube.com";

/// Parses a display count, treating anything unreadable as zero.
fn display_count(text: &str) -> u64 {
    parse_magnitude(text).unwrap_or_else(|e| {
        tracing::debug!(text, error = %e, "unparseable youtube count");
        0
    })
}

pub struct YouTube<'f> {
    fetcher: &'f Fetcher,
    base_url: String,
    thumbnail_base: String,
}

impl<'f> YouTube<'f> {
    #[must_use]
    pub fn new(fetcher: &'f Fetcher) -> Self {
        Self::with_base_url(fetcher, YOUTUBE_BASE_URL)
    }

    #[must_use]
    pub fn with_base_url(fetcher: &'f Fetcher, base_url: &str) -> Self {
        Self {
            fetcher,
            base_url: base_url.trim_end_matches('/').to_owned(),
            thumbnail_base: THUMBNAIL_BASE_URL.to_owned(),
        }
    }

    fn watch_url(&self, video_id: &str) -> String {
        format!("{}/watch?v={video_id}", self.base_url)
    }

    fn thumbnail_url(&self, video_id: &str) -> String {
        format!("{}/vi/{video_id}/maxresdefault.jpg", self.thumbnail_base)
    }

    /// Channel profile, recent uploads, and per-video enrichment.
    ///
    /// # Errors
    ///
    /// Returns an error only when the channel page cannot be fetched.
    pub async fn creator_report(
        &self,
        id: &str,
        limit: usize,
        options: EnrichOptions,
    ) -> Result<(CreatorReport, EnrichReport), ScraperError> {
        let identity = ChannelIdentity::parse(id);
        let profile = self.fetch_channel(&identity).await?;

        let mut items = match self.fetch_recent_videos(&identity, limit).await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(id, error = %e, "youtube uploads listing failed");
                Vec::new()
            }
        };

        let report = enrich(&mut items, options, |video_id| async move {
            self.fetch_video_detail(&video_id).await
        })
        .await;

        Ok((CreatorReport { profile, items }, report))
    }
}
