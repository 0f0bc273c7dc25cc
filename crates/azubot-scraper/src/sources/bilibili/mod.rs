//! Bilibili creator profile, video listing, and video detail scrapers.
//!
//! A profile is assembled from up to three passes (space page, stats API,
//! optional rendered page) merged first-writer-wins. Videos come coarse from
//! the listing page and are enriched from each video's detail page.

mod detail;
mod profile;
mod videos;

use std::time::Duration;

use azubot_core::CreatorReport;

use crate::enrich::{enrich, EnrichOptions, EnrichReport};
use crate::error::ScraperError;
use crate::fetch::Fetcher;

pub const BILIBILI_SPACE_URL: &str = "https://space.bilibili.com";
pub const BILIBILI_API_URL: &str = "https://api.bilibili.com";
pub const BILIBILI_VIDEO_URL: &str = "https://www.bilibili.com";

/// Markers that identify the embedded application state.
const STATE_MARKERS: [&str; 2] = ["__INITIAL_STATE__", "_render_data_"];

/// Endpoints used by [`Bilibili`]; overridable for tests.
#[derive(Debug, Clone)]
pub struct BilibiliUrls {
    pub space: String,
    pub api: String,
    pub video: String,
}

impl Default for BilibiliUrls {
    fn default() -> Self {
        Self {
            space: BILIBILI_SPACE_URL.to_owned(),
            api: BILIBILI_API_URL.to_owned(),
            video: BILIBILI_VIDEO_URL.to_owned(),
        }
    }
}

pub struct Bilibili<'f> {
    fetcher: &'f Fetcher,
    urls: BilibiliUrls,
    render_wait: Duration,
}

impl<'f> Bilibili<'f> {
    #[must_use]
    pub fn new(fetcher: &'f Fetcher) -> Self {
        Self::with_urls(fetcher, BilibiliUrls::default())
    }

    #[must_use]
    pub fn with_urls(fetcher: &'f Fetcher, urls: BilibiliUrls) -> Self {
        let urls = BilibiliUrls {
            space: urls.space.trim_end_matches('/').to_owned(),
            api: urls.api.trim_end_matches('/').to_owned(),
            video: urls.video.trim_end_matches('/').to_owned(),
        };
        Self {
            fetcher,
            urls,
            render_wait: Duration::from_millis(azubot_core::app_config::DEFAULT_RENDER_WAIT_MS),
        }
    }

    /// How long the rendered pass waits for client-side script.
    #[must_use]
    pub fn render_wait(mut self, wait: Duration) -> Self {
        self.render_wait = wait;
        self
    }

    fn space_url(&self, uid: &str) -> String {
        format!("{}/{uid}", self.urls.space)
    }

    fn video_url(&self, bvid: &str) -> String {
        format!("{}/video/{bvid}", self.urls.video)
    }

    /// Profile, recent videos, and enrichment in one call.
    ///
    /// A failed listing is logged and yields an empty video list; enrichment
    /// failures leave the coarse record in place.
    ///
    /// # Errors
    ///
    /// Returns an error only when the profile cannot be fetched at all.
    pub async fn creator_report(
        &self,
        uid: &str,
        limit: usize,
        options: EnrichOptions,
    ) -> Result<(CreatorReport, EnrichReport), ScraperError> {
        let profile = self.fetch_profile(uid).await?;

        let mut items = match self.fetch_recent_videos(uid, limit).await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(uid, error = %e, "bilibili video listing failed");
                Vec::new()
            }
        };

        let report = enrich(&mut items, options, |bvid| async move {
            self.fetch_video_detail(&bvid).await
        })
        .await;

        Ok((CreatorReport { profile, items }, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_urls_are_normalized() {
        let fetcher = Fetcher::new(5, "azubot-test/0.1", 0, 0).unwrap();
        let client = Bilibili::with_urls(
            &fetcher,
            BilibiliUrls {
                space: "http://127.0.0.1:1/".to_owned(),
                api: "http://127.0.0.1:2/".to_owned(),
                video: "http://127.0.0.1:3/".to_owned(),
            },
        );
        assert_eq!(client.space_url("42"), "http://127.0.0.1:1/42");
        assert_eq!(client.video_url("BV1x"), "http://127.0.0.1:3/video/BV1x");
    }
}
