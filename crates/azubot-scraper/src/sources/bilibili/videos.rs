use std::sync::LazyLock;

use chrono::DateTime;

use azubot_core::ContentItem;

use crate::error::ScraperError;
use crate::fetch::{Collector, FetchOptions};
use crate::pattern::{aligned_rows, column, EmbeddedState, FieldPattern};

use super::Bilibili;

static BVID: LazyLock<FieldPattern> = LazyLock::new(|| FieldPattern::string("bvid"));
static TITLE: LazyLock<FieldPattern> = LazyLock::new(|| FieldPattern::string("title"));
static PLAY: LazyLock<FieldPattern> = LazyLock::new(|| FieldPattern::number("play"));
static CREATED: LazyLock<FieldPattern> = LazyLock::new(|| FieldPattern::number("created"));
static LENGTH: LazyLock<FieldPattern> = LazyLock::new(|| FieldPattern::string("length"));
static DESCRIPTION: LazyLock<FieldPattern> =
    LazyLock::new(|| FieldPattern::string("description"));
static PIC: LazyLock<FieldPattern> = LazyLock::new(|| FieldPattern::string("pic"));

/// Unix seconds rendered as `YYYY-MM-DD HH:MM:SS` (UTC).
pub(super) fn format_timestamp(secs: &str) -> String {
    secs.parse::<i64>()
        .ok()
        .and_then(|s| DateTime::from_timestamp(s, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

/// Protocol-relative CDN links get an explicit scheme.
pub(super) fn absolute_cover(pic: &str) -> String {
    if pic.starts_with("//") {
        format!("https:{pic}")
    } else {
        pic.to_owned()
    }
}

fn listing_rows(script: &str, limit: usize, video_base: &str) -> Vec<ContentItem> {
    let Some(state) = EmbeddedState::detect(script, &["__INITIAL_STATE__"]) else {
        return Vec::new();
    };
    if !(state.has("\"list\":[") && state.has("\"bvid\":")) {
        return Vec::new();
    }

    let ids = state.all(&BVID, limit);
    let titles = state.all(&TITLE, limit);
    let plays = state.all(&PLAY, limit);
    let created = state.all(&CREATED, limit);
    let lengths = state.all(&LENGTH, limit);
    let descriptions = state.all(&DESCRIPTION, limit);
    let pics = state.all(&PIC, limit);

    let rows = aligned_rows(&[&ids, &titles], limit);
    (0..rows)
        .filter(|&i| !ids[i].is_empty())
        .map(|i| {
            let mut item = ContentItem::new(&ids[i], &format!("{video_base}/video/{}", ids[i]));
            item.title.clone_from(&titles[i]);
            item.view_count = column(&plays, i).and_then(|p| p.parse().ok()).unwrap_or(0);
            item.published_at = column(&created, i).map(format_timestamp).unwrap_or_default();
            item.duration = column(&lengths, i).unwrap_or_default().to_owned();
            item.description = column(&descriptions, i).unwrap_or_default().to_owned();
            item.cover_url = column(&pics, i).map(absolute_cover).unwrap_or_default();
            item
        })
        .collect()
}

impl Bilibili<'_> {
    /// Coarse records for the creator's most recent uploads, at most `limit`.
    ///
    /// # Errors
    ///
    /// Returns any fetch error from the listing page. A page without a
    /// recognisable listing yields an empty list, not an error.
    pub async fn fetch_recent_videos(
        &self,
        uid: &str,
        limit: usize,
    ) -> Result<Vec<ContentItem>, ScraperError> {
        let mut collector = Collector::new(self.fetcher, FetchOptions::new());
        let video_base = self.urls.video.clone();
        collector.on_script(move |items: &mut Vec<ContentItem>, script| {
            let remaining = limit.saturating_sub(items.len());
            if remaining > 0 {
                items.extend(listing_rows(script, remaining, &video_base));
            }
        });

        let mut items = Vec::new();
        let url = format!("{}/video", self.space_url(uid));
        collector.visit(&url, &mut items).await?;
        tracing::info!(uid, count = items.len(), "bilibili video listing scraped");
        Ok(items)
    }
}
