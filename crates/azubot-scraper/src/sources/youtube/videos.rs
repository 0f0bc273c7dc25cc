use std::sync::LazyLock;

use azubot_core::ContentItem;

use crate::error::ScraperError;
use crate::fetch::{Collector, FetchOptions};
use crate::pattern::{aligned_rows, column, EmbeddedState, FieldPattern};

use super::{display_count, ChannelIdentity, YouTube};

static VIDEO_ID: LazyLock<FieldPattern> = LazyLock::new(|| FieldPattern::string("videoId"));
static TITLE: LazyLock<FieldPattern> = LazyLock::new(|| {
    FieldPattern::custom(r#""title":\{"runs":\[\{"text":"((?:[^"\\]|\\.)*)""#).expect("valid regex")
});
static VIEWS: LazyLock<FieldPattern> = LazyLock::new(|| {
    FieldPattern::custom(r#""shortViewCountText":\{"simpleText":"([^"]+)""#).expect("valid regex")
});
static PUBLISHED: LazyLock<FieldPattern> = LazyLock::new(|| {
    FieldPattern::custom(r#""publishedTimeText":\{"simpleText":"([^"]+)""#).expect("valid regex")
});

#[derive(Debug, PartialEq, Eq)]
struct UploadRow {
    id: String,
    title: String,
    views: u64,
    published: String,
}

fn upload_rows(script: &str, limit: usize) -> Vec<UploadRow> {
    let Some(state) = EmbeddedState::detect(script, &["ytInitialData"]) else {
        return Vec::new();
    };
    let ids = state.all(&VIDEO_ID, limit);
    let titles = state.all(&TITLE, limit);
    let views = state.all(&VIEWS, limit);
    let published = state.all(&PUBLISHED, limit);

    (0..aligned_rows(&[&ids, &titles], limit))
        .map(|i| UploadRow {
            id: ids[i].clone(),
            title: titles[i].clone(),
            views: column(&views, i).map(display_count).unwrap_or(0),
            published: column(&published, i).unwrap_or_default().to_owned(),
        })
        .collect()
}

impl YouTube<'_> {
    /// Coarse records for the channel's most recent uploads, at most `limit`.
    ///
    /// # Errors
    ///
    /// Returns any fetch error from the uploads page.
    pub async fn fetch_recent_videos(
        &self,
        identity: &ChannelIdentity,
        limit: usize,
    ) -> Result<Vec<ContentItem>, ScraperError> {
        let mut collector = Collector::new(self.fetcher, FetchOptions::new());
        collector.on_script(move |rows: &mut Vec<UploadRow>, script| {
            let remaining = limit.saturating_sub(rows.len());
            if remaining > 0 {
                rows.extend(upload_rows(script, remaining));
            }
        });

        let mut rows = Vec::new();
        collector
            .visit(&identity.videos_url(&self.base_url), &mut rows)
            .await?;

        let items: Vec<ContentItem> = rows
            .into_iter()
            .map(|row| {
                let mut item = ContentItem::new(&row.id, &self.watch_url(&row.id));
                item.cover_url = self.thumbnail_url(&row.id);
                item.title = row.title;
                item.view_count = row.views;
                item.published_at = row.published;
                item
            })
            .collect();
        tracing::info!(id = identity.as_str(), count = items.len(), "youtube uploads scraped");
        Ok(items)
    }
}
