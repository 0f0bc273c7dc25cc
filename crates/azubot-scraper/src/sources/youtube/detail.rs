use std::sync::LazyLock;

use azubot_core::{fill, format_duration, ContentItem};

use crate::error::ScraperError;
use crate::fetch::{Collector, FetchOptions};
use crate::pattern::{EmbeddedState, FieldPattern};

use super::{display_count, YouTube};

static VIEW_COUNT: LazyLock<FieldPattern> = LazyLock::new(|| FieldPattern::string("viewCount"));
static LIKES: LazyLock<FieldPattern> = LazyLock::new(|| {
    FieldPattern::custom(
        r#""defaultText":\{"accessibility":\{"accessibilityData":\{"label":"([0-9,]+) likes""#,
    )
    .expect("valid regex")
});
static LENGTH_SECONDS: LazyLock<FieldPattern> =
    LazyLock::new(|| FieldPattern::string("lengthSeconds"));
static PUBLISH_DATE: LazyLock<FieldPattern> =
    LazyLock::new(|| FieldPattern::string("publishDate"));
static OWNER: LazyLock<FieldPattern> =
    LazyLock::new(|| FieldPattern::string("ownerChannelName"));

fn meta_content(item: &mut ContentItem, meta: scraper::ElementRef<'_>) {
    let element = meta.value();
    let Some(content) = element.attr("content").map(str::trim) else {
        return;
    };
    match element.attr("property") {
        Some("og:title") => {
            fill(&mut item.title, content.to_owned());
        }
        Some("og:description") => {
            fill(&mut item.description, content.to_owned());
        }
        _ => {}
    }
}

fn absorb_player_state(item: &mut ContentItem, script: &str) {
    let Some(state) = EmbeddedState::detect(script, &["ytInitialPlayerResponse", "ytInitialData"])
    else {
        return;
    };
    if let Some(views) = state.first(&VIEW_COUNT) {
        fill(&mut item.view_count, display_count(&views));
    }
    if let Some(likes) = state.first(&LIKES) {
        fill(&mut item.like_count, display_count(&likes));
    }
    if let Some(seconds) = state.first(&LENGTH_SECONDS).and_then(|s| s.parse::<u64>().ok()) {
        if seconds > 0 {
            fill(&mut item.duration, format_duration(seconds));
        }
    }
    if let Some(date) = state.first(&PUBLISH_DATE) {
        fill(&mut item.published_at, date);
    }
    if let Some(owner) = state.first(&OWNER) {
        fill(&mut item.author, owner);
    }
}

impl YouTube<'_> {
    /// Full record for one video from its watch page.
    ///
    /// # Errors
    ///
    /// Returns any fetch error from the watch page, or
    /// [`ScraperError::Extraction`] when the page yields no video fields.
    pub async fn fetch_video_detail(&self, video_id: &str) -> Result<ContentItem, ScraperError> {
        let url = self.watch_url(video_id);
        let mut collector = Collector::new(self.fetcher, FetchOptions::new());
        collector
            .on_html("meta[property^='og:']", meta_content)?
            .on_script(absorb_player_state);

        let mut item = ContentItem::new(video_id, &url);
        collector.visit(&url, &mut item).await?;

        if item == ContentItem::new(video_id, &url) {
            return Err(ScraperError::Extraction {
                context: format!("youtube video {video_id}"),
                reason: "no player state or og metadata".to_owned(),
            });
        }
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_state_fills_detail_fields() {
        let mut item = ContentItem::new("abc", "https://www.youtube.com/watch?v=abc");
        absorb_player_state(
            &mut item,
            r#"var ytInitialPlayerResponse = {"videoDetails":{"lengthSeconds":"125","viewCount":"45678","ownerChannelName":"Chan"},"microformat":{"publishDate":"2024-05-01"}};
               var ytInitialData = {"defaultText":{"accessibility":{"accessibilityData":{"label":"1,234 likes"}}}};"#,
        );
        assert_eq!(item.duration, "2:05");
        assert_eq!(item.view_count, 45_678);
        assert_eq!(item.like_count, 1_234);
        assert_eq!(item.published_at, "2024-05-01");
        assert_eq!(item.author, "Chan");
    }

    #[test]
    fn coarse_views_survive_detail_pass() {
        let mut item = ContentItem::new("abc", "u");
        item.view_count = 1_500;
        absorb_player_state(&mut item, r#"ytInitialPlayerResponse = {"viewCount":"1623"}"#);
        assert_eq!(item.view_count, 1_500);
    }
}
