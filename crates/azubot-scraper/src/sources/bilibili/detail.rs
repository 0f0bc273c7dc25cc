use std::sync::LazyLock;

use azubot_core::{fill, format_duration, ContentItem};

use crate::error::ScraperError;
use crate::fetch::{Collector, FetchOptions};
use crate::pattern::{EmbeddedState, FieldPattern};

use super::videos::{absolute_cover, format_timestamp};
use super::Bilibili;

static VIEW: LazyLock<FieldPattern> = LazyLock::new(|| FieldPattern::number("view"));
static LIKE: LazyLock<FieldPattern> = LazyLock::new(|| FieldPattern::number("like"));
static COIN: LazyLock<FieldPattern> = LazyLock::new(|| FieldPattern::number("coin"));
static FAVORITE: LazyLock<FieldPattern> = LazyLock::new(|| FieldPattern::number("favorite"));
static SHARE: LazyLock<FieldPattern> = LazyLock::new(|| FieldPattern::number("share"));
static REPLY: LazyLock<FieldPattern> = LazyLock::new(|| FieldPattern::number("reply"));

static TITLE: LazyLock<FieldPattern> = LazyLock::new(|| FieldPattern::string("title"));
static DESC: LazyLock<FieldPattern> = LazyLock::new(|| FieldPattern::string("desc"));
static PIC: LazyLock<FieldPattern> = LazyLock::new(|| FieldPattern::string("pic"));
static DURATION: LazyLock<FieldPattern> = LazyLock::new(|| FieldPattern::number("duration"));
static PUBDATE: LazyLock<FieldPattern> = LazyLock::new(|| FieldPattern::number("pubdate"));
static OWNER_NAME: LazyLock<FieldPattern> = LazyLock::new(|| {
    FieldPattern::custom(r#""owner":\{[^}]*"name":"([^"]+)""#).expect("valid regex")
});

fn absorb_detail(item: &mut ContentItem, script: &str) {
    let Some(state) = EmbeddedState::detect(script, &["__INITIAL_STATE__"]) else {
        return;
    };

    if state.has("\"stat\":") {
        fill(&mut item.view_count, state.first_count(&VIEW));
        fill(&mut item.like_count, state.first_count(&LIKE));
        fill(&mut item.coin_count, state.first_count(&COIN));
        fill(&mut item.favorite_count, state.first_count(&FAVORITE));
        fill(&mut item.share_count, state.first_count(&SHARE));
        fill(&mut item.comment_count, state.first_count(&REPLY));
    }

    if state.has("\"videoData\":") {
        fill(&mut item.title, state.first(&TITLE).unwrap_or_default());
        fill(&mut item.description, state.first(&DESC).unwrap_or_default());
        fill(
            &mut item.cover_url,
            state.first(&PIC).map(|p| absolute_cover(&p)).unwrap_or_default(),
        );
        let seconds = state.first_count(&DURATION);
        if seconds > 0 {
            fill(&mut item.duration, format_duration(seconds));
        }
        fill(&mut item.author, state.first(&OWNER_NAME).unwrap_or_default());
        fill(
            &mut item.published_at,
            state.first(&PUBDATE).map(|p| format_timestamp(&p)).unwrap_or_default(),
        );
    }
}

impl Bilibili<'_> {
    /// Full record for one video from its detail page.
    ///
    /// # Errors
    ///
    /// Returns any fetch error, or [`ScraperError::Extraction`] when the page
    /// carries no embedded state at all.
    pub async fn fetch_video_detail(&self, bvid: &str) -> Result<ContentItem, ScraperError> {
        let url = self.video_url(bvid);
        let mut collector = Collector::new(self.fetcher, FetchOptions::new());
        collector.on_script(absorb_detail);

        let mut item = ContentItem::new(bvid, &url);
        collector.visit(&url, &mut item).await?;

        if item == ContentItem::new(bvid, &url) {
            return Err(ScraperError::Extraction {
                context: format!("bilibili video {bvid}"),
                reason: "no embedded video state".to_owned(),
            });
        }
        Ok(item)
    }
}
