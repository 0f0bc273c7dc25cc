use std::sync::LazyLock;

use azubot_core::{fill, CreatorProfile, Platform};

use crate::error::ScraperError;
use crate::fetch::{Collector, FetchOptions};
use crate::pattern::{EmbeddedState, FieldPattern};

use super::{display_count, ChannelIdentity, YouTube};

static SUBSCRIBERS: LazyLock<FieldPattern> = LazyLock::new(|| {
    FieldPattern::custom(r#""subscriberCountText":\{"simpleText":"([^"]+)""#).expect("valid regex")
});
static VIDEO_COUNT: LazyLock<FieldPattern> = LazyLock::new(|| {
    FieldPattern::custom(r#""videosCountText":\{"runs":\[\{"text":"([^"]+)""#).expect("valid regex")
});

fn meta_content(profile: &mut CreatorProfile, meta: scraper::ElementRef<'_>) {
    let element = meta.value();
    let Some(content) = element.attr("content").map(str::trim) else {
        return;
    };
    let slot = match (element.attr("name"), element.attr("property")) {
        (Some("description"), _) => &mut profile.description,
        (_, Some("og:title")) => &mut profile.display_name,
        (_, Some("og:image")) => &mut profile.avatar_url,
        _ => return,
    };
    fill(slot, content.to_owned());
}

fn absorb_channel_state(profile: &mut CreatorProfile, script: &str) {
    let Some(state) = EmbeddedState::detect(script, &["ytInitialData"]) else {
        return;
    };
    if let Some(subscribers) = state.first(&SUBSCRIBERS) {
        fill(&mut profile.follower_count, display_count(&subscribers));
    }
    if let Some(videos) = state.first(&VIDEO_COUNT) {
        fill(&mut profile.content_count, display_count(&videos));
    }
}

impl YouTube<'_> {
    /// Channel name, bio, avatar, subscriber and upload counts.
    ///
    /// # Errors
    ///
    /// Returns any fetch error from the channel page.
    pub async fn fetch_channel(
        &self,
        identity: &ChannelIdentity,
    ) -> Result<CreatorProfile, ScraperError> {
        let url = identity.channel_url(&self.base_url);
        let mut collector = Collector::new(self.fetcher, FetchOptions::new());
        collector
            .on_html("meta[name='description'], meta[property^='og:']", meta_content)?
            .on_script(absorb_channel_state);

        let mut profile = CreatorProfile::new(Platform::YouTube, identity.as_str(), &url);
        collector.visit(&url, &mut profile).await?;
        tracing::info!(
            id = identity.as_str(),
            name = %profile.display_name,
            subscribers = profile.follower_count,
            "youtube channel scraped"
        );
        Ok(profile)
    }
}
