use std::sync::LazyLock;

use serde::Deserialize;

use azubot_core::{fill, parse_magnitude, CreatorProfile, MembershipTier, Platform};

use crate::error::ScraperError;
use crate::fetch::{Collector, FetchOptions};
use crate::pattern::{element_text, EmbeddedState, FieldPattern};
use crate::render::ScriptOutcome;

use super::{Bilibili, STATE_MARKERS};

const TITLE_SUFFIX: &str = "的个人空间";
const DESCRIPTION_START: &str = "个人空间，提供";
const DESCRIPTION_END: &str = "内容，关注";
const API_ACCEPT: &str = "application/json, text/plain, */*";

static NAME: LazyLock<FieldPattern> = LazyLock::new(|| FieldPattern::string("name"));
static FACE: LazyLock<FieldPattern> = LazyLock::new(|| FieldPattern::string("face"));
static SIGN: LazyLock<FieldPattern> = LazyLock::new(|| FieldPattern::string("sign"));
static LEVEL: LazyLock<FieldPattern> = LazyLock::new(|| FieldPattern::number("level"));

/// Evaluated in the rendered space page. Counter labels are matched by
/// their Chinese captions; values are returned as display text.
const STATS_SCRIPT: &str = r"(() => {
  const out = { username: '', follower: '', following: '', like: '', play: '', level: 0, vipType: 0, description: '', face: '' };
  const title = document.title || '';
  if (title.includes('的个人空间')) out.username = title.split('的个人空间')[0];
  const info = (window.__INITIAL_STATE__ || {}).userInfo;
  if (info) {
    out.username = info.name || out.username;
    out.description = info.sign || '';
    out.face = info.face || '';
    out.level = info.level || 0;
    out.vipType = info.vipType || 0;
  }
  document.querySelectorAll('.n-num').forEach((el) => {
    const value = el.textContent.trim();
    const caption = (el.parentElement && el.parentElement.textContent) || '';
    if (caption.includes('粉丝')) out.follower = value;
    else if (caption.includes('关注')) out.following = value;
    else if (caption.includes('获赞')) out.like = value;
    else if (caption.includes('播放')) out.play = value;
  });
  return out;
})()";

#[derive(Debug, Deserialize)]
struct AccInfoEnvelope {
    code: i64,
    #[serde(default)]
    message: String,
    data: Option<AccInfo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AccInfo {
    name: String,
    face: String,
    sign: String,
    level: u32,
    follower: u64,
    following: u64,
    vip: Option<Vip>,
}

#[derive(Debug, Deserialize)]
struct Vip {
    #[serde(rename = "type", default)]
    vip_type: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RenderedStats {
    username: String,
    follower: String,
    following: String,
    like: String,
    play: String,
    level: u32,
    #[serde(rename = "vipType")]
    vip_type: i64,
    description: String,
    face: String,
}

fn count(text: &str) -> u64 {
    if text.trim().is_empty() {
        return 0;
    }
    parse_magnitude(text).unwrap_or_else(|e| {
        tracing::debug!(text, error = %e, "unparseable bilibili counter");
        0
    })
}

/// Display name from a `<title>` of the form `{name}的个人空间...`.
fn name_from_title(title: &str) -> Option<&str> {
    title
        .split_once(TITLE_SUFFIX)
        .map(|(name, _)| name.trim())
        .filter(|name| !name.is_empty())
}

/// Bio fragment between the fixed phrases of the SEO description.
fn description_from_meta(content: &str) -> Option<&str> {
    let (_, rest) = content.split_once(DESCRIPTION_START)?;
    let (description, _) = rest.split_once(DESCRIPTION_END)?;
    Some(description.trim()).filter(|d| !d.is_empty())
}

fn absorb_state(profile: &mut CreatorProfile, script: &str) {
    let Some(state) = EmbeddedState::detect(script, &STATE_MARKERS) else {
        return;
    };
    if let Some(name) = state.first_non_empty(&NAME) {
        fill(&mut profile.display_name, name);
    }
    if let Some(face) = state.first_non_empty(&FACE) {
        fill(&mut profile.avatar_url, face);
    }
    fill(&mut profile.level, u32::try_from(state.first_count(&LEVEL)).unwrap_or(0));
    if let Some(sign) = state.first_non_empty(&SIGN) {
        fill(&mut profile.description, sign);
    }
}

impl Bilibili<'_> {
    /// Builds a creator profile from the space page, the stats API, and
    /// (when a renderer is attached) the rendered space page.
    ///
    /// Each pass only fills fields still empty. A failing pass is logged and
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns the page error when both the page and the stats API fail.
    pub async fn fetch_profile(&self, uid: &str) -> Result<CreatorProfile, ScraperError> {
        let space_url = self.space_url(uid);
        let mut profile = CreatorProfile::new(Platform::Bilibili, uid, &space_url);

        let page_result = self.profile_page_pass(&space_url, &mut profile).await;
        if let Err(e) = &page_result {
            tracing::warn!(uid, error = %e, "bilibili space page fetch failed");
        }

        match self.stats_api_pass(uid, &space_url).await {
            Ok(stats) => profile.merge(stats),
            Err(e) => {
                tracing::warn!(uid, error = %e, "bilibili stats api failed");
                page_result?;
            }
        }

        if self.fetcher.has_renderer() {
            match self.rendered_pass(uid, &space_url).await {
                Ok(rendered) => profile.merge(rendered),
                Err(e) => tracing::debug!(uid, error = %e, "bilibili rendered pass skipped"),
            }
        }

        tracing::info!(
            uid,
            name = %profile.display_name,
            followers = profile.follower_count,
            "bilibili profile assembled"
        );
        Ok(profile)
    }

    async fn profile_page_pass(
        &self,
        space_url: &str,
        profile: &mut CreatorProfile,
    ) -> Result<(), ScraperError> {
        let mut collector = Collector::new(self.fetcher, FetchOptions::new());
        collector
            .on_html("title", |profile: &mut CreatorProfile, title| {
                if let Some(name) = name_from_title(&element_text(title)) {
                    fill(&mut profile.display_name, name.to_owned());
                }
            })?
            .on_html("meta[name='description']", |profile, meta| {
                if let Some(description) = meta.value().attr("content").and_then(description_from_meta) {
                    fill(&mut profile.description, description.to_owned());
                }
            })?
            .on_script(absorb_state);

        collector.visit(space_url, profile).await?;
        Ok(())
    }

    async fn stats_api_pass(
        &self,
        uid: &str,
        space_url: &str,
    ) -> Result<CreatorProfile, ScraperError> {
        let url = format!("{}/x/space/wbi/acc/info?mid={uid}", self.urls.api);
        let options = FetchOptions::new().referer(space_url).accept(API_ACCEPT);
        let envelope: AccInfoEnvelope = self.fetcher.get_json(&url, &options).await?;

        if envelope.code != 0 {
            return Err(ScraperError::Api {
                context: format!("bilibili acc/info for {uid}"),
                code: envelope.code,
                message: envelope.message,
            });
        }
        let info = envelope.data.unwrap_or_default();

        Ok(CreatorProfile {
            display_name: info.name,
            follower_count: info.follower,
            following_count: info.following,
            level: info.level,
            membership: MembershipTier::from_vip_type(info.vip.map_or(0, |v| v.vip_type)),
            description: info.sign,
            avatar_url: info.face,
            ..CreatorProfile::default()
        })
    }

    async fn rendered_pass(
        &self,
        uid: &str,
        space_url: &str,
    ) -> Result<CreatorProfile, ScraperError> {
        let options = FetchOptions::new().rendered(self.render_wait, Some(STATS_SCRIPT));
        let response = self.fetcher.fetch(space_url, &options).await?;

        let stats = match response.evaluate::<RenderedStats>() {
            ScriptOutcome::Value(stats) => stats,
            ScriptOutcome::Failed(reason) => {
                return Err(ScraperError::Render {
                    url: space_url.to_owned(),
                    reason: format!("stats script for {uid}: {reason}"),
                })
            }
        };

        Ok(CreatorProfile {
            display_name: stats.username,
            follower_count: count(&stats.follower),
            following_count: count(&stats.following),
            like_count: count(&stats.like),
            play_count: count(&stats.play),
            level: stats.level,
            membership: MembershipTier::from_vip_type(stats.vip_type),
            description: stats.description,
            avatar_url: stats.face,
            ..CreatorProfile::default()
        })
    }
}
