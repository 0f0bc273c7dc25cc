//! Creator profile and content item records.

use crate::merge::fill;

/// Video platform a creator record came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Platform {
    #[default]
    Bilibili,
    YouTube,
}

impl Platform {
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Platform::Bilibili => "Bilibili",
            Platform::YouTube => "YouTube",
        }
    }
}

/// Paid membership tier (Bilibili "大会员").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MembershipTier {
    #[default]
    None,
    Monthly,
    Yearly,
}

impl MembershipTier {
    /// Maps the numeric `vipType` used by the upstream API (0 none, 1 monthly,
    /// 2 yearly). Unknown codes are treated as no membership.
    #[must_use]
    pub fn from_vip_type(code: i64) -> Self {
        match code {
            1 => MembershipTier::Monthly,
            2 => MembershipTier::Yearly,
            _ => MembershipTier::None,
        }
    }
}

/// A creator's public profile, assembled from several sources.
///
/// `id` and `profile_url` are fixed when the record is created; everything
/// else is filled by [`CreatorProfile::merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatorProfile {
    pub platform: Platform,
    pub id: String,
    pub display_name: String,
    pub follower_count: u64,
    pub following_count: u64,
    pub like_count: u64,
    pub play_count: u64,
    pub content_count: u64,
    pub level: u32,
    pub membership: MembershipTier,
    pub description: String,
    pub avatar_url: String,
    pub profile_url: String,
}

impl CreatorProfile {
    #[must_use]
    pub fn new(platform: Platform, id: &str, profile_url: &str) -> Self {
        Self {
            platform,
            id: id.to_owned(),
            profile_url: profile_url.to_owned(),
            ..Self::default()
        }
    }

    /// Merges a lower-priority partial profile into `self` under the
    /// first-writer-wins rule. Identity fields are never touched.
    pub fn merge(&mut self, other: CreatorProfile) {
        fill(&mut self.display_name, other.display_name);
        fill(&mut self.follower_count, other.follower_count);
        fill(&mut self.following_count, other.following_count);
        fill(&mut self.like_count, other.like_count);
        fill(&mut self.play_count, other.play_count);
        fill(&mut self.content_count, other.content_count);
        fill(&mut self.level, other.level);
        fill(&mut self.membership, other.membership);
        fill(&mut self.description, other.description);
        fill(&mut self.avatar_url, other.avatar_url);
    }
}

/// One uploaded video. Created coarse from a listing page and later enriched
/// from its detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentItem {
    /// `bvid` or `videoId`.
    pub id: String,
    pub title: String,
    pub view_count: u64,
    pub like_count: u64,
    pub coin_count: u64,
    pub favorite_count: u64,
    pub share_count: u64,
    pub comment_count: u64,
    /// Display form of the upload time (`YYYY-MM-DD HH:MM:SS`, an ISO date, or
    /// relative text such as "3 days ago", depending on the source).
    pub published_at: String,
    /// Clock form, `M:SS` or `H:MM:SS`.
    pub duration: String,
    pub description: String,
    pub cover_url: String,
    pub url: String,
    pub author: String,
}

impl ContentItem {
    #[must_use]
    pub fn new(id: &str, url: &str) -> Self {
        Self {
            id: id.to_owned(),
            url: url.to_owned(),
            ..Self::default()
        }
    }

    /// Fills gaps in `self` from a detail record. Fields already populated by
    /// the coarse pass are kept; `id` never changes.
    pub fn merge(&mut self, detail: ContentItem) {
        fill(&mut self.title, detail.title);
        fill(&mut self.view_count, detail.view_count);
        fill(&mut self.like_count, detail.like_count);
        fill(&mut self.coin_count, detail.coin_count);
        fill(&mut self.favorite_count, detail.favorite_count);
        fill(&mut self.share_count, detail.share_count);
        fill(&mut self.comment_count, detail.comment_count);
        fill(&mut self.published_at, detail.published_at);
        fill(&mut self.duration, detail.duration);
        fill(&mut self.description, detail.description);
        fill(&mut self.cover_url, detail.cover_url);
        fill(&mut self.url, detail.url);
        fill(&mut self.author, detail.author);
    }
}

/// A creator profile with its most recent uploads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatorReport {
    pub profile: CreatorProfile,
    pub items: Vec<ContentItem>,
}
