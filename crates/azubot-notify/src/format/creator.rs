use azubot_core::{
    format_magnitude, ContentItem, CreatorProfile, CreatorReport, MembershipTier, Platform,
};

/// Videos per message after the profile summary.
pub const CONTENT_ITEMS_PER_CHUNK: usize = 5;

/// Profile summary chunk followed by the recent uploads,
/// [`CONTENT_ITEMS_PER_CHUNK`] per chunk.
#[must_use]
pub fn creator_chunks(report: &CreatorReport) -> Vec<String> {
    let platform = report.profile.platform;
    let mut chunks = vec![profile_summary(&report.profile)];

    for (chunk_idx, items) in report.items.chunks(CONTENT_ITEMS_PER_CHUNK).enumerate() {
        let mut chunk = String::new();
        if chunk_idx == 0 {
            chunk.push_str("## 最新视频\n");
        }
        for (offset, item) in items.iter().enumerate() {
            let rank = chunk_idx * CONTENT_ITEMS_PER_CHUNK + offset + 1;
            push_item(&mut chunk, platform, rank, item);
        }
        chunks.push(chunk);
    }
    chunks
}

fn field(out: &mut String, label: &str, value: &str) {
    out.push_str(&format!("**{label}**: {value}\n"));
}

fn profile_summary(profile: &CreatorProfile) -> String {
    let mut out = format!("# {} 用户信息\n", profile.platform.display_name());
    match profile.platform {
        Platform::Bilibili => {
            field(&mut out, "用户名", &profile.display_name);
            field(&mut out, "UID", &profile.id);
            field(&mut out, "粉丝数", &format_magnitude(profile.follower_count));
            field(&mut out, "关注数", &format_magnitude(profile.following_count));
            field(&mut out, "获赞数", &format_magnitude(profile.like_count));
            field(&mut out, "播放数", &format_magnitude(profile.play_count));
            field(&mut out, "等级", &format!("Lv.{}", profile.level));
            match profile.membership {
                MembershipTier::Monthly => field(&mut out, "会员类型", "月度大会员"),
                MembershipTier::Yearly => field(&mut out, "会员类型", "年度大会员"),
                MembershipTier::None => {}
            }
            field(&mut out, "个人空间", &profile.profile_url);
        }
        Platform::YouTube => {
            field(&mut out, "频道名称", &profile.display_name);
            field(&mut out, "用户ID", &profile.id);
            field(&mut out, "订阅数", &format_magnitude(profile.follower_count));
            field(&mut out, "视频总数", &format_magnitude(profile.content_count));
            field(&mut out, "频道链接", &profile.profile_url);
        }
    }
    if !profile.description.is_empty() {
        field(&mut out, "简介", &profile.description);
    }
    out.push('\n');
    out
}

fn push_item(out: &mut String, platform: Platform, rank: usize, item: &ContentItem) {
    out.push_str(&format!("### {rank}. [{}]({})\n", item.title, item.url));

    let view_label = match platform {
        Platform::Bilibili => "播放量",
        Platform::YouTube => "观看次数",
    };
    let mut counters = vec![(view_label, item.view_count), ("点赞数", item.like_count)];
    if platform == Platform::Bilibili {
        counters.push(("投币数", item.coin_count));
        counters.push(("收藏数", item.favorite_count));
    }
    for (label, count) in counters {
        if count > 0 {
            field(out, label, &format_magnitude(count));
        }
    }

    if !item.published_at.is_empty() {
        field(out, "发布时间", &item.published_at);
    }
    if !item.duration.is_empty() {
        field(out, "时长", &item.duration);
    }
    out.push('\n');
}
