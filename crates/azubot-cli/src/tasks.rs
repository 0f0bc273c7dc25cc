//! Task dispatch: extract, enrich, format, deliver.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;

use azubot_core::AppConfig;
use azubot_notify::{Deliver, DeliveryError, DiscordWebhook};
use azubot_scraper::{
    Bilibili, EnrichOptions, Fetcher, GithubTrending, HttpRenderer, OriconRanking, VocaDb, YouTube,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum Task {
    OriconRanking,
    GithubTrending,
    VocaloidRanking,
    YoutubeUser,
    BilibiliUser,
}

/// Which configured webhook a task posts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Chat,
    System,
}

impl Task {
    /// Sender name shown on delivered messages.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Task::OriconRanking => "Oricon Ranking",
            Task::GithubTrending => "Github Trending",
            Task::VocaloidRanking => "Vocaloid Ranking",
            Task::YoutubeUser => "YouTube User Info",
            Task::BilibiliUser => "Bilibili User Info",
        }
    }

    #[must_use]
    pub fn channel(self) -> Channel {
        match self {
            Task::OriconRanking => Channel::System,
            _ => Channel::Chat,
        }
    }
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Task::OriconRanking => "oricon_ranking",
            Task::GithubTrending => "github_trending",
            Task::VocaloidRanking => "vocaloid_ranking",
            Task::YoutubeUser => "youtube_user",
            Task::BilibiliUser => "bilibili_user",
        };
        f.write_str(name)
    }
}

/// Prints chunks to stdout instead of posting them.
struct DryRun;

#[async_trait]
impl Deliver for DryRun {
    async fn send(&self, messages: &[String], display_name: &str) -> Result<(), DeliveryError> {
        for (index, message) in messages.iter().enumerate() {
            println!("----- {display_name} [{}/{}] -----", index + 1, messages.len());
            println!("{message}");
        }
        Ok(())
    }
}

/// Runs one task end to end.
///
/// # Errors
///
/// Returns an error when configuration is incomplete, the primary fetch
/// fails, or delivery fails.
pub async fn run(
    task: Task,
    id_override: Option<&str>,
    dry_run: bool,
    config: &AppConfig,
) -> anyhow::Result<()> {
    // Resolve the sink before scraping so a missing webhook fails fast.
    let sink: Box<dyn Deliver> = if dry_run {
        Box::new(DryRun)
    } else {
        let url = webhook_url(task.channel(), config)?;
        Box::new(DiscordWebhook::new(url, config.request_timeout_secs)?)
    };

    let fetcher = build_fetcher(config)?;
    let chunks = collect_chunks(task, id_override, config, &fetcher).await?;
    if chunks.is_empty() {
        tracing::warn!(task = %task, "nothing extracted, skipping delivery");
        return Ok(());
    }

    sink.send(&chunks, task.display_name())
        .await
        .with_context(|| format!("failed to deliver {task} messages"))?;
    Ok(())
}

fn webhook_url(channel: Channel, config: &AppConfig) -> anyhow::Result<&str> {
    let (url, key) = match channel {
        Channel::Chat => (config.chat_webhook_url.as_deref(), "chat_webhook"),
        Channel::System => (config.system_webhook_url.as_deref(), "system_webhook"),
    };
    url.filter(|u| !u.trim().is_empty())
        .ok_or_else(|| anyhow::anyhow!("{key} is not configured"))
}

fn build_fetcher(config: &AppConfig) -> anyhow::Result<Fetcher> {
    let fetcher = Fetcher::from_config(config)?;
    match config.render_url.as_deref() {
        Some(endpoint) => {
            let renderer = HttpRenderer::new(endpoint, config.request_timeout_secs)?;
            tracing::debug!(endpoint, "rendered fetches enabled");
            Ok(fetcher.with_renderer(Arc::new(renderer)))
        }
        None => Ok(fetcher),
    }
}

/// Override first, then the configured default for the platform.
fn resolve_identity(
    id_override: Option<&str>,
    default: Option<&str>,
    key: &str,
) -> anyhow::Result<String> {
    id_override
        .or(default)
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| anyhow::anyhow!("no identity given: pass --id or set {key}"))
}

async fn collect_chunks(
    task: Task,
    id_override: Option<&str>,
    config: &AppConfig,
    fetcher: &Fetcher,
) -> anyhow::Result<Vec<String>> {
    let enrich_options = EnrichOptions::from_config(config);

    let chunks = match task {
        Task::OriconRanking => {
            let snapshot = OriconRanking::new(fetcher)?
                .fetch_snapshot()
                .await
                .context("failed to fetch oricon ranking")?;
            azubot_notify::ranking_chunks(&snapshot)
        }
        Task::GithubTrending => {
            let entries = GithubTrending::new(fetcher)
                .fetch_trending()
                .await
                .context("failed to fetch github trending")?;
            azubot_notify::trending_chunks(&entries)
        }
        Task::VocaloidRanking => {
            let vocadb = VocaDb::new(fetcher);
            let mut entries = vocadb
                .top_rated()
                .await
                .context("failed to fetch vocadb ranking")?;
            let report = vocadb.attach_pv_links(&mut entries, enrich_options).await;
            tracing::info!(
                songs = entries.len(),
                linked = report.enriched,
                "vocaloid ranking assembled"
            );
            azubot_notify::vocaloid_chunks(&entries)
        }
        Task::YoutubeUser => {
            let id = resolve_identity(
                id_override,
                config.youtube_default_user_id.as_deref(),
                "YOUTUBE_DEFAULT_USER_ID",
            )?;
            let (report, enrichment) = YouTube::new(fetcher)
                .creator_report(&id, config.content_limit, enrich_options)
                .await
                .with_context(|| format!("failed to fetch youtube channel {id}"))?;
            tracing::info!(
                id = %id,
                videos = report.items.len(),
                enriched = enrichment.enriched,
                "youtube report assembled"
            );
            azubot_notify::creator_chunks(&report)
        }
        Task::BilibiliUser => {
            let uid = resolve_identity(
                id_override,
                config.bilibili_default_uid.as_deref(),
                "BILIBILI_DEFAULT_UID",
            )?;
            let (report, enrichment) = Bilibili::new(fetcher)
                .render_wait(Duration::from_millis(config.render_wait_ms))
                .creator_report(&uid, config.content_limit, enrich_options)
                .await
                .with_context(|| format!("failed to fetch bilibili user {uid}"))?;
            tracing::info!(
                uid = %uid,
                videos = report.items.len(),
                enriched = enrichment.enriched,
                "bilibili report assembled"
            );
            azubot_notify::creator_chunks(&report)
        }
    };
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use azubot_core::ConfigSource;

    #[test]
    fn ranking_goes_to_system_channel() {
        assert_eq!(Task::OriconRanking.channel(), Channel::System);
        for task in [
            Task::GithubTrending,
            Task::VocaloidRanking,
            Task::YoutubeUser,
            Task::BilibiliUser,
        ] {
            assert_eq!(task.channel(), Channel::Chat, "{task}");
        }
    }

    #[test]
    fn identity_override_wins() {
        assert_eq!(
            resolve_identity(Some("42"), Some("7"), "BILIBILI_DEFAULT_UID").unwrap(),
            "42"
        );
        assert_eq!(
            resolve_identity(None, Some(" 7 "), "BILIBILI_DEFAULT_UID").unwrap(),
            "7"
        );
    }

    #[test]
    fn missing_identity_names_the_setting() {
        let err = resolve_identity(None, None, "YOUTUBE_DEFAULT_USER_ID").unwrap_err();
        assert!(err.to_string().contains("YOUTUBE_DEFAULT_USER_ID"));
        assert!(resolve_identity(Some("  "), None, "X").is_err());
    }

    #[test]
    fn blank_webhook_is_not_configured() {
        let config = AppConfig {
            source: ConfigSource::Environment,
            chat_webhook_url: Some("https://discord.test/hook".to_owned()),
            system_webhook_url: Some("  ".to_owned()),
            youtube_default_user_id: None,
            bilibili_default_uid: None,
            log_level: "info".to_owned(),
            request_timeout_secs: 5,
            user_agent: "azubot-test/0.1".to_owned(),
            max_retries: 0,
            retry_backoff_base_ms: 0,
            enrich_concurrency: 5,
            enrich_pacing_ms: 0,
            content_limit: 10,
            render_url: None,
            render_wait_ms: 0,
        };

        assert!(webhook_url(Channel::System, &config).is_err());
        assert_eq!(
            webhook_url(Channel::Chat, &config).unwrap(),
            "https://discord.test/hook"
        );
    }

    #[tokio::test]
    async fn dry_run_never_fails() {
        DryRun
            .send(&["a".to_owned(), "b".to_owned()], "Github Trending")
            .await
            .unwrap();
    }
}
