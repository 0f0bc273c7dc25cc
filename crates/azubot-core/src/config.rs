use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::app_config::{
    AppConfig, ConfigSource, DEFAULT_CONTENT_LIMIT, DEFAULT_ENRICH_CONCURRENCY,
    DEFAULT_ENRICH_PACING_MS, DEFAULT_LOG_LEVEL, DEFAULT_MAX_RETRIES, DEFAULT_RENDER_WAIT_MS,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_RETRY_BACKOFF_BASE_MS, DEFAULT_USER_AGENT,
};
use crate::ConfigError;

const DEFAULT_CONFIG_PATH: &str = "./config.yaml";

/// Load application configuration.
///
/// A YAML file at `AZUBOT_CONFIG_PATH` (default `./config.yaml`) takes
/// precedence over everything else when it exists. Otherwise `.env` is loaded
/// via `dotenvy` and settings are read from the process environment.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read or decoded, or if an
/// environment value is invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    let path = std::env::var("AZUBOT_CONFIG_PATH")
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    if path.exists() {
        return load_app_config_from_file(&path);
    }
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT look for a config file or load
/// `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Load application configuration from a YAML file.
///
/// # Errors
///
/// Returns [`ConfigError::ReadFile`] or [`ConfigError::DecodeFile`] when the
/// file is unreadable or malformed, and [`ConfigError::InvalidValue`] when a
/// tuning value is out of range.
pub fn load_app_config_from_file(path: &Path) -> Result<AppConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    parse_file_config(&raw, path)
}

/// On-disk layout. Only the four identity/webhook keys existed originally;
/// the tuning keys are optional and fall back to the same defaults as the
/// environment path.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    chat_webhook: Option<String>,
    system_webhook: Option<String>,
    youtube_default_user_id: Option<String>,
    bilibili_default_uid: Option<String>,
    log_level: Option<String>,
    request_timeout_secs: Option<u64>,
    user_agent: Option<String>,
    max_retries: Option<u32>,
    retry_backoff_base_ms: Option<u64>,
    enrich_concurrency: Option<usize>,
    enrich_pacing_ms: Option<u64>,
    content_limit: Option<usize>,
    render_url: Option<String>,
    render_wait_ms: Option<u64>,
}

fn parse_file_config(raw: &str, path: &Path) -> Result<AppConfig, ConfigError> {
    let file: FileConfig =
        serde_yaml::from_str(raw).map_err(|source| ConfigError::DecodeFile {
            path: path.to_path_buf(),
            source,
        })?;

    let enrich_concurrency = file
        .enrich_concurrency
        .unwrap_or(DEFAULT_ENRICH_CONCURRENCY);
    if enrich_concurrency == 0 {
        return Err(ConfigError::InvalidValue {
            key: "enrich_concurrency".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    Ok(AppConfig {
        source: ConfigSource::File(path.to_path_buf()),
        chat_webhook_url: non_empty(file.chat_webhook),
        system_webhook_url: non_empty(file.system_webhook),
        youtube_default_user_id: non_empty(file.youtube_default_user_id),
        bilibili_default_uid: non_empty(file.bilibili_default_uid),
        log_level: non_empty(file.log_level).unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        request_timeout_secs: file
            .request_timeout_secs
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        user_agent: non_empty(file.user_agent).unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        max_retries: file.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
        retry_backoff_base_ms: file
            .retry_backoff_base_ms
            .unwrap_or(DEFAULT_RETRY_BACKOFF_BASE_MS),
        enrich_concurrency,
        enrich_pacing_ms: file.enrich_pacing_ms.unwrap_or(DEFAULT_ENRICH_PACING_MS),
        content_limit: file.content_limit.unwrap_or(DEFAULT_CONTENT_LIMIT),
        render_url: non_empty(file.render_url),
        render_wait_ms: file.render_wait_ms.unwrap_or(DEFAULT_RENDER_WAIT_MS),
    })
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a pure
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let optional = |var: &str| -> Option<String> { non_empty(lookup(var).ok()) };

    let or_default = |var: &str, default: &str| -> String {
        optional(var).unwrap_or_else(|| default.to_string())
    };

    let parse_u32 = |var: &str, default: u32| -> Result<u32, ConfigError> {
        optional(var).map_or(Ok(default), |raw| {
            raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
        })
    };

    let parse_u64 = |var: &str, default: u64| -> Result<u64, ConfigError> {
        optional(var).map_or(Ok(default), |raw| {
            raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
        })
    };

    let parse_usize = |var: &str, default: usize| -> Result<usize, ConfigError> {
        optional(var).map_or(Ok(default), |raw| {
            raw.parse::<usize>().map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
        })
    };

    let enrich_concurrency = parse_usize("AZUBOT_ENRICH_CONCURRENCY", DEFAULT_ENRICH_CONCURRENCY)?;
    if enrich_concurrency == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "AZUBOT_ENRICH_CONCURRENCY".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    Ok(AppConfig {
        source: ConfigSource::Environment,
        chat_webhook_url: optional("DISCORD_CHAT_WEBHOOK_URL"),
        system_webhook_url: optional("DISCORD_SYS_WEBHOOK_URL"),
        youtube_default_user_id: optional("YOUTUBE_DEFAULT_USER_ID"),
        bilibili_default_uid: optional("BILIBILI_DEFAULT_UID"),
        log_level: or_default("AZUBOT_LOG_LEVEL", DEFAULT_LOG_LEVEL),
        request_timeout_secs: parse_u64(
            "AZUBOT_REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?,
        user_agent: or_default("AZUBOT_USER_AGENT", DEFAULT_USER_AGENT),
        max_retries: parse_u32("AZUBOT_MAX_RETRIES", DEFAULT_MAX_RETRIES)?,
        retry_backoff_base_ms: parse_u64(
            "AZUBOT_RETRY_BACKOFF_BASE_MS",
            DEFAULT_RETRY_BACKOFF_BASE_MS,
        )?,
        enrich_concurrency,
        enrich_pacing_ms: parse_u64("AZUBOT_ENRICH_PACING_MS", DEFAULT_ENRICH_PACING_MS)?,
        content_limit: parse_usize("AZUBOT_CONTENT_LIMIT", DEFAULT_CONTENT_LIMIT)?,
        render_url: optional("AZUBOT_RENDER_URL"),
        render_wait_ms: parse_u64("AZUBOT_RENDER_WAIT_MS", DEFAULT_RENDER_WAIT_MS)?,
    })
}

/// Blank strings count as unset, matching how empty YAML values and empty
/// env vars were treated originally.
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
