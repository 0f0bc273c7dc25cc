//! Shared configuration, domain records, and field-level helpers for azubot.
//!
//! Every record here is created fresh per task invocation, filled in during
//! the fetch/extract/enrich phase, and discarded after formatting.

pub mod app_config;
pub mod config;
pub mod creator;
pub mod error;
pub mod merge;
pub mod normalize;
pub mod ranking;
pub mod trending;
pub mod vocaloid;

pub use app_config::{AppConfig, ConfigSource};
pub use config::{load_app_config, load_app_config_from_env, load_app_config_from_file};
pub use creator::{ContentItem, CreatorProfile, CreatorReport, MembershipTier, Platform};
pub use error::{ConfigError, ParseError};
pub use merge::{fill, Fill};
pub use normalize::{format_duration, format_magnitude, parse_magnitude};
pub use ranking::{BoardKind, RankBoard, RankEntry, RankSnapshot, Trend};
pub use trending::TrendingEntry;
pub use vocaloid::VocaloidEntry;
