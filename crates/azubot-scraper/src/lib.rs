//! Fetching and extraction for azubot's upstream sites.
//!
//! [`Fetcher`] and [`Collector`] do the HTTP work; the [`sources`] modules
//! turn pages and API responses into `azubot_core` records; [`enrich`] fills
//! coarse records from per-item detail pages.

pub mod enrich;
pub mod error;
pub mod fetch;
pub mod pattern;
pub(crate) mod rate_limit;
pub mod render;
pub mod sources;

pub use enrich::{enrich, EnrichOptions, EnrichReport, Enrichable};
pub use error::ScraperError;
pub use fetch::{Collector, FetchOptions, Fetcher, RawResponse};
pub use render::{HttpRenderer, RenderRequest, RenderedPage, Renderer, ScriptOutcome};
pub use sources::{
    Bilibili, BilibiliUrls, ChannelIdentity, GithubTrending, OriconRanking, VocaDb, YouTube,
};
