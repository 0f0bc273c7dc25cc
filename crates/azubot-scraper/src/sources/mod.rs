//! One scraper per upstream site.

pub mod bilibili;
pub mod github_trending;
pub mod oricon;
pub mod vocadb;
pub mod youtube;

pub use bilibili::{Bilibili, BilibiliUrls};
pub use github_trending::GithubTrending;
pub use oricon::OriconRanking;
pub use vocadb::VocaDb;
pub use youtube::{ChannelIdentity, YouTube};
