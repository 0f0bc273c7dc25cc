//! Message formatting and chat-webhook delivery.

pub mod discord;
pub mod error;
pub mod format;

pub use discord::{Deliver, DiscordWebhook};
pub use error::DeliveryError;
pub use format::{
    creator_chunks, ranking_chunks, trend_emoji, trending_chunks, vocaloid_chunks,
    CONTENT_ITEMS_PER_CHUNK, TRENDING_DISPLAY_LIMIT, VOCALOID_ENTRIES_PER_CHUNK,
};
