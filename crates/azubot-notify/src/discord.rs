//! Discord-compatible webhook delivery.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;

use crate::error::DeliveryError;

/// Sends formatted chunks to a chat channel.
#[async_trait]
pub trait Deliver: Send + Sync {
    /// Sends each message in order under `display_name`. Stops at the first
    /// failure; messages after it are not sent.
    async fn send(&self, messages: &[String], display_name: &str) -> Result<(), DeliveryError>;
}

#[derive(Debug, Serialize)]
struct WebhookMessage<'a> {
    username: &'a str,
    content: &'a str,
}

/// Posts messages to one webhook URL.
pub struct DiscordWebhook {
    client: Client,
    url: Url,
}

impl std::fmt::Debug for DiscordWebhook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordWebhook")
            .field("host", &self.url.host_str())
            .finish_non_exhaustive()
    }
}

impl DiscordWebhook {
    /// # Errors
    ///
    /// Returns [`DeliveryError::InvalidWebhook`] if `url` does not parse, or
    /// [`DeliveryError::Http`] if the client cannot be built.
    pub fn new(url: &str, timeout_secs: u64) -> Result<Self, DeliveryError> {
        let url = Url::parse(url).map_err(|e| DeliveryError::InvalidWebhook {
            reason: e.to_string(),
        })?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, url })
    }

    async fn post(&self, index: usize, message: &WebhookMessage<'_>) -> Result<(), DeliveryError> {
        let response = self.client.post(self.url.clone()).json(message).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(DeliveryError::Rejected {
            index,
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl Deliver for DiscordWebhook {
    async fn send(&self, messages: &[String], display_name: &str) -> Result<(), DeliveryError> {
        for (index, content) in messages.iter().enumerate() {
            let message = WebhookMessage {
                username: display_name,
                content,
            };
            if let Err(e) = self.post(index, &message).await {
                tracing::warn!(
                    sender = display_name,
                    index,
                    remaining = messages.len() - index - 1,
                    error = %e,
                    "webhook delivery failed, aborting remaining messages"
                );
                return Err(e);
            }
            tracing::debug!(sender = display_name, index, "webhook message delivered");
        }
        tracing::info!(sender = display_name, count = messages.len(), "messages delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_url() {
        let err = DiscordWebhook::new("not a url", 5).unwrap_err();
        assert!(matches!(err, DeliveryError::InvalidWebhook { .. }));
    }

    #[test]
    fn debug_hides_webhook_token() {
        let webhook =
            DiscordWebhook::new("https://discord.com/api/webhooks/123/secret-token", 5).unwrap();
        let rendered = format!("{webhook:?}");
        assert!(rendered.contains("discord.com"));
        assert!(!rendered.contains("secret-token"));
    }
}
