use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("webhook rejected message {index} with status {status}: {body}")]
    Rejected {
        index: usize,
        status: u16,
        body: String,
    },

    #[error("invalid webhook URL: {reason}")]
    InvalidWebhook { reason: String },
}
