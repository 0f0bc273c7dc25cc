//! Retry policy for page and API fetches.
//!
//! 429s, 5xx responses and connect/timeout failures are transient. Anything
//! else (404, other 4xx, decode errors, allow-list refusals) is returned on
//! the first occurrence.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

const MAX_DELAY_MS: u64 = 30_000;

fn is_transient(err: &ScraperError) -> bool {
    match err {
        ScraperError::RateLimited { .. } => true,
        ScraperError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
        ScraperError::UnexpectedStatus { status, .. } => *status >= 500,
        _ => false,
    }
}

/// Wait before retry number `attempt + 1`, before jitter.
///
/// Doubles from `base_ms` per attempt. A server-supplied `Retry-After` is
/// honoured when it is longer. Both are capped at 30 s.
fn backoff_ms(base_ms: u64, attempt: u32, err: &ScraperError) -> u64 {
    let exponential = base_ms.saturating_mul(1u64 << attempt.min(32));
    let requested = match err {
        ScraperError::RateLimited {
            retry_after_secs, ..
        } => retry_after_secs.saturating_mul(1_000),
        _ => 0,
    };
    exponential.max(requested).min(MAX_DELAY_MS)
}

/// Scales `ms` by a random factor in `[0.75, 1.25)`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn jittered(ms: u64) -> u64 {
    (ms as f64 * (0.75 + rand::random::<f64>() * 0.5)) as u64
}

/// Runs `operation` until it succeeds, fails permanently, or has been
/// retried `max_retries` times. `max_retries = 2` means at most three calls.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut attempt = 0u32;
    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if !is_transient(&err) || attempt >= max_retries => return Err(err),
            Err(err) => err,
        };

        let delay_ms = jittered(backoff_ms(backoff_base_ms, attempt, &err));
        attempt += 1;
        tracing::warn!(
            attempt,
            max_retries,
            delay_ms,
            error = %err,
            "transient fetch error, backing off"
        );
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
}
