//! Retry with exponential backoff for transient Shopify failures.

use std::future::Future;
use std::time::Duration;

use crate::error::ShopifyError;

/// Throttling and network failures are transient; everything else (user
/// errors, handle conflicts, parse failures) is propagated immediately.
fn is_retriable(err: &ShopifyError) -> bool {
    matches!(err, ShopifyError::Throttled | ShopifyError::Http(_))
}

/// Executes `operation` with exponential backoff retries on transient
/// errors, up to `max_retries` additional attempts after the first try.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, ShopifyError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ShopifyError>>,
{
    let mut last_err;
    let mut attempt = 0u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                last_err = err;
            }
        }

        let delay_secs = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
        tracing::warn!(
            attempt,
            max_retries,
            delay_secs,
            error = %last_err,
            "transient Shopify error — retrying after backoff"
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}
