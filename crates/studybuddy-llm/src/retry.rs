use std::future::Future;
use std::time::Duration;

use crate::error::LlmError;

const BASE_BACKOFF_MS: u64 = 500;

pub(crate) fn backoff(attempt: u32) -> Duration {
    Duration::from_millis(BASE_BACKOFF_MS << attempt.min(6))
}

/// Run `f`, retrying up to `max_retries` times while it fails with a transient
/// error (`LlmError::is_transient`). Permanent errors, timeouts and cancellation
/// return immediately.
///
/// The library never retries on its own; callers opt in by wrapping an operation.
///
/// # Errors
///
/// Returns the last error once attempts are exhausted, or the first permanent one.
pub async fn retry_transient<T, E, F, Fut>(max_retries: u32, mut f: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Transient + std::fmt::Display,
{
    let mut attempt = 0;
    loop {
        match f().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < max_retries => {
                let delay = backoff(attempt);
                tracing::warn!(
                    "transient failure: {e}, retrying in {}ms ({}/{max_retries})",
                    delay.as_millis(),
                    attempt + 1
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Errors that can tell whether retrying might help.
pub trait Transient {
    fn is_transient(&self) -> bool;
}

impl Transient for LlmError {
    fn is_transient(&self) -> bool {
        LlmError::is_transient(self)
    }
}
