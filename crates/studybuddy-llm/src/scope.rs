//! Per-call deadline and cancellation for external capability calls.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::LlmError;

/// Bounds applied to every embedding or generation call made on behalf of one
/// operation.
///
/// The timeout is per call, not per operation: building an index over 500 chunks
/// with a 30 s scope allows each embedding request 30 s.
#[derive(Debug, Clone, Default)]
pub struct CallScope {
    timeout: Option<Duration>,
    cancel: Option<CancellationToken>,
}

impl CallScope {
    /// A scope with no timeout and no cancellation.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    /// Run one capability call under this scope.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Cancelled`] if the token fires first,
    /// [`LlmError::Timeout`] if the timeout elapses first, otherwise the call's own
    /// result.
    pub async fn run<T, F>(&self, call: F) -> Result<T, LlmError>
    where
        F: Future<Output = Result<T, LlmError>>,
    {
        if self.is_cancelled() {
            return Err(LlmError::Cancelled);
        }

        let bounded = async {
            match self.timeout {
                Some(limit) => tokio::time::timeout(limit, call)
                    .await
                    .map_err(|_| LlmError::Timeout(limit))?,
                None => call.await,
            }
        };

        match &self.cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    () = token.cancelled() => Err(LlmError::Cancelled),
                    result = bounded => result,
                }
            }
            None => bounded.await,
        }
    }
}
