//! Shared HTTP client construction for consistent timeout and TLS configuration.

use std::time::Duration;

/// Create the HTTP client used by the OpenAI-compatible provider.
///
/// Config: 30s connect timeout, 300s request timeout (the per-call [`CallScope`]
/// is the real deadline), rustls TLS, `studybuddy/{version}` user-agent.
///
/// [`CallScope`]: crate::CallScope
#[must_use]
pub fn default_client() -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(30))
        .timeout(Duration::from_secs(300))
        .user_agent(concat!("studybuddy/", env!("CARGO_PKG_VERSION")))
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .expect("default HTTP client construction must not fail")
}
