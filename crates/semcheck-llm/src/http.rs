//! Shared HTTP client construction for consistent timeout and TLS configuration.

use std::time::Duration;

/// Create the HTTP client used by the HTTP-backed providers.
///
/// Config: 10s connect timeout, `timeout` request timeout, rustls TLS,
/// `semcheck/{version}` user-agent, redirect limit 10.
///
/// Falls back to a default client if the builder rejects the configuration.
#[must_use]
pub fn default_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .timeout(timeout)
        .user_agent(concat!("semcheck/", env!("CARGO_PKG_VERSION")))
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .unwrap_or_default()
}
