//! HTTP client wrapper for following short-link redirect chains.
//!
//! One `reqwest::Client` is built at startup and reused for every
//! expansion, so connections to the redirect servers are pooled.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, instrument};

use super::error::ResolveError;

/// Default total timeout for one expansion request (10 seconds).
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Browser-style User-Agent sent with expansion requests.
///
/// The redirect servers block obvious bot identities; a realistic
/// browser header keeps the logical GET indistinguishable from a click.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// HTTP client for expanding short links.
///
/// Redirects are followed automatically by the transport (reqwest's
/// default policy, up to 10 hops); the caller only ever sees the
/// terminal response.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a client with the default 10-second timeout.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self::with_timeout(REQUEST_TIMEOUT_SECS)
    }

    /// Creates a client with an explicit total timeout in seconds.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the
    /// supplied timeout configuration.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn with_timeout(timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .gzip(true)
            .user_agent(BROWSER_USER_AGENT)
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client }
    }

    /// Issues one logical GET and returns the terminal URL after redirects.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::Timeout` when the request deadline passes,
    /// `ResolveError::Status` when the chain ends in anything but 200,
    /// and `ResolveError::Network` for transport failures.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn get_final_url(&self, url: &str) -> Result<String, ResolveError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                ResolveError::timeout(url)
            } else {
                ResolveError::network(url, e)
            }
        })?;

        let status = response.status();
        if status.as_u16() != 200 {
            return Err(ResolveError::status(url, status.as_u16()));
        }

        let final_url = response.url().to_string();
        debug!(%final_url, "short link expanded");
        Ok(final_url)
    }

    /// Returns a reference to the underlying reqwest client.
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}
