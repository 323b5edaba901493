//! Short-link resolution: expanding `amzn.to`-style redirect links to
//! their terminal product URLs.
//!
//! # Contract
//!
//! - Non-short input passes through untouched, with no network call.
//! - Short input is looked up in a bounded LRU cache first; hits skip
//!   the network entirely.
//! - Misses issue one logical GET (redirects followed by the transport)
//!   retried on transient transport failures per [`RetryPolicy`].
//! - Only a terminal 200 populates the cache; timeouts and failures
//!   leave no partial entries behind.
//!
//! Concurrent misses for the same key each make their own request (last
//! write wins, values are identical). Single-flight dedup is a possible
//! improvement, not part of the contract.

mod cache;
mod client;
mod error;
mod retry;

pub use cache::{DEFAULT_CACHE_CAPACITY, UrlCache};
pub use client::{BROWSER_USER_AGENT, HttpClient, REQUEST_TIMEOUT_SECS};
pub use error::ResolveError;
pub use retry::{DEFAULT_MAX_ATTEMPTS, FailureType, RetryDecision, RetryPolicy, classify_error};

use tracing::{debug, info, instrument};

use crate::classify::is_short_form;

/// The outcome of resolving a query URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUrl {
    /// The URL as it appeared in the query.
    pub original: String,
    /// Either `original` (no expansion needed) or the terminal URL
    /// reached after following redirects.
    pub final_url: String,
    /// Whether a network expansion took place (or was served from cache).
    pub was_expanded: bool,
}

impl ResolvedUrl {
    /// A passthrough result for URLs that need no expansion.
    #[must_use]
    pub fn passthrough(url: &str) -> Self {
        Self {
            original: url.to_string(),
            final_url: url.to_string(),
            was_expanded: false,
        }
    }
}

/// Resolver combining the HTTP transport, the bounded cache and the
/// retry policy. Designed to be wrapped in `Arc` and shared across
/// concurrent pipeline invocations.
#[derive(Debug)]
pub struct Resolver {
    client: HttpClient,
    cache: UrlCache,
    policy: RetryPolicy,
}

impl Resolver {
    /// Creates a resolver with explicit transport, cache capacity and policy.
    #[must_use]
    pub fn new(client: HttpClient, cache_capacity: usize, policy: RetryPolicy) -> Self {
        Self {
            client,
            cache: UrlCache::new(cache_capacity),
            policy,
        }
    }

    /// Resolves a query URL to its terminal form.
    ///
    /// # Errors
    ///
    /// Returns the last [`ResolveError`] once retries are exhausted or a
    /// permanent failure occurs. Callers treat this as "could not
    /// expand", not as a fatal pipeline error.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn resolve(&self, url: &str) -> Result<ResolvedUrl, ResolveError> {
        if !is_short_form(url) {
            return Ok(ResolvedUrl::passthrough(url));
        }

        if let Some(final_url) = self.cache.get(url).await {
            return Ok(ResolvedUrl {
                original: url.to_string(),
                final_url,
                was_expanded: true,
            });
        }

        let final_url = self.expand_with_retry(url).await?;
        self.cache
            .insert(url.to_string(), final_url.clone())
            .await;

        Ok(ResolvedUrl {
            original: url.to_string(),
            final_url,
            was_expanded: true,
        })
    }

    /// Expands a short link with retry on transient transport failures.
    async fn expand_with_retry(&self, url: &str) -> Result<String, ResolveError> {
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            debug!(attempt, "attempting expansion");

            match self.client.get_final_url(url).await {
                Ok(final_url) => return Ok(final_url),
                Err(e) => {
                    let failure_type = classify_error(&e);
                    match self.policy.should_retry(failure_type, attempt) {
                        RetryDecision::Retry {
                            delay,
                            attempt: next_attempt,
                        } => {
                            info!(
                                url = %url,
                                attempt = next_attempt,
                                max_attempts = self.policy.max_attempts(),
                                delay_ms = delay.as_millis(),
                                error = %e,
                                "retrying expansion"
                            );
                            tokio::time::sleep(delay).await;
                        }
                        RetryDecision::DoNotRetry { reason } => {
                            debug!(url = %url, %reason, "not retrying expansion");
                            return Err(e);
                        }
                    }
                }
            }
        }
    }

    /// Returns the number of cached expansions (for status reporting).
    pub async fn cached_entries(&self) -> usize {
        self.cache.len().await
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(HttpClient::new(), DEFAULT_CACHE_CAPACITY, RetryPolicy::default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Policy with millisecond delays so retry tests stay fast.
    fn fast_policy() -> RetryPolicy {
        RetryPolicy::new(
            3,
            std::time::Duration::from_millis(10),
            std::time::Duration::from_millis(50),
            2.0,
        )
    }

    #[tokio::test]
    async fn test_resolve_passthrough_for_full_urls() {
        // A resolver whose transport points nowhere: passthrough must not
        // touch the network.
        let resolver = Resolver::new(HttpClient::with_timeout(1), 10, fast_policy());
        let resolved = resolver
            .resolve("https://www.amazon.it/dp/B08N5WRWNW")
            .await
            .unwrap();
        assert!(!resolved.was_expanded);
        assert_eq!(resolved.final_url, "https://www.amazon.it/dp/B08N5WRWNW");
        assert_eq!(resolved.original, resolved.final_url);
    }

    #[tokio::test]
    async fn test_resolve_short_link_caches_result() {
        let server = MockServer::start().await;

        // expect(1): the second resolve must come from cache.
        Mock::given(method("GET"))
            .and(path("/amzn.to/abc123"))
            .respond_with(
                ResponseTemplate::new(301)
                    .insert_header("Location", format!("{}/dp/B08N5WRWNW", server.uri())),
            )
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/dp/B08N5WRWNW"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let resolver = Resolver::new(HttpClient::new(), 10, fast_policy());
        let short = format!("{}/amzn.to/abc123", server.uri());

        let first = resolver.resolve(&short).await.unwrap();
        assert!(first.was_expanded);
        assert!(first.final_url.ends_with("/dp/B08N5WRWNW"));

        let second = resolver.resolve(&short).await.unwrap();
        assert_eq!(second.final_url, first.final_url);
        assert_eq!(resolver.cached_entries().await, 1);
    }

    #[tokio::test]
    async fn test_resolve_http_error_not_retried_and_not_cached() {
        let server = MockServer::start().await;

        // expect(1): application statuses are terminal, no retry.
        Mock::given(method("GET"))
            .and(path("/amzn.to/dead"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let resolver = Resolver::new(HttpClient::new(), 10, fast_policy());
        let short = format!("{}/amzn.to/dead", server.uri());

        let result = resolver.resolve(&short).await;
        assert!(matches!(result, Err(ResolveError::Status { status: 500, .. })));
        assert_eq!(resolver.cached_entries().await, 0, "failures must not be cached");
    }

    #[tokio::test]
    async fn test_resolve_transient_failure_retried_exactly_three_times() {
        let server = MockServer::start().await;

        // Each attempt times out (1s client timeout, 3s response delay).
        Mock::given(method("GET"))
            .and(path("/amzn.to/slow"))
            .respond_with(
                ResponseTemplate::new(200).set_delay(std::time::Duration::from_secs(3)),
            )
            .expect(3)
            .mount(&server)
            .await;

        let resolver = Resolver::new(HttpClient::with_timeout(1), 10, fast_policy());
        let short = format!("{}/amzn.to/slow", server.uri());

        let result = resolver.resolve(&short).await;
        assert!(result.is_err(), "expansion should fail after 3 attempts");
        assert_eq!(resolver.cached_entries().await, 0);
    }

    #[tokio::test]
    async fn test_resolve_retry_then_success() {
        let server = MockServer::start().await;

        // First attempt times out, second succeeds.
        Mock::given(method("GET"))
            .and(path("/amzn.to/flaky"))
            .respond_with(
                ResponseTemplate::new(200).set_delay(std::time::Duration::from_secs(3)),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/amzn.to/flaky"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let resolver = Resolver::new(HttpClient::with_timeout(1), 10, fast_policy());
        let short = format!("{}/amzn.to/flaky", server.uri());

        let resolved = resolver.resolve(&short).await.unwrap();
        assert!(resolved.was_expanded);
    }
}
