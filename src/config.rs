//! Runtime settings, sourced from the environment with defaults.
//!
//! The partner tag is the only secret; it is resolved once at startup
//! and injected into the pipeline, never re-read per query.

use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::limiter::DEFAULT_MAX_PER_MINUTE;
use crate::resolve::{DEFAULT_CACHE_CAPACITY, DEFAULT_MAX_ATTEMPTS, REQUEST_TIMEOUT_SECS};

/// Default path of the durable metrics file.
pub const DEFAULT_METRICS_FILE: &str = "partnerlink_metrics.json";

/// Resolved configuration consumed by the pipeline components.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Maximum admitted queries per caller per minute.
    pub max_queries_per_minute: usize,
    /// Capacity of the short-URL cache.
    pub cache_capacity: usize,
    /// Total expansion attempts per short link.
    pub retry_attempts: u32,
    /// Base backoff delay between attempts.
    pub retry_base_delay: Duration,
    /// Backoff delay cap.
    pub retry_max_delay: Duration,
    /// Total timeout for one expansion request.
    pub request_timeout: Duration,
    /// Affiliate partner tag appended to every generated link.
    pub partner_tag: String,
    /// Path of the durable metrics file.
    pub metrics_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_queries_per_minute: DEFAULT_MAX_PER_MINUTE,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            retry_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_base_delay: Duration::from_secs(2),
            retry_max_delay: Duration::from_secs(10),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            partner_tag: String::new(),
            metrics_file: PathBuf::from(DEFAULT_METRICS_FILE),
        }
    }
}

impl Settings {
    /// Builds settings from `PARTNERLINK_*` environment variables,
    /// falling back to defaults (with a warning) on unset or unparsable
    /// values.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_queries_per_minute: env_parsed(
                "PARTNERLINK_MAX_QUERIES_PER_MINUTE",
                defaults.max_queries_per_minute,
            ),
            cache_capacity: env_parsed("PARTNERLINK_CACHE_CAPACITY", defaults.cache_capacity),
            retry_attempts: env_parsed("PARTNERLINK_RETRY_ATTEMPTS", defaults.retry_attempts),
            request_timeout: Duration::from_secs(env_parsed(
                "PARTNERLINK_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )),
            partner_tag: std::env::var("PARTNERLINK_PARTNER_TAG").unwrap_or_default(),
            metrics_file: std::env::var("PARTNERLINK_METRICS_FILE")
                .map_or(defaults.metrics_file, PathBuf::from),
            ..defaults
        }
    }

    /// Replaces the partner tag; used by the CLI override and by tests.
    #[must_use]
    pub fn with_partner_tag(mut self, tag: impl Into<String>) -> Self {
        self.partner_tag = tag.into();
        self
    }
}

/// Reads an environment variable and parses it, warning and keeping the
/// default when the value does not parse.
fn env_parsed<T: std::str::FromStr + Copy>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(var = name, value = %raw, "unparsable value, using default");
            default
        }),
        Err(_) => default,
    }
}
