//! Error types for short-link resolution.

use thiserror::Error;

/// Errors that can occur while expanding a short link.
///
/// All variants carry the URL being resolved so log lines and retry
/// decisions have full context. None of these is fatal to a query: the
/// pipeline falls back to extracting from the unexpanded URL.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error expanding {url}: {source}")]
    Network {
        /// The short URL that failed to expand.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before a terminal response arrived.
    #[error("timeout expanding {url}")]
    Timeout {
        /// The short URL that timed out.
        url: String,
    },

    /// The redirect chain terminated in a non-200 response.
    #[error("HTTP {status} expanding {url}")]
    Status {
        /// The short URL being expanded.
        url: String,
        /// The terminal HTTP status code.
        status: u16,
    },
}

impl ResolveError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates a terminal-status error.
    pub fn status(url: impl Into<String>, status: u16) -> Self {
        Self::Status {
            url: url.into(),
            status,
        }
    }
}

// No `From<reqwest::Error>`: the variants need the URL for context, which
// the source error does not carry. The helper constructors are the
// intended construction path.
