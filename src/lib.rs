//! Partnerlink Core Library
//!
//! This library turns inline queries carrying Amazon product URLs into
//! affiliate ("partner") links: it validates the URL, expands short
//! links over HTTP, extracts the ASIN, classifies the storefront, and
//! accounts every outcome in a crash-safe metrics file.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`classify`] - URL plausibility, ASIN extraction, storefront domains
//! - [`resolve`] - Short-link expansion with cache and retry
//! - [`limiter`] - Per-caller sliding-window admission control
//! - [`metrics`] - Durable outcome counters
//! - [`pipeline`] - The per-query orchestrator
//! - [`inline`] - Result-item rendering for the inline-query surface
//! - [`i18n`] - Locale tables for user-facing strings
//! - [`config`] - Environment-sourced settings

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod classify;
pub mod config;
pub mod i18n;
pub mod inline;
pub mod limiter;
pub mod metrics;
pub mod pipeline;
pub mod resolve;

// Re-export commonly used types
pub use classify::{
    AmazonDomain, Asin, ProductRef, affiliate_link, extract_asin, extract_domain,
    is_plausible_amazon_url, is_short_form,
};
pub use config::Settings;
pub use inline::{ResultItem, handle_inline_query};
pub use limiter::{Admission, DEFAULT_MAX_PER_MINUTE, RateLimiter};
pub use metrics::{Metrics, MetricsStore, Outcome};
pub use pipeline::{Pipeline, PipelineOutcome, Query};
pub use resolve::{HttpClient, ResolveError, ResolvedUrl, Resolver, RetryPolicy, classify_error};
