//! The per-query pipeline: admission → validation → resolution →
//! extraction → metrics.
//!
//! State machine per query:
//!
//! ```text
//! START → rate check ── Denied ──→ RateLimited (terminal)
//!           │ Admitted
//!           ▼
//!       URL validate ── invalid ──→ InvalidUrl (terminal)
//!           │ valid
//!           ▼
//!        resolve (best-effort; failure falls back to the original URL)
//!           ▼
//!        extract ── none ──→ NoAsin (terminal)
//!           │ found
//!           ▼
//!        Success (terminal)
//! ```
//!
//! Every terminal transition accounts exactly one outcome to the
//! metrics store; the admission check runs before any network work so
//! denied callers incur no resolver cost.

use std::sync::Arc;

use tracing::{instrument, warn};

use crate::classify::{
    AmazonDomain, ProductRef, affiliate_link, extract_asin, is_plausible_amazon_url,
};
use crate::config::Settings;
use crate::limiter::{Admission, RateLimiter};
use crate::metrics::{MetricsStore, Outcome};
use crate::resolve::{ResolvedUrl, Resolver};

/// One inline query as handed to the pipeline.
#[derive(Debug, Clone)]
pub struct Query {
    /// The raw query text (expected to be an Amazon URL).
    pub raw_text: String,
    /// Caller identity used for admission control.
    pub caller_id: i64,
    /// BCP-47-ish locale code of the caller, when known.
    pub caller_locale: Option<String>,
}

/// Terminal result of one pipeline run.
#[derive(Debug, Clone)]
pub enum PipelineOutcome {
    /// An affiliate link was produced.
    Success {
        product: ProductRef,
        affiliate_link: String,
        resolved: ResolvedUrl,
    },
    /// The query text is not a plausible Amazon URL.
    InvalidUrl,
    /// The caller exceeded the admission window.
    RateLimited {
        /// Configured maximum, for the user-facing message.
        max_per_minute: usize,
    },
    /// No ASIN pattern matched the (possibly resolved) URL.
    NoAsin,
}

/// Orchestrator owning handles to the shared components.
///
/// All state is injected at construction, so tests run against fresh
/// limiters, caches and metrics files.
#[derive(Debug)]
pub struct Pipeline {
    resolver: Arc<Resolver>,
    limiter: Arc<RateLimiter>,
    metrics: Arc<MetricsStore>,
    settings: Settings,
}

impl Pipeline {
    /// Wires the pipeline from its injected components.
    #[must_use]
    pub fn new(
        resolver: Arc<Resolver>,
        limiter: Arc<RateLimiter>,
        metrics: Arc<MetricsStore>,
        settings: Settings,
    ) -> Self {
        Self {
            resolver,
            limiter,
            metrics,
            settings,
        }
    }

    /// Builds a pipeline from settings alone, constructing the
    /// components with the configured capacities.
    #[must_use]
    pub fn from_settings(settings: Settings) -> Self {
        let resolver = Resolver::new(
            crate::resolve::HttpClient::with_timeout(settings.request_timeout.as_secs()),
            settings.cache_capacity,
            crate::resolve::RetryPolicy::new(
                settings.retry_attempts,
                settings.retry_base_delay,
                settings.retry_max_delay,
                2.0,
            ),
        );
        let limiter = RateLimiter::new(settings.max_queries_per_minute);
        let metrics = MetricsStore::load(settings.metrics_file.clone());
        Self::new(
            Arc::new(resolver),
            Arc::new(limiter),
            Arc::new(metrics),
            settings,
        )
    }

    /// Runs one query through the state machine.
    #[instrument(skip(self, query), fields(caller = query.caller_id))]
    pub async fn handle(&self, query: &Query) -> PipelineOutcome {
        self.metrics.record(Outcome::TotalQuery);

        if self.limiter.check_and_record(query.caller_id) == Admission::Denied {
            self.metrics.record(Outcome::RateLimited);
            return PipelineOutcome::RateLimited {
                max_per_minute: self.limiter.max_per_minute(),
            };
        }

        if !is_plausible_amazon_url(&query.raw_text) {
            return PipelineOutcome::InvalidUrl;
        }

        // Resolution failures degrade to extracting from the original
        // URL rather than failing the query.
        let resolved = match self.resolver.resolve(&query.raw_text).await {
            Ok(resolved) => resolved,
            Err(error) => {
                warn!(url = %query.raw_text, error = %error, "expansion failed, using original URL");
                ResolvedUrl::passthrough(&query.raw_text)
            }
        };

        let Some(asin) = extract_asin(&resolved.final_url) else {
            self.metrics.record(Outcome::FailedExtraction);
            return PipelineOutcome::NoAsin;
        };

        // Storefront is classified from the original query text; the
        // resolved URL is only consulted when the original (a short
        // link) carries no storefront information.
        let domain = AmazonDomain::find(&query.raw_text)
            .or_else(|| AmazonDomain::find(&resolved.final_url))
            .unwrap_or_default();

        self.metrics.record(Outcome::Success(domain));

        let product = ProductRef { asin, domain };
        let link = affiliate_link(&product, &self.settings.partner_tag);

        PipelineOutcome::Success {
            product,
            affiliate_link: link,
            resolved,
        }
    }

    /// The configured per-caller admission maximum.
    #[must_use]
    pub fn max_per_minute(&self) -> usize {
        self.limiter.max_per_minute()
    }

    /// Handle to the metrics store, for status reporting.
    #[must_use]
    pub fn metrics(&self) -> &Arc<MetricsStore> {
        &self.metrics
    }
}
