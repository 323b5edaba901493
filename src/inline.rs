//! Inline-query surface: turns one pipeline run into the list of
//! result items shown to the caller.
//!
//! The handler never propagates a panic or an error to the transport;
//! every failure mode maps to a localized error item, and a panic
//! anywhere inside the pipeline is caught and downgraded to the
//! extraction-failure item.

use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use tracing::{error, instrument};

use crate::i18n::Translations;
use crate::metrics::Outcome;
use crate::pipeline::{Pipeline, PipelineOutcome, Query};

/// One renderable answer to an inline query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultItem {
    /// Stable identifier: the ASIN on success, `"error"` or
    /// `"rate_limit"` otherwise.
    pub id: String,
    pub title: String,
    pub description: String,
    /// The text sent when the caller picks this item.
    pub message_body: String,
}

/// Answers one inline query.
///
/// An empty query yields no items at all (the caller is still typing).
/// Success yields two items, the full message and a bare-link variant;
/// every other outcome yields exactly one error item.
#[instrument(skip(pipeline, query), fields(caller = query.caller_id))]
pub async fn handle_inline_query(pipeline: &Pipeline, query: &Query) -> Vec<ResultItem> {
    if query.raw_text.trim().is_empty() {
        // Still counted: every inbound query lands in total_queries,
        // even the keystrokes answered with nothing.
        pipeline.metrics().record(Outcome::TotalQuery);
        return Vec::new();
    }

    let outcome = match AssertUnwindSafe(pipeline.handle(query)).catch_unwind().await {
        Ok(outcome) => outcome,
        Err(_) => {
            error!(caller = query.caller_id, "pipeline panicked handling query");
            return vec![extraction_error_item(query)];
        }
    };

    render(query, &outcome)
}

/// Maps a pipeline outcome to its result items.
#[must_use]
pub fn render(query: &Query, outcome: &PipelineOutcome) -> Vec<ResultItem> {
    let t = Translations;
    let locale = query.caller_locale.as_deref();

    match outcome {
        PipelineOutcome::Success {
            product,
            affiliate_link,
            ..
        } => {
            let asin = product.asin.as_str();
            let domain = product.domain.as_str();
            vec![
                ResultItem {
                    id: asin.to_string(),
                    title: t.get("info.partner_link_generated.title", locale),
                    description: t.format(
                        "info.partner_link_generated.description",
                        locale,
                        &[("asin", asin), ("domain", domain)],
                    ),
                    message_body: t.format(
                        "info.partner_link_generated.message",
                        locale,
                        &[("affiliate_link", affiliate_link)],
                    ),
                },
                ResultItem {
                    id: format!("{asin}_link_only"),
                    title: t.get("info.only_asin_link.title", locale),
                    description: t.get("info.only_asin_link.description", locale),
                    message_body: affiliate_link.clone(),
                },
            ]
        }
        PipelineOutcome::InvalidUrl => vec![ResultItem {
            id: "error".to_string(),
            title: t.get("error.url_error.title", locale),
            description: t.get("error.url_error.description", locale),
            message_body: t.get("error.url_error.message", locale),
        }],
        PipelineOutcome::NoAsin => vec![extraction_error_item(query)],
        PipelineOutcome::RateLimited { max_per_minute } => {
            let max = max_per_minute.to_string();
            vec![ResultItem {
                id: "rate_limit".to_string(),
                title: t.get("error.rate_limit.title", locale),
                description: t.format(
                    "error.rate_limit.description",
                    locale,
                    &[("max_queries", &max)],
                ),
                message_body: t.format(
                    "error.rate_limit.message",
                    locale,
                    &[("max_queries", &max)],
                ),
            }]
        }
    }
}

fn extraction_error_item(query: &Query) -> ResultItem {
    let t = Translations;
    let locale = query.caller_locale.as_deref();
    ResultItem {
        id: "error".to_string(),
        title: t.get("error.asin_error.title", locale),
        description: t.get("error.asin_error.description", locale),
        message_body: t.get("error.asin_error.message", locale),
    }
}
