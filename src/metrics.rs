//! Pipeline metrics with durable, crash-safe persistence.
//!
//! Counters and the per-domain histogram live in memory behind one
//! mutex; every mutation serializes the whole state and writes it
//! atomically (temp file + rename) while the critical section is held,
//! so no update is lost relative to a concurrent persist and readers of
//! the file never observe a torn write.
//!
//! Persistence is best-effort relative to request latency: failures are
//! logged and never surface to the caller.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::classify::AmazonDomain;

/// A terminal pipeline event to account for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A query entered the pipeline.
    TotalQuery,
    /// An affiliate link was produced for the given storefront.
    Success(AmazonDomain),
    /// No ASIN pattern matched.
    FailedExtraction,
    /// The caller was denied by the admission window.
    RateLimited,
}

/// Errors from loading or persisting the metrics file.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Filesystem error reading or writing the metrics file.
    #[error("IO error on metrics file {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The metrics file exists but does not parse as metrics JSON.
    #[error("malformed metrics file {path}: {source}")]
    Malformed {
        /// The file path that failed to parse.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

fn now_iso() -> String {
    Utc::now().to_rfc3339()
}

/// The aggregate metrics state, as serialized to the metrics file.
///
/// Every field defaults individually so a partial file merges over
/// in-memory defaults on load; `start_time` defaults to "now" only when
/// the file carries none.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Metrics {
    #[serde(default)]
    pub total_queries: u64,
    #[serde(default)]
    pub successful_conversions: u64,
    #[serde(default)]
    pub failed_extractions: u64,
    #[serde(default)]
    pub rate_limited: u64,
    /// Storefront -> successful conversion count.
    #[serde(default)]
    pub domains: BTreeMap<String, u64>,
    /// ISO-8601 timestamp of the last persisted mutation.
    #[serde(default)]
    pub last_updated: Option<String>,
    /// ISO-8601 timestamp of first startup; survives restarts and resets.
    #[serde(default = "now_iso")]
    pub start_time: String,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            total_queries: 0,
            successful_conversions: 0,
            failed_extractions: 0,
            rate_limited: 0,
            domains: BTreeMap::new(),
            last_updated: None,
            start_time: now_iso(),
        }
    }
}

/// Thread-safe metrics aggregator bound to one durable file.
#[derive(Debug)]
pub struct MetricsStore {
    path: PathBuf,
    state: Mutex<Metrics>,
}

impl MetricsStore {
    /// Opens the store, merging any existing durable state over defaults.
    ///
    /// A missing file yields empty defaults; a malformed file is logged
    /// and replaced on the next persist rather than aborting startup.
    #[must_use]
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = match Self::read_file(&path) {
            Ok(Some(metrics)) => {
                info!(path = %path.display(), "metrics loaded");
                metrics
            }
            Ok(None) => Metrics::default(),
            Err(error) => {
                warn!(path = %path.display(), error = %error, "could not load metrics, starting fresh");
                Metrics::default()
            }
        };
        Self {
            path,
            state: Mutex::new(state),
        }
    }

    fn read_file(path: &Path) -> Result<Option<Metrics>, MetricsError> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(MetricsError::Io {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };
        let metrics = serde_json::from_slice(&bytes).map_err(|e| MetricsError::Malformed {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Some(metrics))
    }

    /// Records one pipeline outcome and persists the new state.
    pub fn record(&self, outcome: Outcome) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match outcome {
            Outcome::TotalQuery => state.total_queries += 1,
            Outcome::Success(domain) => {
                state.successful_conversions += 1;
                *state.domains.entry(domain.as_str().to_string()).or_insert(0) += 1;
            }
            Outcome::FailedExtraction => state.failed_extractions += 1,
            Outcome::RateLimited => state.rate_limited += 1,
        }

        if matches!(outcome, Outcome::TotalQuery) && state.total_queries % 100 == 0 {
            info!(
                total = state.total_queries,
                successes = state.successful_conversions,
                failed_extractions = state.failed_extractions,
                rate_limited = state.rate_limited,
                "metrics checkpoint"
            );
        }

        self.persist_locked(&mut state);
    }

    /// Clears all counters and the domain histogram, preserving
    /// `start_time`, then persists.
    pub fn reset(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let start_time = state.start_time.clone();
        *state = Metrics {
            start_time,
            ..Metrics::default()
        };
        self.persist_locked(&mut state);
        info!("metrics reset");
    }

    /// Returns a consistent copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> Metrics {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Serializes `state` and atomically replaces the metrics file.
    ///
    /// Runs with the state lock held; persistence failures are logged,
    /// never propagated.
    fn persist_locked(&self, state: &mut Metrics) {
        state.last_updated = Some(now_iso());
        if let Err(error) = self.write_atomic(state) {
            warn!(path = %self.path.display(), error = %error, "failed to persist metrics");
        }
    }

    fn write_atomic(&self, state: &Metrics) -> Result<(), MetricsError> {
        let json = serde_json::to_vec_pretty(state).map_err(|e| MetricsError::Malformed {
            path: self.path.clone(),
            source: e,
        })?;

        // Temp file in the same directory so the rename is atomic.
        let tmp_path = self.path.with_extension("tmp");
        std::fs::write(&tmp_path, &json).map_err(|e| MetricsError::Io {
            path: tmp_path.clone(),
            source: e,
        })?;
        std::fs::rename(&tmp_path, &self.path).map_err(|e| MetricsError::Io {
            path: self.path.clone(),
            source: e,
        })?;
        Ok(())
    }
}
