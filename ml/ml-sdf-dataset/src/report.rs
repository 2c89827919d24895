//! Batch summary.

use std::path::PathBuf;

use serde::Serialize;

use crate::job::JobOutcome;
use crate::sanitize::KeyCollision;

/// One failed item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    /// Input file.
    pub path: PathBuf,
    /// Human-readable cause.
    pub cause: String,
}

/// Counts and diagnostics of one batch run.
///
/// # Example
///
/// ```
/// use ml_sdf_dataset::BatchReport;
///
/// let report = BatchReport::default();
/// assert!(report.is_clean());
/// assert_eq!(report.total(), 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Items converted and written in this run.
    pub processed: usize,
    /// Items already complete from an earlier run.
    pub skipped: usize,
    /// Items that failed.
    pub failed: usize,
    /// Path and cause of every failure, in processing order.
    pub failures: Vec<ItemFailure>,
    /// Model keys shared by several inputs.
    pub collisions: Vec<KeyCollision>,
}

impl BatchReport {
    /// Items attempted.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.processed + self.skipped + self.failed
    }

    /// No failures and no key collisions.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.collisions.is_empty()
    }

    /// Count a failure.
    pub fn record_failure(&mut self, path: impl Into<PathBuf>, cause: impl Into<String>) {
        self.failed += 1;
        self.failures.push(ItemFailure {
            path: path.into(),
            cause: cause.into(),
        });
    }

    /// Count a job outcome.
    pub fn record(&mut self, outcome: &JobOutcome) {
        match outcome {
            JobOutcome::Persisted { .. } => self.processed += 1,
            JobOutcome::Skipped { .. } => self.skipped += 1,
            JobOutcome::Failed { path, error, .. } => {
                self.record_failure(path.clone(), error.to_string());
            }
        }
    }
}
