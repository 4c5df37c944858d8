//! Report persistence interface.

use std::path::PathBuf;

use crayon_pipeline::AnalysisReport;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted analysis: the report plus the keys it is stored under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredReport {
    /// Generated when the report is saved.
    pub id: Uuid,
    /// The child the drawing belongs to.
    pub subject_id: String,
    pub report: AnalysisReport,
}

impl StoredReport {
    /// Wrap a report under a fresh random id.
    #[must_use]
    pub fn new(subject_id: impl Into<String>, report: AnalysisReport) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject_id: subject_id.into(),
            report,
        }
    }
}

/// Persistence failure.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed report file {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("report store lock poisoned")]
    Poisoned,
}

/// Storage for finished analyses.
///
/// Implementations must be safe to share between threads; analyses for
/// different subjects may be saved concurrently.
pub trait ReportStore: Send + Sync {
    /// Persist a report for a subject under a newly generated id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the report cannot be written.
    fn save(&self, subject_id: &str, report: AnalysisReport) -> Result<StoredReport, StoreError>;

    /// Look up one report by its analysis id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing storage cannot be read.
    fn find_by_id(&self, id: Uuid) -> Result<Option<StoredReport>, StoreError>;

    /// Every report of a subject, newest first.
    ///
    /// Reports with equal timestamps are ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing storage cannot be read.
    fn find_by_subject(&self, subject_id: &str) -> Result<Vec<StoredReport>, StoreError>;
}

/// Sort reports newest first, ties by id.
pub(crate) fn sort_newest_first(reports: &mut [StoredReport]) {
    reports.sort_by(|a, b| {
        b.report
            .timestamp
            .cmp(&a.report.timestamp)
            .then_with(|| a.id.cmp(&b.id))
    });
}
