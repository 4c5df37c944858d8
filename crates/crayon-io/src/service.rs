//! Load -> analyze -> persist, with every collaborator injected.

use std::path::Path;

use chrono::{DateTime, Utc};
use crayon_pipeline::{Analyzer, ImageLoadError};
use uuid::Uuid;

use crate::load::{check_size, read_image_bytes};
use crate::store::{ReportStore, StoreError, StoredReport};

/// Failure of a service operation.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The drawing could not be loaded; nothing was stored.
    #[error(transparent)]
    Load(#[from] ImageLoadError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Analyzes drawings and records the reports under their subject.
///
/// The analyzer and store are fixed at construction.
#[derive(Debug)]
pub struct AnalysisService<S> {
    analyzer: Analyzer,
    store: S,
}

impl<S: ReportStore> AnalysisService<S> {
    /// Create a service from its collaborators.
    #[must_use]
    pub const fn new(analyzer: Analyzer, store: S) -> Self {
        Self { analyzer, store }
    }

    /// The backing store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// The analyzer every drawing goes through.
    #[must_use]
    pub const fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    /// Analyze a drawing on disk and store the report.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Load`] if the file is missing, too large,
    /// or not a decodable image, and [`ServiceError::Store`] if the
    /// report cannot be saved.
    pub fn analyze_file(
        &self,
        path: &Path,
        subject_id: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<StoredReport, ServiceError> {
        let bytes = read_image_bytes(path)?;
        self.analyze_bytes(&bytes, subject_id, timestamp)
    }

    /// Analyze an uploaded drawing and store the report.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Load`] if the bytes are over the upload
    /// limit or cannot be decoded, and [`ServiceError::Store`] if the
    /// report cannot be saved.
    pub fn analyze_bytes(
        &self,
        bytes: &[u8],
        subject_id: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<StoredReport, ServiceError> {
        check_size(bytes.len() as u64)?;
        let report = self.analyzer.analyze_bytes_at(bytes, timestamp)?;
        let stored = self.store.save(subject_id, report)?;
        tracing::info!(
            id = %stored.id,
            subject = subject_id,
            risk = %stored.report.risk.level,
            "analysis stored"
        );
        Ok(stored)
    }

    /// One stored analysis.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Store`] if the store cannot be read.
    pub fn report(&self, id: Uuid) -> Result<Option<StoredReport>, ServiceError> {
        Ok(self.store.find_by_id(id)?)
    }

    /// A subject's analyses, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Store`] if the store cannot be read.
    pub fn history(&self, subject_id: &str) -> Result<Vec<StoredReport>, ServiceError> {
        Ok(self.store.find_by_subject(subject_id)?)
    }
}
