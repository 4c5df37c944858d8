//! In-process report store.

use std::collections::HashMap;
use std::sync::RwLock;

use crayon_pipeline::AnalysisReport;
use uuid::Uuid;

use crate::store::{ReportStore, StoreError, StoredReport, sort_newest_first};

/// Keeps every report in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct InMemoryReportStore {
    reports: RwLock<HashMap<Uuid, StoredReport>>,
}

impl InMemoryReportStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored reports.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if a writer panicked.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.reports.read().map_err(|_| StoreError::Poisoned)?.len())
    }
}

impl ReportStore for InMemoryReportStore {
    fn save(&self, subject_id: &str, report: AnalysisReport) -> Result<StoredReport, StoreError> {
        let stored = StoredReport::new(subject_id, report);
        self.reports
            .write()
            .map_err(|_| StoreError::Poisoned)?
            .insert(stored.id, stored.clone());
        tracing::debug!(id = %stored.id, subject = subject_id, "report saved in memory");
        Ok(stored)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<StoredReport>, StoreError> {
        Ok(self
            .reports
            .read()
            .map_err(|_| StoreError::Poisoned)?
            .get(&id)
            .cloned())
    }

    fn find_by_subject(&self, subject_id: &str) -> Result<Vec<StoredReport>, StoreError> {
        let mut found: Vec<StoredReport> = self
            .reports
            .read()
            .map_err(|_| StoreError::Poisoned)?
            .values()
            .filter(|r| r.subject_id == subject_id)
            .cloned()
            .collect();
        sort_newest_first(&mut found);
        Ok(found)
    }
}
