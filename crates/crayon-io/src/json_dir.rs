//! Report store backed by a directory of JSON files.
//!
//! Each report is written to a temporary file in `<dir>` and renamed to
//! `<dir>/<id>.json`, so readers never see a partial record. Lookups by
//! subject scan the directory; files that are not `.json` are ignored and
//! records that cannot be read are skipped with a warning.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use crayon_pipeline::AnalysisReport;
use uuid::Uuid;

use crate::store::{ReportStore, StoreError, StoredReport, sort_newest_first};

/// Persists each report as one pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonDirReportStore {
    dir: PathBuf,
}

impl JsonDirReportStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// The directory reports are written to.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    fn read(path: &Path) -> Result<StoredReport, StoreError> {
        let text = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_owned(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| StoreError::Json {
            path: path.to_owned(),
            source,
        })
    }
}

impl ReportStore for JsonDirReportStore {
    fn save(&self, subject_id: &str, report: AnalysisReport) -> Result<StoredReport, StoreError> {
        let stored = StoredReport::new(subject_id, report);
        let path = self.path_for(stored.id);
        let json = serde_json::to_vec_pretty(&stored).map_err(|source| StoreError::Json {
            path: path.clone(),
            source,
        })?;

        let io_error = |source| StoreError::Io {
            path: path.clone(),
            source,
        };
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir).map_err(io_error)?;
        tmp.write_all(&json).map_err(io_error)?;
        tmp.persist(&path).map_err(|e| io_error(e.error))?;

        tracing::debug!(
            id = %stored.id,
            subject = subject_id,
            path = %path.display(),
            "report saved"
        );
        Ok(stored)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<StoredReport>, StoreError> {
        let path = self.path_for(id);
        if !path.is_file() {
            return Ok(None);
        }
        Self::read(&path).map(Some)
    }

    fn find_by_subject(&self, subject_id: &str) -> Result<Vec<StoredReport>, StoreError> {
        let io_error = |source| StoreError::Io {
            path: self.dir.clone(),
            source,
        };

        let mut found = Vec::new();
        for entry in std::fs::read_dir(&self.dir).map_err(io_error)? {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    tracing::warn!(
                        dir = %self.dir.display(),
                        error = %e,
                        "skipping unreadable entry"
                    );
                    continue;
                }
            };
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            match Self::read(&path) {
                Ok(stored) if stored.subject_id == subject_id => found.push(stored),
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "skipping unreadable report"),
            }
        }
        sort_newest_first(&mut found);
        Ok(found)
    }
}
