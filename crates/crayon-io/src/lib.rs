//! crayon-io: Filesystem and persistence collaborators for the pipeline.
//!
//! Loads drawings from disk, persists finished reports keyed by a
//! generated analysis id and a subject id, and wires both around an
//! [`Analyzer`](crayon_pipeline::Analyzer) in [`AnalysisService`].

pub mod json_dir;
pub mod load;
pub mod memory;
pub mod service;
pub mod store;

pub use json_dir::JsonDirReportStore;
pub use load::{MAX_IMAGE_BYTES, load_image, read_image_bytes};
pub use memory::InMemoryReportStore;
pub use service::{AnalysisService, ServiceError};
pub use store::{ReportStore, StoreError, StoredReport};
