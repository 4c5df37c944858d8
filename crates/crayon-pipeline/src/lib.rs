//! crayon-pipeline: Pure drawing analysis pipeline (sans-IO).
//!
//! Turns a child's drawing into an [`AnalysisReport`] through:
//! preprocess -> colors -> contours -> shapes -> composition ->
//! symbols -> emotions -> risk -> summary.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! byte slices and rasters and returns structured data. Filesystem
//! loading and report persistence live in `crayon-io`.
//!
//! Every threshold is deterministic and comes from [`AnalysisConfig`],
//! so the same bytes, configuration and timestamp always produce the
//! same report.

pub mod aggregate;
pub mod analyze;
pub mod classify;
pub mod color;
pub mod composition;
pub mod contour;
pub mod decode;
pub mod edge;
pub mod emotion;
pub mod preprocess;
pub mod risk;
pub mod simplify;
pub mod symbol;
pub mod types;

pub use analyze::Analyzer;
pub use types::{
    AnalysisConfig, AnalysisReport, ConfigError, Dimensions, ImageLoadError, RgbImage, Stage,
    StageDegraded,
};

/// Analyze raw image bytes with the default configuration.
///
/// Convenience wrapper around [`Analyzer::analyze_bytes_at`].
///
/// # Errors
///
/// Returns [`ImageLoadError`] if the bytes cannot be decoded into a
/// non-empty image.
pub fn analyze(
    image_bytes: &[u8],
    timestamp: chrono::DateTime<chrono::Utc>,
) -> Result<AnalysisReport, ImageLoadError> {
    Analyzer::default().analyze_bytes_at(image_bytes, timestamp)
}
