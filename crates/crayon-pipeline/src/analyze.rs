//! End-to-end analysis: raster in, [`AnalysisReport`] out.
//!
//! Loading is the only step that can fail the analysis. Every heuristic
//! stage after it runs behind [`absorb`], which logs a [`StageDegraded`]
//! and substitutes the stage's default, so a loaded image always yields a
//! complete report.

use chrono::{DateTime, Utc};

use crate::emotion::Evidence;
use crate::types::{
    AnalysisConfig, AnalysisReport, ClassifiedShape, ColorDistribution, CompositionAnalysis,
    ConfigError, DetectedShape, Dimensions, EmotionAnalysis, ImageLoadError, RgbImage,
    RiskAssessment, Stage, StageDegraded,
};

/// Shape types listed in the summary.
const SUMMARY_SHAPES: usize = 3;

/// Runs every analysis stage with one fixed configuration.
///
/// Holds no per-analysis state, so one analyzer can serve any number of
/// drawings, from any number of threads.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: AnalysisConfig,
}

impl Analyzer {
    /// Create an analyzer after validating its configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConfig`] if any threshold is out of
    /// range.
    pub fn new(config: AnalysisConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration every analysis uses.
    #[must_use]
    pub const fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Decode image bytes and analyze them.
    ///
    /// `timestamp` is recorded in the report as-is, so identical bytes
    /// and timestamp always produce an identical report.
    ///
    /// # Errors
    ///
    /// Returns [`ImageLoadError`] if the bytes are empty, cannot be
    /// decoded, or decode to a zero-sized image.
    pub fn analyze_bytes_at(
        &self,
        bytes: &[u8],
        timestamp: DateTime<Utc>,
    ) -> Result<AnalysisReport, ImageLoadError> {
        let image = crate::decode::decode(bytes)?;
        self.analyze_image_at(&image, timestamp)
    }

    /// Analyze an already decoded image.
    ///
    /// # Pipeline steps
    ///
    /// 1. Noise reduction and contrast normalization
    /// 2. Color distribution
    /// 3. Contour extraction, classification and aggregation
    /// 4. Composition
    /// 5. Symbols and psychological indicators
    /// 6. Emotion scores and state
    /// 7. Risk assessment
    /// 8. Summary
    ///
    /// # Errors
    ///
    /// Returns [`ImageLoadError::ZeroSized`] if the image has no pixels.
    pub fn analyze_image_at(
        &self,
        image: &RgbImage,
        timestamp: DateTime<Utc>,
    ) -> Result<AnalysisReport, ImageLoadError> {
        crate::decode::ensure_not_empty(image)?;
        let config = &self.config;
        let dimensions = Dimensions::of(image);
        let mut degraded = Vec::new();

        // 1. Preprocess.
        let processed = crate::preprocess::preprocess(image, config);

        // 2. Colors.
        let colors = absorb(
            crate::color::analyze_colors(&processed, config),
            &mut degraded,
            ColorDistribution::default,
        );

        // 3. Shapes, per contour and grouped.
        let contour_shapes = absorb(
            detect_shapes(&processed, dimensions, config),
            &mut degraded,
            Vec::new,
        );
        let shapes = crate::aggregate::aggregate(&contour_shapes);

        // 4. Composition.
        let composition = absorb(
            crate::composition::analyze_composition(&contour_shapes, dimensions),
            &mut degraded,
            CompositionAnalysis::default,
        );

        // 5. Symbols.
        let symbols = absorb(
            crate::symbol::detect_symbols(&contour_shapes, &composition, dimensions),
            &mut degraded,
            Vec::new,
        );
        let psychological_indicators =
            crate::symbol::psychological_indicators(&shapes, &symbols, &composition);

        // 6. Emotions.
        let emotions = absorb(
            crate::emotion::score_emotions(&Evidence {
                colors: &colors,
                shapes: &shapes,
                symbols: &symbols,
                composition: &composition,
            }),
            &mut degraded,
            EmotionAnalysis::default,
        );

        // 7. Risk.
        let risk = absorb(
            crate::risk::assess_risk(&emotions),
            &mut degraded,
            RiskAssessment::default,
        );

        // 8. Summary.
        let summary = summarize(&colors, &shapes, &emotions, &risk);

        tracing::info!(
            width = dimensions.width,
            height = dimensions.height,
            shapes = contour_shapes.len(),
            symbols = symbols.len(),
            dominant_emotion = %emotions.dominant_emotion,
            state = %emotions.state,
            risk = %risk.level,
            degraded = degraded.len(),
            "drawing analyzed"
        );

        Ok(AnalysisReport {
            timestamp,
            dimensions,
            colors,
            shapes,
            symbols,
            composition,
            psychological_indicators,
            emotions,
            risk,
            summary,
            degraded,
        })
    }
}

/// Contour extraction and per-contour classification.
fn detect_shapes(
    image: &RgbImage,
    dimensions: Dimensions,
    config: &AnalysisConfig,
) -> Result<Vec<ClassifiedShape>, StageDegraded> {
    if dimensions.area() <= 0.0 {
        return Err(StageDegraded::new(Stage::Shapes, "image has zero area"));
    }
    let contours = crate::contour::extract_contours(image, config);
    let shapes = crate::classify::classify_all(&contours, dimensions, config);
    tracing::debug!(shapes = shapes.len(), "contours classified");
    Ok(shapes)
}

/// Unwrap a stage result, or log the fault and fall back to `default`.
fn absorb<T>(
    result: Result<T, StageDegraded>,
    degraded: &mut Vec<Stage>,
    default: impl FnOnce() -> T,
) -> T {
    result.unwrap_or_else(|err| {
        tracing::warn!(stage = %err.stage, reason = %err.reason, "stage degraded");
        degraded.push(err.stage);
        default()
    })
}

/// One-paragraph summary of a finished analysis.
#[must_use]
pub fn summarize(
    colors: &ColorDistribution,
    shapes: &[DetectedShape],
    emotions: &EmotionAnalysis,
    risk: &RiskAssessment,
) -> String {
    let mut parts = vec![
        format!("Dominant emotion: {}", emotions.dominant_emotion),
        format!("Emotional state: {}", emotions.state),
        format!("Dominant color: {}", colors.dominant_color),
    ];
    if !shapes.is_empty() {
        let names: Vec<&str> = shapes
            .iter()
            .take(SUMMARY_SHAPES)
            .map(|s| s.kind.as_str())
            .collect();
        parts.push(format!("Detected shapes: {}", names.join(", ")));
    }
    parts.push(format!("Risk level: {}", risk.level));

    let mut summary = parts.join(". ");
    summary.push('.');
    summary
}
