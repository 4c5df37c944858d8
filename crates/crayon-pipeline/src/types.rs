//! Shared types for the crayon drawing analysis pipeline.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Re-export `GrayImage` so downstream crates can reference
/// intermediate raster data without depending on `image` directly.
pub use image::GrayImage;

/// Re-export `RgbImage`, the raster a drawing is analyzed as.
///
/// Alpha is dropped on decode; every stage works on three channels.
pub use image::RgbImage;

/// Declares a closed vocabulary enum whose variants serialize to fixed
/// lowercase strings, with `ALL` in declaration order and `as_str`.
macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $text)] $variant),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &[Self] = &[$(Self::$variant),+];

            /// The serialized name of this variant.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

/// A 2D point in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (pixels from left edge).
    pub x: f64,
    /// Vertical position (pixels from top edge).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Dimensions of an image.
    #[must_use]
    pub fn of(image: &RgbImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
        }
    }

    /// Total pixel count as a float, for area ratios.
    #[must_use]
    pub fn area(self) -> f64 {
        f64::from(self.width) * f64::from(self.height)
    }

    /// The image center.
    #[must_use]
    pub fn center(self) -> Point {
        Point::new(f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }
}

/// Axis-aligned pixel bounding box of a contour.
///
/// `width` and `height` count pixels inclusively, so a single-pixel
/// contour has a 1x1 box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    /// Center of the box in image coordinates.
    #[must_use]
    pub fn center(self) -> Point {
        Point::new(
            f64::from(self.x) + f64::from(self.width) / 2.0,
            f64::from(self.y) + f64::from(self.height) / 2.0,
        )
    }

    /// `width / height`, or `None` for a zero-height box.
    #[must_use]
    pub fn aspect_ratio(self) -> Option<f64> {
        (self.height > 0).then(|| f64::from(self.width) / f64::from(self.height))
    }
}

// ───────────────────────── Vocabularies ──────────────────────────

vocabulary! {
    /// Named color buckets.
    ///
    /// [`Unknown`](Self::Unknown) is only ever used as the dominant color of
    /// an empty distribution; it never holds pixels.
    pub enum ColorName {
        Red => "red",
        Orange => "orange",
        Yellow => "yellow",
        Green => "green",
        Blue => "blue",
        Purple => "purple",
        Pink => "pink",
        Brown => "brown",
        Black => "black",
        White => "white",
        Gray => "gray",
        Other => "other",
        Unknown => "unknown",
    }
}

vocabulary! {
    /// Geometric type assigned to a contour.
    pub enum ShapeKind {
        Circle => "circle",
        Ellipse => "ellipse",
        Square => "square",
        Rectangle => "rectangle",
        Triangle => "triangle",
        Blob => "blob",
        Organic => "organic",
        Noise => "noise",
        Unknown => "unknown",
    }
}

impl ShapeKind {
    /// Circle or ellipse.
    #[must_use]
    pub const fn is_round(self) -> bool {
        matches!(self, Self::Circle | Self::Ellipse)
    }

    /// Square or rectangle.
    #[must_use]
    pub const fn is_quadrilateral(self) -> bool {
        matches!(self, Self::Square | Self::Rectangle)
    }

    /// Organic or blob: free-form, non-polygonal strokes.
    #[must_use]
    pub const fn is_organic(self) -> bool {
        matches!(self, Self::Organic | Self::Blob)
    }

    /// Square, rectangle or triangle.
    #[must_use]
    pub const fn is_geometric(self) -> bool {
        matches!(self, Self::Square | Self::Rectangle | Self::Triangle)
    }
}

vocabulary! {
    /// Where a shape sits relative to the image center.
    pub enum Position {
        Left => "left",
        Right => "right",
        Top => "top",
        Bottom => "bottom",
        Center => "center",
    }
}

vocabulary! {
    /// Higher-level drawn motif.
    pub enum SymbolKind {
        Human => "human",
        Face => "face",
        House => "house",
        Tree => "tree",
        Isolation => "isolation",
        PastFocus => "past_focus",
        EmotionalExpression => "emotional_expression",
    }
}

vocabulary! {
    /// Complexity tag carried by a symbol.
    pub enum Complexity {
        Detailed => "detailed",
        Organic => "organic",
        Structured => "structured",
        Natural => "natural",
        Emotional => "emotional",
        Fluid => "fluid",
    }
}

vocabulary! {
    /// Left/right weighting of the drawing.
    pub enum Balance {
        Balanced => "balanced",
        LeftHeavy => "left-heavy",
        RightHeavy => "right-heavy",
        Empty => "empty",
    }
}

vocabulary! {
    /// How much of the sheet the shapes cover.
    pub enum SpaceUsage {
        Minimal => "minimal",
        Constricted => "constricted",
        Normal => "normal",
        Expansive => "expansive",
        Crowded => "crowded",
    }
}

vocabulary! {
    /// Stroke pressure inferred from mean shape size.
    pub enum Pressure {
        Light => "light",
        Medium => "medium",
        Heavy => "heavy",
        Unknown => "unknown",
    }
}

vocabulary! {
    /// The fixed emotion vocabulary, in scoring order.
    pub enum Emotion {
        Joy => "joy",
        Sadness => "sadness",
        Anger => "anger",
        Fear => "fear",
        Calm => "calm",
        Energy => "energy",
        Anxiety => "anxiety",
        Love => "love",
    }
}

impl Emotion {
    /// Number of emotions in the vocabulary.
    pub const COUNT: usize = 8;
}

vocabulary! {
    /// Categorical summary of an emotion score vector.
    pub enum EmotionalState {
        Conflicted => "conflicted",
        Volatile => "volatile",
        Intense => "intense",
        Stable => "stable",
        Neutral => "neutral",
        Unknown => "unknown",
    }
}

vocabulary! {
    /// Overall risk level.
    pub enum RiskLevel {
        Low => "low",
        Medium => "medium",
        High => "high",
        Unknown => "unknown",
    }
}

vocabulary! {
    /// Source of an emotional indicator.
    pub enum IndicatorKind {
        Color => "color",
        Shape => "shape",
        Symbol => "symbol",
        Emotional => "emotional",
        State => "state",
    }
}

vocabulary! {
    /// Heuristic stages that may degrade to their default output.
    pub enum Stage {
        Color => "color",
        Shapes => "shapes",
        Composition => "composition",
        Symbols => "symbols",
        Emotion => "emotion",
        Risk => "risk",
    }
}

// ───────────────────────── Stage outputs ──────────────────────────

/// One color bucket and its exclusive share of the image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorBucket {
    pub color: ColorName,
    /// Percentage of all pixels, 0-100, rounded to two decimals.
    pub percentage: f64,
}

/// Color profile of a drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorDistribution {
    /// Buckets in the order they were recorded.
    pub buckets: Vec<ColorBucket>,
    /// Bucket with the largest share, or [`ColorName::Unknown`] when empty.
    pub dominant_color: ColorName,
    /// Mean of the saturation and value channels, 0-1.
    pub intensity: f64,
    pub interpretations: Vec<String>,
}

impl Default for ColorDistribution {
    fn default() -> Self {
        Self {
            buckets: Vec::new(),
            dominant_color: ColorName::Unknown,
            intensity: 0.0,
            interpretations: Vec::new(),
        }
    }
}

impl ColorDistribution {
    /// Percentage recorded for `color`, or 0 when it has no bucket.
    #[must_use]
    pub fn percentage(&self, color: ColorName) -> f64 {
        self.buckets
            .iter()
            .find(|b| b.color == color)
            .map_or(0.0, |b| b.percentage)
    }

    /// Sum of all bucket percentages.
    #[must_use]
    pub fn total_percentage(&self) -> f64 {
        self.buckets.iter().map(|b| b.percentage).sum()
    }
}

/// A single classified contour, before aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedShape {
    pub kind: ShapeKind,
    /// Contour area in square pixels.
    pub area: f64,
    pub bounds: BoundingBox,
    pub position: Position,
    pub confidence: f64,
}

/// All classified contours of one shape kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedShape {
    pub kind: ShapeKind,
    pub count: usize,
    /// Mean contour area in square pixels.
    pub average_size: f64,
    /// Most frequent position among the group's members.
    pub position: Position,
    /// Mean classification confidence, 0-1.
    pub confidence: f64,
}

/// A higher-level motif inferred from co-occurring shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedSymbol {
    pub kind: SymbolKind,
    pub count: usize,
    pub complexity: Complexity,
    pub characteristics: Vec<String>,
}

/// Spatial layout of the drawing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionAnalysis {
    pub balance: Balance,
    pub space_usage: SpaceUsage,
    pub pressure: Pressure,
    pub indicators: Vec<String>,
}

impl Default for CompositionAnalysis {
    /// The composition of a drawing with no shapes.
    fn default() -> Self {
        Self {
            balance: Balance::Empty,
            space_usage: SpaceUsage::Minimal,
            pressure: Pressure::Unknown,
            indicators: Vec::new(),
        }
    }
}

/// Score per emotion, indexed by [`Emotion`].
///
/// Serialized as a map in vocabulary order.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<Emotion, f64>",
    into = "BTreeMap<Emotion, f64>"
)]
pub struct EmotionScores([f64; Emotion::COUNT]);

impl EmotionScores {
    /// Score for one emotion.
    #[must_use]
    pub const fn get(&self, emotion: Emotion) -> f64 {
        self.0[emotion as usize]
    }

    /// Add `delta` to one emotion's score.
    pub fn add(&mut self, emotion: Emotion, delta: f64) {
        self.0[emotion as usize] += delta;
    }

    /// `(emotion, score)` pairs in vocabulary order.
    pub fn iter(&self) -> impl Iterator<Item = (Emotion, f64)> + '_ {
        Emotion::ALL.iter().map(|&e| (e, self.get(e)))
    }

    /// The largest score (0 for an all-zero vector).
    #[must_use]
    pub fn max(&self) -> f64 {
        self.0.iter().copied().fold(0.0, f64::max)
    }

    /// Emotion with the highest score; the first in vocabulary order wins ties.
    #[must_use]
    pub fn dominant(&self) -> Emotion {
        let mut best = Emotion::Joy;
        for (emotion, score) in self.iter() {
            if score > self.get(best) {
                best = emotion;
            }
        }
        best
    }

    /// Scale so the largest score becomes 1.0, clamping at 1.0.
    ///
    /// No-op when every score is zero.
    pub fn normalize(&mut self) {
        let max = self.max();
        if max > 0.0 {
            for score in &mut self.0 {
                *score = (*score / max).min(1.0);
            }
        }
    }

    /// Number of emotions scoring strictly above `threshold`.
    #[must_use]
    pub fn count_above(&self, threshold: f64) -> usize {
        self.0.iter().filter(|&&s| s > threshold).count()
    }
}

impl From<BTreeMap<Emotion, f64>> for EmotionScores {
    fn from(map: BTreeMap<Emotion, f64>) -> Self {
        let mut scores = Self::default();
        for (emotion, score) in map {
            scores.0[emotion as usize] = score;
        }
        scores
    }
}

impl From<EmotionScores> for BTreeMap<Emotion, f64> {
    fn from(scores: EmotionScores) -> Self {
        scores.iter().collect()
    }
}

/// A descriptive record linking one observation to an emotional reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionalIndicator {
    pub kind: IndicatorKind,
    pub description: String,
    pub confidence: f64,
    pub correlation: String,
}

/// Output of the emotion scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionAnalysis {
    pub scores: EmotionScores,
    pub dominant_emotion: Emotion,
    pub state: EmotionalState,
    pub indicators: Vec<EmotionalIndicator>,
}

impl Default for EmotionAnalysis {
    fn default() -> Self {
        Self {
            scores: EmotionScores::default(),
            dominant_emotion: Emotion::Joy,
            state: EmotionalState::Unknown,
            indicators: Vec::new(),
        }
    }
}

/// Risk level derived from the emotion vector and state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub risk_factors: Vec<String>,
    pub recommendations: Vec<String>,
    pub requires_attention: bool,
}

impl Default for RiskAssessment {
    /// The assessment substituted when risk evaluation fails.
    fn default() -> Self {
        Self {
            level: RiskLevel::Unknown,
            risk_factors: Vec::new(),
            recommendations: vec!["Assessment should be repeated".to_owned()],
            requires_attention: false,
        }
    }
}

/// Complete analysis of one drawing.
///
/// Created once per analysis and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// When the analysis was requested.
    pub timestamp: DateTime<Utc>,
    pub dimensions: Dimensions,
    pub colors: ColorDistribution,
    /// Classified contours grouped by shape kind.
    pub shapes: Vec<DetectedShape>,
    pub symbols: Vec<DetectedSymbol>,
    pub composition: CompositionAnalysis,
    /// Shape- and symbol-level observations.
    pub psychological_indicators: Vec<String>,
    pub emotions: EmotionAnalysis,
    pub risk: RiskAssessment,
    pub summary: String,
    /// Stages that substituted their default output.
    pub degraded: Vec<Stage>,
}

// ───────────────────────── Configuration ──────────────────────────

/// Thresholds read by the analysis stages.
///
/// All parameters default to the values the heuristics were tuned with.
/// Call [`validate`](Self::validate) on configurations that come from
/// outside the process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Gaussian sigma of the preprocessing noise reduction.
    pub preprocess_blur_sigma: f32,

    /// Linear contrast gain applied after noise reduction.
    pub contrast_gain: f32,

    /// Gaussian sigma applied to the grayscale image before edge detection.
    pub edge_blur_sigma: f32,

    /// Canny hysteresis low threshold.
    pub canny_low: f32,

    /// Canny hysteresis high threshold.
    pub canny_high: f32,

    /// Contours with an area at or below this (square pixels) are noise.
    pub min_contour_area: f64,

    /// Color buckets at or below this percentage are dropped.
    pub noise_floor_percent: f64,

    /// Polygon approximation tolerance as a fraction of the perimeter.
    pub approx_epsilon_ratio: f64,

    /// Fraction of each dimension a shape center must be off-center
    /// before it counts as left/right/top/bottom.
    pub position_margin: f64,
}

impl AnalysisConfig {
    /// Default preprocessing sigma. Matches the automatic sigma of a
    /// 5x5 Gaussian kernel.
    pub const DEFAULT_PREPROCESS_BLUR_SIGMA: f32 = 1.1;
    /// Default contrast gain.
    pub const DEFAULT_CONTRAST_GAIN: f32 = 1.2;
    /// Default edge blur sigma.
    pub const DEFAULT_EDGE_BLUR_SIGMA: f32 = 1.1;
    /// Default Canny low threshold.
    pub const DEFAULT_CANNY_LOW: f32 = 50.0;
    /// Default Canny high threshold.
    pub const DEFAULT_CANNY_HIGH: f32 = 150.0;
    /// Default minimum contour area.
    pub const DEFAULT_MIN_CONTOUR_AREA: f64 = 100.0;
    /// Default color noise floor.
    pub const DEFAULT_NOISE_FLOOR_PERCENT: f64 = 0.5;
    /// Default approximation tolerance ratio.
    pub const DEFAULT_APPROX_EPSILON_RATIO: f64 = 0.02;
    /// Default position margin.
    pub const DEFAULT_POSITION_MARGIN: f64 = 0.25;

    /// Check the invariants the stages rely on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConfig`] naming the first violated
    /// constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::InvalidConfig(msg));

        if !(self.preprocess_blur_sigma >= 0.0) || !(self.edge_blur_sigma >= 0.0) {
            return invalid("blur sigmas must be non-negative".to_owned());
        }
        if !(self.contrast_gain > 0.0) {
            return invalid(format!(
                "contrast_gain must be positive, got {}",
                self.contrast_gain
            ));
        }
        if !(self.canny_low >= 1.0) || !(self.canny_low <= self.canny_high) {
            return invalid(format!(
                "canny thresholds must satisfy 1 <= low <= high, got {}/{}",
                self.canny_low, self.canny_high
            ));
        }
        if !(self.min_contour_area >= 0.0) {
            return invalid("min_contour_area must be non-negative".to_owned());
        }
        if !(0.0..100.0).contains(&self.noise_floor_percent) {
            return invalid(format!(
                "noise_floor_percent must be in [0, 100), got {}",
                self.noise_floor_percent
            ));
        }
        if !(self.approx_epsilon_ratio > 0.0 && self.approx_epsilon_ratio < 1.0) {
            return invalid(format!(
                "approx_epsilon_ratio must be in (0, 1), got {}",
                self.approx_epsilon_ratio
            ));
        }
        if !(0.0..0.5).contains(&self.position_margin) {
            return invalid(format!(
                "position_margin must be in [0, 0.5), got {}",
                self.position_margin
            ));
        }
        Ok(())
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            preprocess_blur_sigma: Self::DEFAULT_PREPROCESS_BLUR_SIGMA,
            contrast_gain: Self::DEFAULT_CONTRAST_GAIN,
            edge_blur_sigma: Self::DEFAULT_EDGE_BLUR_SIGMA,
            canny_low: Self::DEFAULT_CANNY_LOW,
            canny_high: Self::DEFAULT_CANNY_HIGH,
            min_contour_area: Self::DEFAULT_MIN_CONTOUR_AREA,
            noise_floor_percent: Self::DEFAULT_NOISE_FLOOR_PERCENT,
            approx_epsilon_ratio: Self::DEFAULT_APPROX_EPSILON_RATIO,
            position_margin: Self::DEFAULT_POSITION_MARGIN,
        }
    }
}

// ───────────────────────── Errors ──────────────────────────

/// The source image could not be turned into a raster.
///
/// This is the only failure an analysis surfaces to its caller.
#[derive(Debug, thiserror::Error)]
pub enum ImageLoadError {
    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    /// The image decoded to zero pixels.
    #[error("image has zero size ({width}x{height})")]
    ZeroSized { width: u32, height: u32 },

    /// The source file is larger than the accepted upload size.
    #[error("image file is {size} bytes, limit is {limit}")]
    TooLarge { size: u64, limit: u64 },

    /// The source file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
}

/// A heuristic stage hit an internal fault and fell back to its default.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{stage} stage degraded: {reason}")]
pub struct StageDegraded {
    pub stage: Stage,
    pub reason: String,
}

impl StageDegraded {
    /// Create a degradation record for `stage`.
    #[must_use]
    pub fn new(stage: Stage, reason: impl Into<String>) -> Self {
        Self {
            stage,
            reason: reason.into(),
        }
    }
}

/// Configuration rejected by [`AnalysisConfig::validate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid analysis configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // --- Point tests ---

    #[test]
    fn point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance(b) - 5.0).abs() < f64::EPSILON);
        assert!((a.distance_squared(b) - 25.0).abs() < f64::EPSILON);
    }

    // --- BoundingBox tests ---

    #[test]
    fn bounding_box_center_and_aspect() {
        let bb = BoundingBox {
            x: 10,
            y: 20,
            width: 40,
            height: 20,
        };
        assert_eq!(bb.center(), Point::new(30.0, 30.0));
        assert_eq!(bb.aspect_ratio(), Some(2.0));
    }

    #[test]
    fn zero_height_box_has_no_aspect_ratio() {
        let bb = BoundingBox {
            x: 0,
            y: 0,
            width: 5,
            height: 0,
        };
        assert_eq!(bb.aspect_ratio(), None);
    }

    // --- Vocabulary tests ---

    #[test]
    fn vocabulary_serializes_to_fixed_strings() {
        assert_eq!(
            serde_json::to_string(&Balance::LeftHeavy).unwrap(),
            "\"left-heavy\""
        );
        assert_eq!(
            serde_json::to_string(&SymbolKind::PastFocus).unwrap(),
            "\"past_focus\""
        );
        assert_eq!(ShapeKind::Rectangle.to_string(), "rectangle");
    }

    #[test]
    fn emotion_order_matches_vocabulary() {
        let names: Vec<&str> = Emotion::ALL.iter().map(|e| e.as_str()).collect();
        assert_eq!(
            names,
            [
                "joy", "sadness", "anger", "fear", "calm", "energy", "anxiety", "love"
            ]
        );
        assert_eq!(Emotion::ALL.len(), Emotion::COUNT);
    }

    // --- EmotionScores tests ---

    #[test]
    fn normalize_scales_max_to_one() {
        let mut scores = EmotionScores::default();
        scores.add(Emotion::Calm, 0.8);
        scores.add(Emotion::Fear, 0.2);
        scores.normalize();
        assert!((scores.get(Emotion::Calm) - 1.0).abs() < 1e-12);
        assert!((scores.get(Emotion::Fear) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn normalize_all_zero_is_noop() {
        let mut scores = EmotionScores::default();
        scores.normalize();
        assert_eq!(scores, EmotionScores::default());
    }

    #[test]
    fn dominant_prefers_first_on_ties() {
        let mut scores = EmotionScores::default();
        scores.add(Emotion::Anger, 0.5);
        scores.add(Emotion::Love, 0.5);
        assert_eq!(scores.dominant(), Emotion::Anger);
        assert_eq!(EmotionScores::default().dominant(), Emotion::Joy);
    }

    #[test]
    fn scores_serialize_as_ordered_map() {
        let mut scores = EmotionScores::default();
        scores.add(Emotion::Love, 1.0);
        let json = serde_json::to_string(&scores).unwrap();
        assert!(json.starts_with("{\"joy\":0.0,\"sadness\":0.0"));
        assert!(json.ends_with("\"love\":1.0}"));
        let back: EmotionScores = serde_json::from_str(&json).unwrap();
        assert_eq!(back, scores);
    }

    // --- Config tests ---

    #[test]
    fn default_config_is_valid() {
        assert_eq!(AnalysisConfig::default().validate(), Ok(()));
    }

    #[test]
    fn inverted_canny_thresholds_rejected() {
        let config = AnalysisConfig {
            canny_low: 200.0,
            canny_high: 100.0,
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidConfig(_))
        ));
    }

    #[test]
    fn nan_sigma_rejected() {
        let config = AnalysisConfig {
            edge_blur_sigma: f32::NAN,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_config_json_fills_defaults() {
        let config: AnalysisConfig = serde_json::from_str(r#"{"canny_low": 30.0}"#).unwrap();
        assert!((config.canny_low - 30.0).abs() < f32::EPSILON);
        assert!((config.canny_high - AnalysisConfig::DEFAULT_CANNY_HIGH).abs() < f32::EPSILON);
    }

    #[test]
    fn stage_degraded_display() {
        let err = StageDegraded::new(Stage::Risk, "boom");
        assert_eq!(err.to_string(), "risk stage degraded: boom");
    }
}
