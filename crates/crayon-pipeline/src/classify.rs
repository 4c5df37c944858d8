//! Per-contour geometric classification.
//!
//! Each contour is reduced to a handful of features (area, solidity,
//! aspect ratio, approximated vertex count) and run through a fixed rule
//! cascade. A contour whose geometry cannot be measured is typed
//! [`ShapeKind::Unknown`] rather than failing the batch.

use crate::aggregate::position_of;
use crate::contour::Contour;
use crate::simplify::approximate_closed;
use crate::types::{AnalysisConfig, ClassifiedShape, Dimensions, Position, ShapeKind};

/// Contours below this area are noise regardless of configuration.
const NOISE_AREA: f64 = 100.0;

/// Tolerance on `|aspect_ratio - 1|` for square and circle.
const SQUARE_TOLERANCE: f64 = 0.2;

/// Confidence assigned to contours whose geometry could not be measured.
const UNKNOWN_CONFIDENCE: f64 = 0.1;

/// Confidence for kinds not covered by a band.
const DEFAULT_CONFIDENCE: f64 = 0.3;

/// Solidity-dependent confidence for a family of shape kinds.
struct ConfidenceBand {
    kinds: &'static [ShapeKind],
    solidity_above: f64,
    high: f64,
    low: f64,
}

const CONFIDENCE_BANDS: &[ConfidenceBand] = &[
    ConfidenceBand {
        kinds: &[ShapeKind::Circle, ShapeKind::Ellipse],
        solidity_above: 0.8,
        high: 0.9,
        low: 0.6,
    },
    ConfidenceBand {
        kinds: &[ShapeKind::Square, ShapeKind::Rectangle],
        solidity_above: 0.85,
        high: 0.8,
        low: 0.5,
    },
    ConfidenceBand {
        kinds: &[ShapeKind::Triangle],
        solidity_above: 0.75,
        high: 0.7,
        low: 0.4,
    },
];

/// Geometry could not be measured for a contour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GeometryError {
    #[error("contour has no points")]
    Empty,
    #[error("convex hull has zero area")]
    DegenerateHull,
    #[error("bounding box has zero height")]
    ZeroHeight,
    #[error("non-finite measurement")]
    NonFinite,
}

/// Measurements the classification rules read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeFeatures {
    /// Enclosed area in square pixels.
    pub area: f64,
    /// `area / hull_area`; 1.0 for a convex shape.
    pub solidity: f64,
    /// Bounding box `width / height`.
    pub aspect_ratio: f64,
    /// Vertices left after polygon approximation.
    pub vertices: usize,
}

/// Measure the classification features of a contour.
///
/// # Errors
///
/// Returns [`GeometryError`] for empty contours, zero-area hulls,
/// zero-height bounding boxes, or non-finite intermediate values.
pub fn measure(contour: &Contour, epsilon_ratio: f64) -> Result<ShapeFeatures, GeometryError> {
    let bounds = contour.bounding_box().ok_or(GeometryError::Empty)?;
    let area = contour.area();
    let hull_area = contour.hull_area();
    if hull_area <= 0.0 {
        return Err(GeometryError::DegenerateHull);
    }
    let aspect_ratio = bounds.aspect_ratio().ok_or(GeometryError::ZeroHeight)?;
    let solidity = area / hull_area;

    let epsilon = epsilon_ratio * contour.perimeter();
    let vertices = approximate_closed(&contour.float_points(), epsilon).len();

    if !(area.is_finite() && solidity.is_finite() && aspect_ratio.is_finite()) {
        return Err(GeometryError::NonFinite);
    }

    Ok(ShapeFeatures {
        area,
        solidity,
        aspect_ratio,
        vertices,
    })
}

/// Apply the classification rules, first match wins.
#[must_use]
pub fn classify_features(features: &ShapeFeatures) -> ShapeKind {
    let squarish = (features.aspect_ratio - 1.0).abs() < SQUARE_TOLERANCE;

    if features.area < NOISE_AREA {
        ShapeKind::Noise
    } else if features.vertices == 3 {
        ShapeKind::Triangle
    } else if features.vertices == 4 {
        if squarish {
            ShapeKind::Square
        } else {
            ShapeKind::Rectangle
        }
    } else if features.vertices > 8 && features.solidity > 0.8 {
        if squarish {
            ShapeKind::Circle
        } else {
            ShapeKind::Ellipse
        }
    } else if features.solidity > 0.9 {
        ShapeKind::Blob
    } else {
        ShapeKind::Organic
    }
}

/// Classification confidence for `kind` at a given solidity.
#[must_use]
pub fn confidence(kind: ShapeKind, solidity: f64) -> f64 {
    if kind == ShapeKind::Unknown {
        return UNKNOWN_CONFIDENCE;
    }
    CONFIDENCE_BANDS
        .iter()
        .find(|band| band.kinds.contains(&kind))
        .map_or(DEFAULT_CONFIDENCE, |band| {
            if solidity > band.solidity_above {
                band.high
            } else {
                band.low
            }
        })
}

/// Classify one contour and place it on the sheet.
#[must_use]
pub fn classify_contour(
    contour: &Contour,
    dimensions: Dimensions,
    config: &AnalysisConfig,
) -> ClassifiedShape {
    let bounds = contour.bounding_box().unwrap_or_default();
    let position = if contour.is_empty() {
        Position::Center
    } else {
        position_of(bounds, dimensions, config.position_margin)
    };

    match measure(contour, config.approx_epsilon_ratio) {
        Ok(features) => {
            let kind = classify_features(&features);
            ClassifiedShape {
                kind,
                area: features.area,
                bounds,
                position,
                confidence: confidence(kind, features.solidity),
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, points = contour.len(), "contour degraded to unknown");
            ClassifiedShape {
                kind: ShapeKind::Unknown,
                area: contour.area(),
                bounds,
                position,
                confidence: UNKNOWN_CONFIDENCE,
            }
        }
    }
}

/// Classify every contour independently.
#[must_use]
pub fn classify_all(
    contours: &[Contour],
    dimensions: Dimensions,
    config: &AnalysisConfig,
) -> Vec<ClassifiedShape> {
    contours
        .iter()
        .map(|c| classify_contour(c, dimensions, config))
        .collect()
}
