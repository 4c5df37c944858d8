//! Spatial composition: balance, space usage and stroke pressure.
//!
//! Reads the per-contour shape list, so every traced contour counts once
//! toward left/right balance.

use crate::types::{
    Balance, ClassifiedShape, CompositionAnalysis, Dimensions, Position, Pressure, SpaceUsage,
    Stage, StageDegraded,
};

/// Coverage thresholds, as fractions of the image area.
const CONSTRICTED_BELOW: f64 = 0.1;
const NORMAL_BELOW: f64 = 0.3;
const EXPANSIVE_BELOW: f64 = 0.6;

/// Mean shape area thresholds, in square pixels.
const LIGHT_BELOW: f64 = 500.0;
const MEDIUM_BELOW: f64 = 2000.0;

/// Indicator text emitted for a derived composition category.
enum Trigger {
    Balance(Balance),
    Space(SpaceUsage),
    Pressure(Pressure),
}

const INDICATORS: &[(Trigger, &str)] = &[
    (
        Trigger::Balance(Balance::LeftHeavy),
        "Orientation toward the past/mother",
    ),
    (
        Trigger::Balance(Balance::RightHeavy),
        "Orientation toward the future/father",
    ),
    (
        Trigger::Space(SpaceUsage::Constricted),
        "Reserved or shy expression",
    ),
    (Trigger::Space(SpaceUsage::Expansive), "Spatial confidence"),
    (
        Trigger::Pressure(Pressure::Heavy),
        "Intensity of expression",
    ),
    (Trigger::Pressure(Pressure::Light), "Delicacy in the stroke"),
];

/// Derive the composition of a drawing from its classified contours.
///
/// # Errors
///
/// Returns [`StageDegraded`] when the image has no area or the coverage
/// ratio is not finite.
pub fn analyze_composition(
    shapes: &[ClassifiedShape],
    dimensions: Dimensions,
) -> Result<CompositionAnalysis, StageDegraded> {
    if shapes.is_empty() {
        return Ok(CompositionAnalysis::default());
    }

    let image_area = dimensions.area();
    if image_area <= 0.0 {
        return Err(StageDegraded::new(Stage::Composition, "image has zero area"));
    }

    let left = shapes.iter().filter(|s| s.position == Position::Left).count();
    let right = shapes.iter().filter(|s| s.position == Position::Right).count();
    let balance = balance_of(left, right);

    let total_area: f64 = shapes.iter().map(|s| s.area).sum();
    let coverage = total_area / image_area;
    #[allow(clippy::cast_precision_loss)]
    let mean_size = total_area / shapes.len() as f64;
    if !coverage.is_finite() || !mean_size.is_finite() {
        return Err(StageDegraded::new(
            Stage::Composition,
            format!("non-finite coverage {coverage}"),
        ));
    }

    let space_usage = space_usage_of(coverage);
    let pressure = pressure_of(mean_size);
    let indicators = indicators_for(balance, space_usage, pressure);

    tracing::debug!(
        %balance,
        %space_usage,
        %pressure,
        coverage,
        "composition analyzed"
    );

    Ok(CompositionAnalysis {
        balance,
        space_usage,
        pressure,
        indicators,
    })
}

/// Balanced when the left and right counts differ by at most one.
#[must_use]
pub const fn balance_of(left: usize, right: usize) -> Balance {
    if left.abs_diff(right) <= 1 {
        Balance::Balanced
    } else if left > right {
        Balance::LeftHeavy
    } else {
        Balance::RightHeavy
    }
}

/// Space usage for a total-shape-area / image-area ratio.
#[must_use]
pub fn space_usage_of(coverage: f64) -> SpaceUsage {
    if coverage < CONSTRICTED_BELOW {
        SpaceUsage::Constricted
    } else if coverage < NORMAL_BELOW {
        SpaceUsage::Normal
    } else if coverage < EXPANSIVE_BELOW {
        SpaceUsage::Expansive
    } else {
        SpaceUsage::Crowded
    }
}

/// Stroke pressure for a mean shape area.
#[must_use]
pub fn pressure_of(mean_size: f64) -> Pressure {
    if mean_size < LIGHT_BELOW {
        Pressure::Light
    } else if mean_size < MEDIUM_BELOW {
        Pressure::Medium
    } else {
        Pressure::Heavy
    }
}

fn indicators_for(balance: Balance, space: SpaceUsage, pressure: Pressure) -> Vec<String> {
    INDICATORS
        .iter()
        .filter(|(trigger, _)| match *trigger {
            Trigger::Balance(b) => b == balance,
            Trigger::Space(s) => s == space,
            Trigger::Pressure(p) => p == pressure,
        })
        .map(|(_, text)| (*text).to_owned())
        .collect()
}
