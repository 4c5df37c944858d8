//! Color distribution: partition pixels into named, mutually exclusive
//! color buckets.
//!
//! Pixels are converted to 8-bit HSV (hue 0-180, saturation and value
//! 0-255) and tested against an ordered table of ranges. The first range
//! that matches a pixel claims it; later ranges never see it again. Red
//! wraps around the hue origin, so it has two bands that feed the same
//! bucket.

use crate::types::{
    AnalysisConfig, ColorBucket, ColorDistribution, ColorName, RgbImage, Stage, StageDegraded,
};

/// An inclusive HSV box that feeds one bucket.
#[derive(Debug, Clone, Copy)]
struct HsvRange {
    bucket: ColorName,
    lower: [u8; 3],
    upper: [u8; 3],
}

impl HsvRange {
    const fn new(bucket: ColorName, lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self {
            bucket,
            lower,
            upper,
        }
    }

    fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|i| self.lower[i] <= hsv[i] && hsv[i] <= self.upper[i])
    }
}

/// Ranges in claim order.
const COLOR_RANGES: [HsvRange; 12] = [
    HsvRange::new(ColorName::Red, [0, 100, 100], [10, 255, 255]),
    HsvRange::new(ColorName::Red, [170, 100, 100], [180, 255, 255]),
    HsvRange::new(ColorName::Orange, [10, 100, 100], [20, 255, 255]),
    HsvRange::new(ColorName::Yellow, [20, 100, 100], [30, 255, 255]),
    HsvRange::new(ColorName::Green, [40, 100, 100], [80, 255, 255]),
    HsvRange::new(ColorName::Blue, [100, 100, 100], [130, 255, 255]),
    HsvRange::new(ColorName::Purple, [130, 100, 100], [170, 255, 255]),
    HsvRange::new(ColorName::Pink, [140, 50, 100], [170, 255, 255]),
    HsvRange::new(ColorName::Brown, [10, 100, 50], [20, 255, 150]),
    HsvRange::new(ColorName::Black, [0, 0, 0], [180, 255, 50]),
    HsvRange::new(ColorName::White, [0, 0, 200], [180, 50, 255]),
    HsvRange::new(ColorName::Gray, [0, 0, 50], [180, 50, 200]),
];

/// What a color says about a drawing.
///
/// Colors with a `dominant` entry use the stronger phrase once their
/// share exceeds the threshold percentage.
struct ColorMeaning {
    color: ColorName,
    dominant: Option<(f64, &'static str)>,
    presence: &'static str,
}

const COLOR_MEANINGS: &[ColorMeaning] = &[
    ColorMeaning {
        color: ColorName::Red,
        dominant: Some((30.0, "Dominant red: intense energy, passion")),
        presence: "Presence of red: energy, vitality",
    },
    ColorMeaning {
        color: ColorName::Blue,
        dominant: Some((30.0, "Dominant blue: calm, serenity")),
        presence: "Presence of blue: peace, tranquility",
    },
    ColorMeaning {
        color: ColorName::Black,
        dominant: Some((20.0, "Important black: possible anxiety or sadness")),
        presence: "Traces of black: may indicate anxiety",
    },
    ColorMeaning {
        color: ColorName::White,
        dominant: Some((30.0, "Dominant white: purity or emotional emptiness")),
        presence: "Presence of white: clarity, innocence",
    },
    ColorMeaning {
        color: ColorName::Yellow,
        dominant: None,
        presence: "Yellow: joy, optimism",
    },
    ColorMeaning {
        color: ColorName::Green,
        dominant: None,
        presence: "Green: balance, growth",
    },
    ColorMeaning {
        color: ColorName::Orange,
        dominant: None,
        presence: "Orange: creativity, enthusiasm",
    },
    ColorMeaning {
        color: ColorName::Purple,
        dominant: None,
        presence: "Purple: imagination, spirituality",
    },
    ColorMeaning {
        color: ColorName::Pink,
        dominant: None,
        presence: "Pink: tenderness, affection",
    },
    ColorMeaning {
        color: ColorName::Brown,
        dominant: None,
        presence: "Brown: stability, security",
    },
    ColorMeaning {
        color: ColorName::Gray,
        dominant: None,
        presence: "Gray: neutrality, maturity",
    },
    ColorMeaning {
        color: ColorName::Other,
        dominant: None,
        presence: "Varied colors: complex palette",
    },
];

/// Number of top buckets that get an interpretation line.
const INTERPRETED_BUCKETS: usize = 3;

/// Convert one RGB pixel to 8-bit HSV.
///
/// Hue is halved to fit a byte (0-180); saturation and value span 0-255.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::float_cmp
)]
pub fn rgb_to_hsv(rgb: [u8; 3]) -> [u8; 3] {
    let [r, g, b] = rgb.map(f32::from);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let saturation = if max > 0.0 { delta * 255.0 / max } else { 0.0 };

    let mut hue = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (g - b) / delta
    } else if max == g {
        60.0f32.mul_add((b - r) / delta, 120.0)
    } else {
        60.0f32.mul_add((r - g) / delta, 240.0)
    };
    if hue < 0.0 {
        hue += 360.0;
    }

    [
        (hue / 2.0).round().clamp(0.0, 180.0) as u8,
        saturation.round().clamp(0.0, 255.0) as u8,
        max as u8,
    ]
}

/// Partition the image into color buckets.
///
/// An image with no pixels yields the empty default distribution.
///
/// # Errors
///
/// Returns [`StageDegraded`] if the computed shares are not a valid
/// partition (non-finite, or summing past 100%).
#[allow(clippy::cast_precision_loss)]
pub fn analyze_colors(
    image: &RgbImage,
    config: &AnalysisConfig,
) -> Result<ColorDistribution, StageDegraded> {
    let total = image.width() as usize * image.height() as usize;
    if total == 0 {
        return Ok(ColorDistribution::default());
    }

    let hsv: Vec<[u8; 3]> = image.pixels().map(|p| rgb_to_hsv(p.0)).collect();
    let mut claimed = vec![false; total];
    let mut claimed_count = 0usize;
    let mut buckets: Vec<ColorBucket> = Vec::new();

    for range in &COLOR_RANGES {
        let matches: Vec<usize> = hsv
            .iter()
            .enumerate()
            .filter(|&(i, &px)| !claimed[i] && range.contains(px))
            .map(|(i, _)| i)
            .collect();

        let percentage = matches.len() as f64 / total as f64 * 100.0;
        if percentage <= config.noise_floor_percent {
            continue;
        }

        for &i in &matches {
            claimed[i] = true;
        }
        claimed_count += matches.len();

        // Both red bands land in one bucket.
        if let Some(existing) = buckets.iter_mut().find(|b| b.color == range.bucket) {
            existing.percentage = round2(existing.percentage + percentage);
        } else {
            buckets.push(ColorBucket {
                color: range.bucket,
                percentage: round2(percentage),
            });
        }
    }

    let remaining = (total - claimed_count) as f64 / total as f64 * 100.0;
    if remaining > config.noise_floor_percent {
        buckets.push(ColorBucket {
            color: ColorName::Other,
            percentage: round2(remaining),
        });
    }

    let sum: f64 = buckets.iter().map(|b| b.percentage).sum();
    if !sum.is_finite() || sum > 100.0 + 0.01 * buckets.len() as f64 {
        return Err(StageDegraded::new(
            Stage::Color,
            format!("bucket shares sum to {sum}"),
        ));
    }

    let dominant_color = dominant(&buckets);
    let intensity = color_intensity(&hsv);
    let interpretations = interpret(&buckets);

    tracing::debug!(
        buckets = buckets.len(),
        dominant = %dominant_color,
        intensity,
        "color distribution computed"
    );

    Ok(ColorDistribution {
        buckets,
        dominant_color,
        intensity,
        interpretations,
    })
}

/// Largest bucket; the earliest recorded wins ties.
fn dominant(buckets: &[ColorBucket]) -> ColorName {
    let mut best: Option<&ColorBucket> = None;
    for bucket in buckets {
        if best.is_none_or(|b| bucket.percentage > b.percentage) {
            best = Some(bucket);
        }
    }
    best.map_or(ColorName::Unknown, |b| b.color)
}

/// Mean of normalized saturation and value.
#[allow(clippy::cast_precision_loss)]
fn color_intensity(hsv: &[[u8; 3]]) -> f64 {
    if hsv.is_empty() {
        return 0.0;
    }
    let n = hsv.len() as f64;
    let (s_sum, v_sum) = hsv.iter().fold((0u64, 0u64), |(s, v), px| {
        (s + u64::from(px[1]), v + u64::from(px[2]))
    });
    let saturation = s_sum as f64 / n / 255.0;
    let value = v_sum as f64 / n / 255.0;
    f64::midpoint(saturation, value)
}

/// Interpretation lines for the top buckets plus one global note.
fn interpret(buckets: &[ColorBucket]) -> Vec<String> {
    let mut ranked: Vec<&ColorBucket> = buckets.iter().collect();
    ranked.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));

    let mut lines: Vec<String> = ranked
        .iter()
        .take(INTERPRETED_BUCKETS)
        .map(|b| color_interpretation(b.color, b.percentage))
        .collect();

    let black = buckets
        .iter()
        .find(|b| b.color == ColorName::Black)
        .map_or(0.0, |b| b.percentage);

    if black > 50.0 {
        lines.push("Predominance of black: needs particular attention".to_owned());
    } else if buckets.len() == 1 {
        lines.push("Monochromatic drawing: focused expression".to_owned());
    } else if buckets.len() >= 5 {
        lines.push("Varied color palette: rich emotional expression".to_owned());
    }

    lines
}

/// Interpretation line for one bucket.
#[must_use]
pub fn color_interpretation(color: ColorName, percentage: f64) -> String {
    COLOR_MEANINGS
        .iter()
        .find(|m| m.color == color)
        .map_or_else(
            || format!("Color {color}: contextual meaning"),
            |m| match m.dominant {
                Some((threshold, phrase)) if percentage > threshold => phrase.to_owned(),
                _ => m.presence.to_owned(),
            },
        )
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn solid(w: u32, h: u32, rgb: [u8; 3]) -> RgbImage {
        RgbImage::from_fn(w, h, |_, _| image::Rgb(rgb))
    }

    // --- HSV conversion ---

    #[test]
    fn hsv_of_primaries() {
        assert_eq!(rgb_to_hsv([255, 0, 0]), [0, 255, 255]);
        assert_eq!(rgb_to_hsv([0, 255, 0]), [60, 255, 255]);
        assert_eq!(rgb_to_hsv([0, 0, 255]), [120, 255, 255]);
        assert_eq!(rgb_to_hsv([0, 0, 0]), [0, 0, 0]);
        assert_eq!(rgb_to_hsv([255, 255, 255]), [0, 0, 255]);
    }

    #[test]
    fn hsv_of_magenta_side_red_wraps_high() {
        // Hue 350 degrees -> 175 in 8-bit units.
        let [h, _, _] = rgb_to_hsv([255, 0, 43]);
        assert!(h >= 170, "expected wrapped red hue, got {h}");
    }

    // --- Distribution ---

    #[test]
    fn all_black_image_is_single_black_bucket() {
        let dist = analyze_colors(&solid(20, 10, [0, 0, 0]), &AnalysisConfig::default()).unwrap();
        assert_eq!(
            dist.buckets,
            vec![ColorBucket {
                color: ColorName::Black,
                percentage: 100.0
            }]
        );
        assert_eq!(dist.dominant_color, ColorName::Black);
        assert!(
            dist.interpretations
                .iter()
                .any(|s| s.contains("Important black"))
        );
        assert!(
            dist.interpretations
                .iter()
                .any(|s| s.contains("Predominance of black"))
        );
    }

    #[test]
    fn empty_image_yields_default() {
        let dist = analyze_colors(&RgbImage::new(0, 0), &AnalysisConfig::default()).unwrap();
        assert_eq!(dist, ColorDistribution::default());
        assert_eq!(dist.dominant_color, ColorName::Unknown);
    }

    #[test]
    fn half_blue_half_white() {
        let img = RgbImage::from_fn(10, 10, |x, _| {
            if x < 5 {
                image::Rgb([0, 0, 255])
            } else {
                image::Rgb([255, 255, 255])
            }
        });
        let dist = analyze_colors(&img, &AnalysisConfig::default()).unwrap();
        assert_eq!(dist.percentage(ColorName::Blue), 50.0);
        assert_eq!(dist.percentage(ColorName::White), 50.0);
        // Tie goes to the earlier bucket.
        assert_eq!(dist.dominant_color, ColorName::Blue);
    }

    #[test]
    fn both_red_bands_merge_into_one_bucket() {
        let img = RgbImage::from_fn(10, 10, |x, _| {
            if x < 5 {
                image::Rgb([255, 0, 0])
            } else {
                image::Rgb([255, 0, 43])
            }
        });
        let dist = analyze_colors(&img, &AnalysisConfig::default()).unwrap();
        assert_eq!(dist.buckets.len(), 1);
        assert_eq!(dist.percentage(ColorName::Red), 100.0);
    }

    #[test]
    fn pixels_are_claimed_once() {
        // Purple (hue ~150, high saturation) also falls inside the pink
        // range; it must be counted only as purple.
        let dist = analyze_colors(&solid(10, 10, [180, 0, 255]), &AnalysisConfig::default())
            .unwrap();
        assert_eq!(dist.percentage(ColorName::Purple), 100.0);
        assert_eq!(dist.percentage(ColorName::Pink), 0.0);
        assert!(dist.total_percentage() <= 100.0);
    }

    #[test]
    fn unmatched_hues_fall_into_other() {
        // Hue ~35 (between yellow and green) is not in any named range.
        let dist =
            analyze_colors(&solid(10, 10, [213, 255, 0]), &AnalysisConfig::default()).unwrap();
        assert_eq!(dist.buckets.len(), 1);
        assert_eq!(dist.dominant_color, ColorName::Other);
    }

    #[test]
    fn buckets_under_noise_floor_are_dropped() {
        // 1 red pixel in 400 = 0.25%, below the 0.5% floor.
        let img = RgbImage::from_fn(20, 20, |x, y| {
            if x == 0 && y == 0 {
                image::Rgb([255, 0, 0])
            } else {
                image::Rgb([0, 0, 0])
            }
        });
        let dist = analyze_colors(&img, &AnalysisConfig::default()).unwrap();
        assert_eq!(dist.percentage(ColorName::Red), 0.0);
        assert_eq!(dist.percentage(ColorName::Black), 99.75);
        for bucket in &dist.buckets {
            assert!((0.0..=100.0).contains(&bucket.percentage));
        }
    }

    #[test]
    fn intensity_is_mean_of_saturation_and_value() {
        let red = analyze_colors(&solid(4, 4, [255, 0, 0]), &AnalysisConfig::default()).unwrap();
        assert!((red.intensity - 1.0).abs() < 1e-9);
        let white =
            analyze_colors(&solid(4, 4, [255, 255, 255]), &AnalysisConfig::default()).unwrap();
        assert!((white.intensity - 0.5).abs() < 1e-9);
    }

    // --- Interpretation ---

    #[test]
    fn interpretation_strength_depends_on_share() {
        assert_eq!(
            color_interpretation(ColorName::Red, 45.0),
            "Dominant red: intense energy, passion"
        );
        assert_eq!(
            color_interpretation(ColorName::Red, 10.0),
            "Presence of red: energy, vitality"
        );
        assert_eq!(
            color_interpretation(ColorName::Yellow, 90.0),
            "Yellow: joy, optimism"
        );
    }

    #[test]
    fn monochrome_note_for_single_bucket() {
        let dist = analyze_colors(&solid(8, 8, [0, 0, 255]), &AnalysisConfig::default()).unwrap();
        assert_eq!(
            dist.interpretations,
            vec![
                "Dominant blue: calm, serenity".to_owned(),
                "Monochromatic drawing: focused expression".to_owned(),
            ]
        );
    }

    #[test]
    fn rich_palette_note_for_five_buckets() {
        let colors = [
            [255, 0, 0],
            [0, 0, 255],
            [255, 255, 0],
            [0, 255, 0],
            [255, 255, 255],
        ];
        let img = RgbImage::from_fn(10, 10, |x, _| image::Rgb(colors[(x / 2) as usize]));
        let dist = analyze_colors(&img, &AnalysisConfig::default()).unwrap();
        assert_eq!(dist.buckets.len(), 5);
        // Three top buckets plus the global note.
        assert_eq!(dist.interpretations.len(), 4);
        assert_eq!(
            dist.interpretations.last().unwrap(),
            "Varied color palette: rich emotional expression"
        );
    }
}
