//! Symbol detection and shape-level psychological indicators.
//!
//! Symbols are matched against the per-contour shape list: a face needs
//! several distinct small circles, which aggregation would merge into one
//! group. Each rule is independent, so symbols may co-occur.

use crate::types::{
    Balance, ClassifiedShape, Complexity, CompositionAnalysis, DetectedShape, DetectedSymbol,
    Dimensions, Pressure, ShapeKind, SpaceUsage, Stage, StageDegraded, SymbolKind,
};

/// Head must be smaller than this fraction of the image area.
const HEAD_MAX_FRACTION: f64 = 0.1;

/// Fraction of organic/blob contours above which a drawing reads as
/// emotionally expressive.
const EXPRESSIVE_FRACTION: f64 = 0.7;

/// Fixed descriptors attached to every detected symbol of a kind.
struct SymbolProfile {
    complexity: Complexity,
    characteristics: &'static [&'static str],
}

const fn profile(kind: SymbolKind) -> SymbolProfile {
    let (complexity, characteristics): (Complexity, &'static [&'static str]) = match kind {
        SymbolKind::Human => (Complexity::Detailed, &["human_figure", "self_representation"]),
        SymbolKind::Face => (Complexity::Organic, &["face", "expression", "identity"]),
        SymbolKind::House => (Complexity::Structured, &["dwelling", "home", "structure"]),
        SymbolKind::Tree => (Complexity::Natural, &["nature", "growth", "life"]),
        SymbolKind::Isolation => (Complexity::Emotional, &["withdrawal", "shyness", "protection"]),
        SymbolKind::PastFocus => (Complexity::Emotional, &["nostalgia", "attachment", "memory"]),
        SymbolKind::EmotionalExpression => (
            Complexity::Fluid,
            &["sensitivity", "expressiveness", "emotionality"],
        ),
    };
    SymbolProfile {
        complexity,
        characteristics,
    }
}

/// Detect symbols from classified contours and the composition.
///
/// Symbols are returned in the fixed order human, face, house, tree,
/// isolation, past focus, emotional expression.
///
/// # Errors
///
/// Returns [`StageDegraded`] when the image has no area, since the head
/// size rule is relative to it.
pub fn detect_symbols(
    shapes: &[ClassifiedShape],
    composition: &CompositionAnalysis,
    dimensions: Dimensions,
) -> Result<Vec<DetectedSymbol>, StageDegraded> {
    let image_area = dimensions.area();
    if image_area <= 0.0 {
        return Err(StageDegraded::new(Stage::Symbols, "image has zero area"));
    }

    let checks = [
        (SymbolKind::Human, has_human(shapes, image_area)),
        (SymbolKind::Face, has_face(shapes)),
        (SymbolKind::House, has_house(shapes)),
        (SymbolKind::Tree, has_tree(shapes)),
        (
            SymbolKind::Isolation,
            composition.space_usage == SpaceUsage::Constricted,
        ),
        (
            SymbolKind::PastFocus,
            composition.balance == Balance::LeftHeavy,
        ),
        (SymbolKind::EmotionalExpression, is_expressive(shapes)),
    ];

    let symbols: Vec<DetectedSymbol> = checks
        .into_iter()
        .filter(|&(_, present)| present)
        .map(|(kind, _)| symbol(kind))
        .collect();

    tracing::debug!(symbols = symbols.len(), "symbols detected");
    Ok(symbols)
}

fn symbol(kind: SymbolKind) -> DetectedSymbol {
    let p = profile(kind);
    DetectedSymbol {
        kind,
        count: 1,
        complexity: p.complexity,
        characteristics: p.characteristics.iter().map(|&c| c.to_owned()).collect(),
    }
}

fn any(shapes: &[ClassifiedShape], pred: impl Fn(&ClassifiedShape) -> bool) -> bool {
    shapes.iter().any(pred)
}

/// A small round head together with a rectangular or free-form body.
fn has_human(shapes: &[ClassifiedShape], image_area: f64) -> bool {
    let head = any(shapes, |s| {
        s.kind.is_round() && s.area < image_area * HEAD_MAX_FRACTION
    });
    let body = any(shapes, |s| {
        (s.kind == ShapeKind::Rectangle && s.area > 500.0)
            || (s.kind.is_organic() && s.area > 1000.0)
    });
    head && body
}

/// One medium round outline and at least two small ones (eyes).
fn has_face(shapes: &[ClassifiedShape]) -> bool {
    let round = || shapes.iter().filter(|s| s.kind.is_round());
    let medium = round().filter(|s| (1000.0..5000.0).contains(&s.area)).count();
    let small = round().filter(|s| s.area < 1000.0).count();
    medium >= 1 && small >= 2
}

/// A large quadrilateral wall under a triangular roof.
fn has_house(shapes: &[ClassifiedShape]) -> bool {
    any(shapes, |s| s.kind.is_quadrilateral() && s.area > 2000.0)
        && any(shapes, |s| s.kind == ShapeKind::Triangle && s.area > 500.0)
}

/// A narrow trunk with round or free-form foliage.
fn has_tree(shapes: &[ClassifiedShape]) -> bool {
    any(shapes, |s| s.kind == ShapeKind::Rectangle && s.area < 2000.0)
        && any(shapes, |s| {
            (s.kind == ShapeKind::Circle || s.kind.is_organic()) && s.area > 1000.0
        })
}

#[allow(clippy::cast_precision_loss)]
fn is_expressive(shapes: &[ClassifiedShape]) -> bool {
    let organic = shapes.iter().filter(|s| s.kind.is_organic()).count();
    organic as f64 > shapes.len() as f64 * EXPRESSIVE_FRACTION
}

/// Total member count of the groups matching `pred`.
pub(crate) fn count_where(shapes: &[DetectedShape], pred: impl Fn(ShapeKind) -> bool) -> usize {
    shapes
        .iter()
        .filter(|s| pred(s.kind))
        .map(|s| s.count)
        .sum()
}

/// Shape- and symbol-level observations for the report.
#[must_use]
pub fn psychological_indicators(
    shapes: &[DetectedShape],
    symbols: &[DetectedSymbol],
    composition: &CompositionAnalysis,
) -> Vec<String> {
    let has = |kind: SymbolKind| symbols.iter().any(|s| s.kind == kind);
    let organic = count_where(shapes, ShapeKind::is_organic);
    let geometric = count_where(shapes, ShapeKind::is_geometric);

    let mut indicators = Vec::new();
    if organic > geometric * 2 {
        indicators.push("Fluid and organic emotional expression");
    }
    if has(SymbolKind::Human) || has(SymbolKind::Face) {
        indicators.push("Representation of self or others");
        if composition.space_usage == SpaceUsage::Constricted {
            indicators.push("Possible shyness or reserve in expression");
        }
    }
    if has(SymbolKind::House) {
        indicators.push("Sense of family and home");
    }
    if has(SymbolKind::Isolation) {
        indicators.push("Tendency to withdraw or need for personal space");
    }
    if has(SymbolKind::EmotionalExpression) {
        indicators.push("Marked emotional expressiveness");
    }
    match composition.pressure {
        Pressure::Heavy => indicators.push("Emotional intensity in expression"),
        Pressure::Light => indicators.push("Delicacy and sensitivity in the stroke"),
        Pressure::Medium | Pressure::Unknown => {}
    }

    indicators.into_iter().map(str::to_owned).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{BoundingBox, Position};

    fn shape(kind: ShapeKind, area: f64) -> ClassifiedShape {
        ClassifiedShape {
            kind,
            area,
            bounds: BoundingBox::default(),
            position: Position::Center,
            confidence: 0.5,
        }
    }

    fn dims() -> Dimensions {
        Dimensions {
            width: 400,
            height: 400,
        }
    }

    fn kinds(symbols: &[DetectedSymbol]) -> Vec<SymbolKind> {
        symbols.iter().map(|s| s.kind).collect()
    }

    fn detect(shapes: &[ClassifiedShape]) -> Vec<SymbolKind> {
        let composition = CompositionAnalysis {
            balance: Balance::Balanced,
            space_usage: SpaceUsage::Normal,
            pressure: Pressure::Medium,
            indicators: Vec::new(),
        };
        kinds(&detect_symbols(shapes, &composition, dims()).unwrap())
    }

    #[test]
    fn human_needs_head_and_body() {
        assert_eq!(
            detect(&[shape(ShapeKind::Circle, 3000.0), shape(ShapeKind::Rectangle, 600.0)]),
            vec![SymbolKind::Human, SymbolKind::Tree]
        );
        assert!(detect(&[shape(ShapeKind::Circle, 3000.0)]).is_empty());
        // Head too big: 10% of 160000 is 16000.
        assert!(!detect(&[shape(ShapeKind::Circle, 20000.0), shape(ShapeKind::Rectangle, 3000.0)])
            .contains(&SymbolKind::Human));
    }

    #[test]
    fn face_needs_two_small_circles() {
        let one_eye = [shape(ShapeKind::Circle, 2000.0), shape(ShapeKind::Ellipse, 300.0)];
        assert!(!detect(&one_eye).contains(&SymbolKind::Face));

        let two_eyes = [
            shape(ShapeKind::Circle, 2000.0),
            shape(ShapeKind::Ellipse, 300.0),
            shape(ShapeKind::Circle, 250.0),
        ];
        assert!(detect(&two_eyes).contains(&SymbolKind::Face));
    }

    #[test]
    fn house_is_wall_plus_roof() {
        let house = [shape(ShapeKind::Square, 5000.0), shape(ShapeKind::Triangle, 800.0)];
        assert_eq!(detect(&house), vec![SymbolKind::House]);
        let small_roof = [shape(ShapeKind::Square, 5000.0), shape(ShapeKind::Triangle, 400.0)];
        assert!(detect(&small_roof).is_empty());
    }

    #[test]
    fn tree_is_trunk_plus_foliage() {
        let tree = [shape(ShapeKind::Rectangle, 400.0), shape(ShapeKind::Circle, 1500.0)];
        assert!(detect(&tree).contains(&SymbolKind::Tree));
        // Ellipses do not count as foliage.
        let no_tree = [shape(ShapeKind::Rectangle, 400.0), shape(ShapeKind::Ellipse, 1500.0)];
        assert!(!detect(&no_tree).contains(&SymbolKind::Tree));
    }

    #[test]
    fn composition_driven_symbols() {
        let composition = CompositionAnalysis {
            balance: Balance::LeftHeavy,
            space_usage: SpaceUsage::Constricted,
            pressure: Pressure::Light,
            indicators: Vec::new(),
        };
        let symbols =
            detect_symbols(&[shape(ShapeKind::Square, 200.0)], &composition, dims()).unwrap();
        assert_eq!(kinds(&symbols), vec![SymbolKind::Isolation, SymbolKind::PastFocus]);
        assert_eq!(symbols[0].complexity, Complexity::Emotional);
        assert_eq!(symbols[1].characteristics, vec!["nostalgia", "attachment", "memory"]);
    }

    #[test]
    fn mostly_organic_is_emotional_expression() {
        let shapes = [
            shape(ShapeKind::Organic, 300.0),
            shape(ShapeKind::Blob, 300.0),
            shape(ShapeKind::Organic, 300.0),
            shape(ShapeKind::Organic, 300.0),
            shape(ShapeKind::Square, 300.0),
        ];
        assert_eq!(detect(&shapes), vec![SymbolKind::EmotionalExpression]);

        // Exactly 70% is not enough.
        let mut shapes: Vec<_> = (0..7).map(|_| shape(ShapeKind::Organic, 300.0)).collect();
        shapes.extend((0..3).map(|_| shape(ShapeKind::Triangle, 300.0)));
        assert!(detect(&shapes).is_empty());
    }

    #[test]
    fn every_kind_has_a_profile() {
        for &kind in SymbolKind::ALL {
            let detected = symbol(kind);
            assert_eq!(detected.kind, kind);
            assert_eq!(detected.count, 1);
            assert!(!detected.characteristics.is_empty(), "{kind} has no characteristics");
        }
        assert_eq!(
            symbol(SymbolKind::EmotionalExpression).characteristics,
            vec!["sensitivity", "expressiveness", "emotionality"]
        );
        assert_eq!(symbol(SymbolKind::House).complexity, Complexity::Structured);
    }

    #[test]
    fn no_shapes_no_structural_symbols() {
        assert!(detect(&[]).is_empty());
    }

    #[test]
    fn zero_area_image_degrades() {
        let err = detect_symbols(&[], &CompositionAnalysis::default(), Dimensions::default())
            .unwrap_err();
        assert_eq!(err.stage, Stage::Symbols);
    }

    // --- Psychological indicators ---

    fn group(kind: ShapeKind, count: usize) -> DetectedShape {
        DetectedShape {
            kind,
            count,
            average_size: 500.0,
            position: Position::Center,
            confidence: 0.5,
        }
    }

    #[test]
    fn family_text_requires_house() {
        let composition = CompositionAnalysis::default();
        let without = psychological_indicators(&[], &[], &composition);
        assert!(without.iter().all(|i| !i.contains("family")));

        let house = symbol(SymbolKind::House);
        let with = psychological_indicators(&[], &[house], &composition);
        assert_eq!(with, vec!["Sense of family and home"]);
    }

    #[test]
    fn indicators_from_shapes_symbols_and_pressure() {
        let shapes = [group(ShapeKind::Organic, 5), group(ShapeKind::Square, 2)];
        let symbols = [symbol(SymbolKind::Face), symbol(SymbolKind::Isolation)];
        let composition = CompositionAnalysis {
            balance: Balance::Balanced,
            space_usage: SpaceUsage::Constricted,
            pressure: Pressure::Heavy,
            indicators: Vec::new(),
        };
        assert_eq!(
            psychological_indicators(&shapes, &symbols, &composition),
            vec![
                "Fluid and organic emotional expression",
                "Representation of self or others",
                "Possible shyness or reserve in expression",
                "Tendency to withdraw or need for personal space",
                "Emotional intensity in expression",
            ]
        );
    }

    #[test]
    fn count_where_sums_group_counts() {
        let shapes = [
            group(ShapeKind::Blob, 2),
            group(ShapeKind::Organic, 3),
            group(ShapeKind::Circle, 4),
        ];
        assert_eq!(count_where(&shapes, ShapeKind::is_organic), 5);
        assert_eq!(count_where(&shapes, |k| k == ShapeKind::Circle), 4);
    }
}
