//! Grouping of classified contours by shape kind.

use crate::types::{BoundingBox, ClassifiedShape, DetectedShape, Dimensions, Position, ShapeKind};

/// Place a bounding box relative to the image center.
///
/// The box center must be more than `margin` (a fraction of the image
/// dimension) away from the image center along an axis to count as
/// left/right/top/bottom. Axes are checked in the order left, right,
/// top, bottom; anything else is center.
#[must_use]
pub fn position_of(bounds: BoundingBox, dimensions: Dimensions, margin: f64) -> Position {
    let center = bounds.center();
    let image_center = dimensions.center();
    let dx = f64::from(dimensions.width) * margin;
    let dy = f64::from(dimensions.height) * margin;

    if center.x < image_center.x - dx {
        Position::Left
    } else if center.x > image_center.x + dx {
        Position::Right
    } else if center.y < image_center.y - dy {
        Position::Top
    } else if center.y > image_center.y + dy {
        Position::Bottom
    } else {
        Position::Center
    }
}

/// Group classified contours by kind, in order of first appearance.
///
/// Each group reports its member count, mean area, mean confidence and
/// most frequent position.
#[must_use]
pub fn aggregate(shapes: &[ClassifiedShape]) -> Vec<DetectedShape> {
    let mut groups: Vec<(ShapeKind, Vec<&ClassifiedShape>)> = Vec::new();
    for shape in shapes {
        match groups.iter_mut().find(|(kind, _)| *kind == shape.kind) {
            Some((_, members)) => members.push(shape),
            None => groups.push((shape.kind, vec![shape])),
        }
    }

    groups
        .into_iter()
        .map(|(kind, members)| {
            #[allow(clippy::cast_precision_loss)]
            let n = members.len() as f64;
            DetectedShape {
                kind,
                count: members.len(),
                average_size: members.iter().map(|s| s.area).sum::<f64>() / n,
                position: dominant_position(&members),
                confidence: members.iter().map(|s| s.confidence).sum::<f64>() / n,
            }
        })
        .collect()
}

/// Most frequent position; the first to appear wins ties.
fn dominant_position(members: &[&ClassifiedShape]) -> Position {
    let mut tally: Vec<(Position, usize)> = Vec::new();
    for shape in members {
        match tally.iter_mut().find(|(p, _)| *p == shape.position) {
            Some((_, n)) => *n += 1,
            None => tally.push((shape.position, 1)),
        }
    }
    // `max_by_key` keeps the last maximum, so scan manually.
    let mut best = (Position::Center, 0);
    for entry in tally {
        if entry.1 > best.1 {
            best = entry;
        }
    }
    best.0
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn dims() -> Dimensions {
        Dimensions {
            width: 200,
            height: 100,
        }
    }

    fn boxed(cx: i32, cy: i32) -> BoundingBox {
        BoundingBox {
            x: cx - 5,
            y: cy - 5,
            width: 10,
            height: 10,
        }
    }

    fn shape(kind: ShapeKind, area: f64, position: Position, confidence: f64) -> ClassifiedShape {
        ClassifiedShape {
            kind,
            area,
            bounds: BoundingBox::default(),
            position,
            confidence,
        }
    }

    // --- position_of ---

    #[test]
    fn positions_outside_margin() {
        assert_eq!(position_of(boxed(20, 50), dims(), 0.25), Position::Left);
        assert_eq!(position_of(boxed(180, 50), dims(), 0.25), Position::Right);
        assert_eq!(position_of(boxed(100, 10), dims(), 0.25), Position::Top);
        assert_eq!(position_of(boxed(100, 90), dims(), 0.25), Position::Bottom);
    }

    #[test]
    fn inside_margin_is_center() {
        // 40 px right of center, margin is 50 px.
        assert_eq!(position_of(boxed(140, 50), dims(), 0.25), Position::Center);
    }

    #[test]
    fn horizontal_checked_before_vertical() {
        assert_eq!(position_of(boxed(10, 5), dims(), 0.25), Position::Left);
    }

    // --- aggregate ---

    #[test]
    fn groups_in_first_appearance_order() {
        let shapes = [
            shape(ShapeKind::Organic, 300.0, Position::Left, 0.3),
            shape(ShapeKind::Square, 1000.0, Position::Center, 0.8),
            shape(ShapeKind::Organic, 500.0, Position::Left, 0.3),
        ];
        let groups = aggregate(&shapes);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].kind, ShapeKind::Organic);
        assert_eq!(groups[0].count, 2);
        assert_eq!(groups[0].average_size, 400.0);
        assert_eq!(groups[0].position, Position::Left);
        assert_eq!(groups[1].kind, ShapeKind::Square);
        assert_eq!(groups[1].confidence, 0.8);
    }

    #[test]
    fn mean_confidence() {
        let shapes = [
            shape(ShapeKind::Circle, 100.0, Position::Top, 0.9),
            shape(ShapeKind::Circle, 100.0, Position::Top, 0.6),
        ];
        let groups = aggregate(&shapes);
        assert!((groups[0].confidence - 0.75).abs() < 1e-12);
    }

    #[test]
    fn dominant_position_tie_goes_to_first() {
        let shapes = [
            shape(ShapeKind::Blob, 100.0, Position::Right, 0.3),
            shape(ShapeKind::Blob, 100.0, Position::Bottom, 0.3),
            shape(ShapeKind::Blob, 100.0, Position::Bottom, 0.3),
            shape(ShapeKind::Blob, 100.0, Position::Right, 0.3),
        ];
        assert_eq!(aggregate(&shapes)[0].position, Position::Right);
    }

    #[test]
    fn empty_input_empty_output() {
        assert!(aggregate(&[]).is_empty());
    }
}
