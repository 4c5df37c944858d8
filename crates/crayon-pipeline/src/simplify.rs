//! Closed-polygon approximation using the Ramer-Douglas-Peucker algorithm.
//!
//! Shape classification counts the vertices that survive simplification:
//! a clean square collapses to 4, a triangle to 3, a round stroke keeps
//! many. A closed curve has no natural endpoints, so it is split at its
//! first point and the point farthest from it, and each half is
//! simplified as an open polyline.

use crate::types::Point;

/// Approximate a closed curve with fewer vertices.
///
/// Points within `tolerance` pixels of the chord between retained
/// neighbours are removed. Returns the retained vertices in their
/// original order, without repeating the first vertex at the end.
///
/// Curves with fewer than 3 points are returned unchanged.
#[must_use = "returns the approximated polygon"]
pub fn approximate_closed(points: &[Point], tolerance: f64) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let anchor = points[0];
    let far = points
        .iter()
        .enumerate()
        .skip(1)
        .fold((0, 0.0), |(best, best_d), (i, p)| {
            let d = p.distance_squared(anchor);
            if d > best_d { (i, d) } else { (best, best_d) }
        })
        .0;

    if far == 0 {
        // Every point coincides with the anchor.
        return vec![anchor];
    }

    // Second half wraps back to the anchor so both halves share endpoints.
    let mut ring: Vec<Point> = points.to_vec();
    ring.push(anchor);

    let mut kept = vec![false; ring.len()];
    kept[0] = true;
    kept[far] = true;
    rdp_recurse(&ring, 0, far, tolerance, &mut kept);
    rdp_recurse(&ring, far, ring.len() - 1, tolerance, &mut kept);

    ring.iter()
        .zip(&kept)
        .take(points.len())
        .filter(|&(_, k)| *k)
        .map(|(&p, _)| p)
        .collect()
}

/// Recursive step of the Ramer-Douglas-Peucker algorithm.
///
/// Finds the point between `start` and `end` that is farthest from the
/// line segment between them. If that distance exceeds `tolerance`, the
/// point is kept and both sub-segments are processed recursively.
fn rdp_recurse(points: &[Point], start: usize, end: usize, tolerance: f64, kept: &mut [bool]) {
    if end <= start + 1 {
        return;
    }

    let mut max_dist = 0.0;
    let mut max_idx = start;

    for i in (start + 1)..end {
        let d = perpendicular_distance(points[i], points[start], points[end]);
        if d > max_dist {
            max_dist = d;
            max_idx = i;
        }
    }

    if max_dist > tolerance {
        kept[max_idx] = true;
        rdp_recurse(points, start, max_idx, tolerance, kept);
        rdp_recurse(points, max_idx, end, tolerance, kept);
    }
}

/// Perpendicular distance from point `p` to the line defined by `a` and `b`.
///
/// Uses the formula: |cross(b-a, p-a)| / |b-a|.
/// When `a` and `b` coincide, returns the distance from `p` to `a`.
fn perpendicular_distance(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length_sq = dx.mul_add(dx, dy * dy);

    if length_sq == 0.0 {
        return p.distance(a);
    }

    let cross = dx.mul_add(a.y - p.y, -(dy * (a.x - p.x)));
    cross.abs() / length_sq.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(coords: &[(f64, f64)]) -> Vec<Point> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    /// Densely sampled closed polygon through the given corners.
    fn densify(corners: &[(f64, f64)], steps: usize) -> Vec<Point> {
        let mut out = Vec::new();
        for (i, &(ax, ay)) in corners.iter().enumerate() {
            let (bx, by) = corners[(i + 1) % corners.len()];
            for s in 0..steps {
                #[allow(clippy::cast_precision_loss)]
                let t = s as f64 / steps as f64;
                out.push(Point::new(t.mul_add(bx - ax, ax), t.mul_add(by - ay, ay)));
            }
        }
        out
    }

    #[test]
    fn short_curves_unchanged() {
        let two = pts(&[(0.0, 0.0), (5.0, 0.0)]);
        assert_eq!(approximate_closed(&two, 1.0), two);
        assert!(approximate_closed(&[], 1.0).is_empty());
    }

    #[test]
    fn dense_square_collapses_to_corners() {
        let square = densify(&[(0.0, 0.0), (40.0, 0.0), (40.0, 40.0), (0.0, 40.0)], 10);
        let approx = approximate_closed(&square, 3.2);
        assert_eq!(
            approx,
            pts(&[(0.0, 0.0), (40.0, 0.0), (40.0, 40.0), (0.0, 40.0)])
        );
    }

    #[test]
    fn dense_triangle_collapses_to_three() {
        let tri = densify(&[(0.0, 0.0), (60.0, 0.0), (30.0, 50.0)], 12);
        assert_eq!(approximate_closed(&tri, 3.0).len(), 3);
    }

    #[test]
    fn zero_tolerance_keeps_corners_of_zigzag() {
        let zig = pts(&[(0.0, 0.0), (2.0, 5.0), (4.0, 0.0), (6.0, 5.0), (8.0, 0.0)]);
        assert_eq!(approximate_closed(&zig, 0.0).len(), 5);
    }

    #[test]
    fn coincident_points_collapse_to_one() {
        let same = pts(&[(3.0, 3.0), (3.0, 3.0), (3.0, 3.0)]);
        assert_eq!(approximate_closed(&same, 1.0), pts(&[(3.0, 3.0)]));
    }

    #[test]
    fn perpendicular_distance_on_axis() {
        let d = perpendicular_distance(
            Point::new(1.0, 3.0),
            Point::new(0.0, 0.0),
            Point::new(2.0, 0.0),
        );
        assert!((d - 3.0).abs() < 1e-10);
    }

    #[test]
    fn perpendicular_distance_coincident_endpoints() {
        let d = perpendicular_distance(
            Point::new(3.0, 4.0),
            Point::new(0.0, 0.0),
            Point::new(0.0, 0.0),
        );
        assert!((d - 5.0).abs() < 1e-10);
    }
}
