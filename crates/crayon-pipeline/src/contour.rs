//! Contour extraction: edge map -> closed boundary curves.
//!
//! Uses Suzuki-Abe border following
//! ([`imageproc::contours::find_contours`]), which returns the full border
//! hierarchy: both outer borders and hole borders become contours. Curves
//! enclosing no more than [`AnalysisConfig::min_contour_area`] are dropped
//! as noise before classification.

use geo::{Area, ConvexHull, Coord, LineString, Polygon};
use image::GrayImage;
use imageproc::point::Point as PixelPoint;

use crate::edge;
use crate::types::{AnalysisConfig, BoundingBox, Point, RgbImage};

/// An ordered, implicitly closed sequence of pixel coordinates.
///
/// Geometric attributes are derived on demand and never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contour {
    points: Vec<PixelPoint<i32>>,
}

impl Contour {
    /// Create a contour from its boundary points.
    #[must_use]
    pub const fn new(points: Vec<PixelPoint<i32>>) -> Self {
        Self { points }
    }

    /// Boundary points in tracing order.
    #[must_use]
    pub fn points(&self) -> &[PixelPoint<i32>] {
        &self.points
    }

    /// Number of boundary points.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if the contour has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Boundary points as floating-point [`Point`]s.
    #[must_use]
    pub fn float_points(&self) -> Vec<Point> {
        self.points
            .iter()
            .map(|p| Point::new(f64::from(p.x), f64::from(p.y)))
            .collect()
    }

    /// Signed shoelace area of the closed polygon.
    ///
    /// The sign follows the tracing direction.
    #[must_use]
    pub fn signed_area(&self) -> f64 {
        self.polygon().signed_area()
    }

    /// Absolute enclosed area.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Area of the convex hull of the boundary points.
    #[must_use]
    pub fn hull_area(&self) -> f64 {
        self.polygon().convex_hull().unsigned_area()
    }

    /// Length of the closed boundary, including the closing segment.
    #[must_use]
    pub fn perimeter(&self) -> f64 {
        let pts = self.float_points();
        match pts.as_slice() {
            [] | [_] => 0.0,
            [first, .., last] => {
                let open: f64 = pts.windows(2).map(|w| w[0].distance(w[1])).sum();
                open + last.distance(*first)
            }
        }
    }

    /// Axis-aligned pixel bounding box, or `None` for an empty contour.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let first = self.points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &self.points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(BoundingBox {
            x: min_x,
            y: min_y,
            width: (max_x - min_x + 1) as u32,
            height: (max_y - min_y + 1) as u32,
        })
    }

    fn polygon(&self) -> Polygon<f64> {
        let coords: Vec<Coord<f64>> = self
            .points
            .iter()
            .map(|p| Coord {
                x: f64::from(p.x),
                y: f64::from(p.y),
            })
            .collect();
        Polygon::new(LineString::from(coords), vec![])
    }
}

/// Extract classification-ready contours from a preprocessed drawing.
///
/// Grayscale -> Gaussian blur -> Canny -> border following -> area filter.
#[must_use]
pub fn extract_contours(image: &RgbImage, config: &AnalysisConfig) -> Vec<Contour> {
    let edges = edge::edge_map(image, config);
    let traced = trace(&edges);
    let traced_count = traced.len();

    let kept: Vec<Contour> = traced
        .into_iter()
        .filter(|c| c.area() > config.min_contour_area)
        .collect();

    tracing::debug!(
        traced = traced_count,
        kept = kept.len(),
        min_area = config.min_contour_area,
        "contours extracted"
    );
    kept
}

/// Trace every border in a binary edge map.
#[must_use]
pub fn trace(edges: &GrayImage) -> Vec<Contour> {
    imageproc::contours::find_contours::<i32>(edges)
        .into_iter()
        .filter(|c| c.points.len() >= 3)
        .map(|c| Contour::new(c.points))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    /// Boundary pixels of an axis-aligned `w` x `h` box at (`x0`, `y0`),
    /// clockwise from the top-left corner.
    pub(crate) fn box_contour(x0: i32, y0: i32, w: i32, h: i32) -> Contour {
        let (x1, y1) = (x0 + w - 1, y0 + h - 1);
        let mut pts = Vec::new();
        for x in x0..x1 {
            pts.push(PixelPoint::new(x, y0));
        }
        for y in y0..y1 {
            pts.push(PixelPoint::new(x1, y));
        }
        for x in (x0 + 1..=x1).rev() {
            pts.push(PixelPoint::new(x, y1));
        }
        for y in (y0 + 1..=y1).rev() {
            pts.push(PixelPoint::new(x0, y));
        }
        Contour::new(pts)
    }

    #[test]
    fn box_area_and_bounds() {
        let c = box_contour(10, 20, 41, 21);
        assert!((c.area() - 800.0).abs() < 1e-9);
        assert_eq!(
            c.bounding_box(),
            Some(BoundingBox {
                x: 10,
                y: 20,
                width: 41,
                height: 21
            })
        );
        assert!((c.perimeter() - 120.0).abs() < 1e-9);
    }

    #[test]
    fn signed_area_flips_with_direction() {
        let c = box_contour(0, 0, 11, 11);
        let reversed = Contour::new(c.points().iter().rev().copied().collect());
        assert!((c.signed_area() + reversed.signed_area()).abs() < 1e-9);
        assert!((c.area() - reversed.area()).abs() < 1e-9);
    }

    #[test]
    fn convex_box_hull_matches_area() {
        let c = box_contour(0, 0, 31, 31);
        assert!((c.hull_area() - c.area()).abs() < 1e-9);
    }

    #[test]
    fn concave_shape_has_larger_hull() {
        // An L shape.
        let pts = [(0, 0), (20, 0), (20, 5), (5, 5), (5, 20), (0, 20)]
            .into_iter()
            .map(|(x, y)| PixelPoint::new(x, y))
            .collect();
        let c = Contour::new(pts);
        assert!(c.hull_area() > c.area());
    }

    #[test]
    fn empty_contour_has_no_bounds() {
        let c = Contour::new(Vec::new());
        assert!(c.is_empty());
        assert_eq!(c.bounding_box(), None);
        assert!(c.perimeter().abs() < f64::EPSILON);
    }

    #[test]
    fn blank_edge_map_produces_no_contours() {
        let edges = GrayImage::new(10, 10);
        assert!(trace(&edges).is_empty());
    }

    #[test]
    fn drawn_square_yields_large_contour() {
        let img = RgbImage::from_fn(80, 80, |x, y| {
            if (20..60).contains(&x) && (20..60).contains(&y) {
                image::Rgb([0, 0, 200])
            } else {
                image::Rgb([255, 255, 255])
            }
        });
        let contours = extract_contours(&img, &AnalysisConfig::default());
        assert!(!contours.is_empty(), "expected the square's outline");
        for c in &contours {
            assert!(c.area() > 100.0);
        }
    }

    #[test]
    fn uniform_image_yields_no_contours() {
        let img = RgbImage::from_fn(40, 40, |_, _| image::Rgb([90, 200, 30]));
        assert!(extract_contours(&img, &AnalysisConfig::default()).is_empty());
    }
}
