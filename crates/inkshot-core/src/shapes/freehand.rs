//! Freehand ink and highlighter strokes.

use super::{Placement, ShapeId, ShapeStyle, ShapeTrait};
use crate::geometry::{bounds_of_points, distance_point_to_polyline, distance_point_to_segment};
use kurbo::{BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A freehand drawing (series of points).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Freehand {
    pub(crate) id: ShapeId,
    /// Points in the freehand path.
    pub points: Vec<Point>,
    /// Drawn as translucent highlighter ink.
    #[serde(default)]
    pub highlight: bool,
    /// Style properties.
    pub style: ShapeStyle,
    #[serde(default)]
    pub placement: Placement,
}

impl Freehand {
    /// Create a new empty freehand shape.
    pub fn new() -> Self {
        Self::from_points(Vec::new())
    }

    /// Create from existing points.
    pub fn from_points(points: Vec<Point>) -> Self {
        Self {
            id: Uuid::new_v4(),
            points,
            highlight: false,
            style: ShapeStyle::default(),
            placement: Placement::default(),
        }
    }

    /// Create a highlighter stroke from existing points.
    pub fn highlighter(points: Vec<Point>) -> Self {
        Self {
            highlight: true,
            ..Self::from_points(points)
        }
    }

    /// Add a point to the path. Repeated samples at the same position are dropped.
    pub fn add_point(&mut self, point: Point) {
        if self.points.last() == Some(&point) {
            return;
        }
        self.points.push(point);
    }

    /// Get the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the path is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Drop points that deviate from the stroke by at most `tolerance`.
    pub fn simplify(&mut self, tolerance: f64) {
        self.points = rdp_simplify(&self.points, tolerance);
    }

    /// Copy with every point mapped from `from` onto `to`.
    ///
    /// Zero-sized source axes keep their coordinate and only translate.
    pub fn mapped_between(&self, from: Rect, to: Rect) -> Self {
        let sx = if from.width() > f64::EPSILON {
            to.width() / from.width()
        } else {
            1.0
        };
        let sy = if from.height() > f64::EPSILON {
            to.height() / from.height()
        } else {
            1.0
        };
        let points = self
            .points
            .iter()
            .map(|p| Point::new(to.x0 + (p.x - from.x0) * sx, to.y0 + (p.y - from.y0) * sy))
            .collect();
        Self {
            points,
            ..self.clone()
        }
    }
}

impl Default for Freehand {
    fn default() -> Self {
        Self::new()
    }
}

/// Ramer-Douglas-Peucker reduction, iterative over an explicit span stack.
fn rdp_simplify(points: &[Point], tolerance: f64) -> Vec<Point> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }
    let mut keep = vec![false; n];
    keep[0] = true;
    keep[n - 1] = true;
    let mut spans = vec![(0, n - 1)];
    while let Some((lo, hi)) = spans.pop() {
        let farthest = (lo + 1..hi)
            .map(|i| (i, distance_point_to_segment(points[i], points[lo], points[hi])))
            .max_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((i, dist)) = farthest {
            if dist > tolerance {
                keep[i] = true;
                spans.push((lo, i));
                spans.push((i, hi));
            }
        }
    }
    points
        .iter()
        .zip(keep)
        .filter_map(|(p, kept)| kept.then_some(*p))
        .collect()
}

impl ShapeTrait for Freehand {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        bounds_of_points(&self.points)
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        distance_point_to_polyline(point, &self.points) <= tolerance
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let Some((first, rest)) = self.points.split_first() else {
            return path;
        };
        path.move_to(*first);
        for point in rest {
            path.line_to(*point);
        }
        path
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn placement(&self) -> &Placement {
        &self.placement
    }

    fn translate(&mut self, delta: Vec2) {
        for point in &mut self.points {
            *point += delta;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_points_skips_duplicates() {
        let mut freehand = Freehand::new();
        freehand.add_point(Point::new(0.0, 0.0));
        freehand.add_point(Point::new(0.0, 0.0));
        freehand.add_point(Point::new(10.0, 10.0));
        assert_eq!(freehand.len(), 2);
    }

    #[test]
    fn test_bounds() {
        let freehand = Freehand::from_points(vec![
            Point::new(0.0, 0.0),
            Point::new(100.0, 50.0),
            Point::new(50.0, 100.0),
        ]);
        let bounds = freehand.bounds();
        assert!((bounds.x0).abs() < f64::EPSILON);
        assert!((bounds.y0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 100.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_simplify_keeps_corners() {
        let mut freehand = Freehand::from_points(vec![
            Point::new(0.0, 0.0),
            Point::new(5.0, 0.2),
            Point::new(10.0, 0.0),
            Point::new(10.0, 5.0),
            Point::new(10.1, 10.0),
            Point::new(10.0, 20.0),
        ]);
        freehand.simplify(0.5);
        assert_eq!(
            freehand.points,
            vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 20.0)]
        );
    }

    #[test]
    fn test_hit_test() {
        let freehand = Freehand::from_points(vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)]);
        assert!(freehand.hit_test(Point::new(50.0, 0.0), 5.0));
        assert!(!freehand.hit_test(Point::new(50.0, 20.0), 5.0));
    }

    #[test]
    fn test_mapped_between_scales_points() {
        let freehand = Freehand::highlighter(vec![Point::new(0.0, 0.0), Point::new(10.0, 20.0)]);
        let mapped = freehand.mapped_between(
            Rect::new(0.0, 0.0, 10.0, 20.0),
            Rect::new(100.0, 100.0, 120.0, 110.0),
        );
        assert_eq!(mapped.points[0], Point::new(100.0, 100.0));
        assert_eq!(mapped.points[1], Point::new(120.0, 110.0));
        assert!(mapped.highlight);
        assert_eq!(mapped.id, freehand.id);
    }

    #[test]
    fn test_mapped_between_flat_stroke() {
        let freehand = Freehand::from_points(vec![Point::new(0.0, 5.0), Point::new(10.0, 5.0)]);
        let mapped = freehand.mapped_between(
            Rect::new(0.0, 5.0, 10.0, 5.0),
            Rect::new(0.0, 8.0, 30.0, 20.0),
        );
        assert_eq!(mapped.points[1], Point::new(30.0, 8.0));
    }
}
