//! Geometry helpers shared by hit-testing, handles and rendering.

use kurbo::{Point, Rect, Vec2};

/// Number of samples used to approximate the distance to a quadratic curve.
pub const BEZIER_SAMPLES: usize = 21;

/// Distance from a point to a line segment (a→b).
///
/// A degenerate segment (`a == b`) yields the distance to `a`.
pub fn distance_point_to_segment(point: Point, a: Point, b: Point) -> f64 {
    let proj = closest_point_on_segment(point, a, b);
    ((point.x - proj.x).powi(2) + (point.y - proj.y).powi(2)).sqrt()
}

/// Closest point on the segment a→b to `point`.
pub fn closest_point_on_segment(point: Point, a: Point, b: Point) -> Point {
    let seg = Vec2::new(b.x - a.x, b.y - a.y);
    let pv = Vec2::new(point.x - a.x, point.y - a.y);
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return a;
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    Point::new(a.x + t * seg.x, a.y + t * seg.y)
}

/// Evaluate a quadratic Bézier curve at `t` (clamped to 0..=1).
pub fn evaluate_quadratic_bezier(start: Point, end: Point, control: Point, t: f64) -> Point {
    let t = t.clamp(0.0, 1.0);
    let mt = 1.0 - t;
    Point::new(
        mt * mt * start.x + 2.0 * mt * t * control.x + t * t * end.x,
        mt * mt * start.y + 2.0 * mt * t * control.y + t * t * end.y,
    )
}

/// Approximate distance from a point to a quadratic Bézier curve.
///
/// Samples the curve at [`BEZIER_SAMPLES`] evenly spaced parameters and
/// returns the smallest distance to a sample.
pub fn distance_point_to_quadratic_bezier(
    point: Point,
    start: Point,
    end: Point,
    control: Point,
) -> f64 {
    (0..BEZIER_SAMPLES)
        .map(|i| {
            let t = i as f64 / (BEZIER_SAMPLES - 1) as f64;
            evaluate_quadratic_bezier(start, end, control, t).distance(point)
        })
        .fold(f64::INFINITY, f64::min)
}

/// Minimum distance from a point to a polyline (sequence of connected segments).
pub fn distance_point_to_polyline(point: Point, points: &[Point]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => only.distance(point),
        _ => points
            .windows(2)
            .map(|w| distance_point_to_segment(point, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Axis-aligned bounds of a point set (`Rect::ZERO` when empty).
pub fn bounds_of_points(points: &[Point]) -> Rect {
    let Some(first) = points.first() else {
        return Rect::ZERO;
    };
    points
        .iter()
        .skip(1)
        .fold(Rect::from_points(*first, *first), |acc, p| {
            acc.union_pt(*p)
        })
}

/// Midpoint of a segment.
pub fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_distance_on_segment_is_zero() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(100.0, 50.0);
        for t in [0.0, 0.25, 0.5, 0.9, 1.0] {
            let p = a.lerp(b, t);
            assert!(distance_point_to_segment(p, a, b) < EPS);
        }
    }

    #[test]
    fn test_distance_beyond_segment_uses_endpoint() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        let beyond = Point::new(13.0, 4.0);
        assert!((distance_point_to_segment(beyond, a, b) - 5.0).abs() < EPS);
        let before = Point::new(-6.0, 8.0);
        assert!((distance_point_to_segment(before, a, b) - 10.0).abs() < EPS);
    }

    #[test]
    fn test_distance_perpendicular() {
        let d = distance_point_to_segment(
            Point::new(50.0, 30.0),
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
        );
        assert!((d - 30.0).abs() < EPS);
    }

    #[test]
    fn test_degenerate_segment() {
        let a = Point::new(3.0, 4.0);
        assert!((distance_point_to_segment(Point::ZERO, a, a) - 5.0).abs() < EPS);
        assert_eq!(closest_point_on_segment(Point::ZERO, a, a), a);
    }

    #[test]
    fn test_closest_point_is_projection() {
        let p = closest_point_on_segment(
            Point::new(40.0, -20.0),
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
        );
        assert!((p.x - 40.0).abs() < EPS);
        assert!(p.y.abs() < EPS);
    }

    #[test]
    fn test_quadratic_endpoints_and_midpoint() {
        let start = Point::new(0.0, 0.0);
        let end = Point::new(100.0, 0.0);
        let control = Point::new(50.0, 100.0);
        assert_eq!(evaluate_quadratic_bezier(start, end, control, 0.0), start);
        assert_eq!(evaluate_quadratic_bezier(start, end, control, 1.0), end);
        let mid = evaluate_quadratic_bezier(start, end, control, 0.5);
        assert!((mid.x - 50.0).abs() < EPS);
        assert!((mid.y - 50.0).abs() < EPS);
    }

    #[test]
    fn test_distance_to_curve() {
        let start = Point::new(0.0, 0.0);
        let end = Point::new(100.0, 0.0);
        let control = Point::new(50.0, 100.0);
        // Apex of the curve sits at (50, 50).
        let d = distance_point_to_quadratic_bezier(Point::new(50.0, 60.0), start, end, control);
        assert!((d - 10.0).abs() < 1e-6);
        assert!(distance_point_to_quadratic_bezier(start, start, end, control) < EPS);
    }

    #[test]
    fn test_bounds_of_points() {
        let r = bounds_of_points(&[
            Point::new(5.0, 10.0),
            Point::new(-5.0, 20.0),
            Point::new(15.0, 0.0),
        ]);
        assert_eq!(r, Rect::new(-5.0, 0.0, 15.0, 20.0));
        assert_eq!(bounds_of_points(&[]), Rect::ZERO);
    }

    #[test]
    fn test_polyline_distance() {
        let pts = [Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0)];
        assert!((distance_point_to_polyline(Point::new(12.0, 5.0), &pts) - 2.0).abs() < EPS);
        assert!(distance_point_to_polyline(Point::ZERO, &[]).is_infinite());
    }
}
