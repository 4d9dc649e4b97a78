//! Circle (ellipse inscribed in a drag rectangle).

use super::{Placement, Resizable, ShapeId, ShapeStyle, ShapeTrait};
use kurbo::{BezPath, Ellipse as KurboEllipse, Point, Rect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An ellipse inscribed in the rectangle spanned by `start` and `end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub(crate) id: ShapeId,
    pub start: Point,
    pub end: Point,
    /// Style properties.
    pub style: ShapeStyle,
    #[serde(default)]
    pub placement: Placement,
}

impl Circle {
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            start,
            end,
            style: ShapeStyle::default(),
            placement: Placement::default(),
        }
    }

    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    /// Horizontal and vertical radii.
    pub fn radii(&self) -> (f64, f64) {
        let r = self.bounds();
        (r.width() / 2.0, r.height() / 2.0)
    }

    pub fn as_kurbo(&self) -> KurboEllipse {
        KurboEllipse::from_rect(self.bounds())
    }
}

impl Resizable for Circle {
    fn start(&self) -> Point {
        self.start
    }

    fn end(&self) -> Point {
        self.end
    }

    fn resize(&self, start: Point, end: Point) -> Self {
        Self {
            start,
            end,
            ..self.clone()
        }
    }
}

impl ShapeTrait for Circle {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        Rect::from_points(self.start, self.end)
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let center = self.center();
        let (rx, ry) = self.radii();
        let rx = rx + tolerance;
        let ry = ry + tolerance;
        if rx < f64::EPSILON || ry < f64::EPSILON {
            return false;
        }
        let dx = (point.x - center.x) / rx;
        let dy = (point.y - center.y) / ry;
        dx * dx + dy * dy <= 1.0
    }

    fn to_path(&self) -> BezPath {
        self.as_kurbo().to_path(0.1)
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
        self.start += delta;
        self.end += delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_and_radii() {
        let circle = Circle::new(Point::new(0.0, 0.0), Point::new(100.0, 50.0));
        let c = circle.center();
        assert!((c.x - 50.0).abs() < f64::EPSILON);
        assert!((c.y - 25.0).abs() < f64::EPSILON);
        let (rx, ry) = circle.radii();
        assert!((rx - 50.0).abs() < f64::EPSILON);
        assert!((ry - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_test() {
        let circle = Circle::new(Point::new(0.0, 0.0), Point::new(100.0, 100.0));
        assert!(circle.hit_test(Point::new(50.0, 50.0), 0.0));
        assert!(circle.hit_test(Point::new(104.0, 50.0), 8.0));
        // Corner of the bounding box lies outside the ellipse.
        assert!(!circle.hit_test(Point::new(2.0, 2.0), 8.0));
        assert!(!circle.hit_test(Point::new(200.0, 50.0), 8.0));
    }
}
