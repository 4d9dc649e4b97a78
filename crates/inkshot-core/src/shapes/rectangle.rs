//! Rectangle shape.

use super::{Placement, Resizable, ShapeId, ShapeStyle, ShapeTrait};
use kurbo::{BezPath, Point, Rect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An outlined rectangle spanned by two drag points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub(crate) id: ShapeId,
    /// Point where the drag started.
    pub start: Point,
    /// Point where the drag ended. Need not be the bottom-right corner.
    pub end: Point,
    /// Style properties.
    pub style: ShapeStyle,
    #[serde(default)]
    pub placement: Placement,
}

impl Rectangle {
    /// Create a new rectangle spanning two points.
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            start,
            end,
            style: ShapeStyle::default(),
            placement: Placement::default(),
        }
    }

    /// Normalized rectangle (x0 <= x1, y0 <= y1).
    pub fn as_rect(&self) -> Rect {
        Rect::from_points(self.start, self.end)
    }

    pub fn width(&self) -> f64 {
        (self.end.x - self.start.x).abs()
    }

    pub fn height(&self) -> f64 {
        (self.end.y - self.start.y).abs()
    }
}

impl Resizable for Rectangle {
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

impl ShapeTrait for Rectangle {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        self.as_rect()
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.as_rect().inflate(tolerance, tolerance).contains(point)
    }

    fn to_path(&self) -> BezPath {
        self.as_rect().to_path(0.1)
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
