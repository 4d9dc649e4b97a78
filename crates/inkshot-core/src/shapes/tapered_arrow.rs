//! Tapered arrow: a filled wedge that widens from tail to head.

use super::{Placement, Resizable, ShapeId, ShapeStyle, ShapeTrait};
use crate::geometry::distance_point_to_segment;
use kurbo::{BezPath, Point, Rect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A filled arrow whose shaft tapers to a point at the tail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaperedArrow {
    pub(crate) id: ShapeId,
    /// Tail (the narrow end).
    pub start: Point,
    /// Tip of the arrowhead.
    pub end: Point,
    /// Style properties. The stroke width controls the shaft thickness.
    pub style: ShapeStyle,
    #[serde(default)]
    pub placement: Placement,
}

impl TaperedArrow {
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            start,
            end,
            style: ShapeStyle::default(),
            placement: Placement::default(),
        }
    }

    /// Length of the arrowhead, clamped so short arrows stay mostly head.
    pub fn head_length(&self) -> f64 {
        let len = self.start.distance(self.end);
        (self.style.stroke_width * 5.0).max(18.0).min(len * 0.6)
    }

    /// Outline vertices, tail first, in drawing order.
    pub fn outline(&self) -> Vec<Point> {
        let dir = self.end - self.start;
        let len = dir.hypot();
        if len < f64::EPSILON {
            return vec![self.start];
        }
        let dir = dir / len;
        let perp = Vec2::new(-dir.y, dir.x);
        let head = self.head_length();
        let shaft_half = (self.style.stroke_width * 1.5).max(3.0) / 2.0;
        let head_half = head * 0.6;
        let back = self.end - dir * head;
        vec![
            self.start,
            back + perp * shaft_half,
            back + perp * head_half,
            self.end,
            back - perp * head_half,
            back - perp * shaft_half,
        ]
    }
}

impl Resizable for TaperedArrow {
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

impl ShapeTrait for TaperedArrow {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        if self.start.distance(self.end) < f64::EPSILON {
            return Rect::from_points(self.start, self.end);
        }
        self.to_path().bounding_box()
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        if distance_point_to_segment(point, self.start, self.end) <= tolerance {
            return true;
        }
        self.to_path().contains(point)
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let outline = self.outline();
        let Some((first, rest)) = outline.split_first() else {
            return path;
        };
        path.move_to(*first);
        for p in rest {
            path.line_to(*p);
        }
        path.close_path();
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
        self.start += delta;
        self.end += delta;
    }
}
