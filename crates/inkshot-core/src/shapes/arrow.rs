//! Arrow shape with an optional quadratic bend.

use super::{Placement, Resizable, ShapeId, ShapeStyle, ShapeTrait};
use crate::geometry::{
    distance_point_to_quadratic_bezier, distance_point_to_segment, evaluate_quadratic_bezier,
    midpoint,
};
use kurbo::{BezPath, Point, Rect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Control points closer than this to the straight segment leave the arrow straight.
pub const CURVE_THRESHOLD: f64 = 5.0;

/// Minimum arrowhead length.
const MIN_HEAD_SIZE: f64 = 15.0;

/// An arrow from `start` to `end`, bent through a quadratic control point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arrow {
    pub(crate) id: ShapeId,
    /// Tail of the arrow.
    pub start: Point,
    /// End point (where the arrowhead points).
    pub end: Point,
    /// Quadratic control point. Sits on the segment midpoint until bent.
    pub control: Point,
    /// Where along the baseline (0..=1) the control point was last anchored.
    #[serde(default = "default_curve_parameter")]
    pub curve_parameter: f64,
    /// Style properties.
    pub style: ShapeStyle,
    #[serde(default)]
    pub placement: Placement,
}

fn default_curve_parameter() -> f64 {
    0.5
}

impl Arrow {
    /// Create a new straight arrow.
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            start,
            end,
            control: midpoint(start, end),
            curve_parameter: default_curve_parameter(),
            style: ShapeStyle::default(),
            placement: Placement::default(),
        }
    }

    /// Copy with the control point moved to `control`.
    pub fn with_control(&self, control: Point) -> Self {
        let (along, _) = decompose(self.start, self.end, control);
        Self {
            control,
            curve_parameter: along.clamp(0.0, 1.0),
            ..self.clone()
        }
    }

    /// Perpendicular distance of the control point from the straight segment.
    pub fn curve_offset(&self) -> f64 {
        distance_point_to_segment(self.control, self.start, self.end)
    }

    /// Whether the arrow renders and hit-tests as a curve.
    pub fn is_curved(&self) -> bool {
        self.curve_offset() > CURVE_THRESHOLD
    }

    /// Position of the curve handle: the midpoint of the rendered path.
    pub fn curve_handle(&self) -> Point {
        if self.is_curved() {
            evaluate_quadratic_bezier(self.start, self.end, self.control, 0.5)
        } else {
            midpoint(self.start, self.end)
        }
    }

    /// Arrowhead length for the current stroke width.
    pub fn head_size(&self) -> f64 {
        (self.style.stroke_width * 3.0).max(MIN_HEAD_SIZE)
    }

    /// The two outer points of the arrowhead.
    pub fn head_points(&self) -> Option<(Point, Point)> {
        let from = if self.is_curved() { self.control } else { self.start };
        let dir = self.end - from;
        let len = dir.hypot();
        if len < f64::EPSILON {
            return None;
        }
        let dir = dir / len;
        let perp = Vec2::new(-dir.y, dir.x);
        let size = self.head_size();
        let back = self.end - dir * size;
        Some((back + perp * size * 0.5, back - perp * size * 0.5))
    }

    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }
}

/// Express `point` relative to the segment a→b as (fraction along, perpendicular
/// offset as a fraction of the segment length).
fn decompose(a: Point, b: Point, point: Point) -> (f64, f64) {
    let seg = b - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return (0.5, 0.0);
    }
    let rel = point - a;
    let perp = Vec2::new(-seg.y, seg.x);
    (rel.dot(seg) / len_sq, rel.dot(perp) / len_sq)
}

fn compose(a: Point, b: Point, along: f64, across: f64) -> Point {
    let seg = b - a;
    let perp = Vec2::new(-seg.y, seg.x);
    a + seg * along + perp * across
}

impl Resizable for Arrow {
    fn start(&self) -> Point {
        self.start
    }

    fn end(&self) -> Point {
        self.end
    }

    /// Moves the endpoints and carries the control point along, keeping its
    /// position relative to the baseline.
    fn resize(&self, start: Point, end: Point) -> Self {
        let (along, across) = decompose(self.start, self.end, self.control);
        Self {
            start,
            end,
            control: compose(start, end, along, across),
            ..self.clone()
        }
    }
}

impl ShapeTrait for Arrow {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        self.to_path().bounding_box()
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let body = if self.is_curved() {
            distance_point_to_quadratic_bezier(point, self.start, self.end, self.control)
        } else {
            distance_point_to_segment(point, self.start, self.end)
        };
        if body <= tolerance {
            return true;
        }
        match self.head_points() {
            Some((left, right)) => {
                distance_point_to_segment(point, self.end, left) <= tolerance
                    || distance_point_to_segment(point, self.end, right) <= tolerance
            }
            None => false,
        }
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        path.move_to(self.start);
        if self.is_curved() {
            path.quad_to(self.control, self.end);
        } else {
            path.line_to(self.end);
        }
        if let Some((left, right)) = self.head_points() {
            path.move_to(left);
            path.line_to(self.end);
            path.line_to(right);
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
        self.start += delta;
        self.end += delta;
        self.control += delta;
    }
}
