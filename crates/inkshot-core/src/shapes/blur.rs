//! Blur region: obscures the pixels under a rectangle.

use super::{Placement, Resizable, ShapeId, ShapeStyle, ShapeTrait};
use kurbo::{BezPath, Point, Rect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default Gaussian sigma for new blur regions.
pub const DEFAULT_BLUR_RADIUS: f64 = 12.0;

/// A rectangular region whose underlying pixels are blurred on render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blur {
    pub(crate) id: ShapeId,
    pub start: Point,
    pub end: Point,
    /// Blur sigma in pixels.
    #[serde(default = "default_radius")]
    pub radius: f64,
    /// Style properties. Only used for the selection outline.
    pub style: ShapeStyle,
    #[serde(default)]
    pub placement: Placement,
}

fn default_radius() -> f64 {
    DEFAULT_BLUR_RADIUS
}

impl Blur {
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            start,
            end,
            radius: DEFAULT_BLUR_RADIUS,
            style: ShapeStyle::default(),
            placement: Placement::default(),
        }
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius.max(0.0);
        self
    }

    pub fn as_rect(&self) -> Rect {
        Rect::from_points(self.start, self.end)
    }
}

impl Resizable for Blur {
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

impl ShapeTrait for Blur {
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
