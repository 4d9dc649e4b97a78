//! Annotation shapes drawn on top of a captured image.

mod arrow;
mod blur;
mod circle;
mod freehand;
mod line;
mod rectangle;
mod tapered_arrow;
mod text;

pub use arrow::{Arrow, CURVE_THRESHOLD};
pub use blur::{Blur, DEFAULT_BLUR_RADIUS};
pub use circle::Circle;
pub use freehand::Freehand;
pub use line::Line;
pub use rectangle::Rectangle;
pub use tapered_arrow::TaperedArrow;
pub use text::Text;

use kurbo::{BezPath, Point, Rect, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for shapes.
pub type ShapeId = Uuid;

/// Extra margin around stroked paths (lines, arrows, ink) when hit-testing.
pub const PATH_HIT_TOLERANCE: f64 = 12.0;
/// Outward inset around box-like shapes (rectangles, circles, blur, text).
pub const BOUNDS_HIT_TOLERANCE: f64 = 8.0;
/// Drags shorter than this are treated as clicks and never produce a shape.
pub const MIN_DRAG_DISTANCE: f64 = 1.0;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub fn red() -> Self {
        Self::new(255, 59, 48, 255)
    }

    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Same color with a different alpha.
    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Style properties for shapes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    /// Stroke color.
    pub stroke_color: SerializableColor,
    /// Stroke width.
    pub stroke_width: f64,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            stroke_color: SerializableColor::red(),
            stroke_width: 4.0,
        }
    }
}

impl ShapeStyle {
    pub fn new(stroke_color: SerializableColor, stroke_width: f64) -> Self {
        Self {
            stroke_color,
            stroke_width,
        }
    }

    /// Get stroke color as peniko Color.
    pub fn stroke(&self) -> Color {
        self.stroke_color.into()
    }
}

/// Coordinate origin a shape's stored points are relative to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Anchor {
    /// Relative to the padded canvas box.
    #[default]
    Box,
    /// Relative to the embedded image's top-left corner.
    Image,
}

/// Where a shape lives relative to the canvas chrome.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Placement {
    pub anchor: Anchor,
    /// Padding in effect when the shape was created.
    pub padding_context: f64,
}

impl Placement {
    pub fn boxed(padding_context: f64) -> Self {
        Self {
            anchor: Anchor::Box,
            padding_context,
        }
    }

    pub fn image() -> Self {
        Self {
            anchor: Anchor::Image,
            padding_context: 0.0,
        }
    }

    /// Offset from stored coordinates to canvas coordinates for the given padding.
    pub fn canvas_offset(&self, padding: f64) -> Vec2 {
        match self.anchor {
            Anchor::Image => Vec2::new(padding, padding),
            Anchor::Box => {
                let d = padding - self.padding_context;
                Vec2::new(d, d)
            }
        }
    }
}

/// Common trait for all shapes.
pub trait ShapeTrait {
    /// Get the unique identifier.
    fn id(&self) -> ShapeId;

    /// Get the axis-aligned bounding box.
    fn bounds(&self) -> Rect;

    /// Check if a point hits this shape within the given tolerance.
    fn hit_test(&self, point: Point, tolerance: f64) -> bool;

    /// Outline of the shape as a bezier path.
    fn to_path(&self) -> BezPath;

    fn style(&self) -> &ShapeStyle;

    fn style_mut(&mut self) -> &mut ShapeStyle;

    fn placement(&self) -> &Placement;

    /// Shift every point by `delta`.
    fn translate(&mut self, delta: Vec2);
}

/// Shapes that are defined by a start/end pair and can be reshaped by moving either.
pub trait Resizable: Sized {
    fn start(&self) -> Point;

    fn end(&self) -> Point;

    /// Copy of this shape spanning `start` to `end`.
    fn resize(&self, start: Point, end: Point) -> Self;
}

/// Annotation variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Shape {
    Freehand(Freehand),
    Line(Line),
    Rectangle(Rectangle),
    Circle(Circle),
    Arrow(Arrow),
    TaperedArrow(TaperedArrow),
    Text(Text),
    Blur(Blur),
}

macro_rules! dispatch {
    ($shape:expr, $s:ident => $body:expr) => {
        match $shape {
            Shape::Freehand($s) => $body,
            Shape::Line($s) => $body,
            Shape::Rectangle($s) => $body,
            Shape::Circle($s) => $body,
            Shape::Arrow($s) => $body,
            Shape::TaperedArrow($s) => $body,
            Shape::Text($s) => $body,
            Shape::Blur($s) => $body,
        }
    };
}

impl Shape {
    pub fn id(&self) -> ShapeId {
        dispatch!(self, s => s.id())
    }

    pub fn bounds(&self) -> Rect {
        dispatch!(self, s => s.bounds())
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        dispatch!(self, s => s.hit_test(point, tolerance))
    }

    pub fn to_path(&self) -> BezPath {
        dispatch!(self, s => s.to_path())
    }

    pub fn style(&self) -> &ShapeStyle {
        dispatch!(self, s => s.style())
    }

    pub fn style_mut(&mut self) -> &mut ShapeStyle {
        dispatch!(self, s => s.style_mut())
    }

    pub fn placement(&self) -> &Placement {
        dispatch!(self, s => s.placement())
    }

    /// Hit tolerance appropriate for this kind of shape.
    pub fn hit_tolerance(&self) -> f64 {
        match self {
            Shape::Freehand(_) | Shape::Line(_) | Shape::Arrow(_) | Shape::TaperedArrow(_) => {
                PATH_HIT_TOLERANCE + self.style().stroke_width / 2.0
            }
            Shape::Rectangle(_) | Shape::Circle(_) | Shape::Text(_) | Shape::Blur(_) => {
                BOUNDS_HIT_TOLERANCE
            }
        }
    }

    /// Whether `point` (in the shape's stored coordinates) hits this shape.
    pub fn contains(&self, point: Point) -> bool {
        self.hit_test(point, self.hit_tolerance())
    }

    /// Copy of this shape moved by `delta`. The id is preserved.
    pub fn translated(&self, delta: Vec2) -> Shape {
        let mut moved = self.clone();
        dispatch!(&mut moved, s => s.translate(delta));
        moved
    }

    /// Copy of this shape with a new style.
    pub fn with_style(&self, style: ShapeStyle) -> Shape {
        let mut styled = self.clone();
        *styled.style_mut() = style;
        styled
    }

    /// Offset from stored coordinates to canvas coordinates.
    pub fn canvas_offset(&self, padding: f64) -> Vec2 {
        self.placement().canvas_offset(padding)
    }

    /// Start/end pair for resizable variants.
    pub fn endpoints(&self) -> Option<(Point, Point)> {
        match self {
            Shape::Line(s) => Some((s.start(), s.end())),
            Shape::Rectangle(s) => Some((s.start(), s.end())),
            Shape::Circle(s) => Some((s.start(), s.end())),
            Shape::Arrow(s) => Some((s.start(), s.end())),
            Shape::TaperedArrow(s) => Some((s.start(), s.end())),
            Shape::Blur(s) => Some((s.start(), s.end())),
            Shape::Freehand(_) | Shape::Text(_) => None,
        }
    }

    /// Resize a resizable variant. `None` for freehand and text.
    pub fn resized(&self, start: Point, end: Point) -> Option<Shape> {
        match self {
            Shape::Line(s) => Some(Shape::Line(s.resize(start, end))),
            Shape::Rectangle(s) => Some(Shape::Rectangle(s.resize(start, end))),
            Shape::Circle(s) => Some(Shape::Circle(s.resize(start, end))),
            Shape::Arrow(s) => Some(Shape::Arrow(s.resize(start, end))),
            Shape::TaperedArrow(s) => Some(Shape::TaperedArrow(s.resize(start, end))),
            Shape::Blur(s) => Some(Shape::Blur(s.resize(start, end))),
            Shape::Freehand(_) | Shape::Text(_) => None,
        }
    }

    /// True for gestures that should be discarded instead of committed.
    pub fn is_degenerate(&self) -> bool {
        match self {
            Shape::Freehand(f) => f.points.len() < 2,
            Shape::Text(t) => t.content.is_empty(),
            _ => match self.endpoints() {
                Some((start, end)) => start.distance(end) < MIN_DRAG_DISTANCE,
                None => false,
            },
        }
    }

    /// Human-readable variant name, used for undo labels.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Shape::Freehand(f) if f.highlight => "Highlight",
            Shape::Freehand(_) => "Freehand",
            Shape::Line(_) => "Line",
            Shape::Rectangle(_) => "Rectangle",
            Shape::Circle(_) => "Circle",
            Shape::Arrow(_) => "Arrow",
            Shape::TaperedArrow(_) => "Tapered Arrow",
            Shape::Text(_) => "Text",
            Shape::Blur(_) => "Blur",
        }
    }

    pub fn is_blur(&self) -> bool {
        matches!(self, Shape::Blur(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_conversion() {
        let c = SerializableColor::new(10, 20, 30, 40);
        let peniko: Color = c.into();
        assert_eq!(SerializableColor::from(peniko), c);
    }

    #[test]
    fn test_translate_preserves_id() {
        let rect = Shape::Rectangle(Rectangle::new(Point::new(0.0, 0.0), Point::new(10.0, 10.0)));
        let moved = rect.translated(Vec2::new(5.0, -5.0));
        assert_eq!(moved.id(), rect.id());
        assert_eq!(moved.bounds(), Rect::new(5.0, -5.0, 15.0, 5.0));
        // Original untouched.
        assert_eq!(rect.bounds(), Rect::new(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn test_resize_round_trip_all_resizable() {
        let a = Point::new(10.0, 20.0);
        let b = Point::new(110.0, 70.0);
        let shapes = vec![
            Shape::Line(Line::new(a, b)),
            Shape::Rectangle(Rectangle::new(a, b)),
            Shape::Circle(Circle::new(a, b)),
            Shape::Arrow(Arrow::new(a, b).with_control(Point::new(40.0, 90.0))),
            Shape::TaperedArrow(TaperedArrow::new(a, b)),
            Shape::Blur(Blur::new(a, b)),
        ];
        for shape in shapes {
            let (start, end) = shape.endpoints().unwrap();
            let changed = shape
                .resized(Point::new(-30.0, 5.0), Point::new(200.0, 300.0))
                .unwrap();
            assert_ne!(changed, shape);
            let back = changed.resized(start, end).unwrap();
            let (s2, e2) = back.endpoints().unwrap();
            assert!(s2.distance(start) < 1e-9);
            assert!(e2.distance(end) < 1e-9);
            if let (Shape::Arrow(orig), Shape::Arrow(round)) = (&shape, &back) {
                assert!(orig.control.distance(round.control) < 1e-9);
            }
        }
    }

    #[test]
    fn test_freehand_and_text_not_resizable() {
        let free = Shape::Freehand(Freehand::from_points(vec![Point::ZERO, Point::new(5.0, 5.0)]));
        let text = Shape::Text(Text::new(Point::ZERO, "hi".to_string()));
        assert!(free.endpoints().is_none());
        assert!(text.resized(Point::ZERO, Point::ZERO).is_none());
    }

    #[test]
    fn test_degenerate_shapes() {
        assert!(Shape::Freehand(Freehand::from_points(vec![Point::ZERO])).is_degenerate());
        assert!(Shape::Line(Line::new(Point::ZERO, Point::new(0.5, 0.0))).is_degenerate());
        assert!(!Shape::Line(Line::new(Point::ZERO, Point::new(2.0, 0.0))).is_degenerate());
    }

    #[test]
    fn test_canvas_offset() {
        assert_eq!(Placement::image().canvas_offset(30.0), Vec2::new(30.0, 30.0));
        assert_eq!(Placement::boxed(30.0).canvas_offset(30.0), Vec2::ZERO);
        assert_eq!(Placement::boxed(30.0).canvas_offset(50.0), Vec2::new(20.0, 20.0));
    }

    #[test]
    fn test_tolerance_depends_on_kind() {
        let mut line = Line::new(Point::ZERO, Point::new(100.0, 0.0));
        line.style.stroke_width = 6.0;
        let line = Shape::Line(line);
        assert!((line.hit_tolerance() - 15.0).abs() < f64::EPSILON);
        assert!(line.contains(Point::new(50.0, 14.0)));
        assert!(!line.contains(Point::new(50.0, 16.0)));

        let rect = Shape::Rectangle(Rectangle::new(Point::ZERO, Point::new(10.0, 10.0)));
        assert!((rect.hit_tolerance() - BOUNDS_HIT_TOLERANCE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_serde_round_trip_keeps_variant() {
        let arrow = Shape::Arrow(Arrow::new(Point::ZERO, Point::new(20.0, 0.0)));
        let json = serde_json::to_string(&arrow).unwrap();
        assert!(json.contains("\"type\":\"Arrow\""));
        let back: Shape = serde_json::from_str(&json).unwrap();
        assert_eq!(back, arrow);
    }
}
