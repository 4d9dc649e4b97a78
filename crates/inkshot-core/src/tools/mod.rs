//! Drawing tools and the in-progress gesture they build.

use crate::shapes::{
    Arrow, Blur, Circle, DEFAULT_BLUR_RADIUS, Freehand, Line, Placement, Rectangle,
    Shape, ShapeStyle, TaperedArrow, Text,
};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Minimum stroke width for highlighter ink.
pub const HIGHLIGHTER_MIN_WIDTH: f64 = 12.0;
/// Alpha applied to highlighter ink.
pub const HIGHLIGHTER_ALPHA: u8 = 128;
/// Finished ink is reduced to points deviating more than this.
pub const FREEHAND_SIMPLIFY_TOLERANCE: f64 = 0.5;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    #[default]
    Select,
    Freehand,
    Highlight,
    Line,
    Arrow,
    TaperedArrow,
    Rectangle,
    Circle,
    Text,
    Blur,
}

impl ToolKind {
    /// Tools that draw a shape with a press-drag-release gesture.
    pub fn is_drawing_tool(self) -> bool {
        !matches!(self, ToolKind::Select | ToolKind::Text)
    }

    fn collects_points(self) -> bool {
        matches!(self, ToolKind::Freehand | ToolKind::Highlight)
    }
}

/// State of a tool interaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ToolState {
    /// Tool is idle, waiting for interaction.
    #[default]
    Idle,
    /// A drawing gesture is in progress.
    Active {
        /// Starting point of the interaction.
        start: Point,
        /// Current point of the interaction.
        current: Point,
    },
}

/// Manages the current tool, the style applied to new shapes and the
/// geometry of the gesture being drawn.
#[derive(Debug, Clone)]
pub struct ToolManager {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    /// Current state of the tool.
    pub state: ToolState,
    /// Current style to apply to new shapes.
    pub current_style: ShapeStyle,
    /// Font size for new text.
    pub font_size: f64,
    /// Sigma for new blur regions.
    pub blur_radius: f64,
    /// Padding in effect; recorded on every new shape.
    pub padding_context: f64,
    /// Accumulated points for freehand drawing.
    freehand_points: Vec<Point>,
}

impl Default for ToolManager {
    fn default() -> Self {
        Self {
            current_tool: ToolKind::default(),
            state: ToolState::default(),
            current_style: ShapeStyle::default(),
            font_size: Text::DEFAULT_FONT_SIZE,
            blur_radius: DEFAULT_BLUR_RADIUS,
            padding_context: 0.0,
            freehand_points: Vec::new(),
        }
    }
}

impl ToolManager {
    /// Create a new tool manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current tool. Any gesture in progress is dropped.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.current_tool = tool;
        self.cancel();
    }

    /// Begin a tool interaction.
    pub fn begin(&mut self, point: Point) {
        self.freehand_points.clear();
        if self.current_tool.collects_points() {
            self.freehand_points.push(point);
        }
        self.state = ToolState::Active {
            start: point,
            current: point,
        };
    }

    /// Update the current interaction.
    pub fn update(&mut self, point: Point) {
        if let ToolState::Active { current, .. } = &mut self.state {
            *current = point;
            if self.current_tool.collects_points() && self.freehand_points.last() != Some(&point) {
                self.freehand_points.push(point);
            }
        }
    }

    /// End the current interaction and return the finished shape.
    ///
    /// Degenerate gestures (a click without a drag, ink with a single point)
    /// yield `None`.
    pub fn end(&mut self, point: Point) -> Option<Shape> {
        let ToolState::Active { start, .. } = self.state else {
            return None;
        };
        self.update(point);
        let shape = self.create_shape(start, point).map(|shape| match shape {
            Shape::Freehand(mut freehand) => {
                freehand.simplify(FREEHAND_SIMPLIFY_TOLERANCE);
                Shape::Freehand(freehand)
            }
            other => other,
        });
        self.cancel();
        shape.filter(|s| !s.is_degenerate())
    }

    /// Cancel the current interaction.
    pub fn cancel(&mut self) {
        self.state = ToolState::Idle;
        self.freehand_points.clear();
    }

    /// Check if a tool interaction is active.
    pub fn is_active(&self) -> bool {
        matches!(self.state, ToolState::Active { .. })
    }

    /// Get the preview shape for the current interaction.
    pub fn preview_shape(&self) -> Option<Shape> {
        match self.state {
            ToolState::Active { start, current } => self.create_shape(start, current),
            ToolState::Idle => None,
        }
    }

    /// Get the accumulated freehand points.
    pub fn freehand_points(&self) -> &[Point] {
        &self.freehand_points
    }

    /// Text shape placed with a single click at `point`.
    pub fn place_text(&self, point: Point) -> Shape {
        let mut text = Text::new(point, Text::PLACEHOLDER.to_string()).with_font_size(self.font_size);
        text.style = self.current_style;
        text.placement = self.placement();
        Shape::Text(text)
    }

    fn placement(&self) -> Placement {
        Placement::boxed(self.padding_context)
    }

    /// Build a shape for the current tool from a drag.
    fn create_shape(&self, start: Point, end: Point) -> Option<Shape> {
        let style = self.current_style;
        let placement = self.placement();
        let shape = match self.current_tool {
            ToolKind::Freehand => {
                let mut freehand = Freehand::from_points(self.freehand_points.clone());
                freehand.style = style;
                freehand.placement = placement;
                Shape::Freehand(freehand)
            }
            ToolKind::Highlight => {
                let mut freehand = Freehand::highlighter(self.freehand_points.clone());
                freehand.style = highlighter_style(style);
                freehand.placement = placement;
                Shape::Freehand(freehand)
            }
            ToolKind::Line => {
                let mut line = Line::new(start, end);
                line.style = style;
                line.placement = placement;
                Shape::Line(line)
            }
            ToolKind::Arrow => {
                let mut arrow = Arrow::new(start, end);
                arrow.style = style;
                arrow.placement = placement;
                Shape::Arrow(arrow)
            }
            ToolKind::TaperedArrow => {
                let mut arrow = TaperedArrow::new(start, end);
                arrow.style = style;
                arrow.placement = placement;
                Shape::TaperedArrow(arrow)
            }
            ToolKind::Rectangle => {
                let mut rect = Rectangle::new(start, end);
                rect.style = style;
                rect.placement = placement;
                Shape::Rectangle(rect)
            }
            ToolKind::Circle => {
                let mut circle = Circle::new(start, end);
                circle.style = style;
                circle.placement = placement;
                Shape::Circle(circle)
            }
            ToolKind::Blur => {
                let mut blur = Blur::new(start, end).with_radius(self.blur_radius);
                blur.style = style;
                blur.placement = placement;
                Shape::Blur(blur)
            }
            ToolKind::Select | ToolKind::Text => return None,
        };
        Some(shape)
    }
}

/// Wider, translucent variant of a style for highlighter ink.
pub fn highlighter_style(style: ShapeStyle) -> ShapeStyle {
    ShapeStyle {
        stroke_color: style.stroke_color.with_alpha(HIGHLIGHTER_ALPHA),
        stroke_width: style.stroke_width.max(HIGHLIGHTER_MIN_WIDTH),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_selection() {
        let mut tm = ToolManager::new();
        assert_eq!(tm.current_tool, ToolKind::Select);

        tm.set_tool(ToolKind::Rectangle);
        assert_eq!(tm.current_tool, ToolKind::Rectangle);
    }

    #[test]
    fn test_drawing_tools() {
        assert!(!ToolKind::Select.is_drawing_tool());
        assert!(!ToolKind::Text.is_drawing_tool());
        assert!(ToolKind::Blur.is_drawing_tool());
        assert!(ToolKind::Highlight.is_drawing_tool());
    }

    #[test]
    fn test_tool_interaction() {
        let mut tm = ToolManager::new();
        tm.set_tool(ToolKind::Rectangle);

        assert!(!tm.is_active());

        tm.begin(Point::new(0.0, 0.0));
        assert!(tm.is_active());

        tm.update(Point::new(50.0, 50.0));
        assert!(tm.preview_shape().is_some());

        let shape = tm.end(Point::new(100.0, 100.0)).unwrap();
        assert_eq!(shape.bounds(), kurbo::Rect::new(0.0, 0.0, 100.0, 100.0));
        assert!(!tm.is_active());
    }

    #[test]
    fn test_click_without_drag_is_discarded() {
        let mut tm = ToolManager::new();
        tm.set_tool(ToolKind::Arrow);
        tm.begin(Point::new(10.0, 10.0));
        assert!(tm.end(Point::new(10.0, 10.0)).is_none());
    }

    #[test]
    fn test_single_point_ink_is_discarded() {
        let mut tm = ToolManager::new();
        tm.set_tool(ToolKind::Freehand);
        tm.begin(Point::new(10.0, 10.0));
        tm.update(Point::new(10.0, 10.0));
        assert!(tm.end(Point::new(10.0, 10.0)).is_none());
    }

    #[test]
    fn test_freehand_collects_points() {
        let mut tm = ToolManager::new();
        tm.set_tool(ToolKind::Freehand);
        tm.begin(Point::new(0.0, 0.0));
        tm.update(Point::new(5.0, 5.0));
        tm.update(Point::new(10.0, 0.0));
        let Some(Shape::Freehand(freehand)) = tm.end(Point::new(15.0, 5.0)) else {
            panic!("Expected Freehand shape");
        };
        assert_eq!(freehand.points.len(), 4);
        assert!(!freehand.highlight);
    }

    #[test]
    fn test_straight_ink_is_simplified() {
        let mut tm = ToolManager::new();
        tm.set_tool(ToolKind::Freehand);
        tm.begin(Point::new(0.0, 0.0));
        for x in 1..10 {
            tm.update(Point::new(f64::from(x) * 4.0, 0.0));
        }
        let Some(Shape::Freehand(freehand)) = tm.end(Point::new(40.0, 0.0)) else {
            panic!("Expected Freehand shape");
        };
        assert_eq!(freehand.points, vec![Point::new(0.0, 0.0), Point::new(40.0, 0.0)]);
    }

    #[test]
    fn test_highlighter_style() {
        let mut tm = ToolManager::new();
        tm.set_tool(ToolKind::Highlight);
        tm.current_style.stroke_width = 3.0;
        tm.begin(Point::new(0.0, 0.0));
        let Some(Shape::Freehand(freehand)) = tm.end(Point::new(40.0, 0.0)) else {
            panic!("Expected Freehand shape");
        };
        assert!(freehand.highlight);
        assert_eq!(freehand.style.stroke_color.a, HIGHLIGHTER_ALPHA);
        assert!((freehand.style.stroke_width - HIGHLIGHTER_MIN_WIDTH).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cancel_interaction() {
        let mut tm = ToolManager::new();
        tm.set_tool(ToolKind::Rectangle);

        tm.begin(Point::new(0.0, 0.0));
        assert!(tm.is_active());

        tm.cancel();
        assert!(!tm.is_active());
        assert!(tm.preview_shape().is_none());
    }

    #[test]
    fn test_select_tool_no_shape() {
        let mut tm = ToolManager::new();
        tm.set_tool(ToolKind::Select);

        tm.begin(Point::new(0.0, 0.0));
        let shape = tm.end(Point::new(100.0, 100.0));
        assert!(shape.is_none());
    }

    #[test]
    fn test_new_shapes_record_padding() {
        let mut tm = ToolManager::new();
        tm.padding_context = 24.0;
        tm.set_tool(ToolKind::Line);
        tm.begin(Point::new(0.0, 0.0));
        let shape = tm.end(Point::new(30.0, 0.0)).unwrap();
        assert!((shape.placement().padding_context - 24.0).abs() < f64::EPSILON);
        let text = tm.place_text(Point::new(5.0, 5.0));
        assert!((text.placement().padding_context - 24.0).abs() < f64::EPSILON);
    }
}
