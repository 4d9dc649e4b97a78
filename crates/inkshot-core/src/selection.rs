//! Hit-testing, selection handles and handle manipulation.
//!
//! Points passed to the functions in this module are in a shape's stored
//! (local) coordinates unless stated otherwise. [`shapes_at_point`] takes a
//! canvas point and converts it per shape.

use crate::shapes::{Shape, ShapeTrait};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Handle hit box while a shape is selected.
pub const SELECTED_HANDLE_SIZE: f64 = 20.0;
/// Handle hit box while a shape is only hovered.
pub const HOVER_HANDLE_SIZE: f64 = 14.0;
/// Hit box of the text move handle.
pub const TEXT_MOVE_HANDLE_SIZE: f64 = 28.0;

/// Type of selection handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    /// Start of a line or arrow.
    Start,
    /// End of a line or arrow.
    End,
    /// Arrow curve control, located on the rendered path midpoint.
    Curve,
    /// Bounding box corner.
    Corner(Corner),
    /// Edge midpoint (cardinal handle on circles).
    Edge(Edge),
    /// Text move handle.
    Move,
}

impl HandleKind {
    /// Lower values are hit-tested first.
    fn priority(self, curve_active: bool) -> u8 {
        match self {
            HandleKind::Curve if curve_active => 0,
            HandleKind::Start | HandleKind::End => 1,
            HandleKind::Corner(_) => 2,
            HandleKind::Edge(_) => 3,
            HandleKind::Curve => 4,
            HandleKind::Move => 5,
        }
    }

    /// Cursor to show while hovering or dragging this handle.
    pub fn cursor(self) -> CursorHint {
        match self {
            HandleKind::Start | HandleKind::End | HandleKind::Curve => CursorHint::Crosshair,
            HandleKind::Corner(Corner::TopLeft | Corner::BottomRight) => CursorHint::ResizeNwSe,
            HandleKind::Corner(Corner::TopRight | Corner::BottomLeft) => CursorHint::ResizeNeSw,
            HandleKind::Edge(Edge::Top | Edge::Bottom) => CursorHint::ResizeNs,
            HandleKind::Edge(Edge::Left | Edge::Right) => CursorHint::ResizeEw,
            HandleKind::Move => CursorHint::Move,
        }
    }
}

/// Corner positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    pub fn position(self, bounds: Rect) -> Point {
        match self {
            Corner::TopLeft => Point::new(bounds.x0, bounds.y0),
            Corner::TopRight => Point::new(bounds.x1, bounds.y0),
            Corner::BottomLeft => Point::new(bounds.x0, bounds.y1),
            Corner::BottomRight => Point::new(bounds.x1, bounds.y1),
        }
    }

    pub fn opposite(self) -> Corner {
        match self {
            Corner::TopLeft => Corner::BottomRight,
            Corner::TopRight => Corner::BottomLeft,
            Corner::BottomLeft => Corner::TopRight,
            Corner::BottomRight => Corner::TopLeft,
        }
    }
}

/// Edge positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Top, Edge::Right, Edge::Bottom, Edge::Left];

    pub fn position(self, bounds: Rect) -> Point {
        let center = bounds.center();
        match self {
            Edge::Top => Point::new(center.x, bounds.y0),
            Edge::Right => Point::new(bounds.x1, center.y),
            Edge::Bottom => Point::new(center.x, bounds.y1),
            Edge::Left => Point::new(bounds.x0, center.y),
        }
    }
}

/// Pointer cursor suggested to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CursorHint {
    #[default]
    Default,
    Crosshair,
    Text,
    Move,
    ResizeNwSe,
    ResizeNeSw,
    ResizeNs,
    ResizeEw,
}

/// A selection handle with its position and type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    /// Position in the shape's local coordinates.
    pub position: Point,
    /// Handle type.
    pub kind: HandleKind,
}

impl Handle {
    /// Create a new handle.
    pub fn new(position: Point, kind: HandleKind) -> Self {
        Self { position, kind }
    }

    /// Side of the square hit box, given the current state's handle size.
    pub fn hit_size(&self, size: f64) -> f64 {
        match self.kind {
            HandleKind::Move => TEXT_MOVE_HANDLE_SIZE,
            _ => size,
        }
    }

    /// Square hit box centred on the handle.
    pub fn hit_box(&self, size: f64) -> Rect {
        let half = self.hit_size(size) / 2.0;
        Rect::new(
            self.position.x - half,
            self.position.y - half,
            self.position.x + half,
            self.position.y + half,
        )
    }

    /// Check if a point hits this handle's square hit box.
    pub fn hit_test(&self, point: Point, size: f64) -> bool {
        let half = self.hit_size(size) / 2.0;
        (point.x - self.position.x).abs() <= half && (point.y - self.position.y).abs() <= half
    }
}

/// Get the selection handles for a shape.
pub fn handles_for(shape: &Shape) -> Vec<Handle> {
    match shape {
        Shape::Line(line) => vec![
            Handle::new(line.start, HandleKind::Start),
            Handle::new(line.end, HandleKind::End),
        ],
        Shape::TaperedArrow(arrow) => vec![
            Handle::new(arrow.start, HandleKind::Start),
            Handle::new(arrow.end, HandleKind::End),
        ],
        Shape::Arrow(arrow) => vec![
            Handle::new(arrow.start, HandleKind::Start),
            Handle::new(arrow.end, HandleKind::End),
            Handle::new(arrow.curve_handle(), HandleKind::Curve),
        ],
        Shape::Rectangle(_) | Shape::Blur(_) => {
            let bounds = shape.bounds();
            corner_handles(bounds)
                .into_iter()
                .chain(edge_handles(bounds))
                .collect()
        }
        Shape::Circle(_) => edge_handles(shape.bounds()),
        Shape::Text(_) => {
            let bounds = shape.bounds();
            std::iter::once(Handle::new(bounds.center(), HandleKind::Move))
                .chain(corner_handles(bounds))
                .collect()
        }
        Shape::Freehand(_) => corner_handles(shape.bounds()),
    }
}

/// Generate corner handles for a bounding rectangle.
fn corner_handles(bounds: Rect) -> Vec<Handle> {
    Corner::ALL
        .iter()
        .map(|&c| Handle::new(c.position(bounds), HandleKind::Corner(c)))
        .collect()
}

/// Generate edge-midpoint handles for a bounding rectangle.
fn edge_handles(bounds: Rect) -> Vec<Handle> {
    Edge::ALL
        .iter()
        .map(|&e| Handle::new(e.position(bounds), HandleKind::Edge(e)))
        .collect()
}

/// Find the handle under `point` (local coordinates), honoring handle priority.
///
/// `curve_active` puts the arrow curve handle first so an ongoing curve drag
/// does not snap to an endpoint that it passes over.
pub fn hit_test_handle(shape: &Shape, point: Point, size: f64, curve_active: bool) -> Option<Handle> {
    let mut handles = handles_for(shape);
    handles.sort_by_key(|h| h.kind.priority(curve_active));
    handles.into_iter().find(|h| h.hit_test(point, size))
}

/// Indices of every shape under a canvas point, topmost first.
pub fn shapes_at_point(shapes: &[Shape], point: Point, padding: f64) -> Vec<usize> {
    shapes
        .iter()
        .enumerate()
        .rev()
        .filter(|(_, shape)| shape.contains(point - shape.canvas_offset(padding)))
        .map(|(i, _)| i)
        .collect()
}

/// Choose which candidate a click selects.
///
/// If the current selection is among the candidates the next one (wrapping)
/// is chosen, so repeated clicks walk down through stacked shapes.
pub fn resolve_click(candidates: &[usize], selected: Option<usize>) -> Option<usize> {
    let current = selected.and_then(|sel| candidates.iter().position(|&c| c == sel));
    match current {
        Some(pos) => candidates.get((pos + 1) % candidates.len()).copied(),
        None => candidates.first().copied(),
    }
}

/// Apply a handle drag. `point` is where the handle should now be, in the
/// shape's local coordinates. Returns a new shape; `original` is untouched.
pub fn apply_handle(original: &Shape, handle: HandleKind, point: Point) -> Shape {
    match (original, handle) {
        (Shape::Arrow(arrow), HandleKind::Curve) => Shape::Arrow(arrow.with_control(point)),
        (Shape::Text(text), HandleKind::Move) => {
            let delta = point - text.bounds().center();
            original.translated(delta)
        }
        (Shape::Text(text), HandleKind::Corner(corner)) => {
            let bounds = text.bounds();
            let anchor = corner.opposite().position(bounds);
            let old_diag = corner.position(bounds).distance(anchor);
            if old_diag < f64::EPSILON {
                return original.clone();
            }
            let factor = point.distance(anchor) / old_diag;
            Shape::Text(text.scaled_about(anchor, factor))
        }
        (Shape::Freehand(freehand), HandleKind::Corner(corner)) => {
            let bounds = original.bounds();
            let anchor = corner.opposite().position(bounds);
            Shape::Freehand(freehand.mapped_between(bounds, Rect::from_points(anchor, point)))
        }
        (_, HandleKind::Start | HandleKind::End) => {
            let Some((start, end)) = original.endpoints() else {
                return original.clone();
            };
            let (start, end) = if handle == HandleKind::Start {
                (point, end)
            } else {
                (start, point)
            };
            original
                .resized(start, end)
                .unwrap_or_else(|| original.clone())
        }
        (_, HandleKind::Corner(_) | HandleKind::Edge(_)) => {
            let Some((start, end)) = original.endpoints() else {
                return original.clone();
            };
            let (start, end) = move_box_sides(start, end, handle, point);
            original
                .resized(start, end)
                .unwrap_or_else(|| original.clone())
        }
        _ => original.clone(),
    }
}

/// Move the sides of the box spanned by `start`/`end` that `handle` controls,
/// writing into whichever stored coordinate currently forms that side.
fn move_box_sides(start: Point, end: Point, handle: HandleKind, point: Point) -> (Point, Point) {
    let (mut start, mut end) = (start, end);
    let (left, right, top, bottom) = match handle {
        HandleKind::Corner(Corner::TopLeft) => (true, false, true, false),
        HandleKind::Corner(Corner::TopRight) => (false, true, true, false),
        HandleKind::Corner(Corner::BottomLeft) => (true, false, false, true),
        HandleKind::Corner(Corner::BottomRight) => (false, true, false, true),
        HandleKind::Edge(Edge::Top) => (false, false, true, false),
        HandleKind::Edge(Edge::Bottom) => (false, false, false, true),
        HandleKind::Edge(Edge::Left) => (true, false, false, false),
        HandleKind::Edge(Edge::Right) => (false, true, false, false),
        _ => (false, false, false, false),
    };
    let (min_x, max_x) = if start.x <= end.x {
        (&mut start.x, &mut end.x)
    } else {
        (&mut end.x, &mut start.x)
    };
    if left {
        *min_x = point.x;
    }
    if right {
        *max_x = point.x;
    }
    let (min_y, max_y) = if start.y <= end.y {
        (&mut start.y, &mut end.y)
    } else {
        (&mut end.y, &mut start.y)
    };
    if top {
        *min_y = point.y;
    }
    if bottom {
        *max_y = point.y;
    }
    (start, end)
}

/// Offset between a pointer press and the handle it grabbed.
pub fn grab_offset(handle: &Handle, press: Point) -> Vec2 {
    handle.position - press
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Arrow, Circle, Freehand, Line, Rectangle, Text};

    #[test]
    fn test_line_handles() {
        let line = Line::new(Point::new(0.0, 0.0), Point::new(100.0, 100.0));
        let handles = handles_for(&Shape::Line(line));
        assert_eq!(handles.len(), 2);
        assert_eq!(handles[0].kind, HandleKind::Start);
        assert_eq!(handles[1].kind, HandleKind::End);
    }

    #[test]
    fn test_arrow_curve_handle_on_path_midpoint() {
        let arrow = Arrow::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0))
            .with_control(Point::new(50.0, 60.0));
        let handles = handles_for(&Shape::Arrow(arrow));
        let curve = handles
            .iter()
            .find(|h| h.kind == HandleKind::Curve)
            .unwrap();
        assert!((curve.position.y - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_rectangle_and_circle_handles() {
        let rect = Shape::Rectangle(Rectangle::new(Point::new(0.0, 0.0), Point::new(100.0, 50.0)));
        assert_eq!(handles_for(&rect).len(), 8);
        let circle = Shape::Circle(Circle::new(Point::new(0.0, 0.0), Point::new(100.0, 50.0)));
        let handles = handles_for(&circle);
        assert_eq!(handles.len(), 4);
        assert!(handles.iter().all(|h| matches!(h.kind, HandleKind::Edge(_))));
        assert_eq!(handles[0].position, Point::new(50.0, 0.0));
    }

    #[test]
    fn test_text_handles() {
        let text = Shape::Text(Text::new(Point::new(0.0, 0.0), "Hello".to_string()));
        let handles = handles_for(&text);
        assert_eq!(handles.len(), 5);
        assert_eq!(handles[0].kind, HandleKind::Move);
        assert!((handles[0].hit_size(SELECTED_HANDLE_SIZE) - TEXT_MOVE_HANDLE_SIZE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_handle_hit_box_is_square() {
        let handle = Handle::new(Point::new(50.0, 50.0), HandleKind::Start);
        assert!(handle.hit_test(Point::new(50.0, 50.0), SELECTED_HANDLE_SIZE));
        assert!(handle.hit_test(Point::new(59.0, 59.0), SELECTED_HANDLE_SIZE));
        assert!(!handle.hit_test(Point::new(59.0, 59.0), HOVER_HANDLE_SIZE));
        assert!(!handle.hit_test(Point::new(61.0, 50.0), SELECTED_HANDLE_SIZE));
    }

    #[test]
    fn test_endpoint_beats_curve_unless_curve_active() {
        // Short arrow: the curve handle overlaps both endpoints.
        let arrow = Shape::Arrow(Arrow::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0)));
        let near_start = Point::new(2.0, 0.0);
        let idle = hit_test_handle(&arrow, near_start, SELECTED_HANDLE_SIZE, false).unwrap();
        assert_eq!(idle.kind, HandleKind::Start);
        let active = hit_test_handle(&arrow, near_start, SELECTED_HANDLE_SIZE, true).unwrap();
        assert_eq!(active.kind, HandleKind::Curve);
    }

    #[test]
    fn test_shapes_at_point_topmost_first() {
        let shapes = vec![
            Shape::Rectangle(Rectangle::new(Point::new(0.0, 0.0), Point::new(100.0, 100.0))),
            Shape::Rectangle(Rectangle::new(Point::new(50.0, 50.0), Point::new(150.0, 150.0))),
            Shape::Rectangle(Rectangle::new(Point::new(300.0, 300.0), Point::new(400.0, 400.0))),
        ];
        assert_eq!(shapes_at_point(&shapes, Point::new(75.0, 75.0), 0.0), vec![1, 0]);
        assert!(shapes_at_point(&shapes, Point::new(250.0, 250.0), 0.0).is_empty());
    }

    #[test]
    fn test_shapes_at_point_respects_anchor_offset() {
        let mut rect = Rectangle::new(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        rect.placement = crate::shapes::Placement::image();
        let shapes = vec![Shape::Rectangle(rect)];
        assert!(shapes_at_point(&shapes, Point::new(55.0, 55.0), 50.0) == vec![0]);
        assert!(shapes_at_point(&shapes, Point::new(5.0, 5.0), 50.0).is_empty());
    }

    #[test]
    fn test_resolve_click_cycles() {
        let candidates = [4, 2, 0];
        assert_eq!(resolve_click(&candidates, None), Some(4));
        assert_eq!(resolve_click(&candidates, Some(7)), Some(4));
        assert_eq!(resolve_click(&candidates, Some(4)), Some(2));
        assert_eq!(resolve_click(&candidates, Some(0)), Some(4));
        assert_eq!(resolve_click(&[], Some(0)), None);
    }

    #[test]
    fn test_apply_endpoint() {
        let shape = Shape::Line(Line::new(Point::new(0.0, 0.0), Point::new(100.0, 100.0)));
        let result = apply_handle(&shape, HandleKind::End, Point::new(110.0, 120.0));
        let Shape::Line(line) = result else {
            panic!("Expected Line shape");
        };
        assert_eq!(line.end, Point::new(110.0, 120.0));
        assert_eq!(line.start, Point::new(0.0, 0.0));
    }

    #[test]
    fn test_apply_corner_and_edge() {
        let shape = Shape::Rectangle(Rectangle::new(Point::new(0.0, 0.0), Point::new(100.0, 100.0)));
        let corner = apply_handle(&shape, HandleKind::Corner(Corner::BottomRight), Point::new(150.0, 140.0));
        assert_eq!(corner.bounds(), Rect::new(0.0, 0.0, 150.0, 140.0));
        let edge = apply_handle(&shape, HandleKind::Edge(Edge::Left), Point::new(20.0, 999.0));
        assert_eq!(edge.bounds(), Rect::new(20.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn test_apply_corner_on_reversed_drag() {
        // Drawn from bottom-right to top-left.
        let shape = Shape::Rectangle(Rectangle::new(Point::new(100.0, 100.0), Point::new(0.0, 0.0)));
        let result = apply_handle(&shape, HandleKind::Corner(Corner::TopLeft), Point::new(-10.0, -20.0));
        assert_eq!(result.bounds(), Rect::new(-10.0, -20.0, 100.0, 100.0));
    }

    #[test]
    fn test_apply_curve_sets_control() {
        let shape = Shape::Arrow(Arrow::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0)));
        let Shape::Arrow(arrow) = apply_handle(&shape, HandleKind::Curve, Point::new(50.0, 30.0)) else {
            panic!("Expected Arrow shape");
        };
        assert_eq!(arrow.control, Point::new(50.0, 30.0));
        assert!(arrow.is_curved());
    }

    #[test]
    fn test_freehand_corner_scales_about_opposite() {
        let shape = Shape::Freehand(Freehand::from_points(vec![
            Point::new(0.0, 0.0),
            Point::new(50.0, 25.0),
            Point::new(100.0, 50.0),
        ]));
        let result = apply_handle(&shape, HandleKind::Corner(Corner::BottomRight), Point::new(200.0, 100.0));
        let Shape::Freehand(freehand) = result else {
            panic!("Expected Freehand shape");
        };
        assert_eq!(freehand.points[1], Point::new(100.0, 50.0));
        assert_eq!(freehand.points[0], Point::new(0.0, 0.0));
    }

    #[test]
    fn test_text_move_handle() {
        let text = Text::new(Point::new(0.0, 0.0), "Hello".to_string());
        let shape = Shape::Text(text.clone());
        let center = shape.bounds().center();
        let moved = apply_handle(&shape, HandleKind::Move, center + Vec2::new(10.0, 5.0));
        let Shape::Text(moved) = moved else {
            panic!("Expected Text shape");
        };
        assert!((moved.position.x - 10.0).abs() < 1e-9);
        assert!((moved.position.y - 5.0).abs() < 1e-9);
        assert!((moved.font_size - text.font_size).abs() < f64::EPSILON);
    }
}
