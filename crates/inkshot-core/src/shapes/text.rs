//! Text shape.

use super::{Placement, ShapeId, ShapeStyle, ShapeTrait};
use kurbo::{BezPath, Point, Rect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A text label anchored at its top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub(crate) id: ShapeId,
    /// Position (top-left corner of the text box).
    pub position: Point,
    /// Text content.
    pub content: String,
    /// Font size in canvas units.
    pub font_size: f64,
    /// Style properties. The stroke color is used as the text color.
    pub style: ShapeStyle,
    #[serde(default)]
    pub placement: Placement,
}

impl Text {
    /// Default font size.
    pub const DEFAULT_FONT_SIZE: f64 = 20.0;
    pub const MIN_FONT_SIZE: f64 = 6.0;
    pub const MAX_FONT_SIZE: f64 = 400.0;
    /// Content given to text placed with a single click.
    pub const PLACEHOLDER: &'static str = "Text";

    /// Create a new text shape.
    pub fn new(position: Point, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            content,
            font_size: Self::DEFAULT_FONT_SIZE,
            style: ShapeStyle::default(),
            placement: Placement::default(),
        }
    }

    /// Set font size (builder pattern).
    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = size.clamp(Self::MIN_FONT_SIZE, Self::MAX_FONT_SIZE);
        self
    }

    /// Copy with different content.
    pub fn with_content(&self, content: String) -> Self {
        Self {
            content,
            ..self.clone()
        }
    }

    /// Copy scaled by `factor` about `anchor`; position and font size scale together.
    pub fn scaled_about(&self, anchor: Point, factor: f64) -> Self {
        let font_size = (self.font_size * factor).clamp(Self::MIN_FONT_SIZE, Self::MAX_FONT_SIZE);
        let applied = font_size / self.font_size;
        Self {
            position: anchor + (self.position - anchor) * applied,
            font_size,
            ..self.clone()
        }
    }

    /// Line height used for layout.
    pub fn line_height(&self) -> f64 {
        self.font_size * 1.2
    }

    /// Approximate width based on character count and font size.
    fn approximate_width(&self) -> f64 {
        let max_line_len = self
            .content
            .lines()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        max_line_len as f64 * self.font_size * 0.55
    }

    /// Approximate height based on font size and number of lines.
    fn approximate_height(&self) -> f64 {
        let line_count = self.content.lines().count().max(1);
        let line_count = if self.content.ends_with('\n') {
            line_count + 1
        } else {
            line_count
        };
        line_count as f64 * self.line_height()
    }
}

impl ShapeTrait for Text {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        let width = self.approximate_width().max(self.font_size);
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + width,
            self.position.y + self.approximate_height(),
        )
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.bounds().inflate(tolerance, tolerance).contains(point)
    }

    fn to_path(&self) -> BezPath {
        // Glyphs are drawn by the renderer; the path is the text box.
        self.bounds().to_path(0.1)
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
        self.position += delta;
    }
}
