//! Renderer trait abstraction.

use image::RgbaImage;
use inkshot_core::chrome::ChromeSettings;
use inkshot_core::editor::Editor;
use inkshot_core::shapes::Shape;
use kurbo::Affine;
use peniko::Color;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Invalid canvas size: {width}x{height}")]
    InvalidCanvasSize { width: f64, height: f64 },
    #[error("Cannot allocate a {width}x{height} pixmap")]
    PixmapAllocation { width: u32, height: u32 },
    #[error("Image size mismatch: expected {expected} bytes, got {actual}")]
    ImageSizeMismatch { expected: usize, actual: usize },
    #[error("Font load failed: {0}")]
    FontLoad(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Everything one frame needs: the captured image, the document and the
/// interaction state to decorate it with.
pub struct RenderContext<'a> {
    /// Captured image, placed inside the chrome padding.
    pub image: &'a RgbaImage,
    /// Committed shapes in z-order.
    pub shapes: &'a [Shape],
    /// Background, padding, corner radius and shadow.
    pub chrome: ChromeSettings,
    /// Index of the selected shape.
    pub selected: Option<usize>,
    /// Index of the hovered shape.
    pub hovered: Option<usize>,
    /// Shape being drawn, in canvas coordinates.
    pub preview: Option<Shape>,
    /// Draw the preview, selection outline and handles.
    pub decorations: bool,
    /// Selection highlight color.
    pub selection_color: Color,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context with no interaction state.
    pub fn new(image: &'a RgbaImage, shapes: &'a [Shape], chrome: ChromeSettings) -> Self {
        Self {
            image,
            shapes,
            chrome: chrome.sanitized(),
            selected: None,
            hovered: None,
            preview: None,
            decorations: true,
            selection_color: Color::from_rgba8(59, 130, 246, 255), // Blue
        }
    }

    /// Context mirroring an editing session: its shapes, chrome, selection,
    /// hover and drawing preview.
    pub fn from_editor(image: &'a RgbaImage, editor: &'a Editor) -> Self {
        Self::new(image, editor.shapes(), *editor.chrome())
            .with_selected(editor.selected())
            .with_hovered(editor.hovered())
            .with_preview(editor.preview_shape())
    }

    /// Set the selected shape index.
    pub fn with_selected(mut self, selected: Option<usize>) -> Self {
        self.selected = selected;
        self
    }

    /// Set the hovered shape index.
    pub fn with_hovered(mut self, hovered: Option<usize>) -> Self {
        self.hovered = hovered;
        self
    }

    /// Set the in-progress shape.
    pub fn with_preview(mut self, preview: Option<Shape>) -> Self {
        self.preview = preview;
        self
    }

    /// Enable or disable interaction decorations (off for export).
    pub fn with_decorations(mut self, decorations: bool) -> Self {
        self.decorations = decorations;
        self
    }

    /// Set the selection highlight color.
    pub fn with_selection_color(mut self, color: Color) -> Self {
        self.selection_color = color;
        self
    }

    /// Selected shape, if the index is still valid.
    pub fn selected_shape(&self) -> Option<&Shape> {
        self.selected.and_then(|i| self.shapes.get(i))
    }

    /// Hovered shape, unless it is also the selected one.
    pub fn hovered_shape(&self) -> Option<&Shape> {
        self.hovered
            .filter(|&i| Some(i) != self.selected)
            .and_then(|i| self.shapes.get(i))
    }
}

/// Trait for rendering backends.
pub trait Renderer {
    /// Compose one frame and return it as straight-alpha RGBA.
    fn render(&mut self, ctx: &RenderContext) -> RenderResult<RgbaImage>;
}

/// Drawing primitives a backend implements for the render pass.
pub trait ShapeRenderer {
    /// Render a shape with the given transform.
    fn render_shape(&mut self, shape: &Shape, transform: Affine);

    /// Blur the already composed pixels under a blur region.
    fn render_blur_region(&mut self, shape: &Shape, transform: Affine);

    /// Render the selection outline and handles of a shape.
    fn render_selection_handles(&mut self, shape: &Shape, transform: Affine, color: Color, hovered: bool);
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkshot_core::shapes::Rectangle;
    use kurbo::Point;

    fn shapes() -> Vec<Shape> {
        vec![
            Shape::Rectangle(Rectangle::new(Point::new(0.0, 0.0), Point::new(10.0, 10.0))),
            Shape::Rectangle(Rectangle::new(Point::new(20.0, 0.0), Point::new(30.0, 10.0))),
        ]
    }

    #[test]
    fn test_hovered_shape_skips_selected() {
        let image = RgbaImage::new(4, 4);
        let shapes = shapes();
        let ctx = RenderContext::new(&image, &shapes, ChromeSettings::default())
            .with_selected(Some(1))
            .with_hovered(Some(1));
        assert!(ctx.selected_shape().is_some());
        assert!(ctx.hovered_shape().is_none());

        let ctx = ctx.with_hovered(Some(0));
        assert_eq!(ctx.hovered_shape().map(Shape::id), Some(shapes[0].id()));
    }

    #[test]
    fn test_stale_indices_resolve_to_none() {
        let image = RgbaImage::new(4, 4);
        let shapes = shapes();
        let ctx = RenderContext::new(&image, &shapes, ChromeSettings::default())
            .with_selected(Some(7))
            .with_hovered(Some(9));
        assert!(ctx.selected_shape().is_none());
        assert!(ctx.hovered_shape().is_none());
    }

    #[test]
    fn test_context_from_editor() {
        let image = RgbaImage::new(4, 4);
        let editor = Editor::default();
        let ctx = RenderContext::from_editor(&image, &editor).with_decorations(false);
        assert!(ctx.shapes.is_empty());
        assert!(ctx.preview.is_none());
        assert!(!ctx.decorations);
    }
}
