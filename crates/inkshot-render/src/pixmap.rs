//! CPU renderer built on tiny-skia.
//!
//! Composes one frame in this order: background, shadow, rounded image,
//! shapes and blur regions in z-order, then the live preview and selection
//! decorations. A blur region softens whatever is composed below it.

use crate::renderer::{RenderContext, RenderResult, Renderer, RendererError, ShapeRenderer};
use ab_glyph::FontArc;
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use inkshot_core::chrome::{Background, ChromeSettings};
use inkshot_core::selection::{Handle, HandleKind, handles_for};
use inkshot_core::shapes::{SerializableColor, Shape, ShapeStyle, Text};
use kurbo::{Affine, BezPath, PathEl, Rect, RoundedRect, Shape as KurboShape, Size};
use peniko::Color;
use std::path::Path;
use tiny_skia::{
    ColorU8, FillRule, FilterQuality, GradientStop, IntSize, LineCap, LineJoin, LinearGradient,
    Paint, PathBuilder, Pattern, Pixmap, PixmapPaint, SpreadMode, Stroke, StrokeDash, Transform,
};

/// Drawn size of a selected shape's handles.
pub const HANDLE_DRAW_SIZE: f64 = 10.0;
/// Drawn size of a hovered shape's handles.
pub const HOVER_HANDLE_DRAW_SIZE: f64 = 7.0;
/// Gap between a shape and its dashed selection outline.
const OUTLINE_GAP: f64 = 4.0;
const DASH_LEN: f32 = 4.0;

/// Fonts tried, in order, when no font is given explicitly.
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Helvetica.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Load the first readable font from the list of well-known system paths.
pub fn load_system_font() -> Option<FontArc> {
    FONT_CANDIDATES.iter().find_map(|path| {
        let bytes = std::fs::read(path).ok()?;
        let font = FontArc::try_from_vec(bytes).ok()?;
        log::debug!("Using font {}", path);
        Some(font)
    })
}

/// Software renderer producing an [`RgbaImage`].
pub struct PixmapRenderer {
    font: Option<FontArc>,
    /// The pixmap of the frame being composed.
    pixmap: Option<Pixmap>,
    warned_missing_font: bool,
}

impl Default for PixmapRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PixmapRenderer {
    /// Renderer using the first available system font for text.
    pub fn new() -> Self {
        Self {
            font: load_system_font(),
            pixmap: None,
            warned_missing_font: false,
        }
    }

    /// Renderer that skips text shapes.
    pub fn without_font() -> Self {
        Self {
            font: None,
            pixmap: None,
            warned_missing_font: false,
        }
    }

    /// Renderer using the given font.
    pub fn with_font(font: FontArc) -> Self {
        Self {
            font: Some(font),
            ..Self::without_font()
        }
    }

    /// Renderer using the font file at `path`.
    pub fn with_font_path(path: impl AsRef<Path>) -> RenderResult<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        let font = FontArc::try_from_vec(bytes).map_err(|e| RendererError::FontLoad(e.to_string()))?;
        Ok(Self::with_font(font))
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    fn pixmap_mut(&mut self) -> Option<&mut Pixmap> {
        self.pixmap.as_mut()
    }

    fn render_background(pixmap: &mut Pixmap, background: Background) {
        match background {
            Background::None => {}
            Background::Solid { color } => pixmap.fill(skia_color(color)),
            Background::Gradient { from, to, angle } => {
                let (w, h) = (pixmap.width() as f32, pixmap.height() as f32);
                let (sin, cos) = (angle as f32).to_radians().sin_cos();
                let half = (w / 2.0 * cos).abs() + (h / 2.0 * sin).abs();
                let (cx, cy) = (w / 2.0, h / 2.0);
                let shader = LinearGradient::new(
                    tiny_skia::Point::from_xy(cx - cos * half, cy - sin * half),
                    tiny_skia::Point::from_xy(cx + cos * half, cy + sin * half),
                    vec![
                        GradientStop::new(0.0, skia_color(from)),
                        GradientStop::new(1.0, skia_color(to)),
                    ],
                    SpreadMode::Pad,
                    Transform::identity(),
                );
                let Some(shader) = shader else {
                    // Degenerate gradient line; fall back to the first stop.
                    pixmap.fill(skia_color(from));
                    return;
                };
                let paint = Paint {
                    shader,
                    ..Paint::default()
                };
                if let Some(rect) = tiny_skia::Rect::from_xywh(0.0, 0.0, w, h) {
                    pixmap.fill_rect(rect, &paint, Transform::identity(), None);
                }
            }
        }
    }

    fn render_shadow(pixmap: &mut Pixmap, chrome: &ChromeSettings, image_rect: Rect, radius: f64) -> RenderResult<()> {
        let shadow = chrome.shadow;
        if !shadow.enabled || shadow.color.a == 0 {
            return Ok(());
        }
        let mut layer = Pixmap::new(pixmap.width(), pixmap.height()).ok_or(RendererError::PixmapAllocation {
            width: pixmap.width(),
            height: pixmap.height(),
        })?;
        let shape = RoundedRect::from_rect(image_rect + shadow.offset, radius).to_path(0.1);
        if let Some(path) = to_skia_path(&shape) {
            layer.fill_path(&path, &color_paint(shadow.color), FillRule::Winding, Transform::identity(), None);
        }
        if shadow.blur_radius > 0.0 {
            let blurred = image::imageops::blur(&pixmap_to_image(&layer)?, shadow.blur_radius as f32);
            layer = image_to_pixmap(&blurred)?;
        }
        pixmap.draw_pixmap(0, 0, layer.as_ref(), &PixmapPaint::default(), Transform::identity(), None);
        Ok(())
    }

    fn render_image(pixmap: &mut Pixmap, image: &RgbaImage, image_rect: Rect, radius: f64) -> RenderResult<()> {
        let source = image_to_pixmap(image)?;
        let pattern = Pattern::new(
            source.as_ref(),
            SpreadMode::Pad,
            FilterQuality::Nearest,
            1.0,
            Transform::from_translate(image_rect.x0 as f32, image_rect.y0 as f32),
        );
        let paint = Paint {
            shader: pattern,
            anti_alias: true,
            ..Paint::default()
        };
        let clip = RoundedRect::from_rect(image_rect, radius).to_path(0.1);
        if let Some(path) = to_skia_path(&clip) {
            pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
        }
        Ok(())
    }

    fn render_text(&mut self, text: &Text, transform: Affine) {
        let Some(font) = self.font.as_ref() else {
            if !self.warned_missing_font {
                log::warn!("No font available; text annotations are not drawn");
                self.warned_missing_font = true;
            }
            return;
        };
        let Some(pixmap) = self.pixmap.as_mut() else {
            return;
        };
        let (width, height) = (pixmap.width(), pixmap.height());
        // Opaque glyphs on a transparent layer are already premultiplied
        // coverage; the text alpha is applied as layer opacity.
        let mut layer = RgbaImage::new(width, height);
        let color = text.style.stroke_color;
        let origin = transform * text.position;
        for (i, line) in text.content.lines().enumerate() {
            let y = origin.y + i as f64 * text.line_height();
            draw_text_mut(
                &mut layer,
                Rgba([color.r, color.g, color.b, 255]),
                origin.x.round() as i32,
                y.round() as i32,
                text.font_size as f32,
                font,
                line,
            );
        }
        let Some(size) = IntSize::from_wh(width, height) else {
            return;
        };
        let Some(layer) = Pixmap::from_vec(layer.into_raw(), size) else {
            return;
        };
        let paint = PixmapPaint {
            opacity: f32::from(color.a) / 255.0,
            ..PixmapPaint::default()
        };
        pixmap.draw_pixmap(0, 0, layer.as_ref(), &paint, Transform::identity(), None);
    }

    /// Dashed outline for a blur region that is still being drawn.
    fn render_blur_outline(&mut self, shape: &Shape, transform: Affine, color: Color) {
        let Some(pixmap) = self.pixmap_mut() else {
            return;
        };
        if let Some(path) = to_skia_path(&shape.bounds().to_path(0.1)) {
            pixmap.stroke_path(&path, &peniko_paint(color), &dashed_stroke(1.5), skia_transform(transform), None);
        }
    }

    fn render_handle(pixmap: &mut Pixmap, handle: &Handle, transform: Affine, size: f64, color: Color) {
        let pos = handle.position;
        let half = size / 2.0;
        let path = match handle.kind {
            // Round handles for points on the shape's path.
            HandleKind::Start | HandleKind::End | HandleKind::Curve | HandleKind::Move => {
                kurbo::Ellipse::new(pos, (half, half), 0.0).to_path(0.1)
            }
            HandleKind::Corner(_) | HandleKind::Edge(_) => {
                Rect::new(pos.x - half, pos.y - half, pos.x + half, pos.y + half).to_path(0.1)
            }
        };
        let Some(path) = to_skia_path(&path) else {
            return;
        };
        let transform = skia_transform(transform);
        pixmap.fill_path(
            &path,
            &color_paint(SerializableColor::white()),
            FillRule::Winding,
            transform,
            None,
        );
        let border = Stroke {
            width: 1.5,
            ..Stroke::default()
        };
        pixmap.stroke_path(&path, &peniko_paint(color), &border, transform, None);
    }
}

impl ShapeRenderer for PixmapRenderer {
    fn render_shape(&mut self, shape: &Shape, transform: Affine) {
        let style = *shape.style();
        match shape {
            Shape::Blur(_) => self.render_blur_region(shape, transform),
            Shape::Text(text) => self.render_text(text, transform),
            Shape::TaperedArrow(_) => {
                let Some(pixmap) = self.pixmap_mut() else {
                    return;
                };
                if let Some(path) = to_skia_path(&shape.to_path()) {
                    pixmap.fill_path(
                        &path,
                        &color_paint(style.stroke_color),
                        FillRule::Winding,
                        skia_transform(transform),
                        None,
                    );
                }
            }
            Shape::Freehand(freehand) if freehand.points.len() < 2 => {}
            _ => {
                let Some(pixmap) = self.pixmap_mut() else {
                    return;
                };
                if let Some(path) = to_skia_path(&shape.to_path()) {
                    pixmap.stroke_path(
                        &path,
                        &color_paint(style.stroke_color),
                        &shape_stroke(&style),
                        skia_transform(transform),
                        None,
                    );
                }
            }
        }
    }

    fn render_blur_region(&mut self, shape: &Shape, transform: Affine) {
        let Shape::Blur(blur) = shape else {
            return;
        };
        let Some(pixmap) = self.pixmap_mut() else {
            return;
        };
        let region = transform.transform_rect_bbox(blur.as_rect());
        if let Err(e) = blur_region(pixmap, region, blur.radius as f32) {
            log::warn!("Skipping blur region: {}", e);
        }
    }

    fn render_selection_handles(&mut self, shape: &Shape, transform: Affine, color: Color, hovered: bool) {
        let Some(pixmap) = self.pixmap_mut() else {
            return;
        };
        let color = if hovered { color.with_alpha(0.6) } else { color };
        // Lines and arrows get a dashed guide between their ends, the rest a box.
        let outline = match (shape, shape.endpoints()) {
            (Shape::Line(_) | Shape::Arrow(_) | Shape::TaperedArrow(_), Some((start, end))) => {
                let mut path = BezPath::new();
                path.move_to(start);
                path.line_to(end);
                path
            }
            _ => shape.bounds().inflate(OUTLINE_GAP, OUTLINE_GAP).to_path(0.1),
        };
        if let Some(path) = to_skia_path(&outline) {
            pixmap.stroke_path(&path, &peniko_paint(color), &dashed_stroke(1.0), skia_transform(transform), None);
        }

        let size = if hovered { HOVER_HANDLE_DRAW_SIZE } else { HANDLE_DRAW_SIZE };
        for handle in handles_for(shape) {
            Self::render_handle(pixmap, &handle, transform, size, color);
        }
    }
}

impl Renderer for PixmapRenderer {
    fn render(&mut self, ctx: &RenderContext) -> RenderResult<RgbaImage> {
        let chrome = ctx.chrome;
        let image_size = Size::new(f64::from(ctx.image.width()), f64::from(ctx.image.height()));
        let canvas = chrome.canvas_size(image_size);
        if ctx.image.width() == 0 || ctx.image.height() == 0 || !canvas.is_finite() {
            return Err(RendererError::InvalidCanvasSize {
                width: canvas.width,
                height: canvas.height,
            });
        }
        let (width, height) = (canvas.width.round() as u32, canvas.height.round() as u32);
        let mut pixmap = Pixmap::new(width, height).ok_or(RendererError::PixmapAllocation { width, height })?;
        log::debug!("Rendering {} shape(s) on a {}x{} canvas", ctx.shapes.len(), width, height);

        let image_rect = chrome.image_rect(image_size);
        let radius = chrome.effective_corner_radius(image_size);
        Self::render_background(&mut pixmap, chrome.background);
        Self::render_shadow(&mut pixmap, &chrome, image_rect, radius)?;
        Self::render_image(&mut pixmap, ctx.image, image_rect, radius)?;
        self.pixmap = Some(pixmap);

        let placed = |shape: &Shape| Affine::translate(shape.canvas_offset(chrome.padding));
        for shape in ctx.shapes {
            self.render_shape(shape, placed(shape));
        }

        if ctx.decorations {
            if let Some(preview) = &ctx.preview {
                if preview.is_blur() {
                    self.render_blur_outline(preview, placed(preview), ctx.selection_color);
                } else {
                    self.render_shape(preview, placed(preview));
                }
            }
            if let Some(shape) = ctx.hovered_shape() {
                self.render_selection_handles(shape, placed(shape), ctx.selection_color, true);
            }
            if let Some(shape) = ctx.selected_shape() {
                self.render_selection_handles(shape, placed(shape), ctx.selection_color, false);
            }
        }

        let pixmap = self.pixmap.take().ok_or(RendererError::PixmapAllocation { width, height })?;
        pixmap_to_image(&pixmap)
    }
}

/// Gaussian-blur the pixels of `pixmap` inside `region`.
fn blur_region(pixmap: &mut Pixmap, region: Rect, sigma: f32) -> RenderResult<()> {
    if sigma <= 0.0 {
        return Ok(());
    }
    let canvas = Rect::new(0.0, 0.0, f64::from(pixmap.width()), f64::from(pixmap.height()));
    let clipped = region.abs().intersect(canvas).expand();
    if clipped.width() < 1.0 || clipped.height() < 1.0 {
        return Ok(());
    }
    let (x0, y0) = (clipped.x0 as u32, clipped.y0 as u32);
    let (w, h) = (clipped.width() as u32, clipped.height() as u32);

    let full = pixmap_to_image(pixmap)?;
    let patch = image::imageops::crop_imm(&full, x0, y0, w, h).to_image();
    let blurred = image::imageops::blur(&patch, sigma);

    let stride = pixmap.width() as usize;
    let pixels = pixmap.pixels_mut();
    for (x, y, pixel) in blurred.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let index = (y0 + y) as usize * stride + (x0 + x) as usize;
        if let Some(dst) = pixels.get_mut(index) {
            *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
        }
    }
    Ok(())
}

/// Straight-alpha copy of a premultiplied pixmap.
pub fn pixmap_to_image(pixmap: &Pixmap) -> RenderResult<RgbaImage> {
    let mut data = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let c = pixel.demultiply();
        data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    let actual = data.len();
    RgbaImage::from_raw(pixmap.width(), pixmap.height(), data).ok_or(RendererError::ImageSizeMismatch {
        expected: pixmap.data().len(),
        actual,
    })
}

/// Premultiplied copy of a straight-alpha image.
pub fn image_to_pixmap(image: &RgbaImage) -> RenderResult<Pixmap> {
    let (width, height) = image.dimensions();
    let mut pixmap = Pixmap::new(width, height).ok_or(RendererError::PixmapAllocation { width, height })?;
    let expected = pixmap.data().len();
    if image.as_raw().len() != expected {
        return Err(RendererError::ImageSizeMismatch {
            expected,
            actual: image.as_raw().len(),
        });
    }
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}

/// Convert a kurbo path to a tiny-skia path. Empty paths yield `None`.
fn to_skia_path(path: &BezPath) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(c, p) => pb.quad_to(c.x as f32, c.y as f32, p.x as f32, p.y as f32),
            PathEl::CurveTo(c1, c2, p) => pb.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

fn skia_transform(affine: Affine) -> Transform {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    Transform::from_row(a as f32, b as f32, c as f32, d as f32, e as f32, f as f32)
}

fn skia_color(color: SerializableColor) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a)
}

fn color_paint(color: SerializableColor) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

fn peniko_paint(color: Color) -> Paint<'static> {
    let rgba = color.to_rgba8();
    color_paint(SerializableColor::new(rgba.r, rgba.g, rgba.b, rgba.a))
}

fn shape_stroke(style: &ShapeStyle) -> Stroke {
    Stroke {
        width: style.stroke_width as f32,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    }
}

fn dashed_stroke(width: f32) -> Stroke {
    Stroke {
        width,
        dash: StrokeDash::new(vec![DASH_LEN, DASH_LEN], 0.0),
        ..Stroke::default()
    }
}
