//! Inkshot Render Library
//!
//! Renderer abstraction and the tiny-skia implementation that flattens the
//! captured image, its chrome and the annotations into one raster.

mod pixmap;
mod renderer;

pub use pixmap::{
    HANDLE_DRAW_SIZE, HOVER_HANDLE_DRAW_SIZE, PixmapRenderer, image_to_pixmap, load_system_font,
    pixmap_to_image,
};
pub use renderer::{RenderContext, RenderResult, Renderer, RendererError, ShapeRenderer};
