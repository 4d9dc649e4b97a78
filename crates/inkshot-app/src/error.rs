//! Error type of the host shell.

use crate::settings::SettingsError;
use inkshot_render::RendererError;
use thiserror::Error;

/// Errors surfaced by the command-line host.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Usage: {0}")]
    Usage(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Script error: {0}")]
    Script(#[from] serde_json::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Render error: {0}")]
    Render(#[from] RendererError),
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
}

/// Result type for host operations.
pub type AppResult<T> = Result<T, AppError>;
