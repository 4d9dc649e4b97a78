//! Inkshot Application
//!
//! Host shell: user settings, scripted input replay and PNG export.

mod app;
mod error;
pub mod script;
pub mod settings;

pub use app::{App, Args, USAGE};
pub use error::{AppError, AppResult};
pub use script::{Script, Step};
pub use settings::{Settings, SettingsError};
