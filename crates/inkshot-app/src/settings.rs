//! User settings persisted as JSON.

use inkshot_core::chrome::ChromeSettings;
use inkshot_core::editor::Editor;
use inkshot_core::history::MAX_UNDO_HISTORY;
use inkshot_core::shapes::{DEFAULT_BLUR_RADIUS, SerializableColor, ShapeStyle, Text};
use inkshot_core::tools::ToolKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Settings errors.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Startup preferences. Every field falls back to its default when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Tool active when a session starts.
    pub default_tool: ToolKind,
    pub stroke_color: SerializableColor,
    pub stroke_width: f64,
    pub font_size: f64,
    pub blur_radius: f64,
    pub chrome: ChromeSettings,
    pub history_capacity: usize,
    /// Font used for text; the system font search applies when unset.
    pub font_path: Option<PathBuf>,
    /// Draw selection handles and the drawing preview into the output.
    pub decorations: bool,
}

impl Default for Settings {
    fn default() -> Self {
        let style = ShapeStyle::default();
        Self {
            default_tool: ToolKind::Rectangle,
            stroke_color: style.stroke_color,
            stroke_width: style.stroke_width,
            font_size: Text::DEFAULT_FONT_SIZE,
            blur_radius: DEFAULT_BLUR_RADIUS,
            chrome: ChromeSettings::default(),
            history_capacity: MAX_UNDO_HISTORY,
            font_path: None,
            decorations: false,
        }
    }
}

impl Settings {
    pub const FILENAME: &'static str = "settings.json";

    /// `<config dir>/inkshot/settings.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("inkshot").join(Self::FILENAME))
    }

    /// Load from `path`, or from the default location when `None`.
    ///
    /// A missing file at the default location yields the defaults; a missing
    /// explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        match path {
            Some(path) => Self::load_from(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load_from(&path),
                Some(path) => {
                    log::debug!("No settings file at {:?}; using defaults", path);
                    Ok(Self::default())
                }
                None => Ok(Self::default()),
            },
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        log::info!("Saved settings to {:?}", path);
        Ok(())
    }

    pub fn save_to_default_path(&self) -> Result<(), SettingsError> {
        let path = Self::default_path().ok_or(SettingsError::NoConfigDir)?;
        self.save_to(&path)
    }

    /// A fresh editing session configured from these settings.
    pub fn new_editor(&self) -> Editor {
        let mut editor = Editor::with_history_capacity(self.chrome, self.history_capacity);
        editor.set_tool(self.default_tool);
        editor.set_stroke_color(self.stroke_color);
        editor.set_stroke_width(self.stroke_width);
        editor.set_font_size(self.font_size);
        editor.set_blur_radius(self.blur_radius);
        editor
    }
}
