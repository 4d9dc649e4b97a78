//! Command-line session: load, replay, render, save.

use crate::error::{AppError, AppResult};
use crate::script::Script;
use crate::settings::Settings;
use image::RgbaImage;
use inkshot_core::editor::Editor;
use inkshot_render::{PixmapRenderer, RenderContext, Renderer};
use std::path::{Path, PathBuf};

pub const USAGE: &str = "inkshot <image> <script.json> [-o out.png] [--config settings.json]";

/// Parsed command-line arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    pub image: PathBuf,
    pub script: PathBuf,
    pub output: PathBuf,
    pub config: Option<PathBuf>,
}

impl Args {
    /// Parse arguments, excluding the program name.
    pub fn parse<I, S>(args: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut positional = Vec::new();
        let mut output = None;
        let mut config = None;
        let mut args = args.into_iter().map(Into::into);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-o" | "--output" => output = Some(Self::value(&arg, args.next())?),
                "-c" | "--config" => config = Some(Self::value(&arg, args.next())?),
                flag if flag.starts_with('-') => {
                    return Err(AppError::Usage(format!("unknown option {flag}")));
                }
                _ => positional.push(PathBuf::from(&arg)),
            }
        }
        let [image, script]: [PathBuf; 2] = positional
            .try_into()
            .map_err(|_| AppError::Usage(USAGE.to_string()))?;
        let output = output.unwrap_or_else(|| Self::default_output(&image));
        Ok(Self {
            image,
            script,
            output,
            config,
        })
    }

    fn value(flag: &str, value: Option<String>) -> AppResult<PathBuf> {
        value
            .map(PathBuf::from)
            .ok_or_else(|| AppError::Usage(format!("{flag} needs a value")))
    }

    /// `shot.png` -> `shot-annotated.png`, next to the input.
    fn default_output(image: &Path) -> PathBuf {
        let stem = image.file_stem().and_then(|s| s.to_str()).unwrap_or("image");
        image.with_file_name(format!("{stem}-annotated.png"))
    }
}

/// One annotation session over a loaded image.
pub struct App {
    settings: Settings,
    editor: Editor,
    renderer: PixmapRenderer,
    image: RgbaImage,
}

impl App {
    pub fn new(settings: Settings, image: RgbaImage) -> AppResult<Self> {
        let renderer = match &settings.font_path {
            Some(path) => PixmapRenderer::with_font_path(path)?,
            None => PixmapRenderer::new(),
        };
        if !renderer.has_font() {
            log::warn!("No usable font found; text will be skipped");
        }
        Ok(Self {
            editor: settings.new_editor(),
            settings,
            renderer,
            image,
        })
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut Editor {
        &mut self.editor
    }

    /// Replay a script into the session.
    pub fn replay(&mut self, script: &Script) {
        let effects = script.replay(&mut self.editor);
        log::info!(
            "Replayed {} step(s): {} shape(s), {} effect(s)",
            script.steps.len(),
            self.editor.shapes().len(),
            effects.len()
        );
    }

    /// Compose the current document.
    pub fn render(&mut self) -> AppResult<RgbaImage> {
        let ctx = RenderContext::from_editor(&self.image, &self.editor).with_decorations(self.settings.decorations);
        Ok(self.renderer.render(&ctx)?)
    }

    /// Render and write a PNG to `path`.
    pub fn export(&mut self, path: &Path) -> AppResult<()> {
        let output = self.render()?;
        output.save_with_format(path, image::ImageFormat::Png)?;
        log::info!("Saved {}x{} image to {:?}", output.width(), output.height(), path);
        Ok(())
    }

    /// Run a whole command-line invocation.
    pub fn run(args: &Args) -> AppResult<()> {
        let settings = Settings::load(args.config.as_deref())?;
        let image = image::open(&args.image)?.to_rgba8();
        log::info!("Loaded {:?} ({}x{})", args.image, image.width(), image.height());
        let script = Script::load(&args.script)?;

        let mut app = Self::new(settings, image)?;
        app.replay(&script);
        app.export(&args.output)
    }
}
