//! Replayable editing scripts.
//!
//! A script is a JSON array of steps, each tagged by `op`:
//!
//! ```json
//! [
//!   { "op": "tool", "tool": "Arrow" },
//!   { "op": "drag", "from": { "x": 10, "y": 10 }, "to": { "x": 120, "y": 60 } },
//!   { "op": "undo" }
//! ]
//! ```

use inkshot_core::chrome::ChromeSettings;
use inkshot_core::editor::{Editor, EditorEffect, PointerEvent};
use inkshot_core::shapes::SerializableColor;
use inkshot_core::tools::ToolKind;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::AppResult;

/// Intermediate moves generated for a `drag` step when none are given.
const DEFAULT_DRAG_STEPS: usize = 8;

/// One scripted input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Tool { tool: ToolKind },
    Down { at: Point },
    Move { at: Point },
    Up { at: Point },
    Cancel,
    /// Press at `from`, move in `steps` increments and release at `to`.
    Drag {
        from: Point,
        to: Point,
        #[serde(default)]
        steps: Option<usize>,
    },
    /// Replace the selected text.
    Text { content: String },
    Chrome { chrome: ChromeSettings },
    Color { color: SerializableColor },
    Width { width: f64 },
    Delete,
    Undo,
    Redo,
}

impl Step {
    /// Feed this step to `editor` and return the effects it produced.
    pub fn apply(&self, editor: &mut Editor) -> Vec<EditorEffect> {
        match self {
            Step::Tool { tool } => editor.set_tool(*tool),
            Step::Down { at } => editor.handle(PointerEvent::Down(*at)),
            Step::Move { at } => editor.handle(PointerEvent::Move(*at)),
            Step::Up { at } => editor.handle(PointerEvent::Up(*at)),
            Step::Cancel => editor.handle(PointerEvent::Cancel),
            Step::Drag { from, to, steps } => {
                let steps = steps.unwrap_or(DEFAULT_DRAG_STEPS).max(1);
                let mut effects = editor.pointer_down(*from);
                for i in 1..steps {
                    let t = i as f64 / steps as f64;
                    effects.extend(editor.pointer_move(from.lerp(*to, t)));
                }
                effects.extend(editor.pointer_up(*to));
                effects
            }
            Step::Text { content } => editor.set_text(content),
            Step::Chrome { chrome } => editor.set_chrome(*chrome),
            Step::Color { color } => editor.set_stroke_color(*color),
            Step::Width { width } => editor.set_stroke_width(*width),
            Step::Delete => editor.delete_selected(),
            Step::Undo => editor.undo(),
            Step::Redo => editor.redo(),
        }
    }
}

/// An ordered list of steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Script {
    pub steps: Vec<Step>,
}

impl Script {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    pub fn from_json(json: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> AppResult<Self> {
        let json = std::fs::read_to_string(path)?;
        let script = Self::from_json(&json)?;
        log::info!("Loaded {} step(s) from {:?}", script.steps.len(), path);
        Ok(script)
    }

    /// Run every step against `editor`, returning all effects in order.
    pub fn replay(&self, editor: &mut Editor) -> Vec<EditorEffect> {
        let mut effects = Vec::new();
        for (i, step) in self.steps.iter().enumerate() {
            let produced = step.apply(editor);
            log::debug!("Step {}: {:?} -> {} effect(s)", i, step, produced.len());
            effects.extend(produced);
        }
        effects
    }
}
