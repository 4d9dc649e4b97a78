//! Inkshot Core Library
//!
//! Platform-agnostic annotation engine: shape model, hit-testing, tools,
//! the interactive editing state machine and undo history.

pub mod chrome;
pub mod editor;
pub mod geometry;
pub mod history;
pub mod selection;
pub mod shapes;
pub mod tools;

pub use chrome::{Background, ChromeSettings, ShadowSettings};
pub use editor::{Editor, EditorEffect, EditorState, PointerEvent};
pub use history::{Command, DocumentSnapshot, UndoManager};
pub use selection::{CursorHint, Handle, HandleKind};
pub use shapes::{Shape, ShapeId, ShapeStyle};
pub use tools::{ToolKind, ToolManager};
