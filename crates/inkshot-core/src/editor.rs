//! Pointer-driven editing session.
//!
//! [`Editor`] owns the shape list, selection, hover, chrome, tool manager and
//! undo history of one annotation document. Every input is reduced into a
//! state transition plus a list of [`EditorEffect`]s for the host to act on;
//! rendering reads the editor's state and never mutates it.

use crate::chrome::ChromeSettings;
use crate::history::{Command, DocumentSnapshot, MAX_UNDO_HISTORY, UndoManager};
use crate::selection::{
    CursorHint, HOVER_HANDLE_SIZE, Handle, HandleKind, SELECTED_HANDLE_SIZE, apply_handle, hit_test_handle,
    resolve_click, shapes_at_point,
};
use crate::shapes::{SerializableColor, Shape, ShapeId, ShapeStyle, Text};
use crate::tools::{ToolKind, ToolManager, highlighter_style};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// A pointer input in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up(Point),
    /// Pointer capture was lost.
    Cancel,
}

/// Side effects of a transition, for the host to apply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum EditorEffect {
    ShapeAdded { index: usize, id: ShapeId },
    ShapeUpdated { index: usize, id: ShapeId },
    ShapeRemoved { id: ShapeId },
    SelectionChanged(Option<usize>),
    HoverChanged(Option<usize>),
    /// The editor switched tools on its own (or confirmed a requested switch).
    ToolChanged(ToolKind),
    HistoryChanged { can_undo: bool, can_redo: bool },
    Cursor(CursorHint),
}

/// Interaction state.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum EditorState {
    #[default]
    Idle,
    /// A new shape is being drawn; the geometry lives in the tool manager.
    Drawing,
    DraggingShape {
        index: usize,
        press: Point,
        before: DocumentSnapshot,
        original: Shape,
    },
    ResizingShape {
        index: usize,
        handle: HandleKind,
        /// Handle position minus press position, in local coordinates.
        grab: Vec2,
        before: DocumentSnapshot,
        original: Shape,
    },
    AdjustingCurve {
        index: usize,
        before: DocumentSnapshot,
        original: Shape,
    },
}

impl EditorState {
    pub fn is_idle(&self) -> bool {
        matches!(self, EditorState::Idle)
    }

    fn name(&self) -> &'static str {
        match self {
            EditorState::Idle => "Idle",
            EditorState::Drawing => "Drawing",
            EditorState::DraggingShape { .. } => "DraggingShape",
            EditorState::ResizingShape { .. } => "ResizingShape",
            EditorState::AdjustingCurve { .. } => "AdjustingCurve",
        }
    }
}

/// One annotation document being edited.
#[derive(Debug, Clone)]
pub struct Editor {
    shapes: Vec<Shape>,
    selected: Option<usize>,
    hovered: Option<usize>,
    chrome: ChromeSettings,
    tools: ToolManager,
    history: UndoManager,
    state: EditorState,
    cursor: CursorHint,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(ChromeSettings::default())
    }
}

impl Editor {
    /// New empty session with the default history capacity.
    pub fn new(chrome: ChromeSettings) -> Self {
        Self::with_history_capacity(chrome, MAX_UNDO_HISTORY)
    }

    pub fn with_history_capacity(chrome: ChromeSettings, capacity: usize) -> Self {
        let chrome = chrome.sanitized();
        let mut tools = ToolManager::new();
        tools.padding_context = chrome.padding;
        let mut history = UndoManager::with_capacity(capacity);
        history.set_initial_state(DocumentSnapshot::new(Vec::new(), chrome));
        Self {
            shapes: Vec::new(),
            selected: None,
            hovered: None,
            chrome,
            tools,
            history,
            state: EditorState::Idle,
            cursor: CursorHint::Default,
        }
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_shape(&self) -> Option<&Shape> {
        self.selected.and_then(|i| self.shapes.get(i))
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub fn chrome(&self) -> &ChromeSettings {
        &self.chrome
    }

    pub fn tool(&self) -> ToolKind {
        self.tools.current_tool
    }

    pub fn tool_manager(&self) -> &ToolManager {
        &self.tools
    }

    pub fn history(&self) -> &UndoManager {
        &self.history
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn cursor(&self) -> CursorHint {
        self.cursor
    }

    /// Whether a curve gesture is in progress.
    pub fn curve_active(&self) -> bool {
        matches!(self.state, EditorState::AdjustingCurve { .. })
    }

    /// Handle of the selected shape under a canvas point.
    ///
    /// While a curve gesture is active the curve handle wins over endpoints it
    /// passes. `pointer_down` drops any gesture first, so there it resolves
    /// with the idle priority.
    pub fn handle_at(&self, point: Point) -> Option<Handle> {
        let shape = self.shapes.get(self.selected?)?;
        let local = point - shape.canvas_offset(self.chrome.padding);
        hit_test_handle(shape, local, SELECTED_HANDLE_SIZE, self.curve_active())
    }

    /// The shape being drawn, if any.
    pub fn preview_shape(&self) -> Option<Shape> {
        match self.state {
            EditorState::Drawing => self.tools.preview_shape(),
            _ => None,
        }
    }

    /// Copy of the current document state.
    pub fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot::new(self.shapes.clone(), self.chrome)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Dispatch a pointer event.
    pub fn handle(&mut self, event: PointerEvent) -> Vec<EditorEffect> {
        match event {
            PointerEvent::Down(point) => self.pointer_down(point),
            PointerEvent::Move(point) => self.pointer_move(point),
            PointerEvent::Up(point) => self.pointer_up(point),
            PointerEvent::Cancel => self.cancel_gesture(),
        }
    }

    pub fn pointer_down(&mut self, point: Point) -> Vec<EditorEffect> {
        let mut effects = Vec::new();
        if !self.state.is_idle() {
            log::debug!("Pointer down during {}; dropping gesture", self.state.name());
            effects.extend(self.cancel_gesture());
        }

        // 1. A handle of the selected shape.
        if let Some(index) = self.selected {
            if let Some(handle) = self.handle_at(point) {
                let before = self.snapshot();
                let original = self.shapes[index].clone();
                let local = point - original.canvas_offset(self.chrome.padding);
                self.state = if handle.kind == HandleKind::Curve {
                    EditorState::AdjustingCurve {
                        index,
                        before,
                        original,
                    }
                } else {
                    EditorState::ResizingShape {
                        index,
                        handle: handle.kind,
                        grab: handle.position - local,
                        before,
                        original,
                    }
                };
                log::debug!("Idle -> {} ({:?})", self.state.name(), handle.kind);
                self.set_cursor(handle.kind.cursor(), &mut effects);
                return effects;
            }
        }

        // 2. A shape body.
        let candidates = shapes_at_point(&self.shapes, point, self.chrome.padding);
        if let Some(index) = resolve_click(&candidates, self.selected) {
            if self.tools.current_tool != ToolKind::Select {
                self.tools.set_tool(ToolKind::Select);
                effects.push(EditorEffect::ToolChanged(ToolKind::Select));
            }
            self.set_selected(Some(index), &mut effects);
            self.state = EditorState::DraggingShape {
                index,
                press: point,
                before: self.snapshot(),
                original: self.shapes[index].clone(),
            };
            log::debug!("Idle -> DraggingShape (shape {})", index);
            self.set_cursor(CursorHint::Move, &mut effects);
            return effects;
        }

        match self.tools.current_tool {
            // 3. Text is placed immediately.
            ToolKind::Text => {
                let before = self.snapshot();
                let shape = self.tools.place_text(point);
                let index = self.push_shape(shape, &mut effects);
                self.set_selected(Some(index), &mut effects);
                self.record("Add Text", before, &mut effects);
            }
            // 5. Empty canvas with the select tool.
            ToolKind::Select => {
                self.set_selected(None, &mut effects);
            }
            // 4. Start drawing.
            _ => {
                self.set_selected(None, &mut effects);
                self.tools.begin(point);
                self.state = EditorState::Drawing;
                log::debug!("Idle -> Drawing ({:?})", self.tools.current_tool);
            }
        }
        effects
    }

    pub fn pointer_move(&mut self, point: Point) -> Vec<EditorEffect> {
        let mut effects = Vec::new();
        match &self.state {
            EditorState::Idle => self.update_hover(point, &mut effects),
            EditorState::Drawing => self.tools.update(point),
            EditorState::DraggingShape {
                index,
                press,
                original,
                ..
            } => {
                let moved = original.translated(point - *press);
                let index = *index;
                self.replace_shape(index, moved, &mut effects);
            }
            EditorState::ResizingShape {
                index,
                handle,
                grab,
                original,
                ..
            } => {
                let local = point - original.canvas_offset(self.chrome.padding) + *grab;
                let resized = apply_handle(original, *handle, local);
                let index = *index;
                self.replace_shape(index, resized, &mut effects);
            }
            EditorState::AdjustingCurve {
                index, original, ..
            } => {
                let local = point - original.canvas_offset(self.chrome.padding);
                let bent = apply_handle(original, HandleKind::Curve, local);
                let index = *index;
                self.replace_shape(index, bent, &mut effects);
            }
        }
        effects
    }

    pub fn pointer_up(&mut self, point: Point) -> Vec<EditorEffect> {
        let mut effects = Vec::new();
        match self.state {
            EditorState::Idle => return effects,
            EditorState::Drawing => {
                let before = self.snapshot();
                match self.tools.end(point) {
                    Some(shape) => {
                        let label = format!("Add {}", shape.kind_name());
                        self.push_shape(shape, &mut effects);
                        self.record(&label, before, &mut effects);
                    }
                    None => log::debug!("Discarded degenerate gesture"),
                }
                self.state = EditorState::Idle;
            }
            EditorState::DraggingShape { .. }
            | EditorState::ResizingShape { .. }
            | EditorState::AdjustingCurve { .. } => {
                effects.extend(self.pointer_move(point));
                let state = std::mem::take(&mut self.state);
                let (verb, before, original) = match state {
                    EditorState::DraggingShape {
                        before, original, ..
                    } => ("Move", before, original),
                    EditorState::ResizingShape {
                        before, original, ..
                    } => ("Resize", before, original),
                    EditorState::AdjustingCurve {
                        before, original, ..
                    } => ("Curve", before, original),
                    EditorState::Idle | EditorState::Drawing => return effects,
                };
                self.record(&format!("{} {}", verb, original.kind_name()), before, &mut effects);
            }
        }
        log::debug!("-> Idle");
        self.update_hover(point, &mut effects);
        effects
    }

    /// Abandon the gesture in progress; nothing is recorded.
    pub fn cancel_gesture(&mut self) -> Vec<EditorEffect> {
        let mut effects = Vec::new();
        match std::mem::take(&mut self.state) {
            EditorState::Idle => {}
            EditorState::Drawing => self.tools.cancel(),
            EditorState::DraggingShape {
                index, original, ..
            }
            | EditorState::ResizingShape {
                index, original, ..
            }
            | EditorState::AdjustingCurve {
                index, original, ..
            } => {
                log::debug!("Gesture cancelled; restoring shape {}", index);
                self.replace_shape(index, original, &mut effects);
            }
        }
        effects
    }

    /// Remove the selected shape. No-op without a valid selection.
    pub fn delete_selected(&mut self) -> Vec<EditorEffect> {
        let mut effects = self.cancel_gesture();
        let Some(index) = self.selected.filter(|&i| i < self.shapes.len()) else {
            return effects;
        };
        let before = self.snapshot();
        let removed = self.shapes.remove(index);
        effects.push(EditorEffect::ShapeRemoved { id: removed.id() });
        self.set_selected(None, &mut effects);
        self.set_hovered(None, &mut effects);
        self.record(&format!("Delete {}", removed.kind_name()), before, &mut effects);
        effects
    }

    /// Replace the content of the selected text. Empty content deletes it.
    pub fn set_text(&mut self, content: &str) -> Vec<EditorEffect> {
        let Some((index, Shape::Text(text))) = self.selected.and_then(|i| Some((i, self.shapes.get(i)?)))
        else {
            return Vec::new();
        };
        if content.is_empty() {
            return self.delete_selected();
        }
        if text.content == content {
            return Vec::new();
        }
        let edited = Shape::Text(text.with_content(content.to_string()));
        let mut effects = self.cancel_gesture();
        let before = self.snapshot();
        self.replace_shape(index, edited, &mut effects);
        self.record("Edit Text", before, &mut effects);
        effects
    }

    /// Change background, padding, corner radius or shadow as one undo step.
    pub fn set_chrome(&mut self, chrome: ChromeSettings) -> Vec<EditorEffect> {
        let chrome = chrome.sanitized();
        if chrome == self.chrome {
            return Vec::new();
        }
        let mut effects = self.cancel_gesture();
        let before = self.snapshot();
        self.chrome = chrome;
        self.tools.padding_context = chrome.padding;
        self.record("Change Canvas", before, &mut effects);
        effects
    }

    /// Switch tools. An in-progress drawing is discarded.
    pub fn set_tool(&mut self, tool: ToolKind) -> Vec<EditorEffect> {
        let mut effects = Vec::new();
        if self.state == EditorState::Drawing {
            effects.extend(self.cancel_gesture());
        }
        if self.tools.current_tool != tool {
            self.tools.set_tool(tool);
            effects.push(EditorEffect::ToolChanged(tool));
        }
        effects
    }

    /// Set the stroke color for new shapes and the selected shape.
    pub fn set_stroke_color(&mut self, color: SerializableColor) -> Vec<EditorEffect> {
        self.tools.current_style.stroke_color = color;
        self.restyle_selected("Change Color", |style| {
            style.stroke_color = color;
        })
    }

    /// Set the stroke width for new shapes and the selected shape.
    pub fn set_stroke_width(&mut self, width: f64) -> Vec<EditorEffect> {
        let width = width.max(0.5);
        self.tools.current_style.stroke_width = width;
        self.restyle_selected("Change Width", |style| {
            style.stroke_width = width;
        })
    }

    /// Font size for text placed from now on.
    pub fn set_font_size(&mut self, size: f64) {
        self.tools.font_size = size.clamp(Text::MIN_FONT_SIZE, Text::MAX_FONT_SIZE);
    }

    /// Blur sigma for blur regions drawn from now on.
    pub fn set_blur_radius(&mut self, radius: f64) {
        self.tools.blur_radius = radius.max(0.0);
    }

    pub fn undo(&mut self) -> Vec<EditorEffect> {
        let mut effects = self.cancel_gesture();
        match self.history.undo() {
            Some(snapshot) => self.restore(snapshot, &mut effects),
            None => log::debug!("Nothing to undo"),
        }
        effects
    }

    pub fn redo(&mut self) -> Vec<EditorEffect> {
        let mut effects = self.cancel_gesture();
        match self.history.redo() {
            Some(snapshot) => self.restore(snapshot, &mut effects),
            None => log::debug!("Nothing to redo"),
        }
        effects
    }

    fn restyle_selected(
        &mut self,
        label: &str,
        apply: impl Fn(&mut ShapeStyle),
    ) -> Vec<EditorEffect> {
        let Some((index, shape)) = self.selected.and_then(|i| Some((i, self.shapes.get(i)?))) else {
            return Vec::new();
        };
        let mut style = *shape.style();
        apply(&mut style);
        if let Shape::Freehand(f) = shape {
            if f.highlight {
                style = highlighter_style(style);
            }
        }
        if style == *shape.style() {
            return Vec::new();
        }
        let restyled = shape.with_style(style);
        let mut effects = self.cancel_gesture();
        let before = self.snapshot();
        self.replace_shape(index, restyled, &mut effects);
        self.record(label, before, &mut effects);
        effects
    }

    /// Swap in a snapshot from history, keeping selection and hover on the
    /// same shapes where they still exist.
    fn restore(&mut self, snapshot: DocumentSnapshot, effects: &mut Vec<EditorEffect>) {
        let selected_id = self.selected_shape().map(Shape::id);
        let hovered_id = self.hovered.and_then(|i| self.shapes.get(i)).map(Shape::id);
        self.shapes = snapshot.shapes;
        self.chrome = snapshot.chrome;
        self.tools.padding_context = self.chrome.padding;
        let selected = selected_id.and_then(|id| self.index_of(id));
        let hovered = hovered_id.and_then(|id| self.index_of(id));
        self.set_selected(selected, effects);
        self.set_hovered(hovered, effects);
        self.push_history_effect(effects);
    }

    fn index_of(&self, id: ShapeId) -> Option<usize> {
        self.shapes.iter().position(|s| s.id() == id)
    }

    /// Record one command from `before` to the current state; skipped when unchanged.
    fn record(&mut self, label: &str, before: DocumentSnapshot, effects: &mut Vec<EditorEffect>) {
        let command = Command::new(label, before, self.snapshot());
        if command.is_noop() {
            log::debug!("'{}' changed nothing; not recorded", label);
            return;
        }
        self.history.execute(command);
        self.push_history_effect(effects);
    }

    fn push_history_effect(&self, effects: &mut Vec<EditorEffect>) {
        effects.push(EditorEffect::HistoryChanged {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        });
    }

    fn push_shape(&mut self, shape: Shape, effects: &mut Vec<EditorEffect>) -> usize {
        let id = shape.id();
        self.shapes.push(shape);
        let index = self.shapes.len() - 1;
        effects.push(EditorEffect::ShapeAdded { index, id });
        index
    }

    fn replace_shape(&mut self, index: usize, shape: Shape, effects: &mut Vec<EditorEffect>) {
        let Some(slot) = self.shapes.get_mut(index) else {
            return;
        };
        if *slot == shape {
            return;
        }
        let id = shape.id();
        *slot = shape;
        effects.push(EditorEffect::ShapeUpdated { index, id });
    }

    fn set_selected(&mut self, selected: Option<usize>, effects: &mut Vec<EditorEffect>) {
        let selected = selected.filter(|&i| i < self.shapes.len());
        if self.selected != selected {
            self.selected = selected;
            effects.push(EditorEffect::SelectionChanged(selected));
        }
    }

    fn set_hovered(&mut self, hovered: Option<usize>, effects: &mut Vec<EditorEffect>) {
        let hovered = hovered.filter(|&i| i < self.shapes.len());
        if self.hovered != hovered {
            self.hovered = hovered;
            effects.push(EditorEffect::HoverChanged(hovered));
        }
    }

    fn set_cursor(&mut self, cursor: CursorHint, effects: &mut Vec<EditorEffect>) {
        if self.cursor != cursor {
            self.cursor = cursor;
            effects.push(EditorEffect::Cursor(cursor));
        }
    }

    /// Idle hover tracking: hovered shape plus a cursor hint.
    fn update_hover(&mut self, point: Point, effects: &mut Vec<EditorEffect>) {
        let padding = self.chrome.padding;
        let hovered = shapes_at_point(&self.shapes, point, padding).first().copied();
        self.set_hovered(hovered, effects);

        let handle_under = |index: Option<usize>, size: f64| {
            let shape = self.shapes.get(index?)?;
            let local = point - shape.canvas_offset(padding);
            hit_test_handle(shape, local, size, false)
        };
        let cursor = if let Some(handle) = handle_under(self.selected, SELECTED_HANDLE_SIZE) {
            handle.kind.cursor()
        } else if let Some(handle) = handle_under(hovered, HOVER_HANDLE_SIZE) {
            handle.kind.cursor()
        } else if hovered.is_some() {
            CursorHint::Move
        } else {
            match self.tools.current_tool {
                ToolKind::Select => CursorHint::Default,
                ToolKind::Text => CursorHint::Text,
                _ => CursorHint::Crosshair,
            }
        };
        self.set_cursor(cursor, effects);
    }
}
