//! Snapshot-based undo/redo.

use crate::chrome::ChromeSettings;
use crate::shapes::Shape;
use serde::{Deserialize, Serialize};

/// Maximum number of commands kept by default.
pub const MAX_UNDO_HISTORY: usize = 50;

/// The full editable state of one annotation document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    pub shapes: Vec<Shape>,
    #[serde(default)]
    pub chrome: ChromeSettings,
}

impl DocumentSnapshot {
    pub fn new(shapes: Vec<Shape>, chrome: ChromeSettings) -> Self {
        Self { shapes, chrome }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// One undoable step: the document before and after it.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub label: String,
    pub before: DocumentSnapshot,
    pub after: DocumentSnapshot,
}

impl Command {
    pub fn new(label: impl Into<String>, before: DocumentSnapshot, after: DocumentSnapshot) -> Self {
        Self {
            label: label.into(),
            before,
            after,
        }
    }

    /// A command whose sides are equal changes nothing.
    pub fn is_noop(&self) -> bool {
        self.before == self.after
    }
}

/// Linear undo history with redo pruning and a capacity bound.
///
/// `cursor` counts the commands currently applied: `commands[..cursor]` can be
/// undone, `commands[cursor..]` can be redone.
#[derive(Debug, Clone)]
pub struct UndoManager {
    commands: Vec<Command>,
    cursor: usize,
    capacity: usize,
    initial: Option<DocumentSnapshot>,
}

impl Default for UndoManager {
    fn default() -> Self {
        Self::with_capacity(MAX_UNDO_HISTORY)
    }
}

impl UndoManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// History bounded to `capacity` commands (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            commands: Vec::new(),
            cursor: 0,
            capacity: capacity.max(1),
            initial: None,
        }
    }

    /// Register the session baseline. Only the first call has an effect.
    pub fn set_initial_state(&mut self, snapshot: DocumentSnapshot) {
        if self.initial.is_none() {
            self.initial = Some(snapshot);
        }
    }

    /// State before the oldest retained command.
    pub fn initial_state(&self) -> Option<&DocumentSnapshot> {
        self.initial.as_ref()
    }

    /// Record a command, dropping any redoable commands, and return its after state.
    pub fn execute(&mut self, command: Command) -> &DocumentSnapshot {
        let pruned = self.commands.len() - self.cursor;
        self.commands.truncate(self.cursor);
        if pruned > 0 {
            log::debug!("Pruned {} redo step(s)", pruned);
        }
        log::debug!("Recorded '{}'", command.label);
        self.commands.push(command);
        self.cursor += 1;

        if self.commands.len() > self.capacity {
            let dropped = self.commands.remove(0);
            self.cursor -= 1;
            // Undoing past the oldest retained command now lands here.
            self.initial = Some(dropped.after);
        }

        &self.commands[self.cursor - 1].after
    }

    /// Step back and return the state to restore, or `None` at the start of history.
    pub fn undo(&mut self) -> Option<DocumentSnapshot> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        let command = &self.commands[self.cursor];
        log::debug!("Undo '{}'", command.label);
        Some(command.before.clone())
    }

    /// Step forward and return the state to restore, or `None` at the end of history.
    pub fn redo(&mut self) -> Option<DocumentSnapshot> {
        let command = self.commands.get(self.cursor)?;
        log::debug!("Redo '{}'", command.label);
        let after = command.after.clone();
        self.cursor += 1;
        Some(after)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.commands.len()
    }

    /// Label of the command `undo` would revert.
    pub fn undo_label(&self) -> Option<&str> {
        self.cursor
            .checked_sub(1)
            .and_then(|i| self.commands.get(i))
            .map(|c| c.label.as_str())
    }

    /// Label of the command `redo` would reapply.
    pub fn redo_label(&self) -> Option<&str> {
        self.commands.get(self.cursor).map(|c| c.label.as_str())
    }

    /// Number of retained commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Forget every command. The baseline is kept.
    pub fn clear(&mut self) {
        self.commands.clear();
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Rectangle;
    use kurbo::Point;

    /// Documents holding the first 0..=n shapes of one fixed shape list.
    fn docs(n: usize) -> Vec<DocumentSnapshot> {
        let shapes: Vec<Shape> = (0..n)
            .map(|i| {
                let x = i as f64 * 10.0;
                Shape::Rectangle(Rectangle::new(Point::new(x, 0.0), Point::new(x + 5.0, 5.0)))
            })
            .collect();
        (0..=n)
            .map(|i| DocumentSnapshot::new(shapes[..i].to_vec(), ChromeSettings::default()))
            .collect()
    }

    /// A history of `n` "add shape" commands over a growing document.
    fn history(n: usize) -> (UndoManager, Vec<DocumentSnapshot>) {
        let states = docs(n);
        let mut manager = UndoManager::new();
        manager.set_initial_state(states[0].clone());
        for pair in states.windows(2) {
            manager.execute(Command::new("Add Rectangle", pair[0].clone(), pair[1].clone()));
        }
        (manager, states)
    }

    #[test]
    fn test_empty_history() {
        let mut manager = UndoManager::new();
        assert!(!manager.can_undo());
        assert!(!manager.can_redo());
        assert!(manager.undo().is_none());
        assert!(manager.redo().is_none());
    }

    #[test]
    fn test_execute_returns_after() {
        let states = docs(1);
        let mut manager = UndoManager::new();
        let returned = manager.execute(Command::new("Add", states[0].clone(), states[1].clone()));
        assert_eq!(returned, &states[1]);
        assert!(manager.can_undo());
    }

    #[test]
    fn test_undo_n_then_redo_n() {
        let n = 5;
        let (mut manager, states) = history(n);
        let mut restored = None;
        for _ in 0..n {
            restored = manager.undo();
        }
        assert_eq!(restored.as_ref(), Some(&states[0]));
        assert_eq!(manager.initial_state(), Some(&states[0]));
        assert!(manager.undo().is_none());

        let mut last = None;
        for _ in 0..n {
            last = manager.redo();
        }
        assert_eq!(last.as_ref(), Some(&states[n]));
        assert!(!manager.can_redo());
    }

    #[test]
    fn test_undo_restores_before_state() {
        let (mut manager, states) = history(3);
        assert_eq!(manager.undo(), Some(states[2].clone()));
        assert_eq!(manager.undo(), Some(states[1].clone()));
    }

    #[test]
    fn test_execute_prunes_redo_branch() {
        let (mut manager, states) = history(4);
        manager.undo();
        manager.undo();
        assert_eq!(manager.len(), 4);
        assert!(manager.can_redo());

        let mut padded = states[2].clone();
        padded.chrome.padding = 40.0;
        manager.execute(Command::new("Branch", states[2].clone(), padded));
        assert_eq!(manager.len(), 3);
        assert!(!manager.can_redo());
        assert!(manager.redo().is_none());
        assert_eq!(manager.undo_label(), Some("Branch"));
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let states = docs(5);
        let mut manager = UndoManager::with_capacity(3);
        manager.set_initial_state(states[0].clone());
        for (i, pair) in states.windows(2).enumerate() {
            manager.execute(Command::new(format!("step {i}"), pair[0].clone(), pair[1].clone()));
        }
        assert_eq!(manager.len(), 3);
        // Oldest retained command is "step 2"; the baseline moved to its before state.
        assert_eq!(manager.initial_state(), Some(&states[2]));
        let mut undone = 0;
        while manager.undo().is_some() {
            undone += 1;
        }
        assert_eq!(undone, 3);
    }

    #[test]
    fn test_default_capacity() {
        let states = docs(2);
        let mut manager = UndoManager::new();
        for i in 0..(MAX_UNDO_HISTORY + 10) {
            manager.execute(Command::new("step", states[i % 3].clone(), states[(i + 1) % 3].clone()));
        }
        assert_eq!(manager.len(), MAX_UNDO_HISTORY);
        assert!(manager.can_undo());
    }

    #[test]
    fn test_initial_state_set_once() {
        let states = docs(2);
        let mut manager = UndoManager::new();
        manager.set_initial_state(states[1].clone());
        manager.set_initial_state(states[2].clone());
        assert_eq!(manager.initial_state(), Some(&states[1]));
    }

    #[test]
    fn test_snapshot_json() {
        let snapshot = docs(2).remove(2);
        let json = snapshot.to_json().unwrap();
        assert_eq!(DocumentSnapshot::from_json(&json).unwrap(), snapshot);
        assert!(DocumentSnapshot::from_json("{").is_err());
    }

    #[test]
    fn test_noop_command() {
        let snapshot = docs(1).remove(1);
        assert!(Command::new("Nothing", snapshot.clone(), snapshot).is_noop());
    }
}
