use super::ordered_list::OrderedList;
use log::debug;

/// One user edit, recorded as whole-document snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoRedoAction {
    pub before: String,
    pub after: String,
}

impl UndoRedoAction {
    pub fn new(before: impl Into<String>, after: impl Into<String>) -> Self {
        Self {
            before: before.into(),
            after: after.into(),
        }
    }
}

/// Linear undo history with a cursor on the last applied action.
///
/// Actions to the right of the cursor form the redo branch; the next `push`
/// drops them.
#[derive(Debug, Clone, Default)]
pub struct UndoRedoStack {
    actions: OrderedList<UndoRedoAction>,
    cursor: Option<usize>,
}

impl UndoRedoStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, before: impl Into<String>, after: impl Into<String>) {
        let keep = self.cursor.map_or(0, |cursor| cursor + 1);
        if self.actions.len() > keep {
            debug!("discarding {} redo actions", self.actions.len() - keep);
            self.actions.truncate(keep);
        }
        self.actions.push(UndoRedoAction::new(before, after));
        self.cursor = Some(self.actions.len() - 1);
    }

    pub fn can_undo(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn can_redo(&self) -> bool {
        match self.cursor {
            Some(cursor) => cursor + 1 < self.actions.len(),
            None => !self.actions.is_empty(),
        }
    }

    /// Step back one action, returning the text from before it.
    pub fn undo(&mut self) -> Option<&str> {
        let cursor = self.cursor?;
        self.cursor = cursor.checked_sub(1);
        self.actions.get(cursor).map(|action| action.before.as_str())
    }

    /// Re-apply the next undone action, returning the text from after it.
    pub fn redo(&mut self) -> Option<&str> {
        if !self.can_redo() {
            return None;
        }
        let cursor = self.cursor.map_or(0, |cursor| cursor + 1);
        self.cursor = Some(cursor);
        self.actions.get(cursor).map(|action| action.after.as_str())
    }

    /// Index of the last applied action, `None` when everything is undone.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn clear(&mut self) {
        self.actions.clear();
        self.cursor = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_stack_is_empty() {
        let mut stack = UndoRedoStack::new();
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
        assert_eq!(stack.cursor(), None);
        assert_eq!(stack.undo(), None);
        assert_eq!(stack.redo(), None);
    }

    #[test]
    fn test_undo_redo_walkthrough() {
        let mut stack = UndoRedoStack::new();
        stack.push("A", "B");
        stack.push("B", "C");
        assert_eq!(stack.undo(), Some("B"));
        assert_eq!(stack.undo(), Some("A"));
        assert!(!stack.can_undo());
        assert_eq!(stack.redo(), Some("B"));
        stack.push("B", "D");
        assert!(!stack.can_redo());
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.undo(), Some("B"));
        assert_eq!(stack.undo(), Some("A"));
    }

    #[test]
    fn test_push_after_full_undo_discards_everything() {
        let mut stack = UndoRedoStack::new();
        stack.push("", "a");
        stack.push("a", "ab");
        stack.undo();
        stack.undo();
        assert!(stack.can_redo());
        stack.push("", "x");
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.cursor(), Some(0));
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_undo_then_redo_round_trips() {
        let mut stack = UndoRedoStack::new();
        stack.push("one", "two");
        assert_eq!(stack.undo(), Some("one"));
        assert_eq!(stack.redo(), Some("two"));
        assert!(!stack.can_redo());
        assert!(stack.can_undo());
    }

    #[test]
    fn test_cursor_stays_in_bounds() {
        let mut stack = UndoRedoStack::new();
        stack.push("a", "b");
        stack.undo();
        assert_eq!(stack.undo(), None);
        assert_eq!(stack.cursor(), None);
        stack.redo();
        assert_eq!(stack.redo(), None);
        assert_eq!(stack.cursor(), Some(0));
    }

    #[test]
    fn test_clear() {
        let mut stack = UndoRedoStack::new();
        stack.push("a", "b");
        stack.clear();
        assert!(stack.is_empty());
        assert!(!stack.can_undo());
    }
}
