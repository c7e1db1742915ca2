/// Action Log for tabledit
///
/// Every committed mutation is recorded as one `Action` carrying exactly what
/// is needed to reverse and replay it. Undo pops an action, applies its
/// inverse and moves it to the redo stack; redo does the opposite. Recording
/// a new action discards the redo stack, so history is linear.
///
/// # Action kinds
///
/// - `SetCells`: a batch of `(row, column, old, new)` cell writes
/// - `AddRows` / `DeleteRows`: logical positions plus physical row ids
/// - `AddCols` / `DeleteCols`: logical positions plus physical column ids
/// - `MoveRow` / `MoveCol`: a single `from -> to` rotation
///
/// Placement lists are stored in the order they were applied. Replaying them
/// forward re-applies that order; reversing walks them backwards, which puts
/// every entry back where it was.

use crate::interner::StringId;
use crate::store::{ColumnId, RowId};
use std::collections::VecDeque;

/// One cell write inside a `SetCells` batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellChange {
    pub row: RowId,
    pub column: ColumnId,
    pub old_value: StringId,
    pub new_value: StringId,
}

/// A physical id together with the logical slot it occupied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement<T> {
    pub position: usize,
    pub id: T,
}

/// Represents a single committed mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SetCells { changes: Vec<CellChange> },
    AddRows { rows: Vec<Placement<RowId>> },
    DeleteRows { rows: Vec<Placement<RowId>> },
    AddCols { cols: Vec<Placement<ColumnId>> },
    DeleteCols { cols: Vec<Placement<ColumnId>> },
    MoveRow { from: usize, to: usize },
    MoveCol { from: usize, to: usize },
}

impl Action {
    /// Short name used in log output
    pub fn name(&self) -> &'static str {
        match self {
            Action::SetCells { .. } => "set_cells",
            Action::AddRows { .. } => "add_rows",
            Action::DeleteRows { .. } => "delete_rows",
            Action::AddCols { .. } => "add_cols",
            Action::DeleteCols { .. } => "delete_cols",
            Action::MoveRow { .. } => "move_row",
            Action::MoveCol { .. } => "move_col",
        }
    }

    /// Number of cells, rows or columns the action touches
    pub fn len(&self) -> usize {
        match self {
            Action::SetCells { changes } => changes.len(),
            Action::AddRows { rows } | Action::DeleteRows { rows } => rows.len(),
            Action::AddCols { cols } | Action::DeleteCols { cols } => cols.len(),
            Action::MoveRow { .. } | Action::MoveCol { .. } => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Undo and redo stacks with optional depth limit and saved-state tracking.
#[derive(Debug, Clone)]
pub struct History {
    /// Most recent action at the back
    undo_stack: VecDeque<Action>,
    /// Most recently undone action at the back
    redo_stack: Vec<Action>,
    limit: Option<usize>,
    /// Undo depth at which the table was last saved, if still reachable
    saved_depth: Option<usize>,
}

impl Default for History {
    fn default() -> Self {
        Self::new(None)
    }
}

impl History {
    pub fn new(limit: Option<usize>) -> Self {
        History {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            limit,
            saved_depth: Some(0),
        }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Push a freshly committed action and discard the redo stack.
    pub fn record(&mut self, action: Action) {
        if self.saved_depth.is_some_and(|depth| depth > self.undo_stack.len()) {
            // The saved state lived on the redo stack
            self.saved_depth = None;
        }
        self.redo_stack.clear();
        self.push_undo(action);
    }

    /// Take the most recent action for undo. The caller hands it back via
    /// `push_redo` once its inverse has been applied.
    pub fn pop_undo(&mut self) -> Option<Action> {
        self.undo_stack.pop_back()
    }

    pub fn push_redo(&mut self, action: Action) {
        self.redo_stack.push(action);
    }

    pub fn pop_redo(&mut self) -> Option<Action> {
        self.redo_stack.pop()
    }

    /// Return a redone action to the undo stack without touching redo.
    pub fn push_undo_for_redo(&mut self, action: Action) {
        self.push_undo(action);
    }

    fn push_undo(&mut self, action: Action) {
        self.undo_stack.push_back(action);
        if let Some(limit) = self.limit {
            while self.undo_stack.len() > limit {
                self.undo_stack.pop_front();
                self.saved_depth = self.saved_depth.and_then(|depth| depth.checked_sub(1));
            }
        }
    }

    pub fn peek_undo(&self) -> Option<&Action> {
        self.undo_stack.back()
    }

    pub fn peek_redo(&self) -> Option<&Action> {
        self.redo_stack.last()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Drop both stacks. The current state becomes the saved state.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.saved_depth = Some(0);
    }

    pub fn mark_saved(&mut self) {
        self.saved_depth = Some(self.undo_stack.len());
    }

    pub fn is_modified(&self) -> bool {
        self.saved_depth != Some(self.undo_stack.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(from: usize, to: usize) -> Action {
        Action::MoveRow { from, to }
    }

    #[test]
    fn test_action_metadata() {
        let action = Action::SetCells {
            changes: vec![CellChange { row: 0, column: 1, old_value: 0, new_value: 2 }],
        };
        assert_eq!(action.name(), "set_cells");
        assert_eq!(action.len(), 1);
        assert!(!action.is_empty());

        let action = Action::DeleteRows { rows: vec![] };
        assert_eq!(action.name(), "delete_rows");
        assert!(action.is_empty());
    }

    #[test]
    fn test_record_clears_redo() {
        let mut history = History::default();
        history.record(mv(0, 1));
        history.record(mv(1, 2));

        let action = history.pop_undo().unwrap();
        history.push_redo(action);
        assert!(history.can_redo());

        history.record(mv(3, 4));
        assert!(!history.can_redo());
        assert_eq!(history.undo_len(), 2);
        assert_eq!(history.peek_undo(), Some(&mv(3, 4)));
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut history = History::new(Some(2));
        history.record(mv(0, 1));
        history.record(mv(1, 2));
        history.record(mv(2, 3));

        assert_eq!(history.undo_len(), 2);
        assert_eq!(history.pop_undo(), Some(mv(2, 3)));
        assert_eq!(history.pop_undo(), Some(mv(1, 2)));
        assert_eq!(history.pop_undo(), None);
    }

    #[test]
    fn test_modified_tracking_round_trip() {
        let mut history = History::default();
        assert!(!history.is_modified());

        history.record(mv(0, 1));
        assert!(history.is_modified());

        let action = history.pop_undo().unwrap();
        history.push_redo(action);
        assert!(!history.is_modified());

        let action = history.pop_redo().unwrap();
        history.push_undo_for_redo(action);
        assert!(history.is_modified());

        history.mark_saved();
        assert!(!history.is_modified());
    }

    #[test]
    fn test_saved_state_lost_when_redo_discarded() {
        let mut history = History::default();
        history.record(mv(0, 1));
        history.mark_saved();

        let action = history.pop_undo().unwrap();
        history.push_redo(action);
        history.record(mv(2, 3));

        // Same depth as the save, but a different state
        assert_eq!(history.undo_len(), 1);
        assert!(history.is_modified());
    }

    #[test]
    fn test_saved_state_lost_when_evicted() {
        let mut history = History::new(Some(1));
        history.record(mv(0, 1));
        assert!(history.is_modified());

        history.record(mv(1, 2));
        let action = history.pop_undo().unwrap();
        history.push_redo(action);
        // Depth 0 now means "after the first move", not the original state
        assert!(history.is_modified());
    }
}
