/// tabledit Table Implementation
///
/// A Table is an ordered grid of string cells with full undo/redo.
///
/// Storage is split in two layers:
/// - physical: rows in an append-only `RowStore`, columns in an append-only
///   arena of interned names. Physical ids never move and are never reused.
/// - logical: two `LogicalOrder`s listing which physical rows and columns are
///   visible and in what order. Every structural edit (insert, delete, move)
///   only touches these lists.
///
/// Each mutating call records exactly one `Action`, so a whole batch is
/// reverted or replayed by a single `undo`/`redo`.
///
/// # Examples
///
/// ```
/// use tabledit::Table;
///
/// let mut table = Table::new();
/// table.add_cols(&["x", "y"]);
/// table.add_rows(3);
/// table.set_cells(&[(0, "x", "1"), (1, "x", "2"), (2, "x", "3")]).unwrap();
/// assert_eq!(table.get(1, "x").unwrap(), "2");
///
/// table.delete_rows(&[0]).unwrap();
/// assert_eq!(table.row_count(), 2);
/// assert_eq!(table.get(0, "x").unwrap(), "2");
///
/// table.undo();
/// assert_eq!(table.row_count(), 3);
/// assert_eq!(table.get(0, "x").unwrap(), "1");
/// ```

use crate::action::{Action, CellChange, History, Placement};
use crate::config::TableConfig;
use crate::error::{Result, TableError};
use crate::evaluator::CellEvaluator;
use crate::index::{resolve_index, resolve_indices, resolve_unique_indices, LogicalOrder};
use crate::interner::{InternerStats, StringId, StringInterner};
use crate::store::{ColumnId, RowId, RowStore};
use log::{debug, trace, warn};
use std::collections::{HashMap, HashSet};

pub struct Table {
    pub(crate) interner: StringInterner,
    pub(crate) store: RowStore,
    /// Column arena: `ColumnId` -> interned name
    pub(crate) columns: Vec<StringId>,
    /// Names of the currently visible columns
    pub(crate) name_pool: HashMap<StringId, ColumnId>,
    pub(crate) row_order: LogicalOrder<RowId>,
    pub(crate) col_order: LogicalOrder<ColumnId>,
    pub(crate) history: History,
    /// Handle of the empty string
    pub(crate) empty: StringId,
    evaluator: Option<Box<dyn CellEvaluator>>,
    eval_errors: HashMap<(RowId, ColumnId), String>,
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

impl Table {
    /// Create an empty table (no rows, no columns) with unlimited history.
    pub fn new() -> Self {
        Self::with_config(TableConfig::default())
    }

    pub fn with_config(config: TableConfig) -> Self {
        let mut interner = StringInterner::new();
        let empty = interner.intern("");
        Table {
            interner,
            store: RowStore::new(),
            columns: Vec::new(),
            name_pool: HashMap::new(),
            row_order: LogicalOrder::new(),
            col_order: LogicalOrder::new(),
            history: History::new(config.history_limit),
            empty,
            evaluator: None,
            eval_errors: HashMap::new(),
        }
    }

    pub fn config(&self) -> TableConfig {
        TableConfig {
            history_limit: self.history.limit(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.row_order.len()
    }

    pub fn col_count(&self) -> usize {
        self.col_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_order.is_empty()
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    pub fn interner_stats(&self) -> InternerStats {
        self.interner.stats()
    }

    // ========================================================================
    // Lookup helpers
    // ========================================================================

    fn column_by_name(&self, name: &str) -> Result<ColumnId> {
        self.interner
            .get(name)
            .and_then(|id| self.name_pool.get(&id).copied())
            .ok_or_else(|| TableError::KeyNotFound(name.to_string()))
    }

    pub(crate) fn column_name(&self, column: ColumnId) -> &str {
        self.interner.resolve(self.columns[column]).unwrap_or_default()
    }

    pub(crate) fn cell_value(&self, row: RowId, column: ColumnId) -> &str {
        self.store
            .get_cell(row, column)
            .and_then(|id| self.interner.resolve(id))
            .unwrap_or_default()
    }

    /// Physical identity of the row at a logical index
    pub fn row_id(&self, row: i64) -> Result<RowId> {
        self.row_order.resolve(row)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Cell value by logical row and column name
    pub fn get(&self, row: i64, column: &str) -> Result<&str> {
        let (row, column) = self.locate(row, column)?;
        Ok(self.cell_value(row, column))
    }

    /// Cell value by logical row and logical column index
    pub fn get_at(&self, row: i64, column: i64) -> Result<&str> {
        let (row, column) = self.locate_at(row, column)?;
        Ok(self.cell_value(row, column))
    }

    /// All `(column, value)` pairs of a row, in logical column order
    pub fn row(&self, row: i64) -> Result<Vec<(&str, &str)>> {
        let row = self.row_order.resolve(row)?;
        Ok(self
            .col_order
            .iter()
            .map(|column| (self.column_name(column), self.cell_value(row, column)))
            .collect())
    }

    pub fn col_name(&self, column: i64) -> Result<&str> {
        let column = self.col_order.resolve(column)?;
        Ok(self.column_name(column))
    }

    /// Logical index of a named column
    pub fn col_index(&self, name: &str) -> Option<usize> {
        let column = self.column_by_name(name).ok()?;
        self.col_order.position(column)
    }

    pub fn has_col(&self, name: &str) -> bool {
        self.column_by_name(name).is_ok()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.col_order.iter().map(|column| self.column_name(column)).collect()
    }

    /// Iterate over rows in logical order, each as values in logical column order
    pub fn iter_rows(&self) -> TableRowIterator<'_> {
        TableRowIterator {
            table: self,
            index: 0,
        }
    }

    // ========================================================================
    // Cell writes
    // ========================================================================

    pub fn set(&mut self, row: i64, column: &str, value: &str) -> Result<()> {
        self.set_cells(&[(row, column, value)])
    }

    pub fn set_at(&mut self, row: i64, column: i64, value: &str) -> Result<()> {
        self.set_cells_at(&[(row, column, value)])
    }

    /// Write a batch of `(row, column name, value)` cells as one undo step.
    ///
    /// Every target is resolved before anything is written; if one entry is
    /// invalid the table is left untouched.
    pub fn set_cells(&mut self, items: &[(i64, &str, &str)]) -> Result<()> {
        let targets = items
            .iter()
            .map(|&(row, column, value)| self.locate(row, column).map(|(r, c)| (r, c, value)))
            .collect::<Result<Vec<_>>>()?;
        self.commit_cells(targets)
    }

    /// Write a batch of `(row, column index, value)` cells as one undo step.
    pub fn set_cells_at(&mut self, items: &[(i64, i64, &str)]) -> Result<()> {
        let targets = items
            .iter()
            .map(|&(row, column, value)| self.locate_at(row, column).map(|(r, c)| (r, c, value)))
            .collect::<Result<Vec<_>>>()?;
        self.commit_cells(targets)
    }

    fn locate(&self, row: i64, column: &str) -> Result<(RowId, ColumnId)> {
        Ok((self.row_order.resolve(row)?, self.column_by_name(column)?))
    }

    fn locate_at(&self, row: i64, column: i64) -> Result<(RowId, ColumnId)> {
        Ok((self.row_order.resolve(row)?, self.col_order.resolve(column)?))
    }

    /// Reset a batch of cells to the empty string as one undo step.
    pub fn clear_cells(&mut self, cells: &[(i64, &str)]) -> Result<()> {
        let items: Vec<(i64, &str, &str)> = cells.iter().map(|&(row, column)| (row, column, "")).collect();
        self.set_cells(&items)
    }

    pub fn clear_cells_at(&mut self, cells: &[(i64, i64)]) -> Result<()> {
        let items: Vec<(i64, i64, &str)> = cells.iter().map(|&(row, column)| (row, column, "")).collect();
        self.set_cells_at(&items)
    }

    fn commit_cells(&mut self, targets: Vec<(RowId, ColumnId, &str)>) -> Result<()> {
        if targets.is_empty() {
            return Ok(());
        }

        let mut changes = Vec::with_capacity(targets.len());
        for (row, column, value) in targets {
            let new_value = self.interner.intern(value);
            let old_value = self.store.set_cell(row, column, new_value)?.unwrap_or(self.empty);
            changes.push(CellChange {
                row,
                column,
                old_value,
                new_value,
            });
        }

        self.evaluate_changes(&changes, false);
        self.commit(Action::SetCells { changes });
        Ok(())
    }

    // ========================================================================
    // Row structure
    // ========================================================================

    pub fn add_row(&mut self) {
        self.add_rows(1);
    }

    /// Append `count` empty rows at the end.
    pub fn add_rows(&mut self, count: usize) {
        if count == 0 {
            return;
        }

        let mut rows = Vec::with_capacity(count);
        for _ in 0..count {
            let id = self.store.push_empty();
            let position = self.row_order.len();
            self.row_order.push(id);
            rows.push(Placement { position, id });
        }
        self.commit(Action::AddRows { rows });
    }

    /// Insert one empty row before each given logical index.
    ///
    /// Indices are resolved against `row_count() + 1`, so `row_count()` (or
    /// `-1`) inserts at the end.
    pub fn insert_rows(&mut self, indices: &[i64]) -> Result<()> {
        let positions = resolve_indices(indices, self.row_order.len() + 1)?;
        if positions.is_empty() {
            return Ok(());
        }

        let mut rows = Vec::with_capacity(positions.len());
        for position in positions {
            let id = self.store.push_empty();
            self.row_order.insert_at(position, id)?;
            rows.push(Placement { position, id });
        }
        self.commit(Action::AddRows { rows });
        Ok(())
    }

    /// Copy each given row and place the copy directly below its source.
    ///
    /// All sources are resolved against the row count before the batch, so
    /// duplicating neighbouring rows copies the rows the caller named.
    pub fn duplicate_rows(&mut self, indices: &[i64]) -> Result<()> {
        let positions = resolve_indices(indices, self.row_order.len())?;
        if positions.is_empty() {
            return Ok(());
        }

        let mut rows = Vec::with_capacity(positions.len());
        for position in positions {
            let source = self.row_order.as_slice()[position];
            let id = self.store.duplicate(source)?;
            self.row_order.insert_at(position + 1, id)?;
            rows.push(Placement {
                position: position + 1,
                id,
            });
        }
        self.evaluate_rows(&rows);
        self.commit(Action::AddRows { rows });
        Ok(())
    }

    /// Remove rows from the logical order. Repeated indices are collapsed.
    pub fn delete_rows(&mut self, indices: &[i64]) -> Result<()> {
        let positions = resolve_unique_indices(indices, self.row_order.len())?;
        if positions.is_empty() {
            return Ok(());
        }

        let mut rows = Vec::with_capacity(positions.len());
        for position in positions {
            let id = self.row_order.erase_at(position)?;
            rows.push(Placement { position, id });
        }
        self.forget_rows(&rows);
        self.commit(Action::DeleteRows { rows });
        Ok(())
    }

    pub fn move_row(&mut self, from: i64, to: i64) -> Result<()> {
        let len = self.row_order.len();
        let from = resolve_index(from, len)?;
        let to = resolve_index(to, len)?;
        if from == to {
            return Ok(());
        }

        self.row_order.move_item(from, to)?;
        self.commit(Action::MoveRow { from, to });
        Ok(())
    }

    // ========================================================================
    // Column structure
    // ========================================================================

    /// Add a column at the end. Returns false if the name already exists.
    pub fn add_col(&mut self, name: &str) -> bool {
        self.add_cols(&[name]) == 1
    }

    /// Add columns at the end, skipping names that already exist (including
    /// names repeated earlier in the same batch). Names are case-sensitive.
    ///
    /// Returns the number of columns created. When nothing is created no
    /// action is recorded.
    pub fn add_cols(&mut self, names: &[&str]) -> usize {
        let mut cols = Vec::new();
        for &name in names {
            let name_id = self.interner.intern(name);
            if self.name_pool.contains_key(&name_id) {
                continue;
            }

            let column = self.columns.len();
            self.columns.push(name_id);
            self.name_pool.insert(name_id, column);
            self.store.backfill(column, self.empty);

            let position = self.col_order.len();
            self.col_order.push(column);
            cols.push(Placement { position, id: column });
        }

        let created = cols.len();
        if created > 0 {
            self.commit(Action::AddCols { cols });
        }
        created
    }

    pub fn delete_col(&mut self, name: &str) -> Result<()> {
        self.delete_cols(&[name])
    }

    /// Delete columns by name. Fails with `KeyNotFound` before deleting
    /// anything if any name is unknown.
    pub fn delete_cols(&mut self, names: &[&str]) -> Result<()> {
        let mut positions = Vec::with_capacity(names.len());
        for &name in names {
            let column = self.column_by_name(name)?;
            let position = self
                .col_order
                .position(column)
                .ok_or_else(|| TableError::KeyNotFound(name.to_string()))?;
            positions.push(position);
        }
        positions.sort_unstable_by(|a, b| b.cmp(a));
        positions.dedup();
        self.remove_cols(positions)
    }

    /// Delete columns by logical index.
    pub fn delete_cols_at(&mut self, indices: &[i64]) -> Result<()> {
        let positions = resolve_unique_indices(indices, self.col_order.len())?;
        self.remove_cols(positions)
    }

    /// `positions` must be unique and sorted descending
    fn remove_cols(&mut self, positions: Vec<usize>) -> Result<()> {
        if positions.is_empty() {
            return Ok(());
        }

        let mut cols = Vec::with_capacity(positions.len());
        for position in positions {
            let column = self.col_order.erase_at(position)?;
            self.name_pool.remove(&self.columns[column]);
            cols.push(Placement {
                position,
                id: column,
            });
        }
        self.forget_cols(&cols);
        self.commit(Action::DeleteCols { cols });
        Ok(())
    }

    pub fn move_col(&mut self, from: i64, to: i64) -> Result<()> {
        let len = self.col_order.len();
        let from = resolve_index(from, len)?;
        let to = resolve_index(to, len)?;
        if from == to {
            return Ok(());
        }

        self.col_order.move_item(from, to)?;
        self.commit(Action::MoveCol { from, to });
        Ok(())
    }

    // ========================================================================
    // Undo / redo
    // ========================================================================

    fn commit(&mut self, action: Action) {
        debug!("commit {} ({} entries)", action.name(), action.len());
        self.history.record(action);
    }

    /// Revert the most recent action. Returns false if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(action) = self.history.pop_undo() else {
            return false;
        };
        trace!("undo {} ({} entries)", action.name(), action.len());
        self.revert(&action);
        self.history.push_redo(action);
        true
    }

    /// Re-apply the most recently undone action. Returns false if there was
    /// nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(action) = self.history.pop_redo() else {
            return false;
        };
        trace!("redo {} ({} entries)", action.name(), action.len());
        self.replay(&action);
        self.history.push_undo_for_redo(action);
        true
    }

    fn replay(&mut self, action: &Action) {
        match action {
            Action::SetCells { changes } => {
                for change in changes {
                    self.store.write(change.row, change.column, change.new_value);
                }
                self.evaluate_changes(changes, false);
            }
            Action::AddRows { rows } => {
                for placement in rows {
                    self.row_order.splice_in(placement.position, placement.id);
                }
                self.evaluate_rows(rows);
            }
            Action::DeleteRows { rows } => {
                for placement in rows {
                    self.row_order.splice_out(placement.position);
                }
                self.forget_rows(rows);
            }
            Action::AddCols { cols } => {
                for placement in cols {
                    self.col_order.splice_in(placement.position, placement.id);
                    self.name_pool.insert(self.columns[placement.id], placement.id);
                }
                self.evaluate_cols(cols);
            }
            Action::DeleteCols { cols } => {
                for placement in cols {
                    self.col_order.splice_out(placement.position);
                    self.name_pool.remove(&self.columns[placement.id]);
                }
                self.forget_cols(cols);
            }
            Action::MoveRow { from, to } => self.row_order.splice_move(*from, *to),
            Action::MoveCol { from, to } => self.col_order.splice_move(*from, *to),
        }
    }

    fn revert(&mut self, action: &Action) {
        match action {
            Action::SetCells { changes } => {
                for change in changes.iter().rev() {
                    self.store.write(change.row, change.column, change.old_value);
                }
                self.evaluate_changes(changes, true);
            }
            Action::AddRows { rows } => {
                for placement in rows.iter().rev() {
                    self.row_order.splice_out(placement.position);
                }
                self.forget_rows(rows);
            }
            Action::DeleteRows { rows } => {
                for placement in rows.iter().rev() {
                    self.row_order.splice_in(placement.position, placement.id);
                }
                self.evaluate_rows(rows);
            }
            Action::AddCols { cols } => {
                for placement in cols.iter().rev() {
                    self.col_order.splice_out(placement.position);
                    self.name_pool.remove(&self.columns[placement.id]);
                }
                self.forget_cols(cols);
            }
            Action::DeleteCols { cols } => {
                for placement in cols.iter().rev() {
                    self.col_order.splice_in(placement.position, placement.id);
                    self.name_pool.insert(self.columns[placement.id], placement.id);
                }
                self.evaluate_cols(cols);
            }
            Action::MoveRow { from, to } => self.row_order.splice_move(*to, *from),
            Action::MoveCol { from, to } => self.col_order.splice_move(*to, *from),
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_len(&self) -> usize {
        self.history.undo_len()
    }

    pub fn redo_len(&self) -> usize {
        self.history.redo_len()
    }

    /// The action the next `undo` would revert
    pub fn last_action(&self) -> Option<&Action> {
        self.history.peek_undo()
    }

    /// The action the next `redo` would re-apply
    pub fn redo_action(&self) -> Option<&Action> {
        self.history.peek_redo()
    }

    /// True if the table differs from the state last marked as saved.
    pub fn is_modified(&self) -> bool {
        self.history.is_modified()
    }

    pub fn mark_saved(&mut self) {
        self.history.mark_saved();
    }

    /// Forget all undo/redo history. The current state counts as saved.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    // ========================================================================
    // Cell evaluation
    // ========================================================================

    /// Install an evaluator that is called for every committed cell value.
    ///
    /// Non-empty cells are also evaluated when their row or column becomes
    /// visible (duplicated rows, undo of a delete, redo of an add). Errors
    /// of cells that leave the table are dropped.
    pub fn set_evaluator(&mut self, evaluator: impl CellEvaluator + 'static) {
        self.evaluator = Some(Box::new(evaluator));
        self.eval_errors.clear();
    }

    pub fn clear_evaluator(&mut self) {
        self.evaluator = None;
        self.eval_errors.clear();
    }

    /// Most recent evaluation failure of a cell, if any
    pub fn evaluation_error(&self, row: i64, column: &str) -> Result<Option<&str>> {
        let (row, column) = self.locate(row, column)?;
        Ok(self.eval_errors.get(&(row, column)).map(String::as_str))
    }

    /// Evaluate the cells of a batch in the order they were written. On undo
    /// the old values are written back last-to-first, so they are evaluated
    /// in that order too.
    fn evaluate_changes(&mut self, changes: &[CellChange], use_old: bool) {
        if self.evaluator.is_none() {
            return;
        }

        let cells: Vec<(RowId, ColumnId, StringId)> = if use_old {
            changes
                .iter()
                .rev()
                .map(|change| (change.row, change.column, change.old_value))
                .collect()
        } else {
            changes
                .iter()
                .map(|change| (change.row, change.column, change.new_value))
                .collect()
        };
        self.evaluate_cells(cells);
    }

    /// Evaluate the non-empty cells of rows that just became visible
    fn evaluate_rows(&mut self, rows: &[Placement<RowId>]) {
        if self.evaluator.is_none() {
            return;
        }

        let mut cells = Vec::new();
        for placement in rows {
            for column in self.col_order.iter() {
                match self.store.get_cell(placement.id, column) {
                    Some(value) if value != self.empty => cells.push((placement.id, column, value)),
                    _ => {}
                }
            }
        }
        self.evaluate_cells(cells);
    }

    /// Evaluate the non-empty cells of columns that just became visible
    fn evaluate_cols(&mut self, cols: &[Placement<ColumnId>]) {
        if self.evaluator.is_none() {
            return;
        }

        let mut cells = Vec::new();
        for row in self.row_order.iter() {
            for placement in cols {
                match self.store.get_cell(row, placement.id) {
                    Some(value) if value != self.empty => cells.push((row, placement.id, value)),
                    _ => {}
                }
            }
        }
        self.evaluate_cells(cells);
    }

    fn evaluate_cells(&mut self, cells: Vec<(RowId, ColumnId, StringId)>) {
        let Some(evaluator) = self.evaluator.as_mut() else {
            return;
        };

        for (row, column, value) in cells {
            let name = self.interner.resolve(self.columns[column]).unwrap_or_default();
            let text = self.interner.resolve(value).unwrap_or_default();
            match evaluator.evaluate(row, name, text) {
                Ok(()) => {
                    self.eval_errors.remove(&(row, column));
                }
                Err(err) => {
                    warn!("evaluation of row {} column '{}' failed: {}", row, name, err);
                    self.eval_errors.insert((row, column), err.message);
                }
            }
        }
    }

    /// Drop evaluation errors of rows that left the logical order
    fn forget_rows(&mut self, rows: &[Placement<RowId>]) {
        if self.eval_errors.is_empty() {
            return;
        }
        let gone: HashSet<RowId> = rows.iter().map(|placement| placement.id).collect();
        self.eval_errors.retain(|(row, _), _| !gone.contains(row));
    }

    /// Drop evaluation errors of columns that left the logical order
    fn forget_cols(&mut self, cols: &[Placement<ColumnId>]) {
        if self.eval_errors.is_empty() {
            return;
        }
        let gone: HashSet<ColumnId> = cols.iter().map(|placement| placement.id).collect();
        self.eval_errors.retain(|(_, column), _| !gone.contains(column));
    }

    pub(crate) fn reset_evaluation_errors(&mut self) {
        self.eval_errors.clear();
    }

    /// Move the contents of `other` into `self`, keeping this table's
    /// evaluator. History is cleared.
    pub(crate) fn replace_contents(&mut self, other: Table) {
        self.interner = other.interner;
        self.store = other.store;
        self.columns = other.columns;
        self.name_pool = other.name_pool;
        self.row_order = other.row_order;
        self.col_order = other.col_order;
        self.empty = other.empty;
        self.history.clear();
        self.reset_evaluation_errors();
    }

    /// Append a row without recording history. Used when building a table
    /// from external data.
    pub(crate) fn push_row_unrecorded<'a>(&mut self, cells: impl IntoIterator<Item = (ColumnId, &'a str)>) {
        let id = self.store.push_empty();
        for (column, value) in cells {
            let value = self.interner.intern(value);
            self.store.write(id, column, value);
        }
        self.row_order.push(id);
    }
}

pub struct TableRowIterator<'a> {
    table: &'a Table,
    index: usize,
}

impl<'a> Iterator for TableRowIterator<'a> {
    type Item = Vec<&'a str>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.table.row_order.get(self.index)?;
        self.index += 1;
        Some(
            self.table
                .col_order
                .iter()
                .map(|column| self.table.cell_value(row, column))
                .collect(),
        )
    }
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Table {{ columns: {}, rows: {}, undo: {}, redo: {} }}",
            self.col_count(),
            self.row_count(),
            self.undo_len(),
            self.redo_len()
        )
    }
}
