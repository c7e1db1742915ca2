/// Row Store for tabledit
///
/// Append-only physical storage. A row is created once, gets the next
/// `RowId`, and never moves or disappears; deleting a row only removes it
/// from the logical order. Each row maps column identity to an interned
/// value, and a column the row has never seen reads as the empty string.

use crate::error::{Result, TableError};
use crate::interner::StringId;
use std::collections::HashMap;

/// Physical row identity (index into the store, never reused)
pub type RowId = usize;

/// Physical column identity (index into the table's column arena, never reused)
pub type ColumnId = usize;

/// One physical row: column identity -> interned value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    cells: HashMap<ColumnId, StringId>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column: ColumnId) -> Option<StringId> {
        self.cells.get(&column).copied()
    }

    /// Store a value, returning the previous one
    pub fn set(&mut self, column: ColumnId, value: StringId) -> Option<StringId> {
        self.cells.insert(column, value)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RowStore {
    rows: Vec<Row>,
}

impl RowStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn append(&mut self, row: Row) -> RowId {
        self.rows.push(row);
        self.rows.len() - 1
    }

    pub fn push_empty(&mut self) -> RowId {
        self.append(Row::new())
    }

    /// Copy a row into a new physical slot. The copy shares interned handles.
    pub fn duplicate(&mut self, id: RowId) -> Result<RowId> {
        let copy = self.row(id)?.clone();
        Ok(self.append(copy))
    }

    pub fn row(&self, id: RowId) -> Result<&Row> {
        self.rows
            .get(id)
            .ok_or_else(|| TableError::out_of_range(id as i64, self.rows.len()))
    }

    pub fn get_cell(&self, id: RowId, column: ColumnId) -> Option<StringId> {
        self.rows.get(id).and_then(|row| row.get(column))
    }

    pub fn set_cell(&mut self, id: RowId, column: ColumnId, value: StringId) -> Result<Option<StringId>> {
        let len = self.rows.len();
        let row = self
            .rows
            .get_mut(id)
            .ok_or_else(|| TableError::out_of_range(id as i64, len))?;
        Ok(row.set(column, value))
    }

    /// Overwrite a cell of a row known to exist (ids taken from the logical
    /// order or from recorded history).
    pub(crate) fn write(&mut self, id: RowId, column: ColumnId, value: StringId) {
        self.rows[id].set(column, value);
    }

    /// Give every row that lacks `column` the value `empty`.
    pub fn backfill(&mut self, column: ColumnId, empty: StringId) {
        for row in &mut self.rows {
            row.cells.entry(column).or_insert(empty);
        }
    }
}
