/// Python bindings for tabledit using PyO3
///
/// Exposes `Table` as a Python class. Rows are addressed by (possibly
/// negative) integers; columns by name or by integer position.
///
/// Error mapping: `IndexOutOfRange` -> `IndexError`, `KeyNotFound` ->
/// `KeyError`, `InvalidState` and JSON failures -> `ValueError`.

use pyo3::exceptions::{PyIndexError, PyKeyError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::config::TableConfig;
use crate::error::TableError;
use crate::evaluator::{CellEvaluator, EvalError};
use crate::store::RowId;
use crate::table::Table as RustTable;

impl From<TableError> for PyErr {
    fn from(err: TableError) -> PyErr {
        match err {
            TableError::IndexOutOfRange { .. } => PyIndexError::new_err(err.to_string()),
            TableError::KeyNotFound(_) => PyKeyError::new_err(err.to_string()),
            TableError::InvalidState(_) | TableError::Json(_) => PyValueError::new_err(err.to_string()),
        }
    }
}

/// A column given either by name or by logical position
#[derive(FromPyObject)]
enum ColumnKey {
    Index(i64),
    Name(String),
}

impl ColumnKey {
    /// Resolve to a column name against the current table
    fn name(&self, table: &RustTable) -> PyResult<String> {
        match self {
            ColumnKey::Index(index) => Ok(table.col_name(*index)?.to_string()),
            ColumnKey::Name(name) => Ok(name.clone()),
        }
    }

    /// Resolve to a logical column index against the current table
    fn index(&self, table: &RustTable) -> PyResult<i64> {
        match self {
            ColumnKey::Index(index) => Ok(*index),
            ColumnKey::Name(name) => table
                .col_index(name)
                .map(|i| i as i64)
                .ok_or_else(|| TableError::KeyNotFound(name.clone()).into()),
        }
    }
}

/// Forwards committed cell values to a Python callable `f(row_id, column, value)`.
/// Any exception raised by the callable is recorded as the cell's evaluation error.
struct PyEvaluator {
    callback: Py<PyAny>,
}

impl CellEvaluator for PyEvaluator {
    fn evaluate(&mut self, row: RowId, column: &str, value: &str) -> Result<(), EvalError> {
        Python::with_gil(|py| {
            self.callback
                .call1(py, (row, column, value))
                .map(|_| ())
                .map_err(|err| EvalError::new(err.to_string()))
        })
    }
}

#[pyclass(name = "Table")]
pub struct PyTable {
    inner: RustTable,
}

#[pymethods]
impl PyTable {
    /// Create an empty table.
    ///
    /// Args:
    ///     history_limit: Maximum number of undo steps kept (None = unlimited)
    #[new]
    #[pyo3(signature = (history_limit=None))]
    fn new(history_limit: Option<usize>) -> Self {
        PyTable {
            inner: RustTable::with_config(TableConfig { history_limit }),
        }
    }

    fn __len__(&self) -> usize {
        self.inner.row_count()
    }

    fn __repr__(&self) -> String {
        format!(
            "Table(rows={}, columns={})",
            self.inner.row_count(),
            self.inner.col_count()
        )
    }

    fn __str__(&self) -> String {
        self.inner.to_string()
    }

    #[getter]
    fn row_count(&self) -> usize {
        self.inner.row_count()
    }

    #[getter]
    fn col_count(&self) -> usize {
        self.inner.col_count()
    }

    fn column_names(&self) -> Vec<String> {
        self.inner.column_names().into_iter().map(String::from).collect()
    }

    // === Cells ===

    fn get(&self, row: i64, column: ColumnKey) -> PyResult<String> {
        let value = match column {
            ColumnKey::Index(index) => self.inner.get_at(row, index)?,
            ColumnKey::Name(name) => self.inner.get(row, &name)?,
        };
        Ok(value.to_string())
    }

    /// Return a row as a dict of column name -> value (logical column order)
    fn row<'py>(&self, py: Python<'py>, row: i64) -> PyResult<Bound<'py, PyDict>> {
        let dict = PyDict::new_bound(py);
        for (name, value) in self.inner.row(row)? {
            dict.set_item(name, value)?;
        }
        Ok(dict)
    }

    fn set(&mut self, row: i64, column: ColumnKey, value: &str) -> PyResult<()> {
        match column {
            ColumnKey::Index(index) => self.inner.set_at(row, index, value)?,
            ColumnKey::Name(name) => self.inner.set(row, &name, value)?,
        }
        Ok(())
    }

    /// Set many cells as one undo step: `[(row, column, value), ...]`
    fn set_cells(&mut self, items: Vec<(i64, ColumnKey, String)>) -> PyResult<()> {
        let resolved = items
            .iter()
            .map(|(row, column, value)| column.name(&self.inner).map(|name| (*row, name, value.as_str())))
            .collect::<PyResult<Vec<(i64, String, &str)>>>()?;
        let borrowed: Vec<(i64, &str, &str)> = resolved
            .iter()
            .map(|(row, column, value)| (*row, column.as_str(), *value))
            .collect();
        self.inner.set_cells(&borrowed)?;
        Ok(())
    }

    /// Reset cells to empty as one undo step: `[(row, column), ...]`
    fn clear_cells(&mut self, cells: Vec<(i64, ColumnKey)>) -> PyResult<()> {
        let resolved = cells
            .iter()
            .map(|(row, column)| column.index(&self.inner).map(|index| (*row, index)))
            .collect::<PyResult<Vec<(i64, i64)>>>()?;
        self.inner.clear_cells_at(&resolved)?;
        Ok(())
    }

    // === Rows ===

    fn add_row(&mut self) {
        self.inner.add_row();
    }

    fn add_rows(&mut self, count: usize) {
        self.inner.add_rows(count);
    }

    fn insert_rows(&mut self, indices: Vec<i64>) -> PyResult<()> {
        Ok(self.inner.insert_rows(&indices)?)
    }

    fn duplicate_rows(&mut self, indices: Vec<i64>) -> PyResult<()> {
        Ok(self.inner.duplicate_rows(&indices)?)
    }

    fn delete_rows(&mut self, indices: Vec<i64>) -> PyResult<()> {
        Ok(self.inner.delete_rows(&indices)?)
    }

    fn move_row(&mut self, from: i64, to: i64) -> PyResult<()> {
        Ok(self.inner.move_row(from, to)?)
    }

    // === Columns ===

    /// Add a column. Returns False if the name already exists.
    fn add_col(&mut self, name: &str) -> bool {
        self.inner.add_col(name)
    }

    /// Add columns, skipping existing names. Returns the number created.
    fn add_cols(&mut self, names: Vec<String>) -> usize {
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        self.inner.add_cols(&names)
    }

    /// Delete columns given by name or position, as one undo step
    fn delete_cols(&mut self, columns: Vec<ColumnKey>) -> PyResult<()> {
        let indices = columns
            .iter()
            .map(|column| column.index(&self.inner))
            .collect::<PyResult<Vec<i64>>>()?;
        Ok(self.inner.delete_cols_at(&indices)?)
    }

    fn move_col(&mut self, from: i64, to: i64) -> PyResult<()> {
        Ok(self.inner.move_col(from, to)?)
    }

    // === History ===

    fn undo(&mut self) -> bool {
        self.inner.undo()
    }

    fn redo(&mut self) -> bool {
        self.inner.redo()
    }

    fn can_undo(&self) -> bool {
        self.inner.can_undo()
    }

    fn can_redo(&self) -> bool {
        self.inner.can_redo()
    }

    fn is_modified(&self) -> bool {
        self.inner.is_modified()
    }

    fn mark_saved(&mut self) {
        self.inner.mark_saved();
    }

    fn clear_history(&mut self) {
        self.inner.clear_history();
    }

    // === Evaluation ===

    /// Install a callable `f(row_id, column, value)` invoked for every
    /// committed cell value, or remove it with None.
    #[pyo3(signature = (callback=None))]
    fn set_evaluator(&mut self, callback: Option<Py<PyAny>>) {
        match callback {
            Some(callback) => self.inner.set_evaluator(PyEvaluator { callback }),
            None => self.inner.clear_evaluator(),
        }
    }

    fn evaluation_error(&self, row: i64, column: ColumnKey) -> PyResult<Option<String>> {
        let name = column.name(&self.inner)?;
        Ok(self.inner.evaluation_error(row, &name)?.map(String::from))
    }

    // === Serialization ===

    fn to_csv(&self) -> String {
        self.inner.to_csv()
    }

    #[staticmethod]
    fn from_csv(csv: &str) -> PyResult<Self> {
        Ok(PyTable {
            inner: RustTable::from_csv(csv)?,
        })
    }

    fn to_json(&self) -> PyResult<String> {
        Ok(self.inner.to_json()?)
    }

    #[staticmethod]
    fn from_json(json: &str) -> PyResult<Self> {
        Ok(PyTable {
            inner: RustTable::from_json(json)?,
        })
    }

    /// Replace the contents with a JSON snapshot, clearing history
    fn load_json(&mut self, json: &str) -> PyResult<()> {
        let snapshot = crate::snapshot::TableSnapshot::from_json(json)?;
        Ok(self.inner.load_snapshot(snapshot)?)
    }

    /// Returns a dict with: unique_strings, total_references, memory_bytes
    fn interner_stats<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let stats = self.inner.interner_stats();
        let dict = PyDict::new_bound(py);
        dict.set_item("unique_strings", stats.unique_strings)?;
        dict.set_item("total_references", stats.total_references)?;
        dict.set_item("memory_bytes", stats.memory_bytes)?;
        Ok(dict)
    }
}

// ============================================================================
// Module Definition
// ============================================================================

/// Python module for tabledit
#[pymodule]
fn tabledit(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyTable>()?;
    Ok(())
}
