/// Pluggable cell evaluation
///
/// The table stores cell contents as opaque strings. A host that treats
/// those strings as code installs a `CellEvaluator`; the table calls it for
/// every value it commits through a cell write (including writes re-applied
/// by undo and redo) and remembers the most recent failure per cell.
///
/// Evaluation happens after the write commits. A failure never rolls the
/// write back.

use crate::store::RowId;

/// Failure reported by a `CellEvaluator`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct EvalError {
    pub message: String,
}

impl EvalError {
    pub fn new(message: impl Into<String>) -> Self {
        EvalError {
            message: message.into(),
        }
    }
}

/// Binds committed cell values in an external environment.
///
/// `row` is the physical row identity, which is stable across reordering.
/// An empty `value` means the binding for `column` should be removed.
pub trait CellEvaluator: Send {
    fn evaluate(&mut self, row: RowId, column: &str, value: &str) -> Result<(), EvalError>;
}

impl<F> CellEvaluator for F
where
    F: FnMut(RowId, &str, &str) -> Result<(), EvalError> + Send,
{
    fn evaluate(&mut self, row: RowId, column: &str, value: &str) -> Result<(), EvalError> {
        self(row, column, value)
    }
}
