/// tabledit - Editable In-Memory String Table
///
/// An ordered grid of string cells built for interactive editing: every
/// mutation is a single undoable step, rows and columns keep a stable
/// physical identity while their visible order changes, and repeated cell
/// values share one interned copy.
///
/// Layers, bottom up:
/// - `interner`: content-addressed string pool handing out `StringId`s
/// - `store`: append-only physical rows
/// - `index`: logical <-> physical orders and negative index resolution
/// - `action`: the undo/redo log
/// - `table`: the facade tying them together
///
/// `snapshot`, `format` and `config` provide persistence, CSV/text output
/// and construction options. `evaluator` lets a host observe committed
/// values without the table knowing what they mean.

pub mod action;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod format;
pub mod index;
pub mod interner;
pub mod snapshot;
pub mod store;
pub mod table;

pub use action::{Action, CellChange, History, Placement};
pub use config::TableConfig;
pub use error::{Result, TableError};
pub use evaluator::{CellEvaluator, EvalError};
pub use index::LogicalOrder;
pub use interner::{InternerStats, StringId, StringInterner};
pub use snapshot::TableSnapshot;
pub use store::{ColumnId, RowId};
pub use table::{Table, TableRowIterator};

// Python bindings - only when python feature is enabled
#[cfg(feature = "python")]
mod python_bindings;
#[cfg(feature = "python")]
pub use python_bindings::*;
