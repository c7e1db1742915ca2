/// Error types for tabledit
///
/// Every fallible table operation reports one of these synchronously.
/// Nothing is retried internally, and batched operations validate every
/// target before touching the table, so an `Err` always means "nothing changed".

/// All errors that can occur while reading, editing or loading a table.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// A row or column position fell outside `[0, len)` after negative adjustment.
    #[error("Index {index} out of range [0, {len})")]
    IndexOutOfRange { index: i64, len: usize },

    /// A named column does not exist.
    #[error("Column '{0}' not found")]
    KeyNotFound(String),

    /// A persisted snapshot is structurally invalid.
    #[error("Invalid table state: {0}")]
    InvalidState(String),

    /// Snapshot (de)serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TableError {
    pub(crate) fn out_of_range(index: i64, len: usize) -> Self {
        TableError::IndexOutOfRange { index, len }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        TableError::InvalidState(message.into())
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TableError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = TableError::out_of_range(-6, 5);
        assert_eq!(err.to_string(), "Index -6 out of range [0, 5)");

        let err = TableError::KeyNotFound("price".to_string());
        assert_eq!(err.to_string(), "Column 'price' not found");
    }
}
