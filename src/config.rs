/// Table configuration
///
/// ```
/// use tabledit::TableConfig;
///
/// let config = TableConfig::from_json(r#"{"history_limit": 50}"#).unwrap();
/// assert_eq!(config.history_limit, Some(50));
/// assert_eq!(TableConfig::default().history_limit, None);
/// ```

use crate::error::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Maximum number of undoable actions kept. `None` keeps everything.
    pub history_limit: Option<usize>,
}

impl TableConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = Some(limit);
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = TableConfig::from_json("{}").unwrap();
        assert_eq!(config, TableConfig::default());
    }

    #[test]
    fn test_builder() {
        let config = TableConfig::new().with_history_limit(3);
        assert_eq!(config.history_limit, Some(3));
    }

    #[test]
    fn test_invalid_json() {
        assert!(TableConfig::from_json("{\"history_limit\": -1}").is_err());
    }
}
