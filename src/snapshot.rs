/// Persisted table state
///
/// A `TableSnapshot` is the serialisable form of a table's visible contents:
/// columns in logical order and one map of non-empty cells per logical row.
/// Cells missing from a row take their value from `default_row`, and from
/// the empty string if the default row does not name the column either.
///
/// History is not part of a snapshot. Loading one replaces the table
/// contents, clears undo/redo, and marks the loaded state as saved.
///
/// ```
/// use tabledit::{Table, TableSnapshot};
///
/// let mut table = Table::new();
/// table.add_cols(&["name", "qty"]);
/// table.add_row();
/// table.set(0, "name", "bolt").unwrap();
///
/// let json = table.snapshot().to_json().unwrap();
/// let restored = Table::from_snapshot(TableSnapshot::from_json(&json).unwrap()).unwrap();
/// assert_eq!(restored.get(0, "name").unwrap(), "bolt");
/// assert_eq!(restored.column_names(), vec!["name", "qty"]);
/// ```

use crate::config::TableConfig;
use crate::error::{Result, TableError};
use crate::table::Table;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSnapshot {
    /// Value of every cell a row does not list explicitly
    pub default_row: BTreeMap<String, String>,
    /// Logical row index -> column name -> value
    pub rows: BTreeMap<usize, BTreeMap<String, String>>,
    pub columns: BTreeSet<String>,
    /// Logical column order. Empty means sorted by name.
    pub column_order: Vec<String>,
    pub row_count: usize,
    pub col_count: usize,
}

impl TableSnapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check structural consistency and return the column order to load.
    pub fn validate(&self) -> Result<Vec<&str>> {
        if self.columns.len() != self.col_count {
            return Err(TableError::invalid(format!(
                "col_count is {} but {} columns are listed",
                self.col_count,
                self.columns.len()
            )));
        }

        let order: Vec<&str> = if self.column_order.is_empty() {
            self.columns.iter().map(String::as_str).collect()
        } else {
            let unique: BTreeSet<&str> = self.column_order.iter().map(String::as_str).collect();
            let is_permutation = self.column_order.len() == self.columns.len()
                && unique.len() == self.column_order.len()
                && unique.iter().all(|name| self.columns.contains(*name));
            if !is_permutation {
                return Err(TableError::invalid("column_order is not a permutation of columns"));
            }
            self.column_order.iter().map(String::as_str).collect()
        };

        if self.rows.len() != self.row_count || self.rows.keys().enumerate().any(|(i, &key)| i != key) {
            return Err(TableError::invalid(format!(
                "row keys must be exactly 0..{}",
                self.row_count
            )));
        }

        if let Some(name) = self.default_row.keys().find(|name| !self.columns.contains(*name)) {
            return Err(TableError::invalid(format!("default row names unknown column '{}'", name)));
        }
        for (index, row) in &self.rows {
            if let Some(name) = row.keys().find(|name| !self.columns.contains(*name)) {
                return Err(TableError::invalid(format!(
                    "row {} names unknown column '{}'",
                    index, name
                )));
            }
        }

        Ok(order)
    }
}

impl Table {
    /// Capture the visible contents of the table.
    pub fn snapshot(&self) -> TableSnapshot {
        let column_order: Vec<String> = self.column_names().into_iter().map(String::from).collect();
        let default_row: BTreeMap<String, String> = column_order
            .iter()
            .map(|name| (name.clone(), String::new()))
            .collect();

        let rows: BTreeMap<usize, BTreeMap<String, String>> = self
            .iter_rows()
            .enumerate()
            .map(|(index, values)| {
                let cells = column_order
                    .iter()
                    .zip(values)
                    .filter(|(_, value)| !value.is_empty())
                    .map(|(name, value)| (name.clone(), value.to_string()))
                    .collect();
                (index, cells)
            })
            .collect();

        TableSnapshot {
            default_row,
            rows,
            columns: column_order.iter().cloned().collect(),
            row_count: self.row_count(),
            col_count: self.col_count(),
            column_order,
        }
    }

    pub fn from_snapshot(snapshot: TableSnapshot) -> Result<Self> {
        Self::from_snapshot_with_config(snapshot, TableConfig::default())
    }

    pub fn from_snapshot_with_config(snapshot: TableSnapshot, config: TableConfig) -> Result<Self> {
        let order = snapshot.validate().inspect_err(|err| warn!("rejected snapshot: {}", err))?;

        let mut table = Table::with_config(config);
        table.add_cols(&order);
        let columns: Vec<_> = table.col_order.iter().collect();

        for row in snapshot.rows.values() {
            let cells: Vec<(usize, &str)> = order
                .iter()
                .zip(&columns)
                .map(|(name, &column)| {
                    let value = row
                        .get(*name)
                        .or_else(|| snapshot.default_row.get(*name))
                        .map(String::as_str)
                        .unwrap_or_default();
                    (column, value)
                })
                .collect();
            table.push_row_unrecorded(cells);
        }

        table.clear_history();
        debug!(
            "loaded snapshot with {} rows and {} columns",
            table.row_count(),
            table.col_count()
        );
        Ok(table)
    }

    /// Replace the contents of this table with a snapshot.
    ///
    /// On failure the table is left untouched. On success history is cleared
    /// and the loaded state counts as saved. An installed evaluator is kept.
    pub fn load_snapshot(&mut self, snapshot: TableSnapshot) -> Result<()> {
        let loaded = Self::from_snapshot_with_config(snapshot, self.config())?;
        self.replace_contents(loaded);
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        self.snapshot().to_json()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_snapshot(TableSnapshot::from_json(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut table = Table::new();
        table.add_cols(&["b", "a", "c"]);
        table.add_rows(2);
        table.set_cells(&[(0, "b", "1"), (1, "c", "x y")]).unwrap();
        table
    }

    fn named(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_snapshot_shape() {
        let snapshot = sample().snapshot();
        assert_eq!(snapshot.row_count, 2);
        assert_eq!(snapshot.col_count, 3);
        assert_eq!(snapshot.column_order, vec!["b", "a", "c"]);
        assert_eq!(snapshot.rows[&0], named(&[("b", "1")]));
        assert_eq!(snapshot.rows[&1], named(&[("c", "x y")]));
        assert_eq!(snapshot.default_row, named(&[("a", ""), ("b", ""), ("c", "")]));
    }

    #[test]
    fn test_round_trip_preserves_visible_state() {
        let mut table = sample();
        table.move_row(0, 1).unwrap();
        table.delete_col("a").unwrap();

        let restored = Table::from_json(&table.to_json().unwrap()).unwrap();
        assert_eq!(restored.column_names(), table.column_names());
        assert_eq!(restored.iter_rows().collect::<Vec<_>>(), table.iter_rows().collect::<Vec<_>>());
        assert!(!restored.can_undo());
        assert!(!restored.is_modified());
    }

    #[test]
    fn test_empty_column_order_means_sorted() {
        let mut snapshot = sample().snapshot();
        snapshot.column_order.clear();
        let table = Table::from_snapshot(snapshot).unwrap();
        assert_eq!(table.column_names(), vec!["a", "b", "c"]);
        assert_eq!(table.get(0, "b").unwrap(), "1");
    }

    #[test]
    fn test_default_row_fills_missing_cells() {
        let snapshot = TableSnapshot {
            default_row: named(&[("qty", "0")]),
            rows: [(0, named(&[])), (1, named(&[("qty", "5")]))].into_iter().collect(),
            columns: ["qty", "name"].iter().map(|s| s.to_string()).collect(),
            column_order: vec!["name".to_string(), "qty".to_string()],
            row_count: 2,
            col_count: 2,
        };
        let table = Table::from_snapshot(snapshot).unwrap();
        assert_eq!(table.get(0, "qty").unwrap(), "0");
        assert_eq!(table.get(1, "qty").unwrap(), "5");
        assert_eq!(table.get(0, "name").unwrap(), "");
    }

    #[test]
    fn test_rejects_inconsistent_snapshots() {
        let good = sample().snapshot();

        let mut bad = good.clone();
        bad.col_count = 4;
        assert!(matches!(Table::from_snapshot(bad), Err(TableError::InvalidState(_))));

        let mut bad = good.clone();
        bad.column_order = vec!["a".into(), "b".into(), "zzz".into()];
        assert!(Table::from_snapshot(bad).is_err());

        let mut bad = good.clone();
        bad.column_order = vec!["a".into(), "a".into(), "b".into()];
        assert!(Table::from_snapshot(bad).is_err());

        let mut bad = good.clone();
        let row = bad.rows.remove(&1).unwrap();
        bad.rows.insert(5, row);
        assert!(Table::from_snapshot(bad).is_err());

        let mut bad = good.clone();
        bad.rows.get_mut(&0).unwrap().insert("ghost".into(), "1".into());
        assert!(Table::from_snapshot(bad).is_err());

        let mut bad = good;
        bad.default_row.insert("ghost".into(), String::new());
        assert!(Table::from_snapshot(bad).is_err());
    }

    #[test]
    fn test_failed_load_leaves_table_untouched() {
        let mut table = sample();
        let mut bad = table.snapshot();
        bad.row_count = 7;

        assert!(table.load_snapshot(bad).is_err());
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.get(0, "b").unwrap(), "1");
        assert!(table.can_undo());
    }

    #[test]
    fn test_load_replaces_contents_and_history() {
        let mut table = sample();
        let mut other = Table::new();
        other.add_col("z");
        other.add_row();
        other.set(0, "z", "zz").unwrap();

        table.load_snapshot(other.snapshot()).unwrap();
        assert_eq!(table.column_names(), vec!["z"]);
        assert_eq!(table.get(0, "z").unwrap(), "zz");
        assert!(!table.can_undo());
        assert!(!table.undo());
        assert!(!table.is_modified());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(TableSnapshot::from_json("{not json"), Err(TableError::Json(_))));
        // Missing fields take defaults: the empty table
        let table = Table::from_json("{}").unwrap();
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.col_count(), 0);
    }
}
