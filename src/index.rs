/// Index Layer for tabledit
///
/// Callers address rows and columns by *logical* position; storage is
/// addressed by *physical* identity. A `LogicalOrder` is the permutation
/// between the two: position `i` holds the physical id shown at logical `i`.
///
/// Logical positions arrive as `i64` and may be negative, counting from the
/// end (`-1` is the last entry), resolved against the length at call time.

use crate::error::{Result, TableError};

/// Resolve a possibly-negative logical index against `len`.
///
/// ```
/// use tabledit::index::resolve_index;
///
/// assert_eq!(resolve_index(-1, 5).unwrap(), 4);
/// assert!(resolve_index(-6, 5).is_err());
/// assert!(resolve_index(5, 5).is_err());
/// ```
pub fn resolve_index(index: i64, len: usize) -> Result<usize> {
    let adjusted = if index < 0 { index + len as i64 } else { index };
    if adjusted < 0 || adjusted >= len as i64 {
        return Err(TableError::out_of_range(index, len));
    }
    Ok(adjusted as usize)
}

/// Resolve a list of logical indices against the same pre-operation `len`
/// and sort them descending.
///
/// Applying structural edits from the highest position down never shifts a
/// position that is still waiting to be processed, so a single pass behaves
/// as if every edit were computed against the unmodified sequence.
pub fn resolve_indices(indices: &[i64], len: usize) -> Result<Vec<usize>> {
    let mut resolved = indices
        .iter()
        .map(|&index| resolve_index(index, len))
        .collect::<Result<Vec<usize>>>()?;
    resolved.sort_unstable_by(|a, b| b.cmp(a));
    Ok(resolved)
}

/// Same as `resolve_indices`, with repeated targets collapsed.
/// Used where acting twice on one entry is meaningless (deletion).
pub fn resolve_unique_indices(indices: &[i64], len: usize) -> Result<Vec<usize>> {
    let mut resolved = resolve_indices(indices, len)?;
    resolved.dedup();
    Ok(resolved)
}

/// Ordered sequence of physical ids defining the visible order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalOrder<T: Copy + Eq> {
    data: Vec<T>,
}

impl<T: Copy + Eq> LogicalOrder<T> {
    pub fn new() -> Self {
        LogicalOrder { data: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<T> {
        self.data.get(position).copied()
    }

    /// Physical id at a possibly-negative logical index.
    pub fn resolve(&self, index: i64) -> Result<T> {
        let position = resolve_index(index, self.data.len())?;
        Ok(self.data[position])
    }

    /// Insert at `position`; `position == len` appends.
    pub fn insert_at(&mut self, position: usize, value: T) -> Result<()> {
        if position > self.data.len() {
            return Err(TableError::out_of_range(position as i64, self.data.len() + 1));
        }
        self.data.insert(position, value);
        Ok(())
    }

    pub fn push(&mut self, value: T) {
        self.data.push(value);
    }

    pub fn erase_at(&mut self, position: usize) -> Result<T> {
        if position >= self.data.len() {
            return Err(TableError::out_of_range(position as i64, self.data.len()));
        }
        Ok(self.data.remove(position))
    }

    /// Move the entry at `from` to `to` by rotating the inclusive range
    /// between them. Everything outside that range keeps its position.
    pub fn move_item(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.data.len();
        if from >= len {
            return Err(TableError::out_of_range(from as i64, len));
        }
        if to >= len {
            return Err(TableError::out_of_range(to as i64, len));
        }
        self.splice_move(from, to);
        Ok(())
    }

    // Unchecked variants used when replaying recorded history, whose
    // positions were valid when recorded and are valid again on replay.

    pub(crate) fn splice_in(&mut self, position: usize, value: T) {
        self.data.insert(position, value);
    }

    pub(crate) fn splice_out(&mut self, position: usize) -> T {
        self.data.remove(position)
    }

    pub(crate) fn splice_move(&mut self, from: usize, to: usize) {
        if from < to {
            self.data[from..=to].rotate_left(1);
        } else if from > to {
            self.data[to..=from].rotate_right(1);
        }
    }

    /// Logical position of a physical id, if it is currently visible.
    pub fn position(&self, value: T) -> Option<usize> {
        self.data.iter().position(|&v| v == value)
    }

    pub fn contains(&self, value: T) -> bool {
        self.data.contains(&value)
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.data.iter().copied()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

impl<T: Copy + Eq> Default for LogicalOrder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + Eq> FromIterator<T> for LogicalOrder<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        LogicalOrder {
            data: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(values: &[usize]) -> LogicalOrder<usize> {
        values.iter().copied().collect()
    }

    #[test]
    fn test_resolve_index_negative() {
        assert_eq!(resolve_index(0, 5).unwrap(), 0);
        assert_eq!(resolve_index(4, 5).unwrap(), 4);
        assert_eq!(resolve_index(-1, 5).unwrap(), 4);
        assert_eq!(resolve_index(-5, 5).unwrap(), 0);
    }

    #[test]
    fn test_resolve_index_out_of_range() {
        assert!(matches!(
            resolve_index(-6, 5),
            Err(TableError::IndexOutOfRange { index: -6, len: 5 })
        ));
        assert!(resolve_index(5, 5).is_err());
        assert!(resolve_index(0, 0).is_err());
        assert!(resolve_index(-1, 0).is_err());
    }

    #[test]
    fn test_resolve_indices_sorted_descending() {
        let resolved = resolve_indices(&[0, 2, -1, 1], 4).unwrap();
        assert_eq!(resolved, vec![3, 2, 1, 0]);
    }

    #[test]
    fn test_resolve_indices_fails_whole_batch() {
        assert!(resolve_indices(&[0, 1, 9], 4).is_err());
    }

    #[test]
    fn test_resolve_indices_keeps_duplicates() {
        assert_eq!(resolve_indices(&[1, -3, 1], 4).unwrap(), vec![1, 1, 1]);
        assert_eq!(resolve_unique_indices(&[1, -3, 1], 4).unwrap(), vec![1]);
    }

    #[test]
    fn test_descending_erase_matches_original_positions() {
        // Removing positions 0 and 2 of [A,B,C,D] must leave [B,D]
        let mut seq = order(&[10, 11, 12, 13]);
        for pos in resolve_indices(&[0, 2], seq.len()).unwrap() {
            seq.erase_at(pos).unwrap();
        }
        assert_eq!(seq.as_slice(), &[11, 13]);
    }

    #[test]
    fn test_insert_and_erase() {
        let mut seq = order(&[1, 3]);
        seq.insert_at(1, 2).unwrap();
        seq.insert_at(3, 4).unwrap();
        assert_eq!(seq.as_slice(), &[1, 2, 3, 4]);

        assert!(seq.insert_at(6, 9).is_err());
        assert_eq!(seq.erase_at(0).unwrap(), 1);
        assert!(seq.erase_at(3).is_err());
        assert_eq!(seq.as_slice(), &[2, 3, 4]);
    }

    #[test]
    fn test_move_item_forward_and_back() {
        let mut seq = order(&[0, 1, 2, 3]);
        seq.move_item(0, 2).unwrap();
        assert_eq!(seq.as_slice(), &[1, 2, 0, 3]);

        seq.move_item(2, 0).unwrap();
        assert_eq!(seq.as_slice(), &[0, 1, 2, 3]);
    }

    #[test]
    fn test_move_item_same_position_is_noop() {
        let mut seq = order(&[5, 6, 7]);
        seq.move_item(1, 1).unwrap();
        assert_eq!(seq.as_slice(), &[5, 6, 7]);
        assert!(seq.move_item(0, 3).is_err());
    }

    #[test]
    fn test_resolve_physical() {
        let seq = order(&[7, 8, 9]);
        assert_eq!(seq.resolve(-1).unwrap(), 9);
        assert_eq!(seq.position(8), Some(1));
        assert!(seq.contains(7));
        assert!(!seq.contains(1));
    }
}
