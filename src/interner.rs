/// String Interner for tabledit
///
/// Cell values and column names are stored once and referenced by integer
/// handles. Tables tend to repeat the same few strings across many cells, so
/// rows hold 4-byte `StringId`s instead of owned strings.
///
/// # Design
///
/// - Each distinct string is allocated once as an `Arc<str>`, shared by the
///   lookup map and the id-indexed arena
/// - Lookup is by borrowed `&str`, so a hit never allocates
/// - The arena is append-only: a `StringId` stays valid for the life of the
///   interner, which is what lets undo records keep ids instead of owned strings
///
/// # Examples
///
/// ```
/// use tabledit::StringInterner;
///
/// let mut interner = StringInterner::new();
///
/// let id1 = interner.intern("hello");
/// let id2 = interner.intern("world");
/// let id3 = interner.intern("hello");
///
/// assert_eq!(id1, id3);
/// assert_ne!(id1, id2);
/// assert_eq!(interner.resolve(id1), Some("hello"));
/// ```

use std::collections::HashMap;
use std::sync::Arc;

/// Interned string ID type
pub type StringId = u32;

/// Content-addressed string pool returning stable integer handles.
#[derive(Debug, Clone, Default)]
pub struct StringInterner {
    string_to_id: HashMap<Arc<str>, StringId>,
    id_to_string: Vec<Arc<str>>,
    /// Number of `intern` calls answered by each id
    ref_counts: Vec<u32>,
}

impl StringInterner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a string, returning its canonical ID.
    /// Equal content always yields the same ID.
    pub fn intern(&mut self, s: &str) -> StringId {
        if let Some(&id) = self.string_to_id.get(s) {
            self.ref_counts[id as usize] = self.ref_counts[id as usize].saturating_add(1);
            return id;
        }

        let id = self.id_to_string.len() as StringId;
        let shared: Arc<str> = Arc::from(s);
        self.id_to_string.push(Arc::clone(&shared));
        self.ref_counts.push(1);
        self.string_to_id.insert(shared, id);
        id
    }

    /// Look up the ID of an already interned string without registering it.
    pub fn get(&self, s: &str) -> Option<StringId> {
        self.string_to_id.get(s).copied()
    }

    /// Resolve an ID back to its string
    pub fn resolve(&self, id: StringId) -> Option<&str> {
        self.id_to_string.get(id as usize).map(|s| &**s)
    }

    /// Number of `intern` calls that returned this ID
    pub fn ref_count(&self, id: StringId) -> u32 {
        self.ref_counts.get(id as usize).copied().unwrap_or(0)
    }

    /// Returns the number of unique strings interned
    pub fn len(&self) -> usize {
        self.id_to_string.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_string.is_empty()
    }

    /// Returns total memory used by all interned strings (approximate)
    pub fn memory_usage(&self) -> usize {
        let string_bytes: usize = self.id_to_string.iter().map(|s| s.len()).sum();

        let map_overhead = self.string_to_id.capacity()
            * (std::mem::size_of::<Arc<str>>() + std::mem::size_of::<StringId>());

        let vec_overhead = self.id_to_string.capacity() * std::mem::size_of::<Arc<str>>()
            + self.ref_counts.capacity() * std::mem::size_of::<u32>();

        string_bytes + map_overhead + vec_overhead
    }

    pub fn stats(&self) -> InternerStats {
        InternerStats {
            unique_strings: self.len(),
            total_references: self.ref_counts.iter().map(|&r| r as u64).sum(),
            memory_bytes: self.memory_usage(),
        }
    }
}

/// Statistics about the string interner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternerStats {
    /// Number of unique strings stored
    pub unique_strings: usize,
    /// Total number of intern requests served
    pub total_references: u64,
    /// Approximate memory usage in bytes
    pub memory_bytes: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_ids_are_handed_out_in_arrival_order() {
        let mut interner = StringInterner::new();

        assert_eq!(interner.intern("alpha"), 0);
        assert_eq!(interner.intern("beta"), 1);
        assert_eq!(interner.intern("alpha"), 0);
        assert_eq!(interner.intern("gamma"), 2);
        assert_eq!(interner.len(), 3);
    }

    #[test]
    fn test_ids_stay_valid_as_arena_grows() {
        let mut interner = StringInterner::new();
        let first = interner.intern("first");

        for n in 0..1000 {
            interner.intern(&format!("filler-{}", n));
        }

        // Ids are never recycled: the first string keeps its id and text
        assert_eq!(interner.resolve(first), Some("first"));
        assert_eq!(interner.intern("first"), first);
        assert_eq!(interner.len(), 1001);
        assert_eq!(interner.intern("new"), 1001);
    }

    #[test]
    fn test_interner_shares_allocation() {
        let mut interner = StringInterner::new();

        let id = interner.intern("shared");
        interner.intern("shared");

        // One allocation, referenced by the map and the arena
        let arc = &interner.id_to_string[id as usize];
        assert_eq!(Arc::strong_count(arc), 2);
        assert_eq!(interner.ref_count(id), 2);
    }

    #[test]
    fn test_interner_get_does_not_register() {
        let mut interner = StringInterner::new();

        assert_eq!(interner.get("missing"), None);
        assert!(interner.is_empty());

        let id = interner.intern("present");
        assert_eq!(interner.get("present"), Some(id));
        assert_eq!(interner.ref_count(id), 1);
    }

    #[test]
    fn test_empty_string_occupies_a_slot() {
        let mut interner = StringInterner::new();

        let blank = interner.intern("");
        let word = interner.intern("word");
        assert_eq!((blank, word), (0, 1));
        assert_eq!(interner.get(""), Some(blank));
        assert_eq!(interner.resolve(blank), Some(""));
        assert_eq!(interner.ref_count(blank), 1);
    }

    #[test]
    fn test_interner_resolve_unknown() {
        let interner = StringInterner::new();
        assert_eq!(interner.resolve(7), None);
        assert_eq!(interner.ref_count(7), 0);
    }

    #[test]
    fn test_interner_stats() {
        let mut interner = StringInterner::new();

        interner.intern("hello");
        interner.intern("world");
        interner.intern("hello");

        let stats = interner.stats();
        assert_eq!(stats.unique_strings, 2);
        assert_eq!(stats.total_references, 3);
        assert!(stats.memory_bytes >= "helloworld".len());
    }

    proptest! {
        #[test]
        fn intern_is_idempotent(s in ".{0,12}") {
            let mut interner = StringInterner::new();
            let a = interner.intern(&s);
            let b = interner.intern(&s);
            prop_assert_eq!(a, b);
            prop_assert_eq!(interner.len(), 1);
            prop_assert_eq!(interner.resolve(a), Some(s.as_str()));
        }

        #[test]
        fn distinct_content_gets_distinct_ids(a in "[a-z]{1,6}", b in "[A-Z]{1,6}") {
            let mut interner = StringInterner::new();
            prop_assert_ne!(interner.intern(&a), interner.intern(&b));
        }
    }
}
