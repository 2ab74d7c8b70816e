//! Placeholder bookkeeping for deferred dictionary values.

use crate::writer::RecordedPlaceholder;
use indexmap::IndexMap;

/// Key under which the byte-range array is reserved.
pub const BYTE_RANGE_KEY: &str = "ByteRange";

/// Key under which the signature container is reserved.
pub const CONTENTS_KEY: &str = "Contents";

/// The `/ByteRange` literal always occupies exactly this many bytes.
pub const BYTE_RANGE_RESERVED_LEN: usize = 80;

/// File location of a reserved literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderSlot {
    /// Absolute offset of the first reserved byte.
    pub offset: u64,
    /// Reserved width in bytes.
    pub len: usize,
}

/// Records where each deferred dictionary value landed in the file.
///
/// Filled from the writer's placeholder records after serialization.
/// The key set always contains `ByteRange` and at least `Contents`.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderTable {
    entries: IndexMap<String, PlaceholderSlot>,
}

impl PlaceholderTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from the writer's records.
    pub fn from_records(records: Vec<RecordedPlaceholder>) -> Self {
        let mut table = Self::new();
        for (name, offset, len) in records {
            table.record(name, offset, len);
        }
        table
    }

    /// Records the location of a reserved literal.
    pub fn record(&mut self, name: impl Into<String>, offset: u64, len: usize) {
        self.entries.insert(name.into(), PlaceholderSlot { offset, len });
    }

    /// Looks up a slot by key.
    pub fn get(&self, name: &str) -> Option<PlaceholderSlot> {
        self.entries.get(name).copied()
    }

    /// Checks whether a key was reserved.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Returns the number of recorded slots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no slot was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the exclusion windows for range computation: every slot
    /// except `ByteRange`, sorted by file offset.
    pub fn exclusions(&self) -> Vec<(u64, usize)> {
        let mut windows: Vec<(u64, usize)> = self
            .entries
            .iter()
            .filter(|(name, _)| name.as_str() != BYTE_RANGE_KEY)
            .map(|(_, slot)| (slot.offset, slot.len))
            .collect();
        windows.sort_by_key(|(offset, _)| *offset);
        windows
    }

    /// Returns the keys `close` must receive values for.
    pub fn update_keys(&self) -> impl Iterator<Item = &str> {
        self.entries
            .keys()
            .map(String::as_str)
            .filter(|name| *name != BYTE_RANGE_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclusions_skip_byte_range() {
        let mut table = PlaceholderTable::new();
        table.record(BYTE_RANGE_KEY, 100, BYTE_RANGE_RESERVED_LEN);
        table.record(CONTENTS_KEY, 300, 18);

        assert_eq!(table.exclusions(), vec![(300, 18)]);
    }

    #[test]
    fn test_exclusions_sorted_by_offset() {
        let mut table = PlaceholderTable::new();
        table.record("Second", 500, 10);
        table.record(CONTENTS_KEY, 200, 18);

        assert_eq!(table.exclusions(), vec![(200, 18), (500, 10)]);
    }

    #[test]
    fn test_update_keys_exclude_byte_range() {
        let mut table = PlaceholderTable::new();
        table.record(BYTE_RANGE_KEY, 0, 80);
        table.record(CONTENTS_KEY, 90, 18);

        let keys: Vec<&str> = table.update_keys().collect();
        assert_eq!(keys, vec![CONTENTS_KEY]);
    }
}
