use std::{ops::Index, path::Path};

use hashbrown::HashMap;

use crate::entry::{CollectedEntry, path_key};

/// Insertion-ordered set of entries, unique by case-insensitive path.
///
/// Entries live in a `Vec` in discovery order; `positions` maps each key to
/// its slot. There is no removal, so slots never shift.
#[derive(Debug, Default, Clone)]
pub struct EntrySet {
    entries: Vec<CollectedEntry>,
    positions: HashMap<Vec<u8>, usize>,
}

impl EntrySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `entry` unless an entry with the same key is present.
    /// Returns whether it was inserted.
    pub fn insert(&mut self, entry: CollectedEntry) -> bool {
        let key = entry.key();
        if self.positions.contains_key(&key) {
            return false;
        }

        self.positions.insert(key, self.entries.len());
        self.entries.push(entry);
        true
    }

    #[inline]
    pub fn contains(&self, path: &Path) -> bool {
        self.positions.contains_key(&path_key(path))
    }

    #[inline]
    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.positions.contains_key(key)
    }

    /// Keyed lookup by canonical path, ignoring case.
    pub fn get(&self, path: &Path) -> Option<&CollectedEntry> {
        self.position(path).map(|i| &self.entries[i])
    }

    pub fn position(&self, path: &Path) -> Option<usize> {
        self.positions.get(&path_key(path)).copied()
    }

    #[inline]
    pub fn get_index(&self, index: usize) -> Option<&CollectedEntry> {
        self.entries.get(index)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CollectedEntry> {
        self.entries.iter()
    }

    #[inline]
    pub fn as_slice(&self) -> &[CollectedEntry] {
        &self.entries
    }

    /// Snapshot of the current contents in insertion order.
    pub fn to_vec(&self) -> Vec<CollectedEntry> {
        self.entries.clone()
    }
}

impl Index<usize> for EntrySet {
    type Output = CollectedEntry;

    fn index(&self, index: usize) -> &CollectedEntry {
        &self.entries[index]
    }
}

impl<'a> IntoIterator for &'a EntrySet {
    type Item = &'a CollectedEntry;
    type IntoIter = std::slice::Iter<'a, CollectedEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for EntrySet {
    type Item = CollectedEntry;
    type IntoIter = std::vec::IntoIter<CollectedEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
#[path = "set_tests.rs"]
mod tests;
