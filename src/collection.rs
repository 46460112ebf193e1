//! Ordered collection of references keyed by citation key.
//!
//! Inserting an entry whose id is already present replaces the stored entry
//! but keeps the position where that id was first seen.

use crate::ReferenceEntry;
use std::collections::HashMap;

/// References keyed by id, in first-seen order, with last-write-wins values.
///
/// # Examples
///
/// ```
/// use bibrefs::{ReferenceEntry, ReferenceSet};
///
/// let mut set = ReferenceSet::new();
/// set.insert(ReferenceEntry::new("a", "article"));
/// set.insert(ReferenceEntry::new("b", "book"));
/// set.insert(ReferenceEntry::new("a", "misc"));
///
/// let types: Vec<_> = set.iter().map(|e| e.entry_type.as_str()).collect();
/// assert_eq!(types, ["misc", "book"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReferenceSet {
    entries: Vec<ReferenceEntry>,
    positions: HashMap<String, usize>,
}

impl ReferenceSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry, returning the entry it replaced, if any.
    pub fn insert(&mut self, entry: ReferenceEntry) -> Option<ReferenceEntry> {
        match self.positions.get(&entry.id) {
            Some(&index) => Some(std::mem::replace(&mut self.entries[index], entry)),
            None => {
                self.positions.insert(entry.id.clone(), self.entries.len());
                self.entries.push(entry);
                None
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&ReferenceEntry> {
        self.positions.get(id).map(|&index| &self.entries[index])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ReferenceEntry> {
        self.entries.iter()
    }

    /// Flattens the set into a list in iteration order.
    pub fn into_vec(self) -> Vec<ReferenceEntry> {
        self.entries
    }
}

impl Extend<ReferenceEntry> for ReferenceSet {
    fn extend<I: IntoIterator<Item = ReferenceEntry>>(&mut self, iter: I) {
        for entry in iter {
            self.insert(entry);
        }
    }
}

impl FromIterator<ReferenceEntry> for ReferenceSet {
    fn from_iter<I: IntoIterator<Item = ReferenceEntry>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl IntoIterator for ReferenceSet {
    type Item = ReferenceEntry;
    type IntoIter = std::vec::IntoIter<ReferenceEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a ReferenceSet {
    type Item = &'a ReferenceEntry;
    type IntoIter = std::slice::Iter<'a, ReferenceEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn titled(id: &str, title: &str) -> ReferenceEntry {
        let mut entry = ReferenceEntry::new(id, "article");
        entry.title = Some(title.to_string());
        entry
    }

    #[test]
    fn test_insert_keeps_first_position() {
        let mut set = ReferenceSet::new();
        assert!(set.insert(titled("x", "First")).is_none());
        set.insert(titled("y", "Other"));
        let replaced = set.insert(titled("x", "Second")).unwrap();

        assert_eq!(replaced.title.as_deref(), Some("First"));
        assert_eq!(set.len(), 2);
        let ids: Vec<&str> = set.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["x", "y"]);
        assert_eq!(set.get("x").unwrap().title.as_deref(), Some("Second"));
    }

    #[test]
    fn test_empty_id_is_a_key() {
        let set: ReferenceSet = [titled("", "One"), titled("", "Two")].into_iter().collect();
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("").unwrap().title.as_deref(), Some("Two"));
    }

    #[test]
    fn test_into_vec() {
        let set: ReferenceSet = [titled("a", "A"), titled("b", "B")].into_iter().collect();
        let entries = set.into_vec();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].id, "b");
        assert!(ReferenceSet::new().is_empty());
    }
}
