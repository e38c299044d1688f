use std::collections::HashSet;
use std::fmt;
use std::ops::{Deref, Index};
use std::slice::Iter;
use std::sync::Arc;

use super::record::{Record, RecordId};

/// An ordered, shared sequence of records (newest first)
///
/// Cloning is cheap: the records live behind an `Arc`, so the three projections
/// of a feed can hold the same allocation until one of them grows. Two lists
/// that share storage compare equal via [`RecordList::ptr_eq`], which is how a
/// no-op merge is detected without comparing contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordList {
    records: Arc<Vec<Record>>,
}

impl RecordList {
    /// Creates a new empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether both lists share the same storage
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.records, &other.records)
    }

    /// Checks if a RecordId is contained in the list (linear scan)
    pub fn contains(&self, id: &RecordId) -> bool {
        self.records.iter().any(|record| record.id() == id)
    }

    /// Returns a reference to the internal Vec (read-only)
    pub fn as_slice(&self) -> &[Record] {
        &self.records
    }
}

/// Merges an incoming batch into an ordered base sequence
///
/// Records of `incoming` whose id is already present in `base` are dropped; the
/// rest are appended in their original relative order. When nothing survives
/// the filter, `base` itself is returned (same storage, see
/// [`RecordList::ptr_eq`]).
///
/// The operation is idempotent: `merge(&merge(b, k), k) == merge(b, k)`.
/// Duplicates *within* `incoming` are also collapsed to their first occurrence.
pub fn merge(base: &RecordList, incoming: &[Record]) -> RecordList {
    let mut seen: HashSet<&RecordId> = base.iter().map(Record::id).collect();
    let fresh: Vec<&Record> = incoming
        .iter()
        .filter(|record| seen.insert(record.id()))
        .collect();

    if fresh.is_empty() {
        return base.clone();
    }

    let mut records = Vec::with_capacity(base.len() + fresh.len());
    records.extend(base.iter().cloned());
    records.extend(fresh.into_iter().cloned());
    RecordList {
        records: Arc::new(records),
    }
}

// === Standard library trait implementations ===

impl Deref for RecordList {
    type Target = [Record];

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}

impl Index<usize> for RecordList {
    type Output = Record;

    fn index(&self, index: usize) -> &Self::Output {
        &self.records[index]
    }
}

impl AsRef<[Record]> for RecordList {
    fn as_ref(&self) -> &[Record] {
        &self.records
    }
}

impl<'a> IntoIterator for &'a RecordList {
    type Item = &'a Record;
    type IntoIter = Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl From<Vec<Record>> for RecordList {
    fn from(records: Vec<Record>) -> Self {
        merge(&RecordList::new(), &records)
    }
}

impl FromIterator<Record> for RecordList {
    fn from_iter<T: IntoIterator<Item = Record>>(iter: T) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl fmt::Display for RecordList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordList[{} records]", self.len())
    }
}
