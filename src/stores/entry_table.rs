use crate::models::entry::Entry;
use dashmap::DashMap;
use std::cmp::Reverse;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

struct Row {
    seq: u64,
    entry: Arc<Entry>,
}

/// In-memory `entries` relation
pub struct EntryTable {
    entries: DashMap<String, Row>,
    next_seq: AtomicU64,
}

impl EntryTable {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            next_seq: AtomicU64::new(0),
        }
    }

    pub fn insert(&self, entry: Entry) -> Arc<Entry> {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let entry = Arc::new(entry);
        self.entries.insert(
            entry.id.clone(),
            Row {
                seq,
                entry: Arc::clone(&entry),
            },
        );
        entry
    }

    /// Entries matching `keep`, newest `created_at` first.
    /// Equal timestamps fall back to reverse insertion order.
    pub fn list_where<F>(&self, keep: F) -> Vec<Arc<Entry>>
    where
        F: Fn(&Entry) -> bool,
    {
        let mut rows: Vec<(u64, Arc<Entry>)> = self
            .entries
            .iter()
            .filter(|row| keep(&row.entry))
            .map(|row| (row.seq, Arc::clone(&row.entry)))
            .collect();
        rows.sort_by_key(|(seq, entry)| Reverse((entry.created_at, *seq)));
        rows.into_iter().map(|(_, entry)| entry).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for EntryTable {
    fn default() -> Self {
        Self::new()
    }
}
