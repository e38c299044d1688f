//! In-process Cursor Store
//!
//! Keeps each feed kind as a reverse-sorted set of document keys (newest
//! first) plus a map to the documents themselves. Ties on the sort key are
//! broken by insertion order, later inserts first.
//!
//! Besides serving the engine, the store can simulate the things a remote
//! store does to a client: latency, outages, one-shot faults, and requests
//! that hang until released. Every call is counted in [`StoreMetrics`].

use std::cmp::Reverse;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sorted_vec::{FindOrInsert, ReverseSortedSet};
use tokio::{sync::watch, time};

use crate::{
    domain::{FeedKind, Record, RecordBody, RecordId, SortKey},
    utils::sync::{lock, read, write},
};

use super::store::{CursorHandle, CursorStore, Page, RecordWriter, StoreError};

/// Position of a document in its collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct DocumentKey {
    sort_key: SortKey,
    seq: u64,
}

impl DocumentKey {
    fn token(&self) -> String {
        format!(
            "{}#{}",
            self.sort_key
                .as_datetime()
                .to_rfc3339_opts(SecondsFormat::Nanos, true),
            self.seq
        )
    }

    fn parse(token: &str) -> Option<Self> {
        let (at, seq) = token.rsplit_once('#')?;
        let at = DateTime::parse_from_rfc3339(at).ok()?.with_timezone(&Utc);
        Some(Self {
            sort_key: SortKey::new(at),
            seq: seq.parse().ok()?,
        })
    }
}

#[derive(Debug, Default)]
struct Collection {
    order: ReverseSortedSet<DocumentKey>,
    documents: HashMap<DocumentKey, Record>,
    keys: HashMap<RecordId, DocumentKey>,
}

impl Collection {
    fn insert(&mut self, key: DocumentKey, record: Record) -> bool {
        if self.keys.contains_key(record.id()) {
            return false;
        }
        if let FindOrInsert::Found(_) = self.order.find_or_insert(Reverse(key)) {
            return false;
        }
        self.keys.insert(record.id().clone(), key);
        self.documents.insert(key, record);
        true
    }

    fn remove(&mut self, id: &RecordId) -> Option<Record> {
        let key = self.keys.remove(id)?;
        self.order.remove_item(&Reverse(key));
        self.documents.remove(&key)
    }

    /// Index of the first document strictly after `key`
    ///
    /// Works whether or not `key` is still present.
    fn position_after(&self, key: DocumentKey) -> usize {
        match self.order.binary_search(&Reverse(key)) {
            Ok(index) => index + 1,
            Err(index) => index,
        }
    }

    fn page_from(&self, kind: FeedKind, start: usize, page_size: usize) -> Page {
        let keys: Vec<DocumentKey> = self
            .order
            .iter()
            .skip(start)
            .take(page_size)
            .map(|rev| rev.0)
            .collect();
        let records = keys
            .iter()
            .filter_map(|key| self.documents.get(key).cloned())
            .collect();
        let last = keys
            .last()
            .map(|key| CursorHandle::new(kind, key.token()));
        Page { records, last }
    }
}

/// Configuration for the in-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStoreConfig {
    /// Artificial delay before every query
    pub latency: Duration,
}

/// Per-kind call counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreMetrics {
    pub first_page_calls: usize,
    pub next_page_calls: usize,
    pub resolve_calls: usize,
    pub appends: usize,
}

impl StoreMetrics {
    /// Number of read calls (appends excluded)
    pub fn total_reads(&self) -> usize {
        self.first_page_calls + self.next_page_calls + self.resolve_calls
    }
}

#[derive(Debug)]
pub struct MemoryCursorStore {
    config: MemoryStoreConfig,
    collections: RwLock<HashMap<FeedKind, Collection>>,
    next_seq: AtomicU64,
    offline: AtomicBool,
    faults: Mutex<HashMap<FeedKind, VecDeque<StoreError>>>,
    metrics: Mutex<HashMap<FeedKind, StoreMetrics>>,
    held: watch::Sender<bool>,
}

impl MemoryCursorStore {
    pub fn new() -> Self {
        Self::with_config(MemoryStoreConfig::default())
    }

    pub fn with_config(config: MemoryStoreConfig) -> Self {
        let (held, _) = watch::channel(false);
        Self {
            config,
            collections: RwLock::new(HashMap::new()),
            next_seq: AtomicU64::new(1),
            offline: AtomicBool::new(false),
            faults: Mutex::new(HashMap::new()),
            metrics: Mutex::new(HashMap::new()),
            held,
        }
    }

    /// Inserts an existing record; returns false if its id is already taken
    pub fn insert(&self, kind: FeedKind, record: Record) -> bool {
        let key = DocumentKey {
            sort_key: record.sort_key(),
            seq: self.next_seq.fetch_add(1, Ordering::SeqCst),
        };
        write(&self.collections)
            .entry(kind)
            .or_default()
            .insert(key, record)
    }

    /// Creates a record with a store-assigned id at the given sort key
    pub fn insert_at(&self, kind: FeedKind, sort_key: SortKey, body: RecordBody) -> Record {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        let record = Record::new(RecordId::new(format!("{kind}-{seq:06}")), sort_key, body);
        let key = DocumentKey { sort_key, seq };
        write(&self.collections)
            .entry(kind)
            .or_default()
            .insert(key, record.clone());
        record
    }

    /// Deletes a record upstream
    pub fn delete(&self, kind: FeedKind, id: &RecordId) -> Option<Record> {
        write(&self.collections).get_mut(&kind)?.remove(id)
    }

    pub fn len(&self, kind: FeedKind) -> usize {
        read(&self.collections)
            .get(&kind)
            .map_or(0, |collection| collection.documents.len())
    }

    pub fn is_empty(&self, kind: FeedKind) -> bool {
        self.len(kind) == 0
    }

    /// Makes the next call for `kind` fail with `error`
    pub fn fail_next(&self, kind: FeedKind, error: StoreError) {
        lock(&self.faults).entry(kind).or_default().push_back(error);
    }

    /// While offline every call fails with [`StoreError::Unavailable`]
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Suspends every query until [`MemoryCursorStore::release`]
    pub fn hold(&self) {
        self.held.send_replace(true);
    }

    pub fn release(&self) {
        self.held.send_replace(false);
    }

    pub fn metrics(&self, kind: FeedKind) -> StoreMetrics {
        lock(&self.metrics).get(&kind).cloned().unwrap_or_default()
    }

    pub fn reset_metrics(&self) {
        lock(&self.metrics).clear();
    }

    fn count(&self, kind: FeedKind, f: impl FnOnce(&mut StoreMetrics)) {
        f(lock(&self.metrics).entry(kind).or_default());
    }

    /// Everything a remote round-trip does before touching data
    async fn round_trip(&self, kind: FeedKind) -> Result<(), StoreError> {
        let mut held = self.held.subscribe();
        // The sender lives as long as `self`, so this only ends on release
        let _ = held.wait_for(|held| !*held).await;

        if !self.config.latency.is_zero() {
            time::sleep(self.config.latency).await;
        }

        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("{kind} collection offline")));
        }
        if let Some(error) = lock(&self.faults)
            .get_mut(&kind)
            .and_then(VecDeque::pop_front)
        {
            return Err(error);
        }
        Ok(())
    }
}

impl Default for MemoryCursorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CursorStore for MemoryCursorStore {
    async fn query_first_page(
        &self,
        kind: FeedKind,
        page_size: usize,
    ) -> Result<Page, StoreError> {
        self.count(kind, |m| m.first_page_calls += 1);
        self.round_trip(kind).await?;

        Ok(read(&self.collections)
            .get(&kind)
            .map_or_else(Page::empty, |collection| {
                collection.page_from(kind, 0, page_size)
            }))
    }

    async fn query_next_page(
        &self,
        kind: FeedKind,
        after: &CursorHandle,
        page_size: usize,
    ) -> Result<Page, StoreError> {
        self.count(kind, |m| m.next_page_calls += 1);
        self.round_trip(kind).await?;

        if after.kind() != kind {
            return Err(StoreError::InvalidCursor(format!(
                "cursor for {} used on {kind}",
                after.kind()
            )));
        }
        let key = DocumentKey::parse(after.token())
            .ok_or_else(|| StoreError::InvalidCursor(after.token().to_string()))?;

        Ok(read(&self.collections)
            .get(&kind)
            .map_or_else(Page::empty, |collection| {
                collection.page_from(kind, collection.position_after(key), page_size)
            }))
    }

    async fn resolve_cursor_handle(
        &self,
        kind: FeedKind,
        id: &RecordId,
    ) -> Result<Option<CursorHandle>, StoreError> {
        self.count(kind, |m| m.resolve_calls += 1);
        self.round_trip(kind).await?;

        Ok(read(&self.collections)
            .get(&kind)
            .and_then(|collection| collection.keys.get(id))
            .map(|key| CursorHandle::new(kind, key.token())))
    }
}

#[async_trait]
impl RecordWriter for MemoryCursorStore {
    async fn append(&self, kind: FeedKind, body: RecordBody) -> Result<Record, StoreError> {
        self.count(kind, |m| m.appends += 1);
        self.round_trip(kind).await?;

        Ok(self.insert_at(kind, SortKey::now(), body))
    }
}
