//! Store abstraction consumed by the search engine.
//!
//! The engine only needs one capability from a store: "give me up to `limit`
//! records whose key set contains this geobox key and that pass these extra
//! filters". Any engine with equality filters on an indexed list field can
//! provide it. [`MemoryStore`] is the in-process implementation.

use crate::config::IndexTable;
use crate::error::Result;
use crate::geobox::GeoboxKey;
use crate::indexer::index_record;
use crate::types::Coordinate;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;
use std::convert::Infallible;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// A record that can be located by geobox keys.
pub trait GeoRecord {
    /// Stable identity used to deduplicate results across tiers.
    type Id: Eq + Hash + Clone;

    fn id(&self) -> Self::Id;

    fn coordinate(&self) -> &Coordinate;
}

/// Trait for store implementations queried by the search engine.
pub trait RecordStore {
    type Record: GeoRecord;

    /// Opaque extra filters, passed through from the caller untouched.
    type Filter: ?Sized;

    type Error: std::error::Error + Send + Sync + 'static;

    /// Records whose key set contains `key` and that match `filter`, at most `limit`.
    fn lookup(
        &self,
        key: &GeoboxKey,
        filter: &Self::Filter,
        limit: usize,
    ) -> std::result::Result<Vec<Self::Record>, Self::Error>;
}

type Predicate<R> = Arc<dyn Fn(&R) -> bool + Send + Sync>;

/// Conjunction of record predicates applied by [`MemoryStore`].
pub struct Filters<R> {
    predicates: Vec<Predicate<R>>,
}

impl<R> Filters<R> {
    /// Matches every record.
    pub fn none() -> Self {
        Self {
            predicates: Vec::new(),
        }
    }

    /// Adds a predicate every returned record must satisfy.
    pub fn with<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&R) -> bool + Send + Sync + 'static,
    {
        self.predicates.push(Arc::new(predicate));
        self
    }

    pub fn matches(&self, record: &R) -> bool {
        self.predicates.iter().all(|p| p(record))
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl<R> Default for Filters<R> {
    fn default() -> Self {
        Self::none()
    }
}

impl<R> Clone for Filters<R> {
    fn clone(&self) -> Self {
        Self {
            predicates: self.predicates.clone(),
        }
    }
}

/// Store statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Number of records
    pub record_count: usize,
    /// Number of distinct geobox keys with at least one record
    pub key_count: usize,
    /// Number of lookups served
    pub lookup_count: u64,
}

struct StoredRecord<R> {
    record: R,
    keys: BTreeSet<GeoboxKey>,
}

struct Inner<R: GeoRecord> {
    records: FxHashMap<R::Id, StoredRecord<R>>,
    postings: FxHashMap<GeoboxKey, Vec<R::Id>>,
}

impl<R: GeoRecord> Inner<R> {
    fn unlink(&mut self, id: &R::Id, keys: &BTreeSet<GeoboxKey>) {
        for key in keys {
            if let Some(ids) = self.postings.get_mut(key) {
                ids.retain(|existing| existing != id);
                if ids.is_empty() {
                    self.postings.remove(key);
                }
            }
        }
    }
}

/// In-memory record store with a geobox key posting list.
///
/// Writes compute each record's key set from the store's tier table. Reads
/// take a shared lock, so one store can serve many concurrent searches.
///
/// # Example
///
/// ```rust
/// use geobox::{Coordinate, GeoRecord, MemoryStore, Filters, RecordStore};
/// use geobox::geobox::compute;
///
/// #[derive(Clone)]
/// struct Cafe { name: String, at: Coordinate }
///
/// impl GeoRecord for Cafe {
///     type Id = String;
///     fn id(&self) -> String { self.name.clone() }
///     fn coordinate(&self) -> &Coordinate { &self.at }
/// }
///
/// let store = MemoryStore::new();
/// let at = Coordinate::parse("37.78452", "-122.39532")?;
/// store.put(Cafe { name: "blue".into(), at: at.clone() })?;
///
/// let key = compute(&at, 3, 8)?;
/// let hits = store.lookup(&key, &Filters::none(), 50).unwrap();
/// assert_eq!(hits.len(), 1);
/// # Ok::<(), geobox::GeoboxError>(())
/// ```
pub struct MemoryStore<R: GeoRecord> {
    tiers: IndexTable,
    inner: RwLock<Inner<R>>,
    lookups: AtomicU64,
}

impl<R: GeoRecord> MemoryStore<R> {
    /// Store indexed with the default tier table.
    pub fn new() -> Self {
        Self::with_tiers(IndexTable::default())
    }

    pub fn with_tiers(tiers: IndexTable) -> Self {
        Self {
            tiers,
            inner: RwLock::new(Inner {
                records: FxHashMap::default(),
                postings: FxHashMap::default(),
            }),
            lookups: AtomicU64::new(0),
        }
    }

    pub fn tiers(&self) -> &IndexTable {
        &self.tiers
    }

    /// Inserts or replaces a record, recomputing its key set.
    pub fn put(&self, record: R) -> Result<()> {
        let keys = index_record(record.coordinate(), &self.tiers)
            .inspect_err(|e| log::warn!("Rejected record at {}: {}", record.coordinate(), e))?;
        let id = record.id();

        let mut inner = self.inner.write();
        if let Some(previous) = inner.records.remove(&id) {
            inner.unlink(&id, &previous.keys);
        }
        for key in &keys {
            inner.postings.entry(key.clone()).or_default().push(id.clone());
        }
        inner.records.insert(id, StoredRecord { record, keys });
        Ok(())
    }

    /// Removes a record and returns it if it existed.
    pub fn remove(&self, id: &R::Id) -> Option<R> {
        let mut inner = self.inner.write();
        let stored = inner.records.remove(id)?;
        inner.unlink(id, &stored.keys);
        Some(stored.record)
    }

    /// Key set currently stored for a record.
    pub fn keys_of(&self, id: &R::Id) -> Option<BTreeSet<GeoboxKey>> {
        self.inner.read().records.get(id).map(|s| s.keys.clone())
    }

    pub fn contains(&self, id: &R::Id) -> bool {
        self.inner.read().records.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().records.is_empty()
    }

    pub fn stats(&self) -> StoreStats {
        let inner = self.inner.read();
        StoreStats {
            record_count: inner.records.len(),
            key_count: inner.postings.len(),
            lookup_count: self.lookups.load(Ordering::Relaxed),
        }
    }
}

impl<R: GeoRecord + Clone> MemoryStore<R> {
    pub fn get(&self, id: &R::Id) -> Option<R> {
        self.inner.read().records.get(id).map(|s| s.record.clone())
    }
}

impl<R: GeoRecord> Default for MemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: GeoRecord + Clone> RecordStore for MemoryStore<R> {
    type Record = R;
    type Filter = Filters<R>;
    type Error = Infallible;

    fn lookup(
        &self,
        key: &GeoboxKey,
        filter: &Filters<R>,
        limit: usize,
    ) -> std::result::Result<Vec<R>, Infallible> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        let inner = self.inner.read();
        let Some(ids) = inner.postings.get(key) else {
            return Ok(Vec::new());
        };
        Ok(ids
            .iter()
            .filter_map(|id| inner.records.get(id))
            .map(|stored| &stored.record)
            .filter(|record| filter.matches(record))
            .take(limit)
            .cloned()
            .collect())
    }
}
