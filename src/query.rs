//! Concentric search: probe tiers from fine to coarse until enough records
//! have been found.
//!
//! ```text
//!  -----------
//! |  -------  |      tier 0: smallest cell around the query point
//! | |  ---  | |      tier 1: larger cell
//! | | | x | | |      ...
//! | |  ---  | |      stop once `max_results` distinct records are known
//! |  -------  |      or the next tier is coarser than `min_tier`
//!  -----------
//! ```
//!
//! Each tier issues exactly one equality lookup on the query point's own cell.
//! Tiers run one after another because the stop condition depends on what
//! earlier tiers returned.

use crate::config::{Config, IndexTable};
use crate::error::{GeoboxError, Result};
use crate::geobox::compute;
use crate::ranking::{Ranked, rank_by_distance};
use crate::store::{GeoRecord, RecordStore};
use crate::types::{Coordinate, Granularity};
use rustc_hash::FxHashSet;

/// Parameters of one concentric search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    /// Tiers to walk, finest first.
    pub tiers: IndexTable,
    /// Soft stop threshold: no tier is probed once this many distinct records
    /// are known. A single tier may push the total past it.
    pub max_results: usize,
    /// Tiers ordered below this granularity are never probed.
    pub min_tier: Option<Granularity>,
    /// Record cap per store lookup.
    pub page_limit: usize,
}

impl SearchOptions {
    pub fn with_tiers(mut self, tiers: IndexTable) -> Self {
        self.tiers = tiers;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_min_tier(mut self, min_tier: Option<Granularity>) -> Self {
        self.min_tier = min_tier;
        self
    }

    pub fn with_page_limit(mut self, page_limit: usize) -> Self {
        self.page_limit = page_limit;
        self
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for SearchOptions {
    fn from(config: &Config) -> Self {
        Self {
            tiers: config.tiers.clone(),
            max_results: config.max_results,
            min_tier: config.min_tier,
            page_limit: config.page_limit,
        }
    }
}

/// Distinct records in the order they were first seen.
struct Candidates<R: GeoRecord> {
    seen: FxHashSet<R::Id>,
    records: Vec<R>,
}

impl<R: GeoRecord> Candidates<R> {
    fn new() -> Self {
        Self {
            seen: FxHashSet::default(),
            records: Vec::new(),
        }
    }

    /// Keeps the first copy of each record.
    fn merge(&mut self, batch: Vec<R>) -> usize {
        let before = self.records.len();
        for record in batch {
            if self.seen.insert(record.id()) {
                self.records.push(record);
            }
        }
        self.records.len() - before
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

/// Runs a concentric search and returns candidates in discovery order.
///
/// At most one lookup is issued per tier. A failing lookup aborts the search
/// with [`GeoboxError::StoreLookup`]; partial results are not returned.
pub fn search<S: RecordStore>(
    store: &S,
    query: &Coordinate,
    options: &SearchOptions,
    filter: &S::Filter,
) -> Result<Vec<S::Record>> {
    let mut found = Candidates::new();

    for tier in options.tiers.iter() {
        if found.len() >= options.max_results {
            break;
        }
        let granularity = tier.granularity();
        if let Some(min) = &options.min_tier
            && !granularity.is_at_least(min)
        {
            log::debug!("Stopping before {}: coarser than minimum {}", granularity, min);
            break;
        }

        let key = compute(query, tier.resolution, tier.slice)?;
        log::debug!("Searching for box={} at {}", key, granularity);

        let batch = store
            .lookup(&key, filter, options.page_limit)
            .map_err(|e| GeoboxError::StoreLookup {
                resolution: tier.resolution,
                slice: tier.slice,
                key: key.to_string(),
                source: Box::new(e),
            })?;

        let returned = batch.len();
        let added = found.merge(batch);
        log::debug!("Found {} results, {} new", returned, added);
    }

    Ok(found.records)
}

/// Runs [`search`] and ranks the candidates by distance from `query`.
///
/// # Examples
///
/// ```rust
/// use geobox::{Coordinate, GeoRecord, MemoryStore, Filters, SearchOptions, search_nearby};
///
/// #[derive(Clone)]
/// struct Stop { id: u32, at: Coordinate }
///
/// impl GeoRecord for Stop {
///     type Id = u32;
///     fn id(&self) -> u32 { self.id }
///     fn coordinate(&self) -> &Coordinate { &self.at }
/// }
///
/// let store = MemoryStore::new();
/// store.put(Stop { id: 1, at: Coordinate::parse("37.7841", "-122.3951")? })?;
/// store.put(Stop { id: 2, at: Coordinate::parse("37.7860", "-122.3990")? })?;
///
/// let here = Coordinate::parse("37.78452", "-122.39532")?;
/// let options = SearchOptions::default().with_max_results(10);
/// let nearby = search_nearby(&store, &here, &options, &Filters::none())?;
///
/// assert_eq!(nearby.len(), 2);
/// assert_eq!(nearby[0].record.id, 1);
/// # Ok::<(), geobox::GeoboxError>(())
/// ```
pub fn search_nearby<S: RecordStore>(
    store: &S,
    query: &Coordinate,
    options: &SearchOptions,
    filter: &S::Filter,
) -> Result<Vec<Ranked<S::Record>>> {
    let candidates = search(store, query, options, filter)?;
    Ok(rank_by_distance(query, candidates))
}
