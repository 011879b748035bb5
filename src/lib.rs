//! Proximity search over stores that only support equality filters.
//!
//! Every record carries precomputed geobox keys, one string per grid cell it
//! falls in at several fixed resolutions. A "near me" query computes the same
//! keys for the query point and asks the store for exact matches, walking from
//! the finest tier to coarser ones until enough records turn up.
//!
//! ```rust
//! use geobox::{Coordinate, Filters, GeoRecord, MemoryStore, SearchOptions, search_nearby};
//!
//! #[derive(Clone)]
//! struct Store { name: &'static str, at: Coordinate }
//!
//! impl GeoRecord for Store {
//!     type Id = &'static str;
//!     fn id(&self) -> Self::Id { self.name }
//!     fn coordinate(&self) -> &Coordinate { &self.at }
//! }
//!
//! let stores = MemoryStore::new();
//! stores.put(Store { name: "corner", at: Coordinate::parse("37.7846", "-122.3955")? })?;
//!
//! let here = Coordinate::parse("37.78452", "-122.39532")?;
//! let nearby = search_nearby(&stores, &here, &SearchOptions::default(), &Filters::none())?;
//! assert_eq!(nearby[0].record.name, "corner");
//! # Ok::<(), geobox::GeoboxError>(())
//! ```

pub mod compute;
pub mod config;
pub mod error;
pub mod geobox;
pub mod hours;
pub mod indexer;
pub mod query;
pub mod ranking;
pub mod store;
pub mod types;

pub use config::{Config, DEFAULT_TIERS, IndexConfig, IndexTable};
pub use error::{GeoboxError, Result};
pub use geobox::{Cell, GeoboxKey, KeyBounds, NEIGHBORHOOD_SIZE, compute, compute_neighborhood};
pub use hours::{DaySpan, HalfHour, HasHours, OpenAt, Weekday, WeeklyHours};
pub use indexer::{index_record, tier_keys};
pub use query::{SearchOptions, search, search_nearby};
pub use ranking::{
    DistanceMetric, EARTH_RADIUS_METERS, Ranked, earth_distance, rank_by_distance,
    rank_by_distance_with,
};
pub use store::{Filters, GeoRecord, MemoryStore, RecordStore, StoreStats};
pub use types::{Coordinate, Granularity};

pub use geo::Point;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {
    pub use crate::{
        Config, Coordinate, Filters, GeoRecord, GeoboxError, GeoboxKey, IndexConfig, IndexTable,
        MemoryStore, RecordStore, Result, SearchOptions,
    };

    pub use crate::geobox::{compute, compute_neighborhood};
    pub use crate::query::{search, search_nearby};
    pub use crate::ranking::{Ranked, rank_by_distance};
}
