//! Write-time key generation for records.

use crate::config::IndexConfig;
use crate::error::Result;
use crate::geobox::{GeoboxKey, compute, compute_neighborhood};
use crate::types::Coordinate;
use std::collections::BTreeSet;

/// Keys one tier contributes for `coord`: the primary cell, or the 3×3
/// neighborhood when the tier asks for it.
pub fn tier_keys(coord: &Coordinate, tier: &IndexConfig) -> Result<Vec<GeoboxKey>> {
    if tier.use_neighborhood {
        Ok(compute_neighborhood(coord, tier.resolution, tier.slice)?.to_vec())
    } else {
        Ok(vec![compute(coord, tier.resolution, tier.slice)?])
    }
}

/// Computes the full key set stored alongside a record.
///
/// The result replaces any earlier key set whenever the record's coordinate
/// changes.
///
/// # Examples
///
/// ```rust
/// use geobox::{Coordinate, IndexTable, index_record};
///
/// let sf = Coordinate::parse("37.78452", "-122.39532")?;
/// let keys = index_record(&sf, &IndexTable::default())?;
/// // Two neighborhood tiers and three primary tiers.
/// assert_eq!(keys.len(), 9 + 9 + 1 + 1 + 1);
/// # Ok::<(), geobox::GeoboxError>(())
/// ```
pub fn index_record(coord: &Coordinate, tiers: &[IndexConfig]) -> Result<BTreeSet<GeoboxKey>> {
    let mut keys = BTreeSet::new();
    for tier in tiers {
        keys.extend(tier_keys(coord, tier)?);
    }
    log::trace!("Indexed {} with {} geobox keys", coord, keys.len());
    Ok(keys)
}
