//! Geobox codec: quantized cells and their canonical string keys.
//!
//! A geobox key is `"lat|lon|lat|lon"` where the two coordinate pairs are
//! opposite corners of one cell on a fixed grid:
//!
//! ```text
//! north,west ──────────┐
//!     │                │     resolution = fractional digits in every field
//!     │        x       │     slice      = cell width in units of 10^-resolution
//!     │                │
//!     └────────── south,east
//! ```
//!
//! Every field carries exactly `resolution` fractional digits, trailing zeros
//! included. The key is persisted with each record and matched by equality at
//! query time, so its text must be reproduced byte for byte.

use crate::compute::validation::validate_granularity;
use crate::compute::{DecimalContext, format_fixed, step};
use crate::error::{GeoboxError, Result};
use crate::types::{Coordinate, Granularity};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of keys in a 3×3 neighborhood.
pub const NEIGHBORHOOD_SIZE: usize = 9;

/// One grid cell with named corners.
///
/// `north`/`west` is the snapped coordinate corner, `south`/`east` the corner
/// one step away on both axes. The key string lists them in the order
/// north, west, south, east.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    granularity: Granularity,
    step: BigDecimal,
    pub north: BigDecimal,
    pub west: BigDecimal,
    pub south: BigDecimal,
    pub east: BigDecimal,
}

impl Cell {
    /// Computes the cell containing `coord` at the given granularity.
    pub fn compute(coord: &Coordinate, resolution: u32, slice: u32) -> Result<Self> {
        validate_granularity(resolution, slice)?;
        let ctx = DecimalContext::for_resolution(resolution);
        let step = step(resolution, slice);

        let lat = ctx.round_cell(coord.lat(), &step);
        let lon = ctx.round_cell(coord.lon(), &step);

        Ok(Self {
            granularity: Granularity::new(resolution, slice),
            west: ctx.round(&(&lon - &step)),
            south: ctx.round(&(&lat - &step)),
            north: lat,
            east: lon,
            step,
        })
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Cell width in degrees.
    pub fn step(&self) -> &BigDecimal {
        &self.step
    }

    /// The cell `lat_steps` rows and `lon_steps` columns away.
    pub fn offset(&self, lat_steps: i32, lon_steps: i32) -> Self {
        let ctx = DecimalContext::for_resolution(self.granularity.resolution);
        let lat_delta = &self.step * BigDecimal::from(lat_steps);
        let lon_delta = &self.step * BigDecimal::from(lon_steps);

        Self {
            granularity: self.granularity,
            step: self.step.clone(),
            north: ctx.round(&(&self.north + &lat_delta)),
            west: ctx.round(&(&self.west + &lon_delta)),
            south: ctx.round(&(&self.south + &lat_delta)),
            east: ctx.round(&(&self.east + &lon_delta)),
        }
    }

    /// Whether `coord` lies inside the cell, edges included.
    pub fn contains(&self, coord: &Coordinate) -> bool {
        let (lat, lon) = (coord.lat(), coord.lon());
        &self.south <= lat && lat <= &self.north && &self.west <= lon && lon <= &self.east
    }

    /// Canonical key for this cell.
    pub fn key(&self) -> GeoboxKey {
        let res = self.granularity.resolution;
        GeoboxKey(format!(
            "{}|{}|{}|{}",
            format_fixed(&self.north, res),
            format_fixed(&self.west, res),
            format_fixed(&self.south, res),
            format_fixed(&self.east, res),
        ))
    }

    /// The cell and its eight grid neighbors, row-major from the south-west.
    pub fn neighborhood(&self) -> [Cell; NEIGHBORHOOD_SIZE] {
        std::array::from_fn(|idx| {
            let lat_steps = (idx / 3) as i32 - 1;
            let lon_steps = (idx % 3) as i32 - 1;
            self.offset(lat_steps, lon_steps)
        })
    }
}

/// Canonical geobox key string.
///
/// Keys are created by the codec or validated by [`GeoboxKey::parse`]; there
/// is no way to hold a malformed one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GeoboxKey(String);

/// Corner decimals recovered from a stored key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBounds {
    pub resolution: u32,
    pub north: BigDecimal,
    pub west: BigDecimal,
    pub south: BigDecimal,
    pub east: BigDecimal,
}

impl GeoboxKey {
    /// Validates a stored key string.
    ///
    /// Accepts exactly four `-?digits.digits` fields joined by `|`, all with
    /// the same positive number of fractional digits, describing a cell with
    /// north above south and west left of east.
    pub fn parse(s: &str) -> Result<Self> {
        Self::decode(s)?;
        Ok(GeoboxKey(s.to_string()))
    }

    /// Corner values and resolution of this key.
    pub fn bounds(&self) -> Result<KeyBounds> {
        Self::decode(&self.0)
    }

    /// Fractional digits per field.
    pub fn resolution(&self) -> u32 {
        self.0
            .split('|')
            .next()
            .and_then(|field| field.split_once('.'))
            .map_or(0, |(_, frac)| frac.len() as u32)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn decode(s: &str) -> Result<KeyBounds> {
        let fields: Vec<&str> = s.split('|').collect();
        if fields.len() != 4 {
            return Err(GeoboxError::malformed_key(
                s,
                format!("expected 4 fields, found {}", fields.len()),
            ));
        }

        let mut resolution = None;
        let mut values = Vec::with_capacity(4);
        for field in &fields {
            let frac_len = check_fixed_point(field)
                .ok_or_else(|| GeoboxError::malformed_key(s, format!("bad field {:?}", field)))?;
            match resolution {
                None => resolution = Some(frac_len),
                Some(r) if r != frac_len => {
                    return Err(GeoboxError::malformed_key(
                        s,
                        format!("mixed resolutions {} and {}", r, frac_len),
                    ));
                }
                Some(_) => {}
            }
            let value = BigDecimal::from_str(field)
                .map_err(|e| GeoboxError::malformed_key(s, e.to_string()))?;
            values.push(value);
        }

        let mut values = values.into_iter();
        let (Some(north), Some(west), Some(south), Some(east), Some(resolution)) = (
            values.next(),
            values.next(),
            values.next(),
            values.next(),
            resolution,
        ) else {
            return Err(GeoboxError::malformed_key(s, "missing field"));
        };

        if north <= south {
            return Err(GeoboxError::malformed_key(s, "north corner is not above south"));
        }
        if west >= east {
            return Err(GeoboxError::malformed_key(s, "west corner is not left of east"));
        }

        Ok(KeyBounds {
            resolution: resolution as u32,
            north,
            west,
            south,
            east,
        })
    }
}

/// Returns the fractional digit count of a `-?\d+\.\d+` field.
fn check_fixed_point(field: &str) -> Option<usize> {
    let unsigned = field.strip_prefix('-').unwrap_or(field);
    let (int_part, frac_part) = unsigned.split_once('.')?;
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if all_digits(int_part) && all_digits(frac_part) {
        Some(frac_part.len())
    } else {
        None
    }
}

impl FromStr for GeoboxKey {
    type Err = GeoboxError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for GeoboxKey {
    type Error = GeoboxError;

    fn try_from(s: String) -> Result<Self> {
        Self::decode(&s)?;
        Ok(GeoboxKey(s))
    }
}

impl From<GeoboxKey> for String {
    fn from(key: GeoboxKey) -> Self {
        key.0
    }
}

impl AsRef<str> for GeoboxKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GeoboxKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Computes the geobox key for a coordinate.
///
/// # Examples
///
/// ```rust
/// use geobox::{Coordinate, geobox::compute};
///
/// let sf = Coordinate::parse("37.78452", "-122.39532")?;
/// let key = compute(&sf, 6, 10)?;
/// assert_eq!(key.as_str(), "37.784530|-122.395330|37.784520|-122.395320");
/// # Ok::<(), geobox::GeoboxError>(())
/// ```
pub fn compute(coord: &Coordinate, resolution: u32, slice: u32) -> Result<GeoboxKey> {
    Ok(Cell::compute(coord, resolution, slice)?.key())
}

/// Computes the keys of the 3×3 block of cells centred on the coordinate's cell.
///
/// The centre key (index 4) equals [`compute`] for the same inputs.
pub fn compute_neighborhood(
    coord: &Coordinate,
    resolution: u32,
    slice: u32,
) -> Result<[GeoboxKey; NEIGHBORHOOD_SIZE]> {
    let primary = Cell::compute(coord, resolution, slice)?;
    Ok(primary.neighborhood().map(|cell| cell.key()))
}
