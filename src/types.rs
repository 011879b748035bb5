//! Core value types: exact coordinates and grid granularity.
use crate::compute::validation::{validate_coordinate, validate_granularity};
use crate::error::{GeoboxError, Result};
use bigdecimal::BigDecimal;
use geo::Point;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A latitude/longitude pair held as exact decimals.
///
/// The decimal values feed the geobox codec. A `geo::Point` copy (x = lon,
/// y = lat) is kept for distance calculations, which do not need to be exact.
///
/// # Example
///
/// ```rust
/// use geobox::Coordinate;
///
/// let sf = Coordinate::parse("37.78452", "-122.39532")?;
/// assert_eq!(sf.lat().to_string(), "37.78452");
/// assert_eq!(sf.point().x(), -122.39532);
/// # Ok::<(), geobox::GeoboxError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Coordinate {
    lat: BigDecimal,
    lon: BigDecimal,
    point: Point,
}

impl Coordinate {
    /// Parses both values from their canonical decimal text.
    pub fn parse(lat: &str, lon: &str) -> Result<Self> {
        let lat = parse_decimal("Latitude", lat)?;
        let lon = parse_decimal("Longitude", lon)?;
        Self::from_decimals(lat, lon)
    }

    /// Builds a coordinate from floating point degrees.
    ///
    /// The values go through their shortest round-trip decimal text, so
    /// `37.78452_f64` becomes exactly `37.78452`. Magnitudes so small that
    /// their text needs more than 64 fractional digits are rejected.
    pub fn from_degrees(lat: f64, lon: f64) -> Result<Self> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(GeoboxError::InvalidCoordinate(format!(
                "Coordinates must be finite, got: {}, {}",
                lat, lon
            )));
        }
        Self::parse(&lat.to_string(), &lon.to_string())
    }

    /// Builds a coordinate from decimals that are already exact.
    ///
    /// Range and exponent checks run on the decimals themselves, never on
    /// their rounded `f64` copies.
    pub fn from_decimals(lat: BigDecimal, lon: BigDecimal) -> Result<Self> {
        validate_coordinate(&lat, &lon)?;
        let lat_f = lat.to_f64().ok_or_else(|| {
            GeoboxError::InvalidCoordinate(format!("Latitude not representable: {}", lat))
        })?;
        let lon_f = lon.to_f64().ok_or_else(|| {
            GeoboxError::InvalidCoordinate(format!("Longitude not representable: {}", lon))
        })?;
        Ok(Self {
            lat,
            lon,
            point: Point::new(lon_f, lat_f),
        })
    }

    pub fn lat(&self) -> &BigDecimal {
        &self.lat
    }

    pub fn lon(&self) -> &BigDecimal {
        &self.lon
    }

    /// Point with x = longitude and y = latitude, in degrees.
    pub fn point(&self) -> Point {
        self.point
    }
}

impl FromStr for Coordinate {
    type Err = GeoboxError;

    /// Parses `"lat,lon"`.
    fn from_str(s: &str) -> Result<Self> {
        let (lat, lon) = s.split_once(',').ok_or_else(|| {
            GeoboxError::InvalidCoordinate(format!("Expected \"lat,lon\", got: {:?}", s))
        })?;
        Self::parse(lat, lon)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}

fn parse_decimal(name: &str, text: &str) -> Result<BigDecimal> {
    BigDecimal::from_str(text).map_err(|e| {
        GeoboxError::InvalidCoordinate(format!("{} {:?} is not a decimal number: {}", name, text, e))
    })
}

/// Grid granularity: `resolution` fractional digits and cells `slice` units wide.
///
/// Ordering is lexicographic on `(resolution, slice)`; the search engine uses
/// it to decide whether a tier is still fine enough to probe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Granularity {
    pub resolution: u32,
    pub slice: u32,
}

impl Granularity {
    pub const fn new(resolution: u32, slice: u32) -> Self {
        Self { resolution, slice }
    }

    pub fn validate(&self) -> Result<()> {
        validate_granularity(self.resolution, self.slice)
    }

    /// Cell width `slice * 10^-resolution`.
    pub fn step(&self) -> BigDecimal {
        crate::compute::step(self.resolution, self.slice)
    }

    /// True when this granularity may still be probed under the `min` limit.
    pub fn is_at_least(&self, min: &Granularity) -> bool {
        self >= min
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "resolution={}, slice={}", self.resolution, self.slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_exact_text() {
        let c = Coordinate::parse("37.78452", "-122.39532").unwrap();
        assert_eq!(c.lat(), &BigDecimal::from_str("37.78452").unwrap());
        assert_eq!(c.lon(), &BigDecimal::from_str("-122.39532").unwrap());
        assert_eq!(c.point().y(), 37.78452);
    }

    #[test]
    fn test_from_degrees_matches_parse() {
        let a = Coordinate::from_degrees(37.765914, -122.424817).unwrap();
        let b = Coordinate::parse("37.765914", "-122.424817").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(Coordinate::parse("91", "0").is_err());
        assert!(Coordinate::parse("0", "-180.5").is_err());
        assert!(Coordinate::from_degrees(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_range_uses_exact_decimal() {
        assert!(Coordinate::parse("90.00000000000000001", "0").is_err());
        assert!(Coordinate::parse("0", "180.00000000000000001").is_err());
        assert!(Coordinate::parse("90.00000000000000000", "-180").is_ok());
    }

    #[test]
    fn test_extreme_exponent_rejected() {
        for (lat, lon) in [("1E-20000000", "0"), ("0", "0E+2000000000"), ("0E-100", "1")] {
            assert!(
                matches!(
                    Coordinate::parse(lat, lon),
                    Err(GeoboxError::InvalidCoordinate(_))
                ),
                "accepted {lat},{lon}"
            );
        }
        let tiny = BigDecimal::new(num_bigint::BigInt::from(1), 20_000_000);
        assert!(Coordinate::from_decimals(tiny, BigDecimal::from(0)).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(
            Coordinate::parse("abc", "1"),
            Err(GeoboxError::InvalidCoordinate(_))
        ));
        assert!(Coordinate::from_str("37.7").is_err());
    }

    #[test]
    fn test_from_str_round_trip() {
        let c: Coordinate = "37.78452,-122.39532".parse().unwrap();
        assert_eq!(c.to_string(), "37.78452,-122.39532");
    }

    #[test]
    fn test_granularity_ordering() {
        let min = Granularity::new(2, 0);
        assert!(Granularity::new(2, 5).is_at_least(&min));
        assert!(Granularity::new(3, 16).is_at_least(&min));
        assert!(Granularity::new(2, 0).is_at_least(&min));
        assert!(!Granularity::new(1, 50).is_at_least(&min));
    }
}
