//! Validation for coordinates and grid granularity.
//!
//! Checks run on the exact decimals before any quantization, so the codec
//! only ever sees values with a bounded number of digits.

use crate::error::{GeoboxError, Result};
use bigdecimal::BigDecimal;

/// Largest decimal exponent, positive or negative, accepted for a coordinate
/// and largest key resolution.
pub const MAX_SCALE: i64 = 64;

/// Validates a latitude/longitude pair as exact decimals.
///
/// Latitude: [-90, 90], Longitude: [-180, 180], at most [`MAX_SCALE`]
/// fractional digits each.
///
/// # Examples
///
/// ```
/// use bigdecimal::BigDecimal;
/// use geobox::compute::validation::validate_coordinate;
/// use std::str::FromStr;
///
/// let dec = |s| BigDecimal::from_str(s).unwrap();
/// assert!(validate_coordinate(&dec("37.78452"), &dec("-122.39532")).is_ok());
/// assert!(validate_coordinate(&dec("90.00000000000000001"), &dec("0")).is_err());
/// assert!(validate_coordinate(&dec("1E-20000000"), &dec("0")).is_err());
/// ```
pub fn validate_coordinate(lat: &BigDecimal, lon: &BigDecimal) -> Result<()> {
    check_axis("Latitude", lat, 90)?;
    check_axis("Longitude", lon, 180)
}

fn check_axis(name: &str, value: &BigDecimal, limit: u32) -> Result<()> {
    // The value itself is not printed here: its text can be enormous.
    let (_, scale) = value.as_bigint_and_exponent();
    if !(-MAX_SCALE..=MAX_SCALE).contains(&scale) {
        return Err(GeoboxError::InvalidCoordinate(format!(
            "{} exponent {} outside [-{}, {}]",
            name, -scale, MAX_SCALE, MAX_SCALE
        )));
    }

    if value.abs() > BigDecimal::from(limit) {
        return Err(GeoboxError::InvalidCoordinate(format!(
            "{} out of range [-{}, {}]: {}",
            name, limit, limit, value
        )));
    }
    Ok(())
}

/// Rejects a zero slice, and a resolution outside `1..=MAX_SCALE`, before any
/// arithmetic happens.
///
/// ```
/// use geobox::compute::validation::validate_granularity;
///
/// assert!(validate_granularity(6, 25).is_ok());
/// assert!(validate_granularity(0, 25).is_err());
/// assert!(validate_granularity(6, 0).is_err());
/// assert!(validate_granularity(1_000_000, 5).is_err());
/// ```
pub fn validate_granularity(resolution: u32, slice: u32) -> Result<()> {
    if resolution == 0 || i64::from(resolution) > MAX_SCALE || slice == 0 {
        return Err(GeoboxError::InvalidResolutionOrSlice { resolution, slice });
    }
    Ok(())
}
