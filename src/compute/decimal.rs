//! Exact fixed-point arithmetic for cell quantization.
//!
//! Coordinates are snapped to a grid using decimal arithmetic only. Binary
//! floating point would make two coordinates that read identically at the
//! target resolution land in different cells, so every value here is a
//! [`BigDecimal`] and every intermediate step works on scaled integers.

use bigdecimal::{BigDecimal, RoundingMode};
use num_bigint::{BigInt, Sign};

/// Number of guard digits kept beyond the resolution.
pub const GUARD_DIGITS: u64 = 3;

/// Working precision for one geobox computation.
///
/// A context is a plain value created per computation and handed to every
/// quantization call. Nothing is shared between threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalContext {
    precision: u64,
}

impl DecimalContext {
    /// Context with an explicit number of significant digits.
    pub fn new(precision: u64) -> Self {
        Self {
            precision: precision.max(1),
        }
    }

    /// Context used for keys at `resolution` fractional digits.
    pub fn for_resolution(resolution: u32) -> Self {
        Self::new(u64::from(resolution) + GUARD_DIGITS)
    }

    /// Significant digits retained by arithmetic results.
    pub fn precision(&self) -> u64 {
        self.precision
    }

    /// Rounds `value` half-even to the working precision.
    pub fn round(&self, value: &BigDecimal) -> BigDecimal {
        let digits = value.digits();
        if digits <= self.precision {
            return value.clone();
        }
        let excess = (digits - self.precision) as i64;
        let (_, scale) = value.as_bigint_and_exponent();
        value.with_scale_round(scale - excess, RoundingMode::HalfEven)
    }

    /// Snaps `coord` onto the grid of width `step`.
    ///
    /// Positive coordinates move to the grid line strictly above them.
    /// Non-positive coordinates drop their remainder, which carries the sign
    /// of the coordinate, so they move to the grid line toward zero.
    ///
    /// When the quotient `coord / step` needs more digits than the working
    /// precision can hold, the coordinate already sits on that grid as far as
    /// this context can tell, and it is returned unchanged.
    pub fn round_cell(&self, coord: &BigDecimal, step: &BigDecimal) -> BigDecimal {
        let (coord_int, step_int, scale) = align(coord, step);
        if step_int.sign() != Sign::Plus {
            return coord.clone();
        }

        let quotient = &coord_int / &step_int;
        if digit_count(&quotient) > self.precision {
            log::trace!(
                "Quantization of {} by {} exceeds precision {}, keeping coordinate",
                coord,
                step,
                self.precision
            );
            return coord.clone();
        }

        let remainder = &coord_int - &quotient * &step_int;
        let snapped = if coord_int.sign() == Sign::Plus {
            coord_int - remainder + step_int
        } else {
            coord_int - remainder
        };
        self.round(&BigDecimal::new(snapped, scale))
    }
}

/// Grid width `slice * 10^-resolution` as an exact decimal.
pub fn step(resolution: u32, slice: u32) -> BigDecimal {
    BigDecimal::new(BigInt::from(slice), i64::from(resolution))
}

/// Formats `value` with exactly `resolution` fractional digits.
///
/// Rounds half-even, pads with trailing zeros and never uses exponent
/// notation. A value that rounds to zero is printed without a sign.
pub fn format_fixed(value: &BigDecimal, resolution: u32) -> String {
    let frac = resolution as usize;
    let (digits, _) = value
        .with_scale_round(i64::from(resolution), RoundingMode::HalfEven)
        .into_bigint_and_exponent();

    let mut magnitude = digits.magnitude().to_str_radix(10);
    if magnitude.len() <= frac {
        magnitude = format!("{:0>width$}", magnitude, width = frac + 1);
    }
    let (int_part, frac_part) = magnitude.split_at(magnitude.len() - frac);

    let mut out = String::with_capacity(magnitude.len() + 2);
    if digits.sign() == Sign::Minus {
        out.push('-');
    }
    out.push_str(int_part);
    if frac > 0 {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

/// Brings both values to a common non-negative scale and returns their
/// unscaled integers.
fn align(a: &BigDecimal, b: &BigDecimal) -> (BigInt, BigInt, i64) {
    let (_, a_scale) = a.as_bigint_and_exponent();
    let (_, b_scale) = b.as_bigint_and_exponent();
    let scale = a_scale.max(b_scale).max(0);
    let (a_int, _) = a.with_scale(scale).into_bigint_and_exponent();
    let (b_int, _) = b.with_scale(scale).into_bigint_and_exponent();
    (a_int, b_int, scale)
}

fn digit_count(value: &BigInt) -> u64 {
    value.magnitude().to_str_radix(10).len() as u64
}
