//! Compute layer for cell quantization.
//!
//! This module holds the arithmetic that turns coordinates into grid cells:
//! - Exact decimal quantization with an explicit working precision
//! - Coordinate and granularity validation
//!
//! Nothing here touches a store; every function is pure.

pub mod decimal;
pub mod validation;

pub use decimal::{DecimalContext, format_fixed, step};
