//! Error types for geobox computation and search.

use thiserror::Error;

/// Errors raised by the codec, the indexer and the search engine.
#[derive(Error, Debug)]
pub enum GeoboxError {
    /// Zero slice, or a resolution outside `1..=64`.
    #[error("Invalid geobox granularity: resolution={resolution}, slice={slice} (resolution must be 1..=64, slice positive)")]
    InvalidResolutionOrSlice { resolution: u32, slice: u32 },

    /// A coordinate that is not a finite decimal inside the geographic range.
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// A stored key that does not match the canonical four-field format.
    #[error("Malformed geobox key {key:?}: {reason}")]
    MalformedKey { key: String, reason: String },

    /// The store failed while probing one tier.
    #[error("Store lookup failed for key {key} at resolution={resolution}, slice={slice}")]
    StoreLookup {
        resolution: u32,
        slice: u32,
        key: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An opening-hours value outside its range.
    #[error("Invalid opening hours: {0}")]
    InvalidHours(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML deserialization error.
    #[cfg(feature = "toml")]
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl GeoboxError {
    pub(crate) fn malformed_key(key: &str, reason: impl Into<String>) -> Self {
        GeoboxError::MalformedKey {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for geobox operations.
pub type Result<T> = std::result::Result<T, GeoboxError>;
