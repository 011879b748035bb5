//! Tier table and search configuration.
//!
//! The tier table lists which cell sizes are materialized for every record,
//! finest first. Queries walk the same table in the same order.
use crate::error::{GeoboxError, Result};
use crate::types::Granularity;
use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// One tier of the index.
///
/// Fine tiers store only the record's own cell. Coarse tiers can store the
/// 3×3 neighborhood so a record near a cell edge is still found from the
/// adjacent cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexConfig {
    pub resolution: u32,
    pub slice: u32,
    #[serde(default)]
    pub use_neighborhood: bool,
}

impl IndexConfig {
    pub const fn new(resolution: u32, slice: u32, use_neighborhood: bool) -> Self {
        Self {
            resolution,
            slice,
            use_neighborhood,
        }
    }

    pub fn granularity(&self) -> Granularity {
        Granularity::new(self.resolution, self.slice)
    }
}

/// Tiers materialized by default.
pub const DEFAULT_TIERS: [IndexConfig; 5] = [
    IndexConfig::new(4, 5, true),
    IndexConfig::new(3, 2, true),
    IndexConfig::new(3, 8, false),
    IndexConfig::new(3, 16, false),
    IndexConfig::new(2, 5, false),
];

/// Validated, non-empty, ordered list of tiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<IndexConfig>", into = "Vec<IndexConfig>")]
pub struct IndexTable(Vec<IndexConfig>);

impl IndexTable {
    pub fn new(tiers: Vec<IndexConfig>) -> Result<Self> {
        if tiers.is_empty() {
            return Err(GeoboxError::Config(
                "Index table must contain at least one tier".to_string(),
            ));
        }
        for (idx, tier) in tiers.iter().enumerate() {
            tier.granularity()
                .validate()
                .map_err(|e| GeoboxError::Config(format!("Tier at index {}: {}", idx, e)))?;
        }
        Ok(Self(tiers))
    }

    pub fn tiers(&self) -> &[IndexConfig] {
        &self.0
    }
}

impl Default for IndexTable {
    fn default() -> Self {
        Self(DEFAULT_TIERS.to_vec())
    }
}

impl Deref for IndexTable {
    type Target = [IndexConfig];

    fn deref(&self) -> &[IndexConfig] {
        &self.0
    }
}

impl TryFrom<Vec<IndexConfig>> for IndexTable {
    type Error = GeoboxError;

    fn try_from(tiers: Vec<IndexConfig>) -> Result<Self> {
        Self::new(tiers)
    }
}

impl From<IndexTable> for Vec<IndexConfig> {
    fn from(table: IndexTable) -> Self {
        table.0
    }
}

/// Serializable index and search configuration.
///
/// # Example
///
/// ```rust
/// use geobox::Config;
///
/// let config = Config::default();
/// assert_eq!(config.page_limit, 50);
///
/// let json = r#"{
///     "tiers": [
///         { "resolution": 4, "slice": 5, "use_neighborhood": true },
///         { "resolution": 3, "slice": 8 }
///     ],
///     "max_results": 10,
///     "min_tier": null
/// }"#;
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.tiers.len(), 2);
/// assert!(config.min_tier.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Tiers, finest first.
    #[serde(default)]
    pub tiers: IndexTable,

    /// Distinct records after which no further tier is probed.
    #[serde(default = "Config::default_max_results")]
    pub max_results: usize,

    /// Coarsest granularity a query may reach (None means no limit).
    #[serde(default = "Config::default_min_tier")]
    pub min_tier: Option<Granularity>,

    /// Maximum records returned by one store lookup.
    #[serde(default = "Config::default_page_limit")]
    pub page_limit: usize,
}

impl Config {
    const fn default_max_results() -> usize {
        2
    }

    const fn default_min_tier() -> Option<Granularity> {
        Some(Granularity::new(2, 0))
    }

    const fn default_page_limit() -> usize {
        50
    }

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

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.page_limit == 0 {
            return Err(GeoboxError::Config(
                "Page limit must be greater than zero".to_string(),
            ));
        }
        if self.max_results == 0 {
            return Err(GeoboxError::Config(
                "Max results must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Load and validate a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load and validate a configuration from TOML.
    #[cfg(feature = "toml")]
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tiers: IndexTable::default(),
            max_results: Self::default_max_results(),
            min_tier: Self::default_min_tier(),
            page_limit: Self::default_page_limit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_is_finest_first() {
        let table = IndexTable::default();
        assert_eq!(table.len(), 5);
        assert_eq!(table[0], IndexConfig::new(4, 5, true));
        assert_eq!(table[4], IndexConfig::new(2, 5, false));
    }

    #[test]
    fn test_empty_table_rejected() {
        assert!(matches!(IndexTable::new(vec![]), Err(GeoboxError::Config(_))));
    }

    #[test]
    fn test_zero_slice_tier_rejected() {
        let err = IndexTable::new(vec![IndexConfig::new(3, 0, false)]).unwrap_err();
        assert!(err.to_string().contains("index 0"));
    }

    #[test]
    fn test_json_defaults() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.min_tier, Some(Granularity::new(2, 0)));
    }

    #[test]
    fn test_json_round_trip() {
        let config = Config::default()
            .with_max_results(25)
            .with_min_tier(Some(Granularity::new(3, 8)));
        let json = config.to_json().unwrap();
        assert_eq!(Config::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_json_invalid_tiers_rejected() {
        assert!(Config::from_json(r#"{ "tiers": [] }"#).is_err());
        assert!(Config::from_json(r#"{ "page_limit": 0 }"#).is_err());
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_toml_config() {
        let text = r#"
            max_results = 5
            page_limit = 20

            [[tiers]]
            resolution = 4
            slice = 5
            use_neighborhood = true
        "#;
        let config = Config::from_toml(text).unwrap();
        assert_eq!(config.max_results, 5);
        assert_eq!(config.tiers.len(), 1);
    }
}
