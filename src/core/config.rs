//! Engine configuration with documented defaults
//!
//! Everything the selection engine needs that is not part of a group
//! definition lives here: the random seed, the proportion sampling policy and
//! the default log filter used by the binary.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::Result;

/// Slack subtracted before rounding up, so `0.3 * 10` is 3 and not 4
pub const CEIL_TOLERANCE: f64 = 1e-9;

/// How a group's `proportion` turns a filtered count into a sample size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProportionPolicy {
    /// `ceil(count / proportion)`, clamped to the count.
    ///
    /// Because the result never drops below the filtered count, a group with
    /// `proportion < 1` is shuffled but not reduced.
    #[default]
    Divide,
    /// `ceil(count * proportion)`: use this fraction of the filtered group.
    ///
    /// Only switch to this once the model owner confirms it is intended.
    Multiply,
}

impl ProportionPolicy {
    /// Number of individuals kept from `count` filtered individuals
    pub fn sample_size(&self, count: usize, proportion: f64) -> usize {
        if count == 0 || proportion >= 1.0 {
            return count;
        }
        let raw = match self {
            ProportionPolicy::Divide => count as f64 / proportion,
            ProportionPolicy::Multiply => count as f64 * proportion,
        };
        ((raw - CEIL_TOLERANCE).ceil().max(0.0) as usize).min(count)
    }
}

/// Configuration for the selection engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === RANDOMNESS ===
    /// Seed for the generator handed to every filter and sort call
    ///
    /// Proportional sampling and random sort keys draw from the same
    /// generator, so one seed reproduces a whole run.
    pub seed: u64,

    // === SAMPLING ===
    /// Sample size policy for groups with `proportion < 1`
    pub proportion_policy: ProportionPolicy,

    // === LOGGING ===
    /// Default `tracing` filter directive for the binary
    ///
    /// `RUST_LOG` takes precedence when set.
    pub log_filter: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            proportion_policy: ProportionPolicy::Divide,
            log_filter: "herd_select=info".to_string(),
        }
    }
}

impl EngineConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML; missing keys take their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Build the deterministic generator for one run
    pub fn rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_is_divide() {
        assert_eq!(EngineConfig::default().proportion_policy, ProportionPolicy::Divide);
    }

    #[test]
    fn test_divide_never_reduces_the_group() {
        assert_eq!(ProportionPolicy::Divide.sample_size(10, 0.5), 10);
        assert_eq!(ProportionPolicy::Divide.sample_size(7, 0.1), 7);
    }

    #[test]
    fn test_multiply_takes_a_fraction() {
        assert_eq!(ProportionPolicy::Multiply.sample_size(10, 0.5), 5);
        assert_eq!(ProportionPolicy::Multiply.sample_size(10, 0.25), 3);
        assert_eq!(ProportionPolicy::Multiply.sample_size(10, 0.3), 3);
        assert_eq!(ProportionPolicy::Multiply.sample_size(0, 0.25), 0);
    }

    #[test]
    fn test_full_proportion_keeps_count() {
        assert_eq!(ProportionPolicy::Multiply.sample_size(9, 1.0), 9);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = EngineConfig::from_toml_str("seed = 7\n").unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.proportion_policy, ProportionPolicy::Divide);
        assert_eq!(config.log_filter, "herd_select=info");
    }

    #[test]
    fn test_policy_from_toml() {
        let config = EngineConfig::from_toml_str("proportion_policy = \"multiply\"\n").unwrap();
        assert_eq!(config.proportion_policy, ProportionPolicy::Multiply);
    }
}
