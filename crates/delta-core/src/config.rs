//! Engine configuration.
//!
//! Every field has a default, so an empty TOML document is a valid configuration:
//!
//! ```toml
//! algorithm = "patience"
//! word_diff_line_limit = 20
//! word_granularity = true
//! ```

use crate::error::DiffError;
use crate::script::SimilarDiffProvider;
use serde::Deserialize;

/// Line diff algorithm used by [`SimilarDiffProvider`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffAlgorithm {
    /// Myers' O(ND) algorithm.
    #[default]
    Myers,
    /// Patience diff; tends to produce more readable hunks for code.
    Patience,
}

impl From<DiffAlgorithm> for similar::Algorithm {
    fn from(value: DiffAlgorithm) -> Self {
        match value {
            DiffAlgorithm::Myers => similar::Algorithm::Myers,
            DiffAlgorithm::Patience => similar::Algorithm::Patience,
        }
    }
}

/// Tunables for diff computation and line-part derivation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// Algorithm for the default diff provider.
    pub algorithm: DiffAlgorithm,
    /// Deltas spanning more lines than this get line-granular line parts instead of word
    /// granular ones.
    pub word_diff_line_limit: usize,
    /// Set to `false` to always derive line parts at line granularity.
    pub word_granularity: bool,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            algorithm: DiffAlgorithm::default(),
            word_diff_line_limit: 20,
            word_granularity: true,
        }
    }
}

impl DiffConfig {
    /// Parse a configuration from TOML. Missing keys fall back to their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, DiffError> {
        toml::from_str(source).map_err(|err| DiffError::Config(err.to_string()))
    }

    /// Default diff provider configured with this algorithm.
    pub fn provider(&self) -> SimilarDiffProvider {
        SimilarDiffProvider::new(self.algorithm)
    }
}
