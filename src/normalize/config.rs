//! Normalization configuration options

use serde::{Deserialize, Serialize};

use crate::error::FerroError;
use crate::structural::CopyNumberPolicy;

/// Configuration for variant normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct NormalizeConfig {
    /// Thresholds used to re-derive copy-number kinds
    pub copy_number: CopyNumberPolicy,

    /// Whether [`Normalizer::decompose`](super::Normalizer::decompose) splits
    /// MNVs into SNVs
    pub decompose_mnv: bool,
}

impl NormalizeConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the copy-number policy
    pub fn with_copy_number_policy(mut self, policy: CopyNumberPolicy) -> Self {
        self.copy_number = policy;
        self
    }

    /// Enable or disable MNV decomposition
    pub fn with_mnv_decomposition(mut self, decompose: bool) -> Self {
        self.decompose_mnv = decompose;
        self
    }

    /// Check the configuration for contradictions
    pub fn validate(&self) -> Result<(), FerroError> {
        self.copy_number.validate()
    }
}
