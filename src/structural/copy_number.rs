//! Copy-number classification policy
//!
//! Whether a copy number is a gain or a loss is a policy relative to an
//! assumed baseline, not a property of the notation. The default assumes a
//! diploid baseline of 2. Callers override the thresholds for haploid
//! contigs, tumour ploidy, and similar cases.

use serde::{Deserialize, Serialize};

use crate::error::FerroError;
use crate::model::VariantKind;

/// Assumed diploid baseline
pub const DIPLOID_BASELINE: u32 = 2;

/// Thresholds separating copy-number loss, neutral and gain
///
/// `k < loss_below` is a loss, `k > gain_above` is a gain, anything in between
/// is `COPY_NUMBER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CopyNumberPolicy {
    /// Copy numbers strictly below this are losses
    pub loss_below: u32,
    /// Copy numbers strictly above this are gains
    pub gain_above: u32,
}

impl Default for CopyNumberPolicy {
    fn default() -> Self {
        Self::with_baseline(DIPLOID_BASELINE)
    }
}

impl CopyNumberPolicy {
    /// Create a policy with explicit thresholds
    pub fn new(loss_below: u32, gain_above: u32) -> Result<Self, FerroError> {
        let policy = Self {
            loss_below,
            gain_above,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Policy where exactly `baseline` copies is neutral
    pub fn with_baseline(baseline: u32) -> Self {
        Self {
            loss_below: baseline,
            gain_above: baseline,
        }
    }

    /// Check that no copy number is both a gain and a loss
    pub fn validate(&self) -> Result<(), FerroError> {
        if self.loss_below > self.gain_above.saturating_add(1) {
            return Err(FerroError::Config {
                msg: format!(
                    "copy-number thresholds overlap: loss below {} but gain above {}",
                    self.loss_below, self.gain_above
                ),
            });
        }
        Ok(())
    }

    /// Classify a copy number; `None` stays `COPY_NUMBER`
    pub fn classify(&self, copy_number: Option<u32>) -> VariantKind {
        match copy_number {
            Some(k) if k < self.loss_below => VariantKind::CopyNumberLoss,
            Some(k) if k > self.gain_above => VariantKind::CopyNumberGain,
            _ => VariantKind::CopyNumber,
        }
    }
}
