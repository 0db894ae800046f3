//! Variant kinds

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FerroError;

/// Kind of a canonical variant
///
/// Sequence kinds (`Snv` through `Indel`, plus `NoVariation`) are derived from
/// the explicit alleles after trimming. The remaining kinds only occur with a
/// symbolic or breakend alternate and always carry structural detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VariantKind {
    /// Single nucleotide variant
    Snv,
    /// Multi-nucleotide variant (equal-length block, more than one base)
    Mnv,
    /// Insertion (empty reference)
    Insertion,
    /// Deletion (empty alternate)
    Deletion,
    /// Block substitution with unequal non-empty alleles
    Indel,
    /// Duplication
    Duplication,
    /// Inversion
    Inversion,
    /// Copy-number change with neutral or unknown direction
    CopyNumber,
    /// Copy-number gain
    CopyNumberGain,
    /// Copy-number loss
    CopyNumberLoss,
    /// Breakend of a rearrangement junction
    Breakend,
    /// Symbolic structural variant of an unrecognized type
    Sv,
    /// Reference call, `ref == alt`
    NoVariation,
}

impl VariantKind {
    /// All kinds in declaration order
    pub const ALL: [VariantKind; 13] = [
        VariantKind::Snv,
        VariantKind::Mnv,
        VariantKind::Insertion,
        VariantKind::Deletion,
        VariantKind::Indel,
        VariantKind::Duplication,
        VariantKind::Inversion,
        VariantKind::CopyNumber,
        VariantKind::CopyNumberGain,
        VariantKind::CopyNumberLoss,
        VariantKind::Breakend,
        VariantKind::Sv,
        VariantKind::NoVariation,
    ];

    /// Canonical upper-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            VariantKind::Snv => "SNV",
            VariantKind::Mnv => "MNV",
            VariantKind::Insertion => "INSERTION",
            VariantKind::Deletion => "DELETION",
            VariantKind::Indel => "INDEL",
            VariantKind::Duplication => "DUPLICATION",
            VariantKind::Inversion => "INVERSION",
            VariantKind::CopyNumber => "COPY_NUMBER",
            VariantKind::CopyNumberGain => "COPY_NUMBER_GAIN",
            VariantKind::CopyNumberLoss => "COPY_NUMBER_LOSS",
            VariantKind::Breakend => "BREAKEND",
            VariantKind::Sv => "SV",
            VariantKind::NoVariation => "NO_VARIATION",
        }
    }

    /// True for the copy-number family
    pub fn is_copy_number(&self) -> bool {
        matches!(
            self,
            VariantKind::CopyNumber | VariantKind::CopyNumberGain | VariantKind::CopyNumberLoss
        )
    }

    /// Classify explicit (non-symbolic) alleles
    ///
    /// Alleles are expected to be trimmed already; untrimmed input is still
    /// classified by shape (e.g. `AT`/`A` is an `Indel` until trimmed).
    pub fn classify_sequence(reference: &str, alternate: &str) -> VariantKind {
        if reference == alternate {
            return VariantKind::NoVariation;
        }
        match (reference.len(), alternate.len()) {
            (0, _) => VariantKind::Insertion,
            (_, 0) => VariantKind::Deletion,
            (1, 1) => VariantKind::Snv,
            (r, a) if r == a => VariantKind::Mnv,
            _ => VariantKind::Indel,
        }
    }
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VariantKind {
    type Err = FerroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        VariantKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == upper)
            .ok_or_else(|| FerroError::malformed(0, format!("unknown variant kind '{}'", s)))
    }
}
