//! Symbolic alternate classification

use crate::model::allele;
use crate::model::VariantKind;

use super::copy_number::CopyNumberPolicy;

/// Symbolic type identifiers and the kind they map to
const SYMBOLIC_TYPES: [(&str, VariantKind); 5] = [
    ("DEL", VariantKind::Deletion),
    ("DUP", VariantKind::Duplication),
    ("INV", VariantKind::Inversion),
    ("INS", VariantKind::Insertion),
    ("CNV", VariantKind::CopyNumber),
];

/// Classification of a symbolic alternate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolicAllele {
    /// Kind the token maps to
    pub kind: VariantKind,
    /// Copy number carried by `<CNk>`
    pub copy_number: Option<u32>,
}

impl SymbolicAllele {
    /// Whether a key of this kind needs an explicit end (or length)
    pub fn requires_end(&self) -> bool {
        !matches!(
            self.kind,
            VariantKind::Insertion | VariantKind::NoVariation
        )
    }
}

/// Classify a `<...>` token
///
/// Only the first `:`-separated identifier decides the type, so
/// `<DUP:TANDEM>` and `<INS:ME:ALU>` map to their base types.
pub fn classify_symbolic(alternate: &str, policy: &CopyNumberPolicy) -> SymbolicAllele {
    if allele::is_placeholder(alternate) {
        return SymbolicAllele {
            kind: VariantKind::NoVariation,
            copy_number: None,
        };
    }

    let inner = alternate
        .strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
        .unwrap_or(alternate);
    let id = inner.split(':').next().unwrap_or(inner);

    if let Some(k) = parse_copy_number_token(id) {
        return SymbolicAllele {
            kind: policy.classify(Some(k)),
            copy_number: Some(k),
        };
    }

    let kind = SYMBOLIC_TYPES
        .iter()
        .find(|(token, _)| token.eq_ignore_ascii_case(id))
        .map(|(_, kind)| *kind)
        .unwrap_or(VariantKind::Sv);

    SymbolicAllele {
        kind,
        copy_number: None,
    }
}

/// `CN<digits>` -> copy number, matched case-insensitively like the other tokens
fn parse_copy_number_token(id: &str) -> Option<u32> {
    let digits = id
        .get(..2)
        .filter(|prefix| prefix.eq_ignore_ascii_case("CN"))
        .and_then(|_| id.get(2..))?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
