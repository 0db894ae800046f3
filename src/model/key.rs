//! Canonical variant key
//!
//! # Coordinate System
//!
//! | Field | Basis | Notes |
//! |-------|-------|-------|
//! | `start` | 1-based | First reference base covered by the variant |
//! | `end` | 1-based, inclusive | `start - 1` for an empty reference (insertion) |
//!
//! For sequence kinds `end = start + len(reference) - 1` always holds. For
//! symbolic kinds the end is explicit and the reference is an anchor base (or
//! the `N` placeholder).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::FerroError;

use super::allele;
use super::builder::VariantKeyBuilder;
use super::kind::VariantKind;
use super::structural::{ConfidenceInterval, StructuralVariation};

/// Canonical, plus-strand, coordinate-based variant
///
/// Fields are private: a key is created through [`VariantKeyBuilder`] (or a
/// parser that uses it) and is read-only afterwards. Normalization returns a
/// new key. Deserialized keys are rebuilt through the builder, so they carry
/// the same guarantees.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawVariantKey")]
pub struct VariantKey {
    chromosome: String,
    start: u64,
    end: u64,
    reference: String,
    alternate: String,
    kind: VariantKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    structural: Option<StructuralVariation>,
}

/// Serialized form of a [`VariantKey`] before validation
#[derive(Deserialize)]
struct RawVariantKey {
    chromosome: String,
    start: u64,
    end: u64,
    reference: String,
    alternate: String,
    kind: VariantKind,
    #[serde(default)]
    structural: Option<StructuralVariation>,
}

impl TryFrom<RawVariantKey> for VariantKey {
    type Error = FerroError;

    fn try_from(raw: RawVariantKey) -> Result<Self, Self::Error> {
        let mut builder = VariantKey::builder(raw.chromosome, raw.start)
            .reference(&raw.reference)
            .alternate(&raw.alternate)
            .end(raw.end);
        if let Some(sv) = &raw.structural {
            if let Some(cn) = sv.copy_number {
                builder = builder.copy_number(cn);
            }
            if let Some(ci) = sv.ci_start {
                builder = builder.ci_start(ci);
            }
            if let Some(ci) = sv.ci_end {
                builder = builder.ci_end(ci);
            }
            if let (Some(left), Some(right)) = (&sv.left_ins_seq, &sv.right_ins_seq) {
                builder = builder.insertion_fragments(left, right);
            }
        }
        let key = builder.build()?;

        // Copy-number kinds depend on the policy the key was classified with
        if key.kind == raw.kind || (key.kind.is_copy_number() && raw.kind.is_copy_number()) {
            Ok(key.with_kind(raw.kind))
        } else {
            Err(FerroError::malformed(
                0,
                format!("key {} is a {}, not a {}", key, key.kind, raw.kind),
            ))
        }
    }
}

impl VariantKey {
    /// Start a staged builder
    pub fn builder(chromosome: impl Into<String>, start: u64) -> VariantKeyBuilder {
        VariantKeyBuilder::new(chromosome, start)
    }

    /// Assemble a key from already-validated parts
    pub(crate) fn from_parts(
        chromosome: String,
        start: u64,
        end: u64,
        reference: String,
        alternate: String,
        kind: VariantKind,
        structural: Option<StructuralVariation>,
    ) -> Self {
        Self {
            chromosome,
            start,
            end,
            reference,
            alternate,
            kind,
            structural,
        }
    }

    /// Copy of this key with new sequence alleles and coordinates
    pub(crate) fn with_alleles(
        &self,
        start: u64,
        end: u64,
        reference: String,
        alternate: String,
        kind: VariantKind,
    ) -> Self {
        Self {
            chromosome: self.chromosome.clone(),
            start,
            end,
            reference,
            alternate,
            kind,
            structural: self.structural.clone(),
        }
    }

    /// Copy of this key with a different kind
    pub(crate) fn with_kind(&self, kind: VariantKind) -> Self {
        Self {
            kind,
            ..self.clone()
        }
    }

    pub fn chromosome(&self) -> &str {
        &self.chromosome
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn alternate(&self) -> &str {
        &self.alternate
    }

    pub fn kind(&self) -> VariantKind {
        self.kind
    }

    /// Structural detail; present only for symbolic and breakend alternates
    pub fn structural(&self) -> Option<&StructuralVariation> {
        self.structural.as_ref()
    }

    /// True when the alternate is a `<...>` token or breakend notation
    pub fn is_structural(&self) -> bool {
        self.structural.is_some()
    }

    /// True when the alternate is a `<...>` token
    pub fn is_symbolic(&self) -> bool {
        allele::is_symbolic(&self.alternate)
    }

    /// Length of the variant
    ///
    /// Sequence kinds use the longer allele, symbolic kinds the explicit span
    /// and breakends their reference.
    pub fn length(&self) -> u64 {
        match self.kind {
            VariantKind::Breakend => self.reference.len() as u64,
            _ if self.is_symbolic() => self.end.saturating_sub(self.start).saturating_add(1),
            _ => self.reference.len().max(self.alternate.len()) as u64,
        }
    }

    /// Text written in place of the alternate when rendering
    fn display_alternate(&self) -> String {
        if let Some(sv) = &self.structural {
            if sv.has_insertion_fragments() {
                return format!(
                    "{}...{}",
                    sv.left_ins_seq.as_deref().unwrap_or(""),
                    sv.right_ins_seq.as_deref().unwrap_or("")
                );
            }
        }
        allele::display(&self.alternate).to_string()
    }
}

fn write_coordinate(
    f: &mut fmt::Formatter<'_>,
    pos: u64,
    ci: Option<&ConfidenceInterval>,
) -> fmt::Result {
    match ci {
        Some(ci) => write!(f, "{}<{}<{}", ci.left, pos, ci.right),
        None => write!(f, "{}", pos),
    }
}

/// Canonical display form
///
/// - sequence: `chrom:start:ref:alt` (empty alleles as `-`)
/// - symbolic: `chrom:start-end:ref:<ALT>` with optional `a<b<c` decorations
/// - breakend: `chrom:start:ref:t[p[`
impl fmt::Display for VariantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.chromosome)?;
        match &self.structural {
            Some(sv) if self.kind != VariantKind::Breakend => {
                write_coordinate(f, self.start, sv.ci_start.as_ref())?;
                f.write_str("-")?;
                write_coordinate(f, self.end, sv.ci_end.as_ref())?;
            }
            Some(sv) => write_coordinate(f, self.start, sv.ci_start.as_ref())?,
            None => write!(f, "{}", self.start)?,
        }
        write!(
            f,
            ":{}:{}",
            allele::display(&self.reference),
            self.display_alternate()
        )
    }
}

/// Additional alternate allele at a multi-allelic site
///
/// Carries its own coordinates because a secondary alternate may span a
/// different range than the primary one (e.g. a deletion next to an SNV).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecondaryAllele {
    pub chromosome: String,
    pub start: u64,
    pub end: u64,
    pub reference: String,
    pub alternate: String,
    pub kind: VariantKind,
}

impl SecondaryAllele {
    /// Sequence secondary allele; end and kind follow from the alleles
    pub fn new(
        chromosome: impl Into<String>,
        start: u64,
        reference: impl Into<String>,
        alternate: impl Into<String>,
    ) -> Self {
        let reference = reference.into();
        let alternate = alternate.into();
        let end = start
            .saturating_add(reference.len() as u64)
            .saturating_sub(1);
        let kind = VariantKind::classify_sequence(&reference, &alternate);
        Self {
            chromosome: chromosome.into(),
            start,
            end,
            reference,
            alternate,
            kind,
        }
    }

    /// Secondary allele with an explicit span and kind (symbolic alternates)
    pub fn with_span(
        chromosome: impl Into<String>,
        start: u64,
        end: u64,
        reference: impl Into<String>,
        alternate: impl Into<String>,
        kind: VariantKind,
    ) -> Self {
        Self {
            chromosome: chromosome.into(),
            start,
            end,
            reference: reference.into(),
            alternate: alternate.into(),
            kind,
        }
    }

    /// Secondary allele carrying the coordinates of a canonical key
    pub fn from_key(key: &VariantKey) -> Self {
        Self {
            chromosome: key.chromosome().to_string(),
            start: key.start(),
            end: key.end(),
            reference: key.reference().to_string(),
            alternate: key.alternate().to_string(),
            kind: key.kind(),
        }
    }

    /// True when the alternate is symbolic or breakend notation
    pub fn is_structural(&self) -> bool {
        allele::is_structural(&self.alternate)
    }
}

impl fmt::Display for SecondaryAllele {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.chromosome,
            self.start,
            allele::display(&self.reference),
            allele::display(&self.alternate)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snv() -> VariantKey {
        VariantKey::builder("1", 1000)
            .reference("A")
            .alternate("C")
            .build()
            .unwrap()
    }

    #[test]
    fn test_accessors() {
        let key = snv();
        assert_eq!(key.chromosome(), "1");
        assert_eq!(key.start(), 1000);
        assert_eq!(key.end(), 1000);
        assert_eq!(key.reference(), "A");
        assert_eq!(key.alternate(), "C");
        assert_eq!(key.kind(), VariantKind::Snv);
        assert!(key.structural().is_none());
        assert_eq!(key.length(), 1);
    }

    #[test]
    fn test_display_sequence() {
        assert_eq!(snv().to_string(), "1:1000:A:C");

        let ins = VariantKey::builder("1", 1001)
            .reference("")
            .alternate("T")
            .build()
            .unwrap();
        assert_eq!(ins.to_string(), "1:1001:-:T");
        assert_eq!(ins.end(), 1000);
    }

    #[test]
    fn test_display_symbolic() {
        let key = VariantKey::builder("1", 1000)
            .reference("A")
            .alternate("<DEL>")
            .end(1100)
            .build()
            .unwrap();
        assert_eq!(key.to_string(), "1:1000-1100:A:<DEL>");
        assert_eq!(key.length(), 101);
    }

    #[test]
    fn test_display_confidence_intervals() {
        let key = VariantKey::builder("1", 1000)
            .reference("A")
            .alternate("<DUP>")
            .end(2000)
            .ci_start(ConfidenceInterval {
                left: 990,
                right: 1010,
            })
            .ci_end(ConfidenceInterval {
                left: 1995,
                right: 2005,
            })
            .build()
            .unwrap();
        assert_eq!(key.to_string(), "1:990<1000<1010-1995<2000<2005:A:<DUP>");
    }

    #[test]
    fn test_display_breakend() {
        let key = VariantKey::builder("1", 800001)
            .reference("A")
            .alternate("A[2:321681[")
            .build()
            .unwrap();
        assert_eq!(key.to_string(), "1:800001:A:A[2:321681[");
        assert_eq!(key.length(), 1);
    }

    #[test]
    fn test_secondary_allele_new() {
        let sec = SecondaryAllele::new("1", 100, "AT", "");
        assert_eq!(sec.end, 101);
        assert_eq!(sec.kind, VariantKind::Deletion);
        assert_eq!(sec.to_string(), "1:100:AT:-");

        let ins = SecondaryAllele::new("1", 100, "", "G");
        assert_eq!(ins.end, 99);
        assert_eq!(ins.kind, VariantKind::Insertion);
    }

    #[test]
    fn test_secondary_from_key() {
        let sec = SecondaryAllele::from_key(&snv());
        assert_eq!(sec.start, 1000);
        assert_eq!(sec.alternate, "C");
        assert!(!sec.is_structural());
    }

    #[test]
    fn test_serde_round_trip() {
        let key = snv();
        let json = serde_json::to_string(&key).unwrap();
        assert!(!json.contains("structural"));
        let back: VariantKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }

    #[test]
    fn test_serde_round_trip_structural() {
        let key = VariantKey::builder("1", 1000)
            .reference("N")
            .alternate("<DUP>")
            .end(2000)
            .ci_start(ConfidenceInterval {
                left: 990,
                right: 1010,
            })
            .build()
            .unwrap();
        let json = serde_json::to_string(&key).unwrap();
        let back: VariantKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }

    #[test]
    fn test_deserialize_rejects_inconsistent_key() {
        // end and reference disagree
        let json = r#"{"chromosome":"1","start":4,"end":3,"reference":"TAC","alternate":"G","kind":"SNV"}"#;
        assert!(serde_json::from_str::<VariantKey>(json).is_err());

        // kind disagrees with the alleles
        let json = r#"{"chromosome":"1","start":4,"end":4,"reference":"T","alternate":"G","kind":"DELETION"}"#;
        assert!(serde_json::from_str::<VariantKey>(json).is_err());

        // alphabet
        let json = r#"{"chromosome":"1","start":4,"end":4,"reference":"T","alternate":"R","kind":"SNV"}"#;
        assert!(serde_json::from_str::<VariantKey>(json).is_err());

        // symbolic end must not precede the start
        let json = r#"{"chromosome":"1","start":4,"end":4,"reference":"T","alternate":"<DEL>","kind":"DELETION"}"#;
        assert!(serde_json::from_str::<VariantKey>(json).is_ok());
        let json = r#"{"chromosome":"1","start":4,"end":2,"reference":"T","alternate":"<DEL>","kind":"DELETION"}"#;
        assert!(serde_json::from_str::<VariantKey>(json).is_err());
    }
}
