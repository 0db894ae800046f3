//! Staged construction of [`VariantKey`]
//!
//! The builder collects raw fields from a parser or caller, resolves strand,
//! validates allele alphabets and fills structural detail. Missing pieces that
//! a symbolic alternate needs fail explicitly instead of being defaulted.

use crate::error::FerroError;
use crate::notation::breakend::{anchor_base, parse_breakend};
use crate::strand::{self, Strand};
use crate::structural::{classify_symbolic, CopyNumberPolicy};

use super::allele::{self, Alphabet};
use super::key::VariantKey;
use super::kind::VariantKind;
use super::structural::{ConfidenceInterval, StructuralVariation};

/// Builder for [`VariantKey`]
///
/// # Example
///
/// ```
/// use ferro_varnorm::{VariantKey, VariantKind};
///
/// let key = VariantKey::builder("1", 1000)
///     .reference("A")
///     .alternate("<DEL>")
///     .end(1100)
///     .build()
///     .unwrap();
/// assert_eq!(key.kind(), VariantKind::Deletion);
/// assert_eq!(key.length(), 101);
/// ```
#[derive(Debug, Clone)]
pub struct VariantKeyBuilder {
    chromosome: String,
    start: u64,
    reference: Option<String>,
    alternate: Option<String>,
    end: Option<u64>,
    sv_length: Option<u64>,
    copy_number: Option<u32>,
    ci_start: Option<ConfidenceInterval>,
    ci_end: Option<ConfidenceInterval>,
    insertion_fragments: Option<(String, String)>,
    strand: Strand,
    policy: CopyNumberPolicy,
}

impl VariantKeyBuilder {
    /// Start a key on `chromosome` at 1-based `start`
    pub fn new(chromosome: impl Into<String>, start: u64) -> Self {
        Self {
            chromosome: chromosome.into(),
            start,
            reference: None,
            alternate: None,
            end: None,
            sv_length: None,
            copy_number: None,
            ci_start: None,
            ci_end: None,
            insertion_fragments: None,
            strand: Strand::Plus,
            policy: CopyNumberPolicy::default(),
        }
    }

    /// Reference allele; `-` and `.` mean empty
    pub fn reference(mut self, reference: impl AsRef<str>) -> Self {
        self.reference = Some(allele::from_display(reference.as_ref()).to_string());
        self
    }

    /// Alternate allele; `-` and `.` mean empty
    pub fn alternate(mut self, alternate: impl AsRef<str>) -> Self {
        self.alternate = Some(allele::from_display(alternate.as_ref()).to_string());
        self
    }

    /// Explicit end coordinate (symbolic alternates)
    pub fn end(mut self, end: u64) -> Self {
        self.end = Some(end);
        self
    }

    /// Structural length, used to derive the end when none is given
    pub fn sv_length(mut self, length: u64) -> Self {
        self.sv_length = Some(length);
        self
    }

    pub fn copy_number(mut self, copy_number: u32) -> Self {
        self.copy_number = Some(copy_number);
        self
    }

    pub fn ci_start(mut self, ci: ConfidenceInterval) -> Self {
        self.ci_start = Some(ci);
        self
    }

    pub fn ci_end(mut self, ci: ConfidenceInterval) -> Self {
        self.ci_end = Some(ci);
        self
    }

    /// Known flanking fragments of an insertion whose full sequence is unknown
    ///
    /// The alternate becomes `<INS>`.
    pub fn insertion_fragments(mut self, left: impl Into<String>, right: impl Into<String>) -> Self {
        self.insertion_fragments = Some((left.into(), right.into()));
        self.alternate = Some("<INS>".to_string());
        self
    }

    /// Strand the allele text was written against
    pub fn strand(mut self, strand: Strand) -> Self {
        self.strand = strand;
        self
    }

    /// Policy used to classify copy numbers
    pub fn copy_number_policy(mut self, policy: CopyNumberPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Validate the collected fields and produce the key
    pub fn build(mut self) -> Result<VariantKey, FerroError> {
        if self.chromosome.is_empty() {
            return Err(FerroError::malformed(0, "chromosome is empty"));
        }
        if self.start == 0 {
            return Err(FerroError::malformed(
                0,
                "start position must be at least 1",
            ));
        }
        let reference = self
            .reference
            .take()
            .ok_or_else(|| FerroError::malformed(0, "reference allele not set"))?;
        let alternate = self
            .alternate
            .take()
            .ok_or_else(|| FerroError::malformed(0, "alternate allele not set"))?;

        if self.insertion_fragments.is_some() || allele::is_structural(&alternate) {
            self.build_structural(reference, alternate)
        } else {
            self.build_sequence(reference, alternate)
        }
    }

    fn build_sequence(self, reference: String, alternate: String) -> Result<VariantKey, FerroError> {
        if self.copy_number.is_some()
            || self.ci_start.is_some()
            || self.ci_end.is_some()
            || self.sv_length.is_some()
        {
            return Err(FerroError::malformed(
                0,
                format!(
                    "structural fields need a symbolic or breakend alternate, found '{}'",
                    allele::display(&alternate)
                ),
            ));
        }

        let (reference, alternate) = match self.strand {
            Strand::Plus => (
                allele::validate_bases(&reference, Alphabet::AcgtN)?,
                allele::validate_bases(&alternate, Alphabet::AcgtN)?,
            ),
            Strand::Minus => (
                strand::resolve(&reference, Strand::Minus)?,
                strand::resolve(&alternate, Strand::Minus)?,
            ),
        };

        let end = span_end(self.start, reference.len())?;
        if let Some(given) = self.end {
            if given != end {
                return Err(FerroError::malformed(
                    0,
                    format!(
                        "end {} does not match reference '{}' starting at {}",
                        given,
                        allele::display(&reference),
                        self.start
                    ),
                ));
            }
        }

        let kind = VariantKind::classify_sequence(&reference, &alternate);
        Ok(VariantKey::from_parts(
            self.chromosome,
            self.start,
            end,
            reference,
            alternate,
            kind,
            None,
        ))
    }

    fn build_structural(
        self,
        reference: String,
        alternate: String,
    ) -> Result<VariantKey, FerroError> {
        if self.strand.is_minus() {
            return Err(FerroError::unsupported(
                alternate,
                "structural alternates are written on the plus strand",
            ));
        }
        let reference = allele::validate_bases(&reference, Alphabet::AcgtN)?;

        let mut sv = StructuralVariation::new();
        if let Some((left, right)) = &self.insertion_fragments {
            sv.left_ins_seq = Some(allele::validate_bases(left, Alphabet::AcgtN)?);
            sv.right_ins_seq = Some(allele::validate_bases(right, Alphabet::AcgtN)?);
        }

        let (kind, end) = if allele::is_symbolic(&alternate) {
            let symbolic = classify_symbolic(&alternate, &self.policy);
            sv.copy_number = symbolic.copy_number.or(self.copy_number);
            let kind = if symbolic.kind.is_copy_number() {
                self.policy.classify(sv.copy_number)
            } else {
                symbolic.kind
            };

            let end = match (self.end, self.sv_length) {
                (Some(end), _) => end,
                (None, Some(0)) => {
                    return Err(FerroError::malformed(0, "structural length must be positive"))
                }
                (None, Some(length)) => self
                    .start
                    .checked_add(length - 1)
                    .ok_or_else(|| position_overflow(self.start))?,
                (None, None) if symbolic.requires_end() => {
                    return Err(FerroError::IncompleteStructural {
                        alternate,
                        missing: "end",
                    })
                }
                (None, None) => span_end(self.start, reference.len().max(1))?,
            };
            if end < self.start {
                return Err(FerroError::malformed(
                    0,
                    format!("end {} precedes start {}", end, self.start),
                ));
            }
            (kind, end)
        } else {
            sv.breakend = Some(parse_breakend(&alternate)?);
            check_anchor(&reference, &alternate)?;
            sv.copy_number = self.copy_number;
            let end = span_end(self.start, reference.len())?;
            if let Some(given) = self.end {
                if given != end {
                    return Err(FerroError::malformed(
                        0,
                        format!("breakend end {} does not match its reference span", given),
                    ));
                }
            }
            (VariantKind::Breakend, end)
        };

        if let Some(ci) = self.ci_start {
            sv.ci_start = Some(ConfidenceInterval::around(self.start, ci.left, ci.right)?);
        }
        if let Some(ci) = self.ci_end {
            sv.ci_end = Some(ConfidenceInterval::around(end, ci.left, ci.right)?);
        }

        Ok(VariantKey::from_parts(
            self.chromosome,
            self.start,
            end,
            reference,
            alternate,
            kind,
            Some(sv),
        ))
    }
}

/// Inclusive end of a span of `len` bases starting at `start` (`start - 1` when empty)
#[inline]
fn span_end(start: u64, len: usize) -> Result<u64, FerroError> {
    start
        .checked_add(len as u64)
        .map(|past| past - 1)
        .ok_or_else(|| position_overflow(start))
}

fn position_overflow(start: u64) -> FerroError {
    FerroError::malformed(0, format!("span starting at {} overflows the coordinate range", start))
}

/// The breakend's anchor base must be the reference base it is joined to
///
/// An `N` on either side matches anything.
fn check_anchor(reference: &str, alternate: &str) -> Result<(), FerroError> {
    if reference.is_empty() || reference == "N" {
        return Ok(());
    }
    let anchor = anchor_base(alternate)?;
    if anchor == "N" || reference.starts_with(&anchor) || reference.ends_with(&anchor) {
        return Ok(());
    }
    Err(FerroError::malformed(
        0,
        format!(
            "breakend anchor '{}' does not match reference '{}'",
            anchor, reference
        ),
    ))
}
