//! Canonical key to VCF conversion
//!
//! Lays a primary key and its secondary alleles onto one shared coordinate
//! frame and emits a multi-allelic [`VcfRecord`].
//!
//! # Coordinate System
//!
//! | Context | Basis | Notes |
//! |---------|-------|-------|
//! | Key start/end | 1-based, inclusive | `end = start - 1` for empty references |
//! | VCF POS | 1-based | First base of the (possibly anchored) frame |
//! | Frame offsets | 0-based | `position - frame_start` |
//!
//! The frame runs from the smallest start to the largest end over the
//! sequence alleles. Every allele is padded with frame bases to cover the
//! whole frame. When the frame or any padded allele is empty, the base
//! before the frame is fetched from the reference and prepended (at
//! position 1 the base after the frame is appended instead).
//!
//! Symbolic, breakend and placeholder alternates are written as-is. A
//! placeholder may only appear as a secondary allele. Frames wider than the
//! converter's span limit are rejected as conflicts, and uncovered frame bases
//! are fetched one run at a time.
//!
//! # Discards
//!
//! Checked in this order after every rebuild, one discard at a time:
//!
//! 1. an alternate identical to an earlier one once padded ([`DiscardReason::Duplicate`])
//! 2. a secondary whose symbolic-ness differs from the primary's, except
//!    universal placeholders ([`DiscardReason::SymbolicMismatch`])
//! 3. a symbolic secondary spanning a different range than a symbolic
//!    primary ([`DiscardReason::SpanMismatch`])

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::FerroError;
use crate::model::allele::{self, Alphabet};
use crate::model::{SecondaryAllele, VariantKey, VariantKind};
use crate::reference::ReferenceProvider;

use super::genotype::SampleCall;
use super::record::{
    InfoValue, VcfRecord, INFO_CIEND, INFO_CIPOS, INFO_CN, INFO_END, INFO_LEFT_SVINSSEQ,
    INFO_RIGHT_SVINSSEQ, INFO_SVLEN, INFO_SVTYPE,
};

/// Why an alternate was dropped from a multi-allelic record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiscardReason {
    /// Same padded text as an earlier alternate
    Duplicate,
    /// Symbolic alternate next to a sequence primary, or the reverse
    SymbolicMismatch,
    /// Symbolic alternate with a different start/end than the primary
    SpanMismatch,
}

impl DiscardReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscardReason::Duplicate => "duplicate",
            DiscardReason::SymbolicMismatch => "symbolic-mismatch",
            DiscardReason::SpanMismatch => "span-mismatch",
        }
    }
}

impl fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dropped alternate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discard {
    /// Index in `[ref, primary, secondaries...]` (secondaries start at 2)
    pub allele_index: usize,
    /// Alternate as supplied
    pub alternate: String,
    pub reason: DiscardReason,
}

/// Result of converting a key (and its secondaries) to VCF
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VcfConversion {
    pub record: VcfRecord,
    pub discarded: Vec<Discard>,
}

/// One alternate on its way into the record
#[derive(Debug, Clone)]
struct Candidate {
    /// Index in `[ref, primary, secondaries...]`
    index: usize,
    start: u64,
    end: u64,
    reference: String,
    alternate: String,
    /// Written as-is instead of padded
    literal: bool,
    /// Structural and not a universal placeholder
    symbolic: bool,
}

impl Candidate {
    fn new(index: usize, start: u64, end: u64, reference: &str, alternate: &str) -> Self {
        let placeholder = allele::is_placeholder(alternate);
        let structural = allele::is_structural(alternate);
        Self {
            index,
            start,
            end,
            reference: reference.to_string(),
            alternate: alternate.to_string(),
            literal: structural || placeholder,
            symbolic: structural && !placeholder,
        }
    }

    /// Validate sequence alleles and their span; literal alternates pass through
    fn checked(mut self) -> Result<Self, FerroError> {
        if self.literal {
            return Ok(self);
        }
        self.reference = allele::validate_bases(&self.reference, Alphabet::AcgtN)?;
        self.alternate = allele::validate_bases(&self.alternate, Alphabet::AcgtN)?;
        let expected = self
            .start
            .checked_add(self.reference.len() as u64)
            .map(|past| past.saturating_sub(1));
        if self.start == 0 || Some(self.end) != expected {
            return Err(FerroError::malformed(
                0,
                format!(
                    "allele #{} spans {}-{} but its reference '{}' has {} bases",
                    self.index,
                    self.start,
                    self.end,
                    allele::display(&self.reference),
                    self.reference.len()
                ),
            ));
        }
        Ok(self)
    }
}

/// Frame laid over the kept candidates
#[derive(Debug)]
struct Frame {
    pos: u64,
    reference: String,
    /// Rendered alternates, aligned with the kept candidates
    alternates: Vec<String>,
}

/// Widest frame, in reference bases, a converter lays out by default
pub const DEFAULT_MAX_FRAME_SPAN: u64 = 100_000;

/// Converter from canonical keys to VCF records
pub struct KeyToVcfConverter<'a, P: ReferenceProvider> {
    provider: &'a P,
    max_frame_span: u64,
}

impl<'a, P: ReferenceProvider> KeyToVcfConverter<'a, P> {
    /// Create a converter that fetches missing frame and anchor bases from `provider`
    pub fn new(provider: &'a P) -> Self {
        Self {
            provider,
            max_frame_span: DEFAULT_MAX_FRAME_SPAN,
        }
    }

    /// Reject alleles whose shared frame would cover more than `span` bases
    pub fn with_max_frame_span(mut self, span: u64) -> Self {
        self.max_frame_span = span;
        self
    }

    /// Convert a single key
    pub fn convert_key(&self, key: &VariantKey) -> Result<VcfRecord, FerroError> {
        Ok(self.convert(key, &[], &[])?.record)
    }

    /// Convert a primary key with secondary alleles and sample genotypes
    ///
    /// Genotype indices in `samples` refer to `[ref, primary, secondaries...]`.
    /// Indices of discarded alternates become missing calls and later indices
    /// shift down.
    pub fn convert(
        &self,
        primary: &VariantKey,
        secondaries: &[SecondaryAllele],
        samples: &[SampleCall],
    ) -> Result<VcfConversion, FerroError> {
        let chrom = primary.chromosome();
        let location = format!("{}:{}", chrom, primary.start());

        if allele::is_placeholder(primary.alternate()) {
            return Err(FerroError::unsupported(
                primary.to_string(),
                "a placeholder alternate cannot be the primary allele of a record",
            ));
        }

        let mut kept = Vec::with_capacity(secondaries.len() + 1);
        kept.push(
            Candidate::new(
                1,
                primary.start(),
                primary.end(),
                primary.reference(),
                primary.alternate(),
            )
            .checked()?,
        );
        for (i, secondary) in secondaries.iter().enumerate() {
            if secondary.chromosome != chrom {
                return Err(FerroError::MultiallelicConflict {
                    location,
                    msg: format!(
                        "secondary allele {} is on chromosome '{}'",
                        secondary, secondary.chromosome
                    ),
                });
            }
            kept.push(
                Candidate::new(
                    i + 2,
                    secondary.start,
                    secondary.end,
                    &secondary.reference,
                    &secondary.alternate,
                )
                .checked()?,
            );
        }

        let mut discarded = Vec::new();
        let frame = loop {
            let frame = self.build_frame(chrom, &location, primary, &kept)?;
            match find_discard(&kept, &frame) {
                Some((at, reason)) => {
                    let candidate = kept.remove(at);
                    warn!(
                        "{}: discarding alternate #{} '{}' ({})",
                        location,
                        candidate.index,
                        allele::display(&candidate.alternate),
                        reason
                    );
                    discarded.push(Discard {
                        allele_index: candidate.index,
                        alternate: candidate.alternate,
                        reason,
                    });
                }
                None => break frame,
            }
        };

        let mut record = VcfRecord::new(chrom.to_string(), frame.pos, frame.reference, frame.alternates);
        if primary.is_structural() {
            add_structural_info(&mut record, primary);
        }

        let mut mapping = vec![None; secondaries.len() + 2];
        mapping[0] = Some(0);
        for (new_index, candidate) in kept.iter().enumerate() {
            mapping[candidate.index] = Some(new_index + 1);
        }
        record.samples = samples
            .iter()
            .map(|s| SampleCall::new(s.name.clone(), s.genotype.remap(&mapping)))
            .collect();

        Ok(VcfConversion { record, discarded })
    }

    fn build_frame(
        &self,
        chrom: &str,
        location: &str,
        primary: &VariantKey,
        kept: &[Candidate],
    ) -> Result<Frame, FerroError> {
        if kept[0].literal {
            let reference = if primary.reference().is_empty() {
                self.reference_base(chrom, primary.start())?.to_string()
            } else {
                primary.reference().to_string()
            };
            let alternates = kept.iter().map(literal_text).collect();
            return Ok(Frame {
                pos: primary.start(),
                reference,
                alternates,
            });
        }

        let sequence: Vec<&Candidate> = kept.iter().filter(|c| !c.literal).collect();
        let frame_start = sequence.iter().map(|c| c.start).min().unwrap_or(primary.start());
        let frame_end = sequence.iter().map(|c| c.end).max().unwrap_or(primary.end());
        let width = frame_end.saturating_add(1).saturating_sub(frame_start);
        if width > self.max_frame_span {
            return Err(FerroError::MultiallelicConflict {
                location: location.to_string(),
                msg: format!(
                    "alleles span {}-{}, wider than the {} base frame limit",
                    frame_start, frame_end, self.max_frame_span
                ),
            });
        }
        let len = width as usize;

        let mut bases: Vec<Option<char>> = vec![None; len];
        for candidate in &sequence {
            let offset = (candidate.start - frame_start) as usize;
            for (k, base) in candidate.reference.chars().enumerate() {
                match bases[offset + k] {
                    Some(existing) if existing != base => {
                        return Err(FerroError::MultiallelicConflict {
                            location: location.to_string(),
                            msg: format!(
                                "reference base at {} is '{}' for one allele and '{}' for allele #{}",
                                frame_start + (offset + k) as u64,
                                existing,
                                base,
                                candidate.index
                            ),
                        });
                    }
                    _ => bases[offset + k] = Some(base),
                }
            }
        }

        let mut reference = String::with_capacity(len + 1);
        let mut offset = 0;
        while offset < len {
            if let Some(b) = bases[offset] {
                reference.push(b);
                offset += 1;
                continue;
            }
            let run = bases[offset..].iter().take_while(|b| b.is_none()).count();
            reference.push_str(&self.reference_run(chrom, frame_start + offset as u64, run)?);
            offset += run;
        }

        let mut alternates: Vec<String> = kept
            .iter()
            .map(|c| {
                if c.literal {
                    literal_text(c)
                } else {
                    let left = &reference[..(c.start - frame_start) as usize];
                    let right = &reference[(c.end + 1 - frame_start) as usize..];
                    format!("{}{}{}", left, c.alternate, right)
                }
            })
            .collect();

        let mut pos = frame_start;
        let needs_anchor = reference.is_empty()
            || kept
                .iter()
                .zip(&alternates)
                .any(|(c, alt)| !c.literal && alt.is_empty());
        if needs_anchor {
            if frame_start > 1 {
                let anchor = self.reference_base(chrom, frame_start - 1)?;
                debug!("{}: anchoring at {} with '{}'", location, frame_start - 1, anchor);
                pos = frame_start - 1;
                reference.insert(0, anchor);
                for (c, alt) in kept.iter().zip(alternates.iter_mut()) {
                    if !c.literal {
                        alt.insert(0, anchor);
                    }
                }
            } else {
                let after = frame_end.checked_add(1).ok_or_else(|| {
                    FerroError::ReferenceUnavailable {
                        contig: chrom.to_string(),
                        pos: frame_end,
                    }
                })?;
                let anchor = self.reference_base(chrom, after)?;
                debug!("{}: anchoring after {} with '{}'", location, frame_end, anchor);
                reference.push(anchor);
                for (c, alt) in kept.iter().zip(alternates.iter_mut()) {
                    if !c.literal {
                        alt.push(anchor);
                    }
                }
            }
        }

        if primary.kind() == VariantKind::NoVariation && alternates[0] == reference {
            alternates[0] = ".".to_string();
        }

        Ok(Frame {
            pos,
            reference,
            alternates,
        })
    }

    /// `len` frame bases from 1-based `start`, fetched in one request
    fn reference_run(&self, chrom: &str, start: u64, len: usize) -> Result<String, FerroError> {
        let unavailable = || FerroError::ReferenceUnavailable {
            contig: chrom.to_string(),
            pos: start,
        };
        let end = (start - 1)
            .checked_add(len as u64)
            .ok_or_else(unavailable)?;
        debug!("{}: fetching {} frame bases from {}", chrom, len, start);
        let sequence = self.provider.get_sequence(chrom, start - 1, end)?;
        if sequence.len() != len {
            return Err(unavailable());
        }
        allele::validate_bases(&sequence, Alphabet::AcgtN).map_err(|_| unavailable())
    }

    fn reference_base(&self, chrom: &str, pos: u64) -> Result<char, FerroError> {
        let base = self.provider.base(chrom, pos)?;
        allele::validate_bases(&base.to_string(), Alphabet::AcgtN)
            .ok()
            .and_then(|b| b.chars().next())
            .ok_or_else(|| FerroError::ReferenceUnavailable {
                contig: chrom.to_string(),
                pos,
            })
    }
}

fn literal_text(candidate: &Candidate) -> String {
    if candidate.alternate.is_empty() {
        ".".to_string()
    } else {
        candidate.alternate.clone()
    }
}

/// First discard in policy order, as (position in `kept`, reason)
fn find_discard(kept: &[Candidate], frame: &Frame) -> Option<(usize, DiscardReason)> {
    for j in 1..kept.len() {
        if frame.alternates[..j].contains(&frame.alternates[j]) {
            return Some((j, DiscardReason::Duplicate));
        }
    }

    let primary = &kept[0];
    for (j, candidate) in kept.iter().enumerate().skip(1) {
        if candidate.symbolic != primary.symbolic && !allele::is_placeholder(&candidate.alternate)
        {
            return Some((j, DiscardReason::SymbolicMismatch));
        }
    }

    if primary.symbolic {
        for (j, candidate) in kept.iter().enumerate().skip(1) {
            if candidate.symbolic && (candidate.start, candidate.end) != (primary.start, primary.end)
            {
                return Some((j, DiscardReason::SpanMismatch));
            }
        }
    }
    None
}

/// `SVTYPE` for a structural key
fn sv_type(key: &VariantKey) -> Option<String> {
    let token = match key.kind() {
        VariantKind::NoVariation => return None,
        VariantKind::Breakend => "BND",
        VariantKind::Deletion => "DEL",
        VariantKind::Duplication => "DUP",
        VariantKind::Inversion => "INV",
        VariantKind::Insertion => "INS",
        k if k.is_copy_number() => "CNV",
        _ => {
            let inner = key
                .alternate()
                .trim_start_matches('<')
                .trim_end_matches('>');
            return inner.split(':').next().map(str::to_string);
        }
    };
    Some(token.to_string())
}

fn add_structural_info(record: &mut VcfRecord, key: &VariantKey) {
    let Some(sv) = key.structural() else {
        return;
    };
    if let Some(svtype) = sv_type(key) {
        record.set_info(INFO_SVTYPE, InfoValue::String(svtype));
    }
    if key.is_symbolic() && key.kind() != VariantKind::NoVariation {
        record.set_info(INFO_END, InfoValue::Integer(key.end() as i64));
        if key.kind() != VariantKind::Insertion {
            record.set_info(INFO_SVLEN, InfoValue::Integer(key.length() as i64));
        }
    }
    if let Some(ci) = &sv.ci_start {
        let (l, r) = ci.offsets(key.start());
        record.set_info(INFO_CIPOS, InfoValue::IntegerArray(vec![l, r]));
    }
    if let Some(ci) = &sv.ci_end {
        let (l, r) = ci.offsets(key.end());
        record.set_info(INFO_CIEND, InfoValue::IntegerArray(vec![l, r]));
    }
    if let Some(cn) = sv.copy_number {
        record.set_info(INFO_CN, InfoValue::Integer(i64::from(cn)));
    }
    if let (Some(left), Some(right)) = (&sv.left_ins_seq, &sv.right_ins_seq) {
        record.set_info(INFO_LEFT_SVINSSEQ, InfoValue::String(left.clone()));
        record.set_info(INFO_RIGHT_SVINSSEQ, InfoValue::String(right.clone()));
    }
}
