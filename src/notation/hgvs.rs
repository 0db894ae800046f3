//! HGVS fragment grammar
//!
//! Handles the nucleotide edits that resolve to explicit alleles:
//!
//! | Edit | Example |
//! |------|---------|
//! | substitution | `c.123A>G` |
//! | deletion | `c.503_508delACGTAC` |
//! | deletion-insertion | `c.10_12delAAGinsTT`, `g.100delinsAC` (deleted bases still required) |
//! | insertion | `c.10_11insACGT` |
//!
//! The edit type is chosen lexically before any semantic check: `>` selects
//! the substitution grammar, `del` the deletion grammar, `ins` the insertion
//! grammar. Duplications and inversions are recognized and rejected, as are
//! length-only alleles (`del6`, `ins30`); a deletion is never length-inferred.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{char, digit1, one_of},
    combinator::{map, opt},
    sequence::preceded,
    IResult, Parser,
};
use std::fmt;

use crate::error::FerroError;
use crate::model::allele::{self, Alphabet};
use crate::model::VariantKey;
use crate::strand::Strand;

use super::GenomicLocus;

/// Coordinate system prefix of a fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentPrefix {
    /// `c.` coding DNA
    Coding,
    /// `g.` linear genomic
    Genomic,
    /// `n.` non-coding transcript
    NonCoding,
    /// `m.` mitochondrial
    Mitochondrial,
}

impl FragmentPrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            FragmentPrefix::Coding => "c.",
            FragmentPrefix::Genomic => "g.",
            FragmentPrefix::NonCoding => "n.",
            FragmentPrefix::Mitochondrial => "m.",
        }
    }

    /// True when positions are chromosome coordinates
    pub fn is_genomic(&self) -> bool {
        matches!(self, FragmentPrefix::Genomic | FragmentPrefix::Mitochondrial)
    }

    /// True when `input` starts with a fragment prefix
    pub fn starts(input: &str) -> bool {
        parse_prefix(input).is_ok()
    }
}

/// Position inside a fragment (`123`, `-15`, `*40`, `88+1`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FragmentPosition {
    /// Base position; negative for 5' UTR
    pub base: i64,
    /// Intronic offset
    pub offset: i64,
    /// Position counted after the stop codon (`*`)
    pub utr3: bool,
}

impl FragmentPosition {
    /// A position with no offset or UTR marker
    pub fn is_plain(&self) -> bool {
        self.offset == 0 && !self.utr3 && self.base > 0
    }
}

impl fmt::Display for FragmentPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.utr3 {
            write!(f, "*")?;
        }
        write!(f, "{}", self.base)?;
        if self.offset > 0 {
            write!(f, "+{}", self.offset)?;
        } else if self.offset < 0 {
            write!(f, "{}", self.offset)?;
        }
        Ok(())
    }
}

/// Edit carried by a fragment, alleles upper-case over `A`, `C`, `G`, `T`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FragmentEdit {
    Substitution { reference: String, alternate: String },
    /// Deletion; `inserted` is non-empty for a deletion-insertion
    Deletion { deleted: String, inserted: String },
    Insertion { inserted: String },
}

/// Parsed fragment, not yet placed on a chromosome
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HgvsFragment {
    pub prefix: FragmentPrefix,
    pub start: FragmentPosition,
    pub end: FragmentPosition,
    pub edit: FragmentEdit,
}

impl HgvsFragment {
    /// Number of reference bases the edit replaces
    pub fn reference_len(&self) -> usize {
        match &self.edit {
            FragmentEdit::Substitution { .. } => 1,
            FragmentEdit::Deletion { deleted, .. } => deleted.len(),
            FragmentEdit::Insertion { .. } => 0,
        }
    }
}

fn parse_prefix(input: &str) -> IResult<&str, FragmentPrefix> {
    alt((
        map(tag("c."), |_| FragmentPrefix::Coding),
        map(tag("g."), |_| FragmentPrefix::Genomic),
        map(tag("n."), |_| FragmentPrefix::NonCoding),
        map(tag("m."), |_| FragmentPrefix::Mitochondrial),
    ))
    .parse(input)
}

fn parse_number(input: &str) -> IResult<&str, i64> {
    let (remaining, s) = digit1.parse(input)?;
    // Use checked parsing to detect overflow
    let value: i64 = s.parse().map_err(|_| {
        nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Digit))
    })?;
    Ok((remaining, value))
}

/// Parse an intronic offset (+5, -10)
fn parse_offset(input: &str) -> IResult<&str, i64> {
    let (input, sign) = one_of("+-").parse(input)?;
    let (input, value) = parse_number(input)?;
    Ok((input, if sign == '-' { -value } else { value }))
}

fn parse_fragment_position(input: &str) -> IResult<&str, FragmentPosition> {
    let (remaining, marker) = opt(one_of("-*")).parse(input)?;
    let (remaining, value) = parse_number(remaining)?;
    // Position 0 does not exist in HGVS
    if value == 0 {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Verify,
        )));
    }
    let (remaining, offset) = opt(parse_offset).parse(remaining)?;
    Ok((
        remaining,
        FragmentPosition {
            base: if marker == Some('-') { -value } else { value },
            offset: offset.unwrap_or(0),
            utr3: marker == Some('*'),
        },
    ))
}

/// `pos` or `pos_pos`
fn parse_range(input: &str) -> IResult<&str, (FragmentPosition, Option<FragmentPosition>)> {
    (
        parse_fragment_position,
        opt(preceded(char('_'), parse_fragment_position)),
    )
        .parse(input)
}

/// Allele text following `del`/`ins`: upper-case letters and digits
fn allele_text(input: &str) -> IResult<&str, &str> {
    take_while(|c: char| c.is_ascii_uppercase() || c.is_ascii_digit()).parse(input)
}

/// Offset of `rest` inside `full`
#[inline]
fn offset_in(full: &str, rest: &str) -> usize {
    full.len() - rest.len()
}

fn nom_error(fragment: &str, err: nom::Err<nom::error::Error<&str>>, msg: &str) -> FerroError {
    let pos = match &err {
        nom::Err::Error(e) | nom::Err::Failure(e) => offset_in(fragment, e.input),
        nom::Err::Incomplete(_) => fragment.len(),
    };
    FerroError::malformed_in(fragment, pos, msg)
}

/// Validate literal allele text
///
/// Empty and length-only text is an unsupported shape; anything else must be
/// over `A`, `C`, `G`, `T`.
fn literal_bases(fragment: &str, text: &str, edit: &str) -> Result<String, FerroError> {
    if text.is_empty() {
        return Err(FerroError::unsupported(
            fragment,
            format!("{} without literal bases", edit),
        ));
    }
    if text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FerroError::unsupported(
            fragment,
            format!("length-only {} ({}) is never resolved to bases", edit, text),
        ));
    }
    allele::validate_bases(text, Alphabet::Acgt)
}

fn expect_end(fragment: &str, rest: &str) -> Result<(), FerroError> {
    if rest.is_empty() {
        Ok(())
    } else {
        Err(FerroError::malformed_in(
            fragment,
            offset_in(fragment, rest),
            format!("unexpected trailing characters '{}'", rest),
        ))
    }
}

/// Parse one fragment such as `c.123A>G`
pub fn parse_fragment(input: &str) -> Result<HgvsFragment, FerroError> {
    let fragment = input.trim();
    let (body, prefix) = parse_prefix(fragment).map_err(|e| {
        nom_error(fragment, e, "expected a 'c.', 'g.', 'n.' or 'm.' prefix")
    })?;

    if body.contains('>') {
        parse_substitution(fragment, body, prefix)
    } else if body.contains("del") {
        parse_deletion(fragment, body, prefix)
    } else if body.contains("ins") {
        parse_insertion(fragment, body, prefix)
    } else if body.contains("dup") {
        Err(FerroError::unsupported(
            fragment,
            "duplications are not resolved to an explicit allele",
        ))
    } else if body.contains("inv") {
        Err(FerroError::unsupported(
            fragment,
            "inversions are not resolved to an explicit allele",
        ))
    } else {
        Err(FerroError::malformed_in(
            fragment,
            offset_in(fragment, body),
            "expected a substitution, deletion or insertion",
        ))
    }
}

fn parse_substitution(
    fragment: &str,
    body: &str,
    prefix: FragmentPrefix,
) -> Result<HgvsFragment, FerroError> {
    let (rest, (start, end)) =
        parse_range(body).map_err(|e| nom_error(fragment, e, "expected a position"))?;
    if end.is_some() {
        return Err(FerroError::malformed_in(
            fragment,
            offset_in(fragment, body),
            "a substitution names a single position",
        ));
    }

    let (rest, (reference, _, alternate)) = (allele_text, char('>'), allele_text)
        .parse(rest)
        .map_err(|e| nom_error(fragment, e, "expected 'REF>ALT'"))?;
    let reference = allele::validate_bases(reference, Alphabet::Acgt)?;
    let alternate = allele::validate_bases(alternate, Alphabet::Acgt)?;
    if reference.len() != 1 || alternate.len() != 1 {
        return Err(FerroError::malformed_in(
            fragment,
            offset_in(fragment, body),
            "a substitution replaces exactly one base",
        ));
    }
    expect_end(fragment, rest)?;

    Ok(HgvsFragment {
        prefix,
        start,
        end: start,
        edit: FragmentEdit::Substitution {
            reference,
            alternate,
        },
    })
}

fn parse_deletion(
    fragment: &str,
    body: &str,
    prefix: FragmentPrefix,
) -> Result<HgvsFragment, FerroError> {
    let (rest, (start, end)) =
        parse_range(body).map_err(|e| nom_error(fragment, e, "expected a position or range"))?;
    let end = end.unwrap_or(start);

    let (rest, (deleted, inserted)) = (
        preceded(tag("del"), allele_text),
        opt(preceded(tag("ins"), allele_text)),
    )
        .parse(rest)
        .map_err(|e| nom_error(fragment, e, "expected 'del'"))?;

    let deleted = literal_bases(fragment, deleted, "deletion")?;
    let inserted = match inserted {
        Some(text) => literal_bases(fragment, text, "deletion-insertion")?,
        None => String::new(),
    };
    expect_end(fragment, rest)?;

    if start.is_plain() && end.is_plain() {
        if end.base < start.base {
            return Err(FerroError::malformed_in(
                fragment,
                offset_in(fragment, body),
                format!("range {}_{} ends before it starts", start, end),
            ));
        }
        let span = end.base - start.base + 1;
        if usize::try_from(span).ok() != Some(deleted.len()) {
            return Err(FerroError::malformed_in(
                fragment,
                offset_in(fragment, body),
                format!(
                    "range {}_{} covers {} bases but {} are deleted",
                    start,
                    end,
                    span,
                    deleted.len()
                ),
            ));
        }
    }

    Ok(HgvsFragment {
        prefix,
        start,
        end,
        edit: FragmentEdit::Deletion { deleted, inserted },
    })
}

fn parse_insertion(
    fragment: &str,
    body: &str,
    prefix: FragmentPrefix,
) -> Result<HgvsFragment, FerroError> {
    let (rest, (start, end)) =
        parse_range(body).map_err(|e| nom_error(fragment, e, "expected a flanking range"))?;
    let end = end.ok_or_else(|| {
        FerroError::malformed_in(
            fragment,
            offset_in(fragment, body),
            "an insertion names its two flanking positions",
        )
    })?;

    let (rest, inserted) = preceded(tag("ins"), allele_text)
        .parse(rest)
        .map_err(|e| nom_error(fragment, e, "expected 'ins'"))?;
    let inserted = literal_bases(fragment, inserted, "insertion")?;
    expect_end(fragment, rest)?;

    if start.is_plain() && end.is_plain() && start.base.checked_add(1) != Some(end.base) {
        return Err(FerroError::malformed_in(
            fragment,
            offset_in(fragment, body),
            format!("insertion flanks {}_{} are not adjacent", start, end),
        ));
    }

    Ok(HgvsFragment {
        prefix,
        start,
        end,
        edit: FragmentEdit::Insertion { inserted },
    })
}

/// Place a fragment at a genomic locus
///
/// Substitutions and deletions start at `locus.start` and the locus must span
/// exactly the replaced bases. An insertion's locus spans its two flanking
/// bases; the inserted allele starts after the first one.
pub fn locate(
    fragment: &HgvsFragment,
    locus: &GenomicLocus,
    strand: Strand,
) -> Result<VariantKey, FerroError> {
    let span = locus.len();
    let (start, reference, alternate, expected) = match &fragment.edit {
        FragmentEdit::Substitution {
            reference,
            alternate,
        } => (locus.start, reference.as_str(), alternate.as_str(), 1),
        FragmentEdit::Deletion { deleted, inserted } => {
            (locus.start, deleted.as_str(), inserted.as_str(), deleted.len() as u64)
        }
        FragmentEdit::Insertion { inserted } => {
            let after = locus.start.checked_add(1).ok_or_else(|| {
                FerroError::malformed(0, format!("insertion after {} overflows", locus))
            })?;
            (after, "", inserted.as_str(), 2)
        }
    };
    if span != expected {
        return Err(FerroError::malformed(
            0,
            format!(
                "locus {} spans {} bases but the edit needs {}",
                locus, span, expected
            ),
        ));
    }

    VariantKey::builder(locus.chromosome.clone(), start)
        .reference(reference)
        .alternate(alternate)
        .strand(strand)
        .build()
}

/// Resolve a `g.`/`m.` fragment on `chromosome` using its own positions
pub fn resolve_genomic(chromosome: &str, fragment: &HgvsFragment) -> Result<VariantKey, FerroError> {
    if !fragment.prefix.is_genomic() {
        return Err(FerroError::unsupported(
            fragment.prefix.as_str(),
            "transcript coordinates need a genomic locus",
        ));
    }
    if !fragment.start.is_plain() || !fragment.end.is_plain() {
        return Err(FerroError::malformed(
            0,
            format!(
                "genomic positions {}_{} must be plain integers",
                fragment.start, fragment.end
            ),
        ));
    }
    let locus = GenomicLocus::new(
        chromosome,
        fragment.start.base as u64,
        fragment.end.base as u64,
    )?;
    locate(fragment, &locus, Strand::Plus)
}
