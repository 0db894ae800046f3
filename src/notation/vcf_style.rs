//! VCF-style descriptors
//!
//! ```text
//! chrom:start:ref:alt
//! chrom:start-end:ref:alt
//! chrom:start-end:<SYMBOLIC>          reference omitted, stored as N
//! chrom:a<b<c-d<e<f:ref:<SYMBOLIC>    confidence intervals
//! chrom:start:ref:left...right        insertion with known flanking fragments
//! chrom:start:ref:t[p[                breakend (also t]p], ]p]t, [p[t, t., .t)
//! chrom:start:t[p[                    breakend, reference taken from the anchor base
//! ```
//!
//! `-` and `.` stand for an empty allele. Symbolic alternates and breakend
//! mates may themselves contain `:`, so only the first colon inside the
//! allele section is considered as the reference/alternate separator, and
//! only when the text before it is not already part of an alternate.

use log::trace;
use memchr::memchr;

use crate::error::FerroError;
use crate::model::allele;
use crate::model::VariantKey;
use crate::structural::CopyNumberPolicy;

use super::breakend;
use super::coordinate::parse_span;

/// Separator between the known fragments of an insertion
const FRAGMENT_SEPARATOR: &str = "...";

/// Reference and alternate text, before validation
struct AlleleFields<'a> {
    reference: Option<&'a str>,
    alternate: &'a str,
}

/// Split the allele section into reference and alternate
fn split_alleles(section: &str) -> AlleleFields<'_> {
    if section.starts_with('<') {
        return AlleleFields {
            reference: None,
            alternate: section,
        };
    }
    match memchr(b':', section.as_bytes()) {
        Some(i) => {
            let head = &section[..i];
            if head.contains('[') || head.contains(']') {
                AlleleFields {
                    reference: None,
                    alternate: section,
                }
            } else {
                AlleleFields {
                    reference: Some(head),
                    alternate: &section[i + 1..],
                }
            }
        }
        None => AlleleFields {
            reference: None,
            alternate: section,
        },
    }
}

/// Parse a VCF-style descriptor into an un-normalized key
pub fn parse_descriptor(input: &str, policy: &CopyNumberPolicy) -> Result<VariantKey, FerroError> {
    let colon = memchr(b':', input.as_bytes()).ok_or_else(|| {
        FerroError::malformed_in(input, input.len(), "expected ':' after the chromosome")
    })?;
    let chromosome = &input[..colon];
    if chromosome.is_empty() {
        return Err(FerroError::malformed_in(input, 0, "chromosome is empty"));
    }
    if let Some(bad) = chromosome.find(|c: char| c.is_whitespace()) {
        return Err(FerroError::malformed_in(
            input,
            bad,
            "chromosome contains whitespace",
        ));
    }

    let coords_offset = colon + 1;
    let coords = &input[coords_offset..];
    let (rest, span) = parse_span(coords).map_err(|e| {
        let (pos, msg) = match &e {
            nom::Err::Failure(inner) => (
                input.len() - inner.input.len(),
                "confidence interval must satisfy left <= position <= right",
            ),
            nom::Err::Error(inner) => (input.len() - inner.input.len(), "expected a position"),
            nom::Err::Incomplete(_) => (input.len(), "expected a position"),
        };
        FerroError::malformed_in(input, pos, msg)
    })?;

    let alleles_offset = input.len() - rest.len();
    let section = rest.strip_prefix(':').ok_or_else(|| {
        FerroError::malformed_in(input, alleles_offset, "expected ':' after the position")
    })?;
    let section_offset = alleles_offset + 1;
    if section.is_empty() {
        return Err(FerroError::malformed_in(
            input,
            section_offset,
            "expected reference and alternate alleles",
        ));
    }

    let fields = split_alleles(section);
    let alternate_offset = input.len() - fields.alternate.len();
    if fields.alternate.is_empty() {
        return Err(FerroError::malformed_in(
            input,
            alternate_offset,
            "alternate allele is empty; write '-' for an empty allele",
        ));
    }
    if fields.reference == Some("") {
        return Err(FerroError::malformed_in(
            input,
            section_offset,
            "reference allele is empty; write '-' for an empty allele",
        ));
    }

    let is_symbolic = allele::is_symbolic(fields.alternate);
    let has_brackets = fields.alternate.contains(['[', ']']);
    let fragments = if is_symbolic || has_brackets {
        None
    } else {
        fields.alternate.split_once(FRAGMENT_SEPARATOR)
    };
    let is_breakend =
        fragments.is_none() && !is_symbolic && allele::is_breakend(fields.alternate);
    let structural = is_breakend || fragments.is_some() || is_symbolic;

    let reference = match fields.reference {
        Some(r) => r.to_string(),
        None if is_breakend => breakend::anchor_base(fields.alternate)
            .map_err(|e| e.offset_by(alternate_offset))?,
        None if structural => allele::UNKNOWN_BASE.to_string(),
        None => {
            return Err(FerroError::malformed_in(
                input,
                alternate_offset,
                "expected 'ref:alt' after the position",
            ))
        }
    };

    if span.has_confidence_intervals() && !structural {
        return Err(FerroError::malformed_in(
            input,
            coords_offset,
            "confidence intervals are only valid with structural alternates",
        ));
    }

    trace!(
        "descriptor {} -> chrom={} start={} ref={} alt={}",
        input,
        chromosome,
        span.start.position,
        reference,
        fields.alternate
    );

    let mut builder = VariantKey::builder(chromosome, span.start.position)
        .reference(&reference)
        .copy_number_policy(*policy);
    builder = match fragments {
        Some((left, right)) => builder.insertion_fragments(left, right),
        None => builder.alternate(fields.alternate),
    };
    if let Some(ci) = span.start.ci {
        builder = builder.ci_start(ci);
    }
    if let Some(end) = span.end {
        builder = builder.end(end.position);
        if let Some(ci) = end.ci {
            builder = builder.ci_end(ci);
        }
    }

    builder.build().map_err(|e| e.offset_by(section_offset))
}
