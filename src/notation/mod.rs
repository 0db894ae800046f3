//! Notation parsers
//!
//! Every supported grammar resolves to an un-normalized [`VariantKey`]:
//!
//! - VCF-style descriptors (`chrom:pos:ref:alt`, symbolic, breakend,
//!   confidence intervals, insertion fragments), see [`vcf_style`]
//! - genomic HGVS descriptors (`chrom:g.<edit>`), see [`hgvs`]
//! - coding HGVS fragments (`c.<edit>`) placed with a [`GenomicLocus`]
//!
//! Parsing does not trim alleles; pass the key through
//! [`Normalizer`](crate::Normalizer) (or use [`parse_normalized`]).

pub mod breakend;
pub mod coordinate;
pub mod hgvs;
pub mod vcf_style;

use log::debug;
use memchr::memchr;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FerroError;
use crate::model::VariantKey;
use crate::normalize::Normalizer;
use crate::strand::Strand;
use crate::structural::CopyNumberPolicy;

pub use hgvs::{parse_fragment, FragmentEdit, FragmentPrefix, HgvsFragment};

/// Genomic interval a coding fragment is placed on (1-based, inclusive)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenomicLocus {
    pub chromosome: String,
    pub start: u64,
    pub end: u64,
}

impl GenomicLocus {
    pub fn new(chromosome: impl Into<String>, start: u64, end: u64) -> Result<Self, FerroError> {
        let chromosome = chromosome.into();
        if chromosome.is_empty() {
            return Err(FerroError::malformed(0, "locus chromosome is empty"));
        }
        if start == 0 || end < start {
            return Err(FerroError::malformed(
                0,
                format!("invalid locus range {}-{}", start, end),
            ));
        }
        Ok(Self {
            chromosome,
            start,
            end,
        })
    }

    /// Number of bases covered
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// A locus always covers at least one base
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl fmt::Display for GenomicLocus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.chromosome, self.start, self.end)
    }
}

/// Parse `chrom:start-end` or `chrom:pos`
impl FromStr for GenomicLocus {
    type Err = FerroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let colon = memchr(b':', s.as_bytes())
            .ok_or_else(|| FerroError::malformed_in(s, s.len(), "expected 'chrom:start-end'"))?;
        let (chromosome, range) = (&s[..colon], &s[colon + 1..]);
        let parse_pos = |text: &str, offset: usize| {
            text.parse::<u64>()
                .map_err(|_| FerroError::malformed_in(s, offset, "expected a position"))
        };
        match range.split_once('-') {
            Some((start, end)) => GenomicLocus::new(
                chromosome,
                parse_pos(start, colon + 1)?,
                parse_pos(end, colon + 2 + start.len())?,
            ),
            None => {
                let pos = parse_pos(range, colon + 1)?;
                GenomicLocus::new(chromosome, pos, pos)
            }
        }
    }
}

/// Parse a descriptor with the default copy-number policy
///
/// # Example
///
/// ```
/// use ferro_varnorm::notation::parse;
/// use ferro_varnorm::VariantKind;
///
/// let key = parse("1:1000:A:C").unwrap();
/// assert_eq!(key.kind(), VariantKind::Snv);
/// assert_eq!(key.to_string(), "1:1000:A:C");
/// ```
pub fn parse(input: &str) -> Result<VariantKey, FerroError> {
    parse_with_policy(input, &CopyNumberPolicy::default())
}

/// Parse a descriptor, classifying copy numbers with `policy`
///
/// A bare HGVS fragment is validated in full; coding fragments are then
/// rejected because they carry no genomic coordinates (see [`parse_coding`]).
pub fn parse_with_policy(input: &str, policy: &CopyNumberPolicy) -> Result<VariantKey, FerroError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(FerroError::malformed(0, "empty descriptor"));
    }

    if FragmentPrefix::starts(input) {
        let fragment = parse_fragment(input)?;
        return Err(FerroError::unsupported(
            input,
            format!(
                "'{}' fragment has no chromosome; place it with a genomic locus",
                fragment.prefix.as_str()
            ),
        ));
    }

    if let Some(colon) = memchr(b':', input.as_bytes()) {
        let rest = &input[colon + 1..];
        if FragmentPrefix::starts(rest) {
            let chromosome = &input[..colon];
            let fragment = parse_fragment(rest).map_err(|e| e.offset_by(colon + 1))?;
            return hgvs::resolve_genomic(chromosome, &fragment);
        }
    }

    vcf_style::parse_descriptor(input, policy).inspect_err(|e| {
        debug!("rejected descriptor '{}': {}", input, e);
    })
}

/// Parse and normalize in one step
pub fn parse_normalized(input: &str, normalizer: &Normalizer) -> Result<VariantKey, FerroError> {
    let key = parse_with_policy(input, &normalizer.config().copy_number)?;
    Ok(normalizer.normalize(&key))
}

/// Parse a coding (or any transcript) fragment placed at `locus`
///
/// Allele text is written against `strand` and is resolved to the plus strand
/// before it is stored.
///
/// # Example
///
/// ```
/// use ferro_varnorm::notation::{parse_coding, GenomicLocus};
/// use ferro_varnorm::Strand;
///
/// let locus = GenomicLocus::new("17", 5000, 5002).unwrap();
/// let key = parse_coding("c.10_12delAAG", &locus, Strand::Minus).unwrap();
/// assert_eq!(key.reference(), "CTT");
/// ```
pub fn parse_coding(
    fragment: &str,
    locus: &GenomicLocus,
    strand: Strand,
) -> Result<VariantKey, FerroError> {
    let parsed = parse_fragment(fragment)?;
    hgvs::locate(&parsed, locus, strand)
}
