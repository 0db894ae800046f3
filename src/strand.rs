//! Strand resolution
//!
//! Canonical alleles are always plus-strand. Allele text taken from
//! minus-strand annotations is reverse-complemented here before it is stored.
//! Unlike a display helper, resolution fails closed: any character outside
//! `A`, `C`, `G`, `T` is an error rather than being passed through.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FerroError;

/// Complement table for the canonical alphabet
const COMPLEMENTS: [(u8, u8); 4] = [(b'A', b'T'), (b'C', b'G'), (b'G', b'C'), (b'T', b'A')];

/// Strand of the annotation an allele was written against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Strand {
    #[serde(rename = "+")]
    #[default]
    Plus,
    #[serde(rename = "-")]
    Minus,
}

impl Strand {
    /// True for the minus strand
    pub fn is_minus(&self) -> bool {
        matches!(self, Strand::Minus)
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strand::Plus => write!(f, "+"),
            Strand::Minus => write!(f, "-"),
        }
    }
}

impl FromStr for Strand {
    type Err = FerroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "+" | "1" | "+1" | "plus" | "forward" => Ok(Strand::Plus),
            "-" | "-1" | "minus" | "reverse" => Ok(Strand::Minus),
            _ => Err(FerroError::malformed(0, format!("invalid strand '{}'", s))),
        }
    }
}

#[inline]
fn complement(base: u8) -> Option<u8> {
    COMPLEMENTS
        .iter()
        .find(|(b, _)| *b == base)
        .map(|(_, c)| *c)
}

/// Reverse complement over `A`, `C`, `G`, `T` (case-insensitive input,
/// upper-case output)
pub fn reverse_complement(allele: &str) -> Result<String, FerroError> {
    let mut out = String::with_capacity(allele.len());
    for c in allele.chars().rev() {
        let base = u8::try_from(c).ok().map(|b| b.to_ascii_uppercase());
        match base.and_then(complement) {
            Some(comp) => out.push(char::from(comp)),
            None => {
                return Err(FerroError::InvalidAllele {
                    allele: allele.to_string(),
                    found: c,
                })
            }
        }
    }
    Ok(out)
}

/// Return the plus-strand equivalent of `allele`
///
/// On [`Strand::Minus`] the allele is reverse-complemented; on
/// [`Strand::Plus`] it is validated and upper-cased. Both reject characters
/// outside `A`, `C`, `G`, `T`.
pub fn resolve(allele: &str, strand: Strand) -> Result<String, FerroError> {
    match strand {
        Strand::Minus => reverse_complement(allele),
        Strand::Plus => {
            crate::model::allele::validate_bases(allele, crate::model::allele::Alphabet::Acgt)
        }
    }
}
