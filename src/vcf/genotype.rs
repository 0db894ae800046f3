//! Per-sample genotype calls
//!
//! A genotype is a list of allele indices into `[REF, ALT1, ALT2, ...]`,
//! written `0/1`, `1|0`, `./.` or a haploid `1`. A `.` index is a missing
//! call.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FerroError;

/// Genotype call for one sample
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Genotype {
    /// Allele indices; `None` is a missing call
    pub alleles: Vec<Option<usize>>,
    /// `|` separated (phased) rather than `/`
    pub phased: bool,
}

impl Genotype {
    /// Unphased genotype from indices
    pub fn unphased(alleles: impl IntoIterator<Item = Option<usize>>) -> Self {
        Self {
            alleles: alleles.into_iter().collect(),
            phased: false,
        }
    }

    /// A single missing call (`.`)
    pub fn missing() -> Self {
        Self::unphased([None])
    }

    /// True when every call is missing
    pub fn is_missing(&self) -> bool {
        self.alleles.iter().all(Option::is_none)
    }

    /// Largest allele index referenced
    pub fn max_index(&self) -> Option<usize> {
        self.alleles.iter().flatten().copied().max()
    }

    /// Rewrite indices through `mapping` (old index -> new index)
    ///
    /// Indices mapped to `None`, or beyond the mapping, become missing calls.
    pub fn remap(&self, mapping: &[Option<usize>]) -> Self {
        Self {
            alleles: self
                .alleles
                .iter()
                .map(|a| a.and_then(|i| mapping.get(i).copied().flatten()))
                .collect(),
            phased: self.phased,
        }
    }
}

impl fmt::Display for Genotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = if self.phased { "|" } else { "/" };
        for (i, allele) in self.alleles.iter().enumerate() {
            if i > 0 {
                f.write_str(sep)?;
            }
            match allele {
                Some(index) => write!(f, "{}", index)?,
                None => f.write_str(".")?,
            }
        }
        Ok(())
    }
}

impl FromStr for Genotype {
    type Err = FerroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(FerroError::malformed(0, "empty genotype"));
        }
        let phased = s.contains('|');
        if phased && s.contains('/') {
            return Err(FerroError::malformed_in(
                s,
                0,
                "genotype mixes phased and unphased separators",
            ));
        }

        let mut alleles = Vec::new();
        let mut offset = 0;
        for call in s.split(['/', '|']) {
            let allele = match call {
                "." => None,
                digits => Some(digits.parse::<usize>().map_err(|_| {
                    FerroError::malformed_in(s, offset, format!("invalid allele index '{}'", call))
                })?),
            };
            alleles.push(allele);
            offset += call.len() + 1;
        }
        Ok(Self { alleles, phased })
    }
}

/// Named sample with its genotype
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SampleCall {
    pub name: String,
    pub genotype: Genotype,
}

impl SampleCall {
    pub fn new(name: impl Into<String>, genotype: Genotype) -> Self {
        Self {
            name: name.into(),
            genotype,
        }
    }
}
