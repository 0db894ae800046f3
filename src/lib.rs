// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! ferro-varnorm: variant notation parser, normalizer and VCF converter
//!
//! Part of the ferro bioinformatics toolkit.
//!
//! Every supported notation (VCF-style descriptors, genomic HGVS, coding
//! fragments placed on a locus, symbolic and breakend alternates) resolves
//! into one canonical [`VariantKey`]. Keys are normalized by trimming shared
//! flanking bases, and can be converted to multi-allelic VCF records and
//! back.
//!
//! # Example
//!
//! ```
//! use ferro_varnorm::{parse, MockProvider, Normalizer, VariantKind};
//! use ferro_varnorm::vcf::KeyToVcfConverter;
//!
//! // Parse a descriptor and trim it to its minimal form
//! let key = Normalizer::new().normalize(&parse("1:3:TT:T").unwrap());
//! assert_eq!(key.kind(), VariantKind::Deletion);
//! assert_eq!(key.to_string(), "1:3:T:-");
//!
//! // Anchor the deletion on the preceding reference base
//! let provider = MockProvider::new().with_contig("1", "GATTACA");
//! let record = KeyToVcfConverter::new(&provider).convert_key(&key).unwrap();
//! assert_eq!((record.pos, record.reference.as_str()), (2, "AT"));
//! ```

pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod normalize;
pub mod notation;
#[cfg(feature = "parallel")]
pub mod parallel;
pub mod reference;
pub mod strand;
pub mod structural;
pub mod vcf;

// Re-export commonly used types
pub use error::{ErrorCode, FerroError};
pub use model::{SecondaryAllele, VariantKey, VariantKind};
pub use normalize::{NormalizeConfig, Normalizer};
pub use notation::{parse, parse_coding, parse_normalized, GenomicLocus};
pub use reference::{MockProvider, ReferenceProvider};
pub use strand::Strand;
pub use structural::CopyNumberPolicy;

/// Result type alias for ferro-varnorm operations
pub type Result<T> = std::result::Result<T, FerroError>;
