//! VCF (Variant Call Format) support
//!
//! Converts canonical keys to multi-allelic VCF records and back, and reads
//! and writes single tab-separated VCF data lines.

mod from_vcf;
mod genotype;
mod record;
mod to_vcf;

pub use from_vcf::{DecodedVariant, VcfToKeyConverter};
pub use genotype::{Genotype, SampleCall};
pub use record::{
    header_line, InfoValue, VcfRecord, INFO_CIEND, INFO_CIPOS, INFO_CN, INFO_END,
    INFO_LEFT_SVINSSEQ, INFO_RIGHT_SVINSSEQ, INFO_SVLEN, INFO_SVTYPE,
};
pub use to_vcf::{
    Discard, DiscardReason, KeyToVcfConverter, VcfConversion, DEFAULT_MAX_FRAME_SPAN,
};
