//! Canonical variant model
//!
//! This module contains the coordinate-based representation every notation is
//! resolved into: the immutable [`VariantKey`], its [`VariantKind`], secondary
//! alleles at multi-allelic sites and structural detail for symbolic and
//! breakend alternates.

pub mod allele;
pub mod builder;
pub mod key;
pub mod kind;
pub mod structural;

// Re-export commonly used types
pub use builder::VariantKeyBuilder;
pub use key::{SecondaryAllele, VariantKey};
pub use kind::VariantKind;
pub use structural::{
    Breakend, BreakendMate, BreakendOrientation, ConfidenceInterval, StructuralVariation,
};
