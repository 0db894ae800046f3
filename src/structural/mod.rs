//! Structural variant handling
//!
//! Symbolic alternates (`<DEL>`, `<CN3>`, ...) do not spell out their bases;
//! their meaning is carried by [`StructuralVariation`](crate::model::StructuralVariation)
//! and by the kind derived here. Breakend bracket notation is parsed in
//! [`crate::notation::breakend`].

pub mod copy_number;
pub mod symbolic;

pub use copy_number::{CopyNumberPolicy, DIPLOID_BASELINE};
pub use symbolic::{classify_symbolic, SymbolicAllele};
