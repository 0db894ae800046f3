//! Reference data abstraction
//!
//! Provides the lookup trait used for anchor-base synthesis and an in-memory
//! implementation.

pub mod mock;
pub mod provider;

pub use mock::MockProvider;
pub use provider::ReferenceProvider;
