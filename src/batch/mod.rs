//! Batch processing for variant descriptors.
//!
//! Parses, normalizes or converts many descriptors at once. Failures are
//! collected per item and tallied by [`ErrorCode`](crate::ErrorCode) instead
//! of stopping the batch (unless `continue_on_error` is off).
//!
//! # Examples
//!
//! ```
//! use ferro_varnorm::batch::BatchProcessor;
//! use ferro_varnorm::ErrorCode;
//!
//! let processor = BatchProcessor::new();
//! let result = processor.parse_and_normalize(&["1:1000:AT:A", "c.503_508del", "1:5:A:Z"]);
//!
//! assert_eq!(result.success_count(), 1);
//! let tally = result.tally();
//! assert_eq!(tally.get(ErrorCode::UnsupportedVariantShape), 1);
//! assert_eq!(tally.get(ErrorCode::InvalidAlleleCharacters), 1);
//! ```

mod processor;

pub use processor::{
    read_descriptors, BatchConfig, BatchProcessor, BatchProgress, BatchResult, ErrorTally,
    ItemResult,
};
