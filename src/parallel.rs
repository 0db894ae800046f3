//! Parallel processing support for ferro-varnorm
//!
//! Parallel variants of parsing, normalization and VCF conversion using
//! rayon. Enable with the `parallel` feature. Every function preserves input
//! order.
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "parallel")]
//! # fn main() {
//! use ferro_varnorm::parallel::{parse_parallel, normalize_parallel};
//! use ferro_varnorm::Normalizer;
//!
//! let descriptors = vec!["1:1000:A:C", "1:2000:AT:A", "2:500-900:N:<DEL>"];
//!
//! let parsed: Vec<_> = parse_parallel(&descriptors)
//!     .into_iter()
//!     .filter_map(|r| r.ok())
//!     .collect();
//!
//! let _normalized = normalize_parallel(&Normalizer::new(), &parsed);
//! # }
//! # #[cfg(not(feature = "parallel"))]
//! # fn main() {}
//! ```

use rayon::prelude::*;

use crate::error::FerroError;
use crate::model::VariantKey;
use crate::normalize::Normalizer;
use crate::notation::{parse, parse_normalized};
use crate::reference::ReferenceProvider;
use crate::vcf::{KeyToVcfConverter, VcfRecord};

/// Parse multiple descriptors in parallel
pub fn parse_parallel<S: AsRef<str> + Sync>(inputs: &[S]) -> Vec<Result<VariantKey, FerroError>> {
    inputs.par_iter().map(|s| parse(s.as_ref())).collect()
}

/// Parse multiple descriptors in parallel, keeping only successes
pub fn parse_parallel_ok<S: AsRef<str> + Sync>(inputs: &[S]) -> Vec<VariantKey> {
    inputs
        .par_iter()
        .filter_map(|s| parse(s.as_ref()).ok())
        .collect()
}

/// Normalize multiple keys in parallel
pub fn normalize_parallel(normalizer: &Normalizer, keys: &[VariantKey]) -> Vec<VariantKey> {
    keys.par_iter().map(|k| normalizer.normalize(k)).collect()
}

/// Parse and normalize in a single parallel operation
pub fn parse_and_normalize_parallel<S: AsRef<str> + Sync>(
    normalizer: &Normalizer,
    inputs: &[S],
) -> Vec<Result<VariantKey, FerroError>> {
    inputs
        .par_iter()
        .map(|s| parse_normalized(s.as_ref(), normalizer))
        .collect()
}

/// Convert normalized keys to VCF records in parallel
///
/// The provider is shared read-only across worker threads.
pub fn to_vcf_parallel<P: ReferenceProvider + Sync>(
    provider: &P,
    keys: &[VariantKey],
) -> Vec<Result<VcfRecord, FerroError>> {
    let converter = KeyToVcfConverter::new(provider);
    keys.par_iter().map(|k| converter.convert_key(k)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::MockProvider;
    use std::sync::Arc;

    #[test]
    fn test_parse_parallel() {
        let inputs = vec!["1:1000:A:C", "bogus", "1:2000:G:T"];
        let results = parse_parallel(&inputs);
        assert_eq!(results.len(), 3);
        assert!(results[1].is_err());
        assert_eq!(parse_parallel_ok(&inputs).len(), 2);
    }

    #[test]
    fn test_order_preserved() {
        let inputs: Vec<String> = (1..=500).map(|i| format!("1:{}:A:C", i)).collect();
        let results = parse_parallel(&inputs);
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.as_ref().unwrap().start(), i as u64 + 1);
        }
    }

    #[test]
    fn test_parse_and_normalize_parallel() {
        let normalizer = Normalizer::new();
        let inputs: Vec<String> = (10..=200).map(|i| format!("1:{}:AT:A", i)).collect();
        let results = parse_and_normalize_parallel(&normalizer, &inputs);
        assert!(results
            .iter()
            .enumerate()
            .all(|(i, r)| r.as_ref().unwrap().start() == i as u64 + 11));
    }

    #[test]
    fn test_to_vcf_parallel_shared_provider() {
        let provider = Arc::new(MockProvider::new().with_contig("1", "ACGTACGTACGT"));
        let keys = parse_parallel_ok(&["1:2:C:G", "1:6:C:-"]);
        let keys = normalize_parallel(&Normalizer::new(), &keys);
        let records = to_vcf_parallel(&provider, &keys);
        assert_eq!(records[0].as_ref().unwrap().alternate, vec!["G"]);
        let deletion = records[1].as_ref().unwrap();
        assert_eq!(deletion.pos, 5);
        assert_eq!(deletion.reference, "AC");
    }
}
