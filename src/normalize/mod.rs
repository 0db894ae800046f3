//! Normalization engine
//!
//! Reduces a parsed key to its minimal representation: shared flanking bases
//! are trimmed (trailing first, then leading), start/end are recomputed and
//! the kind is re-derived from the remaining alleles.
//!
//! Normalization never consults a reference and cannot fail. It is
//! idempotent: `normalize(normalize(k)) == normalize(k)`.
//!
//! | Input | Result |
//! |-------|--------|
//! | sequence key, `ref != alt` | trimmed, kind re-derived |
//! | sequence key, `ref == alt` | unchanged, `NO_VARIATION` |
//! | symbolic / breakend key | untrimmed, copy-number kind re-derived |

pub mod config;
pub mod trim;

use log::{debug, trace};

use crate::model::allele;
use crate::model::{SecondaryAllele, VariantKey, VariantKind};
pub use config::NormalizeConfig;
pub use trim::{trim, TrimResult};

/// Variant normalizer
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizeConfig,
}

impl Normalizer {
    /// Create a normalizer with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a normalizer with custom configuration
    pub fn with_config(config: NormalizeConfig) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub fn config(&self) -> &NormalizeConfig {
        &self.config
    }

    /// Normalize a key
    pub fn normalize(&self, key: &VariantKey) -> VariantKey {
        if let Some(sv) = key.structural() {
            if key.kind().is_copy_number() {
                let kind = self.config.copy_number.classify(sv.copy_number);
                if kind != key.kind() {
                    debug!("{}: copy-number kind {} -> {}", key, key.kind(), kind);
                }
                return key.with_kind(kind);
            }
            return key.clone();
        }

        if key.reference() == key.alternate() {
            return key.with_kind(VariantKind::NoVariation);
        }

        let trimmed = trim(key.reference(), key.alternate(), key.start());
        if !trimmed.trimmed() {
            return key.clone();
        }
        let kind = VariantKind::classify_sequence(&trimmed.reference, &trimmed.alternate);
        trace!(
            "{}: trimmed {} leading / {} trailing base(s)",
            key,
            trimmed.leading,
            trimmed.trailing
        );
        key.with_alleles(
            trimmed.start,
            trimmed.end(),
            trimmed.reference,
            trimmed.alternate,
            kind,
        )
    }

    /// Normalize a secondary allele with the same trimming rules
    pub fn normalize_secondary(&self, secondary: &SecondaryAllele) -> SecondaryAllele {
        if secondary.is_structural()
            || allele::is_placeholder(&secondary.alternate)
            || secondary.reference == secondary.alternate
        {
            return secondary.clone();
        }
        let trimmed = trim(&secondary.reference, &secondary.alternate, secondary.start);
        if !trimmed.trimmed() {
            return secondary.clone();
        }
        SecondaryAllele {
            chromosome: secondary.chromosome.clone(),
            start: trimmed.start,
            end: trimmed.end(),
            kind: VariantKind::classify_sequence(&trimmed.reference, &trimmed.alternate),
            reference: trimmed.reference,
            alternate: trimmed.alternate,
        }
    }

    /// Normalize, then split an MNV into its differing SNVs
    ///
    /// Positions where reference and alternate agree are skipped. Without
    /// `decompose_mnv`, or for any other kind, the normalized key is returned
    /// alone.
    pub fn decompose(&self, key: &VariantKey) -> Vec<VariantKey> {
        let normalized = self.normalize(key);
        if !self.config.decompose_mnv || normalized.kind() != VariantKind::Mnv {
            return vec![normalized];
        }

        let reference = normalized.reference().as_bytes();
        let alternate = normalized.alternate().as_bytes();
        let snvs: Vec<VariantKey> = reference
            .iter()
            .zip(alternate.iter())
            .enumerate()
            .filter(|(_, (r, a))| r != a)
            .map(|(i, (r, a))| {
                let pos = normalized.start() + i as u64;
                normalized.with_alleles(
                    pos,
                    pos,
                    char::from(*r).to_string(),
                    char::from(*a).to_string(),
                    VariantKind::Snv,
                )
            })
            .collect();
        debug!("{}: decomposed into {} SNV(s)", normalized, snvs.len());
        snvs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structural::CopyNumberPolicy;

    fn key(start: u64, reference: &str, alternate: &str) -> VariantKey {
        VariantKey::builder("1", start)
            .reference(reference)
            .alternate(alternate)
            .build()
            .unwrap()
    }

    #[test]
    fn test_normalize_snv_unchanged() {
        let k = key(1000, "A", "C");
        assert_eq!(Normalizer::new().normalize(&k), k);
    }

    #[test]
    fn test_normalize_deletion() {
        let n = Normalizer::new().normalize(&key(1000, "AT", "A"));
        assert_eq!(n.start(), 1001);
        assert_eq!(n.end(), 1001);
        assert_eq!(n.reference(), "T");
        assert_eq!(n.alternate(), "");
        assert_eq!(n.kind(), VariantKind::Deletion);
    }

    #[test]
    fn test_normalize_insertion() {
        let n = Normalizer::new().normalize(&key(1000, "A", "ATTG"));
        assert_eq!(n.start(), 1001);
        assert_eq!(n.end(), 1000);
        assert_eq!(n.reference(), "");
        assert_eq!(n.alternate(), "TTG");
        assert_eq!(n.kind(), VariantKind::Insertion);
    }

    #[test]
    fn test_normalize_indel_and_mnv() {
        let n = Normalizer::new().normalize(&key(10, "CAGT", "CTCT"));
        assert_eq!(n.kind(), VariantKind::Mnv);
        assert_eq!(n.start(), 11);

        let n = Normalizer::new().normalize(&key(10, "CAGT", "CTT"));
        assert_eq!(n.kind(), VariantKind::Indel);
        assert_eq!(n.reference(), "AG");
        assert_eq!(n.alternate(), "T");
    }

    #[test]
    fn test_no_variation_passes_through() {
        let k = key(1000, "ACG", "ACG");
        let n = Normalizer::new().normalize(&k);
        assert_eq!(n, k);
        assert_eq!(n.kind(), VariantKind::NoVariation);
    }

    #[test]
    fn test_idempotent() {
        let normalizer = Normalizer::new();
        for (r, a) in [("AT", "A"), ("G", "GTT"), ("CAGT", "CTCT"), ("TTTT", "TT")] {
            let once = normalizer.normalize(&key(100, r, a));
            assert_eq!(normalizer.normalize(&once), once);
        }
    }

    #[test]
    fn test_symbolic_not_trimmed() {
        let k = VariantKey::builder("1", 1000)
            .reference("A")
            .alternate("<DEL>")
            .end(1100)
            .build()
            .unwrap();
        assert_eq!(Normalizer::new().normalize(&k), k);
    }

    #[test]
    fn test_copy_number_rederived_with_policy() {
        let k = VariantKey::builder("X", 1000)
            .reference("N")
            .alternate("<CN1>")
            .end(5000)
            .build()
            .unwrap();
        assert_eq!(k.kind(), VariantKind::CopyNumberLoss);

        let haploid = Normalizer::with_config(
            NormalizeConfig::new().with_copy_number_policy(CopyNumberPolicy::with_baseline(1)),
        );
        assert_eq!(haploid.normalize(&k).kind(), VariantKind::CopyNumber);
    }

    #[test]
    fn test_normalize_secondary() {
        let sec = SecondaryAllele::new("1", 1000, "AT", "A");
        let n = Normalizer::new().normalize_secondary(&sec);
        assert_eq!(n.start, 1001);
        assert_eq!(n.reference, "T");
        assert_eq!(n.alternate, "");
        assert_eq!(n.kind, VariantKind::Deletion);

        let star = SecondaryAllele::new("1", 1000, "A", "*");
        assert_eq!(Normalizer::new().normalize_secondary(&star), star);
    }

    #[test]
    fn test_decompose_mnv() {
        let normalizer =
            Normalizer::with_config(NormalizeConfig::new().with_mnv_decomposition(true));
        let parts = normalizer.decompose(&key(10, "ACGT", "TCGA"));
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].to_string(), "1:10:A:T");
        assert_eq!(parts[1].to_string(), "1:13:T:A");
        assert!(parts.iter().all(|p| p.kind() == VariantKind::Snv));
    }

    #[test]
    fn test_decompose_disabled() {
        let parts = Normalizer::new().decompose(&key(10, "ACGT", "TCGA"));
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].kind(), VariantKind::Mnv);
    }
}
