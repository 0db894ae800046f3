//! VCF to canonical key conversion
//!
//! Rebuilds one normalized [`VariantKey`] per alternate of a [`VcfRecord`].
//! The other alternates become that key's secondary alleles, and sample
//! genotypes are re-indexed so the chosen alternate is allele `1`.
//!
//! Structural alternates take their span and detail from INFO:
//!
//! | INFO | Used for |
//! |------|----------|
//! | `END` | symbolic end |
//! | `SVLEN` | symbolic end when `END` is absent (sign ignored) |
//! | `CIPOS` / `CIEND` | confidence intervals around start / end |
//! | `CN` | copy number |
//! | `LEFT_SVINSSEQ` / `RIGHT_SVINSSEQ` | insertion fragments of `<INS>` |
//!
//! Universal placeholders (`*`, `<*>`, `<NON_REF>`) stand for "any other
//! allele"; they are kept as secondaries but never become a primary key.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::FerroError;
use crate::model::allele;
use crate::model::{ConfidenceInterval, SecondaryAllele, VariantKey, VariantKind};
use crate::normalize::Normalizer;

use super::genotype::{Genotype, SampleCall};
use super::record::{
    InfoValue, VcfRecord, INFO_CIEND, INFO_CIPOS, INFO_CN, INFO_END, INFO_LEFT_SVINSSEQ,
    INFO_RIGHT_SVINSSEQ, INFO_SVLEN,
};

/// One canonical variant recovered from a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedVariant {
    /// Position of the alternate in the record's ALT list (1-based)
    pub allele_index: usize,
    /// Normalized primary key
    pub key: VariantKey,
    /// The record's other alternates, in ALT order
    pub secondaries: Vec<SecondaryAllele>,
    /// Genotypes indexing `[ref, key, secondaries...]`
    pub samples: Vec<SampleCall>,
}

/// Converter from VCF records to canonical keys
#[derive(Debug, Clone, Default)]
pub struct VcfToKeyConverter {
    normalizer: Normalizer,
}

impl VcfToKeyConverter {
    pub fn new(normalizer: Normalizer) -> Self {
        Self { normalizer }
    }

    /// Convert a record, ordering samples lexicographically by name
    pub fn convert(&self, record: &VcfRecord) -> Result<Vec<DecodedVariant>, FerroError> {
        self.convert_with_samples(record, None)
    }

    /// Convert a record with an explicit sample ordering
    ///
    /// Names in `sample_order` that the record lacks get a missing genotype;
    /// record samples not named are dropped. Without an ordering, samples are
    /// sorted by name.
    pub fn convert_with_samples(
        &self,
        record: &VcfRecord,
        sample_order: Option<&[String]>,
    ) -> Result<Vec<DecodedVariant>, FerroError> {
        if record.alternate.is_empty() {
            return Err(FerroError::malformed(0, "record has no ALT allele"));
        }
        if record.alternate.len() > 1 && record.alternate.iter().any(|a| a == ".") {
            return Err(FerroError::malformed(
                0,
                "'.' ALT cannot be combined with other alternates",
            ));
        }

        let alleles = record
            .alternate
            .iter()
            .map(|alt| self.decode_allele(record, alt))
            .collect::<Result<Vec<_>, _>>()?;

        let samples = ordered_samples(record, sample_order);

        let decoded: Vec<DecodedVariant> = alleles
            .iter()
            .enumerate()
            .filter_map(|(i, allele)| {
                let key = match allele {
                    Allele::Key(key) => key.clone(),
                    Allele::Placeholder(secondary) => {
                        debug!(
                            "{}:{}: placeholder '{}' kept as secondary only",
                            record.chrom, record.pos, secondary.alternate
                        );
                        return None;
                    }
                };
                let allele_index = i + 1;
                let secondaries = alleles
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != i)
                    .map(|(_, other)| other.as_secondary())
                    .collect();
                let mapping = reorder_mapping(record.alternate.len(), allele_index);
                let samples = samples
                    .iter()
                    .map(|s| SampleCall::new(s.name.clone(), s.genotype.remap(&mapping)))
                    .collect();
                Some(DecodedVariant {
                    allele_index,
                    key,
                    secondaries,
                    samples,
                })
            })
            .collect();
        Ok(decoded)
    }

    fn decode_allele(&self, record: &VcfRecord, alt: &str) -> Result<Allele, FerroError> {
        if allele::is_placeholder(alt) {
            let end = record.end_pos().max(record.pos);
            return Ok(Allele::Placeholder(SecondaryAllele::with_span(
                record.chrom.clone(),
                record.pos,
                end,
                record.reference.clone(),
                alt,
                VariantKind::NoVariation,
            )));
        }

        // '.' means no variation at the site
        let alternate = if alt == "." { record.reference.as_str() } else { alt };

        let mut builder = VariantKey::builder(record.chrom.clone(), record.pos)
            .reference(&record.reference)
            .alternate(alternate)
            .copy_number_policy(self.normalizer.config().copy_number);

        if allele::is_structural(alternate) {
            let symbolic = allele::is_symbolic(alternate);
            let end = info_integer(record, INFO_END)?;
            let length = info_integer(record, INFO_SVLEN)?.map(i64::unsigned_abs);
            let end_hint = if symbolic {
                match (end, length) {
                    (Some(end), _) => Some(to_position(end, INFO_END)?),
                    (None, Some(len)) if len > 0 => {
                        Some(record.pos.checked_add(len - 1).ok_or_else(|| {
                            FerroError::malformed(
                                0,
                                format!("SVLEN={} overflows from POS {}", len, record.pos),
                            )
                        })?)
                    }
                    _ => None,
                }
            } else {
                None
            };

            if symbolic {
                if let Some(end) = end {
                    builder = builder.end(to_position(end, INFO_END)?);
                } else if let Some(len) = length {
                    builder = builder.sv_length(len);
                }
            }
            if let Some((l, r)) = info_pair(record, INFO_CIPOS)? {
                builder = builder.ci_start(ConfidenceInterval::from_offsets(record.pos, l, r)?);
            }
            if let Some((l, r)) = info_pair(record, INFO_CIEND)? {
                match end_hint {
                    Some(end) => {
                        builder = builder.ci_end(ConfidenceInterval::from_offsets(end, l, r)?)
                    }
                    None => debug!(
                        "{}:{}: ignoring CIEND without END or SVLEN",
                        record.chrom, record.pos
                    ),
                }
            }
            if let Some(cn) = info_integer(record, INFO_CN)? {
                let cn = u32::try_from(cn).map_err(|_| {
                    FerroError::malformed(0, format!("invalid copy number CN={}", cn))
                })?;
                builder = builder.copy_number(cn);
            }
            if alternate == "<INS>" {
                let left = record.info(INFO_LEFT_SVINSSEQ).and_then(InfoValue::as_str);
                let right = record.info(INFO_RIGHT_SVINSSEQ).and_then(InfoValue::as_str);
                if let (Some(left), Some(right)) = (left, right) {
                    builder = builder.insertion_fragments(left, right);
                }
            }
        }

        let key = builder.build()?;
        Ok(Allele::Key(self.normalizer.normalize(&key)))
    }
}

/// Decoded alternate
#[derive(Debug, Clone)]
enum Allele {
    Key(VariantKey),
    Placeholder(SecondaryAllele),
}

impl Allele {
    fn as_secondary(&self) -> SecondaryAllele {
        match self {
            Allele::Key(key) => SecondaryAllele::from_key(key),
            Allele::Placeholder(secondary) => secondary.clone(),
        }
    }
}

/// Old index -> new index, moving `chosen` to 1 and keeping the others in order
fn reorder_mapping(alt_count: usize, chosen: usize) -> Vec<Option<usize>> {
    (0..=alt_count)
        .map(|old| {
            Some(match old {
                0 => 0,
                i if i == chosen => 1,
                i if i < chosen => i + 1,
                i => i,
            })
        })
        .collect()
}

fn ordered_samples(record: &VcfRecord, sample_order: Option<&[String]>) -> Vec<SampleCall> {
    match sample_order {
        Some(order) => order
            .iter()
            .map(|name| match record.sample(name) {
                Some(sample) => sample.clone(),
                None => SampleCall::new(name.clone(), Genotype::missing()),
            })
            .collect(),
        None => {
            let mut samples = record.samples.clone();
            samples.sort_by(|a, b| a.name.cmp(&b.name));
            samples
        }
    }
}

fn info_integer(record: &VcfRecord, key: &str) -> Result<Option<i64>, FerroError> {
    match record.info(key) {
        None => Ok(None),
        Some(value) => value.as_integer().map(Some).ok_or_else(|| {
            FerroError::malformed(0, format!("INFO {} must be an integer, found '{}'", key, value))
        }),
    }
}

fn info_pair(record: &VcfRecord, key: &str) -> Result<Option<(i64, i64)>, FerroError> {
    match record.info(key) {
        None => Ok(None),
        Some(value) => value.as_pair().map(Some).ok_or_else(|| {
            FerroError::malformed(0, format!("INFO {} must be two integers, found '{}'", key, value))
        }),
    }
}

fn to_position(value: i64, key: &str) -> Result<u64, FerroError> {
    u64::try_from(value)
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| FerroError::malformed(0, format!("INFO {}={} is not a position", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::model::BreakendOrientation;
    use rstest::rstest;

    fn record(line: &str) -> VcfRecord {
        VcfRecord::parse_line(line, &[]).unwrap()
    }

    #[test]
    fn test_biallelic_deletion_normalized() {
        let decoded = VcfToKeyConverter::default()
            .convert(&record("1\t1000\t.\tAT\tA"))
            .unwrap();
        assert_eq!(decoded.len(), 1);
        let key = &decoded[0].key;
        assert_eq!(key.start(), 1001);
        assert_eq!(key.reference(), "T");
        assert_eq!(key.alternate(), "");
        assert_eq!(key.kind(), VariantKind::Deletion);
        assert!(decoded[0].secondaries.is_empty());
    }

    #[test]
    fn test_multiallelic_reorders_genotypes() {
        let names = vec!["S2".to_string(), "S1".to_string()];
        let rec = VcfRecord::parse_line("1\t100\t.\tA\tC,G,T\t.\t.\t.\tGT\t1/3\t2|0", &names)
            .unwrap();
        let decoded = VcfToKeyConverter::default().convert(&rec).unwrap();
        assert_eq!(decoded.len(), 3);

        // lexicographic sample order
        assert_eq!(decoded[0].samples[0].name, "S1");

        let third = &decoded[2];
        assert_eq!(third.allele_index, 3);
        assert_eq!(third.key.alternate(), "T");
        let alts: Vec<&str> = third.secondaries.iter().map(|s| s.alternate.as_str()).collect();
        assert_eq!(alts, vec!["C", "G"]);
        // S2 was 1/3: C is now 2, T is now 1
        assert_eq!(third.samples[1].genotype.to_string(), "2/1");
        // S1 was 2|0: G is now 3
        assert_eq!(third.samples[0].genotype.to_string(), "3|0");
    }

    #[test]
    fn test_explicit_sample_order() {
        let names = vec!["A".to_string(), "B".to_string()];
        let rec = VcfRecord::parse_line("1\t100\t.\tA\tC\t.\t.\t.\tGT\t0/1\t1/1", &names).unwrap();
        let order = vec!["B".to_string(), "Z".to_string()];
        let decoded = VcfToKeyConverter::default()
            .convert_with_samples(&rec, Some(&order))
            .unwrap();
        let samples = &decoded[0].samples;
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].genotype.to_string(), "1/1");
        assert_eq!(samples[1].name, "Z");
        assert!(samples[1].genotype.is_missing());
    }

    #[test]
    fn test_missing_alt_is_no_variation() {
        let decoded = VcfToKeyConverter::default()
            .convert(&record("1\t100\t.\tA\t."))
            .unwrap();
        assert_eq!(decoded[0].key.kind(), VariantKind::NoVariation);
        assert_eq!(decoded[0].key.alternate(), "A");

        assert!(VcfToKeyConverter::default()
            .convert(&record("1\t100\t.\tA\t.,C"))
            .is_err());
    }

    #[test]
    fn test_symbolic_with_info() {
        let rec = record("1\t1000\t.\tA\t<DEL>\t.\t.\tSVTYPE=DEL;END=1100;CIPOS=-10,10;CIEND=-5,5");
        let key = &VcfToKeyConverter::default().convert(&rec).unwrap()[0].key;
        assert_eq!(key.end(), 1100);
        assert_eq!(key.length(), 101);
        let sv = key.structural().unwrap();
        assert_eq!(sv.ci_start, Some(ConfidenceInterval { left: 990, right: 1010 }));
        assert_eq!(sv.ci_end, Some(ConfidenceInterval { left: 1095, right: 1105 }));
    }

    #[test]
    fn test_symbolic_from_svlen() {
        let rec = record("1\t1000\t.\tN\t<DUP>\t.\t.\tSVLEN=-50");
        let key = &VcfToKeyConverter::default().convert(&rec).unwrap()[0].key;
        assert_eq!(key.end(), 1049);
        assert_eq!(key.kind(), VariantKind::Duplication);
    }

    #[test]
    fn test_symbolic_without_end() {
        let err = VcfToKeyConverter::default()
            .convert(&record("1\t1000\t.\tN\t<DEL>"))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::IncompleteStructuralDescription);
    }

    #[test]
    fn test_copy_number_from_info() {
        let rec = record("1\t1000\t.\tN\t<CNV>\t.\t.\tEND=2000;CN=0");
        let key = &VcfToKeyConverter::default().convert(&rec).unwrap()[0].key;
        assert_eq!(key.kind(), VariantKind::CopyNumberLoss);
        assert_eq!(key.structural().unwrap().copy_number, Some(0));

        let rec = record("1\t1000\t.\tN\t<CNV>\t.\t.\tEND=2000;CN=-1");
        assert!(VcfToKeyConverter::default().convert(&rec).is_err());
    }

    #[test]
    fn test_breakend() {
        let rec = record("2\t800001\t.\tA\tA[2:321681[\t.\t.\tSVTYPE=BND");
        let key = &VcfToKeyConverter::default().convert(&rec).unwrap()[0].key;
        let bnd = key.structural().unwrap().breakend.as_ref().unwrap();
        assert_eq!(bnd.orientation, Some(BreakendOrientation::EndStart));
        assert_eq!(key.kind(), VariantKind::Breakend);
    }

    #[test]
    fn test_insertion_fragments() {
        let rec = record("1\t1000\t.\tA\t<INS>\t.\t.\tLEFT_SVINSSEQ=ACG;RIGHT_SVINSSEQ=TTA");
        let key = &VcfToKeyConverter::default().convert(&rec).unwrap()[0].key;
        assert_eq!(key.to_string(), "1:1000-1000:A:ACG...TTA");
    }

    #[test]
    fn test_placeholder_only_secondary() {
        let rec = record("1\t100\t.\tA\tC,<NON_REF>\t.\t.\t.\tGT\t0/2");
        let decoded = VcfToKeyConverter::default().convert(&rec).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].secondaries[0].alternate, "<NON_REF>");
        assert_eq!(decoded[0].samples[0].genotype.to_string(), "0/2");
    }

    #[rstest]
    #[case("1\t18446744073709551610\t.\tN\t<DEL>\t.\t.\tSVLEN=-100")]
    #[case("1\t18446744073709551615\t.\tAC\tA")]
    #[case("1\t1000\t.\tA\t<DEL>\t.\t.\tEND=1100;CIPOS=-9223372036854775808,0")]
    #[case("1\t18446744073709551000\t.\tA\t<INS>\t.\t.\tCIPOS=0,1000")]
    fn test_coordinates_beyond_range_rejected(#[case] line: &str) {
        let err = VcfToKeyConverter::default()
            .convert(&record(line))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::MalformedNotation);
    }

    #[test]
    fn test_reorder_mapping() {
        assert_eq!(
            reorder_mapping(3, 2),
            vec![Some(0), Some(2), Some(1), Some(3)]
        );
    }
}
