//! VCF record representation
//!
//! One data line of a VCF file: a shared position and reference with an
//! ordered list of alternates, INFO fields and per-sample genotypes. Only the
//! `GT` sample field is carried; other FORMAT keys are ignored on input.

use memchr::memchr_iter;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::FerroError;
use crate::model::allele::{self, Alphabet};

use super::genotype::{Genotype, SampleCall};

/// INFO key for the structural variant type
pub const INFO_SVTYPE: &str = "SVTYPE";
/// INFO key for the end of a symbolic allele
pub const INFO_END: &str = "END";
/// INFO key for the length of a symbolic allele
pub const INFO_SVLEN: &str = "SVLEN";
/// INFO key for the confidence interval around POS
pub const INFO_CIPOS: &str = "CIPOS";
/// INFO key for the confidence interval around END
pub const INFO_CIEND: &str = "CIEND";
/// INFO key for the copy number
pub const INFO_CN: &str = "CN";
/// INFO key for the known left side of an incompletely sequenced insertion
pub const INFO_LEFT_SVINSSEQ: &str = "LEFT_SVINSSEQ";
/// INFO key for the known right side of an incompletely sequenced insertion
pub const INFO_RIGHT_SVINSSEQ: &str = "RIGHT_SVINSSEQ";

/// Missing value marker
const MISSING: &str = ".";

/// A single VCF record representing one site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VcfRecord {
    /// Chromosome name (e.g., "chr1", "1", "X")
    pub chrom: String,

    /// 1-based position of the first base in the reference allele
    pub pos: u64,

    /// Variant identifier, None if "."
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Reference allele (upper-case ACGTN)
    pub reference: String,

    /// Alternate alleles in output order; `["."]` for a site without variation
    pub alternate: Vec<String>,

    /// Phred-scaled quality score, None if "."
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<f32>,

    /// Filter status, None if "."
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,

    /// INFO fields in output order
    #[serde(default)]
    pub info: Vec<(String, InfoValue)>,

    /// Per-sample genotypes
    #[serde(default)]
    pub samples: Vec<SampleCall>,
}

/// INFO field value types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InfoValue {
    /// Flag (presence indicates true)
    Flag,
    /// Integer value
    Integer(i64),
    /// Multiple integer values
    IntegerArray(Vec<i64>),
    /// Any other value, kept verbatim
    String(String),
}

impl InfoValue {
    /// Parse the text after `KEY=`
    pub fn parse(text: &str) -> Self {
        if let Ok(v) = text.parse::<i64>() {
            return InfoValue::Integer(v);
        }
        if text.contains(',') {
            let parsed: Result<Vec<i64>, _> = text.split(',').map(str::parse).collect();
            if let Ok(values) = parsed {
                return InfoValue::IntegerArray(values);
            }
        }
        InfoValue::String(text.to_string())
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            InfoValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// A pair of integers (`CIPOS`, `CIEND`)
    pub fn as_pair(&self) -> Option<(i64, i64)> {
        match self {
            InfoValue::IntegerArray(v) if v.len() == 2 => Some((v[0], v[1])),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            InfoValue::String(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for InfoValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InfoValue::Flag => Ok(()),
            InfoValue::Integer(v) => write!(f, "{}", v),
            InfoValue::IntegerArray(v) => {
                let s: Vec<_> = v.iter().map(|x| x.to_string()).collect();
                write!(f, "{}", s.join(","))
            }
            InfoValue::String(v) => write!(f, "{}", v),
        }
    }
}

impl VcfRecord {
    /// Create a new VCF record with minimal required fields
    pub fn new(chrom: String, pos: u64, reference: String, alternate: Vec<String>) -> Self {
        Self {
            chrom,
            pos,
            id: None,
            reference,
            alternate,
            quality: None,
            filter: None,
            info: Vec::new(),
            samples: Vec::new(),
        }
    }

    /// Set the variant ID
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    /// Set an INFO field, replacing an existing value
    pub fn with_info(mut self, key: &str, value: InfoValue) -> Self {
        self.set_info(key, value);
        self
    }

    /// Append a sample
    pub fn with_sample(mut self, name: &str, genotype: Genotype) -> Self {
        self.samples.push(SampleCall::new(name, genotype));
        self
    }

    /// Set an INFO field, replacing an existing value
    pub fn set_info(&mut self, key: &str, value: InfoValue) {
        match self.info.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value,
            None => self.info.push((key.to_string(), value)),
        }
    }

    /// Get an INFO field
    pub fn info(&self, key: &str) -> Option<&InfoValue> {
        self.info.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Get the end position (1-based, inclusive) of the reference allele
    pub fn end_pos(&self) -> u64 {
        self.pos
            .saturating_add(self.reference.len() as u64)
            .saturating_sub(1)
    }

    /// Check if this is a multi-allelic site
    pub fn is_multiallelic(&self) -> bool {
        self.alternate.len() > 1
    }

    /// Look up a sample by name
    pub fn sample(&self, name: &str) -> Option<&SampleCall> {
        self.samples.iter().find(|s| s.name == name)
    }

    /// Parse a tab-separated data line
    ///
    /// At least the five leading columns (`CHROM POS ID REF ALT`) are
    /// required; QUAL, FILTER and INFO default to missing. Sample columns
    /// take their names from `sample_names`, or `SAMPLE1`, `SAMPLE2`, ...
    /// when none are given. Errors carry the byte offset in `line`.
    pub fn parse_line(line: &str, sample_names: &[String]) -> Result<Self, FerroError> {
        let line = line.trim_end_matches(['\r', '\n']);
        let mut fields = Vec::with_capacity(10);
        let mut field_start = 0;
        for tab in memchr_iter(b'\t', line.as_bytes()) {
            fields.push((field_start, &line[field_start..tab]));
            field_start = tab + 1;
        }
        fields.push((field_start, &line[field_start..]));

        if fields.len() < 5 {
            return Err(FerroError::malformed_in(
                line,
                line.len(),
                format!("expected at least 5 tab-separated columns, found {}", fields.len()),
            ));
        }

        let (chrom_at, chrom) = fields[0];
        if chrom.is_empty() || chrom == MISSING {
            return Err(FerroError::malformed_in(line, chrom_at, "missing CHROM"));
        }

        let (pos_at, pos_text) = fields[1];
        let pos = pos_text
            .parse::<u64>()
            .ok()
            .filter(|p| *p > 0)
            .ok_or_else(|| FerroError::malformed_in(line, pos_at, "POS must be a positive integer"))?;

        let id = missing_or(fields[2].1).map(str::to_string);

        let (ref_at, ref_text) = fields[3];
        let reference = allele::validate_bases(ref_text, Alphabet::AcgtN)?;
        if reference.is_empty() {
            return Err(FerroError::malformed_in(line, ref_at, "REF is empty"));
        }

        let (alt_at, alt_text) = fields[4];
        if alt_text.is_empty() {
            return Err(FerroError::malformed_in(line, alt_at, "ALT is empty"));
        }
        let alternate = alt_text
            .split(',')
            .map(|a| {
                if allele::is_structural(a) || a == MISSING || a == "*" {
                    a.to_string()
                } else {
                    a.to_ascii_uppercase()
                }
            })
            .collect();

        let quality = match fields.get(5).and_then(|(at, q)| missing_or(q).map(|q| (at, q))) {
            Some((at, q)) => Some(
                q.parse::<f32>()
                    .map_err(|_| FerroError::malformed_in(line, *at, "invalid QUAL"))?,
            ),
            None => None,
        };
        let filter = fields
            .get(6)
            .and_then(|(_, f)| missing_or(f))
            .map(str::to_string);
        let info = fields
            .get(7)
            .and_then(|(_, i)| missing_or(i))
            .map(parse_info)
            .unwrap_or_default();

        let mut record = Self {
            chrom: chrom.to_string(),
            pos,
            id,
            reference,
            alternate,
            quality,
            filter,
            info,
            samples: Vec::new(),
        };

        if fields.len() > 8 {
            record.samples = parse_samples(line, &fields[8..], sample_names)?;
        }
        Ok(record)
    }
}

fn missing_or(field: &str) -> Option<&str> {
    if field.is_empty() || field == MISSING {
        None
    } else {
        Some(field)
    }
}

fn parse_info(text: &str) -> Vec<(String, InfoValue)> {
    text.split(';')
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once('=') {
            Some((key, value)) => (key.to_string(), InfoValue::parse(value)),
            None => (entry.to_string(), InfoValue::Flag),
        })
        .collect()
}

/// `fields[0]` is FORMAT, the rest are sample columns
fn parse_samples(
    line: &str,
    fields: &[(usize, &str)],
    sample_names: &[String],
) -> Result<Vec<SampleCall>, FerroError> {
    let (format_at, format) = fields[0];
    let columns = &fields[1..];
    if !sample_names.is_empty() && sample_names.len() != columns.len() {
        return Err(FerroError::malformed_in(
            line,
            format_at,
            format!(
                "{} sample name(s) given but the line has {} sample column(s)",
                sample_names.len(),
                columns.len()
            ),
        ));
    }
    if format.split(':').next() != Some("GT") {
        return Err(FerroError::malformed_in(
            line,
            format_at,
            "FORMAT must start with GT",
        ));
    }

    columns
        .iter()
        .enumerate()
        .map(|(i, (at, column))| {
            let gt = column.split(':').next().unwrap_or(MISSING);
            let genotype = gt.parse::<Genotype>().map_err(|e| e.offset_by(*at))?;
            let name = sample_names
                .get(i)
                .cloned()
                .unwrap_or_else(|| format!("SAMPLE{}", i + 1));
            Ok(SampleCall { name, genotype })
        })
        .collect()
}

/// Column header line (`#CHROM ... INFO [FORMAT samples...]`)
pub fn header_line(sample_names: &[String]) -> String {
    let mut header = String::from("#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO");
    if !sample_names.is_empty() {
        header.push_str("\tFORMAT");
        for name in sample_names {
            header.push('\t');
            header.push_str(name);
        }
    }
    header
}

impl fmt::Display for VcfRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.chrom,
            self.pos,
            self.id.as_deref().unwrap_or(MISSING),
            self.reference,
            self.alternate.join(","),
            self.quality.map_or(MISSING.to_string(), |q| q.to_string()),
            self.filter.as_deref().unwrap_or(MISSING),
        )?;

        if self.info.is_empty() {
            write!(f, "\t.")?;
        } else {
            let info_str: Vec<String> = self
                .info
                .iter()
                .map(|(k, v)| {
                    if matches!(v, InfoValue::Flag) {
                        k.clone()
                    } else {
                        format!("{}={}", k, v)
                    }
                })
                .collect();
            write!(f, "\t{}", info_str.join(";"))?;
        }

        if !self.samples.is_empty() {
            write!(f, "\tGT")?;
            for sample in &self.samples {
                write!(f, "\t{}", sample.genotype)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_new_record() {
        let record = VcfRecord::new(
            "chr1".to_string(),
            12345,
            "A".to_string(),
            vec!["G".to_string()],
        );

        assert_eq!(record.chrom, "chr1");
        assert_eq!(record.pos, 12345);
        assert_eq!(record.end_pos(), 12345);
        assert!(record.id.is_none());
        assert!(!record.is_multiallelic());
    }

    #[test]
    fn test_display_minimal() {
        let record = VcfRecord::new("1".into(), 100, "AT".into(), vec!["A".into(), "C".into()]);
        assert_eq!(record.to_string(), "1\t100\t.\tAT\tA,C\t.\t.\t.");
    }

    #[test]
    fn test_display_with_info_and_samples() {
        let record = VcfRecord::new("1".into(), 100, "A".into(), vec!["<DEL>".into()])
            .with_info(INFO_SVTYPE, InfoValue::String("DEL".into()))
            .with_info(INFO_END, InfoValue::Integer(200))
            .with_info(INFO_CIPOS, InfoValue::IntegerArray(vec![-5, 5]))
            .with_info("IMPRECISE", InfoValue::Flag)
            .with_sample("NA1", "0/1".parse().unwrap());
        assert_eq!(
            record.to_string(),
            "1\t100\t.\tA\t<DEL>\t.\t.\tSVTYPE=DEL;END=200;CIPOS=-5,5;IMPRECISE\tGT\t0/1"
        );
    }

    #[test]
    fn test_set_info_replaces() {
        let mut record = VcfRecord::new("1".into(), 1, "A".into(), vec!["C".into()]);
        record.set_info(INFO_CN, InfoValue::Integer(1));
        record.set_info(INFO_CN, InfoValue::Integer(3));
        assert_eq!(record.info.len(), 1);
        assert_eq!(record.info(INFO_CN).and_then(InfoValue::as_integer), Some(3));
    }

    #[test]
    fn test_parse_line_full() {
        let line = "chr1\t100\trs1\tacg\tA,<DEL>\t50\tPASS\tEND=300;CIPOS=-10,10;DB\tGT:DP\t0/1:12\t1|2:3";
        let names = vec!["B".to_string(), "A".to_string()];
        let record = VcfRecord::parse_line(line, &names).unwrap();
        assert_eq!(record.reference, "ACG");
        assert_eq!(record.alternate, vec!["A", "<DEL>"]);
        assert_eq!(record.id.as_deref(), Some("rs1"));
        assert_eq!(record.quality, Some(50.0));
        assert_eq!(record.info(INFO_END), Some(&InfoValue::Integer(300)));
        assert_eq!(
            record.info(INFO_CIPOS).and_then(InfoValue::as_pair),
            Some((-10, 10))
        );
        assert_eq!(record.info("DB"), Some(&InfoValue::Flag));
        assert_eq!(record.samples.len(), 2);
        assert_eq!(record.sample("A").unwrap().genotype.to_string(), "1|2");
    }

    #[test]
    fn test_parse_line_minimal_and_default_names() {
        let record = VcfRecord::parse_line("1\t5\t.\tA\tC", &[]).unwrap();
        assert!(record.info.is_empty());
        assert!(record.filter.is_none());

        let record = VcfRecord::parse_line("1\t5\t.\tA\tC\t.\t.\t.\tGT\t0/1", &[]).unwrap();
        assert_eq!(record.samples[0].name, "SAMPLE1");
    }

    #[test]
    fn test_parse_line_roundtrip() {
        let line = "1\t100\t.\tA\tC,T\t.\t.\t.\tGT\t0/1\t2|2";
        let record = VcfRecord::parse_line(line, &[]).unwrap();
        assert_eq!(record.to_string(), line);
    }

    #[test]
    fn test_parse_line_errors() {
        let err = VcfRecord::parse_line("1\tx\t.\tA\tC", &[]).unwrap_err();
        match err {
            FerroError::Malformed { pos, .. } => assert_eq!(pos, 2),
            other => panic!("unexpected {other:?}"),
        }
        assert!(VcfRecord::parse_line("1\t5\t.\tA", &[]).is_err());
        assert!(VcfRecord::parse_line("1\t0\t.\tA\tC", &[]).is_err());
        assert_eq!(
            VcfRecord::parse_line("1\t5\t.\tQ\tC", &[]).unwrap_err().code(),
            ErrorCode::InvalidAlleleCharacters
        );
        assert!(VcfRecord::parse_line("1\t5\t.\tA\tC\t.\t.\t.\tDP:GT\t3:0/1", &[]).is_err());
        assert!(
            VcfRecord::parse_line("1\t5\t.\tA\tC\t.\t.\t.\tGT\t0/1", &["a".into(), "b".into()])
                .is_err()
        );
    }

    #[test]
    fn test_header_line() {
        assert_eq!(
            header_line(&["S1".to_string()]),
            "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tS1"
        );
    }
}
