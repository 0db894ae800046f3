//! Batch processing and configuration tests

use std::io::Cursor;

use ferro_varnorm::batch::{read_descriptors, BatchConfig, BatchProcessor, ItemResult};
use ferro_varnorm::config::FerroConfig;
use ferro_varnorm::{ErrorCode, MockProvider, NormalizeConfig, Normalizer, VariantKind};

const MIXED_INPUT: &[&str] = &[
    "1:1000:A:C",
    "1:1000:AT:A",
    "c.503_508del",
    "1:1000:A:R",
    "1:1000-1100:<DUP>",
    "garbage",
];

#[test]
fn test_mixed_batch_tally() {
    let result = BatchProcessor::new().parse_and_normalize(MIXED_INPUT);
    assert_eq!(result.total(), 6);
    assert_eq!(result.success_count(), 3);
    assert_eq!(result.error_count(), 3);
    assert_eq!(result.skipped, 0);

    let tally = result.tally();
    assert_eq!(tally.total(), 3);
    assert_eq!(tally.get(ErrorCode::UnsupportedVariantShape), 1);
    assert_eq!(tally.get(ErrorCode::InvalidAlleleCharacters), 1);
    assert_eq!(tally.get(ErrorCode::MalformedNotation), 1);
    assert_eq!(tally.get(ErrorCode::ReferenceUnavailable), 0);
}

#[test]
fn test_rejected_items_keep_their_input() {
    let result = BatchProcessor::new().parse(MIXED_INPUT);
    let rejected: Vec<&str> = result
        .results
        .iter()
        .filter_map(|r| match r {
            ItemResult::Err { input, .. } => Some(input.as_str()),
            ItemResult::Ok(_) => None,
        })
        .collect();
    assert_eq!(rejected, vec!["c.503_508del", "1:1000:A:R", "garbage"]);
}

#[test]
fn test_stop_on_first_error() {
    let processor = BatchProcessor::with_config(
        Normalizer::new(),
        BatchConfig::new().continue_on_error(false),
    );
    let result = processor.parse_and_normalize(MIXED_INPUT);
    assert_eq!(result.total(), 3);
    assert_eq!(result.success_count(), 2);
    assert_eq!(result.skipped, 3);
    assert!(result.has_errors());
}

#[test]
fn test_progress_reported_at_interval() {
    let inputs: Vec<String> = (1..=25).map(|p| format!("1:{}:A:G", p)).collect();
    let processor =
        BatchProcessor::with_config(Normalizer::new(), BatchConfig::new().progress_interval(10));
    let mut seen = Vec::new();
    let result = processor.parse_and_normalize_with_progress(&inputs, |p| seen.push(p.processed));
    assert!(result.all_ok());
    assert_eq!(seen, vec![10, 20, 25]);
}

#[test]
fn test_batch_to_vcf() {
    let provider = MockProvider::new().with_contig("1", "GATTACAGATTACA");
    let result = BatchProcessor::new().to_vcf(&["1:3:TT:T", "1:5:A:G", "2:5:AT:A"], &provider);
    assert_eq!(result.success_count(), 2);
    assert_eq!(result.tally().get(ErrorCode::ReferenceUnavailable), 1);

    let records = result.successes();
    assert_eq!(records[0].pos, 2);
    assert_eq!(records[0].reference, "AT");
    assert_eq!(records[1].alternate, vec!["G"]);
}

#[test]
fn test_batch_to_vcf_frame_limit() {
    let provider = MockProvider::new().with_contig("1", "GATTACAGATTACA");
    let processor =
        BatchProcessor::with_config(Normalizer::new(), BatchConfig::new().max_frame_span(2));
    let result = processor.to_vcf(&["1:2:ATTA:GCCG", "1:5:A:G"], &provider);
    assert_eq!(result.success_count(), 1);
    assert_eq!(result.tally().get(ErrorCode::AmbiguousMultiallelicConflict), 1);
}

#[test]
fn test_processor_honours_normalizer_config() {
    let toml = r#"
        [normalize.copy-number]
        loss-below = 1
        gain-above = 1
    "#;
    let config = FerroConfig::parse(toml).unwrap();
    let processor = BatchProcessor::with_config(Normalizer::with_config(config.normalize), config.batch);
    let keys = processor.parse(&["Y:1000-2000:<CN1>"]).successes();
    assert_eq!(keys[0].kind(), VariantKind::CopyNumber);
}

#[test]
fn test_read_descriptors_skips_comments() {
    let input = "# header\n1:1000:A:C\n\n  1:1000:AT:A  \n# trailing\n";
    let descriptors = read_descriptors(Cursor::new(input)).unwrap();
    assert_eq!(descriptors, vec!["1:1000:A:C", "1:1000:AT:A"]);
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_config_defaults_when_empty() {
    let config = FerroConfig::parse("").unwrap();
    assert_eq!(config, FerroConfig::default());
    assert!(config.batch.continue_on_error);
    assert!(!config.normalize.decompose_mnv);
}

#[test]
fn test_config_cli_overrides() {
    let config = FerroConfig::parse("[normalize]\ndecompose-mnv = true\n")
        .unwrap()
        .merge_with_cli(Some(false), Some(false));
    assert!(!config.normalize.decompose_mnv);
    assert!(!config.batch.continue_on_error);
}

#[test]
fn test_config_rejects_unknown_and_invalid() {
    assert_eq!(
        FerroConfig::parse("[output]\nformat = \"json\"\n").unwrap_err().code(),
        ErrorCode::Config
    );
    assert_eq!(
        FerroConfig::parse("[batch]\nprogress-interval = 0\n").unwrap_err().code(),
        ErrorCode::Config
    );
}

#[test]
fn test_config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("varnorm.toml");
    std::fs::write(&path, "[normalize]\ndecompose-mnv = true\n").unwrap();
    let config = FerroConfig::load_from_path(&path).unwrap();
    assert_eq!(
        config.normalize,
        NormalizeConfig::new().with_mnv_decomposition(true)
    );
}

#[cfg(feature = "parallel")]
mod parallel {
    use ferro_varnorm::parallel::{parse_and_normalize_parallel, parse_parallel};
    use ferro_varnorm::Normalizer;

    #[test]
    fn test_parallel_matches_sequential() {
        let inputs: Vec<String> = (1..=200)
            .map(|p| format!("1:{}:AT:A", p * 10))
            .collect();
        let keys = parse_and_normalize_parallel(&Normalizer::new(), &inputs);
        for (i, key) in keys.iter().enumerate() {
            assert_eq!(key.as_ref().unwrap().start(), (i as u64 + 1) * 10 + 1);
        }
        assert!(parse_parallel(&["bad"])[0].is_err());
    }
}
