//! Performance benchmarks for ferro-varnorm
//!
//! Run with: cargo bench
//! Run specific benchmark: cargo bench -- parsing

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ferro_varnorm::vcf::{KeyToVcfConverter, VcfRecord, VcfToKeyConverter};
use ferro_varnorm::{parse, MockProvider, Normalizer, SecondaryAllele};

// =============================================================================
// Parsing benchmarks
// =============================================================================

/// Benchmark descriptor parsing for different notations
fn bench_parsing(c: &mut Criterion) {
    let variants = vec![
        // VCF-style
        ("snv", "1:1000:A:C"),
        ("mnv", "1:1000:ACG:TTA"),
        ("del", "1:1000:AT:A"),
        ("ins", "1:1000:-:GGT"),
        // Symbolic
        ("sv_del", "1:1000-1100:A:<DEL>"),
        ("sv_dup_ci", "1:990<1000<1010-1090<1100<1110:N:<DUP>"),
        ("cn", "1:1000-2000:<CN4>"),
        // Breakend
        ("bnd", "1:800001:A:A[2:321681["),
        // Genomic HGVS
        ("g.sub", "NC_000001.11:g.12345A>G"),
        ("g.ins", "chr1:g.100_101insATG"),
    ];

    let mut group = c.benchmark_group("parsing");

    for (name, variant) in &variants {
        group.bench_with_input(BenchmarkId::new("type", name), variant, |b, v| {
            b.iter(|| parse(black_box(v)))
        });
    }

    group.finish();
}

/// Benchmark batch parsing throughput
fn bench_parsing_throughput(c: &mut Criterion) {
    let inputs: Vec<String> = (1..=1000)
        .map(|i| match i % 3 {
            0 => format!("1:{}:A:G", i),
            1 => format!("2:{}:CAT:C", i),
            _ => format!("X:{}:T:TAA", i),
        })
        .collect();

    let mut group = c.benchmark_group("throughput");
    group.throughput(Throughput::Elements(inputs.len() as u64));
    group.bench_function("parse_1000", |b| {
        b.iter(|| {
            for input in &inputs {
                let _ = parse(black_box(input));
            }
        })
    });
    group.finish();
}

// =============================================================================
// Normalization benchmarks
// =============================================================================

fn bench_normalization(c: &mut Criterion) {
    let normalizer = Normalizer::new();
    let variants = vec![
        ("snv", "1:1000:A:C"),
        ("anchored_del", "1:1000:AT:A"),
        ("long_flanks", "1:1000:GATTACAGATTACA:GATTACGATTACA"),
        ("structural", "1:1000-1100:A:<DEL>"),
    ];

    let mut group = c.benchmark_group("normalize");

    for (name, variant) in &variants {
        let key = parse(variant).unwrap();
        group.bench_with_input(BenchmarkId::new("type", name), &key, |b, k| {
            b.iter(|| normalizer.normalize(black_box(k)))
        });
    }

    group.finish();
}

// =============================================================================
// VCF benchmarks
// =============================================================================

fn bench_to_vcf(c: &mut Criterion) {
    let provider = MockProvider::new().with_contig("1", "GATTACAGATTACA".repeat(100));
    let converter = KeyToVcfConverter::new(&provider);
    let normalizer = Normalizer::new();

    let deletion = normalizer.normalize(&parse("1:3:TT:T").unwrap());
    let snv = parse("1:5:A:G").unwrap();
    let secondaries = vec![
        SecondaryAllele::new("1", 5, "A", "C"),
        SecondaryAllele::new("1", 5, "A", "G"),
        SecondaryAllele::new("1", 5, "AC", "A"),
    ];

    let mut group = c.benchmark_group("to_vcf");
    group.bench_function("anchored_deletion", |b| {
        b.iter(|| converter.convert_key(black_box(&deletion)))
    });
    group.bench_function("multiallelic_with_discard", |b| {
        b.iter(|| converter.convert(black_box(&snv), black_box(&secondaries), &[]))
    });
    group.finish();
}

fn bench_from_vcf(c: &mut Criterion) {
    let names = vec!["S1".to_string(), "S2".to_string()];
    let line = "1\t1000\trs1\tAT\tA,ATT,GT\t50\tPASS\tDP=30\tGT\t1/2\t0|3";
    let record = VcfRecord::parse_line(line, &names).unwrap();
    let converter = VcfToKeyConverter::default();

    let mut group = c.benchmark_group("from_vcf");
    group.bench_function("parse_line", |b| {
        b.iter(|| VcfRecord::parse_line(black_box(line), &names))
    });
    group.bench_function("decode", |b| b.iter(|| converter.convert(black_box(&record))));
    group.finish();
}

// =============================================================================
// Error handling benchmarks
// =============================================================================

fn bench_error_handling(c: &mut Criterion) {
    let invalid_variants = vec![
        ("bad_allele", "1:1000:A:R"),
        ("missing_field", "1:1000:A"),
        ("coding_fragment", "c.503_508del"),
        ("malformed", "this is not a variant"),
    ];

    let mut group = c.benchmark_group("errors");

    for (name, variant) in &invalid_variants {
        group.bench_with_input(BenchmarkId::new("parse", name), variant, |b, v| {
            b.iter(|| {
                let _ = parse(black_box(v));
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_parsing,
    bench_parsing_throughput,
    bench_normalization,
    bench_to_vcf,
    bench_from_vcf,
    bench_error_handling,
);

criterion_main!(benches);
