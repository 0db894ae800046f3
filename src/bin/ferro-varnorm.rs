// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! ferro-varnorm CLI
//!
//! Command-line interface for variant notation parsing, normalization and VCF
//! conversion.

use clap::{Args, Parser, Subcommand};
use ferro_varnorm::batch::{BatchConfig, ErrorTally};
use ferro_varnorm::cli::{
    output_error_with_context, output_result, output_tally, parse_site, process_input_line,
    OutputFormat,
};
use ferro_varnorm::config::FerroConfig;
use ferro_varnorm::notation::{parse_coding, parse_with_policy, GenomicLocus};
use ferro_varnorm::vcf::{header_line, KeyToVcfConverter, VcfRecord, VcfToKeyConverter};
use ferro_varnorm::{FerroError, MockProvider, Normalizer, Strand};
use log::info;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ferro-varnorm")]
#[command(author, version, about = "Variant notation parser, normalizer and VCF converter")]
#[command(
    long_about = "Parse and normalize variant descriptors and convert them to and from VCF.

Examples:
  ferro-varnorm normalize '1:1000:AT:A'
  ferro-varnorm normalize -i variants.txt --format json
  ferro-varnorm coding 'c.10_12delAAG' --locus 17:5000-5002 --strand -
  echo '1:1000:A:C,1:1000:A:G' | ferro-varnorm to-vcf --reference ref.tsv
  ferro-varnorm from-vcf -i calls.vcf --samples NA12878,NA12891"
)]
struct Cli {
    /// Log level filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Configuration file (default: .ferro-varnorm.toml, then ~/.config/ferro/varnorm.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Input and output options shared by every subcommand
#[derive(Args)]
struct Common {
    /// Input file (one record per line); stdin when neither a value nor a file is given
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    /// Stop at the first rejected record
    #[arg(long)]
    fail_fast: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse descriptors without normalizing
    Parse {
        /// Descriptor (e.g. 1:1000:A:C or 1:g.1000A>C)
        variant: Option<String>,

        #[command(flatten)]
        common: Common,
    },

    /// Parse and normalize descriptors
    Normalize {
        /// Descriptor (e.g. 1:1000:AT:A)
        variant: Option<String>,

        /// Split MNVs into their differing SNVs
        #[arg(long)]
        decompose_mnv: bool,

        #[command(flatten)]
        common: Common,
    },

    /// Place coding fragments on a genomic locus
    Coding {
        /// Fragment (e.g. c.10_12delAAG)
        fragment: Option<String>,

        /// Genomic interval the fragment covers (chrom:start-end)
        #[arg(long)]
        locus: String,

        /// Strand the fragment is written against (+ or -)
        #[arg(long, default_value = "+", allow_hyphen_values = true)]
        strand: String,

        #[command(flatten)]
        common: Common,
    },

    /// Convert sites to VCF data lines
    ///
    /// Each input line is one site: comma-separated descriptors, primary first.
    ToVcf {
        /// Site descriptor(s)
        site: Option<String>,

        /// Reference sequences (TSV `contig<TAB>sequence` or a JSON object)
        #[arg(long)]
        reference: PathBuf,

        #[command(flatten)]
        common: Common,
    },

    /// Convert VCF data lines to canonical keys
    FromVcf {
        /// Sample ordering for genotypes (comma-separated; default: sorted by name)
        #[arg(long, value_delimiter = ',')]
        samples: Option<Vec<String>>,

        #[command(flatten)]
        common: Common,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    let file_config = match &cli.config {
        Some(path) => FerroConfig::load_from_path(path)?,
        None => FerroConfig::load()?.unwrap_or_default(),
    };

    match cli.command {
        Commands::Parse { variant, common } => {
            let config = configure(file_config, None, &common);
            let policy = config.normalize.copy_number;
            let inputs = read_inputs(variant.as_deref(), common.input.as_deref())?;
            drive(&common, &config.batch, &inputs, |input, writer, format| {
                let key = parse_with_policy(input, &policy)?;
                output_result(writer, input, &key.to_string(), &key, format)?;
                Ok(())
            })
        }
        Commands::Normalize {
            variant,
            decompose_mnv,
            common,
        } => {
            let config = configure(file_config, decompose_mnv.then_some(true), &common);
            let normalizer = Normalizer::with_config(config.normalize);
            let policy = config.normalize.copy_number;
            let inputs = read_inputs(variant.as_deref(), common.input.as_deref())?;
            drive(&common, &config.batch, &inputs, |input, writer, format| {
                let keys = normalizer.decompose(&parse_with_policy(input, &policy)?);
                let text = keys
                    .iter()
                    .map(|k| k.to_string())
                    .collect::<Vec<_>>()
                    .join(" ");
                output_result(writer, input, &text, &keys, format)?;
                Ok(())
            })
        }
        Commands::Coding {
            fragment,
            locus,
            strand,
            common,
        } => {
            let config = configure(file_config, None, &common);
            let normalizer = Normalizer::with_config(config.normalize);
            let locus: GenomicLocus = locus.parse()?;
            let strand: Strand = strand.parse()?;
            let inputs = read_inputs(fragment.as_deref(), common.input.as_deref())?;
            drive(&common, &config.batch, &inputs, |input, writer, format| {
                let key = normalizer.normalize(&parse_coding(input, &locus, strand)?);
                output_result(writer, input, &key.to_string(), &key, format)?;
                Ok(())
            })
        }
        Commands::ToVcf {
            site,
            reference,
            common,
        } => {
            let config = configure(file_config, None, &common);
            let normalizer = Normalizer::with_config(config.normalize);
            let provider = MockProvider::load(&reference)?;
            info!(
                "loaded {} reference contig(s) from {}",
                provider.len(),
                reference.display()
            );
            let converter =
                KeyToVcfConverter::new(&provider).with_max_frame_span(config.batch.max_frame_span);
            let inputs = read_inputs(site.as_deref(), common.input.as_deref())?;
            let mut header_written = false;
            drive(&common, &config.batch, &inputs, |input, writer, format| {
                let (primary, secondaries) = parse_site(input, &normalizer)?;
                let conversion = converter.convert(&primary, &secondaries, &[])?;
                match format {
                    OutputFormat::Json => {
                        output_result(writer, input, "", &conversion, format)?;
                    }
                    OutputFormat::Text => {
                        if !header_written {
                            writeln!(writer, "{}", header_line(&[]))?;
                            header_written = true;
                        }
                        writeln!(writer, "{}", conversion.record)?;
                    }
                }
                Ok(())
            })
        }
        Commands::FromVcf { samples, common } => {
            let config = configure(file_config, None, &common);
            let converter = VcfToKeyConverter::new(Normalizer::with_config(config.normalize));
            let lines = read_vcf_lines(common.input.as_deref())?;
            let mut sample_names: Vec<String> = Vec::new();
            let mut records = Vec::new();
            for (line_number, line) in lines {
                if line.starts_with("##") {
                    continue;
                }
                if let Some(header) = line.strip_prefix("#CHROM") {
                    sample_names = header.split('\t').skip(9).map(str::to_string).collect();
                    continue;
                }
                records.push((line_number, line));
            }
            drive(&common, &config.batch, &records, |line, writer, format| {
                let record = VcfRecord::parse_line(line, &sample_names)?;
                for decoded in converter.convert_with_samples(&record, samples.as_deref())? {
                    let genotypes = decoded
                        .samples
                        .iter()
                        .map(|s| format!("{}={}", s.name, s.genotype))
                        .collect::<Vec<_>>()
                        .join(" ");
                    let text = format!(
                        "{}:{} ALT{} -> {} {}",
                        record.chrom, record.pos, decoded.allele_index, decoded.key, genotypes
                    );
                    output_result(writer, line, text.trim_end(), &decoded, format)?;
                }
                Ok(())
            })
        }
    }
}

/// Merge the configuration file with command-line flags
fn configure(file_config: FerroConfig, decompose_mnv: Option<bool>, common: &Common) -> FerroConfig {
    file_config.merge_with_cli(decompose_mnv, common.fail_fast.then_some(false))
}

/// Run `op` over every input line, reporting rejections and a final tally
///
/// Returns an error when any record was rejected.
fn drive<F>(
    common: &Common,
    batch: &BatchConfig,
    inputs: &[(Option<usize>, String)],
    mut op: F,
) -> Result<(), Box<dyn std::error::Error>>
where
    F: FnMut(&str, &mut dyn Write, OutputFormat) -> Result<(), FerroError>,
{
    let format: OutputFormat = common.format.parse()?;
    let mut writer: Box<dyn Write> = match &common.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    };
    let mut stderr = io::stderr().lock();
    let mut tally = ErrorTally::new();
    let mut processed = 0usize;

    for (line_number, input) in inputs {
        processed += 1;
        if let Err(e) = op(input, &mut writer, format) {
            output_error_with_context(&mut stderr, input, &e, format, *line_number)?;
            tally.record(&e);
            if !batch.continue_on_error {
                info!(
                    "stopping after first rejection; {} record(s) skipped",
                    inputs.len() - processed
                );
                break;
            }
        }
        if processed % batch.progress_interval == 0 {
            info!("processed {}/{} record(s)", processed, inputs.len());
        }
    }
    writer.flush()?;
    output_tally(&mut stderr, inputs.len(), &tally, format)?;

    if tally.is_empty() {
        Ok(())
    } else {
        Err(format!("{} record(s) rejected", tally.total()).into())
    }
}

/// Collect inputs from the positional value, a file, or stdin
///
/// File and stdin lines carry their 1-based line number.
fn read_inputs(
    value: Option<&str>,
    input: Option<&Path>,
) -> io::Result<Vec<(Option<usize>, String)>> {
    if let Some(v) = value {
        return Ok(vec![(None, v.to_string())]);
    }
    let reader: Box<dyn BufRead> = match input {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(io::stdin().lock()),
    };
    let mut inputs = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if let Some(descriptor) = process_input_line(&line, i == 0) {
            inputs.push((Some(i + 1), descriptor.to_string()));
        }
    }
    Ok(inputs)
}

/// Read raw VCF lines; `#` lines are kept for header handling
fn read_vcf_lines(input: Option<&Path>) -> io::Result<Vec<(Option<usize>, String)>> {
    let reader: Box<dyn BufRead> = match input {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(io::stdin().lock()),
    };
    let mut lines = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if !line.trim().is_empty() {
            lines.push((Some(i + 1), line));
        }
    }
    Ok(lines)
}

fn init_tracing(level: &str) -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    // RUST_LOG wins over --log-level
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| format!("Invalid log level '{}': {}", level, e))?,
    };

    // The `log` records emitted by the library are bridged by `init`
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .try_init()?;

    Ok(())
}
