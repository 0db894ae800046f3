//! Batch processor implementation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::BufRead;
use std::time::{Duration, Instant};

use crate::error::{ErrorCode, FerroError};
use crate::model::VariantKey;
use crate::normalize::Normalizer;
use crate::notation::parse_with_policy;
use crate::reference::ReferenceProvider;
use crate::vcf::{KeyToVcfConverter, VcfRecord, DEFAULT_MAX_FRAME_SPAN};

/// Configuration for batch processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BatchConfig {
    /// Whether to continue processing on errors.
    pub continue_on_error: bool,
    /// Callback frequency (call progress callback every N items).
    pub progress_interval: usize,
    /// Widest multi-allelic frame, in bases, laid out during VCF conversion.
    pub max_frame_span: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            continue_on_error: true,
            progress_interval: 100,
            max_frame_span: DEFAULT_MAX_FRAME_SPAN,
        }
    }
}

impl BatchConfig {
    /// Create a new batch configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure whether to continue on errors.
    pub fn continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.continue_on_error = continue_on_error;
        self
    }

    /// Set the progress callback interval.
    pub fn progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Set the widest frame VCF conversion will lay out.
    pub fn max_frame_span(mut self, span: u64) -> Self {
        self.max_frame_span = span;
        self
    }

    pub fn validate(&self) -> Result<(), FerroError> {
        if self.progress_interval == 0 {
            return Err(FerroError::Config {
                msg: "batch progress-interval must be at least 1".to_string(),
            });
        }
        if self.max_frame_span == 0 {
            return Err(FerroError::Config {
                msg: "batch max-frame-span must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Progress information for batch operations.
#[derive(Debug, Clone)]
pub struct BatchProgress {
    /// Total items to process.
    pub total: usize,
    /// Items processed so far.
    pub processed: usize,
    /// Successful items so far.
    pub success: usize,
    /// Failed items so far.
    pub errors: usize,
    /// Time elapsed since start.
    pub elapsed: Duration,
}

impl BatchProgress {
    /// Calculate completion percentage.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.processed as f64 / self.total as f64) * 100.0
        }
    }

    /// Calculate processing rate (items per second), 0.0 before any time has elapsed.
    pub fn items_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs < f64::EPSILON {
            0.0
        } else {
            self.processed as f64 / secs
        }
    }
}

/// Result of a single item in a batch operation.
#[derive(Debug, Clone)]
pub enum ItemResult<T> {
    /// Successful processing.
    Ok(T),
    /// Failed processing with error.
    Err {
        /// Original input.
        input: String,
        /// Error that occurred.
        error: FerroError,
    },
}

impl<T> ItemResult<T> {
    /// Check if this is a success.
    pub fn is_ok(&self) -> bool {
        matches!(self, ItemResult::Ok(_))
    }

    /// Check if this is an error.
    pub fn is_err(&self) -> bool {
        matches!(self, ItemResult::Err { .. })
    }

    /// Get the success value if present.
    pub fn ok(self) -> Option<T> {
        match self {
            ItemResult::Ok(v) => Some(v),
            ItemResult::Err { .. } => None,
        }
    }

    /// Get the error if present.
    pub fn err(self) -> Option<FerroError> {
        match self {
            ItemResult::Ok(_) => None,
            ItemResult::Err { error, .. } => Some(error),
        }
    }
}

/// Failure counts per error category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorTally {
    counts: BTreeMap<ErrorCode, usize>,
}

impl ErrorTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one failure
    pub fn record(&mut self, error: &FerroError) {
        *self.counts.entry(error.code()).or_insert(0) += 1;
    }

    /// Failures in one category
    pub fn get(&self, code: ErrorCode) -> usize {
        self.counts.get(&code).copied().unwrap_or(0)
    }

    /// Failures across all categories
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Non-zero categories in code order
    pub fn iter(&self) -> impl Iterator<Item = (ErrorCode, usize)> + '_ {
        self.counts.iter().map(|(code, count)| (*code, *count))
    }
}

/// Result of a batch operation.
#[derive(Debug)]
pub struct BatchResult<T> {
    /// Individual results for each processed item.
    pub results: Vec<ItemResult<T>>,
    /// Items left unprocessed after a failure with `continue_on_error` off.
    pub skipped: usize,
    /// Total processing time.
    pub duration: Duration,
}

impl<T> BatchResult<T> {
    /// Get the total number of items processed.
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Get the number of successful items.
    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_ok()).count()
    }

    /// Get the number of failed items.
    pub fn error_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_err()).count()
    }

    /// Calculate success rate as a percentage.
    pub fn success_rate(&self) -> f64 {
        if self.results.is_empty() {
            100.0
        } else {
            (self.success_count() as f64 / self.results.len() as f64) * 100.0
        }
    }

    /// Count failures per category
    pub fn tally(&self) -> ErrorTally {
        let mut tally = ErrorTally::new();
        for result in &self.results {
            if let ItemResult::Err { error, .. } = result {
                tally.record(error);
            }
        }
        tally
    }

    /// Get only successful results.
    pub fn successes(self) -> Vec<T> {
        self.results.into_iter().filter_map(|r| r.ok()).collect()
    }

    /// Get only errors.
    pub fn errors(self) -> Vec<FerroError> {
        self.results.into_iter().filter_map(|r| r.err()).collect()
    }

    /// Check if all items were successful.
    pub fn all_ok(&self) -> bool {
        self.results.iter().all(|r| r.is_ok())
    }

    /// Check if any items failed.
    pub fn has_errors(&self) -> bool {
        self.results.iter().any(|r| r.is_err())
    }
}

/// Batch processor for variant descriptors.
///
/// Each descriptor is handled independently; a failure rejects only that
/// descriptor and is counted under its [`ErrorCode`].
#[derive(Debug, Clone, Default)]
pub struct BatchProcessor {
    normalizer: Normalizer,
    config: BatchConfig,
}

impl BatchProcessor {
    /// Create a new batch processor with default normalization.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new batch processor with configuration.
    pub fn with_config(normalizer: Normalizer, config: BatchConfig) -> Self {
        Self { normalizer, config }
    }

    /// Get the current configuration.
    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Parse descriptors without normalizing.
    pub fn parse<S: AsRef<str>>(&self, inputs: &[S]) -> BatchResult<VariantKey> {
        self.parse_with_progress(inputs, |_| {})
    }

    /// Parse descriptors with progress callback.
    pub fn parse_with_progress<S, F>(&self, inputs: &[S], progress_fn: F) -> BatchResult<VariantKey>
    where
        S: AsRef<str>,
        F: FnMut(BatchProgress),
    {
        let policy = self.normalizer.config().copy_number;
        self.run(inputs, |input| parse_with_policy(input, &policy), progress_fn)
    }

    /// Parse and normalize in one operation.
    pub fn parse_and_normalize<S: AsRef<str>>(&self, inputs: &[S]) -> BatchResult<VariantKey> {
        self.parse_and_normalize_with_progress(inputs, |_| {})
    }

    /// Parse and normalize with progress callback.
    pub fn parse_and_normalize_with_progress<S, F>(
        &self,
        inputs: &[S],
        progress_fn: F,
    ) -> BatchResult<VariantKey>
    where
        S: AsRef<str>,
        F: FnMut(BatchProgress),
    {
        let policy = self.normalizer.config().copy_number;
        self.run(
            inputs,
            |input| parse_with_policy(input, &policy).map(|key| self.normalizer.normalize(&key)),
            progress_fn,
        )
    }

    /// Parse, normalize and convert each descriptor to a VCF record.
    pub fn to_vcf<S, P>(&self, inputs: &[S], provider: &P) -> BatchResult<VcfRecord>
    where
        S: AsRef<str>,
        P: ReferenceProvider,
    {
        let policy = self.normalizer.config().copy_number;
        let converter =
            KeyToVcfConverter::new(provider).with_max_frame_span(self.config.max_frame_span);
        self.run(
            inputs,
            |input| {
                let key = self.normalizer.normalize(&parse_with_policy(input, &policy)?);
                converter.convert_key(&key)
            },
            |_| {},
        )
    }

    fn run<S, T, Op, F>(&self, inputs: &[S], op: Op, mut progress_fn: F) -> BatchResult<T>
    where
        S: AsRef<str>,
        Op: Fn(&str) -> Result<T, FerroError>,
        F: FnMut(BatchProgress),
    {
        let start = Instant::now();
        let total = inputs.len();
        let interval = self.config.progress_interval.max(1);
        let mut results = Vec::with_capacity(total);
        let mut success = 0;
        let mut errors = 0;

        for (i, input) in inputs.iter().enumerate() {
            let input = input.as_ref();
            let failed = match op(input) {
                Ok(value) => {
                    results.push(ItemResult::Ok(value));
                    success += 1;
                    false
                }
                Err(error) => {
                    log::debug!("rejected '{}': {}", input, error);
                    results.push(ItemResult::Err {
                        input: input.to_string(),
                        error,
                    });
                    errors += 1;
                    true
                }
            };

            if (i + 1) % interval == 0 || i + 1 == total || failed && !self.config.continue_on_error
            {
                progress_fn(BatchProgress {
                    total,
                    processed: i + 1,
                    success,
                    errors,
                    elapsed: start.elapsed(),
                });
            }

            if failed && !self.config.continue_on_error {
                break;
            }
        }

        let skipped = total - results.len();
        BatchResult {
            results,
            skipped,
            duration: start.elapsed(),
        }
    }
}

/// Read descriptors, one per line, skipping blank lines and `#` comments
pub fn read_descriptors<R: BufRead>(reader: R) -> Result<Vec<String>, FerroError> {
    let mut descriptors = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        descriptors.push(trimmed.to_string());
    }
    Ok(descriptors)
}
