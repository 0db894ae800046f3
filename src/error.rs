//! Error types for ferro-varnorm
//!
//! Every failure is local to one variant record and belongs to exactly one
//! [`ErrorCode`] category, so batch drivers can tally rejected records by
//! reason without aborting. Parse failures additionally carry the byte offset
//! of the problem and an optional [`Diagnostic`] for display.

use std::fmt;
use thiserror::Error;

/// Error codes for categorizing per-record failures
///
/// These codes are stable and can be used for programmatic tallies
/// (e.g. counting invalid lines per reason in an importer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum ErrorCode {
    // Notation errors (E1xxx)
    /// Descriptor does not follow any supported grammar
    MalformedNotation = 1001,
    /// Allele contains characters outside the accepted alphabet
    InvalidAlleleCharacters = 1002,
    /// Notation is well formed but describes a shape this crate never resolves
    UnsupportedVariantShape = 1003,

    // Structural errors (E2xxx)
    /// Symbolic allele missing its mandatory end or length
    IncompleteStructuralDescription = 2001,

    // Multi-allelic errors (E3xxx)
    /// Alleles at one site cannot be placed in a single coordinate frame
    AmbiguousMultiallelicConflict = 3001,

    // Reference errors (E4xxx)
    /// Reference base needed for anchoring is not available
    ReferenceUnavailable = 4001,

    // IO errors (E9xxx)
    /// File IO error
    Io = 9001,
    /// Configuration file error
    Config = 9002,
}

impl ErrorCode {
    /// All codes, in numeric order
    pub const ALL: [ErrorCode; 8] = [
        ErrorCode::MalformedNotation,
        ErrorCode::InvalidAlleleCharacters,
        ErrorCode::UnsupportedVariantShape,
        ErrorCode::IncompleteStructuralDescription,
        ErrorCode::AmbiguousMultiallelicConflict,
        ErrorCode::ReferenceUnavailable,
        ErrorCode::Io,
        ErrorCode::Config,
    ];

    /// Get the error code as a string (e.g., "E1001")
    pub fn as_str(&self) -> String {
        format!("E{:04}", *self as u16)
    }

    /// Category name in SCREAMING_SNAKE_CASE (e.g., "MALFORMED_NOTATION")
    pub fn name(&self) -> &'static str {
        match self {
            ErrorCode::MalformedNotation => "MALFORMED_NOTATION",
            ErrorCode::InvalidAlleleCharacters => "INVALID_ALLELE_CHARACTERS",
            ErrorCode::UnsupportedVariantShape => "UNSUPPORTED_VARIANT_SHAPE",
            ErrorCode::IncompleteStructuralDescription => "INCOMPLETE_STRUCTURAL_DESCRIPTION",
            ErrorCode::AmbiguousMultiallelicConflict => "AMBIGUOUS_MULTIALLELIC_CONFLICT",
            ErrorCode::ReferenceUnavailable => "REFERENCE_UNAVAILABLE",
            ErrorCode::Io => "IO",
            ErrorCode::Config => "CONFIG",
        }
    }

    /// Get a brief description of this error code
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::MalformedNotation => "malformed variant notation",
            ErrorCode::InvalidAlleleCharacters => "invalid allele characters",
            ErrorCode::UnsupportedVariantShape => "unsupported variant shape",
            ErrorCode::IncompleteStructuralDescription => "incomplete structural description",
            ErrorCode::AmbiguousMultiallelicConflict => "ambiguous multi-allelic conflict",
            ErrorCode::ReferenceUnavailable => "reference base not available",
            ErrorCode::Io => "file I/O error",
            ErrorCode::Config => "configuration error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A span in the source input indicating error location
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceSpan {
    /// Starting byte offset (0-indexed)
    pub start: usize,
    /// Ending byte offset (exclusive)
    pub end: usize,
}

impl SourceSpan {
    /// Create a new source span
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Create a span for a single position
    pub fn point(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos + 1,
        }
    }

    /// Format the source with the error highlighted
    ///
    /// Returns a string like:
    /// ```text
    /// 1:1000:A:Q
    ///          ^
    /// ```
    pub fn highlight(&self, source: &str) -> String {
        if source.is_empty() {
            return String::new();
        }

        let safe_start = self.start.min(source.len());
        let safe_end = self.end.min(source.len()).max(safe_start);

        let mut pointer = " ".repeat(safe_start);
        pointer.push('^');
        if safe_end > safe_start + 1 {
            pointer.push_str(&"~".repeat(safe_end - safe_start - 1));
        }

        format!("{}\n{}", source, pointer)
    }
}

/// Diagnostic information attached to a parse error
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Diagnostic {
    /// Source span for highlighting
    pub span: Option<SourceSpan>,
    /// The original input (for error display)
    pub source: Option<String>,
    /// Helpful hint
    pub hint: Option<String>,
}

impl Diagnostic {
    /// Create a new empty diagnostic
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source span
    pub fn with_span(mut self, span: SourceSpan) -> Self {
        self.span = Some(span);
        self
    }

    /// Add the original source
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Add a hint
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Format the diagnostic as a detailed error message
    pub fn format(&self, primary_message: &str) -> String {
        let mut result = String::from(primary_message);

        if let (Some(span), Some(source)) = (&self.span, &self.source) {
            result.push_str("\n\n");
            result.push_str(&span.highlight(source));
        }

        if let Some(hint) = &self.hint {
            result.push_str("\n\nHint: ");
            result.push_str(hint);
        }

        result
    }
}

/// Main error type for ferro-varnorm operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FerroError {
    /// Descriptor does not match the grammar
    #[error("Malformed notation at position {pos}: {msg}")]
    Malformed {
        pos: usize,
        msg: String,
        /// Optional diagnostic with additional context
        diagnostic: Option<Box<Diagnostic>>,
    },

    /// Allele text contains a character outside the accepted alphabet
    #[error("Invalid character '{found}' in allele '{allele}'")]
    InvalidAllele { allele: String, found: char },

    /// Well-formed notation describing an unsupported shape
    #[error("Unsupported variant shape '{notation}': {reason}")]
    UnsupportedShape { notation: String, reason: String },

    /// Symbolic allele missing mandatory information
    #[error("Incomplete structural description for {alternate}: missing {missing}")]
    IncompleteStructural {
        alternate: String,
        missing: &'static str,
    },

    /// Multi-allelic site that cannot be anchored consistently
    #[error("Multi-allelic conflict at {location}: {msg}")]
    MultiallelicConflict { location: String, msg: String },

    /// Reference base needed for anchoring could not be obtained
    #[error("Reference not available for {contig}:{pos}")]
    ReferenceUnavailable { contig: String, pos: u64 },

    /// IO error (for file operations)
    #[error("IO error: {msg}")]
    Io { msg: String },

    /// Configuration error
    #[error("Config error: {msg}")]
    Config { msg: String },
}

impl FerroError {
    /// Create a malformed-notation error without diagnostic
    pub fn malformed(pos: usize, msg: impl Into<String>) -> Self {
        FerroError::Malformed {
            pos,
            msg: msg.into(),
            diagnostic: None,
        }
    }

    /// Create a malformed-notation error pointing into the original input
    pub fn malformed_in(input: &str, pos: usize, msg: impl Into<String>) -> Self {
        let diagnostic = Diagnostic::new()
            .with_span(SourceSpan::point(pos))
            .with_source(input);
        FerroError::Malformed {
            pos,
            msg: msg.into(),
            diagnostic: Some(Box::new(diagnostic)),
        }
    }

    /// Create an unsupported-shape error
    pub fn unsupported(notation: impl Into<String>, reason: impl Into<String>) -> Self {
        FerroError::UnsupportedShape {
            notation: notation.into(),
            reason: reason.into(),
        }
    }

    /// Get the category of this error
    pub fn code(&self) -> ErrorCode {
        match self {
            FerroError::Malformed { .. } => ErrorCode::MalformedNotation,
            FerroError::InvalidAllele { .. } => ErrorCode::InvalidAlleleCharacters,
            FerroError::UnsupportedShape { .. } => ErrorCode::UnsupportedVariantShape,
            FerroError::IncompleteStructural { .. } => ErrorCode::IncompleteStructuralDescription,
            FerroError::MultiallelicConflict { .. } => ErrorCode::AmbiguousMultiallelicConflict,
            FerroError::ReferenceUnavailable { .. } => ErrorCode::ReferenceUnavailable,
            FerroError::Io { .. } => ErrorCode::Io,
            FerroError::Config { .. } => ErrorCode::Config,
        }
    }

    /// Shift the reported position of a parse error by `offset` bytes
    ///
    /// Used when a sub-grammar reports positions relative to a field.
    pub fn offset_by(self, offset: usize) -> Self {
        match self {
            FerroError::Malformed {
                pos,
                msg,
                diagnostic,
            } => FerroError::Malformed {
                pos: pos + offset,
                msg,
                diagnostic: diagnostic.map(|mut d| {
                    if let Some(span) = d.span.as_mut() {
                        span.start += offset;
                        span.end += offset;
                    }
                    d
                }),
            },
            other => other,
        }
    }

    /// Get a formatted error with full diagnostic output
    pub fn detailed_message(&self) -> String {
        let prefix = format!("[{}] ", self.code());
        match self {
            FerroError::Malformed {
                pos,
                msg,
                diagnostic: Some(d),
            } => {
                let primary = format!("Malformed notation at position {}: {}", pos, msg);
                format!("{}{}", prefix, d.format(&primary))
            }
            _ => format!("{}{}", prefix, self),
        }
    }
}

impl From<std::io::Error> for FerroError {
    fn from(err: std::io::Error) -> Self {
        FerroError::Io {
            msg: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for FerroError {
    fn from(err: serde_json::Error) -> Self {
        FerroError::Io {
            msg: format!("JSON: {}", err),
        }
    }
}

impl From<toml::de::Error> for FerroError {
    fn from(err: toml::de::Error) -> Self {
        FerroError::Config {
            msg: err.to_string(),
        }
    }
}
