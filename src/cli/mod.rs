//! CLI utilities for ferro-varnorm
//!
//! This module provides testable functions used by the CLI binary.
//! By extracting pure functions and I/O-abstracted functions to the library,
//! we enable comprehensive unit testing without requiring end-to-end CLI tests.

pub mod format;

use crate::error::FerroError;
use crate::model::{SecondaryAllele, VariantKey};
use crate::normalize::Normalizer;
use crate::notation::parse_normalized;

// Re-export commonly used items
pub use format::{
    output_error, output_error_with_context, output_result, output_tally, OutputFormat,
};

/// UTF-8 BOM (Byte Order Mark) constant
const UTF8_BOM: &str = "\u{feff}";

/// Separator between the descriptors of one multi-allelic site
pub const SITE_SEPARATOR: char = ',';

/// Strip UTF-8 BOM from the beginning of a string if present.
///
/// This is common when files are exported from Windows applications or Excel.
///
/// # Examples
///
/// ```
/// use ferro_varnorm::cli::strip_bom;
///
/// assert_eq!(strip_bom("\u{feff}1:1000:A:C"), "1:1000:A:C");
/// assert_eq!(strip_bom("1:1000:A:C"), "1:1000:A:C");
/// ```
pub fn strip_bom(s: &str) -> &str {
    s.strip_prefix(UTF8_BOM).unwrap_or(s)
}

/// Strip inline comments from a descriptor line.
///
/// Comments start with `#` and extend to the end of the line.
/// Leading/trailing whitespace is also trimmed.
///
/// # Examples
///
/// ```
/// use ferro_varnorm::cli::strip_inline_comment;
///
/// assert_eq!(strip_inline_comment("1:1000:A:C  # my note"), "1:1000:A:C");
/// assert_eq!(strip_inline_comment("# full line comment"), "");
/// ```
pub fn strip_inline_comment(s: &str) -> &str {
    match s.find('#') {
        Some(pos) => s[..pos].trim(),
        None => s.trim(),
    }
}

/// Process an input line: trim whitespace, strip BOM (for first line), and strip inline comments.
///
/// Returns None if the line is empty or a comment-only line.
///
/// # Examples
///
/// ```
/// use ferro_varnorm::cli::process_input_line;
///
/// assert_eq!(process_input_line("1:1000:A:C", false), Some("1:1000:A:C"));
/// assert_eq!(process_input_line("\u{feff}1:1000:A:C # note", true), Some("1:1000:A:C"));
/// assert_eq!(process_input_line("", false), None);
/// assert_eq!(process_input_line("# comment", false), None);
/// ```
pub fn process_input_line(line: &str, is_first_line: bool) -> Option<&str> {
    let line = line.trim();
    let line = if is_first_line { strip_bom(line) } else { line };
    let line = strip_inline_comment(line);

    if line.is_empty() {
        None
    } else {
        Some(line)
    }
}

/// Parse one site line: comma-separated descriptors, primary first.
///
/// Every descriptor is normalized; the rest become secondary alleles.
///
/// # Examples
///
/// ```
/// use ferro_varnorm::cli::parse_site;
/// use ferro_varnorm::Normalizer;
///
/// let (primary, secondaries) = parse_site("1:1000:A:C, 1:1000:AT:A", &Normalizer::new()).unwrap();
/// assert_eq!(primary.to_string(), "1:1000:A:C");
/// assert_eq!(secondaries[0].to_string(), "1:1001:T:-");
/// ```
pub fn parse_site(
    line: &str,
    normalizer: &Normalizer,
) -> Result<(VariantKey, Vec<SecondaryAllele>), FerroError> {
    let mut offset = 0;
    let mut keys = Vec::new();
    for part in line.split(SITE_SEPARATOR) {
        let leading = part.len() - part.trim_start().len();
        let key =
            parse_normalized(part, normalizer).map_err(|e| e.offset_by(offset + leading))?;
        keys.push(key);
        offset += part.len() + SITE_SEPARATOR.len_utf8();
    }
    let mut keys = keys.into_iter();
    let primary = keys
        .next()
        .ok_or_else(|| FerroError::malformed(0, "empty site"))?;
    let secondaries = keys.map(|k| SecondaryAllele::from_key(&k)).collect();
    Ok((primary, secondaries))
}
