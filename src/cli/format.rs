//! Output formatting utilities for CLI operations

use serde::Serialize;
use serde_json::json;
use std::io::{self, Write};
use std::str::FromStr;

use crate::batch::ErrorTally;
use crate::error::FerroError;

/// Output format for CLI results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Plain text format (default)
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

impl FromStr for OutputFormat {
    type Err = FerroError;

    /// Parse an output format from a string
    ///
    /// # Examples
    ///
    /// ```
    /// use ferro_varnorm::cli::OutputFormat;
    /// use std::str::FromStr;
    ///
    /// assert_eq!(OutputFormat::from_str("json").unwrap(), OutputFormat::Json);
    /// assert_eq!(OutputFormat::from_str("TEXT").unwrap(), OutputFormat::Text);
    /// assert!(OutputFormat::from_str("vcf").is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "text" => Ok(OutputFormat::Text),
            other => Err(FerroError::Config {
                msg: format!("unknown output format '{}'", other),
            }),
        }
    }
}

/// Write a successful result to the output
///
/// In text mode `text` is printed (with `input ->` when it differs from the
/// input); in JSON mode `value` is embedded under `output`.
///
/// # Examples
///
/// ```
/// use ferro_varnorm::cli::{output_result, OutputFormat};
/// use std::io::Cursor;
///
/// let mut buffer = Cursor::new(Vec::new());
/// output_result(&mut buffer, "1:1000:AT:A", "1:1001:T:-", &"1:1001:T:-", OutputFormat::Text).unwrap();
/// let result = String::from_utf8(buffer.into_inner()).unwrap();
/// assert_eq!(result, "1:1000:AT:A -> 1:1001:T:-\n");
/// ```
pub fn output_result<W: Write + ?Sized, T: Serialize + ?Sized>(
    writer: &mut W,
    input: &str,
    text: &str,
    value: &T,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            let line = json!({"input": input, "output": value, "status": "ok"});
            writeln!(writer, "{}", line)
        }
        OutputFormat::Text => {
            if input == text {
                writeln!(writer, "{}", text)
            } else {
                writeln!(writer, "{} -> {}", input, text)
            }
        }
    }
}

/// Write an error to the output
///
/// # Examples
///
/// ```
/// use ferro_varnorm::cli::{output_error, OutputFormat};
/// use ferro_varnorm::FerroError;
/// use std::io::Cursor;
///
/// let mut buffer = Cursor::new(Vec::new());
/// let error = FerroError::malformed(0, "test error");
/// output_error(&mut buffer, "input", &error, OutputFormat::Text).unwrap();
/// let result = String::from_utf8(buffer.into_inner()).unwrap();
/// assert!(result.starts_with("ERROR[E1001]: input"));
/// ```
pub fn output_error<W: Write + ?Sized>(
    writer: &mut W,
    input: &str,
    error: &FerroError,
    format: OutputFormat,
) -> io::Result<()> {
    output_error_with_context(writer, input, error, format, None)
}

/// Write an error to the output with optional line number context
pub fn output_error_with_context<W: Write + ?Sized>(
    writer: &mut W,
    input: &str,
    error: &FerroError,
    format: OutputFormat,
    line_number: Option<usize>,
) -> io::Result<()> {
    let code = error.code();
    match format {
        OutputFormat::Json => {
            let mut line = json!({
                "input": input,
                "code": code.as_str(),
                "category": code.name(),
                "error": error.to_string(),
                "status": "error",
            });
            if let Some(n) = line_number {
                line["line"] = json!(n);
            }
            writeln!(writer, "{}", line)
        }
        OutputFormat::Text => match line_number {
            Some(n) => writeln!(
                writer,
                "ERROR[{}] (line {}): {} - {}",
                code.as_str(),
                n,
                input,
                error
            ),
            None => writeln!(writer, "ERROR[{}]: {} - {}", code.as_str(), input, error),
        },
    }
}

/// Write the per-category rejection counts of a run
///
/// Nothing is written for an empty tally in text mode.
pub fn output_tally<W: Write + ?Sized>(
    writer: &mut W,
    total: usize,
    tally: &ErrorTally,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            let rejected: serde_json::Map<String, serde_json::Value> = tally
                .iter()
                .map(|(code, count)| (code.name().to_string(), json!(count)))
                .collect();
            let line = json!({
                "total": total,
                "accepted": total - tally.total(),
                "rejected": rejected,
            });
            writeln!(writer, "{}", line)
        }
        OutputFormat::Text => {
            if tally.is_empty() {
                return Ok(());
            }
            writeln!(writer, "{} of {} record(s) rejected:", tally.total(), total)?;
            for (code, count) in tally.iter() {
                writeln!(writer, "  {} {:<36} {}", code.as_str(), code.name(), count)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use std::io::Cursor;

    fn render<F: FnOnce(&mut Cursor<Vec<u8>>) -> io::Result<()>>(f: F) -> String {
        let mut buffer = Cursor::new(Vec::new());
        f(&mut buffer).unwrap();
        String::from_utf8(buffer.into_inner()).unwrap()
    }

    #[test]
    fn test_output_result_text_unchanged() {
        let out = render(|w| output_result(w, "1:5:A:C", "1:5:A:C", "1:5:A:C", OutputFormat::Text));
        assert_eq!(out, "1:5:A:C\n");
    }

    #[test]
    fn test_output_result_json() {
        let out = render(|w| {
            output_result(w, "in\"put", "x", &vec!["a", "b"], OutputFormat::Json)
        });
        let value: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(value["input"], "in\"put");
        assert_eq!(value["output"][1], "b");
        assert_eq!(value["status"], "ok");
    }

    #[test]
    fn test_output_error_json_with_line() {
        let error = FerroError::InvalidAllele {
            allele: "AZ".to_string(),
            found: 'Z',
        };
        let out = render(|w| {
            output_error_with_context(w, "1:5:A:AZ", &error, OutputFormat::Json, Some(7))
        });
        let value: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(value["code"], "E1002");
        assert_eq!(value["line"], 7);
        assert_eq!(value["status"], "error");
    }

    #[test]
    fn test_output_error_text_with_line() {
        let error = FerroError::malformed(3, "bad");
        let out = render(|w| {
            output_error_with_context(w, "1:x", &error, OutputFormat::Text, Some(42))
        });
        assert!(out.contains("line 42"));
        assert!(out.starts_with("ERROR[E1001]"));
    }

    #[test]
    fn test_output_tally() {
        let mut tally = ErrorTally::new();
        tally.record(&FerroError::malformed(0, "x"));
        tally.record(&FerroError::malformed(1, "y"));
        tally.record(&FerroError::unsupported("c.1del", "no locus"));

        let text = render(|w| output_tally(w, 10, &tally, OutputFormat::Text));
        assert!(text.starts_with("3 of 10 record(s) rejected:"));
        assert!(text.contains("E1001"));

        let json = render(|w| output_tally(w, 10, &tally, OutputFormat::Json));
        let value: serde_json::Value = serde_json::from_str(json.trim()).unwrap();
        assert_eq!(value["accepted"], 7);
        assert_eq!(value["rejected"][ErrorCode::MalformedNotation.name()], 2);

        let empty = render(|w| output_tally(w, 3, &ErrorTally::new(), OutputFormat::Text));
        assert!(empty.is_empty());
    }
}
