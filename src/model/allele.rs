//! Allele text helpers
//!
//! Canonical alleles are upper-case strings. An empty string is a real,
//! zero-length allele; the display placeholders `-` and `.` only exist at the
//! notation boundary.

use crate::error::FerroError;

/// Placeholder reference used when a symbolic descriptor omits the reference
pub const UNKNOWN_BASE: &str = "N";

/// Display form of an empty allele
pub const EMPTY_ALLELE_DISPLAY: &str = "-";

/// Alternates that stand for "any other allele" and are never discarded
pub const UNIVERSAL_PLACEHOLDERS: [&str; 3] = ["<*>", "<NON_REF>", "*"];

/// Accepted allele alphabet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alphabet {
    /// `A`, `C`, `G`, `T` only
    Acgt,
    /// `A`, `C`, `G`, `T` and the unknown base `N`
    AcgtN,
}

impl Alphabet {
    #[inline]
    fn accepts(&self, b: u8) -> bool {
        match self {
            Alphabet::Acgt => matches!(b, b'A' | b'C' | b'G' | b'T'),
            Alphabet::AcgtN => matches!(b, b'A' | b'C' | b'G' | b'T' | b'N'),
        }
    }
}

/// Validate allele text against an alphabet, returning it upper-cased
///
/// Lower-case input is accepted and normalized.
pub fn validate_bases(allele: &str, alphabet: Alphabet) -> Result<String, FerroError> {
    let upper = allele.to_ascii_uppercase();
    if let Some(bad) = upper.bytes().position(|b| !alphabet.accepts(b)) {
        let found = allele[bad..].chars().next().unwrap_or('?');
        return Err(FerroError::InvalidAllele {
            allele: allele.to_string(),
            found,
        });
    }
    Ok(upper)
}

/// True for `<...>` tokens
pub fn is_symbolic(allele: &str) -> bool {
    allele.len() >= 3 && allele.starts_with('<') && allele.ends_with('>')
}

/// True for bracketed mate notation and single breakends (`A.`, `.A`)
pub fn is_breakend(allele: &str) -> bool {
    if allele.contains('[') || allele.contains(']') {
        return true;
    }
    allele.len() > 1 && (allele.starts_with('.') || allele.ends_with('.'))
}

/// True for alternates carried by structural detail rather than bases
pub fn is_structural(allele: &str) -> bool {
    is_symbolic(allele) || is_breakend(allele)
}

/// True for `<*>`, `<NON_REF>` and `*`
pub fn is_placeholder(allele: &str) -> bool {
    UNIVERSAL_PLACEHOLDERS.contains(&allele)
}

/// Render an allele for display, using `-` for the empty allele
pub fn display(allele: &str) -> &str {
    if allele.is_empty() {
        EMPTY_ALLELE_DISPLAY
    } else {
        allele
    }
}

/// Translate display placeholders (`-`, `.`) to the empty allele
pub fn from_display(token: &str) -> &str {
    match token {
        "-" | "." => "",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_bases_uppercases() {
        assert_eq!(validate_bases("acgt", Alphabet::Acgt).unwrap(), "ACGT");
        assert_eq!(validate_bases("", Alphabet::Acgt).unwrap(), "");
    }

    #[test]
    fn test_validate_bases_rejects_n_in_strict_alphabet() {
        let err = validate_bases("ACNT", Alphabet::Acgt).unwrap_err();
        assert_eq!(
            err,
            FerroError::InvalidAllele {
                allele: "ACNT".to_string(),
                found: 'N',
            }
        );
        assert_eq!(validate_bases("ACNT", Alphabet::AcgtN).unwrap(), "ACNT");
    }

    #[test]
    fn test_validate_bases_rejects_iupac() {
        assert!(validate_bases("ARG", Alphabet::AcgtN).is_err());
        assert!(validate_bases("A-G", Alphabet::AcgtN).is_err());
    }

    #[test]
    fn test_symbolic_and_breakend() {
        assert!(is_symbolic("<DEL>"));
        assert!(is_symbolic("<INS:ME:ALU>"));
        assert!(!is_symbolic("<>"));
        assert!(!is_symbolic("A"));
        assert!(is_breakend("A[2:321681["));
        assert!(is_breakend("]2:5]T"));
        assert!(is_breakend("A."));
        assert!(is_breakend(".A"));
        assert!(!is_breakend("."));
        assert!(is_structural("<CN3>"));
        assert!(!is_structural("ACGT"));
    }

    #[test]
    fn test_placeholders() {
        assert!(is_placeholder("<*>"));
        assert!(is_placeholder("<NON_REF>"));
        assert!(is_placeholder("*"));
        assert!(!is_placeholder("<DEL>"));
    }

    #[test]
    fn test_display_round_trip() {
        assert_eq!(display(""), "-");
        assert_eq!(display("A"), "A");
        assert_eq!(from_display("-"), "");
        assert_eq!(from_display("."), "");
        assert_eq!(from_display("AC"), "AC");
    }
}
