//! Shared-base trimming
//!
//! # Coordinate System
//!
//! | Parameter | Basis | Notes |
//! |-----------|-------|-------|
//! | `start` | 1-based | Position of the first reference base |
//! | `TrimResult::start` | 1-based | Position of the first remaining reference base |
//!
//! Trailing bases are stripped before leading ones, so an ambiguous indel in
//! a repeat keeps its leftmost placement (`AT -> A` at 1000 becomes `T -> -`
//! at 1001, not `A -> -` at 1000).

/// Result of a trim operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimResult {
    /// New start position (1-based)
    pub start: u64,
    /// Remaining reference bases (possibly empty)
    pub reference: String,
    /// Remaining alternate bases (possibly empty)
    pub alternate: String,
    /// Number of shared leading bases removed
    pub leading: usize,
    /// Number of shared trailing bases removed
    pub trailing: usize,
}

impl TrimResult {
    /// Inclusive end of the trimmed reference (`start - 1` when empty)
    pub fn end(&self) -> u64 {
        self.start
            .saturating_add(self.reference.len() as u64)
            .saturating_sub(1)
    }

    /// Whether anything was removed
    pub fn trimmed(&self) -> bool {
        self.leading > 0 || self.trailing > 0
    }
}

/// Strip shared trailing bases, then shared leading bases
///
/// A fully consumed allele becomes the empty string. Identical alleles are
/// reduced to nothing; callers pass those through as reference calls instead.
pub fn trim(reference: &str, alternate: &str, start: u64) -> TrimResult {
    let r = reference.as_bytes();
    let a = alternate.as_bytes();

    let trailing = r
        .iter()
        .rev()
        .zip(a.iter().rev())
        .take_while(|(x, y)| x == y)
        .count();
    let r = &r[..r.len() - trailing];
    let a = &a[..a.len() - trailing];

    let leading = r.iter().zip(a.iter()).take_while(|(x, y)| x == y).count();

    TrimResult {
        start: start.saturating_add(leading as u64),
        reference: reference[leading..reference.len() - trailing].to_string(),
        alternate: alternate[leading..alternate.len() - trailing].to_string(),
        leading,
        trailing,
    }
}
