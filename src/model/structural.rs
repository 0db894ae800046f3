//! Structural detail for symbolic and breakend alternates

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::FerroError;

/// Confidence interval around an exact coordinate
///
/// Written `left<pos<right` in descriptors, with `left <= pos <= right`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    /// Leftmost plausible coordinate (1-based, inclusive)
    pub left: u64,
    /// Rightmost plausible coordinate (1-based, inclusive)
    pub right: u64,
}

impl ConfidenceInterval {
    /// Create an interval, checking that it brackets `pos`
    pub fn around(pos: u64, left: u64, right: u64) -> Result<Self, FerroError> {
        if left > pos || pos > right {
            return Err(FerroError::malformed(
                0,
                format!(
                    "confidence interval {}<{}<{} does not bracket the position",
                    left, pos, right
                ),
            ));
        }
        Ok(Self { left, right })
    }

    /// Offsets relative to `pos`, as written in VCF `CIPOS`/`CIEND`
    ///
    /// Distances beyond the `i64` range saturate.
    pub fn offsets(&self, pos: u64) -> (i64, i64) {
        let left = i64::try_from(pos.saturating_sub(self.left)).unwrap_or(i64::MAX);
        let right = i64::try_from(self.right.saturating_sub(pos)).unwrap_or(i64::MAX);
        (-left, right)
    }

    /// Build from VCF-style offsets relative to `pos`
    pub fn from_offsets(pos: u64, left: i64, right: i64) -> Result<Self, FerroError> {
        let invalid = || {
            FerroError::malformed(
                0,
                format!("invalid confidence offsets {},{} at {}", left, right, pos),
            )
        };
        if left > 0 || right < 0 {
            return Err(invalid());
        }
        let l = pos
            .checked_sub(left.unsigned_abs())
            .filter(|l| *l >= 1)
            .ok_or_else(invalid)?;
        let r = pos.checked_add(right.unsigned_abs()).ok_or_else(invalid)?;
        Ok(Self { left: l, right: r })
    }
}

/// Junction orientation of a breakend
///
/// Named after which end of the local segment (anchored at `t`) is joined to
/// which end of the mate segment (at `p`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BreakendOrientation {
    /// `t[p[`: sequence after `t` continues at `p` and onward; both pieces
    /// run downstream of the junction
    EndStart,
    /// `t]p]`: sequence after `t` continues with the reverse complement of the
    /// piece ending at `p`
    EndEnd,
    /// `]p]t`: the piece ending at `p` is joined before `t`
    StartEnd,
    /// `[p[t`: the reverse complement of the piece starting at `p` is joined
    /// before `t`
    StartStart,
}

impl BreakendOrientation {
    /// Two-letter code (local end, mate end)
    pub fn code(&self) -> &'static str {
        match self {
            BreakendOrientation::EndStart => "ES",
            BreakendOrientation::EndEnd => "EE",
            BreakendOrientation::StartEnd => "SE",
            BreakendOrientation::StartStart => "SS",
        }
    }

    /// Orientation from bracket character and anchor placement
    pub fn from_bracket(bracket: char, anchor_before_bracket: bool) -> Option<Self> {
        match (bracket, anchor_before_bracket) {
            ('[', true) => Some(BreakendOrientation::EndStart),
            (']', true) => Some(BreakendOrientation::EndEnd),
            (']', false) => Some(BreakendOrientation::StartEnd),
            ('[', false) => Some(BreakendOrientation::StartStart),
            _ => None,
        }
    }

    /// Bracket character used to write this orientation
    pub fn bracket(&self) -> char {
        match self {
            BreakendOrientation::EndStart | BreakendOrientation::StartStart => '[',
            BreakendOrientation::EndEnd | BreakendOrientation::StartEnd => ']',
        }
    }

    /// True when the anchor base is written before the bracketed mate
    pub fn anchor_first(&self) -> bool {
        matches!(
            self,
            BreakendOrientation::EndStart | BreakendOrientation::EndEnd
        )
    }
}

impl fmt::Display for BreakendOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Mate locus of a paired breakend
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BreakendMate {
    /// Mate chromosome
    pub chromosome: String,
    /// Mate position (1-based)
    pub position: u64,
    /// Mate chromosome was written in `<ctg>` form (assembly contig)
    #[serde(default)]
    pub assembly_contig: bool,
}

/// One end of a rearrangement junction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Breakend {
    /// Mate locus; `None` for a single breakend (`t.` / `.t`)
    pub mate: Option<BreakendMate>,
    /// Junction orientation; `None` for a single breakend
    pub orientation: Option<BreakendOrientation>,
    /// Bases between the anchor base and the bracket
    pub inserted_sequence: String,
}

/// Structural detail carried by symbolic and breakend keys
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructuralVariation {
    /// Copy number from `<CNk>` or an explicit override
    pub copy_number: Option<u32>,
    /// Confidence interval around the start coordinate
    pub ci_start: Option<ConfidenceInterval>,
    /// Confidence interval around the end coordinate
    pub ci_end: Option<ConfidenceInterval>,
    /// Breakend detail
    pub breakend: Option<Breakend>,
    /// Known leading fragment of an incompletely sequenced insertion
    pub left_ins_seq: Option<String>,
    /// Known trailing fragment of an incompletely sequenced insertion
    pub right_ins_seq: Option<String>,
}

impl StructuralVariation {
    /// Create empty structural detail
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the insertion fragments are present
    pub fn has_insertion_fragments(&self) -> bool {
        self.left_ins_seq.is_some() || self.right_ins_seq.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_interval_around() {
        let ci = ConfidenceInterval::around(100, 90, 110).unwrap();
        assert_eq!(ci.offsets(100), (-10, 10));
        assert!(ConfidenceInterval::around(100, 101, 110).is_err());
        assert!(ConfidenceInterval::around(100, 90, 99).is_err());
    }

    #[test]
    fn test_confidence_interval_from_offsets() {
        let ci = ConfidenceInterval::from_offsets(100, -5, 7).unwrap();
        assert_eq!(ci, ConfidenceInterval { left: 95, right: 107 });
        assert!(ConfidenceInterval::from_offsets(3, -5, 0).is_err());
        assert!(ConfidenceInterval::from_offsets(100, 5, 7).is_err());
    }

    #[test]
    fn test_confidence_offsets_at_range_edges() {
        assert!(ConfidenceInterval::from_offsets(1000, 0, i64::MAX).is_ok());
        assert!(ConfidenceInterval::from_offsets(u64::MAX, 0, 1).is_err());
        assert!(ConfidenceInterval::from_offsets(1000, i64::MIN, 0).is_err());

        let wide = ConfidenceInterval { left: 1, right: u64::MAX };
        assert_eq!(wide.offsets(1), (0, i64::MAX));
    }

    #[test]
    fn test_orientation_from_bracket() {
        assert_eq!(
            BreakendOrientation::from_bracket('[', true),
            Some(BreakendOrientation::EndStart)
        );
        assert_eq!(
            BreakendOrientation::from_bracket(']', true),
            Some(BreakendOrientation::EndEnd)
        );
        assert_eq!(
            BreakendOrientation::from_bracket(']', false),
            Some(BreakendOrientation::StartEnd)
        );
        assert_eq!(
            BreakendOrientation::from_bracket('[', false),
            Some(BreakendOrientation::StartStart)
        );
        assert_eq!(BreakendOrientation::from_bracket('(', true), None);
    }

    #[test]
    fn test_orientation_bracket_round_trip() {
        for o in [
            BreakendOrientation::EndStart,
            BreakendOrientation::EndEnd,
            BreakendOrientation::StartEnd,
            BreakendOrientation::StartStart,
        ] {
            assert_eq!(
                BreakendOrientation::from_bracket(o.bracket(), o.anchor_first()),
                Some(o)
            );
        }
    }

    #[test]
    fn test_orientation_codes() {
        assert_eq!(BreakendOrientation::EndStart.to_string(), "ES");
        assert_eq!(BreakendOrientation::StartStart.code(), "SS");
    }
}
