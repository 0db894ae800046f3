//! Coordinate grammar shared by the VCF-style descriptors
//!
//! ```text
//! coordinate := pos | pos '<' pos '<' pos
//! span       := coordinate ('-' coordinate)?
//! ```
//!
//! In the decorated form `a<b<c` the middle value is the exact coordinate and
//! `a`, `c` bound its confidence interval.

use nom::{
    character::complete::{char, digit1},
    combinator::opt,
    sequence::preceded,
    IResult, Parser,
};

use crate::model::ConfidenceInterval;

/// One coordinate with optional confidence bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coordinate {
    pub position: u64,
    pub ci: Option<ConfidenceInterval>,
}

/// `start` or `start-end`, each possibly decorated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateSpan {
    pub start: Coordinate,
    pub end: Option<Coordinate>,
}

impl CoordinateSpan {
    /// True when any confidence decoration was written
    pub fn has_confidence_intervals(&self) -> bool {
        self.start.ci.is_some() || self.end.map(|e| e.ci.is_some()).unwrap_or(false)
    }
}

/// Parse a 1-based position (unsigned integer >= 1)
#[inline]
pub fn parse_position(input: &str) -> IResult<&str, u64> {
    let (remaining, s) = digit1.parse(input)?;
    // Use checked parsing to detect overflow
    let value: u64 = s.parse().map_err(|_| {
        nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Digit))
    })?;
    if value == 0 {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Verify,
        )));
    }
    Ok((remaining, value))
}

/// Parse `pos` or `left<pos<right`
pub fn parse_coordinate(input: &str) -> IResult<&str, Coordinate> {
    let (remaining, first) = parse_position(input)?;
    let (remaining, decorated) =
        opt((preceded(char('<'), parse_position), preceded(char('<'), parse_position)))
            .parse(remaining)?;

    match decorated {
        None => Ok((
            remaining,
            Coordinate {
                position: first,
                ci: None,
            },
        )),
        Some((position, right)) => {
            if first > position || position > right {
                return Err(nom::Err::Failure(nom::error::Error::new(
                    input,
                    nom::error::ErrorKind::Verify,
                )));
            }
            Ok((
                remaining,
                Coordinate {
                    position,
                    ci: Some(ConfidenceInterval { left: first, right }),
                },
            ))
        }
    }
}

/// Parse `coordinate` or `coordinate-coordinate`
pub fn parse_span(input: &str) -> IResult<&str, CoordinateSpan> {
    let (remaining, start) = parse_coordinate(input)?;
    let (remaining, end) = opt(preceded(char('-'), parse_coordinate)).parse(remaining)?;
    Ok((remaining, CoordinateSpan { start, end }))
}
