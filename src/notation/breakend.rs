//! Breakend notation
//!
//! ```text
//! t[p[    EndStart    piece after t continues at p, onward
//! t]p]    EndEnd      piece after t continues with the reverse of the piece ending at p
//! ]p]t    StartEnd    piece ending at p is joined before t
//! [p[t    StartStart  reverse of the piece starting at p is joined before t
//! t.  .t  single breakend, no mate
//! ```
//!
//! `t` is the anchor base optionally extended by inserted bases; `p` is
//! `chrom:pos`, where an assembly contig is written `<ctg>:pos`.

use nom::{
    branch::alt,
    bytes::complete::{take_till1, take_while1},
    character::complete::char,
    combinator::{eof, map},
    sequence::{delimited, terminated},
    IResult, Parser,
};

use crate::error::FerroError;
use crate::model::allele::{self, Alphabet};
use crate::model::{Breakend, BreakendMate, BreakendOrientation};

use super::coordinate::parse_position;

/// Bracketed mate with the bracket character used
type BracketedMate = (char, BreakendMate);

/// Parse `chrom:pos` or `<ctg>:pos`
fn mate_locus(input: &str) -> IResult<&str, BreakendMate> {
    let (input, (chromosome, assembly_contig)) = alt((
        map(
            delimited(char('<'), take_till1(|c: char| c == '>'), char('>')),
            |s: &str| (s, true),
        ),
        map(take_till1(|c: char| c == ':' || c == '[' || c == ']'), |s: &str| {
            (s, false)
        }),
    ))
    .parse(input)?;
    let (input, _) = char(':').parse(input)?;
    let (input, position) = parse_position(input)?;
    Ok((
        input,
        BreakendMate {
            chromosome: chromosome.to_string(),
            position,
            assembly_contig,
        },
    ))
}

fn bracketed_mate(input: &str) -> IResult<&str, BracketedMate> {
    alt((
        map(delimited(char('['), mate_locus, char('[')), |m| ('[', m)),
        map(delimited(char(']'), mate_locus, char(']')), |m| (']', m)),
    ))
    .parse(input)
}

fn sequence(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphabetic()).parse(input)
}

/// Raw shape of a breakend before the anchor sequence is validated
enum Shape<'a> {
    Paired {
        sequence: &'a str,
        bracket: char,
        mate: BreakendMate,
        anchor_first: bool,
    },
    Single {
        sequence: &'a str,
        anchor_first: bool,
    },
}

fn shape(input: &str) -> IResult<&str, Shape<'_>> {
    alt((
        map(
            terminated((sequence, bracketed_mate), eof),
            |(sequence, (bracket, mate))| Shape::Paired {
                sequence,
                bracket,
                mate,
                anchor_first: true,
            },
        ),
        map(
            terminated((bracketed_mate, sequence), eof),
            |((bracket, mate), sequence)| Shape::Paired {
                sequence,
                bracket,
                mate,
                anchor_first: false,
            },
        ),
        map(terminated((sequence, char('.')), eof), |(sequence, _)| {
            Shape::Single {
                sequence,
                anchor_first: true,
            }
        }),
        map(terminated((char('.'), sequence), eof), |(_, sequence)| {
            Shape::Single {
                sequence,
                anchor_first: false,
            }
        }),
    ))
    .parse(input)
}

/// Split an anchor sequence into (anchor base, inserted bases)
fn split_anchor(sequence: &str, anchor_first: bool) -> (&str, &str) {
    if anchor_first {
        sequence.split_at(1)
    } else {
        let (inserted, anchor) = sequence.split_at(sequence.len() - 1);
        (anchor, inserted)
    }
}

fn parse_shape(alternate: &str) -> Result<Shape<'_>, FerroError> {
    match shape(alternate) {
        Ok((_, shape)) => Ok(shape),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(FerroError::malformed_in(
            alternate,
            alternate.len() - e.input.len(),
            format!("invalid breakend '{}'", alternate),
        )),
        Err(nom::Err::Incomplete(_)) => Err(FerroError::malformed(
            alternate.len(),
            "incomplete breakend",
        )),
    }
}

/// Parse a breakend alternate
///
/// The anchor base plus any inserted bases must be over `A`, `C`, `G`, `T`,
/// `N` (case-insensitive).
pub fn parse_breakend(alternate: &str) -> Result<Breakend, FerroError> {
    let shape = parse_shape(alternate)?;
    let (sequence, anchor_first) = match &shape {
        Shape::Paired {
            sequence,
            anchor_first,
            ..
        }
        | Shape::Single {
            sequence,
            anchor_first,
        } => (*sequence, *anchor_first),
    };
    let sequence = allele::validate_bases(sequence, Alphabet::AcgtN)?;
    let (_, inserted) = split_anchor(&sequence, anchor_first);
    let inserted_sequence = inserted.to_string();

    Ok(match shape {
        Shape::Paired {
            bracket,
            mate,
            anchor_first,
            ..
        } => Breakend {
            mate: Some(mate),
            orientation: BreakendOrientation::from_bracket(bracket, anchor_first),
            inserted_sequence,
        },
        Shape::Single { .. } => Breakend {
            mate: None,
            orientation: None,
            inserted_sequence,
        },
    })
}

/// Reference base a breakend is anchored on
///
/// Used when a descriptor gives only the breakend and omits the reference.
pub fn anchor_base(alternate: &str) -> Result<String, FerroError> {
    let shape = parse_shape(alternate)?;
    let (sequence, anchor_first) = match shape {
        Shape::Paired {
            sequence,
            anchor_first,
            ..
        }
        | Shape::Single {
            sequence,
            anchor_first,
        } => (sequence, anchor_first),
    };
    let sequence = allele::validate_bases(sequence, Alphabet::AcgtN)?;
    let (anchor, _) = split_anchor(&sequence, anchor_first);
    Ok(anchor.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case("A[2:321681[", BreakendOrientation::EndStart, "2", 321681, "")]
    #[case("G]17:198982]", BreakendOrientation::EndEnd, "17", 198982, "")]
    #[case("]13:123456]T", BreakendOrientation::StartEnd, "13", 123456, "")]
    #[case("[17:198983[A", BreakendOrientation::StartStart, "17", 198983, "")]
    #[case("CAGTNNNNNCA[2:321682[", BreakendOrientation::EndStart, "2", 321682, "AGTNNNNNCA")]
    #[case("]13:123456]AGTNNNNNCAT", BreakendOrientation::StartEnd, "13", 123456, "AGTNNNNNCA")]
    fn test_parse_paired(
        #[case] alt: &str,
        #[case] orientation: BreakendOrientation,
        #[case] chrom: &str,
        #[case] pos: u64,
        #[case] inserted: &str,
    ) {
        let bnd = parse_breakend(alt).unwrap();
        assert_eq!(bnd.orientation, Some(orientation));
        let mate = bnd.mate.unwrap();
        assert_eq!(mate.chromosome, chrom);
        assert_eq!(mate.position, pos);
        assert!(!mate.assembly_contig);
        assert_eq!(bnd.inserted_sequence, inserted);
    }

    #[test]
    fn test_assembly_contig_mate() {
        let bnd = parse_breakend("C[<ctg1>:7[").unwrap();
        let mate = bnd.mate.unwrap();
        assert_eq!(mate.chromosome, "ctg1");
        assert!(mate.assembly_contig);
    }

    #[test]
    fn test_single_breakends() {
        let bnd = parse_breakend("G.").unwrap();
        assert!(bnd.mate.is_none());
        assert!(bnd.orientation.is_none());
        assert_eq!(bnd.inserted_sequence, "");

        let bnd = parse_breakend(".TGCA").unwrap();
        assert_eq!(bnd.inserted_sequence, "TGC");
    }

    #[test]
    fn test_anchor_base() {
        assert_eq!(anchor_base("a[2:321681[").unwrap(), "A");
        assert_eq!(anchor_base("]13:123456]CT").unwrap(), "T");
        assert_eq!(anchor_base("GT.").unwrap(), "G");
    }

    #[rstest]
    #[case("A[2:321681]")]
    #[case("A[2:321681")]
    #[case("A[2:x[")]
    #[case("[2:5[")]
    #[case("A[2:5[T")]
    #[case("A[:5[")]
    fn test_malformed(#[case] alt: &str) {
        assert_eq!(
            parse_breakend(alt).unwrap_err().code(),
            ErrorCode::MalformedNotation
        );
    }

    #[test]
    fn test_invalid_anchor_bases() {
        assert_eq!(
            parse_breakend("R[2:5[").unwrap_err().code(),
            ErrorCode::InvalidAlleleCharacters
        );
    }
}
