//! Reference provider trait
//!
//! Defines the lookup contract for reference bases. The sequence store itself
//! lives outside this crate; only anchor-base synthesis during conversion
//! consults it.

use std::sync::Arc;

use crate::error::FerroError;

/// Trait for providing reference sequence data
///
/// Implementations need only `&self`, so one provider can be shared read-only
/// across threads behind `&P`, `Arc<P>` or a boxed trait object.
pub trait ReferenceProvider {
    /// Get a sequence region
    ///
    /// # Arguments
    ///
    /// * `contig` - Chromosome/contig name (e.g., "chr1", "NC_000001.11")
    /// * `start` - 0-based start position
    /// * `end` - 0-based end position (exclusive)
    fn get_sequence(&self, contig: &str, start: u64, end: u64) -> Result<String, FerroError>;

    /// Get the base at a 1-based position
    fn base(&self, contig: &str, position: u64) -> Result<char, FerroError> {
        if position == 0 {
            return Err(FerroError::ReferenceUnavailable {
                contig: contig.to_string(),
                pos: position,
            });
        }
        let seq = self.get_sequence(contig, position - 1, position)?;
        seq.chars()
            .next()
            .map(|c| c.to_ascii_uppercase())
            .ok_or_else(|| FerroError::ReferenceUnavailable {
                contig: contig.to_string(),
                pos: position,
            })
    }

    /// Check if the provider knows a contig
    fn has_contig(&self, contig: &str) -> bool {
        self.get_sequence(contig, 0, 1).is_ok()
    }
}

impl<P: ReferenceProvider + ?Sized> ReferenceProvider for &P {
    fn get_sequence(&self, contig: &str, start: u64, end: u64) -> Result<String, FerroError> {
        (**self).get_sequence(contig, start, end)
    }

    fn base(&self, contig: &str, position: u64) -> Result<char, FerroError> {
        (**self).base(contig, position)
    }

    fn has_contig(&self, contig: &str) -> bool {
        (**self).has_contig(contig)
    }
}

impl<P: ReferenceProvider + ?Sized> ReferenceProvider for Arc<P> {
    fn get_sequence(&self, contig: &str, start: u64, end: u64) -> Result<String, FerroError> {
        (**self).get_sequence(contig, start, end)
    }

    fn base(&self, contig: &str, position: u64) -> Result<char, FerroError> {
        (**self).base(contig, position)
    }

    fn has_contig(&self, contig: &str) -> bool {
        (**self).has_contig(contig)
    }
}

/// Blanket implementation for boxed trait objects
impl ReferenceProvider for Box<dyn ReferenceProvider + Send + Sync> {
    fn get_sequence(&self, contig: &str, start: u64, end: u64) -> Result<String, FerroError> {
        (**self).get_sequence(contig, start, end)
    }

    fn base(&self, contig: &str, position: u64) -> Result<char, FerroError> {
        (**self).base(contig, position)
    }

    fn has_contig(&self, contig: &str) -> bool {
        (**self).has_contig(contig)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    impl ReferenceProvider for Fixed {
        fn get_sequence(&self, contig: &str, start: u64, end: u64) -> Result<String, FerroError> {
            let seq = "acgtacgt";
            if contig != "1" || end as usize > seq.len() {
                return Err(FerroError::ReferenceUnavailable {
                    contig: contig.to_string(),
                    pos: end,
                });
            }
            Ok(seq[start as usize..end as usize].to_string())
        }
    }

    #[test]
    fn test_default_base() {
        assert_eq!(Fixed.base("1", 1).unwrap(), 'A');
        assert_eq!(Fixed.base("1", 4).unwrap(), 'T');
        assert!(Fixed.base("1", 0).is_err());
        assert!(Fixed.base("1", 9).is_err());
        assert!(Fixed.base("2", 1).is_err());
    }

    #[test]
    fn test_wrappers_delegate() {
        let by_ref = &Fixed;
        assert_eq!(by_ref.base("1", 2).unwrap(), 'C');

        let shared = Arc::new(Fixed);
        assert_eq!(shared.base("1", 3).unwrap(), 'G');
        assert!(shared.has_contig("1"));

        let boxed: Box<dyn ReferenceProvider + Send + Sync> = Box::new(Fixed);
        assert!(!boxed.has_contig("X"));
    }
}
