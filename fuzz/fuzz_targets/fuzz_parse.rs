//! Fuzz target for the descriptor and VCF line parsers
//!
//! Feeds arbitrary byte strings to both parsers to find crashes or panics.

#![no_main]

use ferro_varnorm::vcf::VcfRecord;
use ferro_varnorm::{parse, Normalizer};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Don't fuzz extremely long inputs - diminishing returns
        if input.len() > 1000 {
            return;
        }

        if let Ok(key) = parse(input) {
            let _ = Normalizer::new().normalize(&key);
        }
        let _ = VcfRecord::parse_line(input, &[]);
    }
});
