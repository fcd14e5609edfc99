//! Fuzz target for `parse_dump_reader`.
//!
//! Arbitrary bytes must never panic the parser, and every non-empty line
//! must end up as an entry, a malformed header, an orphan, or a valid header.

#![no_main]

use kmerstat::dump::parse_dump_reader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let parsed = parse_dump_reader(data);

    for entry in &parsed.entries {
        assert!(entry.count > 0, "zero count accepted for {}", entry.kmer);
        assert!(!entry.kmer.is_empty());
        assert!(!entry.kmer.starts_with('>'));
    }
    for issue in parsed.malformed_headers.iter().chain(&parsed.orphan_lines) {
        assert!(issue.line > 0, "line numbers are 1-based");
    }
});
