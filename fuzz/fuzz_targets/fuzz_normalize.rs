//! Fuzz target for `normalize_reader`.
//!
//! Normalizing valid UTF-8 input must succeed, and normalizing the output
//! again must reproduce it byte for byte.

#![no_main]

use kmerstat::fasta::normalize_reader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if std::str::from_utf8(data).is_err() {
        return;
    }

    let mut once = Vec::new();
    let records = normalize_reader(data, &mut once).expect("valid UTF-8 should normalize");

    let headers = once.split(|&b| b == b'\n').filter(|l| l.starts_with(b">")).count();
    assert_eq!(headers, records);

    let mut twice = Vec::new();
    normalize_reader(once.as_slice(), &mut twice).expect("normalized output should normalize");
    assert_eq!(once, twice);
});
