//! Fuzz target for content sniffing with arbitrary byte input.
//!
//! Exercises signature matching and the tar header checksum probe, which
//! parses a header out of whatever 512 bytes it is handed.
//!
//! Run with: cargo +nightly fuzz run detect_mime

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    let from_bytes = arcfs::detect::detect_mime_from_bytes(&data[..data.len().min(512)]);

    // the reader variant sniffs the same prefix
    let from_reader = arcfs::detect::detect_mime_from_reader(&mut Cursor::new(data))
        .expect("reading from memory cannot fail");
    assert_eq!(from_bytes, from_reader);
});
