//! Fuzz target for member path normalization and hint matching.
//!
//! Run with: cargo +nightly fuzz run member_path
//!
//! Properties checked:
//! - normalized paths are relative and free of `..`, `.` and empty components
//! - normalization is idempotent
//! - a path always matches a hint made of its own file name

#![no_main]

use arcfs::FileHint;
use arcfs::safety::normalize_member_path;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(path) = std::str::from_utf8(data) else {
        return;
    };
    let Some(normalized) = normalize_member_path(path) else {
        return;
    };

    assert!(!normalized.starts_with('/'), "absolute path accepted: {normalized:?}");
    assert!(
        normalized
            .split('/')
            .all(|part| !part.is_empty() && part != "." && part != ".."),
        "bad component in {normalized:?}"
    );
    assert_eq!(normalize_member_path(&normalized).as_deref(), Some(normalized.as_str()));

    let name = normalized.rsplit('/').next().unwrap_or(&normalized);
    let hint = FileHint::single(name);
    let mut matcher = hint.matcher();
    assert!(matcher.observe(&normalized));
    assert_eq!(matcher.best_match(), Some(normalized.as_str()));
});
