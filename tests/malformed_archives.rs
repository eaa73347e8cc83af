//! Tests for malformed and corrupted container handling.
//!
//! These tests verify that damaged containers fail at open time with a
//! descriptive error instead of yielding short or garbled members.

mod common;

use std::fs::{self, OpenOptions as FsOpenOptions};

use arcfs::{Archive, Error};

use common::{file_fixture, pattern, tar_fixture};

// =============================================================================
// Tar
// =============================================================================

#[test]
fn test_truncated_tar_member_is_invalid() {
    let fixture = tar_fixture(&[("big.bin", &pattern(10_000))]);
    let file = FsOpenOptions::new().write(true).open(&fixture.path).unwrap();
    file.set_len(512 + 3_000).unwrap();
    drop(file);

    let err = Archive::open(fixture.path_str()).unwrap_err();
    assert!(matches!(err, Error::InvalidArchive { .. }), "unexpected error: {err:?}");
}

#[test]
fn test_corrupt_tar_header_is_invalid() {
    let fixture = tar_fixture(&[("a", b"first"), ("b", b"second")]);
    let mut bytes = fs::read(&fixture.path).unwrap();
    // second header follows the first header and its padded data block
    bytes[1024] ^= 0x5A;
    fs::write(&fixture.path, &bytes).unwrap();

    let err = Archive::open(fixture.path_str()).unwrap_err();
    match err {
        Error::InvalidArchive { archive, reason } => {
            assert_eq!(archive, fixture.path);
            assert!(!reason.is_empty());
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_zero_filled_file_is_not_a_tar() {
    let fixture = file_fixture("zeros.bin", &[0u8; 4096]);
    let err = Archive::open(fixture.path_str()).unwrap_err();

    assert!(err.is_not_an_archive());
    assert_eq!(err.mime(), Some("application/octet-stream"));
}

#[test]
fn test_unsafe_tar_members_are_skipped() {
    let fixture = tar_fixture(&[("ok.txt", b"ok")]);

    // append a member whose name climbs out of the root
    let mut bytes = fs::read(&fixture.path).unwrap();
    let end_marker = bytes.len() - 1024;
    bytes.truncate(end_marker);
    let mut header = tar::Header::new_gnu();
    header.as_gnu_mut().unwrap().name[..9].copy_from_slice(b"../escape");
    header.set_size(3);
    header.set_mode(0o644);
    header.set_cksum();
    bytes.extend_from_slice(header.as_bytes());
    let mut block = vec![0u8; 512];
    block[..3].copy_from_slice(b"bad");
    bytes.extend_from_slice(&block);
    bytes.extend_from_slice(&[0u8; 1024]);
    fs::write(&fixture.path, &bytes).unwrap();

    let archive = Archive::open(fixture.path_str()).unwrap();
    assert_eq!(archive.list().unwrap(), ["ok.txt"]);
}

// =============================================================================
// Zip
// =============================================================================

#[cfg(feature = "zip")]
#[test]
fn test_zip_without_central_directory_is_invalid() {
    let mut bytes = b"PK\x03\x04".to_vec();
    bytes.extend_from_slice(&pattern(600));
    let fixture = file_fixture("broken.zip", &bytes);

    let err = Archive::open(fixture.path_str()).unwrap_err();
    assert!(matches!(err, Error::InvalidArchive { .. }), "unexpected error: {err:?}");
}

#[cfg(feature = "zip")]
#[test]
fn test_corrupt_deflated_member_fails_to_read() {
    let data = pattern(50_000);
    let fixture = common::zip_fixture(&[("data.bin", &data)], true);
    let mut bytes = fs::read(&fixture.path).unwrap();
    // local header (30 bytes) plus the 8-byte name, then compressed data
    let compressed = u32::from_le_bytes(bytes[18..22].try_into().unwrap()) as usize;
    assert!(compressed > 8);
    for byte in &mut bytes[38..38 + compressed.min(100)] {
        *byte = !*byte;
    }
    fs::write(&fixture.path, &bytes).unwrap();

    let archive = Archive::open(fixture.path_str()).unwrap();
    assert!(archive.read_member("data.bin").is_err());
}
