//! Container type detection.
//!
//! This module maps a path to a MIME-like type token based on file metadata
//! and signatures (magic bytes). The tokens drive backend dispatch in
//! [`Archive::open_with_options`](crate::Archive::open_with_options).

use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use crate::Result;

/// Type token for directories.
pub const DIRECTORY: &str = "inode/directory";
/// Type token for tar archives.
pub const TAR: &str = "application/x-tar";
/// Type token for zip archives.
pub const ZIP: &str = "application/zip";
/// Type token for HTTP(S) resources, produced from the URL scheme.
pub const HTTP: &str = "http";
/// Type token for empty files.
pub const EMPTY: &str = "inode/x-empty";
/// Type token for unrecognized binary data.
pub const OCTET_STREAM: &str = "application/octet-stream";
/// Type token for textual data.
pub const TEXT: &str = "text/plain";

/// Size of the sniffed prefix; one tar header block.
const SNIFF_SIZE: usize = 512;

/// Known signatures at offset 0.
const SIGNATURES: &[(&[u8], &str)] = &[
    // ZIP: 'P' 'K' 0x03 0x04 (local file header)
    (&[0x50, 0x4B, 0x03, 0x04], ZIP),
    // ZIP: 'P' 'K' 0x05 0x06 (empty archive)
    (&[0x50, 0x4B, 0x05, 0x06], ZIP),
    // 7z: '7' 'z' 0xBC 0xAF 0x27 0x1C
    (
        &[0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C],
        "application/x-7z-compressed",
    ),
    // gzip: 0x1F 0x8B
    (&[0x1F, 0x8B], "application/gzip"),
    // XZ: 0xFD '7' 'z' 'X' 'Z' 0x00
    (&[0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00], "application/x-xz"),
    // bzip2: 'B' 'Z' 'h'
    (&[0x42, 0x5A, 0x68], "application/x-bzip2"),
    // Zstd: 0x28 0xB5 0x2F 0xFD
    (&[0x28, 0xB5, 0x2F, 0xFD], "application/zstd"),
];

/// TAR USTAR signature at offset 257.
const TAR_USTAR_SIGNATURE: &[u8] = b"ustar";
const TAR_USTAR_OFFSET: usize = 257;

/// Detects the type token of `path`.
///
/// # Errors
///
/// Returns an I/O error if the path does not exist or cannot be read.
///
/// # Example
///
/// ```rust,no_run
/// use arcfs::detect::{detect_mime, TAR};
///
/// assert_eq!(detect_mime("bundle.tar".as_ref())?, TAR);
/// # Ok::<(), arcfs::Error>(())
/// ```
pub fn detect_mime(path: &Path) -> Result<&'static str> {
    if fs::metadata(path)?.is_dir() {
        return Ok(DIRECTORY);
    }

    let mut file = File::open(path)?;
    detect_mime_from_reader(&mut file)
}

/// Detects the type token from the first bytes of `reader`.
pub fn detect_mime_from_reader<R: Read>(reader: &mut R) -> Result<&'static str> {
    let mut head = Vec::with_capacity(SNIFF_SIZE);
    reader.take(SNIFF_SIZE as u64).read_to_end(&mut head)?;
    Ok(detect_mime_from_bytes(&head))
}

/// Detects the type token from a prefix of the data.
pub fn detect_mime_from_bytes(head: &[u8]) -> &'static str {
    if head.is_empty() {
        return EMPTY;
    }

    for (signature, mime) in SIGNATURES {
        if head.starts_with(signature) {
            return mime;
        }
    }

    if head.len() == SNIFF_SIZE && is_tar_header(head) {
        return TAR;
    }

    if looks_like_text(head) {
        return TEXT;
    }

    OCTET_STREAM
}

/// Checks for a USTAR magic or, for old v7 archives, a valid header checksum.
fn is_tar_header(block: &[u8]) -> bool {
    let magic = &block[TAR_USTAR_OFFSET..TAR_USTAR_OFFSET + TAR_USTAR_SIGNATURE.len()];
    if magic == TAR_USTAR_SIGNATURE {
        return true;
    }

    // v7: no magic, so the name must be set and the checksum must verify
    if block[0] == 0 {
        return false;
    }
    let header = tar::Header::from_byte_slice(block);
    let Ok(stored) = header.cksum() else {
        return false;
    };
    let mut computed = header.clone();
    computed.set_cksum();
    computed.cksum().is_ok_and(|sum| sum == stored)
}

fn looks_like_text(head: &[u8]) -> bool {
    if head.contains(&0) {
        return false;
    }
    match std::str::from_utf8(head) {
        Ok(text) => text
            .chars()
            .all(|c| !c.is_control() || c.is_ascii_whitespace()),
        // the prefix may cut a multi-byte sequence in half
        Err(e) => e.error_len().is_none(),
    }
}
