//! Shared test utilities for integration tests.
//!
//! Fixture builders write real containers into temporary directories so the
//! tests exercise the same code paths as production use.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary directory holding one container.
pub struct Fixture {
    pub dir: TempDir,
    pub path: PathBuf,
}

impl Fixture {
    /// The container path as a string, the form `Archive::open` takes.
    pub fn path_str(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

/// Writes a tar archive with the given regular-file members.
pub fn write_tar(path: &Path, entries: &[(&str, &[u8])]) {
    let mut builder = tar::Builder::new(File::create(path).expect("Failed to create tar"));
    for (name, data) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(1_700_000_000);
        builder
            .append_data(&mut header, name, *data)
            .expect("Failed to append tar member");
    }
    builder.finish().expect("Failed to finish tar");
}

/// Creates a tar fixture named `test.tar`.
pub fn tar_fixture(entries: &[(&str, &[u8])]) -> Fixture {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("test.tar");
    write_tar(&path, entries);
    Fixture { dir, path }
}

/// Creates a directory fixture with the given files.
pub fn dir_fixture(entries: &[(&str, &[u8])]) -> Fixture {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("root");
    fs::create_dir(&path).expect("Failed to create root");
    for (name, data) in entries {
        let target = path.join(name);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent");
        }
        fs::write(&target, data).expect("Failed to write file");
    }
    Fixture { dir, path }
}

/// Creates a zip fixture named `test.zip`; `compress` selects deflate over
/// stored members.
#[cfg(feature = "zip")]
pub fn zip_fixture(entries: &[(&str, &[u8])], compress: bool) -> Fixture {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("test.zip");
    let method = if compress {
        zip::CompressionMethod::Deflated
    } else {
        zip::CompressionMethod::Stored
    };
    let mut writer = zip::ZipWriter::new(File::create(&path).expect("Failed to create zip"));
    for (name, data) in entries {
        let options = zip::write::FileOptions::default().compression_method(method);
        writer.start_file(*name, options).expect("Failed to start zip member");
        writer.write_all(data).expect("Failed to write zip member");
    }
    writer.finish().expect("Failed to finish zip");
    Fixture { dir, path }
}

/// Creates a fixture holding a single plain file.
pub fn file_fixture(name: &str, data: &[u8]) -> Fixture {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join(name);
    fs::write(&path, data).expect("Failed to write file");
    Fixture { dir, path }
}

/// Gzip-compresses `data`.
pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).expect("Failed to compress");
    encoder.finish().expect("Failed to finish gzip")
}

/// Deterministic pseudo-random bytes.
pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| ((i * 31 + i / 7) % 251) as u8).collect()
}

/// Starts a mock server answering GET and HEAD for each of `routes`.
///
/// Unknown paths get 404. Paths are absolute, e.g. `/data/tileset.conf`.
#[cfg(feature = "http")]
pub async fn mock_http(routes: &[(&str, Vec<u8>)]) -> wiremock::MockServer {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    for (route, body) in routes {
        Mock::given(method("GET"))
            .and(path(*route))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path(*route))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
    }
    server
}
