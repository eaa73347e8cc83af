//! Tarball backend integration tests.

use std::io::{Read, Seek, SeekFrom};
use std::sync::Arc;
use std::thread;

use arcfs::{Archive, BackendKind, Error, FileHint, OpenOptions};

mod common;

use common::{pattern, tar_fixture};

// =============================================================================
// Prefix Stripping
// =============================================================================

#[test]
fn test_list_without_hint_keeps_prefix() {
    let fixture = tar_fixture(&[("dir/a", b"A"), ("dir/b", b"B")]);
    let archive = Archive::open(fixture.path_str()).unwrap();

    assert_eq!(archive.backend_kind(), BackendKind::Tarball);
    assert_eq!(archive.list().unwrap(), ["dir/a", "dir/b"]);
    assert_eq!(archive.used_hint(), None);
}

#[test]
fn test_list_with_hint_strips_prefix() {
    let fixture = tar_fixture(&[("dir/a", b"A"), ("dir/b", b"B")]);
    let archive =
        Archive::open_with_options(fixture.path_str(), OpenOptions::new().hint("a")).unwrap();

    assert_eq!(archive.list().unwrap(), ["a", "b"]);
    assert_eq!(archive.used_hint().as_deref(), Some("dir/a"));
    assert_eq!(archive.read_member("b").unwrap(), b"B");
    assert!(!archive.exists("dir/b"));
}

#[test]
fn test_members_outside_prefix_are_absent() {
    let fixture = tar_fixture(&[
        ("pkg/manifest.json", b"{}"),
        ("pkg/data.bin", b"data"),
        ("other/data.bin", b"other"),
    ]);
    let archive = Archive::open_with_hint(fixture.path_str(), "manifest.json", None).unwrap();

    assert_eq!(archive.list().unwrap(), ["manifest.json", "data.bin"]);
    assert!(!archive.exists("other/data.bin"));
    assert!(archive.open_member("other/data.bin").unwrap_err().is_not_found());
}

#[test]
fn test_missing_hint_fails_open() {
    let fixture = tar_fixture(&[("dir/a", b"A")]);
    let err = Archive::open_with_options(fixture.path_str(), OpenOptions::new().hint("zzz"))
        .unwrap_err();

    assert!(matches!(err, Error::HintNotFound { .. }));
    assert!(err.is_not_found());
}

#[test]
fn test_hint_priority() {
    let fixture = tar_fixture(&[
        ("top/CONFIG.JSON", b"upper"),
        ("sub/config.json", b"lower"),
    ]);
    let hint = FileHint::new(["config.json", "CONFIG.JSON"]);
    let archive = Archive::open_with_options(fixture.path_str(), OpenOptions::new().hint(hint))
        .unwrap();

    assert_eq!(archive.used_hint().as_deref(), Some("sub/config.json"));
    assert_eq!(archive.list().unwrap(), ["config.json"]);
}

// =============================================================================
// Inline Hints
// =============================================================================

#[test]
fn test_inline_hint_overrides_explicit_hint() {
    let fixture = tar_fixture(&[("root/inner/hint.file", b"h"), ("root/inner/x", b"x")]);
    let path = format!("{}#inner/hint.file", fixture.path_str());
    let archive = Archive::open_with_options(
        path,
        OpenOptions::new().inline_hint('#').hint("does-not-exist"),
    )
    .unwrap();

    assert_eq!(archive.path(), fixture.path.as_path());
    assert_eq!(archive.used_hint().as_deref(), Some("root/inner/hint.file"));
    assert_eq!(archive.list().unwrap(), ["inner/hint.file", "inner/x"]);
}

#[test]
fn test_marker_without_inline_hint_option_is_literal() {
    let fixture = tar_fixture(&[("a", b"A")]);
    let path = format!("{}#a", fixture.path_str());
    let err = Archive::open(path).unwrap_err();
    assert!(err.is_io());
}

// =============================================================================
// Reading
// =============================================================================

#[test]
fn test_read_member_contents() {
    let big = pattern(200_000);
    let fixture = tar_fixture(&[("small.txt", b"hello"), ("big.bin", &big), ("empty", b"")]);
    let archive = Archive::open(fixture.path_str()).unwrap();

    let mut stream = archive.open_member("big.bin").unwrap();
    assert_eq!(stream.size(), Some(big.len() as u64));
    assert_eq!(stream.read_all().unwrap(), big);

    assert_eq!(archive.read_member("small.txt").unwrap(), b"hello");
    assert!(archive.read_member("empty").unwrap().is_empty());
}

#[test]
fn test_duplicate_member_first_wins() {
    let fixture = tar_fixture(&[("a", b"FIRST"), ("b", b"B"), ("a", b"SECOND")]);
    let archive = Archive::open(fixture.path_str()).unwrap();

    assert_eq!(archive.list().unwrap(), ["a", "b"]);
    assert_eq!(archive.read_member("a").unwrap(), b"FIRST");
}

#[test]
fn test_member_stream_seek() {
    let data = pattern(100_000);
    let fixture = tar_fixture(&[("data", &data)]);
    let archive = Archive::open(fixture.path_str()).unwrap();

    let mut stream = archive.open_member("data").unwrap();
    stream.seek(SeekFrom::Start(70_000)).unwrap();
    let mut chunk = vec![0u8; 100];
    stream.read_exact(&mut chunk).unwrap();
    assert_eq!(chunk, &data[70_000..70_100]);

    stream.seek(SeekFrom::Start(10)).unwrap();
    stream.read_exact(&mut chunk).unwrap();
    assert_eq!(chunk, &data[10..110]);
}

#[test]
fn test_missing_member_names_archive() {
    let fixture = tar_fixture(&[("a", b"A")]);
    let archive = Archive::open(fixture.path_str()).unwrap();

    match archive.open_member("missing") {
        Err(Error::NotFound { archive: path, member }) => {
            assert_eq!(path, fixture.path);
            assert_eq!(member, "missing");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_copy_to_path() {
    let fixture = tar_fixture(&[("dir/file.txt", b"copy me")]);
    let archive = Archive::open(fixture.path_str()).unwrap();
    let target = fixture.dir.path().join("out.txt");

    let copied = archive
        .open_member("dir/file.txt")
        .unwrap()
        .copy_to_path(&target)
        .unwrap();
    assert_eq!(copied, 7);
    assert_eq!(std::fs::read(&target).unwrap(), b"copy me");
}

#[test]
fn test_concurrent_member_reads() {
    let members: Vec<(String, Vec<u8>)> = (0..8)
        .map(|i| (format!("m{i}"), pattern(50_000 + i * 1_000)))
        .collect();
    let entries: Vec<(&str, &[u8])> = members
        .iter()
        .map(|(name, data)| (name.as_str(), data.as_slice()))
        .collect();
    let fixture = tar_fixture(&entries);
    let archive = Arc::new(Archive::open(fixture.path_str()).unwrap());

    let handles: Vec<_> = members
        .iter()
        .cloned()
        .map(|(name, expected)| {
            let archive = Arc::clone(&archive);
            thread::spawn(move || {
                for _ in 0..5 {
                    let mut stream = archive.open_member(&name).unwrap();
                    let mut out = Vec::new();
                    // small reads interleave the threads' positioned reads
                    let mut buf = [0u8; 777];
                    loop {
                        let n = stream.read(&mut buf).unwrap();
                        if n == 0 {
                            break;
                        }
                        out.extend_from_slice(&buf[..n]);
                    }
                    assert_eq!(out, expected);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

// =============================================================================
// Lookup Helpers
// =============================================================================

#[test]
fn test_find_file() {
    let fixture = tar_fixture(&[("x/readme", b"1"), ("y/readme", b"2"), ("z", b"3")]);
    let archive = Archive::open(fixture.path_str()).unwrap();

    assert_eq!(archive.find_file("readme").as_deref(), Some("x/readme"));
    assert_eq!(archive.find_file("nothing"), None);
    assert!(archive.exists("y/readme"));
    assert!(!archive.exists("y"));
}

#[test]
fn test_apply_hint_rebuilds_index() {
    let fixture = tar_fixture(&[("one/a", b"1"), ("two/b", b"2")]);
    let mut archive = Archive::open(fixture.path_str()).unwrap();

    archive.apply_hint("b").unwrap();
    assert_eq!(archive.list().unwrap(), ["b"]);
    assert_eq!(archive.used_hint().as_deref(), Some("two/b"));

    // a failed re-root keeps the previous index
    assert!(archive.apply_hint("missing").is_err());
    assert_eq!(archive.list().unwrap(), ["b"]);
}

#[test]
fn test_resolve_path() {
    let fixture = tar_fixture(&[("dir/a", b"A")]);
    let archive = Archive::open_with_hint(fixture.path_str(), "a", None).unwrap();

    assert_eq!(archive.resolve_path("a"), fixture.path.join("dir").join("a"));
    let absolute = fixture.dir.path().join("elsewhere");
    assert_eq!(archive.resolve_path(&absolute), absolute);
}

#[test]
fn test_capabilities() {
    let fixture = tar_fixture(&[("a", b"A")]);
    let archive = Archive::open(fixture.path_str()).unwrap();

    assert!(!archive.directio());
    assert!(!archive.handles_schema("file"));
    assert!(!archive.handles_schema("http"));
}

// =============================================================================
// Change Detection
// =============================================================================

#[test]
fn test_changed_after_rewrite() {
    let fixture = tar_fixture(&[("a", b"A")]);
    let archive = Archive::open(fixture.path_str()).unwrap();
    assert!(!archive.changed());

    common::write_tar(&fixture.path, &[("a", b"A"), ("b", b"B")]);
    assert!(archive.changed());
}

#[test]
fn test_changed_after_mtime_touch() {
    let fixture = tar_fixture(&[("a", b"A")]);
    let archive = Archive::open(fixture.path_str()).unwrap();

    filetime::set_file_mtime(&fixture.path, filetime::FileTime::from_unix_time(1, 0)).unwrap();
    assert!(archive.changed());
}

#[test]
fn test_changed_after_removal() {
    let fixture = tar_fixture(&[("a", b"A")]);
    let archive = Archive::open(fixture.path_str()).unwrap();

    std::fs::remove_file(&fixture.path).unwrap();
    assert!(archive.changed());
}
