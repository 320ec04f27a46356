//! Integration tests for inbox normalization
//!
//! Covers the normalization guarantee: whatever the archive's internal
//! layout, the result is one directory named after the archive.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use cpdb_ix::archive::{normalize_archive, normalize_inbox};

fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    let file = File::create(path).unwrap();
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default();
    for (name, data) in entries {
        if name.ends_with('/') {
            writer.add_directory(name.trim_end_matches('/'), options).unwrap();
        } else {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
    }
    writer.finish().unwrap();
}

#[test]
fn single_root_archive_is_not_double_nested() {
    let inbox = TempDir::new().unwrap();
    let archive_path = inbox.path().join("mypack.zip");
    write_zip(
        &archive_path,
        &[
            ("mypack/", b""),
            ("mypack/a.wav", b"aaaa"),
            ("mypack/b.wav", b"bbbb"),
        ],
    );

    let target = normalize_archive(&archive_path, inbox.path()).unwrap();

    assert_eq!(target, inbox.path().join("mypack"));
    assert!(target.join("a.wav").is_file());
    assert!(target.join("b.wav").is_file());
    assert!(!target.join("mypack").exists(), "must not nest mypack/mypack");
}

#[test]
fn loose_archive_gets_wrapped_in_base_name_directory() {
    let inbox = TempDir::new().unwrap();
    let archive_path = inbox.path().join("loose.zip");
    write_zip(&archive_path, &[("a.wav", b"aaaa"), ("b.wav", b"bbbb")]);

    let target = normalize_archive(&archive_path, inbox.path()).unwrap();

    assert_eq!(target, inbox.path().join("loose"));
    assert!(target.join("a.wav").is_file());
    assert!(target.join("b.wav").is_file());
}

#[test]
fn root_named_differently_from_archive_is_renamed() {
    let inbox = TempDir::new().unwrap();
    let archive_path = inbox.path().join("renamed.zip");
    write_zip(&archive_path, &[("oldname/a.wav", b"aaaa")]);

    let target = normalize_archive(&archive_path, inbox.path()).unwrap();

    assert_eq!(target, inbox.path().join("renamed"));
    assert!(target.join("a.wav").is_file());
    assert!(!inbox.path().join("oldname").exists());
}

#[test]
fn empty_archive_still_yields_directory() {
    let inbox = TempDir::new().unwrap();
    let archive_path = inbox.path().join("empty.zip");
    write_zip(&archive_path, &[]);

    let target = normalize_archive(&archive_path, inbox.path()).unwrap();

    assert!(target.is_dir());
    assert_eq!(fs::read_dir(&target).unwrap().count(), 0);
}

#[test]
fn pre_existing_directory_is_replaced() {
    let inbox = TempDir::new().unwrap();
    let stale = inbox.path().join("mypack");
    fs::create_dir(&stale).unwrap();
    fs::write(stale.join("stale.wav"), b"old").unwrap();

    let archive_path = inbox.path().join("mypack.zip");
    write_zip(&archive_path, &[("mypack/fresh.wav", b"new")]);

    let target = normalize_archive(&archive_path, inbox.path()).unwrap();

    assert!(target.join("fresh.wav").is_file());
    assert!(
        !target.join("stale.wav").exists(),
        "pre-existing directory must be replaced, not merged into"
    );
}

#[test]
fn stale_directory_named_after_archive_root_is_left_alone() {
    // An unrelated inbox directory that happens to share the archive's
    // internal root name must neither leak into the result nor be consumed
    let inbox = TempDir::new().unwrap();
    let unrelated = inbox.path().join("oldname");
    fs::create_dir(&unrelated).unwrap();
    fs::write(unrelated.join("junk.wav"), b"junk").unwrap();

    let archive_path = inbox.path().join("renamed.zip");
    write_zip(&archive_path, &[("oldname/fresh.wav", b"new")]);

    let target = normalize_archive(&archive_path, inbox.path()).unwrap();

    assert_eq!(target, inbox.path().join("renamed"));
    assert!(target.join("fresh.wav").is_file());
    assert!(!target.join("junk.wav").exists());
    assert!(unrelated.join("junk.wav").is_file());
}

#[test]
fn no_scratch_directories_survive_normalization() {
    let inbox = TempDir::new().unwrap();
    let archive_path = inbox.path().join("mypack.zip");
    write_zip(&archive_path, &[("mypack/a.wav", b"aaaa")]);

    normalize_archive(&archive_path, inbox.path()).unwrap();

    let top_level: Vec<String> = fs::read_dir(inbox.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert!(
        top_level.iter().all(|name| !name.starts_with('.')),
        "unexpected scratch entries: {:?}",
        top_level
    );
}

#[test]
fn corrupt_archive_is_skipped_without_aborting_batch() {
    let inbox = TempDir::new().unwrap();
    fs::write(inbox.path().join("bad.zip"), b"this is not a zip file").unwrap();
    write_zip(
        &inbox.path().join("good.zip"),
        &[("good/a.wav", b"aaaa")],
    );

    let normalized = normalize_inbox(inbox.path()).unwrap();

    assert_eq!(normalized, 1);
    assert!(inbox.path().join("good").is_dir());
    // The corrupt file stays put, the good archive is consumed
    assert!(inbox.path().join("bad.zip").exists());
    assert!(!inbox.path().join("good.zip").exists());
}

#[test]
fn non_archive_files_are_left_alone() {
    let inbox = TempDir::new().unwrap();
    fs::write(inbox.path().join("notes.txt"), b"hello").unwrap();

    let normalized = normalize_inbox(inbox.path()).unwrap();

    assert_eq!(normalized, 0);
    assert!(inbox.path().join("notes.txt").exists());
}
