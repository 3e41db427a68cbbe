use assert_fs::TempDir;
use assert_fs::prelude::*;
use std::fs;

use ecfmt::fs_ops::SIDECAR_FILE_NAME;
use ecfmt::{AttributeStore, ENCODING_ATTRIBUTE, FileHandle, LineEnding, LocalFile, RecordingSink, RuleSet, run_formatting_task};

fn names_in(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn rewrites_file_and_records_encoding_in_sidecar() {
    let tmp = TempDir::new().unwrap();
    let child = tmp.child("main.c");
    child.write_str("int x; \r\nint y;\t\r\n").unwrap();

    let file = LocalFile::new(child.path());
    let rules = RuleSet::new(LineEnding::Lf, true);
    let outcome = run_formatting_task(&file, &rules, &RecordingSink::new()).unwrap();
    assert!(outcome.changed);
    child.assert("int x;\nint y;\n");

    assert_eq!(file.attribute(ENCODING_ATTRIBUTE).unwrap().as_deref(), Some("UTF-8"));
    let sidecar: serde_json::Value =
        serde_json::from_slice(&fs::read(tmp.path().join(SIDECAR_FILE_NAME)).unwrap()).unwrap();
    assert_eq!(sidecar["files"]["main.c"]["ENCODING"], "UTF-8");

    // Only the file and the sidecar remain: no lock or temp files.
    assert_eq!(names_in(tmp.path()), vec![SIDECAR_FILE_NAME.to_string(), "main.c".to_string()]);
}

#[test]
fn unchanged_file_is_not_touched() {
    let tmp = TempDir::new().unwrap();
    let child = tmp.child("ok.txt");
    child.write_str("fine\n").unwrap();
    let before = fs::metadata(child.path()).unwrap().modified().unwrap();

    let file = LocalFile::new(child.path());
    let outcome = run_formatting_task(&file, &RuleSet::new(LineEnding::Lf, true), &RecordingSink::new()).unwrap();
    assert!(!outcome.changed);
    assert_eq!(fs::metadata(child.path()).unwrap().modified().unwrap(), before);
    assert_eq!(names_in(tmp.path()), vec!["ok.txt".to_string()]);
}

#[cfg(unix)]
#[test]
fn permissions_survive_rewrite() {
    use std::os::unix::fs::PermissionsExt;
    let tmp = TempDir::new().unwrap();
    let child = tmp.child("run.sh");
    child.write_str("#!/bin/sh  \n").unwrap();
    fs::set_permissions(child.path(), fs::Permissions::from_mode(0o750)).unwrap();

    let file = LocalFile::new(child.path());
    assert!(run_formatting_task(&file, &RuleSet::new(LineEnding::Lf, true), &RecordingSink::new()).unwrap().changed);
    let mode = fs::metadata(child.path()).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o750);
}

#[test]
fn missing_file_is_a_read_error() {
    let tmp = TempDir::new().unwrap();
    let file = LocalFile::new(tmp.path().join("nope.txt"));
    let err = run_formatting_task(&file, &RuleSet::default(), &RecordingSink::new()).unwrap_err();
    assert_eq!(err.code(), 10);
}

#[test]
fn latin1_file_round_trips_through_guess() {
    let tmp = TempDir::new().unwrap();
    let child = tmp.child("de.txt");
    let original = b"Der B\xe4r l\xe4uft \xfcber die Stra\xdfe und isst K\xe4se.   \n".to_vec();
    child.write_binary(&original).unwrap();

    let file = LocalFile::with_store(child.path(), AttributeStore::Sidecar);
    let outcome = run_formatting_task(&file, &RuleSet::new(LineEnding::Lf, true), &RecordingSink::new()).unwrap();
    assert!(outcome.changed);
    assert_ne!(outcome.encoding.unwrap().name(), "UTF-8");
    // Still single-byte: the umlauts were written back in the legacy encoding.
    let written = fs::read(child.path()).unwrap();
    assert_eq!(written.len(), original.len() - 3);
    assert!(written.contains(&0xe4));
}
