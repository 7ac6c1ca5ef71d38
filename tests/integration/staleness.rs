use super::{edit_record, groups, scan_to_string};
use gred::{apply_all, ApplyError};
use std::fs;
use tempfile::TempDir;

#[test]
fn file_modified_since_scan_is_left_untouched() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("f.txt");
    fs::write(&path, "alpha\nbeta\ngamma\n").unwrap();

    let output = scan_to_string(&["beta"], &path);
    let edited = edit_record(&output, 2, "BETA");

    // Someone else changes line 2 between scan and patch.
    let concurrent = "alpha\nbeta (edited elsewhere)\ngamma\n";
    fs::write(&path, concurrent).unwrap();

    let results = apply_all(&groups(&edited), false);
    match &results[0].1 {
        Err(ApplyError::StaleFingerprint { line, path: failed }) => {
            assert_eq!(*line, 2);
            assert_eq!(failed, &path);
        }
        other => panic!("expected stale fingerprint, got {other:?}"),
    }
    assert_eq!(fs::read_to_string(&path).unwrap(), concurrent);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn changes_to_other_lines_do_not_block_the_patch() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("f.txt");
    fs::write(&path, "alpha\nbeta\ngamma\n").unwrap();

    let output = scan_to_string(&["beta"], &path);
    let edited = edit_record(&output, 2, "BETA");

    fs::write(&path, "ALPHA\nbeta\ngamma!\n").unwrap();

    let results = apply_all(&groups(&edited), false);
    assert!(results[0].1.is_ok());
    assert_eq!(fs::read_to_string(&path).unwrap(), "ALPHA\nBETA\ngamma!\n");
}

#[test]
fn truncated_file_reports_unexpected_eof() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("f.txt");
    fs::write(&path, "a\nb\nc\nneedle\n").unwrap();

    let output = scan_to_string(&["needle"], &path);
    let edited = edit_record(&output, 4, "NEEDLE");

    fs::write(&path, "a\nb\n").unwrap();

    let results = apply_all(&groups(&edited), false);
    assert!(matches!(
        results[0].1,
        Err(ApplyError::UnexpectedEof { line: 4, .. })
    ));
    assert_eq!(fs::read_to_string(&path).unwrap(), "a\nb\n");
}

#[test]
fn stale_file_does_not_stop_other_files() {
    let dir = TempDir::new().unwrap();
    let first = dir.path().join("first.txt");
    let second = dir.path().join("second.txt");
    fs::write(&first, "x = 1\n").unwrap();
    fs::write(&second, "x = 2\n").unwrap();

    let output = scan_to_string(&["x"], &first) + &scan_to_string(&["x"], &second);
    let edited = edit_record(&output, 1, "y = 0");

    fs::write(&first, "x = 100\n").unwrap();

    let results = apply_all(&groups(&edited), false);
    assert_eq!(results.len(), 2);
    assert!(results[0].1.is_err());
    assert!(results[1].1.is_ok());
    assert_eq!(fs::read_to_string(&first).unwrap(), "x = 100\n");
    assert_eq!(fs::read_to_string(&second).unwrap(), "y = 0\n");
}
