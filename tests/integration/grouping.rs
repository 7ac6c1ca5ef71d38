use super::scan_to_string;
use gred::{parse_patches, PatchError};
use std::fs;
use tempfile::TempDir;

#[test]
fn interleaved_paths_fail_before_any_file_is_touched() {
    let dir = TempDir::new().unwrap();
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    fs::write(&a, "one\ntwo\n").unwrap();
    fs::write(&b, "one\n").unwrap();

    let out_a = scan_to_string(&["o"], &a);
    let out_b = scan_to_string(&["o"], &b);
    let mut a_lines = out_a.lines();
    let first_a = a_lines.next().unwrap().replace("\tone", "\tONE");
    let second_a = a_lines.next().unwrap().replace("\ttwo", "\tTWO");

    let input = format!("{first_a}\n{out_b}{second_a}\n");
    let err = parse_patches(input.as_bytes()).unwrap_err();
    assert!(matches!(err, PatchError::DuplicatePathGroup { line: 3, .. }));

    assert_eq!(fs::read_to_string(&a).unwrap(), "one\ntwo\n");
    assert_eq!(fs::read_to_string(&b).unwrap(), "one\n");
}

#[test]
fn edited_fingerprint_field_is_rejected() {
    let dir = TempDir::new().unwrap();
    let a = dir.path().join("a.txt");
    fs::write(&a, "one\n").unwrap();

    let output = scan_to_string(&["one"], &a);
    // Break the fingerprint field.
    let mut chars: Vec<char> = output.chars().collect();
    chars[1] = 'z';
    let input: String = chars.into_iter().collect();

    assert!(matches!(
        parse_patches(input.as_bytes()),
        Err(PatchError::MalformedFingerprint { line: 1, .. })
    ));
}

#[test]
fn deleted_separator_names_the_input_line() {
    let dir = TempDir::new().unwrap();
    let a = dir.path().join("a.txt");
    fs::write(&a, "one\ntwo\n").unwrap();

    let output = scan_to_string(&["o"], &a);
    let mut lines: Vec<String> = output.lines().map(str::to_string).collect();
    lines[1] = lines[1].replacen('\t', " ", 2);
    let input = lines.join("\n") + "\n";

    match parse_patches(input.as_bytes()).unwrap_err() {
        PatchError::MalformedLine { line, .. } => assert_eq!(line, 2),
        other => panic!("unexpected error: {other}"),
    }
}
