use super::{edit_record, groups, scan_to_string};
use gred::{apply_all, parse_patches, ParseOutcome};
use std::fs;
use tempfile::TempDir;

fn setup(content: &str) -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("f.txt");
    fs::write(&path, content).unwrap();
    (dir, path)
}

#[test]
fn unmodified_output_is_a_no_op() {
    let original = "fn a() {}\nfn b() {}\nlet x = 1;\nfn c() {}";
    let (_dir, path) = setup(original);

    let output = scan_to_string(&["fn", "let"], &path);
    assert_eq!(output.lines().count(), 4);

    let outcome = parse_patches(output.as_bytes()).unwrap();
    assert_eq!(outcome, ParseOutcome::NoChanges);
    assert_eq!(fs::read_to_string(&path).unwrap(), original);
}

#[test]
fn beta_becomes_upper_case() {
    let (_dir, path) = setup("alpha\nbeta\ngamma\n");

    let output = scan_to_string(&["b.*"], &path);
    assert_eq!(output.lines().count(), 1);
    assert!(output.contains(":2\tbeta"));

    let edited = edit_record(&output, 2, "BETA");
    let results = apply_all(&groups(&edited), false);
    assert!(results[0].1.is_ok());
    assert_eq!(fs::read_to_string(&path).unwrap(), "alpha\nBETA\ngamma\n");
}

#[test]
fn single_edit_preserves_every_other_line() {
    let original = "one\ntwo\r\n\nthree  \nfour\nfive";
    let (_dir, path) = setup(original);

    let output = scan_to_string(&["^"], &path);
    assert_eq!(output.lines().count(), 6);

    let edited = edit_record(&output, 4, "THREE");
    let results = apply_all(&groups(&edited), false);
    assert!(results[0].1.is_ok());
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "one\ntwo\r\n\nTHREE\nfour\nfive"
    );
}

#[test]
fn editing_last_line_keeps_missing_newline() {
    let (_dir, path) = setup("keep\nlast");

    let output = scan_to_string(&["last"], &path);
    let edited = edit_record(&output, 2, "LAST");
    let results = apply_all(&groups(&edited), false);
    assert!(results[0].1.is_ok());
    assert_eq!(fs::read_to_string(&path).unwrap(), "keep\nLAST");
}

#[test]
fn multi_line_match_edits_one_of_its_lines() {
    let (_dir, path) = setup("head\nbegin\nbody\nend\ntail\n");

    let output = scan_to_string(&[r"(?s)begin.*?end"], &path);
    assert_eq!(output.lines().count(), 3);

    let edited = edit_record(&output, 3, "BODY");
    let results = apply_all(&groups(&edited), false);
    assert!(results[0].1.is_ok());
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "head\nbegin\nBODY\nend\ntail\n"
    );
}

#[test]
fn non_utf8_content_round_trips() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("latin1.txt");
    let original = b"caf\xe9\nmatch me\n\xff\xfe end\n".to_vec();
    fs::write(&path, &original).unwrap();

    let matcher = gred::MultiMatcher::new(["match"]).unwrap();
    let mut out = Vec::new();
    gred::scan_file(&matcher, &path, &mut out).unwrap();

    let outcome = parse_patches(out.as_slice()).unwrap();
    assert_eq!(outcome, ParseOutcome::NoChanges);
    assert_eq!(fs::read(&path).unwrap(), original);
}
