//! Integration tests for the scan/patch round trip through the library API.

mod grouping;
mod round_trip;
mod staleness;

use gred::{parse_patches, scan_file, MultiMatcher, ParseOutcome, PatchGroup};
use std::path::Path;

/// Scan one file and return the output as text.
pub fn scan_to_string(patterns: &[&str], path: &Path) -> String {
    let matcher = MultiMatcher::new(patterns).unwrap();
    let mut out = Vec::new();
    scan_file(&matcher, path, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

/// Replace the content field of every record for `line` in scan output.
///
/// Records are split on `\n` only, so a `\r` in content survives.
pub fn edit_record(output: &str, line: usize, content: &str) -> String {
    let line = line.to_string();
    output
        .split_terminator('\n')
        .map(|record| {
            let mut fields = record.splitn(3, '\t');
            let head = fields.next().unwrap();
            let location = fields.next().unwrap();
            let original = fields.next().unwrap();
            let body = if location.rsplit_once(':').map(|(_, n)| n) == Some(line.as_str()) {
                content
            } else {
                original
            };
            format!("{head}\t{location}\t{body}\n")
        })
        .collect()
}

pub fn groups(input: &str) -> Vec<PatchGroup> {
    match parse_patches(input.as_bytes()).unwrap() {
        ParseOutcome::Patches(groups) => groups,
        ParseOutcome::NoChanges => panic!("expected patches"),
    }
}
