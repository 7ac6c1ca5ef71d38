//! Patch pass: parse edited scan output and apply it file by file.
//!
//! Parsing is all-or-nothing: a structural error in the input aborts before
//! any file is opened. Application is isolated per file: a stale or short
//! file fails on its own and the remaining groups are still applied.

pub mod applier;
pub mod errors;
pub mod parser;

pub use applier::{ApplyReport, LineChange};
pub use errors::{ApplyError, PatchError};
pub use parser::{
    parse_patches, EditedLine, FramedLine, LineOutcome, ParseOutcome, PatchGroup, PatchParser,
};

use std::path::PathBuf;
use tracing::debug;

/// Apply (or, with `dry_run`, only verify) every group in order.
///
/// Returns one result per group, in input order.
pub fn apply_all(
    groups: &[PatchGroup],
    dry_run: bool,
) -> Vec<(PathBuf, Result<ApplyReport, ApplyError>)> {
    groups
        .iter()
        .map(|group| {
            let result = if dry_run {
                group.check()
            } else {
                group.apply()
            };
            if let Err(err) = &result {
                debug!(path = %group.path.display(), error = %err, "patch group failed");
            }
            (group.path.clone(), result)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::Fingerprint;
    use std::fs;

    #[test]
    fn one_failing_file_does_not_block_others() {
        let dir = tempfile::tempdir().unwrap();
        let stale = dir.path().join("stale.txt");
        let fresh = dir.path().join("fresh.txt");
        fs::write(&stale, "changed\n").unwrap();
        fs::write(&fresh, "keep\n").unwrap();

        let groups = vec![
            PatchGroup {
                path: stale.clone(),
                lines: vec![EditedLine {
                    line_number: 1,
                    fingerprint: Fingerprint::of(b"original"),
                    content: b"new".to_vec(),
                }],
            },
            PatchGroup {
                path: fresh.clone(),
                lines: vec![EditedLine {
                    line_number: 1,
                    fingerprint: Fingerprint::of(b"keep"),
                    content: b"kept".to_vec(),
                }],
            },
        ];

        let results = apply_all(&groups, false);
        assert!(matches!(
            results[0].1,
            Err(ApplyError::StaleFingerprint { .. })
        ));
        assert!(results[1].1.is_ok());
        assert_eq!(fs::read_to_string(&stale).unwrap(), "changed\n");
        assert_eq!(fs::read_to_string(&fresh).unwrap(), "kept\n");
    }

    #[test]
    fn dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        fs::write(&path, "a\n").unwrap();

        let groups = vec![PatchGroup {
            path: path.clone(),
            lines: vec![EditedLine {
                line_number: 1,
                fingerprint: Fingerprint::of(b"a"),
                content: b"b".to_vec(),
            }],
        }];

        let results = apply_all(&groups, true);
        let report = results[0].1.as_ref().unwrap();
        assert!(!report.committed);
        assert_eq!(fs::read_to_string(&path).unwrap(), "a\n");
    }
}
