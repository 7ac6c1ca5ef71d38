//! Scan pass: match one file at a time and write annotated records.

use crate::format::Marker;
use crate::matcher::MultiMatcher;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write scan output: {0}")]
    Write(#[source] io::Error),
}

/// Counts for one scanned buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Winning matches.
    pub groups: usize,
    /// Records written.
    pub lines: usize,
}

impl ScanSummary {
    pub fn is_empty(&self) -> bool {
        self.lines == 0
    }
}

/// Match `buf` and write one record per matched line to `out`.
///
/// The first record is marked [`Marker::First`]; every later one
/// [`Marker::Next`].
pub fn scan_buffer<W: Write + ?Sized>(
    matcher: &MultiMatcher,
    path: &Path,
    buf: &[u8],
    out: &mut W,
) -> Result<ScanSummary, ScanError> {
    let mut summary = ScanSummary::default();

    for group in matcher.session(buf) {
        summary.groups += 1;
        for record in group.records(path) {
            let marker = if summary.lines == 0 {
                Marker::First
            } else {
                Marker::Next
            };
            record.write_to(marker, out).map_err(ScanError::Write)?;
            summary.lines += 1;
        }
    }

    Ok(summary)
}

/// Read `path` whole and scan it.
pub fn scan_file<W: Write + ?Sized>(
    matcher: &MultiMatcher,
    path: &Path,
    out: &mut W,
) -> Result<ScanSummary, ScanError> {
    let buf = fs::read(path).map_err(|source| ScanError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let summary = scan_buffer(matcher, path, &buf, out)?;
    debug!(
        path = %path.display(),
        bytes = buf.len(),
        groups = summary.groups,
        lines = summary.lines,
        "scanned file"
    );
    Ok(summary)
}
