//! Match output framing.
//!
//! Every matched physical line becomes one output line:
//!
//! ```text
//! <marker><fingerprint>\t<path>:<line>\t<content>
//! ```
//!
//! The marker is `╓` for the first record of a file and `║` for the rest, so
//! file boundaries stand out in merged multi-file output. Content is written
//! raw; a TAB inside a path is not supported.

use crate::fingerprint::Fingerprint;
use std::io::{self, Write};
use std::path::Path;

/// Field separator.
pub const SEP: u8 = b'\t';

/// Separator between path and line number inside the location field.
pub const LINE_SEP: char = ':';

/// Leading glyph of an output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// First record emitted for a file.
    First,
    /// Any later record of the same file.
    Next,
}

impl Marker {
    pub const ALL: [Marker; 2] = [Marker::First, Marker::Next];

    pub const fn glyph(self) -> char {
        match self {
            Marker::First => '╓',
            Marker::Next => '║',
        }
    }

    /// Split a recognised marker off the front of `line`.
    pub fn strip(line: &[u8]) -> Option<(Marker, &[u8])> {
        Self::ALL.into_iter().find_map(|marker| {
            let mut buf = [0u8; 4];
            let glyph = marker.glyph().encode_utf8(&mut buf);
            line.strip_prefix(glyph.as_bytes())
                .map(|rest| (marker, rest))
        })
    }
}

/// Expand a byte span to the full line(s) containing it.
///
/// `line_start` is just past the newline preceding `start` (or 0) and
/// `line_end` is the offset of the first newline at or after the span's last
/// byte (or `buf.len()`). A span ending in a newline does not reach into the
/// next line. Requires `start <= end <= buf.len()`.
pub fn line_expand(start: usize, end: usize, buf: &[u8]) -> (usize, usize) {
    let line_start = buf[..start]
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |i| i + 1);

    let tail = if end > start && buf[end - 1] == b'\n' {
        end - 1
    } else {
        end
    };
    let line_end = buf[tail..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(buf.len(), |i| tail + i);

    (line_start, line_end)
}

pub(crate) fn count_newlines(buf: &[u8]) -> usize {
    buf.iter().filter(|&&b| b == b'\n').count()
}

/// Full lines covered by one winning match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineGroup<'b> {
    /// 1-indexed number of the first line in the group.
    pub first_line: usize,
    /// Absolute byte offset of the group in the scanned buffer.
    pub offset: usize,
    /// The lines, without the final newline.
    pub bytes: &'b [u8],
}

impl<'b> LineGroup<'b> {
    /// Physical lines of the group with their line numbers.
    pub fn lines(&self) -> impl Iterator<Item = (usize, &'b [u8])> + 'b {
        let (first_line, bytes) = (self.first_line, self.bytes);
        bytes
            .split(|&b| b == b'\n')
            .enumerate()
            .map(move |(i, line)| (first_line + i, line))
    }

    /// Records for every physical line, each with its own fingerprint.
    pub fn records<'a>(&'a self, path: &'a Path) -> impl Iterator<Item = LineRecord<'a, 'b>> + 'a {
        self.lines()
            .map(move |(line_number, content)| LineRecord::new(path, line_number, content))
    }
}

/// One annotated output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRecord<'p, 'c> {
    pub path: &'p Path,
    pub line_number: usize,
    pub fingerprint: Fingerprint,
    pub content: &'c [u8],
}

impl<'p, 'c> LineRecord<'p, 'c> {
    pub fn new(path: &'p Path, line_number: usize, content: &'c [u8]) -> Self {
        Self {
            path,
            line_number,
            fingerprint: Fingerprint::of(content),
            content,
        }
    }

    /// Write the record, newline included.
    pub fn write_to<W: Write + ?Sized>(&self, marker: Marker, out: &mut W) -> io::Result<()> {
        let mut glyph = [0u8; 4];
        out.write_all(marker.glyph().encode_utf8(&mut glyph).as_bytes())?;
        out.write_all(&self.fingerprint.encode())?;
        out.write_all(&[SEP])?;
        write!(
            out,
            "{}{}{}",
            self.path.to_string_lossy(),
            LINE_SEP,
            self.line_number
        )?;
        out.write_all(&[SEP])?;
        out.write_all(self.content)?;
        out.write_all(b"\n")
    }
}
