//! Decoding edited scan output into per-file patch groups.
//!
//! Input lines use the scan output format. Lines are grouped by path in
//! stream order; a path may only form one contiguous block. A line whose
//! content still hashes to its captured fingerprint was not edited and is
//! dropped. Every other line becomes an [`EditedLine`] that carries the
//! captured fingerprint, which the applier checks against the live file.

use crate::fingerprint::{Fingerprint, TAG_LEN};
use crate::format::{Marker, LINE_SEP, SEP};
use crate::patch::errors::PatchError;
use std::collections::HashSet;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One edited line destined for a target file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditedLine {
    /// 1-indexed line in the target file.
    pub line_number: usize,
    /// Fingerprint of the line at scan time.
    pub fingerprint: Fingerprint,
    /// Replacement content, without newline.
    pub content: Vec<u8>,
}

/// All edits for one file, sorted by line number, no line twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchGroup {
    pub path: PathBuf,
    pub lines: Vec<EditedLine>,
}

/// Result of parsing a whole patch stream.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "ParseOutcome distinguishes an empty patch from real edits"]
pub enum ParseOutcome {
    /// No line differed from its scan; nothing to apply.
    NoChanges,
    /// At least one group with at least one edit.
    Patches(Vec<PatchGroup>),
}

/// Result of decoding a single input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Edited(EditedLine),
    Unchanged,
}

/// Fields of one framed input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramedLine<'a> {
    pub marker: Marker,
    pub fingerprint: &'a [u8],
    pub path: &'a str,
    pub line_number: usize,
    pub content: &'a [u8],
}

impl<'a> FramedLine<'a> {
    /// Split `line` (newline already stripped) into its fields.
    ///
    /// The location field runs to the second TAB; its last `:` separates
    /// path and line number, so paths may contain `:`.
    pub fn parse(line: &'a [u8], input_line: usize) -> Result<Self, PatchError> {
        let malformed = |reason| PatchError::MalformedLine {
            line: input_line,
            reason,
            text: String::from_utf8_lossy(line).into_owned(),
        };

        let (marker, rest) = Marker::strip(line).ok_or_else(|| malformed("unknown marker"))?;
        if rest.len() <= TAG_LEN || rest[TAG_LEN] != SEP {
            return Err(malformed("expected fingerprint followed by TAB"));
        }
        let (fingerprint, rest) = (&rest[..TAG_LEN], &rest[TAG_LEN + 1..]);

        let sep = rest
            .iter()
            .position(|&b| b == SEP)
            .ok_or_else(|| malformed("expected TAB after path:line"))?;
        let (location, content) = (&rest[..sep], &rest[sep + 1..]);

        let location =
            std::str::from_utf8(location).map_err(|_| malformed("path is not valid UTF-8"))?;
        let (path, number) = location
            .rsplit_once(LINE_SEP)
            .ok_or_else(|| malformed("expected path:line"))?;
        if path.is_empty() {
            return Err(malformed("empty path"));
        }
        if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed("line number is not a decimal number"));
        }
        let line_number = number
            .parse::<usize>()
            .map_err(|_| malformed("line number out of range"))?;
        if line_number == 0 {
            return Err(malformed("line numbers start at 1"));
        }

        Ok(Self {
            marker,
            fingerprint,
            path,
            line_number,
            content,
        })
    }

    /// Decode the fingerprint and decide whether the line was edited.
    pub fn outcome(&self, input_line: usize) -> Result<LineOutcome, PatchError> {
        let fingerprint = Fingerprint::decode(self.fingerprint).map_err(|source| {
            PatchError::MalformedFingerprint {
                line: input_line,
                text: String::from_utf8_lossy(self.fingerprint).into_owned(),
                source,
            }
        })?;

        if fingerprint.matches(self.content) {
            return Ok(LineOutcome::Unchanged);
        }

        Ok(LineOutcome::Edited(EditedLine {
            line_number: self.line_number,
            fingerprint,
            content: self.content.to_vec(),
        }))
    }
}

#[derive(Debug)]
struct PendingGroup {
    path: PathBuf,
    lines: Vec<EditedLine>,
    targets: HashSet<usize>,
}

impl PendingGroup {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            lines: Vec::new(),
            targets: HashSet::new(),
        }
    }

    fn finish(mut self) -> Option<PatchGroup> {
        if self.lines.is_empty() {
            debug!(path = %self.path.display(), "group has no edits");
            return None;
        }
        self.lines.sort_by_key(|line| line.line_number);
        debug!(path = %self.path.display(), edits = self.lines.len(), "parsed group");
        Some(PatchGroup {
            path: self.path,
            lines: self.lines,
        })
    }
}

/// Incremental patch stream parser.
///
/// The set of paths already seen belongs to the parser, so independent
/// parses never affect each other.
#[derive(Debug, Default)]
pub struct PatchParser {
    seen: HashSet<PathBuf>,
    current: Option<PendingGroup>,
    groups: Vec<PatchGroup>,
    input_line: usize,
}

impl PatchParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of input lines consumed so far.
    pub fn lines_read(&self) -> usize {
        self.input_line
    }

    /// Feed one input line, with or without its trailing `\n`.
    pub fn push(&mut self, line: &[u8]) -> Result<(), PatchError> {
        self.input_line += 1;
        let input_line = self.input_line;
        let line = line.strip_suffix(b"\n").unwrap_or(line);

        let framed = FramedLine::parse(line, input_line)?;
        let path = Path::new(framed.path);

        if self.current.as_ref().map(|group| group.path.as_path()) != Some(path) {
            if !self.seen.insert(path.to_path_buf()) {
                return Err(PatchError::DuplicatePathGroup {
                    line: input_line,
                    path: path.to_path_buf(),
                });
            }
            if let Some(done) = self.current.take().and_then(PendingGroup::finish) {
                self.groups.push(done);
            }
        }
        let group = self
            .current
            .get_or_insert_with(|| PendingGroup::new(path.to_path_buf()));

        if let LineOutcome::Edited(edit) = framed.outcome(input_line)? {
            if !group.targets.insert(edit.line_number) {
                return Err(PatchError::DuplicateLine {
                    line: input_line,
                    path: group.path.clone(),
                    target: edit.line_number,
                });
            }
            group.lines.push(edit);
        }

        Ok(())
    }

    /// Close the last group and return every group with edits.
    pub fn finish(mut self) -> ParseOutcome {
        if let Some(done) = self.current.take().and_then(PendingGroup::finish) {
            self.groups.push(done);
        }
        if self.groups.is_empty() {
            ParseOutcome::NoChanges
        } else {
            ParseOutcome::Patches(self.groups)
        }
    }
}

/// Parse a whole patch stream.
pub fn parse_patches<R: BufRead>(mut reader: R) -> Result<ParseOutcome, PatchError> {
    let mut parser = PatchParser::new();
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        parser.push(&line)?;
    }
    debug!(lines = parser.lines_read(), "read patch input");
    Ok(parser.finish())
}
