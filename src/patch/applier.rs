//! Streaming application of a [`PatchGroup`] to its target file.
//!
//! The original is copied line by line into a temp file in the same
//! directory. Each target line is verified against its captured fingerprint
//! before the replacement is written. Only a fully written, synced temp file
//! is renamed over the original; on any error the temp file is dropped and
//! removed, and the original is untouched.

use crate::patch::errors::ApplyError;
use crate::patch::parser::PatchGroup;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One replaced line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineChange {
    pub line: usize,
    pub before: Vec<u8>,
    pub after: Vec<u8>,
}

/// Outcome of applying (or checking) one group.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "ApplyReport lists the lines that were replaced"]
pub struct ApplyReport {
    pub path: PathBuf,
    pub changes: Vec<LineChange>,
    /// Whether the file was rewritten, as opposed to only checked.
    pub committed: bool,
}

impl PatchGroup {
    /// Apply every edit and atomically replace the file.
    pub fn apply(&self) -> Result<ApplyReport, ApplyError> {
        let original = File::open(&self.path).map_err(|e| self.io_error(e))?;
        let permissions = original
            .metadata()
            .map_err(|e| self.io_error(e))?
            .permissions();

        let mut temp = tempfile::Builder::new()
            .prefix(&self.temp_prefix())
            .tempfile_in(parent_dir(&self.path))
            .map_err(|e| self.io_error(e))?;
        debug!(path = %self.path.display(), temp = %temp.path().display(), "created temp file");

        let changes = {
            let mut writer = BufWriter::new(temp.as_file_mut());
            self.pipe(BufReader::new(original), &mut writer)?
        };

        let file = temp.as_file();
        file.set_permissions(permissions)
            .map_err(|e| self.io_error(e))?;
        file.sync_all().map_err(|e| self.io_error(e))?;
        temp.persist(&self.path)
            .map_err(|e| self.io_error(e.error))?;

        info!(path = %self.path.display(), lines = changes.len(), "patched file");
        Ok(ApplyReport {
            path: self.path.clone(),
            changes,
            committed: true,
        })
    }

    /// Verify every edit against the file without writing anything.
    pub fn check(&self) -> Result<ApplyReport, ApplyError> {
        let original = File::open(&self.path).map_err(|e| self.io_error(e))?;
        let changes = self.pipe(BufReader::new(original), io::sink())?;
        Ok(ApplyReport {
            path: self.path.clone(),
            changes,
            committed: false,
        })
    }

    /// Copy `reader` to `writer`, replacing the edited lines.
    ///
    /// Lines are copied verbatim, including a missing final newline. An
    /// edited final line without newline is written without one.
    pub fn pipe<R: BufRead, W: Write>(
        &self,
        mut reader: R,
        mut writer: W,
    ) -> Result<Vec<LineChange>, ApplyError> {
        let mut changes = Vec::with_capacity(self.lines.len());
        let mut line = Vec::new();
        let mut lineno = 1;

        for edit in &self.lines {
            while lineno < edit.line_number {
                line.clear();
                reader
                    .read_until(b'\n', &mut line)
                    .map_err(|e| self.io_error(e))?;
                if line.last() != Some(&b'\n') {
                    return Err(self.eof(edit.line_number));
                }
                writer.write_all(&line).map_err(|e| self.io_error(e))?;
                lineno += 1;
            }

            line.clear();
            let read = reader
                .read_until(b'\n', &mut line)
                .map_err(|e| self.io_error(e))?;
            if read == 0 {
                return Err(self.eof(edit.line_number));
            }
            let terminated = line.last() == Some(&b'\n');
            let current = if terminated {
                &line[..line.len() - 1]
            } else {
                &line[..]
            };

            if !edit.fingerprint.matches(current) {
                return Err(ApplyError::StaleFingerprint {
                    path: self.path.clone(),
                    line: edit.line_number,
                });
            }

            writer
                .write_all(&edit.content)
                .map_err(|e| self.io_error(e))?;
            if terminated {
                writer.write_all(b"\n").map_err(|e| self.io_error(e))?;
            }
            changes.push(LineChange {
                line: edit.line_number,
                before: current.to_vec(),
                after: edit.content.clone(),
            });
            lineno += 1;
        }

        io::copy(&mut reader, &mut writer).map_err(|e| self.io_error(e))?;
        writer.flush().map_err(|e| self.io_error(e))?;
        Ok(changes)
    }

    fn temp_prefix(&self) -> String {
        let name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!(".{name}.")
    }

    fn io_error(&self, source: io::Error) -> ApplyError {
        ApplyError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn eof(&self, line: usize) -> ApplyError {
        ApplyError::UnexpectedEof {
            path: self.path.clone(),
            line,
        }
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
