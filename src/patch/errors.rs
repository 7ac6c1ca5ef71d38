use crate::fingerprint::FingerprintError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors while reading patch input. Any of these aborts the whole patch
/// pass before a file is touched. `line` is the 1-indexed line of the patch
/// input, not of a target file.
#[derive(Error, Debug)]
pub enum PatchError {
    #[error("malformed patch line {line} ({reason}): {text}")]
    MalformedLine {
        line: usize,
        reason: &'static str,
        text: String,
    },

    #[error("malformed fingerprint on patch line {line}: {source}: {text}")]
    MalformedFingerprint {
        line: usize,
        text: String,
        #[source]
        source: FingerprintError,
    },

    #[error("file lines must be grouped by file: {path} reappears at patch line {line}")]
    DuplicatePathGroup { line: usize, path: PathBuf },

    #[error("patch line {line} edits {path}:{target} a second time")]
    DuplicateLine {
        line: usize,
        path: PathBuf,
        target: usize,
    },

    #[error("failed to read patch input: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors applying one patch group. These only abort that file; the
/// original is left unmodified.
#[derive(Error, Debug)]
pub enum ApplyError {
    #[error("{path}: file modified since scan at line {line}")]
    StaleFingerprint { path: PathBuf, line: usize },

    #[error("{path}: unexpected end of file before line {line}")]
    UnexpectedEof { path: PathBuf, line: usize },

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ApplyError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            ApplyError::StaleFingerprint { path, .. }
            | ApplyError::UnexpectedEof { path, .. }
            | ApplyError::Io { path, .. } => path,
        }
    }
}
