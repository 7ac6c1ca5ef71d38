//! File discovery for a scan.

use crate::config::{ConfigError, Selection};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Yields the files a [`Selection`] names, in file-name order.
///
/// Hidden directories are skipped; hidden files are matched like any other.
#[derive(Debug, Clone)]
pub struct FileWalker {
    root: PathBuf,
    /// `None` selects every file.
    globs: Option<GlobSet>,
}

impl FileWalker {
    pub fn new(selection: &Selection) -> Result<Self, ConfigError> {
        match selection {
            Selection::File(path) => Ok(Self {
                root: path.clone(),
                globs: None,
            }),
            Selection::Walk { root, globs } => Ok(Self {
                root: root.clone(),
                globs: Some(build_globset(globs)?),
            }),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the selection. Unreadable entries are yielded as errors so the
    /// caller can report and skip them.
    pub fn files(&self) -> impl Iterator<Item = Result<PathBuf, walkdir::Error>> + '_ {
        WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden_dir(entry))
            .filter_map(move |entry| match entry {
                Ok(entry) if entry.file_type().is_file() && self.selects(&entry) => {
                    Some(Ok(display_path(entry.path())))
                }
                Ok(_) => None,
                Err(err) => Some(Err(err)),
            })
    }

    fn selects(&self, entry: &DirEntry) -> bool {
        match &self.globs {
            None => true,
            Some(globs) => globs.is_match(entry.file_name()),
        }
    }
}

fn build_globset(globs: &[String]) -> Result<GlobSet, ConfigError> {
    let mut builder = GlobSetBuilder::new();
    for glob in globs {
        let compiled = Glob::new(glob).map_err(|source| ConfigError::Glob {
            glob: glob.clone(),
            source,
        })?;
        builder.add(compiled);
    }
    builder.build().map_err(|source| ConfigError::Glob {
        glob: globs.join(","),
        source,
    })
}

fn is_hidden_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

/// `./src/a.rs` is shown as `src/a.rs`.
fn display_path(path: &Path) -> PathBuf {
    path.strip_prefix(".").unwrap_or(path).to_path_buf()
}
