use crate::config::ConfigError;
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable naming a file, directory, or file-name glob.
pub const FILES_ENV: &str = "GRED";

/// Environment variable holding a dotted extension list such as `.rs.toml`.
pub const EXT_ENV: &str = "GREDX";

/// Which files a scan reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// A single file.
    File(PathBuf),
    /// Files under `root` whose name matches any of `globs`.
    Walk { root: PathBuf, globs: Vec<String> },
}

impl Selection {
    /// Resolve the selection from flags, falling back to the environment.
    ///
    /// Priority order:
    /// 1. `files` flag
    /// 2. `ext` flag
    /// 3. `GRED` environment variable
    /// 4. `GREDX` environment variable
    pub fn resolve(files: Option<&str>, ext: Option<&str>) -> Result<Self, ConfigError> {
        if files.is_some() || ext.is_some() {
            return Self::from_values(files, ext);
        }

        let files_env = non_empty_env(FILES_ENV);
        let ext_env = non_empty_env(EXT_ENV);
        Self::from_values(files_env.as_deref(), ext_env.as_deref())
    }

    /// Build a selection from explicit values; `files` wins over `ext`.
    pub fn from_values(files: Option<&str>, ext: Option<&str>) -> Result<Self, ConfigError> {
        match (files, ext) {
            (Some(target), _) => Ok(Self::from_target(target)),
            (None, Some(dotted)) => {
                let globs = dot_globs(dotted).ok_or_else(|| ConfigError::InvalidExtensions {
                    value: dotted.to_string(),
                })?;
                Ok(Self::Walk {
                    root: PathBuf::from("."),
                    globs,
                })
            }
            (None, None) => Err(ConfigError::NoSelection),
        }
    }

    /// An existing file is scanned alone, an existing directory is walked
    /// whole, anything else is a file-name glob under `.`.
    pub fn from_target(target: &str) -> Self {
        let path = Path::new(target);
        match path.symlink_metadata() {
            Ok(meta) if meta.is_dir() => Self::Walk {
                root: path.to_path_buf(),
                globs: vec!["*".to_string()],
            },
            Ok(_) => Self::File(path.to_path_buf()),
            Err(_) => Self::Walk {
                root: PathBuf::from("."),
                globs: vec![target.to_string()],
            },
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Turn `.rs.toml` into `["*.rs", "*.toml"]`; `.` alone selects everything.
///
/// Returns `None` when the value does not start with `.` or names no
/// extension.
pub fn dot_globs(dotted: &str) -> Option<Vec<String>> {
    let dotted = dotted.trim();
    if dotted == "." {
        return Some(vec!["*".to_string()]);
    }
    let rest = dotted.strip_prefix('.')?;

    let globs: Vec<String> = rest
        .split('.')
        .map(str::trim)
        .filter(|ext| !ext.is_empty())
        .map(|ext| format!("*.{ext}"))
        .collect();

    if globs.is_empty() {
        None
    } else {
        Some(globs)
    }
}
