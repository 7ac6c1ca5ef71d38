//! Search configuration: compiled patterns plus the file selection.

pub mod selection;

pub use selection::{dot_globs, Selection, EXT_ENV, FILES_ENV};

use crate::matcher::{MultiMatcher, PatternError};
use thiserror::Error;

/// Environment variable holding the tracing filter for the binary.
pub const LOG_ENV: &str = "GRED_LOG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no search pattern given")]
    NoPatterns,

    #[error("no files selected: set GRED or GREDX, or pass --files or --ext")]
    NoSelection,

    #[error("invalid extension list {value:?}: expected a dotted list such as .rs.toml")]
    InvalidExtensions { value: String },

    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error("invalid file glob {glob:?}: {source}")]
    Glob {
        glob: String,
        #[source]
        source: globset::Error,
    },
}

/// Everything a scan pass needs, validated up front.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub matcher: MultiMatcher,
    pub selection: Selection,
}

impl SearchConfig {
    /// Compile every pattern before anything is read, so a bad pattern
    /// aborts the run without output.
    pub fn new<S: AsRef<str>>(patterns: &[S], selection: Selection) -> Result<Self, ConfigError> {
        if patterns.is_empty() {
            return Err(ConfigError::NoPatterns);
        }
        let matcher = MultiMatcher::new(patterns)?;
        Ok(Self { matcher, selection })
    }
}
