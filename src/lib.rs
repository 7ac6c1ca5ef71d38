//! gred: search files, hand-edit the matches, patch them back.
//!
//! A scan writes every line matched by one or more regular expressions as
//!
//! ```text
//! ╓<fingerprint>\t<path>:<line>\t<content>
//! ║<fingerprint>\t<path>:<line>\t<content>
//! ```
//!
//! The output can be saved, edited in any editor, and fed back in patch mode.
//! Only lines whose content changed are applied, and only if the target line
//! still has the fingerprint captured at scan time.
//!
//! # Architecture
//!
//! - [`matcher`]: multi-pattern matching with deterministic tie-breaks and
//!   incremental cursors.
//! - [`format`]: line expansion and the output line format.
//! - [`scan`]: one file at a time into any [`std::io::Write`].
//! - [`patch`]: parsing edited output into per-file groups and applying them.
//!
//! # Safety
//!
//! - Every edited line is verified against its scan-time fingerprint
//! - Atomic file writes (tempfile + fsync + rename)
//! - Untouched lines are copied byte for byte, including a missing final
//!   newline
//! - A failing file never blocks the others
//!
//! # Example
//!
//! ```no_run
//! use gred::{parse_patches, scan_file, MultiMatcher, ParseOutcome};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let matcher = MultiMatcher::new(["b.*"])?;
//! let mut out = Vec::new();
//! scan_file(&matcher, Path::new("f.txt"), &mut out)?;
//!
//! // ... edit `out` ...
//!
//! if let ParseOutcome::Patches(groups) = parse_patches(out.as_slice())? {
//!     for group in &groups {
//!         let report = group.apply()?;
//!         println!("{} {}", report.path.display(), report.changes.len());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod fingerprint;
pub mod format;
pub mod matcher;
pub mod patch;
pub mod scan;
pub mod walk;

// Re-exports
pub use config::{ConfigError, SearchConfig, Selection};
pub use fingerprint::{Fingerprint, FingerprintError};
pub use format::{line_expand, LineGroup, LineRecord, Marker};
pub use matcher::{Cursor, MatchSession, MultiMatcher, PatternError, Span, Winner};
pub use patch::{
    apply_all, parse_patches, ApplyError, ApplyReport, EditedLine, LineChange, ParseOutcome,
    PatchError, PatchGroup, PatchParser,
};
pub use scan::{scan_buffer, scan_file, ScanError, ScanSummary};
pub use walk::FileWalker;
