use anyhow::Result;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use colored::Colorize;
use gred::config::{ConfigError, SearchConfig, Selection, LOG_ENV};
use gred::patch::{apply_all, parse_patches, ApplyReport, ParseOutcome};
use gred::scan::{scan_file, ScanError};
use gred::walk::FileWalker;
use std::io::{self, BufWriter, Write};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gred")]
#[command(
    about = "Search files with regular expressions, edit the matches, patch them back",
    long_about = None
)]
#[command(version)]
#[command(after_help = "\
Search:
  GRED='*.rs' gred 'fn \\w+'        search files whose name matches a glob
  GRED=./path/to/file gred -- -p   search one file for \"-p\"
  GREDX=.rs.toml gred foo          search *.rs and *.toml files
  GREDX=. gred foo bar             search every file for foo or bar

Patch:
  GREDX=.rs gred foobar > gred.out
  vim gred.out
  gred -p < gred.out")]
struct Cli {
    /// Patch mode: read edited gred output from stdin and apply it
    #[arg(short, long)]
    patch: bool,

    /// Verify patches without modifying any file
    #[arg(short = 'n', long, requires = "patch")]
    dry_run: bool,

    /// Show the before and after text of every patched line
    #[arg(short, long, requires = "patch")]
    diff: bool,

    /// File, directory, or file-name glob to search (overrides GRED)
    #[arg(short, long, value_name = "PATH|GLOB")]
    files: Option<String>,

    /// Dotted extension list to search, e.g. .rs.toml (overrides GREDX)
    #[arg(short = 'x', long, value_name = ".EXT")]
    ext: Option<String>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Regular expressions to search for
    #[arg(value_name = "PATTERN", conflicts_with = "patch")]
    patterns: Vec<String>,
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let result = if cli.patch {
        cmd_patch(cli.dry_run, cli.diff)
    } else {
        cmd_scan(&cli)
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {:#}", "error:".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn warn(message: impl std::fmt::Display) {
    eprintln!("{} {}", "warning:".yellow().bold(), message);
}

/// Exit with a usage error (status 2).
fn usage(kind: ErrorKind, message: impl std::fmt::Display) -> ! {
    Cli::command().error(kind, message).exit()
}

fn cmd_scan(cli: &Cli) -> Result<ExitCode> {
    if cli.patterns.is_empty() {
        usage(
            ErrorKind::MissingRequiredArgument,
            "at least one PATTERN is required unless --patch is given",
        );
    }

    let selection = match Selection::resolve(cli.files.as_deref(), cli.ext.as_deref()) {
        Ok(selection) => selection,
        Err(err @ (ConfigError::NoSelection | ConfigError::InvalidExtensions { .. })) => {
            usage(ErrorKind::ValueValidation, err)
        }
        Err(err) => return Err(err.into()),
    };

    // Patterns and globs are validated before any output.
    let config = SearchConfig::new(&cli.patterns, selection)?;
    let walker = FileWalker::new(&config.selection)?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut files = 0;
    let mut lines = 0;

    for path in walker.files() {
        let path = match path {
            Ok(path) => path,
            Err(err) => {
                warn(err);
                continue;
            }
        };

        match scan_file(&config.matcher, &path, &mut out) {
            Ok(summary) => {
                files += usize::from(!summary.is_empty());
                lines += summary.lines;
            }
            Err(err @ ScanError::Read { .. }) => warn(err),
            Err(err) => return Err(err.into()),
        }
    }

    out.flush()?;
    tracing::debug!(files, lines, "scan finished");
    Ok(ExitCode::SUCCESS)
}

fn cmd_patch(dry_run: bool, show_diff: bool) -> Result<ExitCode> {
    let stdin = io::stdin();
    let groups = match parse_patches(stdin.lock())? {
        ParseOutcome::NoChanges => {
            warn("stdin patches included no changes and were ignored");
            return Ok(ExitCode::SUCCESS);
        }
        ParseOutcome::Patches(groups) => groups,
    };

    if dry_run {
        println!("{}", "DRY RUN - verifying patches without writing".yellow());
    }

    let mut failed = 0;
    for (path, result) in apply_all(&groups, dry_run) {
        match result {
            Ok(report) => {
                println!("{} {}", path.display(), report.changes.len());
                if show_diff {
                    display_changes(&report);
                }
            }
            Err(err) => {
                warn(err);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        eprintln!(
            "{}",
            format!("{failed} of {} files were not patched", groups.len()).red()
        );
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Helper: Show the replaced lines of one file
fn display_changes(report: &ApplyReport) {
    for change in &report.changes {
        println!(
            "{}",
            format!("@@ {}:{}", report.path.display(), change.line).dimmed()
        );
        println!(
            "{}",
            format!("-{}", String::from_utf8_lossy(&change.before)).red()
        );
        println!(
            "{}",
            format!("+{}", String::from_utf8_lossy(&change.after)).green()
        );
    }
}
