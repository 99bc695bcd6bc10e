//! Command-line interface module for foldersort.
//!
//! This module handles all CLI-related functionality including:
//! - Argument parsing
//! - Configuration loading, overrides and `--init-config`
//! - The organize run: enumerate, classify, move or simulate, report
//! - Confirmation prompt and summary output

use crate::config::{Config, ConfigError, DEFAULT_CONFIG_FILES, InitOutcome, canonical_path};
use crate::file_category::{Classifier, Decision, ExtensionIndex};
use crate::file_organizer::{FileOrganizer, MoveError, is_occupied};
use crate::output::OutputFormatter;
use crate::report::{MoveRecord, Report, ReportWriteError};
use clap::Parser;
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Sort the files of a folder into subfolders by extension.
#[derive(Debug, Clone, Parser)]
#[command(name = "foldersort", version, about, long_about = None)]
pub struct Cli {
    /// Folder to organize
    #[arg(default_value = ".")]
    pub folder: PathBuf,

    /// Configuration file (YAML, or TOML when it ends in .toml)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Show what would be moved without touching any file
    #[arg(long)]
    pub dry_run: bool,

    /// Do not ask for confirmation before moving files
    #[arg(short, long)]
    pub yes: bool,

    /// Create config.yml from config.example.yml and exit
    #[arg(long)]
    pub init_config: bool,

    /// Write the report here instead of the configured report_path
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Keep going when a file cannot be moved
    #[arg(long)]
    pub continue_on_error: bool,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Errors that end a run.
#[derive(Debug, Error)]
pub enum OrganizeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The target folder is missing or not a directory.
    #[error("Folder not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Error reading directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Could not resolve report path: {0}")]
    ReportPath(#[source] io::Error),

    #[error(transparent)]
    Move(#[from] MoveError),

    /// Files were moved but the report is missing.
    #[error("Files were moved but the report could not be written: {0}")]
    Report(#[from] ReportWriteError),

    /// `continue_on_error` was set and some files failed.
    #[error("{0} file(s) could not be moved")]
    Incomplete(usize),
}

/// Per-run switches that are not part of the configuration file.
#[derive(Debug, Clone, Default)]
pub struct OrganizeOptions {
    /// Simulate: no directory creation, no moves, no report.
    pub dry_run: bool,
    /// Skip the confirmation callback.
    pub assume_yes: bool,
    /// The configuration file in use; never moved if it lives in the folder.
    pub config_path: Option<PathBuf>,
}

/// Outcome of an organize run.
#[derive(Debug, Default)]
pub struct Summary {
    /// Absolute path of the organized folder.
    pub folder: PathBuf,
    pub dry_run: bool,
    /// The user declined the confirmation prompt.
    pub cancelled: bool,
    pub processed: usize,
    pub excluded: usize,
    /// Files that failed under `continue_on_error`.
    pub errors: Vec<(PathBuf, MoveError)>,
    /// Processed files per destination folder.
    pub per_folder: BTreeMap<String, usize>,
    /// Where the report was written, if it was.
    pub report_path: Option<PathBuf>,
    /// Every processed file, in processing order.
    pub records: Vec<MoveRecord>,
}

impl Summary {
    fn new(folder: PathBuf, dry_run: bool) -> Self {
        Self {
            folder,
            dry_run,
            ..Default::default()
        }
    }

    pub fn errored(&self) -> usize {
        self.errors.len()
    }
}

/// Runs the CLI with parsed arguments.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use foldersort::cli::{Cli, run_cli};
///
/// let cli = Cli::parse_from(["foldersort", "/home/me/Downloads", "--dry-run"]);
/// if let Err(e) = run_cli(&cli) {
///     eprintln!("Error: {}", e);
/// }
/// ```
pub fn run_cli(cli: &Cli) -> Result<(), OrganizeError> {
    if cli.init_config {
        return init_config(cli.config.as_deref());
    }

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(report) = &cli.report {
        config.report_path = report.clone();
    }
    if cli.continue_on_error {
        config.continue_on_error = true;
    }

    let options = OrganizeOptions {
        dry_run: cli.dry_run,
        assume_yes: cli.yes,
        config_path: Config::locate(cli.config.as_deref()),
    };

    let summary = organize(&cli.folder, &config, &options, prompt_confirmation)?;
    print_summary(&summary);

    if summary.errored() > 0 {
        return Err(OrganizeError::Incomplete(summary.errored()));
    }
    Ok(())
}

/// Organizes the regular files directly inside `folder`.
///
/// Files are processed in name order. Each one is either excluded (left in
/// place, not reported) or assigned a destination folder and moved there;
/// under dry-run the destination is only computed. The report is written
/// once at the end of a real run.
///
/// `confirm` is called with the number of files and the folder before the
/// first move, unless this is a dry-run or `assume_yes` is set. Returning
/// false cancels the run without touching anything.
///
/// If a move fails and `continue_on_error` is off, the records gathered so
/// far are written to the report and the error is returned.
pub fn organize<F>(
    folder: &Path,
    config: &Config,
    options: &OrganizeOptions,
    confirm: F,
) -> Result<Summary, OrganizeError>
where
    F: FnOnce(usize, &Path) -> bool,
{
    let folder = fs::canonicalize(folder)
        .map_err(|_| OrganizeError::NotFound(folder.to_path_buf()))?;
    if !folder.is_dir() {
        return Err(OrganizeError::NotFound(folder));
    }

    let report_path = config
        .resolve_report_path(&folder)
        .map(|path| canonical_path(&path))
        .map_err(OrganizeError::ReportPath)?;

    let mut protected = vec![report_path.clone()];
    if let Some(config_path) = &options.config_path {
        protected.push(canonical_path(config_path));
    }

    let classifier = Classifier::new(
        ExtensionIndex::from_mappings(&config.mappings),
        config.compile_filters(protected)?,
    );

    let files = list_files(&folder)?;
    let mut summary = Summary::new(folder.clone(), options.dry_run);

    if files.is_empty() {
        OutputFormatter::info(&format!("No files to organize in folder: {}", folder.display()));
        return Ok(summary);
    }

    if !options.dry_run && !options.assume_yes && !confirm(files.len(), &folder) {
        summary.cancelled = true;
        return Ok(summary);
    }

    if options.dry_run {
        OutputFormatter::dry_run_notice(&format!(
            "Analyzing {} files in: {}",
            files.len(),
            folder.display()
        ));
    } else {
        OutputFormatter::info(&format!(
            "Organizing {} files in: {}",
            files.len(),
            folder.display()
        ));
    }

    let pb = OutputFormatter::create_progress_bar(files.len() as u64);
    let mut report = Report::new();

    for path in files {
        pb.inc(1);
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        pb.set_message(file_name.clone());

        let folder_name = match classifier.classify(&path) {
            Decision::Excluded => {
                tracing::debug!(file = %file_name, "excluded");
                pb.suspend(|| println!("{}", OutputFormatter::excluded_line(&file_name)));
                summary.excluded += 1;
                continue;
            }
            Decision::Assigned(name) => name,
        };
        let destination_folder = folder.join(&folder_name);

        let record = if options.dry_run {
            let destination = FileOrganizer::plan_destination(
                &path,
                &destination_folder,
                config.rename_on_conflict,
                is_occupied,
            )?;
            let size = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
            MoveRecord::new(path.clone(), destination, size)
        } else {
            match FileOrganizer::safe_move(&path, &destination_folder, config.rename_on_conflict) {
                Ok(destination) => {
                    let size = fs::metadata(&destination).map(|m| m.len()).unwrap_or(0);
                    MoveRecord::new(path.clone(), destination, size)
                }
                Err(e) if config.continue_on_error => {
                    tracing::warn!(file = %path.display(), error = %e, "move failed, continuing");
                    pb.suspend(|| OutputFormatter::error(&e.to_string()));
                    summary.errors.push((path, e));
                    continue;
                }
                Err(e) => {
                    pb.finish_and_clear();
                    tracing::error!(file = %path.display(), error = %e, "move failed, aborting");
                    flush_partial_report(&report, &report_path);
                    return Err(e.into());
                }
            }
        };

        let shown = record
            .destination_path
            .strip_prefix(&folder)
            .unwrap_or(&record.destination_path)
            .display()
            .to_string();
        pb.suspend(|| println!("{}", OutputFormatter::move_line(&file_name, &shown, options.dry_run)));

        *summary.per_folder.entry(folder_name).or_insert(0) += 1;
        summary.processed += 1;
        report.record(record);
    }

    pb.finish_and_clear();

    if options.dry_run {
        OutputFormatter::dry_run_notice("Skipping report write");
    } else {
        report.flush(&report_path)?;
        summary.report_path = Some(report_path);
    }

    summary.records = report.into_records();
    Ok(summary)
}

/// Lists the regular files directly inside `folder`, sorted by name.
///
/// Symlinks, directories and special files are skipped.
fn list_files(folder: &Path) -> Result<Vec<PathBuf>, OrganizeError> {
    let entries = fs::read_dir(folder).map_err(|e| OrganizeError::ReadDir {
        path: folder.to_path_buf(),
        source: e,
    })?;

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
        .map(|entry| entry.path())
        .collect();
    files.sort();
    Ok(files)
}

fn flush_partial_report(report: &Report, report_path: &Path) {
    if report.is_empty() {
        return;
    }
    match report.flush(report_path) {
        Ok(()) => OutputFormatter::warning(&format!(
            "Run aborted; {} completed moves recorded in {}",
            report.len(),
            report_path.display()
        )),
        Err(e) => OutputFormatter::error(&format!(
            "Run aborted and the report of completed moves could not be written: {}",
            e
        )),
    }
}

/// Creates a configuration file without overwriting an existing one.
///
/// The target is the `--config` path if given, else `config.yml`; the source
/// is `config.example.yml` in the working directory or the built-in example.
fn init_config(config_path: Option<&Path>) -> Result<(), OrganizeError> {
    let target = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILES[0]));
    let example = Path::new(DEFAULT_CONFIG_FILES[1]);

    match Config::init_file(&target, example)? {
        InitOutcome::CopiedExample => OutputFormatter::success(&format!(
            "Created {} from {}",
            target.display(),
            example.display()
        )),
        InitOutcome::WroteBuiltin => OutputFormatter::success(&format!(
            "Created {} from the built-in example",
            target.display()
        )),
        InitOutcome::AlreadyExists => OutputFormatter::warning(&format!(
            "{} already exists, not overwriting.",
            target.display()
        )),
    }
    Ok(())
}

/// Asks on stdin whether to proceed. Anything but `y`/`yes` declines.
fn prompt_confirmation(count: usize, folder: &Path) -> bool {
    print!("Move {} files in {}? [y/N] ", count, folder.display());
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    is_yes(&answer)
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn print_summary(summary: &Summary) {
    if summary.cancelled {
        OutputFormatter::warning("Cancelled. No files were moved.");
        return;
    }
    if summary.processed == 0 && summary.excluded == 0 && summary.errors.is_empty() {
        return;
    }

    OutputFormatter::summary_table(&summary.per_folder, summary.processed);

    if summary.excluded > 0 {
        OutputFormatter::info(&format!("Excluded: {}", summary.excluded));
    }
    if !summary.errors.is_empty() {
        OutputFormatter::error(&format!("Failed: {}", summary.errors.len()));
        for (path, error) in &summary.errors {
            eprintln!("    - {}: {}", path.display(), error);
        }
    }

    if let Some(path) = &summary.report_path {
        OutputFormatter::success(&format!("Report generated: {}", path.display()));
    }
    if summary.dry_run {
        OutputFormatter::dry_run_notice(&format!(
            "No files were modified. Run 'foldersort {}' without --dry-run to apply.",
            summary.folder.display()
        ));
    }
}
