//! foldersort - sort the files of a folder into subfolders by extension
//!
//! This library provides extension-based classification driven by a YAML or
//! TOML configuration, conflict-safe moves, dry-run simulation and a CSV
//! report of every file that was moved.

pub mod cli;
pub mod config;
pub mod file_category;
pub mod file_organizer;
pub mod logging;
pub mod output;
pub mod report;

pub use config::{CompiledFilters, Config, ConfigError, ReportBase};
pub use file_category::{Classifier, Decision, ExtensionIndex, classify};
pub use file_organizer::{FileOrganizer, MoveError};
pub use report::{MoveRecord, Report, ReportWriteError};

pub use cli::{Cli, OrganizeError, OrganizeOptions, Summary, organize, run_cli};
