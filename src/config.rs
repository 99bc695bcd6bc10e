//! Sorting configuration: extension mappings, conflict policy, exclusions and
//! report location.
//!
//! Configuration is read from a YAML document (or TOML when the file name ends
//! in `.toml`) with the following structure:
//!
//! ```yaml
//! mappings:
//!   Images: [".jpg", ".png"]
//!   Documents: [".pdf", ".txt"]
//! rename_on_conflict: true
//! exclude_patterns: ["*.part", "desktop.ini"]
//! exclude_regex: []
//! report_path: sorting_report.csv
//! report_relative_to: cwd
//! continue_on_error: false
//! ```
//!
//! Every key is optional. A missing file yields the default configuration, in
//! which every file is sorted into `Others`.

use glob::Pattern;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File names searched for in the working directory, in order.
pub const DEFAULT_CONFIG_FILES: [&str; 2] = ["config.yml", "config.example.yml"];

/// Default report file name.
pub const DEFAULT_REPORT_PATH: &str = "sorting_report.csv";

/// Commented example configuration written by `--init-config` when no
/// `config.example.yml` is available to copy.
pub const EXAMPLE_CONFIG: &str = include_str!("../config.example.yml");

/// Errors that can occur while loading or compiling a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found at an explicitly given path.
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    /// The document could not be parsed into a configuration.
    #[error("Invalid configuration in {}: {reason}", path.display())]
    ConfigInvalid { path: PathBuf, reason: String },

    /// An exclusion glob does not compile.
    #[error("Invalid glob pattern '{pattern}': {reason}")]
    InvalidGlobPattern { pattern: String, reason: String },

    /// An exclusion regex does not compile.
    #[error("Invalid regex pattern '{pattern}': {reason}")]
    InvalidRegexPattern { pattern: String, reason: String },

    /// Reading or writing a configuration file failed.
    #[error("IO error on configuration file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Resolves symlinks and `..` in `path` so protected files compare equal to
/// the paths listed from the target folder.
///
/// A path that does not exist yet is resolved through its parent; if that
/// fails too, the absolute form is returned as is.
pub fn canonical_path(path: &Path) -> PathBuf {
    if let Ok(canonical) = fs::canonicalize(path) {
        return canonical;
    }
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let resolved = match (absolute.parent(), absolute.file_name()) {
        (Some(parent), Some(name)) => fs::canonicalize(parent).ok().map(|p| p.join(name)),
        _ => None,
    };
    resolved.unwrap_or(absolute)
}

/// Base directory a relative `report_path` is resolved against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportBase {
    /// The working directory of the process.
    #[default]
    Cwd,
    /// The folder being organized.
    Folder,
}

/// User-editable sorting configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Destination folder name to the extensions sorted into it.
    pub mappings: BTreeMap<String, Vec<String>>,

    /// Append `_1`, `_2`, ... on collision instead of overwriting.
    pub rename_on_conflict: bool,

    /// Shell-style globs matched against the full path and the bare file name.
    pub exclude_patterns: Vec<String>,

    /// Regular expressions matched against the bare file name.
    pub exclude_regex: Vec<String>,

    /// Where the CSV report is written.
    pub report_path: PathBuf,

    /// What a relative `report_path` is relative to.
    pub report_relative_to: ReportBase,

    /// Keep going after a failed move instead of aborting the run.
    pub continue_on_error: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mappings: BTreeMap::new(),
            rename_on_conflict: true,
            exclude_patterns: Vec::new(),
            exclude_regex: Vec::new(),
            report_path: PathBuf::from(DEFAULT_REPORT_PATH),
            report_relative_to: ReportBase::Cwd,
            continue_on_error: false,
        }
    }
}

/// Result of `Config::init_file`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// The example file was copied into place.
    CopiedExample,
    /// No example file existed; the built-in example was written.
    WroteBuiltin,
    /// A configuration already exists and was left alone.
    AlreadyExists,
}

impl Config {
    /// Finds the configuration file to use.
    ///
    /// An explicit path always wins, even if it does not exist (loading it
    /// then reports `ConfigNotFound`). Otherwise the working directory is
    /// searched for `config.yml` and `config.example.yml`, then
    /// `~/.config/foldersort/config.yml`.
    pub fn locate(config_path: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = config_path {
            return Some(path.to_path_buf());
        }

        if let Some(local) = DEFAULT_CONFIG_FILES
            .iter()
            .map(PathBuf::from)
            .find(|candidate| candidate.is_file())
        {
            return Some(local);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("foldersort")
                .join("config.yml");
            if home_config.is_file() {
                return Some(home_config);
            }
        }

        None
    }

    /// Loads the configuration, falling back to defaults when no file is found.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly given file is missing, or if the file
    /// that was found cannot be read or parsed.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        match Self::locate(config_path) {
            Some(path) => Self::load_from_file(&path),
            None => {
                tracing::debug!("no configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Loads the configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        let config = if is_toml {
            Self::from_toml_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
        .map_err(|reason| ConfigError::ConfigInvalid {
            path: path.to_path_buf(),
            reason,
        })?;

        tracing::info!(path = %path.display(), folders = config.mappings.len(), "loaded configuration");
        Ok(config)
    }

    /// Parses a YAML document. An empty document is the default configuration.
    pub fn from_yaml_str(content: &str) -> Result<Self, String> {
        let value: serde_yaml::Value = serde_yaml::from_str(content).map_err(|e| e.to_string())?;
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_yaml::from_value(value).map_err(|e| e.to_string())
    }

    /// Parses a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Resolves `report_path` to an absolute path for a run over `folder`.
    pub fn resolve_report_path(&self, folder: &Path) -> io::Result<PathBuf> {
        if self.report_path.is_absolute() {
            return Ok(self.report_path.clone());
        }
        let base = match self.report_relative_to {
            ReportBase::Cwd => std::env::current_dir()?,
            ReportBase::Folder => folder.to_path_buf(),
        };
        std::path::absolute(base.join(&self.report_path))
    }

    /// Compiles the exclusion rules.
    ///
    /// `protected` lists absolute paths that are always excluded, such as the
    /// report file and the configuration file itself.
    ///
    /// # Errors
    ///
    /// Returns an error if any glob or regex pattern is invalid.
    pub fn compile_filters(&self, protected: Vec<PathBuf>) -> Result<CompiledFilters, ConfigError> {
        CompiledFilters::new(&self.exclude_patterns, &self.exclude_regex, protected)
    }

    /// Creates a configuration file at `target` from `example`, never
    /// overwriting an existing file.
    pub fn init_file(target: &Path, example: &Path) -> Result<InitOutcome, ConfigError> {
        if target.exists() {
            return Ok(InitOutcome::AlreadyExists);
        }

        let io_err = |source: io::Error| ConfigError::Io {
            path: target.to_path_buf(),
            source,
        };

        if let Some(parent) = target.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        if example.is_file() {
            fs::copy(example, target).map_err(io_err)?;
            Ok(InitOutcome::CopiedExample)
        } else {
            fs::write(target, EXAMPLE_CONFIG).map_err(io_err)?;
            Ok(InitOutcome::WroteBuiltin)
        }
    }
}

/// Compiled exclusion rules.
#[derive(Debug, Default)]
pub struct CompiledFilters {
    patterns: Vec<Pattern>,
    regexes: Vec<Regex>,
    protected: Vec<PathBuf>,
}

impl CompiledFilters {
    fn new(
        patterns: &[String],
        regexes: &[String],
        protected: Vec<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let patterns = patterns
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|e| ConfigError::InvalidGlobPattern {
                    pattern: pattern.clone(),
                    reason: e.msg.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let regexes = regexes
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            patterns,
            regexes,
            protected,
        })
    }

    /// Returns true if the file must be left where it is.
    ///
    /// Checked in order, first hit wins:
    /// 1. Protected paths (report and configuration files)
    /// 2. Glob patterns against the full path, then the bare file name
    /// 3. Regex patterns against the bare file name
    pub fn is_excluded(&self, file_path: &Path) -> bool {
        if self.protected.iter().any(|p| p == file_path) {
            return true;
        }

        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();
        let full_path = file_path.to_string_lossy();

        if self
            .patterns
            .iter()
            .any(|pattern| pattern.matches(&full_path) || pattern.matches(&file_name))
        {
            return true;
        }

        self.regexes.iter().any(|regex| regex.is_match(&file_name))
    }
}
