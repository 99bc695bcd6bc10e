//! Extension based classification of files into destination folders.
//!
//! The mapping from folder names to extensions comes from the configuration
//! and is inverted into an `ExtensionIndex` once per run.
//!
//! # Examples
//!
//! ```
//! use foldersort::file_category::{Decision, ExtensionIndex, classify};
//! use foldersort::config::CompiledFilters;
//! use std::collections::BTreeMap;
//!
//! let mut mappings = BTreeMap::new();
//! mappings.insert("Images".to_string(), vec![".jpg".to_string()]);
//! let index = ExtensionIndex::from_mappings(&mappings);
//! let filters = CompiledFilters::default();
//!
//! assert_eq!(
//!     classify("holiday.JPG", &index, &filters),
//!     Decision::Assigned("Images".to_string())
//! );
//! assert_eq!(
//!     classify("notes", &index, &filters),
//!     Decision::Assigned("Others".to_string())
//! );
//! ```

use crate::config::CompiledFilters;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Folder for files whose extension is not mapped.
pub const FALLBACK_FOLDER: &str = "Others";

/// Outcome of classifying one file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Decision {
    /// The file matched an exclusion rule and stays where it is.
    Excluded,
    /// The file goes into the named destination folder.
    Assigned(String),
}

/// Lowercase extension (with leading dot, or empty) to destination folder.
#[derive(Debug, Clone, Default)]
pub struct ExtensionIndex {
    extension_map: HashMap<String, String>,
}

impl ExtensionIndex {
    /// Inverts a folder -> extensions mapping.
    ///
    /// Extensions are lower-cased and given a leading dot if they lack one.
    /// When an extension is listed under several folders the last one wins;
    /// folders are visited in name order, so the result is deterministic.
    pub fn from_mappings(mappings: &BTreeMap<String, Vec<String>>) -> Self {
        let mut index = Self::default();
        for (folder, extensions) in mappings {
            for ext in extensions {
                index.add_extension_mapping(ext, folder);
            }
        }
        index
    }

    /// Maps one extension to a folder, replacing any earlier mapping.
    pub fn add_extension_mapping(&mut self, ext: &str, folder: &str) {
        let key = normalize_extension(ext);
        if let Some(previous) = self.extension_map.insert(key.clone(), folder.to_string())
            && previous != folder
        {
            tracing::warn!(
                extension = %key,
                previous = %previous,
                folder = %folder,
                "extension mapped to more than one folder, last mapping wins"
            );
        }
    }

    /// Looks up the folder for an already normalized extension.
    pub fn folder_for(&self, ext: &str) -> Option<&str> {
        self.extension_map.get(ext).map(String::as_str)
    }

    /// Resolves a file name to its destination folder, `Others` if unmapped.
    pub fn folder_for_file(&self, file_name: &str) -> &str {
        self.folder_for(&extension_of(file_name))
            .unwrap_or(FALLBACK_FOLDER)
    }

    pub fn len(&self) -> usize {
        self.extension_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extension_map.is_empty()
    }
}

fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.is_empty() || ext.starts_with('.') {
        ext
    } else {
        format!(".{ext}")
    }
}

/// Splits a file name into stem and extension.
///
/// The extension starts at the last `.`; leading dots of a dot-file do not
/// start an extension, so `.bashrc` has none.
///
/// ```
/// use foldersort::file_category::split_extension;
///
/// assert_eq!(split_extension("archive.tar.gz"), ("archive.tar", ".gz"));
/// assert_eq!(split_extension(".bashrc"), (".bashrc", ""));
/// assert_eq!(split_extension("README"), ("README", ""));
/// ```
pub fn split_extension(file_name: &str) -> (&str, &str) {
    let trimmed = file_name.trim_start_matches('.');
    let offset = file_name.len() - trimmed.len();
    match trimmed.rfind('.') {
        Some(dot) => file_name.split_at(offset + dot),
        None => (file_name, ""),
    }
}

/// The lower-cased extension of a file name, including the dot.
pub fn extension_of(file_name: &str) -> String {
    split_extension(file_name).1.to_lowercase()
}

/// Classifies a file: exclusion first, then extension lookup.
///
/// `file` may be a bare name or a full path; exclusion globs are tried
/// against both.
pub fn classify(
    file: impl AsRef<Path>,
    index: &ExtensionIndex,
    filters: &CompiledFilters,
) -> Decision {
    let path = file.as_ref();
    if filters.is_excluded(path) {
        return Decision::Excluded;
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    Decision::Assigned(index.folder_for_file(&file_name).to_string())
}

/// An extension index bundled with the exclusion rules of one run.
#[derive(Debug, Default)]
pub struct Classifier {
    index: ExtensionIndex,
    filters: CompiledFilters,
}

impl Classifier {
    pub fn new(index: ExtensionIndex, filters: CompiledFilters) -> Self {
        Self { index, filters }
    }

    pub fn classify(&self, file: impl AsRef<Path>) -> Decision {
        classify(file, &self.index, &self.filters)
    }

    pub fn index(&self) -> &ExtensionIndex {
        &self.index
    }
}
