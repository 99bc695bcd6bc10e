//! Conflict-safe relocation of files into destination folders.
//!
//! A move never silently clobbers data unless the caller asked for it: with
//! `rename_on_conflict` a clash produces `name_1.ext`, `name_2.ext`, ...;
//! without it the occupant is deleted first.

#[cfg(not(unix))]
use crate::file_category::split_extension;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while moving a single file.
#[derive(Debug, Error)]
pub enum MoveError {
    /// Failed to create a destination directory.
    #[error("Failed to create directory {}: {source}", path.display())]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The relocation itself failed.
    #[error("Failed to move {} to {}: {source}", from.display(), to.display())]
    FileMoveFailure {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file occupying the destination could not be removed.
    #[error("Failed to replace existing file {}: {source}", path.display())]
    OverwriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The source path has no file name component.
    #[error("{} has no file name component", .0.display())]
    MissingFileName(PathBuf),

    /// Every `_N` suffix is taken.
    #[error("No free name left for {file_name} in {}", folder.display())]
    NamesExhausted { file_name: String, folder: PathBuf },
}

/// Result type for move operations.
pub type MoveResult<T> = Result<T, MoveError>;

/// Moves files into destination folders.
pub struct FileOrganizer;

impl FileOrganizer {
    /// Moves `source` into `destination_folder` and returns where it landed.
    ///
    /// The folder is created with any missing parents. When a file already
    /// occupies the destination, `rename_on_conflict` decides between
    /// appending a numeric suffix and replacing the occupant.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use foldersort::file_organizer::FileOrganizer;
    /// use std::path::Path;
    ///
    /// let moved_to = FileOrganizer::safe_move(
    ///     Path::new("/home/me/Downloads/photo.jpg"),
    ///     Path::new("/home/me/Downloads/Images"),
    ///     true,
    /// );
    ///
    /// match moved_to {
    ///     Ok(path) => println!("Moved to {}", path.display()),
    ///     Err(e) => eprintln!("Move failed: {}", e),
    /// }
    /// ```
    pub fn safe_move(
        source: &Path,
        destination_folder: &Path,
        rename_on_conflict: bool,
    ) -> MoveResult<PathBuf> {
        fs::create_dir_all(destination_folder).map_err(|e| MoveError::DirectoryCreationFailed {
            path: destination_folder.to_path_buf(),
            source: e,
        })?;

        let destination =
            Self::plan_destination(source, destination_folder, rename_on_conflict, is_occupied)?;

        if !rename_on_conflict && is_occupied(&destination) {
            tracing::info!(path = %destination.display(), "replacing existing file");
            fs::remove_file(&destination).map_err(|e| MoveError::OverwriteFailed {
                path: destination.clone(),
                source: e,
            })?;
        }

        relocate(source, &destination).map_err(|e| MoveError::FileMoveFailure {
            from: source.to_path_buf(),
            to: destination.clone(),
            source: e,
        })?;

        tracing::debug!(from = %source.display(), to = %destination.display(), "moved");
        Ok(destination)
    }

    /// Picks the path `safe_move` would use, without touching anything.
    ///
    /// `is_taken` decides whether a candidate path is occupied. With
    /// `rename_on_conflict` disabled the plain destination is returned even if
    /// it is taken, since the occupant would be replaced.
    pub fn plan_destination(
        source: &Path,
        destination_folder: &Path,
        rename_on_conflict: bool,
        is_taken: impl Fn(&Path) -> bool,
    ) -> MoveResult<PathBuf> {
        let file_name = source
            .file_name()
            .ok_or_else(|| MoveError::MissingFileName(source.to_path_buf()))?;

        let destination = destination_folder.join(file_name);
        if !rename_on_conflict || !is_taken(&destination) {
            return Ok(destination);
        }

        let (stem, ext) = split_file_name(file_name);
        for counter in 1..=u64::MAX {
            let mut candidate_name = stem.clone();
            candidate_name.push(format!("_{counter}"));
            candidate_name.push(&ext);
            let candidate = destination_folder.join(candidate_name);
            if !is_taken(&candidate) {
                tracing::info!(
                    file = %file_name.to_string_lossy(),
                    renamed_to = %candidate.display(),
                    "name already taken in destination"
                );
                return Ok(candidate);
            }
        }

        Err(MoveError::NamesExhausted {
            file_name: file_name.to_string_lossy().into_owned(),
            folder: destination_folder.to_path_buf(),
        })
    }
}

/// Splits a raw file name into stem and extension, with the same dot-file
/// rule as [`crate::file_category::split_extension`]. Works on bytes so names
/// that are not valid UTF-8 keep every byte.
#[cfg(unix)]
fn split_file_name(name: &OsStr) -> (OsString, OsString) {
    use std::os::unix::ffi::OsStrExt;

    let bytes = name.as_bytes();
    let leading = bytes.iter().take_while(|&&b| b == b'.').count();
    match bytes[leading..].iter().rposition(|&b| b == b'.') {
        Some(dot) => {
            let (stem, ext) = bytes.split_at(leading + dot);
            (
                OsStr::from_bytes(stem).to_os_string(),
                OsStr::from_bytes(ext).to_os_string(),
            )
        }
        None => (name.to_os_string(), OsString::new()),
    }
}

#[cfg(not(unix))]
fn split_file_name(name: &OsStr) -> (OsString, OsString) {
    match name.to_str() {
        Some(name) => {
            let (stem, ext) = split_extension(name);
            (OsString::from(stem), OsString::from(ext))
        }
        // Unpaired surrogates: suffix the whole name rather than lose them.
        None => (name.to_os_string(), OsString::new()),
    }
}

/// True if anything, including a dangling symlink, sits at `path`.
pub fn is_occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Renames, falling back to copy and delete across filesystems.
fn relocate(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            tracing::debug!(from = %from.display(), "rename crosses devices, copying instead");
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
        other => other,
    }
}
