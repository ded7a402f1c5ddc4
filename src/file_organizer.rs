/// Moving classified files into their destination folders.
///
/// This module turns a [`Decision`] into a filesystem move inside the target
/// directory. It creates destination folders as needed, picks a free name
/// when the destination is taken and falls back to copy-then-delete when a
/// rename crosses filesystems. Errors never escape: they become
/// [`MoveStatus::Failed`] so the caller can carry on with the next file.
use crate::classifier::Decision;
use log::{debug, info, warn};
use serde::Serialize;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result of one move attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MoveStatus {
    Moved,
    Skipped,
    Failed { reason: String },
}

/// The outcome recorded for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveOutcome {
    /// Where the file was before the move.
    pub source_path: PathBuf,
    /// Where the file ended up; `None` when skipped or when no destination
    /// could be computed.
    pub final_destination_path: Option<PathBuf>,
    #[serde(flatten)]
    pub status: MoveStatus,
}

impl MoveOutcome {
    fn skipped(source_path: &Path) -> Self {
        Self {
            source_path: source_path.to_path_buf(),
            final_destination_path: None,
            status: MoveStatus::Skipped,
        }
    }
}

/// Errors that can occur while moving a single file.
#[derive(Debug, Error)]
pub enum MoveError {
    /// Failed to create a destination directory.
    #[error("Failed to create directory {}: {source}", .path.display())]
    DirectoryCreationFailed { path: PathBuf, source: io::Error },
    /// The source path has no final component.
    #[error("{} has no file name", .0.display())]
    NoFileName(PathBuf),
    /// The rename itself failed.
    #[error("Failed to move {} to {}: {source}", .from.display(), .to.display())]
    FileMoveFailure {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
    /// The copy half of a cross-filesystem move failed.
    #[error("Failed to copy {} to {}: {source}", .from.display(), .to.display())]
    CrossDeviceCopyFailed {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
    /// The copy succeeded but the source could not be deleted afterwards.
    #[error("Copied to {} but failed to remove {}: {source}", .to.display(), .from.display())]
    SourceRemovalFailed {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
}

/// Result type for file move operations.
pub type MoveResult<T> = Result<T, MoveError>;

/// Picks the path a file named `file_name` will take inside `folder`.
///
/// The plain name is used when free. Otherwise the first free
/// `"<stem> (<n>)<.ext>"` is chosen, counting up from 1. The name is kept
/// byte for byte, so names that are not valid UTF-8 survive the move.
///
/// # Examples
///
/// ```
/// use dirsort::file_organizer::resolve_destination;
///
/// let dir = tempfile::tempdir().unwrap();
/// assert_eq!(resolve_destination(dir.path(), "report.pdf"), dir.path().join("report.pdf"));
///
/// std::fs::write(dir.path().join("report.pdf"), b"").unwrap();
/// assert_eq!(
///     resolve_destination(dir.path(), "report.pdf"),
///     dir.path().join("report (1).pdf")
/// );
/// ```
pub fn resolve_destination(folder: &Path, file_name: impl AsRef<OsStr>) -> PathBuf {
    let file_name = file_name.as_ref();
    let candidate = folder.join(file_name);
    if !path_taken(&candidate) {
        return candidate;
    }

    // Same split as the classifier: a leading dot never starts an extension
    let name = Path::new(file_name);
    let stem = name.file_stem().unwrap_or(file_name);
    let ext = name.extension().filter(|ext| !ext.is_empty());

    let mut n: u64 = 1;
    loop {
        let mut numbered = stem.to_os_string();
        numbered.push(format!(" ({})", n));
        if let Some(ext) = ext {
            numbered.push(".");
            numbered.push(ext);
        }

        let candidate = folder.join(numbered);
        if !path_taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// True if anything, including a dangling symlink, occupies `path`.
fn path_taken(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

/// Moves classified files into folders under a target directory.
pub struct FileOrganizer;

impl FileOrganizer {
    /// Applies `decision` to the file at `source_path`.
    ///
    /// Destination folders are created below `target_root`. This never fails:
    /// every problem is reported through the returned outcome's status.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dirsort::classifier::Decision;
    /// use dirsort::file_organizer::{FileOrganizer, MoveStatus};
    /// use std::path::Path;
    ///
    /// let outcome = FileOrganizer::execute(
    ///     Path::new("/home/me/Downloads/photo.png"),
    ///     &Decision::MoveToCategory("Images".to_string()),
    ///     Path::new("/home/me/Downloads"),
    /// );
    /// if let MoveStatus::Failed { reason } = &outcome.status {
    ///     eprintln!("could not move: {}", reason);
    /// }
    /// ```
    pub fn execute(source_path: &Path, decision: &Decision, target_root: &Path) -> MoveOutcome {
        let Some(folder_name) = decision.folder_name() else {
            debug!("Skipping {}", source_path.display());
            return MoveOutcome::skipped(source_path);
        };

        match Self::move_into_folder(source_path, &target_root.join(folder_name)) {
            Ok(destination) => {
                info!("Moved {} to {}", source_path.display(), destination.display());
                MoveOutcome {
                    source_path: source_path.to_path_buf(),
                    final_destination_path: Some(destination),
                    status: MoveStatus::Moved,
                }
            }
            Err(e) => {
                warn!("{}", e);
                let final_destination_path = match &e {
                    MoveError::FileMoveFailure { to, .. }
                    | MoveError::CrossDeviceCopyFailed { to, .. }
                    | MoveError::SourceRemovalFailed { to, .. } => Some(to.clone()),
                    _ => None,
                };
                MoveOutcome {
                    source_path: source_path.to_path_buf(),
                    final_destination_path,
                    status: MoveStatus::Failed {
                        reason: e.to_string(),
                    },
                }
            }
        }
    }

    /// Moves one file into `folder`, creating the folder first.
    ///
    /// Returns the path the file was moved to.
    pub fn move_into_folder(source_path: &Path, folder: &Path) -> MoveResult<PathBuf> {
        fs::create_dir_all(folder).map_err(|e| MoveError::DirectoryCreationFailed {
            path: folder.to_path_buf(),
            source: e,
        })?;

        let file_name = source_path
            .file_name()
            .ok_or_else(|| MoveError::NoFileName(source_path.to_path_buf()))?;

        let destination = resolve_destination(folder, file_name);
        Self::move_file(source_path, &destination)?;
        Ok(destination)
    }

    /// Renames `from` to `to`, copying and deleting when the rename would
    /// cross filesystems.
    fn move_file(from: &Path, to: &Path) -> MoveResult<()> {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
                warn!(
                    "{} and {} are on different filesystems, copying instead",
                    from.display(),
                    to.display()
                );
                Self::copy_then_remove(from, to)
            }
            Err(e) => Err(MoveError::FileMoveFailure {
                from: from.to_path_buf(),
                to: to.to_path_buf(),
                source: e,
            }),
        }
    }

    fn copy_then_remove(from: &Path, to: &Path) -> MoveResult<()> {
        if let Err(e) = fs::copy(from, to) {
            // Don't leave a partial copy behind
            let _ = fs::remove_file(to);
            return Err(MoveError::CrossDeviceCopyFailed {
                from: from.to_path_buf(),
                to: to.to_path_buf(),
                source: e,
            });
        }

        fs::remove_file(from).map_err(|e| {
            discard_copy_if_source_remains(from, to);
            MoveError::SourceRemovalFailed {
                from: from.to_path_buf(),
                to: to.to_path_buf(),
                source: e,
            }
        })
    }
}

/// Keeps exactly one copy after the source could not be removed: the copy
/// goes only while the source is still there.
fn discard_copy_if_source_remains(from: &Path, to: &Path) {
    if path_taken(from) {
        let _ = fs::remove_file(to);
    } else {
        warn!(
            "{} disappeared after being copied, keeping {}",
            from.display(),
            to.display()
        );
    }
}
