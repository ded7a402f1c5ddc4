//! One sorting pass over a target directory.
//!
//! A pass lists the direct children of the target, keeps regular files only,
//! and handles them one at a time in name order: classify, move, report.
//! Files are never processed concurrently because duplicate numbering in a
//! destination folder depends on what earlier moves left there.
//!
//! The host must not run two passes over the same directory at once.

use crate::classifier::{Decision, classify};
use crate::config::Config;
use crate::file_organizer::{FileOrganizer, MoveOutcome, MoveStatus};
use log::{debug, info};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that stop a pass before any file is touched.
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// The target path was empty or blank.
    #[error("No target directory selected")]
    NoTargetSelected,
    /// The target directory does not exist.
    #[error("Path not found: {}", .0.display())]
    PathNotFound(PathBuf),
    /// The target directory could not be listed.
    #[error("Failed to scan {}: {source}", .path.display())]
    ScanFailed { path: PathBuf, source: io::Error },
}

/// Result type for sorting passes.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Counters for one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub scanned: usize,
    pub moved: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    fn record(&mut self, status: &MoveStatus) {
        match status {
            MoveStatus::Moved => self.moved += 1,
            MoveStatus::Skipped => self.skipped += 1,
            MoveStatus::Failed { .. } => self.failed += 1,
        }
    }
}

/// How a pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "summary", rename_all = "snake_case")]
pub enum RunOutcome {
    /// At least one file was scanned.
    Completed(RunSummary),
    /// The target held no regular files.
    NoMatchingFiles,
}

/// Events emitted while a pass runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    /// Sent once the target has been listed, before any file is handled.
    Started { target: PathBuf, files: usize },
    /// Sent once per file after its move attempt.
    Processed {
        filename: String,
        decision: Decision,
        outcome: MoveOutcome,
    },
    /// Always the last event of a pass.
    Finished { outcome: RunOutcome },
}

/// A classification computed without moving anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedMove {
    pub filename: String,
    pub decision: Decision,
}

/// A regular file found directly in the target directory.
#[derive(Debug, Clone)]
struct ScannedFile {
    /// Display and classification name; `path` keeps the exact bytes.
    name: String,
    path: PathBuf,
}

/// Checks the target path and lists its regular files, sorted by name.
fn scan(target: &Path) -> OrganizeResult<Vec<ScannedFile>> {
    if target.as_os_str().to_string_lossy().trim().is_empty() {
        return Err(OrganizeError::NoTargetSelected);
    }
    match fs::metadata(target) {
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(OrganizeError::PathNotFound(target.to_path_buf()));
        }
        Err(e) => {
            return Err(OrganizeError::ScanFailed {
                path: target.to_path_buf(),
                source: e,
            });
        }
    }

    let entries = fs::read_dir(target).map_err(|e| OrganizeError::ScanFailed {
        path: target.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| OrganizeError::ScanFailed {
            path: target.to_path_buf(),
            source: e,
        })?;

        // Subdirectories, including folders made by earlier passes, are not input
        if let Ok(file_type) = entry.file_type()
            && file_type.is_file()
        {
            files.push(ScannedFile {
                name: entry.file_name().to_string_lossy().to_string(),
                path: entry.path(),
            });
        }
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));
    debug!("Scanned {}: {} files", target.display(), files.len());
    Ok(files)
}

/// Sorts the direct children of `target` according to `config`.
///
/// `on_event` receives a [`RunEvent::Started`], one [`RunEvent::Processed`]
/// per file and a final [`RunEvent::Finished`]. Per-file failures are
/// reported and counted; they never abort the pass.
///
/// # Errors
///
/// Fails before touching any file if `target` is blank, missing or cannot be
/// listed.
///
/// # Examples
///
/// ```no_run
/// use dirsort::config::Config;
/// use dirsort::run::{run_pass, RunEvent, RunOutcome};
/// use std::path::Path;
///
/// let mut config = Config::default();
/// config.rules.add_rule("invoice", "Billing").unwrap();
///
/// let outcome = run_pass(Path::new("/home/me/Downloads"), &config, |event| {
///     if let RunEvent::Processed { filename, outcome, .. } = event {
///         println!("{}: {:?}", filename, outcome.status);
///     }
/// });
///
/// match outcome {
///     Ok(RunOutcome::Completed(summary)) => println!("moved {}", summary.moved),
///     Ok(RunOutcome::NoMatchingFiles) => println!("nothing to do"),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_pass<F>(target: &Path, config: &Config, mut on_event: F) -> OrganizeResult<RunOutcome>
where
    F: FnMut(&RunEvent),
{
    let files = scan(target)?;
    on_event(&RunEvent::Started {
        target: target.to_path_buf(),
        files: files.len(),
    });

    let mut summary = RunSummary::default();
    for file in files {
        let decision = classify(
            &file.name,
            &config.rules,
            &config.categories,
            config.unsorted_enabled,
        );
        debug!("{} -> {:?}", file.name, decision);

        let outcome = FileOrganizer::execute(&file.path, &decision, target);
        summary.scanned += 1;
        summary.record(&outcome.status);

        on_event(&RunEvent::Processed {
            filename: file.name,
            decision,
            outcome,
        });
    }

    let outcome = finish(summary);
    info!("Pass over {} finished: {:?}", target.display(), outcome);
    on_event(&RunEvent::Finished { outcome });
    Ok(outcome)
}

/// Classifies the direct children of `target` without moving anything.
///
/// Returns `None` when there are no regular files, mirroring
/// [`RunOutcome::NoMatchingFiles`].
///
/// # Errors
///
/// Same as [`run_pass`].
pub fn plan_pass(target: &Path, config: &Config) -> OrganizeResult<Option<Vec<PlannedMove>>> {
    let files = scan(target)?;
    if files.is_empty() {
        return Ok(None);
    }

    Ok(Some(
        files
            .into_iter()
            .map(|file| PlannedMove {
                decision: classify(
                    &file.name,
                    &config.rules,
                    &config.categories,
                    config.unsorted_enabled,
                ),
                filename: file.name,
            })
            .collect(),
    ))
}

fn finish(summary: RunSummary) -> RunOutcome {
    if summary.scanned == 0 {
        RunOutcome::NoMatchingFiles
    } else {
        RunOutcome::Completed(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn collect(target: &Path, config: &Config) -> (OrganizeResult<RunOutcome>, Vec<RunEvent>) {
        let mut events = Vec::new();
        let result = run_pass(target, config, |event| events.push(event.clone()));
        (result, events)
    }

    #[test]
    fn test_blank_target_is_rejected() {
        let (result, events) = collect(Path::new("  "), &Config::default());
        assert!(matches!(result, Err(OrganizeError::NoTargetSelected)));
        assert!(events.is_empty());

        assert!(matches!(
            plan_pass(Path::new(""), &Config::default()),
            Err(OrganizeError::NoTargetSelected)
        ));
    }

    #[test]
    fn test_missing_target_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");

        let (result, events) = collect(&missing, &Config::default());
        assert!(matches!(result, Err(OrganizeError::PathNotFound(p)) if p == missing));
        assert!(events.is_empty());
    }

    #[test]
    fn test_file_as_target_fails_scan() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("file.txt");
        fs::write(&file, "x").unwrap();

        let (result, _) = collect(&file, &Config::default());
        assert!(matches!(result, Err(OrganizeError::ScanFailed { .. })));
    }

    #[test]
    fn test_unreachable_target_fails_scan() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("file.txt");
        fs::write(&file, "x").unwrap();

        // ENOTDIR rather than ENOENT
        let (result, events) = collect(&file.join("child"), &Config::default());
        assert!(matches!(result, Err(OrganizeError::ScanFailed { .. })));
        assert!(events.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_name_lands_unchanged() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp_dir = TempDir::new().unwrap();
        let name = OsStr::from_bytes(b"caf\xe9.jpg");
        fs::write(temp_dir.path().join(name), "x").unwrap();

        let (result, events) = collect(temp_dir.path(), &Config::default());

        assert_eq!(
            result.unwrap(),
            RunOutcome::Completed(RunSummary {
                scanned: 1,
                moved: 1,
                skipped: 0,
                failed: 0
            })
        );
        let landed: Vec<_> = fs::read_dir(temp_dir.path().join("Images"))
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(landed, vec![name.to_os_string()]);
        assert!(matches!(
            &events[1],
            RunEvent::Processed { filename, .. } if filename == "caf\u{FFFD}.jpg"
        ));
    }

    #[test]
    fn test_empty_directory_reports_no_matching_files() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("Images")).unwrap();

        let (result, events) = collect(temp_dir.path(), &Config::default());

        assert_eq!(result.unwrap(), RunOutcome::NoMatchingFiles);
        assert_eq!(
            events.last(),
            Some(&RunEvent::Finished {
                outcome: RunOutcome::NoMatchingFiles
            })
        );
        assert_eq!(plan_pass(temp_dir.path(), &Config::default()).unwrap(), None);
    }

    #[test]
    fn test_events_follow_name_order() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["c.png", "a.txt", "b.mp3"] {
            fs::write(temp_dir.path().join(name), "x").unwrap();
        }

        let (result, events) = collect(temp_dir.path(), &Config::default());

        let names: Vec<_> = events
            .iter()
            .filter_map(|event| match event {
                RunEvent::Processed { filename, .. } => Some(filename.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["a.txt", "b.mp3", "c.png"]);
        assert!(matches!(events.first(), Some(RunEvent::Started { files: 3, .. })));
        assert_eq!(
            result.unwrap(),
            RunOutcome::Completed(RunSummary {
                scanned: 3,
                moved: 3,
                skipped: 0,
                failed: 0
            })
        );
    }

    #[test]
    fn test_skipped_files_are_counted() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("README"), "x").unwrap();
        fs::write(temp_dir.path().join("a.jpg"), "x").unwrap();

        let (result, _) = collect(temp_dir.path(), &Config::default());

        assert_eq!(
            result.unwrap(),
            RunOutcome::Completed(RunSummary {
                scanned: 2,
                moved: 1,
                skipped: 1,
                failed: 0
            })
        );
        assert!(temp_dir.path().join("README").exists());
    }

    #[test]
    fn test_plan_pass_moves_nothing() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.jpg"), "x").unwrap();
        fs::write(temp_dir.path().join("notes"), "x").unwrap();

        let plan = plan_pass(temp_dir.path(), &Config::default())
            .unwrap()
            .unwrap();

        assert_eq!(
            plan,
            vec![
                PlannedMove {
                    filename: "a.jpg".to_string(),
                    decision: Decision::MoveToCategory("Images".to_string()),
                },
                PlannedMove {
                    filename: "notes".to_string(),
                    decision: Decision::Skip,
                },
            ]
        );
        assert!(temp_dir.path().join("a.jpg").exists());
        assert!(!temp_dir.path().join("Images").exists());
    }
}
