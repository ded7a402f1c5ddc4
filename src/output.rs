//! Output formatting and styling module.
//!
//! Provides a centralized interface for all CLI output, including colored output,
//! progress tracking, and formatted tables. The sorting engine only emits
//! [`RunEvent`]s; everything about how they look lives here.

use crate::classifier::Decision;
use crate::file_organizer::{MoveOutcome, MoveStatus};
use crate::run::{RunEvent, RunSummary};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;

/// Manages all CLI output with consistent styling and formatting.
///
/// This struct provides methods for:
/// - Success messages (green with ✓)
/// - Error messages (red with ✗)
/// - Warning messages (yellow with ⚠)
/// - Info messages (cyan)
/// - Progress bars for sorting passes
/// - Summary tables with statistics
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dirsort::output::OutputFormatter;
    /// OutputFormatter::success("Rule added");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a regular message without styling.
    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Creates a progress bar for a pass over `total` files.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dirsort::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar(100);
    /// pb.inc(1);
    /// pb.finish_and_clear();
    /// ```
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        if let Ok(style) =
            ProgressStyle::default_bar().template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("█▓░"));
        }
        pb
    }

    /// Formats the log line for one processed file.
    ///
    /// # Example
    ///
    /// ```
    /// use dirsort::classifier::Decision;
    /// use dirsort::file_organizer::{MoveOutcome, MoveStatus};
    /// use dirsort::output::OutputFormatter;
    /// use std::path::PathBuf;
    ///
    /// let outcome = MoveOutcome {
    ///     source_path: PathBuf::from("/dl/a.jpg"),
    ///     final_destination_path: Some(PathBuf::from("/dl/Images/a.jpg")),
    ///     status: MoveStatus::Moved,
    /// };
    /// let line = OutputFormatter::processed_line(
    ///     "a.jpg",
    ///     &Decision::MoveToCategory("Images".into()),
    ///     &outcome,
    /// );
    /// assert!(line.contains("a.jpg"));
    /// assert!(line.contains("Images"));
    /// ```
    pub fn processed_line(filename: &str, decision: &Decision, outcome: &MoveOutcome) -> String {
        match &outcome.status {
            MoveStatus::Moved => {
                let landed = outcome
                    .final_destination_path
                    .as_deref()
                    .and_then(|path| path.file_name())
                    .map(|name| name.to_string_lossy().to_string())
                    .unwrap_or_else(|| filename.to_string());
                let folder = decision.folder_name().unwrap_or_default();
                format!("{} {} → {}/{}", "✓".green(), filename, folder, landed)
            }
            MoveStatus::Skipped => format!("{} {} (no match)", "–".dimmed(), filename),
            MoveStatus::Failed { reason } => {
                format!("{} {}: {}", "✗".red(), filename, reason.red())
            }
        }
    }

    /// Formats a run event as one JSON line, stamped with the current time.
    pub fn json_line(event: &RunEvent) -> String {
        let mut value = serde_json::to_value(event).unwrap_or_default();
        if let Some(object) = value.as_object_mut() {
            object.insert(
                "timestamp".to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        value.to_string()
    }

    /// Prints a summary table with moved files per destination folder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dirsort::output::OutputFormatter;
    /// use dirsort::run::RunSummary;
    /// use std::collections::BTreeMap;
    ///
    /// let mut counts = BTreeMap::new();
    /// counts.insert("Documents".to_string(), 15);
    /// counts.insert("Images".to_string(), 8);
    /// let summary = RunSummary { scanned: 25, moved: 23, skipped: 2, failed: 0 };
    /// OutputFormatter::summary_table(&counts, &summary);
    /// ```
    pub fn summary_table(folder_counts: &BTreeMap<String, usize>, summary: &RunSummary) {
        Self::header("SUMMARY");

        let max_folder_len = folder_counts
            .keys()
            .map(|name| name.len())
            .max()
            .unwrap_or(0)
            .max(7); // At least "Skipped" width

        println!(
            "{:<width$} | {}",
            "Folder".bold(),
            "Files".bold(),
            width = max_folder_len
        );
        println!("{}", "-".repeat(max_folder_len + 10));

        for (folder, count) in folder_counts {
            println!(
                "{:<width$} | {} {}",
                folder,
                count.to_string().green(),
                plural(*count),
                width = max_folder_len
            );
        }

        println!("{}", "-".repeat(max_folder_len + 10));
        println!(
            "{:<width$} | {} of {} {}",
            "Moved".bold(),
            summary.moved.to_string().green().bold(),
            summary.scanned,
            plural(summary.scanned),
            width = max_folder_len
        );
        if summary.skipped > 0 {
            println!(
                "{:<width$} | {}",
                "Skipped",
                summary.skipped.to_string().yellow(),
                width = max_folder_len
            );
        }
        if summary.failed > 0 {
            println!(
                "{:<width$} | {}",
                "Failed",
                summary.failed.to_string().red(),
                width = max_folder_len
            );
        }
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::RunOutcome;
    use std::path::PathBuf;

    #[test]
    fn test_failed_line_carries_reason() {
        let outcome = MoveOutcome {
            source_path: PathBuf::from("/dl/a.pdf"),
            final_destination_path: None,
            status: MoveStatus::Failed {
                reason: "permission denied".to_string(),
            },
        };
        let line = OutputFormatter::processed_line(
            "a.pdf",
            &Decision::MoveToCategory("Documents".into()),
            &outcome,
        );
        assert!(line.contains("a.pdf"));
        assert!(line.contains("permission denied"));
    }

    #[test]
    fn test_moved_line_shows_renamed_file() {
        let outcome = MoveOutcome {
            source_path: PathBuf::from("/dl/report.pdf"),
            final_destination_path: Some(PathBuf::from("/dl/Billing/report (1).pdf")),
            status: MoveStatus::Moved,
        };
        let line = OutputFormatter::processed_line(
            "report.pdf",
            &Decision::MoveToRule("Billing".into()),
            &outcome,
        );
        assert!(line.contains("Billing/report (1).pdf"));
    }

    #[test]
    fn test_json_line_is_tagged_and_stamped() {
        let line = OutputFormatter::json_line(&RunEvent::Finished {
            outcome: RunOutcome::NoMatchingFiles,
        });
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();

        assert_eq!(value["event"], "finished");
        assert_eq!(value["outcome"]["result"], "no_matching_files");
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn test_json_line_for_processed_file() {
        let event = RunEvent::Processed {
            filename: "a.jpg".to_string(),
            decision: Decision::MoveToCategory("Images".into()),
            outcome: MoveOutcome {
                source_path: PathBuf::from("/dl/a.jpg"),
                final_destination_path: Some(PathBuf::from("/dl/Images/a.jpg")),
                status: MoveStatus::Moved,
            },
        };
        let value: serde_json::Value =
            serde_json::from_str(&OutputFormatter::json_line(&event)).unwrap();

        assert_eq!(value["event"], "processed");
        assert_eq!(value["filename"], "a.jpg");
        assert_eq!(value["decision"]["action"], "move_to_category");
        assert_eq!(value["decision"]["folder"], "Images");
        assert_eq!(value["outcome"]["status"], "moved");
    }
}
