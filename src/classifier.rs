//! Name-based classification of files.
//!
//! Precedence is fixed: keyword rules first, then the first enabled
//! extension category, then the optional `Unsorted` catch-all. A file that
//! falls through everything is skipped.

use crate::category::CategoryRegistry;
use crate::rules::RuleSet;
use serde::Serialize;

/// Folder name used for files that match neither a rule nor a category.
pub const UNSORTED_FOLDER: &str = "Unsorted";

/// Where a file should go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "folder", rename_all = "snake_case")]
pub enum Decision {
    /// A keyword rule matched; holds the rule's destination folder.
    MoveToRule(String),
    /// An enabled category lists the extension; holds the category name.
    MoveToCategory(String),
    MoveToUnsorted,
    Skip,
}

impl Decision {
    /// The destination folder name, or `None` for [`Decision::Skip`].
    pub fn folder_name(&self) -> Option<&str> {
        match self {
            Decision::MoveToRule(folder) | Decision::MoveToCategory(folder) => Some(folder),
            Decision::MoveToUnsorted => Some(UNSORTED_FOLDER),
            Decision::Skip => None,
        }
    }
}

/// Splits a file name into stem and extension at the last dot.
///
/// A dot in first position does not separate anything, so dotfiles such as
/// `.bashrc` have an empty extension.
///
/// ```
/// use dirsort::classifier::split_extension;
///
/// assert_eq!(split_extension("report.pdf"), ("report", "pdf"));
/// assert_eq!(split_extension("archive.tar.gz"), ("archive.tar", "gz"));
/// assert_eq!(split_extension(".bashrc"), (".bashrc", ""));
/// assert_eq!(split_extension("README"), ("README", ""));
/// ```
pub fn split_extension(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(idx) if idx > 0 => (&filename[..idx], &filename[idx + 1..]),
        _ => (filename, ""),
    }
}

/// Classifies one file name.
///
/// # Examples
///
/// ```
/// use dirsort::category::CategoryRegistry;
/// use dirsort::classifier::{classify, Decision};
/// use dirsort::rules::RuleSet;
///
/// let categories = CategoryRegistry::default();
/// let mut rules = RuleSet::new();
/// rules.add_rule("invoice", "Billing").unwrap();
///
/// assert_eq!(
///     classify("notes_invoice.pdf", &rules, &categories, false),
///     Decision::MoveToRule("Billing".to_string())
/// );
/// assert_eq!(
///     classify("b.txt", &rules, &categories, false),
///     Decision::MoveToCategory("Documents".to_string())
/// );
/// assert_eq!(classify("README", &rules, &categories, false), Decision::Skip);
/// assert_eq!(classify("README", &rules, &categories, true), Decision::MoveToUnsorted);
/// ```
pub fn classify(
    filename: &str,
    rules: &RuleSet,
    categories: &CategoryRegistry,
    unsorted_enabled: bool,
) -> Decision {
    if let Some(destination) = rules.match_rule(filename) {
        return Decision::MoveToRule(destination.to_string());
    }

    let (_, ext) = split_extension(filename);
    if let Some(category) = categories.find_category_for_extension(ext) {
        return Decision::MoveToCategory(category.to_string());
    }

    if unsorted_enabled {
        Decision::MoveToUnsorted
    } else {
        Decision::Skip
    }
}
