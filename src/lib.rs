//! dirsort - sort the files of a directory into folders
//!
//! This library classifies the files directly inside a directory by name:
//! keyword rules first, then extension categories, then an optional
//! `Unsorted` catch-all. It moves each file into its folder, numbering
//! duplicates, and reports every file through a stream of run events.

pub mod category;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod file_organizer;
pub mod output;
pub mod rules;
pub mod run;

pub use category::{Category, CategoryRegistry};
pub use classifier::{Decision, classify};
pub use config::{Config, ConfigError, Settings};
pub use file_organizer::{FileOrganizer, MoveOutcome, MoveStatus};
pub use rules::{Rule, RuleSet};
pub use run::{OrganizeError, RunEvent, RunOutcome, RunSummary, plan_pass, run_pass};

pub use cli::{Cli, run_cli};
