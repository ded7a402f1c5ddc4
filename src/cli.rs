//! Command-line interface module for dirsort.
//!
//! This module handles all CLI-related functionality including:
//! - Command parsing
//! - Logger setup
//! - Running and rendering sorting passes (and dry runs)
//! - Editing and saving rules, categories and the unsorted toggle

use crate::category::normalize_extension;
use crate::classifier::Decision;
use crate::config::{Config, ConfigError, Settings};
use crate::file_organizer::MoveStatus;
use crate::output::OutputFormatter;
use crate::run::{OrganizeError, RunEvent, RunOutcome, plan_pass, run_pass};
use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use indicatif::ProgressBar;
use log::LevelFilter;
use simplelog::{ColorChoice, TermLogger, TerminalMode};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Sort the files of a directory into folders by keyword rules and extension.
#[derive(Debug, Parser)]
#[command(name = "dirsort", version, about)]
pub struct Cli {
    /// Settings file to use instead of .dirsortrc.toml or ~/.config/dirsort/config.toml
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Show more engine logs on stderr (-v info, -vv debug); warnings always show
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Silence engine logs entirely
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sort the files directly inside a directory
    Organize {
        /// Directory to sort; defaults to `default_path` from the settings
        target: Option<PathBuf>,

        /// Show where files would go without moving anything
        #[arg(long)]
        dry_run: bool,

        /// Print one JSON object per event instead of styled output
        #[arg(long)]
        json: bool,
    },
    /// List, add or remove keyword rules
    #[command(subcommand)]
    Rules(RulesCommand),
    /// List categories, add extensions, enable or disable categories
    #[command(subcommand)]
    Categories(CategoriesCommand),
    /// Turn the Unsorted fallback folder on or off
    Unsorted {
        #[arg(value_enum)]
        state: Toggle,
    },
}

#[derive(Debug, Subcommand)]
pub enum RulesCommand {
    /// Show rules in match order
    List,
    /// Send files whose name contains KEYWORD to DESTINATION
    Add {
        keyword: String,
        destination: String,
    },
    /// Remove the rule at INDEX, as shown by `rules list`
    Remove { index: usize },
}

#[derive(Debug, Subcommand)]
pub enum CategoriesCommand {
    /// Show categories in lookup order
    List,
    /// Add an extension to a category
    AddExt { category: String, extension: String },
    /// Enable a category
    Enable { category: String },
    /// Disable a category
    Disable { category: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

/// Maps `-q`/`-v` flags to a log level: warnings by default, then info, then debug.
pub fn log_level(verbose: u8, quiet: bool) -> LevelFilter {
    match (quiet, verbose) {
        (true, _) => LevelFilter::Off,
        (false, 0) => LevelFilter::Warn,
        (false, 1) => LevelFilter::Info,
        (false, _) => LevelFilter::Debug,
    }
}

/// Sets up the terminal logger for the engine's `log` output.
pub fn init_logging(verbose: u8, quiet: bool) {
    if let Err(e) = TermLogger::init(
        log_level(verbose, quiet),
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("Warning: could not initialize logging: {}", e);
    }
}

/// Runs a parsed command line.
///
/// Per-file move failures are reported but do not make this fail; only
/// configuration problems and pass-level errors do.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use dirsort::cli::{run_cli, Cli};
///
/// let cli = Cli::parse_from(["dirsort", "organize", "/home/me/Downloads", "--dry-run"]);
/// if let Err(e) = run_cli(cli) {
///     eprintln!("Error: {:#}", e);
/// }
/// ```
pub fn run_cli(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Command::Organize {
            target,
            dry_run,
            json,
        } => {
            let settings = Settings::load(config_path).context("Error loading configuration")?;
            let config = Config::from_settings(&settings).context("Invalid configuration")?;
            let target = target
                .as_deref()
                .or(settings.default_target())
                .ok_or(OrganizeError::NoTargetSelected)?;

            if dry_run {
                organize_dry_run(target, &config, json)
            } else {
                organize(target, &config, json)
            }
        }
        Command::Rules(RulesCommand::List) => {
            let config = load_config(config_path)?;
            if config.rules.is_empty() {
                OutputFormatter::plain("No rules defined.");
            }
            for (index, rule) in config.rules.iter().enumerate() {
                OutputFormatter::plain(&format!(
                    "[{}] \"{}\" → {}/",
                    index,
                    rule.keyword(),
                    rule.destination()
                ));
            }
            Ok(())
        }
        Command::Rules(RulesCommand::Add {
            keyword,
            destination,
        }) => edit_config(config_path, |config| {
            config.rules.add_rule(&keyword, &destination)?;
            Ok(format!(
                "Files containing \"{}\" will go to {}/",
                keyword.trim(),
                destination.trim()
            ))
        }),
        Command::Rules(RulesCommand::Remove { index }) => edit_config(config_path, |config| {
            let rule = config.rules.remove_rule(index)?;
            Ok(format!("Removed rule \"{}\"", rule.keyword()))
        }),
        Command::Categories(CategoriesCommand::List) => {
            let config = load_config(config_path)?;
            for category in config.categories.iter() {
                let state = if category.enabled { "on " } else { "off" };
                let extensions: Vec<_> = category.extensions.iter().map(String::as_str).collect();
                OutputFormatter::plain(&format!(
                    "[{}] {}: {}",
                    state,
                    category.name,
                    extensions.join(", ")
                ));
            }
            OutputFormatter::plain(&format!(
                "Unsorted fallback: {}",
                if config.unsorted_enabled { "on" } else { "off" }
            ));
            Ok(())
        }
        Command::Categories(CategoriesCommand::AddExt {
            category,
            extension,
        }) => edit_config(config_path, |config| {
            config.categories.add_extension(&category, &extension)?;
            Ok(format!(
                "Added .{} to {}",
                normalize_extension(&extension),
                category
            ))
        }),
        Command::Categories(CategoriesCommand::Enable { category }) => {
            edit_config(config_path, |config| {
                config.categories.set_enabled(&category, true)?;
                Ok(format!("Enabled {}", category))
            })
        }
        Command::Categories(CategoriesCommand::Disable { category }) => {
            edit_config(config_path, |config| {
                config.categories.set_enabled(&category, false)?;
                Ok(format!("Disabled {}", category))
            })
        }
        Command::Unsorted { state } => edit_config(config_path, |config| {
            config.unsorted_enabled = state == Toggle::On;
            Ok(format!(
                "Unsorted fallback turned {}",
                if config.unsorted_enabled { "on" } else { "off" }
            ))
        }),
    }
}

fn load_config(config_path: Option<&Path>) -> anyhow::Result<Config> {
    let settings = Settings::load(config_path).context("Error loading configuration")?;
    Config::from_settings(&settings).context("Invalid configuration")
}

/// Loads the settings, applies `edit` and saves them back.
///
/// Nothing is written when the edit fails.
fn edit_config<F>(config_path: Option<&Path>, edit: F) -> anyhow::Result<()>
where
    F: FnOnce(&mut Config) -> Result<String, ConfigError>,
{
    let mut settings = Settings::load(config_path).context("Error loading configuration")?;
    let mut config = Config::from_settings(&settings).context("Invalid configuration")?;

    let message = edit(&mut config)?;

    settings.update_from(&config);
    let save_path = Settings::save_path(config_path);
    settings
        .save(&save_path)
        .with_context(|| format!("Error saving configuration to {}", save_path.display()))?;

    OutputFormatter::success(&message);
    Ok(())
}

/// Runs a real pass and renders its events.
fn organize(target: &Path, config: &Config, json: bool) -> anyhow::Result<()> {
    if !json {
        OutputFormatter::info(&format!("Organizing contents of: {}", target.display()));
    }

    let mut progress: Option<ProgressBar> = None;
    let mut folder_counts: BTreeMap<String, usize> = BTreeMap::new();

    let outcome = run_pass(target, config, |event| {
        if json {
            OutputFormatter::plain(&OutputFormatter::json_line(event));
            return;
        }

        match event {
            RunEvent::Started { files, .. } => {
                progress = Some(OutputFormatter::create_progress_bar(*files as u64));
            }
            RunEvent::Processed {
                filename,
                decision,
                outcome,
            } => {
                if outcome.status == MoveStatus::Moved
                    && let Some(folder) = decision.folder_name()
                {
                    *folder_counts.entry(folder.to_string()).or_insert(0) += 1;
                }

                let line = OutputFormatter::processed_line(filename, decision, outcome);
                match &progress {
                    // `ProgressBar::println` prints nothing when the bar is hidden
                    Some(pb) => {
                        pb.suspend(|| OutputFormatter::plain(&line));
                        pb.inc(1);
                    }
                    None => OutputFormatter::plain(&line),
                }
            }
            RunEvent::Finished { .. } => {
                if let Some(pb) = progress.take() {
                    pb.finish_and_clear();
                }
            }
        }
    })?;

    if json {
        return Ok(());
    }

    match outcome {
        RunOutcome::NoMatchingFiles => OutputFormatter::warning("No matching files found."),
        RunOutcome::Completed(summary) => {
            OutputFormatter::summary_table(&folder_counts, &summary);
            if summary.failed > 0 {
                OutputFormatter::warning(&format!(
                    "{} {} could not be moved.",
                    summary.failed,
                    if summary.failed == 1 { "file" } else { "files" }
                ));
            } else {
                OutputFormatter::success(&format!("{} files organized.", summary.moved));
            }
        }
    }

    Ok(())
}

/// Classifies without moving and shows where files would go.
fn organize_dry_run(target: &Path, config: &Config, json: bool) -> anyhow::Result<()> {
    let plan = plan_pass(target, config)?;

    if json {
        OutputFormatter::plain(&serde_json::to_string(&plan)?);
        return Ok(());
    }

    OutputFormatter::dry_run_notice(&format!("Analyzing contents of: {}", target.display()));

    let Some(plan) = plan else {
        OutputFormatter::warning("No matching files found.");
        return Ok(());
    };

    let mut folder_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut skipped = 0;
    for planned in &plan {
        match &planned.decision {
            Decision::Skip => {
                skipped += 1;
                OutputFormatter::plain(&format!(" - {}: no match, stays", planned.filename));
            }
            decision => {
                let folder = decision.folder_name().unwrap_or_default();
                OutputFormatter::plain(&format!(" - {} → would move to {}/", planned.filename, folder));
                *folder_counts.entry(folder.to_string()).or_insert(0) += 1;
            }
        }
    }

    OutputFormatter::header("DRY RUN SUMMARY");
    OutputFormatter::plain(&format!("Total files: {}", plan.len()));
    for (folder, count) in &folder_counts {
        OutputFormatter::plain(&format!(
            "  {} {}: {}",
            folder,
            if *count == 1 { "file" } else { "files" },
            count
        ));
    }
    if skipped > 0 {
        OutputFormatter::plain(&format!("  left in place: {}", skipped));
    }

    OutputFormatter::dry_run_notice("No files were modified.");
    Ok(())
}
