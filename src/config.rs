//! Sorting configuration and its TOML settings file.
//!
//! [`Config`] is what a sorting pass consumes: the category registry, the
//! keyword rules and the unsorted toggle. It is an ordinary value passed to
//! every pass; nothing here is global.
//!
//! [`Settings`] is the on-disk form. Categories in the file are merged onto
//! the built-in defaults: a category named like a default replaces that
//! default in place, any other name is appended as a user category.
//!
//! # Configuration File Format
//!
//! ```toml
//! default_path = "/home/me/Downloads"
//! enable_unsorted = true
//!
//! [[categories]]
//! name = "Images"
//! extensions = ["jpg", "png", "heic"]
//! enabled = true
//!
//! [[categories]]
//! name = "Fonts"
//! extensions = ["ttf", "otf"]
//!
//! [[rules]]
//! keyword = "invoice"
//! destination = "Billing"
//! ```

use crate::category::{Category, CategoryRegistry, normalize_extension};
use crate::rules::{Rule, RuleSet};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the per-directory settings file.
pub const LOCAL_CONFIG_FILE: &str = ".dirsortrc.toml";

/// Errors raised by configuration loading and configuration edits.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No category with this name is registered.
    #[error("Unknown category '{0}'")]
    UnknownCategory(String),
    /// A rule failed validation.
    #[error("Invalid rule: {reason}")]
    InvalidRule { reason: String },
    /// No rule at the given index.
    #[error("No rule at index {0}")]
    RuleNotFound(usize),
    /// An extension is empty once normalized.
    #[error("Invalid extension '{0}'")]
    InvalidExtension(String),
    /// Configuration file not found at the specified path.
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),
    /// IO error while reading or writing a configuration file.
    #[error("IO error on configuration file {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
}

/// Everything a sorting pass needs to classify files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub categories: CategoryRegistry,
    pub rules: RuleSet,
    /// Send files nothing else claims to `Unsorted` instead of leaving them.
    pub unsorted_enabled: bool,
}

impl Config {
    /// Builds a configuration from settings, on top of the default categories.
    ///
    /// # Errors
    ///
    /// Returns an error if a rule, extension or category name in the settings
    /// is invalid.
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let mut config = Config {
            unsorted_enabled: settings.enable_unsorted,
            ..Config::default()
        };

        for entry in &settings.categories {
            config.categories.register(entry.to_category()?);
        }

        for entry in &settings.rules {
            config
                .rules
                .add_rule(&entry.keyword, &entry.destination)?;
        }

        Ok(config)
    }
}

/// On-disk settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Directory sorted when no target is given on the command line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_path: Option<PathBuf>,

    #[serde(default)]
    pub enable_unsorted: bool,

    #[serde(default)]
    pub categories: Vec<CategorySettings>,

    #[serde(default)]
    pub rules: Vec<RuleSettings>,
}

/// One `[[categories]]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySettings {
    pub name: String,
    #[serde(default)]
    pub extensions: Vec<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl CategorySettings {
    fn to_category(&self) -> Result<Category, ConfigError> {
        let name = self.name.trim();
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(ConfigError::ConfigInvalid(format!(
                "'{}' is not a valid category name",
                self.name
            )));
        }

        if let Some(bad) = self
            .extensions
            .iter()
            .find(|ext| normalize_extension(ext).is_empty())
        {
            return Err(ConfigError::InvalidExtension(bad.clone()));
        }

        let mut category = Category::new(name, &self.extensions);
        category.enabled = self.enabled;
        Ok(category)
    }
}

impl From<&Category> for CategorySettings {
    fn from(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            extensions: category.extensions.iter().cloned().collect(),
            enabled: category.enabled,
        }
    }
}

/// One `[[rules]]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSettings {
    pub keyword: String,
    pub destination: String,
}

impl From<&Rule> for RuleSettings {
    fn from(rule: &Rule) -> Self {
        Self {
            keyword: rule.keyword().to_string(),
            destination: rule.destination().to_string(),
        }
    }
}

impl Settings {
    /// Load settings from a file, with fallback to defaults.
    ///
    /// Attempts to load settings in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.dirsortrc.toml` in the current directory
    /// 3. Look for `~/.config/dirsort/config.toml` in home directory
    /// 4. Fall back to default settings
    ///
    /// # Errors
    ///
    /// Returns an error if a file is explicitly provided but cannot be read,
    /// or if any file found cannot be parsed.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Some(home_config) = home_config_path()
            && home_config.exists()
        {
            return Self::load_from_file(&home_config);
        }

        Ok(Self::default())
    }

    /// Load settings from a specific file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ConfigNotFound` if file does not exist.
    /// Returns `ConfigError::ConfigInvalid` if TOML parsing fails.
    /// Returns `ConfigError::Io` if file cannot be read.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// The file that edits should be written to.
    ///
    /// Same search order as [`Settings::load`], except that the home file is
    /// chosen even when it does not exist yet.
    pub fn save_path(config_path: Option<&Path>) -> PathBuf {
        if let Some(path) = config_path {
            return path.to_path_buf();
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return local_config;
        }

        home_config_path().unwrap_or(local_config)
    }

    /// Writes the settings as pretty TOML, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ConfigInvalid(e.to_string()))?;

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        fs::write(path, content).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Replaces the sorting part of these settings with `config`.
    ///
    /// Every category is written out, defaults included, so the file fully
    /// describes the registry.
    pub fn update_from(&mut self, config: &Config) {
        self.enable_unsorted = config.unsorted_enabled;
        self.categories = config.categories.iter().map(CategorySettings::from).collect();
        self.rules = config.rules.iter().map(RuleSettings::from).collect();
    }

    /// The configured default target, if it is set and not blank.
    pub fn default_target(&self) -> Option<&Path> {
        self.default_path
            .as_deref()
            .filter(|path| !path.as_os_str().to_string_lossy().trim().is_empty())
    }
}

fn home_config_path() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(|home| {
            PathBuf::from(home)
                .join(".config")
                .join("dirsort")
                .join("config.toml")
        })
}
