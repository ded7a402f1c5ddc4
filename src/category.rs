/// Extension categories used to decide the destination folder of a file.
///
/// A category is a named set of file extensions that share a destination
/// folder. The registry keeps categories in a fixed order: the built-in
/// defaults first, followed by user-added categories in insertion order.
/// Lookups walk that order and the first enabled category containing an
/// extension wins.
///
/// # Examples
///
/// ```
/// use dirsort::category::CategoryRegistry;
///
/// let registry = CategoryRegistry::default();
/// assert_eq!(registry.find_category_for_extension("JPG"), Some("Images"));
/// assert_eq!(registry.find_category_for_extension(".pdf"), Some("Documents"));
/// assert_eq!(registry.find_category_for_extension("xyz"), None);
/// ```
use crate::config::ConfigError;
use std::collections::BTreeSet;

/// Built-in categories in their canonical registry order.
const DEFAULT_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Images",
        &[
            "jpg", "jpeg", "png", "gif", "bmp", "svg", "psd", "ai", "eps", "webp", "tiff", "ico",
        ],
    ),
    (
        "Documents",
        &[
            "pdf", "docx", "doc", "txt", "xlsx", "pptx", "odt", "rtf", "csv", "xls",
        ],
    ),
    ("Installers", &["exe", "msi", "dmg", "pkg", "deb", "rpm"]),
    ("Audio", &["mp3", "wav", "flac", "aac", "ogg", "m4a", "wma"]),
    (
        "Video",
        &["mp4", "mov", "avi", "mkv", "flv", "wmv", "webm", "m4v"],
    ),
    ("Archives", &["zip", "rar", "7z", "tar", "gz", "bz2", "xz"]),
    (
        "Developer",
        &[
            "py", "js", "json", "html", "css", "java", "cpp", "ts", "tsx", "jsx", "php", "rb",
            "go", "rs",
        ],
    ),
];

/// Normalizes an extension to lowercase without leading dots or whitespace.
///
/// ```
/// use dirsort::category::normalize_extension;
///
/// assert_eq!(normalize_extension(".JPG"), "jpg");
/// assert_eq!(normalize_extension(" JpG "), "jpg");
/// ```
pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

/// A named group of extensions sharing a destination folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// The category name, also used as the destination folder name.
    pub name: String,
    /// Normalized extensions (lowercase, no leading dot).
    pub extensions: BTreeSet<String>,
    /// Disabled categories never match.
    pub enabled: bool,
}

impl Category {
    /// Creates an enabled category from a list of extensions.
    ///
    /// Extensions are normalized; empty ones are dropped.
    pub fn new<I, S>(name: &str, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name: name.to_string(),
            extensions: extensions
                .into_iter()
                .map(|ext| normalize_extension(ext.as_ref()))
                .filter(|ext| !ext.is_empty())
                .collect(),
            enabled: true,
        }
    }

    /// Returns true if this category lists the (already normalized) extension.
    pub fn contains(&self, ext: &str) -> bool {
        self.extensions.contains(ext)
    }
}

/// Ordered collection of categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRegistry {
    categories: Vec<Category>,
}

impl CategoryRegistry {
    /// Creates a registry with no categories at all.
    pub fn empty() -> Self {
        Self {
            categories: Vec::new(),
        }
    }

    /// Finds the first enabled category, in registry order, containing `ext`.
    ///
    /// `ext` may carry a leading dot and any casing. The empty extension never
    /// matches.
    pub fn find_category_for_extension(&self, ext: &str) -> Option<&str> {
        let ext = normalize_extension(ext);
        if ext.is_empty() {
            return None;
        }

        self.categories
            .iter()
            .filter(|category| category.enabled)
            .find(|category| category.contains(&ext))
            .map(|category| category.name.as_str())
    }

    /// Adds an extension to a category. Adding an existing extension is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownCategory` if no category has that name and
    /// `ConfigError::InvalidExtension` if the extension is empty once normalized.
    pub fn add_extension(&mut self, category_name: &str, ext: &str) -> Result<(), ConfigError> {
        let normalized = normalize_extension(ext);
        let category = self.get_mut(category_name)?;
        if normalized.is_empty() {
            return Err(ConfigError::InvalidExtension(ext.to_string()));
        }
        category.extensions.insert(normalized);
        Ok(())
    }

    /// Enables or disables a category.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownCategory` if no category has that name.
    pub fn set_enabled(&mut self, category_name: &str, enabled: bool) -> Result<(), ConfigError> {
        self.get_mut(category_name)?.enabled = enabled;
        Ok(())
    }

    /// Registers a category.
    ///
    /// A category with the same name (ignoring ASCII case) keeps its registry
    /// position but takes the new extensions and enabled flag. Anything else is
    /// appended after the existing categories.
    pub fn register(&mut self, category: Category) {
        match self
            .categories
            .iter_mut()
            .find(|existing| existing.name.eq_ignore_ascii_case(&category.name))
        {
            Some(existing) => {
                existing.extensions = category.extensions;
                existing.enabled = category.enabled;
            }
            None => self.categories.push(category),
        }
    }

    /// Looks up a category by name, ignoring ASCII case.
    pub fn get(&self, category_name: &str) -> Option<&Category> {
        self.categories
            .iter()
            .find(|category| category.name.eq_ignore_ascii_case(category_name))
    }

    fn get_mut(&mut self, category_name: &str) -> Result<&mut Category, ConfigError> {
        self.categories
            .iter_mut()
            .find(|category| category.name.eq_ignore_ascii_case(category_name))
            .ok_or_else(|| ConfigError::UnknownCategory(category_name.to_string()))
    }

    /// Iterates over the categories in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self {
            categories: DEFAULT_CATEGORIES
                .iter()
                .map(|(name, extensions)| Category::new(name, extensions.iter()))
                .collect(),
        }
    }
}
