/// Keyword rules that route files to a named folder.
///
/// A rule matches when its keyword occurs anywhere in the file name, ignoring
/// case. Rules take precedence over extension categories; among rules, the
/// first one in insertion order wins.
use crate::config::ConfigError;

/// A keyword-to-destination mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    keyword: String,
    destination: String,
}

impl Rule {
    /// Builds a validated rule. The keyword and destination are trimmed.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidRule` if the keyword is blank or the
    /// destination is not a single folder name.
    pub fn new(keyword: &str, destination: &str) -> Result<Self, ConfigError> {
        let keyword = keyword.trim();
        let destination = destination.trim();

        if keyword.is_empty() {
            return Err(ConfigError::InvalidRule {
                reason: "keyword must not be empty".to_string(),
            });
        }
        if destination.is_empty() || destination == "." || destination == ".." {
            return Err(ConfigError::InvalidRule {
                reason: format!("'{}' is not a valid folder name", destination),
            });
        }
        if destination.contains(['/', '\\']) {
            return Err(ConfigError::InvalidRule {
                reason: format!("destination '{}' must not contain a path separator", destination),
            });
        }

        Ok(Self {
            keyword: keyword.to_string(),
            destination: destination.to_string(),
        })
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Case-insensitive substring test against an already lowercased name.
    fn matches_folded(&self, folded_name: &str) -> bool {
        folded_name.contains(&self.keyword.to_lowercase())
    }
}

/// Ordered collection of rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the destination of the first rule whose keyword occurs in `filename`.
    ///
    /// # Examples
    ///
    /// ```
    /// use dirsort::rules::RuleSet;
    ///
    /// let mut rules = RuleSet::new();
    /// rules.add_rule("invoice", "Billing").unwrap();
    /// assert_eq!(rules.match_rule("Scan_INVOICE_2024.pdf"), Some("Billing"));
    /// assert_eq!(rules.match_rule("holiday.jpg"), None);
    /// ```
    pub fn match_rule(&self, filename: &str) -> Option<&str> {
        let folded = filename.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches_folded(&folded))
            .map(Rule::destination)
    }

    /// Appends a rule after the existing ones.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidRule` if the rule does not validate.
    pub fn add_rule(&mut self, keyword: &str, destination: &str) -> Result<(), ConfigError> {
        self.rules.push(Rule::new(keyword, destination)?);
        Ok(())
    }

    /// Removes the rule at `index` (zero-based) and returns it.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::RuleNotFound` if there is no rule at that index.
    pub fn remove_rule(&mut self, index: usize) -> Result<Rule, ConfigError> {
        if index >= self.rules.len() {
            return Err(ConfigError::RuleNotFound(index));
        }
        Ok(self.rules.remove(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_is_case_insensitive_substring() {
        let mut rules = RuleSet::new();
        rules.add_rule("Invoice", "Billing").unwrap();

        assert_eq!(rules.match_rule("notes_invoice.pdf"), Some("Billing"));
        assert_eq!(rules.match_rule("INVOICE"), Some("Billing"));
        assert_eq!(rules.match_rule("invoic.pdf"), None);
    }

    #[test]
    fn test_match_includes_extension() {
        let mut rules = RuleSet::new();
        rules.add_rule(".torrent", "Torrents").unwrap();
        assert_eq!(rules.match_rule("ubuntu.iso.torrent"), Some("Torrents"));
    }

    #[test]
    fn test_first_rule_wins() {
        let mut rules = RuleSet::new();
        rules.add_rule("report", "Reports").unwrap();
        rules.add_rule("2024", "Archive2024").unwrap();

        assert_eq!(rules.match_rule("report_2024.pdf"), Some("Reports"));
        assert_eq!(rules.match_rule("taxes_2024.pdf"), Some("Archive2024"));
    }

    #[test]
    fn test_keyword_is_trimmed() {
        let mut rules = RuleSet::new();
        rules.add_rule("  scan ", " Scans ").unwrap();

        let rule = rules.iter().next().unwrap();
        assert_eq!(rule.keyword(), "scan");
        assert_eq!(rule.destination(), "Scans");
        assert_eq!(rules.match_rule("my scan.png"), Some("Scans"));
        assert_eq!(rules.match_rule("myscan.png"), Some("Scans"));
    }

    #[test]
    fn test_invalid_rules_rejected() {
        let mut rules = RuleSet::new();
        assert!(matches!(
            rules.add_rule("   ", "Billing"),
            Err(ConfigError::InvalidRule { .. })
        ));
        assert!(matches!(
            rules.add_rule("invoice", "Billing/2024"),
            Err(ConfigError::InvalidRule { .. })
        ));
        assert!(matches!(
            rules.add_rule("invoice", "..\\up"),
            Err(ConfigError::InvalidRule { .. })
        ));
        assert!(matches!(
            rules.add_rule("invoice", ".."),
            Err(ConfigError::InvalidRule { .. })
        ));
        assert!(rules.is_empty());
    }

    #[test]
    fn test_remove_rule() {
        let mut rules = RuleSet::new();
        rules.add_rule("a", "A").unwrap();
        rules.add_rule("b", "B").unwrap();

        let removed = rules.remove_rule(0).unwrap();
        assert_eq!(removed.keyword(), "a");
        assert_eq!(rules.len(), 1);
        assert_eq!(rules.match_rule("a.txt"), None);

        assert!(matches!(
            rules.remove_rule(5),
            Err(ConfigError::RuleNotFound(5))
        ));
    }
}
