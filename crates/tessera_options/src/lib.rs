//! tessera_options: Parser configuration.
//!
//! `ParserOptions` is read from a JSON document with camelCase keys. Every
//! key is optional; absent keys take the defaults below.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Options controlling parsing and diagnostic reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ParserOptions {
    /// File name attached to every diagnostic.
    pub file_name: String,
    /// Deepest allowed nesting of tags and prefix expressions.
    pub max_nesting_depth: u32,
    /// Largest edit distance at which an unknown operator or tag still gets a
    /// suggestion.
    pub max_suggestion_distance: usize,
    /// Attach a replacement edit to typo suggestions.
    pub suggest_fixes: bool,
    /// Warn on tags that split positional attributes over several `{}` groups.
    pub warn_legacy_attributes: bool,
    /// Entries per category when listing valid operators or tags.
    pub max_listing_entries: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            file_name: String::new(),
            max_nesting_depth: 200,
            max_suggestion_distance: 2,
            suggest_fixes: true,
            warn_legacy_attributes: false,
            max_listing_entries: 12,
        }
    }
}

impl ParserOptions {
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    fn validate(self) -> Result<Self, OptionsError> {
        if self.max_nesting_depth == 0 {
            return Err(OptionsError::Invalid {
                key: "maxNestingDepth",
                reason: "must be at least 1",
            });
        }
        if self.max_listing_entries == 0 {
            return Err(OptionsError::Invalid {
                key: "maxListingEntries",
                reason: "must be at least 1",
            });
        }
        Ok(self)
    }
}

/// Errors raised while loading options.
#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("failed to read options file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed options: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid value for '{key}': {reason}")]
    Invalid {
        key: &'static str,
        reason: &'static str,
    },
}

/// Parse options from a JSON string.
pub fn parse_options(content: &str) -> Result<ParserOptions, OptionsError> {
    let options: ParserOptions = serde_json::from_str(content)?;
    options.validate()
}

/// Parse options from a JSON file.
pub fn parse_options_file(path: impl AsRef<Path>) -> Result<ParserOptions, OptionsError> {
    let content = std::fs::read_to_string(path)?;
    parse_options(&content)
}
