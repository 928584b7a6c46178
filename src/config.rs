//! Editor configuration: TOML file + defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Result;

/// Limits the remote store enforces on experiment names.
pub const DEFAULT_NAME_CHAR_LIMIT: usize = 250;
/// Limits the remote store enforces on experiment notes.
pub const DEFAULT_NOTES_CHAR_LIMIT: usize = 8000;

/// Settings for an edit session.
///
/// ```toml
/// parent_page = "/experiments"
/// name_char_limit = 250
/// notes_char_limit = 8000
/// enforce_limits_locally = false
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EditorConfig {
    /// Where the session navigates after submit or cancel.
    pub parent_page: String,
    /// Maximum experiment name length, in characters.
    pub name_char_limit: usize,
    /// Maximum notes length, in characters.
    pub notes_char_limit: usize,
    /// Check the length limits before submitting instead of leaving them to
    /// the remote store.
    pub enforce_limits_locally: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            parent_page: "/".to_owned(),
            name_char_limit: DEFAULT_NAME_CHAR_LIMIT,
            notes_char_limit: DEFAULT_NOTES_CHAR_LIMIT,
            enforce_limits_locally: false,
        }
    }
}

impl EditorConfig {
    /// Defaults with a different parent page.
    #[must_use]
    pub fn with_parent_page(parent_page: impl Into<String>) -> Self {
        Self {
            parent_page: parent_page.into(),
            ..Self::default()
        }
    }

    /// Parse configuration from TOML; missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Config`] for invalid TOML.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Io`] if the file cannot be read and
    /// [`crate::Error::Config`] if it cannot be parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }
}
