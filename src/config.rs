//! Process-wide builder settings.
//!
//! Quoting characters and the default parameter prefix are global, mutable
//! settings consulted at render time rather than at link creation time, so
//! changing them affects every later render, including renders of chains
//! that were assembled before the change.
//!
//! Settings can be installed programmatically or loaded from a JSON file:
//!
//! ```json
//! {
//!   "quotes": { "label": "`", "property": "`", "map_key": "\"" },
//!   "param_prefix": "NEO"
//! }
//! ```

use std::fs;
use std::path::Path;
use std::sync::{PoisonError, RwLock};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{BuilderError, Result};

const DEFAULT_QUOTE: &str = "`";
const DEFAULT_PARAM_PREFIX: &str = "NEO";

static SETTINGS: Lazy<RwLock<Settings>> = Lazy::new(|| RwLock::new(Settings::default()));

/// Quote marks wrapped around identifiers when rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteConfig {
    /// Node labels and relationship types
    pub label: String,
    /// `.property` accessors and entity property keys
    pub property: String,
    /// Keys of map literals
    pub map_key: String,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            label: DEFAULT_QUOTE.to_string(),
            property: DEFAULT_QUOTE.to_string(),
            map_key: DEFAULT_QUOTE.to_string(),
        }
    }
}

/// Top-level settings structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub quotes: QuoteConfig,
    /// Prefix for generated parameter names of newly created chains
    pub param_prefix: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quotes: QuoteConfig::default(),
            param_prefix: DEFAULT_PARAM_PREFIX.to_string(),
        }
    }
}

impl Settings {
    /// Parse settings from a JSON document. Missing fields keep their defaults.
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| BuilderError::invalid(format!("Invalid settings JSON: {}", e)))
    }

    /// Load settings from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not contain valid
    /// settings JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            BuilderError::invalid(format!(
                "Failed to read settings file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_json(&content).map_err(|e| match e {
            BuilderError::InvalidArgument { message } => BuilderError::InvalidArgument {
                message: format!("{} ({})", message, path.display()),
            },
            other => other,
        })
    }

    /// Install these settings process-wide.
    pub fn apply(self) {
        let mut guard = SETTINGS.write().unwrap_or_else(PoisonError::into_inner);
        *guard = self;
    }
}

/// Snapshot of the current process-wide settings.
pub fn settings() -> Settings {
    SETTINGS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Current quote marks.
pub fn quotes() -> QuoteConfig {
    SETTINGS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .quotes
        .clone()
}

pub fn set_quotes(quotes: QuoteConfig) {
    SETTINGS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .quotes = quotes;
}

pub fn param_prefix() -> String {
    SETTINGS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .param_prefix
        .clone()
}

pub fn set_param_prefix(prefix: impl Into<String>) {
    SETTINGS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .param_prefix = prefix.into();
}

/// Restore the built-in defaults (backticks, `NEO` prefix).
pub fn reset_settings() {
    Settings::default().apply();
}
