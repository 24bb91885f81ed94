#![forbid(unsafe_code)]

//! Console configuration.
//!
//! Every field defaults to the behavior of the stock quiz page, so
//! `ConsoleConfig::default()` needs no file at all. With the `config`
//! feature the struct loads from TOML or JSON:
//!
//! ```toml
//! colour_table = "escape"
//! render_mode = "sgr"
//! title_prefix = "Quiz | "
//!
//! [input]
//! trigger = "change"
//! empty_commit = "keep"
//!
//! [dom]
//! output = "scrollback"
//! ```
//!
//! ```rust,ignore
//! let config = ConsoleConfig::from_toml_file("quizterm.toml")?;
//! let config = ConsoleConfig::from_json_str(json)?;
//! ```

#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::colour::TableKind;
use crate::error::ConfigError;
use crate::input_bridge::InputOptions;
use crate::print_sink::RenderMode;

/// Default document title prefix.
pub const DEFAULT_TITLE_PREFIX: &str = "Quiz Game UI | ";

/// Top-level console configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ConsoleConfig {
    /// Built-in token table used for printed lines and prompts.
    pub colour_table: TableKind,
    pub render_mode: RenderMode,
    /// Run prompts through the token table before showing them.
    pub translate_prompt: bool,
    /// Prepended to every title passed to `set_title`.
    pub title_prefix: String,
    pub input: InputOptions,
    pub dom: DomIds,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            colour_table: TableKind::Bracket,
            render_mode: RenderMode::Tokens,
            translate_prompt: true,
            title_prefix: DEFAULT_TITLE_PREFIX.to_owned(),
            input: InputOptions::default(),
            dom: DomIds::default(),
        }
    }
}

/// Element ids the web host looks up.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct DomIds {
    pub output: String,
    pub input_prompt: String,
    pub input: String,
}

impl Default for DomIds {
    fn default() -> Self {
        Self {
            output: "output".into(),
            input_prompt: "input_prompt".into(),
            input: "input".into(),
        }
    }
}

impl ConsoleConfig {
    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Check the config for values the page cannot work with.
    ///
    /// Returns one message per problem; empty means valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let ids = [
            ("dom.output", &self.dom.output),
            ("dom.input_prompt", &self.dom.input_prompt),
            ("dom.input", &self.dom.input),
        ];
        for (field, id) in ids {
            if id.trim().is_empty() {
                errors.push(format!("{field} must not be empty"));
            } else if id.chars().any(char::is_whitespace) {
                errors.push(format!("{field} must not contain whitespace, got {id:?}"));
            }
        }
        for (i, (a_field, a)) in ids.iter().enumerate() {
            for (b_field, b) in &ids[i + 1..] {
                if !a.is_empty() && a == b {
                    errors.push(format!("{a_field} and {b_field} both use id {a:?}"));
                }
            }
        }
        errors
    }

    /// [`Self::validate`] as a `Result`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] listing every problem.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }
}
