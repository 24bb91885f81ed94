#![forbid(unsafe_code)]

//! Error types shared by the console pieces.
//!
//! None of these reach the backend: the backend-facing operations on
//! [`crate::Console`] log a failure and carry on. They exist so the host and
//! table layers can report precisely what went wrong.

use std::fmt;

/// Failure reported by a [`crate::PageHost`] implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// A required page element could not be found by id.
    MissingElement(String),
    /// A call into the page (DOM/JS) threw or returned an unexpected value.
    Js(String),
    /// The host does not implement this operation.
    Unsupported(&'static str),
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingElement(id) => write!(f, "missing page element #{id}"),
            Self::Js(msg) => write!(f, "page call failed: {msg}"),
            Self::Unsupported(op) => write!(f, "unsupported: {op}"),
        }
    }
}

impl std::error::Error for HostError {}

/// Rejection reasons for a custom [`crate::ColourTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColourTableError {
    /// The table has no entries.
    Empty,
    /// A code maps to the empty string, which would match everywhere.
    EmptyLiteral { name: String },
    /// The name cannot be used as a CSS class suffix.
    InvalidName { name: String },
    /// Two codes share a name (case-insensitively).
    DuplicateName { name: String },
    /// `inner`'s literal occurs inside `outer`'s literal, so replacing one
    /// would corrupt matches of the other.
    OverlappingLiterals { outer: String, inner: String },
    /// The literal can match inside or across the `<span>` markup the table
    /// generates.
    LiteralInMarkup { name: String },
}

impl fmt::Display for ColourTableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("colour table has no codes"),
            Self::EmptyLiteral { name } => write!(f, "colour code {name} has an empty literal"),
            Self::InvalidName { name } => {
                write!(f, "colour code name {name:?} is not a valid class suffix")
            }
            Self::DuplicateName { name } => write!(f, "colour code {name} is defined twice"),
            Self::OverlappingLiterals { outer, inner } => write!(
                f,
                "literal of colour code {inner} occurs inside the literal of {outer}"
            ),
            Self::LiteralInMarkup { name } => write!(
                f,
                "literal of colour code {name} can match the generated span markup"
            ),
        }
    }
}

impl std::error::Error for ColourTableError {}

/// Errors from loading a [`crate::ConsoleConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// Reading the config file failed.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// The config parsed but failed validation.
    Invalid(Vec<String>),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Invalid(problems) => write!(f, "invalid config: {}", problems.join("; ")),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
            Self::Invalid(_) => None,
        }
    }
}
