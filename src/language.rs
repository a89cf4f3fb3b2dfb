//! Language identifiers and their resolution to runtimes

use crate::errors::{PlaygroundError, Result};
use std::fmt;
use std::str::FromStr;

/// Runtimes the playground can execute.
///
/// `"typescript"` resolves to [`Language::JavaScript`]; no type stripping is
/// performed, the source is handed to the JavaScript runtime unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Language {
    #[default]
    Python,
    JavaScript,
}

impl Language {
    /// Every identifier accepted by [`Language::resolve`]
    pub const IDENTIFIERS: &'static [&'static str] = &["python", "javascript", "typescript"];

    /// Map a declared identifier to its runtime. Identifiers are case-sensitive.
    pub fn resolve(identifier: &str) -> Result<Self> {
        match identifier {
            "python" => Ok(Language::Python),
            "javascript" | "typescript" => Ok(Language::JavaScript),
            other => Err(PlaygroundError::UnsupportedLanguage(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
        }
    }
}

impl FromStr for Language {
    type Err = PlaygroundError;

    fn from_str(s: &str) -> Result<Self> {
        Language::resolve(s)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
