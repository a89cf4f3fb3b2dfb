//! Error types for playground operations

use std::error::Error as _;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Result type for playground operations
pub type Result<T> = std::result::Result<T, PlaygroundError>;

/// Errors that can occur while preparing or supervising an execution
#[derive(Error, Debug)]
pub enum PlaygroundError {
    #[error("Language '{0}' is not supported")]
    UnsupportedLanguage(String),

    #[error("Failed to {stage}: {source}")]
    EnvironmentSetup {
        stage: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Execution timed out after {} seconds", format_seconds(.deadline))]
    Timeout { deadline: Duration },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PlaygroundError {
    /// Stable taxonomy name for this error
    pub fn kind(&self) -> &'static str {
        match self {
            PlaygroundError::UnsupportedLanguage(_) => "UnsupportedLanguage",
            PlaygroundError::EnvironmentSetup { .. } => "EnvironmentSetupError",
            PlaygroundError::Spawn { .. } => "SpawnError",
            PlaygroundError::Timeout { .. } => "Timeout",
            PlaygroundError::Io(_) => "IoError",
            PlaygroundError::InvalidConfig(_) => "InvalidConfig",
        }
    }

    /// Render as `Kind: message` followed by one `caused by:` line per source.
    pub fn diagnostic(&self) -> String {
        let mut text = format!("{}: {}", self.kind(), self);
        let mut source = self.source();
        while let Some(cause) = source {
            text.push_str("\ncaused by: ");
            text.push_str(&cause.to_string());
            source = cause.source();
        }
        text
    }
}

/// Whole seconds print without a fraction, so 30s reads as "30".
pub fn format_seconds(duration: &Duration) -> String {
    if duration.subsec_nanos() == 0 {
        duration.as_secs().to_string()
    } else {
        format!("{}", duration.as_secs_f64())
    }
}
