// src/errors.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("The input text cannot be empty.")]
    EmptyInput,

    #[error("Please drop a .txt file ('{name}' is not plain text)")]
    RejectedFile { name: String },

    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status. `message` is the server's `detail` when it
    /// sent one, else the generic status line.
    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Failed to parse preferences: {0}")]
    PreferencesParse(#[from] toml::de::Error),

    #[error("Failed to serialize preferences: {0}")]
    PreferencesWrite(#[from] toml::ser::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse classification used by callers that only care about where a
/// failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    RejectedFile,
    Transport,
    Parse,
    Io,
    Preferences,
    Config,
}

impl AnalyzerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalyzerError::EmptyInput => ErrorKind::Validation,
            AnalyzerError::RejectedFile { .. } => ErrorKind::RejectedFile,
            AnalyzerError::Transport(_)
            | AnalyzerError::Http { .. }
            | AnalyzerError::Timeout(_)
            | AnalyzerError::Cancelled => {
                ErrorKind::Transport
            }
            AnalyzerError::JsonParse(_) => ErrorKind::Parse,
            AnalyzerError::FileRead(_) => ErrorKind::Io,
            AnalyzerError::PreferencesParse(_) | AnalyzerError::PreferencesWrite(_) => {
                ErrorKind::Preferences
            }
            AnalyzerError::Config(_) => ErrorKind::Config,
        }
    }

    /// Errors raised before any network call; they never touch the view.
    pub fn is_user_alert(&self) -> bool {
        matches!(self.kind(), ErrorKind::Validation | ErrorKind::RejectedFile)
    }
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_displays_bare_message() {
        let err = AnalyzerError::Http {
            status: 403,
            message: "forbidden".to_string(),
        };
        assert_eq!(err.to_string(), "forbidden");
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn test_alert_classification() {
        assert!(AnalyzerError::EmptyInput.is_user_alert());
        assert!(
            AnalyzerError::RejectedFile {
                name: "notes.pdf".to_string()
            }
            .is_user_alert()
        );
        assert!(!AnalyzerError::Timeout(5).is_user_alert());
    }
}
