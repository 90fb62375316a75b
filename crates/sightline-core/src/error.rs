//! Failures reported by data sources

/// A fetch that did not produce usable data.
///
/// Only transport-level problems are errors. Payloads with missing fields
/// are decoded leniently (absent sequences become empty), and a selected
/// row that vanished from the data is resolved to "no selection".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("{path}: not found")]
    NotFound { path: String },

    #[error("{path}: transport failed: {message}")]
    Transport { path: String, message: String },

    #[error("{path}: could not decode response: {message}")]
    Decode { path: String, message: String },
}

impl FetchError {
    pub fn not_found(path: impl Into<String>) -> Self {
        FetchError::NotFound { path: path.into() }
    }

    pub fn transport(path: impl Into<String>, message: impl ToString) -> Self {
        FetchError::Transport {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn decode(path: impl Into<String>, message: impl ToString) -> Self {
        FetchError::Decode {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound { .. })
    }
}
