//! Error types for dialog actions
//!
//! `ActionError` is the opaque failure of a collaborator operation. Its
//! message is shown to the user exactly as received. `DialogError` classifies
//! where in a dialog's lifetime the failure happened.

use serde::Deserialize;
use thiserror::Error;

/// Failure reported by an operation a dialog triggered
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ActionError {
    pub message: String,
    /// HTTP-style status of the failed call, when there was one
    pub status: Option<u16>,
}

/// Error payload returned by the platform's REST API
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "errorMsg")]
    error_msg: Option<String>,
}

impl ActionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// The call was refused because the session is no longer valid
    pub fn is_unauthorized(&self) -> bool {
        self.status == Some(401)
    }

    /// Decode an error response body of the form `{"errorMsg": "..."}`.
    ///
    /// Bodies that are empty, not JSON, or lack the field decode to "Unknown".
    pub fn from_response_body(body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.error_msg)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "Unknown".to_string());
        Self::new(message)
    }
}

/// Where a dialog failure happened
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DialogError {
    /// Loading what the dialog needed failed; the dialog never became usable
    #[error("Could not open \"{title}\": {source}")]
    Preparation { title: String, source: ActionError },

    /// A button's operation failed; the dialog stays open for a retry
    #[error("{button} failed: {source}")]
    Submission { button: String, source: ActionError },
}

impl DialogError {
    pub fn source_error(&self) -> &ActionError {
        match self {
            DialogError::Preparation { source, .. } | DialogError::Submission { source, .. } => {
                source
            }
        }
    }

    pub fn is_recoverable(&self) -> bool {
        matches!(self, DialogError::Submission { .. })
    }
}
