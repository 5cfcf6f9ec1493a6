//! Error types for request dispatch failures.
//!
//! Every variant is converted into an error envelope by the dispatcher; none
//! of them closes the connection.

use thiserror::Error;

use crate::backend::BackendError;

/// Errors surfaced while interpreting and executing a request.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The request is well-formed on the wire but semantically invalid.
    #[error("invalid request: {message}")]
    Validation { message: String },

    /// The backend rejected or failed the operation.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl DispatchError {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Text placed in the error envelope.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            Self::Backend(error) => error.message().to_owned(),
            Self::Validation { .. } => self.to_string(),
        }
    }
}
