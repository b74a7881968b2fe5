use shared::{
    domain::PersonId,
    error::{ApiError, ErrorCode},
};
use thiserror::Error;

/// Failure reported by a [`crate::PersonService`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The service rejected the payload; `message` is meant for the user as-is.
    #[error("{message}")]
    Validation { message: String },
    #[error("person {id} not found")]
    NotFound { id: PersonId },
    #[error("phonebook service unavailable: {0}")]
    Transport(String),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(id: impl Into<PersonId>) -> Self {
        Self::NotFound { id: id.into() }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Maps a service error payload for `id` (when the request addressed one).
    pub fn from_api_error(err: ApiError, id: Option<&PersonId>) -> Self {
        match (err.code, id) {
            (ErrorCode::NotFound, Some(id)) => Self::NotFound { id: id.clone() },
            (ErrorCode::NotFound, None) | (ErrorCode::Internal, _) => {
                Self::Transport(err.message)
            }
            (ErrorCode::Validation, _) => Self::Validation {
                message: err.message,
            },
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value.to_string())
    }
}
