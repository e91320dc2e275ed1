//! Error taxonomy for assessment operations.
//!
//! Every public service operation returns [`AssessmentError`]. Validation and
//! state errors are raised before any mutation happens, so a failed call never
//! leaves a session partially updated.

use serde::{Deserialize, Serialize};

/// Result alias used across the engine and the service layer.
pub type Result<T> = std::result::Result<T, AssessmentError>;

/// Errors raised by session creation, question delivery and scoring
#[derive(Debug, thiserror::Error)]
pub enum AssessmentError {
    /// A session or program could not be found
    #[error("Not found: {entity} {id}")]
    NotFound { entity: &'static str, id: String },

    /// An in-progress session already exists for the student/program pair
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The operation is not valid for the session's current status
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Malformed or stale input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Persistence or other infrastructure failure
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Machine-readable error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Conflict,
    InvalidState,
    ValidationError,
    Internal,
}

/// Structured error payload handed to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error_kind: ErrorKind,
    pub message: String,
}

impl AssessmentError {
    pub fn session_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            entity: "session",
            id: id.to_string(),
        }
    }

    pub fn program_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            entity: "program",
            id: id.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::InvalidState(_) => ErrorKind::InvalidState,
            Self::Validation(_) => ErrorKind::ValidationError,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Convert into the `{errorKind, message}` payload
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            error_kind: self.kind(),
            message: self.to_string(),
        }
    }
}

impl From<anyhow::Error> for AssessmentError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{:#}", err))
    }
}
