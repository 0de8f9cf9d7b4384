//! Domain errors for the runcheck checklist system.

use thiserror::Error;
use uuid::Uuid;

use crate::domain::models::TargetType;

/// Broad category of a [`DomainError`].
///
/// Callers at the transport edge translate the kind into their own status codes;
/// the domain never decides how an error is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input or a business rule violation.
    Validation,
    /// A referenced record does not exist.
    NotFound,
    /// The actor lacks permission for the operation.
    Forbidden,
    /// The operation collides with existing state.
    Conflict,
    /// The storage layer failed.
    Storage,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Forbidden => "forbidden",
            Self::Conflict => "conflict",
            Self::Storage => "storage",
        }
    }
}

/// Domain-level errors that can occur in the runcheck system.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0}")]
    ValidationFailed(String),

    #[error("Checklist not found: {0}")]
    ChecklistNotFound(Uuid),

    #[error("{target_type} not found: {id}")]
    TargetNotFound { target_type: TargetType, id: Uuid },

    #[error("Subject not found: {0}")]
    SubjectNotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("A checklist is already assigned to {target_type} {target_id}")]
    ChecklistAlreadyAssigned { target_type: TargetType, target_id: Uuid },

    #[error("{member_type} {member_id} already belongs to another group")]
    AlreadyInGroup { member_type: TargetType, member_id: Uuid },

    #[error("Concurrency conflict: {entity} {id} was modified")]
    ConcurrencyConflict { entity: String, id: String },

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ValidationFailed(_) => ErrorKind::Validation,
            Self::ChecklistNotFound(_) | Self::TargetNotFound { .. } | Self::SubjectNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::ChecklistAlreadyAssigned { .. }
            | Self::AlreadyInGroup { .. }
            | Self::ConcurrencyConflict { .. } => ErrorKind::Conflict,
            Self::DatabaseError(_) | Self::SerializationError(_) => ErrorKind::Storage,
        }
    }

    /// HTTP-equivalent status code for this error.
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation => 400,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::Storage => 500,
        }
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationFailed(msg.into())
    }

    pub(crate) fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}
