//! Domain errors for the Agora engagement engine.

use thiserror::Error;
use uuid::Uuid;

/// Domain-level errors that can occur across the engagement engine.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Proposal not found: {0}")]
    ProposalNotFound(Uuid),

    #[error("Comment not found: {0}")]
    CommentNotFound(Uuid),

    #[error("Execution not found: {0}")]
    ExecutionNotFound(Uuid),

    #[error("No execution record for proposal: {0}")]
    NoExecutionForProposal(Uuid),

    #[error("Documentation entry not found: {0}")]
    DocumentationNotFound(Uuid),

    #[error("Invalid state transition from {from} to {to}: {reason}")]
    InvalidStateTransition { from: String, to: String, reason: String },

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Collaborator {name} failed: {reason}")]
    Collaborator { name: String, reason: String },

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return DomainError::ConstraintViolation(db_err.to_string());
            }
        }
        DomainError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

impl DomainError {
    /// Whether the error is a uniqueness conflict that a caller may resolve
    /// by re-reading current state and retrying its write.
    #[must_use]
    pub const fn is_constraint_violation(&self) -> bool {
        matches!(self, DomainError::ConstraintViolation(_))
    }
}
