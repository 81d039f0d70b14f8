//! Error types for filelease.
//!
//! Uses thiserror for derive macros and provides user-actionable error
//! messages. The taxonomy is deliberate: callers must be able to tell
//! "no such lock" apart from "not your lock", and a conflict must carry
//! enough detail to decide whether to wait, retry, or escalate.

use crate::engine::conflict::FileConflict;
use crate::exit_codes;
use thiserror::Error;

/// Main error type for filelease operations.
///
/// Each variant maps to a distinct exit code so scripts and agents driving
/// the CLI can branch on the outcome without parsing messages.
#[derive(Error, Debug)]
pub enum LeaseError {
    /// User provided invalid arguments or the store is in an invalid state.
    #[error("{0}")]
    UserError(String),

    /// Request was rejected before touching the lock table.
    #[error("validation failed: {0}")]
    ValidationError(String),

    /// Requested file set collides with active leases held by another
    /// feature. No locks were created.
    #[error("acquisition refused: {} file(s) locked by other features", .0.len())]
    Conflict(Vec<FileConflict>),

    /// The targeted lock does not exist or has already expired.
    #[error("lock not found: {0}")]
    NotFound(String),

    /// Owner-gated operation attempted by a non-owning identity.
    #[error("permission denied: {0}")]
    Denied(String),
}

impl LeaseError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LeaseError::UserError(_) => exit_codes::USER_ERROR,
            LeaseError::ValidationError(_) => exit_codes::VALIDATION_FAILURE,
            LeaseError::Conflict(_) => exit_codes::CONFLICT,
            LeaseError::NotFound(_) => exit_codes::NOT_FOUND,
            LeaseError::Denied(_) => exit_codes::DENIED,
        }
    }
}

/// Result type alias for filelease operations.
pub type Result<T> = std::result::Result<T, LeaseError>;
