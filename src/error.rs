//! Error types for the library console client

use thiserror::Error;

use crate::models::user::RoleChange;

/// Message carried by every unauthorized failure
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized. Please login again.";

/// Coarse error classes callers branch on for UI treatment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Server answered 401, or the local token is missing/expired/malformed
    Unauthorized,
    /// Any other non-2xx status
    Operation,
    /// Network unreachable or malformed response body
    Transport,
    /// Payload rejected locally, nothing was sent
    Validation,
    /// Token store could not be read or written
    Session,
}

/// Main client error type
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("{}", UNAUTHORIZED_MESSAGE)]
    Unauthorized,

    #[error("{operation} failed: {status}")]
    Operation { operation: String, status: u16 },

    #[error("{operation} failed: {source}")]
    Transport {
        operation: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{operation} returned an unreadable body: {source}")]
    Decode {
        operation: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Session store error: {0}")]
    Session(String),

    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Unauthorized => ErrorKind::Unauthorized,
            ClientError::Operation { .. } => ErrorKind::Operation,
            ClientError::Transport { .. } | ClientError::Decode { .. } => ErrorKind::Transport,
            ClientError::Validation(_) | ClientError::InvalidBaseUrl(_) => ErrorKind::Validation,
            ClientError::Session(_) => ErrorKind::Session,
        }
    }

    /// True when the caller should force a logout and send the user to login
    pub fn is_unauthorized(&self) -> bool {
        self.kind() == ErrorKind::Unauthorized
    }

    /// HTTP status of the failed response, when there was one
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Unauthorized => Some(401),
            ClientError::Operation { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ClientError::Validation(errors.to_string())
    }
}

/// A multi-step role update stopped part way.
///
/// Changes in `applied` reached the server and are not rolled back; `skipped`
/// were never attempted.
#[derive(Error, Debug)]
#[error("{failed} for user {user_id} failed after {applied_count} applied change(s): {source}", applied_count = .applied.len())]
pub struct AssignmentError {
    pub user_id: i64,
    pub applied: Vec<RoleChange>,
    pub failed: RoleChange,
    pub skipped: Vec<RoleChange>,
    #[source]
    pub source: ClientError,
}

impl AssignmentError {
    pub fn is_unauthorized(&self) -> bool {
        self.source.is_unauthorized()
    }
}

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;
