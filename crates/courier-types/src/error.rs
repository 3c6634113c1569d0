use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse classification shared by every error in the workspace.
///
/// Used by notifications and by the HTTP layer to pick a status code without
/// matching on each concrete error enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Empty or missing required field.
    Validation,
    /// Account, template, or dialog absent.
    NotFound,
    /// Challenge not satisfied or credentials rejected.
    Authentication,
    /// Network or protocol failure from an external call.
    Transport,
    /// Store read/write failure.
    Persistence,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Validation => write!(f, "validation"),
            ErrorKind::NotFound => write!(f, "not_found"),
            ErrorKind::Authentication => write!(f, "authentication"),
            ErrorKind::Transport => write!(f, "transport"),
            ErrorKind::Persistence => write!(f, "persistence"),
        }
    }
}

/// Errors related to template storage and rendering.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("invalid template: {0}")]
    Validation(String),

    #[error("template '{0}' not found")]
    NotFound(String),

    #[error("template store error: {0}")]
    Persistence(String),
}

impl TemplateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TemplateError::Validation(_) => ErrorKind::Validation,
            TemplateError::NotFound(_) => ErrorKind::NotFound,
            TemplateError::Persistence(_) => ErrorKind::Persistence,
        }
    }
}

/// Errors raised by a messaging transport or one of its sessions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    /// The remote side refused the request (bad code, bad password, unknown phone).
    #[error("rejected: {0}")]
    Rejected(String),

    #[error("session is closed")]
    SessionClosed,
}

impl TransportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransportError::Rejected(_) => ErrorKind::Authentication,
            _ => ErrorKind::Transport,
        }
    }
}

/// Errors related to account registration and lifecycle.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccountError {
    #[error("invalid account request: {0}")]
    Validation(String),

    #[error("account '{0}' not found")]
    NotFound(String),

    #[error("account '{0}' is already connected")]
    AlreadyConnected(String),

    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl AccountError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AccountError::Validation(_) | AccountError::AlreadyConnected(_) => {
                ErrorKind::Validation
            }
            AccountError::NotFound(_) => ErrorKind::NotFound,
            AccountError::AuthenticationFailed(_) => ErrorKind::Authentication,
            AccountError::Transport(e) => e.kind(),
        }
    }
}
