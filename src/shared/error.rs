//! Error taxonomy shared by the client engine and the API gateway.
//!
//! `Unauthenticated`, `Forbidden`, `NotFound` and `ValidationFailed` surface
//! directly to the caller as terminal failures of a single operation and are
//! never retried automatically. `TransientSyncConflict` is not a hard error:
//! the board sync client handles it locally with a refetch-and-replace and it
//! only becomes user-visible if the refetch itself fails.

use thiserror::Error;

/// Failure of a single client-side sync or API operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// No credential, or the credential was rejected.
    #[error("authentication required")]
    Unauthenticated,

    /// Authenticated but lacking the project role for this action.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Referenced task or project is absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed input fields.
    #[error("validation failed for '{field}': {message}")]
    ValidationFailed { field: String, message: String },

    /// Optimistic local state diverged from the store. Handled by refetch.
    #[error("sync conflict: {0}")]
    TransientSyncConflict(String),

    /// Transport-level failure talking to the server.
    #[error("network error: {0}")]
    Network(String),

    /// Anything else; carries a description for logs.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SyncError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Terminal errors fail the operation outright; non-terminal ones are
    /// reconciled locally by the sync client.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SyncError::TransientSyncConflict(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_is_not_terminal() {
        assert!(!SyncError::TransientSyncConflict("move in flight".into()).is_terminal());
        assert!(SyncError::Unauthenticated.is_terminal());
        assert!(SyncError::validation("title", "required").is_terminal());
    }

    #[test]
    fn display_includes_context() {
        let err = SyncError::validation("email", "not an email address");
        assert_eq!(
            err.to_string(),
            "validation failed for 'email': not an email address"
        );
    }
}
