//! Roster service error types.
//!
//! Membership conflicts (already joined, not on the roster) are ordinary
//! outcomes, not errors. The variants here cover malformed input, a degraded
//! admin store, and a manager that has shut down. Internal details are logged
//! server-side but not shown to chat users.

use common::types::HandleError;
use thiserror::Error;

/// Roster service error type.
#[derive(Debug, Error)]
pub enum RosterError {
    /// Handle passed to an admin operation is empty or malformed.
    #[error("Invalid handle: {0}")]
    InvalidHandle(String),

    /// Admin store read or write failed.
    ///
    /// Logged and swallowed by the manager; roster operations never fail
    /// because of it.
    #[error("Admin store unavailable: {0}")]
    ExternalStoreUnavailable(String),

    /// Manager mailbox closed (shutdown) or reply dropped.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RosterError {
    /// Returns a chat-safe message (no internal details).
    pub fn client_message(&self) -> String {
        match self {
            RosterError::InvalidHandle(_) => {
                "That doesn't look like a valid @handle.".to_string()
            }
            RosterError::ExternalStoreUnavailable(_) | RosterError::Internal(_) => {
                "Something went wrong, please try again later.".to_string()
            }
        }
    }
}

impl From<HandleError> for RosterError {
    fn from(err: HandleError) -> Self {
        RosterError::InvalidHandle(err.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_client_messages_hide_internal_details() {
        let store_err = RosterError::ExternalStoreUnavailable(
            "connection refused at 10.0.0.5:5432".to_string(),
        );
        assert!(!store_err.client_message().contains("10.0.0.5"));

        let internal = RosterError::Internal("channel send failed".to_string());
        assert!(!internal.client_message().contains("channel"));
    }

    #[test]
    fn test_handle_error_conversion() {
        let err: RosterError = HandleError::Empty.into();
        assert!(matches!(err, RosterError::InvalidHandle(_)));
        assert_eq!(format!("{err}"), "Invalid handle: handle is empty");
    }

    #[test]
    fn test_display_formatting() {
        assert_eq!(
            format!(
                "{}",
                RosterError::ExternalStoreUnavailable("timeout".to_string())
            ),
            "Admin store unavailable: timeout"
        );
        assert_eq!(
            format!("{}", RosterError::Internal("mailbox closed".to_string())),
            "Internal error: mailbox closed"
        );
    }
}
