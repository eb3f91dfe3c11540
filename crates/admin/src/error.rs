//! Error types for the back-office authorization layer.

use marketplace_core::UserId;
use thiserror::Error;

/// Errors returned by an [`AccessDirectory`](crate::directory::AccessDirectory).
#[derive(Debug, Clone, Error)]
pub enum DirectoryError {
    /// The directory could not be reached.
    #[error("directory unavailable: {0}")]
    Unavailable(String),

    /// The directory answered with an error.
    #[error("directory rejected query: {0}")]
    Rejected(String),

    /// Assignment data could not be parsed.
    #[error("invalid assignment data: {0}")]
    InvalidData(String),
}

impl From<serde_json::Error> for DirectoryError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidData(err.to_string())
    }
}

/// Errors raised while resolving the current user's access.
///
/// These never reach callers of the boolean predicates: a failed refresh
/// publishes an empty snapshot and the error goes to Sentry.
#[derive(Debug, Error)]
pub enum AccessError {
    /// Fetching role or permission assignments failed.
    #[error("authorization fetch failed for user {user_id}: {source}")]
    FetchFailed {
        user_id: UserId,
        #[source]
        source: DirectoryError,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_access_error_display() {
        let user_id: UserId = "0b8e4f7a-3c2d-4e1f-9a6b-5c4d3e2f1a0b".parse().unwrap();
        let err = AccessError::FetchFailed {
            user_id,
            source: DirectoryError::Unavailable("connection reset".to_string()),
        };
        assert_eq!(
            err.to_string(),
            format!(
                "authorization fetch failed for user {user_id}: directory unavailable: connection reset"
            )
        );
    }

    #[test]
    fn test_from_json_error() {
        let err = serde_json::from_str::<Vec<String>>("{").unwrap_err();
        assert!(matches!(DirectoryError::from(err), DirectoryError::InvalidData(_)));
    }
}
