//! Error types for the todo sync client.
//!
//! # Design
//! The remote service wraps every response in a `{success, message, data}`
//! envelope, so failures split by where they were detected rather than by
//! HTTP status: the server said no (`RemoteOperation`), the server said yes
//! but left out a field we need (`MalformedResponse`), or the exchange never
//! produced an envelope at all (`Transport`).

/// Errors returned by `TodoClient`, `TodoApi` and the action layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The server answered `success: false`. Displays the server message
    /// verbatim so it can be shown to the user as-is.
    #[error("{0}")]
    RemoteOperation(String),

    /// The server answered `success: true` but a required field is missing.
    #[error("{0}")]
    MalformedResponse(String),

    /// The request never completed, or the body was not a JSON envelope.
    /// Displays whatever the HTTP client or JSON parser reported.
    #[error("{0}")]
    Transport(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The credential store could not persist the session token.
    #[error("credential store: {0}")]
    Credentials(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Credentials(err.to_string())
    }
}

/// Errors raised while persisting credentials.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The credential file could not be encoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_operation_displays_message_verbatim() {
        let err = ApiError::RemoteOperation("Todo tidak ditemukan".to_string());
        assert_eq!(err.to_string(), "Todo tidak ditemukan");
    }

    #[test]
    fn malformed_and_transport_display_without_prefix() {
        let err = ApiError::MalformedResponse("todo_id missing".to_string());
        assert_eq!(err.to_string(), "todo_id missing");
        let err = ApiError::Transport("connection refused".to_string());
        assert_eq!(err.to_string(), "connection refused");
    }

    #[test]
    fn store_error_converts_to_credentials() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = ApiError::from(StoreError::from(io));
        assert!(matches!(err, ApiError::Credentials(ref msg) if msg.contains("denied")));
    }
}
