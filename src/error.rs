//! Error types for the Google Docs bridge
//!
//! Every failure is classified into an [`ErrorKind`], which decides the HTTP
//! status of the JSON-RPC error envelope.

use axum::http::StatusCode;
use thiserror::Error;

/// Main error type for the bridge
#[derive(Error, Debug)]
pub enum BridgeError {
    /// OAuth authentication errors
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Docs/Drive API errors
    #[error(transparent)]
    Docs(#[from] DocsApiError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// JSON-RPC request errors
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// OAuth authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Client secrets file not found: {path}")]
    SecretsFileNotFound { path: String },

    #[error("Invalid client secrets file {path}: {message}")]
    InvalidSecrets { path: String, message: String },

    #[error("User not authorized. Visit /authorize")]
    NotAuthorized,

    #[error("Credentials expired and no refresh token is available. Visit /authorize")]
    RefreshTokenMissing,

    #[error("Failed to refresh credentials: {message}")]
    TokenRefreshFailed { message: String },

    #[error("No code in callback")]
    NoAuthCode,

    #[error("Token exchange failed: {message}")]
    TokenExchangeFailed { message: String },
}

/// Docs/Drive API errors
#[derive(Error, Debug)]
pub enum DocsApiError {
    #[error("{operation} failed ({status}): {message}")]
    RequestFailed {
        operation: &'static str,
        status: u16,
        message: String,
    },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value}")]
    InvalidVar { var: String, value: String },
}

/// JSON-RPC request errors
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Unknown method {method}")]
    UnknownMethod { method: String },

    #[error("missing param: {key}")]
    MissingParam { key: String },

    #[error("invalid param: {key} must be {expected}")]
    InvalidParam { key: String, expected: &'static str },

    #[error("unsupported format: {format}")]
    UnsupportedFormat { format: String },
}

/// Coarse classification used for response framing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unauthorized,
    BadRequest,
    Internal,
}

impl ErrorKind {
    /// HTTP status carried by the error envelope
    pub const fn status(self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl BridgeError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Auth(err) => match err {
                AuthError::NotAuthorized
                | AuthError::RefreshTokenMissing
                | AuthError::TokenRefreshFailed { .. } => ErrorKind::Unauthorized,
                AuthError::NoAuthCode | AuthError::TokenExchangeFailed { .. } => {
                    ErrorKind::BadRequest
                }
                AuthError::SecretsFileNotFound { .. } | AuthError::InvalidSecrets { .. } => {
                    ErrorKind::Internal
                }
            },
            Self::Rpc(_) => ErrorKind::BadRequest,
            Self::Docs(_)
            | Self::Config(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::Http(_) => ErrorKind::Internal,
        }
    }

    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        self.kind().status()
    }
}

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RpcError::MissingParam {
            key: "documentId".to_string(),
        };
        assert_eq!(err.to_string(), "missing param: documentId");

        let err = AuthError::TokenRefreshFailed {
            message: "invalid_grant".to_string(),
        };
        assert!(err.to_string().contains("invalid_grant"));
    }

    #[test]
    fn test_error_conversion() {
        let err: BridgeError = AuthError::NoAuthCode.into();
        assert!(matches!(err, BridgeError::Auth(_)));
        assert_eq!(err.to_string(), "No code in callback");
    }

    #[test]
    fn test_error_kinds() {
        let unauthorized: BridgeError = AuthError::NotAuthorized.into();
        assert_eq!(unauthorized.kind(), ErrorKind::Unauthorized);
        assert_eq!(unauthorized.status(), StatusCode::UNAUTHORIZED);

        let bad: BridgeError = RpcError::UnknownMethod {
            method: "nope".to_string(),
        }
        .into();
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

        let remote: BridgeError = DocsApiError::RequestFailed {
            operation: "get_doc",
            status: 404,
            message: "not found".to_string(),
        }
        .into();
        assert_eq!(remote.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
