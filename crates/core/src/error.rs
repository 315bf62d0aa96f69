//! Error types for the Portaria assistant.
//!
//! Two layers live here:
//! - [`ApiError`]: the failure taxonomy of a single backend call (transport,
//!   HTTP status, backend-reported message).
//! - [`AppError`]: the unified application error returned by fallible
//!   functions outside the store boundary (configuration, I/O, CLI).

use thiserror::Error;

/// Failure of a single call to the backend.
///
/// The `Display` text is the user-facing Portuguese message shown when the
/// backend did not provide its own.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request never reached a server (DNS, refused connection, timeout).
    #[error("Erro de conexão com o servidor")]
    Connection,

    /// The backend answered with a non-success status and no usable message.
    #[error("Erro do servidor: {0}")]
    Server(u16),

    /// The backend answered with a non-success status and an `{ "error": ... }` body.
    #[error("{message}")]
    Application { status: u16, message: String },

    /// Anything else: request construction, malformed response body.
    #[error("Erro ao processar requisição")]
    Unknown(String),
}

impl ApiError {
    /// Message to surface to the user for a failed operation.
    ///
    /// A backend-provided message wins; every other failure collapses to the
    /// operation's fixed `default`.
    pub fn user_message(&self, default: &str) -> String {
        match self {
            ApiError::Application { message, .. } => message.clone(),
            _ => default.to_string(),
        }
    }

    /// HTTP status carried by the failure, if the backend was reached.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server(status) | ApiError::Application { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() || err.is_request() {
            ApiError::Connection
        } else if let Some(status) = err.status() {
            ApiError::Server(status.as_u16())
        } else {
            ApiError::Unknown(err.to_string())
        }
    }
}

/// Unified error type for the Portaria assistant.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Backend call failures that escaped the store boundary
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
