use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// The application's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// A validation error (malformed or missing input).
    #[error("Validation error: {0}")]
    Validation(String),

    /// An authentication failure with a caller-safe message.
    ///
    /// The message carried here is what the caller sees; backend detail must
    /// be logged at the call site before mapping into this variant so that
    /// account-existence information never leaks.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// A missing or rejected credential.
    #[error("Unauthorized")]
    Unauthorized,

    /// A resource not found error.
    #[error("Resource not found")]
    NotFound,

    /// An error reported by the backend record service.
    ///
    /// The status and message are passed through to the caller verbatim.
    /// This is intentionally asymmetric with the auth variants above: CRUD
    /// failures on owned resources echo backend detail, auth failures do not.
    #[error("Backend error ({status}): {message}")]
    Backend {
        status: StatusCode,
        message: String,
    },

    /// A transport-level failure talking to an upstream service.
    #[error("Upstream request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// An internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Validation(ref msg) => {
                tracing::debug!("Validation error: {}", msg);
                (StatusCode::BAD_REQUEST, msg.clone())
            }

            AppError::Authentication(ref msg) => {
                tracing::warn!("Authentication failed: {}", msg);
                (StatusCode::UNAUTHORIZED, msg.clone())
            }

            AppError::Unauthorized => {
                tracing::warn!("Unauthorized request");
                (StatusCode::UNAUTHORIZED, "Unauthorized".to_string())
            }

            AppError::NotFound => {
                tracing::debug!("Resource not found");
                (StatusCode::NOT_FOUND, "Resource not found".to_string())
            }

            AppError::Backend { status, ref message } => {
                tracing::error!("Backend error ({}): {}", status, message);
                (status, message.clone())
            }

            AppError::Http(ref e) => {
                tracing::error!("Upstream request failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }

            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = sonic_rs::to_string(&sonic_rs::json!({
            "success": false,
            "error": message
        }))
        .unwrap_or_else(|_| r#"{"success":false,"error":"Internal server error"}"#.to_string());

        (
            status,
            [(http::header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response()
    }
}
