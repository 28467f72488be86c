use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use els_core::CoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `els-core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A requested resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Validation errors additionally carry the failing question key so
        // the client can re-prompt for exactly that question.
        let mut question: Option<String> = None;

        let (status, code, message) = match &self {
            AppError::Core(core) => match core {
                CoreError::Validation { question: q, reason } => {
                    // An empty key means the submission failed before any
                    // question was reached (bad payload shape, blank
                    // annotator id); there is nothing to re-prompt for.
                    let message = if q.is_empty() {
                        reason.clone()
                    } else {
                        question = Some(q.clone());
                        format!("Question '{q}': {reason}")
                    };
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
                }
                CoreError::UnknownImage { image_id } => (
                    StatusCode::NOT_FOUND,
                    "UNKNOWN_IMAGE",
                    format!("Image '{image_id}' is not in the current image set"),
                ),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Storage(msg) => {
                    tracing::error!(error = %msg, "Storage error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let Some(q) = question {
            body["question"] = json!(q);
        }

        (status, axum::Json(body)).into_response()
    }
}
