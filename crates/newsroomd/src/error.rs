//! API error types

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use newsroom_core::{NewsroomError, ValidationError};
use thiserror::Error;

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Handler error carrying its HTTP status.
///
/// Client errors render as `{error, detail}`; server errors as
/// `{status: "error", message}`.
#[derive(Debug, Clone, Error)]
#[error("[{status}] {message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub detail: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            detail: None,
        }
    }

    /// 400 Bad Request
    pub fn bad_request(message: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            detail: Some(detail.into()),
        }
    }

    /// 500 Internal Server Error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Map a core error: validation problems are the caller's fault,
    /// everything else is ours. `context` prefixes the 500 message.
    pub fn from_core(err: NewsroomError, context: &str) -> Self {
        match err {
            NewsroomError::Validation(v) => Self::invalid(v),
            other => Self::internal(format!("{context}: {other}")),
        }
    }

    pub fn invalid(err: ValidationError) -> Self {
        let message = match err {
            ValidationError::EmptyTopic => "La solicitud de noticia es requerida",
            ValidationError::EmptyQuery => "El campo 'query' es requerido",
            ValidationError::InvalidMaxIterations(_)
            | ValidationError::InvalidQualityThreshold(_) => "Parámetros de solicitud inválidos",
        };
        Self::bad_request(message, err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request("Cuerpo JSON inválido", rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = if self.status.is_client_error() {
            serde_json::json!({
                "error": self.message,
                "detail": self.detail,
            })
        } else {
            serde_json::json!({
                "status": "error",
                "message": self.message,
            })
        };

        (self.status, Json(body)).into_response()
    }
}
