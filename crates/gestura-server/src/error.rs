use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use gestura_core::error::{FieldError, GesturaError};
use thiserror::Error;

/// Errors returned from HTTP handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid gesture data")]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    NotFound(&'static str),

    /// `message` goes to the client; `source` is only logged.
    #[error("{message}: {source}")]
    Internal {
        message: &'static str,
        #[source]
        source: GesturaError,
    },
}

impl ApiError {
    pub fn internal(message: &'static str, source: GesturaError) -> Self {
        match source {
            GesturaError::Validation(fields) => Self::Validation(fields),
            source => Self::Internal { message, source },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(vec![FieldError::new("body", rejection.body_text())])
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(details) => {
                tracing::debug!("Rejected submission: {:?}", details);
                (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({
                        "error": "Invalid gesture data",
                        "details": details,
                    })),
                )
                    .into_response()
            }
            Self::NotFound(message) => (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({ "error": message })),
            )
                .into_response(),
            Self::Internal { message, source } => {
                tracing::error!("{}: {}", message, source);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({ "error": message })),
                )
                    .into_response()
            }
        }
    }
}
