//! Error responses for the HTTP API.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use iris_data::DataError;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

/// Failures a request can end in.
///
/// Rendered as `{"error": "..."}` with the matching status code.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Well-formed JSON whose feature values are unusable.
    #[error(transparent)]
    InvalidInput(#[from] DataError),
    /// The body could not be extracted as JSON of the expected shape.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
    /// The model failed on valid input.
    #[error("prediction failed")]
    Internal,
}

impl ApiError {
    /// Logs `err` and returns an opaque internal error.
    pub fn internal(err: &anyhow::Error) -> Self {
        error!(error = ?err, "Prediction failed");
        Self::Internal
    }

    /// Status code sent to the client.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Rejected { status, .. } => *status,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        debug!(%status, error = %self, "Request rejected");

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
