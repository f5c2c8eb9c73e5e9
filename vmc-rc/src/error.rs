//! Error responses for vmc-rc
//!
//! Every failure is answered with `{"error": message, "kind": kind}`.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body could not be decoded (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Controller, rules or store error
    #[error(transparent)]
    Common(#[from] vmc_common::Error),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        use vmc_common::Error;
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Common(err) => match err {
                Error::NotFound(_) => StatusCode::NOT_FOUND,
                Error::InvalidArgument(_) => StatusCode::BAD_REQUEST,
                Error::InvalidState(_) | Error::Conflict(_) => StatusCode::CONFLICT,
                Error::Busy(_) => StatusCode::TOO_MANY_REQUESTS,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "invalid_argument",
            ApiError::Common(err) => err.kind(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let body = Json(json!({
            "error": self.to_string(),
            "kind": self.kind(),
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use vmc_common::Error;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (Error::NotFound("x".into()), StatusCode::NOT_FOUND),
            (Error::InvalidArgument("x".into()), StatusCode::BAD_REQUEST),
            (Error::InvalidState("x".into()), StatusCode::CONFLICT),
            (Error::Conflict("x".into()), StatusCode::CONFLICT),
            (Error::Busy("x".into()), StatusCode::TOO_MANY_REQUESTS),
            (Error::Config("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
    }

    #[test]
    fn test_kind_passes_through() {
        let err = ApiError::from(Error::InvalidState("Cannot end set with tied score".into()));
        assert_eq!(err.kind(), "invalid_state");
        assert_eq!(err.to_string(), "Invalid state: Cannot end set with tied score");
    }
}
