//! Proxy error responses

use crate::api::ErrorBody;
use crate::error::ReleaseNotesError;
use crate::log_warn;
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// A pipeline error on its way to an HTTP client
#[derive(Debug)]
pub struct ApiError(pub ReleaseNotesError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ReleaseNotesError::Validation(_) | ReleaseNotesError::ProviderConfig(_) => {
                StatusCode::BAD_REQUEST
            }
            ReleaseNotesError::PrivateRepoAuthRequired => StatusCode::UNAUTHORIZED,
            ReleaseNotesError::TokenLimit(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ReleaseNotesError::Fetch(_) | ReleaseNotesError::VisibilityCheck(_) => {
                StatusCode::BAD_GATEWAY
            }
            ReleaseNotesError::Generation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ReleaseNotesError> for ApiError {
    fn from(error: ReleaseNotesError) -> Self {
        Self(error)
    }
}

/// Malformed or mistyped request bodies are validation failures
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(ReleaseNotesError::Validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        log_warn!("Proxy request failed ({}): {}", status, self.0);
        (status, Json(ErrorBody::from(&self.0))).into_response()
    }
}
