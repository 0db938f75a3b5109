use api_shared::ErrorRes;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

/// Error returned by the REST handlers.
///
/// Rendered as `{"detail": "..."}` with the carried status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    /// A 500 whose detail reads `Failed to <action>: <cause>`.
    pub fn internal(action: &str, cause: impl std::fmt::Display) -> Self {
        let detail = format!("Failed to {action}: {cause}");
        tracing::error!("{detail}");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let detail = rejection.body_text();
        tracing::warn!("rejected request body: {detail}");
        Self {
            status: rejection.status(),
            detail,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorRes { detail: self.detail })).into_response()
    }
}
