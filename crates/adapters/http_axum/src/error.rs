//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use autoflow_domain::error::{AutoflowError, ValidationError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`AutoflowError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(AutoflowError);

impl ApiError {
    /// A path segment that should have been an id but is not.
    #[must_use]
    pub fn invalid_id(raw: &str) -> Self {
        Self(ValidationError::InvalidId(raw.to_string()).into())
    }
}

impl From<AutoflowError> for ApiError {
    fn from(err: AutoflowError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            AutoflowError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            AutoflowError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            AutoflowError::Storage(err) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autoflow_domain::error::NotFoundError;

    #[test]
    fn should_map_validation_error_to_bad_request() {
        let response = ApiError::invalid_id("nope").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn should_map_not_found_error_to_404() {
        let err = AutoflowError::from(NotFoundError {
            entity: "Automation",
            id: "x".to_string(),
        });
        assert_eq!(ApiError::from(err).into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn should_hide_storage_details() {
        let err = AutoflowError::Storage("disk on fire".into());
        assert_eq!(
            ApiError::from(err).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
