//! Mapping from service errors to HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sketch::SketchError;

/// Error returned by every handler.
#[derive(Debug)]
pub enum ApiError {
    /// The request could not be decoded or failed validation.
    BadRequest(String),
    /// The service rejected or failed the operation.
    Service(SketchError),
    /// Something outside the service failed (e.g. a panicked render task).
    Internal(String),
}

impl From<SketchError> for ApiError {
    fn from(err: SketchError) -> Self {
        Self::Service(err)
    }
}

/// Status code for a service error.
///
/// Bounds violations are the client's fault; a missing canvas is 404;
/// everything else is a server-side failure.
pub fn status_for(err: &SketchError) -> StatusCode {
    match err {
        SketchError::OutOfBounds(_) => StatusCode::BAD_REQUEST,
        SketchError::CanvasNotFound { .. } => StatusCode::NOT_FOUND,
        SketchError::InvalidTask { .. } | SketchError::Cancelled | SketchError::Store(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        },
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::Service(err) => {
                let status = status_for(&err);
                if status.is_server_error() {
                    tracing::error!(error = %err, "request failed");
                }
                (status, err.to_string())
            },
            Self::Internal(message) => {
                tracing::error!(error = %message, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            },
        };
        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sketch::BoundsViolation;
    use uuid::Uuid;

    #[test]
    fn service_errors_map_to_statuses() {
        assert_eq!(
            status_for(&SketchError::OutOfBounds(BoundsViolation::DegenerateCanvas)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&SketchError::CanvasNotFound { id: Uuid::nil() }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&SketchError::InvalidTask {
                task_id: None,
                kind: "circle".to_string()
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(status_for(&SketchError::Cancelled), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            status_for(&SketchError::Store("down".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn bad_request_response() {
        let response = ApiError::BadRequest("nope".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
