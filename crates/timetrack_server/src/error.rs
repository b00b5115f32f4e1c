//! HTTP error mapping.
//!
//! Core operations report an [`ErrorKind`]; this module turns it into a
//! status code and a `{"error": "..."}` body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{debug, error};
use serde_json::json;
use std::fmt::{Display, Formatter};
use timetrack_core::{
    ErrorKind, PassportError, PeriodError, PersonServiceError, RepoError, TaskServiceError,
};

use crate::people_api::LookupError;

/// Failure returned from a route handler.
#[derive(Debug)]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Status code for each abstract error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::PreconditionFailed => StatusCode::PRECONDITION_REQUIRED,
        ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Storage => StatusCode::INTERNAL_SERVER_ERROR,
        ErrorKind::Upstream => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(self.kind);
        if status.is_server_error() {
            error!(
                "event=http_error module=server kind={} error={}",
                self.kind, self.message
            );
        } else {
            debug!(
                "event=http_error module=server kind={} error={}",
                self.kind, self.message
            );
        }
        (status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<TaskServiceError> for ApiError {
    fn from(value: TaskServiceError) -> Self {
        Self::new(value.kind(), value.to_string())
    }
}

impl From<PersonServiceError> for ApiError {
    fn from(value: PersonServiceError) -> Self {
        Self::new(value.kind(), value.to_string())
    }
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        Self::new(value.kind(), value.to_string())
    }
}

impl From<PassportError> for ApiError {
    fn from(value: PassportError) -> Self {
        Self::new(ErrorKind::Validation, value.to_string())
    }
}

impl From<PeriodError> for ApiError {
    fn from(value: PeriodError) -> Self {
        Self::new(ErrorKind::Validation, value.to_string())
    }
}

impl From<LookupError> for ApiError {
    fn from(value: LookupError) -> Self {
        Self::new(ErrorKind::Upstream, value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{status_for, ApiError};
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use timetrack_core::{ErrorKind, TaskServiceError};

    #[test]
    fn every_kind_has_a_distinct_status() {
        assert_eq!(status_for(ErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorKind::Conflict), StatusCode::CONFLICT);
        assert_eq!(
            status_for(ErrorKind::PreconditionFailed),
            StatusCode::PRECONDITION_REQUIRED
        );
        assert_eq!(
            status_for(ErrorKind::Validation),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(ErrorKind::Storage),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_for(ErrorKind::Upstream),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn service_errors_keep_their_kind() {
        let err = ApiError::from(TaskServiceError::NotStarted(3));
        assert_eq!(err.kind(), ErrorKind::PreconditionFailed);
        assert!(err.message().contains("3"));
        assert_eq!(
            err.into_response().status(),
            StatusCode::PRECONDITION_REQUIRED
        );
    }
}
