use axum::{
    Json,
    response::{IntoResponse, Response},
};
use http::{HeaderName, HeaderValue, StatusCode, header};
use serde_json::json;

use super::AppError;

/// The request-level operation a response belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    Health,
}

impl Operation {
    pub fn failure_message(self) -> &'static str {
        match self {
            Operation::Create => "Failed to create item",
            Operation::Read => "Failed to retrieve items",
            Operation::Update => "Failed to update item",
            Operation::Delete => "Failed to delete item",
            Operation::Health => "Record store unavailable",
        }
    }

    pub fn allowed_methods(self) -> &'static str {
        match self {
            Operation::Create => "POST, OPTIONS",
            Operation::Read | Operation::Health => "GET, OPTIONS",
            Operation::Update => "PUT, OPTIONS",
            Operation::Delete => "DELETE, OPTIONS",
        }
    }

    /// Response header part carrying this operation's allowed methods.
    pub fn headers(self) -> [(HeaderName, HeaderValue); 1] {
        [(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(self.allowed_methods()),
        )]
    }
}

/// An [`AppError`] bound to the operation that produced it.
///
/// This is the only place errors become HTTP responses.
#[derive(Debug)]
pub struct ApiError {
    pub operation: Operation,
    pub error: AppError,
}

impl ApiError {
    pub fn new(operation: Operation, error: AppError) -> Self {
        Self { operation, error }
    }
}

/// Attaches the failing operation to an [`AppError`] result.
pub trait WithOperation<T> {
    fn during(self, operation: Operation) -> Result<T, ApiError>;
}

impl<T> WithOperation<T> for Result<T, AppError> {
    fn during(self, operation: Operation) -> Result<T, ApiError> {
        self.map_err(|error| ApiError::new(operation, error))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.error {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Dependency(_) | AppError::ConfigError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = if status.is_server_error() {
            tracing::error!("{:?} failed: {}", self.operation, self.error);
            json!({
                "message": self.operation.failure_message(),
                "error": self.error.detail(),
            })
        } else {
            json!({ "message": self.error.detail() })
        };

        (status, self.operation.headers(), Json(body)).into_response()
    }
}
