use axum::{http::StatusCode, response::Json};
use brandmark_service::CheckServiceError;
use serde::Serialize;

/// Error response format shared by handlers
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
	pub error: String,
	pub message: String,
	pub timestamp: i64,
}

/// Rejection returned by handlers
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn error_response(status: StatusCode, error: &str, message: impl Into<String>) -> ApiError {
	(
		status,
		Json(ErrorResponse {
			error: error.to_string(),
			message: message.into(),
			timestamp: chrono::Utc::now().timestamp(),
		}),
	)
}

/// Map a service error to its HTTP status and error code
pub fn check_error(err: CheckServiceError) -> ApiError {
	let (status, code) = match &err {
		CheckServiceError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
		CheckServiceError::InvalidProvider { .. } => (StatusCode::BAD_REQUEST, "INVALID_PROVIDER"),
		CheckServiceError::RateLimited { .. } => (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED"),
		CheckServiceError::Session(_) => (StatusCode::CONFLICT, "SESSION_ERROR"),
		CheckServiceError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CHECK_ERROR"),
	};
	error_response(status, code, err.to_string())
}
