//! Error types for provider connector operations

use thiserror::Error;

/// Errors raised by a provider connector while checking a name
#[derive(Error, Debug)]
pub enum ConnectorError {
	#[error("Timeout occurred after {timeout_ms}ms")]
	Timeout { timeout_ms: u64 },

	#[error("HTTP request failed: {0}")]
	Http(#[from] reqwest::Error),

	#[error("HTTP {status_code}: {reason}")]
	HttpStatus { status_code: u16, reason: String },

	#[error("Rate limited by upstream provider {provider}")]
	RateLimited { provider: String },

	#[error("Invalid response format: {reason}")]
	InvalidResponse { reason: String },

	#[error("Configuration error: {reason}")]
	Config { reason: String },

	#[error("Network error: {0}")]
	Network(String),
}

impl ConnectorError {
	/// Whether the failure is worth retrying later
	pub fn is_transient(&self) -> bool {
		match self {
			ConnectorError::Timeout { .. }
			| ConnectorError::RateLimited { .. }
			| ConnectorError::Network(_) => true,
			ConnectorError::Http(e) => e.is_timeout() || e.is_connect(),
			ConnectorError::HttpStatus { status_code, .. } => *status_code >= 500,
			ConnectorError::InvalidResponse { .. } | ConnectorError::Config { .. } => false,
		}
	}
}

pub type ConnectorResult<T> = Result<T, ConnectorError>;
