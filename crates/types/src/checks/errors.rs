//! Error types for name check operations

use thiserror::Error;

/// Validation errors for name check requests
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CheckValidationError {
	#[error("Name must be at least {min} characters (got {length})")]
	NameTooShort { length: usize, min: usize },

	#[error("Name must be at most {max} characters (got {length})")]
	NameTooLong { length: usize, max: usize },

	#[error("Name may only contain letters, digits, '-' and '_': {name}")]
	InvalidNameCharacters { name: String },

	#[error("Unknown provider group: {group}")]
	UnknownProviderGroup { group: String },

	#[error("At least one provider group must be requested")]
	EmptyProviderGroups,

	#[error("Invalid domain extension: {tld}")]
	InvalidDomain { tld: String },

	#[error("Bulk check accepts at most {max} names (got {count})")]
	TooManyNames { count: usize, max: usize },

	#[error("Bulk check requires at least one name")]
	EmptyBatch,
}

/// General name check errors
#[derive(Error, Debug)]
pub enum CheckError {
	#[error("Check validation failed: {0}")]
	Validation(#[from] CheckValidationError),

	#[error("Provider not found: {provider}")]
	ProviderNotFound { provider: String },

	#[error("Check processing failed: {reason}")]
	ProcessingFailed { reason: String },

	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}
