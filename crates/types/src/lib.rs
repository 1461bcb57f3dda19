//! Brandmark Types
//!
//! Shared models and traits for the brand-name availability aggregator.
//! Domain models are organized by entity: providers, checks, live sessions
//! and storage.

pub mod checks;
pub mod constants;
pub mod providers;
pub mod sessions;
pub mod storage;

// Re-export chrono and serde_json for convenience
pub use chrono;
pub use serde_json;

// Re-export commonly used types for convenience
pub use checks::{
	normalize_name, validate_name, BulkCheckRequest, BulkCheckResponse, BulkCheckStatus,
	BulkCheckSummary, CheckError, CheckResult, CheckResults, CheckStatus, CheckTask,
	CheckValidationError, CheckValidationResult, GroupResults, NameAvailability, NameCheck,
	NameCheckOptions, NameCheckRequest, NameCheckSummary, NameRanking, ProviderInfo,
	ProvidersResponse,
};

pub use providers::{
	Availability, ConnectorError, ConnectorResponse, ConnectorResult, ProviderConnector,
	ProviderGroup, ProviderResult, RateLimitQuota,
};

pub use sessions::{
	CheckSession, ClientMessage, Progress, ProgressEvent, ProgressResult, ResultStatus,
	SessionError,
};

pub use storage::{
	AvailabilityCacheTrait, RateLimitCheck, RateLimitStoreTrait, StorageError, StorageResult,
	StorageStats, StorageTrait,
};
