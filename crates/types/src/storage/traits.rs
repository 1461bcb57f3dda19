//! Storage traits for pluggable cache and rate-limit backends

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

use super::StorageResult;
use crate::providers::{ProviderResult, RateLimitQuota};

/// Outcome of one atomic increment-and-compare on a rate-limit counter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitCheck {
	/// Whether the request fits in the current window
	pub allowed: bool,
	/// Requests counted in the current window, including this one when allowed
	pub used: u32,
	/// Remaining requests in the current window
	pub remaining: u32,
	/// When the current window ends
	pub reset_at: DateTime<Utc>,
	/// Total limit for the window
	pub limit: u32,
}

/// Statistics about storage usage
#[derive(Debug, Clone, Default, Serialize)]
pub struct StorageStats {
	pub cached_results: usize,
	pub rate_limit_keys: usize,
	pub backend: &'static str,
}

/// Key-value store for provider results with per-entry TTL
#[async_trait]
pub trait AvailabilityCacheTrait: Send + Sync {
	/// Get a cached result if present and not expired
	async fn get_cached(&self, key: &str) -> StorageResult<Option<ProviderResult>>;

	/// Store a result, replacing any previous value
	async fn set_cached(&self, key: &str, result: &ProviderResult, ttl: Duration)
		-> StorageResult<()>;

	/// Remove a cached result
	async fn remove_cached(&self, key: &str) -> StorageResult<bool>;

	/// Drop expired entries, returning how many were removed
	async fn cleanup_expired(&self) -> StorageResult<usize>;
}

/// Fixed-window counters used for provider admission
#[async_trait]
pub trait RateLimitStoreTrait: Send + Sync {
	/// Atomically count one request against `key` if it fits in `quota`
	///
	/// Rejected requests are not counted.
	async fn increment_and_check(
		&self,
		key: &str,
		quota: RateLimitQuota,
	) -> StorageResult<RateLimitCheck>;

	/// Requests counted in the current window
	async fn get_usage(&self, key: &str) -> StorageResult<u32>;

	/// Reset the counter for a key
	async fn reset(&self, key: &str) -> StorageResult<()>;
}

/// Main storage trait that combines all storage operations
#[async_trait]
pub trait StorageTrait: AvailabilityCacheTrait + RateLimitStoreTrait {
	/// Health check for the storage system
	async fn health_check(&self) -> StorageResult<bool>;

	/// Get overall storage statistics
	async fn stats(&self) -> StorageResult<StorageStats>;

	/// Close the storage connection
	async fn close(&self) -> StorageResult<()>;

	/// Start any background tasks associated with the storage implementation (e.g., TTL cleanup).
	/// Default implementation does nothing.
	async fn start_background_tasks(&self) -> StorageResult<()> {
		Ok(())
	}
}
