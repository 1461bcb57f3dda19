//! Availability cache layer
//!
//! Cache failures never fail a check: reads degrade to a miss and writes are
//! spawned so the caller never waits on the backend.

use async_trait::async_trait;
use brandmark_config::CacheSettings;
use brandmark_storage::Storage;
use brandmark_types::{normalize_name, ProviderResult};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Cache key of a provider result
pub fn cache_key(provider: &str, name: &str) -> String {
	format!("availability:{}:{}", provider, normalize_name(name))
}

/// Trait for the availability cache (enables easy testing and mocking)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheLayerTrait: Send + Sync {
	/// Cached result for `(provider, name)`, `None` on miss or backend failure
	async fn get_availability(&self, provider: &str, name: &str) -> Option<ProviderResult>;

	/// Store a fresh result without waiting for the backend
	async fn set_availability(&self, provider: &str, name: &str, result: &ProviderResult);
}

/// Cache layer over the configured storage backend
pub struct AvailabilityCache {
	storage: Arc<dyn Storage>,
	ttl: Duration,
	enabled: bool,
}

impl AvailabilityCache {
	pub fn new(storage: Arc<dyn Storage>, settings: &CacheSettings) -> Self {
		Self {
			storage,
			ttl: Duration::from_secs(settings.availability_ttl_seconds),
			enabled: settings.enabled,
		}
	}

	pub fn ttl(&self) -> Duration {
		self.ttl
	}
}

#[async_trait]
impl CacheLayerTrait for AvailabilityCache {
	async fn get_availability(&self, provider: &str, name: &str) -> Option<ProviderResult> {
		if !self.enabled {
			return None;
		}

		let key = cache_key(provider, name);
		match self.storage.get_cached(&key).await {
			Ok(Some(result)) => {
				debug!("Cache HIT for {}", key);
				Some(result)
			},
			Ok(None) => None,
			Err(e) => {
				warn!("Cache read failed for {}: {}", key, e);
				None
			},
		}
	}

	async fn set_availability(&self, provider: &str, name: &str, result: &ProviderResult) {
		// Failed checks are retried on the next request instead of being cached
		if !self.enabled || result.is_error() {
			return;
		}

		let key = cache_key(provider, name);
		let storage = Arc::clone(&self.storage);
		let result = result.clone();
		let ttl = self.ttl;

		tokio::spawn(async move {
			if let Err(e) = storage.set_cached(&key, &result, ttl).await {
				warn!("Cache write failed for {}: {}", key, e);
			}
		});
	}
}
