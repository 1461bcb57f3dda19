//! Per-provider admission control
//!
//! A non-blocking gate: callers learn immediately whether a provider call
//! fits in the provider's current window and skip the call when it does not.

use async_trait::async_trait;
use brandmark_config::ProviderRateLimitSettings;
use brandmark_storage::Storage;
use brandmark_types::RateLimitQuota;
use std::sync::Arc;
use tracing::{debug, warn};

/// Trait for provider rate limiting (enables easy testing and mocking)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RateLimiterTrait: Send + Sync {
	/// Count one call against the provider's quota; `false` means skip the call
	async fn check_rate_limit(&self, provider: &str) -> bool;

	/// Quota applied to a provider
	fn quota_for(&self, provider: &str) -> RateLimitQuota;
}

/// Fixed-window rate limiter backed by the configured storage
pub struct ProviderRateLimiter {
	storage: Arc<dyn Storage>,
	settings: ProviderRateLimitSettings,
}

impl ProviderRateLimiter {
	pub fn new(storage: Arc<dyn Storage>, settings: ProviderRateLimitSettings) -> Self {
		Self { storage, settings }
	}
}

#[async_trait]
impl RateLimiterTrait for ProviderRateLimiter {
	async fn check_rate_limit(&self, provider: &str) -> bool {
		if !self.settings.enabled {
			return true;
		}

		let quota = self.quota_for(provider);
		match self.storage.increment_and_check(provider, quota).await {
			Ok(check) => {
				if !check.allowed {
					debug!(
						"Rate limit reached for {}: {}/{} until {}",
						provider, check.used, check.limit, check.reset_at
					);
				}
				check.allowed
			},
			Err(e) => {
				// Counter backend unavailable: admit rather than fail the check
				warn!("Rate limit store unavailable for {}: {}", provider, e);
				true
			},
		}
	}

	fn quota_for(&self, provider: &str) -> RateLimitQuota {
		self.settings.quota_for(provider)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use brandmark_storage::MemoryStore;
	use std::collections::HashMap;

	fn limiter(enabled: bool) -> ProviderRateLimiter {
		let settings = ProviderRateLimitSettings {
			enabled,
			default: RateLimitQuota::new(3, 60),
			providers: HashMap::from([("instagram".to_string(), RateLimitQuota::new(1, 1))]),
		};
		ProviderRateLimiter::new(Arc::new(MemoryStore::new()), settings)
	}

	#[tokio::test(start_paused = true)]
	async fn test_strict_provider_quota() {
		let limiter = limiter(true);

		assert!(limiter.check_rate_limit("instagram").await);
		assert!(!limiter.check_rate_limit("instagram").await);

		tokio::time::advance(std::time::Duration::from_millis(1_001)).await;
		assert!(limiter.check_rate_limit("instagram").await);
	}

	#[tokio::test]
	async fn test_default_quota_is_per_provider() {
		let limiter = limiter(true);

		for _ in 0..3 {
			assert!(limiter.check_rate_limit("npm").await);
		}
		assert!(!limiter.check_rate_limit("npm").await);
		assert!(limiter.check_rate_limit("pypi").await);
		assert_eq!(limiter.quota_for("npm"), RateLimitQuota::new(3, 60));
	}

	#[tokio::test]
	async fn test_disabled_limiter_always_allows() {
		let limiter = limiter(false);
		for _ in 0..10 {
			assert!(limiter.check_rate_limit("instagram").await);
		}
	}
}
