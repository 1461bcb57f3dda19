//! In-memory storage implementation using DashMap with TTL support

use crate::traits::{
	AvailabilityCache, RateLimitCheck, RateLimitStore, Storage, StorageResult, StorageStats,
};
use async_trait::async_trait;
use brandmark_types::{ProviderResult, RateLimitQuota};
use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::time::{interval, Duration, Instant};
use tracing::debug;

/// Cached provider result with its expiry
#[derive(Debug, Clone)]
struct CacheEntry {
	result: ProviderResult,
	expires_at: Instant,
}

impl CacheEntry {
	fn is_expired(&self, now: Instant) -> bool {
		self.expires_at <= now
	}
}

/// Fixed-window request counter
#[derive(Debug, Clone)]
struct WindowCounter {
	count: u32,
	window_start: Instant,
	window: Duration,
}

impl WindowCounter {
	fn window_end(&self) -> Instant {
		self.window_start + self.window
	}
}

/// In-memory storage for cached availability results and rate-limit counters
#[derive(Clone)]
pub struct MemoryStore {
	cache: Arc<DashMap<String, CacheEntry>>,
	counters: Arc<DashMap<String, WindowCounter>>,
	cleanup_interval: Duration,
}

impl MemoryStore {
	/// Create a new memory store instance
	pub fn new() -> Self {
		Self::with_cleanup_interval(Duration::from_secs(60))
	}

	/// Create a memory store sweeping expired entries at the given interval
	pub fn with_cleanup_interval(cleanup_interval: Duration) -> Self {
		Self {
			cache: Arc::new(DashMap::new()),
			counters: Arc::new(DashMap::new()),
			cleanup_interval,
		}
	}

	/// Start the TTL cleanup task for expired cache entries and stale windows
	pub fn start_ttl_cleanup(&self) -> tokio::task::JoinHandle<()> {
		let store = self.clone();
		tokio::spawn(async move {
			let mut cleanup_interval = interval(store.cleanup_interval);

			loop {
				cleanup_interval.tick().await;
				let removed = store.sweep();
				if removed > 0 {
					debug!("Cleaned up {} expired storage entries", removed);
				}
			}
		})
	}

	/// Remove expired cache entries and finished rate-limit windows
	fn sweep(&self) -> usize {
		let now = Instant::now();
		let before = self.cache.len() + self.counters.len();
		self.cache.retain(|_, entry| !entry.is_expired(now));
		self.counters.retain(|_, counter| counter.window_end() > now);
		before.saturating_sub(self.cache.len() + self.counters.len())
	}

	/// Number of live cache entries
	pub fn cached_len(&self) -> usize {
		let now = Instant::now();
		self.cache
			.iter()
			.filter(|entry| !entry.value().is_expired(now))
			.count()
	}
}

impl Default for MemoryStore {
	fn default() -> Self {
		Self::new()
	}
}

// Trait implementations for pluggable storage

#[async_trait]
impl AvailabilityCache for MemoryStore {
	async fn get_cached(&self, key: &str) -> StorageResult<Option<ProviderResult>> {
		let now = Instant::now();
		let hit = self.cache.get(key).and_then(|entry| {
			if entry.is_expired(now) {
				None
			} else {
				Some(entry.result.clone())
			}
		});

		if hit.is_none() {
			self.cache.remove_if(key, |_, entry| entry.is_expired(now));
		}
		Ok(hit)
	}

	async fn set_cached(
		&self,
		key: &str,
		result: &ProviderResult,
		ttl: Duration,
	) -> StorageResult<()> {
		self.cache.insert(
			key.to_string(),
			CacheEntry {
				result: result.clone(),
				expires_at: Instant::now() + ttl,
			},
		);
		Ok(())
	}

	async fn remove_cached(&self, key: &str) -> StorageResult<bool> {
		Ok(self.cache.remove(key).is_some())
	}

	async fn cleanup_expired(&self) -> StorageResult<usize> {
		let now = Instant::now();
		let before = self.cache.len();
		self.cache.retain(|_, entry| !entry.is_expired(now));
		Ok(before - self.cache.len())
	}
}

#[async_trait]
impl RateLimitStore for MemoryStore {
	async fn increment_and_check(
		&self,
		key: &str,
		quota: RateLimitQuota,
	) -> StorageResult<RateLimitCheck> {
		let now = Instant::now();
		let window = Duration::from_secs(quota.window_seconds);

		// Occasionally drop finished windows of idle keys
		if rand::random::<f64>() < 0.01 {
			self.counters.retain(|_, counter| counter.window_end() > now);
		}

		// The entry guard holds the shard lock, so check and increment are atomic per key
		let mut entry = self
			.counters
			.entry(key.to_string())
			.or_insert_with(|| WindowCounter {
				count: 0,
				window_start: now,
				window,
			});
		let counter = entry.value_mut();

		if now >= counter.window_end() || counter.window != window {
			counter.count = 0;
			counter.window_start = now;
			counter.window = window;
		}

		let allowed = counter.count < quota.requests;
		if allowed {
			counter.count += 1;
		}

		let until_reset = counter.window_end().saturating_duration_since(now);
		let reset_at = Utc::now()
			+ chrono::Duration::from_std(until_reset).unwrap_or_else(|_| chrono::Duration::zero());

		Ok(RateLimitCheck {
			allowed,
			used: counter.count,
			remaining: quota.requests.saturating_sub(counter.count),
			reset_at,
			limit: quota.requests,
		})
	}

	async fn get_usage(&self, key: &str) -> StorageResult<u32> {
		let now = Instant::now();
		Ok(self
			.counters
			.get(key)
			.filter(|counter| counter.window_end() > now)
			.map(|counter| counter.count)
			.unwrap_or(0))
	}

	async fn reset(&self, key: &str) -> StorageResult<()> {
		self.counters.remove(key);
		Ok(())
	}
}

#[async_trait]
impl Storage for MemoryStore {
	async fn health_check(&self) -> StorageResult<bool> {
		Ok(true)
	}

	async fn stats(&self) -> StorageResult<StorageStats> {
		Ok(StorageStats {
			cached_results: self.cached_len(),
			rate_limit_keys: self.counters.len(),
			backend: "memory",
		})
	}

	async fn close(&self) -> StorageResult<()> {
		Ok(())
	}

	async fn start_background_tasks(&self) -> StorageResult<()> {
		// The cleanup task runs for the lifetime of the runtime
		let _ = self.start_ttl_cleanup();
		Ok(())
	}
}
