//! Redis storage implementation for shared, multi-instance deployments

use crate::traits::{
	AvailabilityCache, RateLimitCheck, RateLimitStore, Storage, StorageError, StorageResult,
	StorageStats,
};
use async_trait::async_trait;
use brandmark_types::{ProviderResult, RateLimitQuota};
use chrono::Utc;
use redis::{aio::ConnectionManager, AsyncCommands, Script};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Fixed-window check and increment, run atomically on the server
///
/// Rejected calls leave the counter untouched. A counter found without an
/// expiry gets one, so a window can never outlive its duration.
const WINDOW_SCRIPT: &str = r#"
local limit = tonumber(ARGV[1])
local window = tonumber(ARGV[2])
local used = tonumber(redis.call('GET', KEYS[1]) or '0')
local allowed = 0
if used < limit then
	used = redis.call('INCR', KEYS[1])
	allowed = 1
end
local ttl = redis.call('TTL', KEYS[1])
if ttl < 0 and used > 0 then
	redis.call('EXPIRE', KEYS[1], window)
	ttl = window
end
return {allowed, used, ttl}
"#;

fn redis_error(operation: &str, key: &str, err: redis::RedisError) -> StorageError {
	StorageError::Connection {
		message: format!("Redis {} failed for key {}: {}", operation, key, err),
	}
}

/// Redis-backed storage
///
/// Cache entries rely on native key expiry (`SET EX`); rate-limit windows are
/// counters updated by a server-side script that also sets their TTL.
#[derive(Clone)]
pub struct RedisStore {
	conn_manager: ConnectionManager,
	window_script: Script,
	key_prefix: String,
	redis_url: String,
}

impl fmt::Debug for RedisStore {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RedisStore")
			.field("key_prefix", &self.key_prefix)
			.field("conn_manager", &"<ConnectionManager>")
			.finish()
	}
}

impl RedisStore {
	/// Connect to Redis
	pub async fn connect(redis_url: &str, key_prefix: &str) -> StorageResult<Self> {
		info!("Initializing Redis connection manager");
		let client = redis::Client::open(redis_url).map_err(|e| StorageError::Connection {
			message: format!("Invalid Redis URL: {}", e),
		})?;
		let conn_manager =
			ConnectionManager::new(client)
				.await
				.map_err(|e| StorageError::Connection {
					message: format!("Failed to create Redis ConnectionManager: {}", e),
				})?;

		Ok(Self {
			conn_manager,
			window_script: Script::new(WINDOW_SCRIPT),
			key_prefix: key_prefix.to_string(),
			redis_url: redis_url.to_string(),
		})
	}

	fn cache_key(&self, key: &str) -> String {
		format!("{}:{}", self.key_prefix, key)
	}

	fn counter_key(&self, key: &str) -> String {
		format!("{}:ratelimit:{}", self.key_prefix, key)
	}

	/// Connection string this store was created with
	pub fn redis_url(&self) -> &str {
		&self.redis_url
	}
}

#[async_trait]
impl AvailabilityCache for RedisStore {
	async fn get_cached(&self, key: &str) -> StorageResult<Option<ProviderResult>> {
		let key = self.cache_key(key);
		let mut conn = self.conn_manager.clone();

		let raw: Option<String> = conn
			.get(&key)
			.await
			.map_err(|e| redis_error("GET", &key, e))?;

		match raw {
			Some(value) => match serde_json::from_str::<ProviderResult>(&value) {
				Ok(result) => Ok(Some(result)),
				Err(e) => {
					// A stale or foreign entry is treated as a miss and dropped
					warn!("Discarding undecodable cache entry {}: {}", key, e);
					let _: Result<i64, _> = conn.del(&key).await;
					Ok(None)
				},
			},
			None => {
				debug!("Cache MISS for key: {}", key);
				Ok(None)
			},
		}
	}

	async fn set_cached(
		&self,
		key: &str,
		result: &ProviderResult,
		ttl: Duration,
	) -> StorageResult<()> {
		let key = self.cache_key(key);
		let value = serde_json::to_string(result)?;
		let mut conn = self.conn_manager.clone();

		conn.set_ex::<_, _, ()>(&key, value, ttl.as_secs().max(1))
			.await
			.map_err(|e| redis_error("SETEX", &key, e))
	}

	async fn remove_cached(&self, key: &str) -> StorageResult<bool> {
		let key = self.cache_key(key);
		let mut conn = self.conn_manager.clone();
		let removed: i64 = conn
			.del(&key)
			.await
			.map_err(|e| redis_error("DEL", &key, e))?;
		Ok(removed > 0)
	}

	async fn cleanup_expired(&self) -> StorageResult<usize> {
		// Redis expires keys on its own
		Ok(0)
	}
}

#[async_trait]
impl RateLimitStore for RedisStore {
	async fn increment_and_check(
		&self,
		key: &str,
		quota: RateLimitQuota,
	) -> StorageResult<RateLimitCheck> {
		let key = self.counter_key(key);
		let mut conn = self.conn_manager.clone();

		let (allowed, used, ttl): (i64, u32, i64) = self
			.window_script
			.key(&key)
			.arg(quota.requests)
			.arg(quota.window_seconds)
			.invoke_async(&mut conn)
			.await
			.map_err(|e| redis_error("EVALSHA", &key, e))?;

		let allowed = allowed == 1;
		let reset_at = Utc::now() + chrono::Duration::seconds(ttl.max(0));

		Ok(RateLimitCheck {
			allowed,
			used,
			remaining: quota.requests.saturating_sub(used),
			reset_at,
			limit: quota.requests,
		})
	}

	async fn get_usage(&self, key: &str) -> StorageResult<u32> {
		let key = self.counter_key(key);
		let mut conn = self.conn_manager.clone();
		let usage: Option<u32> = conn
			.get(&key)
			.await
			.map_err(|e| redis_error("GET", &key, e))?;
		Ok(usage.unwrap_or(0))
	}

	async fn reset(&self, key: &str) -> StorageResult<()> {
		let key = self.counter_key(key);
		let mut conn = self.conn_manager.clone();
		conn.del::<_, ()>(&key)
			.await
			.map_err(|e| redis_error("DEL", &key, e))
	}
}

#[async_trait]
impl Storage for RedisStore {
	async fn health_check(&self) -> StorageResult<bool> {
		let mut conn = self.conn_manager.clone();
		match redis::cmd("PING").query_async::<_, String>(&mut conn).await {
			Ok(reply) => Ok(reply == "PONG"),
			Err(e) => {
				warn!("Redis health check failed: {}", e);
				Ok(false)
			},
		}
	}

	async fn stats(&self) -> StorageResult<StorageStats> {
		let mut conn = self.conn_manager.clone();
		let keys: usize = redis::cmd("DBSIZE")
			.query_async(&mut conn)
			.await
			.map_err(|e| redis_error("DBSIZE", "*", e))?;

		Ok(StorageStats {
			cached_results: keys,
			rate_limit_keys: 0,
			backend: "redis",
		})
	}

	async fn close(&self) -> StorageResult<()> {
		// ConnectionManager closes its connection when the last clone is dropped
		Ok(())
	}
}
