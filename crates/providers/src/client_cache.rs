//! HTTP client cache for connection reuse across provider checks
//!
//! Providers probing the same host with the same headers share one pooled
//! `reqwest` client. Clients are rebuilt after a TTL so DNS changes and
//! rotated credentials are eventually picked up.

use brandmark_types::{ConnectorError, ConnectorResult};
use dashmap::{mapref::entry::Entry, DashMap};
use reqwest::{Client, ClientBuilder};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Default user agent sent with every probe
pub const DEFAULT_USER_AGENT: &str = concat!("brandmark-aggregator/", env!("CARGO_PKG_VERSION"));

/// Configuration for creating pooled HTTP clients
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientConfig {
	/// Provider identifier for cache differentiation
	pub provider_id: String,
	/// Maximum number of idle connections per host
	pub max_idle_per_host: usize,
	/// Connection keep-alive timeout
	pub keep_alive_timeout_ms: u64,
	/// Default headers (user agent, credentials)
	pub headers: Vec<(String, String)>,
}

impl ClientConfig {
	pub fn for_provider(provider_id: &str) -> Self {
		Self {
			provider_id: provider_id.to_string(),
			max_idle_per_host: 10,
			keep_alive_timeout_ms: 90_000,
			headers: vec![
				("User-Agent".to_string(), DEFAULT_USER_AGENT.to_string()),
				("Accept".to_string(), "application/json, text/html;q=0.9".to_string()),
			],
		}
	}

	pub fn with_header(mut self, name: &str, value: &str) -> Self {
		self.headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
		self.headers.push((name.to_string(), value.to_string()));
		self
	}
}

/// Cached client with creation timestamp for TTL management
#[derive(Debug, Clone)]
struct CachedClient {
	client: Arc<Client>,
	created_at: Instant,
}

impl CachedClient {
	fn new(client: Client) -> Self {
		Self {
			client: Arc::new(client),
			created_at: Instant::now(),
		}
	}

	fn is_expired(&self, ttl: Duration) -> bool {
		self.created_at.elapsed() > ttl
	}
}

/// Thread-safe cache of HTTP clients keyed by provider configuration
#[derive(Clone, Debug)]
pub struct ClientCache {
	clients: Arc<DashMap<ClientConfig, CachedClient>>,
	ttl: Duration,
}

impl ClientCache {
	/// Create a new client cache with default 30-minute TTL
	pub fn new() -> Self {
		Self::with_ttl(Duration::from_secs(30 * 60))
	}

	/// Create a new client cache with custom TTL
	pub fn with_ttl(ttl: Duration) -> Self {
		Self {
			clients: Arc::new(DashMap::new()),
			ttl,
		}
	}

	/// Get or create a client for the given configuration
	pub fn get_client(&self, config: &ClientConfig) -> ConnectorResult<Arc<Client>> {
		self.clients
			.remove_if(config, |_, cached| cached.is_expired(self.ttl));

		if let Some(cached) = self.clients.get(config) {
			return Ok(cached.client.clone());
		}

		debug!("Creating HTTP client for provider {}", config.provider_id);
		let cached = CachedClient::new(Self::build_client(config)?);

		// Another caller may have raced us; keep whichever client landed first
		match self.clients.entry(config.clone()) {
			Entry::Occupied(entry) => Ok(entry.get().client.clone()),
			Entry::Vacant(entry) => Ok(entry.insert(cached).client.clone()),
		}
	}

	fn build_client(config: &ClientConfig) -> ConnectorResult<Client> {
		let mut header_map = reqwest::header::HeaderMap::new();
		for (key, value) in &config.headers {
			let name = reqwest::header::HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
				ConnectorError::Config {
					reason: format!("invalid header name '{}': {}", key, e),
				}
			})?;
			let value = reqwest::header::HeaderValue::from_str(value).map_err(|e| {
				ConnectorError::Config {
					reason: format!("invalid value for header '{}': {}", key, e),
				}
			})?;
			header_map.insert(name, value);
		}

		ClientBuilder::new()
			.pool_max_idle_per_host(config.max_idle_per_host)
			.pool_idle_timeout(Duration::from_millis(config.keep_alive_timeout_ms))
			.tcp_keepalive(Duration::from_secs(60))
			.redirect(reqwest::redirect::Policy::limited(5))
			.default_headers(header_map)
			.build()
			.map_err(ConnectorError::Http)
	}

	/// Remove all expired clients from the cache
	pub fn cleanup_expired(&self) -> usize {
		let before = self.clients.len();
		self.clients.retain(|_, cached| !cached.is_expired(self.ttl));
		before - self.clients.len()
	}

	pub fn len(&self) -> usize {
		self.clients.len()
	}

	pub fn is_empty(&self) -> bool {
		self.clients.is_empty()
	}
}

impl Default for ClientCache {
	fn default() -> Self {
		Self::new()
	}
}
