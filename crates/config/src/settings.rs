//! Configuration settings structures

use crate::configurable_value::ConfigurableValue;
use brandmark_types::constants::limits::{
	DEFAULT_AVAILABILITY_CACHE_TTL_SECONDS, DEFAULT_BULK_CONCURRENCY, DEFAULT_GLOBAL_TIMEOUT_MS,
	DEFAULT_PROVIDER_RATE_LIMIT_REQUESTS, DEFAULT_PROVIDER_RATE_LIMIT_WINDOW_SECONDS,
	DEFAULT_PROVIDER_TIMEOUT_MS, MAX_BULK_NAMES, MAX_PROVIDER_TIMEOUT_MS, MIN_PROVIDER_TIMEOUT_MS,
};
use brandmark_types::{ProviderGroup, RateLimitQuota};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Main application settings
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Settings {
	pub server: ServerSettings,
	pub providers: Vec<ProviderSettings>,
	pub timeouts: TimeoutSettings,
	pub cache: CacheSettings,
	pub rate_limits: ProviderRateLimitSettings,
	pub storage: StorageSettings,
	pub checks: CheckSettings,
	pub environment: EnvironmentSettings,
	pub logging: LoggingSettings,
}

/// Server configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerSettings {
	pub host: String,
	pub port: u16,
}

/// How a provider answers availability questions
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorKind {
	/// GET on an URL template; a missing resource means the name is free
	#[default]
	HttpProbe,
	/// Fixed, deterministic answers without any network traffic
	Static,
}

/// Individual provider configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderSettings {
	pub provider_id: String,
	pub group: ProviderGroup,
	#[serde(default)]
	pub kind: ConnectorKind,
	/// URL template with a `{name}` placeholder, required for `http_probe`
	#[serde(default)]
	pub endpoint: Option<String>,
	#[serde(default)]
	pub display_name: Option<String>,
	/// Overrides the category timeout for this provider
	#[serde(default)]
	pub timeout_ms: Option<u64>,
	#[serde(default = "default_true")]
	pub enabled: bool,
	/// Extra request headers; values may reference environment variables
	#[serde(default)]
	pub headers: Option<HashMap<String, ConfigurableValue>>,
}

fn default_true() -> bool {
	true
}

impl ProviderSettings {
	pub fn http_probe(provider_id: &str, group: ProviderGroup, endpoint: &str) -> Self {
		Self {
			provider_id: provider_id.to_string(),
			group,
			kind: ConnectorKind::HttpProbe,
			endpoint: Some(endpoint.to_string()),
			display_name: None,
			timeout_ms: None,
			enabled: true,
			headers: None,
		}
	}

	pub fn with_display_name(mut self, display_name: &str) -> Self {
		self.display_name = Some(display_name.to_string());
		self
	}

	pub fn with_header(mut self, name: &str, value: ConfigurableValue) -> Self {
		self.headers
			.get_or_insert_with(HashMap::new)
			.insert(name.to_string(), value);
		self
	}
}

/// Timeout configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct TimeoutSettings {
	/// Per-call timeout for providers without a category value
	pub default_ms: u64,
	pub domains_ms: u64,
	pub social_ms: u64,
	pub app_stores_ms: u64,
	pub package_registries_ms: u64,
	pub dev_platforms_ms: u64,
	/// Bound on a whole name check; must cover every per-call timeout
	pub global_ms: u64,
}

impl Default for TimeoutSettings {
	fn default() -> Self {
		Self {
			default_ms: DEFAULT_PROVIDER_TIMEOUT_MS,
			domains_ms: 5_000,
			social_ms: 2_000,
			app_stores_ms: 3_000,
			package_registries_ms: 2_000,
			dev_platforms_ms: 3_000,
			global_ms: DEFAULT_GLOBAL_TIMEOUT_MS,
		}
	}
}

impl TimeoutSettings {
	/// Per-call timeout for a provider category
	pub fn per_call_ms(&self, group: ProviderGroup) -> u64 {
		let ms = match group {
			ProviderGroup::Domains => self.domains_ms,
			ProviderGroup::Social => self.social_ms,
			ProviderGroup::AppStores => self.app_stores_ms,
			ProviderGroup::PackageRegistries => self.package_registries_ms,
			ProviderGroup::DevPlatforms => self.dev_platforms_ms,
		};
		if ms == 0 {
			self.default_ms
		} else {
			ms
		}
	}
}

/// Availability cache configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct CacheSettings {
	pub enabled: bool,
	pub availability_ttl_seconds: u64,
	/// Interval of the in-memory TTL sweep
	pub cleanup_interval_seconds: u64,
}

impl Default for CacheSettings {
	fn default() -> Self {
		Self {
			enabled: true,
			availability_ttl_seconds: DEFAULT_AVAILABILITY_CACHE_TTL_SECONDS,
			cleanup_interval_seconds: 60,
		}
	}
}

/// Per-provider admission quotas
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ProviderRateLimitSettings {
	pub enabled: bool,
	/// Quota for providers without an explicit entry
	pub default: RateLimitQuota,
	/// Quotas keyed by provider id
	pub providers: HashMap<String, RateLimitQuota>,
}

impl Default for ProviderRateLimitSettings {
	fn default() -> Self {
		let providers = [
			("instagram", 1, 1),
			("twitter", 15, 900),
			("github", 5_000, 3_600),
			("npm", 100, 60),
			("pypi", 60, 60),
			("google_play", 10, 60),
		]
		.into_iter()
		.map(|(id, requests, window)| (id.to_string(), RateLimitQuota::new(requests, window)))
		.collect();

		Self {
			enabled: true,
			default: RateLimitQuota::new(
				DEFAULT_PROVIDER_RATE_LIMIT_REQUESTS,
				DEFAULT_PROVIDER_RATE_LIMIT_WINDOW_SECONDS,
			),
			providers,
		}
	}
}

impl ProviderRateLimitSettings {
	/// Quota applied to a provider
	pub fn quota_for(&self, provider_id: &str) -> RateLimitQuota {
		self.providers
			.get(provider_id)
			.copied()
			.unwrap_or(self.default)
	}
}

/// Storage backend selection
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
	#[default]
	Memory,
	Redis,
}

/// Storage configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct StorageSettings {
	pub backend: StorageBackend,
	/// Connection string for the redis backend
	///
	/// Example configurations:
	/// - Environment variable: `{"type": "env", "value": "REDIS_URL"}`
	/// - Plain value: `{"type": "plain", "value": "redis://localhost:6379"}`
	pub redis_url: ConfigurableValue,
	/// Prefix prepended to every key written by the redis backend
	pub key_prefix: String,
}

impl Default for StorageSettings {
	fn default() -> Self {
		Self {
			backend: StorageBackend::Memory,
			redis_url: ConfigurableValue::from_env("REDIS_URL"),
			key_prefix: "brandmark".to_string(),
		}
	}
}

/// Name check limits
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct CheckSettings {
	pub bulk_max_names: usize,
	/// Names checked at the same time within one bulk request
	pub bulk_concurrency: usize,
}

impl Default for CheckSettings {
	fn default() -> Self {
		Self {
			bulk_max_names: MAX_BULK_NAMES,
			bulk_concurrency: DEFAULT_BULK_CONCURRENCY,
		}
	}
}

/// Environment-specific settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EnvironmentSettings {
	pub profile: EnvironmentProfile,
	pub debug: bool,
	/// Replace every configured connector with a static one
	#[serde(default)]
	pub mock_providers: bool,
	pub rate_limiting: RateLimitSettings,
}

/// Environment profiles
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentProfile {
	Development,
	Staging,
	Production,
}

/// Global HTTP rate limiting configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RateLimitSettings {
	pub enabled: bool,
	pub requests_per_minute: u32,
	pub burst_size: u32,
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingSettings {
	pub level: String,
	pub format: LogFormat,
	pub structured: bool,
}

/// Log format options
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	Json,
	Pretty,
	Compact,
}

/// Errors found while validating loaded settings
#[derive(Error, Debug, PartialEq)]
pub enum ConfigValidationError {
	#[error("Invalid timeout for {field}: {value}ms (must be between {min}ms and {max}ms)")]
	InvalidTimeout {
		field: String,
		value: u64,
		min: u64,
		max: u64,
	},

	#[error("Global timeout {global_ms}ms is shorter than the {field} timeout of {per_call_ms}ms")]
	GlobalTimeoutTooShort {
		field: String,
		global_ms: u64,
		per_call_ms: u64,
	},

	#[error("Provider entry {index} has an empty provider_id")]
	EmptyProviderId { index: usize },

	#[error("Duplicate provider '{provider_id}' in group {group}")]
	DuplicateProvider { provider_id: String, group: String },

	#[error("Provider '{provider_id}' needs an endpoint containing '{{name}}'")]
	InvalidEndpoint { provider_id: String },

	#[error("Invalid rate limit for {key}: requests and window must be greater than zero")]
	InvalidQuota { key: String },

	#[error("Invalid bulk settings: {reason}")]
	InvalidBulkSettings { reason: String },
}

fn default_providers() -> Vec<ProviderSettings> {
	use ProviderGroup::*;

	let mut providers: Vec<ProviderSettings> = ["com", "io", "app", "dev", "ai"]
		.iter()
		.map(|tld| {
			ProviderSettings::http_probe(
				&format!(".{tld}"),
				Domains,
				&format!("https://rdap.org/domain/{{name}}.{tld}"),
			)
		})
		.collect();

	providers.extend([
		ProviderSettings::http_probe("twitter", Social, "https://x.com/{name}")
			.with_display_name("X (Twitter)"),
		ProviderSettings::http_probe("instagram", Social, "https://www.instagram.com/{name}/")
			.with_display_name("Instagram"),
		ProviderSettings::http_probe("tiktok", Social, "https://www.tiktok.com/@{name}")
			.with_display_name("TikTok"),
		ProviderSettings::http_probe(
			"reddit",
			Social,
			"https://www.reddit.com/user/{name}/about.json",
		)
		.with_display_name("Reddit"),
		ProviderSettings::http_probe("youtube", Social, "https://www.youtube.com/@{name}")
			.with_display_name("YouTube"),
		ProviderSettings::http_probe(
			"google_play",
			AppStores,
			"https://play.google.com/store/apps/details?id=com.{name}.app",
		)
		.with_display_name("Google Play"),
		ProviderSettings::http_probe("npm", PackageRegistries, "https://registry.npmjs.org/{name}")
			.with_display_name("npm"),
		ProviderSettings::http_probe("pypi", PackageRegistries, "https://pypi.org/pypi/{name}/json")
			.with_display_name("PyPI"),
		ProviderSettings::http_probe(
			"crates_io",
			PackageRegistries,
			"https://crates.io/api/v1/crates/{name}",
		)
		.with_display_name("crates.io"),
		ProviderSettings::http_probe(
			"rubygems",
			PackageRegistries,
			"https://rubygems.org/api/v1/gems/{name}.json",
		)
		.with_display_name("RubyGems"),
		ProviderSettings::http_probe("github", DevPlatforms, "https://api.github.com/users/{name}")
			.with_display_name("GitHub"),
		ProviderSettings::http_probe("gitlab", DevPlatforms, "https://gitlab.com/{name}")
			.with_display_name("GitLab"),
		ProviderSettings::http_probe(
			"docker_hub",
			DevPlatforms,
			"https://hub.docker.com/v2/users/{name}/",
		)
		.with_display_name("Docker Hub"),
	]);

	providers
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			server: ServerSettings {
				host: "0.0.0.0".to_string(),
				port: 3000,
			},
			providers: default_providers(),
			timeouts: TimeoutSettings::default(),
			cache: CacheSettings::default(),
			rate_limits: ProviderRateLimitSettings::default(),
			storage: StorageSettings::default(),
			checks: CheckSettings::default(),
			environment: EnvironmentSettings {
				profile: EnvironmentProfile::Development,
				debug: true,
				mock_providers: false,
				rate_limiting: RateLimitSettings {
					enabled: false,
					requests_per_minute: 100,
					burst_size: 10,
				},
			},
			logging: LoggingSettings {
				level: "info".to_string(),
				format: LogFormat::Pretty,
				structured: false,
			},
		}
	}
}

impl Settings {
	/// Get server bind address
	pub fn bind_address(&self) -> String {
		format!("{}:{}", self.server.host, self.server.port)
	}

	/// Get enabled providers only, in configuration order
	pub fn enabled_providers(&self) -> Vec<ProviderSettings> {
		self.providers
			.iter()
			.filter(|provider| provider.enabled)
			.cloned()
			.collect()
	}

	/// Per-call timeout of a provider, honoring its override
	pub fn provider_timeout_ms(&self, provider: &ProviderSettings) -> u64 {
		provider
			.timeout_ms
			.unwrap_or_else(|| self.timeouts.per_call_ms(provider.group))
	}

	/// Check if running in production
	pub fn is_production(&self) -> bool {
		self.environment.profile == EnvironmentProfile::Production
	}

	/// Check if debug mode is enabled
	pub fn is_debug(&self) -> bool {
		self.environment.debug && !self.is_production()
	}

	/// Validate cross-field constraints of the loaded settings
	pub fn validate(&self) -> Result<(), ConfigValidationError> {
		let timeouts = &self.timeouts;
		let mut per_call: Vec<(String, u64)> = vec![("default".to_string(), timeouts.default_ms)];
		per_call.extend(
			ProviderGroup::ALL
				.iter()
				.map(|group| (group.to_string(), timeouts.per_call_ms(*group))),
		);

		for (index, provider) in self.providers.iter().enumerate() {
			if provider.provider_id.trim().is_empty() {
				return Err(ConfigValidationError::EmptyProviderId { index });
			}
			if let Some(ms) = provider.timeout_ms {
				per_call.push((provider.provider_id.clone(), ms));
			}
			if provider.kind == ConnectorKind::HttpProbe
				&& !provider
					.endpoint
					.as_deref()
					.is_some_and(|endpoint| endpoint.contains("{name}"))
			{
				return Err(ConfigValidationError::InvalidEndpoint {
					provider_id: provider.provider_id.clone(),
				});
			}
		}

		let mut seen = HashSet::new();
		for provider in &self.providers {
			if !seen.insert((provider.group, provider.provider_id.as_str())) {
				return Err(ConfigValidationError::DuplicateProvider {
					provider_id: provider.provider_id.clone(),
					group: provider.group.to_string(),
				});
			}
		}

		for (field, value) in &per_call {
			if !(MIN_PROVIDER_TIMEOUT_MS..=MAX_PROVIDER_TIMEOUT_MS).contains(value) {
				return Err(ConfigValidationError::InvalidTimeout {
					field: field.clone(),
					value: *value,
					min: MIN_PROVIDER_TIMEOUT_MS,
					max: MAX_PROVIDER_TIMEOUT_MS,
				});
			}
			if *value > timeouts.global_ms {
				return Err(ConfigValidationError::GlobalTimeoutTooShort {
					field: field.clone(),
					global_ms: timeouts.global_ms,
					per_call_ms: *value,
				});
			}
		}

		let quotas = std::iter::once(("default", &self.rate_limits.default)).chain(
			self.rate_limits
				.providers
				.iter()
				.map(|(key, quota)| (key.as_str(), quota)),
		);
		for (key, quota) in quotas {
			if quota.requests == 0 || quota.window_seconds == 0 {
				return Err(ConfigValidationError::InvalidQuota {
					key: key.to_string(),
				});
			}
		}

		if self.checks.bulk_concurrency == 0 {
			return Err(ConfigValidationError::InvalidBulkSettings {
				reason: "bulk_concurrency must be at least 1".to_string(),
			});
		}
		if self.checks.bulk_max_names == 0 || self.checks.bulk_max_names > MAX_BULK_NAMES {
			return Err(ConfigValidationError::InvalidBulkSettings {
				reason: format!("bulk_max_names must be between 1 and {}", MAX_BULK_NAMES),
			});
		}

		Ok(())
	}
}
