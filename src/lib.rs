//! Brandmark Aggregator Library
//!
//! Checks whether a brand name is free across domain registries, social
//! platforms, app stores, package registries and developer platforms, and
//! streams progress to live clients.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[cfg(feature = "redis")]
const REDIS_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

// Core domain types
pub use brandmark_types::{
	chrono, serde_json, Availability, BulkCheckRequest, BulkCheckResponse, CheckStatus,
	CheckTask, CheckValidationError, ConnectorError, ConnectorResponse, ConnectorResult,
	NameCheck, NameCheckOptions, NameCheckRequest, NameCheckSummary, ProgressEvent,
	ProviderConnector, ProviderGroup, ProviderResult, RateLimitQuota,
};

// Service layer
pub use brandmark_service::{
	CheckService, CheckServiceError, CheckServiceTrait, FanoutCoordinator, ProgressSink,
	RealtimeChecker, SessionManager,
};

// Storage layer
pub use brandmark_storage::{MemoryStore, Storage};

// API layer
pub use brandmark_api::{create_router, AppState};

// Providers
pub use brandmark_providers::{ClientCache, ProviderRegistry, StaticConnector};

// Config
pub use brandmark_config::{load_config, log_service_info, log_startup_complete, Settings};

pub mod config {
	pub use brandmark_config::*;
}

pub mod service {
	pub use brandmark_service::*;
}

pub mod providers {
	pub use brandmark_providers::*;
}

pub mod mocks;

pub use async_trait;

/// Builder wiring storage, providers and services into a router
#[derive(Default)]
pub struct AggregatorBuilder {
	settings: Option<Settings>,
	storage: Option<Arc<dyn Storage>>,
	connectors: Vec<Arc<dyn ProviderConnector>>,
}

impl AggregatorBuilder {
	/// Create a new aggregator builder
	pub fn new() -> Self {
		Self::default()
	}

	/// Set custom settings
	pub fn with_settings(mut self, settings: Settings) -> Self {
		self.settings = Some(settings);
		self
	}

	/// Use the given storage instead of the configured backend
	pub fn with_storage<S>(mut self, storage: S) -> Self
	where
		S: Storage + 'static,
	{
		self.storage = Some(Arc::new(storage));
		self
	}

	/// Register a connector in addition to the configured providers
	pub fn with_connector(mut self, connector: Arc<dyn ProviderConnector>) -> Self {
		self.connectors.push(connector);
		self
	}

	/// Get the current settings
	pub fn settings(&self) -> Option<&Settings> {
		self.settings.as_ref()
	}

	/// Build the configured backend
	///
	/// An unreachable Redis is not fatal: the service starts on in-memory
	/// storage and logs a warning.
	async fn build_storage(settings: &Settings) -> Arc<dyn Storage> {
		use brandmark_config::StorageBackend;

		let memory = || -> Arc<dyn Storage> {
			Arc::new(MemoryStore::with_cleanup_interval(Duration::from_secs(
				settings.cache.cleanup_interval_seconds.max(1),
			)))
		};

		match settings.storage.backend {
			StorageBackend::Memory => memory(),
			#[cfg(feature = "redis")]
			StorageBackend::Redis => match Self::connect_redis(settings).await {
				Ok(store) => Arc::new(store),
				Err(e) => {
					warn!("⚠️ Redis unavailable, falling back to in-memory storage: {}", e);
					memory()
				},
			},
			#[cfg(not(feature = "redis"))]
			StorageBackend::Redis => {
				warn!(
					"⚠️ Storage backend 'redis' requires the `redis` feature, falling back to in-memory storage"
				);
				memory()
			},
		}
	}

	#[cfg(feature = "redis")]
	async fn connect_redis(
		settings: &Settings,
	) -> Result<brandmark_storage::RedisStore, Box<dyn std::error::Error>> {
		let url = settings.storage.redis_url.resolve()?;
		let connect = brandmark_storage::RedisStore::connect(&url, &settings.storage.key_prefix);
		match tokio::time::timeout(REDIS_CONNECT_TIMEOUT, connect).await {
			Ok(store) => Ok(store?),
			Err(_) => Err(format!(
				"connection not established within {}s",
				REDIS_CONNECT_TIMEOUT.as_secs()
			)
			.into()),
		}
	}

	/// Build the router and application state
	pub async fn start(self) -> Result<(axum::Router, AppState), Box<dyn std::error::Error>> {
		let settings = self.settings.unwrap_or_default();
		settings.validate()?;

		let storage = match self.storage {
			Some(storage) => storage,
			None => Self::build_storage(&settings).await,
		};
		storage.start_background_tasks().await?;

		let mut registry = ProviderRegistry::from_settings(&settings, &ClientCache::new())?;
		for connector in self.connectors {
			registry.register(connector)?;
		}
		info!("Successfully initialized with {} provider(s)", registry.len());

		let check_service =
			CheckService::from_settings(&settings, Arc::new(registry), Arc::clone(&storage));
		let app_state = AppState::new(Arc::new(check_service), storage);
		let router = create_router().with_state(app_state.clone());

		Ok((router, app_state))
	}

	/// Start the complete server: environment, configuration, tracing, serving
	pub async fn start_server(mut self) -> Result<(), Box<dyn std::error::Error>> {
		dotenvy::dotenv().ok();

		let settings = match self.settings.take() {
			Some(settings) => settings,
			None => load_config()?,
		};

		init_tracing(&settings)?;
		log_service_info();
		brandmark_config::log_settings_summary(&settings);

		let bind_addr = settings.bind_address();
		let addr: SocketAddr = bind_addr
			.parse()
			.map_err(|e| format!("Invalid bind address '{}': {}", bind_addr, e))?;

		self.settings = Some(settings.clone());
		let (app, _) = self.start().await?;

		let listener = tokio::net::TcpListener::bind(addr).await?;

		log_startup_complete(&bind_addr);
		info!("API endpoints available:");
		info!("  GET  /health");
		info!("  GET  /ready");
		info!("  POST /api/v1/check");
		info!("  GET  /api/v1/check/{{provider}}/{{name}}");
		info!("  POST /api/v1/bulk/check");
		info!("  GET  /api/v1/providers");
		info!("  GET  /api/v1/ws");

		// Global request rate limiting is applied at the make_service level
		let rate_cfg = &settings.environment.rate_limiting;
		if rate_cfg.enabled {
			use tower::limit::RateLimitLayer;
			use tower::ServiceBuilder;
			let make_svc = ServiceBuilder::new()
				.layer(RateLimitLayer::new(
					rate_cfg.requests_per_minute as u64,
					Duration::from_secs(60),
				))
				.service(app.into_make_service());
			axum::serve(listener, make_svc).await?;
		} else {
			axum::serve(listener, app).await?;
		}

		brandmark_config::log_service_shutdown();
		Ok(())
	}
}

/// Initialize tracing from the logging settings; `RUST_LOG` overrides the level
pub fn init_tracing(settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
	use brandmark_config::LogFormat;

	let log_level = &settings.logging.level;
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

	match settings.logging.format {
		LogFormat::Json => {
			let subscriber = tracing_subscriber::fmt().json().with_env_filter(env_filter);
			if settings.logging.structured {
				subscriber.with_target(true).with_thread_ids(true).try_init().map_err(|e| e.to_string())?;
			} else {
				subscriber.try_init().map_err(|e| e.to_string())?;
			}
		},
		LogFormat::Pretty => {
			let subscriber = tracing_subscriber::fmt()
				.pretty()
				.with_env_filter(env_filter);
			if settings.logging.structured {
				subscriber.with_target(true).with_thread_ids(true).try_init().map_err(|e| e.to_string())?;
			} else {
				subscriber.try_init().map_err(|e| e.to_string())?;
			}
		},
		LogFormat::Compact => {
			let subscriber = tracing_subscriber::fmt()
				.compact()
				.with_env_filter(env_filter);
			if settings.logging.structured {
				subscriber.with_target(true).with_thread_ids(true).try_init().map_err(|e| e.to_string())?;
			} else {
				subscriber.try_init().map_err(|e| e.to_string())?;
			}
		},
	}

	info!(
		"Logging configuration applied: level={}, format={:?}, structured={}",
		settings.logging.level, settings.logging.format, settings.logging.structured
	);
	Ok(())
}
