//! Name check service
//!
//! Entry point for synchronous, bulk and single-provider checks. Validation
//! happens here; the fan-out itself is delegated to [`FanoutCoordinator`].

use async_trait::async_trait;
use brandmark_config::{CheckSettings, Settings};
use brandmark_providers::ProviderRegistry;
use brandmark_storage::Storage;
use brandmark_types::{
	normalize_name, validate_name, BulkCheckRequest, BulkCheckResponse, CheckTask,
	CheckValidationError, NameCheck, NameCheckOptions, NameCheckRequest, ProviderInfo,
	ProviderResult, ProvidersResponse, SessionError,
};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::cache::{AvailabilityCache, CacheLayerTrait};
use crate::coordinator::{AbortOnDrop, FanoutCoordinator, ProgressSink};
use crate::invoker::{ProviderInvoker, TimeoutPolicy};
use crate::rate_limiter::ProviderRateLimiter;

/// Errors surfaced to API callers
#[derive(Debug, Error)]
pub enum CheckServiceError {
	#[error("Validation error: {0}")]
	Validation(#[from] CheckValidationError),

	#[error("Invalid provider: {provider}")]
	InvalidProvider { provider: String },

	#[error("Rate limit exceeded for {provider}")]
	RateLimited { provider: String },

	#[error("Session error: {0}")]
	Session(#[from] SessionError),

	#[error("Internal error: {0}")]
	Internal(String),
}

/// Trait for name check operations (enables easy testing and mocking)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CheckServiceTrait: Send + Sync {
	/// Validate a request and resolve the provider tasks it dispatches
	fn plan_checks(&self, request: &NameCheckRequest) -> Result<Vec<CheckTask>, CheckServiceError>;

	/// Run planned tasks, reporting each settled result to `sink`
	async fn run_checks(
		&self,
		name: &str,
		tasks: Vec<CheckTask>,
		sink: Option<Arc<dyn ProgressSink>>,
	) -> Result<NameCheck, CheckServiceError>;

	/// Check one name across the requested groups
	async fn check_name(&self, request: &NameCheckRequest) -> Result<NameCheck, CheckServiceError>;

	/// Check one name against one provider, looked up by id
	async fn check_single_provider(
		&self,
		provider: &str,
		name: &str,
	) -> Result<ProviderResult, CheckServiceError>;

	/// Check several names with bounded concurrency
	async fn bulk_check(
		&self,
		request: &BulkCheckRequest,
	) -> Result<BulkCheckResponse, CheckServiceError>;

	/// Describe every registered provider
	fn list_providers(&self) -> ProvidersResponse;
}

/// Service implementation
pub struct CheckService {
	coordinator: Arc<FanoutCoordinator>,
	settings: CheckSettings,
}

impl CheckService {
	pub fn new(coordinator: Arc<FanoutCoordinator>, settings: CheckSettings) -> Self {
		Self {
			coordinator,
			settings,
		}
	}

	/// Wire the full check pipeline from settings
	pub fn from_settings(
		settings: &Settings,
		registry: Arc<ProviderRegistry>,
		storage: Arc<dyn Storage>,
	) -> Self {
		let rate_limiter = ProviderRateLimiter::new(Arc::clone(&storage), settings.rate_limits.clone());
		let cache = AvailabilityCache::new(storage, &settings.cache);
		let invoker = ProviderInvoker::new(Arc::clone(&registry), TimeoutPolicy::from_settings(settings));

		let coordinator = FanoutCoordinator::new(
			registry,
			Arc::new(rate_limiter),
			Arc::new(cache),
			Arc::new(invoker),
			Duration::from_millis(settings.timeouts.global_ms),
		);
		Self::new(Arc::new(coordinator), settings.checks.clone())
	}

	pub fn coordinator(&self) -> &Arc<FanoutCoordinator> {
		&self.coordinator
	}
}

#[async_trait]
impl CheckServiceTrait for CheckService {
	fn plan_checks(&self, request: &NameCheckRequest) -> Result<Vec<CheckTask>, CheckServiceError> {
		request.validate()?;
		let groups = request.provider_groups()?;
		Ok(self
			.coordinator
			.plan(&request.normalized_name(), &groups, &request.options))
	}

	async fn run_checks(
		&self,
		name: &str,
		tasks: Vec<CheckTask>,
		sink: Option<Arc<dyn ProgressSink>>,
	) -> Result<NameCheck, CheckServiceError> {
		let coordinator = Arc::clone(&self.coordinator);
		let name = name.to_string();

		// Isolated in its own task so a defect in aggregation cannot take down the caller
		let handle = tokio::spawn(async move { coordinator.run_tasks(&name, tasks, sink).await });
		let _guard = AbortOnDrop::new(handle.abort_handle());
		handle
			.await
			.map_err(|e| CheckServiceError::Internal(format!("check task failed: {}", e)))
	}

	async fn check_name(&self, request: &NameCheckRequest) -> Result<NameCheck, CheckServiceError> {
		let tasks = self.plan_checks(request)?;
		self.run_checks(&request.normalized_name(), tasks, None).await
	}

	async fn check_single_provider(
		&self,
		provider: &str,
		name: &str,
	) -> Result<ProviderResult, CheckServiceError> {
		let name = normalize_name(name);
		validate_name(&name)?;

		let connector = self
			.coordinator
			.registry()
			.find(provider)
			.ok_or_else(|| CheckServiceError::InvalidProvider {
				provider: provider.to_string(),
			})?;

		if !self.coordinator.rate_limiter().check_rate_limit(provider).await {
			return Err(CheckServiceError::RateLimited {
				provider: provider.to_string(),
			});
		}

		let cache = self.coordinator.cache();
		if let Some(cached) = cache.get_availability(provider, &name).await {
			debug!("Serving {} for '{}' from cache", provider, name);
			return Ok(cached);
		}

		let result = self
			.coordinator
			.invoker()
			.check_availability(connector.group(), provider, &name, &NameCheckOptions::default())
			.await;
		cache.set_availability(provider, &name, &result).await;
		Ok(result)
	}

	async fn bulk_check(
		&self,
		request: &BulkCheckRequest,
	) -> Result<BulkCheckResponse, CheckServiceError> {
		request.validate()?;
		request.provider_groups()?;

		let names = request.normalized_names();
		if names.len() > self.settings.bulk_max_names {
			return Err(CheckValidationError::TooManyNames {
				count: names.len(),
				max: self.settings.bulk_max_names,
			}
			.into());
		}

		let started = Instant::now();
		let batch_id = Uuid::new_v4().to_string();
		info!(
			"📦 Bulk check {}: {} names, concurrency {}",
			batch_id,
			names.len(),
			self.settings.bulk_concurrency
		);

		let mut outcomes: Vec<(usize, Result<NameCheck, CheckServiceError>)> =
			stream::iter(names.into_iter().enumerate())
				.map(|(index, name)| async move {
					(index, self.check_name(&request.request_for(&name)).await)
				})
				.buffer_unordered(self.settings.bulk_concurrency.max(1))
				.collect()
				.await;
		outcomes.sort_by_key(|(index, _)| *index);

		let results = outcomes
			.into_iter()
			.map(|(_, outcome)| outcome)
			.collect::<Result<Vec<_>, _>>()?;
		Ok(BulkCheckResponse::new(
			batch_id,
			results,
			started.elapsed().as_millis() as u64,
		))
	}

	fn list_providers(&self) -> ProvidersResponse {
		let rate_limiter = self.coordinator.rate_limiter();
		let invoker = self.coordinator.invoker();

		let providers = self
			.coordinator
			.registry()
			.all()
			.map(|connector| {
				let group = connector.group();
				let provider = connector.provider_id();
				ProviderInfo {
					provider: provider.to_string(),
					group,
					display_name: connector.display_name().to_string(),
					timeout_ms: invoker.timeout_for(group, provider).as_millis() as u64,
					rate_limit: rate_limiter.quota_for(provider),
				}
			})
			.collect();

		ProvidersResponse::new(
			providers,
			self.coordinator.global_timeout().as_millis() as u64,
		)
	}
}
