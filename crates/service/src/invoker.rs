//! Single-provider invocation under a per-call timeout
//!
//! Every outcome, including connector panics and timeouts, is folded into a
//! [`ProviderResult`]; the invoker itself never fails.

use async_trait::async_trait;
use brandmark_config::Settings;
use brandmark_providers::ProviderRegistry;
use brandmark_types::{NameCheckOptions, ProviderGroup, ProviderResult};
use futures::FutureExt;
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub use brandmark_types::constants::limits::REQUEST_TIMEOUT_ERROR;

/// Per-call timeouts by provider category, with per-provider overrides
#[derive(Debug, Clone)]
pub struct TimeoutPolicy {
	default: Duration,
	groups: HashMap<ProviderGroup, Duration>,
	overrides: HashMap<(ProviderGroup, String), Duration>,
}

impl TimeoutPolicy {
	pub fn uniform(timeout: Duration) -> Self {
		Self {
			default: timeout,
			groups: HashMap::new(),
			overrides: HashMap::new(),
		}
	}

	pub fn from_settings(settings: &Settings) -> Self {
		let groups = ProviderGroup::ALL
			.into_iter()
			.map(|group| {
				(
					group,
					Duration::from_millis(settings.timeouts.per_call_ms(group)),
				)
			})
			.collect();

		let overrides = settings
			.providers
			.iter()
			.filter(|provider| provider.timeout_ms.is_some())
			.map(|provider| {
				(
					(provider.group, provider.provider_id.clone()),
					Duration::from_millis(settings.provider_timeout_ms(provider)),
				)
			})
			.collect();

		Self {
			default: Duration::from_millis(settings.timeouts.default_ms),
			groups,
			overrides,
		}
	}

	pub fn with_override(mut self, group: ProviderGroup, provider: &str, timeout: Duration) -> Self {
		self.overrides.insert((group, provider.to_string()), timeout);
		self
	}

	pub fn timeout_for(&self, group: ProviderGroup, provider: &str) -> Duration {
		self.overrides
			.get(&(group, provider.to_string()))
			.or_else(|| self.groups.get(&group))
			.copied()
			.unwrap_or(self.default)
	}
}

/// Trait for invoking one provider (enables easy testing and mocking)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProviderInvokerTrait: Send + Sync {
	/// Run one connector check; failures come back as failed results
	async fn check_availability(
		&self,
		group: ProviderGroup,
		provider: &str,
		name: &str,
		options: &NameCheckOptions,
	) -> ProviderResult;

	/// Per-call timeout applied to a provider
	fn timeout_for(&self, group: ProviderGroup, provider: &str) -> Duration;
}

/// Invokes registered connectors
pub struct ProviderInvoker {
	registry: Arc<ProviderRegistry>,
	timeouts: TimeoutPolicy,
}

impl ProviderInvoker {
	pub fn new(registry: Arc<ProviderRegistry>, timeouts: TimeoutPolicy) -> Self {
		Self { registry, timeouts }
	}
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
	if let Some(message) = payload.downcast_ref::<&str>() {
		message.to_string()
	} else if let Some(message) = payload.downcast_ref::<String>() {
		message.clone()
	} else {
		"unknown panic".to_string()
	}
}

#[async_trait]
impl ProviderInvokerTrait for ProviderInvoker {
	async fn check_availability(
		&self,
		group: ProviderGroup,
		provider: &str,
		name: &str,
		options: &NameCheckOptions,
	) -> ProviderResult {
		let Some(connector) = self.registry.get(group, provider) else {
			warn!("Unknown provider {}.{}", group, provider);
			return ProviderResult::failed(provider, name, format!("Unknown provider: {}", provider));
		};

		let timeout = self.timeouts.timeout_for(group, provider);
		let call = AssertUnwindSafe(connector.check(name, options)).catch_unwind();

		match tokio::time::timeout(timeout, call).await {
			Ok(Ok(Ok(response))) => {
				debug!(
					"{}.{} answered {:?} for {}",
					group, provider, response.availability, name
				);
				ProviderResult::from_response(provider, name, response)
			},
			Ok(Ok(Err(e))) => {
				debug!("{}.{} failed for {}: {}", group, provider, name, e);
				ProviderResult::failed(provider, name, e.to_string())
			},
			Ok(Err(payload)) => {
				let message = panic_message(payload);
				warn!("{}.{} panicked for {}: {}", group, provider, name, message);
				ProviderResult::failed(provider, name, format!("Provider check panicked: {}", message))
			},
			Err(_) => {
				debug!(
					"{}.{} timed out after {}ms for {}",
					group,
					provider,
					timeout.as_millis(),
					name
				);
				ProviderResult::failed(provider, name, REQUEST_TIMEOUT_ERROR)
			},
		}
	}

	fn timeout_for(&self, group: ProviderGroup, provider: &str) -> Duration {
		self.timeouts.timeout_for(group, provider)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use brandmark_providers::StaticConnector;
	use brandmark_types::{
		Availability, ConnectorError, ConnectorResponse, ConnectorResult, ProviderConnector,
	};

	#[derive(Debug)]
	struct FailingConnector;

	#[async_trait]
	impl ProviderConnector for FailingConnector {
		fn provider_id(&self) -> &str {
			"flaky"
		}

		fn group(&self) -> ProviderGroup {
			ProviderGroup::Social
		}

		async fn check(
			&self,
			_name: &str,
			_options: &NameCheckOptions,
		) -> ConnectorResult<ConnectorResponse> {
			Err(ConnectorError::HttpStatus {
				status_code: 503,
				reason: "Service Unavailable".to_string(),
			})
		}
	}

	#[derive(Debug)]
	struct PanickingConnector;

	#[async_trait]
	impl ProviderConnector for PanickingConnector {
		fn provider_id(&self) -> &str {
			"broken"
		}

		fn group(&self) -> ProviderGroup {
			ProviderGroup::Social
		}

		async fn check(
			&self,
			_name: &str,
			_options: &NameCheckOptions,
		) -> ConnectorResult<ConnectorResponse> {
			panic!("connector bug")
		}
	}

	fn invoker() -> ProviderInvoker {
		let mut registry = ProviderRegistry::new();
		registry
			.register(Arc::new(StaticConnector::new("npm", ProviderGroup::PackageRegistries)))
			.unwrap();
		registry
			.register(Arc::new(
				StaticConnector::new("slowhub", ProviderGroup::DevPlatforms)
					.with_latency(Duration::from_secs(5)),
			))
			.unwrap();
		registry.register(Arc::new(FailingConnector)).unwrap();
		registry.register(Arc::new(PanickingConnector)).unwrap();

		let timeouts = TimeoutPolicy::uniform(Duration::from_secs(2));
		ProviderInvoker::new(Arc::new(registry), timeouts)
	}

	#[tokio::test]
	async fn test_successful_check() {
		let result = invoker()
			.check_availability(
				ProviderGroup::PackageRegistries,
				"npm",
				"acme",
				&NameCheckOptions::default(),
			)
			.await;
		assert_eq!(result.available, Availability::Available);
		assert!(result.error.is_none());
	}

	#[tokio::test(start_paused = true)]
	async fn test_timeout_yields_failed_result() {
		let result = invoker()
			.check_availability(
				ProviderGroup::DevPlatforms,
				"slowhub",
				"acme",
				&NameCheckOptions::default(),
			)
			.await;
		assert_eq!(result.available, Availability::Unknown);
		assert_eq!(result.error.as_deref(), Some(REQUEST_TIMEOUT_ERROR));
	}

	#[tokio::test]
	async fn test_connector_error_message_is_kept() {
		let result = invoker()
			.check_availability(
				ProviderGroup::Social,
				"flaky",
				"acme",
				&NameCheckOptions::default(),
			)
			.await;
		assert_eq!(result.error.as_deref(), Some("HTTP 503: Service Unavailable"));
	}

	#[tokio::test]
	async fn test_connector_panic_is_contained() {
		let result = invoker()
			.check_availability(
				ProviderGroup::Social,
				"broken",
				"acme",
				&NameCheckOptions::default(),
			)
			.await;
		assert_eq!(
			result.error.as_deref(),
			Some("Provider check panicked: connector bug")
		);
	}

	#[tokio::test]
	async fn test_unknown_provider() {
		let result = invoker()
			.check_availability(
				ProviderGroup::Social,
				"myspace",
				"acme",
				&NameCheckOptions::default(),
			)
			.await;
		assert_eq!(result.error.as_deref(), Some("Unknown provider: myspace"));
	}

	#[test]
	fn test_timeout_policy_from_settings() {
		let mut settings = Settings::default();
		settings.providers[0].timeout_ms = Some(750);
		let first = settings.providers[0].clone();

		let policy = TimeoutPolicy::from_settings(&settings);
		assert_eq!(
			policy.timeout_for(first.group, &first.provider_id),
			Duration::from_millis(750)
		);
		assert_eq!(
			policy.timeout_for(ProviderGroup::Social, "twitter"),
			Duration::from_millis(2_000)
		);
		assert_eq!(
			policy.timeout_for(ProviderGroup::Domains, ".xyz"),
			Duration::from_millis(5_000)
		);
	}
}
