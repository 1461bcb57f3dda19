//! Service fixtures built from scripted connectors

use std::sync::Arc;
use std::time::Duration;

use brandmark_aggregator::mocks::{mock_settings, ScriptedConnector};
use brandmark_aggregator::service::{
	AvailabilityCache, FanoutCoordinator, ProviderInvoker, ProviderRateLimiter, TimeoutPolicy,
};
use brandmark_aggregator::{CheckService, MemoryStore, ProviderRegistry, Settings};

pub fn registry(connectors: &[ScriptedConnector]) -> Arc<ProviderRegistry> {
	let mut registry = ProviderRegistry::new();
	for connector in connectors {
		registry
			.register(Arc::new(connector.clone()))
			.expect("register connector");
	}
	Arc::new(registry)
}

/// Check service over the connectors using `settings` for timeouts and quotas
#[allow(dead_code)]
pub fn service(connectors: &[ScriptedConnector], settings: &Settings) -> CheckService {
	CheckService::from_settings(settings, registry(connectors), Arc::new(MemoryStore::new()))
}

#[allow(dead_code)]
pub fn default_service(connectors: &[ScriptedConnector]) -> CheckService {
	service(connectors, &mock_settings())
}

/// Coordinator with one per-call timeout for every provider
#[allow(dead_code)]
pub fn coordinator(
	connectors: &[ScriptedConnector],
	per_call: Duration,
	global: Duration,
) -> FanoutCoordinator {
	let settings = mock_settings();
	let storage = Arc::new(MemoryStore::new());
	let registry = registry(connectors);

	FanoutCoordinator::new(
		Arc::clone(&registry),
		Arc::new(ProviderRateLimiter::new(
			storage.clone(),
			settings.rate_limits.clone(),
		)),
		Arc::new(AvailabilityCache::new(storage, &settings.cache)),
		Arc::new(ProviderInvoker::new(registry, TimeoutPolicy::uniform(per_call))),
		global,
	)
}

/// Let spawned cache writes land
#[allow(dead_code)]
pub async fn settle() {
	for _ in 0..10 {
		tokio::task::yield_now().await;
	}
}
