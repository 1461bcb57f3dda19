//! Registry mapping provider groups to their connectors

use brandmark_config::{ConnectorKind, ProviderSettings, Settings};
use brandmark_types::{ConnectorError, NameCheckOptions, ProviderConnector, ProviderGroup};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::client_cache::{ClientCache, ClientConfig};
use crate::http_probe::HttpProbeConnector;
use crate::static_connector::StaticConnector;

/// Errors raised while building the registry
#[derive(Error, Debug)]
pub enum RegistryError {
	#[error("Provider '{provider_id}' is already registered in group {group}")]
	DuplicateProvider {
		provider_id: String,
		group: ProviderGroup,
	},

	#[error("Failed to create connector '{provider_id}': {source}")]
	Connector {
		provider_id: String,
		#[source]
		source: ConnectorError,
	},
}

/// Registered connectors, ordered by group and registration order
#[derive(Debug, Default, Clone)]
pub struct ProviderRegistry {
	groups: BTreeMap<ProviderGroup, Vec<Arc<dyn ProviderConnector>>>,
}

impl ProviderRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a connector under its own group
	pub fn register(&mut self, connector: Arc<dyn ProviderConnector>) -> Result<(), RegistryError> {
		let group = connector.group();
		let providers = self.groups.entry(group).or_default();

		if providers
			.iter()
			.any(|existing| existing.provider_id() == connector.provider_id())
		{
			return Err(RegistryError::DuplicateProvider {
				provider_id: connector.provider_id().to_string(),
				group,
			});
		}

		debug!("Registered provider {}.{}", group, connector.provider_id());
		providers.push(connector);
		Ok(())
	}

	/// Build the registry from configured providers
	///
	/// In mock mode every enabled provider is backed by a [`StaticConnector`].
	pub fn from_settings(settings: &Settings, cache: &ClientCache) -> Result<Self, RegistryError> {
		let mut registry = Self::new();
		let mock = settings.environment.mock_providers;

		for provider in settings.enabled_providers() {
			let connector = build_connector(&provider, mock, cache)?;
			registry.register(connector)?;
		}

		info!(
			"Provider registry ready: {} providers in {} groups{}",
			registry.len(),
			registry.groups.len(),
			if mock { " (mock mode)" } else { "" }
		);
		Ok(registry)
	}

	pub fn get(&self, group: ProviderGroup, provider_id: &str) -> Option<Arc<dyn ProviderConnector>> {
		self.groups
			.get(&group)?
			.iter()
			.find(|connector| connector.provider_id() == provider_id)
			.cloned()
	}

	/// Find a provider by id in any group (first match in group order)
	pub fn find(&self, provider_id: &str) -> Option<Arc<dyn ProviderConnector>> {
		self.groups
			.values()
			.flatten()
			.find(|connector| connector.provider_id() == provider_id)
			.cloned()
	}

	pub fn is_valid_provider(&self, provider_id: &str) -> bool {
		self.find(provider_id).is_some()
	}

	pub fn providers_in_group(&self, group: ProviderGroup) -> Vec<Arc<dyn ProviderConnector>> {
		self.groups.get(&group).cloned().unwrap_or_default()
	}

	/// Resolve requested groups to `(group, provider id)` pairs
	///
	/// The `domains` option of the request restricts which domain
	/// extensions are included.
	pub fn resolve(
		&self,
		groups: &[ProviderGroup],
		options: &NameCheckOptions,
	) -> Vec<(ProviderGroup, String)> {
		let mut resolved = Vec::new();
		for group in groups {
			let Some(providers) = self.groups.get(group) else {
				warn!("No providers registered for group {}", group);
				continue;
			};
			resolved.extend(
				providers
					.iter()
					.filter(|connector| {
						*group != ProviderGroup::Domains
							|| options.allows_domain(connector.provider_id())
					})
					.map(|connector| (*group, connector.provider_id().to_string())),
			);
		}
		resolved
	}

	/// All connectors in group order
	pub fn all(&self) -> impl Iterator<Item = &Arc<dyn ProviderConnector>> {
		self.groups.values().flatten()
	}

	pub fn len(&self) -> usize {
		self.groups.values().map(Vec::len).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

fn build_connector(
	provider: &ProviderSettings,
	mock: bool,
	cache: &ClientCache,
) -> Result<Arc<dyn ProviderConnector>, RegistryError> {
	if mock || provider.kind == ConnectorKind::Static {
		return Ok(Arc::new(StaticConnector::new(
			&provider.provider_id,
			provider.group,
		)));
	}

	let connector_error = |source| RegistryError::Connector {
		provider_id: provider.provider_id.clone(),
		source,
	};

	let endpoint = provider.endpoint.as_deref().ok_or_else(|| {
		connector_error(ConnectorError::Config {
			reason: "missing endpoint".to_string(),
		})
	})?;

	let mut client_config = ClientConfig::for_provider(&provider.provider_id);
	for (name, value) in provider.headers.iter().flatten() {
		match value.resolve_optional() {
			Some(resolved) => client_config = client_config.with_header(name, &resolved),
			None => warn!(
				"Skipping header {} for provider {}: {} is not set",
				name,
				provider.provider_id,
				value.description()
			),
		}
	}

	let connector = HttpProbeConnector::new(
		&provider.provider_id,
		provider.group,
		endpoint,
		client_config,
		cache,
	)
	.map_err(connector_error)?;

	let connector = match &provider.display_name {
		Some(display_name) => connector.with_display_name(display_name),
		None => connector,
	};
	Ok(Arc::new(connector))
}
