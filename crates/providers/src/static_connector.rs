//! Deterministic connector used in mock mode and local development

use async_trait::async_trait;
use brandmark_types::{
	ConnectorResponse, ConnectorResult, NameCheckOptions, ProviderConnector, ProviderGroup,
};
use std::collections::HashSet;
use std::time::Duration;

/// Names reported as taken by every static connector unless overridden
pub const DEFAULT_TAKEN_NAMES: &[&str] = &[
	"google", "facebook", "apple", "amazon", "microsoft", "github", "twitter", "netflix", "openai",
	"react",
];

/// Connector that answers from a fixed set of taken names without network access
#[derive(Debug, Clone)]
pub struct StaticConnector {
	provider_id: String,
	group: ProviderGroup,
	taken: HashSet<String>,
	latency: Option<Duration>,
}

impl StaticConnector {
	pub fn new(provider_id: &str, group: ProviderGroup) -> Self {
		Self {
			provider_id: provider_id.to_string(),
			group,
			taken: DEFAULT_TAKEN_NAMES.iter().map(|n| n.to_string()).collect(),
			latency: None,
		}
	}

	/// Replace the set of names reported as taken
	pub fn with_taken<I, S>(mut self, names: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.taken = names.into_iter().map(|n| n.into().to_lowercase()).collect();
		self
	}

	/// Simulate network latency before answering
	pub fn with_latency(mut self, latency: Duration) -> Self {
		self.latency = Some(latency);
		self
	}
}

#[async_trait]
impl ProviderConnector for StaticConnector {
	fn provider_id(&self) -> &str {
		&self.provider_id
	}

	fn group(&self) -> ProviderGroup {
		self.group
	}

	async fn check(
		&self,
		name: &str,
		options: &NameCheckOptions,
	) -> ConnectorResult<ConnectorResponse> {
		if let Some(latency) = self.latency {
			tokio::time::sleep(latency).await;
		}

		let answer = if self.taken.contains(&name.to_lowercase()) {
			ConnectorResponse::unavailable(1.0)
		} else {
			ConnectorResponse::available(1.0)
		};

		if options.deep_check {
			return Ok(answer.with_metadata(serde_json::json!({ "source": "static" })));
		}
		Ok(answer)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use brandmark_types::Availability;

	#[tokio::test]
	async fn test_default_taken_names() {
		let connector = StaticConnector::new("npm", ProviderGroup::PackageRegistries);
		let options = NameCheckOptions::default();

		let taken = connector.check("react", &options).await.unwrap();
		assert_eq!(taken.availability, Availability::Unavailable);

		let free = connector.check("zyqorva", &options).await.unwrap();
		assert_eq!(free.availability, Availability::Available);
	}

	#[tokio::test(start_paused = true)]
	async fn test_simulated_latency() {
		let connector = StaticConnector::new(".com", ProviderGroup::Domains)
			.with_taken(["Acme"])
			.with_latency(Duration::from_millis(50));

		let started = tokio::time::Instant::now();
		let response = connector
			.check("acme", &NameCheckOptions::default())
			.await
			.unwrap();

		assert_eq!(response.availability, Availability::Unavailable);
		assert!(started.elapsed() >= Duration::from_millis(50));
	}
}
