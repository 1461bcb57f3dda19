//! Mock connectors for demos and testing
//!
//! Connectors here never touch the network: they answer after a configured
//! delay with a scripted outcome and count how often they were called.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use brandmark_config::Settings;
use brandmark_types::{
	ConnectorError, ConnectorResponse, ConnectorResult, NameCheckOptions, ProviderConnector,
	ProviderGroup,
};

/// Call tracking for verifying which connectors were actually invoked
#[derive(Debug, Clone, Default)]
pub struct CallTracker {
	calls: Arc<AtomicUsize>,
	completions: Arc<AtomicUsize>,
}

impl CallTracker {
	pub fn record_call(&self) {
		self.calls.fetch_add(1, Ordering::SeqCst);
	}

	pub fn record_completion(&self) {
		self.completions.fetch_add(1, Ordering::SeqCst);
	}

	pub fn call_count(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	/// Calls that got past their response delay
	pub fn completion_count(&self) -> usize {
		self.completions.load(Ordering::SeqCst)
	}
}

/// Answer a [`ScriptedConnector`] gives
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptedOutcome {
	Available,
	Unavailable,
	Fail(String),
	/// Never answers
	Hang,
}

/// Connector with a fixed answer and response delay
#[derive(Debug, Clone)]
pub struct ScriptedConnector {
	provider_id: String,
	group: ProviderGroup,
	delay: Duration,
	outcome: ScriptedOutcome,
	tracker: CallTracker,
}

impl ScriptedConnector {
	pub fn new(
		provider_id: &str,
		group: ProviderGroup,
		delay: Duration,
		outcome: ScriptedOutcome,
	) -> Self {
		Self {
			provider_id: provider_id.to_string(),
			group,
			delay,
			outcome,
			tracker: CallTracker::default(),
		}
	}

	/// Reports the name as free after `delay_ms`
	pub fn available(provider_id: &str, group: ProviderGroup, delay_ms: u64) -> Self {
		Self::new(
			provider_id,
			group,
			Duration::from_millis(delay_ms),
			ScriptedOutcome::Available,
		)
	}

	/// Reports the name as taken after `delay_ms`
	pub fn unavailable(provider_id: &str, group: ProviderGroup, delay_ms: u64) -> Self {
		Self::new(
			provider_id,
			group,
			Duration::from_millis(delay_ms),
			ScriptedOutcome::Unavailable,
		)
	}

	/// Fails with a network error after `delay_ms`
	pub fn failing(provider_id: &str, group: ProviderGroup, delay_ms: u64) -> Self {
		Self::new(
			provider_id,
			group,
			Duration::from_millis(delay_ms),
			ScriptedOutcome::Fail("connection reset".to_string()),
		)
	}

	/// Never answers
	pub fn hanging(provider_id: &str, group: ProviderGroup) -> Self {
		Self::new(provider_id, group, Duration::ZERO, ScriptedOutcome::Hang)
	}

	pub fn tracker(&self) -> CallTracker {
		self.tracker.clone()
	}
}

#[async_trait]
impl ProviderConnector for ScriptedConnector {
	fn provider_id(&self) -> &str {
		&self.provider_id
	}

	fn group(&self) -> ProviderGroup {
		self.group
	}

	async fn check(
		&self,
		_name: &str,
		_options: &NameCheckOptions,
	) -> ConnectorResult<ConnectorResponse> {
		self.tracker.record_call();
		if !self.delay.is_zero() {
			tokio::time::sleep(self.delay).await;
		}
		self.tracker.record_completion();

		match &self.outcome {
			ScriptedOutcome::Available => Ok(ConnectorResponse::available(0.9)),
			ScriptedOutcome::Unavailable => Ok(ConnectorResponse::unavailable(0.95)),
			ScriptedOutcome::Fail(reason) => Err(ConnectorError::Network(reason.clone())),
			ScriptedOutcome::Hang => std::future::pending().await,
		}
	}
}

/// Settings with no configured providers, for builders fed with mock connectors
pub fn mock_settings() -> Settings {
	let mut settings = Settings::default();
	settings.providers.clear();
	settings.environment.mock_providers = true;
	settings
}
