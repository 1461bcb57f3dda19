//! Core connector trait implemented by every availability provider

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use super::{Availability, ConnectorResult, ProviderGroup};
use crate::checks::NameCheckOptions;

/// Answer produced by a connector for one name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorResponse {
	pub availability: Availability,
	pub confidence: f64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub metadata: Option<serde_json::Value>,
}

impl ConnectorResponse {
	pub fn new(availability: Availability, confidence: f64) -> Self {
		Self {
			availability,
			confidence,
			metadata: None,
		}
	}

	pub fn available(confidence: f64) -> Self {
		Self::new(Availability::Available, confidence)
	}

	pub fn unavailable(confidence: f64) -> Self {
		Self::new(Availability::Unavailable, confidence)
	}

	pub fn unknown() -> Self {
		Self::new(Availability::Unknown, 0.0)
	}

	pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
		self.metadata = Some(metadata);
		self
	}
}

/// Pluggable check against one external platform
///
/// Connectors only answer the question "is this name taken here?".
/// Timeouts, caching and rate limiting are applied around them by the
/// invoker, so implementations should not retry or sleep on their own.
#[async_trait]
pub trait ProviderConnector: Send + Sync + Debug {
	/// Provider identifier, unique within its group
	fn provider_id(&self) -> &str;

	/// Group this provider belongs to
	fn group(&self) -> ProviderGroup;

	/// Human-readable provider name
	fn display_name(&self) -> &str {
		self.provider_id()
	}

	/// Check whether `name` is available on this provider
	async fn check(
		&self,
		name: &str,
		options: &NameCheckOptions,
	) -> ConnectorResult<ConnectorResponse>;

	/// Health check for the upstream platform
	async fn health_check(&self) -> ConnectorResult<bool> {
		Ok(true)
	}
}
