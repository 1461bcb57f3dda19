//! Provider domain model: groups, tri-state availability and per-provider results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::checks::CheckValidationError;

pub mod errors;
pub mod traits;

pub use errors::{ConnectorError, ConnectorResult};
pub use traits::{ConnectorResponse, ProviderConnector};

/// Named category bundling related providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderGroup {
	/// Domain registries (one provider per TLD)
	Domains,
	/// Social platforms
	Social,
	/// Application stores
	AppStores,
	/// Package registries
	PackageRegistries,
	/// Developer platforms
	DevPlatforms,
}

impl ProviderGroup {
	/// Every known group, in canonical order
	pub const ALL: [ProviderGroup; 5] = [
		ProviderGroup::Domains,
		ProviderGroup::Social,
		ProviderGroup::AppStores,
		ProviderGroup::PackageRegistries,
		ProviderGroup::DevPlatforms,
	];

	/// Wire identifier of the group
	pub fn as_str(&self) -> &'static str {
		match self {
			ProviderGroup::Domains => "domains",
			ProviderGroup::Social => "social",
			ProviderGroup::AppStores => "app_stores",
			ProviderGroup::PackageRegistries => "package_registries",
			ProviderGroup::DevPlatforms => "dev_platforms",
		}
	}
}

impl fmt::Display for ProviderGroup {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for ProviderGroup {
	type Err = CheckValidationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		ProviderGroup::ALL
			.into_iter()
			.find(|group| group.as_str() == s.trim())
			.ok_or_else(|| CheckValidationError::UnknownProviderGroup {
				group: s.to_string(),
			})
	}
}

/// Outcome of one availability check
///
/// Serialized as `true`, `false` or `null` so that clients see the same
/// shape whichever provider answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Availability {
	/// The name is free on this provider
	Available,
	/// The name is taken on this provider
	Unavailable,
	/// The check could not produce a definite answer
	#[default]
	Unknown,
}

impl Availability {
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Availability::Available => Some(true),
			Availability::Unavailable => Some(false),
			Availability::Unknown => None,
		}
	}

	pub fn is_known(&self) -> bool {
		!matches!(self, Availability::Unknown)
	}
}

impl From<Option<bool>> for Availability {
	fn from(value: Option<bool>) -> Self {
		match value {
			Some(true) => Availability::Available,
			Some(false) => Availability::Unavailable,
			None => Availability::Unknown,
		}
	}
}

impl From<bool> for Availability {
	fn from(value: bool) -> Self {
		Availability::from(Some(value))
	}
}

impl Serialize for Availability {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		self.as_bool().serialize(serializer)
	}
}

impl<'de> Deserialize<'de> for Availability {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		Option::<bool>::deserialize(deserializer).map(Availability::from)
	}
}

/// Result of checking one name against one provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderResult {
	/// Provider identifier (unique within its group)
	pub provider: String,

	/// Candidate name that was checked (normalized)
	pub name: String,

	/// Tri-state outcome
	#[serde(default)]
	pub available: Availability,

	/// Confidence in the outcome (0.0 to 1.0), meaningful only for definite outcomes
	#[serde(default)]
	pub confidence: f64,

	/// Extra data reported by the connector
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub metadata: Option<serde_json::Value>,

	/// Failure reason, present iff the check failed
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,

	/// When the check completed
	pub checked_at: DateTime<Utc>,
}

impl ProviderResult {
	/// Create a result with a provider answer
	pub fn new(
		provider: impl Into<String>,
		name: impl Into<String>,
		available: Availability,
		confidence: f64,
	) -> Self {
		Self {
			provider: provider.into(),
			name: name.into(),
			available,
			confidence: confidence.clamp(0.0, 1.0),
			metadata: None,
			error: None,
			checked_at: Utc::now(),
		}
	}

	/// Create a failed result: unknown availability with an error reason
	pub fn failed(
		provider: impl Into<String>,
		name: impl Into<String>,
		error: impl Into<String>,
	) -> Self {
		Self {
			error: Some(error.into()),
			..Self::new(provider, name, Availability::Unknown, 0.0)
		}
	}

	/// Build a result from a connector answer
	pub fn from_response(
		provider: impl Into<String>,
		name: impl Into<String>,
		response: ConnectorResponse,
	) -> Self {
		Self::new(provider, name, response.availability, response.confidence)
			.with_metadata_opt(response.metadata)
	}

	pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
		self.metadata = Some(metadata);
		self
	}

	fn with_metadata_opt(mut self, metadata: Option<serde_json::Value>) -> Self {
		self.metadata = metadata;
		self
	}

	/// Whether the check failed rather than produced an answer
	pub fn is_error(&self) -> bool {
		self.error.is_some()
	}
}

/// Request quota applied to one provider within a fixed window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitQuota {
	/// Requests allowed per window
	pub requests: u32,
	/// Window duration in seconds
	pub window_seconds: u64,
}

impl RateLimitQuota {
	pub fn new(requests: u32, window_seconds: u64) -> Self {
		Self {
			requests,
			window_seconds,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_provider_group_parsing() {
		assert_eq!(
			"package_registries".parse::<ProviderGroup>().unwrap(),
			ProviderGroup::PackageRegistries
		);
		assert_eq!(
			" domains ".parse::<ProviderGroup>().unwrap(),
			ProviderGroup::Domains
		);
		assert!("trademarks".parse::<ProviderGroup>().is_err());
	}

	#[test]
	fn test_availability_serializes_as_nullable_bool() {
		assert_eq!(serde_json::to_string(&Availability::Available).unwrap(), "true");
		assert_eq!(serde_json::to_string(&Availability::Unavailable).unwrap(), "false");
		assert_eq!(serde_json::to_string(&Availability::Unknown).unwrap(), "null");

		let parsed: Availability = serde_json::from_str("null").unwrap();
		assert_eq!(parsed, Availability::Unknown);
	}

	#[test]
	fn test_failed_result_shape() {
		let result = ProviderResult::failed(".io", "acme", "Request timeout");

		assert_eq!(result.available, Availability::Unknown);
		assert_eq!(result.confidence, 0.0);
		assert_eq!(result.error.as_deref(), Some("Request timeout"));
		assert!(result.is_error());
	}

	#[test]
	fn test_confidence_is_clamped() {
		let result = ProviderResult::new("github", "acme", Availability::Available, 1.7);
		assert_eq!(result.confidence, 1.0);
	}

	#[test]
	fn test_missing_available_field_defaults_to_unknown() {
		let json = r#"{"provider":"npm","name":"acme","checked_at":"2025-01-01T00:00:00Z"}"#;
		let result: ProviderResult = serde_json::from_str(json).unwrap();
		assert_eq!(result.available, Availability::Unknown);
		assert!(result.error.is_none());
	}
}
