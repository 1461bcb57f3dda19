//! Core name check domain model: aggregate results, summary and work items

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::constants::limits::NAME_CHECK_TTL_MINUTES;
use crate::providers::{Availability, ProviderGroup, ProviderResult};

pub mod errors;
pub mod request;
pub mod response;

pub use errors::{CheckError, CheckValidationError};
pub use request::{normalize_name, validate_name, BulkCheckRequest, NameCheckOptions, NameCheckRequest};
pub use response::{
	BulkCheckResponse, BulkCheckStatus, BulkCheckSummary, NameAvailability, NameRanking, ProviderInfo,
	ProvidersResponse,
};

/// Result type for check operations
pub type CheckResult<T> = Result<T, CheckError>;

/// Result type for check validation operations
pub type CheckValidationResult<T> = Result<T, CheckValidationError>;

/// Results of one group, keyed by provider id
pub type GroupResults = BTreeMap<String, ProviderResult>;

/// Results of a whole check, keyed by group then provider id
pub type CheckResults = BTreeMap<ProviderGroup, GroupResults>;

/// Lifecycle of a name check
///
/// `Pending` is the initial state only; a check moves to exactly one
/// terminal state and is never mutated afterwards.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
	#[default]
	Pending,
	/// Every task settled before the overall timeout (errors count as settled)
	Complete,
	/// The overall timeout truncated the batch after some tasks settled
	Partial,
	/// The overall timeout fired before any task settled
	Failed,
}

impl CheckStatus {
	pub fn is_terminal(&self) -> bool {
		!matches!(self, CheckStatus::Pending)
	}
}

/// Aggregate counts derived from a results tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NameCheckSummary {
	pub total_checked: usize,
	pub available: usize,
	pub unavailable: usize,
	pub pending: usize,
	pub overall_score: f64,
}

impl NameCheckSummary {
	/// Recompute the summary from a results tree
	pub fn from_results(results: &CheckResults) -> Self {
		let mut summary = Self::default();

		for result in results.values().flat_map(|group| group.values()) {
			summary.total_checked += 1;
			match result.available {
				Availability::Available => summary.available += 1,
				Availability::Unavailable => summary.unavailable += 1,
				Availability::Unknown => summary.pending += 1,
			}
		}

		if summary.total_checked > 0 {
			summary.overall_score = summary.available as f64 / summary.total_checked as f64;
		}

		summary
	}
}

/// Aggregate result for one name across one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameCheck {
	/// Unique identifier generated per request
	pub id: String,

	/// Normalized candidate name
	pub name: String,

	pub status: CheckStatus,

	/// Results keyed by group, then provider id
	pub results: CheckResults,

	/// Derived from `results`, never edited directly
	pub summary: NameCheckSummary,

	pub created_at: DateTime<Utc>,

	/// End of the validity window of this result
	pub expires_at: DateTime<Utc>,

	/// Wall-clock time spent producing the results
	pub duration_ms: u64,
}

impl NameCheck {
	/// Start a new pending check for `name`
	pub fn pending(name: impl Into<String>) -> Self {
		let created_at = Utc::now();
		Self {
			id: Uuid::new_v4().to_string(),
			name: name.into(),
			status: CheckStatus::Pending,
			results: CheckResults::new(),
			summary: NameCheckSummary::default(),
			created_at,
			expires_at: created_at + Duration::minutes(NAME_CHECK_TTL_MINUTES),
			duration_ms: 0,
		}
	}

	/// Attach the collected results and move to a terminal status
	pub fn finalize(mut self, results: CheckResults, status: CheckStatus, duration_ms: u64) -> Self {
		self.summary = NameCheckSummary::from_results(&results);
		self.results = results;
		self.status = status;
		self.duration_ms = duration_ms;
		self
	}

	/// Look up one provider result
	pub fn result(&self, group: ProviderGroup, provider: &str) -> Option<&ProviderResult> {
		self.results.get(&group).and_then(|group| group.get(provider))
	}

	/// Total number of provider results across all groups
	pub fn result_count(&self) -> usize {
		self.results.values().map(|group| group.len()).sum()
	}

	pub fn is_expired(&self) -> bool {
		Utc::now() > self.expires_at
	}
}

/// One independent unit of fan-out work
#[derive(Debug, Clone, PartialEq)]
pub struct CheckTask {
	pub group: ProviderGroup,
	pub provider: String,
	pub name: String,
	pub options: NameCheckOptions,
}

impl CheckTask {
	pub fn new(
		group: ProviderGroup,
		provider: impl Into<String>,
		name: impl Into<String>,
		options: NameCheckOptions,
	) -> Self {
		Self {
			group,
			provider: provider.into(),
			name: name.into(),
			options,
		}
	}

	/// Qualified `<group>.<provider>` label used in progress events
	pub fn label(&self) -> String {
		format!("{}.{}", self.group, self.provider)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn results_fixture() -> CheckResults {
		let mut domains = GroupResults::new();
		domains.insert(
			".com".to_string(),
			ProviderResult::new(".com", "acme", Availability::Unavailable, 0.95),
		);
		domains.insert(
			".io".to_string(),
			ProviderResult::failed(".io", "acme", "Request timeout"),
		);

		let mut social = GroupResults::new();
		social.insert(
			"github".to_string(),
			ProviderResult::new("github", "acme", Availability::Available, 0.9),
		);

		let mut results = CheckResults::new();
		results.insert(ProviderGroup::Domains, domains);
		results.insert(ProviderGroup::Social, social);
		results
	}

	#[test]
	fn test_summary_counts() {
		let summary = NameCheckSummary::from_results(&results_fixture());

		assert_eq!(summary.total_checked, 3);
		assert_eq!(summary.available, 1);
		assert_eq!(summary.unavailable, 1);
		assert_eq!(summary.pending, 1);
		assert_eq!(
			summary.total_checked,
			summary.available + summary.unavailable + summary.pending
		);
		assert!((summary.overall_score - 1.0 / 3.0).abs() < f64::EPSILON);
	}

	#[test]
	fn test_summary_is_pure() {
		let results = results_fixture();
		assert_eq!(
			NameCheckSummary::from_results(&results),
			NameCheckSummary::from_results(&results)
		);
	}

	#[test]
	fn test_empty_summary_scores_zero() {
		let summary = NameCheckSummary::from_results(&CheckResults::new());
		assert_eq!(summary.total_checked, 0);
		assert_eq!(summary.overall_score, 0.0);
	}

	#[test]
	fn test_name_check_lifecycle() {
		let check = NameCheck::pending("acme");
		assert_eq!(check.status, CheckStatus::Pending);
		assert_eq!(check.expires_at - check.created_at, Duration::minutes(15));
		assert!(!check.is_expired());

		let check = check.finalize(results_fixture(), CheckStatus::Complete, 42);
		assert!(check.status.is_terminal());
		assert_eq!(check.result_count(), 3);
		assert_eq!(check.summary.pending, 1);
		assert_eq!(
			check
				.result(ProviderGroup::Domains, ".com")
				.map(|r| r.available),
			Some(Availability::Unavailable)
		);
	}

	#[test]
	fn test_results_serialize_with_group_keys() {
		let check = NameCheck::pending("acme").finalize(results_fixture(), CheckStatus::Partial, 10);
		let json = serde_json::to_value(&check).unwrap();

		assert_eq!(json["status"], "partial");
		assert_eq!(json["results"]["domains"][".com"]["available"], false);
		assert!(json["results"]["domains"][".io"]["available"].is_null());
		assert_eq!(json["results"]["domains"][".io"]["error"], "Request timeout");
	}

	#[test]
	fn test_task_label() {
		let task = CheckTask::new(
			ProviderGroup::PackageRegistries,
			"npm",
			"acme",
			NameCheckOptions::default(),
		);
		assert_eq!(task.label(), "package_registries.npm");
	}
}
