//! Response models for bulk checks and provider listings

use serde::{Deserialize, Serialize};

use super::{CheckStatus, NameCheck};
use crate::constants::limits::BULK_TOP_PROVIDERS;
use crate::providers::{Availability, ProviderGroup, RateLimitQuota};

/// Overall state of a bulk check
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BulkCheckStatus {
	/// Every name finished with a complete check
	Completed,
	/// At least one name was truncated by its overall timeout
	Partial,
}

/// Availability tallies for one name of a bulk check
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NameAvailability {
	pub name: String,
	pub status: CheckStatus,
	pub available_count: usize,
	/// Every provider result, including failed ones
	pub total_count: usize,
	/// Share of available results in percent, rounded to one decimal
	pub availability_percentage: f64,
	/// First providers reporting the name as free
	pub top_available: Vec<String>,
	/// First providers reporting the name as taken
	pub top_taken: Vec<String>,
}

impl NameAvailability {
	pub fn from_check(check: &NameCheck) -> Self {
		let mut available = Vec::new();
		let mut taken = Vec::new();
		let mut total_count = 0;

		for result in check.results.values().flat_map(|group| group.values()) {
			total_count += 1;
			match result.available {
				Availability::Available => available.push(result.provider.clone()),
				Availability::Unavailable => taken.push(result.provider.clone()),
				Availability::Unknown => {},
			}
		}

		let available_count = available.len();
		let availability_percentage = if total_count > 0 {
			round_one_decimal(available_count as f64 / total_count as f64 * 100.0)
		} else {
			0.0
		};
		available.truncate(BULK_TOP_PROVIDERS);
		taken.truncate(BULK_TOP_PROVIDERS);

		Self {
			name: check.name.clone(),
			status: check.status,
			available_count,
			total_count,
			availability_percentage,
			top_available: available,
			top_taken: taken,
		}
	}
}

/// A name together with its availability percentage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct NameRanking {
	pub name: Option<String>,
	pub percentage: f64,
}

/// Aggregates over every name of a bulk check
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct BulkCheckSummary {
	pub total_names_checked: usize,
	pub total_platforms_checked: usize,
	pub total_available: usize,
	/// Mean of the per-name percentages, rounded to one decimal
	pub average_availability: f64,
	/// First name with the highest percentage
	pub best_availability: NameRanking,
	/// First name with the lowest percentage
	pub worst_availability: NameRanking,
}

impl BulkCheckSummary {
	pub fn from_names(names: &[NameAvailability]) -> Self {
		let mut best: Option<&NameAvailability> = None;
		let mut worst: Option<&NameAvailability> = None;
		for entry in names {
			if best.map_or(true, |b| entry.availability_percentage > b.availability_percentage) {
				best = Some(entry);
			}
			if worst.map_or(true, |w| entry.availability_percentage < w.availability_percentage) {
				worst = Some(entry);
			}
		}

		let ranking = |entry: Option<&NameAvailability>| NameRanking {
			name: entry.map(|e| e.name.clone()),
			percentage: entry.map_or(0.0, |e| e.availability_percentage),
		};

		let average_availability = if names.is_empty() {
			0.0
		} else {
			let total: f64 = names.iter().map(|n| n.availability_percentage).sum();
			round_one_decimal(total / names.len() as f64)
		};

		Self {
			total_names_checked: names.len(),
			total_platforms_checked: names.iter().map(|n| n.total_count).sum(),
			total_available: names.iter().map(|n| n.available_count).sum(),
			average_availability,
			best_availability: ranking(best),
			worst_availability: ranking(worst),
		}
	}
}

fn round_one_decimal(value: f64) -> f64 {
	(value * 10.0).round() / 10.0
}

/// Response body for a bulk check
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BulkCheckResponse {
	pub batch_id: String,
	pub status: BulkCheckStatus,
	pub total_names: usize,
	pub results: Vec<NameCheck>,
	/// Per-name tallies, in the same order as `results`
	pub availability: Vec<NameAvailability>,
	pub summary: BulkCheckSummary,
	pub processing_time_ms: u64,
}

impl BulkCheckResponse {
	pub fn new(batch_id: impl Into<String>, results: Vec<NameCheck>, processing_time_ms: u64) -> Self {
		let status = if results.iter().all(|c| c.status == CheckStatus::Complete) {
			BulkCheckStatus::Completed
		} else {
			BulkCheckStatus::Partial
		};
		let availability: Vec<NameAvailability> =
			results.iter().map(NameAvailability::from_check).collect();
		let summary = BulkCheckSummary::from_names(&availability);

		Self {
			batch_id: batch_id.into(),
			status,
			total_names: results.len(),
			results,
			availability,
			summary,
			processing_time_ms,
		}
	}
}

/// Public description of one registered provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderInfo {
	pub provider: String,
	pub group: ProviderGroup,
	pub display_name: String,
	/// Per-call timeout applied by the invoker
	pub timeout_ms: u64,
	pub rate_limit: RateLimitQuota,
}

/// Response body for the provider listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProvidersResponse {
	pub groups: Vec<ProviderGroup>,
	pub providers: Vec<ProviderInfo>,
	pub total_providers: usize,
	/// Overall batch timeout applied to one name check
	pub global_timeout_ms: u64,
}

impl ProvidersResponse {
	pub fn new(providers: Vec<ProviderInfo>, global_timeout_ms: u64) -> Self {
		let mut groups: Vec<ProviderGroup> = providers.iter().map(|p| p.group).collect();
		groups.sort();
		groups.dedup();
		Self {
			groups,
			total_providers: providers.len(),
			providers,
			global_timeout_ms,
		}
	}
}
