//! Name check request models and validation

use serde::{Deserialize, Serialize};

use super::{CheckValidationError, CheckValidationResult};
use crate::constants::limits::{MAX_BULK_NAMES, MAX_NAME_LENGTH, MIN_NAME_LENGTH};
use crate::providers::ProviderGroup;

fn default_provider_groups() -> Vec<String> {
	vec![
		ProviderGroup::Domains.as_str().to_string(),
		ProviderGroup::Social.as_str().to_string(),
	]
}

/// Validate a candidate name: 2 to 50 characters of `[a-zA-Z0-9_-]`
pub fn validate_name(name: &str) -> CheckValidationResult<()> {
	let length = name.chars().count();
	if length < MIN_NAME_LENGTH {
		return Err(CheckValidationError::NameTooShort {
			length,
			min: MIN_NAME_LENGTH,
		});
	}
	if length > MAX_NAME_LENGTH {
		return Err(CheckValidationError::NameTooLong {
			length,
			max: MAX_NAME_LENGTH,
		});
	}
	if !name
		.chars()
		.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
	{
		return Err(CheckValidationError::InvalidNameCharacters {
			name: name.to_string(),
		});
	}
	Ok(())
}

/// Normalize a candidate name the way it is checked and cached
pub fn normalize_name(name: &str) -> String {
	name.trim().to_lowercase()
}

/// Per-request options passed through to connectors
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NameCheckOptions {
	/// Restrict the `domains` group to these extensions (`"com"`, `"io"`, ...).
	/// `None` checks every configured extension.
	pub domains: Option<Vec<String>>,

	/// Ask connectors for extra metadata where they support it
	pub deep_check: bool,
}

impl NameCheckOptions {
	pub fn validate(&self) -> CheckValidationResult<()> {
		if let Some(domains) = &self.domains {
			for tld in domains {
				let bare = tld.trim_start_matches('.');
				if bare.is_empty() || !bare.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
				{
					return Err(CheckValidationError::InvalidDomain { tld: tld.clone() });
				}
			}
		}
		Ok(())
	}

	/// Whether a domain provider (`".com"`) passes the extension filter
	pub fn allows_domain(&self, provider_id: &str) -> bool {
		let bare = provider_id.trim_start_matches('.');
		match &self.domains {
			None => true,
			Some(domains) => domains
				.iter()
				.any(|tld| tld.trim_start_matches('.').eq_ignore_ascii_case(bare)),
		}
	}
}

/// Request body for a single-name check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameCheckRequest {
	pub name: String,

	/// Provider group identifiers to check
	#[serde(default = "default_provider_groups")]
	pub providers: Vec<String>,

	#[serde(default)]
	pub options: NameCheckOptions,
}

impl NameCheckRequest {
	pub fn new(name: impl Into<String>, groups: &[ProviderGroup]) -> Self {
		Self {
			name: name.into(),
			providers: groups.iter().map(|g| g.as_str().to_string()).collect(),
			options: NameCheckOptions::default(),
		}
	}

	pub fn with_options(mut self, options: NameCheckOptions) -> Self {
		self.options = options;
		self
	}

	/// Validate the whole request before any provider is contacted
	pub fn validate(&self) -> CheckValidationResult<()> {
		validate_name(self.name.trim())?;
		self.provider_groups()?;
		self.options.validate()
	}

	pub fn normalized_name(&self) -> String {
		normalize_name(&self.name)
	}

	/// Parse requested groups, dropping duplicates while keeping request order
	pub fn provider_groups(&self) -> CheckValidationResult<Vec<ProviderGroup>> {
		parse_groups(&self.providers)
	}
}

/// Request body for checking several names at once
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkCheckRequest {
	pub names: Vec<String>,

	#[serde(default = "default_provider_groups")]
	pub providers: Vec<String>,

	#[serde(default)]
	pub options: NameCheckOptions,
}

impl BulkCheckRequest {
	/// Lowercased, de-duplicated names in request order
	pub fn normalized_names(&self) -> Vec<String> {
		let mut names: Vec<String> = Vec::with_capacity(self.names.len());
		for name in self.names.iter().map(|n| normalize_name(n)) {
			if !name.is_empty() && !names.contains(&name) {
				names.push(name);
			}
		}
		names
	}

	pub fn validate(&self) -> CheckValidationResult<()> {
		let names = self.normalized_names();
		if names.is_empty() {
			return Err(CheckValidationError::EmptyBatch);
		}
		if names.len() > MAX_BULK_NAMES {
			return Err(CheckValidationError::TooManyNames {
				count: names.len(),
				max: MAX_BULK_NAMES,
			});
		}
		for name in &names {
			validate_name(name)?;
		}
		self.provider_groups()?;
		self.options.validate()
	}

	pub fn provider_groups(&self) -> CheckValidationResult<Vec<ProviderGroup>> {
		parse_groups(&self.providers)
	}

	/// Single-name request for one entry of the batch
	pub fn request_for(&self, name: &str) -> NameCheckRequest {
		NameCheckRequest {
			name: name.to_string(),
			providers: self.providers.clone(),
			options: self.options.clone(),
		}
	}
}

fn parse_groups(raw: &[String]) -> CheckValidationResult<Vec<ProviderGroup>> {
	if raw.is_empty() {
		return Err(CheckValidationError::EmptyProviderGroups);
	}
	let mut groups = Vec::with_capacity(raw.len());
	for value in raw {
		let group: ProviderGroup = value.parse()?;
		if !groups.contains(&group) {
			groups.push(group);
		}
	}
	Ok(groups)
}
