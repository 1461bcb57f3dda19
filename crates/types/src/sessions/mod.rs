//! Live check sessions and the events streamed to connected clients

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::checks::{CheckResults, NameCheckRequest, NameCheckSummary};
use crate::providers::{Availability, ProviderGroup, ProviderResult};

/// Errors raised while driving a live session
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
	#[error("Client not connected: {client_id}")]
	ClientNotConnected { client_id: String },

	#[error("Client {client_id} already has a check in progress")]
	SessionInProgress { client_id: String },

	#[error("Invalid client message: {reason}")]
	InvalidMessage { reason: String },
}

/// Whether a settled provider task produced a definite answer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
	Success,
	Error,
}

/// Compact per-provider outcome carried by a progress update
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgressResult {
	pub available: Availability,
	pub status: ResultStatus,
}

impl From<&ProviderResult> for ProgressResult {
	fn from(result: &ProviderResult) -> Self {
		let status = if result.available.is_known() {
			ResultStatus::Success
		} else {
			ResultStatus::Error
		};
		Self {
			available: result.available,
			status,
		}
	}
}

/// Running progress of a session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Progress {
	pub completed: usize,
	pub total: usize,
	/// Completion percentage rounded to one decimal
	pub percentage: f64,
}

impl Progress {
	pub fn new(completed: usize, total: usize) -> Self {
		let percentage = if total == 0 {
			0.0
		} else {
			(completed as f64 / total as f64 * 1000.0).round() / 10.0
		};
		Self {
			completed,
			total,
			percentage,
		}
	}
}

/// Event sent to exactly one connected client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
	Connected {
		client_id: String,
	},
	SessionStarted {
		session_id: String,
		name: String,
		total_checks: usize,
	},
	ProgressUpdate {
		session_id: String,
		/// `<group>.<provider>`
		provider: String,
		result: ProgressResult,
		progress: Progress,
	},
	SessionComplete {
		session_id: String,
		name: String,
		summary: NameCheckSummary,
		results: CheckResults,
		duration_ms: u64,
	},
	Error {
		/// `null` when the error is not tied to a session
		#[serde(default)]
		session_id: Option<String>,
		error: String,
	},
	Pong,
}

impl ProgressEvent {
	/// Wire name of the event
	pub fn kind(&self) -> &'static str {
		match self {
			ProgressEvent::Connected { .. } => "connected",
			ProgressEvent::SessionStarted { .. } => "session_started",
			ProgressEvent::ProgressUpdate { .. } => "progress_update",
			ProgressEvent::SessionComplete { .. } => "session_complete",
			ProgressEvent::Error { .. } => "error",
			ProgressEvent::Pong => "pong",
		}
	}
}

/// Message sent by a client over the live connection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
	Check(NameCheckRequest),
	Ping,
}

/// Server-side state of one in-flight streaming check
#[derive(Debug, Clone)]
pub struct CheckSession {
	pub session_id: String,
	pub client_id: String,
	pub name: String,
	pub groups: Vec<ProviderGroup>,
	pub started_at: DateTime<Utc>,
	/// Number of provider tasks dispatched for this check
	pub total_checks: usize,
	/// Settled tasks so far, never decreases
	pub completed_checks: usize,
	pub results: CheckResults,
}

impl CheckSession {
	pub fn new(
		client_id: impl Into<String>,
		name: impl Into<String>,
		groups: Vec<ProviderGroup>,
		total_checks: usize,
	) -> Self {
		Self {
			session_id: Uuid::new_v4().to_string(),
			client_id: client_id.into(),
			name: name.into(),
			groups,
			started_at: Utc::now(),
			total_checks,
			completed_checks: 0,
			results: CheckResults::new(),
		}
	}

	/// Record one settled provider and return the updated progress
	pub fn record(&mut self, group: ProviderGroup, result: &ProviderResult) -> Progress {
		self.results
			.entry(group)
			.or_default()
			.insert(result.provider.clone(), result.clone());
		self.completed_checks += 1;
		Progress::new(self.completed_checks, self.total_checks)
	}

	pub fn elapsed_ms(&self) -> u64 {
		(Utc::now() - self.started_at).num_milliseconds().max(0) as u64
	}

	pub fn started_event(&self) -> ProgressEvent {
		ProgressEvent::SessionStarted {
			session_id: self.session_id.clone(),
			name: self.name.clone(),
			total_checks: self.total_checks,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_progress_rounding() {
		assert_eq!(Progress::new(1, 2).percentage, 50.0);
		assert_eq!(Progress::new(1, 3).percentage, 33.3);
		assert_eq!(Progress::new(2, 3).percentage, 66.7);
		assert_eq!(Progress::new(0, 0).percentage, 0.0);
	}

	#[test]
	fn test_session_progress_is_monotonic() {
		let mut session = CheckSession::new("client-1", "acme", vec![ProviderGroup::Domains], 2);

		let first = session.record(
			ProviderGroup::Domains,
			&ProviderResult::new(".com", "acme", Availability::Unavailable, 0.95),
		);
		let second = session.record(
			ProviderGroup::Domains,
			&ProviderResult::failed(".io", "acme", "Request timeout"),
		);

		assert_eq!(first.completed, 1);
		assert_eq!(second.completed, 2);
		assert!(second.percentage > first.percentage);
		assert_eq!(second.percentage, 100.0);
		assert_eq!(session.results[&ProviderGroup::Domains].len(), 2);
	}

	#[test]
	fn test_event_wire_format() {
		let event = ProgressEvent::ProgressUpdate {
			session_id: "s-1".to_string(),
			provider: "domains..com".to_string(),
			result: ProgressResult::from(&ProviderResult::failed(".com", "acme", "boom")),
			progress: Progress::new(1, 4),
		};
		let json = serde_json::to_value(&event).unwrap();

		assert_eq!(json["type"], "progress_update");
		assert!(json["result"]["available"].is_null());
		assert_eq!(json["result"]["status"], "error");
		assert_eq!(json["progress"]["percentage"], 25.0);
		assert_eq!(event.kind(), "progress_update");

		let json = serde_json::to_value(ProgressEvent::Error {
			session_id: None,
			error: "bad".to_string(),
		})
		.unwrap();
		assert!(json["session_id"].is_null());
		assert!(json.as_object().unwrap().contains_key("session_id"));
	}

	#[test]
	fn test_client_message_parsing() {
		let message: ClientMessage =
			serde_json::from_str(r#"{"type":"check","name":"acme","providers":["domains"]}"#)
				.unwrap();
		match message {
			ClientMessage::Check(request) => {
				assert_eq!(request.name, "acme");
				assert_eq!(request.providers, vec!["domains"]);
			},
			other => panic!("unexpected message: {other:?}"),
		}

		let message: ClientMessage = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
		assert_eq!(message, ClientMessage::Ping);
	}
}
