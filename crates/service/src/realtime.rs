//! Streaming checks for connected clients

use brandmark_types::{NameCheck, NameCheckRequest, ProgressEvent};
use std::sync::Arc;
use tracing::{error, warn};

use crate::check::{CheckServiceError, CheckServiceTrait};
use crate::coordinator::ProgressSink;
use crate::sessions::{SessionManager, SessionProgressSink};

/// Runs a check while streaming its progress to one client
#[derive(Clone)]
pub struct RealtimeChecker {
	service: Arc<dyn CheckServiceTrait>,
	sessions: Arc<SessionManager>,
}

impl RealtimeChecker {
	pub fn new(service: Arc<dyn CheckServiceTrait>, sessions: Arc<SessionManager>) -> Self {
		Self { service, sessions }
	}

	pub fn sessions(&self) -> &Arc<SessionManager> {
		&self.sessions
	}

	/// Check a name for `client_id`, emitting session events as results settle
	///
	/// Rejections (invalid request, session already running) are reported to
	/// the client as an `error` event without a session id.
	pub async fn check_with_updates(
		&self,
		client_id: &str,
		request: &NameCheckRequest,
	) -> Result<NameCheck, CheckServiceError> {
		let tasks = match self.service.plan_checks(request) {
			Ok(tasks) => tasks,
			Err(e) => return Err(self.reject(client_id, e)),
		};

		let name = request.normalized_name();
		let groups = request.provider_groups().unwrap_or_default();
		if let Err(e) = self
			.sessions
			.start_session(client_id, &name, groups, tasks.len())
		{
			return Err(self.reject(client_id, e.into()));
		}

		let sink: Arc<dyn ProgressSink> =
			Arc::new(SessionProgressSink::new(Arc::clone(&self.sessions), client_id));

		match self.service.run_checks(&name, tasks, Some(sink)).await {
			Ok(check) => {
				self.sessions.complete_session(client_id, &check);
				Ok(check)
			},
			Err(e) => {
				error!("Live check of '{}' failed for client {}: {}", name, client_id, e);
				self.sessions.fail_session(client_id, &e.to_string());
				Err(e)
			},
		}
	}

	fn reject(&self, client_id: &str, error: CheckServiceError) -> CheckServiceError {
		warn!("Rejected live check for client {}: {}", client_id, error);
		self.sessions.send(
			client_id,
			ProgressEvent::Error {
				session_id: None,
				error: error.to_string(),
			},
		);
		error
	}
}
