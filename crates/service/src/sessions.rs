//! Connected clients and their live check sessions
//!
//! Each client owns an unbounded event channel and at most one in-flight
//! session. Disconnecting drops the session; results that settle later are
//! discarded without error.

use brandmark_types::{
	CheckSession, NameCheck, ProgressEvent, ProgressResult, ProviderGroup, ProviderResult,
	SessionError,
};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::coordinator::ProgressSink;

/// Event stream handed to the transport of one client
pub type EventReceiver = mpsc::UnboundedReceiver<ProgressEvent>;

#[derive(Debug)]
struct ClientConnection {
	sender: mpsc::UnboundedSender<ProgressEvent>,
	session: Option<CheckSession>,
}

/// Registry of connected clients
#[derive(Debug, Default)]
pub struct SessionManager {
	clients: DashMap<String, ClientConnection>,
}

impl SessionManager {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a new client and greet it with a `connected` event
	pub fn connect(&self) -> (String, EventReceiver) {
		let client_id = Uuid::new_v4().to_string();
		let (sender, receiver) = mpsc::unbounded_channel();

		let _ = sender.send(ProgressEvent::Connected {
			client_id: client_id.clone(),
		});
		self.clients.insert(
			client_id.clone(),
			ClientConnection {
				sender,
				session: None,
			},
		);

		info!("🔌 Client connected: {}", client_id);
		(client_id, receiver)
	}

	/// Forget a client and any session it had running
	pub fn disconnect(&self, client_id: &str) {
		if let Some((_, connection)) = self.clients.remove(client_id) {
			match connection.session {
				Some(session) => info!(
					"🔌 Client disconnected: {} (dropped session {} at {}/{})",
					client_id, session.session_id, session.completed_checks, session.total_checks
				),
				None => info!("🔌 Client disconnected: {}", client_id),
			}
		}
	}

	pub fn is_connected(&self, client_id: &str) -> bool {
		self.clients.contains_key(client_id)
	}

	/// Deliver one event; `false` if the client is gone
	pub fn send(&self, client_id: &str, event: ProgressEvent) -> bool {
		let Some(connection) = self.clients.get(client_id) else {
			debug!("Dropping {} event for unknown client {}", event.kind(), client_id);
			return false;
		};
		connection.sender.send(event).is_ok()
	}

	/// Open a session for a client and announce it
	pub fn start_session(
		&self,
		client_id: &str,
		name: &str,
		groups: Vec<ProviderGroup>,
		total_checks: usize,
	) -> Result<String, SessionError> {
		let mut connection =
			self.clients
				.get_mut(client_id)
				.ok_or_else(|| SessionError::ClientNotConnected {
					client_id: client_id.to_string(),
				})?;

		if connection.session.is_some() {
			return Err(SessionError::SessionInProgress {
				client_id: client_id.to_string(),
			});
		}

		let session = CheckSession::new(client_id, name, groups, total_checks);
		let session_id = session.session_id.clone();
		let _ = connection.sender.send(session.started_event());
		connection.session = Some(session);

		debug!(
			"Session {} started for client {}: '{}' over {} providers",
			session_id, client_id, name, total_checks
		);
		Ok(session_id)
	}

	/// Record a settled provider and push a `progress_update`
	pub fn update_progress(&self, client_id: &str, group: ProviderGroup, result: &ProviderResult) {
		let Some(mut connection) = self.clients.get_mut(client_id) else {
			return;
		};
		let connection = &mut *connection;
		let Some(session) = connection.session.as_mut() else {
			return;
		};

		let progress = session.record(group, result);
		let event = ProgressEvent::ProgressUpdate {
			session_id: session.session_id.clone(),
			provider: format!("{}.{}", group, result.provider),
			result: ProgressResult::from(result),
			progress,
		};
		let _ = connection.sender.send(event);
	}

	/// Close the session with the final aggregate
	pub fn complete_session(&self, client_id: &str, check: &NameCheck) {
		let Some(mut connection) = self.clients.get_mut(client_id) else {
			return;
		};
		let Some(session) = connection.session.take() else {
			warn!("No active session to complete for client {}", client_id);
			return;
		};

		let event = ProgressEvent::SessionComplete {
			session_id: session.session_id.clone(),
			name: session.name.clone(),
			summary: check.summary.clone(),
			results: check.results.clone(),
			duration_ms: session.elapsed_ms(),
		};
		let _ = connection.sender.send(event);
	}

	/// Close the session with an error event
	pub fn fail_session(&self, client_id: &str, error: &str) {
		let Some(mut connection) = self.clients.get_mut(client_id) else {
			return;
		};
		let session_id = connection
			.session
			.take()
			.map(|session| session.session_id);
		let _ = connection.sender.send(ProgressEvent::Error {
			session_id,
			error: error.to_string(),
		});
	}

	pub fn has_active_session(&self, client_id: &str) -> bool {
		self.clients
			.get(client_id)
			.map(|connection| connection.session.is_some())
			.unwrap_or(false)
	}

	pub fn active_sessions(&self) -> usize {
		self.clients
			.iter()
			.filter(|connection| connection.session.is_some())
			.count()
	}

	pub fn connected_clients(&self) -> usize {
		self.clients.len()
	}
}

/// Forwards coordinator results to one client's session
pub struct SessionProgressSink {
	sessions: Arc<SessionManager>,
	client_id: String,
}

impl SessionProgressSink {
	pub fn new(sessions: Arc<SessionManager>, client_id: impl Into<String>) -> Self {
		Self {
			sessions,
			client_id: client_id.into(),
		}
	}
}

impl ProgressSink for SessionProgressSink {
	fn on_result(&self, group: ProviderGroup, result: &ProviderResult) {
		self.sessions.update_progress(&self.client_id, group, result);
	}
}
