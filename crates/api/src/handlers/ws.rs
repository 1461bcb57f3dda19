//! Live check websocket
//!
//! Each connection is one client: events from its [`SessionManager`] channel
//! are forwarded as JSON text frames, and incoming `check` messages start a
//! streaming check in the background so the socket keeps being read. Checks
//! still running when the client goes away are aborted.
//!
//! [`SessionManager`]: brandmark_service::SessionManager

use axum::{
	extract::{
		ws::{Message, WebSocket, WebSocketUpgrade},
		State,
	},
	response::Response,
};
use brandmark_types::{ClientMessage, ProgressEvent, SessionError};
use futures::{SinkExt, StreamExt};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::state::AppState;

/// GET /api/v1/ws - Upgrade to the live check protocol
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
	ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
	let (client_id, mut events) = state.sessions.connect();
	let (mut sender, mut receiver) = socket.split();

	let writer = tokio::spawn(async move {
		while let Some(event) = events.recv().await {
			let text = match serde_json::to_string(&event) {
				Ok(text) => text,
				Err(e) => {
					warn!("Failed to encode {} event: {}", event.kind(), e);
					continue;
				},
			};
			if sender.send(Message::Text(text.into())).await.is_err() {
				break;
			}
		}
	});

	let mut checks = JoinSet::new();
	while let Some(message) = receiver.next().await {
		while checks.try_join_next().is_some() {}
		match message {
			Ok(Message::Text(text)) => {
				handle_client_message(&state, &client_id, text.as_str(), &mut checks)
			},
			Ok(Message::Close(_)) => break,
			Ok(_) => {},
			Err(e) => {
				debug!("Websocket error for client {}: {}", client_id, e);
				break;
			},
		}
	}

	if !checks.is_empty() {
		debug!("Aborting {} running check(s) of client {}", checks.len(), client_id);
		checks.abort_all();
	}
	state.sessions.disconnect(&client_id);
	writer.abort();
}

fn handle_client_message(
	state: &AppState,
	client_id: &str,
	text: &str,
	checks: &mut JoinSet<()>,
) {
	match serde_json::from_str::<ClientMessage>(text) {
		Ok(ClientMessage::Ping) => {
			state.sessions.send(client_id, ProgressEvent::Pong);
		},
		Ok(ClientMessage::Check(request)) => {
			let realtime = state.realtime.clone();
			let client_id = client_id.to_string();
			checks.spawn(async move {
				// Failures are already reported to the client as events
				let _ = realtime.check_with_updates(&client_id, &request).await;
			});
		},
		Err(e) => {
			let error = SessionError::InvalidMessage {
				reason: e.to_string(),
			};
			state.sessions.send(
				client_id,
				ProgressEvent::Error {
					session_id: None,
					error: error.to_string(),
				},
			);
		},
	}
}
