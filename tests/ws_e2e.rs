//! Live check protocol over the websocket endpoint

mod mocks;

use std::time::Duration;

use brandmark_aggregator::mocks::ScriptedConnector;
use brandmark_aggregator::ProviderGroup;
use futures::{SinkExt, StreamExt};
use mocks::TestServer;
use serde_json::{json, Value};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

type Socket = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

async fn next_event(socket: &mut Socket) -> Value {
	loop {
		let message = tokio::time::timeout(Duration::from_secs(5), socket.next())
			.await
			.expect("event within 5s")
			.expect("socket open")
			.expect("valid frame");
		if let Message::Text(text) = message {
			return serde_json::from_str(text.as_str()).expect("json event");
		}
	}
}

async fn send(socket: &mut Socket, message: Value) {
	socket
		.send(Message::Text(message.to_string().into()))
		.await
		.expect("send message");
}

async fn server() -> TestServer {
	TestServer::spawn_with_connectors(vec![
		// The slower registry is registered first so completion order differs from plan order
		ScriptedConnector::available(".com", ProviderGroup::Domains, 200),
		ScriptedConnector::unavailable(".io", ProviderGroup::Domains, 20),
	])
	.await
	.unwrap()
}

#[tokio::test]
async fn streaming_check_event_sequence() {
	let server = server().await;
	let (mut socket, _) = connect_async(server.ws_url()).await.unwrap();

	let connected = next_event(&mut socket).await;
	assert_eq!(connected["type"], "connected");
	assert!(connected["client_id"].is_string());

	send(
		&mut socket,
		json!({"type": "check", "name": "acme", "providers": ["domains"]}),
	)
	.await;

	let started = next_event(&mut socket).await;
	assert_eq!(started["type"], "session_started");
	assert_eq!(started["total_checks"], 2);
	let session_id = started["session_id"].clone();

	let first = next_event(&mut socket).await;
	let second = next_event(&mut socket).await;
	for update in [&first, &second] {
		assert_eq!(update["type"], "progress_update");
		assert_eq!(update["session_id"], session_id);
	}
	assert_eq!(first["provider"], "domains..io");
	assert_eq!(first["result"]["available"], false);
	assert_eq!(first["result"]["status"], "success");
	assert_eq!(first["progress"]["percentage"], 50.0);
	assert_eq!(second["provider"], "domains..com");
	assert_eq!(second["progress"]["percentage"], 100.0);

	let complete = next_event(&mut socket).await;
	assert_eq!(complete["type"], "session_complete");
	assert_eq!(complete["session_id"], session_id);
	assert_eq!(complete["summary"]["total_checked"], 2);
	assert_eq!(complete["results"]["domains"][".com"]["available"], true);

	server.abort();
}

#[tokio::test]
async fn ping_and_invalid_messages() {
	let server = server().await;
	let (mut socket, _) = connect_async(server.ws_url()).await.unwrap();
	next_event(&mut socket).await;

	send(&mut socket, json!({"type": "ping"})).await;
	assert_eq!(next_event(&mut socket).await["type"], "pong");

	send(&mut socket, json!({"type": "subscribe"})).await;
	let error = next_event(&mut socket).await;
	assert_eq!(error["type"], "error");
	assert!(error.as_object().unwrap().contains_key("session_id"));
	assert!(error["session_id"].is_null());

	send(
		&mut socket,
		json!({"type": "check", "name": "!", "providers": ["domains"]}),
	)
	.await;
	let rejected = next_event(&mut socket).await;
	assert_eq!(rejected["type"], "error");
	assert!(rejected["error"]
		.as_str()
		.unwrap()
		.starts_with("Validation error"));

	server.abort();
}

#[tokio::test]
async fn disconnect_aborts_running_check() {
	let slow = ScriptedConnector::available("npm", ProviderGroup::PackageRegistries, 400);
	let tracker = slow.tracker();
	let server = TestServer::spawn_with_connectors(vec![slow]).await.unwrap();
	let (mut socket, _) = connect_async(server.ws_url()).await.unwrap();
	next_event(&mut socket).await;

	send(
		&mut socket,
		json!({"type": "check", "name": "acme", "providers": ["package_registries"]}),
	)
	.await;
	assert_eq!(next_event(&mut socket).await["type"], "session_started");

	// Wait until the provider call is in flight, then leave
	tokio::time::timeout(Duration::from_secs(2), async {
		while tracker.call_count() == 0 {
			tokio::time::sleep(Duration::from_millis(5)).await;
		}
	})
	.await
	.expect("provider called");
	socket.close(None).await.unwrap();

	tokio::time::sleep(Duration::from_millis(800)).await;
	assert_eq!(tracker.call_count(), 1);
	assert_eq!(tracker.completion_count(), 0);

	server.abort();
}
