//! Test server for integration tests

use std::net::SocketAddr;
use std::sync::Arc;

use brandmark_aggregator::mocks::{mock_settings, ScriptedConnector};
use brandmark_aggregator::{AggregatorBuilder, Settings};
use tokio::task::JoinHandle;

/// Aggregator served on an ephemeral local port
pub struct TestServer {
	pub addr: SocketAddr,
	pub base_url: String,
	pub handle: JoinHandle<()>,
}

impl TestServer {
	/// Spawn a server backed by the given connectors only
	#[allow(dead_code)]
	pub async fn spawn_with_connectors(
		connectors: Vec<ScriptedConnector>,
	) -> Result<Self, Box<dyn std::error::Error>> {
		Self::spawn_with_settings(mock_settings(), connectors).await
	}

	pub async fn spawn_with_settings(
		settings: Settings,
		connectors: Vec<ScriptedConnector>,
	) -> Result<Self, Box<dyn std::error::Error>> {
		let mut builder = AggregatorBuilder::new().with_settings(settings);
		for connector in connectors {
			builder = builder.with_connector(Arc::new(connector));
		}
		let (app, _state) = builder.start().await?;

		let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
		let addr = listener.local_addr()?;
		let handle = tokio::spawn(async move {
			let _ = axum::serve(listener, app).await;
		});

		Ok(Self {
			addr,
			base_url: format!("http://{}", addr),
			handle,
		})
	}

	#[allow(dead_code)]
	pub fn ws_url(&self) -> String {
		format!("ws://{}/api/v1/ws", self.addr)
	}

	#[allow(dead_code)]
	pub fn abort(self) {
		self.handle.abort();
	}
}
