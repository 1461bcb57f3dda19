//! HTTP probe connector
//!
//! Checks a name by requesting a profile/package/domain URL built from a
//! template. A missing resource means the name is free, an existing one
//! means it is taken.

use async_trait::async_trait;
use brandmark_types::{
	ConnectorError, ConnectorResponse, ConnectorResult, NameCheckOptions, ProviderConnector,
	ProviderGroup,
};
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use tracing::debug;

use crate::client_cache::{ClientCache, ClientConfig};

/// Placeholder substituted with the candidate name
pub const NAME_PLACEHOLDER: &str = "{name}";

const AVAILABLE_CONFIDENCE: f64 = 0.9;
const TAKEN_CONFIDENCE: f64 = 0.95;

/// Map an upstream status code to an availability answer
pub fn classify_status(provider_id: &str, status: StatusCode) -> ConnectorResult<ConnectorResponse> {
	match status {
		StatusCode::NOT_FOUND | StatusCode::GONE => {
			Ok(ConnectorResponse::available(AVAILABLE_CONFIDENCE))
		},
		StatusCode::TOO_MANY_REQUESTS => Err(ConnectorError::RateLimited {
			provider: provider_id.to_string(),
		}),
		status if status.is_success() => Ok(ConnectorResponse::unavailable(TAKEN_CONFIDENCE)),
		status => Err(ConnectorError::HttpStatus {
			status_code: status.as_u16(),
			reason: status
				.canonical_reason()
				.unwrap_or("Unexpected status")
				.to_string(),
		}),
	}
}

/// Connector answering from the HTTP status of a templated URL
#[derive(Debug)]
pub struct HttpProbeConnector {
	provider_id: String,
	group: ProviderGroup,
	display_name: String,
	url_template: String,
	client: Arc<Client>,
}

impl HttpProbeConnector {
	/// Create a probe using a pooled client from the cache
	pub fn new(
		provider_id: &str,
		group: ProviderGroup,
		url_template: &str,
		client_config: ClientConfig,
		cache: &ClientCache,
	) -> ConnectorResult<Self> {
		if !url_template.contains(NAME_PLACEHOLDER) {
			return Err(ConnectorError::Config {
				reason: format!(
					"endpoint for {} must contain {}",
					provider_id, NAME_PLACEHOLDER
				),
			});
		}

		Ok(Self {
			provider_id: provider_id.to_string(),
			group,
			display_name: provider_id.to_string(),
			url_template: url_template.to_string(),
			client: cache.get_client(&client_config)?,
		})
	}

	pub fn with_display_name(mut self, display_name: &str) -> Self {
		self.display_name = display_name.to_string();
		self
	}

	/// URL probed for a candidate name
	pub fn url_for(&self, name: &str) -> String {
		self.url_template.replace(NAME_PLACEHOLDER, name)
	}
}

#[async_trait]
impl ProviderConnector for HttpProbeConnector {
	fn provider_id(&self) -> &str {
		&self.provider_id
	}

	fn group(&self) -> ProviderGroup {
		self.group
	}

	fn display_name(&self) -> &str {
		&self.display_name
	}

	async fn check(
		&self,
		name: &str,
		options: &NameCheckOptions,
	) -> ConnectorResult<ConnectorResponse> {
		let url = self.url_for(name);
		debug!("Probing {} for '{}' via {}", self.provider_id, name, url);

		let response = self.client.get(&url).send().await?;
		let status = response.status();
		let answer = classify_status(&self.provider_id, status)?;

		if options.deep_check {
			return Ok(answer.with_metadata(serde_json::json!({
				"url": url,
				"status_code": status.as_u16(),
			})));
		}
		Ok(answer)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use brandmark_types::Availability;
	use tokio::io::{AsyncReadExt, AsyncWriteExt};
	use tokio::net::TcpListener;

	/// Serve a single canned status line on an ephemeral port
	async fn serve_status(status_line: &'static str) -> String {
		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();

		tokio::spawn(async move {
			while let Ok((mut socket, _)) = listener.accept().await {
				let mut buf = [0u8; 1024];
				let _ = socket.read(&mut buf).await;
				let response = format!(
					"HTTP/1.1 {}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
					status_line
				);
				let _ = socket.write_all(response.as_bytes()).await;
			}
		});

		format!("http://{}/users/{{name}}", addr)
	}

	fn probe(template: &str) -> HttpProbeConnector {
		HttpProbeConnector::new(
			"github",
			ProviderGroup::DevPlatforms,
			template,
			ClientConfig::for_provider("github"),
			&ClientCache::new(),
		)
		.unwrap()
	}

	#[test]
	fn test_status_classification() {
		let free = classify_status("npm", StatusCode::NOT_FOUND).unwrap();
		assert_eq!(free.availability, Availability::Available);

		let taken = classify_status("npm", StatusCode::OK).unwrap();
		assert_eq!(taken.availability, Availability::Unavailable);

		assert!(matches!(
			classify_status("npm", StatusCode::TOO_MANY_REQUESTS),
			Err(ConnectorError::RateLimited { .. })
		));
		assert!(matches!(
			classify_status("npm", StatusCode::INTERNAL_SERVER_ERROR),
			Err(ConnectorError::HttpStatus {
				status_code: 500,
				..
			})
		));
	}

	#[test]
	fn test_template_requires_placeholder() {
		let result = HttpProbeConnector::new(
			"npm",
			ProviderGroup::PackageRegistries,
			"https://registry.npmjs.org/",
			ClientConfig::for_provider("npm"),
			&ClientCache::new(),
		);
		assert!(matches!(result, Err(ConnectorError::Config { .. })));
	}

	#[test]
	fn test_url_substitution() {
		let connector = probe("https://api.github.com/users/{name}");
		assert_eq!(connector.url_for("acme"), "https://api.github.com/users/acme");
		assert_eq!(connector.display_name(), "github");
	}

	#[tokio::test]
	async fn test_missing_resource_is_available() {
		let template = serve_status("404 Not Found").await;
		let connector = probe(&template);

		let response = connector
			.check("acme", &NameCheckOptions::default())
			.await
			.unwrap();
		assert_eq!(response.availability, Availability::Available);
		assert!(response.metadata.is_none());
	}

	#[tokio::test]
	async fn test_existing_resource_is_taken_with_metadata() {
		let template = serve_status("200 OK").await;
		let connector = probe(&template);
		let options = NameCheckOptions {
			deep_check: true,
			..NameCheckOptions::default()
		};

		let response = connector.check("acme", &options).await.unwrap();
		assert_eq!(response.availability, Availability::Unavailable);
		let metadata = response.metadata.unwrap();
		assert_eq!(metadata["status_code"], 200);
		assert!(metadata["url"].as_str().unwrap().ends_with("/users/acme"));
	}
}
