use axum::{
	routing::{get, post},
	Router,
};
use tower::ServiceBuilder;
use tower_http::{
	compression::CompressionLayer,
	cors::CorsLayer,
	limit::RequestBodyLimitLayer,
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	trace::TraceLayer,
};
use tracing::Level;

use crate::handlers::{
	get_provider_check, get_providers, health, post_bulk_check, post_check, ready, ws_handler,
};
use crate::security::add_security_headers;
use crate::state::AppState;

pub fn create_router() -> Router<AppState> {
	let cors = CorsLayer::permissive();
	let body_limit = RequestBodyLimitLayer::new(256 * 1024);
	let trace = TraceLayer::new_for_http()
		.make_span_with(|req: &axum::http::Request<_>| {
			let req_id = req
				.headers()
				.get("x-request-id")
				.and_then(|v| v.to_str().ok())
				.unwrap_or("-");
			tracing::info_span!(
				"http_request",
				method = %req.method(),
				uri = %req.uri(),
				req_id
			)
		})
		.on_request(tower_http::trace::DefaultOnRequest::new().level(Level::INFO))
		.on_response(
			tower_http::trace::DefaultOnResponse::new()
				.level(Level::INFO)
				.latency_unit(tower_http::LatencyUnit::Millis),
		);
	let req_id = ServiceBuilder::new()
		.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
		.layer(PropagateRequestIdLayer::x_request_id());

	let router = Router::new()
		.route("/health", get(health))
		.route("/ready", get(ready))
		.route("/api/v1/check", post(post_check))
		.route("/api/v1/check/{provider}/{name}", get(get_provider_check))
		.route("/api/v1/bulk/check", post(post_bulk_check))
		.route("/api/v1/providers", get(get_providers))
		.route("/api/v1/ws", get(ws_handler))
		.layer(cors)
		.layer(CompressionLayer::new())
		.layer(trace)
		.layer(req_id)
		.layer(body_limit);

	add_security_headers(router)
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::{
		body::Body,
		http::{Request, StatusCode},
	};
	use brandmark_config::Settings;
	use brandmark_providers::{ProviderRegistry, StaticConnector};
	use brandmark_service::CheckService;
	use brandmark_storage::MemoryStore;
	use brandmark_types::ProviderGroup;
	use serde_json::{json, Value};
	use std::sync::Arc;
	use tower::ServiceExt;

	fn app() -> Router {
		let mut registry = ProviderRegistry::new();
		for (id, group) in [
			(".com", ProviderGroup::Domains),
			(".io", ProviderGroup::Domains),
			("github", ProviderGroup::DevPlatforms),
		] {
			registry
				.register(Arc::new(StaticConnector::new(id, group)))
				.unwrap();
		}
		let storage = Arc::new(MemoryStore::new());
		let service = CheckService::from_settings(
			&Settings::default(),
			Arc::new(registry),
			storage.clone(),
		);
		create_router().with_state(AppState::new(Arc::new(service), storage))
	}

	async fn body_json(response: axum::response::Response) -> Value {
		let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
			.await
			.unwrap();
		serde_json::from_slice(&bytes).unwrap()
	}

	fn post(uri: &str, body: Value) -> Request<Body> {
		Request::builder()
			.method("POST")
			.uri(uri)
			.header("content-type", "application/json")
			.body(Body::from(body.to_string()))
			.unwrap()
	}

	fn get(uri: &str) -> Request<Body> {
		Request::builder().uri(uri).body(Body::empty()).unwrap()
	}

	#[tokio::test]
	async fn test_health() {
		let response = app().oneshot(get("/health")).await.unwrap();
		assert_eq!(response.status(), StatusCode::OK);
		assert_eq!(
			response.headers().get("x-content-type-options").unwrap(),
			"nosniff"
		);
	}

	#[tokio::test]
	async fn test_ready_reports_storage() {
		let response = app().oneshot(get("/ready")).await.unwrap();
		assert_eq!(response.status(), StatusCode::OK);

		let body = body_json(response).await;
		assert_eq!(body["status"], "ready");
		assert_eq!(body["storage"]["backend"], "memory");
		assert_eq!(body["providers"], 3);
	}

	#[tokio::test]
	async fn test_post_check() {
		let response = app()
			.oneshot(post(
				"/api/v1/check",
				json!({"name": "Acme", "providers": ["domains"]}),
			))
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::OK);

		let body = body_json(response).await;
		assert_eq!(body["name"], "acme");
		assert_eq!(body["status"], "complete");
		assert_eq!(body["results"]["domains"][".com"]["available"], true);
		assert_eq!(body["summary"]["total_checked"], 2);
	}

	#[tokio::test]
	async fn test_post_check_validation_error() {
		let response = app()
			.oneshot(post(
				"/api/v1/check",
				json!({"name": "bad name!", "providers": ["domains"]}),
			))
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::BAD_REQUEST);
		assert_eq!(body_json(response).await["error"], "VALIDATION_ERROR");
	}

	#[tokio::test]
	async fn test_unknown_group_rejected() {
		let response = app()
			.oneshot(post(
				"/api/v1/check",
				json!({"name": "acme", "providers": ["trademarks"]}),
			))
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	}

	#[tokio::test]
	async fn test_single_provider_check() {
		let response = app()
			.oneshot(get("/api/v1/check/github/github"))
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::OK);
		assert_eq!(body_json(response).await["available"], false);

		let response = app()
			.oneshot(get("/api/v1/check/myspace/acme"))
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::BAD_REQUEST);
		assert_eq!(body_json(response).await["error"], "INVALID_PROVIDER");
	}

	#[tokio::test]
	async fn test_bulk_check() {
		let response = app()
			.oneshot(post(
				"/api/v1/bulk/check",
				json!({"names": ["acme", "ACME", "github"], "providers": ["dev_platforms"]}),
			))
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::OK);

		let body = body_json(response).await;
		assert_eq!(body["total_names"], 2);
		assert_eq!(body["status"], "completed");
	}

	#[tokio::test]
	async fn test_providers_listing() {
		let response = app().oneshot(get("/api/v1/providers")).await.unwrap();
		let body = body_json(response).await;

		assert_eq!(body["total_providers"], 3);
		assert_eq!(body["groups"], json!(["domains", "dev_platforms"]));
		assert_eq!(body["global_timeout_ms"], 10_000);
	}
}
