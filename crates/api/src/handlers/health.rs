use axum::{extract::State, http::StatusCode, response::Json};
use brandmark_types::StorageStats;
use serde::Serialize;

use crate::state::AppState;

/// Health check endpoint
pub async fn health() -> &'static str {
	"OK"
}

/// Readiness response
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
	pub status: String,
	pub storage_healthy: bool,
	pub storage: Option<StorageStats>,
	pub providers: usize,
	pub active_sessions: usize,
}

/// GET /ready - Readiness probe with storage checks
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
	let storage_healthy = state.storage.health_check().await.unwrap_or(false);
	let storage = state.storage.stats().await.ok();
	let providers = state.check_service.list_providers().total_providers;

	let overall = storage_healthy && providers > 0;
	let status = if overall { "ready" } else { "degraded" };

	let body = ReadinessResponse {
		status: status.to_string(),
		storage_healthy,
		storage,
		providers,
		active_sessions: state.sessions.active_sessions(),
	};
	let code = if overall {
		StatusCode::OK
	} else {
		StatusCode::SERVICE_UNAVAILABLE
	};
	(code, Json(body))
}
