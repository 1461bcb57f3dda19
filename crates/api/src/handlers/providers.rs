use axum::{extract::State, response::Json};
use brandmark_types::ProvidersResponse;

use crate::state::AppState;

/// GET /api/v1/providers - Registered providers with their limits
pub async fn get_providers(State(state): State<AppState>) -> Json<ProvidersResponse> {
	Json(state.check_service.list_providers())
}
