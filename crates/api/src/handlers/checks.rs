//! Name check handlers

use axum::{
	extract::{Path, State},
	response::Json,
};
use brandmark_types::{BulkCheckRequest, BulkCheckResponse, NameCheck, NameCheckRequest, ProviderResult};
use tracing::debug;

use crate::handlers::common::{check_error, ApiError};
use crate::state::AppState;

/// POST /api/v1/check - Check one name across the requested groups
pub async fn post_check(
	State(state): State<AppState>,
	Json(request): Json<NameCheckRequest>,
) -> Result<Json<NameCheck>, ApiError> {
	debug!("Check requested for '{}' ({:?})", request.name, request.providers);
	state
		.check_service
		.check_name(&request)
		.await
		.map(Json)
		.map_err(check_error)
}

/// GET /api/v1/check/{provider}/{name} - Check one name against one provider
pub async fn get_provider_check(
	State(state): State<AppState>,
	Path((provider, name)): Path<(String, String)>,
) -> Result<Json<ProviderResult>, ApiError> {
	state
		.check_service
		.check_single_provider(&provider, &name)
		.await
		.map(Json)
		.map_err(check_error)
}

/// POST /api/v1/bulk/check - Check several names
pub async fn post_bulk_check(
	State(state): State<AppState>,
	Json(request): Json<BulkCheckRequest>,
) -> Result<Json<BulkCheckResponse>, ApiError> {
	state
		.check_service
		.bulk_check(&request)
		.await
		.map(Json)
		.map_err(check_error)
}
