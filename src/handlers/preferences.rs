use axum::extract::State;
use axum::Extension;
use serde::Deserialize;

use crate::app::AppState;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::types::Caller;

#[derive(Debug, Deserialize)]
pub struct OrganisationRequest {
    #[serde(default)]
    pub name: String,
}

/// GET /preferences/organisations (public)
pub async fn get_organisations(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    Ok(ApiResponse::success(state.preferences.get_organisations().await?))
}

/// POST /preferences/organisations (admin)
pub async fn add_organisation(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiJson(body): ApiJson<OrganisationRequest>,
) -> ApiResult<Vec<String>> {
    let organisations = state.preferences.add_organisation(&caller, &body.name).await?;
    Ok(ApiResponse::created(organisations))
}
