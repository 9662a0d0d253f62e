use axum::extract::{Path, State};
use axum::Extension;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::app::AppState;
use crate::database::models::{Metrics, Project};
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::types::Caller;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedRequest {
    pub completion_date: DateTime<Utc>,
}

/// GET /projects - projects visible to the caller
pub async fn list_projects(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<Vec<Project>> {
    let projects = state.projects.list_projects(&caller, Utc::now()).await?;
    Ok(ApiResponse::success(projects))
}

/// POST /projects
pub async fn create_project(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiJson(project): ApiJson<Project>,
) -> ApiResult<Project> {
    let created = state.projects.create_project(&caller, project).await?;
    Ok(ApiResponse::created(created))
}

/// GET /projects/:id
pub async fn get_project(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> ApiResult<Project> {
    Ok(ApiResponse::success(state.projects.get_project(&caller, &id).await?))
}

/// PUT /projects/:id - full replace, lifecycle fields kept
pub async fn update_project(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    ApiJson(project): ApiJson<Project>,
) -> ApiResult<Project> {
    let updated = state.projects.update_project(&caller, &id, project).await?;
    Ok(ApiResponse::accepted(updated))
}

/// PUT /projects/:id/metrics
pub async fn update_metrics(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    ApiJson(metrics): ApiJson<Metrics>,
) -> ApiResult<Metrics> {
    let stored = state.projects.update_metrics(&caller, &id, metrics).await?;
    Ok(ApiResponse::success(stored))
}

/// PATCH /projects/:id/completed
pub async fn mark_completed(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<CompletedRequest>,
) -> ApiResult<Project> {
    let project = state
        .projects
        .mark_completed(&caller, &id, body.completion_date)
        .await?;
    Ok(ApiResponse::success(project))
}

/// DELETE /projects/:id
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.projects.delete_project(&caller, &id).await?;
    Ok(ApiResponse::no_content())
}
