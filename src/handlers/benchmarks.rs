use axum::extract::{Path, State};
use axum::Extension;

use crate::app::AppState;
use crate::database::models::Benchmark;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::types::Caller;

/// GET /benchmarks
pub async fn list_benchmarks(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<Vec<Benchmark>> {
    Ok(ApiResponse::success(state.benchmarks.list_benchmarks(&caller).await?))
}

/// POST /benchmarks
pub async fn create_benchmark(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiJson(benchmark): ApiJson<Benchmark>,
) -> ApiResult<Benchmark> {
    let created = state.benchmarks.create_benchmark(&caller, benchmark).await?;
    Ok(ApiResponse::created(created))
}

/// GET /benchmarks/:id
pub async fn get_benchmark(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> ApiResult<Benchmark> {
    Ok(ApiResponse::success(state.benchmarks.get_benchmark(&caller, &id).await?))
}

/// PUT /benchmarks/:id
pub async fn update_benchmark(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    ApiJson(benchmark): ApiJson<Benchmark>,
) -> ApiResult<Benchmark> {
    let updated = state.benchmarks.update_benchmark(&caller, &id, benchmark).await?;
    Ok(ApiResponse::accepted(updated))
}

/// DELETE /benchmarks/:id
pub async fn delete_benchmark(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.benchmarks.delete_benchmark(&caller, &id).await?;
    Ok(ApiResponse::no_content())
}
