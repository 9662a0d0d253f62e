use axum::extract::{Path, State};
use axum::Extension;

use crate::app::AppState;
use crate::identity::Identity;
use crate::middleware::{ApiResponse, ApiResult};
use crate::types::Caller;

/// GET /users
pub async fn list_users(State(state): State<AppState>, Extension(caller): Extension<Caller>) -> ApiResult<Vec<Identity>> {
    Ok(ApiResponse::success(state.users.list_users(&caller).await?))
}

/// GET /users/me
pub async fn get_me(State(state): State<AppState>, Extension(caller): Extension<Caller>) -> ApiResult<Identity> {
    Ok(ApiResponse::success(state.users.get_me(&caller).await?))
}

/// GET /users/:id (admin)
pub async fn get_user(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> ApiResult<Identity> {
    Ok(ApiResponse::success(state.users.get_user(&caller, &id).await?))
}
