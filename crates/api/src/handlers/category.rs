//! Handlers for the `/categories` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use todo_core::category::{Category, CategoryRequest};
use todo_core::types::DbId;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::state::AppState;

/// POST /api/categories
pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<CategoryRequest>,
) -> AppResult<(StatusCode, Json<Category>)> {
    let input = input.validate(&state.config.field_limits)?;
    let category = state.categories.create(&input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// GET /api/categories
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Category>>> {
    let categories = state.categories.list_all().await?;
    Ok(Json(categories))
}

/// GET /api/categories/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<Category>> {
    let category = state.categories.find_by_id(id).await?;
    Ok(Json(category))
}

/// GET /api/categories/by-name/{name}
pub async fn get_by_name(
    State(state): State<AppState>,
    AppPath(name): AppPath<String>,
) -> AppResult<Json<Category>> {
    let category = state.categories.find_by_name(&name).await?;
    Ok(Json(category))
}

/// PUT /api/categories/{id}
pub async fn update(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<CategoryRequest>,
) -> AppResult<Json<Category>> {
    let input = input.validate(&state.config.field_limits)?;
    let category = state.categories.update(id, &input).await?;
    Ok(Json(category))
}

/// DELETE /api/categories/{id}
pub async fn delete(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<StatusCode> {
    state.categories.delete_by_id(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
