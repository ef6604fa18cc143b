//! Handlers for the `/tasks` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use todo_core::task::{Task, TaskRequest};
use todo_core::types::DbId;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::state::AppState;

/// POST /api/tasks
///
/// The embedded category is matched by name; see `TaskService::create`.
pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<TaskRequest>,
) -> AppResult<(StatusCode, Json<Task>)> {
    let input = input.validate(&state.config.field_limits, Utc::now())?;
    let task = state.tasks.create(&input).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// GET /api/tasks
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Task>>> {
    let tasks = state.tasks.list_all().await?;
    Ok(Json(tasks))
}

/// GET /api/tasks/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<Task>> {
    let task = state.tasks.find_by_id(id).await?;
    Ok(Json(task))
}

/// PUT /api/tasks/{id}
pub async fn update(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<TaskRequest>,
) -> AppResult<Json<Task>> {
    let input = input.validate(&state.config.field_limits, Utc::now())?;
    let task = state.tasks.update(id, &input).await?;
    Ok(Json(task))
}

/// DELETE /api/tasks/{id}
pub async fn delete(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<StatusCode> {
    state.tasks.delete_by_id(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
