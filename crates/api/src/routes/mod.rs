pub mod categories;
pub mod health;
pub mod tasks;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /categories                      list, create
/// /categories/{id}                 get, update, delete
/// /categories/by-name/{name}       get by name
///
/// /tasks                           list, create
/// /tasks/{id}                      get, update, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/categories", categories::router())
        .nest("/tasks", tasks::router())
}
