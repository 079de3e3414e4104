pub mod auth;
pub mod health;
pub mod survey;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /sign-up                 register (public)
/// /login                   login (public)
/// /logout                  logout (requires auth)
/// /me                      current user (requires auth)
///
/// /survey                  list, create
/// /survey/{id}             get, update, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .nest("/survey", survey::router())
}
