//! Route definitions for the `/survey` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::survey;
use crate::state::AppState;

/// Routes mounted at `/survey`. All require auth.
///
/// ```text
/// GET    /       -> index
/// POST   /       -> store
/// GET    /{id}   -> show
/// PUT    /{id}   -> update
/// DELETE /{id}   -> destroy
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(survey::index).post(survey::store))
        .route(
            "/{id}",
            get(survey::show)
                .put(survey::update)
                .delete(survey::destroy),
        )
}
