//! Route definitions for the `/restaurants` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::restaurant;
use crate::state::AppState;

/// Routes mounted at `/restaurants`.
///
/// ```text
/// GET  /               -> list
/// POST /               -> create (admin)
/// GET  /{id}           -> get
/// PUT  /{id}/settings  -> update_settings (admin or staff of the restaurant)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(restaurant::list).post(restaurant::create))
        .route("/{id}", get(restaurant::get))
        .route("/{id}/settings", put(restaurant::update_settings))
}
