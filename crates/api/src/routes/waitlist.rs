//! Route definitions for the `/waitlist` resource.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::waitlist;
use crate::state::AppState;

/// Routes mounted at `/waitlist`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/join/{restaurant_id}", post(waitlist::join))
        .route("/status/{restaurant_id}", get(waitlist::status))
        .route("/update/{id}", put(waitlist::update))
        .route("/cancel/{id}", delete(waitlist::cancel))
        .route(
            "/restaurant/{restaurant_id}",
            get(waitlist::restaurant_waitlist),
        )
        .route("/call/{id}", put(waitlist::call))
        .route("/seat/{id}", put(waitlist::seat))
        .route("/no-show/{id}", put(waitlist::no_show))
        .route("/entries/{id}", delete(waitlist::remove))
}
