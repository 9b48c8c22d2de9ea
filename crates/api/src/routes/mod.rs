pub mod admin;
pub mod auth;
pub mod health;
pub mod restaurant;
pub mod waitlist;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth/register                         register customer (public)
/// /auth/login                            login (public)
/// /auth/me                               current user
///
/// /admin/users                           create staff/admin (admin only)
///
/// /restaurants                           list (public), create (admin)
/// /restaurants/{id}                      get (public)
/// /restaurants/{id}/settings             update waitlist settings (staff)
///
/// /waitlist/join/{restaurant_id}         join (customer)
/// /waitlist/status/{restaurant_id}       own active entry (customer)
/// /waitlist/update/{id}                  edit own entry (customer)
/// /waitlist/cancel/{id}                  cancel own entry (customer)
/// /waitlist/restaurant/{restaurant_id}   queue view (staff)
/// /waitlist/call/{id}                    call (staff)
/// /waitlist/seat/{id}                    seat (staff)
/// /waitlist/no-show/{id}                 no-show (staff)
/// /waitlist/entries/{id}                 remove (staff)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/admin", admin::router())
        .nest("/restaurants", restaurant::router())
        .nest("/waitlist", waitlist::router())
}
