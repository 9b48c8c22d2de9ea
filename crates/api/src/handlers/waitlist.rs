//! Handlers for the `/waitlist` resource.
//!
//! Customer endpoints (join, status, update, cancel) act on the caller's own
//! entries. Staff endpoints (restaurant view, call, seat, no-show, remove)
//! are limited to admins and staff of the entry's restaurant; that check
//! lives in the waitlist engine.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tablewait_core::error::CoreError;
use tablewait_core::types::DbId;
use tablewait_db::models::waitlist_entry::{UpdateWaitlistEntry, WaitlistEntryResponse};
use tablewait_db::repositories::UserRepo;

use crate::engine::waitlist_queue::RestaurantWaitlist;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireCustomer, RequireStaff};
use crate::response::DataResponse;
use crate::state::AppState;

type EntryResult = AppResult<Json<DataResponse<WaitlistEntryResponse>>>;

/// Request body for `POST /waitlist/join/{restaurant_id}`.
#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    pub party_size: i32,
    pub notes: Option<String>,
}

/// Optional request body for `DELETE /waitlist/cancel/{id}`.
#[derive(Debug, Deserialize)]
pub struct CancelRequest {
    pub reason: Option<String>,
}

fn parse_cancel_reason(body: &[u8]) -> AppResult<Option<String>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let input: CancelRequest = serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid cancel body: {e}")))?;
    Ok(input.reason)
}

fn entry(entry: impl Into<WaitlistEntryResponse>) -> Json<DataResponse<WaitlistEntryResponse>> {
    Json(DataResponse { data: entry.into() })
}

// ---------------------------------------------------------------------------
// Customer
// ---------------------------------------------------------------------------

/// POST /api/v1/waitlist/join/{restaurant_id}
pub async fn join(
    State(state): State<AppState>,
    RequireCustomer(auth): RequireCustomer,
    Path(restaurant_id): Path<DbId>,
    Json(input): Json<JoinRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<WaitlistEntryResponse>>)> {
    let customer = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Account no longer exists".into()))
        })?;

    if !customer.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    let created = state
        .queue()
        .join(restaurant_id, &customer, input.party_size, input.notes)
        .await?;

    Ok((StatusCode::CREATED, entry(created)))
}

/// GET /api/v1/waitlist/status/{restaurant_id}
pub async fn status(
    State(state): State<AppState>,
    RequireCustomer(auth): RequireCustomer,
    Path(restaurant_id): Path<DbId>,
) -> EntryResult {
    let found = state
        .queue()
        .customer_status(restaurant_id, auth.user_id)
        .await?;
    Ok(entry(found))
}

/// PUT /api/v1/waitlist/update/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireCustomer(auth): RequireCustomer,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateWaitlistEntry>,
) -> EntryResult {
    let updated = state.queue().update(id, auth.user_id, &input).await?;
    Ok(entry(updated))
}

/// DELETE /api/v1/waitlist/cancel/{id}
///
/// The body is optional; without a reason the default one is recorded.
pub async fn cancel(
    State(state): State<AppState>,
    RequireCustomer(auth): RequireCustomer,
    Path(id): Path<DbId>,
    body: Bytes,
) -> EntryResult {
    let reason = parse_cancel_reason(&body)?;
    let cancelled = state
        .queue()
        .cancel(id, auth.user_id, reason.as_deref())
        .await?;
    Ok(entry(cancelled))
}

// ---------------------------------------------------------------------------
// Staff
// ---------------------------------------------------------------------------

/// GET /api/v1/waitlist/restaurant/{restaurant_id}
pub async fn restaurant_waitlist(
    State(state): State<AppState>,
    RequireStaff(auth): RequireStaff,
    Path(restaurant_id): Path<DbId>,
) -> AppResult<Json<DataResponse<RestaurantWaitlist>>> {
    let view = state
        .queue()
        .restaurant_waitlist(restaurant_id, &auth.caller())
        .await?;
    Ok(Json(DataResponse { data: view }))
}

/// PUT /api/v1/waitlist/call/{id}
pub async fn call(
    State(state): State<AppState>,
    RequireStaff(auth): RequireStaff,
    Path(id): Path<DbId>,
) -> EntryResult {
    let called = state.queue().call(id, &auth.caller()).await?;
    Ok(entry(called))
}

/// PUT /api/v1/waitlist/seat/{id}
pub async fn seat(
    State(state): State<AppState>,
    RequireStaff(auth): RequireStaff,
    Path(id): Path<DbId>,
) -> EntryResult {
    let seated = state.queue().seat(id, &auth.caller()).await?;
    Ok(entry(seated))
}

/// PUT /api/v1/waitlist/no-show/{id}
pub async fn no_show(
    State(state): State<AppState>,
    RequireStaff(auth): RequireStaff,
    Path(id): Path<DbId>,
) -> EntryResult {
    let marked = state.queue().mark_no_show(id, &auth.caller()).await?;
    Ok(entry(marked))
}

/// DELETE /api/v1/waitlist/entries/{id}
pub async fn remove(
    State(state): State<AppState>,
    RequireStaff(auth): RequireStaff,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.queue().remove(id, &auth.caller()).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::parse_cancel_reason;

    #[test]
    fn empty_cancel_body_means_no_reason() {
        assert_eq!(parse_cancel_reason(b"").unwrap(), None);
        assert_eq!(parse_cancel_reason(b"  \n").unwrap(), None);
        assert_eq!(parse_cancel_reason(b"{}").unwrap(), None);
    }

    #[test]
    fn cancel_body_reason_is_read() {
        let reason = parse_cancel_reason(br#"{"reason":"Running late"}"#).unwrap();
        assert_eq!(reason.as_deref(), Some("Running late"));
        assert!(parse_cancel_reason(b"not json").is_err());
    }
}
