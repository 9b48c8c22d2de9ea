//! Handlers for the `/admin` resource (staff account management).
//!
//! All handlers require the `admin` role via [`RequireAdmin`].

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tablewait_core::error::CoreError;
use tablewait_core::roles::Role;
use tablewait_core::types::DbId;
use tablewait_db::models::user::{CreateUser, UserResponse};
use tablewait_db::repositories::{RestaurantRepo, UserRepo};
use validator::Validate;

use crate::auth::password::{hash_password, validate_password_strength};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /admin/users`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(max = 30, message = "phone must be at most 30 characters"))]
    pub phone: Option<String>,
    pub password: String,
    pub role: Role,
    /// Restaurant the staff member works at.
    pub restaurant_id: Option<DbId>,
}

/// POST /api/v1/admin/users
///
/// Create a staff or admin account. Customers sign up through
/// `/auth/register` instead.
pub async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    input.validate()?;
    validate_password_strength(&input.password)?;

    if input.role == Role::Customer {
        return Err(AppError::Core(CoreError::Validation(
            "Customer accounts are created via /auth/register".into(),
        )));
    }

    if let Some(restaurant_id) = input.restaurant_id {
        RestaurantRepo::find_by_id(&state.pool, restaurant_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Restaurant",
                id: restaurant_id,
            }))?;
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            name: input.name.trim().to_string(),
            email: input.email.trim().to_string(),
            phone: input.phone,
            password_hash,
            role_id: input.role.id(),
            restaurant_id: input.restaurant_id,
        },
    )
    .await?;

    tracing::info!(
        user_id = user.id,
        role = %input.role,
        restaurant_id = ?input.restaurant_id,
        created_by = admin.user_id,
        "User created by admin",
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UserResponse::from(&user),
        }),
    ))
}
