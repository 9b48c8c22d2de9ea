//! Handlers for the `/restaurants` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use tablewait_core::error::CoreError;
use tablewait_core::types::DbId;
use tablewait_db::models::restaurant::{CreateRestaurant, Restaurant, UpdateWaitlistSettings};
use tablewait_db::repositories::RestaurantRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireStaff};
use crate::response::DataResponse;
use crate::state::AppState;

/// A restaurant with its open state evaluated at response time.
#[derive(Debug, Serialize)]
pub struct RestaurantResponse {
    #[serde(flatten)]
    pub restaurant: Restaurant,
    pub is_open: bool,
}

impl From<Restaurant> for RestaurantResponse {
    fn from(restaurant: Restaurant) -> Self {
        let is_open = restaurant.is_open_at(Utc::now());
        Self {
            restaurant,
            is_open,
        }
    }
}

/// GET /api/v1/restaurants
pub async fn list(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<RestaurantResponse>>>> {
    let restaurants = RestaurantRepo::list(&state.pool).await?;
    Ok(Json(DataResponse {
        data: restaurants.into_iter().map(Into::into).collect(),
    }))
}

/// GET /api/v1/restaurants/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<RestaurantResponse>>> {
    let restaurant = RestaurantRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Restaurant",
            id,
        }))?;
    Ok(Json(DataResponse {
        data: restaurant.into(),
    }))
}

/// POST /api/v1/restaurants
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateRestaurant>,
) -> AppResult<(StatusCode, Json<DataResponse<RestaurantResponse>>)> {
    input.validate()?;

    let restaurant = RestaurantRepo::create(&state.pool, &input).await?;
    tracing::info!(
        restaurant_id = restaurant.id,
        created_by = admin.user_id,
        "Restaurant created",
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: restaurant.into(),
        }),
    ))
}

/// PUT /api/v1/restaurants/{id}/settings
pub async fn update_settings(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateWaitlistSettings>,
) -> AppResult<Json<DataResponse<RestaurantResponse>>> {
    let restaurant = state
        .queue()
        .update_settings(id, &user.caller(), &input)
        .await?;
    Ok(Json(DataResponse {
        data: restaurant.into(),
    }))
}
