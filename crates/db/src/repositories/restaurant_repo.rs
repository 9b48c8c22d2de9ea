//! Repository for the `restaurants` table.

use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};
use tablewait_core::types::DbId;
use tablewait_core::waitlist::EntryStatus;

use crate::models::restaurant::{CreateRestaurant, Restaurant, UpdateWaitlistSettings};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, name, address, phone, max_capacity, estimated_wait_time_per_customer, \
    hours, utc_offset_minutes, created_at, updated_at";

/// Provides CRUD operations for restaurants.
pub struct RestaurantRepo;

impl RestaurantRepo {
    /// Insert a new restaurant, falling back to column defaults for omitted settings.
    pub async fn create(
        pool: &PgPool,
        input: &CreateRestaurant,
    ) -> Result<Restaurant, sqlx::Error> {
        let query = format!(
            "INSERT INTO restaurants \
                (name, address, phone, max_capacity, estimated_wait_time_per_customer, \
                 hours, utc_offset_minutes) \
             VALUES ($1, $2, $3, COALESCE($4, 50), COALESCE($5, 15), \
                     COALESCE($6, '[]'::jsonb), COALESCE($7, 0)) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Restaurant>(&query)
            .bind(&input.name)
            .bind(&input.address)
            .bind(&input.phone)
            .bind(input.max_capacity)
            .bind(input.estimated_wait_time_per_customer)
            .bind(input.hours.as_ref().map(Json))
            .bind(input.utc_offset_minutes)
            .fetch_one(pool)
            .await
    }

    /// Find a restaurant by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Restaurant>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM restaurants WHERE id = $1");
        sqlx::query_as::<_, Restaurant>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Load a restaurant and hold a row lock on it until the transaction ends.
    ///
    /// Concurrent joins for the same restaurant serialize on this lock, which
    /// keeps the capacity check and the insert atomic.
    pub async fn find_for_update(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Restaurant>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM restaurants WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Restaurant>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// List all restaurants ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Restaurant>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM restaurants ORDER BY name, id");
        sqlx::query_as::<_, Restaurant>(&query)
            .fetch_all(pool)
            .await
    }

    /// Update waitlist settings. Only non-`None` fields are applied.
    pub async fn update_settings(
        pool: &PgPool,
        id: DbId,
        input: &UpdateWaitlistSettings,
    ) -> Result<Option<Restaurant>, sqlx::Error> {
        let query = format!(
            "UPDATE restaurants SET \
                max_capacity = COALESCE($2, max_capacity), \
                estimated_wait_time_per_customer = COALESCE($3, estimated_wait_time_per_customer), \
                hours = COALESCE($4, hours), \
                utc_offset_minutes = COALESCE($5, utc_offset_minutes), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Restaurant>(&query)
            .bind(id)
            .bind(input.max_capacity)
            .bind(input.estimated_wait_time_per_customer)
            .bind(input.hours.as_ref().map(Json))
            .bind(input.utc_offset_minutes)
            .fetch_optional(pool)
            .await
    }

    /// IDs of restaurants that currently have at least one waiting entry.
    pub async fn list_ids_with_waiting(pool: &PgPool) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT DISTINCT restaurant_id FROM waitlist_entries \
             WHERE status_id = $1 \
             ORDER BY restaurant_id",
        )
        .bind(EntryStatus::Waiting.id())
        .fetch_all(pool)
        .await
    }
}
