//! Restaurant entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use tablewait_core::error::CoreError;
use tablewait_core::hours::{self, DayHours};
use tablewait_core::types::{DbId, Timestamp};

/// A row from the `restaurants` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Restaurant {
    pub id: DbId,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub max_capacity: i32,
    /// Minutes added to the wait estimate per party ahead in the queue.
    pub estimated_wait_time_per_customer: i32,
    pub hours: Json<Vec<DayHours>>,
    pub utc_offset_minutes: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Restaurant {
    /// Whether the restaurant accepts joins at `at`.
    pub fn is_open_at(&self, at: Timestamp) -> bool {
        hours::is_open(&self.hours.0, self.utc_offset_minutes, at)
    }
}

/// DTO for creating a restaurant.
#[derive(Debug, Deserialize)]
pub struct CreateRestaurant {
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub max_capacity: Option<i32>,
    pub estimated_wait_time_per_customer: Option<i32>,
    pub hours: Option<Vec<DayHours>>,
    pub utc_offset_minutes: Option<i32>,
}

impl CreateRestaurant {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.trim().is_empty() {
            return Err(CoreError::Validation("name is required".into()));
        }
        validate_settings(
            self.max_capacity,
            self.estimated_wait_time_per_customer,
            self.hours.as_deref(),
            self.utc_offset_minutes,
        )
    }
}

/// DTO for updating a restaurant's waitlist settings. All fields optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateWaitlistSettings {
    pub max_capacity: Option<i32>,
    pub estimated_wait_time_per_customer: Option<i32>,
    pub hours: Option<Vec<DayHours>>,
    pub utc_offset_minutes: Option<i32>,
}

impl UpdateWaitlistSettings {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_settings(
            self.max_capacity,
            self.estimated_wait_time_per_customer,
            self.hours.as_deref(),
            self.utc_offset_minutes,
        )
    }
}

fn validate_settings(
    max_capacity: Option<i32>,
    per_customer: Option<i32>,
    hours: Option<&[DayHours]>,
    utc_offset_minutes: Option<i32>,
) -> Result<(), CoreError> {
    if max_capacity.is_some_and(|c| c < 1) {
        return Err(CoreError::Validation("max_capacity must be at least 1".into()));
    }
    if per_customer.is_some_and(|m| m < 1) {
        return Err(CoreError::Validation(
            "estimated_wait_time_per_customer must be at least 1 minute".into(),
        ));
    }
    if let Some(hours) = hours {
        hours::validate_hours(hours)?;
    }
    if let Some(offset) = utc_offset_minutes {
        hours::validate_utc_offset(offset)?;
    }
    Ok(())
}
