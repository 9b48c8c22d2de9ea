//! Waitlist queue engine.
//!
//! Orchestrates the pure rules in [`tablewait_core::waitlist`] against the
//! repositories: joins, status transitions, customer edits, removals and
//! position renumbering.
//!
//! Joins and renumbers both take a row lock on the restaurant, so for one
//! restaurant they run one at a time. A join renumbers under that lock
//! before taking the next position. Status transitions are single
//! conditional updates and do not need the lock.

use chrono::Utc;
use serde::Serialize;
use sqlx::{PgConnection, PgPool};
use tablewait_core::error::{CoreError, Rejection};
use tablewait_core::hours::DayHours;
use tablewait_core::roles::Caller;
use tablewait_core::types::{DbId, Timestamp};
use tablewait_core::waitlist::{self, EntryAction, QueuedEntry, DUPLICATE_WINDOW_HOURS};
use tablewait_db::models::restaurant::{Restaurant, UpdateWaitlistSettings};
use tablewait_db::models::user::User;
use tablewait_db::models::waitlist_entry::{
    CreateWaitlistEntry, UpdateWaitlistEntry, WaitlistEntry, WaitlistEntryResponse,
};
use tablewait_db::repositories::{RestaurantRepo, WaitlistEntryRepo};

use crate::error::{AppError, AppResult};

const ENTRY: &str = "WaitlistEntry";
const RESTAURANT: &str = "Restaurant";

fn entry_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: ENTRY, id })
}

fn restaurant_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: RESTAURANT,
        id,
    })
}

fn concurrent_change() -> AppError {
    AppError::Core(
        Rejection::InvalidTransition(
            "Entry was changed by another request; reload and try again".into(),
        )
        .into(),
    )
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// Waitlist settings and live counts of one restaurant.
#[derive(Debug, Clone, Serialize)]
pub struct WaitlistSettings {
    pub restaurant_id: DbId,
    pub restaurant_name: String,
    pub max_capacity: i32,
    pub estimated_wait_time_per_customer: i32,
    pub hours: Vec<DayHours>,
    pub utc_offset_minutes: i32,
    pub is_open: bool,
    pub waiting_count: i64,
    pub called_count: i64,
}

impl WaitlistSettings {
    fn new(restaurant: &Restaurant, waiting_count: i64, called_count: i64, now: Timestamp) -> Self {
        Self {
            restaurant_id: restaurant.id,
            restaurant_name: restaurant.name.clone(),
            max_capacity: restaurant.max_capacity,
            estimated_wait_time_per_customer: restaurant.estimated_wait_time_per_customer,
            hours: restaurant.hours.0.clone(),
            utc_offset_minutes: restaurant.utc_offset_minutes,
            is_open: restaurant.is_open_at(now),
            waiting_count,
            called_count,
        }
    }
}

/// Staff view of a restaurant's queue.
#[derive(Debug, Clone, Serialize)]
pub struct RestaurantWaitlist {
    pub waitlist: Vec<WaitlistEntryResponse>,
    pub settings: WaitlistSettings,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Waitlist operations bound to a connection pool.
pub struct WaitlistQueue<'a> {
    pool: &'a PgPool,
}

impl<'a> WaitlistQueue<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Add `customer` to the back of a restaurant's queue.
    ///
    /// Checks run in a fixed order (party size, restaurant exists, open,
    /// duplicate, capacity) so each refusal is reported precisely.
    pub async fn join(
        &self,
        restaurant_id: DbId,
        customer: &User,
        party_size: i32,
        notes: Option<String>,
    ) -> AppResult<WaitlistEntry> {
        waitlist::validate_party_size(party_size)?;
        waitlist::validate_notes(notes.as_deref())?;

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let restaurant = RestaurantRepo::find_for_update(&mut *tx, restaurant_id)
            .await?
            .ok_or_else(|| restaurant_not_found(restaurant_id))?;

        if !restaurant.is_open_at(now) {
            return Err(CoreError::from(Rejection::Closed).into());
        }

        let since = now - chrono::Duration::hours(DUPLICATE_WINDOW_HOURS);
        if WaitlistEntryRepo::has_active_since(&mut *tx, restaurant_id, customer.id, since).await? {
            return Err(CoreError::from(Rejection::Duplicate).into());
        }

        // Close gaps left by calls before taking the next position.
        Self::renumber_in(&mut *tx, &restaurant).await?;

        let waiting = WaitlistEntryRepo::count_waiting(&mut *tx, restaurant_id).await?;
        waitlist::check_capacity(waiting, restaurant.max_capacity)?;

        let position = waitlist::next_position(waiting);
        let estimated_wait_time =
            waitlist::estimated_wait_minutes(position, restaurant.estimated_wait_time_per_customer);

        let input = CreateWaitlistEntry {
            restaurant_id,
            customer_id: customer.id,
            customer_name: customer.name.clone(),
            customer_phone: customer.phone.clone(),
            customer_email: customer.email.clone(),
            party_size,
            notes,
            position,
            estimated_wait_time,
        };
        let entry = WaitlistEntryRepo::create(&mut *tx, &input).await?;
        tx.commit().await?;

        tracing::info!(
            entry_id = entry.id,
            restaurant_id,
            customer_id = customer.id,
            position,
            estimated_wait_time,
            "Customer joined waitlist",
        );

        Ok(entry)
    }

    /// The customer's active entry at a restaurant.
    pub async fn customer_status(
        &self,
        restaurant_id: DbId,
        customer_id: DbId,
    ) -> AppResult<WaitlistEntry> {
        WaitlistEntryRepo::find_active_for_customer(self.pool, restaurant_id, customer_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Active waitlist entry for restaurant",
                id: restaurant_id,
            }))
    }

    /// Change party size or notes on the customer's own active entry.
    pub async fn update(
        &self,
        entry_id: DbId,
        customer_id: DbId,
        input: &UpdateWaitlistEntry,
    ) -> AppResult<WaitlistEntry> {
        if let Some(party_size) = input.party_size {
            waitlist::validate_party_size(party_size)?;
        }
        waitlist::validate_notes(input.notes.as_deref())?;

        let entry = WaitlistEntryRepo::find_for_customer(self.pool, entry_id, customer_id)
            .await?
            .ok_or_else(|| entry_not_found(entry_id))?;

        let status = entry.status()?;
        if !status.is_active() {
            return Err(CoreError::from(Rejection::InvalidTransition(format!(
                "Entry is {status} and can no longer be updated"
            )))
            .into());
        }

        let updated = WaitlistEntryRepo::update_details(self.pool, entry_id, customer_id, input)
            .await?
            .ok_or_else(concurrent_change)?;

        tracing::info!(entry_id, customer_id, "Waitlist entry updated by customer");
        Ok(updated)
    }

    /// Cancel the customer's own entry.
    ///
    /// Entries of other customers are reported as not found.
    pub async fn cancel(
        &self,
        entry_id: DbId,
        customer_id: DbId,
        reason: Option<&str>,
    ) -> AppResult<WaitlistEntry> {
        let entry = WaitlistEntryRepo::find_for_customer(self.pool, entry_id, customer_id)
            .await?
            .ok_or_else(|| entry_not_found(entry_id))?;

        let reason = waitlist::cancellation_reason(reason);
        self.apply(entry, EntryAction::Cancel, Some(&reason)).await
    }

    pub async fn call(&self, entry_id: DbId, caller: &Caller) -> AppResult<WaitlistEntry> {
        self.apply_staff_action(entry_id, caller, EntryAction::Call)
            .await
    }

    pub async fn seat(&self, entry_id: DbId, caller: &Caller) -> AppResult<WaitlistEntry> {
        self.apply_staff_action(entry_id, caller, EntryAction::Seat)
            .await
    }

    pub async fn mark_no_show(&self, entry_id: DbId, caller: &Caller) -> AppResult<WaitlistEntry> {
        self.apply_staff_action(entry_id, caller, EntryAction::NoShow)
            .await
    }

    /// Delete an entry outright and close the gap it leaves.
    pub async fn remove(&self, entry_id: DbId, caller: &Caller) -> AppResult<()> {
        let entry = WaitlistEntryRepo::find_by_id(self.pool, entry_id)
            .await?
            .ok_or_else(|| entry_not_found(entry_id))?;
        caller.require_manage(entry.restaurant_id)?;

        if !WaitlistEntryRepo::delete(self.pool, entry_id).await? {
            return Err(entry_not_found(entry_id));
        }

        tracing::info!(
            entry_id,
            restaurant_id = entry.restaurant_id,
            removed_by = caller.user_id,
            "Waitlist entry removed",
        );

        self.renumber_best_effort(entry.restaurant_id).await;
        Ok(())
    }

    /// Active entries plus settings for staff.
    pub async fn restaurant_waitlist(
        &self,
        restaurant_id: DbId,
        caller: &Caller,
    ) -> AppResult<RestaurantWaitlist> {
        let restaurant = RestaurantRepo::find_by_id(self.pool, restaurant_id)
            .await?
            .ok_or_else(|| restaurant_not_found(restaurant_id))?;
        caller.require_manage(restaurant_id)?;

        let entries = WaitlistEntryRepo::list_active_by_restaurant(self.pool, restaurant_id).await?;
        let (waiting, called) = WaitlistEntryRepo::active_counts(self.pool, restaurant_id).await?;

        Ok(RestaurantWaitlist {
            waitlist: entries.into_iter().map(Into::into).collect(),
            settings: WaitlistSettings::new(&restaurant, waiting, called, Utc::now()),
        })
    }

    /// Update capacity, wait constant or hours.
    ///
    /// A changed per-customer constant is pushed into stored estimates
    /// right away by renumbering.
    pub async fn update_settings(
        &self,
        restaurant_id: DbId,
        caller: &Caller,
        input: &UpdateWaitlistSettings,
    ) -> AppResult<Restaurant> {
        input.validate()?;

        let current = RestaurantRepo::find_by_id(self.pool, restaurant_id)
            .await?
            .ok_or_else(|| restaurant_not_found(restaurant_id))?;
        caller.require_manage(restaurant_id)?;

        let updated = RestaurantRepo::update_settings(self.pool, restaurant_id, input)
            .await?
            .ok_or_else(|| restaurant_not_found(restaurant_id))?;

        tracing::info!(
            restaurant_id,
            updated_by = caller.user_id,
            max_capacity = updated.max_capacity,
            estimated_wait_time_per_customer = updated.estimated_wait_time_per_customer,
            "Waitlist settings updated",
        );

        if updated.estimated_wait_time_per_customer != current.estimated_wait_time_per_customer {
            self.renumber_best_effort(restaurant_id).await;
        }

        Ok(updated)
    }

    // -----------------------------------------------------------------------
    // Renumbering
    // -----------------------------------------------------------------------

    /// Recompute positions and wait estimates of a restaurant's waiting
    /// entries from join order. Returns the number of rows written; a
    /// second call with no change in between returns 0.
    pub async fn renumber(&self, restaurant_id: DbId) -> AppResult<u64> {
        let mut tx = self.pool.begin().await?;

        let restaurant = RestaurantRepo::find_for_update(&mut *tx, restaurant_id)
            .await?
            .ok_or_else(|| restaurant_not_found(restaurant_id))?;

        let (waiting, written) = Self::renumber_in(&mut *tx, &restaurant).await?;
        tx.commit().await?;

        if written > 0 {
            tracing::debug!(
                restaurant_id,
                waiting,
                written,
                "Waitlist positions renumbered",
            );
        }

        Ok(written)
    }

    /// Renumber inside a transaction that already holds the restaurant lock.
    /// Returns the waiting count and the number of rows written.
    async fn renumber_in(
        conn: &mut PgConnection,
        restaurant: &Restaurant,
    ) -> Result<(usize, u64), sqlx::Error> {
        let ordered: Vec<QueuedEntry> =
            WaitlistEntryRepo::list_waiting_slots(&mut *conn, restaurant.id)
                .await?
                .into_iter()
                .map(Into::into)
                .collect();

        let plan =
            waitlist::plan_renumber(&ordered, restaurant.estimated_wait_time_per_customer);
        let written = WaitlistEntryRepo::apply_positions(&mut *conn, &plan).await?;
        Ok((ordered.len(), written))
    }

    /// Renumber every restaurant that has waiting entries.
    ///
    /// A failure for one restaurant is logged and does not stop the others.
    pub async fn renumber_all(&self) -> AppResult<u64> {
        let mut total = 0;
        for restaurant_id in RestaurantRepo::list_ids_with_waiting(self.pool).await? {
            match self.renumber(restaurant_id).await {
                Ok(written) => total += written,
                Err(e) => {
                    tracing::warn!(restaurant_id, error = %e, "Position reconcile failed");
                }
            }
        }
        Ok(total)
    }

    /// Renumber after an entry left the waiting pool.
    ///
    /// The triggering request has already succeeded, so a failure here is
    /// logged; the next trigger or the background reconciler repairs it.
    async fn renumber_best_effort(&self, restaurant_id: DbId) {
        if let Err(e) = self.renumber(restaurant_id).await {
            tracing::warn!(restaurant_id, error = %e, "Renumbering failed; will retry later");
        }
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    async fn apply_staff_action(
        &self,
        entry_id: DbId,
        caller: &Caller,
        action: EntryAction,
    ) -> AppResult<WaitlistEntry> {
        let entry = WaitlistEntryRepo::find_by_id(self.pool, entry_id)
            .await?
            .ok_or_else(|| entry_not_found(entry_id))?;
        caller.require_manage(entry.restaurant_id)?;

        self.apply(entry, action, None).await
    }

    async fn apply(
        &self,
        entry: WaitlistEntry,
        action: EntryAction,
        cancellation_reason: Option<&str>,
    ) -> AppResult<WaitlistEntry> {
        let from = entry.status()?;
        let to = waitlist::transition(from, action)?;

        let updated =
            WaitlistEntryRepo::transition(self.pool, entry.id, from, to, cancellation_reason)
                .await?
                .ok_or_else(concurrent_change)?;

        tracing::info!(
            entry_id = updated.id,
            restaurant_id = updated.restaurant_id,
            from = %from,
            to = %to,
            "Waitlist entry status changed",
        );

        if action.leaves_waiting_pool() {
            self.renumber_best_effort(updated.restaurant_id).await;
        }

        Ok(updated)
    }
}
