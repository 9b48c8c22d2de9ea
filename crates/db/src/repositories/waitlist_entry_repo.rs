//! Repository for the `waitlist_entries` table.
//!
//! Queue-shaping calls (count, insert, slot listing, bulk position writes)
//! take a `&mut PgConnection` so the caller can run them inside the
//! transaction that holds the restaurant row lock.

use sqlx::{PgConnection, PgPool};
use tablewait_core::types::{DbId, Timestamp};
use tablewait_core::waitlist::{EntryStatus, PositionUpdate, StatusId};

use crate::models::waitlist_entry::{
    CreateWaitlistEntry, QueueSlot, UpdateWaitlistEntry, WaitlistEntry,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, restaurant_id, customer_id, customer_name, customer_phone, customer_email, \
    party_size, notes, status_id, position, estimated_wait_time, joined_at, \
    called_at, seated_at, cancelled_at, no_show_at, cancellation_reason, \
    created_at, updated_at";

fn active_status_ids() -> Vec<StatusId> {
    vec![EntryStatus::Waiting.id(), EntryStatus::Called.id()]
}

/// Timestamp column stamped when an entry enters `status`.
fn stamp_column(status: EntryStatus) -> Option<&'static str> {
    match status {
        EntryStatus::Waiting => None,
        EntryStatus::Called => Some("called_at"),
        EntryStatus::Seated => Some("seated_at"),
        EntryStatus::Cancelled => Some("cancelled_at"),
        EntryStatus::NoShow => Some("no_show_at"),
    }
}

/// Provides queue and CRUD operations for waitlist entries.
pub struct WaitlistEntryRepo;

impl WaitlistEntryRepo {
    // -----------------------------------------------------------------------
    // Join
    // -----------------------------------------------------------------------

    /// Number of entries currently `waiting` at a restaurant.
    pub async fn count_waiting(
        conn: &mut PgConnection,
        restaurant_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM waitlist_entries \
             WHERE restaurant_id = $1 AND status_id = $2",
        )
        .bind(restaurant_id)
        .bind(EntryStatus::Waiting.id())
        .fetch_one(conn)
        .await
    }

    /// Whether the customer holds a waiting or called entry at the restaurant
    /// that was joined at or after `since`.
    pub async fn has_active_since(
        conn: &mut PgConnection,
        restaurant_id: DbId,
        customer_id: DbId,
        since: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS ( \
                 SELECT 1 FROM waitlist_entries \
                 WHERE restaurant_id = $1 AND customer_id = $2 \
                   AND status_id = ANY($3) AND joined_at >= $4 \
             )",
        )
        .bind(restaurant_id)
        .bind(customer_id)
        .bind(active_status_ids())
        .bind(since)
        .fetch_one(conn)
        .await
    }

    /// Insert a new `waiting` entry.
    ///
    /// `joined_at` is the wall clock at insert time, after the caller took
    /// the restaurant lock, so join order matches the order positions were
    /// handed out.
    pub async fn create(
        conn: &mut PgConnection,
        input: &CreateWaitlistEntry,
    ) -> Result<WaitlistEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO waitlist_entries \
                (restaurant_id, customer_id, customer_name, customer_phone, customer_email, \
                 party_size, notes, status_id, position, estimated_wait_time, joined_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, clock_timestamp()) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WaitlistEntry>(&query)
            .bind(input.restaurant_id)
            .bind(input.customer_id)
            .bind(&input.customer_name)
            .bind(&input.customer_phone)
            .bind(&input.customer_email)
            .bind(input.party_size)
            .bind(&input.notes)
            .bind(EntryStatus::Waiting.id())
            .bind(input.position)
            .bind(input.estimated_wait_time)
            .fetch_one(conn)
            .await
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<WaitlistEntry>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM waitlist_entries WHERE id = $1");
        sqlx::query_as::<_, WaitlistEntry>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an entry only if it belongs to `customer_id`.
    pub async fn find_for_customer(
        pool: &PgPool,
        id: DbId,
        customer_id: DbId,
    ) -> Result<Option<WaitlistEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM waitlist_entries WHERE id = $1 AND customer_id = $2"
        );
        sqlx::query_as::<_, WaitlistEntry>(&query)
            .bind(id)
            .bind(customer_id)
            .fetch_optional(pool)
            .await
    }

    /// The customer's most recently joined waiting or called entry at a restaurant.
    pub async fn find_active_for_customer(
        pool: &PgPool,
        restaurant_id: DbId,
        customer_id: DbId,
    ) -> Result<Option<WaitlistEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM waitlist_entries \
             WHERE restaurant_id = $1 AND customer_id = $2 AND status_id = ANY($3) \
             ORDER BY joined_at DESC, id DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, WaitlistEntry>(&query)
            .bind(restaurant_id)
            .bind(customer_id)
            .bind(active_status_ids())
            .fetch_optional(pool)
            .await
    }

    /// Active entries of a restaurant: called parties first, then the
    /// waiting queue in position order.
    pub async fn list_active_by_restaurant(
        pool: &PgPool,
        restaurant_id: DbId,
    ) -> Result<Vec<WaitlistEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM waitlist_entries \
             WHERE restaurant_id = $1 AND status_id = ANY($2) \
             ORDER BY CASE WHEN status_id = $3 THEN 0 ELSE 1 END, position, joined_at, id"
        );
        sqlx::query_as::<_, WaitlistEntry>(&query)
            .bind(restaurant_id)
            .bind(active_status_ids())
            .bind(EntryStatus::Called.id())
            .fetch_all(pool)
            .await
    }

    /// Return `(waiting, called)` counts for a restaurant.
    pub async fn active_counts(
        pool: &PgPool,
        restaurant_id: DbId,
    ) -> Result<(i64, i64), sqlx::Error> {
        sqlx::query_as::<_, (i64, i64)>(
            "SELECT \
                COUNT(*) FILTER (WHERE status_id = $2), \
                COUNT(*) FILTER (WHERE status_id = $3) \
             FROM waitlist_entries WHERE restaurant_id = $1",
        )
        .bind(restaurant_id)
        .bind(EntryStatus::Waiting.id())
        .bind(EntryStatus::Called.id())
        .fetch_one(pool)
        .await
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Move an entry from `from` to `to`, stamping the matching timestamp.
    ///
    /// The update is conditional on the entry still being in `from`; `None`
    /// means the entry is gone or another request moved it first.
    pub async fn transition(
        pool: &PgPool,
        id: DbId,
        from: EntryStatus,
        to: EntryStatus,
        cancellation_reason: Option<&str>,
    ) -> Result<Option<WaitlistEntry>, sqlx::Error> {
        let stamp = stamp_column(to)
            .map(|col| format!("{col} = NOW(), "))
            .unwrap_or_default();
        let query = format!(
            "UPDATE waitlist_entries SET \
                status_id = $3, {stamp}\
                cancellation_reason = COALESCE($4, cancellation_reason), \
                updated_at = NOW() \
             WHERE id = $1 AND status_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WaitlistEntry>(&query)
            .bind(id)
            .bind(from.id())
            .bind(to.id())
            .bind(cancellation_reason)
            .fetch_optional(pool)
            .await
    }

    /// Apply a customer's edit to an active entry they own.
    pub async fn update_details(
        pool: &PgPool,
        id: DbId,
        customer_id: DbId,
        input: &UpdateWaitlistEntry,
    ) -> Result<Option<WaitlistEntry>, sqlx::Error> {
        let query = format!(
            "UPDATE waitlist_entries SET \
                party_size = COALESCE($3, party_size), \
                notes = COALESCE($4, notes), \
                updated_at = NOW() \
             WHERE id = $1 AND customer_id = $2 AND status_id = ANY($5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WaitlistEntry>(&query)
            .bind(id)
            .bind(customer_id)
            .bind(input.party_size)
            .bind(&input.notes)
            .bind(active_status_ids())
            .fetch_optional(pool)
            .await
    }

    /// Physically delete an entry. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM waitlist_entries WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Renumbering
    // -----------------------------------------------------------------------

    /// Waiting entries of a restaurant in queue order (join time, then id).
    pub async fn list_waiting_slots(
        conn: &mut PgConnection,
        restaurant_id: DbId,
    ) -> Result<Vec<QueueSlot>, sqlx::Error> {
        sqlx::query_as::<_, QueueSlot>(
            "SELECT id, position, estimated_wait_time FROM waitlist_entries \
             WHERE restaurant_id = $1 AND status_id = $2 \
             ORDER BY joined_at ASC, id ASC",
        )
        .bind(restaurant_id)
        .bind(EntryStatus::Waiting.id())
        .fetch_all(conn)
        .await
    }

    /// Write new positions and wait estimates in one statement.
    ///
    /// Rows that already hold the target values, or that left `waiting`
    /// since they were read, are not touched. Returns the number of rows
    /// written.
    pub async fn apply_positions(
        conn: &mut PgConnection,
        updates: &[PositionUpdate],
    ) -> Result<u64, sqlx::Error> {
        if updates.is_empty() {
            return Ok(0);
        }

        let ids: Vec<DbId> = updates.iter().map(|u| u.id).collect();
        let positions: Vec<i32> = updates.iter().map(|u| u.position).collect();
        let waits: Vec<i32> = updates.iter().map(|u| u.estimated_wait_time).collect();

        let result = sqlx::query(
            "UPDATE waitlist_entries AS e SET \
                position = u.position, \
                estimated_wait_time = u.estimated_wait_time, \
                updated_at = NOW() \
             FROM UNNEST($1::bigint[], $2::int[], $3::int[]) \
                AS u(id, position, estimated_wait_time) \
             WHERE e.id = u.id \
               AND e.status_id = $4 \
               AND (e.position <> u.position OR e.estimated_wait_time <> u.estimated_wait_time)",
        )
        .bind(&ids)
        .bind(&positions)
        .bind(&waits)
        .bind(EntryStatus::Waiting.id())
        .execute(conn)
        .await?;

        Ok(result.rows_affected())
    }
}
