//! Waitlist entry model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tablewait_core::error::CoreError;
use tablewait_core::types::{DbId, Timestamp};
use tablewait_core::waitlist::{EntryStatus, QueuedEntry, StatusId};

/// A row from the `waitlist_entries` table.
///
/// Customer name, phone and email are snapshots taken at join time.
#[derive(Debug, Clone, FromRow)]
pub struct WaitlistEntry {
    pub id: DbId,
    pub restaurant_id: DbId,
    pub customer_id: DbId,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub customer_email: String,
    pub party_size: i32,
    pub notes: Option<String>,
    pub status_id: StatusId,
    pub position: i32,
    pub estimated_wait_time: i32,
    pub joined_at: Timestamp,
    pub called_at: Option<Timestamp>,
    pub seated_at: Option<Timestamp>,
    pub cancelled_at: Option<Timestamp>,
    pub no_show_at: Option<Timestamp>,
    pub cancellation_reason: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl WaitlistEntry {
    pub fn status(&self) -> Result<EntryStatus, CoreError> {
        EntryStatus::from_id(self.status_id).ok_or_else(|| {
            CoreError::Internal(format!(
                "Waitlist entry {} has unknown status id {}",
                self.id, self.status_id
            ))
        })
    }
}

/// API representation of an entry, with the status spelled out.
#[derive(Debug, Clone, Serialize)]
pub struct WaitlistEntryResponse {
    pub id: DbId,
    pub restaurant_id: DbId,
    pub customer_id: DbId,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub customer_email: String,
    pub party_size: i32,
    pub notes: Option<String>,
    pub status: Option<EntryStatus>,
    pub position: i32,
    pub estimated_wait_time: i32,
    pub joined_at: Timestamp,
    pub called_at: Option<Timestamp>,
    pub seated_at: Option<Timestamp>,
    pub cancelled_at: Option<Timestamp>,
    pub no_show_at: Option<Timestamp>,
    pub cancellation_reason: Option<String>,
}

impl From<WaitlistEntry> for WaitlistEntryResponse {
    fn from(entry: WaitlistEntry) -> Self {
        Self {
            status: EntryStatus::from_id(entry.status_id),
            id: entry.id,
            restaurant_id: entry.restaurant_id,
            customer_id: entry.customer_id,
            customer_name: entry.customer_name,
            customer_phone: entry.customer_phone,
            customer_email: entry.customer_email,
            party_size: entry.party_size,
            notes: entry.notes,
            position: entry.position,
            estimated_wait_time: entry.estimated_wait_time,
            joined_at: entry.joined_at,
            called_at: entry.called_at,
            seated_at: entry.seated_at,
            cancelled_at: entry.cancelled_at,
            no_show_at: entry.no_show_at,
            cancellation_reason: entry.cancellation_reason,
        }
    }
}

/// DTO for inserting a freshly joined entry. Status is always `waiting`.
#[derive(Debug)]
pub struct CreateWaitlistEntry {
    pub restaurant_id: DbId,
    pub customer_id: DbId,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub customer_email: String,
    pub party_size: i32,
    pub notes: Option<String>,
    pub position: i32,
    pub estimated_wait_time: i32,
}

/// DTO for a customer editing their own entry. All fields optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateWaitlistEntry {
    pub party_size: Option<i32>,
    pub notes: Option<String>,
}

/// Id, position and wait estimate of a waiting entry, read for renumbering.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct QueueSlot {
    pub id: DbId,
    pub position: i32,
    pub estimated_wait_time: i32,
}

impl From<QueueSlot> for QueuedEntry {
    fn from(slot: QueueSlot) -> Self {
        QueuedEntry {
            id: slot.id,
            position: slot.position,
            estimated_wait_time: slot.estimated_wait_time,
        }
    }
}
