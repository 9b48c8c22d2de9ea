//! Waitlist queue rules: entry state machine, position and wait-time
//! arithmetic, and renumber planning.
//!
//! Ordering ground truth is always `joined_at` (then `id`). Stored positions
//! are a denormalized cache and are never trusted to decide order.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Rejection};
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const MIN_PARTY_SIZE: i32 = 1;
pub const MAX_PARTY_SIZE: i32 = 50;
pub const MAX_NOTES_LEN: usize = 500;

/// A customer may hold one active entry per restaurant within this window.
pub const DUPLICATE_WINDOW_HOURS: i64 = 24;

pub const DEFAULT_CANCELLATION_REASON: &str = "Customer cancelled";

// ---------------------------------------------------------------------------
// Entry status
// ---------------------------------------------------------------------------

/// Status id type matching SMALLINT in the database.
pub type StatusId = i16;

/// Waitlist entry status. Discriminants match the `entry_statuses` seed data.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Waiting = 1,
    Called = 2,
    Seated = 3,
    Cancelled = 4,
    #[serde(rename = "no-show")]
    NoShow = 5,
}

impl EntryStatus {
    pub fn id(self) -> StatusId {
        self as StatusId
    }

    pub fn from_id(id: StatusId) -> Option<Self> {
        match id {
            1 => Some(EntryStatus::Waiting),
            2 => Some(EntryStatus::Called),
            3 => Some(EntryStatus::Seated),
            4 => Some(EntryStatus::Cancelled),
            5 => Some(EntryStatus::NoShow),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntryStatus::Waiting => "waiting",
            EntryStatus::Called => "called",
            EntryStatus::Seated => "seated",
            EntryStatus::Cancelled => "cancelled",
            EntryStatus::NoShow => "no-show",
        }
    }

    /// Waiting or called: the entry still holds a place in the queue.
    pub fn is_active(self) -> bool {
        matches!(self, EntryStatus::Waiting | EntryStatus::Called)
    }

    pub fn is_terminal(self) -> bool {
        !self.is_active()
    }
}

impl From<EntryStatus> for StatusId {
    fn from(value: EntryStatus) -> Self {
        value as StatusId
    }
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// An operation that moves an entry between statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryAction {
    Call,
    Seat,
    NoShow,
    Cancel,
}

impl EntryAction {
    pub fn target(self) -> EntryStatus {
        match self {
            EntryAction::Call => EntryStatus::Called,
            EntryAction::Seat => EntryStatus::Seated,
            EntryAction::NoShow => EntryStatus::NoShow,
            EntryAction::Cancel => EntryStatus::Cancelled,
        }
    }

    /// Whether applying this action removes the entry from the waiting pool
    /// and therefore requires the restaurant's positions to be renumbered.
    ///
    /// Calling keeps the entry's slot; every other action frees it.
    pub fn leaves_waiting_pool(self) -> bool {
        !matches!(self, EntryAction::Call)
    }
}

/// Validate `action` against the entry's current status and return the
/// status it moves to.
pub fn transition(from: EntryStatus, action: EntryAction) -> Result<EntryStatus, CoreError> {
    use EntryAction as A;
    use EntryStatus as S;

    let allowed = match action {
        A::Call => from == S::Waiting,
        A::Seat | A::NoShow => from == S::Called,
        A::Cancel => from.is_active(),
    };
    if allowed {
        return Ok(action.target());
    }

    let message = match (action, from) {
        (A::Cancel, S::Seated) => "Entry has already been seated and cannot be cancelled".into(),
        (A::Cancel, S::NoShow) => {
            "Entry was marked as a no-show and cannot be cancelled".into()
        }
        (A::Cancel, _) => "Entry is already cancelled".into(),
        (A::Call, _) => format!("Only waiting entries can be called (current status: {from})"),
        (A::Seat, _) => format!("Only called entries can be seated (current status: {from})"),
        (A::NoShow, _) => {
            format!("Only called entries can be marked as no-show (current status: {from})")
        }
    };
    Err(Rejection::InvalidTransition(message).into())
}

// ---------------------------------------------------------------------------
// Join rules
// ---------------------------------------------------------------------------

pub fn validate_party_size(party_size: i32) -> Result<(), CoreError> {
    if !(MIN_PARTY_SIZE..=MAX_PARTY_SIZE).contains(&party_size) {
        return Err(CoreError::Validation(format!(
            "party_size must be between {MIN_PARTY_SIZE} and {MAX_PARTY_SIZE}"
        )));
    }
    Ok(())
}

pub fn validate_notes(notes: Option<&str>) -> Result<(), CoreError> {
    match notes {
        Some(n) if n.chars().count() > MAX_NOTES_LEN => Err(CoreError::Validation(format!(
            "notes must be at most {MAX_NOTES_LEN} characters"
        ))),
        _ => Ok(()),
    }
}

/// Reject a join when the waiting pool is already at capacity.
pub fn check_capacity(waiting_count: i64, max_capacity: i32) -> Result<(), CoreError> {
    if waiting_count >= i64::from(max_capacity) {
        return Err(Rejection::Full { max_capacity }.into());
    }
    Ok(())
}

/// Position a newly joined entry takes at the back of the queue.
pub fn next_position(waiting_count: i64) -> i32 {
    i32::try_from(waiting_count).unwrap_or(i32::MAX - 1) + 1
}

/// Linear wait estimate in minutes.
pub fn estimated_wait_minutes(position: i32, per_customer_minutes: i32) -> i32 {
    position.saturating_mul(per_customer_minutes)
}

/// Trimmed caller-supplied reason, or the default when absent or blank.
pub fn cancellation_reason(reason: Option<&str>) -> String {
    reason
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or(DEFAULT_CANCELLATION_REASON)
        .to_string()
}

// ---------------------------------------------------------------------------
// Renumbering
// ---------------------------------------------------------------------------

/// A waiting entry as currently stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueuedEntry {
    pub id: DbId,
    pub position: i32,
    pub estimated_wait_time: i32,
}

/// A write needed to bring one entry back in line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionUpdate {
    pub id: DbId,
    pub position: i32,
    pub estimated_wait_time: i32,
}

/// Compute the writes that make `ordered` dense (1..N) with fresh wait times.
///
/// `ordered` must already be sorted by `joined_at` ascending. Entries whose
/// stored values are already correct produce no update, so planning against
/// an up-to-date queue yields an empty plan.
pub fn plan_renumber(ordered: &[QueuedEntry], per_customer_minutes: i32) -> Vec<PositionUpdate> {
    ordered
        .iter()
        .zip(1..)
        .filter_map(|(entry, position)| {
            let estimated_wait_time = estimated_wait_minutes(position, per_customer_minutes);
            let stale = entry.position != position
                || entry.estimated_wait_time != estimated_wait_time;
            stale.then_some(PositionUpdate {
                id: entry.id,
                position,
                estimated_wait_time,
            })
        })
        .collect()
}
