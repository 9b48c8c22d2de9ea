use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Rejected: {0}")]
    Rejected(Rejection),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// A business-rule refusal.
///
/// Each variant maps to its own machine-readable code so clients can tell a
/// full waitlist from a closed restaurant without parsing the message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("The restaurant is currently closed")]
    Closed,

    #[error("The waitlist is full ({max_capacity} parties waiting)")]
    Full { max_capacity: i32 },

    #[error("You already have an active entry on this waitlist")]
    Duplicate,

    #[error("{0}")]
    InvalidTransition(String),
}

impl Rejection {
    /// Stable error code reported in API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::Closed => "RESTAURANT_CLOSED",
            Rejection::Full { .. } => "WAITLIST_FULL",
            Rejection::Duplicate => "DUPLICATE_ENTRY",
            Rejection::InvalidTransition(_) => "INVALID_TRANSITION",
        }
    }
}

impl From<Rejection> for CoreError {
    fn from(value: Rejection) -> Self {
        CoreError::Rejected(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_codes_are_distinct() {
        let codes = [
            Rejection::Closed.code(),
            Rejection::Full { max_capacity: 1 }.code(),
            Rejection::Duplicate.code(),
            Rejection::InvalidTransition(String::new()).code(),
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn full_message_includes_capacity() {
        let msg = Rejection::Full { max_capacity: 12 }.to_string();
        assert!(msg.contains("12"));
    }

    #[test]
    fn rejection_converts_into_core_error() {
        let err: CoreError = Rejection::Duplicate.into();
        assert!(matches!(err, CoreError::Rejected(Rejection::Duplicate)));
    }
}
