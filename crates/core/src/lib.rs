//! Domain logic for the restaurant waitlist.
//!
//! This crate performs no IO. It holds the error taxonomy, the role model,
//! the waitlist entry state machine, position / wait-time arithmetic and
//! opening-hours evaluation, so the db and api crates share one definition
//! of every business rule.

pub mod error;
pub mod hours;
pub mod roles;
pub mod types;
pub mod waitlist;
