//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` (or a `&mut PgConnection` when the call must join an
//! open transaction) as the first argument.

pub mod restaurant_repo;
pub mod user_repo;
pub mod waitlist_entry_repo;

pub use restaurant_repo::RestaurantRepo;
pub use user_repo::UserRepo;
pub use waitlist_entry_repo::WaitlistEntryRepo;
