use std::sync::Arc;

use crate::config::ServerConfig;
use crate::engine::waitlist_queue::WaitlistQueue;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: tablewait_db::DbPool,
    /// Server configuration (JWT settings are read by the auth extractor).
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Waitlist engine bound to this state's pool.
    pub fn queue(&self) -> WaitlistQueue<'_> {
        WaitlistQueue::new(&self.pool)
    }
}
