// Application state (AppState)

use crate::domain::directory::Directory;
use std::time::Instant;

/// Shared application state
///
/// Handed to every request handler behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Account and entry operations
    pub directory: Directory,

    /// Process start, reported by the health check
    pub started_at: Instant,
}

impl AppState {
    pub fn new(directory: Directory) -> Self {
        Self {
            directory,
            started_at: Instant::now(),
        }
    }
}
