use crate::core::error::DomainError;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock, recovering the data if a previous holder panicked
pub fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Run CPU-heavy domain work (password hashing) off the async workers
pub async fn blocking<F, T>(work: F) -> Result<T, DomainError>
where
    F: FnOnce() -> Result<T, DomainError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| DomainError::Internal(format!("Blocking task failed: {}", e)))?
}
