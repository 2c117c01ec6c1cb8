use crate::core::error::StoreError;
use crate::models::entry::{Entry, NewEntry};
use crate::models::user::UserRecord;

/// Which entries a listing returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryFilter<'a> {
    All,
    ByUser(&'a str),
}

/// Typed access to the `users` and `entries` relations.
///
/// Every operation takes its inputs as values, never as statement text, so
/// nothing a caller passes can change the shape of a query. Implementations
/// report an unreachable backend as `StoreError::Connection` and a broken
/// uniqueness or reference rule as `StoreError::Constraint`.
pub trait Gateway: Send + Sync {
    /// Store a fully formed account. Emails are unique.
    fn insert_user(&self, user: UserRecord) -> Result<UserRecord, StoreError>;

    fn find_user(&self, id: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Exact, case-sensitive lookup
    fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    /// All accounts in insertion order
    fn list_users(&self) -> Result<Vec<UserRecord>, StoreError>;

    /// Returns whether a row was removed
    fn delete_user(&self, id: &str) -> Result<bool, StoreError>;

    /// Assigns `id` and `created_at`. `user_id` must name an existing account.
    fn insert_entry(&self, entry: NewEntry) -> Result<Entry, StoreError>;

    /// Newest first
    fn list_entries(&self, filter: EntryFilter<'_>) -> Result<Vec<Entry>, StoreError>;
}
