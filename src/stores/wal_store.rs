use crate::core::error::StoreError;
use crate::models::entry::{Entry, NewEntry};
use crate::models::user::UserRecord;
use crate::stores::entry_table::EntryTable;
use crate::stores::gateway::{EntryFilter, Gateway};
use crate::stores::user_table::UserTable;
use crate::utils::ids::new_id;
use crate::wal::wal::{Wal, WalOperation};
use anyhow::Result;
use chrono::Utc;
use tracing::{debug, info, warn};

/// Gateway backed by in-memory tables, made durable by an optional write-ahead log.
///
/// Mutations are appended to the log before they touch the tables; when the
/// append fails the mutation is abandoned and reported as a connection error.
pub struct WalStore {
    users: UserTable,
    entries: EntryTable,
    wal: Option<Wal>,
}

impl WalStore {
    pub fn in_memory() -> Self {
        Self {
            users: UserTable::new(),
            entries: EntryTable::new(),
            wal: None,
        }
    }

    pub fn with_wal(wal: Wal) -> Self {
        Self {
            users: UserTable::new(),
            entries: EntryTable::new(),
            wal: Some(wal),
        }
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn wal(&self) -> Option<&Wal> {
        self.wal.as_ref()
    }

    fn log(&self, op: &WalOperation) -> Result<(), StoreError> {
        match &self.wal {
            Some(wal) => wal
                .log_operation(op)
                .map_err(|e| StoreError::Connection(format!("{:#}", e))),
            None => Ok(()),
        }
    }

    /// Apply a replayed operation without logging it again.
    /// Returns false when the operation no longer applies.
    pub fn apply(&self, op: &WalOperation) -> bool {
        match op {
            WalOperation::InsertUser { user } => {
                if self.users.reserve_email(user).is_err() {
                    return false;
                }
                self.users.insert(user.clone());
                true
            }
            WalOperation::DeleteUser { id } => self.users.remove(id).is_some(),
            WalOperation::InsertEntry { entry } => {
                self.entries.insert(entry.clone());
                true
            }
        }
    }

    /// Minimal operation list reproducing the current contents
    pub fn snapshot(&self) -> Vec<WalOperation> {
        let mut ops: Vec<WalOperation> = self
            .users
            .list()
            .into_iter()
            .map(|user| WalOperation::InsertUser {
                user: (*user).clone(),
            })
            .collect();

        let mut entries = self.entries.list_where(|_| true);
        entries.reverse();
        ops.extend(entries.into_iter().map(|entry| WalOperation::InsertEntry {
            entry: (*entry).clone(),
        }));

        ops
    }

    /// Rewrite the log so it holds only `snapshot()`
    pub fn compact(&self) -> Result<usize> {
        let Some(wal) = &self.wal else {
            return Ok(0);
        };
        let ops = self.snapshot();
        wal.rewrite(&ops)?;
        info!(path = %wal.path().display(), operations = ops.len(), "WAL rewritten");
        Ok(ops.len())
    }
}

impl Gateway for WalStore {
    fn insert_user(&self, user: UserRecord) -> Result<UserRecord, StoreError> {
        if let Err(owner) = self.users.reserve_email(&user) {
            debug!(email = %user.email, owner = %owner, "Duplicate email rejected");
            return Err(StoreError::Constraint(format!(
                "email '{}' is already registered",
                user.email
            )));
        }

        if let Err(e) = self.log(&WalOperation::InsertUser { user: user.clone() }) {
            self.users.release_email(&user.email);
            return Err(e);
        }

        Ok((*self.users.insert(user)).clone())
    }

    fn find_user(&self, id: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.get(id).map(|user| (*user).clone()))
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.get_by_email(email).map(|user| (*user).clone()))
    }

    fn list_users(&self) -> Result<Vec<UserRecord>, StoreError> {
        Ok(self
            .users
            .list()
            .into_iter()
            .map(|user| (*user).clone())
            .collect())
    }

    fn delete_user(&self, id: &str) -> Result<bool, StoreError> {
        if !self.users.contains(id) {
            return Ok(false);
        }

        self.log(&WalOperation::DeleteUser { id: id.to_string() })?;

        Ok(self.users.remove(id).is_some())
    }

    fn insert_entry(&self, entry: NewEntry) -> Result<Entry, StoreError> {
        if !self.users.contains(&entry.user_id) {
            warn!(user_id = %entry.user_id, "Entry rejected, unknown user");
            return Err(StoreError::Constraint(format!(
                "user_id '{}' does not reference an existing user",
                entry.user_id
            )));
        }

        let entry = Entry::new(new_id(), entry, Utc::now());
        self.log(&WalOperation::InsertEntry { entry: entry.clone() })?;

        Ok((*self.entries.insert(entry)).clone())
    }

    fn list_entries(&self, filter: EntryFilter<'_>) -> Result<Vec<Entry>, StoreError> {
        let rows = match filter {
            EntryFilter::All => self.entries.list_where(|_| true),
            EntryFilter::ByUser(user_id) => self.entries.list_where(|e| e.data.user_id == user_id),
        };
        Ok(rows.into_iter().map(|entry| (*entry).clone()).collect())
    }
}
