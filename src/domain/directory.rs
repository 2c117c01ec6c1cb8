use crate::core::error::DomainError;
use crate::models::entry::{Entry, NewEntry};
use crate::models::user::{NewUser, User, UserRecord};
use crate::security::password::{self, PasswordHasher};
use crate::stores::gateway::{EntryFilter, Gateway};
use crate::utils::ids::new_id;
use crate::validation::forms::{validate_new_entry, validate_new_user};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The account and entry operations, on top of any `Gateway`
#[derive(Clone)]
pub struct Directory {
    gateway: Arc<dyn Gateway>,
    hasher: PasswordHasher,
}

impl Directory {
    pub fn new(gateway: Arc<dyn Gateway>, hasher: PasswordHasher) -> Self {
        Self { gateway, hasher }
    }

    /// Resolve credentials to the matching account's public fields
    pub fn login_user(&self, email: &str, password: &str) -> Result<User, DomainError> {
        debug!(email = %email, "Login attempt");

        let Some(record) = self.gateway.find_user_by_email(email)? else {
            warn!(email = %email, "Login failed, unknown email");
            return Err(DomainError::InvalidCredentials);
        };

        if !password::verify(password, &record.password_hash) {
            warn!(email = %email, "Login failed, wrong password");
            return Err(DomainError::InvalidCredentials);
        }

        info!(user_id = %record.id, role = %record.role, "User logged in");
        Ok(record.to_public())
    }

    pub fn create_user(&self, user: NewUser) -> Result<User, DomainError> {
        let user = validate_new_user(user)?;

        let record = UserRecord {
            id: new_id(),
            email: user.email,
            password_hash: self.hasher.hash(&user.password),
            name: user.name,
            role: user.role,
        };

        let stored = self.gateway.insert_user(record)?;

        info!(
            user_id = %stored.id,
            email = %stored.email,
            role = %stored.role,
            "User created"
        );

        Ok(stored.to_public())
    }

    pub fn get_users(&self) -> Result<Vec<User>, DomainError> {
        Ok(self
            .gateway
            .list_users()?
            .iter()
            .map(UserRecord::to_public)
            .collect())
    }

    /// Removing an id that does not exist is not an error
    pub fn delete_user(&self, id: &str) -> Result<(), DomainError> {
        if self.gateway.delete_user(id)? {
            info!(user_id = %id, "User deleted");
        } else {
            debug!(user_id = %id, "Delete for unknown user ignored");
        }
        Ok(())
    }

    pub fn create_entry(&self, entry: NewEntry) -> Result<Entry, DomainError> {
        validate_new_entry(&entry)?;

        let stored = self.gateway.insert_entry(entry)?;

        info!(
            entry_id = %stored.id,
            user_id = %stored.data.user_id,
            "Entry created"
        );

        Ok(stored)
    }

    pub fn get_entries(&self) -> Result<Vec<Entry>, DomainError> {
        Ok(self.gateway.list_entries(EntryFilter::All)?)
    }

    pub fn get_user_entries(&self, user_id: &str) -> Result<Vec<Entry>, DomainError> {
        Ok(self.gateway.list_entries(EntryFilter::ByUser(user_id))?)
    }

    /// Create the account unless the email is already registered.
    /// Returns whether a new account was made.
    pub fn ensure_user(&self, user: NewUser) -> Result<bool, DomainError> {
        if self.gateway.find_user_by_email(user.email.trim())?.is_some() {
            return Ok(false);
        }
        self.create_user(user)?;
        Ok(true)
    }
}
