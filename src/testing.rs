// Shared fixtures for unit tests

use crate::api::backend::Backend;
use crate::core::error::DomainError;
use crate::dashboard::notice::{Notice, Notifier};
use crate::domain::directory::Directory;
use crate::models::entry::{Entry, NewEntry};
use crate::models::user::{NewUser, Role, User};
use crate::security::password::PasswordHasher;
use crate::stores::wal_store::WalStore;
use std::sync::{Arc, Mutex};

pub fn directory() -> Directory {
    Directory::new(Arc::new(WalStore::in_memory()), PasswordHasher::new(10))
}

pub fn new_user(email: &str, password: &str, role: Role) -> NewUser {
    NewUser {
        email: email.to_string(),
        password: password.to_string(),
        name: email.split('@').next().unwrap_or("user").to_uppercase(),
        role,
    }
}

/// Directory holding `admin@x.com`/`admin123` and `a@x.com`/`p1`
pub fn seeded_directory() -> (Directory, User, User) {
    let dir = directory();
    let admin = dir
        .create_user(new_user("admin@x.com", "admin123", Role::Admin))
        .unwrap();
    let employee = dir
        .create_user(new_user("a@x.com", "p1", Role::Employee))
        .unwrap();
    (dir, admin, employee)
}

pub fn bob_entry(user_id: &str) -> NewEntry {
    NewEntry {
        user_id: user_id.to_string(),
        name: "Bob".to_string(),
        serial_numbers: "SN1\nSN2".to_string(),
        id_number: "ID1".to_string(),
        phone_number: "555".to_string(),
        van_shop: "Van3".to_string(),
        allocation_date: "2024-01-01".to_string(),
        location: "Depot".to_string(),
    }
}

/// Notifier that keeps every notice for later assertions
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn all(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<Notice> {
        self.notices.lock().unwrap().last().cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

/// Directory backend that yields to the scheduler before each call,
/// so concurrent callers observe each other's pending requests
#[derive(Clone)]
pub struct SlowBackend(pub Directory);

impl Backend for SlowBackend {
    async fn login_user(&self, email: &str, password: &str) -> Result<User, DomainError> {
        tokio::task::yield_now().await;
        self.0.login_user(email, password)
    }

    async fn create_user(&self, user: NewUser) -> Result<User, DomainError> {
        tokio::task::yield_now().await;
        self.0.create_user(user)
    }

    async fn get_users(&self) -> Result<Vec<User>, DomainError> {
        tokio::task::yield_now().await;
        self.0.get_users()
    }

    async fn delete_user(&self, id: &str) -> Result<(), DomainError> {
        tokio::task::yield_now().await;
        self.0.delete_user(id)
    }

    async fn create_entry(&self, entry: NewEntry) -> Result<Entry, DomainError> {
        tokio::task::yield_now().await;
        self.0.create_entry(entry)
    }

    async fn get_entries(&self) -> Result<Vec<Entry>, DomainError> {
        tokio::task::yield_now().await;
        self.0.get_entries()
    }

    async fn get_user_entries(&self, user_id: &str) -> Result<Vec<Entry>, DomainError> {
        tokio::task::yield_now().await;
        self.0.get_user_entries(user_id)
    }
}
