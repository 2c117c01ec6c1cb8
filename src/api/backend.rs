use crate::core::error::DomainError;
use crate::domain::directory::Directory;
use crate::models::entry::{Entry, NewEntry};
use crate::models::user::{NewUser, User};
use std::future::Future;

/// The domain operations as seen from a client
pub trait Backend: Clone + Send + Sync + 'static {
    fn login_user(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<User, DomainError>> + Send;

    fn create_user(&self, user: NewUser) -> impl Future<Output = Result<User, DomainError>> + Send;

    fn get_users(&self) -> impl Future<Output = Result<Vec<User>, DomainError>> + Send;

    fn delete_user(&self, id: &str) -> impl Future<Output = Result<(), DomainError>> + Send;

    fn create_entry(
        &self,
        entry: NewEntry,
    ) -> impl Future<Output = Result<Entry, DomainError>> + Send;

    fn get_entries(&self) -> impl Future<Output = Result<Vec<Entry>, DomainError>> + Send;

    fn get_user_entries(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<Entry>, DomainError>> + Send;
}

/// In-process backend: calls the directory without a network hop
impl Backend for Directory {
    async fn login_user(&self, email: &str, password: &str) -> Result<User, DomainError> {
        Directory::login_user(self, email, password)
    }

    async fn create_user(&self, user: NewUser) -> Result<User, DomainError> {
        Directory::create_user(self, user)
    }

    async fn get_users(&self) -> Result<Vec<User>, DomainError> {
        Directory::get_users(self)
    }

    async fn delete_user(&self, id: &str) -> Result<(), DomainError> {
        Directory::delete_user(self, id)
    }

    async fn create_entry(&self, entry: NewEntry) -> Result<Entry, DomainError> {
        Directory::create_entry(self, entry)
    }

    async fn get_entries(&self) -> Result<Vec<Entry>, DomainError> {
        Directory::get_entries(self)
    }

    async fn get_user_entries(&self, user_id: &str) -> Result<Vec<Entry>, DomainError> {
        Directory::get_user_entries(self, user_id)
    }
}
