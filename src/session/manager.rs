use crate::api::backend::Backend;
use crate::core::error::{DomainError, SessionError};
use crate::dashboard::notice::{Notice, Notifier};
use crate::models::user::{Role, User};
use crate::session::storage::Storage;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// Storage key holding the serialized session user
pub const SESSION_KEY: &str = "user";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated(User),
}

impl SessionState {
    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::Anonymous => None,
            SessionState::Authenticated(user) => Some(user),
        }
    }
}

/// Where the shell should navigate after a session transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Login,
    Admin,
    Employee,
}

impl Destination {
    pub fn home(role: Role) -> Self {
        match role {
            Role::Admin => Destination::Admin,
            Role::Employee => Destination::Employee,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Destination::Login => "/login",
            Destination::Admin => "/admin",
            Destination::Employee => "/employee",
        }
    }
}

/// How a stored snapshot is treated at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestorePolicy {
    /// Accept the snapshot as is
    Trust,
    /// Keep it only if the backend still lists the same account
    #[default]
    Revalidate,
}

/// Owns the current session. Mutated only through `login` and `logout`.
pub struct SessionManager<B: Backend> {
    backend: B,
    storage: Box<dyn Storage>,
    notifier: Arc<dyn Notifier>,
    state: RwLock<SessionState>,
}

impl<B: Backend> SessionManager<B> {
    /// Create the manager and restore any stored snapshot
    pub async fn start(
        backend: B,
        storage: Box<dyn Storage>,
        notifier: Arc<dyn Notifier>,
        policy: RestorePolicy,
    ) -> Self {
        let manager = Self {
            backend,
            storage,
            notifier,
            state: RwLock::new(SessionState::Anonymous),
        };
        let restored = manager.restore(policy).await;
        manager.set_state(restored);
        manager
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn notifier(&self) -> Arc<dyn Notifier> {
        Arc::clone(&self.notifier)
    }

    pub fn state(&self) -> SessionState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state().user().cloned()
    }

    fn set_state(&self, state: SessionState) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = state;
    }

    async fn restore(&self, policy: RestorePolicy) -> SessionState {
        let raw = match self.storage.get(SESSION_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return SessionState::Anonymous,
            Err(e) => {
                warn!(error = %format!("{:#}", e), "Session storage unreadable, starting anonymous");
                return SessionState::Anonymous;
            }
        };

        let user: User = match serde_json::from_str(&raw) {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "Discarding malformed session snapshot");
                self.clear_snapshot();
                return SessionState::Anonymous;
            }
        };

        if policy == RestorePolicy::Trust {
            debug!(user_id = %user.id, "Session restored without revalidation");
            return SessionState::Authenticated(user);
        }

        match self.backend.get_users().await {
            Ok(users) => {
                let still_valid = users
                    .iter()
                    .any(|u| u.id == user.id && u.email == user.email && u.role == user.role);
                if still_valid {
                    info!(user_id = %user.id, role = %user.role, "Session restored");
                    SessionState::Authenticated(user)
                } else {
                    info!(user_id = %user.id, "Stored session no longer matches an account, discarding");
                    self.clear_snapshot();
                    SessionState::Anonymous
                }
            }
            Err(e) => {
                warn!(
                    user_id = %user.id,
                    error = %e,
                    "Could not revalidate session, keeping stored snapshot"
                );
                SessionState::Authenticated(user)
            }
        }
    }

    fn clear_snapshot(&self) {
        if let Err(e) = self.storage.remove(SESSION_KEY) {
            warn!(error = %format!("{:#}", e), "Failed to clear session snapshot");
        }
    }

    /// Authenticate and persist the snapshot. On failure the state is unchanged.
    pub async fn login(&self, email: &str, password: &str) -> Result<Destination, SessionError> {
        let user = match self.backend.login_user(email, password).await {
            Ok(user) => user,
            Err(e) => {
                self.notifier.notify(Notice::error(login_failure_message(&e)));
                return Err(e.into());
            }
        };

        let snapshot = serde_json::to_string(&user)
            .map_err(|e| SessionError::Storage(e.to_string()))?;
        if let Err(e) = self.storage.set(SESSION_KEY, &snapshot) {
            let err = SessionError::Storage(format!("{:#}", e));
            self.notifier.notify(Notice::error(err.to_string()));
            return Err(err);
        }

        let destination = Destination::home(user.role);
        info!(user_id = %user.id, role = %user.role, "Session started");
        self.set_state(SessionState::Authenticated(user));
        self.notifier.notify(Notice::success("Logged in successfully"));

        Ok(destination)
    }

    pub fn logout(&self) -> Result<Destination, SessionError> {
        let user = self.current_user().ok_or(SessionError::NotAuthenticated)?;

        self.storage
            .remove(SESSION_KEY)
            .map_err(|e| SessionError::Storage(format!("{:#}", e)))?;

        info!(user_id = %user.id, "Session ended");
        self.set_state(SessionState::Anonymous);
        self.notifier.notify(Notice::success("Logged out successfully"));

        Ok(Destination::Login)
    }
}

fn login_failure_message(err: &DomainError) -> String {
    match err {
        DomainError::InvalidCredentials => "Invalid email or password".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::notice::NoticeLevel;
    use crate::session::storage::{FileStorage, MemoryStorage};
    use crate::testing::{seeded_directory, RecordingNotifier};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_login_routes_by_role_and_persists() {
        let (directory, admin, _) = seeded_directory();
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        let notifier = Arc::new(RecordingNotifier::default());

        let session = SessionManager::start(
            directory.clone(),
            Box::new(FileStorage::new(path.clone())),
            notifier.clone(),
            RestorePolicy::Revalidate,
        )
        .await;
        assert_eq!(session.state(), SessionState::Anonymous);

        let destination = session.login("admin@x.com", "admin123").await.unwrap();
        assert_eq!(destination, Destination::Admin);
        assert_eq!(destination.path(), "/admin");
        assert_eq!(session.current_user(), Some(admin.clone()));
        assert_eq!(notifier.last(), Some(Notice::success("Logged in successfully")));

        let stored = FileStorage::new(path).get(SESSION_KEY).unwrap().unwrap();
        let stored: User = serde_json::from_str(&stored).unwrap();
        assert_eq!(stored, admin);
    }

    #[tokio::test]
    async fn test_failed_login_keeps_anonymous() {
        let (directory, _, _) = seeded_directory();
        let notifier = Arc::new(RecordingNotifier::default());
        let session = SessionManager::start(
            directory,
            Box::new(MemoryStorage::new()),
            notifier.clone(),
            RestorePolicy::Trust,
        )
        .await;

        let err = session.login("a@x.com", "wrong").await.unwrap_err();
        assert!(matches!(err, SessionError::Domain(DomainError::InvalidCredentials)));
        assert_eq!(session.state(), SessionState::Anonymous);
        assert_eq!(notifier.last().unwrap().level, NoticeLevel::Error);
    }

    #[tokio::test]
    async fn test_logout_clears_snapshot() {
        let (directory, _, _) = seeded_directory();
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        let notifier = Arc::new(RecordingNotifier::default());

        let session = SessionManager::start(
            directory.clone(),
            Box::new(FileStorage::new(path.clone())),
            notifier.clone(),
            RestorePolicy::Trust,
        )
        .await;
        assert_eq!(session.login("a@x.com", "p1").await.unwrap(), Destination::Employee);

        assert_eq!(session.logout().unwrap(), Destination::Login);
        assert_eq!(session.state(), SessionState::Anonymous);
        assert_eq!(notifier.last(), Some(Notice::success("Logged out successfully")));
        assert!(matches!(session.logout(), Err(SessionError::NotAuthenticated)));

        let restarted = SessionManager::start(
            directory,
            Box::new(FileStorage::new(path)),
            notifier,
            RestorePolicy::Trust,
        )
        .await;
        assert_eq!(restarted.state(), SessionState::Anonymous);
    }

    #[tokio::test]
    async fn test_restore_after_restart() {
        let (directory, _, employee) = seeded_directory();
        let storage = MemoryStorage::new();
        storage
            .set(SESSION_KEY, &serde_json::to_string(&employee).unwrap())
            .unwrap();

        let session = SessionManager::start(
            directory,
            Box::new(storage),
            Arc::new(RecordingNotifier::default()),
            RestorePolicy::Revalidate,
        )
        .await;

        assert_eq!(session.state(), SessionState::Authenticated(employee));
    }

    #[tokio::test]
    async fn test_revalidate_drops_deleted_user() {
        let (directory, _, employee) = seeded_directory();
        let storage = MemoryStorage::new();
        storage
            .set(SESSION_KEY, &serde_json::to_string(&employee).unwrap())
            .unwrap();
        directory.delete_user(&employee.id).unwrap();

        let session = SessionManager::start(
            directory.clone(),
            Box::new(storage),
            Arc::new(RecordingNotifier::default()),
            RestorePolicy::Revalidate,
        )
        .await;
        assert_eq!(session.state(), SessionState::Anonymous);
    }

    #[tokio::test]
    async fn test_trust_keeps_deleted_user() {
        let (directory, _, employee) = seeded_directory();
        let storage = MemoryStorage::new();
        storage
            .set(SESSION_KEY, &serde_json::to_string(&employee).unwrap())
            .unwrap();
        directory.delete_user(&employee.id).unwrap();

        let session = SessionManager::start(
            directory,
            Box::new(storage),
            Arc::new(RecordingNotifier::default()),
            RestorePolicy::Trust,
        )
        .await;
        assert_eq!(session.state(), SessionState::Authenticated(employee));
    }

    #[tokio::test]
    async fn test_malformed_snapshot_is_discarded() {
        let (directory, _, _) = seeded_directory();
        let storage = MemoryStorage::new();
        storage.set(SESSION_KEY, "{\"id\":").unwrap();

        let session = SessionManager::start(
            directory,
            Box::new(storage),
            Arc::new(RecordingNotifier::default()),
            RestorePolicy::Trust,
        )
        .await;
        assert_eq!(session.state(), SessionState::Anonymous);
    }

    #[tokio::test]
    async fn test_revalidate_offline_keeps_snapshot() {
        use crate::api::client::ApiClient;
        use std::time::Duration;

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = ApiClient::new(format!("http://{}/api", addr), Duration::from_secs(2)).unwrap();

        let (_, _, employee) = seeded_directory();
        let storage = MemoryStorage::new();
        storage
            .set(SESSION_KEY, &serde_json::to_string(&employee).unwrap())
            .unwrap();

        let session = SessionManager::start(
            client,
            Box::new(storage),
            Arc::new(RecordingNotifier::default()),
            RestorePolicy::Revalidate,
        )
        .await;
        assert_eq!(session.state(), SessionState::Authenticated(employee));
    }

    #[test]
    fn test_destination_paths() {
        assert_eq!(Destination::home(Role::Admin).path(), "/admin");
        assert_eq!(Destination::home(Role::Employee).path(), "/employee");
        assert_eq!(Destination::Login.path(), "/login");
    }
}
