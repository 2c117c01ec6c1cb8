use crate::api::backend::Backend;
use crate::core::error::DashboardError;
use crate::dashboard::inflight::InFlight;
use crate::dashboard::notice::{Notice, Notifier};
use crate::export::xlsx::export_entries;
use crate::models::entry::Entry;
use crate::models::user::{NewUser, Role, User};
use crate::session::manager::SessionManager;
use crate::utils::sync::lock;
use crate::validation::forms::validate_new_user;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// User management and the full entry table, for an admin session
pub struct AdminDashboard<B: Backend> {
    backend: B,
    notifier: Arc<dyn Notifier>,
    admin: User,
    users: Mutex<Vec<User>>,
    entries: Mutex<Vec<Entry>>,
    create_flight: InFlight,
    delete_flight: InFlight,
}

impl<B: Backend> AdminDashboard<B> {
    pub fn open(session: &SessionManager<B>) -> Result<Self, DashboardError> {
        let admin = match session.current_user() {
            Some(user) if user.role == Role::Admin => user,
            _ => return Err(DashboardError::Forbidden),
        };

        Ok(Self {
            backend: session.backend().clone(),
            notifier: session.notifier(),
            admin,
            users: Mutex::new(Vec::new()),
            entries: Mutex::new(Vec::new()),
            create_flight: InFlight::new(),
            delete_flight: InFlight::new(),
        })
    }

    pub fn admin(&self) -> &User {
        &self.admin
    }

    pub fn users(&self) -> Vec<User> {
        lock(&self.users).clone()
    }

    pub fn entries(&self) -> Vec<Entry> {
        lock(&self.entries).clone()
    }

    fn fail(&self, err: impl Into<DashboardError>) -> DashboardError {
        let err = err.into();
        self.notifier.notify(Notice::error(err.to_string()));
        err
    }

    /// Fetch every user and entry into the dashboard
    pub async fn load(&self) -> Result<(), DashboardError> {
        let users = self.backend.get_users().await.map_err(|e| self.fail(e))?;
        let entries = self.backend.get_entries().await.map_err(|e| self.fail(e))?;

        debug!(users = users.len(), entries = entries.len(), "Admin dashboard loaded");

        *lock(&self.users) = users;
        *lock(&self.entries) = entries;
        Ok(())
    }

    pub async fn create_user(&self, user: NewUser) -> Result<User, DashboardError> {
        let _flight = self.create_flight.try_begin().ok_or(DashboardError::Busy)?;

        let user = validate_new_user(user).map_err(|e| self.fail(e))?;
        let created = self.backend.create_user(user).await.map_err(|e| self.fail(e))?;

        lock(&self.users).push(created.clone());
        info!(admin_id = %self.admin.id, user_id = %created.id, "User added from dashboard");
        self.notifier.notify(Notice::success(format!(
            "New {} added successfully",
            created.role
        )));

        Ok(created)
    }

    pub async fn delete_user(&self, id: &str) -> Result<(), DashboardError> {
        let _flight = self.delete_flight.try_begin().ok_or(DashboardError::Busy)?;

        self.backend.delete_user(id).await.map_err(|e| self.fail(e))?;

        lock(&self.users).retain(|user| user.id != id);
        info!(admin_id = %self.admin.id, user_id = %id, "User removed from dashboard");
        self.notifier.notify(Notice::success("User deleted successfully"));

        Ok(())
    }

    /// Write the loaded entries to a spreadsheet. Returns the row count.
    pub fn export(&self, path: &Path) -> Result<usize, DashboardError> {
        let entries = self.entries();
        let rows = export_entries(&entries, path).map_err(|e| self.fail(e))?;
        self.notifier
            .notify(Notice::success("Data exported to Excel successfully"));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::notice::NoticeLevel;
    use crate::domain::directory::Directory;
    use crate::session::manager::RestorePolicy;
    use crate::session::storage::MemoryStorage;
    use crate::testing::{bob_entry, new_user, seeded_directory, RecordingNotifier, SlowBackend};
    use tempfile::TempDir;

    async fn admin_session(
        directory: Directory,
        notifier: Arc<RecordingNotifier>,
    ) -> SessionManager<Directory> {
        let session = SessionManager::start(
            directory,
            Box::new(MemoryStorage::new()),
            notifier,
            RestorePolicy::Trust,
        )
        .await;
        session.login("admin@x.com", "admin123").await.unwrap();
        session
    }

    #[tokio::test]
    async fn test_open_requires_admin() {
        let (directory, _, _) = seeded_directory();
        let session = SessionManager::start(
            directory,
            Box::new(MemoryStorage::new()),
            Arc::new(RecordingNotifier::default()),
            RestorePolicy::Trust,
        )
        .await;
        assert!(matches!(
            AdminDashboard::open(&session),
            Err(DashboardError::Forbidden)
        ));

        session.login("a@x.com", "p1").await.unwrap();
        assert!(matches!(
            AdminDashboard::open(&session),
            Err(DashboardError::Forbidden)
        ));
    }

    #[tokio::test]
    async fn test_load_create_and_delete() {
        let (directory, _, employee) = seeded_directory();
        directory.create_entry(bob_entry(&employee.id)).unwrap();
        let notifier = Arc::new(RecordingNotifier::default());
        let session = admin_session(directory, notifier.clone()).await;

        let dashboard = AdminDashboard::open(&session).unwrap();
        assert_eq!(dashboard.admin().email, "admin@x.com");
        dashboard.load().await.unwrap();
        assert_eq!(dashboard.users().len(), 2);
        assert_eq!(dashboard.entries().len(), 1);

        let created = dashboard
            .create_user(new_user("c@x.com", "pw", Role::Employee))
            .await
            .unwrap();
        assert_eq!(dashboard.users().last(), Some(&created));
        assert_eq!(
            notifier.last(),
            Some(Notice::success("New employee added successfully"))
        );

        dashboard.delete_user(&created.id).await.unwrap();
        assert!(dashboard.users().iter().all(|u| u.id != created.id));
        assert_eq!(notifier.last(), Some(Notice::success("User deleted successfully")));
        assert_eq!(notifier.all().len(), 3);
    }

    #[tokio::test]
    async fn test_create_duplicate_surfaces_error_notice() {
        let (directory, _, _) = seeded_directory();
        let notifier = Arc::new(RecordingNotifier::default());
        let session = admin_session(directory, notifier.clone()).await;
        let dashboard = AdminDashboard::open(&session).unwrap();
        dashboard.load().await.unwrap();

        let result = dashboard
            .create_user(new_user("a@x.com", "pw", Role::Admin))
            .await;
        assert!(matches!(result, Err(DashboardError::Domain(_))));
        assert_eq!(notifier.last().unwrap().level, NoticeLevel::Error);
        assert_eq!(dashboard.users().len(), 2);
    }

    #[tokio::test]
    async fn test_export_loaded_entries() {
        let (directory, _, employee) = seeded_directory();
        directory.create_entry(bob_entry(&employee.id)).unwrap();
        directory.create_entry(bob_entry(&employee.id)).unwrap();
        let notifier = Arc::new(RecordingNotifier::default());
        let session = admin_session(directory, notifier.clone()).await;
        let dashboard = AdminDashboard::open(&session).unwrap();
        dashboard.load().await.unwrap();

        let temp_dir = TempDir::new().unwrap();
        let rows = dashboard
            .export(&temp_dir.path().join("employee-entries.xlsx"))
            .unwrap();

        assert_eq!(rows, 2);
        assert_eq!(
            notifier.last(),
            Some(Notice::success("Data exported to Excel successfully"))
        );
    }

    #[tokio::test]
    async fn test_concurrent_create_is_refused() {
        let (directory, _, _) = seeded_directory();
        let notifier = Arc::new(RecordingNotifier::default());
        let session = SessionManager::start(
            SlowBackend(directory),
            Box::new(MemoryStorage::new()),
            notifier,
            RestorePolicy::Trust,
        )
        .await;
        session.login("admin@x.com", "admin123").await.unwrap();
        let dashboard = AdminDashboard::open(&session).unwrap();

        let (first, second) = tokio::join!(
            dashboard.create_user(new_user("c@x.com", "pw", Role::Employee)),
            dashboard.create_user(new_user("d@x.com", "pw", Role::Employee)),
        );

        assert!(first.is_ok());
        assert!(matches!(second, Err(DashboardError::Busy)));
        assert_eq!(dashboard.users().len(), 1);
    }
}
