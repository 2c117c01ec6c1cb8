use crate::api::backend::Backend;
use crate::core::error::DashboardError;
use crate::dashboard::inflight::InFlight;
use crate::dashboard::notice::{Notice, Notifier};
use crate::models::entry::{Entry, NewEntry};
use crate::models::user::{Role, User};
use crate::session::manager::SessionManager;
use crate::utils::sync::lock;
use crate::validation::forms::validate_new_entry;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Draft of the entry form, every field free text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryForm {
    pub name: String,
    pub serial_numbers: String,
    pub id_number: String,
    pub phone_number: String,
    pub van_shop: String,
    pub allocation_date: String,
    pub location: String,
}

impl EntryForm {
    fn into_new_entry(self, user_id: &str) -> NewEntry {
        NewEntry {
            user_id: user_id.to_string(),
            name: self.name,
            serial_numbers: self.serial_numbers,
            id_number: self.id_number,
            phone_number: self.phone_number,
            van_shop: self.van_shop,
            allocation_date: self.allocation_date,
            location: self.location,
        }
    }
}

/// Entry submission and history, for an employee session
pub struct EmployeeDashboard<B: Backend> {
    backend: B,
    notifier: Arc<dyn Notifier>,
    employee: User,
    draft: Mutex<EntryForm>,
    entries: Mutex<Vec<Entry>>,
    submit_flight: InFlight,
}

impl<B: Backend> EmployeeDashboard<B> {
    pub fn open(session: &SessionManager<B>) -> Result<Self, DashboardError> {
        let employee = match session.current_user() {
            Some(user) if user.role == Role::Employee => user,
            _ => return Err(DashboardError::Forbidden),
        };

        Ok(Self {
            backend: session.backend().clone(),
            notifier: session.notifier(),
            employee,
            draft: Mutex::new(EntryForm::default()),
            entries: Mutex::new(Vec::new()),
            submit_flight: InFlight::new(),
        })
    }

    pub fn employee(&self) -> &User {
        &self.employee
    }

    pub fn draft(&self) -> EntryForm {
        lock(&self.draft).clone()
    }

    pub fn edit<F>(&self, change: F)
    where
        F: FnOnce(&mut EntryForm),
    {
        change(&mut *lock(&self.draft));
    }

    /// Entries shown in the history list, newest first
    pub fn entries(&self) -> Vec<Entry> {
        lock(&self.entries).clone()
    }

    fn fail(&self, err: impl Into<DashboardError>) -> DashboardError {
        let err = err.into();
        self.notifier.notify(Notice::error(err.to_string()));
        err
    }

    /// Replace the history with this employee's persisted entries
    pub async fn load_history(&self) -> Result<(), DashboardError> {
        let entries = self
            .backend
            .get_user_entries(&self.employee.id)
            .await
            .map_err(|e| self.fail(e))?;

        debug!(user_id = %self.employee.id, entries = entries.len(), "Entry history loaded");
        *lock(&self.entries) = entries;
        Ok(())
    }

    /// Send the draft. Blank fields are rejected before any request is made.
    pub async fn submit(&self) -> Result<Entry, DashboardError> {
        let _flight = self.submit_flight.try_begin().ok_or(DashboardError::Busy)?;

        let new_entry = self.draft().into_new_entry(&self.employee.id);
        validate_new_entry(&new_entry).map_err(|e| self.fail(e))?;

        let entry = self
            .backend
            .create_entry(new_entry)
            .await
            .map_err(|e| self.fail(e))?;

        lock(&self.entries).insert(0, entry.clone());
        *lock(&self.draft) = EntryForm::default();

        info!(user_id = %self.employee.id, entry_id = %entry.id, "Entry submitted");
        self.notifier.notify(Notice::success("Data submitted successfully"));

        Ok(entry)
    }
}
