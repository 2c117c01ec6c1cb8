use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Allocation fields submitted by an employee
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEntry {
    pub user_id: String,
    pub name: String,
    /// Newline-separated device serials
    pub serial_numbers: String,
    pub id_number: String,
    pub phone_number: String,
    pub van_shop: String,
    pub allocation_date: String,
    pub location: String,
}

/// One equipment-allocation record. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    #[serde(flatten)]
    pub data: NewEntry,
    pub created_at: DateTime<Utc>,
}

impl Entry {
    pub fn new(id: String, data: NewEntry, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            data,
            created_at,
        }
    }

    pub fn serials(&self) -> impl Iterator<Item = &str> {
        self.data
            .serial_numbers
            .lines()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}
