use crate::models::user::UserRecord;
use dashmap::mapref::entry::Entry as MapEntry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

struct Row {
    seq: u64,
    user: Arc<UserRecord>,
}

/// In-memory `users` relation with a unique email index
pub struct UserTable {
    users: DashMap<String, Row>,
    emails: DashMap<String, String>,
    next_seq: AtomicU64,
}

impl UserTable {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            emails: DashMap::new(),
            next_seq: AtomicU64::new(0),
        }
    }

    /// Claim the email for `user.id`. Fails with the current owner's id when taken.
    pub fn reserve_email(&self, user: &UserRecord) -> Result<(), String> {
        match self.emails.entry(user.email.clone()) {
            MapEntry::Occupied(owner) => Err(owner.get().clone()),
            MapEntry::Vacant(slot) => {
                slot.insert(user.id.clone());
                Ok(())
            }
        }
    }

    pub fn release_email(&self, email: &str) {
        self.emails.remove(email);
    }

    /// Insert a user whose email has already been reserved
    pub fn insert(&self, user: UserRecord) -> Arc<UserRecord> {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let user = Arc::new(user);
        self.users.insert(
            user.id.clone(),
            Row {
                seq,
                user: Arc::clone(&user),
            },
        );
        user
    }

    /// Remove by id, freeing the email. Returns the removed user if it existed.
    pub fn remove(&self, id: &str) -> Option<Arc<UserRecord>> {
        let (_, row) = self.users.remove(id)?;
        self.emails.remove_if(&row.user.email, |_, owner| owner == id);
        Some(row.user)
    }

    pub fn get(&self, id: &str) -> Option<Arc<UserRecord>> {
        self.users.get(id).map(|row| Arc::clone(&row.user))
    }

    pub fn get_by_email(&self, email: &str) -> Option<Arc<UserRecord>> {
        let id = self.emails.get(email)?.value().clone();
        self.get(&id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.users.contains_key(id)
    }

    /// Snapshot in insertion order
    pub fn list(&self) -> Vec<Arc<UserRecord>> {
        let mut rows: Vec<(u64, Arc<UserRecord>)> = self
            .users
            .iter()
            .map(|row| (row.seq, Arc::clone(&row.user)))
            .collect();
        rows.sort_by_key(|(seq, _)| *seq);
        rows.into_iter().map(|(_, user)| user).collect()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl Default for UserTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;

    fn user(id: &str, email: &str) -> UserRecord {
        UserRecord {
            id: id.to_string(),
            email: email.to_string(),
            password_hash: String::new(),
            name: id.to_uppercase(),
            role: Role::Employee,
        }
    }

    #[test]
    fn test_email_reservation_is_exclusive() {
        let table = UserTable::new();
        let first = user("u1", "a@x.com");
        let second = user("u2", "a@x.com");

        assert!(table.reserve_email(&first).is_ok());
        assert_eq!(table.reserve_email(&second), Err("u1".to_string()));
    }

    #[test]
    fn test_remove_frees_email() {
        let table = UserTable::new();
        let u = user("u1", "a@x.com");
        table.reserve_email(&u).unwrap();
        table.insert(u);

        assert!(table.remove("u1").is_some());
        assert!(table.get_by_email("a@x.com").is_none());
        assert!(table.reserve_email(&user("u2", "a@x.com")).is_ok());
        assert!(table.remove("u1").is_none());
    }

    #[test]
    fn test_list_keeps_insertion_order() {
        let table = UserTable::new();
        for (id, email) in [("c", "c@x.com"), ("a", "a@x.com"), ("b", "b@x.com")] {
            let u = user(id, email);
            table.reserve_email(&u).unwrap();
            table.insert(u);
        }

        let ids: Vec<String> = table.list().iter().map(|u| u.id.clone()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_email_lookup_is_case_sensitive() {
        let table = UserTable::new();
        let u = user("u1", "a@x.com");
        table.reserve_email(&u).unwrap();
        table.insert(u);

        assert!(table.get_by_email("a@x.com").is_some());
        assert!(table.get_by_email("A@X.COM").is_none());
    }
}
