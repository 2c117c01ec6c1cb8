use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use crate::core::config::{SeedUser, StorageConfig};
use crate::domain::directory::Directory;
use crate::models::user::NewUser;
use crate::security::password::PasswordHasher;
use crate::stores::wal_store::WalStore;
use crate::wal::wal::{Wal, WalOperation};

// this runs at boot time
pub fn apply_wal_operations(store: &WalStore, operations: &[WalOperation]) -> usize {
    let mut skipped = 0;
    for op in operations {
        if !store.apply(op) {
            skipped += 1;
        }
    }
    if skipped > 0 {
        warn!(skipped, "WAL operations that no longer apply were skipped");
    }
    operations.len() - skipped
}

/// Open the store described by `[storage]`, replaying and compacting its log
pub fn open_store(config: &StorageConfig) -> Result<Arc<WalStore>> {
    let Some(wal_path) = &config.wal_path else {
        info!("No wal_path configured, data lives in memory only");
        return Ok(Arc::new(WalStore::in_memory()));
    };

    let wal = Wal::new(wal_path.clone()).context("Failed to initialize WAL")?;
    info!(wal_path = %wal_path.display(), "WAL initialized");

    let store = WalStore::with_wal(wal);

    info!("Replaying WAL operations");
    let operations = store
        .wal()
        .map(Wal::replay)
        .transpose()
        .context("Failed to replay WAL")?
        .unwrap_or_default();

    let applied = apply_wal_operations(&store, &operations);

    info!(
        operations_replayed = applied,
        users_loaded = store.user_count(),
        entries_loaded = store.entry_count(),
        "WAL replay completed"
    );

    if config.compact_on_start && !operations.is_empty() {
        let kept = store.compact().context("Failed to compact WAL")?;
        info!(before = operations.len(), after = kept, "WAL compacted");
    }

    Ok(Arc::new(store))
}

/// Build the directory over a store opened from `[storage]`
pub fn build_directory(config: &StorageConfig) -> Result<Directory> {
    let store = open_store(config)?;
    Ok(Directory::new(
        store,
        PasswordHasher::new(config.password_iterations),
    ))
}

/// Create the configured accounts whose emails are not registered yet
pub fn seed_users(directory: &Directory, users: &[SeedUser]) -> Result<usize> {
    let mut created = 0;
    for seed in users {
        let new_user = NewUser {
            email: seed.email.clone(),
            password: seed.password.clone(),
            name: seed.name.clone(),
            role: seed.role,
        };

        if directory
            .ensure_user(new_user)
            .with_context(|| format!("Failed to seed user '{}'", seed.email))?
        {
            info!(email = %seed.email, role = %seed.role, "Seed user created");
            created += 1;
        }
    }
    Ok(created)
}
