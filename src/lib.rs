pub mod core {
    pub mod config;
    pub mod error;
    pub mod routes;
    pub mod startup;
    pub mod state;
    pub mod tracing_init;
}

pub mod models {
    pub mod api;
    pub mod entry;
    pub mod user;
}

pub mod stores {
    pub mod entry_table;
    pub mod gateway;
    pub mod user_table;
    pub mod wal_store;
}

pub mod wal {
    #[allow(clippy::module_inception)]
    pub mod wal;
}

pub mod domain {
    pub mod directory;
}

pub mod api {
    pub mod backend;
    pub mod client;
}

pub mod handlers {
    pub mod auth;
    pub mod entries;
    pub mod fallback;
    pub mod health;
    pub mod users;
}

pub mod session {
    pub mod guard;
    pub mod manager;
    pub mod storage;
}

pub mod dashboard {
    pub mod admin;
    pub mod employee;
    pub mod inflight;
    pub mod notice;
}

pub mod export {
    pub mod xlsx;
}

pub mod security {
    pub mod password;
}

pub mod validation {
    pub mod forms;
}

pub mod utils {
    pub mod ids;
    pub mod sync;
}

#[cfg(test)]
pub(crate) mod testing;
