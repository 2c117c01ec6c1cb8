// HTTP routes configuration

use crate::core::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(crate::handlers::health::health_handler))

        // Auth
        .route("/api/auth/login", post(crate::handlers::auth::login_handler))

        // Users
        .route(
            "/api/users",
            post(crate::handlers::users::create_user_handler)
                .get(crate::handlers::users::list_users_handler),
        )
        .route("/api/users/{id}", delete(crate::handlers::users::delete_user_handler))

        // Entries
        .route(
            "/api/entries",
            post(crate::handlers::entries::create_entry_handler)
                .get(crate::handlers::entries::list_entries_handler),
        )
        .route(
            "/api/entries/user/{user_id}",
            get(crate::handlers::entries::list_user_entries_handler),
        )

        // 404 fallback for all unmatched routes
        .fallback(crate::handlers::fallback::fallback_handler)

        .with_state(state)
}
