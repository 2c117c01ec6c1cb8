use crate::core::error::DomainError;
use crate::core::state::AppState;
use crate::models::entry::{Entry, NewEntry};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use std::sync::Arc;

/// Record an allocation. `id` and `created_at` are assigned here.
///
/// POST /api/entries
pub async fn create_entry_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewEntry>,
) -> Result<(StatusCode, Json<Entry>), DomainError> {
    let entry = state.directory.create_entry(body)?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// All entries, newest first
///
/// GET /api/entries
pub async fn list_entries_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Entry>>, DomainError> {
    Ok(Json(state.directory.get_entries()?))
}

/// One employee's entries, newest first
///
/// GET /api/entries/user/{user_id}
pub async fn list_user_entries_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Entry>>, DomainError> {
    Ok(Json(state.directory.get_user_entries(&user_id)?))
}
