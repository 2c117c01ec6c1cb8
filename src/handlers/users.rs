use crate::core::error::DomainError;
use crate::core::state::AppState;
use crate::models::user::{NewUser, User};
use crate::utils::sync::blocking;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use std::sync::Arc;

/// Create an account. Hashing the password runs on the blocking pool.
///
/// POST /api/users  {email, password, name, role}
pub async fn create_user_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewUser>,
) -> Result<(StatusCode, Json<User>), DomainError> {
    let directory = state.directory.clone();
    let user = blocking(move || directory.create_user(body)).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/users
pub async fn list_users_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<User>>, DomainError> {
    Ok(Json(state.directory.get_users()?))
}

/// Remove an account. Unknown ids succeed as well.
///
/// DELETE /api/users/{id}
pub async fn delete_user_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, DomainError> {
    state.directory.delete_user(&id)?;
    Ok(StatusCode::NO_CONTENT)
}
