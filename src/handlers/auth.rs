use crate::core::error::DomainError;
use crate::core::state::AppState;
use crate::models::api::LoginRequest;
use crate::models::user::User;
use crate::utils::sync::blocking;
use axum::{extract::State, response::Json};
use std::sync::Arc;

/// Exchange credentials for the account's public fields.
/// Password verification runs on the blocking pool.
///
/// POST /api/auth/login  {email, password}
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<User>, DomainError> {
    let directory = state.directory.clone();
    let user = blocking(move || directory.login_user(&body.email, &body.password)).await?;
    Ok(Json(user))
}
