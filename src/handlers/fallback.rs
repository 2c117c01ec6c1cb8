use crate::models::api::MessageResponse;
use axum::{
    http::{StatusCode, Uri},
    response::{IntoResponse, Json, Response},
};
use tracing::debug;

pub async fn fallback_handler(uri: Uri) -> Response {
    debug!(path = %uri.path(), "No route matched");

    (StatusCode::NOT_FOUND, Json(MessageResponse::new("Not found"))).into_response()
}
