// Centralized error handling for the desk

use crate::models::api::MessageResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

/// Failures reported by a persistence gateway
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Connection(String),

    #[error("Constraint violated: {0}")]
    Constraint(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid field format: {0}")]
    InvalidFormat(String),
}

/// Errors produced by the domain operations, on either side of the wire
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Constraint violated: {0}")]
    Constraint(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Connection(msg) => DomainError::Connection(msg),
            StoreError::Constraint(msg) => DomainError::Constraint(msg),
        }
    }
}

impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            DomainError::InvalidCredentials => (StatusCode::UNAUTHORIZED, self.to_string()),
            DomainError::Validation(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            DomainError::Constraint(_) => (StatusCode::CONFLICT, self.to_string()),
            DomainError::Connection(_) | DomainError::Internal(_) => {
                tracing::error!(error = %self, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
            }
        };

        (status, Json(MessageResponse::new(message))).into_response()
    }
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No user is logged in")]
    NotAuthenticated,

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Session storage error: {0}")]
    Storage(String),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("A request for this form is already in flight")]
    Busy,

    #[error("This dashboard is not available to the current session")]
    Forbidden,

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

impl From<ValidationError> for DashboardError {
    fn from(err: ValidationError) -> Self {
        DashboardError::Domain(DomainError::Validation(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_message(err: DomainError) -> (StatusCode, String) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: MessageResponse = serde_json::from_slice(&bytes).unwrap();
        (status, body.message)
    }

    #[tokio::test]
    async fn test_invalid_credentials_maps_to_401() {
        let (status, message) = body_message(DomainError::InvalidCredentials).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(message, "Invalid credentials");
    }

    #[tokio::test]
    async fn test_connection_error_is_opaque() {
        let (status, message) =
            body_message(DomainError::Connection("wal: disk full".to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "Server error");
    }

    #[tokio::test]
    async fn test_constraint_and_validation_statuses() {
        let (status, _) = body_message(DomainError::Constraint("email".to_string())).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, message) =
            body_message(ValidationError::MissingField("name").into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "Missing required field: name");
    }

    #[test]
    fn test_store_error_conversion() {
        let err: DomainError = StoreError::Constraint("dup".to_string()).into();
        assert_eq!(err, DomainError::Constraint("dup".to_string()));

        let err: DomainError = StoreError::Connection("down".to_string()).into();
        assert_eq!(err, DomainError::Connection("down".to_string()));
    }
}
