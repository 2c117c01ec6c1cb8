use crate::api::backend::Backend;
use crate::core::error::{DomainError, ValidationError};
use crate::models::api::{LoginRequest, MessageResponse};
use crate::models::entry::{Entry, NewEntry};
use crate::models::user::{NewUser, User};
use anyhow::{Context, Result};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// HTTP client for the desk REST API
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// `base_url` is the API root, e.g. `http://127.0.0.1:3001/api`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response, DomainError> {
        let response = request
            .send()
            .await
            .map_err(|e| DomainError::Connection(e.to_string()))?;

        debug!(status = %response.status(), url = %response.url(), "API response");

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(error_from_response(response).await)
        }
    }

    async fn json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, DomainError> {
        self.send(request)
            .await?
            .json::<T>()
            .await
            .map_err(|e| DomainError::Internal(format!("Failed to parse API response: {}", e)))
    }
}

/// Map a non-2xx response back onto the domain error it was produced from
async fn error_from_response(response: Response) -> DomainError {
    let status = response.status();
    let message = response
        .json::<MessageResponse>()
        .await
        .map(|body| body.message)
        .unwrap_or_else(|_| status.to_string());

    match status {
        StatusCode::UNAUTHORIZED => DomainError::InvalidCredentials,
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            DomainError::Validation(ValidationError::InvalidFormat(message))
        }
        StatusCode::CONFLICT => DomainError::Constraint(message),
        _ => DomainError::Internal(format!("{} ({})", message, status)),
    }
}

impl Backend for ApiClient {
    async fn login_user(&self, email: &str, password: &str) -> Result<User, DomainError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.json(self.client.post(self.url("/auth/login")).json(&body))
            .await
    }

    async fn create_user(&self, user: NewUser) -> Result<User, DomainError> {
        self.json(self.client.post(self.url("/users")).json(&user)).await
    }

    async fn get_users(&self) -> Result<Vec<User>, DomainError> {
        self.json(self.client.get(self.url("/users"))).await
    }

    async fn delete_user(&self, id: &str) -> Result<(), DomainError> {
        let url = self.url(&format!("/users/{}", encode_segment(id)));
        self.send(self.client.delete(url)).await?;
        Ok(())
    }

    async fn create_entry(&self, entry: NewEntry) -> Result<Entry, DomainError> {
        self.json(self.client.post(self.url("/entries")).json(&entry))
            .await
    }

    async fn get_entries(&self) -> Result<Vec<Entry>, DomainError> {
        self.json(self.client.get(self.url("/entries"))).await
    }

    async fn get_user_entries(&self, user_id: &str) -> Result<Vec<Entry>, DomainError> {
        let url = self.url(&format!("/entries/user/{}", encode_segment(user_id)));
        self.json(self.client.get(url)).await
    }
}

/// Everything outside the unreserved set of RFC 3986
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::routes::build_router;
    use crate::core::state::AppState;
    use crate::models::user::Role;
    use crate::testing::{bob_entry, seeded_directory};
    use std::sync::Arc;
    use tokio::net::TcpListener;

    async fn spawn_server() -> (ApiClient, User, User) {
        let (directory, admin, employee) = seeded_directory();
        let state = Arc::new(AppState::new(directory));
        let app = build_router(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = ApiClient::new(format!("http://{}/api/", addr), Duration::from_secs(5)).unwrap();
        (client, admin, employee)
    }

    #[test]
    fn test_api_client_creation() {
        let client = ApiClient::new("http://localhost:3001/api/", Duration::from_secs(30)).unwrap();
        assert_eq!(client.url("/users"), "http://localhost:3001/api/users");
    }

    #[test]
    fn test_encode_segment() {
        assert_eq!(encode_segment("abc-123"), "abc-123");
        assert_eq!(encode_segment("a/b c"), "a%2Fb%20c");
        assert_eq!(encode_segment("x.y~z_1"), "x.y~z_1");
        assert_eq!(encode_segment("é?"), "%C3%A9%3F");
    }

    #[tokio::test]
    async fn test_login_over_http() {
        let (client, _, employee) = spawn_server().await;

        let user = client.login_user("a@x.com", "p1").await.unwrap();
        assert_eq!(user, employee);

        let err = client.login_user("a@x.com", "wrong").await.unwrap_err();
        assert_eq!(err, DomainError::InvalidCredentials);
    }

    #[tokio::test]
    async fn test_user_lifecycle_over_http() {
        let (client, admin, employee) = spawn_server().await;

        let created = client
            .create_user(NewUser {
                email: "b@x.com".to_string(),
                password: "pw".to_string(),
                name: "B".to_string(),
                role: Role::Employee,
            })
            .await
            .unwrap();

        let users = client.get_users().await.unwrap();
        assert_eq!(users, vec![admin, employee, created.clone()]);

        client.delete_user(&created.id).await.unwrap();
        client.delete_user(&created.id).await.unwrap();
        assert_eq!(client.get_users().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_email_maps_to_constraint() {
        let (client, _, _) = spawn_server().await;

        let err = client
            .create_user(NewUser {
                email: "a@x.com".to_string(),
                password: "pw".to_string(),
                name: "Again".to_string(),
                role: Role::Employee,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Constraint(_)));
    }

    #[tokio::test]
    async fn test_entries_over_http() {
        let (client, _, employee) = spawn_server().await;

        let entry = client.create_entry(bob_entry(&employee.id)).await.unwrap();
        assert!(!entry.id.is_empty());

        let mine = client.get_user_entries(&employee.id).await.unwrap();
        assert_eq!(mine, vec![entry.clone()]);
        assert_eq!(client.get_entries().await.unwrap(), vec![entry]);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_connection_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ApiClient::new(format!("http://{}/api", addr), Duration::from_secs(2)).unwrap();
        let err = client.get_users().await.unwrap_err();
        assert!(matches!(err, DomainError::Connection(_)));
    }
}
