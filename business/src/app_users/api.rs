//! Account service: the network side of app user management.
//!
//! `AppUsersCtx` only talks to the [`AccountService`] trait. The HTTP
//! implementation targets the Userbase admin endpoints:
//!
//! - `GET  /admin/list-app-users?appName=<app>`
//! - `POST /admin/delete-user`
//! - `POST /admin/permanent-delete-user`
//! - `POST /admin/delete-app`
//!
//! Calls are never retried here: a delete that timed out may still have
//! happened on the server.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, header};
use serde::Serialize;

use super::record::{DeleteAppRequest, ListAppUsersResponse, UserActionRequest};
use crate::BusinessConfig;

/// Shown when the server rejects a call without saying why.
pub const UNKNOWN_ERROR: &str = "Unknown Error";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// The server answered with a non-success status.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The request never got a response.
    #[error("{0}")]
    Transport(String),

    /// The response body did not have the expected shape.
    #[error("Failed to parse {what}: {message}")]
    Decode { what: &'static str, message: String },
}

impl ServiceError {
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            Self::Transport(_) | Self::Decode { .. } => None,
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[async_trait]
pub trait AccountService: Send + Sync {
    async fn list_users(&self, app_name: &str) -> ServiceResult<ListAppUsersResponse>;

    async fn delete_user(&self, user_id: &str, app_name: &str, username: &str)
    -> ServiceResult<()>;

    /// Destroys the account. The server gives no guarantee it can be recovered.
    async fn permanently_delete_user(
        &self,
        user_id: &str,
        app_name: &str,
        username: &str,
    ) -> ServiceResult<()>;

    async fn delete_app(&self, app_name: &str) -> ServiceResult<()>;
}

/// [`AccountService`] over the Userbase admin HTTP API.
#[derive(Debug, Clone)]
pub struct HttpAccountService {
    client: Client,
    base_url: String,
    admin_session_id: Option<String>,
}

impl HttpAccountService {
    pub fn new(config: &BusinessConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: &BusinessConfig) -> Self {
        Self {
            client,
            base_url: config.api_base_url().trim_end_matches('/').to_owned(),
            admin_session_id: config.admin_session_id().map(str::to_owned),
        }
    }

    fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        let url = format!("{}/admin/{endpoint}", self.base_url);
        let request = self.client.request(method, url);
        match &self.admin_session_id {
            Some(session_id) => {
                request.header(header::COOKIE, format!("adminSessionId={session_id}"))
            }
            None => request,
        }
    }

    async fn send(request: RequestBuilder) -> ServiceResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = if body.trim().is_empty() {
            UNKNOWN_ERROR.to_owned()
        } else {
            body
        };
        log::debug!("admin api rejected request with {status}: {message}");
        Err(ServiceError::rejected(status.as_u16(), message))
    }

    async fn post<B: Serialize + Sync>(&self, endpoint: &str, body: &B) -> ServiceResult<()> {
        Self::send(self.request(Method::POST, endpoint).json(body)).await?;
        Ok(())
    }
}

#[async_trait]
impl AccountService for HttpAccountService {
    async fn list_users(&self, app_name: &str) -> ServiceResult<ListAppUsersResponse> {
        let request = self
            .request(Method::GET, "list-app-users")
            .query(&[("appName", app_name)]);
        let response = Self::send(request).await?;

        let body = response
            .bytes()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        serde_json::from_slice(&body).map_err(|e| ServiceError::Decode {
            what: "ListAppUsersResponse",
            message: e.to_string(),
        })
    }

    async fn delete_user(
        &self,
        user_id: &str,
        app_name: &str,
        username: &str,
    ) -> ServiceResult<()> {
        let body = UserActionRequest {
            user_id,
            app_name,
            username,
        };
        self.post("delete-user", &body).await
    }

    async fn permanently_delete_user(
        &self,
        user_id: &str,
        app_name: &str,
        username: &str,
    ) -> ServiceResult<()> {
        let body = UserActionRequest {
            user_id,
            app_name,
            username,
        };
        self.post("permanent-delete-user", &body).await
    }

    async fn delete_app(&self, app_name: &str) -> ServiceResult<()> {
        self.post("delete-app", &DeleteAppRequest { app_name }).await
    }
}
