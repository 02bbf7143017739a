use crate::models::{AuthResponse, PublicUser, Task, TaskPriority};
use chrono::NaiveDate;
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use uuid::Uuid;

/// Where the API lives. One canonical base URL, configuration-driven; no
/// per-page hardcoding.
pub struct ClientConfig {
    pub base_url: String,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("TASKFLOW_API_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:4000/api".to_string()),
        }
    }
}

/// Errors surfaced by the client library.
#[derive(Debug)]
pub enum ClientError {
    /// An authenticated call was attempted without a session.
    NotAuthenticated,
    /// The server rejected the credential; the session has been torn down.
    SessionExpired,
    /// The server answered with a non-success status.
    Api { status: u16, message: String },
    /// The request never completed (connection, timeout, decode).
    Transport(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ClientError::NotAuthenticated => write!(f, "Not logged in"),
            ClientError::SessionExpired => write!(f, "Session expired, please log in again"),
            ClientError::Api { status, message } => write!(f, "API error {}: {}", status, message),
            ClientError::Transport(msg) => write!(f, "Transport error: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        ClientError::Transport(error.to_string())
    }
}

/// The `completed` value as the task form sends it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletedChoice {
    Yes,
    No,
}

impl From<bool> for CompletedChoice {
    fn from(done: bool) -> Self {
        if done {
            CompletedChoice::Yes
        } else {
            CompletedChoice::No
        }
    }
}

/// A filled-in task form, ready to POST.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub priority: TaskPriority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    pub completed: CompletedChoice,
}

/// A partial edit; absent fields are not sent at all.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<CompletedChoice>,
}

/// The cached credential and the identity it represents.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: PublicUser,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: String,
}

/// Holds at most one authenticated identity and fronts every API call.
///
/// On a successful login or registration the token and identity are cached;
/// `logout` drops both. Any authenticated call that comes back 401 performs
/// the same teardown before reporting `SessionExpired`, so a revoked or
/// expired token can never leave the controller looking signed in. Task
/// mutations are followed by a full list refresh rather than patching local
/// state, so the caller always ends up with the server's copy.
pub struct SessionController {
    http: reqwest::Client,
    base_url: String,
    session: Option<Session>,
}

impl SessionController {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url,
            session: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn current_user(&self) -> Option<&PublicUser> {
        self.session.as_ref().map(|s| &s.user)
    }

    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.token.as_str())
    }

    /// Defined teardown: forget the credential and the cached identity.
    pub fn logout(&mut self) {
        self.session = None;
    }

    /// Validates a credential cached from an earlier run against the server.
    /// If the server no longer accepts it the cache is cleared and the caller
    /// must log in again.
    pub async fn resume(&mut self, token: String) -> Result<&Session, ClientError> {
        let response = self
            .http
            .get(self.url("/user/me"))
            .bearer_auth(&token)
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            self.logout();
            return Err(ClientError::SessionExpired);
        }
        let response = Self::check(response).await?;
        let user: PublicUser = response.json().await?;

        Ok(self.session.insert(Session { token, user }))
    }

    pub async fn register(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<&Session, ClientError> {
        let response = self
            .http
            .post(self.url("/user/register"))
            .json(&json!({ "name": name, "email": email, "password": password }))
            .send()
            .await?;
        self.store_auth(response).await
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<&Session, ClientError> {
        let response = self
            .http
            .post(self.url("/user/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        self.store_auth(response).await
    }

    pub async fn fetch_profile(&mut self) -> Result<PublicUser, ClientError> {
        let response = self.send_authed(Method::GET, "/user/me", None).await?;
        let user: PublicUser = response.json().await?;
        if let Some(session) = self.session.as_mut() {
            session.user = user.clone();
        }
        Ok(user)
    }

    pub async fn update_profile(
        &mut self,
        name: &str,
        email: &str,
    ) -> Result<PublicUser, ClientError> {
        let body = json!({ "name": name, "email": email });
        let response = self
            .send_authed(Method::PUT, "/user/profile", Some(body))
            .await?;
        let user: PublicUser = response.json().await?;
        if let Some(session) = self.session.as_mut() {
            session.user = user.clone();
        }
        Ok(user)
    }

    pub async fn change_password(
        &mut self,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ClientError> {
        let body = json!({
            "currentPassword": current_password,
            "newPassword": new_password
        });
        self.send_authed(Method::PUT, "/user/password", Some(body))
            .await?;
        Ok(())
    }

    pub async fn list_tasks(&mut self) -> Result<Vec<Task>, ClientError> {
        let response = self.send_authed(Method::GET, "/tasks", None).await?;
        Ok(response.json().await?)
    }

    /// Create, then refresh: the returned list is the server's copy.
    pub async fn create_task(&mut self, draft: &TaskDraft) -> Result<Vec<Task>, ClientError> {
        let body = serde_json::to_value(draft).map_err(|e| ClientError::Transport(e.to_string()))?;
        self.send_authed(Method::POST, "/tasks", Some(body)).await?;
        self.list_tasks().await
    }

    pub async fn update_task(
        &mut self,
        id: Uuid,
        patch: &TaskPatch,
    ) -> Result<Vec<Task>, ClientError> {
        let body = serde_json::to_value(patch).map_err(|e| ClientError::Transport(e.to_string()))?;
        self.send_authed(Method::PUT, &format!("/tasks/{}", id), Some(body))
            .await?;
        self.list_tasks().await
    }

    /// Flip the completed flag through an explicit update; nothing else on
    /// the task changes.
    pub async fn set_completed(&mut self, id: Uuid, done: bool) -> Result<Vec<Task>, ClientError> {
        let patch = TaskPatch {
            completed: Some(CompletedChoice::from(done)),
            ..TaskPatch::default()
        };
        self.update_task(id, &patch).await
    }

    pub async fn delete_task(&mut self, id: Uuid) -> Result<Vec<Task>, ClientError> {
        self.send_authed(Method::DELETE, &format!("/tasks/{}", id), None)
            .await?;
        self.list_tasks().await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn store_auth(&mut self, response: reqwest::Response) -> Result<&Session, ClientError> {
        let response = Self::check(response).await?;
        let auth: AuthResponse = response.json().await?;
        Ok(self.session.insert(Session {
            token: auth.token,
            user: auth.user,
        }))
    }

    /// Sends an authenticated request. A 401 answer tears the session down
    /// before the error is surfaced.
    async fn send_authed(
        &mut self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<reqwest::Response, ClientError> {
        let token = self
            .token()
            .ok_or(ClientError::NotAuthenticated)?
            .to_owned();

        let mut request = self.http.request(method, self.url(path)).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            self.logout();
            return Err(ClientError::SessionExpired);
        }
        Self::check(response).await
    }

    /// Turns a non-success response into a typed error, reading the server's
    /// `{"error": ...}` body when there is one.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = match response.json::<ApiErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string(),
        };
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }
}
