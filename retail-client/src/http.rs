//! HTTP client for network-based API calls

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use shared::client::{LoginRequest, LoginResponse};
use shared::validation::FieldError;

use crate::{ClientConfig, ClientError, ClientResult, Session};

/// HTTP client for making network requests to the retail backend
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// Set the authentication token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Get the current token
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Backend base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Build authorization header value
    fn auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }

    /// Make a GET request with query parameters
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> ClientResult<T> {
        let url = self.url(path);
        let mut request = self.client.get(&url).query(query);

        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        tracing::debug!(%url, "GET");
        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let url = self.url(path);
        let mut request = self.client.post(&url).json(body);

        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        tracing::debug!(%url, "POST");
        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Handle the HTTP response
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await?;
            return match status {
                StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
                StatusCode::FORBIDDEN => Err(ClientError::Forbidden(text)),
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(text)),
                StatusCode::BAD_REQUEST => Err(ClientError::Validation(text)),
                _ => Err(ClientError::Internal(text)),
            };
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(Into::into)
    }

    // ========== Auth API ==========

    /// Login with name and password, returning the session to hand to the
    /// checkout components
    pub async fn login(&self, name: &str, password: &str) -> ClientResult<Session> {
        if name.is_empty() {
            return Err(ClientError::Validation(FieldError::Required("Name").to_string()));
        }
        if password.is_empty() {
            return Err(ClientError::Validation(
                FieldError::Required("Password").to_string(),
            ));
        }

        let request = LoginRequest {
            name: name.to_string(),
            password: password.to_string(),
        };

        let response: LoginResponse = match self.post("/", &request).await {
            Err(ClientError::NotFound(_)) => {
                return Err(ClientError::NotFound(
                    "No record found with this name".to_string(),
                ));
            }
            other => other?,
        };

        let session = Session::from_login(response)?;
        tracing::info!(user_id = %session.user().id, role = ?session.user().role, "Logged in");
        Ok(session)
    }
}
