//! Shared HTTP client for the Video Studio backend.
//!
//! Provides a minimal client that sends the session's user identifier with
//! every request, generic JSON/multipart helpers, and domain methods for videos,
//! captions, AI metadata, confidentiality checks, account connection and
//! publishing. The CLI uses this client directly.

pub mod api;
pub mod error;
pub mod oauth;
pub mod poller;
pub mod session;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use vstudio_core::ClientConfig;

pub use error::{extract_error_message, ClientError, Result};
pub use oauth::{CallbackParams, OAuthError, OAuthOutcome};
pub use poller::{watch, watch_if_polling, PollEvent, PollHandle, VideoSource};
pub use session::{Session, USER_ID_HEADER};

const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// HTTP client for the backend, bound to one user session.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Session,
}

impl ApiClient {
    pub fn new(base_url: String, session: Session) -> Result<Self> {
        Self::with_timeout(base_url, session, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: String, session: Session, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    /// Create client from a loaded configuration and an already resolved session.
    pub fn from_config(config: &ClientConfig, session: Session) -> Result<Self> {
        Self::with_timeout(
            config.api_base_url.clone(),
            session,
            config.request_timeout(),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.build_url(path);
        tracing::debug!(method = %method, path = %path, "API request");
        self.client
            .request(method, url)
            .header(USER_ID_HEADER, self.session.user_id())
    }

    /// Turn a non-success response into `ClientError::Api` with the backend's message.
    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(status, &body);
        tracing::debug!(status = status.as_u16(), message = %message, "API request failed");
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
        let response = Self::check_status(request.send().await?).await?;
        let body: T = response.json().await?;
        Ok(body)
    }

    /// GET request with optional query parameters. Deserializes JSON response.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let mut request = self.request(Method::GET, path);
        if !query.is_empty() {
            request = request.query(query);
        }
        Self::send_json(request).await
    }

    /// POST JSON body and deserialize response.
    pub async fn post_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        Self::send_json(self.request(Method::POST, path).json(body)).await
    }

    /// POST without a body and deserialize response.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        Self::send_json(self.request(Method::POST, path)).await
    }

    /// PATCH JSON body and deserialize response.
    pub async fn patch_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        Self::send_json(self.request(Method::PATCH, path).json(body)).await
    }

    /// POST multipart form and deserialize response.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T> {
        Self::send_json(self.request(Method::POST, path).multipart(form)).await
    }

    /// DELETE request. Returns Ok(()) on success; any response body is ignored.
    pub async fn delete(&self, path: &str) -> Result<()> {
        let response = self.request(Method::DELETE, path).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }
}
