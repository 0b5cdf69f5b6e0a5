//! Account connection via the platform's OAuth redirect flow.
//!
//! 1. `start_oauth` asks the backend for an authorization URL.
//! 2. The user authorizes and the provider redirects to the callback target
//!    with `code`, `state` and possibly `error` in the query.
//! 3. `complete_oauth` validates those parameters and exchanges the code.
//!
//! Each failure is a distinct, user-visible outcome. Provider errors and
//! missing parameters never reach the exchange endpoint.

use reqwest::Url;
use serde::Serialize;
use std::borrow::Cow;
use vstudio_core::models::{AuthStartResponse, OAuthExchangeRequest, OAuthExchangeResponse};
use vstudio_core::ErrorMetadata;

use crate::error::{ClientError, Result};
use crate::ApiClient;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OAuthError {
    #[error("Authorization failed: {0}")]
    ProviderDenied(String),

    #[error("Missing authorization code or state")]
    MissingCodeOrState,

    #[error("{0}")]
    ExchangeFailed(String),
}

impl OAuthError {
    pub fn error_code(&self) -> &'static str {
        match self {
            OAuthError::ProviderDenied(_) => "OAUTH_PROVIDER_DENIED",
            OAuthError::MissingCodeOrState => "OAUTH_MISSING_PARAMS",
            OAuthError::ExchangeFailed(_) => "OAUTH_EXCHANGE_FAILED",
        }
    }
}

/// Query parameters delivered to the callback target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

impl CallbackParams {
    /// Parse a full callback URL.
    pub fn from_url(url: &str) -> Result<Self> {
        let parsed = Url::parse(url).map_err(|e| {
            vstudio_core::AppError::InvalidInput(format!("Invalid callback URL: {}", e))
        })?;
        Ok(Self::from_pairs(parsed.query_pairs()))
    }

    /// Parse a bare query string, with or without the leading `?`.
    pub fn from_query(query: &str) -> Result<Self> {
        Self::from_url(&format!(
            "http://localhost/?{}",
            query.trim_start_matches('?')
        ))
    }

    fn from_pairs<'a>(pairs: impl Iterator<Item = (Cow<'a, str>, Cow<'a, str>)>) -> Self {
        let mut params = CallbackParams::default();
        for (key, value) in pairs {
            let value = value.into_owned();
            match key.as_ref() {
                "code" => params.code = Some(value),
                "state" => params.state = Some(value),
                "error" => params.error = Some(value),
                _ => {}
            }
        }
        params
    }

    /// Code and state, or the reason the callback cannot be exchanged.
    pub fn validate(&self) -> std::result::Result<(&str, &str), OAuthError> {
        if let Some(error) = self.error.as_deref().filter(|e| !e.is_empty()) {
            return Err(OAuthError::ProviderDenied(error.to_string()));
        }
        let code = self.code.as_deref().filter(|c| !c.is_empty());
        let state = self.state.as_deref().filter(|s| !s.is_empty());
        match (code, state) {
            (Some(code), Some(state)) => Ok((code, state)),
            _ => Err(OAuthError::MissingCodeOrState),
        }
    }
}

/// Result of handling the callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum OAuthOutcome {
    Connected,
    Failed {
        #[serde(skip)]
        error: OAuthError,
        message: String,
    },
}

impl OAuthOutcome {
    fn failed(error: OAuthError) -> Self {
        let message = error.to_string();
        OAuthOutcome::Failed { error, message }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, OAuthOutcome::Connected)
    }

    pub fn headline(&self) -> &'static str {
        match self {
            OAuthOutcome::Connected => "Connected!",
            OAuthOutcome::Failed { .. } => "Connection Failed",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            OAuthOutcome::Connected => "YouTube account connected successfully!",
            OAuthOutcome::Failed { message, .. } => message,
        }
    }

    pub fn error(&self) -> Option<&OAuthError> {
        match self {
            OAuthOutcome::Connected => None,
            OAuthOutcome::Failed { error, .. } => Some(error),
        }
    }

    pub fn into_result(self) -> Result<()> {
        match self {
            OAuthOutcome::Connected => Ok(()),
            OAuthOutcome::Failed { error, .. } => Err(ClientError::OAuth(error)),
        }
    }
}

impl ApiClient {
    /// Ask the backend for the authorization URL to open in a browser.
    pub async fn start_oauth(&self) -> Result<String> {
        let response: AuthStartResponse = self.post_empty("/youtube/auth/start").await?;
        tracing::info!("OAuth flow started");
        Ok(response.auth_url)
    }

    /// Exchange an authorization code. Prefer [`ApiClient::complete_oauth`], which
    /// validates the callback first.
    pub async fn exchange_oauth_code(
        &self,
        code: &str,
        state: &str,
    ) -> Result<OAuthExchangeResponse> {
        let body = OAuthExchangeRequest {
            code: code.to_string(),
            state: state.to_string(),
        };
        self.post_json("/youtube/auth/callback", &body).await
    }

    /// Handle the redirect callback and report the outcome.
    pub async fn complete_oauth(&self, params: &CallbackParams) -> OAuthOutcome {
        let (code, state) = match params.validate() {
            Ok(pair) => pair,
            Err(err) => {
                tracing::warn!(error = %err, "OAuth callback rejected before exchange");
                return OAuthOutcome::failed(err);
            }
        };

        match self.exchange_oauth_code(code, state).await {
            Ok(response) if response.ok => {
                tracing::info!(channel_id = ?response.channel_id, "Account connected");
                OAuthOutcome::Connected
            }
            Ok(_) => OAuthOutcome::failed(OAuthError::ExchangeFailed(
                "The authorization code was not accepted".to_string(),
            )),
            Err(err) => {
                tracing::warn!(error = %err, "OAuth code exchange failed");
                OAuthOutcome::failed(OAuthError::ExchangeFailed(err.client_message()))
            }
        }
    }

    /// Deactivate the linked account.
    pub async fn disconnect_youtube(&self) -> Result<()> {
        self.delete("/youtube/disconnect").await?;
        tracing::info!("Account disconnected");
        Ok(())
    }
}
