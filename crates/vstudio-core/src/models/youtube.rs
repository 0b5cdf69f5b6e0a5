use serde::{Deserialize, Serialize};

/// External video-platform account linked to the current user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct YouTubeAccount {
    #[serde(default = "default_platform")]
    pub platform: String,
    pub account_id: Option<String>,
    pub account_name: Option<String>,
    pub channel_id: Option<String>,
    pub profile_image_url: Option<String>,
    pub is_active: Option<bool>,
}

fn default_platform() -> String {
    "youtube".to_string()
}

impl YouTubeAccount {
    pub fn label(&self) -> &str {
        self.account_name
            .as_deref()
            .or(self.channel_id.as_deref())
            .or(self.account_id.as_deref())
            .unwrap_or("YouTube account")
    }
}

/// Response of `GET /youtube/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YouTubeStatus {
    pub connected: bool,
    pub account: Option<YouTubeAccount>,
}

impl YouTubeStatus {
    /// Proof of a connected account, required to publish.
    ///
    /// Returns `None` when the account is not connected or was deactivated.
    pub fn connected_account(&self) -> Option<ConnectedAccount> {
        if !self.connected {
            return None;
        }
        let account = self.account.as_ref()?;
        if account.is_active == Some(false) {
            return None;
        }
        Some(ConnectedAccount {
            account: account.clone(),
        })
    }
}

/// A connected account. Only obtainable from [`YouTubeStatus::connected_account`],
/// so publishing without one does not type-check.
#[derive(Debug, Clone)]
pub struct ConnectedAccount {
    account: YouTubeAccount,
}

impl ConnectedAccount {
    pub fn account(&self) -> &YouTubeAccount {
        &self.account
    }

    pub fn channel_id(&self) -> Option<&str> {
        self.account.channel_id.as_deref()
    }
}

/// Response of `POST /youtube/auth/start`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthStartResponse {
    pub auth_url: String,
}

/// Body for `POST /youtube/auth/callback`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthExchangeRequest {
    pub code: String,
    pub state: String,
}

/// Response of `POST /youtube/auth/callback`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthExchangeResponse {
    #[serde(default)]
    pub ok: bool,
    pub channel_id: Option<String>,
}
