//! Discord OAuth2 login flow.
//!
//! Standard authorization-code dance: build the authorize redirect, trade
//! the callback code for a bearer token, then fetch `/users/@me` for the
//! profile. CSRF `state` values are held in process and are single use.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use jobtrack_core::config::DiscordConfig;
use jobtrack_core::types::DiscordIdentity;

const AUTHORIZE_URL: &str = "https://discord.com/oauth2/authorize";
const API_BASE: &str = "https://discord.com/api";
/// A callback must arrive within this window or its state is thrown away.
const STATE_TTL_MINUTES: i64 = 10;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Transport-level failure talking to Discord.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// Discord answered with a non-success status.
    #[error("Discord API error ({status}): {message}")]
    Api { status: u16, message: String },
    /// Authorize URL construction failed.
    #[error("URL error: {0}")]
    Url(String),
}

pub type Result<T> = std::result::Result<T, AuthError>;

/// Discord OAuth client. One instance lives in the app state.
pub struct DiscordOAuth {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    api_base: String,
    /// Outstanding CSRF states and when they were issued.
    states: DashMap<String, DateTime<Utc>>,
}

impl DiscordOAuth {
    pub fn new(config: &DiscordConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            api_base: API_BASE.to_string(),
            states: DashMap::new(),
        }
    }

    /// True once real application credentials are configured.
    pub fn configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }

    /// Build the authorize redirect and remember its CSRF state.
    pub fn authorize_url(&self) -> Result<String> {
        self.prune_states();
        let state = Uuid::new_v4().to_string();
        self.states.insert(state.clone(), Utc::now());
        let url = reqwest::Url::parse_with_params(
            AUTHORIZE_URL,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", "identify email"),
                ("state", state.as_str()),
            ],
        )
        .map_err(|e| AuthError::Url(e.to_string()))?;
        Ok(url.to_string())
    }

    /// Check and consume a callback's state value. Single use: a second
    /// callback with the same state fails.
    pub fn consume_state(&self, state: &str) -> bool {
        self.prune_states();
        self.states.remove(state).is_some()
    }

    fn prune_states(&self) {
        let cutoff = Utc::now() - Duration::minutes(STATE_TTL_MINUTES);
        self.states.retain(|_, issued| *issued > cutoff);
    }

    /// Run the code exchange and profile fetch for a callback.
    pub async fn fetch_identity(&self, code: &str) -> Result<DiscordIdentity> {
        let token = self.exchange_code(code).await?;
        self.fetch_profile(&token.access_token).await
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenResponse> {
        let resp = self
            .client
            .post(format!("{}/oauth2/token", self.api_base))
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            warn!(status, body = %text, "Discord token exchange failed");
            return Err(AuthError::Api {
                status,
                message: text,
            });
        }
        Ok(resp.json().await?)
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<DiscordIdentity> {
        let resp = self
            .client
            .get(format!("{}/users/@me", self.api_base))
            .bearer_auth(access_token)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            warn!(status, body = %text, "Discord profile fetch failed");
            return Err(AuthError::Api {
                status,
                message: text,
            });
        }
        let profile: ProfileResponse = resp.json().await?;
        Ok(DiscordIdentity {
            discord_id: profile.id,
            username: profile.username,
            discriminator: profile.discriminator,
            avatar: profile.avatar,
            email: profile.email,
        })
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// The slice of Discord's `/users/@me` payload we keep.
#[derive(Deserialize)]
struct ProfileResponse {
    id: String,
    username: Option<String>,
    discriminator: Option<String>,
    avatar: Option<String>,
    email: Option<String>,
}
