use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BIND: &str = "127.0.0.1";

/// Top-level config (jobtrack.toml + JOBTRACK_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct JobtrackConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub mail: MailConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Externally reachable base URL, used for the dashboard link in
    /// reminder emails.
    #[serde(default = "default_public_url")]
    pub public_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
            public_url: default_public_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Session cookie settings. The secret signs the cookie value, so changing
/// it invalidates every live session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_session_secret")]
    pub secret: String,
    #[serde(default = "default_session_ttl")]
    pub ttl_hours: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: default_session_secret(),
            ttl_hours: default_session_ttl(),
        }
    }
}

/// Discord OAuth application credentials. Login is disabled (the authorize
/// redirect will be rejected by Discord) until client_id/client_secret are
/// filled in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: default_redirect_uri(),
        }
    }
}

/// MailerSend transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub from_email: String,
    #[serde(default = "default_from_name")]
    pub from_name: String,
    #[serde(default = "default_mail_api_base")]
    pub api_base: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            from_email: String::new(),
            from_name: default_from_name(),
            api_base: default_mail_api_base(),
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_public_url() -> String {
    format!("http://localhost:{}", DEFAULT_PORT)
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.jobtrack/jobtrack.db", home)
}
fn default_session_secret() -> String {
    "change-me".to_string()
}
fn default_session_ttl() -> i64 {
    168
}
fn default_redirect_uri() -> String {
    format!("http://localhost:{}/auth/discord/callback", DEFAULT_PORT)
}
fn default_from_name() -> String {
    "Job Tracker".to_string()
}
fn default_mail_api_base() -> String {
    "https://api.mailersend.com".to_string()
}

impl JobtrackConfig {
    /// Load config from a TOML file with JOBTRACK_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.jobtrack/jobtrack.toml
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: JobtrackConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("JOBTRACK_").split("_"))
            .extract()
            .map_err(|e| crate::error::CoreError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.jobtrack/jobtrack.toml", home)
}
