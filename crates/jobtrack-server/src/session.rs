//! Server-side sessions with HMAC-signed cookie tokens.
//!
//! Sessions live in process memory only; a restart logs everyone out. The
//! cookie value is `<id>.<hex signature>` so a forged or tampered id fails
//! verification before the map is ever consulted.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;

type HmacSha256 = Hmac<Sha256>;

/// Name of the browser cookie carrying the signed session token.
pub const SESSION_COOKIE: &str = "jobtrack_session";

#[derive(Debug, Clone)]
struct Session {
    user_id: i64,
    expires_at: DateTime<Utc>,
}

pub struct SessionStore {
    sessions: DashMap<String, Session>,
    /// Keyed prototype, cloned per signature so the key is parsed once.
    mac: HmacSha256,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        let mac = HmacSha256::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        Self {
            sessions: DashMap::new(),
            mac,
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Open a session for the user and return the signed cookie value.
    pub fn create(&self, user_id: i64) -> String {
        let id = Uuid::new_v4().to_string();
        self.sessions.insert(
            id.clone(),
            Session {
                user_id,
                expires_at: Utc::now() + self.ttl,
            },
        );
        let sig = self.sign(&id);
        format!("{id}.{sig}")
    }

    /// Resolve a cookie value to a user id.
    ///
    /// None for malformed tokens, bad signatures, unknown ids, and expired
    /// sessions. An expired entry is removed on the way out.
    pub fn resolve(&self, token: &str) -> Option<i64> {
        let (id, sig) = token.split_once('.')?;
        if !self.verify(id, sig) {
            return None;
        }
        let mut expired = false;
        if let Some(session) = self.sessions.get(id) {
            if session.expires_at > Utc::now() {
                return Some(session.user_id);
            }
            expired = true;
        }
        // The read guard is gone here, so the removal cannot deadlock.
        if expired {
            self.sessions.remove(id);
        }
        None
    }

    /// Forget the session named by the cookie value, if any.
    pub fn destroy(&self, token: &str) {
        if let Some((id, _)) = token.split_once('.') {
            self.sessions.remove(id);
        }
    }

    fn sign(&self, id: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(id.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn verify(&self, id: &str, sig_hex: &str) -> bool {
        let Ok(sig) = hex::decode(sig_hex) else {
            return false;
        };
        let mut mac = self.mac.clone();
        mac.update(id.as_bytes());
        mac.verify_slice(&sig).is_ok()
    }
}

/// Session gate for the API subtree and `/test-email`.
///
/// On success the resolved `Arc<User>` is attached to request extensions
/// for the handlers downstream. Anything short of a live session is a
/// uniform 401 with no side effects.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user_id = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| state.sessions.resolve(cookie.value()));
    let Some(user_id) = user_id else {
        return Err(ApiError::Unauthorized);
    };
    let Some(user) = state.users.get(user_id)? else {
        warn!(user_id, "session points at a missing user row");
        return Err(ApiError::Unauthorized);
    };
    request.extensions_mut().insert(Arc::new(user));
    Ok(next.run(request).await)
}
