//! Discord login, callback, and logout.
//!
//! GET /auth/discord           303 to the Discord authorize page
//! GET /auth/discord/callback  code exchange, user upsert, session cookie
//! GET /logout                 destroy session, clear cookie

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::Redirect,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use tracing::{info, warn};

use crate::app::AppState;
use crate::error::{ApiError, Result};
use crate::session::SESSION_COOKIE;

/// GET /auth/discord — kick off the OAuth flow.
pub async fn login(State(state): State<Arc<AppState>>) -> Result<Redirect> {
    if !state.oauth.configured() {
        return Err(ApiError::Validation(
            "Discord login is not configured".to_string(),
        ));
    }
    let url = state.oauth.authorize_url()?;
    Ok(Redirect::to(&url))
}

#[derive(Deserialize)]
pub struct CallbackQuery {
    // Defaulted because Discord omits `code` when the user cancels the
    // authorize prompt.
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub state: String,
}

/// GET /auth/discord/callback — finish the flow and start a session.
///
/// An unknown or reused `state` is a hard 401. A failed exchange against
/// Discord just sends the browser back to the login page.
pub async fn callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(query): Query<CallbackQuery>,
) -> Result<(CookieJar, Redirect)> {
    if query.code.is_empty() || !state.oauth.consume_state(&query.state) {
        warn!("OAuth callback with a missing code or unknown state");
        return Err(ApiError::Unauthorized);
    }

    let identity = match state.oauth.fetch_identity(&query.code).await {
        Ok(identity) => identity,
        Err(e) => {
            warn!(error = %e, "Discord identity fetch failed");
            return Ok((jar, Redirect::to("/login.html")));
        }
    };

    let user = state.users.upsert_discord(identity)?;
    let token = state.sessions.create(user.id);
    info!(user_id = user.id, username = ?user.username, "login");

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    Ok((jar.add(cookie), Redirect::to("/")))
}

/// GET /logout — drop the session and clear the cookie.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.destroy(cookie.value());
    }
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/").build());
    (jar, Redirect::to("/login.html"))
}
