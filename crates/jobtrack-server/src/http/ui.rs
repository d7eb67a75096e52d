//! Embedded pages. Both are compiled into the binary so the deployment is
//! a single file plus the database.

use std::sync::Arc;

use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::app::AppState;
use crate::session::SESSION_COOKIE;

static INDEX_HTML: &str = include_str!("../../static/index.html");
static LOGIN_HTML: &str = include_str!("../../static/login.html");

/// GET / — the dashboard, or a bounce to the login page without a session.
///
/// The dashboard script re-checks via `/api/user` anyway; this just saves
/// logged-out visitors a flash of empty UI.
pub async fn index_handler(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let authed = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| state.sessions.resolve(cookie.value()))
        .is_some();
    if authed {
        Html(INDEX_HTML).into_response()
    } else {
        Redirect::to("/login.html").into_response()
    }
}

/// GET /login.html — the login page.
pub async fn login_handler() -> Html<&'static str> {
    Html(LOGIN_HTML)
}
