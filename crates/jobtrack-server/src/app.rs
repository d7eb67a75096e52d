use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, put},
    Router,
};

use jobtrack_core::JobtrackConfig;
use jobtrack_reminders::ReminderDispatcher;
use jobtrack_store::{JobStore, UserStore};

use crate::oauth::DiscordOAuth;
use crate::session::SessionStore;

/// Central shared state — passed as Arc<AppState> to all Axum handlers.
pub struct AppState {
    pub config: JobtrackConfig,
    pub jobs: Arc<JobStore>,
    pub users: Arc<UserStore>,
    pub sessions: SessionStore,
    pub oauth: DiscordOAuth,
    pub dispatcher: Arc<ReminderDispatcher>,
}

impl AppState {
    pub fn new(
        config: JobtrackConfig,
        jobs: Arc<JobStore>,
        users: Arc<UserStore>,
        dispatcher: Arc<ReminderDispatcher>,
    ) -> Self {
        let sessions = SessionStore::new(&config.session.secret, config.session.ttl_hours);
        let oauth = DiscordOAuth::new(&config.discord);
        Self {
            config,
            jobs,
            users,
            sessions,
            oauth,
            dispatcher,
        }
    }
}

/// Assemble the full Axum router.
///
/// Routes registered before the session middleware are gated by it; the
/// pages, health, and OAuth routes below stay open.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/api/jobs",
            get(crate::http::jobs::list_jobs).post(crate::http::jobs::create_job),
        )
        .route(
            "/api/jobs/{id}",
            put(crate::http::jobs::update_job).delete(crate::http::jobs::delete_job),
        )
        .route("/api/stats", get(crate::http::stats::stats_handler))
        .route("/api/user", get(crate::http::users::current_user))
        .route(
            "/api/user/settings",
            get(crate::http::users::get_settings).put(crate::http::users::update_settings),
        )
        .route("/test-email", get(crate::http::reminders::test_email))
        .layer(from_fn_with_state(
            state.clone(),
            crate::session::require_session,
        ))
        .route("/", get(crate::http::ui::index_handler))
        .route("/login.html", get(crate::http::ui::login_handler))
        .route("/health", get(crate::http::health::health_handler))
        .route("/auth/discord", get(crate::http::auth::login))
        .route("/auth/discord/callback", get(crate::http::auth::callback))
        .route("/logout", get(crate::http::auth::logout))
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(tower_http::cors::CorsLayer::permissive())
}
