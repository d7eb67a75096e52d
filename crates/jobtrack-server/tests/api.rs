//! Integration tests for the HTTP surface: routes, auth gate, validation,
//! and the JSON shapes the dashboard depends on. Each test gets its own
//! temp-file database and a pre-seeded logged-in user.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceExt;

use jobtrack_core::types::DiscordIdentity;
use jobtrack_core::JobtrackConfig;
use jobtrack_mailer::{MailTransport, OutboundEmail};
use jobtrack_reminders::ReminderDispatcher;
use jobtrack_server::app::{build_router, AppState};
use jobtrack_store::{db, JobStore, UserStore};

struct NullMailer;

#[async_trait::async_trait]
impl MailTransport for NullMailer {
    fn name(&self) -> &str {
        "null"
    }
    async fn send(&self, _email: &OutboundEmail) -> jobtrack_mailer::Result<()> {
        Ok(())
    }
}

struct TestServer {
    app: Router,
    cookie: String,
    _dir: tempfile::TempDir,
}

fn test_server() -> TestServer {
    test_server_with(JobtrackConfig::default())
}

fn test_server_with(config: JobtrackConfig) -> TestServer {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("jobtrack.db").to_str().unwrap().to_string();

    let conn = db::open(&db_path).unwrap();
    db::init_db(&conn).unwrap();

    let jobs = Arc::new(JobStore::new(db::open(&db_path).unwrap()));
    let users = Arc::new(UserStore::new(db::open(&db_path).unwrap()));
    let mailer: Arc<dyn MailTransport> = Arc::new(NullMailer);
    let dispatcher = Arc::new(ReminderDispatcher::new(
        Arc::clone(&users),
        Arc::clone(&jobs),
        mailer,
        "http://localhost:3000".to_string(),
    ));

    let seeded = users
        .upsert_discord(DiscordIdentity {
            discord_id: "99990000111122223".to_string(),
            username: Some("alice".to_string()),
            discriminator: Some("0".to_string()),
            avatar: None,
            email: Some("alice@example.com".to_string()),
        })
        .unwrap();

    let state = Arc::new(AppState::new(config, jobs, users, dispatcher));
    let token = state.sessions.create(seeded.id);

    TestServer {
        app: build_router(state),
        cookie: format!("jobtrack_session={token}"),
        _dir: dir,
    }
}

async fn send(
    app: &Router,
    method: &str,
    path: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

async fn send_json(
    app: &Router,
    method: &str,
    path: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let response = send(app, method, path, cookie, body).await;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

impl TestServer {
    async fn get(&self, path: &str) -> (StatusCode, Value) {
        send_json(&self.app, "GET", path, Some(self.cookie.as_str()), None).await
    }
    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        send_json(&self.app, "POST", path, Some(self.cookie.as_str()), Some(body)).await
    }
    async fn put(&self, path: &str, body: Value) -> (StatusCode, Value) {
        send_json(&self.app, "PUT", path, Some(self.cookie.as_str()), Some(body)).await
    }
    async fn delete(&self, path: &str) -> (StatusCode, Value) {
        send_json(&self.app, "DELETE", path, Some(self.cookie.as_str()), None).await
    }
}

// ── jobs ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_company_or_position_is_rejected_and_nothing_persists() {
    let server = test_server();

    let (status, body) = server
        .post("/api/jobs", json!({ "position": "Engineer" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Company and position are required");

    let (status, _) = server
        .post("/api/jobs", json!({ "company": "Acme", "position": "  " }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = server.get("/api/jobs").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn create_round_trips_and_lists_newest_application_first() {
    let server = test_server();

    let (status, first) = server
        .post(
            "/api/jobs",
            json!({
                "company": "Acme",
                "position": "Engineer",
                "status": "Interviewing",
                "dateApplied": "2024-01-05",
                "notes": "phone screen Friday"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["company"], "Acme");
    assert_eq!(first["status"], "Interviewing");
    assert_eq!(first["dateApplied"], "2024-01-05");
    assert_eq!(first["notes"], "phone screen Friday");

    let (status, second) = server
        .post(
            "/api/jobs",
            json!({ "company": "Globex", "position": "Analyst", "dateApplied": "2024-01-10" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(second["status"], "Applied");

    let (_, list) = server.get("/api/jobs").await;
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["company"], "Globex");
    assert_eq!(list[1]["company"], "Acme");
}

#[tokio::test]
async fn create_defaults_the_date_to_today() {
    let server = test_server();

    let (status, body) = server
        .post("/api/jobs", json!({ "company": "Acme", "position": "Engineer" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        body["dateApplied"].as_str().unwrap(),
        Utc::now().date_naive().to_string()
    );
}

#[tokio::test]
async fn bad_status_and_bad_date_are_rejected() {
    let server = test_server();

    let (status, _) = server
        .post(
            "/api/jobs",
            json!({ "company": "Acme", "position": "Engineer", "status": "Ghosted" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = server
        .post(
            "/api/jobs",
            json!({ "company": "Acme", "position": "Engineer", "dateApplied": "01/05/2024" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "dateApplied must be formatted YYYY-MM-DD");

    let (_, list) = server.get("/api/jobs").await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn update_merges_only_the_provided_fields() {
    let server = test_server();

    let (_, job) = server
        .post(
            "/api/jobs",
            json!({ "company": "Acme", "position": "Engineer", "dateApplied": "2024-01-05" }),
        )
        .await;
    let id = job["id"].as_i64().unwrap();

    let (status, updated) = server
        .put(&format!("/api/jobs/{id}"), json!({ "status": "Offer" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "Offer");
    assert_eq!(updated["company"], "Acme");
    assert_eq!(updated["dateApplied"], "2024-01-05");

    let (status, _) = server
        .put(&format!("/api/jobs/{id}"), json!({ "company": "" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = server
        .put("/api/jobs/9999", json!({ "status": "Offer" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Job not found");
}

#[tokio::test]
async fn delete_removes_the_row_and_repeats_are_404() {
    let server = test_server();

    let (_, job) = server
        .post("/api/jobs", json!({ "company": "Acme", "position": "Engineer" }))
        .await;
    let id = job["id"].as_i64().unwrap();

    let (status, body) = server.delete(&format!("/api/jobs/{id}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (_, list) = server.get("/api/jobs").await;
    assert!(list
        .as_array()
        .unwrap()
        .iter()
        .all(|j| j["id"].as_i64() != Some(id)));

    let (status, _) = server.delete(&format!("/api/jobs/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = server
        .put(&format!("/api/jobs/{id}"), json!({ "status": "Offer" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── stats ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn stats_total_equals_the_sum_of_the_status_counts() {
    let server = test_server();

    for (status, n) in [("Applied", 2), ("Interviewing", 1), ("Offer", 1), ("Rejected", 1)] {
        for i in 0..n {
            let (code, _) = server
                .post(
                    "/api/jobs",
                    json!({ "company": format!("{status}-{i}"), "position": "x", "status": status }),
                )
                .await;
            assert_eq!(code, StatusCode::CREATED);
        }
    }

    let (status, stats) = server.get("/api/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["applied"], 2);
    assert_eq!(stats["interviewing"], 1);
    assert_eq!(stats["offer"], 1);
    assert_eq!(stats["rejected"], 1);
    let sum = stats["applied"].as_i64().unwrap()
        + stats["interviewing"].as_i64().unwrap()
        + stats["offer"].as_i64().unwrap()
        + stats["rejected"].as_i64().unwrap();
    assert_eq!(stats["total"].as_i64().unwrap(), sum);
}

#[tokio::test]
async fn a_new_application_shows_up_in_stats() {
    let server = test_server();

    let (_, stats) = server.get("/api/stats").await;
    assert_eq!(stats["applied"], 0);

    server
        .post(
            "/api/jobs",
            json!({ "company": "Acme", "position": "Engineer", "status": "Applied" }),
        )
        .await;

    let (_, stats) = server.get("/api/stats").await;
    assert!(stats["applied"].as_i64().unwrap() >= 1);
}

// ── auth gate ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn unauthenticated_requests_are_rejected_with_no_side_effects() {
    let server = test_server();

    let (status, body) = send_json(
        &server.app,
        "POST",
        "/api/jobs",
        None,
        Some(json!({ "company": "Acme", "position": "Engineer" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");

    let (status, _) = send_json(&server.app, "GET", "/api/stats", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // A syntactically plausible but unsigned token is still a 401.
    let (status, _) = send_json(
        &server.app,
        "GET",
        "/api/user",
        Some("jobtrack_session=deadbeef.deadbeef"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, list) = server.get("/api/jobs").await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn current_user_reflects_the_seeded_profile() {
    let server = test_server();

    let (status, user) = server.get("/api/user").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["username"], "alice");
    assert_eq!(user["discordId"], "99990000111122223");
    assert_eq!(user["email"], "alice@example.com");
    assert_eq!(user["reminderFrequency"], "none");
    assert_eq!(user["customDates"], json!([]));
}

#[tokio::test]
async fn logout_invalidates_the_session() {
    let server = test_server();

    let response = send(
        &server.app,
        "GET",
        "/logout",
        Some(server.cookie.as_str()),
        None,
    )
    .await;
    assert!(response.status().is_redirection());
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/login.html"
    );
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(set_cookie.starts_with("jobtrack_session="));

    let (status, _) = server.get("/api/user").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ── pages and health ────────────────────────────────────────────────────────

#[tokio::test]
async fn index_bounces_logged_out_visitors_to_the_login_page() {
    let server = test_server();

    let response = send(&server.app, "GET", "/", None, None).await;
    assert!(response.status().is_redirection());
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/login.html"
    );

    let response = send(&server.app, "GET", "/", Some(server.cookie.as_str()), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&server.app, "GET", "/login.html", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn health_needs_no_session() {
    let server = test_server();

    let (status, body) = send_json(&server.app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(!body["version"].as_str().unwrap().is_empty());
}

// ── oauth endpoints ─────────────────────────────────────────────────────────

#[tokio::test]
async fn login_redirects_to_discord_when_configured() {
    let mut config = JobtrackConfig::default();
    config.discord.client_id = "12345".to_string();
    config.discord.client_secret = "hunter2".to_string();
    let server = test_server_with(config);

    let response = send(&server.app, "GET", "/auth/discord", None, None).await;
    assert!(response.status().is_redirection());
    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(location.starts_with("https://discord.com/oauth2/authorize"));
    assert!(location.contains("client_id=12345"));
    assert!(location.contains("scope=identify+email"));
}

#[tokio::test]
async fn login_without_credentials_is_a_400() {
    let server = test_server();

    let (status, body) = send_json(&server.app, "GET", "/auth/discord", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Discord login is not configured");
}

#[tokio::test]
async fn callback_with_an_unknown_state_is_unauthorized() {
    let server = test_server();

    let (status, body) = send_json(
        &server.app,
        "GET",
        "/auth/discord/callback?code=abc&state=never-issued",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");
}

// ── settings ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn settings_round_trip_through_the_api() {
    let server = test_server();

    let (status, settings) = server.get("/api/user/settings").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(settings["reminderFrequency"], "none");
    assert_eq!(settings["customDates"], json!([]));

    let (status, updated) = server
        .put(
            "/api/user/settings",
            json!({ "reminderFrequency": "custom", "customDates": ["Monday", "Friday"] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["reminderFrequency"], "custom");
    assert_eq!(updated["customDates"], json!(["Monday", "Friday"]));

    let (_, settings) = server.get("/api/user/settings").await;
    assert_eq!(settings["customDates"], json!(["Monday", "Friday"]));

    let (_, user) = server.get("/api/user").await;
    assert_eq!(user["reminderFrequency"], "custom");
    assert_eq!(user["customDates"], json!(["Monday", "Friday"]));

    // An absent customDates clears the stored list.
    let (status, updated) = server
        .put("/api/user/settings", json!({ "reminderFrequency": "weekly" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["customDates"], json!([]));
}

#[tokio::test]
async fn settings_validation_rejects_bad_input() {
    let server = test_server();

    let (status, body) = server
        .put("/api/user/settings", json!({ "reminderFrequency": "sometimes" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid reminder frequency");

    let (status, body) = server
        .put(
            "/api/user/settings",
            json!({ "reminderFrequency": "custom", "customDates": [] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "customDates is required for a custom frequency");

    let (status, body) = server
        .put(
            "/api/user/settings",
            json!({ "reminderFrequency": "custom", "customDates": ["Funday"] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Funday"));

    // Nothing stuck from the failed updates.
    let (_, settings) = server.get("/api/user/settings").await;
    assert_eq!(settings["reminderFrequency"], "none");
}

// ── reminder sweep ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_email_runs_a_sweep_and_reports_counts() {
    let server = test_server();

    // Nobody opted in yet.
    let (status, report) = server.get("/test-email").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["candidates"], 0);
    assert_eq!(report["sent"], 0);

    server
        .put("/api/user/settings", json!({ "reminderFrequency": "daily" }))
        .await;

    let (status, report) = server.get("/test-email").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["candidates"], 1);
    assert_eq!(report["sent"], 1);
    assert_eq!(report["failed"], 0);

    // The send was recorded, so an immediate second sweep skips the user.
    let (_, report) = server.get("/test-email").await;
    assert_eq!(report["skipped"], 1);
    assert_eq!(report["sent"], 0);

    let (status, _) = send_json(&server.app, "GET", "/test-email", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
