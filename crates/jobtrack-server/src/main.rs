use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

use jobtrack_server::app;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jobtrack_server=info,tower_http=debug".into()),
        )
        .init();

    // load config: explicit path > JOBTRACK_CONFIG env > ~/.jobtrack/jobtrack.toml
    let config_path = std::env::var("JOBTRACK_CONFIG").ok();
    let config = jobtrack_core::JobtrackConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        jobtrack_core::JobtrackConfig::default()
    });

    let bind = config.server.bind.clone();
    let port = config.server.port;

    // initialize SQLite database — one file for jobs and users
    let db_path = config.database.path.clone();
    ensure_parent_dir(&db_path);
    info!(path = %db_path, "opening SQLite database");

    let db = jobtrack_store::db::open(&db_path)?;
    jobtrack_store::db::init_db(&db)?;
    info!("database migrations complete");

    // each store gets its own connection for thread safety
    let jobs = Arc::new(jobtrack_store::JobStore::new(jobtrack_store::db::open(
        &db_path,
    )?));
    let users = Arc::new(jobtrack_store::UserStore::new(jobtrack_store::db::open(
        &db_path,
    )?));

    let mailer: Arc<dyn jobtrack_mailer::MailTransport> =
        Arc::new(jobtrack_mailer::MailerSend::new(
            config.mail.api_key.clone(),
            config.mail.from_email.clone(),
            config.mail.from_name.clone(),
            Some(config.mail.api_base.clone()),
        ));
    let dispatcher = Arc::new(jobtrack_reminders::ReminderDispatcher::new(
        Arc::clone(&users),
        Arc::clone(&jobs),
        mailer,
        config.server.public_url.clone(),
    ));

    // hourly reminder sweeps in the background
    let scheduler = jobtrack_reminders::ReminderScheduler::spawn(Arc::clone(&dispatcher));

    let state = Arc::new(app::AppState::new(config, jobs, users, dispatcher));
    let router = app::build_router(state);

    let addr: SocketAddr = format!("{}:{}", bind, port).parse()?;
    info!("Job tracker listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    scheduler.shutdown().await;
    Ok(())
}

/// Ensure the parent directory for a file path exists.
fn ensure_parent_dir(path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
}
