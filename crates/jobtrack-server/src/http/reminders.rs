use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::Utc;

use jobtrack_reminders::SweepReport;

use crate::app::AppState;
use crate::error::Result;

/// GET /test-email — run one reminder sweep inline and report what it did.
///
/// Debug path for checking mail configuration without waiting for the top
/// of the hour. Session-gated like the rest of the API.
pub async fn test_email(State(state): State<Arc<AppState>>) -> Result<Json<SweepReport>> {
    let report = state.dispatcher.run_sweep(Utc::now()).await?;
    Ok(Json(report))
}
