use std::sync::Arc;

use axum::{extract::State, Json};

use jobtrack_core::types::JobStats;

use crate::app::AppState;
use crate::error::Result;

/// GET /api/stats — the dashboard's headline counts: total plus one count
/// per status.
pub async fn stats_handler(State(state): State<Arc<AppState>>) -> Result<Json<JobStats>> {
    Ok(Json(state.jobs.stats()?))
}
