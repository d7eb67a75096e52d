//! Job CRUD endpoints under `/api/jobs`.
//!
//! All routes sit behind the session gate. Bodies and replies are camelCase
//! JSON; failures are `{"error": "..."}`.
//!
//! GET    /api/jobs       all jobs, newest application date first
//! POST   /api/jobs       201 + stored job
//! PUT    /api/jobs/{id}  partial update, 200 + updated job
//! DELETE /api/jobs/{id}  204 on success

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use jobtrack_core::types::{Job, JobPatch, JobStatus, NewJob};

use crate::app::AppState;
use crate::error::{ApiError, Result};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    // Defaulted so a missing key reads as empty and fails our validation
    // instead of serde's.
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub position: String,
    pub status: Option<String>,
    pub date_applied: Option<String>,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobRequest {
    pub company: Option<String>,
    pub position: Option<String>,
    pub status: Option<String>,
    pub date_applied: Option<String>,
    pub notes: Option<String>,
}

/// GET /api/jobs — every job, `dateApplied` descending.
pub async fn list_jobs(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Job>>> {
    Ok(Json(state.jobs.list()?))
}

/// POST /api/jobs — validate and insert. Nothing persists on a validation
/// failure.
pub async fn create_job(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<Job>)> {
    if req.company.trim().is_empty() || req.position.trim().is_empty() {
        return Err(ApiError::Validation(
            "Company and position are required".to_string(),
        ));
    }
    let status = parse_status(req.status.as_deref())?.unwrap_or_default();
    let date_applied = match parse_date(req.date_applied.as_deref())? {
        Some(date) => date,
        None => Utc::now().date_naive(),
    };

    let job = state.jobs.create(NewJob {
        company: req.company,
        position: req.position,
        status,
        date_applied,
        notes: req.notes,
    })?;
    Ok((StatusCode::CREATED, Json(job)))
}

/// PUT /api/jobs/{id} — merge the provided fields into the stored row.
pub async fn update_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateJobRequest>,
) -> Result<Json<Job>> {
    for field in [&req.company, &req.position] {
        if let Some(value) = field {
            if value.trim().is_empty() {
                return Err(ApiError::Validation(
                    "Company and position are required".to_string(),
                ));
            }
        }
    }
    let patch = JobPatch {
        company: req.company,
        position: req.position,
        status: parse_status(req.status.as_deref())?,
        date_applied: parse_date(req.date_applied.as_deref())?,
        notes: req.notes,
    };

    match state.jobs.update(id, patch)? {
        Some(job) => Ok(Json(job)),
        None => Err(ApiError::NotFound("Job")),
    }
}

/// DELETE /api/jobs/{id} — 204 with an empty body.
pub async fn delete_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    if state.jobs.delete(id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Job"))
    }
}

fn parse_status(raw: Option<&str>) -> Result<Option<JobStatus>> {
    match raw {
        None => Ok(None),
        Some(s) => s
            .parse::<JobStatus>()
            .map(Some)
            .map_err(ApiError::Validation),
    }
}

fn parse_date(raw: Option<&str>) -> Result<Option<NaiveDate>> {
    match raw {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                ApiError::Validation("dateApplied must be formatted YYYY-MM-DD".to_string())
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parsing_accepts_the_four_capitalized_names() {
        assert_eq!(
            parse_status(Some("Interviewing")).unwrap(),
            Some(JobStatus::Interviewing)
        );
        assert_eq!(parse_status(None).unwrap(), None);
        assert!(parse_status(Some("applied")).is_err());
        assert!(parse_status(Some("Ghosted")).is_err());
    }

    #[test]
    fn date_parsing_wants_iso_dates() {
        assert_eq!(
            parse_date(Some("2024-03-09")).unwrap(),
            Some(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap())
        );
        assert_eq!(parse_date(None).unwrap(), None);
        assert!(parse_date(Some("03/09/2024")).is_err());
        assert!(parse_date(Some("2024-13-01")).is_err());
    }
}
