//! Current-user and reminder-settings endpoints.
//!
//! GET /api/user           the session's user, camelCase JSON
//! GET /api/user/settings  the slice the settings modal edits
//! PUT /api/user/settings  validate and persist reminder settings

use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use chrono::Weekday;
use serde::{Deserialize, Serialize};

use jobtrack_core::types::{parse_weekday, weekday_name, ReminderFrequency, User};

use crate::app::AppState;
use crate::error::{ApiError, Result};

/// GET /api/user — whoever the session cookie says we are.
pub async fn current_user(Extension(user): Extension<Arc<User>>) -> Json<User> {
    Json((*user).clone())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsReply {
    pub reminder_frequency: ReminderFrequency,
    pub custom_dates: Vec<String>,
}

impl SettingsReply {
    fn from_user(user: &User) -> Self {
        Self {
            reminder_frequency: user.reminder_frequency,
            custom_dates: user
                .custom_dates
                .iter()
                .map(|day| weekday_name(*day).to_string())
                .collect(),
        }
    }
}

/// GET /api/user/settings — reminder frequency and custom day list.
pub async fn get_settings(Extension(user): Extension<Arc<User>>) -> Json<SettingsReply> {
    Json(SettingsReply::from_user(&user))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsRequest {
    pub email: Option<String>,
    pub reminder_frequency: Option<String>,
    pub custom_dates: Option<Vec<String>>,
}

/// PUT /api/user/settings — validate and persist.
///
/// An absent `reminderFrequency` keeps the current one; an absent
/// `customDates` clears the stored list. An absent `email` leaves the
/// stored address alone.
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<Arc<User>>,
    Json(req): Json<SettingsRequest>,
) -> Result<Json<SettingsReply>> {
    let frequency = match req.reminder_frequency.as_deref() {
        None => user.reminder_frequency,
        Some(raw) => raw
            .parse::<ReminderFrequency>()
            .map_err(|_| ApiError::Validation("Invalid reminder frequency".to_string()))?,
    };

    let mut custom_dates: Vec<Weekday> = Vec::new();
    for name in req.custom_dates.unwrap_or_default() {
        match parse_weekday(&name) {
            Some(day) => custom_dates.push(day),
            None => {
                return Err(ApiError::Validation(format!(
                    "Invalid weekday in customDates: {name}"
                )))
            }
        }
    }

    if frequency == ReminderFrequency::Custom && custom_dates.is_empty() {
        return Err(ApiError::Validation(
            "customDates is required for a custom frequency".to_string(),
        ));
    }

    match state
        .users
        .update_settings(user.id, req.email, frequency, &custom_dates)?
    {
        Some(updated) => Ok(Json(SettingsReply::from_user(&updated))),
        None => Err(ApiError::NotFound("User")),
    }
}
