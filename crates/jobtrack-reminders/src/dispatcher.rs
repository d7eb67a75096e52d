use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use jobtrack_core::types::{JobStats, User};
use jobtrack_mailer::{MailTransport, OutboundEmail};
use jobtrack_store::{JobStore, UserStore};

use crate::eligibility::reminder_due;
use crate::error::Result;

/// Outcome of one sweep, suitable for logging or an HTTP reply.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SweepReport {
    /// Users with an address on file and an active frequency.
    pub candidates: usize,
    pub sent: usize,
    /// Candidates whose window has not elapsed yet.
    pub skipped: usize,
    pub failed: usize,
}

/// Walks the candidate users and emails everyone whose window has elapsed.
///
/// The stats in the email are counted over the whole jobs table, matching
/// the dashboard. With several active users each would see combined
/// numbers; per-user scoping needs an owner column on jobs first.
pub struct ReminderDispatcher {
    users: Arc<UserStore>,
    jobs: Arc<JobStore>,
    mailer: Arc<dyn MailTransport>,
    dashboard_url: String,
}

impl ReminderDispatcher {
    pub fn new(
        users: Arc<UserStore>,
        jobs: Arc<JobStore>,
        mailer: Arc<dyn MailTransport>,
        dashboard_url: String,
    ) -> Self {
        Self {
            users,
            jobs,
            mailer,
            dashboard_url,
        }
    }

    /// Run one sweep at `now`. A failure for one user never blocks the
    /// rest; only the candidate query itself aborts the sweep.
    pub async fn run_sweep(&self, now: DateTime<Utc>) -> Result<SweepReport> {
        let candidates = self.users.reminder_candidates()?;
        let mut report = SweepReport {
            candidates: candidates.len(),
            ..Default::default()
        };

        for user in candidates {
            let due = reminder_due(
                user.reminder_frequency,
                &user.custom_dates,
                user.last_reminder_sent,
                now,
            );
            if !due {
                report.skipped += 1;
                continue;
            }
            match self.remind(&user, now).await {
                Ok(()) => report.sent += 1,
                Err(e) => {
                    warn!(user_id = user.id, "reminder failed: {e}");
                    report.failed += 1;
                }
            }
        }

        info!(
            candidates = report.candidates,
            sent = report.sent,
            skipped = report.skipped,
            failed = report.failed,
            "reminder sweep complete"
        );
        Ok(report)
    }

    async fn remind(&self, user: &User, now: DateTime<Utc>) -> Result<()> {
        let stats = self.jobs.stats()?;
        let email = compose_reminder(user, &stats, &self.dashboard_url);
        self.mailer.send(&email).await?;
        // Recorded only after the transport accepted the message, so a
        // failed send stays due next sweep.
        self.users.mark_reminder_sent(user.id, now)?;
        info!(user_id = user.id, "reminder sent");
        Ok(())
    }
}

/// Build the reminder message for one user. "Active" means applications
/// still in the Applied state.
fn compose_reminder(user: &User, stats: &JobStats, dashboard_url: &str) -> OutboundEmail {
    let username = user.username.as_deref().unwrap_or("there");
    let html = format!(
        "<h1>Hello {username},</h1>\
         <p>Here is your job application summary:</p>\
         <ul>\
         <li><strong>Total Applications:</strong> {total}</li>\
         <li><strong>Active Applications:</strong> {active}</li>\
         </ul>\
         <p>Don't forget to follow up!</p>\
         <p><a href=\"{dashboard_url}\">Go to Dashboard</a></p>",
        total = stats.total,
        active = stats.applied,
    );
    let text = format!(
        "Hello {username}, You have {active} active job applications. Don't forget to follow up!",
        active = stats.applied,
    );
    OutboundEmail {
        to_email: user.email.clone().unwrap_or_default(),
        to_name: user.username.clone(),
        subject: "Job Application Reminder".to_string(),
        html,
        text,
    }
}
