//! `jobtrack-reminders` — hourly reminder sweeps over the user base.
//!
//! # Overview
//!
//! [`scheduler::ReminderScheduler`] wakes at the top of every hour and runs
//! one [`dispatcher::ReminderDispatcher`] sweep: load the candidate users,
//! check each one's window with [`eligibility::reminder_due`], compose and
//! send the email, record the send.
//!
//! # Frequency windows
//!
//! | Frequency      | Due when                                        |
//! |----------------|-------------------------------------------------|
//! | `daily`        | 24 h since the last send                        |
//! | `twice_weekly` | 84 h since the last send                        |
//! | `weekly`       | 168 h since the last send                       |
//! | `monthly`      | 720 h since the last send                       |
//! | `custom`       | today is a chosen weekday and 20 h have passed  |
//! | `none`         | never                                           |

pub mod dispatcher;
pub mod eligibility;
pub mod error;
pub mod scheduler;

pub use dispatcher::{ReminderDispatcher, SweepReport};
pub use error::{ReminderError, Result};
pub use scheduler::ReminderScheduler;
