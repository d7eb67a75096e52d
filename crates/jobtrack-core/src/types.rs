use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of an application. Stored and serialized capitalized
/// ("Applied") — the dashboard uses the literal value for status badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum JobStatus {
    #[default]
    Applied,
    Interviewing,
    Offer,
    Rejected,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobStatus::Applied => "Applied",
            JobStatus::Interviewing => "Interviewing",
            JobStatus::Offer => "Offer",
            JobStatus::Rejected => "Rejected",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Applied" => Ok(JobStatus::Applied),
            "Interviewing" => Ok(JobStatus::Interviewing),
            "Offer" => Ok(JobStatus::Offer),
            "Rejected" => Ok(JobStatus::Rejected),
            other => Err(format!("unknown job status: {other}")),
        }
    }
}

/// How often a user wants reminder emails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReminderFrequency {
    Daily,
    TwiceWeekly,
    Weekly,
    Monthly,
    /// Only on the weekdays listed in `custom_dates`.
    Custom,
    #[default]
    None,
}

impl fmt::Display for ReminderFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReminderFrequency::Daily => "daily",
            ReminderFrequency::TwiceWeekly => "twice_weekly",
            ReminderFrequency::Weekly => "weekly",
            ReminderFrequency::Monthly => "monthly",
            ReminderFrequency::Custom => "custom",
            ReminderFrequency::None => "none",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for ReminderFrequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "daily" => Ok(ReminderFrequency::Daily),
            "twice_weekly" => Ok(ReminderFrequency::TwiceWeekly),
            "weekly" => Ok(ReminderFrequency::Weekly),
            "monthly" => Ok(ReminderFrequency::Monthly),
            "custom" => Ok(ReminderFrequency::Custom),
            "none" => Ok(ReminderFrequency::None),
            other => Err(format!("unknown reminder frequency: {other}")),
        }
    }
}

/// Long English day name as it appears on the wire and in storage ("Monday").
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Parse a long English day name, case-insensitively. Abbreviations are
/// rejected — settings payloads must carry the full name.
pub fn parse_weekday(name: &str) -> Option<Weekday> {
    match name.to_ascii_lowercase().as_str() {
        "monday" => Some(Weekday::Mon),
        "tuesday" => Some(Weekday::Tue),
        "wednesday" => Some(Weekday::Wed),
        "thursday" => Some(Weekday::Thu),
        "friday" => Some(Weekday::Fri),
        "saturday" => Some(Weekday::Sat),
        "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Serde adapter for weekday lists: `["Monday", "Friday"]` on the wire,
/// `Vec<Weekday>` in memory.
pub mod weekday_names {
    use chrono::Weekday;
    use serde::de::Error as _;
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(days: &[Weekday], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(days.len()))?;
        for day in days {
            seq.serialize_element(super::weekday_name(*day))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Weekday>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let names: Vec<String> = Vec::deserialize(deserializer)?;
        names
            .iter()
            .map(|n| {
                super::parse_weekday(n)
                    .ok_or_else(|| D::Error::custom(format!("unknown weekday name: {n}")))
            })
            .collect()
    }
}

/// A persisted application record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i64,
    pub company: String,
    pub position: String,
    pub status: JobStatus,
    /// Calendar date the application went out (YYYY-MM-DD).
    pub date_applied: NaiveDate,
    pub notes: Option<String>,
    /// ISO-8601 timestamp of row creation.
    pub created_at: String,
    /// ISO-8601 timestamp of the last update.
    pub updated_at: String,
}

/// Fields for inserting a new job row. Validation happens at the API
/// boundary; by the time this struct exists the values are well-formed.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub company: String,
    pub position: String,
    pub status: JobStatus,
    pub date_applied: NaiveDate,
    pub notes: Option<String>,
}

/// Partial job update. `None` fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct JobPatch {
    pub company: Option<String>,
    pub position: Option<String>,
    pub status: Option<JobStatus>,
    pub date_applied: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Aggregate counts over the jobs table. Each field is computed by its own
/// COUNT(*) query, so `total` matching the sum is a property of the data,
/// not of the query.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct JobStats {
    pub total: i64,
    pub applied: i64,
    pub interviewing: i64,
    pub offer: i64,
    pub rejected: i64,
}

/// A registered user. Created on first Discord login, refreshed on every
/// subsequent login; reminder settings are only touched by the settings
/// endpoint and the dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    /// Discord snowflake — the stable external identity key.
    pub discord_id: String,
    pub username: Option<String>,
    pub discriminator: Option<String>,
    pub avatar: Option<String>,
    pub email: Option<String>,
    pub reminder_frequency: ReminderFrequency,
    /// Weekdays for `custom` frequency. Empty for every other frequency,
    /// and empty when the stored list fails to parse.
    #[serde(with = "weekday_names")]
    pub custom_dates: Vec<Weekday>,
    pub last_reminder_sent: Option<DateTime<Utc>>,
    pub created_at: String,
    pub updated_at: String,
}

/// Profile fields captured from Discord at login, used for the upsert.
#[derive(Debug, Clone)]
pub struct DiscordIdentity {
    pub discord_id: String,
    pub username: Option<String>,
    pub discriminator: Option<String>,
    pub avatar: Option<String>,
    pub email: Option<String>,
}
