use std::str::FromStr;
use std::sync::Mutex;

use chrono::{DateTime, Utc, Weekday};
use rusqlite::{params, Connection};
use tracing::debug;

use jobtrack_core::types::{
    parse_weekday, weekday_name, DiscordIdentity, ReminderFrequency, User,
};

use crate::error::Result;

const USER_SELECT_SQL: &str = "SELECT id, discord_id, username, discriminator, avatar, email, \
     reminder_frequency, custom_dates, last_reminder_sent, created_at, updated_at FROM users";

/// Map a SELECT row (column order from USER_SELECT_SQL) to a User.
/// Unparseable reminder settings degrade to safe values (frequency none,
/// empty day list, no last-sent timestamp) instead of failing the query.
pub(crate) fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let reminder_frequency =
        ReminderFrequency::from_str(&row.get::<_, String>(6)?).unwrap_or_default();
    let names: Vec<String> = serde_json::from_str(&row.get::<_, String>(7)?).unwrap_or_default();
    let custom_dates = names.iter().filter_map(|n| parse_weekday(n)).collect();
    let last_reminder_sent = row
        .get::<_, Option<String>>(8)?
        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| dt.with_timezone(&Utc));
    Ok(User {
        id: row.get(0)?,
        discord_id: row.get(1)?,
        username: row.get(2)?,
        discriminator: row.get(3)?,
        avatar: row.get(4)?,
        email: row.get(5)?,
        reminder_frequency,
        custom_dates,
        last_reminder_sent,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

/// Accounts keyed on Discord identity, plus their reminder settings.
pub struct UserStore {
    db: Mutex<Connection>,
}

impl UserStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Mutex::new(conn),
        }
    }

    /// Find-or-create by Discord id, refreshing the profile fields on every
    /// login. Reminder settings and last_reminder_sent are never touched
    /// here; only the settings endpoint and the dispatcher write those.
    pub fn upsert_discord(&self, identity: DiscordIdentity) -> Result<User> {
        let db = self.db.lock().unwrap();
        let now = Utc::now().to_rfc3339();
        match fetch_by_discord_id(&db, &identity.discord_id)? {
            Some(user) => {
                db.execute(
                    "UPDATE users SET username=?1, discriminator=?2, avatar=?3, email=?4,
                     updated_at=?5 WHERE id=?6",
                    params![
                        identity.username,
                        identity.discriminator,
                        identity.avatar,
                        identity.email,
                        now,
                        user.id
                    ],
                )?;
                debug!(user_id = user.id, "user profile refreshed");
                Ok(User {
                    username: identity.username,
                    discriminator: identity.discriminator,
                    avatar: identity.avatar,
                    email: identity.email,
                    updated_at: now,
                    ..user
                })
            }
            None => {
                db.execute(
                    "INSERT INTO users (discord_id, username, discriminator, avatar, email,
                     reminder_frequency, custom_dates, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, 'none', '[]', ?6, ?7)",
                    params![
                        identity.discord_id,
                        identity.username,
                        identity.discriminator,
                        identity.avatar,
                        identity.email,
                        now,
                        now
                    ],
                )?;
                let id = db.last_insert_rowid();
                debug!(user_id = id, discord_id = %identity.discord_id, "user created");
                Ok(User {
                    id,
                    discord_id: identity.discord_id,
                    username: identity.username,
                    discriminator: identity.discriminator,
                    avatar: identity.avatar,
                    email: identity.email,
                    reminder_frequency: ReminderFrequency::None,
                    custom_dates: Vec::new(),
                    last_reminder_sent: None,
                    created_at: now.clone(),
                    updated_at: now,
                })
            }
        }
    }

    pub fn get(&self, id: i64) -> Result<Option<User>> {
        let db = self.db.lock().unwrap();
        fetch(&db, id)
    }

    /// Persist reminder settings. A None email leaves the stored address
    /// alone. Returns None when no row has this id.
    pub fn update_settings(
        &self,
        id: i64,
        email: Option<String>,
        frequency: ReminderFrequency,
        custom_dates: &[Weekday],
    ) -> Result<Option<User>> {
        let db = self.db.lock().unwrap();
        let now = Utc::now().to_rfc3339();
        let names: Vec<&str> = custom_dates.iter().map(|d| weekday_name(*d)).collect();
        let encoded = serde_json::to_string(&names)?;
        let rows = match email {
            Some(ref email) => db.execute(
                "UPDATE users SET email=?1, reminder_frequency=?2, custom_dates=?3,
                 updated_at=?4 WHERE id=?5",
                params![email, frequency.to_string(), encoded, now, id],
            )?,
            None => db.execute(
                "UPDATE users SET reminder_frequency=?1, custom_dates=?2, updated_at=?3
                 WHERE id=?4",
                params![frequency.to_string(), encoded, now, id],
            )?,
        };
        if rows == 0 {
            return Ok(None);
        }
        debug!(user_id = id, frequency = %frequency, "reminder settings updated");
        fetch(&db, id)
    }

    /// Record a successful reminder send. Called only after the mailer
    /// accepted the message, so a failed send stays due next sweep.
    pub fn mark_reminder_sent(&self, id: i64, at: DateTime<Utc>) -> Result<()> {
        let db = self.db.lock().unwrap();
        db.execute(
            "UPDATE users SET last_reminder_sent=?1, updated_at=?2 WHERE id=?3",
            params![at.to_rfc3339(), Utc::now().to_rfc3339(), id],
        )?;
        Ok(())
    }

    /// Users who could receive a reminder at all: an address on file and a
    /// frequency other than none. Whether one is actually due is a
    /// per-window decision made by the caller.
    pub fn reminder_candidates(&self) -> Result<Vec<User>> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare(&format!(
            "{USER_SELECT_SQL} WHERE reminder_frequency != 'none' AND email IS NOT NULL"
        ))?;
        let users = stmt
            .query_map([], row_to_user)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(users)
    }
}

fn fetch(conn: &Connection, id: i64) -> Result<Option<User>> {
    match conn.query_row(
        &format!("{USER_SELECT_SQL} WHERE id=?1"),
        params![id],
        row_to_user,
    ) {
        Ok(user) => Ok(Some(user)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn fetch_by_discord_id(conn: &Connection, discord_id: &str) -> Result<Option<User>> {
    match conn.query_row(
        &format!("{USER_SELECT_SQL} WHERE discord_id=?1"),
        params![discord_id],
        row_to_user,
    ) {
        Ok(user) => Ok(Some(user)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
