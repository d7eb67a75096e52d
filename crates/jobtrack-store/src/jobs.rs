use std::str::FromStr;
use std::sync::Mutex;

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use tracing::debug;

use jobtrack_core::types::{Job, JobPatch, JobStats, JobStatus, NewJob};

use crate::error::Result;

const JOB_SELECT_SQL: &str =
    "SELECT id, company, position, status, date_applied, notes, created_at, updated_at FROM jobs";

/// Map a SELECT row (column order from JOB_SELECT_SQL) to a Job.
/// Centralised here so every query in this crate stays consistent.
pub(crate) fn row_to_job(row: &rusqlite::Row<'_>) -> rusqlite::Result<Job> {
    let status = JobStatus::from_str(&row.get::<_, String>(3)?).unwrap_or_default();
    let date_raw: String = row.get(4)?;
    let date_applied = NaiveDate::parse_from_str(&date_raw, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Job {
        id: row.get(0)?,
        company: row.get(1)?,
        position: row.get(2)?,
        status,
        date_applied,
        notes: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

/// CRUD over the jobs table.
///
/// Thread-safe: one connection behind a Mutex. SQLite serialises writers
/// anyway, so a single shared connection keeps the locking story simple.
pub struct JobStore {
    db: Mutex<Connection>,
}

impl JobStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Mutex::new(conn),
        }
    }

    /// All jobs, newest application first. Ties on the date break by id so
    /// the ordering is stable.
    pub fn list(&self) -> Result<Vec<Job>> {
        let db = self.db.lock().unwrap();
        let mut stmt =
            db.prepare(&format!("{JOB_SELECT_SQL} ORDER BY date_applied DESC, id DESC"))?;
        let jobs = stmt
            .query_map([], row_to_job)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(jobs)
    }

    pub fn get(&self, id: i64) -> Result<Option<Job>> {
        let db = self.db.lock().unwrap();
        fetch(&db, id)
    }

    pub fn create(&self, new: NewJob) -> Result<Job> {
        let db = self.db.lock().unwrap();
        let now = chrono::Utc::now().to_rfc3339();
        db.execute(
            "INSERT INTO jobs (company, position, status, date_applied, notes, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                new.company,
                new.position,
                new.status.to_string(),
                new.date_applied.to_string(),
                new.notes,
                now,
                now
            ],
        )?;
        let id = db.last_insert_rowid();
        debug!(id, company = %new.company, "job created");
        Ok(Job {
            id,
            company: new.company,
            position: new.position,
            status: new.status,
            date_applied: new.date_applied,
            notes: new.notes,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Apply a partial update. Absent patch fields keep their stored value.
    /// Returns None when no row has this id.
    pub fn update(&self, id: i64, patch: JobPatch) -> Result<Option<Job>> {
        let db = self.db.lock().unwrap();
        let Some(mut job) = fetch(&db, id)? else {
            return Ok(None);
        };
        if let Some(company) = patch.company {
            job.company = company;
        }
        if let Some(position) = patch.position {
            job.position = position;
        }
        if let Some(status) = patch.status {
            job.status = status;
        }
        if let Some(date_applied) = patch.date_applied {
            job.date_applied = date_applied;
        }
        if let Some(notes) = patch.notes {
            job.notes = Some(notes);
        }
        job.updated_at = chrono::Utc::now().to_rfc3339();
        db.execute(
            "UPDATE jobs SET company=?1, position=?2, status=?3, date_applied=?4,
             notes=?5, updated_at=?6 WHERE id=?7",
            params![
                job.company,
                job.position,
                job.status.to_string(),
                job.date_applied.to_string(),
                job.notes,
                job.updated_at,
                id
            ],
        )?;
        debug!(id, "job updated");
        Ok(Some(job))
    }

    /// Delete a job. Returns false when no row had this id.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let db = self.db.lock().unwrap();
        let rows = db.execute("DELETE FROM jobs WHERE id=?1", params![id])?;
        if rows > 0 {
            debug!(id, "job deleted");
        }
        Ok(rows > 0)
    }

    /// Aggregate counts: the overall total plus one count per status.
    pub fn stats(&self) -> Result<JobStats> {
        let db = self.db.lock().unwrap();
        Ok(JobStats {
            total: count_status(&db, None)?,
            applied: count_status(&db, Some(JobStatus::Applied))?,
            interviewing: count_status(&db, Some(JobStatus::Interviewing))?,
            offer: count_status(&db, Some(JobStatus::Offer))?,
            rejected: count_status(&db, Some(JobStatus::Rejected))?,
        })
    }
}

fn fetch(conn: &Connection, id: i64) -> Result<Option<Job>> {
    match conn.query_row(
        &format!("{JOB_SELECT_SQL} WHERE id=?1"),
        params![id],
        row_to_job,
    ) {
        Ok(job) => Ok(Some(job)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn count_status(conn: &Connection, status: Option<JobStatus>) -> Result<i64> {
    let n = match status {
        Some(s) => conn.query_row(
            "SELECT COUNT(*) FROM jobs WHERE status=?1",
            params![s.to_string()],
            |row| row.get(0),
        )?,
        None => conn.query_row("SELECT COUNT(*) FROM jobs", [], |row| row.get(0))?,
    };
    Ok(n)
}
