use rusqlite::{Connection, Result};

/// Open a connection with the pragmas every caller needs. WAL lets readers
/// proceed while a write is in flight; foreign_keys is per-connection in
/// SQLite and off by default.
pub fn open(path: &str) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

/// Initialise all tables and bring older databases up to the current
/// schema. Safe to call on every startup — CREATE IF NOT EXISTS and the
/// column checks make it idempotent.
pub fn init_db(conn: &Connection) -> Result<()> {
    create_jobs_table(conn)?;
    create_users_table(conn)?;
    migrate_jobs_table(conn)?;
    migrate_users_table(conn)?;
    Ok(())
}

fn create_jobs_table(conn: &Connection) -> Result<()> {
    // idx_jobs_date_applied backs the list view (newest application first);
    // idx_jobs_status backs the per-status stat counts.
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS jobs (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            company       TEXT NOT NULL,
            position      TEXT NOT NULL,
            status        TEXT NOT NULL DEFAULT 'Applied',
            date_applied  TEXT NOT NULL,  -- YYYY-MM-DD
            notes         TEXT,
            created_at    TEXT NOT NULL,
            updated_at    TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_jobs_date_applied
            ON jobs(date_applied DESC);
        CREATE INDEX IF NOT EXISTS idx_jobs_status
            ON jobs(status);",
    )
}

fn create_users_table(conn: &Connection) -> Result<()> {
    // UNIQUE(discord_id) enforces one account per Discord identity.
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            discord_id          TEXT NOT NULL UNIQUE,
            username            TEXT,
            discriminator       TEXT,
            avatar              TEXT,
            email               TEXT,
            reminder_frequency  TEXT NOT NULL DEFAULT 'none',
            custom_dates        TEXT NOT NULL DEFAULT '[]',  -- JSON array of day names
            last_reminder_sent  TEXT,
            created_at          TEXT NOT NULL,
            updated_at          TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_users_discord_id
            ON users(discord_id);",
    )
}

/// Columns added after the first release. CREATE IF NOT EXISTS skips the
/// whole table when it already exists, so databases created before a column
/// landed need an explicit ALTER.
fn migrate_jobs_table(conn: &Connection) -> Result<()> {
    ensure_column(conn, "jobs", "notes", "TEXT")
}

fn migrate_users_table(conn: &Connection) -> Result<()> {
    ensure_column(conn, "users", "email", "TEXT")?;
    ensure_column(
        conn,
        "users",
        "reminder_frequency",
        "TEXT NOT NULL DEFAULT 'none'",
    )?;
    ensure_column(conn, "users", "custom_dates", "TEXT NOT NULL DEFAULT '[]'")?;
    ensure_column(conn, "users", "last_reminder_sent", "TEXT")?;
    Ok(())
}

/// ALTER TABLE ADD COLUMN when missing. SQLite has no IF NOT EXISTS for
/// columns, so check table_info first.
fn ensure_column(conn: &Connection, table: &str, column: &str, decl: &str) -> Result<()> {
    if !has_column(conn, table, column)? {
        conn.execute_batch(&format!("ALTER TABLE {table} ADD COLUMN {column} {decl};"))?;
    }
    Ok(())
}

fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}
