use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

pub const DB_FILE: &str = "academy.sqlite3";

/// Seeded on first open, mirroring the academy's original activation step.
const DEFAULT_COURSE_TITLE: &str = "Web-based Software Development";
const DEFAULT_COURSE_FEE: i64 = 50_000;

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILE);
    let conn = Connection::open(db_path)?;
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS courses(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            fixed_fee INTEGER NOT NULL DEFAULT 0,
            status INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ','now'))
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_courses_status ON courses(status)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS admissions(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            student_name TEXT NOT NULL,
            phone TEXT NOT NULL,
            notes TEXT,
            course_id INTEGER NOT NULL,
            total_fee INTEGER NOT NULL DEFAULT 0,
            paid_amount INTEGER NOT NULL DEFAULT 0,
            remaining_amount INTEGER NOT NULL DEFAULT 0,
            due_date TEXT,
            screenshot_url TEXT,
            status INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ','now')),
            FOREIGN KEY(course_id) REFERENCES courses(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_admissions_course ON admissions(course_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_admissions_status ON admissions(status)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_admissions_due_date ON admissions(due_date)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS settings(
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS audit_log(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            method TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ','now'))
        )",
        [],
    )?;

    seed_default_course(&conn)?;

    Ok(conn)
}

fn seed_default_course(conn: &Connection) -> anyhow::Result<()> {
    let existing: i64 = conn.query_row(
        "SELECT COUNT(*) FROM courses WHERE title = ?",
        [DEFAULT_COURSE_TITLE],
        |r| r.get(0),
    )?;
    if existing == 0 {
        conn.execute(
            "INSERT INTO courses(title, fixed_fee, status) VALUES(?, ?, 1)",
            (DEFAULT_COURSE_TITLE, DEFAULT_COURSE_FEE),
        )?;
    }
    Ok(())
}

pub fn settings_set_json(
    conn: &Connection,
    key: &str,
    value: &serde_json::Value,
) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        (key, value.to_string()),
    )?;
    Ok(())
}

pub fn settings_get_json(conn: &Connection, key: &str) -> Option<serde_json::Value> {
    let raw: Option<String> = conn
        .query_row("SELECT value FROM settings WHERE key = ?", [key], |r| {
            r.get(0)
        })
        .optional()
        .ok()
        .flatten();
    raw.and_then(|s| serde_json::from_str(&s).ok())
}

/// Best-effort audit trail; a full log table must never fail a request.
pub fn audit_record(conn: &Connection, method: &str) {
    let _ = conn.execute("INSERT INTO audit_log(method) VALUES(?)", [method]);
}
