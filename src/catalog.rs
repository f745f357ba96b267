use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;

use crate::error::DomainError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub fixed_fee: i64,
    pub active: bool,
    pub created_at: String,
}

/// Creates an active course. The fixed fee is the admin's price of record:
/// every admission to the course must declare exactly this amount.
pub fn add_course(conn: &Connection, title: &str, fixed_fee: i64) -> Result<Course, DomainError> {
    let title = title.trim();
    if title.is_empty() || fixed_fee <= 0 {
        return Err(DomainError::validation(
            "a title and a positive fixed fee are required",
        ));
    }

    conn.execute(
        "INSERT INTO courses(title, fixed_fee, status) VALUES(?, ?, 1)",
        (title, fixed_fee),
    )?;
    let id = conn.last_insert_rowid();
    get_course(conn, id)?
        .ok_or_else(|| DomainError::persistence("course row missing after insert"))
}

pub fn get_course(conn: &Connection, id: i64) -> Result<Option<Course>, DomainError> {
    conn.query_row(
        "SELECT id, title, fixed_fee, status, created_at FROM courses WHERE id = ?",
        [id],
        row_to_course,
    )
    .optional()
    .map_err(Into::into)
}

/// Active courses, most recently created first.
pub fn list_active_courses(conn: &Connection) -> Result<Vec<Course>, DomainError> {
    let mut stmt = conn.prepare(
        "SELECT id, title, fixed_fee, status, created_at
         FROM courses
         WHERE status = 1
         ORDER BY id DESC",
    )?;
    let courses = stmt
        .query_map([], row_to_course)
        .and_then(|it| it.collect::<Result<Vec<_>, _>>())?;
    Ok(courses)
}

/// The fixed fee of `course_id` when it exists and is active, else `None`.
pub fn active_course_fee(conn: &Connection, course_id: i64) -> Result<Option<i64>, DomainError> {
    conn.query_row(
        "SELECT fixed_fee FROM courses WHERE id = ? AND status = 1",
        [course_id],
        |r| r.get(0),
    )
    .optional()
    .map_err(Into::into)
}

fn row_to_course(row: &rusqlite::Row<'_>) -> rusqlite::Result<Course> {
    Ok(Course {
        id: row.get(0)?,
        title: row.get(1)?,
        fixed_fee: row.get(2)?,
        active: row.get::<_, i64>(3)? != 0,
        created_at: row.get(4)?,
    })
}
