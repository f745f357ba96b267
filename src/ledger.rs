use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;

use crate::catalog;
use crate::config::Config;
use crate::dates;
use crate::error::DomainError;
use crate::uploads::{self, ScreenshotStore};

#[derive(Debug, Clone, Default)]
pub struct AdmissionInput {
    pub student_name: String,
    pub phone: String,
    pub notes: Option<String>,
    pub course_id: i64,
    pub total_fee: i64,
    pub paid_amount: i64,
    pub due_date: String,
    pub screenshot: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Admission {
    pub id: i64,
    pub student_name: String,
    pub phone: String,
    pub notes: Option<String>,
    pub course_id: i64,
    pub total_fee: i64,
    pub paid_amount: i64,
    pub remaining_amount: i64,
    pub due_date: Option<String>,
    pub screenshot_url: Option<String>,
    pub settled: bool,
    pub created_at: String,
}

/// Unpaid balance for a fee/payment pair. The ledger computes this for every
/// admission it writes; a remaining amount supplied by the caller is never
/// consulted, even when it happens to agree.
pub fn remaining_amount(total_fee: i64, paid_amount: i64) -> i64 {
    (total_fee - paid_amount).max(0)
}

/// Validates and persists one admission. All checks run before any write;
/// a rejected input leaves no row and no stored screenshot behind.
pub fn create_admission(
    conn: &Connection,
    store: &ScreenshotStore,
    cfg: &Config,
    input: AdmissionInput,
) -> Result<Admission, DomainError> {
    let student_name = input.student_name.trim();
    let phone = input.phone.trim();
    if student_name.is_empty()
        || phone.is_empty()
        || input.course_id <= 0
        || input.total_fee <= 0
        || input.paid_amount < 0
        || input.due_date.trim().is_empty()
    {
        return Err(DomainError::validation("missing required fields"));
    }

    // The catalog's fixed fee is the price of record; the submitted total
    // must match it exactly.
    let fixed_fee = catalog::active_course_fee(conn, input.course_id)?
        .ok_or_else(|| DomainError::not_found("course unavailable"))?;
    if input.total_fee != fixed_fee {
        return Err(DomainError::validation(
            "total fee must match the course's fixed fee",
        ));
    }
    if input.paid_amount > input.total_fee {
        return Err(DomainError::validation(
            "paid amount cannot exceed the total fee",
        ));
    }

    let remaining = remaining_amount(input.total_fee, input.paid_amount);

    let due = dates::parse_calendar_date(&input.due_date)
        .ok_or_else(|| DomainError::validation("invalid date"))?;

    // Absent screenshot is a normal admission, not an error.
    let screenshot_url = match input.screenshot.as_deref() {
        None => None,
        Some(bytes) => {
            if bytes.len() as u64 > cfg.upload_max_bytes() {
                return Err(DomainError::quota(format!(
                    "file exceeds the {} MB limit",
                    cfg.upload_max_mb
                )));
            }
            let kind = uploads::sniff_image(bytes).ok_or_else(|| {
                DomainError::quota("only JPEG, PNG or WEBP files are accepted")
            })?;
            let url = store
                .store(bytes, kind)
                .map_err(|e| DomainError::persistence(format!("screenshot store failed: {e}")))?;
            Some(url)
        }
    };

    let settled = remaining == 0;
    conn.execute(
        "INSERT INTO admissions(student_name, phone, notes, course_id, total_fee,
                                paid_amount, remaining_amount, due_date, screenshot_url, status)
         VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        (
            student_name,
            phone,
            input.notes.as_deref(),
            input.course_id,
            input.total_fee,
            input.paid_amount,
            remaining,
            due.format("%Y-%m-%d").to_string(),
            screenshot_url.as_deref(),
            settled as i64,
        ),
    )?;
    let id = conn.last_insert_rowid();
    get_admission(conn, id)?
        .ok_or_else(|| DomainError::persistence("admission row missing after insert"))
}

pub fn get_admission(conn: &Connection, id: i64) -> Result<Option<Admission>, DomainError> {
    conn.query_row(
        "SELECT id, student_name, phone, notes, course_id, total_fee, paid_amount,
                remaining_amount, due_date, screenshot_url, status, created_at
         FROM admissions WHERE id = ?",
        [id],
        |row| {
            Ok(Admission {
                id: row.get(0)?,
                student_name: row.get(1)?,
                phone: row.get(2)?,
                notes: row.get(3)?,
                course_id: row.get(4)?,
                total_fee: row.get(5)?,
                paid_amount: row.get(6)?,
                remaining_amount: row.get(7)?,
                due_date: row.get(8)?,
                screenshot_url: row.get(9)?,
                settled: row.get::<_, i64>(10)? != 0,
                created_at: row.get(11)?,
            })
        },
    )
    .optional()
    .map_err(Into::into)
}
