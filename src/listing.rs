use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use serde::Serialize;

use crate::config::Config;
use crate::dates;
use crate::error::DomainError;

pub const PAGE_SIZE: i64 = 10;

/// Dashboard status filter. `Overdue` is not a stored value; it is the
/// derived predicate `remaining_amount > 0 AND due_date < today` and wins
/// over the stored status flag when selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    Paid,
    Pending,
    Overdue,
}

impl StatusFilter {
    /// Accepts the names used on the wire plus the legacy numeric forms the
    /// original dashboard select box submitted ("1", "0", "-1").
    pub fn parse(raw: &str) -> Option<StatusFilter> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "paid" | "settled" | "1" => Some(StatusFilter::Paid),
            "pending" | "0" => Some(StatusFilter::Pending),
            "overdue" | "-1" => Some(StatusFilter::Overdue),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AdmissionFilter {
    pub course_id: Option<i64>,
    pub status: Option<StatusFilter>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionRow {
    pub id: i64,
    pub student_name: String,
    pub phone: String,
    pub course: String,
    pub total_fee: i64,
    pub paid_amount: i64,
    pub remaining_amount: i64,
    pub due_date: Option<String>,
    pub days_left: Option<i64>,
    pub settled: bool,
    pub screenshot_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionPage {
    pub items: Vec<AdmissionRow>,
    pub page: i64,
    pub total: i64,
    pub pages: i64,
}

/// Filtered, paginated admissions joined with course titles, newest first.
/// `page` is 1-based and clamped; a page past the end yields an empty list.
pub fn list_admissions(
    conn: &Connection,
    cfg: &Config,
    filter: &AdmissionFilter,
    page: i64,
) -> Result<AdmissionPage, DomainError> {
    let page = page.max(1);
    let today = cfg.today();
    let today_str = today.format("%Y-%m-%d").to_string();

    let mut where_sql = String::from("1=1");
    let mut binds: Vec<Value> = Vec::new();
    if let Some(course_id) = filter.course_id {
        where_sql.push_str(" AND a.course_id = ?");
        binds.push(Value::Integer(course_id));
    }
    match filter.status {
        Some(StatusFilter::Overdue) => {
            where_sql.push_str(" AND a.remaining_amount > 0 AND a.due_date < ?");
            binds.push(Value::Text(today_str));
        }
        Some(StatusFilter::Paid) => where_sql.push_str(" AND a.status = 1"),
        Some(StatusFilter::Pending) => where_sql.push_str(" AND a.status = 0"),
        None => {}
    }

    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM admissions a WHERE {where_sql}"),
        params_from_iter(binds.iter()),
        |r| r.get(0),
    )?;

    let sql = format!(
        "SELECT a.id, a.student_name, a.phone, a.total_fee, a.paid_amount,
                a.remaining_amount, a.due_date, a.status, a.screenshot_url,
                c.title
         FROM admissions a
         LEFT JOIN courses c ON c.id = a.course_id
         WHERE {where_sql}
         ORDER BY a.id DESC
         LIMIT ? OFFSET ?"
    );
    binds.push(Value::Integer(PAGE_SIZE));
    binds.push(Value::Integer((page - 1) * PAGE_SIZE));

    let mut stmt = conn.prepare(&sql)?;
    let items = stmt
        .query_map(params_from_iter(binds.iter()), |r| {
            let due_date: Option<String> = r.get(6)?;
            let days_left = due_date
                .as_deref()
                .and_then(dates::parse_calendar_date)
                .map(|d| dates::days_until(d, today));
            Ok(AdmissionRow {
                id: r.get(0)?,
                student_name: r.get(1)?,
                phone: r.get(2)?,
                total_fee: r.get(3)?,
                paid_amount: r.get(4)?,
                remaining_amount: r.get(5)?,
                due_date,
                days_left,
                settled: r.get::<_, i64>(7)? != 0,
                screenshot_url: r.get(8)?,
                course: r.get::<_, Option<String>>(9)?.unwrap_or_default(),
            })
        })
        .and_then(|it| it.collect::<Result<Vec<_>, _>>())?;

    let pages = if total == 0 {
        0
    } else {
        (total + PAGE_SIZE - 1) / PAGE_SIZE
    };

    Ok(AdmissionPage {
        items,
        page,
        total,
        pages,
    })
}
