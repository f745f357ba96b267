use chrono::{Datelike, Months, NaiveDate};
use rusqlite::Connection;
use serde_json::json;
use std::collections::HashMap;

use crate::config::Config;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};

const DEFAULT_RECENT_LIMIT: i64 = 5;
const DEFAULT_MONTHS: u32 = 12;
const MAX_MONTHS: u32 = 36;

fn handle_dashboard_stats(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let cfg = Config::load(conn);
    let today = cfg.today().format("%Y-%m-%d").to_string();

    let row = conn.query_row(
        "SELECT
           (SELECT COUNT(*) FROM courses WHERE status = 1),
           (SELECT COUNT(*) FROM admissions),
           (SELECT COUNT(*) FROM admissions WHERE status = 1),
           (SELECT COUNT(*) FROM admissions WHERE status = 0),
           (SELECT COUNT(*) FROM admissions WHERE remaining_amount > 0 AND due_date < ?),
           (SELECT COALESCE(SUM(paid_amount), 0) FROM admissions),
           (SELECT COALESCE(SUM(remaining_amount), 0) FROM admissions)",
        [&today],
        |r| {
            Ok(json!({
                "activeCourses": r.get::<_, i64>(0)?,
                "totalAdmissions": r.get::<_, i64>(1)?,
                "settledCount": r.get::<_, i64>(2)?,
                "pendingCount": r.get::<_, i64>(3)?,
                "overdueCount": r.get::<_, i64>(4)?,
                "collectedTotal": r.get::<_, i64>(5)?,
                "outstandingTotal": r.get::<_, i64>(6)?,
            }))
        },
    );

    match row {
        Ok(stats) => ok(&req.id, stats),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_dashboard_recent(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let limit = req
        .params
        .get("limit")
        .and_then(|v| v.as_i64())
        .unwrap_or(DEFAULT_RECENT_LIMIT)
        .clamp(1, 50);

    let mut stmt = match conn.prepare(
        "SELECT a.id, a.student_name, a.total_fee, a.paid_amount, a.remaining_amount,
                a.status, a.created_at, c.title
         FROM admissions a
         LEFT JOIN courses c ON c.id = a.course_id
         ORDER BY a.id DESC
         LIMIT ?",
    ) {
        Ok(s) => s,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };

    let rows = stmt
        .query_map([limit], |r| {
            Ok(json!({
                "id": r.get::<_, i64>(0)?,
                "studentName": r.get::<_, String>(1)?,
                "totalFee": r.get::<_, i64>(2)?,
                "paidAmount": r.get::<_, i64>(3)?,
                "remainingAmount": r.get::<_, i64>(4)?,
                "settled": r.get::<_, i64>(5)? != 0,
                "createdAt": r.get::<_, String>(6)?,
                "course": r.get::<_, Option<String>>(7)?.unwrap_or_default(),
            }))
        })
        .and_then(|it| it.collect::<Result<Vec<_>, _>>());

    match rows {
        Ok(items) => ok(&req.id, json!({ "items": items })),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

/// First day of each month in the trailing window ending at `today`,
/// oldest first.
fn trailing_months(today: NaiveDate, months: u32) -> Vec<NaiveDate> {
    (0..months)
        .rev()
        .filter_map(|k| {
            today
                .checked_sub_months(Months::new(k))
                .and_then(|d| d.with_day(1))
        })
        .collect()
}

fn monthly_counts(
    conn: &Connection,
    window_start: NaiveDate,
) -> rusqlite::Result<HashMap<String, i64>> {
    let mut stmt = conn.prepare(
        "SELECT strftime('%Y-%m', created_at) AS month, COUNT(*)
         FROM admissions
         WHERE created_at >= ?
         GROUP BY month",
    )?;
    let rows = stmt.query_map([window_start.format("%Y-%m-%d").to_string()], |r| {
        Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)?))
    })?;
    rows.collect()
}

fn handle_monthly_enrollment(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let cfg = Config::load(conn);
    let months = req
        .params
        .get("months")
        .and_then(|v| v.as_i64())
        .unwrap_or(DEFAULT_MONTHS as i64)
        .clamp(1, MAX_MONTHS as i64) as u32;

    let window = trailing_months(cfg.today(), months);
    let Some(window_start) = window.first().copied() else {
        return ok(&req.id, json!({ "labels": [], "values": [] }));
    };

    let counts = match monthly_counts(conn, window_start) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };

    // Chart axes: every month of the window appears, zero-filled when no
    // admissions landed in it.
    let labels: Vec<String> = window.iter().map(|m| m.format("%b %Y").to_string()).collect();
    let values: Vec<i64> = window
        .iter()
        .map(|m| {
            counts
                .get(&m.format("%Y-%m").to_string())
                .copied()
                .unwrap_or(0)
        })
        .collect();

    ok(&req.id, json!({ "labels": labels, "values": values }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "dashboard.stats" => Some(handle_dashboard_stats(state, req)),
        "dashboard.recent" => Some(handle_dashboard_recent(state, req)),
        "dashboard.monthlyEnrollment" => Some(handle_monthly_enrollment(state, req)),
        _ => None,
    }
}
