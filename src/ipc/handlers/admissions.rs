use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::json;

use crate::config::Config;
use crate::error::DomainError;
use crate::ipc::error::{domain_err, err, ok};
use crate::ipc::types::{AppState, Request};
use crate::ledger::{self, AdmissionInput};
use crate::listing::{self, AdmissionFilter, StatusFilter};

fn str_param(params: &serde_json::Value, key: &str) -> String {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}

/// Pulls the admission form out of the request params. A `remainingAmount`
/// field, if the client echoed one, is deliberately not read: the ledger
/// recomputes the balance itself.
fn parse_input(params: &serde_json::Value) -> Result<AdmissionInput, DomainError> {
    let notes = params
        .get("notes")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string());

    let paid_amount = match params.get("paidAmount") {
        None => 0,
        Some(v) if v.is_null() => 0,
        Some(v) => v
            .as_i64()
            .ok_or_else(|| DomainError::validation("missing required fields"))?,
    };

    let screenshot = match params.get("screenshotBase64") {
        None => None,
        Some(v) if v.is_null() => None,
        Some(v) => {
            let raw = v
                .as_str()
                .ok_or_else(|| DomainError::validation("screenshotBase64 must be a string"))?;
            if raw.is_empty() {
                None
            } else {
                Some(STANDARD.decode(raw).map_err(|_| {
                    DomainError::validation("screenshotBase64 is not valid base64")
                })?)
            }
        }
    };

    Ok(AdmissionInput {
        student_name: str_param(params, "studentName"),
        phone: str_param(params, "phone"),
        notes,
        course_id: params.get("courseId").and_then(|v| v.as_i64()).unwrap_or(0),
        total_fee: params.get("totalFee").and_then(|v| v.as_i64()).unwrap_or(0),
        paid_amount,
        due_date: str_param(params, "dueDate"),
        screenshot,
    })
}

fn handle_admissions_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(store) = state.store.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let cfg = Config::load(conn);

    let result = parse_input(&req.params)
        .and_then(|input| ledger::create_admission(conn, store, &cfg, input));
    match result {
        Ok(admission) => ok(&req.id, json!({ "admission": admission })),
        Err(e) => domain_err(&req.id, e),
    }
}

fn parse_status_filter(v: &serde_json::Value) -> Result<Option<StatusFilter>, ()> {
    if v.is_null() {
        return Ok(None);
    }
    if let Some(n) = v.as_i64() {
        return StatusFilter::parse(&n.to_string()).map(Some).ok_or(());
    }
    match v.as_str() {
        Some("") => Ok(None),
        Some(raw) => StatusFilter::parse(raw).map(Some).ok_or(()),
        None => Err(()),
    }
}

fn handle_admissions_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let cfg = Config::load(conn);

    let page = req
        .params
        .get("page")
        .and_then(|v| v.as_i64())
        .unwrap_or(1);
    let course_id = req
        .params
        .get("courseId")
        .and_then(|v| v.as_i64())
        .filter(|id| *id > 0);
    let status = match req.params.get("status") {
        None => None,
        Some(v) => match parse_status_filter(v) {
            Ok(parsed) => parsed,
            Err(()) => {
                return err(
                    &req.id,
                    "bad_params",
                    "status must be one of: paid, pending, overdue",
                    None,
                )
            }
        },
    };

    let filter = AdmissionFilter { course_id, status };
    match listing::list_admissions(conn, &cfg, &filter, page) {
        Ok(page) => ok(&req.id, json!(page)),
        Err(e) => domain_err(&req.id, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "admissions.create" => Some(handle_admissions_create(state, req)),
        "admissions.list" => Some(handle_admissions_list(state, req)),
        _ => None,
    }
}
