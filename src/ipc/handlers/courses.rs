use crate::catalog;
use crate::ipc::error::{domain_err, err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_courses_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return ok(&req.id, json!({ "items": [] }));
    };
    match catalog::list_active_courses(conn) {
        Ok(courses) => ok(&req.id, json!({ "items": courses })),
        Err(e) => domain_err(&req.id, e),
    }
}

fn handle_courses_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let title = req
        .params
        .get("title")
        .and_then(|v| v.as_str())
        .unwrap_or("");
    let fixed_fee = req
        .params
        .get("fixedFee")
        .and_then(|v| v.as_i64())
        .unwrap_or(0);

    match catalog::add_course(conn, title, fixed_fee) {
        Ok(course) => ok(&req.id, json!({ "course": course })),
        Err(e) => domain_err(&req.id, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "courses.list" => Some(handle_courses_list(state, req)),
        "courses.create" => Some(handle_courses_create(state, req)),
        _ => None,
    }
}
