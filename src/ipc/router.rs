use super::handlers;
use super::types::{AppState, Request};
use crate::db;
use crate::ipc::error::err;

/// Every method that mutates workspace state, in one place. The capability
/// check happens here so no handler carries its own gate.
const MANAGE_METHODS: &[&str] = &[
    "courses.create",
    "admissions.create",
    "settings.update",
    "backup.importWorkspaceBundle",
];

pub fn handle_request(state: &mut AppState, req: Request) -> serde_json::Value {
    tracing::debug!(method = %req.method, "request");

    if MANAGE_METHODS.contains(&req.method.as_str()) && !state.can_manage {
        tracing::warn!(method = %req.method, "refused: manage capability required");
        return err(&req.id, "forbidden", "manage capability required", None);
    }

    if let Some(conn) = state.db.as_ref() {
        db::audit_record(conn, &req.method);
    }

    if let Some(resp) = handlers::core::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::courses::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::admissions::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::dashboard::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::backup_exchange::try_handle(state, &req) {
        return resp;
    }

    err(
        &req.id,
        "not_implemented",
        format!("unknown method: {}", req.method),
        None,
    )
}
