use crate::config::{Config, MAX_UTC_OFFSET_MINUTES};
use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::uploads::ScreenshotStore;
use serde_json::json;
use std::path::PathBuf;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string())
        }),
    )
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };
    let can_manage = match req.params.get("role").and_then(|v| v.as_str()) {
        None | Some("manager") => true,
        Some("viewer") => false,
        Some(_) => {
            return err(
                &req.id,
                "bad_params",
                "role must be one of: manager, viewer",
                None,
            )
        }
    };

    match db::open_db(&path) {
        Ok(conn) => {
            state.store = Some(ScreenshotStore::new(&path));
            state.workspace = Some(path.clone());
            state.db = Some(conn);
            state.can_manage = can_manage;
            ok(
                &req.id,
                json!({
                    "workspacePath": path.to_string_lossy(),
                    "canManage": can_manage
                }),
            )
        }
        Err(e) => err(&req.id, "db_open_failed", format!("{e:?}"), None),
    }
}

fn handle_whoami(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!({ "can": state.can_manage }))
}

fn handle_settings_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    ok(&req.id, json!({ "settings": Config::load(conn) }))
}

fn handle_settings_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let mut cfg = Config::load(conn);
    if let Some(v) = req.params.get("academyName") {
        let Some(name) = v.as_str().map(str::trim).filter(|s| !s.is_empty()) else {
            return err(
                &req.id,
                "bad_params",
                "academyName must be a non-empty string",
                None,
            );
        };
        cfg.academy_name = name.to_string();
    }
    if let Some(v) = req.params.get("utcOffsetMinutes") {
        let Some(offset) = v
            .as_i64()
            .filter(|m| m.unsigned_abs() <= MAX_UTC_OFFSET_MINUTES as u64)
        else {
            return err(
                &req.id,
                "bad_params",
                format!(
                    "utcOffsetMinutes must be an integer within +/-{}",
                    MAX_UTC_OFFSET_MINUTES
                ),
                None,
            );
        };
        cfg.utc_offset_minutes = offset as i32;
    }
    if let Some(v) = req.params.get("uploadMaxMb") {
        let Some(mb) = v.as_i64().filter(|mb| *mb >= 1) else {
            return err(
                &req.id,
                "bad_params",
                "uploadMaxMb must be an integer >= 1",
                None,
            );
        };
        cfg.upload_max_mb = mb;
    }

    if let Err(e) = cfg.save(conn) {
        return err(&req.id, "db_failed", e.to_string(), None);
    }
    ok(&req.id, json!({ "settings": cfg }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        "session.whoami" => Some(handle_whoami(state, req)),
        "settings.get" => Some(handle_settings_get(state, req)),
        "settings.update" => Some(handle_settings_update(state, req)),
        _ => None,
    }
}
