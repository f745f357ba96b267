use std::path::PathBuf;

use rusqlite::Connection;
use serde::Deserialize;

use crate::uploads::ScreenshotStore;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
    pub store: Option<ScreenshotStore>,
    /// Session capability, set by `workspace.select`. Viewer sessions are
    /// refused every mutating method by the router.
    pub can_manage: bool,
}

impl AppState {
    pub fn new() -> Self {
        AppState {
            workspace: None,
            db: None,
            store: None,
            can_manage: false,
        }
    }
}
