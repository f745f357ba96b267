use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;
use serde_json::json;

use crate::dates;
use crate::db;

pub const DEFAULT_ACADEMY_NAME: &str = "Academy";
pub const DEFAULT_UPLOAD_MAX_MB: i64 = 5;
/// Fixed offsets beyond +/-14h do not exist on any civil clock.
pub const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// Workspace settings, read from the `settings` table with defaults for
/// anything missing or unreadable.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub academy_name: String,
    pub utc_offset_minutes: i32,
    pub upload_max_mb: i64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            academy_name: DEFAULT_ACADEMY_NAME.to_string(),
            utc_offset_minutes: 0,
            upload_max_mb: DEFAULT_UPLOAD_MAX_MB,
        }
    }
}

impl Config {
    pub fn load(conn: &Connection) -> Config {
        let mut cfg = Config::default();
        if let Some(name) = db::settings_get_json(conn, "academy_name").and_then(|v| {
            v.as_str()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        }) {
            cfg.academy_name = name;
        }
        if let Some(offset) = db::settings_get_json(conn, "utc_offset_minutes")
            .and_then(|v| v.as_i64())
            .map(|v| v.clamp(-(MAX_UTC_OFFSET_MINUTES as i64), MAX_UTC_OFFSET_MINUTES as i64))
        {
            cfg.utc_offset_minutes = offset as i32;
        }
        if let Some(mb) = db::settings_get_json(conn, "upload_max_mb")
            .and_then(|v| v.as_i64())
            .filter(|mb| *mb >= 1)
        {
            cfg.upload_max_mb = mb;
        }
        cfg
    }

    pub fn save(&self, conn: &Connection) -> anyhow::Result<()> {
        db::settings_set_json(conn, "academy_name", &json!(self.academy_name))?;
        db::settings_set_json(conn, "utc_offset_minutes", &json!(self.utc_offset_minutes))?;
        db::settings_set_json(conn, "upload_max_mb", &json!(self.upload_max_mb))?;
        Ok(())
    }

    pub fn upload_max_bytes(&self) -> u64 {
        (self.upload_max_mb as u64) * 1024 * 1024
    }

    /// "Today" as the academy's configured clock sees it.
    pub fn today(&self) -> NaiveDate {
        dates::today_with_offset(self.utc_offset_minutes)
    }
}
