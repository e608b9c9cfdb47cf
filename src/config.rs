use anyhow::Context;
use chrono::NaiveDate;
use std::path::PathBuf;

pub const DEFAULT_EXAM_DATE: &str = "2026-02-11";
pub const DEFAULT_SERVER_PORT: u16 = 8080;
const DEFAULT_DB_NAME: &str = "exam_prep";

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    /// Exam date as configured, echoed back by the dashboard.
    pub exam_date_raw: String,
    pub exam_date: NaiveDate,
    pub server_port: u16,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let db_path = match get("DB_PATH") {
            Some(p) => PathBuf::from(p),
            None => {
                let name = get("DB_NAME").unwrap_or_else(|| DEFAULT_DB_NAME.to_string());
                PathBuf::from(format!("{name}.sqlite3"))
            }
        };

        let exam_date_raw = get("EXAM_DATE").unwrap_or_else(|| DEFAULT_EXAM_DATE.to_string());
        let exam_date = parse_exam_date(&exam_date_raw);

        let server_port = match get("SERVER_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("SERVER_PORT must be a port number, got {raw:?}"))?,
            None => DEFAULT_SERVER_PORT,
        };

        Ok(Self {
            db_path,
            exam_date_raw,
            exam_date,
            server_port,
        })
    }
}

/// Unparseable dates fall back to the default exam date.
pub fn parse_exam_date(raw: &str) -> NaiveDate {
    match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
        Ok(d) => d,
        Err(e) => {
            tracing::warn!(exam_date = raw, error = %e, "invalid EXAM_DATE, using default");
            default_exam_date()
        }
    }
}

fn default_exam_date() -> NaiveDate {
    NaiveDate::parse_from_str(DEFAULT_EXAM_DATE, "%Y-%m-%d").unwrap_or_default()
}
