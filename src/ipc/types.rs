use crate::config::Config;
use rusqlite::Connection;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    pub path: String,
    #[serde(default)]
    pub body: serde_json::Value,
}

/// Per-connection state: one store connection plus the process configuration.
pub struct AppState {
    pub db: Connection,
    pub config: Config,
}
