//! Server configuration, read from `DOCMERGE_*` environment variables.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("invalid value '{value}' for {key}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// SQLite database holding templates and drafts.
    pub database_path: PathBuf,
    /// Directory holding uploaded Word documents.
    pub storage_dir: PathBuf,
    /// Maximum JSON payload size in bytes.
    pub json_limit: usize,
    /// Rows returned as preview after a dataset upload.
    pub preview_rows: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database_path: PathBuf::from("templify.sqlite"),
            storage_dir: PathBuf::from("./word-templates"),
            json_limit: 10 * 1024 * 1024, // 10 MB
            preview_rows: 5,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(host) = lookup("DOCMERGE_HOST") {
            config.host = host;
        }
        if let Some(port) = parse_var(&lookup, "DOCMERGE_PORT")? {
            config.port = port;
        }
        if let Some(path) = lookup("DOCMERGE_DATABASE") {
            config.database_path = PathBuf::from(path);
        }
        if let Some(dir) = lookup("DOCMERGE_STORAGE_DIR") {
            config.storage_dir = PathBuf::from(dir);
        }
        if let Some(limit) = parse_var(&lookup, "DOCMERGE_JSON_LIMIT")? {
            config.json_limit = limit;
        }
        if let Some(rows) = parse_var(&lookup, "DOCMERGE_PREVIEW_ROWS")? {
            config.preview_rows = rows;
        }
        Ok(config)
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

fn parse_var<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError { key, value }),
    }
}
