//! Process configuration, read once from the environment at startup.

use std::env;
use std::path::PathBuf;

/// What to answer when a submission's fingerprint already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// 200 with the existing record (the default).
    ReturnExisting,
    /// 409 so strict clients can surface the resubmission.
    Conflict,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub bind_addr: String,
    pub port: u16,
    pub duplicate_policy: DuplicatePolicy,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let db_path = env::var("TRANSCRIPTD_DB")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("transcriptd.sqlite3"));
        let bind_addr =
            env::var("TRANSCRIPTD_BIND").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("TRANSCRIPTD_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);
        let duplicate_policy = match env::var("TRANSCRIPTD_DUPLICATE_STATUS").as_deref() {
            Ok("conflict") => DuplicatePolicy::Conflict,
            _ => DuplicatePolicy::ReturnExisting,
        };
        Self {
            db_path,
            bind_addr,
            port,
            duplicate_policy,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("transcriptd.sqlite3"),
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
            duplicate_policy: DuplicatePolicy::ReturnExisting,
        }
    }
}
