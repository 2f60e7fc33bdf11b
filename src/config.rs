//! Client configuration: backend location, request timeout and session directory.
//! Values resolve as defaults, then environment, then explicit overrides (CLI flags).

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

pub const DEFAULT_API_URL: &str = "http://localhost:5289/api";
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;

pub const ENV_API_URL: &str = "ROLEGATE_API_URL";
pub const ENV_TIMEOUT_MS: &str = "ROLEGATE_TIMEOUT_MS";
pub const ENV_SESSION_DIR: &str = "ROLEGATE_SESSION_DIR";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub timeout_ms: u64,
    pub session_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            session_dir: default_session_dir(),
        }
    }
}

fn default_session_dir() -> PathBuf {
    match env::var("HOME") {
        Ok(home) if !home.trim().is_empty() => PathBuf::from(home).join(".rolegate"),
        _ => PathBuf::from(".rolegate"),
    }
}

fn parse_u64_env(name: &str) -> Option<u64> {
    match env::var(name) {
        Ok(val) => val.trim().parse::<u64>().ok(),
        Err(_) => None,
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Explicit overrides, typically parsed from command-line flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub api_url: Option<String>,
    pub timeout_ms: Option<u64>,
    pub session_dir: Option<PathBuf>,
}

impl ClientConfig {
    /// Defaults overlaid with `ROLEGATE_*` environment variables.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Some(url) = non_empty_env(ENV_API_URL) { cfg.api_url = url; }
        if let Some(ms) = parse_u64_env(ENV_TIMEOUT_MS) { cfg.timeout_ms = ms; }
        if let Some(dir) = non_empty_env(ENV_SESSION_DIR) { cfg.session_dir = PathBuf::from(dir); }
        cfg
    }

    pub fn with_overrides(mut self, o: &ConfigOverrides) -> Self {
        if let Some(url) = &o.api_url { self.api_url = url.clone(); }
        if let Some(ms) = o.timeout_ms { self.timeout_ms = ms; }
        if let Some(dir) = &o.session_dir { self.session_dir = dir.clone(); }
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Build an endpoint URL under `api_url`, keeping its path prefix
    /// (`http://host/api` + `auth/login` -> `http://host/api/auth/login`).
    pub fn endpoint(&self, path: &str) -> AppResult<Url> {
        let base = self.api_url.trim_end_matches('/');
        let rel = path.trim_start_matches('/');
        let joined = if rel.is_empty() { base.to_string() } else { format!("{}/{}", base, rel) };
        let url = Url::parse(&joined)
            .map_err(|e| AppError::config("invalid_api_url", &format!("'{}': {}", joined, e)))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(AppError::config("invalid_api_url", &format!("unsupported scheme '{}'", other))),
        }
    }
}
