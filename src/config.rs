#![allow(clippy::module_name_repetitions)]
//! Environment-driven settings.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_KWARGS_SEP: &str = "=";

const ENV_DOCKER: &str = "SHOOSH_DOCKER";
const ENV_SKIP_DOCKER: &str = "SHOOSH_SKIP_DOCKER";
const ENV_KWARGS_SEP: &str = "SHOOSH_KWARGS_SEP";
const ENV_EXEC_TIMEOUT: &str = "SHOOSH_EXEC_TIMEOUT_SECS";

fn is_truthy(v: Option<&str>) -> bool {
    matches!(
        v,
        Some("1" | "true" | "TRUE" | "yes" | "YES" | "on" | "ON")
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Explicit runtime binary; `None` means look `docker` up on PATH.
    pub docker: Option<PathBuf>,
    pub skip_docker: bool,
    pub kwargs_sep: String,
    /// Zero waits forever.
    pub exec_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            docker: None,
            skip_docker: false,
            kwargs_sep: DEFAULT_KWARGS_SEP.to_string(),
            exec_timeout: Duration::ZERO,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| env::var(k).ok())
    }

    /// Deterministic constructor for tests: `lookup` stands in for the process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut s = Settings::default();

        if let Some(p) = lookup(ENV_DOCKER).map(|v| v.trim().to_string()) {
            if !p.is_empty() {
                s.docker = Some(PathBuf::from(p));
            }
        }
        s.skip_docker = is_truthy(lookup(ENV_SKIP_DOCKER).as_deref());

        if let Some(sep) = lookup(ENV_KWARGS_SEP) {
            if !sep.is_empty() {
                s.kwargs_sep = sep;
            }
        }

        if let Some(raw) = lookup(ENV_EXEC_TIMEOUT) {
            match raw.trim().parse::<u64>() {
                Ok(secs) => s.exec_timeout = Duration::from_secs(secs),
                Err(_) => tracing::warn!(
                    "ignoring {}={:?}: expected a number of seconds",
                    ENV_EXEC_TIMEOUT,
                    raw
                ),
            }
        }
        s
    }
}
