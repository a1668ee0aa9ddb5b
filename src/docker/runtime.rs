#![allow(clippy::module_name_repetitions)]
//! Docker runtime discovery.

use std::path::PathBuf;

use which::which;

use crate::config::Settings;
use crate::errors::{Result, ShooshError};

/// Resolve the container runtime binary: an explicit `SHOOSH_DOCKER`, else `docker` on PATH.
pub fn container_runtime_path(settings: &Settings) -> Result<PathBuf> {
    // Allow tests or callers to explicitly disable Docker detection to avoid hard failures
    if settings.skip_docker {
        return Err(ShooshError::ProbeUnavailable(
            "Docker disabled by environment override.".to_string(),
        ));
    }

    if let Some(ref p) = settings.docker {
        if p.is_file() {
            return Ok(p.clone());
        }
        // Bare names go through PATH lookup like the default.
        return which(p).map_err(|_| {
            ShooshError::ProbeUnavailable(format!(
                "configured runtime {} was not found.",
                p.display()
            ))
        });
    }

    which("docker").map_err(|_| {
        ShooshError::ProbeUnavailable("Docker is required but was not found in PATH.".to_string())
    })
}
