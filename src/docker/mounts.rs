#![allow(clippy::module_name_repetitions)]
//! Parsing of `docker inspect -f '{{json .Mounts}}'` output.

use serde::Deserialize;

use crate::errors::{Result, ShooshError};
use crate::mapping::PathMapping;

#[derive(Debug, Deserialize)]
struct MountDescriptor {
    #[serde(rename = "Source", default)]
    source: String,
    #[serde(rename = "Destination", default)]
    destination: String,
    #[serde(rename = "Type", default)]
    kind: Option<String>,
}

/// Extract `(Source, Destination)` pairs in declaration order.
///
/// Output may arrive wrapped in single quotes (template passed through a shell); they are stripped.
/// `null` means no mounts. Empty output or malformed JSON is a parse error.
pub fn parse_mounts(container: &str, raw: &str) -> Result<Vec<PathMapping>> {
    let trimmed = raw.trim();
    let body = trimmed
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(trimmed)
        .trim();
    if body.is_empty() {
        return Err(ShooshError::Parse {
            container: container.to_string(),
            reason: "no mount information returned".to_string(),
        });
    }

    let descriptors: Option<Vec<MountDescriptor>> =
        serde_json::from_str(body).map_err(|e| ShooshError::Parse {
            container: container.to_string(),
            reason: e.to_string(),
        })?;

    let mut out = Vec::new();
    for d in descriptors.unwrap_or_default() {
        match PathMapping::new(d.source, d.destination) {
            Ok(m) => out.push(m),
            Err(_) => tracing::debug!(
                "skipping mount without source or destination on {} (type {})",
                container,
                d.kind.as_deref().unwrap_or("unknown")
            ),
        }
    }
    Ok(out)
}
