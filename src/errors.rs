//! Error taxonomy for sessions, registry probes and execution backends.
//!
//! Exit code mapping:
//! - an error rooted in io::ErrorKind::NotFound (runtime or program missing) maps to 127;
//! - everything else maps to 1.
use std::io;

pub type Result<T> = std::result::Result<T, ShooshError>;

#[derive(Debug, thiserror::Error)]
pub enum ShooshError {
    #[error("container '{0}' not found")]
    ContainerNotFound(String),

    #[error("container '{0}' already exists")]
    ContainerAlreadyExists(String),

    #[error("cannot parse mounts of container '{container}': {reason}")]
    Parse { container: String, reason: String },

    #[error("session is not configured; call configure() first")]
    NotConfigured,

    #[error("failed to execute {program}: {source}")]
    BackendExecution {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("container runtime unavailable: {0}")]
    ProbeUnavailable(String),

    #[error("invalid path mapping ({host:?} -> {container:?}): both prefixes must be non-empty")]
    InvalidMapping { host: String, container: String },
}

impl ShooshError {
    pub(crate) fn backend(program: impl Into<String>, source: io::Error) -> Self {
        ShooshError::BackendExecution {
            program: program.into(),
            source,
        }
    }
}

/// Map an io::Error to a process exit code:
/// - 127 for NotFound (command not found)
/// - 1 for all other errors
pub fn exit_code_for_io_error(e: &io::Error) -> u8 {
    if e.kind() == io::ErrorKind::NotFound {
        127
    } else {
        1
    }
}

pub fn exit_code_for_error(e: &ShooshError) -> u8 {
    match e {
        ShooshError::BackendExecution { source, .. } => exit_code_for_io_error(source),
        ShooshError::ProbeUnavailable(_) => 127,
        _ => 1,
    }
}
