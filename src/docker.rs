#![allow(clippy::module_name_repetitions)]
//! Container registry probe backed by the Docker CLI.
//!
//! Submodules are organized by responsibility; public APIs are re-exported here.

mod mounts;
mod probe;
mod runtime;

pub use mounts::parse_mounts;
pub use probe::{parse_container_names, DockerCli, RegistryProbe, RunSpec, Volumes};
pub use runtime::container_runtime_path;
