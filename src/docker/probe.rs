#![allow(clippy::module_name_repetitions)]
//! Registry probe: list, inspect, start and run containers through the runtime CLI.
//!
//! Failures of list/inspect/start/run are logged and reported as neutral values
//! (empty list, `false`); only volume listing surfaces a parse error to the caller.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::backend::{Backend, BakedShell, SharedRunner};
use crate::config::Settings;
use crate::errors::Result;
use crate::mapping::PathMapping;
use crate::util::{ExecOutput, ExecRequest, ExecService};

use super::mounts::parse_mounts;
use super::runtime::container_runtime_path;

const MOUNTS_TEMPLATE: &str = "{{json .Mounts}}";

pub trait RegistryProbe {
    /// Names of all containers known to the runtime, running or not.
    fn list_containers(&self) -> Vec<String>;

    /// Declared mounts of `container` as host/container pairs, in declaration order.
    fn list_volumes(&self, container: &str) -> Result<Vec<PathMapping>>;

    fn start(&self, container: &str) -> bool;

    fn run(&self, spec: &RunSpec) -> bool;

    /// Execution backend that runs lines inside `container`.
    fn bake(&self, container: &str) -> Box<dyn Backend>;

    fn contains(&self, container: &str) -> bool {
        self.list_containers().iter().any(|c| c == container)
    }
}

/// Volumes for [`RunSpec`]: a single pair or a sequence of pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Volumes(Vec<PathMapping>);

impl Volumes {
    pub fn as_slice(&self) -> &[PathMapping] {
        &self.0
    }
}

impl From<PathMapping> for Volumes {
    fn from(m: PathMapping) -> Self {
        Volumes(vec![m])
    }
}

impl From<Vec<PathMapping>> for Volumes {
    fn from(v: Vec<PathMapping>) -> Self {
        Volumes(v)
    }
}

/// `docker run -dt --name <name> [-v host:container]... <image>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSpec {
    pub image: String,
    pub name: String,
    pub volumes: Volumes,
    /// Accepted but not applied yet; a warning is logged when present.
    pub ports: Option<Vec<String>>,
}

impl RunSpec {
    pub fn new(image: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            name: name.into(),
            volumes: Volumes::default(),
            ports: None,
        }
    }

    pub fn volumes(mut self, volumes: impl Into<Volumes>) -> Self {
        self.volumes = volumes.into();
        self
    }

    pub fn ports(mut self, ports: Vec<String>) -> Self {
        self.ports = Some(ports);
        self
    }

    /// Runtime arguments after the program name.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "run".to_string(),
            "-dt".to_string(),
            "--name".to_string(),
            self.name.clone(),
        ];
        for v in self.volumes.as_slice() {
            args.push("-v".to_string());
            args.push(format!("{}:{}", v.host(), v.container()));
        }
        args.push(self.image.clone());
        args
    }
}

/// Parse `docker ps -a` output: drop the header line, keep the last column (NAMES).
pub fn parse_container_names(ps_output: &str) -> Vec<String> {
    ps_output
        .lines()
        .skip(1)
        .filter_map(|l| l.split_whitespace().last())
        .map(str::to_string)
        .collect()
}

/// [`RegistryProbe`] over the Docker CLI.
#[derive(Clone)]
pub struct DockerCli {
    runtime: PathBuf,
    runner: SharedRunner,
}

impl std::fmt::Debug for DockerCli {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DockerCli")
            .field("runtime", &self.runtime)
            .finish_non_exhaustive()
    }
}

impl DockerCli {
    pub fn new(runtime: impl Into<PathBuf>, runner: SharedRunner) -> Self {
        Self {
            runtime: runtime.into(),
            runner,
        }
    }

    /// Locate the runtime per `settings` and drive it with a blocking [`ExecService`].
    pub fn detect(settings: &Settings) -> Result<Self> {
        let runtime = container_runtime_path(settings)?;
        debug!("container runtime: {}", runtime.display());
        Ok(Self::new(
            runtime,
            Arc::new(ExecService::new(settings.exec_timeout)),
        ))
    }

    pub fn runtime(&self) -> &Path {
        &self.runtime
    }

    /// Run the runtime with `args`; failures to launch are logged and become `None`.
    fn exec(&self, args: &[&str]) -> Option<ExecOutput> {
        let req = ExecRequest::new(&self.runtime).args(args.iter().copied());
        match self.runner.run(req) {
            Ok(out) => {
                if !out.success() {
                    error!(
                        "{} {} failed ({}): {}",
                        self.runtime.display(),
                        args.join(" "),
                        out.status,
                        out.stderr.trim()
                    );
                }
                Some(out)
            }
            Err(e) => {
                error!("{e}");
                None
            }
        }
    }
}

impl RegistryProbe for DockerCli {
    fn list_containers(&self) -> Vec<String> {
        match self.exec(&["ps", "-a"]) {
            Some(out) if out.success() => parse_container_names(&out.stdout),
            _ => Vec::new(),
        }
    }

    fn list_volumes(&self, container: &str) -> Result<Vec<PathMapping>> {
        let stdout = match self.exec(&["inspect", "-f", MOUNTS_TEMPLATE, container]) {
            Some(out) if out.success() => out.stdout,
            _ => String::new(),
        };
        parse_mounts(container, &stdout)
    }

    fn start(&self, container: &str) -> bool {
        if !self.contains(container) {
            error!("Container '{container}' is not available.");
            return false;
        }
        self.exec(&["start", container])
            .map(|o| o.success())
            .unwrap_or(false)
    }

    fn run(&self, spec: &RunSpec) -> bool {
        if self.contains(&spec.name) {
            error!("Container '{}' already exists", spec.name);
            return false;
        }
        if spec.ports.is_some() {
            warn!("'ports' argument is not implemented yet; ignoring");
        }
        let args = spec.to_args();
        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        self.exec(&refs).map(|o| o.success()).unwrap_or(false)
    }

    fn bake(&self, container: &str) -> Box<dyn Backend> {
        Box::new(BakedShell::container_exec(
            &self.runtime,
            container,
            Arc::clone(&self.runner),
        ))
    }
}
