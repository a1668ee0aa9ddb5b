#![allow(dead_code)]
use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use shoosh::{
    Backend, ExecOutput, ExecRequest, PathMapping, RegistryProbe, RunSpec, Runner, Session,
};

pub fn exit_status(code: i32) -> ExitStatus {
    ExitStatus::from_raw(code << 8)
}

pub fn output(code: i32, stdout: &str) -> ExecOutput {
    ExecOutput {
        status: exit_status(code),
        duration: Duration::ZERO,
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

pub fn pm(host: &str, container: &str) -> PathMapping {
    PathMapping::new(host, container).expect("valid mapping")
}

/// Backend that records every line it is asked to run and answers with exit code 0.
#[derive(Debug, Clone)]
pub struct RecordingBackend {
    pub container: String,
    pub lines: Arc<Mutex<Vec<String>>>,
}

impl Backend for RecordingBackend {
    fn argv(&self, line: &str) -> Vec<String> {
        vec![
            "docker".to_string(),
            "exec".to_string(),
            "-t".to_string(),
            self.container.clone(),
            "bash".to_string(),
            "--login".to_string(),
            "-c".to_string(),
            line.to_string(),
        ]
    }

    fn run_line(&self, line: &str) -> shoosh::Result<ExecOutput> {
        self.lines.lock().unwrap().push(line.to_string());
        Ok(output(0, ""))
    }
}

/// In-memory registry: fixed containers and volumes, records start/run requests.
#[derive(Debug, Clone, Default)]
pub struct FakeProbe {
    pub containers: Vec<String>,
    pub volumes: Vec<PathMapping>,
    pub broken_inspect: bool,
    pub lines: Arc<Mutex<Vec<String>>>,
    pub baked: Arc<Mutex<Vec<String>>>,
}

impl FakeProbe {
    pub fn new(containers: &[&str], volumes: Vec<PathMapping>) -> Self {
        Self {
            containers: containers.iter().map(|s| s.to_string()).collect(),
            volumes,
            ..Self::default()
        }
    }

    pub fn recorded_lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl RegistryProbe for FakeProbe {
    fn list_containers(&self) -> Vec<String> {
        self.containers.clone()
    }

    fn list_volumes(&self, container: &str) -> shoosh::Result<Vec<PathMapping>> {
        if self.broken_inspect {
            return shoosh::docker::parse_mounts(container, "{not json");
        }
        Ok(self.volumes.clone())
    }

    fn start(&self, container: &str) -> bool {
        self.contains(container)
    }

    fn run(&self, spec: &RunSpec) -> bool {
        !self.contains(&spec.name)
    }

    fn bake(&self, container: &str) -> Box<dyn Backend> {
        self.baked.lock().unwrap().push(container.to_string());
        Box::new(RecordingBackend {
            container: container.to_string(),
            lines: Arc::clone(&self.lines),
        })
    }
}

/// Session over `probe` whose host-path predicate accepts exactly `existing`.
pub fn session_with(probe: FakeProbe, existing: &[&str]) -> Session {
    let existing: Vec<String> = existing.iter().map(|s| s.to_string()).collect();
    Session::new(Some(Box::new(probe)))
        .with_exists_on_host(move |v| existing.iter().any(|e| e == v))
}

/// Runner answering each request with the next scripted output; records argument lists.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRunner {
    pub replies: Arc<Mutex<Vec<ExecOutput>>>,
    pub calls: Arc<Mutex<Vec<Vec<String>>>>,
}

impl ScriptedRunner {
    pub fn new(replies: Vec<ExecOutput>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into_iter().rev().collect())),
            calls: Arc::default(),
        }
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

impl Runner for ScriptedRunner {
    fn run(&self, request: ExecRequest) -> shoosh::Result<ExecOutput> {
        self.calls.lock().unwrap().push(request.args_lossy());
        let reply = self.replies.lock().unwrap().pop();
        Ok(reply.unwrap_or_else(|| output(0, "")))
    }
}
