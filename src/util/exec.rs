use std::ffi::{OsStr, OsString};
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use wait_timeout::ChildExt;

use crate::errors::{Result, ShooshError};

/// Runs one external process to completion.
///
/// Implemented by [`ExecService`]; tests substitute scripted runners.
pub trait Runner {
    fn run(&self, request: ExecRequest) -> Result<ExecOutput>;
}

/// Blocking command execution with captured output and an optional timeout.
#[derive(Debug, Clone, Default)]
pub struct ExecService {
    default_timeout: Duration,
}

impl ExecService {
    /// A zero `default_timeout` waits for the child indefinitely.
    pub fn new(default_timeout: Duration) -> Self {
        Self { default_timeout }
    }
}

impl Runner for ExecService {
    fn run(&self, request: ExecRequest) -> Result<ExecOutput> {
        let display = request.program.to_string_lossy().into_owned();

        let mut cmd = Command::new(&request.program);
        cmd.args(&request.args);
        if let Some(ref cwd) = request.cwd {
            cmd.current_dir(cwd);
        }
        for (key, value) in &request.env {
            cmd.env(key, value);
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd
            .spawn()
            .map_err(|e| ShooshError::backend(display.clone(), e))?;

        // Drain pipes on helper threads so a chatty child cannot fill them and block.
        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();
        let stdout_reader = std::thread::spawn(move || read_stream(stdout_pipe));
        let stderr_reader = std::thread::spawn(move || read_stream(stderr_pipe));

        let timeout = request.timeout.unwrap_or(self.default_timeout);
        let started = Instant::now();
        let status = if timeout.is_zero() {
            child
                .wait()
                .map_err(|e| ShooshError::backend(display.clone(), e))?
        } else {
            match child
                .wait_timeout(timeout)
                .map_err(|e| ShooshError::backend(display.clone(), e))?
            {
                Some(status) => status,
                None => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(ShooshError::backend(
                        display,
                        io::Error::new(
                            io::ErrorKind::TimedOut,
                            format!("timed out after {timeout:?}"),
                        ),
                    ));
                }
            }
        };
        let duration = started.elapsed();

        let stdout =
            join_reader(stdout_reader).map_err(|e| ShooshError::backend(display.clone(), e))?;
        let stderr = join_reader(stderr_reader).map_err(|e| ShooshError::backend(display, e))?;

        Ok(ExecOutput {
            status,
            duration,
            stdout,
            stderr,
        })
    }
}

fn read_stream<R: Read>(stream: Option<R>) -> io::Result<String> {
    let mut buf = String::new();
    if let Some(mut reader) = stream {
        reader.read_to_string(&mut buf)?;
    }
    Ok(buf)
}

fn join_reader(handle: std::thread::JoinHandle<io::Result<String>>) -> io::Result<String> {
    handle
        .join()
        .unwrap_or_else(|_| Err(io::Error::other("output reader thread panicked")))
}

#[derive(Debug, Default, Clone)]
pub struct ExecRequest {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    env: Vec<(OsString, OsString)>,
    timeout: Option<Duration>,
}

impl ExecRequest {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    /// Arguments as lossy UTF-8, convenient for logging and assertions.
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct ExecOutput {
    pub status: ExitStatus,
    pub duration: Duration,
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }
}
