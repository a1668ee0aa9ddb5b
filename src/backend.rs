#![allow(clippy::module_name_repetitions)]
//! Execution backends: a shell pre-bound to a fixed command prefix ("baked"), which receives
//! the assembled command line as its final argument.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::errors::Result;
use crate::util::{shell_join, ExecOutput, ExecRequest, Runner};

pub type SharedRunner = Arc<dyn Runner + Send + Sync>;

const LOGIN_SHELL: [&str; 3] = ["bash", "--login", "-c"];

pub trait Backend: fmt::Debug {
    /// Full process invocation for `line`: program first.
    fn argv(&self, line: &str) -> Vec<String>;

    /// Run `line` and wait for it.
    fn run_line(&self, line: &str) -> Result<ExecOutput>;

    /// Shell-escaped rendering of [`Backend::argv`] for previews and logs.
    fn preview(&self, line: &str) -> String {
        shell_join(&self.argv(line))
    }
}

#[derive(Clone)]
pub struct BakedShell {
    program: String,
    prefix: Vec<String>,
    runner: SharedRunner,
}

impl BakedShell {
    /// `bash --login -c <line>` on the host.
    pub fn login_shell(runner: SharedRunner) -> Self {
        Self {
            program: LOGIN_SHELL[0].to_string(),
            prefix: LOGIN_SHELL[1..].iter().map(|s| s.to_string()).collect(),
            runner,
        }
    }

    /// `<runtime> exec -t <container> bash --login -c <line>`.
    pub fn container_exec(runtime: &Path, container: &str, runner: SharedRunner) -> Self {
        let mut prefix = vec!["exec".to_string(), "-t".to_string(), container.to_string()];
        prefix.extend(LOGIN_SHELL.iter().map(|s| s.to_string()));
        Self {
            program: runtime.display().to_string(),
            prefix,
            runner,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn prefix(&self) -> &[String] {
        &self.prefix
    }
}

impl fmt::Debug for BakedShell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BakedShell")
            .field("program", &self.program)
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl Backend for BakedShell {
    fn argv(&self, line: &str) -> Vec<String> {
        let mut v = Vec::with_capacity(self.prefix.len() + 2);
        v.push(self.program.clone());
        v.extend(self.prefix.iter().cloned());
        v.push(line.to_string());
        v
    }

    fn run_line(&self, line: &str) -> Result<ExecOutput> {
        let req = ExecRequest::new(&self.program)
            .args(&self.prefix)
            .arg(line);
        self.runner.run(req)
    }
}
