#![allow(clippy::module_name_repetitions)]
//! Sessions own one execution backend plus the path mappings used to rewrite arguments, and hand
//! out [`WrappedCommand`]s that assemble and run command lines through them.
//!
//! A session starts unconfigured. [`Session::configure`] binds it to a container (and
//! [`Session::configure_host`] to a host login shell); [`Session::reset`] drops the binding again.
//! Wrapped commands borrow the session, so reconfiguring while a wrapper is alive is rejected at
//! compile time.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::backend::{Backend, BakedShell, SharedRunner};
use crate::config::{Settings, DEFAULT_KWARGS_SEP};
use crate::docker::{DockerCli, RegistryProbe};
use crate::errors::{Result, ShooshError};
use crate::mapping::{exists_on_host, ExistsOnHost, MappingSet};
use crate::util::{ExecOutput, ExecService};

struct Binding {
    container: Option<String>,
    backend: Box<dyn Backend>,
    mappings: MappingSet,
}

enum State {
    Unconfigured,
    Configured(Binding),
}

pub struct Session {
    name: Option<String>,
    kwargs_sep: String,
    probe: Option<Box<dyn RegistryProbe>>,
    runner: SharedRunner,
    exists: ExistsOnHost,
    state: State,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("Session");
        d.field("name", &self.name)
            .field("kwargs_sep", &self.kwargs_sep)
            .field("probe", &self.probe.is_some());
        match &self.state {
            State::Unconfigured => d.field("state", &"unconfigured"),
            State::Configured(b) => d
                .field("container", &b.container)
                .field("backend", &b.backend)
                .field("mappings", &b.mappings),
        };
        d.finish()
    }
}

impl Session {
    /// Unconfigured session. `probe` is `None` when no container runtime is available; container
    /// operations then fail with [`ShooshError::ProbeUnavailable`].
    pub fn new(probe: Option<Box<dyn RegistryProbe>>) -> Self {
        Self {
            name: None,
            kwargs_sep: DEFAULT_KWARGS_SEP.to_string(),
            probe,
            runner: Arc::new(ExecService::default()),
            exists: Box::new(exists_on_host),
            state: State::Unconfigured,
        }
    }

    /// Session wired from `settings`: Docker CLI probe when the runtime is found, none otherwise.
    pub fn from_settings(settings: &Settings) -> Self {
        let probe: Option<Box<dyn RegistryProbe>> = match DockerCli::detect(settings) {
            Ok(cli) => Some(Box::new(cli)),
            Err(e) => {
                debug!("no registry probe: {e}");
                None
            }
        };
        let mut s = Self::new(probe).with_kwargs_sep(settings.kwargs_sep.clone());
        s.runner = Arc::new(ExecService::new(settings.exec_timeout));
        s
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_kwargs_sep(mut self, sep: impl Into<String>) -> Self {
        self.kwargs_sep = sep.into();
        self
    }

    /// Replace the host-path predicate that gates positional remapping.
    pub fn with_exists_on_host<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.exists = Box::new(f);
        self
    }

    /// Runner used by [`Session::configure_host`].
    pub fn with_runner(mut self, runner: SharedRunner) -> Self {
        self.runner = runner;
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn kwargs_sep(&self) -> &str {
        &self.kwargs_sep
    }

    pub fn is_configured(&self) -> bool {
        matches!(self.state, State::Configured(_))
    }

    /// Current mappings; `None` while unconfigured.
    pub fn mappings(&self) -> Option<&MappingSet> {
        self.binding().ok().map(|b| &b.mappings)
    }

    /// Bound container; `None` while unconfigured or bound to the host shell.
    pub fn container(&self) -> Option<&str> {
        self.binding().ok().and_then(|b| b.container.as_deref())
    }

    pub fn probe(&self) -> Result<&dyn RegistryProbe> {
        self.probe.as_deref().ok_or_else(|| {
            ShooshError::ProbeUnavailable("no container registry probe available".to_string())
        })
    }

    fn binding(&self) -> Result<&Binding> {
        match &self.state {
            State::Configured(b) => Ok(b),
            State::Unconfigured => Err(ShooshError::NotConfigured),
        }
    }

    /// Bind the session to `container`.
    ///
    /// With no (or empty) `mappings` and `inspect` set, the container's declared volumes become
    /// the ordered mappings. On error the previous binding is left untouched.
    pub fn configure(
        &mut self,
        container: &str,
        mappings: Option<MappingSet>,
        inspect: bool,
    ) -> Result<()> {
        let probe = self.probe()?;
        if !probe.contains(container) {
            return Err(ShooshError::ContainerNotFound(container.to_string()));
        }

        let mappings = match mappings {
            Some(m) if !m.is_empty() => m,
            explicit if inspect => {
                let vols = probe.list_volumes(container)?;
                debug!("{} declared volume(s) on {}", vols.len(), container);
                if vols.is_empty() {
                    explicit.unwrap_or_default()
                } else {
                    MappingSet::Ordered(vols)
                }
            }
            explicit => explicit.unwrap_or_default(),
        };

        let backend = probe.bake(container);
        debug!(
            "session {:?}: bound to {} via {:?} with {:?}",
            self.name, container, backend, mappings
        );
        self.state = State::Configured(Binding {
            container: Some(container.to_string()),
            backend,
            mappings,
        });
        Ok(())
    }

    /// Bind the session to a Bash login shell on the host, without mappings.
    pub fn configure_host(&mut self) {
        let backend = BakedShell::login_shell(Arc::clone(&self.runner));
        debug!("session {:?}: bound to host shell {:?}", self.name, backend);
        self.state = State::Configured(Binding {
            container: None,
            backend: Box::new(backend),
            mappings: MappingSet::default(),
        });
    }

    /// Drop backend and mappings; the session is unconfigured again.
    pub fn reset(&mut self) {
        debug!("session {:?}: reset", self.name);
        self.state = State::Unconfigured;
    }

    /// Run an already-assembled command line through the bound backend.
    pub fn run_line(&self, line: &str) -> Result<ExecOutput> {
        let binding = self.binding()?;
        debug!("{}", line);
        let out = binding.backend.run_line(line)?;
        debug!(
            "Exit code: {}",
            out.status
                .code()
                .map_or_else(|| "none".to_string(), |c| c.to_string())
        );
        Ok(out)
    }

    /// Full process invocation that [`Session::run_line`] would perform.
    pub fn preview(&self, line: &str) -> Result<String> {
        Ok(self.binding()?.backend.preview(line))
    }

    pub fn wrap(&self, exec: impl Into<Executable>) -> WrappedCommand<'_> {
        WrappedCommand {
            session: self,
            exec: exec.into(),
        }
    }
}

/// Leading tokens of a wrapped command: a program name, or a program with fixed arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Executable(Vec<String>);

impl Executable {
    pub fn tokens(&self) -> &[String] {
        &self.0
    }
}

impl From<&str> for Executable {
    fn from(s: &str) -> Self {
        Executable(vec![s.to_string()])
    }
}

impl From<String> for Executable {
    fn from(s: String) -> Self {
        Executable(vec![s])
    }
}

impl From<Vec<String>> for Executable {
    fn from(v: Vec<String>) -> Self {
        Executable(v)
    }
}

impl From<&[&str]> for Executable {
    fn from(v: &[&str]) -> Self {
        Executable(v.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Executable {
    fn from(v: [&str; N]) -> Self {
        Executable(v.iter().map(|s| s.to_string()).collect())
    }
}

/// A command bound to a session. Cheap to create; holds no state beyond the borrow.
#[derive(Debug, Clone)]
pub struct WrappedCommand<'s> {
    session: &'s Session,
    exec: Executable,
}

impl<'s> WrappedCommand<'s> {
    pub fn executable(&self) -> &Executable {
        &self.exec
    }

    /// Assemble the command line: executable tokens, remapped positionals, then rendered keywords,
    /// joined by single spaces.
    pub fn command_line<A, S, K, L, V>(&self, args: A, kwargs: K) -> Result<String>
    where
        A: IntoIterator<Item = S>,
        S: AsRef<str>,
        K: IntoIterator<Item = (L, V)>,
        L: AsRef<str>,
        V: AsRef<str>,
    {
        let binding = self.session.binding()?;
        let maps = &binding.mappings;
        let exists = &*self.session.exists;
        let sep = self.session.kwargs_sep.as_str();

        let mut tokens: Vec<String> = self.exec.tokens().to_vec();
        tokens.extend(
            args.into_iter()
                .map(|a| maps.remap_positional(a.as_ref(), exists)),
        );
        tokens.extend(
            kwargs
                .into_iter()
                .map(|(l, v)| maps.remap_keyword(l.as_ref(), v.as_ref(), sep, exists)),
        );
        Ok(tokens.join(" "))
    }

    pub fn call<A, S, K, L, V>(&self, args: A, kwargs: K) -> Result<ExecOutput>
    where
        A: IntoIterator<Item = S>,
        S: AsRef<str>,
        K: IntoIterator<Item = (L, V)>,
        L: AsRef<str>,
        V: AsRef<str>,
    {
        let line = self.command_line(args, kwargs)?;
        self.session.run_line(&line)
    }

    /// [`WrappedCommand::call`] with positional arguments only.
    pub fn call_args<A, S>(&self, args: A) -> Result<ExecOutput>
    where
        A: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.call(args, std::iter::empty::<(&str, &str)>())
    }
}
