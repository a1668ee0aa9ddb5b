//! Run wrapped shell commands in a Bash login shell inside a Docker container, rewriting host
//! paths in their arguments to the matching container mounts.
//!
//! ```no_run
//! let sh = shoosh::init("web", None, Some("reports"))?;
//! let cat = sh.wrap("cat");
//! let out = cat.call_args(["/host/data/file.txt"])?; // runs `cat /mnt/data/file.txt` in `web`
//! print!("{}", out.stdout);
//! # Ok::<(), shoosh::ShooshError>(())
//! ```

pub mod backend;
pub mod config;
pub mod docker;
pub mod errors;
pub mod logging;
pub mod mapping;
pub mod session;
pub mod util;

pub use backend::{Backend, BakedShell, SharedRunner};
pub use config::Settings;
pub use docker::{DockerCli, RegistryProbe, RunSpec, Volumes};
pub use errors::{exit_code_for_error, Result, ShooshError};
pub use mapping::{ExistsOnHost, MappingSet, PathMapping};
pub use session::{Executable, Session, WrappedCommand};
pub use util::{ExecOutput, ExecRequest, ExecService, Runner};

/// Session for `container` configured from the environment.
///
/// With no `mappings`, every volume declared on the container becomes a remap rule. `name` labels
/// the session in logs.
pub fn init(container: &str, mappings: Option<MappingSet>, name: Option<&str>) -> Result<Session> {
    let settings = Settings::from_env();
    let probe = DockerCli::detect(&settings)?;
    let mut session = Session::new(Some(Box::new(probe)))
        .with_kwargs_sep(settings.kwargs_sep.clone())
        .with_runner(std::sync::Arc::new(ExecService::new(settings.exec_timeout)));
    if let Some(n) = name {
        session = session.with_name(n);
    }
    session.configure(container, mappings, true)?;
    Ok(session)
}
