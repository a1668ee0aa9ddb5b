use clap::{Parser, Subcommand};
use shoosh::PathMapping;

pub(crate) const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("SHOOSH_BUILD_TARGET"),
    ", ",
    env!("SHOOSH_BUILD_PROFILE"),
    ", built ",
    env!("SHOOSH_BUILD_DATE"),
    ", ",
    env!("SHOOSH_BUILD_RUSTC"),
    ")"
);

/// Parse `label=host:container`.
fn parse_label_map(s: &str) -> Result<(String, PathMapping), String> {
    let (label, pair) = s
        .split_once('=')
        .ok_or_else(|| "expected label=host:container".to_string())?;
    if label.is_empty() {
        return Err("label must not be empty".to_string());
    }
    let m = pair.parse::<PathMapping>().map_err(|e| e.to_string())?;
    Ok((label.to_string(), m))
}

/// Parse `label=value`.
fn parse_keyword(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((label, value)) if !label.is_empty() => Ok((label.to_string(), value.to_string())),
        _ => Err("expected label=value".to_string()),
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "shoosh",
    version,
    long_version = LONG_VERSION,
    about = "Run commands in a Bash login shell inside a Docker container, translating host paths to container mounts."
)]
pub(crate) struct Cli {
    /// Print debug logs (assembled command lines, exit codes)
    #[arg(long, global = true)]
    pub(crate) verbose: bool,

    /// Print what would run, but do not execute
    #[arg(long, global = true)]
    pub(crate) dry_run: bool,

    #[command(subcommand)]
    pub(crate) command: Cmd,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum Cmd {
    /// List container names known to the runtime
    Ps,
    /// List declared volumes of a container as host:container
    Volumes { container: String },
    /// (Re)start an existing container
    Start { container: String },
    /// Create and start a detached container
    Run {
        image: String,
        /// Container name
        #[arg(long)]
        name: String,
        /// Bind mount host:container (repeatable)
        #[arg(short = 'v', long = "volume")]
        volumes: Vec<PathMapping>,
        /// Port mapping (accepted, not applied yet)
        #[arg(short = 'p', long = "port")]
        ports: Vec<String>,
    },
    /// Run a wrapped command inside a container
    Exec {
        container: String,
        /// Ordered host:container mapping applied to path arguments (repeatable)
        #[arg(long = "map", conflicts_with = "label_maps")]
        maps: Vec<PathMapping>,
        /// label=host:container mapping applied only to keyword `label` (repeatable)
        #[arg(long = "label-map", value_parser = parse_label_map)]
        label_maps: Vec<(String, PathMapping)>,
        /// Do not derive mappings from the container's declared volumes
        #[arg(long)]
        no_inspect: bool,
        /// Separator between keyword label and value
        #[arg(long)]
        sep: Option<String>,
        /// Keyword argument label=value, rendered after positionals (repeatable)
        #[arg(long = "kw", value_parser = parse_keyword)]
        kwargs: Vec<(String, String)>,
        /// Program followed by its positional arguments
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        command: Vec<String>,
    },
    /// Run a command in a Bash login shell on the host
    Sh {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        command: Vec<String>,
    },
}
