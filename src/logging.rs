//! Process-wide tracing setup.

use std::env;

use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;

static INIT: OnceCell<()> = OnceCell::new();

/// Filter directive: `SHOOSH_LOG`, then `RUST_LOG`, then `debug`/`info` by verbosity.
fn filter_directive(verbose: bool) -> String {
    env::var("SHOOSH_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .or_else(|| env::var("RUST_LOG").ok().filter(|s| !s.trim().is_empty()))
        .unwrap_or_else(|| if verbose { "debug" } else { "info" }.to_string())
}

/// Install the stderr subscriber once; later calls are no-ops.
pub fn init(verbose: bool) {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_new(filter_directive(verbose))
            .unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .compact()
            .try_init();
    });
}
