//! Logging setup
//!
//! Diagnostics go to stderr through `tracing`, so command output on stdout
//! stays machine-readable.
//!
//! | Flag        | Filter                         |
//! |-------------|--------------------------------|
//! | `--verbose` | `budg=debug`                   |
//! | `--quiet`   | `budg=error`                   |
//! | (none)      | `RUST_LOG`, else `budg=info`   |
//!
//! `--verbose` wins over `--quiet`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const VERBOSE_FILTER: &str = "budg=debug";
const QUIET_FILTER: &str = "budg=error";
const DEFAULT_FILTER: &str = "budg=info";

/// Installs the global subscriber. Later calls are ignored.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let filter = filter_for(verbose, quiet, std::env::var("RUST_LOG").ok().as_deref());

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .with_writer(std::io::stderr)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn filter_for(verbose: bool, quiet: bool, env: Option<&str>) -> EnvFilter {
    EnvFilter::new(filter_directives(verbose, quiet, env))
}

/// Filter directives for the given flags and `RUST_LOG` value
fn filter_directives(verbose: bool, quiet: bool, env: Option<&str>) -> String {
    if verbose {
        VERBOSE_FILTER.to_string()
    } else if quiet {
        QUIET_FILTER.to_string()
    } else {
        match env.map(str::trim) {
            Some(directives) if !directives.is_empty() => directives.to_string(),
            _ => DEFAULT_FILTER.to_string(),
        }
    }
}
