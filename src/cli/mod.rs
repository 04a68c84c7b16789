//! # Command-Line Interface
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `build` | Load the configuration, construct plugins, execute rules |
//! | `serve` | Serve a directory over HTTP |
//!
//! ## Global Options
//!
//! - `--config [PATH|IMPORT]` - config file, `-` for stdin, or `module:attr`
//! - `--config-format toml|json` - decoder for the config file
//! - `--strict` - reject unknown keys and ambiguous unions
//! - `--format text|json` - output format
//! - `-v` / `-q` / `--no-color` - logging
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod build_cmd;
mod output;
mod serve_cmd;

pub use app::{run, Cli, Commands, ConfigFormat};
pub use output::{Output, OutputFormat};
