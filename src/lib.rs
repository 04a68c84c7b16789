//! Budg - a plugin-driven static site builder
//!
//! A build is described by a configuration document: a table of named
//! plugin instances and an ordered list of rules. Each rule hands a set of
//! options to one plugin instance, which does the actual work (copying
//! files, rendering pages, ...).
//!
//! The crate is layered bottom-up:
//!
//! - [`schema`] binds untyped documents to typed configuration
//! - [`plugin`] resolves `module:attr` references and defines the plugin contract
//! - [`config`] decodes and binds the configuration file
//! - [`pipeline`] constructs plugins and executes rules
//! - [`server`] serves a build output directory
//! - [`cli`] ties it together behind `budg build` and `budg serve`

pub mod cli;
pub mod config;
pub mod logger;
pub mod pipeline;
pub mod plugin;
pub mod schema;
pub mod server;

pub use config::{BudgConfig, BudgConfigPlugin, BudgConfigRule, Config, ConfigLoader};
pub use pipeline::{BuildReport, Builder, PipelineError};
pub use plugin::{Plugin, Registry};
pub use schema::{Binder, Configurable, Document, Schema};

/// Crate version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// `(major, minor, patch)`
pub type VersionInfo = (u32, u32, u32);

/// Crate version as a tuple, handed to config providers
pub const VERSION_INFO: VersionInfo = (
    parse_version_part(env!("CARGO_PKG_VERSION_MAJOR")),
    parse_version_part(env!("CARGO_PKG_VERSION_MINOR")),
    parse_version_part(env!("CARGO_PKG_VERSION_PATCH")),
);

pub fn version_info() -> VersionInfo {
    VERSION_INFO
}

const fn parse_version_part(part: &str) -> u32 {
    let bytes = part.as_bytes();
    let mut value = 0u32;
    let mut i = 0;
    while i < bytes.len() {
        let digit = bytes[i];
        if !digit.is_ascii_digit() {
            break;
        }
        value = value * 10 + (digit - b'0') as u32;
        i += 1;
    }
    value
}
