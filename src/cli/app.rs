//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{build_cmd, serve_cmd};
use crate::logger::init_logger;
use crate::schema::Binder;

#[derive(Parser)]
#[command(name = "budg")]
#[command(author, about = "Plugin-driven static site builder")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file path, `-` for stdin, or a `module:attr` import string
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    /// Config file format
    #[arg(long, global = true)]
    pub config_format: Option<ConfigFormat>,

    /// Reject unknown config keys and ambiguous unions
    #[arg(long, global = true)]
    pub strict: bool,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Only log errors
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Disable colored log output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the site from the configuration
    Build,

    /// Serve a directory over HTTP
    Serve {
        /// Directory to serve
        #[arg(long, short = 'd', default_value = ".")]
        directory: PathBuf,

        /// Address to bind
        #[arg(long, default_value = "::")]
        host: String,

        /// Port to bind
        #[arg(long, short = 'p', default_value_t = 3000)]
        port: u16,
    },
}

/// Config decoders selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// Decoder name in the decoder registry
    pub fn as_str(self) -> &'static str {
        match self {
            ConfigFormat::Toml => "toml",
            ConfigFormat::Json => "json",
        }
    }
}

/// `<version> (<os>-<arch>)`
pub fn long_version() -> String {
    format!(
        "{} ({}-{})",
        crate::VERSION,
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let matches = Cli::command().version(long_version()).get_matches();
    let cli = Cli::from_arg_matches(&matches)?;

    init_logger(cli.verbose, cli.quiet, cli.no_color);
    let output = Output::new(cli.format);

    match cli.command {
        Commands::Build => {
            let binder = Binder::new().strict(cli.strict);
            build_cmd::run(
                &output,
                binder,
                cli.config.as_deref(),
                cli.config_format.map(ConfigFormat::as_str),
            )?
        }
        Commands::Serve {
            directory,
            host,
            port,
        } => serve_cmd::run(directory, host, port)?,
    }

    Ok(())
}
