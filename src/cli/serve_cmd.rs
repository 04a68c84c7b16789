//! `budg serve`

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::server::{self, ServeOptions};

pub fn run(directory: PathBuf, host: String, port: u16) -> Result<()> {
    let options = ServeOptions {
        directory,
        host,
        port,
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(server::serve(&options))
}
