//! Copier plugin
//!
//! Copies a source directory tree into a destination directory.
//!
//! ```toml
//! [budg.plugins.copy]
//! source = "budg.plugins.copier:CopierPlugin"
//!
//! [[budg.rules]]
//! plugin = "copy"
//! options = { directory = "./static", destination = "./dist" }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};
use walkdir::WalkDir;

use super::contract::Plugin;
use super::registry::{Namespace, Object};
use crate::schema::{Configurable, FieldType, Schema};

/// Copier has no plugin-level settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CopierConfig {}

impl Configurable for CopierConfig {
    fn schema() -> Schema {
        Schema::new("CopierConfig")
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CopierOptions {
    /// Directory to copy from
    pub directory: PathBuf,

    /// Directory to copy into (created if missing)
    pub destination: PathBuf,
}

impl Configurable for CopierOptions {
    fn schema() -> Schema {
        Schema::new("CopierOptions")
            .field("directory", FieldType::String)
            .field("destination", FieldType::String)
    }
}

pub struct CopierPlugin;

impl Plugin for CopierPlugin {
    const NAME: &'static str = "CopierPlugin";
    type Config = CopierConfig;
    type Options = CopierOptions;

    fn new(_config: CopierConfig) -> Result<Self> {
        Ok(Self)
    }

    fn build(&mut self, options: CopierOptions) -> Result<()> {
        let CopierOptions {
            directory,
            destination,
        } = options;

        if !directory.is_dir() {
            anyhow::bail!("Source directory not found: {}", directory.display());
        }
        let source_root = fs::canonicalize(&directory)
            .with_context(|| format!("Failed to resolve {}", directory.display()))?;
        let destination_root = resolve_destination(&destination)
            .with_context(|| format!("Failed to resolve {}", destination.display()))?;
        if destination_root.starts_with(&source_root) {
            anyhow::bail!(
                "Destination {} is inside source directory {}",
                destination.display(),
                directory.display()
            );
        }

        let mut copied = 0usize;
        for entry in WalkDir::new(&directory).follow_links(true) {
            let entry = entry.with_context(|| format!("Failed to walk {}", directory.display()))?;
            let relative = entry
                .path()
                .strip_prefix(&directory)
                .context("Walked outside source directory")?;
            let target = destination.join(relative);

            if entry.file_type().is_dir() {
                fs::create_dir_all(&target)
                    .with_context(|| format!("Failed to create directory: {}", target.display()))?;
                continue;
            }

            fs::copy(entry.path(), &target).with_context(|| {
                format!(
                    "Failed to copy {} to {}",
                    entry.path().display(),
                    target.display()
                )
            })?;
            debug!(file = %relative.display(), "Copied");
            copied += 1;
        }

        info!(
            files = copied,
            from = %directory.display(),
            to = %destination.display(),
            "Copied directory"
        );
        Ok(())
    }
}

/// Canonical form of a path that may not exist yet
///
/// The deepest existing ancestor is canonicalized (following symlinks) and
/// the missing components are appended to it.
fn resolve_destination(path: &Path) -> io::Result<PathBuf> {
    let mut missing = Vec::new();
    let mut existing = path;
    loop {
        match fs::canonicalize(existing) {
            Ok(mut resolved) => {
                resolved.extend(missing.iter().rev());
                return Ok(resolved);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                match (existing.parent(), existing.file_name()) {
                    (Some(parent), Some(name)) => {
                        missing.push(name.to_os_string());
                        existing = if parent.as_os_str().is_empty() {
                            Path::new(".")
                        } else {
                            parent
                        };
                    }
                    _ => return Err(e),
                }
            }
            Err(e) => return Err(e),
        }
    }
}

/// The `budg.plugins.copier` module
pub fn module() -> Namespace {
    Namespace::new("budg.plugins.copier").with("CopierPlugin", Object::plugin::<CopierPlugin>())
}
