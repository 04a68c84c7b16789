//! `budg build`

use std::fmt::Display;

use anyhow::Result;
use serde_json::json;
use tracing::debug;

use super::output::Output;
use crate::config::ConfigLoader;
use crate::pipeline::Builder;
use crate::plugin::Registry;
use crate::schema::Binder;

pub fn run(output: &Output, binder: Binder, config: Option<&str>, format: Option<&str>) -> Result<()> {
    let registry = Registry::builtin();

    let loaded = ConfigLoader::new(&registry)
        .with_binder(binder.clone())
        .load(config, format)
        .map_err(surfaced)?;
    debug!(origin = %loaded.origin, strict = binder.is_strict(), "Starting build");

    let report = Builder::new(&registry)
        .with_binder(binder)
        .build(&loaded.config.budg)
        .map_err(surfaced)?;

    let message = if output.is_json() {
        "Build finished".to_string()
    } else {
        format!(
            "Built {} rule(s) with {} plugin(s) from '{}'",
            report.rules,
            report.plugins.len(),
            loaded.origin
        )
    };
    output.success(
        &message,
        &json!({
            "config": loaded.origin,
            "plugins": report.plugins,
            "rules": report.rules,
        }),
    );
    Ok(())
}

/// Library errors already carry their full path-qualified message
fn surfaced(err: impl Display) -> anyhow::Error {
    anyhow::anyhow!("{}", err)
}
