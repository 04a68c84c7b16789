//! # Build Pipeline
//!
//! Turns a bound [`BudgConfig`] into plugin build calls.
//!
//! ```text
//! budg.plugins ──► PluginTransformer ──► PluginMap ──┐
//!                  (resolve, check, bind, construct)  ├──► RuleExecutor ──► Plugin::build
//! budg.rules ─────────────────────────────────────────┘    (bind options per rule)
//! ```
//!
//! The whole plugin table is constructed before the first rule runs, so a
//! bad plugin definition aborts the build before anything is written.
//! Rules then run one at a time, in order; the first failure stops the build.

mod error;
mod executor;
mod transform;

pub use error::PipelineError;
pub use executor::RuleExecutor;
pub use transform::{PluginMap, PluginTransformer};

use tracing::info;

use crate::config::BudgConfig;
use crate::plugin::Registry;
use crate::schema::Binder;

/// Summary of a completed build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// Constructed plugin names, in table order
    pub plugins: Vec<String>,

    /// Number of rules executed
    pub rules: usize,
}

/// Runs the full pipeline for one configuration
pub struct Builder<'a> {
    registry: &'a Registry,
    binder: Binder,
}

impl<'a> Builder<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self {
            registry,
            binder: Binder::new(),
        }
    }

    pub fn with_binder(mut self, binder: Binder) -> Self {
        self.binder = binder;
        self
    }

    /// Constructs every plugin, then executes every rule
    pub fn build(&self, config: &BudgConfig) -> Result<BuildReport, PipelineError> {
        let mut plugins = PluginTransformer::new(self.registry, &self.binder).transform(&config.plugins)?;
        let rules = RuleExecutor::new(&self.binder).execute(&config.rules, &mut plugins)?;

        info!(rules, plugins = plugins.len(), "Build finished");
        Ok(BuildReport {
            plugins: plugins.keys().cloned().collect(),
            rules,
        })
    }
}
