//! Plugin capability contract
//!
//! Concrete plugins implement the typed [`Plugin`] trait. The pipeline only
//! ever sees the object-safe [`PluginFactory`] (a plugin *type*, as stored in
//! the registry) and [`PluginInstance`] (a constructed plugin).

use std::marker::PhantomData;

use anyhow::Context;
use serde_json::Value;
use thiserror::Error;

use crate::schema::{Configurable, Schema};

#[derive(Debug, Error, PartialEq)]
pub enum ContractError {
    #[error("Object '{0}' is not a plugin")]
    NotAPlugin(String),

    #[error("Plugin '{name}' does not implement '{method}'")]
    Unimplemented { name: String, method: &'static str },

    #[error("Failed to construct plugin '{name}': {reason}")]
    Construct { name: String, reason: String },
}

/// A build plugin with typed config and per-rule options
pub trait Plugin: Sized + 'static {
    /// Type name used in diagnostics
    const NAME: &'static str;

    /// Bound once from the plugin table entry
    type Config: Configurable;

    /// Bound for every rule that runs this plugin
    type Options: Configurable;

    fn new(config: Self::Config) -> anyhow::Result<Self>;

    /// Runs one build step; called once per rule, never retried
    fn build(&mut self, options: Self::Options) -> anyhow::Result<()>;
}

/// A plugin type that can be resolved by reference and constructed
pub trait PluginFactory {
    fn type_name(&self) -> &str;

    /// Schema of the plugin's config
    fn config_schema(&self) -> Result<Schema, ContractError> {
        Err(ContractError::Unimplemented {
            name: self.type_name().to_string(),
            method: "config_schema",
        })
    }

    /// Constructs an instance from an already-bound config value
    fn construct(&self, config: Value) -> Result<Box<dyn PluginInstance>, ContractError>;
}

/// A live plugin, owned by the build run
pub trait PluginInstance {
    fn type_name(&self) -> &str;

    /// Schema every rule's options are bound against
    fn options_schema(&self) -> Schema;

    /// Runs the plugin with bound options
    fn build(&mut self, options: Value) -> anyhow::Result<()>;
}

/// [`PluginFactory`] for a typed [`Plugin`]
pub struct PluginType<P>(PhantomData<fn() -> P>);

impl<P: Plugin> PluginType<P> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<P: Plugin> Default for PluginType<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Plugin> PluginFactory for PluginType<P> {
    fn type_name(&self) -> &str {
        P::NAME
    }

    fn config_schema(&self) -> Result<Schema, ContractError> {
        Ok(P::Config::schema())
    }

    fn construct(&self, config: Value) -> Result<Box<dyn PluginInstance>, ContractError> {
        let construct_error = |reason: String| ContractError::Construct {
            name: P::NAME.to_string(),
            reason,
        };

        let config: P::Config =
            serde_json::from_value(config).map_err(|e| construct_error(e.to_string()))?;
        let plugin = P::new(config).map_err(|e| construct_error(format!("{:#}", e)))?;

        Ok(Box::new(Instance(plugin)))
    }
}

struct Instance<P>(P);

impl<P: Plugin> PluginInstance for Instance<P> {
    fn type_name(&self) -> &str {
        P::NAME
    }

    fn options_schema(&self) -> Schema {
        P::Options::schema()
    }

    fn build(&mut self, options: Value) -> anyhow::Result<()> {
        let options: P::Options = serde_json::from_value(options)
            .with_context(|| format!("Failed to convert options for '{}'", P::NAME))?;
        self.0.build(options)
    }
}
