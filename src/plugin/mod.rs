//! # Plugin System
//!
//! Build plugins are named in configuration and bound late, by reference.
//!
//! ## Overview
//!
//! A plugin *type* is registered in a [`Registry`] under a module path and an
//! attribute name. Configuration refers to it with a reference string:
//!
//! ```text
//! budg.plugins.copier:CopierPlugin
//! └─── module ──────┘ └─ object ─┘
//! ```
//!
//! The registry is populated by static registration ([`Registry::builtin`],
//! [`Registry::register_module`]); nothing is loaded from disk.
//!
//! ## Contract
//!
//! | Step | Trait method | Called |
//! |------|--------------|--------|
//! | Config schema | [`PluginFactory::config_schema`] | once per plugin table entry |
//! | Construction | [`PluginFactory::construct`] | once per plugin table entry |
//! | Options schema | [`PluginInstance::options_schema`] | once per rule |
//! | Build | [`PluginInstance::build`] | once per rule |
//!
//! Plugin authors implement the typed [`Plugin`] trait and register it with
//! [`Object::plugin`].
//!
//! ## Built-in Plugins
//!
//! - `budg.plugins.copier:CopierPlugin` - Copies a directory tree

mod contract;
mod copier;
mod registry;

pub use contract::{ContractError, Plugin, PluginFactory, PluginInstance, PluginType};
pub use copier::{CopierConfig, CopierOptions, CopierPlugin};
pub use registry::{
    object_name_from_import_string, ConfigProvider, ImportFromStringError, Namespace, Object,
    Registry,
};
