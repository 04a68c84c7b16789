//! Reference resolution
//!
//! Plugins (and config providers) are located by reference strings of the
//! form `<module>:<object>[.<attribute>]*`, for example
//! `budg.plugins.copier:CopierPlugin`.
//!
//! Modules are registered statically into a [`Registry`] that is passed to
//! whoever needs to resolve references; nothing is loaded at runtime.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::contract::{Plugin, PluginFactory, PluginType};
use crate::schema::Document;
use crate::VersionInfo;

#[derive(Debug, Error, PartialEq)]
pub enum ImportFromStringError {
    #[error("Import string '{0}' must be in format '<module>:<object>[.<attribute>]*'.")]
    Malformed(String),

    #[error("Module '{0}' not found.")]
    ModuleNotFound(String),

    #[error("Module '{module}' has no attribute '{attr}'.")]
    ModuleAttribute { module: String, attr: String },

    #[error("Object '{object}' in '{module}' has no attribute '{attr}'.")]
    ObjectAttribute {
        object: String,
        module: String,
        attr: String,
    },
}

/// A function producing a configuration document for a given budg version
pub type ConfigProvider = fn(VersionInfo) -> Document;

/// Anything a reference string can point at
#[derive(Clone)]
pub enum Object {
    /// Container of further attributes (a module or a nested object)
    Namespace(Namespace),

    /// A plugin type
    Plugin(Rc<dyn PluginFactory>),

    /// A configuration provider
    ConfigProvider(ConfigProvider),

    /// Plain data
    Value(Value),
}

impl Object {
    /// Wraps a typed plugin
    pub fn plugin<P: Plugin>() -> Self {
        Self::Plugin(Rc::new(PluginType::<P>::new()))
    }

    /// Wraps a hand-written plugin factory
    pub fn factory(factory: impl PluginFactory + 'static) -> Self {
        Self::Plugin(Rc::new(factory))
    }

    /// Intrinsic name of the object, if it carries one
    pub fn name(&self) -> Option<&str> {
        match self {
            Object::Namespace(ns) => Some(ns.name()),
            Object::Plugin(factory) => Some(factory.type_name()),
            Object::ConfigProvider(_) | Object::Value(_) => None,
        }
    }

    /// Looks up a nested attribute
    pub fn attr(&self, name: &str) -> Option<&Object> {
        match self {
            Object::Namespace(ns) => ns.get(name),
            _ => None,
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Namespace(ns) => f.debug_tuple("Namespace").field(&ns.name).finish(),
            Object::Plugin(factory) => f.debug_tuple("Plugin").field(&factory.type_name()).finish(),
            Object::ConfigProvider(_) => f.write_str("ConfigProvider"),
            Object::Value(value) => f.debug_tuple("Value").field(value).finish(),
        }
    }
}

/// Named collection of attributes
#[derive(Debug, Clone)]
pub struct Namespace {
    name: String,
    attrs: IndexMap<String, Object>,
}

impl Namespace {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: IndexMap::new(),
        }
    }

    /// Adds an attribute (builder style)
    pub fn with(mut self, attr: impl Into<String>, object: Object) -> Self {
        self.attrs.insert(attr.into(), object);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, attr: &str) -> Option<&Object> {
        self.attrs.get(attr)
    }
}

/// Process-wide table of resolvable modules
#[derive(Debug, Default)]
pub struct Registry {
    modules: HashMap<String, Namespace>,
}

impl Registry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the plugins shipped with budg
    pub fn builtin() -> Self {
        Self::new().with_module(super::copier::module())
    }

    /// Registers a module under its namespace name, replacing any previous one
    pub fn register_module(&mut self, module: Namespace) -> &mut Self {
        debug!(module = %module.name(), "Registered module");
        self.modules.insert(module.name().to_string(), module);
        self
    }

    /// Builder-style [`Registry::register_module`]
    pub fn with_module(mut self, module: Namespace) -> Self {
        self.register_module(module);
        self
    }

    /// Resolves `reference` to a registered object
    ///
    /// Resolving the same reference twice yields the same object.
    pub fn resolve(&self, reference: &str) -> Result<&Object, ImportFromStringError> {
        let malformed = || ImportFromStringError::Malformed(reference.to_string());

        let (module_path, attrs) = reference.split_once(':').ok_or_else(malformed)?;
        if module_path.is_empty() || attrs.is_empty() || module_path.starts_with('.') {
            return Err(malformed());
        }

        let module = self
            .modules
            .get(module_path)
            .ok_or_else(|| ImportFromStringError::ModuleNotFound(module_path.to_string()))?;

        let mut resolved: Option<(&Object, &str)> = None;
        for attr in attrs.split('.') {
            let next = match resolved {
                None => module.get(attr).ok_or_else(|| ImportFromStringError::ModuleAttribute {
                    module: module_path.to_string(),
                    attr: attr.to_string(),
                })?,
                Some((object, segment)) => {
                    object.attr(attr).ok_or_else(|| ImportFromStringError::ObjectAttribute {
                        object: object.name().unwrap_or(segment).to_string(),
                        module: module_path.to_string(),
                        attr: attr.to_string(),
                    })?
                }
            };
            resolved = Some((next, attr));
        }

        resolved.map(|(object, _)| object).ok_or_else(malformed)
    }
}

/// Last dotted segment of a reference's attribute path
///
/// Used to name objects that carry no name of their own.
pub fn object_name_from_import_string(reference: &str) -> &str {
    let attrs = reference
        .split_once(':')
        .map(|(_, attrs)| attrs)
        .unwrap_or(reference);
    attrs.rsplit('.').next().unwrap_or(attrs)
}
