//! Typed configuration model
//!
//! ```toml
//! [budg.plugins.copy]
//! source = "budg.plugins.copier:CopierPlugin"
//! config = {}
//!
//! [[budg.rules]]
//! plugin = "copy"
//! options = { directory = "./content", destination = "./dist" }
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::schema::{BindError, Binder, Configurable, Document, FieldType, Schema};

/// Root of a configuration document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub budg: BudgConfig,
}

impl Config {
    /// Binds a decoded document
    pub fn from_document(binder: &Binder, document: &Document) -> Result<Self, BindError> {
        binder.bind_as(&Value::Object(document.clone()))
    }
}

impl Configurable for Config {
    fn schema() -> Schema {
        Schema::new("Config").field_or("budg", FieldType::Struct(BudgConfig::schema()), json!({}))
    }
}

/// The `budg` table: rules in execution order and named plugins
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgConfig {
    pub rules: Vec<BudgConfigRule>,
    pub plugins: IndexMap<String, BudgConfigPlugin>,
}

impl Configurable for BudgConfig {
    fn schema() -> Schema {
        Schema::new("BudgConfig")
            .field_or(
                "rules",
                FieldType::list(FieldType::Struct(BudgConfigRule::schema())),
                json!([]),
            )
            .field_or(
                "plugins",
                FieldType::map(FieldType::Struct(BudgConfigPlugin::schema())),
                json!({}),
            )
    }
}

/// A plugin table entry: which plugin type, and its raw config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgConfigPlugin {
    /// Reference string, e.g. `budg.plugins.copier:CopierPlugin`
    pub source: String,
    pub config: Document,
}

impl Configurable for BudgConfigPlugin {
    fn schema() -> Schema {
        Schema::new("BudgConfigPlugin")
            .field("source", FieldType::String)
            .field_or("config", FieldType::document(), json!({}))
    }
}

/// One build step: a plugin name and its raw per-rule options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgConfigRule {
    pub plugin: String,
    pub options: Document,
}

impl Configurable for BudgConfigRule {
    fn schema() -> Schema {
        Schema::new("BudgConfigRule")
            .field("plugin", FieldType::String)
            .field_or("options", FieldType::document(), json!({}))
    }
}
