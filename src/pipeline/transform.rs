//! Plugin table → live plugin instances

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info};

use super::error::{plugin_path, PipelineError};
use crate::config::BudgConfigPlugin;
use crate::plugin::{
    object_name_from_import_string, ContractError, Object, PluginInstance, Registry,
};
use crate::schema::Binder;

/// Constructed plugins by configured name, in table order
pub type PluginMap = IndexMap<String, Box<dyn PluginInstance>>;

/// Resolves, validates and constructs every entry of a plugins table
pub struct PluginTransformer<'a> {
    registry: &'a Registry,
    binder: &'a Binder,
}

impl<'a> PluginTransformer<'a> {
    pub fn new(registry: &'a Registry, binder: &'a Binder) -> Self {
        Self { registry, binder }
    }

    /// Transforms the whole table, in order
    ///
    /// The first failing entry aborts the transformation; no partially
    /// built map is returned. Every call constructs fresh instances.
    pub fn transform(
        &self,
        plugins: &IndexMap<String, BudgConfigPlugin>,
    ) -> Result<PluginMap, PipelineError> {
        let mut instances = PluginMap::with_capacity(plugins.len());
        for (name, entry) in plugins {
            let instance = self.transform_one(name, entry)?;
            instances.insert(name.clone(), instance);
        }

        info!(count = instances.len(), "Plugins ready");
        Ok(instances)
    }

    /// Resolves and constructs a single plugins table entry
    pub fn transform_one(
        &self,
        name: &str,
        entry: &BudgConfigPlugin,
    ) -> Result<Box<dyn PluginInstance>, PipelineError> {
        let plugin_context = plugin_path(name).key("plugin");
        let contract_error = |source: ContractError| PipelineError::Contract {
            context: plugin_context.clone(),
            source,
        };

        let object = self
            .registry
            .resolve(&entry.source)
            .map_err(|source| PipelineError::Reference {
                context: plugin_context.clone(),
                source,
            })?;

        let factory = match object {
            Object::Plugin(factory) => factory,
            other => {
                let object_name = other
                    .name()
                    .unwrap_or_else(|| object_name_from_import_string(&entry.source));
                return Err(contract_error(ContractError::NotAPlugin(object_name.to_string())));
            }
        };
        debug!(plugin = name, source = %entry.source, "Resolved plugin");

        let schema = factory.config_schema().map_err(contract_error)?;
        let config = self
            .binder
            .bind(&schema, &Value::Object(entry.config.clone()))
            .map_err(|source| PipelineError::Bind {
                context: plugin_path(name).key("config"),
                source,
            })?;

        let instance = factory.construct(config).map_err(contract_error)?;
        debug!(plugin = name, kind = instance.type_name(), "Constructed plugin");
        Ok(instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::{Namespace, Plugin, PluginFactory};
    use crate::schema::{BindErrorKind, Configurable, Document, FieldType, Schema};
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize)]
    struct StrictConfig {
        level: i64,
    }

    impl Configurable for StrictConfig {
        fn schema() -> Schema {
            Schema::new("StrictConfig").field("level", FieldType::Integer)
        }
    }

    #[derive(Deserialize)]
    struct NoOptions {}

    impl Configurable for NoOptions {
        fn schema() -> Schema {
            Schema::new("NoOptions")
        }
    }

    struct Leveled;

    impl Plugin for Leveled {
        const NAME: &'static str = "Leveled";
        type Config = StrictConfig;
        type Options = NoOptions;

        fn new(config: StrictConfig) -> anyhow::Result<Self> {
            if config.level < 0 {
                anyhow::bail!("level must not be negative");
            }
            Ok(Self)
        }

        fn build(&mut self, _options: NoOptions) -> anyhow::Result<()> {
            Ok(())
        }
    }

    struct SchemaLess;

    impl PluginFactory for SchemaLess {
        fn type_name(&self) -> &str {
            "SchemaLess"
        }

        fn construct(&self, _config: Value) -> Result<Box<dyn PluginInstance>, ContractError> {
            unreachable!("construct must not be reached without a schema")
        }
    }

    fn registry() -> Registry {
        Registry::builtin().with_module(
            Namespace::new("test.plugins")
                .with("Leveled", Object::plugin::<Leveled>())
                .with("SchemaLess", Object::factory(SchemaLess))
                .with("NotAPlugin", Object::Value(json!(1))),
        )
    }

    fn entry(source: &str, config: Value) -> BudgConfigPlugin {
        let config: Document = match config {
            Value::Object(map) => map,
            _ => Document::new(),
        };
        BudgConfigPlugin {
            source: source.to_string(),
            config,
        }
    }

    fn table(entries: Vec<(&str, BudgConfigPlugin)>) -> IndexMap<String, BudgConfigPlugin> {
        entries
            .into_iter()
            .map(|(name, entry)| (name.to_string(), entry))
            .collect()
    }

    #[test]
    fn transforms_in_table_order() {
        let registry = registry();
        let binder = Binder::new();
        let plugins = PluginTransformer::new(&registry, &binder)
            .transform(&table(vec![
                ("second", entry("test.plugins:Leveled", json!({"level": 2}))),
                ("copy", entry("budg.plugins.copier:CopierPlugin", json!({}))),
            ]))
            .unwrap();

        let names: Vec<_> = plugins.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["second", "copy"]);
        assert_eq!(plugins["copy"].type_name(), "CopierPlugin");
    }

    #[test]
    fn empty_table() {
        let registry = registry();
        let binder = Binder::new();
        let plugins = PluginTransformer::new(&registry, &binder)
            .transform(&IndexMap::new())
            .unwrap();
        assert!(plugins.is_empty());
    }

    #[test]
    fn unresolvable_reference() {
        let registry = registry();
        let binder = Binder::new();
        let err = PluginTransformer::new(&registry, &binder)
            .transform(&table(vec![("copy", entry("nowhere:Copier", json!({})))]))
            .err()
            .unwrap();

        assert!(matches!(err, PipelineError::Reference { .. }));
        assert_eq!(
            err.to_string(),
            "budg.plugins.copy.plugin: Module 'nowhere' not found."
        );
    }

    #[test]
    fn not_a_plugin_aborts_whole_table() {
        let registry = registry();
        let binder = Binder::new();
        let err = PluginTransformer::new(&registry, &binder)
            .transform(&table(vec![
                ("ok", entry("test.plugins:Leveled", json!({"level": 1}))),
                ("bad", entry("test.plugins:NotAPlugin", json!({}))),
                ("later", entry("test.plugins:Leveled", json!({"level": 1}))),
            ]))
            .err()
            .unwrap();

        assert_eq!(
            err.to_string(),
            "budg.plugins.bad.plugin: Object 'NotAPlugin' is not a plugin"
        );
    }

    #[test]
    fn unimplemented_config_schema_is_resolution_failure() {
        let registry = registry();
        let binder = Binder::new();
        let err = PluginTransformer::new(&registry, &binder)
            .transform(&table(vec![("bare", entry("test.plugins:SchemaLess", json!({})))]))
            .err()
            .unwrap();

        assert!(matches!(
            err,
            PipelineError::Contract {
                source: ContractError::Unimplemented { .. },
                ..
            }
        ));
        assert_eq!(err.context().to_string(), "budg.plugins.bare.plugin");
    }

    #[test]
    fn config_bind_failure_is_path_qualified() {
        let registry = registry();
        let binder = Binder::new();
        let err = PluginTransformer::new(&registry, &binder)
            .transform(&table(vec![("lvl", entry("test.plugins:Leveled", json!({"level": "high"})))]))
            .err()
            .unwrap();

        match &err {
            PipelineError::Bind { source, .. } => {
                assert!(matches!(source.kind(), BindErrorKind::WrongType { .. }));
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(err
            .to_string()
            .starts_with("budg.plugins.lvl.config: level: Wrong value type"));
    }

    #[test]
    fn constructor_failure_is_resolution_failure() {
        let registry = registry();
        let binder = Binder::new();
        let err = PluginTransformer::new(&registry, &binder)
            .transform(&table(vec![("lvl", entry("test.plugins:Leveled", json!({"level": -1})))]))
            .err()
            .unwrap();

        assert_eq!(
            err.to_string(),
            "budg.plugins.lvl.plugin: Failed to construct plugin 'Leveled': level must not be negative"
        );
    }

    #[test]
    fn strict_binder_rejects_unknown_config_keys() {
        let registry = registry();
        let binder = Binder::new().strict(true);
        let err = PluginTransformer::new(&registry, &binder)
            .transform(&table(vec![(
                "copy",
                entry("budg.plugins.copier:CopierPlugin", json!({"verbose": true})),
            )]))
            .err()
            .unwrap();

        assert_eq!(
            err.to_string(),
            "budg.plugins.copy.config: Unexpected data: 'verbose'"
        );
    }

    #[test]
    fn transform_twice_builds_fresh_instances() {
        let registry = registry();
        let binder = Binder::new();
        let transformer = PluginTransformer::new(&registry, &binder);
        let plugins = table(vec![("copy", entry("budg.plugins.copier:CopierPlugin", json!({})))]);

        let first = transformer.transform(&plugins).unwrap();
        let second = transformer.transform(&plugins).unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
    }
}
