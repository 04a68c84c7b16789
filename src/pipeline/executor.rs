//! Ordered rule execution

use serde_json::Value;
use tracing::info;

use super::error::{rule_path, PipelineError};
use super::transform::PluginMap;
use crate::config::BudgConfigRule;
use crate::schema::Binder;

/// Runs build rules, strictly in declaration order
pub struct RuleExecutor<'a> {
    binder: &'a Binder,
}

impl<'a> RuleExecutor<'a> {
    pub fn new(binder: &'a Binder) -> Self {
        Self { binder }
    }

    /// Executes every rule against its named plugin
    ///
    /// Stops at the first failing rule; later rules never run and earlier
    /// rules' side effects are left in place. Returns the number of rules run.
    pub fn execute(
        &self,
        rules: &[BudgConfigRule],
        plugins: &mut PluginMap,
    ) -> Result<usize, PipelineError> {
        for (index, rule) in rules.iter().enumerate() {
            self.execute_one(index, rule, plugins)?;
        }
        Ok(rules.len())
    }

    fn execute_one(
        &self,
        index: usize,
        rule: &BudgConfigRule,
        plugins: &mut PluginMap,
    ) -> Result<(), PipelineError> {
        let context = rule_path(index);

        let plugin = plugins
            .get_mut(&rule.plugin)
            .ok_or_else(|| PipelineError::PluginNotSet {
                context: context.key("plugin"),
                plugin: rule.plugin.clone(),
            })?;

        let schema = plugin.options_schema();
        let options = self
            .binder
            .bind(&schema, &Value::Object(rule.options.clone()))
            .map_err(|source| PipelineError::Bind {
                context: context.key("options"),
                source,
            })?;

        info!(rule = index, plugin = %rule.plugin, "Running rule");
        plugin.build(options).map_err(|error| PipelineError::Build {
            context,
            plugin: rule.plugin.clone(),
            error,
        })
    }
}
