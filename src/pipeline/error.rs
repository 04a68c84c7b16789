//! Path-qualified pipeline errors

use thiserror::Error;

use crate::plugin::{ContractError, ImportFromStringError};
use crate::schema::{BindError, FieldPath};

/// A pipeline failure, attributed to its location in the configuration
///
/// `context` is the document path of the offending entry, e.g.
/// `budg.plugins.copy.config` or `budg.rules[2].options`.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A plugin reference string could not be resolved
    #[error("{context}: {source}")]
    Reference {
        context: FieldPath,
        source: ImportFromStringError,
    },

    /// The resolved object does not fulfil the plugin contract
    #[error("{context}: {source}")]
    Contract {
        context: FieldPath,
        source: ContractError,
    },

    /// A plugin config or rule options did not match the declared schema
    #[error("{context}: {source}")]
    Bind { context: FieldPath, source: BindError },

    /// A rule names a plugin missing from the plugins table
    #[error("{context}: Plugin '{plugin}' is not set")]
    PluginNotSet { context: FieldPath, plugin: String },

    /// The plugin's own build step failed
    #[error("{context}: {error:#}")]
    Build {
        context: FieldPath,
        plugin: String,
        error: anyhow::Error,
    },
}

impl PipelineError {
    /// Document path the error is attributed to
    pub fn context(&self) -> &FieldPath {
        match self {
            PipelineError::Reference { context, .. }
            | PipelineError::Contract { context, .. }
            | PipelineError::Bind { context, .. }
            | PipelineError::PluginNotSet { context, .. }
            | PipelineError::Build { context, .. } => context,
        }
    }
}

/// `budg.plugins.<name>`
pub(crate) fn plugin_path(name: &str) -> FieldPath {
    FieldPath::root().key("budg").key("plugins").key(name)
}

/// `budg.rules[<index>]`
pub(crate) fn rule_path(index: usize) -> FieldPath {
    FieldPath::root().key("budg").key("rules").index(index)
}
