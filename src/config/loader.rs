//! Configuration loading
//!
//! `--config` accepts a file path or an import string (`module:attr`):
//!
//! | `--config` | `--config-format` | Source |
//! |------------|-------------------|--------|
//! | (none) | (none) | first of `./config.toml`, `./config.json` that exists, else `./config.toml` |
//! | (none) | `json` | `./config.json` |
//! | `site.json` | (none) | decoder picked by extension (TOML if unknown) |
//! | `-` | any | stdin |
//! | `site.config:budg` | ignored | registered config provider |

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use super::decoder::{Decoder, DecoderError, DecoderRegistry};
use super::model::Config;
use crate::plugin::{object_name_from_import_string, ImportFromStringError, Object, Registry};
use crate::schema::{BindError, Binder, Document};

/// Stem of the default config file names (`config.toml`, `config.json`)
pub const CONFIG_STEM: &str = "config";

/// Format used when nothing else selects one
pub const DEFAULT_CONFIG_FORMAT: &str = "toml";

/// Path meaning "read from stdin"
pub const STDIN_PATH: &str = "-";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown config format '{0}'")]
    UnknownFormat(String),

    #[error("'{origin}': {source}")]
    Io { origin: String, source: io::Error },

    #[error("'{origin}': {source}")]
    Decode { origin: String, source: DecoderError },

    #[error("'{reference}': {source}")]
    Import {
        reference: String,
        source: ImportFromStringError,
    },

    #[error("'{reference}': Object '{name}' must be of type '(version) -> Document'")]
    NotAProvider { reference: String, name: String },

    #[error("'{origin}': {source}")]
    Bind { origin: String, source: BindError },
}

/// A bound configuration and where it came from
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// File path, `<stdin>`, or import string
    pub origin: String,
    pub config: Config,
}

/// Locates, decodes and binds the configuration document
pub struct ConfigLoader<'a> {
    registry: &'a Registry,
    decoders: DecoderRegistry,
    binder: Binder,
    root: PathBuf,
}

impl<'a> ConfigLoader<'a> {
    /// Creates a loader resolving import strings through `registry`
    pub fn new(registry: &'a Registry) -> Self {
        Self {
            registry,
            decoders: DecoderRegistry::builtin(),
            binder: Binder::new(),
            root: PathBuf::from("."),
        }
    }

    /// Directory probed for default config files
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_binder(mut self, binder: Binder) -> Self {
        self.binder = binder;
        self
    }

    /// Loads and binds configuration from `config` (path or import string)
    pub fn load(&self, config: Option<&str>, format: Option<&str>) -> Result<LoadedConfig, ConfigError> {
        let (origin, document) = match config {
            Some(reference) if reference.contains(':') => {
                (reference.to_string(), self.document_from_import(reference)?)
            }
            file => self.document_from_file(file, format)?,
        };

        let config = Config::from_document(&self.binder, &document).map_err(|source| {
            ConfigError::Bind {
                origin: origin.clone(),
                source,
            }
        })?;

        info!(
            origin = %origin,
            rules = config.budg.rules.len(),
            plugins = config.budg.plugins.len(),
            "Loaded configuration"
        );
        Ok(LoadedConfig { origin, config })
    }

    /// Picks the first existing default config file, in decoder order
    pub fn determine_config(&self) -> Result<(PathBuf, &dyn Decoder), ConfigError> {
        for decoder in self.decoders.iter() {
            for ext in decoder.extensions() {
                let path = self.default_path(*ext);
                if path.exists() {
                    return Ok((path, decoder));
                }
            }
        }

        let decoder = self.default_decoder()?;
        Ok((self.default_path(decoder.default_extension()), decoder))
    }

    /// Decodes a config file (or stdin), returning its origin and document
    pub fn document_from_file(
        &self,
        file: Option<&str>,
        format: Option<&str>,
    ) -> Result<(String, Document), ConfigError> {
        let (path, decoder) = match (file, format) {
            (file, Some(format)) => {
                let decoder = self
                    .decoders
                    .get(format)
                    .ok_or_else(|| ConfigError::UnknownFormat(format.to_string()))?;
                let path = match file {
                    Some(file) => PathBuf::from(file),
                    None => self.default_path(decoder.default_extension()),
                };
                (path, decoder)
            }
            (Some(file), None) => {
                let path = PathBuf::from(file);
                let decoder = match self.decoders.for_path(&path) {
                    Some(decoder) => decoder,
                    None => self.default_decoder()?,
                };
                (path, decoder)
            }
            (None, None) => self.determine_config()?,
        };

        let origin = if path == Path::new(STDIN_PATH) {
            "<stdin>".to_string()
        } else {
            path.display().to_string()
        };
        debug!(origin = %origin, decoder = decoder.name(), "Reading configuration");

        let bytes = read_source(&path).map_err(|source| ConfigError::Io {
            origin: origin.clone(),
            source,
        })?;
        let document = decoder.load(&bytes).map_err(|source| ConfigError::Decode {
            origin: origin.clone(),
            source,
        })?;

        Ok((origin, document))
    }

    /// Calls the config provider registered under `reference`
    pub fn document_from_import(&self, reference: &str) -> Result<Document, ConfigError> {
        let object = self
            .registry
            .resolve(reference)
            .map_err(|source| ConfigError::Import {
                reference: reference.to_string(),
                source,
            })?;

        match object {
            Object::ConfigProvider(provider) => {
                debug!(reference, "Calling config provider");
                Ok(provider(crate::version_info()))
            }
            other => Err(ConfigError::NotAProvider {
                reference: reference.to_string(),
                name: other
                    .name()
                    .unwrap_or_else(|| object_name_from_import_string(reference))
                    .to_string(),
            }),
        }
    }

    fn default_path(&self, ext: &str) -> PathBuf {
        self.root.join(format!("{}{}", CONFIG_STEM, ext))
    }

    fn default_decoder(&self) -> Result<&dyn Decoder, ConfigError> {
        self.decoders
            .get(DEFAULT_CONFIG_FORMAT)
            .ok_or_else(|| ConfigError::UnknownFormat(DEFAULT_CONFIG_FORMAT.to_string()))
    }
}

fn read_source(path: &Path) -> io::Result<Vec<u8>> {
    if path == Path::new(STDIN_PATH) {
        let mut bytes = Vec::new();
        io::stdin().lock().read_to_end(&mut bytes)?;
        Ok(bytes)
    } else {
        fs::read(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::Namespace;
    use serde_json::json;
    use tempfile::TempDir;

    fn provider(version: crate::VersionInfo) -> Document {
        let mut budg = Document::new();
        budg.insert(
            "rules".to_string(),
            json!([{"plugin": format!("v{}", version.0)}]),
        );
        let mut root = Document::new();
        root.insert("budg".to_string(), serde_json::Value::Object(budg));
        root
    }

    fn registry() -> Registry {
        Registry::new().with_module(
            Namespace::new("site.config")
                .with("budg", Object::ConfigProvider(provider))
                .with("data", Object::Value(json!({"budg": {}}))),
        )
    }

    #[test]
    fn probes_toml_before_json() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.json"), r#"{"budg": {}}"#).unwrap();
        fs::write(dir.path().join("config.toml"), "[budg]\n").unwrap();

        let registry = Registry::new();
        let loader = ConfigLoader::new(&registry).with_root(dir.path());
        let (path, decoder) = loader.determine_config().unwrap();
        assert_eq!(path, dir.path().join("config.toml"));
        assert_eq!(decoder.name(), "toml");
    }

    #[test]
    fn probes_json_when_only_json_exists() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("config.json"),
            r#"{"budg": {"rules": [{"plugin": "copy"}]}}"#,
        )
        .unwrap();

        let registry = Registry::new();
        let loaded = ConfigLoader::new(&registry)
            .with_root(dir.path())
            .load(None, None)
            .unwrap();
        assert_eq!(loaded.config.budg.rules[0].plugin, "copy");
        assert!(loaded.origin.ends_with("config.json"));
    }

    #[test]
    fn falls_back_to_default_toml() {
        let dir = TempDir::new().unwrap();
        let registry = Registry::new();
        let loader = ConfigLoader::new(&registry).with_root(dir.path());

        let (path, decoder) = loader.determine_config().unwrap();
        assert_eq!(path, dir.path().join("config.toml"));
        assert_eq!(decoder.name(), "toml");

        let err = loader.load(None, None).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn explicit_format_picks_default_path() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.toml"), "[budg]\n").unwrap();
        fs::write(dir.path().join("config.json"), r#"{"budg": {}}"#).unwrap();

        let registry = Registry::new();
        let (origin, _) = ConfigLoader::new(&registry)
            .with_root(dir.path())
            .document_from_file(None, Some("json"))
            .unwrap();
        assert!(origin.ends_with("config.json"));
    }

    #[test]
    fn explicit_format_overrides_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("site.conf");
        fs::write(&path, r#"{"budg": {"rules": []}}"#).unwrap();

        let registry = Registry::new();
        let loaded = ConfigLoader::new(&registry)
            .load(path.to_str(), Some("json"))
            .unwrap();
        assert!(loaded.config.budg.rules.is_empty());
    }

    #[test]
    fn extension_selects_decoder() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("site.json");
        fs::write(&path, r#"{"budg": {"rules": [{"plugin": "a"}]}}"#).unwrap();

        let registry = Registry::new();
        let loaded = ConfigLoader::new(&registry).load(path.to_str(), None).unwrap();
        assert_eq!(loaded.config.budg.rules[0].plugin, "a");
    }

    #[test]
    fn unknown_format() {
        let registry = Registry::new();
        let err = ConfigLoader::new(&registry)
            .document_from_file(None, Some("yaml"))
            .unwrap_err();
        assert_eq!(err.to_string(), "Unknown config format 'yaml'");
    }

    #[test]
    fn malformed_file_names_origin_and_decoder() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[budg\n").unwrap();

        let registry = Registry::new();
        let err = ConfigLoader::new(&registry).load(path.to_str(), None).unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, ConfigError::Decode { .. }));
        assert!(message.starts_with(&format!("'{}': toml: ", path.display())));
    }

    #[test]
    fn bind_error_names_origin() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[[budg.rules]]\noptions = {}\n").unwrap();

        let registry = Registry::new();
        let err = ConfigLoader::new(&registry).load(path.to_str(), None).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("'{}': budg.rules[0].plugin: Missing value", path.display())
        );
    }

    #[test]
    fn strict_binder_rejects_unknown_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[budg]\ndirectories = {}\n").unwrap();

        let registry = Registry::new();
        let err = ConfigLoader::new(&registry)
            .with_binder(Binder::new().strict(true))
            .load(path.to_str(), None)
            .unwrap_err();
        assert!(err.to_string().ends_with("budg: Unexpected data: 'directories'"));
    }

    #[test]
    fn import_calls_provider() {
        let registry = registry();
        let loaded = ConfigLoader::new(&registry).load(Some("site.config:budg"), None).unwrap();
        assert_eq!(loaded.origin, "site.config:budg");
        assert_eq!(
            loaded.config.budg.rules[0].plugin,
            format!("v{}", crate::version_info().0)
        );
    }

    #[test]
    fn import_of_non_provider() {
        let registry = registry();
        let err = ConfigLoader::new(&registry).load(Some("site.config:data"), None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "'site.config:data': Object 'data' must be of type '(version) -> Document'"
        );
    }

    #[test]
    fn import_resolution_failure() {
        let registry = registry();
        let err = ConfigLoader::new(&registry).load(Some("site.other:budg"), None).unwrap_err();
        assert_eq!(err.to_string(), "'site.other:budg': Module 'site.other' not found.");
    }
}
