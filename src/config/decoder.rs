//! Configuration decoders
//!
//! Each decoder turns raw bytes of one format into an untyped [`Document`].

use std::path::Path;

use serde_json::{Map, Number, Value};
use thiserror::Error;

use crate::schema::Document;

/// Malformed input, annotated with the decoder that rejected it
#[derive(Debug, Error, PartialEq)]
#[error("{decoder}: {message}")]
pub struct DecoderError {
    pub decoder: &'static str,
    pub message: String,
}

impl DecoderError {
    fn new(decoder: &'static str, message: impl Into<String>) -> Self {
        Self {
            decoder,
            message: message.into(),
        }
    }
}

/// A byte-stream parser for one configuration format
pub trait Decoder {
    /// Format name (`toml`, `json`)
    fn name(&self) -> &'static str;

    /// File extensions, most preferred first
    fn extensions(&self) -> &'static [&'static str];

    fn default_extension(&self) -> &'static str {
        self.extensions().first().copied().unwrap_or_default()
    }

    /// Decodes `bytes` into a document; never returns a partial document
    fn load(&self, bytes: &[u8]) -> Result<Document, DecoderError>;
}

pub struct TomlDecoder;

impl Decoder for TomlDecoder {
    fn name(&self) -> &'static str {
        "toml"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".toml"]
    }

    fn load(&self, bytes: &[u8]) -> Result<Document, DecoderError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| DecoderError::new(self.name(), format!("Invalid UTF-8: {}", e)))?;
        let table: toml::Table = toml::from_str(text)
            .map_err(|e| DecoderError::new(self.name(), e.to_string().trim_end()))?;

        table
            .into_iter()
            .map(|(key, value)| {
                let value = toml_to_json(value, &key)
                    .map_err(|message| DecoderError::new(self.name(), message))?;
                Ok::<_, DecoderError>((key, value))
            })
            .collect()
    }
}

pub struct JsonDecoder;

impl Decoder for JsonDecoder {
    fn name(&self) -> &'static str {
        "json"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".json"]
    }

    fn load(&self, bytes: &[u8]) -> Result<Document, DecoderError> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| DecoderError::new(self.name(), e.to_string()))?;

        match value {
            Value::Object(document) => Ok(document),
            _ => Err(DecoderError::new(self.name(), "Expecting object: line 1 column 1")),
        }
    }
}

/// TOML values map onto JSON values; datetimes become RFC 3339 strings
///
/// Floats JSON cannot hold (`nan`, `inf`) are rejected with their key path.
fn toml_to_json(value: toml::Value, key: &str) -> Result<Value, String> {
    Ok(match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => match Number::from_f64(f) {
            Some(n) => Value::Number(n),
            None => return Err(format!("Non-finite float {} at key '{}'", f, key)),
        },
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| toml_to_json(item, &format!("{}[{}]", key, i)))
                .collect::<Result<_, _>>()?,
        ),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(child, value)| {
                    let value = toml_to_json(value, &format!("{}.{}", key, child))?;
                    Ok::<_, String>((child, value))
                })
                .collect::<Result<Map<_, _>, String>>()?,
        ),
    })
}

/// Ordered set of available decoders
///
/// Order matters: it is the probing order for default config paths.
pub struct DecoderRegistry {
    decoders: Vec<Box<dyn Decoder>>,
}

impl DecoderRegistry {
    pub fn new() -> Self {
        Self {
            decoders: Vec::new(),
        }
    }

    /// TOML, then JSON
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(TomlDecoder);
        registry.register(JsonDecoder);
        registry
    }

    pub fn register(&mut self, decoder: impl Decoder + 'static) {
        self.decoders.push(Box::new(decoder));
    }

    /// Looks up a decoder by format name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&dyn Decoder> {
        self.iter().find(|d| d.name().eq_ignore_ascii_case(name))
    }

    /// Finds the decoder registered for `path`'s extension
    pub fn for_path(&self, path: &Path) -> Option<&dyn Decoder> {
        let file_name = path.file_name()?.to_str()?;
        self.iter()
            .find(|d| d.extensions().iter().any(|ext| file_name.ends_with(ext)))
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Decoder> {
        self.decoders.iter().map(|d| d.as_ref())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.iter().map(|d| d.name()).collect()
    }
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
