//! Generic schema walker

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::error::{BindError, BindErrorKind};
use super::path::FieldPath;
use super::types::{FieldType, Schema};

/// A type that declares the schema its documents are bound against
pub trait Configurable: DeserializeOwned {
    fn schema() -> Schema;
}

/// Binds untyped values against [`Schema`]s
///
/// In strict mode, keys that match no declared field are rejected and a
/// union value must match exactly one of its variants.
#[derive(Debug, Clone, Default)]
pub struct Binder {
    strict: bool,
    schemas: HashMap<String, Schema>,
}

impl Binder {
    /// Creates a lenient binder with no named schemas
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets strict mode
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Registers a named schema for [`FieldType::Ref`] lookups
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schemas.insert(schema.name().to_string(), schema);
        self
    }

    /// Binds `value` against `schema`, returning the normalized value
    ///
    /// The result contains every declared field (defaults filled in) and,
    /// outside strict mode, drops keys the schema does not declare.
    pub fn bind(&self, schema: &Schema, value: &Value) -> Result<Value, BindError> {
        self.bind_struct(schema, value, &FieldPath::root())
    }

    /// Binds `value` and deserializes the result into `T`
    pub fn bind_as<T: Configurable>(&self, value: &Value) -> Result<T, BindError> {
        let bound = self.bind(&T::schema(), value)?;
        serde_json::from_value(bound)
            .map_err(|e| BindError::new(FieldPath::root(), BindErrorKind::Conversion(e.to_string())))
    }

    fn bind_struct(&self, schema: &Schema, value: &Value, path: &FieldPath) -> Result<Value, BindError> {
        let object = value.as_object().ok_or_else(|| {
            BindError::new(
                path.clone(),
                BindErrorKind::WrongType {
                    expected: schema.name().to_string(),
                    found: type_name(value),
                },
            )
        })?;

        if self.strict {
            let unexpected: Vec<String> = object
                .keys()
                .filter(|key| schema.get(key.as_str()).is_none())
                .cloned()
                .collect();
            if !unexpected.is_empty() {
                return Err(BindError::new(
                    path.clone(),
                    BindErrorKind::UnexpectedData { keys: unexpected },
                ));
            }
        }

        let mut bound = Map::new();
        for field in schema.fields() {
            let field_path = path.key(&field.name);
            let value = match (object.get(&field.name), &field.default) {
                (Some(value), _) => self.bind_value(&field.ty, value, &field_path)?,
                (None, Some(default)) => self.bind_value(&field.ty, default, &field_path)?,
                (None, None) if matches!(field.ty, FieldType::Optional(_)) => Value::Null,
                (None, None) => {
                    return Err(BindError::new(field_path, BindErrorKind::MissingValue));
                }
            };
            bound.insert(field.name.clone(), value);
        }

        Ok(Value::Object(bound))
    }

    fn bind_value(&self, ty: &FieldType, value: &Value, path: &FieldPath) -> Result<Value, BindError> {
        let wrong_type = || {
            BindError::new(
                path.clone(),
                BindErrorKind::WrongType {
                    expected: ty.to_string(),
                    found: type_name(value),
                },
            )
        };

        match ty {
            FieldType::Any => Ok(value.clone()),
            FieldType::Bool if value.is_boolean() => Ok(value.clone()),
            FieldType::Integer if value.is_i64() || value.is_u64() => Ok(value.clone()),
            FieldType::Float if value.is_number() => Ok(value.clone()),
            FieldType::String if value.is_string() => Ok(value.clone()),
            FieldType::Bool | FieldType::Integer | FieldType::Float | FieldType::String => {
                Err(wrong_type())
            }

            FieldType::List(inner) => {
                let items = value.as_array().ok_or_else(wrong_type)?;
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| self.bind_value(inner, item, &path.index(i)))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array)
            }

            FieldType::Map(inner) => {
                let entries = value.as_object().ok_or_else(wrong_type)?;
                let mut bound = Map::new();
                for (key, item) in entries {
                    bound.insert(key.clone(), self.bind_value(inner, item, &path.key(key))?);
                }
                Ok(Value::Object(bound))
            }

            FieldType::Optional(_) if value.is_null() => Ok(Value::Null),
            FieldType::Optional(inner) => self.bind_value(inner, value, path),

            FieldType::Union(variants) => self.bind_union(ty, variants, value, path),

            FieldType::Struct(schema) => self.bind_struct(schema, value, path),

            FieldType::Ref(name) => {
                let schema = self.schemas.get(name).ok_or_else(|| {
                    BindError::new(
                        path.clone(),
                        BindErrorKind::ForwardReference { name: name.clone() },
                    )
                })?;
                self.bind_struct(schema, value, path)
            }
        }
    }

    fn bind_union(
        &self,
        ty: &FieldType,
        variants: &[FieldType],
        value: &Value,
        path: &FieldPath,
    ) -> Result<Value, BindError> {
        let mut matched = variants
            .iter()
            .filter_map(|variant| self.bind_value(variant, value, path).ok());

        let first = matched.next().ok_or_else(|| {
            BindError::new(
                path.clone(),
                BindErrorKind::UnionMatch {
                    expected: ty.to_string(),
                },
            )
        })?;

        if self.strict {
            let matches = 1 + matched.count();
            if matches > 1 {
                return Err(BindError::new(
                    path.clone(),
                    BindErrorKind::StrictUnionMatch {
                        expected: ty.to_string(),
                        matches,
                    },
                ));
            }
        }

        Ok(first)
    }
}

/// Short type name of a JSON value, for diagnostics
fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}
