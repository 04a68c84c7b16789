//! Schema descriptions
//!
//! Schemas are plain values built at definition time; the binder walks them
//! generically, so no type needs hand-written binding code.

use std::fmt;

use serde_json::Value;

/// The declared type of a field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// Any value, passed through untouched
    Any,
    Bool,
    Integer,
    Float,
    String,

    /// Sequence of values of one type
    List(Box<FieldType>),

    /// Mapping from string keys to values of one type
    Map(Box<FieldType>),

    /// Either `null` or the inner type; absent means `null`
    Optional(Box<FieldType>),

    /// One of several types, tried in declaration order
    Union(Vec<FieldType>),

    /// Nested schema
    Struct(Schema),

    /// Named schema registered on the binder (allows recursive schemas)
    Ref(String),
}

impl FieldType {
    pub fn list(inner: FieldType) -> Self {
        Self::List(Box::new(inner))
    }

    pub fn map(inner: FieldType) -> Self {
        Self::Map(Box::new(inner))
    }

    pub fn optional(inner: FieldType) -> Self {
        Self::Optional(Box::new(inner))
    }

    /// An untyped sub-document (mapping of arbitrary values)
    pub fn document() -> Self {
        Self::Map(Box::new(Self::Any))
    }

    pub fn reference(name: impl Into<String>) -> Self {
        Self::Ref(name.into())
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Any => write!(f, "any"),
            FieldType::Bool => write!(f, "bool"),
            FieldType::Integer => write!(f, "integer"),
            FieldType::Float => write!(f, "float"),
            FieldType::String => write!(f, "string"),
            FieldType::List(inner) => write!(f, "list[{}]", inner),
            FieldType::Map(inner) => write!(f, "map[string, {}]", inner),
            FieldType::Optional(inner) => write!(f, "optional[{}]", inner),
            FieldType::Union(variants) => {
                let names: Vec<String> = variants.iter().map(|v| v.to_string()).collect();
                write!(f, "union[{}]", names.join(", "))
            }
            FieldType::Struct(schema) => write!(f, "{}", schema.name()),
            FieldType::Ref(name) => write!(f, "{}", name),
        }
    }
}

/// A named, typed field with an optional default
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: FieldType,
    pub default: Option<Value>,
}

/// A typed structure description
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    name: String,
    fields: Vec<Field>,
}

impl Schema {
    /// Creates an empty schema with the given type name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Adds a required field
    pub fn field(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.fields.push(Field {
            name: name.into(),
            ty,
            default: None,
        });
        self
    }

    /// Adds a field that falls back to `default` when absent
    ///
    /// The default is bound through `ty` like any other value, so a `{}`
    /// default for a nested schema yields that schema's own defaults.
    pub fn field_or(mut self, name: impl Into<String>, ty: FieldType, default: Value) -> Self {
        self.fields.push(Field {
            name: name.into(),
            ty,
            default: Some(default),
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}
