//! # Typed Config Binder
//!
//! Turns untyped documents (decoded TOML/JSON) into strongly-typed objects.
//!
//! ## Overview
//!
//! Every typed configuration object declares a [`Schema`]: an ordered list of
//! named, typed fields with optional defaults. The [`Binder`] walks a schema
//! against a document, fills in defaults, checks types, and produces a
//! normalized value that is then deserialized into the Rust type.
//!
//! ```text
//! Document ──► Binder::bind(Schema) ──► normalized Value ──► T: Configurable
//! ```
//!
//! ## Errors
//!
//! Failures are [`BindError`]s carrying the [`FieldPath`] where binding
//! failed. Callers prefix their own location when re-raising, so the final
//! message reads `budg.plugins.copy.config: output: Missing value`.
//!
//! ## Key Types
//!
//! - [`Schema`] / [`Field`] / [`FieldType`] - Schema descriptions
//! - [`Binder`] - Generic schema walker (optionally strict)
//! - [`Configurable`] - Types that declare their own schema
//! - [`FieldPath`] - Dotted path from the document root

mod binder;
mod error;
mod path;
mod types;

pub use binder::{Binder, Configurable};
pub use error::{BindError, BindErrorKind};
pub use path::{FieldPath, PathSegment};
pub use types::{Field, FieldType, Schema};

/// An untyped, ordered key-value document
pub type Document = serde_json::Map<String, serde_json::Value>;
