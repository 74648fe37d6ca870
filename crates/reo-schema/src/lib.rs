//! Declarative schema model for nested scenario inputs.
//!
//! This crate owns the schema catalog (objects, attributes, bounds, defaults
//! and dependencies), the closed set of primitive kinds with their conversion
//! table, the key taxonomy, and the path type shared by every validator.

mod catalog;
mod error;
mod key;
mod path;
mod primitive;

/// Schema catalog types.
pub use catalog::{AttributeSpec, DefaultValue, ObjectSchema, SchemaCatalog};
/// Errors returned while loading a schema.
pub use error::SchemaError;
/// Key classification helpers.
pub use key::KeyKind;
/// Path addressing for objects inside a document.
pub use path::ObjectPath;
/// Primitive kinds and value conversion.
pub use primitive::{AttributeType, ConversionError, Primitive};
