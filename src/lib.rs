//! # propcodec
//!
//! Per-property adapters that map structured values to three encodings:
//!
//! - a **tree** form: [`Element`] nodes with attributes, children, content and namespaces
//! - a **binary** form: big-endian, count-prefixed, with a presence flag per slot
//! - a **token** form: a compact URL-safe string
//!
//! A record type is described once with [`RecordDescription`] (built in code or loaded
//! with serde). Registering it with a [`Registry`] selects one [`PropertyAdapter`] per
//! property and yields a [`Descriptor`] that reads and writes whole [`Record`]s.
//!
//! ## Quick Start
//!
//! ```rust
//! use propcodec::{value, CodecOptions, PropertyDescription, RecordDescription, Registry};
//!
//! let mut registry = Registry::new(CodecOptions::new());
//! let order = registry
//!     .register_record(
//!         RecordDescription::new("Order")
//!             .with_property(PropertyDescription::new("id", "long").attribute())
//!             .with_property(
//!                 PropertyDescription::new("lines", "array")
//!                     .with_element_tag("item")
//!                     .with_element(PropertyDescription::new("", "string")),
//!             ),
//!     )
//!     .unwrap();
//!
//! let record = value!(Order { id: 42i64, lines: [null, "x", null] });
//! let record = record.as_record().unwrap();
//!
//! // tree
//! let node = order.to_tree(record).unwrap();
//! assert_eq!(node.children()[0].children().len(), 3);
//! assert_eq!(&order.from_tree(&node).unwrap(), record);
//!
//! // binary
//! let bytes = propcodec::to_vec(&order, record).unwrap();
//! assert_eq!(&propcodec::from_slice(&order, &bytes).unwrap(), record);
//!
//! // token
//! let token = order.to_token(record).unwrap();
//! assert_eq!(&order.from_token(&token).unwrap(), record);
//! ```
//!
//! ## Descriptions from data
//!
//! ```rust
//! use propcodec::{Registry, RecordDescription};
//!
//! let desc: RecordDescription = serde_json::from_str(r#"{
//!     "name": "Tagged",
//!     "properties": [
//!         { "name": "tags", "type": "collection", "kind": "set",
//!           "element_tag": "tag", "element": { "type": "string" } }
//!     ]
//! }"#).unwrap();
//!
//! let mut registry = Registry::default();
//! assert!(registry.register_record(desc).is_ok());
//! ```
//!
//! ## Typed data
//!
//! [`to_value`] and [`from_value`] convert any serde type to and from [`Value`], so typed
//! Rust structs can flow through the adapters as records.
//!
//! ## Logging
//!
//! Registration, adapter selection, chunked reads and decode fallbacks are reported through
//! `tracing`. The crate never installs a subscriber.

pub mod adapter;
pub mod binary;
pub mod binding;
pub mod de;
pub mod describe;
pub mod descriptor;
pub mod error;
pub mod macros;
pub mod map;
pub mod options;
pub mod registry;
pub mod ser;
pub mod token;
pub mod tree;
pub mod value;

pub use adapter::{
    ArrayAdapter, BytesAdapter, CollectionAdapter, CompoundPolicy, MapAdapter, NestedAdapter,
    PrimitiveArrayAdapter, PropertyAdapter, ScalarAdapter, ScalarKind,
};
pub use binding::{
    BindingResolver, FieldAccess, FieldResolver, FieldTable, Namespace, Placement,
    PropertyAccess, PropertyBinding,
};
pub use de::ValueDeserializer;
pub use describe::{PropertyDescription, RecordDescription};
pub use descriptor::Descriptor;
pub use error::{Error, Result};
pub use map::ValueMap;
pub use options::{CodecOptions, DEFAULT_CHUNK_BUDGET, ELEMENT_SIZE_ESTIMATE};
pub use registry::{AdapterFactory, AdapterSelector, Registry};
pub use ser::ValueSerializer;
pub use tree::Element;
pub use value::{Collection, Decimal, Record, SequenceKind, Value};

use serde::{Deserialize, Serialize};
use std::io;

/// Convert any `T: Serialize` into a [`Value`].
///
/// # Examples
///
/// ```rust
/// use propcodec::{to_value, Value};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let value = to_value(&Point { x: 1, y: 2 }).unwrap();
/// assert_eq!(value.as_record().map(|r| r.type_name()), Some("Point"));
/// ```
///
/// # Errors
///
/// Returns an unsupported-operation error for enum variants that carry data.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_value<T>(value: &T) -> Result<Value>
where
    T: ?Sized + Serialize,
{
    value.serialize(ValueSerializer)
}

/// Convert a [`Value`] into any `T: Deserialize`.
///
/// # Errors
///
/// Returns an error if the value does not have the shape `T` expects.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_value<T>(value: Value) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    T::deserialize(ValueDeserializer::new(value))
}

/// Write the binary form of a record to a writer.
///
/// # Errors
///
/// Returns an error if a property cannot be encoded or the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W>(mut writer: W, descriptor: &Descriptor, record: &Record) -> Result<()>
where
    W: io::Write,
{
    descriptor.write_binary(&mut writer, record)
}

/// Encode a record into its binary form.
///
/// # Errors
///
/// Returns an error if a property cannot be encoded.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_vec(descriptor: &Descriptor, record: &Record) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    descriptor.write_binary(&mut buf, record)?;
    Ok(buf)
}

/// Read a record in binary form from a reader.
///
/// # Errors
///
/// Returns a format error if the stream is malformed or ends early.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R>(mut reader: R, descriptor: &Descriptor) -> Result<Record>
where
    R: io::Read,
{
    descriptor.read_binary(&mut reader)
}

/// Decode a record from its binary form.
///
/// # Errors
///
/// Returns a format error if the bytes are malformed or truncated.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice(descriptor: &Descriptor, bytes: &[u8]) -> Result<Record> {
    let mut input = bytes;
    descriptor.read_binary(&mut input)
}
