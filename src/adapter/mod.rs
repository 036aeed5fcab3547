//! Property adapters.
//!
//! A [`PropertyAdapter`] knows how to turn the value of one property into each of the
//! three external forms and back:
//!
//! - **tree**: an [`Element`] (or an attribute of the parent element)
//! - **binary**: a big-endian stream, see [`crate::binary`]
//! - **token**: a single-line string, see [`crate::token`]
//!
//! Adapters are built once by a [`Registry`](crate::Registry) and are immutable afterwards.
//! Every method takes the value, node or stream it works on as an argument, so one adapter
//! can serve any number of threads at once.
//!
//! Compound adapters ([`ArrayAdapter`], [`CollectionAdapter`], [`MapAdapter`]) hold one
//! or two element adapters of their own and delegate per-element work to them. Nesting is
//! therefore unbounded and recursion ends at the scalar adapters.

mod array;
mod bytes;
mod collection;
mod iterable;
mod map;
mod nested;
mod primitive;
mod scalar;

pub use array::ArrayAdapter;
pub use bytes::BytesAdapter;
pub use collection::CollectionAdapter;
pub use iterable::CompoundPolicy;
pub use map::MapAdapter;
pub use nested::NestedAdapter;
pub use primitive::PrimitiveArrayAdapter;
pub use scalar::{ScalarAdapter, ScalarKind};

use crate::token;
use crate::value::hash_of;
use crate::{Element, Error, PropertyBinding, Result, Value};
use std::fmt;
use std::io::{Read, Write};

/// The wire-format contract every property adapter satisfies.
///
/// Only [`binding`](PropertyAdapter::binding) and
/// [`adapter_name`](PropertyAdapter::adapter_name) are required. The tree, binary and
/// token operations default to [`Error::Unsupported`]; the parent-level operations,
/// emptiness, anonymity, cloning, equality and hashing have working defaults.
///
/// # Examples
///
/// ```rust
/// use propcodec::{Element, PropertyAdapter, PropertyBinding, ScalarAdapter, ScalarKind, Value};
///
/// let adapter = ScalarAdapter::new(PropertyBinding::new("age", "int"), ScalarKind::Int);
///
/// let mut parent = Element::new("person");
/// adapter.write_into_parent(&mut parent, &Value::Int(-3)).unwrap();
/// assert_eq!(parent.children()[0].name(), "age");
///
/// assert_eq!(adapter.read_from_parent(&parent).unwrap(), Value::Int(-3));
/// assert_eq!(adapter.to_token(&Value::Int(-3)).unwrap(), "(3)");
/// ```
pub trait PropertyAdapter: fmt::Debug + Send + Sync {
    fn binding(&self) -> &PropertyBinding;

    /// Short name used in error messages.
    fn adapter_name(&self) -> &'static str;

    /// Encodes a value as an element named after the property tag.
    fn to_tree(&self, value: &Value) -> Result<Element> {
        let _ = value;
        Err(Error::unsupported(self.adapter_name(), "to_tree"))
    }

    /// Decodes the value carried by `node`.
    fn from_tree(&self, node: &Element) -> Result<Value> {
        let _ = node;
        Err(Error::unsupported(self.adapter_name(), "from_tree"))
    }

    /// Writes the payload of a non-null value.
    fn write_binary(&self, out: &mut dyn Write, value: &Value) -> Result<()> {
        let _ = (out, value);
        Err(Error::unsupported(self.adapter_name(), "write_binary"))
    }

    /// Reads a payload written by [`write_binary`](PropertyAdapter::write_binary).
    fn read_binary(&self, input: &mut dyn Read) -> Result<Value> {
        let _ = input;
        Err(Error::unsupported(self.adapter_name(), "read_binary"))
    }

    fn to_token(&self, value: &Value) -> Result<String> {
        let _ = value;
        Err(Error::unsupported(self.adapter_name(), "to_token"))
    }

    fn from_token(&self, token: &str) -> Result<Value> {
        let _ = token;
        Err(Error::unsupported(self.adapter_name(), "from_token"))
    }

    /// Locates this property in `parent` and decodes it; `Null` when absent.
    fn read_from_parent(&self, parent: &Element) -> Result<Value> {
        read_property(self, parent)
    }

    /// Encodes `value` into `parent`; nothing is written when the value is empty.
    fn write_into_parent(&self, parent: &mut Element, value: &Value) -> Result<()> {
        write_property(self, parent, value)
    }

    /// Returns `true` if nothing should be written for `value`.
    fn is_empty(&self, value: &Value) -> bool {
        value.is_null()
    }

    /// Returns `true` if the property has no external tag and is spliced into its parent.
    fn is_anonymous(&self) -> bool {
        self.binding().tag().is_none()
    }

    /// Returns `true` if a blank node still carries a value, as the empty wrapper of a
    /// nested compound does.
    fn is_container(&self) -> bool {
        false
    }

    /// Returns `true` if copies of the value must not share state with the original.
    fn is_clone_required(&self) -> bool {
        false
    }

    /// A custom deep copy, if the adapter has one.
    fn deep_copy(&self, value: &Value) -> Option<Result<Value>> {
        let _ = value;
        None
    }

    /// Copies a value so that the copy is independent of the source.
    ///
    /// Uses [`deep_copy`](PropertyAdapter::deep_copy) when available, otherwise a round
    /// trip through the binary codec, falling back to the tree codec.
    fn clone_value(&self, value: &Value) -> Result<Value> {
        if value.is_null() || !self.is_clone_required() {
            return Ok(value.clone());
        }
        if let Some(copy) = self.deep_copy(value) {
            return copy;
        }

        let mut buf = Vec::new();
        match self.write_binary(&mut buf, value) {
            Ok(()) => self.read_binary(&mut buf.as_slice()),
            Err(e) if e.is_unsupported() => {
                let node = self.to_tree(value)?;
                self.from_tree(&node)
            }
            Err(e) => Err(e),
        }
    }

    fn equals_value(&self, a: &Value, b: &Value) -> bool {
        a == b
    }

    fn hash_value(&self, value: &Value) -> u64 {
        hash_of(value)
    }
}

/// The default [`PropertyAdapter::read_from_parent`].
pub(crate) fn read_property<A>(adapter: &A, parent: &Element) -> Result<Value>
where
    A: PropertyAdapter + ?Sized,
{
    let binding = adapter.binding();
    let Some(tag) = binding.tag() else {
        return adapter.from_tree(parent);
    };

    if binding.is_attribute() {
        match parent.attribute_matching(tag, binding.attribute_uri()) {
            Some(attribute) => {
                let mut wrapper = binding.new_element(tag);
                wrapper.set_content(attribute.clone());
                adapter.from_tree(&wrapper)
            }
            None => Ok(Value::Null),
        }
    } else {
        match parent.first_matching(tag, binding.namespace_uri()) {
            Some(node) => adapter.from_tree(node),
            None => Ok(Value::Null),
        }
    }
}

/// The default [`PropertyAdapter::write_into_parent`].
pub(crate) fn write_property<A>(adapter: &A, parent: &mut Element, value: &Value) -> Result<()>
where
    A: PropertyAdapter + ?Sized,
{
    if adapter.is_empty(value) {
        return Ok(());
    }
    let mut node = adapter.to_tree(value)?;
    let binding = adapter.binding();

    if adapter.is_anonymous() {
        parent.splice(node);
    } else if binding.is_attribute() {
        if !node.children().is_empty() || node.attributes().len() > 0 {
            return Err(Error::format(format!(
                "property '{}' cannot be stored as an attribute: its value is not a scalar",
                binding.name()
            )));
        }
        parent.inherit_namespaces(&node);
        if let Some(content) = node.take_content() {
            parent.set_attribute(node.name(), content);
        }
    } else {
        parent.inherit_namespaces(&node);
        parent.push_child(node);
    }
    Ok(())
}

/// A token made of the URL-safe base64 of the adapter's binary form.
pub(crate) fn binary_token<A>(adapter: &A, value: &Value) -> Result<String>
where
    A: PropertyAdapter + ?Sized,
{
    let mut buf = Vec::new();
    adapter.write_binary(&mut buf, value)?;
    Ok(token::encode_base64(&buf))
}

pub(crate) fn from_binary_token<A>(adapter: &A, text: &str) -> Result<Value>
where
    A: PropertyAdapter + ?Sized,
{
    let buf = token::decode_base64(text)?;
    adapter.read_binary(&mut buf.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Namespace, Placement};

    #[derive(Debug)]
    struct Opaque(PropertyBinding);

    impl PropertyAdapter for Opaque {
        fn binding(&self) -> &PropertyBinding {
            &self.0
        }

        fn adapter_name(&self) -> &'static str {
            "opaque"
        }
    }

    #[test]
    fn test_defaults_are_unsupported() {
        let adapter = Opaque(PropertyBinding::new("p", "opaque"));
        let err = adapter.to_token(&Value::Int(1)).unwrap_err();
        assert!(err.is_unsupported());
        assert!(err.to_string().contains("to_token"));
        assert!(adapter.read_binary(&mut std::io::empty()).unwrap_err().is_unsupported());
        assert!(adapter.from_tree(&Element::new("p")).unwrap_err().is_unsupported());
    }

    #[test]
    fn test_empty_values_are_not_written() {
        let adapter = Opaque(PropertyBinding::new("p", "opaque"));
        let mut parent = Element::new("root");
        adapter.write_into_parent(&mut parent, &Value::Null).unwrap();
        assert!(parent.is_blank());
    }

    #[test]
    fn test_absent_property_reads_null() {
        let adapter = Opaque(PropertyBinding::new("p", "opaque"));
        assert_eq!(adapter.read_from_parent(&Element::new("root")).unwrap(), Value::Null);

        let attr = Opaque(PropertyBinding::new("p", "opaque").with_placement(Placement::Attribute));
        assert_eq!(attr.read_from_parent(&Element::new("root")).unwrap(), Value::Null);
    }

    #[test]
    fn test_clone_without_requirement_is_identity() {
        let adapter = Opaque(PropertyBinding::new("p", "opaque"));
        let v = Value::from("x");
        assert_eq!(adapter.clone_value(&v).unwrap(), v);
    }

    #[test]
    fn test_attribute_namespace_propagates() {
        let adapter = ScalarAdapter::new(
            PropertyBinding::new("size", "int")
                .with_placement(Placement::Attribute)
                .with_namespace(Some(Namespace::new("urn:q", "q"))),
            ScalarKind::Int,
        );
        let mut parent = Element::new("root");
        adapter.write_into_parent(&mut parent, &Value::Int(4)).unwrap();
        assert_eq!(parent.attribute("q:size"), Some(&Value::Int(4)));
        assert_eq!(parent.namespace_uri_for("q"), Some("urn:q"));
        assert_eq!(adapter.read_from_parent(&parent).unwrap(), Value::Int(4));
    }

    #[test]
    fn test_anonymous_scalar_is_spliced() {
        let adapter = ScalarAdapter::new(
            PropertyBinding::new("text", "string").with_tag(None),
            ScalarKind::String,
        );
        let mut parent = Element::new("note");
        adapter.write_into_parent(&mut parent, &Value::from("hi")).unwrap();
        assert_eq!(parent.content(), Some(&Value::from("hi")));
        assert!(parent.children().is_empty());
        assert_eq!(adapter.read_from_parent(&parent).unwrap(), Value::from("hi"));
    }
}
