//! Behaviour shared by the array, collection and map adapters.
//!
//! A compound property is either *nested*, owning one wrapper element named by the
//! property tag with one child per element, or *inline*, writing its element nodes
//! straight into the parent. It is nested exactly when an element tag is configured.
//!
//! On the binary stream every compound value is a count followed by one slot per element,
//! each slot a presence flag and, when present, the element payload.

use super::{read_property, write_property, PropertyAdapter};
use crate::binary;
use crate::describe::PropertyDescription;
use crate::{CodecOptions, Element, Error, Placement, PropertyBinding, Result, Value};
use std::io::{Read, Write};
use tracing::debug;

const NIL: &str = "nil";
pub(crate) const LENGTH: &str = "length";
pub(crate) const ID: &str = "id";

/// Parses a non-negative index attribute.
pub(crate) fn index_of(value: &Value) -> Option<usize> {
    match value {
        Value::Int(i) => usize::try_from(*i).ok(),
        Value::Long(l) => usize::try_from(*l).ok(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn is_nil(node: &Element) -> bool {
    match node.attribute(NIL) {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(text)) => text.trim() == "true",
        _ => false,
    }
}

/// Storage policy of a compound property, fixed at construction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompoundPolicy {
    /// Store element indices so that null holes survive.
    pub sparse: bool,
    /// Write nothing at all for a zero-length value.
    pub empty_is_null: bool,
    /// Name of the element nodes inside the property's wrapper.
    pub element_tag: Option<String>,
}

impl CompoundPolicy {
    #[must_use]
    pub fn from_description(desc: &PropertyDescription) -> Self {
        CompoundPolicy {
            sparse: desc.sparse,
            empty_is_null: desc.empty_is_null,
            element_tag: desc.element_tag.clone().filter(|t| !t.is_empty()),
        }
    }

    #[must_use]
    pub fn is_nested(&self) -> bool {
        self.element_tag.is_some()
    }

    /// `Null`, or a zero-length value when `empty_is_null` is set.
    #[must_use]
    pub fn is_empty(&self, value: &Value) -> bool {
        value.is_null() || (self.empty_is_null && compound_len(value) == Some(0))
    }
}

/// Number of elements of an array, collection or map value.
pub(crate) fn compound_len(value: &Value) -> Option<usize> {
    match value {
        Value::Array(items) => Some(items.len()),
        Value::Collection(c) => Some(c.len()),
        Value::Map(m) => Some(m.len()),
        _ => None,
    }
}

/// Builds the binding of an element, key or value sub-adapter.
pub(crate) fn sub_binding(
    parent: &PropertyBinding,
    desc: &PropertyDescription,
    default_name: &str,
    default_tag: Option<&str>,
) -> PropertyBinding {
    let name = if desc.name.is_empty() {
        default_name
    } else {
        &desc.name
    };
    let tag = if desc.anonymous {
        None
    } else {
        desc.tag.clone().or_else(|| default_tag.map(str::to_string))
    };
    let placement = if desc.attribute {
        Placement::Attribute
    } else {
        Placement::Element
    };
    PropertyBinding::new(name, desc.selection_tag())
        .with_tag(tag)
        .with_namespace(desc.namespace.clone().or_else(|| parent.namespace().cloned()))
        .with_placement(placement)
}

/// Resolves a required nested description.
pub(crate) fn required<'d>(
    binding: &PropertyBinding,
    desc: Option<&'d PropertyDescription>,
    role: &str,
) -> Result<&'d PropertyDescription> {
    desc.ok_or_else(|| {
        Error::configuration(format!(
            "{} property '{}' has no {} description",
            binding.value_type(),
            binding.name(),
            role
        ))
    })
}

/// Binding, policy and options of a compound property.
#[derive(Debug)]
pub(crate) struct Iterable {
    pub(crate) binding: PropertyBinding,
    pub(crate) policy: CompoundPolicy,
    pub(crate) options: CodecOptions,
}

impl Iterable {
    pub(crate) fn new(
        binding: PropertyBinding,
        desc: &PropertyDescription,
        options: &CodecOptions,
    ) -> Result<Self> {
        let policy = CompoundPolicy::from_description(desc);
        if policy.sparse && !policy.is_nested() {
            return Err(Error::configuration(format!(
                "sparse property '{}' requires an element_tag",
                binding.name()
            )));
        }
        if binding.is_attribute() {
            return Err(Error::configuration(format!(
                "{} property '{}' cannot be stored as an attribute",
                binding.value_type(),
                binding.name()
            )));
        }
        Ok(Iterable {
            binding,
            policy,
            options: options.clone(),
        })
    }

    /// The default tag of element nodes: the element tag, else the property tag.
    pub(crate) fn element_tag(&self) -> Option<&str> {
        self.policy.element_tag.as_deref().or(self.binding.tag())
    }

    /// Anonymous element adapters match every child, so they need a wrapper of their own.
    pub(crate) fn check_element(&self, element: &dyn PropertyAdapter) -> Result<()> {
        if element.is_anonymous() && !self.policy.is_nested() {
            return Err(Error::configuration(format!(
                "anonymous elements of '{}' require an element_tag",
                self.binding.name()
            )));
        }
        Ok(())
    }

    /// The node element nodes are written into.
    pub(crate) fn container(&self) -> Element {
        if self.policy.is_nested() {
            self.binding
                .new_element(self.binding.tag().unwrap_or_default())
        } else {
            Element::default()
        }
    }

    pub(crate) fn read_from_parent(
        &self,
        adapter: &dyn PropertyAdapter,
        parent: &Element,
    ) -> Result<Value> {
        if self.policy.is_nested() {
            read_property(adapter, parent)
        } else {
            adapter.from_tree(parent)
        }
    }

    pub(crate) fn write_into_parent(
        &self,
        adapter: &dyn PropertyAdapter,
        parent: &mut Element,
        value: &Value,
    ) -> Result<()> {
        if self.policy.is_nested() {
            write_property(adapter, parent, value)
        } else if !adapter.is_empty(value) {
            parent.splice(adapter.to_tree(value)?);
            Ok(())
        } else {
            Ok(())
        }
    }

    /// An empty node standing in for a missing element.
    pub(crate) fn placeholder(&self, element: &dyn PropertyAdapter) -> Element {
        let binding = element.binding();
        let tag = binding
            .tag()
            .or(self.element_tag())
            .unwrap_or_else(|| binding.name());
        binding.new_element(tag)
    }

    /// The placeholder of a null element. Containers read a blank node as an empty
    /// value, so theirs is marked `nil`.
    pub(crate) fn null_placeholder(&self, element: &dyn PropertyAdapter) -> Element {
        let mut node = self.placeholder(element);
        if element.is_container() {
            node.set_attribute(NIL, Value::Bool(true));
        }
        node
    }

    /// Encodes one element, hoisting the single child of an anonymous element.
    pub(crate) fn encode_element(
        &self,
        element: &dyn PropertyAdapter,
        item: &Value,
    ) -> Result<Element> {
        if item.is_null() {
            return Ok(self.null_placeholder(element));
        }
        let mut node = element.to_tree(item)?;
        if !element.is_anonymous() {
            return Ok(node);
        }

        let mut children = node.take_children();
        match children.len() {
            0 => Ok(self.placeholder(element)),
            1 => {
                let mut child = children.remove(0);
                child.inherit_namespaces(&node);
                Ok(child)
            }
            n => Err(Error::format(format!(
                "anonymous element of '{}' encoded {} children, at most one is allowed",
                self.binding.name(),
                n
            ))),
        }
    }

    /// The element nodes of `container` that belong to this property.
    pub(crate) fn element_nodes<'a>(
        &self,
        container: &'a Element,
        element: &dyn PropertyAdapter,
    ) -> Vec<&'a Element> {
        let binding = element.binding();
        match binding.tag() {
            Some(tag) if !element.is_anonymous() => {
                let uri = binding.namespace_uri();
                container
                    .children()
                    .iter()
                    .filter(|child| container.is_match(child, tag, uri))
                    .collect()
            }
            _ => container.children().iter().collect(),
        }
    }

    /// Decodes one element node; a null placeholder decodes to `Null`.
    pub(crate) fn decode_element(
        &self,
        element: &dyn PropertyAdapter,
        node: &Element,
    ) -> Result<Value> {
        if element.is_container() {
            if is_nil(node) {
                return Ok(Value::Null);
            }
        } else if node.is_blank() {
            return Ok(Value::Null);
        }
        if element.is_anonymous() {
            let mut wrapper = Element::default();
            wrapper.push_child(node.clone());
            element.from_tree(&wrapper)
        } else {
            element.from_tree(node)
        }
    }

    /// The `length` of a sparse wrapper holding `present` element nodes.
    ///
    /// Holes are not backed by input, so the length is held to the batch budget.
    pub(crate) fn sparse_length(&self, container: &Element, present: usize) -> Result<usize> {
        let name = self.binding.name();
        let length = container
            .attribute(LENGTH)
            .and_then(index_of)
            .ok_or_else(|| {
                Error::format(format!(
                    "sparse array '{}' is missing a valid \"{}\" attribute",
                    name, LENGTH
                ))
            })?;
        let limit = self
            .options
            .batch_len_for(std::mem::size_of::<Value>())
            .max(present);
        if length > limit {
            return Err(Error::format(format!(
                "sparse array '{}' declares length {}, more than the {} elements allowed",
                name, length, limit
            )));
        }
        Ok(length)
    }

    /// The `id` of a sparse element node, checked against `length`.
    pub(crate) fn sparse_id(&self, node: &Element, length: usize) -> Result<usize> {
        let name = self.binding.name();
        let id = node.attribute(ID).and_then(index_of).ok_or_else(|| {
            Error::format(format!(
                "element {} of sparse array '{}' is missing a valid \"{}\" attribute",
                node.name(),
                name,
                ID
            ))
        })?;
        if id >= length {
            return Err(Error::format(format!(
                "element id {} is out of range for sparse array '{}' of length {}",
                id, name, length
            )));
        }
        Ok(id)
    }

    pub(crate) fn read_chunked<T>(
        &self,
        input: &mut dyn Read,
        count: usize,
        read_entry: impl FnMut(&mut dyn Read) -> Result<T>,
    ) -> Result<Vec<T>> {
        let batch_len = self.options.batch_len_for(std::mem::size_of::<T>());
        read_chunked(input, count, batch_len, read_entry)
    }
}

/// Writes a presence flag and, for a non-null value, its payload.
pub(crate) fn write_slot(
    out: &mut dyn Write,
    adapter: &dyn PropertyAdapter,
    value: &Value,
) -> Result<()> {
    binary::write_bool(out, !value.is_null())?;
    if !value.is_null() {
        adapter.write_binary(out, value)?;
    }
    Ok(())
}

pub(crate) fn read_slot(input: &mut dyn Read, adapter: &dyn PropertyAdapter) -> Result<Value> {
    if binary::read_bool(input)? {
        adapter.read_binary(input)
    } else {
        Ok(Value::Null)
    }
}

/// Writes `count` followed by one entry per item of `entries`.
///
/// Fails when `entries` yields a different number of items than declared.
pub(crate) fn write_counted<T>(
    out: &mut dyn Write,
    count: usize,
    entries: impl IntoIterator<Item = T>,
    mut write_entry: impl FnMut(&mut dyn Write, T) -> Result<()>,
) -> Result<()> {
    binary::write_count(out, count)?;
    let mut written = 0usize;
    for entry in entries {
        if written < count {
            write_entry(&mut *out, entry)?;
        }
        written += 1;
    }
    if written != count {
        return Err(Error::format(format!(
            "declared {} entries but {} were supplied",
            count, written
        )));
    }
    Ok(())
}

/// Reads `count` entries in batches of at most `batch_len`.
///
/// Each batch is allocated for its own size only, so a corrupt count fails on the
/// truncated stream before any large allocation happens.
pub(crate) fn read_chunked<T>(
    input: &mut dyn Read,
    count: usize,
    batch_len: usize,
    mut read_entry: impl FnMut(&mut dyn Read) -> Result<T>,
) -> Result<Vec<T>> {
    let batch_len = batch_len.max(1);
    let mut entries: Vec<T> = Vec::new();
    let mut batch_index = 0usize;

    while entries.len() < count {
        let size = (count - entries.len()).min(batch_len);
        let mut batch = Vec::with_capacity(size);
        for _ in 0..size {
            match read_entry(&mut *input) {
                Ok(entry) => batch.push(entry),
                Err(e) if e.is_end_of_stream() => {
                    return Err(Error::format(format!(
                        "truncated stream: expected {} entries, read {}",
                        count,
                        entries.len() + batch.len()
                    )));
                }
                Err(e) => return Err(e),
            }
        }
        debug!(batch = batch_index, size, total = count, "decoded batch");
        entries.append(&mut batch);
        batch_index += 1;
    }
    Ok(entries)
}
