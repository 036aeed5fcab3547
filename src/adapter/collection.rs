use super::iterable::{read_slot, required, sub_binding, write_counted, write_slot, Iterable};
use super::{binary_token, from_binary_token, PropertyAdapter};
use crate::binary;
use crate::describe::PropertyDescription;
use crate::registry::AdapterSelector;
use crate::value::hash_of;
use crate::{Collection, Element, Error, PropertyBinding, Result, SequenceKind, Value};
use std::io::{Read, Write};

/// Adapter for order-preserving sequences, [`Value::Collection`].
///
/// Decoded values are materialised into the configured [`SequenceKind`]. Anonymous
/// elements that decode to `Null` are skipped; a collection has no positional holes.
#[derive(Debug)]
pub struct CollectionAdapter {
    iterable: Iterable,
    element: Box<dyn PropertyAdapter>,
    kind: SequenceKind,
}

impl CollectionAdapter {
    pub fn new(
        selector: &dyn AdapterSelector,
        binding: PropertyBinding,
        desc: &PropertyDescription,
    ) -> Result<Self> {
        if desc.sparse {
            return Err(Error::configuration(format!(
                "collection property '{}' cannot be sparse",
                binding.name()
            )));
        }
        let iterable = Iterable::new(binding, desc, selector.options())?;
        let element_desc = required(&iterable.binding, desc.element.as_deref(), "element")?;
        let element_binding = sub_binding(
            &iterable.binding,
            element_desc,
            "element",
            iterable.element_tag(),
        );
        let element = selector.select(element_binding, element_desc)?;
        iterable.check_element(element.as_ref())?;
        Ok(CollectionAdapter {
            iterable,
            element,
            kind: desc.kind.unwrap_or_default(),
        })
    }

    #[must_use]
    pub fn kind(&self) -> SequenceKind {
        self.kind
    }

    /// Accepts collections as well as plain arrays.
    fn items<'v>(&self, value: &'v Value) -> Result<&'v [Value]> {
        match value {
            Value::Collection(c) => Ok(c.as_slice()),
            Value::Array(items) => Ok(items),
            other => Err(Error::type_mismatch("collection", other.kind_name())),
        }
    }
}

impl PropertyAdapter for CollectionAdapter {
    fn binding(&self) -> &PropertyBinding {
        &self.iterable.binding
    }

    fn adapter_name(&self) -> &'static str {
        "collection"
    }

    fn is_empty(&self, value: &Value) -> bool {
        self.iterable.policy.is_empty(value)
    }

    fn is_container(&self) -> bool {
        self.iterable.policy.is_nested()
    }

    fn read_from_parent(&self, parent: &Element) -> Result<Value> {
        self.iterable.read_from_parent(self, parent)
    }

    fn write_into_parent(&self, parent: &mut Element, value: &Value) -> Result<()> {
        self.iterable.write_into_parent(self, parent, value)
    }

    fn to_tree(&self, value: &Value) -> Result<Element> {
        let mut container = self.iterable.container();
        for item in self.items(value)? {
            container.push_child(self.iterable.encode_element(self.element.as_ref(), item)?);
        }
        Ok(container)
    }

    fn from_tree(&self, node: &Element) -> Result<Value> {
        let element = self.element.as_ref();
        let nodes = self.iterable.element_nodes(node, element);
        if nodes.is_empty() && !self.iterable.policy.is_nested() {
            return Ok(Value::Null);
        }

        let mut collection = Collection::new(self.kind);
        for n in nodes {
            let item = self.iterable.decode_element(element, n)?;
            if item.is_null() && element.is_anonymous() {
                continue;
            }
            collection.push(item);
        }
        Ok(Value::Collection(collection))
    }

    fn write_binary(&self, out: &mut dyn Write, value: &Value) -> Result<()> {
        let items = self.items(value)?;
        write_counted(out, items.len(), items, |out, item| {
            write_slot(out, self.element.as_ref(), item)
        })
    }

    fn read_binary(&self, input: &mut dyn Read) -> Result<Value> {
        let count = binary::read_count(input)?;
        let items = self
            .iterable
            .read_chunked(input, count, |input| read_slot(input, self.element.as_ref()))?;
        Ok(Value::Collection(Collection::from_items(self.kind, items)))
    }

    fn to_token(&self, value: &Value) -> Result<String> {
        binary_token(self, value)
    }

    fn from_token(&self, token: &str) -> Result<Value> {
        from_binary_token(self, token)
    }

    fn clone_value(&self, value: &Value) -> Result<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        let mut copy = Collection::new(self.kind);
        for item in self.items(value)? {
            copy.push(self.element.clone_value(item)?);
        }
        Ok(Value::Collection(copy))
    }

    fn hash_value(&self, value: &Value) -> u64 {
        match value {
            Value::Collection(c) if c.kind() == SequenceKind::Set => c
                .iter()
                .fold(0u64, |acc, item| acc ^ self.element.hash_value(item)),
            Value::Collection(c) => c.iter().fold(17u64, |acc, item| {
                acc.wrapping_mul(31)
                    .wrapping_add(self.element.hash_value(item))
            }),
            other => hash_of(other),
        }
    }
}
