use super::iterable::{
    read_slot, required, sub_binding, write_counted, write_slot, Iterable, ID, LENGTH,
};
use super::{binary_token, from_binary_token, PropertyAdapter};
use crate::binary;
use crate::describe::PropertyDescription;
use crate::registry::AdapterSelector;
use crate::{Element, Error, PropertyBinding, Result, Value};
use std::io::{Read, Write};

/// Adapter for fixed-length arrays, [`Value::Array`].
///
/// `Null` entries are holes. A dense array keeps them as empty placeholder nodes; a sparse
/// array writes a `length` attribute on its wrapper and tags every present element with
/// its `id`, leaving holes out entirely.
#[derive(Debug)]
pub struct ArrayAdapter {
    iterable: Iterable,
    element: Box<dyn PropertyAdapter>,
}

impl ArrayAdapter {
    /// Builds an array adapter, resolving its element adapter through `selector`.
    pub fn new(
        selector: &dyn AdapterSelector,
        binding: PropertyBinding,
        desc: &PropertyDescription,
    ) -> Result<Self> {
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
        Ok(ArrayAdapter { iterable, element })
    }

    #[must_use]
    pub fn element(&self) -> &dyn PropertyAdapter {
        self.element.as_ref()
    }

    fn items<'v>(&self, value: &'v Value) -> Result<&'v [Value]> {
        match value {
            Value::Array(items) => Ok(items),
            other => Err(Error::type_mismatch("array", other.kind_name())),
        }
    }

    fn write_elements(&self, container: &mut Element, items: &[Value]) -> Result<()> {
        let element = self.element.as_ref();
        if self.iterable.policy.sparse {
            let length = i32::try_from(items.len())
                .map_err(|_| Error::format(format!("array of {} elements is too long", items.len())))?;
            container.set_attribute(LENGTH, Value::Int(length));
            for (id, item) in items.iter().enumerate() {
                if item.is_null() {
                    continue;
                }
                let mut node = self.iterable.encode_element(element, item)?;
                node.set_attribute(ID, Value::Int(id as i32));
                container.push_child(node);
            }
        } else {
            for item in items {
                container.push_child(self.iterable.encode_element(element, item)?);
            }
        }
        Ok(())
    }

    fn read_sparse(&self, container: &Element) -> Result<Value> {
        let nodes = self.iterable.element_nodes(container, self.element.as_ref());
        let length = self.iterable.sparse_length(container, nodes.len())?;

        let mut items = vec![Value::Null; length];
        for node in nodes {
            let id = self.iterable.sparse_id(node, length)?;
            items[id] = self.iterable.decode_element(self.element.as_ref(), &strip_id(node))?;
        }
        Ok(Value::Array(items))
    }
}

/// A copy of a sparse element node without its `id` marker.
fn strip_id(node: &Element) -> Element {
    let mut copy = Element::new(node.name());
    for (prefix, uri) in node.namespaces() {
        copy.declare_namespace(prefix.clone(), uri.clone());
    }
    for (name, value) in node.attributes().filter(|(name, _)| name.as_str() != ID) {
        copy.set_attribute(name.clone(), value.clone());
    }
    for child in node.children() {
        copy.push_child(child.clone());
    }
    if let Some(content) = node.content() {
        copy.set_content(content.clone());
    }
    copy
}

impl PropertyAdapter for ArrayAdapter {
    fn binding(&self) -> &PropertyBinding {
        &self.iterable.binding
    }

    fn adapter_name(&self) -> &'static str {
        "array"
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
        let items = self.items(value)?;
        let mut container = self.iterable.container();
        self.write_elements(&mut container, items)?;
        Ok(container)
    }

    fn from_tree(&self, node: &Element) -> Result<Value> {
        if self.iterable.policy.sparse {
            return self.read_sparse(node);
        }
        let nodes = self.iterable.element_nodes(node, self.element.as_ref());
        if nodes.is_empty() && !self.iterable.policy.is_nested() {
            return Ok(Value::Null);
        }
        let items = nodes
            .into_iter()
            .map(|n| self.iterable.decode_element(self.element.as_ref(), n))
            .collect::<Result<Vec<_>>>()?;
        Ok(Value::Array(items))
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
        Ok(Value::Array(items))
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
        let items = self
            .items(value)?
            .iter()
            .map(|item| self.element.clone_value(item))
            .collect::<Result<Vec<_>>>()?;
        Ok(Value::Array(items))
    }

    fn equals_value(&self, a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Array(x), Value::Array(y)) => {
                x.len() == y.len()
                    && x.iter()
                        .zip(y)
                        .all(|(p, q)| self.element.equals_value(p, q))
            }
            _ => a == b,
        }
    }

    fn hash_value(&self, value: &Value) -> u64 {
        match value {
            Value::Array(items) => items.iter().fold(17u64, |acc, item| {
                acc.wrapping_mul(31)
                    .wrapping_add(self.element.hash_value(item))
            }),
            other => crate::value::hash_of(other),
        }
    }
}
