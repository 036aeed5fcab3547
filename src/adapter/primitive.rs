//! Arrays of primitive scalars.
//!
//! Unlike [`ArrayAdapter`](super::ArrayAdapter), every element is present: there are no
//! holes, so the binary form is packed and a sparse tree simply leaves out the elements
//! holding the kind's zero value.

use super::iterable::{sub_binding, Iterable, ID, LENGTH};
use super::{binary_token, from_binary_token, read_property, write_property, PropertyAdapter};
use super::{ScalarAdapter, ScalarKind};
use crate::binary;
use crate::describe::PropertyDescription;
use crate::registry::AdapterSelector;
use crate::token;
use crate::{Element, Error, PropertyBinding, Result, Value};
use std::io::{Read, Write};

/// Adapter for `boolean[]`, `char[]`, `short[]`, `int[]`, `long[]`, `float[]` and
/// `double[]` properties, holding a [`Value::Array`] of the element kind.
///
/// Boolean and char arrays are *stringable*: when not nested they are written as a single
/// element whose content packs the whole array, `"1010"` for booleans and the text itself
/// for chars.
///
/// # Examples
///
/// ```rust
/// use propcodec::{PropertyDescription, RecordDescription, Record, Registry, Value};
///
/// let mut registry = Registry::default();
/// let flags = registry
///     .register_record(
///         RecordDescription::new("Flags")
///             .with_property(PropertyDescription::new("bits", "boolean[]")),
///     )
///     .unwrap();
///
/// let bits = Value::Array(vec![true.into(), false.into(), true.into()]);
/// let record = Record::new("Flags").with("bits", bits);
/// let node = flags.to_tree(&record).unwrap();
/// assert_eq!(node.children()[0].content(), Some(&Value::from("101")));
/// assert_eq!(flags.from_tree(&node).unwrap(), record);
/// ```
#[derive(Debug)]
pub struct PrimitiveArrayAdapter {
    iterable: Iterable,
    kind: ScalarKind,
    element: ScalarAdapter,
}

impl PrimitiveArrayAdapter {
    /// Element kinds with a primitive array adapter. Byte arrays are served by the
    /// `bytes` adapter.
    pub const KINDS: [ScalarKind; 7] = [
        ScalarKind::Boolean,
        ScalarKind::Char,
        ScalarKind::Short,
        ScalarKind::Int,
        ScalarKind::Long,
        ScalarKind::Float,
        ScalarKind::Double,
    ];

    /// The type tag of the array of `kind`, such as `int[]`.
    #[must_use]
    pub fn type_tag(kind: ScalarKind) -> String {
        format!("{}[]", kind.type_tag())
    }

    pub fn new(
        selector: &dyn AdapterSelector,
        binding: PropertyBinding,
        desc: &PropertyDescription,
        kind: ScalarKind,
    ) -> Result<Self> {
        if !Self::KINDS.contains(&kind) {
            return Err(Error::configuration(format!(
                "property '{}': no primitive array of {}",
                binding.name(),
                kind.type_tag()
            )));
        }
        let iterable = Iterable::new(binding, desc, selector.options())?;
        let element_desc = PropertyDescription::new("", kind.type_tag());
        let element_binding = sub_binding(
            &iterable.binding,
            &element_desc,
            "element",
            iterable.element_tag(),
        );
        Ok(PrimitiveArrayAdapter {
            iterable,
            kind,
            element: ScalarAdapter::new(element_binding, kind),
        })
    }

    #[must_use]
    pub fn kind(&self) -> ScalarKind {
        self.kind
    }

    /// Returns `true` if the array is written as one packed element.
    #[must_use]
    pub fn is_stringable(&self) -> bool {
        matches!(self.kind, ScalarKind::Boolean | ScalarKind::Char) && !self.iterable.policy.is_nested()
    }

    /// The elements of `value`, each coerced into the element kind.
    fn items(&self, value: &Value) -> Result<Vec<Value>> {
        match value {
            Value::Array(items) => items.iter().map(|item| self.element.coerce(item)).collect(),
            other => Err(Error::type_mismatch(
                &Self::type_tag(self.kind),
                other.kind_name(),
            )),
        }
    }

    fn is_zero(item: &Value) -> bool {
        match item {
            Value::Bool(b) => !b,
            Value::Char(c) => *c == '\0',
            Value::Float(f) => f.to_bits() == 0,
            Value::Double(d) => d.to_bits() == 0,
            other => other.as_i64() == Some(0),
        }
    }

    fn zero(&self) -> Value {
        match self.kind {
            ScalarKind::Boolean => Value::Bool(false),
            ScalarKind::Char => Value::Char('\0'),
            ScalarKind::Short => Value::Short(0),
            ScalarKind::Long => Value::Long(0),
            ScalarKind::Float => Value::Float(0.0),
            ScalarKind::Double => Value::Double(0.0),
            _ => Value::Int(0),
        }
    }

    fn pack(&self, items: &[Value]) -> String {
        items
            .iter()
            .map(|item| match item {
                Value::Bool(true) => '1',
                Value::Bool(_) => '0',
                Value::Char(c) => *c,
                _ => '\0',
            })
            .collect()
    }

    fn unpack(&self, text: &str) -> Value {
        let items = match self.kind {
            ScalarKind::Boolean => text.chars().map(|c| Value::Bool(c == '1')).collect(),
            _ => text.chars().map(Value::Char).collect(),
        };
        Value::Array(items)
    }

    fn decode_node(&self, node: &Element) -> Result<Value> {
        match self.element.from_tree(node)? {
            Value::Null => Err(Error::format(format!(
                "element {} of '{}' has no value",
                node.name(),
                self.iterable.binding.name()
            ))),
            item => Ok(item),
        }
    }

    fn read_elements(&self, container: &Element) -> Result<Value> {
        let nodes = self.iterable.element_nodes(container, &self.element);
        if self.iterable.policy.sparse {
            let length = self.iterable.sparse_length(container, nodes.len())?;
            let mut items = vec![self.zero(); length];
            for node in nodes {
                let id = self.iterable.sparse_id(node, length)?;
                items[id] = self.decode_node(node)?;
            }
            return Ok(Value::Array(items));
        }

        if nodes.is_empty() && !self.iterable.policy.is_nested() {
            return Ok(Value::Null);
        }
        let items = nodes
            .into_iter()
            .map(|node| self.decode_node(node))
            .collect::<Result<Vec<_>>>()?;
        Ok(Value::Array(items))
    }

    fn write_elements(&self, container: &mut Element, items: &[Value]) -> Result<()> {
        let sparse = self.iterable.policy.sparse;
        if sparse {
            let length = i32::try_from(items.len()).map_err(|_| {
                Error::format(format!("array of {} elements is too long", items.len()))
            })?;
            container.set_attribute(LENGTH, Value::Int(length));
        }
        for (id, item) in items.iter().enumerate() {
            if sparse && Self::is_zero(item) {
                continue;
            }
            let mut node = self.element.to_tree(item)?;
            if sparse {
                node.set_attribute(ID, Value::Int(id as i32));
            }
            container.push_child(node);
        }
        Ok(())
    }

    fn read_packed_bits(&self, input: &mut dyn Read, count: usize) -> Result<Vec<Value>> {
        let bytes = self
            .iterable
            .read_chunked(input, (count + 7) / 8, |input| binary::read_i8(input))?;
        Ok((0..count)
            .map(|i| Value::Bool(bytes[i / 8] as u8 & (1u8 << (i % 8)) != 0))
            .collect())
    }
}

impl PropertyAdapter for PrimitiveArrayAdapter {
    fn binding(&self) -> &PropertyBinding {
        &self.iterable.binding
    }

    fn adapter_name(&self) -> &'static str {
        "primitive array"
    }

    fn is_empty(&self, value: &Value) -> bool {
        self.iterable.policy.is_empty(value)
    }

    fn is_container(&self) -> bool {
        self.iterable.policy.is_nested()
    }

    fn read_from_parent(&self, parent: &Element) -> Result<Value> {
        if self.is_stringable() {
            read_property(self, parent)
        } else {
            self.iterable.read_from_parent(self, parent)
        }
    }

    fn write_into_parent(&self, parent: &mut Element, value: &Value) -> Result<()> {
        if self.is_stringable() {
            write_property(self, parent, value)
        } else {
            self.iterable.write_into_parent(self, parent, value)
        }
    }

    fn to_tree(&self, value: &Value) -> Result<Element> {
        let items = self.items(value)?;
        if self.is_stringable() {
            let binding = &self.iterable.binding;
            let mut element = binding.new_element(binding.tag().unwrap_or_default());
            element.set_content(Value::String(self.pack(&items)));
            return Ok(element);
        }
        let mut container = self.iterable.container();
        self.write_elements(&mut container, &items)?;
        Ok(container)
    }

    fn from_tree(&self, node: &Element) -> Result<Value> {
        if !self.is_stringable() {
            return self.read_elements(node);
        }
        match node.content() {
            None => Ok(Value::Array(Vec::new())),
            Some(Value::String(text)) => Ok(self.unpack(text)),
            Some(other) => Err(Error::type_mismatch("string", other.kind_name())),
        }
    }

    /// A count, then the packed elements: bits for booleans (least significant first),
    /// the UTF-8 text for chars and fixed-width values otherwise.
    fn write_binary(&self, out: &mut dyn Write, value: &Value) -> Result<()> {
        let items = self.items(value)?;
        match self.kind {
            ScalarKind::Char => binary::write_string(out, &self.pack(&items)),
            ScalarKind::Boolean => {
                binary::write_count(out, items.len())?;
                for chunk in items.chunks(8) {
                    let bits = chunk
                        .iter()
                        .enumerate()
                        .filter(|(_, item)| matches!(item, Value::Bool(true)))
                        .fold(0u8, |bits, (i, _)| bits | (1u8 << i));
                    binary::write_i8(out, bits as i8)?;
                }
                Ok(())
            }
            _ => {
                binary::write_count(out, items.len())?;
                for item in &items {
                    self.element.write_binary(out, item)?;
                }
                Ok(())
            }
        }
    }

    fn read_binary(&self, input: &mut dyn Read) -> Result<Value> {
        let items = match self.kind {
            ScalarKind::Char => return Ok(self.unpack(&binary::read_string(input)?)),
            ScalarKind::Boolean => {
                let count = binary::read_count(input)?;
                self.read_packed_bits(input, count)?
            }
            _ => {
                let count = binary::read_count(input)?;
                self.iterable
                    .read_chunked(input, count, |input| self.element.read_binary(input))?
            }
        };
        Ok(Value::Array(items))
    }

    fn to_token(&self, value: &Value) -> Result<String> {
        match self.kind {
            ScalarKind::Boolean => Ok(self.pack(&self.items(value)?)),
            ScalarKind::Char => Ok(token::encode_string(&self.pack(&self.items(value)?))),
            _ => binary_token(self, value),
        }
    }

    fn from_token(&self, token: &str) -> Result<Value> {
        match self.kind {
            ScalarKind::Boolean => {
                if let Some(bad) = token.chars().find(|c| *c != '0' && *c != '1') {
                    return Err(Error::format(format!(
                        "illegal boolean[] token '{}': unexpected '{}'",
                        token, bad
                    )));
                }
                Ok(self.unpack(token))
            }
            ScalarKind::Char => Ok(self.unpack(&token::decode_string(token)?)),
            _ => from_binary_token(self, token),
        }
    }

    fn equals_value(&self, a: &Value, b: &Value) -> bool {
        match (self.items(a), self.items(b)) {
            (Ok(x), Ok(y)) => x == y,
            _ => a == b,
        }
    }

    fn hash_value(&self, value: &Value) -> u64 {
        match self.items(value) {
            Ok(items) => crate::value::hash_of(&items),
            Err(_) => crate::value::hash_of(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CodecOptions, Registry};

    fn adapter(kind: ScalarKind, desc: PropertyDescription) -> PrimitiveArrayAdapter {
        let registry = Registry::new(CodecOptions::new());
        let binding = PropertyBinding::new("values", PrimitiveArrayAdapter::type_tag(kind));
        PrimitiveArrayAdapter::new(&registry, binding, &desc, kind).unwrap()
    }

    fn plain(kind: ScalarKind) -> PrimitiveArrayAdapter {
        adapter(kind, PropertyDescription::new("values", PrimitiveArrayAdapter::type_tag(kind)))
    }

    fn bools(bits: &[bool]) -> Value {
        Value::Array(bits.iter().copied().map(Value::Bool).collect())
    }

    #[test]
    fn test_boolean_array_is_stringable() {
        let a = plain(ScalarKind::Boolean);
        let value = bools(&[true, false, false, true]);

        let mut parent = Element::new("root");
        a.write_into_parent(&mut parent, &value).unwrap();
        assert_eq!(parent.children().len(), 1);
        assert_eq!(parent.children()[0].content(), Some(&Value::from("1001")));
        assert_eq!(a.read_from_parent(&parent).unwrap(), value);

        assert_eq!(a.to_token(&value).unwrap(), "1001");
        assert_eq!(a.from_token("1001").unwrap(), value);
        assert!(a.from_token("10x1").unwrap_err().is_format());
    }

    #[test]
    fn test_boolean_bits_are_packed() {
        let a = plain(ScalarKind::Boolean);
        let mut bits = vec![false; 10];
        bits[0] = true;
        bits[9] = true;
        let value = bools(&bits);

        let mut buf = Vec::new();
        a.write_binary(&mut buf, &value).unwrap();
        assert_eq!(buf, vec![0, 0, 0, 10, 0b0000_0001, 0b0000_0010]);
        assert_eq!(a.read_binary(&mut buf.as_slice()).unwrap(), value);
    }

    #[test]
    fn test_char_array_as_text() {
        let a = plain(ScalarKind::Char);
        let value = Value::Array("héllo".chars().map(Value::Char).collect());

        let node = a.to_tree(&value).unwrap();
        assert_eq!(node.content(), Some(&Value::from("héllo")));
        assert_eq!(a.from_tree(&node).unwrap(), value);

        let mut buf = Vec::new();
        a.write_binary(&mut buf, &value).unwrap();
        assert_eq!(a.read_binary(&mut buf.as_slice()).unwrap(), value);
        assert_eq!(a.from_token(&a.to_token(&value).unwrap()).unwrap(), value);
    }

    #[test]
    fn test_nested_boolean_array_uses_elements() {
        let a = adapter(
            ScalarKind::Boolean,
            PropertyDescription::new("values", "boolean[]").with_element_tag("flag"),
        );
        assert!(!a.is_stringable());
        let value = bools(&[true, false]);
        let node = a.to_tree(&value).unwrap();
        assert_eq!(node.children().len(), 2);
        assert_eq!(node.children()[1].content(), Some(&Value::Bool(false)));
        assert_eq!(a.from_tree(&node).unwrap(), value);
    }

    #[test]
    fn test_sparse_int_array_skips_zeros() {
        let a = adapter(
            ScalarKind::Int,
            PropertyDescription::new("values", "int[]")
                .sparse()
                .with_element_tag("n"),
        );
        let value = Value::Array(vec![Value::Int(0), Value::Int(5), Value::Int(0)]);
        let node = a.to_tree(&value).unwrap();
        assert_eq!(node.attribute("length"), Some(&Value::Int(3)));
        assert_eq!(node.children().len(), 1);
        assert_eq!(node.children()[0].attribute("id"), Some(&Value::Int(1)));
        assert_eq!(a.from_tree(&node).unwrap(), value);
    }

    #[test]
    fn test_fixed_width_binary() {
        let a = plain(ScalarKind::Short);
        let value = Value::Array(vec![Value::Short(1), Value::Short(-1)]);
        let mut buf = Vec::new();
        a.write_binary(&mut buf, &value).unwrap();
        assert_eq!(buf, vec![0, 0, 0, 2, 0, 1, 0xff, 0xff]);
        assert_eq!(a.read_binary(&mut buf.as_slice()).unwrap(), value);

        let truncated = [0x7f, 0xff, 0xff, 0xff, 0, 1];
        let err = a.read_binary(&mut &truncated[..]).unwrap_err();
        assert!(err.to_string().contains("read 1"));
    }

    #[test]
    fn test_items_are_coerced_and_nulls_rejected() {
        let a = plain(ScalarKind::Long);
        let mut buf = Vec::new();
        a.write_binary(&mut buf, &Value::Array(vec![Value::Int(7)])).unwrap();
        assert_eq!(
            a.read_binary(&mut buf.as_slice()).unwrap(),
            Value::Array(vec![Value::Long(7)])
        );

        let err = a
            .write_binary(&mut Vec::new(), &Value::Array(vec![Value::Null]))
            .unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[test]
    fn test_element_without_value() {
        let a = adapter(
            ScalarKind::Int,
            PropertyDescription::new("values", "int[]").with_element_tag("n"),
        );
        let mut node = Element::new("values");
        node.add_child("n");
        assert!(a.from_tree(&node).unwrap_err().is_format());
    }
}
