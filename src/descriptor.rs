//! Record descriptors.
//!
//! A [`Descriptor`] is the ordered set of adapters of one record type. It reads and writes
//! whole [`Record`]s in every format and provides property-wise equality, hashing and
//! cloning of records.
//!
//! An anonymous descriptor describes a *choice*: a record that holds exactly one of its
//! properties at a time. Its tree form is a wrapper named after the record type holding
//! the single property that is set.

use crate::adapter::PropertyAdapter;
use crate::binary;
use crate::token;
use crate::tree::qualify;
use crate::{Element, Error, Namespace, Record, Result, Value};
use std::io::{Read, Write};

#[derive(Debug)]
pub struct Descriptor {
    type_name: String,
    tag: Option<String>,
    namespace: Option<Namespace>,
    adapters: Vec<Box<dyn PropertyAdapter>>,
}

impl Descriptor {
    pub fn new(
        type_name: impl Into<String>,
        tag: Option<String>,
        namespace: Option<Namespace>,
        adapters: Vec<Box<dyn PropertyAdapter>>,
    ) -> Self {
        Descriptor {
            type_name: type_name.into(),
            tag: tag.filter(|t| !t.is_empty()),
            namespace,
            adapters,
        }
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.tag.is_none()
    }

    #[must_use]
    pub fn adapters(&self) -> &[Box<dyn PropertyAdapter>] {
        &self.adapters
    }

    /// Looks up the adapter of a property by name.
    #[must_use]
    pub fn adapter(&self, property: &str) -> Option<&dyn PropertyAdapter> {
        self.adapters
            .iter()
            .find(|a| a.binding().name() == property)
            .map(|a| a.as_ref())
    }

    fn record<'v>(&self, value: &'v Value) -> Result<&'v Record> {
        match value {
            Value::Record(r) if r.type_name() == self.type_name => Ok(r),
            Value::Record(r) => Err(Error::type_mismatch(&self.type_name, r.type_name())),
            other => Err(Error::type_mismatch(&self.type_name, other.kind_name())),
        }
    }

    /// Encodes a record as an element named by the record tag.
    pub fn to_tree(&self, record: &Record) -> Result<Element> {
        let prefix = self.namespace.as_ref().map(|ns| ns.prefix.as_str());
        let name = qualify(prefix, self.tag.as_deref().unwrap_or(&self.type_name));
        let mut node = Element::new(name);
        if let Some(ns) = &self.namespace {
            node.declare_namespace(ns.prefix.clone(), ns.uri.clone());
        }

        for adapter in &self.adapters {
            let value = adapter.binding().get(record)?;
            if self.is_anonymous() && adapter.is_empty(&value) {
                continue;
            }
            adapter.write_into_parent(&mut node, &value)?;
            if self.is_anonymous() {
                break;
            }
        }
        Ok(node)
    }

    /// Decodes a record from its element; absent properties stay unset.
    pub fn from_tree(&self, node: &Element) -> Result<Record> {
        let mut record = Record::new(self.type_name.clone());
        if self.is_anonymous() {
            if let Some(adapter) = self.choose(node) {
                let value = adapter.read_from_parent(node)?;
                adapter.binding().set(&mut record, value)?;
            }
            return Ok(record);
        }

        for adapter in &self.adapters {
            if !adapter.binding().is_writable() {
                continue;
            }
            let value = adapter.read_from_parent(node)?;
            if !value.is_null() {
                adapter.binding().set(&mut record, value)?;
            }
        }
        Ok(record)
    }

    /// The alternative of a choice that `node` holds.
    fn choose(&self, node: &Element) -> Option<&dyn PropertyAdapter> {
        self.adapters
            .iter()
            .find(|adapter| {
                let binding = adapter.binding();
                match binding.tag() {
                    None => true,
                    Some(tag) if binding.is_attribute() => {
                        node.attribute_matching(tag, binding.attribute_uri()).is_some()
                    }
                    Some(tag) => node.first_matching(tag, binding.namespace_uri()).is_some(),
                }
            })
            .map(|a| a.as_ref())
    }

    /// Writes the number of present properties, then an index and payload for each.
    pub fn write_binary(&self, out: &mut dyn Write, record: &Record) -> Result<()> {
        let mut present = Vec::with_capacity(self.adapters.len());
        for (index, adapter) in self.adapters.iter().enumerate() {
            let value = adapter.binding().get(record)?;
            if !value.is_null() {
                present.push((index, value));
            }
        }

        binary::write_count(out, present.len())?;
        for (index, value) in &present {
            binary::write_count(out, *index)?;
            self.adapters[*index].write_binary(out, value)?;
        }
        Ok(())
    }

    pub fn read_binary(&self, input: &mut dyn Read) -> Result<Record> {
        let mut record = Record::new(self.type_name.clone());
        let count = binary::read_count(input)?;
        if count > self.adapters.len() {
            return Err(Error::format(format!(
                "{} declares {} properties but has only {}",
                self.type_name,
                count,
                self.adapters.len()
            )));
        }
        for _ in 0..count {
            let index = binary::read_count(input)?;
            let adapter = self.adapters.get(index).ok_or_else(|| {
                Error::format(format!(
                    "property index {} is out of range for {}",
                    index, self.type_name
                ))
            })?;
            let value = adapter.read_binary(input)?;
            adapter.binding().set(&mut record, value)?;
        }
        Ok(record)
    }

    pub fn to_token(&self, record: &Record) -> Result<String> {
        let mut buf = Vec::new();
        self.write_binary(&mut buf, record)?;
        Ok(token::encode_base64(&buf))
    }

    pub fn from_token(&self, text: &str) -> Result<Record> {
        let buf = token::decode_base64(text)?;
        self.read_binary(&mut buf.as_slice())
    }

    /// Property-wise equality through each property's adapter.
    #[must_use]
    pub fn equals(&self, a: &Record, b: &Record) -> bool {
        a.type_name() == b.type_name()
            && self.adapters.iter().all(|adapter| {
                let binding = adapter.binding();
                match (binding.get(a), binding.get(b)) {
                    (Ok(x), Ok(y)) => adapter.equals_value(&x, &y),
                    _ => false,
                }
            })
    }

    /// The xor of the property hashes.
    #[must_use]
    pub fn hash(&self, record: &Record) -> u64 {
        self.adapters
            .iter()
            .filter_map(|adapter| {
                let value = adapter.binding().get(record).ok()?;
                Some(adapter.hash_value(&value))
            })
            .fold(0u64, |acc, h| acc ^ h)
    }

    /// Copies a record, deep-copying the properties whose adapters require it.
    pub fn clone_record(&self, record: &Record) -> Result<Record> {
        let mut copy = record.clone();
        for adapter in &self.adapters {
            if adapter.is_clone_required() {
                let binding = adapter.binding();
                let value = binding.get(record)?;
                binding.set(&mut copy, adapter.clone_value(&value)?)?;
            }
        }
        Ok(copy)
    }

    /// [`Descriptor::to_tree`] for a record held in a [`Value`].
    pub(crate) fn value_to_tree(&self, value: &Value) -> Result<Element> {
        self.to_tree(self.record(value)?)
    }

    pub(crate) fn write_value(&self, out: &mut dyn Write, value: &Value) -> Result<()> {
        self.write_binary(out, self.record(value)?)
    }

    pub(crate) fn clone_value(&self, value: &Value) -> Result<Value> {
        Ok(Value::Record(self.clone_record(self.record(value)?)?))
    }

    pub(crate) fn equals_value(&self, a: &Value, b: &Value) -> bool {
        match (self.record(a), self.record(b)) {
            (Ok(x), Ok(y)) => self.equals(x, y),
            _ => a == b,
        }
    }

    pub(crate) fn hash_value(&self, value: &Value) -> u64 {
        match self.record(value) {
            Ok(r) => self.hash(r),
            Err(_) => crate::value::hash_of(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CodecOptions, PropertyDescription, RecordDescription, Registry};

    fn person() -> (Registry, std::sync::Arc<Descriptor>) {
        let mut registry = Registry::new(CodecOptions::new());
        let descriptor = registry
            .register_record(
                RecordDescription::new("Person")
                    .with_property(PropertyDescription::new("id", "long").attribute())
                    .with_property(PropertyDescription::new("name", "string"))
                    .with_property(PropertyDescription::new("photo", "bytes")),
            )
            .unwrap();
        (registry, descriptor)
    }

    #[test]
    fn test_tree_round_trip() {
        let (_, descriptor) = person();
        let record = Record::new("Person").with("id", 7i64).with("name", "Ann");
        let node = descriptor.to_tree(&record).unwrap();
        assert_eq!(node.name(), "Person");
        assert_eq!(node.attribute("id"), Some(&Value::Long(7)));
        assert_eq!(node.children().len(), 1);
        assert_eq!(descriptor.from_tree(&node).unwrap(), record);
    }

    #[test]
    fn test_binary_writes_present_properties_only() {
        let (_, descriptor) = person();
        let record = Record::new("Person").with("name", "Ann");
        let mut buf = Vec::new();
        descriptor.write_binary(&mut buf, &record).unwrap();
        assert_eq!(&buf[..8], &[0, 0, 0, 1, 0, 0, 0, 1]);
        assert_eq!(descriptor.read_binary(&mut buf.as_slice()).unwrap(), record);

        let token = descriptor.to_token(&record).unwrap();
        assert_eq!(descriptor.from_token(&token).unwrap(), record);
    }

    #[test]
    fn test_bad_property_index() {
        let (_, descriptor) = person();
        let data = [0u8, 0, 0, 1, 0, 0, 0, 9];
        assert!(descriptor.read_binary(&mut &data[..]).unwrap_err().is_format());
    }

    #[test]
    fn test_equals_hash_and_clone() {
        let (_, descriptor) = person();
        let a = Record::new("Person").with("name", "Ann").with("photo", vec![1u8, 2]);
        let b = descriptor.clone_record(&a).unwrap();
        assert!(descriptor.equals(&a, &b));
        assert_eq!(descriptor.hash(&a), descriptor.hash(&b));

        let c = b.clone().with("name", "Bob");
        assert!(!descriptor.equals(&a, &c));
    }
}
