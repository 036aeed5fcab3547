use super::{binary_token, from_binary_token, PropertyAdapter};
use crate::{Descriptor, Element, PropertyBinding, Result, Value};
use std::io::{Read, Write};
use std::sync::Arc;

/// Adapter for a property holding a record of a registered type.
///
/// The record's own descriptor does the work; in the tree form its element is renamed to
/// the property tag. A property whose record type is a choice is anonymous and splices
/// the chosen alternative into its parent.
#[derive(Debug)]
pub struct NestedAdapter {
    binding: PropertyBinding,
    descriptor: Arc<Descriptor>,
}

impl NestedAdapter {
    pub fn new(binding: PropertyBinding, descriptor: Arc<Descriptor>) -> Self {
        let binding = if descriptor.is_anonymous() {
            binding.with_tag(None)
        } else {
            binding
        };
        NestedAdapter {
            binding,
            descriptor,
        }
    }

    #[must_use]
    pub fn descriptor(&self) -> &Arc<Descriptor> {
        &self.descriptor
    }
}

impl PropertyAdapter for NestedAdapter {
    fn binding(&self) -> &PropertyBinding {
        &self.binding
    }

    fn adapter_name(&self) -> &'static str {
        "record"
    }

    fn is_clone_required(&self) -> bool {
        true
    }

    fn deep_copy(&self, value: &Value) -> Option<Result<Value>> {
        Some(self.descriptor.clone_value(value))
    }

    fn to_tree(&self, value: &Value) -> Result<Element> {
        let mut node = self.descriptor.value_to_tree(value)?;
        if let Some(tag) = self.binding.tag() {
            node.set_name(self.binding.qualified(tag));
            if let Some(ns) = self.binding.namespace() {
                node.declare_namespace(ns.prefix.clone(), ns.uri.clone());
            }
        }
        Ok(node)
    }

    fn from_tree(&self, node: &Element) -> Result<Value> {
        let record = self.descriptor.from_tree(node)?;
        // a choice with no alternative present is absent
        if self.descriptor.is_anonymous() && record.is_empty() {
            return Ok(Value::Null);
        }
        Ok(Value::Record(record))
    }

    fn write_binary(&self, out: &mut dyn Write, value: &Value) -> Result<()> {
        self.descriptor.write_value(out, value)
    }

    fn read_binary(&self, input: &mut dyn Read) -> Result<Value> {
        Ok(Value::Record(self.descriptor.read_binary(input)?))
    }

    fn to_token(&self, value: &Value) -> Result<String> {
        binary_token(self, value)
    }

    fn from_token(&self, token: &str) -> Result<Value> {
        from_binary_token(self, token)
    }

    fn equals_value(&self, a: &Value, b: &Value) -> bool {
        self.descriptor.equals_value(a, b)
    }

    fn hash_value(&self, value: &Value) -> u64 {
        self.descriptor.hash_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CodecOptions, PropertyDescription, Record, RecordDescription, Registry};

    fn registry() -> Registry {
        let mut registry = Registry::new(CodecOptions::new());
        registry
            .register_record(
                RecordDescription::new("Address")
                    .with_property(PropertyDescription::new("city", "string")),
            )
            .unwrap();
        registry
            .register_record(
                RecordDescription::new("Shape")
                    .anonymous()
                    .with_property(PropertyDescription::new("circle", "double"))
                    .with_property(PropertyDescription::new("square", "int")),
            )
            .unwrap();
        registry
    }

    #[test]
    fn test_renamed_to_property_tag() {
        let registry = registry();
        let adapter = NestedAdapter::new(
            PropertyBinding::new("home", "Address"),
            registry.descriptor("Address").unwrap(),
        );
        let value = Value::Record(Record::new("Address").with("city", "Oslo"));

        let mut parent = Element::new("Person");
        adapter.write_into_parent(&mut parent, &value).unwrap();
        assert_eq!(parent.children()[0].name(), "home");
        assert_eq!(adapter.read_from_parent(&parent).unwrap(), value);
        assert_eq!(adapter.clone_value(&value).unwrap(), value);
    }

    #[test]
    fn test_choice_is_spliced() {
        let registry = registry();
        let adapter = NestedAdapter::new(
            PropertyBinding::new("shape", "Shape"),
            registry.descriptor("Shape").unwrap(),
        );
        assert!(adapter.is_anonymous());

        let value = Value::Record(Record::new("Shape").with("square", 4));
        let mut parent = Element::new("Drawing");
        adapter.write_into_parent(&mut parent, &value).unwrap();
        assert_eq!(parent.children().len(), 1);
        assert_eq!(parent.children()[0].name(), "square");
        assert_eq!(adapter.read_from_parent(&parent).unwrap(), value);
    }

    #[test]
    fn test_wrong_record_type() {
        let registry = registry();
        let adapter = NestedAdapter::new(
            PropertyBinding::new("home", "Address"),
            registry.descriptor("Address").unwrap(),
        );
        let err = adapter.to_tree(&Value::Record(Record::new("Shape"))).unwrap_err();
        assert!(matches!(err, crate::Error::TypeMismatch { .. }));
    }
}
