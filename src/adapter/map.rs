use super::iterable::{read_slot, required, sub_binding, write_counted, write_slot, Iterable};
use super::{binary_token, from_binary_token, PropertyAdapter};
use crate::binary;
use crate::describe::PropertyDescription;
use crate::registry::AdapterSelector;
use crate::value::hash_of;
use crate::{Element, Error, PropertyBinding, Result, Value, ValueMap};
use std::io::{Read, Write};

/// Adapter for key/value maps, [`Value::Map`].
///
/// Each entry is an entry node holding a key sub-node and a value sub-node (tagged `key`
/// and `value` unless configured otherwise). Either may be absent, which reads back as a
/// `Null` key or value.
#[derive(Debug)]
pub struct MapAdapter {
    iterable: Iterable,
    key: Box<dyn PropertyAdapter>,
    value: Box<dyn PropertyAdapter>,
}

impl MapAdapter {
    pub fn new(
        selector: &dyn AdapterSelector,
        binding: PropertyBinding,
        desc: &PropertyDescription,
    ) -> Result<Self> {
        if desc.sparse {
            return Err(Error::configuration(format!(
                "map property '{}' cannot be sparse",
                binding.name()
            )));
        }
        let iterable = Iterable::new(binding, desc, selector.options())?;
        let key_desc = required(&iterable.binding, desc.key.as_deref(), "key")?;
        let value_desc = required(&iterable.binding, desc.value.as_deref(), "value")?;

        let key = selector.select(
            sub_binding(&iterable.binding, key_desc, "key", Some("key")),
            key_desc,
        )?;
        let value = selector.select(
            sub_binding(&iterable.binding, value_desc, "value", Some("value")),
            value_desc,
        )?;
        Ok(MapAdapter {
            iterable,
            key,
            value,
        })
    }

    fn entries<'v>(&self, value: &'v Value) -> Result<&'v ValueMap> {
        value
            .as_map()
            .ok_or_else(|| Error::type_mismatch("map", value.kind_name()))
    }

    fn entry_tag(&self) -> &str {
        self.iterable.element_tag().unwrap_or("entry")
    }
}

impl PropertyAdapter for MapAdapter {
    fn binding(&self) -> &PropertyBinding {
        &self.iterable.binding
    }

    fn adapter_name(&self) -> &'static str {
        "map"
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
        for (k, v) in self.entries(value)? {
            let mut entry = self.iterable.binding.new_element(self.entry_tag());
            self.key.write_into_parent(&mut entry, k)?;
            self.value.write_into_parent(&mut entry, v)?;
            container.push_child(entry);
        }
        Ok(container)
    }

    fn from_tree(&self, node: &Element) -> Result<Value> {
        let uri = self.iterable.binding.namespace_uri();
        let entries: Vec<&Element> = node.elements_matching(self.entry_tag(), uri).collect();
        if entries.is_empty() && !self.iterable.policy.is_nested() {
            return Ok(Value::Null);
        }

        let mut map = ValueMap::with_capacity(entries.len());
        for entry in entries {
            let k = self.key.read_from_parent(entry)?;
            let v = self.value.read_from_parent(entry)?;
            map.insert(k, v);
        }
        Ok(Value::Map(map))
    }

    fn write_binary(&self, out: &mut dyn Write, value: &Value) -> Result<()> {
        let map = self.entries(value)?;
        write_counted(out, map.len(), map, |out, (k, v)| {
            write_slot(out, self.key.as_ref(), k)?;
            write_slot(out, self.value.as_ref(), v)
        })
    }

    fn read_binary(&self, input: &mut dyn Read) -> Result<Value> {
        let count = binary::read_count(input)?;
        let entries = self.iterable.read_chunked(input, count, |input| {
            let k = read_slot(input, self.key.as_ref())?;
            let v = read_slot(input, self.value.as_ref())?;
            Ok((k, v))
        })?;
        Ok(Value::Map(entries.into_iter().collect()))
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
        let mut copy = ValueMap::new();
        for (k, v) in self.entries(value)? {
            copy.insert(self.key.clone_value(k)?, self.value.clone_value(v)?);
        }
        Ok(Value::Map(copy))
    }

    fn hash_value(&self, value: &Value) -> u64 {
        match value {
            Value::Map(map) => map.iter().fold(0u64, |acc, (k, v)| {
                acc ^ (self.key.hash_value(k) ^ self.value.hash_value(v).rotate_left(1))
            }),
            other => hash_of(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CodecOptions, Registry};

    fn index() -> PropertyDescription {
        PropertyDescription::new("index", "map")
            .with_element_tag("entry")
            .with_key(PropertyDescription::new("", "string"))
            .with_value(PropertyDescription::new("", "int"))
    }

    fn adapter(desc: PropertyDescription) -> Result<MapAdapter> {
        let registry = Registry::new(CodecOptions::new());
        MapAdapter::new(&registry, PropertyBinding::new("index", "map"), &desc)
    }

    fn sample() -> Value {
        let mut map = ValueMap::new();
        map.insert(Value::from("a"), Value::Int(1));
        map.insert(Value::Null, Value::Int(2));
        map.insert(Value::from("c"), Value::Null);
        Value::Map(map)
    }

    #[test]
    fn test_tree_round_trip_with_null_key_and_value() {
        let adapter = adapter(index()).unwrap();
        let node = adapter.to_tree(&sample()).unwrap();
        assert_eq!(node.children().len(), 3);
        assert!(node.children()[1].first_matching("key", None).is_none());
        assert!(node.children()[2].first_matching("value", None).is_none());
        assert_eq!(adapter.from_tree(&node).unwrap(), sample());
    }

    #[test]
    fn test_binary_and_token_round_trip() {
        let adapter = adapter(index()).unwrap();
        let mut buf = Vec::new();
        adapter.write_binary(&mut buf, &sample()).unwrap();
        assert_eq!(adapter.read_binary(&mut buf.as_slice()).unwrap(), sample());

        let token = adapter.to_token(&sample()).unwrap();
        assert_eq!(adapter.from_token(&token).unwrap(), sample());
    }

    #[test]
    fn test_truncated_payload() {
        let adapter = adapter(index()).unwrap();
        let mut buf = Vec::new();
        adapter.write_binary(&mut buf, &sample()).unwrap();
        buf.truncate(buf.len() - 3);
        let err = adapter.read_binary(&mut buf.as_slice()).unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn test_missing_key_or_value() {
        let mut no_key = index();
        no_key.key = None;
        assert!(adapter(no_key).unwrap_err().is_configuration());

        let mut no_value = index();
        no_value.value = None;
        assert!(adapter(no_value).unwrap_err().is_configuration());
    }

    #[test]
    fn test_equality_and_hash_ignore_order() {
        let adapter = adapter(index()).unwrap();
        let reversed: ValueMap = sample().as_map().unwrap().clone().into_iter().rev().collect();
        let reversed = Value::Map(reversed);
        assert!(adapter.equals_value(&sample(), &reversed));
        assert_eq!(adapter.hash_value(&sample()), adapter.hash_value(&reversed));
    }
}
