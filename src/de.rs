//! Conversion of [`Value`]s back into Rust data.
//!
//! [`ValueDeserializer`] drives any `Deserialize` type from a value:
//!
//! - records and maps deserialize as maps (record fields keyed by name)
//! - arrays and collections deserialize as sequences
//! - strings deserialize as unit enum variants
//! - decimals, dates, times and timestamps deserialize from their text form
//!
//! ```rust
//! use propcodec::{from_value, Record, Value};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Point { x: i32, y: i32 }
//!
//! let value = Value::Record(Record::new("Point").with("x", 1).with("y", 2));
//! let point: Point = from_value(value).unwrap();
//! assert_eq!(point, Point { x: 1, y: 2 });
//! ```

use crate::{Error, Result, Value};
use serde::de::{self, IntoDeserializer};
use serde::forward_to_deserialize_any;

struct SeqDeserializer {
    iter: std::vec::IntoIter<Value>,
}

impl SeqDeserializer {
    fn new(vec: Vec<Value>) -> Self {
        SeqDeserializer {
            iter: vec.into_iter(),
        }
    }
}

impl<'de> de::SeqAccess<'de> for SeqDeserializer {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct MapDeserializer {
    iter: std::vec::IntoIter<(Value, Value)>,
    value: Option<Value>,
}

impl MapDeserializer {
    fn new(entries: Vec<(Value, Value)>) -> Self {
        MapDeserializer {
            iter: entries.into_iter(),
            value: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for MapDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(ValueDeserializer::new(key)).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct UnitVariant;

impl<'de> de::VariantAccess<'de> for UnitVariant {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        Ok(())
    }

    fn newtype_variant_seed<T>(self, _seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        Err(Error::unsupported("serde", "newtype variants"))
    }

    fn tuple_variant<V>(self, _len: usize, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::unsupported("serde", "tuple variants"))
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::unsupported("serde", "struct variants"))
    }
}

struct EnumDeserializer {
    variant: String,
}

impl<'de> de::EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = UnitVariant;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let name: de::value::StringDeserializer<Error> = self.variant.into_deserializer();
        let variant = seed.deserialize(name)?;
        Ok((variant, UnitVariant))
    }
}

/// Deserializer reading from an owned [`Value`].
pub struct ValueDeserializer {
    value: Value,
}

impl ValueDeserializer {
    #[must_use]
    pub fn new(value: Value) -> Self {
        ValueDeserializer { value }
    }
}

impl<'de> de::Deserializer<'de> for ValueDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(b),
            Value::Byte(b) => visitor.visit_i8(b),
            Value::Short(s) => visitor.visit_i16(s),
            Value::Char(c) => visitor.visit_char(c),
            Value::Int(i) => visitor.visit_i32(i),
            Value::Long(l) => visitor.visit_i64(l),
            Value::Float(f) => visitor.visit_f32(f),
            Value::Double(d) => visitor.visit_f64(d),
            Value::BigInt(n) => match (i128::try_from(&n), u128::try_from(&n)) {
                (Ok(v), _) => visitor.visit_i128(v),
                (_, Ok(v)) => visitor.visit_u128(v),
                _ => visitor.visit_string(n.to_string()),
            },
            Value::String(s) => visitor.visit_string(s),
            Value::Bytes(b) => visitor.visit_byte_buf(b),
            value @ (Value::Decimal(_) | Value::Date(_) | Value::Time(_) | Value::Timestamp(_)) => {
                visitor.visit_string(value.to_string())
            }
            Value::Array(items) => visitor.visit_seq(SeqDeserializer::new(items)),
            Value::Collection(c) => visitor.visit_seq(SeqDeserializer::new(c.into_items())),
            Value::Map(map) => visitor.visit_map(MapDeserializer::new(map.into_iter().collect())),
            Value::Record(record) => visitor.visit_map(MapDeserializer::new(
                record
                    .into_fields()
                    .into_iter()
                    .map(|(k, v)| (Value::String(k), v))
                    .collect(),
            )),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_none(),
            value => visitor.visit_some(ValueDeserializer::new(value)),
        }
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            // Vec<u8> asks for a sequence of integers
            Value::Bytes(bytes) => visitor.visit_seq(SeqDeserializer::new(
                bytes.into_iter().map(|b| Value::Int(i32::from(b))).collect(),
            )),
            value => de::Deserializer::deserialize_any(ValueDeserializer::new(value), visitor),
        }
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::String(variant) => visitor.visit_enum(EnumDeserializer { variant }),
            other => Err(Error::type_mismatch(name, other.kind_name())),
        }
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct tuple
        tuple_struct map struct identifier ignored_any
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{from_value, to_value, Collection, Decimal, Record, ValueMap};
    use chrono::NaiveDate;
    use serde::{Deserialize, Serialize};
    use std::collections::HashMap;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    enum Level {
        Low,
        High,
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Sensor {
        id: i64,
        label: Option<String>,
        level: Level,
        readings: Vec<f64>,
        raw: Vec<u8>,
    }

    #[test]
    fn test_round_trip_through_value() {
        let sensor = Sensor {
            id: 3,
            label: None,
            level: Level::High,
            readings: vec![1.5, -2.0],
            raw: vec![0, 255],
        };
        let value = to_value(&sensor).unwrap();
        let back: Sensor = from_value(value).unwrap();
        assert_eq!(back, sensor);
    }

    #[test]
    fn test_bytes_value_into_vec() {
        let record = Record::new("Sensor")
            .with("id", 1i64)
            .with("level", "Low")
            .with("readings", Collection::list([Value::Int(4)]))
            .with("raw", vec![7u8]);
        let sensor: Sensor = from_value(Value::Record(record)).unwrap();
        assert_eq!(sensor.raw, vec![7]);
        assert_eq!(sensor.readings, vec![4.0]);
    }

    #[test]
    fn test_text_forms() {
        let amount: String = from_value(Value::Decimal("12.50".parse::<Decimal>().unwrap())).unwrap();
        assert_eq!(amount, "12.50");

        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let back: NaiveDate = from_value(Value::Date(date)).unwrap();
        assert_eq!(back, date);
    }

    #[test]
    fn test_map_with_non_string_keys() {
        let mut map = ValueMap::new();
        map.insert(Value::Int(1), Value::from("a"));
        let back: HashMap<i32, String> = from_value(Value::Map(map)).unwrap();
        assert_eq!(back.get(&1).map(String::as_str), Some("a"));
    }

    #[test]
    fn test_enum_needs_string() {
        let err = from_value::<Level>(Value::Int(1)).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }
}
