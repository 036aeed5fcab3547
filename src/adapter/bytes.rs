use super::PropertyAdapter;
use crate::binary;
use crate::token;
use crate::{Element, Error, PropertyBinding, Result, Value};
use std::io::{Read, Write};

/// Adapter for raw byte buffers.
///
/// Tree content is the base64 text of the buffer, binary is length-prefixed and the token
/// is URL-safe base64.
#[derive(Debug)]
pub struct BytesAdapter {
    binding: PropertyBinding,
}

impl BytesAdapter {
    pub fn new(binding: PropertyBinding) -> Self {
        BytesAdapter { binding }
    }

    fn bytes<'v>(&self, value: &'v Value) -> Result<&'v [u8]> {
        value
            .as_bytes()
            .ok_or_else(|| Error::type_mismatch("bytes", value.kind_name()))
    }
}

impl PropertyAdapter for BytesAdapter {
    fn binding(&self) -> &PropertyBinding {
        &self.binding
    }

    fn adapter_name(&self) -> &'static str {
        "bytes"
    }

    fn is_clone_required(&self) -> bool {
        true
    }

    fn deep_copy(&self, value: &Value) -> Option<Result<Value>> {
        Some(self.bytes(value).map(|b| Value::Bytes(b.to_vec())))
    }

    fn to_tree(&self, value: &Value) -> Result<Element> {
        let mut element = self
            .binding
            .new_element(self.binding.tag().unwrap_or_default());
        element.set_content(Value::String(token::encode_base64(self.bytes(value)?)));
        Ok(element)
    }

    fn from_tree(&self, node: &Element) -> Result<Value> {
        match node.content() {
            None => Ok(Value::Bytes(Vec::new())),
            Some(Value::Bytes(b)) => Ok(Value::Bytes(b.clone())),
            Some(Value::String(s)) => Ok(Value::Bytes(token::decode_base64(s.trim())?)),
            Some(other) => Err(Error::type_mismatch("bytes", other.kind_name())),
        }
    }

    fn write_binary(&self, out: &mut dyn Write, value: &Value) -> Result<()> {
        binary::write_bytes(out, self.bytes(value)?)
    }

    fn read_binary(&self, input: &mut dyn Read) -> Result<Value> {
        Ok(Value::Bytes(binary::read_bytes(input)?))
    }

    fn to_token(&self, value: &Value) -> Result<String> {
        Ok(token::encode_base64(self.bytes(value)?))
    }

    fn from_token(&self, token: &str) -> Result<Value> {
        Ok(Value::Bytes(token::decode_base64(token)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trips() {
        let adapter = BytesAdapter::new(PropertyBinding::new("blob", "bytes"));
        let value = Value::Bytes(vec![0, 1, 2, 250, 255]);

        let node = adapter.to_tree(&value).unwrap();
        assert!(matches!(node.content(), Some(Value::String(_))));
        assert_eq!(adapter.from_tree(&node).unwrap(), value);

        let mut buf = Vec::new();
        adapter.write_binary(&mut buf, &value).unwrap();
        assert_eq!(&buf[..4], &[0, 0, 0, 5]);
        assert_eq!(adapter.read_binary(&mut buf.as_slice()).unwrap(), value);

        let token = adapter.to_token(&value).unwrap();
        assert_eq!(adapter.from_token(&token).unwrap(), value);
        assert_eq!(adapter.clone_value(&value).unwrap(), value);
    }

    #[test]
    fn test_rejects_other_values() {
        let adapter = BytesAdapter::new(PropertyBinding::new("blob", "bytes"));
        assert!(matches!(
            adapter.to_token(&Value::from("abc")).unwrap_err(),
            Error::TypeMismatch { .. }
        ));
    }
}
