//! Adapters for single scalar values.

use super::PropertyAdapter;
use crate::binary;
use crate::token;
use crate::{Decimal, Element, Error, PropertyBinding, Result, Value};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use num_bigint::BigInt;
use std::io::{Read, Write};
use std::str::FromStr;
use tracing::warn;

/// The scalar kinds with built-in adapters, named by their type tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
    BigInt,
    Decimal,
    String,
    Date,
    Time,
    Timestamp,
}

impl ScalarKind {
    pub const ALL: [ScalarKind; 14] = [
        ScalarKind::Boolean,
        ScalarKind::Byte,
        ScalarKind::Short,
        ScalarKind::Char,
        ScalarKind::Int,
        ScalarKind::Long,
        ScalarKind::Float,
        ScalarKind::Double,
        ScalarKind::BigInt,
        ScalarKind::Decimal,
        ScalarKind::String,
        ScalarKind::Date,
        ScalarKind::Time,
        ScalarKind::Timestamp,
    ];

    #[must_use]
    pub const fn type_tag(self) -> &'static str {
        match self {
            ScalarKind::Boolean => "boolean",
            ScalarKind::Byte => "byte",
            ScalarKind::Short => "short",
            ScalarKind::Char => "char",
            ScalarKind::Int => "int",
            ScalarKind::Long => "long",
            ScalarKind::Float => "float",
            ScalarKind::Double => "double",
            ScalarKind::BigInt => "bigint",
            ScalarKind::Decimal => "decimal",
            ScalarKind::String => "string",
            ScalarKind::Date => "date",
            ScalarKind::Time => "time",
            ScalarKind::Timestamp => "timestamp",
        }
    }

    #[must_use]
    pub fn from_type_tag(tag: &str) -> Option<ScalarKind> {
        Self::ALL.into_iter().find(|k| k.type_tag() == tag)
    }
}

/// 1970-01-01T00:00:00
fn epoch() -> NaiveDateTime {
    NaiveDateTime::default()
}

fn read_date(input: &mut dyn Read) -> Result<NaiveDate> {
    let days = binary::read_i32(input)?;
    NaiveDate::from_num_days_from_ce_opt(days)
        .ok_or_else(|| Error::format(format!("illegal date: day {}", days)))
}

fn read_time(input: &mut dyn Read) -> Result<NaiveTime> {
    let secs = binary::read_i32(input)?;
    let nanos = binary::read_i32(input)?;
    u32::try_from(secs)
        .ok()
        .zip(u32::try_from(nanos).ok())
        .and_then(|(s, n)| NaiveTime::from_num_seconds_from_midnight_opt(s, n))
        .ok_or_else(|| Error::format(format!("illegal time {}s {}ns", secs, nanos)))
}

/// A character given as its code point, or as a one-character string.
fn parse_char(text: &str) -> Option<char> {
    if let Ok(code) = text.trim().parse::<u32>() {
        return char::from_u32(code);
    }
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

fn narrow<T, S>(kind: ScalarKind, value: S) -> Result<T>
where
    T: TryFrom<S>,
    S: Copy + std::fmt::Display,
{
    T::try_from(value).map_err(|_| parse_err(kind, &value.to_string(), "out of range"))
}

fn parse_err<E: std::fmt::Display>(kind: ScalarKind, text: &str, e: E) -> Error {
    Error::format(format!("illegal {} value '{}': {}", kind.type_tag(), text, e))
}

/// Parses up to nine fraction digits into nanoseconds.
fn parse_fraction(digits: &str) -> Option<u32> {
    if digits.is_empty() || digits.len() > 9 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let padded = format!("{:0<9}", digits);
    padded.parse().ok()
}

fn format_fraction(nanos: u32) -> String {
    if nanos == 0 {
        String::new()
    } else {
        format!("{:09}", nanos).trim_end_matches('0').to_string()
    }
}

/// Adapter for boolean, numeric, character, string and date/time properties.
///
/// Tree content is the value itself. String content, as produced by a text parser, is
/// coerced into the adapter's kind; date and time strings that cannot be parsed decode to
/// the epoch with a warning instead of failing.
#[derive(Debug)]
pub struct ScalarAdapter {
    binding: PropertyBinding,
    kind: ScalarKind,
}

impl ScalarAdapter {
    pub fn new(binding: PropertyBinding, kind: ScalarKind) -> Self {
        ScalarAdapter { binding, kind }
    }

    #[must_use]
    pub fn kind(&self) -> ScalarKind {
        self.kind
    }

    fn mismatch(&self, value: &Value) -> Error {
        Error::type_mismatch(self.kind.type_tag(), value.kind_name())
    }

    /// Converts `value` into this adapter's kind.
    pub(crate) fn coerce(&self, value: &Value) -> Result<Value> {
        let kind = self.kind;
        if let Some(n) = value.as_i64() {
            let widened = match kind {
                ScalarKind::Byte => Some(Value::Byte(narrow(kind, n)?)),
                ScalarKind::Short => Some(Value::Short(narrow(kind, n)?)),
                ScalarKind::Int => Some(Value::Int(narrow(kind, n)?)),
                ScalarKind::Long => Some(Value::Long(n)),
                ScalarKind::BigInt => Some(Value::BigInt(BigInt::from(n))),
                ScalarKind::Char => Some(Value::Char(
                    u32::try_from(n)
                        .ok()
                        .and_then(char::from_u32)
                        .ok_or_else(|| parse_err(kind, &n.to_string(), "not a code point"))?,
                )),
                _ => None,
            };
            if let Some(widened) = widened {
                return Ok(widened);
            }
        }
        let coerced = match (kind, value) {
            (_, Value::String(s)) if kind != ScalarKind::String => self.parse_text(s)?,
            (ScalarKind::Boolean, Value::Bool(_))
            | (ScalarKind::Byte, Value::Byte(_))
            | (ScalarKind::Short, Value::Short(_))
            | (ScalarKind::Char, Value::Char(_))
            | (ScalarKind::Int, Value::Int(_))
            | (ScalarKind::Long, Value::Long(_))
            | (ScalarKind::Float, Value::Float(_))
            | (ScalarKind::Double, Value::Double(_))
            | (ScalarKind::BigInt, Value::BigInt(_))
            | (ScalarKind::Decimal, Value::Decimal(_))
            | (ScalarKind::String, Value::String(_))
            | (ScalarKind::Date, Value::Date(_))
            | (ScalarKind::Time, Value::Time(_))
            | (ScalarKind::Timestamp, Value::Timestamp(_)) => value.clone(),
            (ScalarKind::Double, Value::Int(i)) => Value::Double(f64::from(*i)),
            (ScalarKind::Double, Value::Float(f)) => Value::Double(f64::from(*f)),
            (ScalarKind::Float, Value::Double(d)) => Value::Float(*d as f32),
            (ScalarKind::Decimal, Value::BigInt(n)) => Value::Decimal(Decimal::new(n.clone(), 0)),
            (ScalarKind::Decimal, Value::Int(i)) => {
                Value::Decimal(Decimal::new(BigInt::from(*i), 0))
            }
            (ScalarKind::Decimal, Value::Long(l)) => {
                Value::Decimal(Decimal::new(BigInt::from(*l), 0))
            }
            (ScalarKind::Date, Value::Timestamp(ts)) => Value::Date(ts.date()),
            _ => return Err(self.mismatch(value)),
        };
        Ok(coerced)
    }

    /// Parses tree text content.
    fn parse_text(&self, text: &str) -> Result<Value> {
        let kind = self.kind;
        let trimmed = text.trim();
        let value = match kind {
            ScalarKind::Boolean => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Value::Bool(true),
                "false" | "0" | "no" => Value::Bool(false),
                _ => return Err(parse_err(kind, text, "expected true or false")),
            },
            ScalarKind::Byte => Value::Byte(trimmed.parse().map_err(|e| parse_err(kind, text, e))?),
            ScalarKind::Short => {
                Value::Short(trimmed.parse().map_err(|e| parse_err(kind, text, e))?)
            }
            ScalarKind::Char => Value::Char(
                parse_char(text).ok_or_else(|| parse_err(kind, text, "expected one character"))?,
            ),
            ScalarKind::Int => Value::Int(trimmed.parse().map_err(|e| parse_err(kind, text, e))?),
            ScalarKind::Float => {
                Value::Float(trimmed.parse().map_err(|e| parse_err(kind, text, e))?)
            }
            ScalarKind::BigInt => {
                Value::BigInt(BigInt::from_str(trimmed).map_err(|e| parse_err(kind, text, e))?)
            }
            ScalarKind::Long => {
                Value::Long(trimmed.parse().map_err(|e| parse_err(kind, text, e))?)
            }
            ScalarKind::Double => {
                Value::Double(trimmed.parse().map_err(|e| parse_err(kind, text, e))?)
            }
            ScalarKind::Decimal => Value::Decimal(Decimal::from_str(trimmed)?),
            ScalarKind::String => Value::String(text.to_string()),
            ScalarKind::Date => Value::Date(
                NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                    .unwrap_or_else(|e| self.fallback(text, e).date()),
            ),
            ScalarKind::Time => Value::Time(
                NaiveTime::parse_from_str(trimmed, "%H:%M:%S%.f")
                    .unwrap_or_else(|e| self.fallback(text, e).time()),
            ),
            ScalarKind::Timestamp => Value::Timestamp(
                NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
                    .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f"))
                    .unwrap_or_else(|e| self.fallback(text, e)),
            ),
        };
        Ok(value)
    }

    fn fallback<E: std::fmt::Display>(&self, text: &str, e: E) -> NaiveDateTime {
        warn!(
            property = self.binding.name(),
            kind = self.kind.type_tag(),
            content = text,
            error = %e,
            "unparsable content, decoding to the epoch"
        );
        epoch()
    }

    fn parse_token_date(&self, token: &str) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(token, "%Y%m%d").map_err(|e| parse_err(self.kind, token, e))
    }

    fn parse_token_time(&self, token: &str) -> Result<NaiveTime> {
        if !token.is_ascii() {
            return Err(parse_err(self.kind, token, "expected hhmmss[fffffffff]"));
        }
        let (hms, fraction) = token.split_at(token.len().min(6));
        let nanos = if fraction.is_empty() {
            0
        } else {
            parse_fraction(fraction)
                .ok_or_else(|| parse_err(self.kind, token, "bad fraction of a second"))?
        };
        let time = NaiveTime::parse_from_str(hms, "%H%M%S")
            .map_err(|e| parse_err(self.kind, token, e))?;
        time.with_nanosecond(nanos)
            .ok_or_else(|| parse_err(self.kind, token, "nanoseconds out of range"))
    }
}

impl PropertyAdapter for ScalarAdapter {
    fn binding(&self) -> &PropertyBinding {
        &self.binding
    }

    fn adapter_name(&self) -> &'static str {
        self.kind.type_tag()
    }

    fn to_tree(&self, value: &Value) -> Result<Element> {
        let mut element = self
            .binding
            .new_element(self.binding.tag().unwrap_or_default());
        if !value.is_null() {
            element.set_content(self.coerce(value)?);
        }
        Ok(element)
    }

    fn from_tree(&self, node: &Element) -> Result<Value> {
        match node.content() {
            Some(content) => self.coerce(content),
            None if self.kind == ScalarKind::String => Ok(Value::String(String::new())),
            None => Ok(Value::Null),
        }
    }

    fn write_binary(&self, out: &mut dyn Write, value: &Value) -> Result<()> {
        match self.coerce(value)? {
            Value::Bool(b) => binary::write_bool(out, b),
            Value::Byte(b) => binary::write_i8(out, b),
            Value::Short(s) => binary::write_i16(out, s),
            Value::Char(c) => binary::write_char(out, c),
            Value::Int(i) => binary::write_i32(out, i),
            Value::Long(l) => binary::write_i64(out, l),
            Value::Float(f) => binary::write_f32(out, f),
            Value::Double(d) => binary::write_f64(out, d),
            Value::BigInt(n) => binary::write_bytes(out, &n.to_signed_bytes_be()),
            Value::Decimal(d) => {
                binary::write_i32(out, d.scale())?;
                binary::write_bytes(out, &d.unscaled().to_signed_bytes_be())
            }
            Value::String(s) => binary::write_string(out, &s),
            Value::Date(d) => binary::write_i32(out, d.num_days_from_ce()),
            Value::Time(t) => {
                binary::write_i32(out, t.num_seconds_from_midnight() as i32)?;
                binary::write_i32(out, t.nanosecond() as i32)
            }
            Value::Timestamp(ts) => {
                binary::write_i32(out, ts.date().num_days_from_ce())?;
                binary::write_i32(out, ts.time().num_seconds_from_midnight() as i32)?;
                binary::write_i32(out, ts.time().nanosecond() as i32)
            }
            other => Err(self.mismatch(&other)),
        }
    }

    fn read_binary(&self, input: &mut dyn Read) -> Result<Value> {
        let value = match self.kind {
            ScalarKind::Boolean => Value::Bool(binary::read_bool(input)?),
            ScalarKind::Byte => Value::Byte(binary::read_i8(input)?),
            ScalarKind::Short => Value::Short(binary::read_i16(input)?),
            ScalarKind::Char => Value::Char(binary::read_char(input)?),
            ScalarKind::Int => Value::Int(binary::read_i32(input)?),
            ScalarKind::Long => Value::Long(binary::read_i64(input)?),
            ScalarKind::Float => Value::Float(binary::read_f32(input)?),
            ScalarKind::Double => Value::Double(binary::read_f64(input)?),
            ScalarKind::BigInt => {
                Value::BigInt(BigInt::from_signed_bytes_be(&binary::read_bytes(input)?))
            }
            ScalarKind::Decimal => {
                let scale = binary::read_i32(input)?;
                let unscaled = BigInt::from_signed_bytes_be(&binary::read_bytes(input)?);
                Value::Decimal(Decimal::new(unscaled, scale))
            }
            ScalarKind::String => Value::String(binary::read_string(input)?),
            ScalarKind::Date => Value::Date(read_date(input)?),
            ScalarKind::Time => Value::Time(read_time(input)?),
            ScalarKind::Timestamp => {
                let date = read_date(input)?;
                Value::Timestamp(date.and_time(read_time(input)?))
            }
        };
        Ok(value)
    }

    fn to_token(&self, value: &Value) -> Result<String> {
        let token = match self.coerce(value)? {
            Value::Bool(b) => b.to_string(),
            Value::Byte(b) => token::format_number(&b.to_string()),
            Value::Short(s) => token::format_number(&s.to_string()),
            Value::Char(c) => token::encode_string(&c.to_string()),
            Value::Int(i) => token::format_number(&i.to_string()),
            Value::Long(l) => token::format_number(&l.to_string()),
            Value::BigInt(n) => token::format_number(&n.to_string()),
            Value::Float(f) => token::format_number(&(f.to_bits() as i32).to_string()),
            // the bit pattern, so that every double survives exactly
            Value::Double(d) => token::format_number(&(d.to_bits() as i64).to_string()),
            Value::Decimal(d) => format!(
                "{}*{}",
                token::format_number(&d.unscaled().to_string()),
                token::format_number(&d.scale().to_string())
            ),
            Value::String(s) => token::encode_string(&s),
            Value::Date(d) => d.format("%Y%m%d").to_string(),
            Value::Time(t) => format!("{}{}", t.format("%H%M%S"), format_fraction(t.nanosecond())),
            Value::Timestamp(ts) => format!(
                "{}{}",
                ts.format("%Y%m%d%H%M%S"),
                format_fraction(ts.time().nanosecond())
            ),
            other => return Err(self.mismatch(&other)),
        };
        Ok(token)
    }

    fn from_token(&self, token: &str) -> Result<Value> {
        let kind = self.kind;
        let value = match kind {
            ScalarKind::Boolean => match token {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => return Err(parse_err(kind, token, "expected true or false")),
            },
            ScalarKind::Byte => Value::Byte(
                token::parse_number(token)
                    .parse()
                    .map_err(|e| parse_err(kind, token, e))?,
            ),
            ScalarKind::Short => Value::Short(
                token::parse_number(token)
                    .parse()
                    .map_err(|e| parse_err(kind, token, e))?,
            ),
            ScalarKind::Char => {
                let text = token::decode_string(token)?;
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Value::Char(c),
                    _ => return Err(parse_err(kind, token, "expected one character")),
                }
            }
            ScalarKind::Int => Value::Int(
                token::parse_number(token)
                    .parse()
                    .map_err(|e| parse_err(kind, token, e))?,
            ),
            ScalarKind::Float => {
                let bits: i32 = token::parse_number(token)
                    .parse()
                    .map_err(|e| parse_err(kind, token, e))?;
                Value::Float(f32::from_bits(bits as u32))
            }
            ScalarKind::BigInt => Value::BigInt(
                BigInt::from_str(&token::parse_number(token))
                    .map_err(|e| parse_err(kind, token, e))?,
            ),
            ScalarKind::Long => Value::Long(
                token::parse_number(token)
                    .parse()
                    .map_err(|e| parse_err(kind, token, e))?,
            ),
            ScalarKind::Double => {
                let bits: i64 = token::parse_number(token)
                    .parse()
                    .map_err(|e| parse_err(kind, token, e))?;
                Value::Double(f64::from_bits(bits as u64))
            }
            ScalarKind::Decimal => {
                let (unscaled, scale) = token
                    .split_once('*')
                    .ok_or_else(|| parse_err(kind, token, "expected unscaled*scale"))?;
                let unscaled = BigInt::from_str(&token::parse_number(unscaled))
                    .map_err(|e| parse_err(kind, token, e))?;
                let scale = token::parse_number(scale)
                    .parse()
                    .map_err(|e| parse_err(kind, token, e))?;
                Value::Decimal(Decimal::new(unscaled, scale))
            }
            ScalarKind::String => Value::String(token::decode_string(token)?),
            ScalarKind::Date => Value::Date(self.parse_token_date(token)?),
            ScalarKind::Time => Value::Time(self.parse_token_time(token)?),
            ScalarKind::Timestamp => {
                if token.len() < 14 || !token.is_char_boundary(8) {
                    return Err(parse_err(kind, token, "expected yyyymmddhhmmss[fffffffff]"));
                }
                let (date, time) = token.split_at(8);
                Value::Timestamp(
                    self.parse_token_date(date)?
                        .and_time(self.parse_token_time(time)?),
                )
            }
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter(kind: ScalarKind) -> ScalarAdapter {
        ScalarAdapter::new(PropertyBinding::new("p", kind.type_tag()), kind)
    }

    fn samples() -> Vec<(ScalarKind, Value)> {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let time = NaiveTime::from_hms_nano_opt(23, 59, 58, 120_000_000).unwrap();
        vec![
            (ScalarKind::Boolean, Value::Bool(true)),
            (ScalarKind::Byte, Value::Byte(-128)),
            (ScalarKind::Short, Value::Short(-300)),
            (ScalarKind::Char, Value::Char('%')),
            (ScalarKind::Char, Value::Char('\u{1F600}')),
            (ScalarKind::Int, Value::Int(i32::MIN)),
            (ScalarKind::Float, Value::Float(-1.25)),
            (ScalarKind::Float, Value::Float(f32::NAN)),
            (ScalarKind::BigInt, Value::BigInt(-BigInt::from(u64::MAX) * BigInt::from(3))),
            (ScalarKind::Long, Value::Long(-42)),
            (ScalarKind::Double, Value::Double(-0.5)),
            (ScalarKind::Double, Value::Double(-0.0)),
            (ScalarKind::Decimal, Value::Decimal("-123.4500".parse().unwrap())),
            (ScalarKind::String, Value::from("use (u) & 100%")),
            (ScalarKind::Date, Value::Date(date)),
            (ScalarKind::Time, Value::Time(time)),
            (ScalarKind::Timestamp, Value::Timestamp(date.and_time(time))),
        ]
    }

    #[test]
    fn test_every_format_round_trips() {
        for (kind, value) in samples() {
            let a = adapter(kind);

            let node = a.to_tree(&value).unwrap();
            assert_eq!(a.from_tree(&node).unwrap(), value, "tree {:?}", kind);

            let mut buf = Vec::new();
            a.write_binary(&mut buf, &value).unwrap();
            assert_eq!(a.read_binary(&mut buf.as_slice()).unwrap(), value, "binary {:?}", kind);

            let token = a.to_token(&value).unwrap();
            assert!(!token.contains(' '), "token {:?}", token);
            assert_eq!(a.from_token(&token).unwrap(), value, "token {:?}", kind);
        }
    }

    #[test]
    fn test_tokens() {
        assert_eq!(adapter(ScalarKind::Int).to_token(&Value::Int(-12)).unwrap(), "(12)");
        assert_eq!(adapter(ScalarKind::Boolean).to_token(&Value::Bool(false)).unwrap(), "false");
        assert_eq!(
            adapter(ScalarKind::Decimal)
                .to_token(&Value::Decimal("-1.50".parse().unwrap()))
                .unwrap(),
            "(150)*2"
        );
        let date = NaiveDate::from_ymd_opt(2001, 3, 18).unwrap();
        let ts = date.and_hms_opt(7, 8, 9).unwrap();
        assert_eq!(adapter(ScalarKind::Date).to_token(&Value::Date(date)).unwrap(), "20010318");
        assert_eq!(
            adapter(ScalarKind::Timestamp).to_token(&Value::Timestamp(ts)).unwrap(),
            "20010318070809"
        );
    }

    #[test]
    fn test_text_content_is_coerced() {
        let node = |text: &str| {
            let mut e = Element::new("p");
            e.set_content(Value::from(text));
            e
        };
        assert_eq!(adapter(ScalarKind::Int).from_tree(&node(" 17 ")).unwrap(), Value::Int(17));
        assert_eq!(adapter(ScalarKind::Boolean).from_tree(&node("yes")).unwrap(), Value::Bool(true));
        assert!(adapter(ScalarKind::Int).from_tree(&node("x")).unwrap_err().is_format());
    }

    #[test]
    fn test_unparsable_date_falls_back_to_epoch() {
        let mut e = Element::new("p");
        e.set_content(Value::from("not a date"));
        assert_eq!(
            adapter(ScalarKind::Date).from_tree(&e).unwrap(),
            Value::Date(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap())
        );
        assert_eq!(
            adapter(ScalarKind::Timestamp).from_tree(&e).unwrap(),
            Value::Timestamp(epoch())
        );
    }

    #[test]
    fn test_type_mismatch() {
        let err = adapter(ScalarKind::Int).to_tree(&Value::Bool(true)).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[test]
    fn test_empty_string_content() {
        let a = adapter(ScalarKind::String);
        assert_eq!(a.from_tree(&Element::new("p")).unwrap(), Value::from(""));
        assert_eq!(adapter(ScalarKind::Int).from_tree(&Element::new("p")).unwrap(), Value::Null);
    }

    #[test]
    fn test_narrow_kinds_coerce_and_check_range() {
        assert_eq!(adapter(ScalarKind::Byte).to_token(&Value::Int(-7)).unwrap(), "(7)");
        assert!(adapter(ScalarKind::Byte)
            .to_tree(&Value::Int(300))
            .unwrap_err()
            .is_format());
        assert_eq!(
            adapter(ScalarKind::Long).to_token(&Value::Short(12)).unwrap(),
            "12"
        );

        let mut e = Element::new("p");
        e.set_content(Value::from("65"));
        assert_eq!(adapter(ScalarKind::Char).from_tree(&e).unwrap(), Value::Char('A'));
        e.set_content(Value::from("z"));
        assert_eq!(adapter(ScalarKind::Char).from_tree(&e).unwrap(), Value::Char('z'));
        e.set_content(Value::from("123456789012345678901234567890"));
        assert_eq!(
            adapter(ScalarKind::BigInt).from_tree(&e).unwrap(),
            Value::BigInt("123456789012345678901234567890".parse().unwrap())
        );
    }

    #[test]
    fn test_bigint_token_uses_parentheses() {
        let n = Value::BigInt(BigInt::from(-42));
        assert_eq!(adapter(ScalarKind::BigInt).to_token(&n).unwrap(), "(42)");
        assert!(adapter(ScalarKind::Char).from_token("ab").unwrap_err().is_format());
    }

    #[test]
    fn test_bad_tokens() {
        assert!(adapter(ScalarKind::Int).from_token("12a").unwrap_err().is_format());
        assert!(adapter(ScalarKind::Decimal).from_token("12").unwrap_err().is_format());
        assert!(adapter(ScalarKind::Timestamp).from_token("2001").unwrap_err().is_format());
        assert!(adapter(ScalarKind::Time).from_token("250000").unwrap_err().is_format());
    }
}
