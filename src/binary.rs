//! Primitive readers and writers for the binary stream.
//!
//! All multi-byte quantities are big-endian. Counts and lengths are `i32` on the wire;
//! a negative value read back is a [`Error::Format`](crate::Error::Format).
//! Length-prefixed payloads are read through [`Read::take`] so that a corrupt length
//! never causes an allocation larger than the data actually present.

use crate::{Error, Result};
use std::io::{Read, Write};

pub fn write_bool(out: &mut dyn Write, value: bool) -> Result<()> {
    out.write_all(&[u8::from(value)])?;
    Ok(())
}

/// Reads one byte; any non-zero byte is `true`.
pub fn read_bool(input: &mut dyn Read) -> Result<bool> {
    let mut buf = [0u8; 1];
    input.read_exact(&mut buf)?;
    Ok(buf[0] != 0)
}

pub fn write_i8(out: &mut dyn Write, value: i8) -> Result<()> {
    out.write_all(&value.to_be_bytes())?;
    Ok(())
}

pub fn read_i8(input: &mut dyn Read) -> Result<i8> {
    let mut buf = [0u8; 1];
    input.read_exact(&mut buf)?;
    Ok(i8::from_be_bytes(buf))
}

pub fn write_i16(out: &mut dyn Write, value: i16) -> Result<()> {
    out.write_all(&value.to_be_bytes())?;
    Ok(())
}

pub fn read_i16(input: &mut dyn Read) -> Result<i16> {
    let mut buf = [0u8; 2];
    input.read_exact(&mut buf)?;
    Ok(i16::from_be_bytes(buf))
}

/// Writes a character as its `i32` code point.
pub fn write_char(out: &mut dyn Write, value: char) -> Result<()> {
    write_i32(out, value as i32)
}

pub fn read_char(input: &mut dyn Read) -> Result<char> {
    let code = read_i32(input)?;
    u32::try_from(code)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| Error::format(format!("illegal code point {}", code)))
}

pub fn write_i32(out: &mut dyn Write, value: i32) -> Result<()> {
    out.write_all(&value.to_be_bytes())?;
    Ok(())
}

pub fn read_i32(input: &mut dyn Read) -> Result<i32> {
    let mut buf = [0u8; 4];
    input.read_exact(&mut buf)?;
    Ok(i32::from_be_bytes(buf))
}

pub fn write_i64(out: &mut dyn Write, value: i64) -> Result<()> {
    out.write_all(&value.to_be_bytes())?;
    Ok(())
}

pub fn read_i64(input: &mut dyn Read) -> Result<i64> {
    let mut buf = [0u8; 8];
    input.read_exact(&mut buf)?;
    Ok(i64::from_be_bytes(buf))
}

pub fn write_f32(out: &mut dyn Write, value: f32) -> Result<()> {
    write_i32(out, value.to_bits() as i32)
}

pub fn read_f32(input: &mut dyn Read) -> Result<f32> {
    Ok(f32::from_bits(read_i32(input)? as u32))
}

pub fn write_f64(out: &mut dyn Write, value: f64) -> Result<()> {
    write_i64(out, value.to_bits() as i64)
}

pub fn read_f64(input: &mut dyn Read) -> Result<f64> {
    Ok(f64::from_bits(read_i64(input)? as u64))
}

/// Writes a count or length prefix.
pub fn write_count(out: &mut dyn Write, count: usize) -> Result<()> {
    let count = i32::try_from(count)
        .map_err(|_| Error::format(format!("count {} exceeds the binary limit", count)))?;
    write_i32(out, count)
}

/// Reads a count or length prefix, rejecting negative values.
pub fn read_count(input: &mut dyn Read) -> Result<usize> {
    let count = read_i32(input)?;
    usize::try_from(count).map_err(|_| Error::format(format!("negative count {}", count)))
}

pub fn write_bytes(out: &mut dyn Write, bytes: &[u8]) -> Result<()> {
    write_count(out, bytes.len())?;
    out.write_all(bytes)?;
    Ok(())
}

pub fn read_bytes(input: &mut dyn Read) -> Result<Vec<u8>> {
    let len = read_count(input)?;
    let mut buf = Vec::new();
    let read = Read::take(&mut *input, len as u64).read_to_end(&mut buf)?;
    if read != len {
        return Err(Error::format(format!(
            "truncated payload: expected {} bytes, read {}",
            len, read
        )));
    }
    Ok(buf)
}

pub fn write_string(out: &mut dyn Write, value: &str) -> Result<()> {
    write_bytes(out, value.as_bytes())
}

pub fn read_string(input: &mut dyn Read) -> Result<String> {
    String::from_utf8(read_bytes(input)?)
        .map_err(|e| Error::format(format!("invalid UTF-8 in string payload: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_big_endian_layout() {
        let mut out = Vec::new();
        write_i32(&mut out, 3).unwrap();
        write_bool(&mut out, true).unwrap();
        assert_eq!(out, vec![0, 0, 0, 3, 1]);
    }

    #[test]
    fn test_negative_count_rejected() {
        let data = (-1i32).to_be_bytes();
        let err = read_count(&mut &data[..]).unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn test_huge_length_does_not_allocate() {
        let mut data = i32::MAX.to_be_bytes().to_vec();
        data.extend_from_slice(b"abc");
        let err = read_bytes(&mut &data[..]).unwrap_err();
        assert!(err.is_format());
        assert!(err.to_string().contains("read 3"));
    }

    #[test]
    fn test_string_round_trip() {
        let mut out = Vec::new();
        write_string(&mut out, "héllo").unwrap();
        assert_eq!(read_string(&mut &out[..]).unwrap(), "héllo");
    }

    #[test]
    fn test_narrow_widths() {
        let mut out = Vec::new();
        write_i8(&mut out, -2).unwrap();
        write_i16(&mut out, 0x0102).unwrap();
        write_char(&mut out, 'é').unwrap();
        assert_eq!(out, vec![0xfe, 1, 2, 0, 0, 0, 0xe9]);

        let mut input = out.as_slice();
        assert_eq!(read_i8(&mut input).unwrap(), -2);
        assert_eq!(read_i16(&mut input).unwrap(), 0x0102);
        assert_eq!(read_char(&mut input).unwrap(), 'é');
    }

    #[test]
    fn test_surrogate_code_point_rejected() {
        let data = 0xD800i32.to_be_bytes();
        assert!(read_char(&mut &data[..]).unwrap_err().is_format());
    }

    #[test]
    fn test_eof_is_format_error() {
        let err = read_i64(&mut &[0u8, 1][..]).unwrap_err();
        assert!(err.is_format());
    }
}
