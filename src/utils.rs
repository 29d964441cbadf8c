//! Utility functions for raw value encoding and the text codecs.
//!
//! Raw side: UTF-16LE strings and fixed-width integers as the registry stores
//! them. Text side: the encodings used on the string boundary (lowercase hex,
//! unsigned decimal, `\0`-joined multi-strings) and `%VAR%` expansion.

use crate::error::{RegistryError, Result};
use crate::value::ValueType;
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use encoding_rs::UTF_16LE;

/// Literal two-character separator between multi-string elements in text form.
pub const MULTI_SZ_SEPARATOR: &str = "\\0";

/// Reads a UTF-16LE string from value bytes, trimming null terminators.
///
/// A trailing odd byte is ignored; registry writers occasionally leave one.
///
/// # Errors
///
/// Returns `RegistryError::CorruptValue` if the data is not valid UTF-16LE.
pub fn read_utf16_string(data: &[u8], vtype: ValueType) -> Result<String> {
    Ok(decode_utf16(data, vtype)?.trim_end_matches('\0').to_string())
}

/// Decodes UTF-16LE value bytes as-is, NUL characters included.
///
/// # Errors
///
/// Returns `RegistryError::CorruptValue` if the data is not valid UTF-16LE.
pub fn decode_utf16(data: &[u8], vtype: ValueType) -> Result<String> {
    let even = &data[..data.len() & !1];
    if even.is_empty() {
        return Ok(String::new());
    }

    let (decoded, had_errors) = UTF_16LE.decode_without_bom_handling(even);
    if had_errors {
        return Err(RegistryError::corrupt(vtype, "invalid UTF-16LE data"));
    }
    Ok(decoded.into_owned())
}

/// Encodes a string as null-terminated UTF-16LE.
///
/// # Errors
///
/// Returns `RegistryError::InvalidInput` if the string contains NUL.
pub fn write_utf16_string(s: &str) -> Result<Vec<u8>> {
    if s.contains('\0') {
        return Err(RegistryError::invalid_input("string contains a NUL character"));
    }
    let mut bytes = encode_utf16le(s);
    bytes.extend_from_slice(&[0, 0]);
    Ok(bytes)
}

/// Encodes strings as a REG_MULTI_SZ payload (each NUL-terminated, plus a final NUL).
///
/// # Errors
///
/// Returns `RegistryError::InvalidInput` if an element is empty or contains NUL.
pub fn write_utf16_multi(strings: &[String]) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    for s in strings {
        if s.is_empty() {
            return Err(RegistryError::invalid_input("multi-string element is empty"));
        }
        bytes.extend(write_utf16_string(s)?);
    }
    bytes.extend_from_slice(&[0, 0]);
    Ok(bytes)
}

fn encode_utf16le(s: &str) -> Vec<u8> {
    let units: Vec<u16> = s.encode_utf16().collect();
    let mut bytes = vec![0u8; units.len() * 2];
    LittleEndian::write_u16_into(&units, &mut bytes);
    bytes
}

fn truncated(vtype: ValueType, expected: usize, actual: usize) -> RegistryError {
    RegistryError::corrupt(
        vtype,
        format!("expected {} bytes, got {} bytes", expected, actual),
    )
}

/// Reads a little-endian u32 from the start of value bytes.
pub fn read_u32_le(data: &[u8], vtype: ValueType) -> Result<u32> {
    if data.len() < 4 {
        return Err(truncated(vtype, 4, data.len()));
    }
    Ok(LittleEndian::read_u32(&data[..4]))
}

/// Reads a big-endian u32 from the start of value bytes.
pub fn read_u32_be(data: &[u8], vtype: ValueType) -> Result<u32> {
    if data.len() < 4 {
        return Err(truncated(vtype, 4, data.len()));
    }
    Ok(BigEndian::read_u32(&data[..4]))
}

/// Reads a little-endian u64 from the start of value bytes.
pub fn read_u64_le(data: &[u8], vtype: ValueType) -> Result<u64> {
    if data.len() < 8 {
        return Err(truncated(vtype, 8, data.len()));
    }
    Ok(LittleEndian::read_u64(&data[..8]))
}

/// Encodes bytes as lowercase hexadecimal.
pub fn encode_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Decodes a hexadecimal string.
///
/// # Errors
///
/// Returns `RegistryError::InvalidInput` on odd length or non-hex characters.
pub fn decode_hex(text: &str) -> Result<Vec<u8>> {
    hex::decode(text).map_err(|e| RegistryError::invalid_input(format!("invalid hex: {}", e)))
}

fn check_decimal(text: &str) -> Result<()> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RegistryError::invalid_input(format!(
            "{:?} is not an unsigned decimal number",
            text
        )));
    }
    Ok(())
}

/// Parses an unsigned decimal DWORD.
///
/// # Errors
///
/// Returns `RegistryError::InvalidInput` for non-digits or values above `u32::MAX`.
pub fn parse_dword(text: &str) -> Result<u32> {
    check_decimal(text)?;
    text.parse::<u32>()
        .map_err(|_| RegistryError::invalid_input(format!("{} overflows a DWORD", text)))
}

/// Parses an unsigned decimal QWORD.
///
/// # Errors
///
/// Returns `RegistryError::InvalidInput` for non-digits or values above `u64::MAX`.
pub fn parse_qword(text: &str) -> Result<u64> {
    check_decimal(text)?;
    text.parse::<u64>()
        .map_err(|_| RegistryError::invalid_input(format!("{} overflows a QWORD", text)))
}

/// Joins multi-string elements with the literal `\0` separator.
pub fn join_multi(strings: &[String]) -> String {
    strings.join(MULTI_SZ_SEPARATOR)
}

/// Splits text on the literal `\0` separator. Empty text is an empty list.
pub fn split_multi(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split(MULTI_SZ_SEPARATOR).map(str::to_string).collect()
}

/// Expands `%NAME%` tokens against the process environment.
///
/// Tokens naming an undefined (or non-Unicode) variable are kept verbatim,
/// matching `ExpandEnvironmentStrings`.
pub fn expand_env(input: &str) -> String {
    expand_env_with(input, |name| std::env::var(name).ok())
}

/// Expands `%NAME%` tokens using `lookup`.
pub fn expand_env_with<F>(input: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find('%') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        match after.find('%') {
            Some(end) => {
                let name = &after[..end];
                match (!name.is_empty()).then(|| lookup(name)).flatten() {
                    Some(value) => {
                        out.push_str(&value);
                        rest = &after[end + 1..];
                    }
                    None => {
                        out.push('%');
                        out.push_str(name);
                        out.push('%');
                        rest = &after[end + 1..];
                    }
                }
            }
            None => {
                out.push('%');
                rest = after;
                break;
            }
        }
    }

    out.push_str(rest);
    out
}
