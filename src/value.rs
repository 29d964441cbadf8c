//! Registry value types, typed value data and the raw byte form.
//!
//! Stores exchange values as [`RawValue`]: the type id plus the bytes exactly
//! as the registry keeps them (UTF-16LE strings with terminators,
//! little-endian integers). The facade decodes those into [`ValueData`].

use crate::error::{RegistryError, Result};
use crate::utils::{
    decode_utf16, read_u32_be, read_u32_le, read_u64_le, read_utf16_string, write_utf16_multi,
    write_utf16_string,
};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Registry value data types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// No value type.
    None,

    /// String (null-terminated).
    String,

    /// String with environment variables.
    ExpandString,

    /// Binary data.
    Binary,

    /// 32-bit little-endian integer.
    Dword,

    /// 32-bit big-endian integer.
    DwordBigEndian,

    /// Symbolic link (Unicode).
    Link,

    /// Multiple strings.
    MultiString,

    /// Resource list.
    ResourceList,

    /// Full resource descriptor.
    FullResourceDescriptor,

    /// Resource requirements list.
    ResourceRequirementsList,

    /// 64-bit little-endian integer.
    Qword,

    /// Unknown or non-standard value type.
    /// Contains the raw type value.
    Unknown(u32),
}

impl ValueType {
    /// Parses a value type from its numeric id.
    ///
    /// Ids 0-11 are predefined; anything else is kept as `ValueType::Unknown`.
    pub fn from_u32(value: u32) -> Self {
        match value {
            0 => ValueType::None,
            1 => ValueType::String,
            2 => ValueType::ExpandString,
            3 => ValueType::Binary,
            4 => ValueType::Dword,
            5 => ValueType::DwordBigEndian,
            6 => ValueType::Link,
            7 => ValueType::MultiString,
            8 => ValueType::ResourceList,
            9 => ValueType::FullResourceDescriptor,
            10 => ValueType::ResourceRequirementsList,
            11 => ValueType::Qword,
            _ => ValueType::Unknown(value),
        }
    }

    /// Returns the numeric type id.
    pub fn to_u32(self) -> u32 {
        match self {
            ValueType::None => 0,
            ValueType::String => 1,
            ValueType::ExpandString => 2,
            ValueType::Binary => 3,
            ValueType::Dword => 4,
            ValueType::DwordBigEndian => 5,
            ValueType::Link => 6,
            ValueType::MultiString => 7,
            ValueType::ResourceList => 8,
            ValueType::FullResourceDescriptor => 9,
            ValueType::ResourceRequirementsList => 10,
            ValueType::Qword => 11,
            ValueType::Unknown(id) => id,
        }
    }

    /// Returns the canonical type tag used on the text boundary.
    ///
    /// Unknown ids report `"NONE"`.
    pub fn tag(&self) -> &'static str {
        match self {
            ValueType::None | ValueType::Unknown(_) => "NONE",
            ValueType::String => "SZ",
            ValueType::ExpandString => "EXPAND_SZ",
            ValueType::Binary => "BINARY",
            ValueType::Dword => "DWORD",
            ValueType::DwordBigEndian => "DWORD_BIG_ENDIAN",
            ValueType::Link => "LINK",
            ValueType::MultiString => "MULTI_SZ",
            ValueType::ResourceList => "RESOURCE_LIST",
            ValueType::FullResourceDescriptor => "FULL_RESOURCE_DESCRIPTOR",
            ValueType::ResourceRequirementsList => "RESOURCE_REQUIREMENTS_LIST",
            ValueType::Qword => "QWORD",
        }
    }
}

/// A value as stored in the registry: type id plus raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawValue {
    /// Declared value type.
    pub vtype: ValueType,

    /// Raw value bytes.
    pub bytes: Vec<u8>,
}

impl RawValue {
    /// Creates a raw value.
    pub fn new(vtype: ValueType, bytes: Vec<u8>) -> Self {
        Self { vtype, bytes }
    }
}

// SZ data ends at the first NUL even if the stored length runs past it.
fn read_sz(data: &[u8], vtype: ValueType) -> Result<String> {
    let mut s = read_utf16_string(data, vtype)?;
    if let Some(nul) = s.find('\0') {
        s.truncate(nul);
    }
    Ok(s)
}

/// Decoded registry value data.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", content = "data"))]
pub enum ValueData {
    /// No data.
    #[cfg_attr(feature = "serde", serde(rename = "NONE"))]
    None,

    /// String value.
    #[cfg_attr(feature = "serde", serde(rename = "SZ"))]
    String(String),

    /// Expandable string value.
    #[cfg_attr(feature = "serde", serde(rename = "EXPAND_SZ"))]
    ExpandString(String),

    /// Binary data.
    #[cfg_attr(feature = "serde", serde(rename = "BINARY"))]
    Binary(Vec<u8>),

    /// 32-bit integer.
    #[cfg_attr(feature = "serde", serde(rename = "DWORD"))]
    Dword(u32),

    /// 32-bit big-endian integer.
    #[cfg_attr(feature = "serde", serde(rename = "DWORD_BIG_ENDIAN"))]
    DwordBigEndian(u32),

    /// Multiple strings.
    #[cfg_attr(feature = "serde", serde(rename = "MULTI_SZ"))]
    MultiString(Vec<String>),

    /// 64-bit integer.
    #[cfg_attr(feature = "serde", serde(rename = "QWORD"))]
    Qword(u64),

    /// Types the facade does not decode (LINK, RESOURCE_LIST, ...).
    #[cfg_attr(feature = "serde", serde(rename = "OTHER"))]
    Unknown {
        /// Numeric type id.
        type_id: u32,
        /// Raw value bytes.
        bytes: Vec<u8>,
    },
}

impl ValueData {
    /// Decodes a raw registry value.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::CorruptValue` when integer data is truncated
    /// or string data is not valid UTF-16LE.
    pub fn parse(raw: &RawValue) -> Result<Self> {
        let data = raw.bytes.as_slice();
        let vtype = raw.vtype;

        match vtype {
            ValueType::None => Ok(ValueData::None),

            ValueType::String => Ok(ValueData::String(read_sz(data, vtype)?)),

            ValueType::ExpandString => Ok(ValueData::ExpandString(read_sz(data, vtype)?)),

            ValueType::Binary => Ok(ValueData::Binary(data.to_vec())),

            ValueType::Dword => Ok(ValueData::Dword(read_u32_le(data, vtype)?)),

            ValueType::DwordBigEndian => Ok(ValueData::DwordBigEndian(read_u32_be(data, vtype)?)),

            ValueType::Qword => Ok(ValueData::Qword(read_u64_le(data, vtype)?)),

            ValueType::MultiString => {
                // Each element is NUL-terminated and one more NUL ends the list
                let full_string = decode_utf16(data, vtype)?;
                let body = full_string.strip_suffix('\0').unwrap_or(&full_string);
                let strings: Vec<String> = body.split_terminator('\0').map(str::to_string).collect();
                Ok(ValueData::MultiString(strings))
            }

            // Other types are carried through undecoded
            _ => Ok(ValueData::Unknown {
                type_id: vtype.to_u32(),
                bytes: data.to_vec(),
            }),
        }
    }

    /// Returns the registry type of this data.
    pub fn value_type(&self) -> ValueType {
        match self {
            ValueData::None => ValueType::None,
            ValueData::String(_) => ValueType::String,
            ValueData::ExpandString(_) => ValueType::ExpandString,
            ValueData::Binary(_) => ValueType::Binary,
            ValueData::Dword(_) => ValueType::Dword,
            ValueData::DwordBigEndian(_) => ValueType::DwordBigEndian,
            ValueData::MultiString(_) => ValueType::MultiString,
            ValueData::Qword(_) => ValueType::Qword,
            ValueData::Unknown { type_id, .. } => ValueType::from_u32(*type_id),
        }
    }

    /// Encodes the data into its raw registry form.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::InvalidInput` when a string contains NUL or a
    /// multi-string element is empty.
    pub fn to_raw(&self) -> Result<RawValue> {
        let bytes = match self {
            ValueData::None => Vec::new(),
            ValueData::String(s) | ValueData::ExpandString(s) => write_utf16_string(s)?,
            ValueData::Binary(b) => b.clone(),
            ValueData::Dword(d) => d.to_le_bytes().to_vec(),
            ValueData::DwordBigEndian(d) => d.to_be_bytes().to_vec(),
            ValueData::MultiString(strings) => write_utf16_multi(strings)?,
            ValueData::Qword(q) => q.to_le_bytes().to_vec(),
            ValueData::Unknown { bytes, .. } => bytes.clone(),
        };
        Ok(RawValue::new(self.value_type(), bytes))
    }

    /// Returns the integer payload widened to u64, if this is an integer type.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            ValueData::Dword(d) | ValueData::DwordBigEndian(d) => Some(u64::from(*d)),
            ValueData::Qword(q) => Some(*q),
            _ => None,
        }
    }
}
