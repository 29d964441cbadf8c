//! Key metadata and key-tree snapshots.

use crate::value::ValueData;
use chrono::{DateTime, Utc};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metadata of an open key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInfo {
    /// Number of immediate subkeys.
    pub subkey_count: u32,

    /// Number of values.
    pub value_count: u32,

    /// Last time the key or one of its values was written.
    pub last_written: Option<DateTime<Utc>>,
}

impl KeyInfo {
    /// Returns true if the key has neither subkeys nor values.
    pub fn is_empty(&self) -> bool {
        self.subkey_count == 0 && self.value_count == 0
    }
}

/// Converts a Windows FILETIME (100ns intervals since 1601-01-01) to UTC.
pub fn filetime_to_datetime(filetime: u64) -> Option<DateTime<Utc>> {
    // Unix epoch is 1970-01-01, difference is 11644473600 seconds
    const FILETIME_UNIX_DIFF: i64 = 11644473600;

    let seconds = (filetime / 10_000_000) as i64 - FILETIME_UNIX_DIFF;
    let nanos = ((filetime % 10_000_000) * 100) as u32;

    DateTime::from_timestamp(seconds, nanos)
}

/// A named value inside a [`KeyTree`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NamedValue {
    /// Value name; empty for the default value.
    pub name: String,

    /// Decoded data.
    pub value: ValueData,
}

/// Snapshot of a key: its values and, optionally, its subkeys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KeyTree {
    /// Values of this key.
    #[cfg_attr(feature = "serde", serde(default))]
    pub values: Vec<NamedValue>,

    /// Subkeys by name. Empty trees for non-recursive snapshots.
    #[cfg_attr(feature = "serde", serde(default))]
    pub subkeys: BTreeMap<String, KeyTree>,
}

impl KeyTree {
    /// Looks up a value by name (case-insensitive, like the registry).
    pub fn value(&self, name: &str) -> Option<&ValueData> {
        self.values
            .iter()
            .find(|v| v.name.eq_ignore_ascii_case(name))
            .map(|v| &v.value)
    }

    /// Total number of keys in the snapshot, this one included.
    pub fn key_count(&self) -> usize {
        1 + self.subkeys.values().map(KeyTree::key_count).sum::<usize>()
    }
}
