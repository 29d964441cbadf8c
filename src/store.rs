//! Storage backend traits.
//!
//! A [`RegistryStore`] hands out [`StoreKey`] handles for `(hive, path)`
//! pairs. Handles release their underlying resource on drop, so every
//! facade operation gives its handle back on all exit paths.

use crate::error::Result;
use crate::hive::Hive;
use crate::key::KeyInfo;
use crate::path::KeyPath;
use crate::value::RawValue;

/// Access level requested when opening a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Query values and enumerate subkeys.
    Read,
    /// Full access (read, write, delete).
    Full,
}

/// A registry backend.
pub trait RegistryStore {
    /// Open key handle type.
    type Key: StoreKey;

    /// Opens an existing key.
    ///
    /// # Errors
    ///
    /// `NotFound` if the key does not exist, `AccessDenied` if the requested
    /// access is refused.
    fn open_key(&self, hive: Hive, path: &KeyPath, access: Access) -> Result<Self::Key>;

    /// Opens a key with full access, creating it and any missing parents.
    fn create_key(&self, hive: Hive, path: &KeyPath) -> Result<Self::Key>;

    /// Deletes a key that has no subkeys.
    ///
    /// Like the OS primitive, this refuses to delete a key that still has
    /// children; callers delete subtrees bottom-up.
    fn delete_leaf_key(&self, hive: Hive, path: &KeyPath) -> Result<()>;
}

/// An open key handle.
pub trait StoreKey {
    /// Names of the immediate subkeys, in store order.
    fn subkey_names(&self) -> Result<Vec<String>>;

    /// Names of the values held by this key, in store order.
    fn value_names(&self) -> Result<Vec<String>>;

    /// Reads a value's type and raw bytes.
    fn get_raw_value(&self, name: &str) -> Result<RawValue>;

    /// Writes a value, replacing any existing value of the same name.
    fn set_raw_value(&self, name: &str, value: &RawValue) -> Result<()>;

    /// Deletes a value.
    fn delete_value(&self, name: &str) -> Result<()>;

    /// Key metadata.
    fn info(&self) -> Result<KeyInfo>;
}
