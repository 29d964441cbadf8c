//! Typed registry facade.
//!
//! [`Registry`] resolves a hive name and key path, opens or creates the key
//! through its store, performs one operation and releases the handle before
//! returning. It keeps no state between calls.

use crate::error::{RegistryError, Result};
use crate::hive::Hive;
use crate::key::{KeyInfo, KeyTree, NamedValue};
use crate::path::KeyPath;
use crate::store::{Access, RegistryStore, StoreKey};
use crate::utils::expand_env;
use crate::value::{RawValue, ValueData, ValueType};
use tracing::{debug, instrument, warn};

/// Registry facade over a store backend.
///
/// # Examples
///
/// ```rust
/// use reg_facade::{MemoryStore, Registry};
///
/// # fn main() -> reg_facade::Result<()> {
/// let registry = Registry::new(MemoryStore::new());
/// registry.create_key("HKCU", "Software/ExampleApp")?;
/// registry.write_dword("HKCU", "Software/ExampleApp", "Version", 7)?;
/// assert_eq!(registry.read_integer("HKCU", "Software/ExampleApp", "Version")?, 7);
///
/// registry.delete_key("HKCU", "Software/ExampleApp")?;
/// assert!(!registry.key_exists("HKCU", "Software/ExampleApp"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Registry<S> {
    store: S,
}

#[cfg(windows)]
impl Registry<crate::windows::WinRegistryStore> {
    /// Facade over the live system registry.
    pub fn system() -> Self {
        Self::new(crate::windows::WinRegistryStore::new())
    }
}

fn resolve(root: &str, path: &str) -> Result<(Hive, KeyPath)> {
    Ok((Hive::from_name(root)?, KeyPath::parse(path)?))
}

fn mismatch(expected: &'static str, data: &ValueData) -> RegistryError {
    RegistryError::TypeMismatch {
        expected,
        found: data.value_type(),
    }
}

impl<S: RegistryStore> Registry<S> {
    /// Creates a facade over `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn open(&self, root: &str, path: &str, access: Access) -> Result<S::Key> {
        let (hive, path) = resolve(root, path)?;
        self.store.open_key(hive, &path, access)
    }

    /// Returns true iff the key can be opened for reading.
    ///
    /// Never fails: unknown hives, missing keys and denied access all yield false.
    #[instrument(skip(self))]
    pub fn key_exists(&self, root: &str, path: &str) -> bool {
        self.open(root, path, Access::Read).is_ok()
    }

    /// Names of the immediate subkeys, in store order.
    #[instrument(skip(self))]
    pub fn list_subkeys(&self, root: &str, path: &str) -> Result<Vec<String>> {
        self.open(root, path, Access::Read)?.subkey_names()
    }

    /// Names of the key's values, sorted alphabetically (case-insensitive).
    #[instrument(skip(self))]
    pub fn list_values(&self, root: &str, path: &str) -> Result<Vec<String>> {
        let mut names = self.open(root, path, Access::Read)?.value_names()?;
        names.sort_by_cached_key(|name| name.to_lowercase());
        Ok(names)
    }

    /// Type of a value.
    #[instrument(skip(self))]
    pub fn value_type(&self, root: &str, path: &str, name: &str) -> Result<ValueType> {
        Ok(self.open(root, path, Access::Read)?.get_raw_value(name)?.vtype)
    }

    /// Reads and decodes a value of any type.
    #[instrument(skip(self))]
    pub fn read_value(&self, root: &str, path: &str, name: &str) -> Result<ValueData> {
        let raw = self.open(root, path, Access::Read)?.get_raw_value(name)?;
        ValueData::parse(&raw)
    }

    /// Reads an SZ or EXPAND_SZ value verbatim.
    pub fn read_string(&self, root: &str, path: &str, name: &str) -> Result<String> {
        match self.read_value(root, path, name)? {
            ValueData::String(s) | ValueData::ExpandString(s) => Ok(s),
            other => Err(mismatch("SZ or EXPAND_SZ", &other)),
        }
    }

    /// Reads an SZ or EXPAND_SZ value and expands `%VAR%` tokens against the
    /// process environment. Unresolvable tokens stay verbatim.
    pub fn read_string_expanded(&self, root: &str, path: &str, name: &str) -> Result<String> {
        self.read_string(root, path, name).map(|s| expand_env(&s))
    }

    /// Reads a MULTI_SZ value.
    pub fn read_multi_string(&self, root: &str, path: &str, name: &str) -> Result<Vec<String>> {
        match self.read_value(root, path, name)? {
            ValueData::MultiString(strings) => Ok(strings),
            other => Err(mismatch("MULTI_SZ", &other)),
        }
    }

    /// Reads a BINARY value.
    pub fn read_binary(&self, root: &str, path: &str, name: &str) -> Result<Vec<u8>> {
        match self.read_value(root, path, name)? {
            ValueData::Binary(bytes) => Ok(bytes),
            other => Err(mismatch("BINARY", &other)),
        }
    }

    /// Reads a DWORD, big-endian DWORD or QWORD value, widened to u64.
    pub fn read_integer(&self, root: &str, path: &str, name: &str) -> Result<u64> {
        let data = self.read_value(root, path, name)?;
        data.as_u64()
            .ok_or_else(|| mismatch("DWORD or QWORD", &data))
    }

    /// Metadata of a key.
    #[instrument(skip(self))]
    pub fn key_info(&self, root: &str, path: &str) -> Result<KeyInfo> {
        self.open(root, path, Access::Read)?.info()
    }

    /// Creates a key and any missing parents. No-op if it already exists.
    ///
    /// # Errors
    ///
    /// `InvalidPath` for a hive root.
    #[instrument(skip(self))]
    pub fn create_key(&self, root: &str, path: &str) -> Result<()> {
        let (hive, key_path) = resolve(root, path)?;
        if key_path.is_root() {
            return Err(RegistryError::invalid_path(path, "cannot create a hive root"));
        }
        self.store.create_key(hive, &key_path)?;
        Ok(())
    }

    /// Deletes a key and its whole subtree, children before parents.
    ///
    /// Deleting a missing key is a no-op.
    ///
    /// # Errors
    ///
    /// `InvalidPath` for a hive root; store errors other than not-found.
    #[instrument(skip(self))]
    pub fn delete_key(&self, root: &str, path: &str) -> Result<()> {
        let (hive, key_path) = resolve(root, path)?;
        if key_path.is_root() {
            return Err(RegistryError::invalid_path(path, "cannot delete a hive root"));
        }

        // Pre-order walk with an explicit worklist; reversed, every key comes after its descendants
        let mut order = Vec::new();
        let mut pending = vec![key_path];
        while let Some(current) = pending.pop() {
            let children = match self.store.open_key(hive, &current, Access::Read) {
                Ok(key) => key.subkey_names()?,
                Err(e) if e.is_not_found() => continue,
                Err(e) => return Err(e),
            };
            pending.extend(children.iter().map(|child| current.join(child)));
            order.push(current);
        }

        for current in order.into_iter().rev() {
            debug!(hive = %hive, path = %current, "Deleting key");
            match self.store.delete_leaf_key(hive, &current) {
                Err(e) if !e.is_not_found() => return Err(e),
                _ => {}
            }
        }
        Ok(())
    }

    /// Deletes a single value. No-op if the value or key is absent.
    #[instrument(skip(self))]
    pub fn delete_value(&self, root: &str, path: &str, name: &str) -> Result<()> {
        let result = self
            .open(root, path, Access::Full)
            .and_then(|key| key.delete_value(name));
        match result {
            Err(e) if e.is_not_found() => {
                debug!("Nothing to delete");
                Ok(())
            }
            other => other,
        }
    }

    /// Writes a value of any type, creating the key if needed.
    ///
    /// The payload is validated before the key is touched, so malformed data
    /// never creates a key.
    #[instrument(skip(self, data), fields(vtype = data.value_type().tag()))]
    pub fn write_value(&self, root: &str, path: &str, name: &str, data: &ValueData) -> Result<()> {
        let raw = data.to_raw()?;
        let (hive, key_path) = resolve(root, path)?;
        self.store
            .create_key(hive, &key_path)?
            .set_raw_value(name, &raw)
    }

    /// Writes an SZ value.
    pub fn write_string(&self, root: &str, path: &str, name: &str, value: &str) -> Result<()> {
        self.write_value(root, path, name, &ValueData::String(value.to_string()))
    }

    /// Writes an EXPAND_SZ value.
    pub fn write_expand_string(
        &self,
        root: &str,
        path: &str,
        name: &str,
        value: &str,
    ) -> Result<()> {
        self.write_value(root, path, name, &ValueData::ExpandString(value.to_string()))
    }

    /// Writes a MULTI_SZ value. Elements must be non-empty.
    pub fn write_multi_string<T: AsRef<str>>(
        &self,
        root: &str,
        path: &str,
        name: &str,
        values: &[T],
    ) -> Result<()> {
        let strings = values.iter().map(|s| s.as_ref().to_string()).collect();
        self.write_value(root, path, name, &ValueData::MultiString(strings))
    }

    /// Writes a BINARY value.
    pub fn write_binary(&self, root: &str, path: &str, name: &str, value: &[u8]) -> Result<()> {
        self.write_value(root, path, name, &ValueData::Binary(value.to_vec()))
    }

    /// Writes a DWORD value.
    pub fn write_dword(&self, root: &str, path: &str, name: &str, value: u32) -> Result<()> {
        self.write_value(root, path, name, &ValueData::Dword(value))
    }

    /// Writes a QWORD value.
    pub fn write_qword(&self, root: &str, path: &str, name: &str, value: u64) -> Result<()> {
        self.write_value(root, path, name, &ValueData::Qword(value))
    }

    /// Snapshots a key's values and, if `recursive`, its whole subtree.
    ///
    /// NONE values and undecoded types are left out. Non-recursive snapshots
    /// list immediate subkeys as empty trees.
    #[instrument(skip(self))]
    pub fn export_tree(&self, root: &str, path: &str, recursive: bool) -> Result<KeyTree> {
        let (hive, key_path) = resolve(root, path)?;
        self.export_node(hive, &key_path, recursive)
    }

    fn export_node(&self, hive: Hive, path: &KeyPath, recursive: bool) -> Result<KeyTree> {
        let key = self.store.open_key(hive, path, Access::Read)?;
        let mut tree = KeyTree::default();

        for name in key.value_names()? {
            let value = match ValueData::parse(&key.get_raw_value(&name)?) {
                Ok(value) => value,
                Err(err @ RegistryError::CorruptValue { .. }) => {
                    warn!(hive = %hive, path = %path, value = %name, %err, "Skipping value");
                    continue;
                }
                Err(err) => return Err(err),
            };
            if is_untyped(&value) {
                continue;
            }
            tree.values.push(NamedValue { name, value });
        }

        let children = key.subkey_names()?;
        drop(key);

        for child in children {
            let subtree = if recursive {
                self.export_node(hive, &path.join(&child), recursive)?
            } else {
                KeyTree::default()
            };
            tree.subkeys.insert(child, subtree);
        }
        Ok(tree)
    }

    /// Writes a snapshot below `path`, creating keys as needed.
    ///
    /// The whole snapshot is encoded before anything is touched, so an
    /// invalid value anywhere leaves the destination as it was. With `purge`,
    /// the destination subtree is then deleted before writing. NONE values and
    /// undecoded types in the snapshot are skipped.
    #[instrument(skip(self, tree))]
    pub fn import_tree(&self, root: &str, path: &str, tree: &KeyTree, purge: bool) -> Result<()> {
        let (hive, key_path) = resolve(root, path)?;
        let plan = import_plan(key_path, tree)?;
        if purge {
            self.delete_key(root, path)?;
        }

        for (target, values) in plan {
            let key = self.store.create_key(hive, &target)?;
            for (name, raw) in &values {
                key.set_raw_value(name, raw)?;
            }
        }
        Ok(())
    }
}

fn is_untyped(value: &ValueData) -> bool {
    matches!(value, ValueData::None | ValueData::Unknown { .. })
}

type ImportStep = (KeyPath, Vec<(String, RawValue)>);

// Keys in pre-order, each with its encoded values
fn import_plan(base: KeyPath, tree: &KeyTree) -> Result<Vec<ImportStep>> {
    let mut plan = Vec::new();
    let mut pending = vec![(base, tree)];

    while let Some((path, node)) = pending.pop() {
        let values = node
            .values
            .iter()
            .filter(|v| !is_untyped(&v.value))
            .map(|v| Ok((v.name.clone(), v.value.to_raw()?)))
            .collect::<Result<Vec<_>>>()?;

        for (child, subtree) in node.subkeys.iter().rev() {
            let mut target = path.clone();
            for segment in KeyPath::parse(child)?.segments() {
                target = target.join(segment);
            }
            pending.push((target, subtree));
        }
        plan.push((path, values));
    }
    Ok(plan)
}
