//! String-marshaled registry operations.
//!
//! Every argument and result is text. Reads flatten failures into the zero
//! value of their type (`""`, `"0"`, `"NONE"`, `false`); writes return a
//! status code from [`crate::error::status`]. This is the layer the C
//! exports and other foreign callers sit on.

use crate::error::{status, Result};
use crate::facade::Registry;
use crate::store::RegistryStore;
use crate::utils::{decode_hex, encode_hex, join_multi, parse_dword, parse_qword, split_multi};
use tracing::{debug, warn};

/// Separator for subkey and value name lists.
pub const LIST_SEPARATOR: &str = ",";

/// Zero value returned by integer reads on failure.
pub const ZERO_INTEGER: &str = "0";

fn logged<T>(op: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) if err.is_not_found() => {
            debug!(op, %err, "Returning empty result");
            None
        }
        Err(err) => {
            warn!(op, %err, "Returning empty result");
            None
        }
    }
}

fn or_default<T: Default>(op: &str, result: Result<T>) -> T {
    logged(op, result).unwrap_or_default()
}

fn to_status(op: &str, result: Result<()>) -> u32 {
    match result {
        Ok(()) => status::OK,
        Err(err) => {
            warn!(op, %err, "Operation failed");
            err.status_code()
        }
    }
}

/// Text adapter over a [`Registry`].
///
/// # Examples
///
/// ```rust
/// use reg_facade::{MemoryStore, TextRegistry};
///
/// let registry = TextRegistry::new(MemoryStore::new());
/// assert_eq!(registry.write_dword("HKCU", "Software/ExampleApp", "Version", "7"), 0);
/// assert_eq!(registry.read_integer("HKCU", "Software/ExampleApp", "Version"), "7");
/// assert_eq!(registry.value_type("HKCU", "Software/ExampleApp", "Version"), "DWORD");
/// assert_eq!(registry.read_integer("HKCU", "Software/ExampleApp", "Missing"), "0");
/// ```
#[derive(Debug, Clone, Default)]
pub struct TextRegistry<S> {
    registry: Registry<S>,
}

#[cfg(windows)]
impl TextRegistry<crate::windows::WinRegistryStore> {
    /// Text adapter over the live system registry.
    pub fn system() -> Self {
        Self::from_registry(Registry::system())
    }
}

impl<S: RegistryStore> TextRegistry<S> {
    /// Creates a text adapter over `store`.
    pub fn new(store: S) -> Self {
        Self::from_registry(Registry::new(store))
    }

    /// Wraps an existing facade.
    pub fn from_registry(registry: Registry<S>) -> Self {
        Self { registry }
    }

    /// The typed facade underneath.
    pub fn registry(&self) -> &Registry<S> {
        &self.registry
    }

    /// Whether the key exists.
    pub fn exists(&self, root: &str, path: &str) -> bool {
        self.registry.key_exists(root, path)
    }

    /// Comma-joined subkey names; empty on error.
    pub fn list_subkeys(&self, root: &str, path: &str) -> String {
        or_default("list_subkeys", self.registry.list_subkeys(root, path)).join(LIST_SEPARATOR)
    }

    /// Comma-joined, sorted value names; empty on error.
    pub fn list_values(&self, root: &str, path: &str) -> String {
        or_default("list_values", self.registry.list_values(root, path)).join(LIST_SEPARATOR)
    }

    /// Type tag such as `"SZ"` or `"DWORD"`; `"NONE"` on error.
    pub fn value_type(&self, root: &str, path: &str, name: &str) -> String {
        match self.registry.value_type(root, path, name) {
            Ok(vtype) => vtype.tag().to_string(),
            Err(err) => {
                debug!(%err, "Reporting NONE");
                "NONE".to_string()
            }
        }
    }

    /// String value verbatim; empty on error.
    pub fn read_string(&self, root: &str, path: &str, name: &str) -> String {
        or_default("read_string", self.registry.read_string(root, path, name))
    }

    /// String value with `%VAR%` tokens expanded; empty on error.
    pub fn read_string_expanded(&self, root: &str, path: &str, name: &str) -> String {
        or_default(
            "read_string_expanded",
            self.registry.read_string_expanded(root, path, name),
        )
    }

    /// Multi-string elements joined by the literal `\0`; empty on error.
    pub fn read_multi_string(&self, root: &str, path: &str, name: &str) -> String {
        join_multi(&or_default(
            "read_multi_string",
            self.registry.read_multi_string(root, path, name),
        ))
    }

    /// Binary value as lowercase hex; empty on error.
    pub fn read_binary(&self, root: &str, path: &str, name: &str) -> String {
        encode_hex(&or_default(
            "read_binary",
            self.registry.read_binary(root, path, name),
        ))
    }

    /// Integer value in decimal; `"0"` on error.
    pub fn read_integer(&self, root: &str, path: &str, name: &str) -> String {
        logged("read_integer", self.registry.read_integer(root, path, name))
            .map_or_else(|| ZERO_INTEGER.to_string(), |n| n.to_string())
    }

    /// Creates a key; returns a status code.
    pub fn create_key(&self, root: &str, path: &str) -> u32 {
        to_status("create_key", self.registry.create_key(root, path))
    }

    /// Deletes a key and its subtree; returns a status code.
    pub fn delete_key(&self, root: &str, path: &str) -> u32 {
        to_status("delete_key", self.registry.delete_key(root, path))
    }

    /// Deletes a value; returns a status code.
    pub fn delete_value(&self, root: &str, path: &str, name: &str) -> u32 {
        to_status("delete_value", self.registry.delete_value(root, path, name))
    }

    /// Writes an SZ value.
    pub fn write_string(&self, root: &str, path: &str, name: &str, value: &str) -> u32 {
        to_status(
            "write_string",
            self.registry.write_string(root, path, name, value),
        )
    }

    /// Writes an EXPAND_SZ value.
    pub fn write_expand_string(&self, root: &str, path: &str, name: &str, value: &str) -> u32 {
        to_status(
            "write_expand_string",
            self.registry.write_expand_string(root, path, name, value),
        )
    }

    /// Writes a MULTI_SZ value from elements joined by the literal `\0`.
    pub fn write_multi_string(&self, root: &str, path: &str, name: &str, value: &str) -> u32 {
        to_status(
            "write_multi_string",
            self.registry
                .write_multi_string(root, path, name, &split_multi(value)),
        )
    }

    /// Writes a BINARY value from hex text.
    pub fn write_binary(&self, root: &str, path: &str, name: &str, value: &str) -> u32 {
        let result =
            decode_hex(value).and_then(|bytes| self.registry.write_binary(root, path, name, &bytes));
        to_status("write_binary", result)
    }

    /// Writes a DWORD value from decimal text.
    pub fn write_dword(&self, root: &str, path: &str, name: &str, value: &str) -> u32 {
        let result =
            parse_dword(value).and_then(|n| self.registry.write_dword(root, path, name, n));
        to_status("write_dword", result)
    }

    /// Writes a QWORD value from decimal text.
    pub fn write_qword(&self, root: &str, path: &str, name: &str, value: &str) -> u32 {
        let result =
            parse_qword(value).and_then(|n| self.registry.write_qword(root, path, name, n));
        to_status("write_qword", result)
    }

    /// JSON snapshot of a key; empty on error.
    #[cfg(feature = "serde")]
    pub fn export_json(&self, root: &str, path: &str, recursive: bool) -> String {
        let result = self
            .registry
            .export_tree(root, path, recursive)
            .and_then(|tree| {
                serde_json::to_string(&tree).map_err(|e| {
                    crate::error::RegistryError::invalid_input(format!("JSON encoding: {}", e))
                })
            });
        or_default("export_json", result)
    }

    /// Writes a JSON snapshot produced by [`TextRegistry::export_json`].
    #[cfg(feature = "serde")]
    pub fn import_json(&self, root: &str, path: &str, json: &str, purge: bool) -> u32 {
        let result = serde_json::from_str::<crate::key::KeyTree>(json)
            .map_err(|e| crate::error::RegistryError::invalid_input(format!("JSON: {}", e)))
            .and_then(|tree| self.registry.import_tree(root, path, &tree, purge));
        to_status("import_json", result)
    }
}
