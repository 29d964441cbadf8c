//! In-memory registry store.
//!
//! Mirrors the live registry's observable rules closely enough to exercise
//! the facade anywhere: names are case-insensitive but case-preserving,
//! subkeys enumerate in creation order, a key with subkeys cannot be deleted
//! directly, and keys can be marked access-denied.

use crate::error::{RegistryError, Result};
use crate::hive::Hive;
use crate::key::KeyInfo;
use crate::path::KeyPath;
use crate::store::{Access, RegistryStore, StoreKey};
use crate::value::RawValue;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

#[derive(Debug, Clone)]
struct Node {
    name: String,
    values: Vec<(String, RawValue)>,
    children: Vec<Node>,
    last_written: DateTime<Utc>,
    denied: bool,
}

impl Node {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            values: Vec::new(),
            children: Vec::new(),
            last_written: Utc::now(),
            denied: false,
        }
    }

    fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| same_name(&c.name, name))
    }

    fn child_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.children.iter_mut().find(|c| same_name(&c.name, name))
    }

    fn touch(&mut self) {
        self.last_written = Utc::now();
    }
}

fn same_name(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b) || a.to_lowercase() == b.to_lowercase()
}

type Hives = HashMap<Hive, Node>;

/// Thread-safe in-memory registry. Clones share the same tree.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    hives: Arc<RwLock<Hives>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates a store with five empty hives.
    pub fn new() -> Self {
        let hives = Hive::ALL
            .iter()
            .map(|hive| (*hive, Node::new(hive.long_name())))
            .collect();
        Self {
            hives: Arc::new(RwLock::new(hives)),
        }
    }

    /// Marks a key (created if missing) as access-denied: opening it or any
    /// key below it fails with `AccessDenied`.
    pub fn deny(&self, hive: Hive, path: &KeyPath) {
        self.set_denied(hive, path, true);
    }

    /// Clears a mark set by [`MemoryStore::deny`].
    pub fn allow(&self, hive: Hive, path: &KeyPath) {
        self.set_denied(hive, path, false);
    }

    fn set_denied(&self, hive: Hive, path: &KeyPath, denied: bool) {
        let mut hives = self.write();
        let mut node = root_mut(&mut hives, hive);
        for segment in path.segments() {
            if node.child(segment).is_none() {
                node.children.push(Node::new(segment));
            }
            node = match node.child_mut(segment) {
                Some(child) => child,
                None => return,
            };
        }
        node.denied = denied;
    }

    fn read(&self) -> RwLockReadGuard<'_, Hives> {
        self.hives.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Hives> {
        self.hives.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn handle(&self, hive: Hive, path: &KeyPath) -> MemoryKey {
        MemoryKey {
            hives: Arc::clone(&self.hives),
            hive,
            path: path.clone(),
        }
    }
}

fn root_mut(hives: &mut Hives, hive: Hive) -> &mut Node {
    hives
        .entry(hive)
        .or_insert_with(|| Node::new(hive.long_name()))
}

fn key_label(hive: Hive, path: &KeyPath) -> String {
    if path.is_root() {
        hive.short_name().to_string()
    } else {
        format!("{}\\{}", hive, path)
    }
}

fn find<'a>(hives: &'a Hives, hive: Hive, path: &KeyPath) -> Result<&'a Node> {
    let not_found = || RegistryError::not_found("key", &key_label(hive, path));
    let mut node = hives.get(&hive).ok_or_else(not_found)?;
    if node.denied {
        return Err(RegistryError::access_denied("key", &key_label(hive, path)));
    }
    for segment in path.segments() {
        node = node.child(segment).ok_or_else(not_found)?;
        if node.denied {
            return Err(RegistryError::access_denied("key", &key_label(hive, path)));
        }
    }
    Ok(node)
}

fn find_mut<'a>(hives: &'a mut Hives, hive: Hive, path: &KeyPath) -> Result<&'a mut Node> {
    // Validate first so the mutable walk below cannot fail halfway
    find(hives, hive, path)?;
    let mut node = root_mut(hives, hive);
    for segment in path.segments() {
        node = node
            .child_mut(segment)
            .ok_or_else(|| RegistryError::not_found("key", &key_label(hive, path)))?;
    }
    Ok(node)
}

impl RegistryStore for MemoryStore {
    type Key = MemoryKey;

    fn open_key(&self, hive: Hive, path: &KeyPath, _access: Access) -> Result<MemoryKey> {
        find(&self.read(), hive, path)?;
        Ok(self.handle(hive, path))
    }

    fn create_key(&self, hive: Hive, path: &KeyPath) -> Result<MemoryKey> {
        let mut hives = self.write();
        let label = key_label(hive, path);
        let mut node = root_mut(&mut hives, hive);
        if node.denied {
            return Err(RegistryError::access_denied("key", &label));
        }
        for segment in path.segments() {
            if node.child(segment).is_none() {
                debug!(key = %label, segment = %segment, "Creating key");
                node.children.push(Node::new(segment));
                node.touch();
            }
            node = node
                .child_mut(segment)
                .ok_or_else(|| RegistryError::not_found("key", &label))?;
            if node.denied {
                return Err(RegistryError::access_denied("key", &label));
            }
        }
        drop(hives);
        Ok(self.handle(hive, path))
    }

    fn delete_leaf_key(&self, hive: Hive, path: &KeyPath) -> Result<()> {
        let (parent_path, name) = match (path.parent(), path.name()) {
            (Some(parent), Some(name)) => (parent, name),
            _ => {
                return Err(RegistryError::invalid_path(
                    &path.to_string(),
                    "cannot delete a hive root",
                ))
            }
        };

        let mut hives = self.write();
        let label = key_label(hive, path);
        let parent = find_mut(&mut hives, hive, &parent_path)?;
        let index = parent
            .children
            .iter()
            .position(|c| same_name(&c.name, name))
            .ok_or_else(|| RegistryError::not_found("key", &label))?;

        let target = &parent.children[index];
        if target.denied {
            return Err(RegistryError::access_denied("key", &label));
        }
        if !target.children.is_empty() {
            return Err(RegistryError::access_denied("key with subkeys", &label));
        }

        parent.children.remove(index);
        parent.touch();
        Ok(())
    }
}

/// Handle to a key in a [`MemoryStore`].
///
/// Every call re-resolves the path, so a handle to a key deleted through
/// another handle reports `NotFound`.
#[derive(Debug)]
pub struct MemoryKey {
    hives: Arc<RwLock<Hives>>,
    hive: Hive,
    path: KeyPath,
}

impl MemoryKey {
    fn with_node<T>(&self, f: impl FnOnce(&Node) -> Result<T>) -> Result<T> {
        let hives = self.hives.read().unwrap_or_else(PoisonError::into_inner);
        f(find(&hives, self.hive, &self.path)?)
    }

    fn with_node_mut<T>(&self, f: impl FnOnce(&mut Node) -> Result<T>) -> Result<T> {
        let mut hives = self.hives.write().unwrap_or_else(PoisonError::into_inner);
        f(find_mut(&mut hives, self.hive, &self.path)?)
    }
}

impl StoreKey for MemoryKey {
    fn subkey_names(&self) -> Result<Vec<String>> {
        self.with_node(|node| Ok(node.children.iter().map(|c| c.name.clone()).collect()))
    }

    fn value_names(&self) -> Result<Vec<String>> {
        self.with_node(|node| Ok(node.values.iter().map(|(n, _)| n.clone()).collect()))
    }

    fn get_raw_value(&self, name: &str) -> Result<RawValue> {
        self.with_node(|node| {
            node.values
                .iter()
                .find(|(n, _)| same_name(n, name))
                .map(|(_, v)| v.clone())
                .ok_or_else(|| RegistryError::not_found("value", name))
        })
    }

    fn set_raw_value(&self, name: &str, value: &RawValue) -> Result<()> {
        self.with_node_mut(|node| {
            match node.values.iter_mut().find(|(n, _)| same_name(n, name)) {
                Some((_, existing)) => *existing = value.clone(),
                None => node.values.push((name.to_string(), value.clone())),
            }
            node.touch();
            Ok(())
        })
    }

    fn delete_value(&self, name: &str) -> Result<()> {
        self.with_node_mut(|node| {
            let index = node
                .values
                .iter()
                .position(|(n, _)| same_name(n, name))
                .ok_or_else(|| RegistryError::not_found("value", name))?;
            node.values.remove(index);
            node.touch();
            Ok(())
        })
    }

    fn info(&self) -> Result<KeyInfo> {
        self.with_node(|node| {
            Ok(KeyInfo {
                subkey_count: node.children.len() as u32,
                value_count: node.values.len() as u32,
                last_written: Some(node.last_written),
            })
        })
    }
}
