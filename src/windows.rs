//! Live Windows registry store backed by `winreg`.

use crate::error::{RegistryError, Result};
use crate::hive::Hive;
use crate::key::{filetime_to_datetime, KeyInfo};
use crate::path::KeyPath;
use crate::store::{Access, RegistryStore, StoreKey};
use crate::value::{RawValue, ValueType};
use std::io;
use tracing::debug;
use winreg::enums::{
    RegDisposition, RegType, HKEY_CLASSES_ROOT, HKEY_CURRENT_CONFIG, HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE,
    HKEY_USERS, KEY_ALL_ACCESS, KEY_READ,
};
use winreg::{RegKey, RegValue};

/// The system registry of the current machine.
#[derive(Debug, Clone, Copy, Default)]
pub struct WinRegistryStore;

impl WinRegistryStore {
    /// Creates a handle to the system registry.
    pub fn new() -> Self {
        Self
    }
}

fn predef(hive: Hive) -> RegKey {
    RegKey::predef(match hive {
        Hive::ClassesRoot => HKEY_CLASSES_ROOT,
        Hive::CurrentUser => HKEY_CURRENT_USER,
        Hive::LocalMachine => HKEY_LOCAL_MACHINE,
        Hive::Users => HKEY_USERS,
        Hive::CurrentConfig => HKEY_CURRENT_CONFIG,
    })
}

fn from_reg_type(vtype: &RegType) -> ValueType {
    match vtype {
        RegType::REG_NONE => ValueType::None,
        RegType::REG_SZ => ValueType::String,
        RegType::REG_EXPAND_SZ => ValueType::ExpandString,
        RegType::REG_BINARY => ValueType::Binary,
        RegType::REG_DWORD => ValueType::Dword,
        RegType::REG_DWORD_BIG_ENDIAN => ValueType::DwordBigEndian,
        RegType::REG_LINK => ValueType::Link,
        RegType::REG_MULTI_SZ => ValueType::MultiString,
        RegType::REG_RESOURCE_LIST => ValueType::ResourceList,
        RegType::REG_FULL_RESOURCE_DESCRIPTOR => ValueType::FullResourceDescriptor,
        RegType::REG_RESOURCE_REQUIREMENTS_LIST => ValueType::ResourceRequirementsList,
        RegType::REG_QWORD => ValueType::Qword,
    }
}

fn to_reg_type(vtype: ValueType) -> Result<RegType> {
    let reg_type = match vtype {
        ValueType::None => RegType::REG_NONE,
        ValueType::String => RegType::REG_SZ,
        ValueType::ExpandString => RegType::REG_EXPAND_SZ,
        ValueType::Binary => RegType::REG_BINARY,
        ValueType::Dword => RegType::REG_DWORD,
        ValueType::DwordBigEndian => RegType::REG_DWORD_BIG_ENDIAN,
        ValueType::Link => RegType::REG_LINK,
        ValueType::MultiString => RegType::REG_MULTI_SZ,
        ValueType::ResourceList => RegType::REG_RESOURCE_LIST,
        ValueType::FullResourceDescriptor => RegType::REG_FULL_RESOURCE_DESCRIPTOR,
        ValueType::ResourceRequirementsList => RegType::REG_RESOURCE_REQUIREMENTS_LIST,
        ValueType::Qword => RegType::REG_QWORD,
        ValueType::Unknown(id) => {
            return Err(RegistryError::invalid_input(format!(
                "cannot write value type {:#x}",
                id
            )))
        }
    };
    Ok(reg_type)
}

impl RegistryStore for WinRegistryStore {
    type Key = WinKey;

    fn open_key(&self, hive: Hive, path: &KeyPath, access: Access) -> Result<WinKey> {
        let flags = match access {
            Access::Read => KEY_READ,
            Access::Full => KEY_ALL_ACCESS,
        };
        let key = predef(hive).open_subkey_with_flags(path.to_native(), flags)?;
        debug!(hive = %hive, path = %path, ?access, "Opened key");
        Ok(WinKey { key })
    }

    fn create_key(&self, hive: Hive, path: &KeyPath) -> Result<WinKey> {
        let (key, disposition) =
            predef(hive).create_subkey_with_flags(path.to_native(), KEY_ALL_ACCESS)?;
        let created = matches!(disposition, RegDisposition::REG_CREATED_NEW_KEY);
        debug!(hive = %hive, path = %path, created, "Created or opened key");
        Ok(WinKey { key })
    }

    fn delete_leaf_key(&self, hive: Hive, path: &KeyPath) -> Result<()> {
        if path.is_root() {
            return Err(RegistryError::invalid_path(
                &path.to_string(),
                "cannot delete a hive root",
            ));
        }
        predef(hive).delete_subkey(path.to_native())?;
        Ok(())
    }
}

/// Open registry key. The `HKEY` is closed when this is dropped.
#[derive(Debug)]
pub struct WinKey {
    key: RegKey,
}

impl StoreKey for WinKey {
    fn subkey_names(&self) -> Result<Vec<String>> {
        Ok(self.key.enum_keys().collect::<io::Result<Vec<_>>>()?)
    }

    fn value_names(&self) -> Result<Vec<String>> {
        Ok(self
            .key
            .enum_values()
            .map(|entry| entry.map(|(name, _)| name))
            .collect::<io::Result<Vec<_>>>()?)
    }

    fn get_raw_value(&self, name: &str) -> Result<RawValue> {
        let value = self.key.get_raw_value(name)?;
        Ok(RawValue::new(from_reg_type(&value.vtype), value.bytes))
    }

    fn set_raw_value(&self, name: &str, value: &RawValue) -> Result<()> {
        let reg_value = RegValue {
            bytes: value.bytes.clone(),
            vtype: to_reg_type(value.vtype)?,
        };
        self.key.set_raw_value(name, &reg_value)?;
        Ok(())
    }

    fn delete_value(&self, name: &str) -> Result<()> {
        self.key.delete_value(name)?;
        Ok(())
    }

    fn info(&self) -> Result<KeyInfo> {
        let meta = self.key.query_info()?;
        let filetime = (u64::from(meta.last_write_time.dwHighDateTime) << 32)
            | u64::from(meta.last_write_time.dwLowDateTime);
        Ok(KeyInfo {
            subkey_count: meta.sub_keys,
            value_count: meta.values,
            last_written: filetime_to_datetime(filetime),
        })
    }
}
