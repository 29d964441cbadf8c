//! Root hive references and the hive-name lookup table.

use crate::error::{RegistryError, Result};
use std::fmt;
use std::str::FromStr;

/// One of the predefined top-level registry stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hive {
    /// HKEY_CLASSES_ROOT
    ClassesRoot,
    /// HKEY_CURRENT_USER
    CurrentUser,
    /// HKEY_LOCAL_MACHINE
    LocalMachine,
    /// HKEY_USERS
    Users,
    /// HKEY_CURRENT_CONFIG
    CurrentConfig,
}

/// Short hive names accepted by [`Hive::from_name`], matched after uppercasing.
static HIVE_NAMES: [(&str, Hive); 5] = [
    ("HKCR", Hive::ClassesRoot),
    ("HKCU", Hive::CurrentUser),
    ("HKLM", Hive::LocalMachine),
    ("HKU", Hive::Users),
    ("HKCC", Hive::CurrentConfig),
];

impl Hive {
    /// Every hive, in lookup-table order.
    pub const ALL: [Hive; 5] = [
        Hive::ClassesRoot,
        Hive::CurrentUser,
        Hive::LocalMachine,
        Hive::Users,
        Hive::CurrentConfig,
    ];

    /// Resolves a case-insensitive short hive name (`HKCU`, `hklm`, ...).
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::InvalidHive` for any other name.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use reg_facade::Hive;
    ///
    /// assert_eq!(Hive::from_name("hkcu").unwrap(), Hive::CurrentUser);
    /// assert!(Hive::from_name("BOGUS").is_err());
    /// ```
    pub fn from_name(name: &str) -> Result<Self> {
        let upper = name.to_ascii_uppercase();
        HIVE_NAMES
            .iter()
            .find(|(short, _)| *short == upper)
            .map(|(_, hive)| *hive)
            .ok_or_else(|| RegistryError::InvalidHive(name.to_string()))
    }

    /// Returns the short name (`HKCU`, ...).
    pub fn short_name(&self) -> &'static str {
        HIVE_NAMES
            .iter()
            .find(|(_, hive)| hive == self)
            .map(|(short, _)| *short)
            .unwrap_or("")
    }

    /// Returns the full predefined key name (`HKEY_CURRENT_USER`, ...).
    pub fn long_name(&self) -> &'static str {
        match self {
            Hive::ClassesRoot => "HKEY_CLASSES_ROOT",
            Hive::CurrentUser => "HKEY_CURRENT_USER",
            Hive::LocalMachine => "HKEY_LOCAL_MACHINE",
            Hive::Users => "HKEY_USERS",
            Hive::CurrentConfig => "HKEY_CURRENT_CONFIG",
        }
    }
}

impl FromStr for Hive {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

impl fmt::Display for Hive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}
