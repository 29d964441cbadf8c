//! # Windows Registry Facade
//!
//! A small, typed facade over the Windows Registry, with a string-marshaled
//! layer and C exports for foreign callers.
//!
//! ## Features
//!
//! - **Typed core**: every operation returns `Result<T, RegistryError>`, so a
//!   missing key, a refused access and a malformed payload stay distinct
//! - **Text boundary**: sentinel results (`""`, `"0"`, `"NONE"`) and numeric
//!   status codes only where foreign callers need them
//! - **Pluggable stores**: the live registry through `winreg`, or an
//!   in-memory store that follows the same rules on any platform
//! - **Recursive delete**: subtrees are removed children first, without
//!   recursion on the call stack
//! - **Snapshots**: export a key tree and import it elsewhere (JSON with the
//!   `serde` feature)
//!
//! ## Architecture
//!
//! ```text
//! ffi (C exports)   python (PyO3)
//!        \             /
//!      text::TextRegistry          strings in, strings/status codes out
//!               |
//!      facade::Registry<S>         typed operations
//!               |
//!      store::RegistryStore        open / create / delete-leaf, key handles
//!        /                \
//! windows::WinRegistryStore   memory::MemoryStore
//! ```
//!
//! Key handles are released on drop, so every operation gives its handle
//! back on every exit path.
//!
//! ## Examples
//!
//! ### Typed facade
//!
//! ```rust
//! use reg_facade::{MemoryStore, Registry, ValueType};
//!
//! # fn main() -> reg_facade::Result<()> {
//! let registry = Registry::new(MemoryStore::new());
//!
//! registry.write_dword("HKCU", "Software\\ExampleApp", "Version", 7)?;
//! registry.write_multi_string("HKCU", "Software\\ExampleApp", "Paths", &["a", "b"])?;
//!
//! assert_eq!(registry.read_integer("HKCU", "Software\\ExampleApp", "Version")?, 7);
//! assert_eq!(
//!     registry.value_type("HKCU", "Software\\ExampleApp", "Paths")?,
//!     ValueType::MultiString
//! );
//!
//! registry.delete_key("HKCU", "Software\\ExampleApp")?;
//! assert!(!registry.key_exists("HKCU", "Software\\ExampleApp"));
//! # Ok(())
//! # }
//! ```
//!
//! ### Live registry (Windows)
//!
//! ```no_run
//! # #[cfg(windows)]
//! # fn main() -> reg_facade::Result<()> {
//! use reg_facade::Registry;
//!
//! let registry = Registry::system();
//! for name in registry.list_subkeys("HKCU", "Software")? {
//!     println!("{}", name);
//! }
//! # Ok(())
//! # }
//! # #[cfg(not(windows))]
//! # fn main() {}
//! ```
//!
//! ## Status codes
//!
//! Write-style text and C functions return `0` on success, then `1` not
//! found, `2` access denied, `3` invalid hive, `4` invalid path, `5` invalid
//! input, `6` type mismatch, `7` other OS failure. See [`error::status`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod facade;
pub mod hive;
pub mod key;
pub mod memory;
pub mod path;
pub mod store;
pub mod text;
pub mod utils;
pub mod value;

#[cfg(windows)]
pub mod windows;

// C exports (only compiled for Windows targets)
#[cfg(windows)]
pub mod ffi;

// Python bindings (only compiled when python feature is enabled)
#[cfg(all(feature = "python", windows))]
pub mod python;

// Re-export main types for convenience
pub use error::{RegistryError, Result};
pub use facade::Registry;
pub use hive::Hive;
pub use key::{KeyInfo, KeyTree, NamedValue};
pub use memory::MemoryStore;
pub use path::KeyPath;
pub use store::{Access, RegistryStore, StoreKey};
pub use text::TextRegistry;
pub use value::{RawValue, ValueData, ValueType};
#[cfg(windows)]
pub use windows::WinRegistryStore;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
