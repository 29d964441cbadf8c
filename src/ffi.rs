//! C exports over the live registry.
//!
//! Arguments are NUL-terminated UTF-8 strings. A null pointer or invalid
//! UTF-8 counts as invalid input: reads return their zero value and writes
//! return [`status::INVALID_INPUT`]. Strings returned by this library are
//! heap allocated and must be released with [`RegFreeString`].

#![allow(non_snake_case)]

use crate::error::status;
use crate::text::{TextRegistry, ZERO_INTEGER};
use crate::windows::WinRegistryStore;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::warn;

type Text = TextRegistry<WinRegistryStore>;

const VERSION_CSTR: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");

unsafe fn arg<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        warn!("Null string argument");
        return None;
    }
    match CStr::from_ptr(ptr).to_str() {
        Ok(s) => Some(s),
        Err(e) => {
            warn!(%e, "Argument is not valid UTF-8");
            None
        }
    }
}

// C strings end at the first NUL, so anything after it is dropped
fn out(s: String) -> *mut c_char {
    let s = match CString::new(s) {
        Ok(s) => s,
        Err(e) => {
            let nul = e.nul_position();
            warn!(nul, "Result contains NUL, truncating");
            let mut bytes = e.into_vec();
            bytes.truncate(nul);
            CString::new(bytes).unwrap_or_default()
        }
    };
    s.into_raw()
}

fn guard<T>(fallback: T, f: impl FnOnce() -> T) -> T {
    catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|_| {
        warn!("Panic caught at the C boundary");
        fallback
    })
}

unsafe fn read_key(
    root: *const c_char,
    path: *const c_char,
    fallback: &str,
    f: impl FnOnce(&Text, &str, &str) -> String,
) -> *mut c_char {
    let text = guard(fallback.to_string(), || match (arg(root), arg(path)) {
        (Some(root), Some(path)) => f(&Text::system(), root, path),
        _ => fallback.to_string(),
    });
    out(text)
}

unsafe fn read_value(
    root: *const c_char,
    path: *const c_char,
    name: *const c_char,
    fallback: &str,
    f: impl FnOnce(&Text, &str, &str, &str) -> String,
) -> *mut c_char {
    let text = guard(fallback.to_string(), || {
        match (arg(root), arg(path), arg(name)) {
            (Some(root), Some(path), Some(name)) => f(&Text::system(), root, path, name),
            _ => fallback.to_string(),
        }
    });
    out(text)
}

unsafe fn modify_key(
    root: *const c_char,
    path: *const c_char,
    f: impl FnOnce(&Text, &str, &str) -> u32,
) -> u32 {
    guard(status::OS_ERROR, || match (arg(root), arg(path)) {
        (Some(root), Some(path)) => f(&Text::system(), root, path),
        _ => status::INVALID_INPUT,
    })
}

unsafe fn write_value(
    root: *const c_char,
    path: *const c_char,
    name: *const c_char,
    value: *const c_char,
    f: impl FnOnce(&Text, &str, &str, &str, &str) -> u32,
) -> u32 {
    guard(status::OS_ERROR, || {
        match (arg(root), arg(path), arg(name), arg(value)) {
            (Some(root), Some(path), Some(name), Some(value)) => {
                f(&Text::system(), root, path, name, value)
            }
            _ => status::INVALID_INPUT,
        }
    })
}

/// Releases a string returned by this library. Null is ignored.
///
/// # Safety
///
/// `s` must be null or a pointer returned by this library that has not been
/// freed yet.
#[no_mangle]
pub unsafe extern "C" fn RegFreeString(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

/// Library version as a static NUL-terminated string. Do not free it.
#[no_mangle]
pub extern "C" fn RegLibraryVersion() -> *const c_char {
    VERSION_CSTR.as_ptr().cast()
}

/// Returns 1 if the key exists, 0 otherwise.
///
/// # Safety
///
/// Pointer arguments must be null or point to NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn RegKeyExists(root: *const c_char, path: *const c_char) -> u32 {
    guard(0, || match (arg(root), arg(path)) {
        (Some(root), Some(path)) => u32::from(Text::system().exists(root, path)),
        _ => 0,
    })
}

/// Comma-joined subkey names.
///
/// # Safety
///
/// Pointer arguments must be null or point to NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn RegListAllSubkeys(root: *const c_char, path: *const c_char) -> *mut c_char {
    read_key(root, path, "", |t, r, p| t.list_subkeys(r, p))
}

/// Comma-joined value names, sorted.
///
/// # Safety
///
/// Pointer arguments must be null or point to NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn RegListAllValues(root: *const c_char, path: *const c_char) -> *mut c_char {
    read_key(root, path, "", |t, r, p| t.list_values(r, p))
}

/// Type tag of a value, `"NONE"` on failure.
///
/// # Safety
///
/// Pointer arguments must be null or point to NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn RegQueryValueType(
    root: *const c_char,
    path: *const c_char,
    name: *const c_char,
) -> *mut c_char {
    read_value(root, path, name, "NONE", |t, r, p, n| t.value_type(r, p, n))
}

/// String value verbatim.
///
/// # Safety
///
/// Pointer arguments must be null or point to NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn RegQueryStringValue(
    root: *const c_char,
    path: *const c_char,
    name: *const c_char,
) -> *mut c_char {
    read_value(root, path, name, "", |t, r, p, n| t.read_string(r, p, n))
}

/// String value with environment variables expanded.
///
/// # Safety
///
/// Pointer arguments must be null or point to NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn RegQueryStringValueAndExpand(
    root: *const c_char,
    path: *const c_char,
    name: *const c_char,
) -> *mut c_char {
    read_value(root, path, name, "", |t, r, p, n| {
        t.read_string_expanded(r, p, n)
    })
}

/// Multi-string value, elements joined by the literal `\0`.
///
/// # Safety
///
/// Pointer arguments must be null or point to NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn RegQueryMultiStringValue(
    root: *const c_char,
    path: *const c_char,
    name: *const c_char,
) -> *mut c_char {
    read_value(root, path, name, "", |t, r, p, n| t.read_multi_string(r, p, n))
}

/// Binary value as lowercase hex.
///
/// # Safety
///
/// Pointer arguments must be null or point to NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn RegQueryBinaryValue(
    root: *const c_char,
    path: *const c_char,
    name: *const c_char,
) -> *mut c_char {
    read_value(root, path, name, "", |t, r, p, n| t.read_binary(r, p, n))
}

/// DWORD or QWORD value in decimal, `"0"` on failure.
///
/// # Safety
///
/// Pointer arguments must be null or point to NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn RegQueryIntegerValue(
    root: *const c_char,
    path: *const c_char,
    name: *const c_char,
) -> *mut c_char {
    read_value(root, path, name, ZERO_INTEGER, |t, r, p, n| {
        t.read_integer(r, p, n)
    })
}

/// Creates a key and missing parents.
///
/// # Safety
///
/// Pointer arguments must be null or point to NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn RegCreateKey(root: *const c_char, path: *const c_char) -> u32 {
    modify_key(root, path, |t, r, p| t.create_key(r, p))
}

/// Deletes a key and everything below it.
///
/// # Safety
///
/// Pointer arguments must be null or point to NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn RegDeleteKey(root: *const c_char, path: *const c_char) -> u32 {
    modify_key(root, path, |t, r, p| t.delete_key(r, p))
}

/// Deletes a single value.
///
/// # Safety
///
/// Pointer arguments must be null or point to NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn RegDeleteValue(
    root: *const c_char,
    path: *const c_char,
    name: *const c_char,
) -> u32 {
    guard(status::OS_ERROR, || match (arg(root), arg(path), arg(name)) {
        (Some(root), Some(path), Some(name)) => Text::system().delete_value(root, path, name),
        _ => status::INVALID_INPUT,
    })
}

/// Writes an SZ value.
///
/// # Safety
///
/// Pointer arguments must be null or point to NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn RegWriteStringValue(
    root: *const c_char,
    path: *const c_char,
    name: *const c_char,
    value: *const c_char,
) -> u32 {
    write_value(root, path, name, value, |t, r, p, n, v| {
        t.write_string(r, p, n, v)
    })
}

/// Writes an EXPAND_SZ value.
///
/// # Safety
///
/// Pointer arguments must be null or point to NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn RegWriteExpandStringValue(
    root: *const c_char,
    path: *const c_char,
    name: *const c_char,
    value: *const c_char,
) -> u32 {
    write_value(root, path, name, value, |t, r, p, n, v| {
        t.write_expand_string(r, p, n, v)
    })
}

/// Writes a MULTI_SZ value from elements joined by the literal `\0`.
///
/// # Safety
///
/// Pointer arguments must be null or point to NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn RegWriteMultiStringValue(
    root: *const c_char,
    path: *const c_char,
    name: *const c_char,
    value: *const c_char,
) -> u32 {
    write_value(root, path, name, value, |t, r, p, n, v| {
        t.write_multi_string(r, p, n, v)
    })
}

/// Writes a BINARY value from hex text.
///
/// # Safety
///
/// Pointer arguments must be null or point to NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn RegWriteBinaryValue(
    root: *const c_char,
    path: *const c_char,
    name: *const c_char,
    value: *const c_char,
) -> u32 {
    write_value(root, path, name, value, |t, r, p, n, v| {
        t.write_binary(r, p, n, v)
    })
}

/// Writes a DWORD value from decimal text.
///
/// # Safety
///
/// Pointer arguments must be null or point to NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn RegWriteDwordValue(
    root: *const c_char,
    path: *const c_char,
    name: *const c_char,
    value: *const c_char,
) -> u32 {
    write_value(root, path, name, value, |t, r, p, n, v| {
        t.write_dword(r, p, n, v)
    })
}

/// Writes a QWORD value from decimal text.
///
/// # Safety
///
/// Pointer arguments must be null or point to NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn RegWriteQwordValue(
    root: *const c_char,
    path: *const c_char,
    name: *const c_char,
    value: *const c_char,
) -> u32 {
    write_value(root, path, name, value, |t, r, p, n, v| {
        t.write_qword(r, p, n, v)
    })
}

/// JSON snapshot of a key. Non-zero `recursive` includes the whole subtree.
///
/// # Safety
///
/// Pointer arguments must be null or point to NUL-terminated strings.
#[cfg(feature = "serde")]
#[no_mangle]
pub unsafe extern "C" fn RegExportKey(
    root: *const c_char,
    path: *const c_char,
    recursive: u32,
) -> *mut c_char {
    read_key(root, path, "", |t, r, p| t.export_json(r, p, recursive != 0))
}

/// Writes a JSON snapshot below a key. Non-zero `purge` deletes the
/// destination subtree first.
///
/// # Safety
///
/// Pointer arguments must be null or point to NUL-terminated strings.
#[cfg(feature = "serde")]
#[no_mangle]
pub unsafe extern "C" fn RegImportKey(
    root: *const c_char,
    path: *const c_char,
    json: *const c_char,
    purge: u32,
) -> u32 {
    guard(status::OS_ERROR, || match (arg(root), arg(path), arg(json)) {
        (Some(root), Some(path), Some(json)) => {
            Text::system().import_json(root, path, json, purge != 0)
        }
        _ => status::INVALID_INPUT,
    })
}
