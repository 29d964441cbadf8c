//! Python bindings for the registry facade using PyO3.
//!
//! Every function releases the GIL while it talks to the registry and turns
//! facade errors into the matching Python exception.

use pyo3::exceptions::{
    PyFileNotFoundError, PyOSError, PyPermissionError, PyRuntimeError, PyValueError,
};
use pyo3::prelude::*;
use pyo3::types::PyBytes;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::windows::WinRegistryStore;
use crate::{Registry, RegistryError};

/// Convert Rust RegistryError to Python exception
fn registry_error_to_py(err: RegistryError) -> PyErr {
    let message = err.to_string();
    match err {
        RegistryError::NotFound(_) => PyFileNotFoundError::new_err(message),

        RegistryError::AccessDenied(_) => PyPermissionError::new_err(message),

        RegistryError::InvalidHive(_)
        | RegistryError::InvalidPath { .. }
        | RegistryError::InvalidInput(_)
        | RegistryError::TypeMismatch { .. } => PyValueError::new_err(message),

        RegistryError::CorruptValue { .. } | RegistryError::Os(_) => PyOSError::new_err(message),
    }
}

/// Runs `f` against the system registry without the GIL, with panic protection.
fn run<T, F>(py: Python<'_>, f: F) -> PyResult<T>
where
    T: Send,
    F: FnOnce(&Registry<WinRegistryStore>) -> crate::Result<T> + Send,
{
    py.allow_threads(move || {
        catch_unwind(AssertUnwindSafe(|| f(&Registry::system())))
            .map_err(|panic_err| {
                let panic_msg = if let Some(s) = panic_err.downcast_ref::<&str>() {
                    format!("Rust panic: {}", s)
                } else if let Some(s) = panic_err.downcast_ref::<String>() {
                    format!("Rust panic: {}", s)
                } else {
                    "Rust panic: unknown error".to_string()
                };
                PyRuntimeError::new_err(panic_msg)
            })?
            .map_err(registry_error_to_py)
    })
}

/// Return True if the key exists
#[pyfunction]
fn key_exists(py: Python<'_>, root: &str, path: &str) -> bool {
    py.allow_threads(|| Registry::system().key_exists(root, path))
}

/// List the names of the immediate subkeys
#[pyfunction]
fn list_subkeys(py: Python<'_>, root: &str, path: &str) -> PyResult<Vec<String>> {
    run(py, |reg| reg.list_subkeys(root, path))
}

/// List the value names of a key, sorted
#[pyfunction]
fn list_values(py: Python<'_>, root: &str, path: &str) -> PyResult<Vec<String>> {
    run(py, |reg| reg.list_values(root, path))
}

/// Get the type tag of a value ("SZ", "DWORD", ...)
#[pyfunction]
fn value_type(py: Python<'_>, root: &str, path: &str, name: &str) -> PyResult<&'static str> {
    run(py, |reg| reg.value_type(root, path, name).map(|t| t.tag()))
}

/// Read an SZ or EXPAND_SZ value verbatim
#[pyfunction]
fn read_string(py: Python<'_>, root: &str, path: &str, name: &str) -> PyResult<String> {
    run(py, |reg| reg.read_string(root, path, name))
}

/// Read a string value with environment variables expanded
#[pyfunction]
fn read_string_expanded(py: Python<'_>, root: &str, path: &str, name: &str) -> PyResult<String> {
    run(py, |reg| reg.read_string_expanded(root, path, name))
}

/// Read a MULTI_SZ value as a list
#[pyfunction]
fn read_multi_string(
    py: Python<'_>,
    root: &str,
    path: &str,
    name: &str,
) -> PyResult<Vec<String>> {
    run(py, |reg| reg.read_multi_string(root, path, name))
}

/// Read a BINARY value as bytes
#[pyfunction]
fn read_binary<'py>(
    py: Python<'py>,
    root: &str,
    path: &str,
    name: &str,
) -> PyResult<&'py PyBytes> {
    let bytes = run(py, |reg| reg.read_binary(root, path, name))?;
    Ok(PyBytes::new(py, &bytes))
}

/// Read a DWORD or QWORD value
#[pyfunction]
fn read_integer(py: Python<'_>, root: &str, path: &str, name: &str) -> PyResult<u64> {
    run(py, |reg| reg.read_integer(root, path, name))
}

/// Get (subkey_count, value_count, last_written_unix_seconds) for a key
#[pyfunction]
fn key_info(py: Python<'_>, root: &str, path: &str) -> PyResult<(u32, u32, Option<i64>)> {
    let info = run(py, |reg| reg.key_info(root, path))?;
    Ok((
        info.subkey_count,
        info.value_count,
        info.last_written.map(|dt| dt.timestamp()),
    ))
}

/// Create a key and any missing parents
#[pyfunction]
fn create_key(py: Python<'_>, root: &str, path: &str) -> PyResult<()> {
    run(py, |reg| reg.create_key(root, path))
}

/// Delete a key and its whole subtree
#[pyfunction]
fn delete_key(py: Python<'_>, root: &str, path: &str) -> PyResult<()> {
    run(py, |reg| reg.delete_key(root, path))
}

/// Delete a single value
#[pyfunction]
fn delete_value(py: Python<'_>, root: &str, path: &str, name: &str) -> PyResult<()> {
    run(py, |reg| reg.delete_value(root, path, name))
}

/// Write an SZ value
#[pyfunction]
fn write_string(py: Python<'_>, root: &str, path: &str, name: &str, value: &str) -> PyResult<()> {
    run(py, |reg| reg.write_string(root, path, name, value))
}

/// Write an EXPAND_SZ value
#[pyfunction]
fn write_expand_string(
    py: Python<'_>,
    root: &str,
    path: &str,
    name: &str,
    value: &str,
) -> PyResult<()> {
    run(py, |reg| reg.write_expand_string(root, path, name, value))
}

/// Write a MULTI_SZ value from a list of non-empty strings
#[pyfunction]
fn write_multi_string(
    py: Python<'_>,
    root: &str,
    path: &str,
    name: &str,
    values: Vec<String>,
) -> PyResult<()> {
    run(py, |reg| reg.write_multi_string(root, path, name, values.as_slice()))
}

/// Write a BINARY value
#[pyfunction]
fn write_binary(py: Python<'_>, root: &str, path: &str, name: &str, value: &[u8]) -> PyResult<()> {
    run(py, |reg| reg.write_binary(root, path, name, value))
}

/// Write a DWORD value
#[pyfunction]
fn write_dword(py: Python<'_>, root: &str, path: &str, name: &str, value: u32) -> PyResult<()> {
    run(py, |reg| reg.write_dword(root, path, name, value))
}

/// Write a QWORD value
#[pyfunction]
fn write_qword(py: Python<'_>, root: &str, path: &str, name: &str, value: u64) -> PyResult<()> {
    run(py, |reg| reg.write_qword(root, path, name, value))
}

/// Python module definition
#[pymodule]
fn reg_facade(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(key_exists, m)?)?;
    m.add_function(wrap_pyfunction!(list_subkeys, m)?)?;
    m.add_function(wrap_pyfunction!(list_values, m)?)?;
    m.add_function(wrap_pyfunction!(value_type, m)?)?;
    m.add_function(wrap_pyfunction!(read_string, m)?)?;
    m.add_function(wrap_pyfunction!(read_string_expanded, m)?)?;
    m.add_function(wrap_pyfunction!(read_multi_string, m)?)?;
    m.add_function(wrap_pyfunction!(read_binary, m)?)?;
    m.add_function(wrap_pyfunction!(read_integer, m)?)?;
    m.add_function(wrap_pyfunction!(key_info, m)?)?;
    m.add_function(wrap_pyfunction!(create_key, m)?)?;
    m.add_function(wrap_pyfunction!(delete_key, m)?)?;
    m.add_function(wrap_pyfunction!(delete_value, m)?)?;
    m.add_function(wrap_pyfunction!(write_string, m)?)?;
    m.add_function(wrap_pyfunction!(write_expand_string, m)?)?;
    m.add_function(wrap_pyfunction!(write_multi_string, m)?)?;
    m.add_function(wrap_pyfunction!(write_binary, m)?)?;
    m.add_function(wrap_pyfunction!(write_dword, m)?)?;
    m.add_function(wrap_pyfunction!(write_qword, m)?)?;

    // Add version constant
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
