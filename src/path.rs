//! Key path normalization.
//!
//! Callers may separate segments with `/` or `\`. Paths are normalized to
//! backslashes, the separator the registry API expects.

use crate::error::{RegistryError, Result};
use std::fmt;

/// Separator used by the registry API.
pub const SEPARATOR: char = '\\';

/// A validated, normalized key path relative to a hive root.
///
/// The empty path designates the hive root itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    /// Parses a slash- or backslash-separated path.
    ///
    /// Leading and trailing separators are ignored.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::InvalidPath` if an interior segment is empty
    /// (`Software//Vendor`).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use reg_facade::KeyPath;
    ///
    /// let path = KeyPath::parse("Software/ExampleApp").unwrap();
    /// assert_eq!(path.to_string(), "Software\\ExampleApp");
    /// ```
    pub fn parse(path: &str) -> Result<Self> {
        let trimmed = path.trim_matches(|c| c == '/' || c == SEPARATOR);
        if trimmed.is_empty() {
            return Ok(Self::root());
        }

        let mut segments = Vec::new();
        for segment in trimmed.split(|c| c == '/' || c == SEPARATOR) {
            if segment.is_empty() {
                return Err(RegistryError::invalid_path(path, "empty path segment"));
            }
            segments.push(segment.to_string());
        }

        Ok(Self { segments })
    }

    /// The hive root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns true for the hive root.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Path segments, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Last segment, or `None` for the root.
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Returns the path of an immediate child key.
    pub fn join(&self, child: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(child.to_string());
        Self { segments }
    }

    /// Returns the parent path, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Normalized backslash form, as handed to the registry API.
    pub fn to_native(&self) -> String {
        self.segments.join("\\")
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_native())
    }
}
