//! Storage key derivation.
//!
//! Every key a backend reads or writes is `namespace + ":" + key`. The
//! separator is not escaped: application keys that differ only by embedded
//! `:` characters can collide across namespaces, and callers are expected to
//! pick keys accordingly.

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

/// Separator placed between the namespace and the application key.
pub const KEY_SEPARATOR: char = ':';

/// Prefix partitioning one physical store among independent consumers.
///
/// A backend is bound to exactly one namespace for its whole lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namespace(String);

impl Namespace {
    /// Creates a namespace from the application name or configured prefix.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the namespace name without separator.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derives the fully-qualified storage key for an application key.
    ///
    /// ```
    /// use cellar_backend::Namespace;
    ///
    /// let ns = Namespace::new("app");
    /// assert_eq!(ns.key("user:1").as_str(), "app:user:1");
    /// ```
    pub fn key(&self, key: &str) -> StorageKey {
        StorageKey(self.pattern(key))
    }

    /// Builds the prefix every key matched by `pattern` starts with.
    ///
    /// An empty pattern yields `namespace + ":"`, which covers the whole
    /// namespace.
    pub fn pattern(&self, pattern: &str) -> String {
        let mut prefix = String::with_capacity(self.0.len() + 1 + pattern.len());
        prefix.push_str(&self.0);
        prefix.push(KEY_SEPARATOR);
        prefix.push_str(pattern);
        prefix
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Namespace {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Namespace {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Fully-qualified key as stored by a backend.
///
/// Only [`Namespace::key`] produces one, so a backend never sees an
/// unprefixed key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorageKey(String);

impl StorageKey {
    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Consumes the key and returns the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Deref for StorageKey {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
