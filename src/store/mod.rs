//! Store Module
//!
//! Per-owner namespaces of string keys mapped to string values.
//!
//! ## Responsibilities
//! - Isolated key space per owner, created implicitly on first write
//! - O(1) lookup and existence checks
//! - Ordered key index per namespace for enumeration and pagination
//! - Commit-ordered change notifications
//!
//! ## Data Structure Choice
//! Each namespace pairs a HashMap with an explicit ordered key index:
//! - `entries`: key → value (lookup, existence)
//! - `key_order`: enumeration order (insertion order, perturbed by removal)
//! - `positions`: key → index slot, so removal never scans the index
//!
//! Removal uses swap-and-pop on the index: the removed slot is backfilled
//! with the last key. O(1), but the backfilled key changes position in
//! later enumerations. Callers that page through keys across removals see
//! the post-swap order.

mod namespace;
mod kv;

pub use kv::KvStore;
pub use namespace::Namespace;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum key length in bytes
pub const MAX_KEY_LEN: usize = 256;

/// Maximum value length in bytes
pub const MAX_VALUE_LEN: usize = 8192;

/// Opaque principal identifier that names a namespace
///
/// Comparable and hashable; the store never interprets its contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    /// Create an owner id from anything string-like
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// View the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OwnerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for OwnerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One page of keys from a namespace index
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyPage {
    /// Keys in current index order, at most the requested limit
    pub keys: Vec<String>,

    /// Whether more keys follow this page
    pub has_more: bool,
}
