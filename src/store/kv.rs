//! KvStore implementation
//!
//! Owner-keyed map of namespaces behind a single RwLock.
//!
//! ## Concurrency Model: Single-Writer / Multiple-Reader (SWMR)
//!
//! - **Writes** (set/remove): take the write side of the lock. Validation
//!   runs before the lock is taken; a rejected write never touches state.
//!   The matching event is published before the lock is released, so
//!   observers receive events in commit order.
//!
//! - **Reads** (get/exists/keys/count/pages): take the read side and run
//!   concurrently with each other. A reader never observes a
//!   partially-applied mutation.

use std::collections::HashMap;

use crossbeam::channel::Receiver;
use parking_lot::RwLock;

use crate::error::{Result, StoreError};
use crate::events::{EventBus, StoreEvent};
use super::{KeyPage, Namespace, OwnerId, MAX_KEY_LEN, MAX_VALUE_LEN};

/// The namespaced key-value store
///
/// Namespaces come into being on the first successful `set` and stay
/// addressable forever; reads against an owner that never wrote anything
/// return empty results rather than failing.
#[derive(Default)]
pub struct KvStore {
    /// owner → namespace record
    namespaces: RwLock<HashMap<OwnerId, Namespace>>,

    /// Change notification fan-out
    events: EventBus,
}

impl KvStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer for committed mutations
    pub fn subscribe(&self) -> Receiver<StoreEvent> {
        self.events.subscribe()
    }

    // =========================================================================
    // Write Path
    // =========================================================================

    /// Store or overwrite a value in an owner's namespace
    ///
    /// A new key is appended to the namespace's key index; an overwrite
    /// leaves index and count untouched. Emits `ValueStored` or
    /// `ValueUpdated` accordingly.
    pub fn set(&self, owner: &OwnerId, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        validate_value(value)?;

        let mut namespaces = self.namespaces.write();
        let namespace = namespaces.entry(owner.clone()).or_default();

        let event = match namespace.insert(key.to_string(), value.to_string()) {
            None => {
                tracing::debug!(%owner, key, "stored new key");
                StoreEvent::ValueStored {
                    owner: owner.clone(),
                    key: key.to_string(),
                    value: value.to_string(),
                }
            }
            Some(old_value) => {
                tracing::debug!(%owner, key, "updated existing key");
                StoreEvent::ValueUpdated {
                    owner: owner.clone(),
                    key: key.to_string(),
                    old_value,
                    new_value: value.to_string(),
                }
            }
        };

        self.events.publish(event);
        Ok(())
    }

    /// Remove a key from an owner's namespace
    ///
    /// Fails with `KeyNotFound` when the key is absent; presence is judged
    /// by the entry map, never by value content. Emits `ValueDeleted` with
    /// the removed value.
    pub fn remove(&self, owner: &OwnerId, key: &str) -> Result<()> {
        let mut namespaces = self.namespaces.write();
        let removed = namespaces
            .get_mut(owner)
            .and_then(|namespace| namespace.remove(key))
            .ok_or(StoreError::KeyNotFound)?;

        tracing::debug!(%owner, key, "removed key");
        self.events.publish(StoreEvent::ValueDeleted {
            owner: owner.clone(),
            key: key.to_string(),
            value: removed,
        });
        Ok(())
    }

    // =========================================================================
    // Read Path
    // =========================================================================

    /// Fetch a value, or `""` when the key is absent
    ///
    /// Absence is communicated as data, not as an error; use [`exists`]
    /// to tell an absent key from a present-but-empty value.
    ///
    /// [`exists`]: KvStore::exists
    pub fn get(&self, owner: &OwnerId, key: &str) -> String {
        self.namespaces
            .read()
            .get(owner)
            .and_then(|namespace| namespace.get(key))
            .unwrap_or_default()
            .to_string()
    }

    /// Whether a key is present in an owner's namespace
    pub fn exists(&self, owner: &OwnerId, key: &str) -> bool {
        self.namespaces
            .read()
            .get(owner)
            .is_some_and(|namespace| namespace.contains(key))
    }

    // =========================================================================
    // Enumeration
    // =========================================================================

    /// All keys of a namespace in current index order
    pub fn keys(&self, owner: &OwnerId) -> Vec<String> {
        self.namespaces
            .read()
            .get(owner)
            .map(|namespace| namespace.keys().to_vec())
            .unwrap_or_default()
    }

    /// Number of keys in a namespace
    pub fn key_count(&self, owner: &OwnerId) -> usize {
        self.namespaces
            .read()
            .get(owner)
            .map(Namespace::len)
            .unwrap_or(0)
    }

    /// One page of a namespace's key index
    ///
    /// `offset` past the end yields an empty page with `has_more` false;
    /// a `limit` larger than what remains is silently truncated.
    pub fn keys_paginated(&self, owner: &OwnerId, offset: usize, limit: usize) -> KeyPage {
        self.namespaces
            .read()
            .get(owner)
            .map(|namespace| namespace.page(offset, limit))
            .unwrap_or_default()
    }
}

// =============================================================================
// Write-Path Validation
// =============================================================================

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(StoreError::EmptyKey);
    }
    if key.len() > MAX_KEY_LEN {
        return Err(StoreError::KeyTooLong { len: key.len() });
    }
    Ok(())
}

fn validate_value(value: &str) -> Result<()> {
    if value.len() > MAX_VALUE_LEN {
        return Err(StoreError::ValueTooLong { len: value.len() });
    }
    Ok(())
}
