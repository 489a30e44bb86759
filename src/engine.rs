//! Engine Module
//!
//! The access boundary between callers and the store core.
//!
//! ## Responsibilities
//! - Route protocol commands to store operations
//! - Enforce ownership: writes only ever land in the caller's namespace
//! - Keep the capability check out of the store core, so the core stays
//!   testable without any authentication layer
//!
//! ## Access Model
//!
//! Every connection carries an optional identity, bound by a HELLO
//! command at the transport layer. Commands that operate on "my
//! namespace" (SET, REMOVE, and the own-namespace read/enumeration
//! forms) need that identity; the engine rejects them with
//! `Unauthorized` when none is bound. The `...For` read forms name
//! their target namespace explicitly and are public — any caller,
//! identified or not, may use them.

use std::sync::Arc;

use crate::error::{Result, StoreError};
use crate::protocol::{Command, Reply};
use crate::store::{KvStore, OwnerId};

/// Routes commands against the store with the caller's identity
pub struct Engine {
    store: Arc<KvStore>,
}

impl Engine {
    /// Create an engine over a store
    pub fn new(store: Arc<KvStore>) -> Self {
        Self { store }
    }

    /// Create an engine over a fresh, empty store
    pub fn with_new_store() -> Self {
        Self::new(Arc::new(KvStore::new()))
    }

    /// The underlying store
    pub fn store(&self) -> &Arc<KvStore> {
        &self.store
    }

    /// Execute a command on behalf of `identity`
    ///
    /// `identity` is the namespace the caller proved ownership of at the
    /// transport layer, or `None` for an anonymous caller.
    pub fn execute(&self, identity: Option<&OwnerId>, command: Command) -> Result<Reply> {
        match command {
            // -----------------------------------------------------------------
            // Owner-restricted writes
            // -----------------------------------------------------------------
            Command::Set { key, value } => {
                let caller = require_identity(identity)?;
                self.store.set(caller, &key, &value)?;
                Ok(Reply::None)
            }
            Command::Remove { key } => {
                let caller = require_identity(identity)?;
                self.store.remove(caller, &key)?;
                Ok(Reply::None)
            }

            // -----------------------------------------------------------------
            // Own-namespace reads
            // -----------------------------------------------------------------
            Command::Get { key } => {
                let caller = require_identity(identity)?;
                Ok(Reply::Value(self.store.get(caller, &key)))
            }
            Command::Exists { key } => {
                let caller = require_identity(identity)?;
                Ok(Reply::Flag(self.store.exists(caller, &key)))
            }
            Command::Keys => {
                let caller = require_identity(identity)?;
                Ok(Reply::Keys(self.store.keys(caller)))
            }
            Command::Count => {
                let caller = require_identity(identity)?;
                Ok(Reply::Count(self.store.key_count(caller) as u64))
            }
            Command::Page { offset, limit } => {
                let caller = require_identity(identity)?;
                Ok(Reply::Page(self.store.keys_paginated(
                    caller,
                    offset as usize,
                    limit as usize,
                )))
            }

            // -----------------------------------------------------------------
            // Public reads into any namespace
            // -----------------------------------------------------------------
            Command::GetFrom { owner, key } => Ok(Reply::Value(self.store.get(&owner, &key))),
            Command::ExistsFor { owner, key } => Ok(Reply::Flag(self.store.exists(&owner, &key))),
            Command::KeysFor { owner } => Ok(Reply::Keys(self.store.keys(&owner))),
            Command::CountFor { owner } => {
                Ok(Reply::Count(self.store.key_count(&owner) as u64))
            }
            Command::PageFor {
                owner,
                offset,
                limit,
            } => Ok(Reply::Page(self.store.keys_paginated(
                &owner,
                offset as usize,
                limit as usize,
            ))),

            // -----------------------------------------------------------------
            // Transport-level commands
            // -----------------------------------------------------------------
            // Identity binding is connection state; a HELLO reaching the
            // engine means the transport failed to absorb it.
            Command::Hello { .. } => Err(StoreError::Protocol(
                "HELLO is handled by the connection layer".to_string(),
            )),
            Command::Ping => Ok(Reply::Pong),
        }
    }
}

/// The caller's identity, or `Unauthorized` for anonymous callers
fn require_identity(identity: Option<&OwnerId>) -> Result<&OwnerId> {
    identity.ok_or(StoreError::Unauthorized)
}
