//! # ScopeKV
//!
//! A namespaced key-value store with:
//! - Per-owner namespaces (isolated key spaces keyed by an opaque owner id)
//! - Public reads across namespaces, owner-restricted writes
//! - An ordered key index per namespace for paginated enumeration
//! - Commit-ordered change notifications for external observers
//! - TCP-based client protocol
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │                  (Multiple Clients)                          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Engine                                  │
//! │        (caller identity / ownership enforcement)             │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   KvStore   │─────────▶│  Observers  │
//!   │  (RwLock)   │  events  │ (channels)  │
//!   └──────┬──────┘          └─────────────┘
//!          │
//!          ▼
//!   ┌─────────────┐
//!   │  Namespace  │
//!   │ map + index │
//!   └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod events;
pub mod store;
pub mod network;
pub mod protocol;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, StoreError};
pub use config::Config;
pub use engine::Engine;
pub use events::StoreEvent;
pub use store::{KeyPage, KvStore, OwnerId, MAX_KEY_LEN, MAX_VALUE_LEN};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of ScopeKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
