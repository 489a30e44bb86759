//! Error types for ScopeKV
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using StoreError
pub type Result<T> = std::result::Result<T, StoreError>;

/// Unified error type for ScopeKV operations
#[derive(Debug, Error)]
pub enum StoreError {
    // -------------------------------------------------------------------------
    // Write-Path Validation Errors
    // -------------------------------------------------------------------------
    #[error("Key cannot be empty")]
    EmptyKey,

    #[error("Key too long: {len} bytes (max {max})", max = crate::store::MAX_KEY_LEN)]
    KeyTooLong { len: usize },

    #[error("Value too long: {len} bytes (max {max})", max = crate::store::MAX_VALUE_LEN)]
    ValueTooLong { len: usize },

    // -------------------------------------------------------------------------
    // Removal Errors
    // -------------------------------------------------------------------------
    #[error("Key does not exist")]
    KeyNotFound,

    // -------------------------------------------------------------------------
    // Access Errors
    // -------------------------------------------------------------------------
    #[error("Caller is not authorized to write to this namespace")]
    Unauthorized,

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
