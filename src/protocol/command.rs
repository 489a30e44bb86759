//! Command definitions
//!
//! Represents commands from clients.

use crate::store::OwnerId;

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    Set = 0x01,
    Get = 0x02,
    GetFrom = 0x03,
    Remove = 0x04,
    Exists = 0x05,
    ExistsFor = 0x06,
    Keys = 0x07,
    KeysFor = 0x08,
    Count = 0x09,
    CountFor = 0x0A,
    Page = 0x0B,
    PageFor = 0x0C,
    Hello = 0x0D,
    Ping = 0x0E,
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Store or overwrite a key in the caller's namespace
    Set { key: String, value: String },

    /// Fetch a value from the caller's namespace
    Get { key: String },

    /// Fetch a value from any namespace
    GetFrom { owner: OwnerId, key: String },

    /// Remove a key from the caller's namespace
    Remove { key: String },

    /// Check key presence in the caller's namespace
    Exists { key: String },

    /// Check key presence in any namespace
    ExistsFor { owner: OwnerId, key: String },

    /// Enumerate the caller's key index
    Keys,

    /// Enumerate any namespace's key index
    KeysFor { owner: OwnerId },

    /// Count keys in the caller's namespace
    Count,

    /// Count keys in any namespace
    CountFor { owner: OwnerId },

    /// One page of the caller's key index
    Page { offset: u64, limit: u64 },

    /// One page of any namespace's key index
    PageFor {
        owner: OwnerId,
        offset: u64,
        limit: u64,
    },

    /// Bind the connection to a caller identity
    Hello { owner: OwnerId },

    /// Ping (health check)
    Ping,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Set { .. } => CommandType::Set,
            Command::Get { .. } => CommandType::Get,
            Command::GetFrom { .. } => CommandType::GetFrom,
            Command::Remove { .. } => CommandType::Remove,
            Command::Exists { .. } => CommandType::Exists,
            Command::ExistsFor { .. } => CommandType::ExistsFor,
            Command::Keys => CommandType::Keys,
            Command::KeysFor { .. } => CommandType::KeysFor,
            Command::Count => CommandType::Count,
            Command::CountFor { .. } => CommandType::CountFor,
            Command::Page { .. } => CommandType::Page,
            Command::PageFor { .. } => CommandType::PageFor,
            Command::Hello { .. } => CommandType::Hello,
            Command::Ping => CommandType::Ping,
        }
    }
}
