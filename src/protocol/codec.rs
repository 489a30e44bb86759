//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Request (Command) Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! An OK response payload carries one tagged reply:
//! - 0x00 NONE:  empty
//! - 0x01 VALUE: bytes
//! - 0x02 FLAG:  1 byte (0 or 1)
//! - 0x03 COUNT: u64
//! - 0x04 KEYS:  count (4) + [len (4) + bytes] per key
//! - 0x05 PAGE:  has_more (1) + count (4) + [len (4) + bytes] per key
//! - 0x06 PONG:  empty

use std::io::{Read, Write};

use crate::error::{Result, StoreError};
use crate::store::{KeyPage, OwnerId};
use super::{Command, Reply, Response};

/// Header size: 1 byte command/status + 4 bytes length
pub const HEADER_SIZE: usize = 5;

/// Maximum payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

// =============================================================================
// Command Encoding
// =============================================================================

/// Encode a command to bytes
///
/// Format: cmd_type (1) + payload_len (4) + payload
pub fn encode_command(command: &Command) -> Vec<u8> {
    let cmd_type = command.command_type() as u8;

    // Build payload based on command type
    let mut payload = Vec::new();
    match command {
        Command::Set { key, value } => {
            put_prefixed(&mut payload, key.as_bytes());
            payload.extend_from_slice(value.as_bytes());
        }
        Command::Get { key } | Command::Remove { key } | Command::Exists { key } => {
            put_prefixed(&mut payload, key.as_bytes());
        }
        Command::GetFrom { owner, key } | Command::ExistsFor { owner, key } => {
            put_prefixed(&mut payload, owner.as_str().as_bytes());
            payload.extend_from_slice(key.as_bytes());
        }
        Command::Keys | Command::Count | Command::Ping => {}
        Command::KeysFor { owner } | Command::CountFor { owner } => {
            put_prefixed(&mut payload, owner.as_str().as_bytes());
        }
        Command::Page { offset, limit } => {
            payload.extend_from_slice(&offset.to_be_bytes());
            payload.extend_from_slice(&limit.to_be_bytes());
        }
        Command::PageFor {
            owner,
            offset,
            limit,
        } => {
            put_prefixed(&mut payload, owner.as_str().as_bytes());
            payload.extend_from_slice(&offset.to_be_bytes());
            payload.extend_from_slice(&limit.to_be_bytes());
        }
        Command::Hello { owner } => {
            payload.extend_from_slice(owner.as_str().as_bytes());
        }
    }

    // Build full message: header + payload
    frame(cmd_type, &payload)
}

// =============================================================================
// Command Decoding
// =============================================================================

/// Decode a command from bytes
pub fn decode_command(bytes: &[u8]) -> Result<Command> {
    let (tag, payload) = split_frame(bytes, "command")?;

    match tag {
        0x01 => {
            let (key, at) = take_prefixed_str(payload, 0, "SET key")?;
            let value = utf8(&payload[at..], "SET value")?;
            Ok(Command::Set { key, value })
        }
        0x02 => {
            let (key, _) = take_prefixed_str(payload, 0, "GET key")?;
            Ok(Command::Get { key })
        }
        0x03 => {
            let (owner, at) = take_prefixed_str(payload, 0, "GET_FROM owner")?;
            let key = utf8(&payload[at..], "GET_FROM key")?;
            Ok(Command::GetFrom {
                owner: OwnerId::new(owner),
                key,
            })
        }
        0x04 => {
            let (key, _) = take_prefixed_str(payload, 0, "REMOVE key")?;
            Ok(Command::Remove { key })
        }
        0x05 => {
            let (key, _) = take_prefixed_str(payload, 0, "EXISTS key")?;
            Ok(Command::Exists { key })
        }
        0x06 => {
            let (owner, at) = take_prefixed_str(payload, 0, "EXISTS_FOR owner")?;
            let key = utf8(&payload[at..], "EXISTS_FOR key")?;
            Ok(Command::ExistsFor {
                owner: OwnerId::new(owner),
                key,
            })
        }
        0x07 => {
            expect_empty(payload, "KEYS")?;
            Ok(Command::Keys)
        }
        0x08 => {
            let (owner, _) = take_prefixed_str(payload, 0, "KEYS_FOR owner")?;
            Ok(Command::KeysFor {
                owner: OwnerId::new(owner),
            })
        }
        0x09 => {
            expect_empty(payload, "COUNT")?;
            Ok(Command::Count)
        }
        0x0A => {
            let (owner, _) = take_prefixed_str(payload, 0, "COUNT_FOR owner")?;
            Ok(Command::CountFor {
                owner: OwnerId::new(owner),
            })
        }
        0x0B => {
            let (offset, at) = take_u64(payload, 0, "PAGE offset")?;
            let (limit, _) = take_u64(payload, at, "PAGE limit")?;
            Ok(Command::Page { offset, limit })
        }
        0x0C => {
            let (owner, at) = take_prefixed_str(payload, 0, "PAGE_FOR owner")?;
            let (offset, at) = take_u64(payload, at, "PAGE_FOR offset")?;
            let (limit, _) = take_u64(payload, at, "PAGE_FOR limit")?;
            Ok(Command::PageFor {
                owner: OwnerId::new(owner),
                offset,
                limit,
            })
        }
        0x0D => {
            let owner = utf8(payload, "HELLO owner")?;
            Ok(Command::Hello {
                owner: OwnerId::new(owner),
            })
        }
        0x0E => {
            expect_empty(payload, "PING")?;
            Ok(Command::Ping)
        }
        _ => Err(StoreError::Protocol(format!(
            "Unknown command type: 0x{:02x}",
            tag
        ))),
    }
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
///
/// Format: status (1) + payload_len (4) + payload
pub fn encode_response(response: &Response) -> Vec<u8> {
    let payload = match response {
        Response::Ok(reply) => encode_reply(reply),
        Response::NotFound | Response::Unauthorized => Vec::new(),
        Response::Error(message) => message.as_bytes().to_vec(),
    };

    frame(response.status() as u8, &payload)
}

/// Decode a response from bytes
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    let (status_byte, payload) = split_frame(bytes, "response")?;

    match status_byte {
        0x00 => Ok(Response::Ok(decode_reply(payload)?)),
        0x01 => Ok(Response::NotFound),
        0x02 => Ok(Response::Unauthorized),
        0x03 => Ok(Response::Error(utf8(payload, "error message")?)),
        _ => Err(StoreError::Protocol(format!(
            "Unknown response status: 0x{:02x}",
            status_byte
        ))),
    }
}

/// Encode a typed reply into an OK payload
fn encode_reply(reply: &Reply) -> Vec<u8> {
    let mut payload = Vec::new();
    match reply {
        Reply::None => payload.push(0x00),
        Reply::Value(value) => {
            payload.push(0x01);
            payload.extend_from_slice(value.as_bytes());
        }
        Reply::Flag(flag) => {
            payload.push(0x02);
            payload.push(u8::from(*flag));
        }
        Reply::Count(count) => {
            payload.push(0x03);
            payload.extend_from_slice(&count.to_be_bytes());
        }
        Reply::Keys(keys) => {
            payload.push(0x04);
            put_key_list(&mut payload, keys);
        }
        Reply::Page(page) => {
            payload.push(0x05);
            payload.push(u8::from(page.has_more));
            put_key_list(&mut payload, &page.keys);
        }
        Reply::Pong => payload.push(0x06),
    }
    payload
}

/// Decode an OK payload into a typed reply
fn decode_reply(payload: &[u8]) -> Result<Reply> {
    let Some((&tag, data)) = payload.split_first() else {
        return Err(StoreError::Protocol("Empty OK payload".to_string()));
    };

    match tag {
        0x00 => {
            expect_empty(data, "NONE reply")?;
            Ok(Reply::None)
        }
        0x01 => Ok(Reply::Value(utf8(data, "VALUE reply")?)),
        0x02 => match data {
            [0] => Ok(Reply::Flag(false)),
            [1] => Ok(Reply::Flag(true)),
            _ => Err(StoreError::Protocol("Malformed FLAG reply".to_string())),
        },
        0x03 => {
            let (count, _) = take_u64(data, 0, "COUNT reply")?;
            Ok(Reply::Count(count))
        }
        0x04 => {
            let (keys, _) = take_key_list(data, 0)?;
            Ok(Reply::Keys(keys))
        }
        0x05 => {
            let Some((&more, data)) = data.split_first() else {
                return Err(StoreError::Protocol("Truncated PAGE reply".to_string()));
            };
            let (keys, _) = take_key_list(data, 0)?;
            Ok(Reply::Page(KeyPage {
                keys,
                has_more: more != 0,
            }))
        }
        0x06 => {
            expect_empty(data, "PONG reply")?;
            Ok(Reply::Pong)
        }
        _ => Err(StoreError::Protocol(format!(
            "Unknown reply tag: 0x{:02x}",
            tag
        ))),
    }
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read a complete command from a stream
///
/// Blocks until a complete command is received or an error occurs
pub fn read_command<R: Read>(reader: &mut R) -> Result<Command> {
    let message = read_frame(reader)?;
    decode_command(&message)
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    writer.write_all(&encode_command(command))?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    let message = read_frame(reader)?;
    decode_response(&message)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    writer.write_all(&encode_response(response))?;
    writer.flush()?;
    Ok(())
}

/// Read one framed message (header + payload) from a stream
fn read_frame<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let payload_len = u32::from_be_bytes([header[1], header[2], header[3], header[4]]) as usize;
    if payload_len > MAX_PAYLOAD_SIZE as usize {
        return Err(StoreError::Protocol(format!(
            "Payload too large: {} bytes (max {})",
            payload_len, MAX_PAYLOAD_SIZE
        )));
    }

    let mut message = vec![0u8; HEADER_SIZE + payload_len];
    message[..HEADER_SIZE].copy_from_slice(&header);
    if payload_len > 0 {
        reader.read_exact(&mut message[HEADER_SIZE..])?;
    }

    Ok(message)
}

// =============================================================================
// Byte-level helpers
// =============================================================================

/// Build a framed message: tag (1) + payload_len (4) + payload
fn frame(tag: u8, payload: &[u8]) -> Vec<u8> {
    let mut message = Vec::with_capacity(HEADER_SIZE + payload.len());
    message.push(tag);
    message.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    message.extend_from_slice(payload);
    message
}

/// Split a framed message into its tag and payload, validating lengths
fn split_frame<'a>(bytes: &'a [u8], what: &str) -> Result<(u8, &'a [u8])> {
    if bytes.len() < HEADER_SIZE {
        return Err(StoreError::Protocol(format!(
            "Incomplete {} header: expected {} bytes, got {}",
            what,
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let tag = bytes[0];
    let payload_len = u32::from_be_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]) as usize;

    if payload_len > MAX_PAYLOAD_SIZE as usize {
        return Err(StoreError::Protocol(format!(
            "Payload too large: {} bytes (max {})",
            payload_len, MAX_PAYLOAD_SIZE
        )));
    }

    let total_len = HEADER_SIZE + payload_len;
    if bytes.len() < total_len {
        return Err(StoreError::Protocol(format!(
            "Incomplete {} payload: expected {} bytes, got {}",
            what,
            total_len,
            bytes.len()
        )));
    }

    Ok((tag, &bytes[HEADER_SIZE..total_len]))
}

/// Append a length-prefixed field
fn put_prefixed(buf: &mut Vec<u8>, bytes: &[u8]) {
    buf.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    buf.extend_from_slice(bytes);
}

/// Append a key list: count (4) + length-prefixed keys
fn put_key_list(buf: &mut Vec<u8>, keys: &[String]) {
    buf.extend_from_slice(&(keys.len() as u32).to_be_bytes());
    for key in keys {
        put_prefixed(buf, key.as_bytes());
    }
}

/// Read a length-prefixed string at `at`, returning it and the next offset
fn take_prefixed_str(payload: &[u8], at: usize, what: &str) -> Result<(String, usize)> {
    let (len, at) = take_u32(payload, at, what)?;
    let len = len as usize;

    if payload.len() < at + len {
        return Err(StoreError::Protocol(format!(
            "{}: incomplete field (expected {}, got {})",
            what,
            len,
            payload.len() - at
        )));
    }

    let field = utf8(&payload[at..at + len], what)?;
    Ok((field, at + len))
}

/// Read a big-endian u32 at `at`
fn take_u32(payload: &[u8], at: usize, what: &str) -> Result<(u32, usize)> {
    let Some(bytes) = payload.get(at..at + 4) else {
        return Err(StoreError::Protocol(format!("{}: missing length", what)));
    };
    let value = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    Ok((value, at + 4))
}

/// Read a big-endian u64 at `at`
fn take_u64(payload: &[u8], at: usize, what: &str) -> Result<(u64, usize)> {
    let Some(bytes) = payload.get(at..at + 8) else {
        return Err(StoreError::Protocol(format!("{}: missing field", what)));
    };
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    Ok((u64::from_be_bytes(buf), at + 8))
}

/// Read a key list at `at`: count (4) + length-prefixed keys
fn take_key_list(payload: &[u8], at: usize) -> Result<(Vec<String>, usize)> {
    let (count, mut at) = take_u32(payload, at, "key list")?;

    let mut keys = Vec::with_capacity(count.min(1024) as usize);
    for _ in 0..count {
        let (key, next) = take_prefixed_str(payload, at, "key list entry")?;
        keys.push(key);
        at = next;
    }

    Ok((keys, at))
}

/// Validate UTF-8 and convert to an owned string
fn utf8(bytes: &[u8], what: &str) -> Result<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|_| StoreError::Protocol(format!("{}: invalid UTF-8", what)))
}

/// Reject non-empty payloads for commands that take none
fn expect_empty(payload: &[u8], what: &str) -> Result<()> {
    if !payload.is_empty() {
        return Err(StoreError::Protocol(format!(
            "{}: unexpected payload of {} bytes",
            what,
            payload.len()
        )));
    }
    Ok(())
}
