//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Protocol Format (V1 - Simple Binary)
//!
//! ### Request Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Commands
//! - 0x01: SET         - Payload: key_len (4) + key + value
//! - 0x02: GET         - Payload: key_len (4) + key
//! - 0x03: GET_FROM    - Payload: owner_len (4) + owner + key
//! - 0x04: REMOVE      - Payload: key_len (4) + key
//! - 0x05: EXISTS      - Payload: key_len (4) + key
//! - 0x06: EXISTS_FOR  - Payload: owner_len (4) + owner + key
//! - 0x07: KEYS        - Payload: empty
//! - 0x08: KEYS_FOR    - Payload: owner_len (4) + owner
//! - 0x09: COUNT       - Payload: empty
//! - 0x0A: COUNT_FOR   - Payload: owner_len (4) + owner
//! - 0x0B: PAGE        - Payload: offset (8) + limit (8)
//! - 0x0C: PAGE_FOR    - Payload: owner_len (4) + owner + offset (8) + limit (8)
//! - 0x0D: HELLO       - Payload: owner
//! - 0x0E: PING        - Payload: empty
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Status Codes
//! - 0x00: OK            - Payload: tagged reply (see codec)
//! - 0x01: NOT_FOUND     - Payload: empty
//! - 0x02: UNAUTHORIZED  - Payload: empty
//! - 0x03: ERROR         - Payload: error message
//!
//! All integers are big-endian. Keys, values and owner ids travel as
//! UTF-8 bytes; a field without its own length prefix runs to the end
//! of the payload.

mod command;
mod response;
mod codec;

pub use command::{Command, CommandType};
pub use response::{Reply, Response, Status};
pub use codec::{
    decode_command, decode_response, encode_command, encode_response, read_command,
    read_response, write_command, write_response,
};
