//! Request definitions
//!
//! Message types, the request preamble and the four request bodies.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SmallError};

/// Size of the preamble on every client request
pub const PREAMBLE_SIZE: usize = 8;

/// Maximum length of a variable name, not counting the terminating NUL
pub const MAX_NAME_LEN: usize = 15;

/// Size of the fixed name field: name + NUL terminator + padding
pub const NAME_FIELD_SIZE: usize = MAX_NAME_LEN + 1;

/// Maximum length of a stored value
pub const MAX_VALUE_LEN: usize = 100;

/// Maximum length of the data in a digest request
pub const MAX_DIGEST_LEN: usize = 100;

/// Size of the fixed run selector field. Shorter selectors are NUL padded.
pub const SELECTOR_FIELD_SIZE: usize = 8;

/// Message types carried in the preamble
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum MessageType {
    Set = 0,
    Get = 1,
    Digest = 2,
    Run = 3,
}

impl MessageType {
    /// Lowercase name used in request logs
    pub fn name(self) -> &'static str {
        match self {
            MessageType::Set => "set",
            MessageType::Get => "get",
            MessageType::Digest => "digest",
            MessageType::Run => "run",
        }
    }
}

impl TryFrom<u16> for MessageType {
    type Error = SmallError;

    fn try_from(code: u16) -> Result<Self> {
        match code {
            0 => Ok(MessageType::Set),
            1 => Ok(MessageType::Get),
            2 => Ok(MessageType::Digest),
            3 => Ok(MessageType::Run),
            other => Err(SmallError::UnknownMessageType(other)),
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The fixed 8-byte header of every request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preamble {
    /// Shared key, compared for equality by the server
    pub secret_key: u32,

    /// Selects the body layout and the handler
    pub msg_type: MessageType,
}

/// One of the three diagnostic commands a Run request may select
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selector {
    Inet,
    Hosts,
    Services,
}

impl Selector {
    /// Every accepted selector
    pub const ALL: [Selector; 3] = [Selector::Inet, Selector::Hosts, Selector::Services];

    /// The token sent on the wire
    pub fn as_str(self) -> &'static str {
        match self {
            Selector::Inet => "inet",
            Selector::Hosts => "hosts",
            Selector::Services => "services",
        }
    }
}

impl FromStr for Selector {
    type Err = SmallError;

    fn from_str(token: &str) -> Result<Self> {
        Selector::ALL
            .into_iter()
            .find(|s| s.as_str() == token)
            .ok_or_else(|| SmallError::InvalidSelector(token.to_string()))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded request body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Store `value` under `name`
    Set { name: String, value: Vec<u8> },

    /// Fetch the value stored under `name`
    Get { name: String },

    /// Checksum `data` with the external utility
    Digest { data: Vec<u8> },

    /// Run one of the fixed diagnostic commands
    Run { selector: Selector },
}

impl Request {
    /// Get the message type
    pub fn message_type(&self) -> MessageType {
        match self {
            Request::Set { .. } => MessageType::Set,
            Request::Get { .. } => MessageType::Get,
            Request::Digest { .. } => MessageType::Digest,
            Request::Run { .. } => MessageType::Run,
        }
    }

    /// Short human-readable summary for request logs
    pub fn detail(&self) -> String {
        match self {
            Request::Set { name, value } => format!("{} ({} bytes)", name, value.len()),
            Request::Get { name } => name.clone(),
            Request::Digest { data } => format!("{} bytes", data.len()),
            Request::Run { selector } => selector.to_string(),
        }
    }

    /// Check every field bound, as both client and server must before acting
    pub fn validate(&self) -> Result<()> {
        match self {
            Request::Set { name, value } => {
                validate_name(name)?;
                check_len("value", value.len(), MAX_VALUE_LEN)
            }
            Request::Get { name } => validate_name(name),
            Request::Digest { data } => check_len("digest data", data.len(), MAX_DIGEST_LEN),
            Request::Run { .. } => Ok(()),
        }
    }
}

/// A variable name is at most 15 bytes of printable text
pub fn validate_name(name: &str) -> Result<()> {
    check_len("name", name.len(), MAX_NAME_LEN)?;
    if name.chars().any(char::is_control) {
        return Err(SmallError::InvalidName(name.escape_default().to_string()));
    }
    Ok(())
}

pub(crate) fn check_len(field: &'static str, len: usize, max: usize) -> Result<()> {
    if len > max {
        return Err(SmallError::FieldTooLong { field, len, max });
    }
    Ok(())
}
