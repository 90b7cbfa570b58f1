//! Inbound door commands and their wire vocabulary.
//!
//! Commands reach the [`AppService`](super::service::AppService) from the
//! panel buttons or as raw payloads taken off the message bus.  Parsing
//! happens here so adapters only ever move strings.

use core::fmt;

/// Capacity of a raw command payload taken from the bus.
pub const MAX_PAYLOAD_LEN: usize = 32;

/// Raw, unparsed bus payload.
pub type CommandPayload = heapless::String<MAX_PAYLOAD_LEN>;

/// Door actuation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DoorCommand {
    Open,
    Close,
}

impl DoorCommand {
    /// Parse a `setnewdoorstate` payload.  Exact match only: `open` or
    /// `close`, no case folding, no surrounding whitespace.
    pub fn from_payload(payload: &str) -> Result<Self, CommandError> {
        match payload {
            "open" => Ok(Self::Open),
            "close" => Ok(Self::Close),
            _ => Err(CommandError::UnknownCommand),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Close => "close",
        }
    }

    pub const fn opposite(self) -> Self {
        match self {
            Self::Open => Self::Close,
            Self::Close => Self::Open,
        }
    }
}

/// Who caused the door to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandSource {
    /// Panel button.
    Local,
    /// Message bus.
    Remote,
    /// Neither: the door moved on its own or by its own remote control.
    External,
}

impl CommandSource {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
            Self::External => "external",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// Payload is not one of the accepted command words.
    UnknownCommand,
    /// Payload interlocked against the opposite output still pulsing.
    Interlocked,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCommand => write!(f, "unknown door command"),
            Self::Interlocked => write!(f, "opposite output still pulsing"),
        }
    }
}

/// Copy raw bus bytes into a payload.  `None` if they are not UTF-8 or do
/// not fit.
pub fn payload_from_bytes(bytes: &[u8]) -> Option<CommandPayload> {
    let text = core::str::from_utf8(bytes).ok()?;
    let mut payload = CommandPayload::new();
    payload.push_str(text).ok()?;
    Some(payload)
}
