//! Unified error types for the garage door controller firmware.
//!
//! The control core itself never fails: sensing maps every input pair to a
//! status, invalid commands are logged and dropped.  These types cover the
//! adapters around it.  `ConfigError` stays local to [`crate::config`]
//! since a rejected document falls back to defaults instead of failing
//! bring-up.  All variants are `Copy`.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible adapter operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A pin or expander access failed.
    Io(IoError),
    /// The message bus rejected an operation.
    Bus(BusError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Bus(e) => write!(f, "bus: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Door / panel I/O errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoError {
    /// The I2C panel expander did not acknowledge a transfer.
    Expander,
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expander => write!(f, "I/O expander transfer failed"),
        }
    }
}

impl From<IoError> for Error {
    fn from(e: IoError) -> Self {
        Self::Io(e)
    }
}

// ---------------------------------------------------------------------------
// Message bus errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// No broker connection is currently up.
    NotConnected,
    /// The client library refused the publish.
    PublishFailed,
    /// The client library refused the subscription.
    SubscribeFailed,
    /// `<prefix>/<suffix>` does not fit the topic buffer.
    TopicTooLong,
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "broker not connected"),
            Self::PublishFailed => write!(f, "MQTT publish failed"),
            Self::SubscribeFailed => write!(f, "MQTT subscribe failed"),
            Self::TopicTooLong => write!(f, "topic too long"),
        }
    }
}

impl From<BusError> for Error {
    fn from(e: BusError) -> Self {
        Self::Bus(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The TOML document could not be deserialised.
    Parse,
    /// A field is out of its accepted range; carries the field name.
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse => write!(f, "malformed configuration document"),
            Self::Invalid(field) => write!(f, "invalid value for `{field}`"),
        }
    }
}
