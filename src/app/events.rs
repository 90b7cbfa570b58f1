//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  The MQTT adapter maps each
//! one to a topic and payload; nothing else in the core knows topic names.

use super::commands::{CommandSource, DoorCommand};

/// Door state as announced on `control/getcurrentdoorstate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportedState {
    Open,
    Closed,
    Opening,
    Closing,
    Stopped,
    /// Nothing sensed yet since boot.
    Unknown,
}

impl ReportedState {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Opening => "opening",
            Self::Closing => "closing",
            Self::Stopped => "stopped",
            Self::Unknown => "unknown",
        }
    }

    /// The in-flight state a freshly accepted command produces.
    pub const fn moving_towards(command: DoorCommand) -> Self {
        match command {
            DoorCommand::Open => Self::Opening,
            DoorCommand::Close => Self::Closing,
        }
    }
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// A command was accepted.
    RequestedState(DoorCommand),

    /// The door's announced state changed.
    CurrentState(ReportedState),

    /// Who moved (or is moving) the door.
    CommandSource(CommandSource),
}
