//! Shared mutable context threaded through every transition handler.
//!
//! `FsmContext` is the single struct handlers read from and write to.  It
//! replaces what would otherwise be global flags: whether a pulse is in
//! flight, who commanded the door last, the LED intent, and the
//! announcements queued for the message bus.  Handlers never touch ports;
//! [`AppService`](crate::app::service::AppService) flushes the outbox and
//! applies the LED intent after they run.

use heapless::Vec;
use log::warn;

use crate::app::commands::{CommandSource, DoorCommand};
use crate::app::events::AppEvent;
use crate::app::ports::LedId;

/// Announcements a single tick can queue.  One status transition plus one
/// local and one remote command produce at most seven.
pub const OUTBOX_CAPACITY: usize = 8;

// ---------------------------------------------------------------------------
// LED intent
// ---------------------------------------------------------------------------

/// What the two door LEDs should be doing.  A blinking LED's lit flag is
/// the level it starts blinking from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnnunciationState {
    pub open_blinking: bool,
    pub closed_blinking: bool,
    pub open_lit: bool,
    pub closed_lit: bool,
}

impl AnnunciationState {
    /// Door reached its open end position.
    pub fn settle_open(&mut self) {
        *self = Self {
            open_blinking: false,
            closed_blinking: false,
            open_lit: true,
            closed_lit: false,
        };
    }

    /// Door reached its closed end position.
    pub fn settle_closed(&mut self) {
        *self = Self {
            open_blinking: false,
            closed_blinking: false,
            open_lit: false,
            closed_lit: true,
        };
    }

    /// A command was accepted: blink the target LED, stop the other.
    pub fn start_motion(&mut self, command: DoorCommand) {
        let target = command == DoorCommand::Open;
        *self = Self {
            open_blinking: target,
            closed_blinking: !target,
            open_lit: target,
            closed_lit: !target,
        };
    }

    pub fn is_blinking(&self, led: LedId) -> bool {
        match led {
            LedId::DoorOpen => self.open_blinking,
            LedId::DoorClosed => self.closed_blinking,
            LedId::SystemInfo => false,
        }
    }

    pub fn is_lit(&self, led: LedId) -> bool {
        match led {
            LedId::DoorOpen => self.open_lit,
            LedId::DoorClosed => self.closed_lit,
            LedId::SystemInfo => false,
        }
    }
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

/// The shared context passed to every transition handler.
#[derive(Debug, Default)]
pub struct FsmContext {
    /// Either door output is mid-pulse.  Written before handlers run.
    pub pulse_active: bool,
    /// Who moved the door last; `None` until the first command or
    /// unsolicited movement.
    pub last_source: Option<CommandSource>,
    pub annunciation: AnnunciationState,
    /// End-position announcements swallowed because a pulse was active.
    pub suppressed_announcements: u32,
    /// Events waiting to be emitted through the event sink.
    pub outbox: Vec<AppEvent, OUTBOX_CAPACITY>,
}

impl FsmContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an announcement for the next flush.
    pub fn publish(&mut self, event: AppEvent) {
        if let Err(dropped) = self.outbox.push(event) {
            warn!("FSM | outbox full, dropping {:?}", dropped);
        }
    }

    /// Take every queued announcement, oldest first.
    pub fn take_outbox(&mut self) -> Vec<AppEvent, OUTBOX_CAPACITY> {
        core::mem::take(&mut self.outbox)
    }
}
