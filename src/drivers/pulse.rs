//! Timed pulse driver for the open/close command outputs.
//!
//! The door drive reacts to a HIGH pulse on either command line.  A pulse
//! is started with [`PulseActuator::request`] and ended by
//! [`PulseActuator::tick`] once `duration_ms` has elapsed.  Both use the
//! caller's timestamp; elapsed time is computed with `wrapping_sub` so a
//! pulse straddling the `u32` millisecond rollover still ends on time.
//!
//! A running pulse is never restarted or cancelled.  The two outputs are
//! independent: nothing here stops both from being HIGH at once.

use log::debug;

use crate::app::commands::DoorCommand;
use crate::app::ports::DoorIoPort;

/// Lifecycle of one output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PulseState {
    pub active: bool,
    pub start_ms: u32,
}

#[derive(Debug, Default)]
pub struct PulseActuator {
    open: PulseState,
    close: PulseState,
}

impl PulseActuator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a pulse on the output for `command`.  Returns `false` (and
    /// does nothing) if that output is already pulsing.
    pub fn request(&mut self, command: DoorCommand, now_ms: u32, io: &mut impl DoorIoPort) -> bool {
        let slot = self.slot_mut(command);
        if slot.active {
            debug!("PULSE | {} already active, ignored", command.as_str());
            return false;
        }
        *slot = PulseState {
            active: true,
            start_ms: now_ms,
        };
        io.drive_output(command, true);
        debug!("PULSE | {} HIGH at {}ms", command.as_str(), now_ms);
        true
    }

    /// End every pulse whose elapsed time has reached `duration_ms`.
    pub fn tick(&mut self, now_ms: u32, duration_ms: u32, io: &mut impl DoorIoPort) {
        for command in [DoorCommand::Open, DoorCommand::Close] {
            let slot = self.slot_mut(command);
            if slot.active && now_ms.wrapping_sub(slot.start_ms) >= duration_ms {
                slot.active = false;
                io.drive_output(command, false);
                debug!("PULSE | {} LOW at {}ms", command.as_str(), now_ms);
            }
        }
    }

    pub fn is_any_active(&self) -> bool {
        self.open.active || self.close.active
    }

    pub fn is_active(&self, command: DoorCommand) -> bool {
        self.state(command).active
    }

    pub fn state(&self, command: DoorCommand) -> PulseState {
        match command {
            DoorCommand::Open => self.open,
            DoorCommand::Close => self.close,
        }
    }

    fn slot_mut(&mut self, command: DoorCommand) -> &mut PulseState {
        match command {
            DoorCommand::Open => &mut self.open,
            DoorCommand::Close => &mut self.close,
        }
    }
}
