//! Port traits: the hexagonal boundary between door logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (door I/O, panel, message bus) implement these traits.
//! The [`AppService`](super::service::AppService) consumes them via
//! generics, so the control core never touches hardware directly.
//!
//! None of the ports return errors into the core.  Adapters log their own
//! failures and degrade: a failed sensor read reads as inactive, a failed
//! publish is dropped.

use super::commands::{CommandPayload, DoorCommand};

// ───────────────────────────────────────────────────────────────
// Door I/O port (driven adapter: drive interface ↔ domain)
// ───────────────────────────────────────────────────────────────

/// Levels of the two end-position inputs, `true` = active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SensorLevels {
    pub open_active: bool,
    pub closed_active: bool,
}

/// The four-line interface to the door drive.
pub trait DoorIoPort {
    /// Read both end-position inputs.  A failed read reports that input
    /// as inactive.
    fn read_sensors(&mut self) -> SensorLevels;

    /// Drive the command output for `output` HIGH or LOW.
    fn drive_output(&mut self, output: DoorCommand, high: bool);
}

// ───────────────────────────────────────────────────────────────
// HMI port (driven adapter: panel ↔ domain)
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonId {
    Open,
    Close,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LedId {
    DoorOpen = 0,
    DoorClosed = 1,
    SystemInfo = 2,
}

impl LedId {
    pub const COUNT: usize = 3;
    pub const ALL: [Self; Self::COUNT] = [Self::DoorOpen, Self::DoorClosed, Self::SystemInfo];
}

/// Front panel: three buttons, three LEDs, and the system info page.
pub trait HmiPort {
    /// Debounced button event, at most one per call.
    fn poll_button(&mut self) -> Option<ButtonId>;

    /// Static level; stops any blinking on that LED.
    fn set_led(&mut self, led: LedId, on: bool);

    /// `true` starts blinking from ON; `false` stops blinking and turns
    /// the LED OFF.
    fn set_led_blink(&mut self, led: LedId, enabled: bool);

    /// Route an info button press to the display.
    fn show_info_page(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Command port (driven adapter: message bus → domain)
// ───────────────────────────────────────────────────────────────

/// One-shot inbound command slot.
pub trait CommandPort {
    /// Take the pending payload, if any.  The slot is empty afterwards.
    fn take_command(&mut self) -> Option<CommandPayload>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → message bus / log)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
