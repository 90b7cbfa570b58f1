//! Mock adapters for integration tests.
//!
//! Records every drive output, panel and bus call so tests can assert on
//! the full history without touching real GPIO or a broker.

use gdc::app::commands::{CommandPayload, DoorCommand};
use gdc::app::events::AppEvent;
use gdc::app::ports::{ButtonId, CommandPort, DoorIoPort, EventSink, HmiPort, LedId, SensorLevels};
use gdc::drivers::button::ButtonLevels;
use gdc::error::{BusError, IoError};
use gdc::adapters::hmi::PanelIo;
use gdc::adapters::mqtt::MqttTransport;

// ── MockDoorIo ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputWrite {
    pub output: DoorCommand,
    pub high: bool,
}

#[derive(Default)]
pub struct MockDoorIo {
    pub levels: SensorLevels,
    pub writes: Vec<OutputWrite>,
}

#[allow(dead_code)]
impl MockDoorIo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_open(&mut self) {
        self.levels = SensorLevels {
            open_active: true,
            closed_active: false,
        };
    }

    pub fn set_closed(&mut self) {
        self.levels = SensorLevels {
            open_active: false,
            closed_active: true,
        };
    }

    /// Neither end switch made.
    pub fn set_released(&mut self) {
        self.levels = SensorLevels::default();
    }

    /// Both end switches made.
    pub fn set_both(&mut self) {
        self.levels = SensorLevels {
            open_active: true,
            closed_active: true,
        };
    }

    /// Current level of `output`, replayed from the write history.
    pub fn output_high(&self, output: DoorCommand) -> bool {
        self.writes
            .iter()
            .rev()
            .find(|w| w.output == output)
            .is_some_and(|w| w.high)
    }
}

impl DoorIoPort for MockDoorIo {
    fn read_sensors(&mut self) -> SensorLevels {
        self.levels
    }

    fn drive_output(&mut self, output: DoorCommand, high: bool) {
        self.writes.push(OutputWrite { output, high });
    }
}

// ── MockHmi ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedCall {
    Level(LedId, bool),
    Blink(LedId, bool),
}

#[derive(Default)]
pub struct MockHmi {
    pub pressed: Option<ButtonId>,
    pub led_calls: Vec<LedCall>,
    pub info_pages: u32,
}

#[allow(dead_code)]
impl MockHmi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, button: ButtonId) {
        self.pressed = Some(button);
    }

    /// Last static level set on `led`, if any.
    pub fn last_level(&self, led: LedId) -> Option<bool> {
        self.led_calls.iter().rev().find_map(|c| match *c {
            LedCall::Level(l, on) if l == led => Some(on),
            _ => None,
        })
    }

    pub fn blink_calls(&self, led: LedId) -> Vec<bool> {
        self.led_calls
            .iter()
            .filter_map(|c| match *c {
                LedCall::Blink(l, on) if l == led => Some(on),
                _ => None,
            })
            .collect()
    }
}

impl HmiPort for MockHmi {
    fn poll_button(&mut self) -> Option<ButtonId> {
        self.pressed.take()
    }

    fn set_led(&mut self, led: LedId, on: bool) {
        self.led_calls.push(LedCall::Level(led, on));
    }

    fn set_led_blink(&mut self, led: LedId, enabled: bool) {
        self.led_calls.push(LedCall::Blink(led, enabled));
    }

    fn show_info_page(&mut self) {
        self.info_pages += 1;
    }
}

// ── MockBus ───────────────────────────────────────────────────

#[derive(Default)]
pub struct MockBus {
    pub inbox: Option<CommandPayload>,
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deliver(&mut self, payload: &str) {
        let mut p = CommandPayload::new();
        p.push_str(payload).expect("payload fits");
        self.inbox = Some(p);
    }

    pub fn drain(&mut self) -> Vec<AppEvent> {
        std::mem::take(&mut self.events)
    }
}

impl CommandPort for MockBus {
    fn take_command(&mut self) -> Option<CommandPayload> {
        self.inbox.take()
    }
}

impl EventSink for MockBus {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(*event);
    }
}

// ── MockPanel (raw expander side) ─────────────────────────────

#[derive(Default)]
pub struct MockPanel {
    pub buttons: ButtonLevels,
    pub leds: [bool; LedId::COUNT],
    pub fail: bool,
}

#[allow(dead_code)]
impl MockPanel {
    pub fn led(&self, led: LedId) -> bool {
        self.leds[led as usize]
    }
}

impl PanelIo for MockPanel {
    fn read_buttons(&mut self) -> Result<ButtonLevels, IoError> {
        if self.fail {
            Err(IoError::Expander)
        } else {
            Ok(self.buttons)
        }
    }

    fn write_led(&mut self, led: LedId, on: bool) -> Result<(), IoError> {
        self.leds[led as usize] = on;
        Ok(())
    }
}

// ── MockTransport (broker side) ───────────────────────────────

#[derive(Default)]
pub struct MockTransport {
    pub connected: bool,
    pub published: Vec<(String, String, bool)>,
    pub subscriptions: Vec<String>,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn online() -> Self {
        Self {
            connected: true,
            ..Self::default()
        }
    }

    /// Payloads published on `topic`, oldest first.
    pub fn payloads(&self, topic: &str) -> Vec<String> {
        self.published
            .iter()
            .filter(|(t, _, _)| t == topic)
            .map(|(_, p, _)| p.clone())
            .collect()
    }
}

impl MqttTransport for MockTransport {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), BusError> {
        self.published.push((
            topic.to_owned(),
            String::from_utf8_lossy(payload).into_owned(),
            retain,
        ));
        Ok(())
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), BusError> {
        self.subscriptions.push(topic.to_owned());
        Ok(())
    }
}
