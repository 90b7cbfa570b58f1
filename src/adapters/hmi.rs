//! Front panel adapter: implements [`HmiPort`] over a [`PanelIo`] device.
//!
//! Combines the button sampler and the LED blinker with the expander that
//! physically carries them.  [`HmiAdapter::tick`] must run once per loop
//! iteration before the controller tick: it samples buttons when the
//! debounce interval is due, advances blink phases, and mirrors the info
//! button onto the info LED.

use embedded_hal::i2c::I2c;
use log::{info, warn};

use crate::app::ports::{ButtonId, HmiPort, LedId};
use crate::config::SystemConfig;
use crate::drivers::button::{ButtonLevels, ButtonPanel};
use crate::drivers::led_patterns::LedBlinker;
use crate::drivers::mcp23008::Mcp23008;
use crate::error::IoError;
use crate::pins;

/// Raw panel access: button levels in, LED levels out.
pub trait PanelIo {
    /// Sample all three buttons, `true` = pressed.
    fn read_buttons(&mut self) -> Result<ButtonLevels, IoError>;

    fn write_led(&mut self, led: LedId, on: bool) -> Result<(), IoError>;
}

impl<I2C: I2c> PanelIo for Mcp23008<I2C> {
    fn read_buttons(&mut self) -> Result<ButtonLevels, IoError> {
        let port = self.read_port().map_err(|_| IoError::Expander)?;
        // Active-low.
        let pressed = |pin: u8| port & (1 << pin) == 0;
        Ok(ButtonLevels {
            open: pressed(pins::PANEL_BUTTON_OPEN),
            close: pressed(pins::PANEL_BUTTON_CLOSE),
            info: pressed(pins::PANEL_BUTTON_INFO),
        })
    }

    fn write_led(&mut self, led: LedId, on: bool) -> Result<(), IoError> {
        let pin = match led {
            LedId::DoorOpen => pins::PANEL_LED_OPEN,
            LedId::DoorClosed => pins::PANEL_LED_CLOSED,
            LedId::SystemInfo => pins::PANEL_LED_INFO,
        };
        self.set_pin(pin, on).map_err(|_| IoError::Expander)
    }
}

pub struct HmiAdapter<P> {
    panel: P,
    buttons: ButtonPanel,
    leds: LedBlinker,
    pending: Option<ButtonId>,
    now_ms: u32,
    info_held: bool,
    info_requests: u32,
    io_errors: u32,
}

impl<P: PanelIo> HmiAdapter<P> {
    pub fn new(panel: P, config: &SystemConfig) -> Self {
        Self {
            panel,
            buttons: ButtonPanel::new(config.button_debounce_ms),
            leds: LedBlinker::new(config.led_blink_period_ms),
            pending: None,
            now_ms: 0,
            info_held: false,
            info_requests: 0,
            io_errors: 0,
        }
    }

    /// Sample buttons when due and refresh blinking LEDs.
    pub fn tick(&mut self, now_ms: u32) {
        self.now_ms = now_ms;

        if self.buttons.is_due(now_ms) {
            match self.panel.read_buttons() {
                Ok(levels) => {
                    if levels.info != self.info_held {
                        self.info_held = levels.info;
                        self.leds.set(LedId::SystemInfo, levels.info);
                        self.write(LedId::SystemInfo);
                    }
                    if let Some(button) = self.buttons.sample(now_ms, levels) {
                        self.pending = Some(button);
                    }
                }
                Err(e) => {
                    self.buttons.skip(now_ms);
                    self.io_errors = self.io_errors.wrapping_add(1);
                    warn!("HMI | button read failed: {}", e);
                }
            }
        }

        for (led, _) in self.leds.tick(now_ms) {
            self.write(led);
        }
    }

    /// Info page requests since start.
    pub fn info_requests(&self) -> u32 {
        self.info_requests
    }

    pub fn io_errors(&self) -> u32 {
        self.io_errors
    }

    pub fn is_lit(&self, led: LedId) -> bool {
        self.leds.is_lit(led)
    }

    pub fn is_blinking(&self, led: LedId) -> bool {
        self.leds.is_blinking(led)
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut P {
        &mut self.panel
    }

    /// Push the engine's level for `led` out to the panel.
    fn write(&mut self, led: LedId) {
        if let Err(e) = self.panel.write_led(led, self.leds.is_lit(led)) {
            self.io_errors = self.io_errors.wrapping_add(1);
            warn!("HMI | {:?} LED write failed: {}", led, e);
        }
    }
}

// ── HmiPort implementation ────────────────────────────────────

impl<P: PanelIo> HmiPort for HmiAdapter<P> {
    fn poll_button(&mut self) -> Option<ButtonId> {
        self.pending.take()
    }

    fn set_led(&mut self, led: LedId, on: bool) {
        self.leds.set(led, on);
        self.write(led);
    }

    fn set_led_blink(&mut self, led: LedId, enabled: bool) {
        self.leds.set_blink(led, enabled, self.now_ms);
        self.write(led);
    }

    fn show_info_page(&mut self) {
        self.info_requests = self.info_requests.wrapping_add(1);
        info!("HMI | system info page requested");
    }
}
