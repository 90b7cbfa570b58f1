//! Sampled debounce for the three panel buttons.
//!
//! ## Hardware
//!
//! Active-low momentary switches on the panel expander with its internal
//! pull-ups.  The expander is polled over I2C, so there is no edge
//! interrupt: the adapter reads all three levels once per debounce
//! interval and feeds them to [`ButtonPanel::sample`].  Contact bounce
//! shorter than the interval is never seen.
//!
//! ## Events
//!
//! | Condition                                  | Result            |
//! |--------------------------------------------|-------------------|
//! | released in last sample, pressed in this   | one press event   |
//! | held across samples                        | nothing           |
//! | several new presses in one sample          | Info > Close > Open |

use crate::app::ports::ButtonId;

/// Order in which simultaneous new presses win.
const PRIORITY: [ButtonId; 3] = [ButtonId::Info, ButtonId::Close, ButtonId::Open];

/// One sample of the panel, `true` = pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonLevels {
    pub open: bool,
    pub close: bool,
    pub info: bool,
}

impl ButtonLevels {
    pub fn is_pressed(&self, button: ButtonId) -> bool {
        match button {
            ButtonId::Open => self.open,
            ButtonId::Close => self.close,
            ButtonId::Info => self.info,
        }
    }
}

pub struct ButtonPanel {
    debounce_ms: u32,
    last_sample_ms: Option<u32>,
    stable: ButtonLevels,
}

impl ButtonPanel {
    pub fn new(debounce_ms: u32) -> Self {
        Self {
            debounce_ms,
            last_sample_ms: None,
            stable: ButtonLevels::default(),
        }
    }

    /// Whether a new sample should be taken at `now_ms`.
    pub fn is_due(&self, now_ms: u32) -> bool {
        self.last_sample_ms
            .is_none_or(|last| now_ms.wrapping_sub(last) >= self.debounce_ms)
    }

    /// Accept one sample and return the press it reveals, if any.
    pub fn sample(&mut self, now_ms: u32, levels: ButtonLevels) -> Option<ButtonId> {
        self.last_sample_ms = Some(now_ms);
        let previous = core::mem::replace(&mut self.stable, levels);
        PRIORITY
            .into_iter()
            .find(|&b| levels.is_pressed(b) && !previous.is_pressed(b))
    }

    /// The read failed: keep the last levels, wait a full interval.
    pub fn skip(&mut self, now_ms: u32) {
        self.last_sample_ms = Some(now_ms);
    }

    /// Levels from the last accepted sample.
    pub fn levels(&self) -> ButtonLevels {
        self.stable
    }
}
