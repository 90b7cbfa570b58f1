//! Steady/blink engine for the panel LEDs.
//!
//! Holds the wanted state of every [`LedId`] and, for blinking LEDs,
//! toggles the level every `period_ms`.  The adapter calls
//! [`LedBlinker::tick`] each control cycle and writes out whatever changed.
//!
//! | Request               | Level                          |
//! |-----------------------|--------------------------------|
//! | `set(led, on)`        | `on`, blinking stops           |
//! | `set_blink(led, true)`| ON now, then toggles per period|
//! | `set_blink(led, false)`| OFF, blinking stops           |

use heapless::Vec;

use crate::app::ports::LedId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct LedChannel {
    lit: bool,
    blinking: bool,
    last_toggle_ms: u32,
}

/// LED blink engine. Stack-allocated, no heap.
pub struct LedBlinker {
    period_ms: u32,
    channels: [LedChannel; LedId::COUNT],
}

impl LedBlinker {
    pub fn new(period_ms: u32) -> Self {
        Self {
            period_ms,
            channels: [LedChannel::default(); LedId::COUNT],
        }
    }

    /// Static level.
    pub fn set(&mut self, led: LedId, on: bool) {
        let ch = &mut self.channels[led as usize];
        ch.blinking = false;
        ch.lit = on;
    }

    /// Start blinking from ON at `now_ms`, or stop and go dark.
    pub fn set_blink(&mut self, led: LedId, enabled: bool, now_ms: u32) {
        let ch = &mut self.channels[led as usize];
        if enabled && ch.blinking {
            return;
        }
        ch.blinking = enabled;
        ch.lit = enabled;
        ch.last_toggle_ms = now_ms;
    }

    /// Advance blink phases; returns the LEDs whose level changed.
    pub fn tick(&mut self, now_ms: u32) -> Vec<(LedId, bool), { LedId::COUNT }> {
        let mut changed = Vec::new();
        for led in LedId::ALL {
            let ch = &mut self.channels[led as usize];
            if ch.blinking && now_ms.wrapping_sub(ch.last_toggle_ms) >= self.period_ms {
                ch.lit = !ch.lit;
                ch.last_toggle_ms = now_ms;
                // Capacity equals the LED count.
                let _ = changed.push((led, ch.lit));
            }
        }
        changed
    }

    pub fn is_lit(&self, led: LedId) -> bool {
        self.channels[led as usize].lit
    }

    pub fn is_blinking(&self, led: LedId) -> bool {
        self.channels[led as usize].blinking
    }
}
