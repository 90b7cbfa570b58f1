//! Door output pulses, panel peripherals, and the task watchdog.

pub mod button;
pub mod led_patterns;
pub mod mcp23008;
pub mod pulse;
pub mod watchdog;
