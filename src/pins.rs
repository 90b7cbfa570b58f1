//! GPIO / peripheral pin assignments for the garage door controller board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.  `main` picks the matching `esp-idf-hal` pins
//! from `Peripherals`; keep the two in sync.

// ---------------------------------------------------------------------------
// Door drive interface (relay board + reed switches)
// ---------------------------------------------------------------------------

/// Digital output: HIGH pulse asks the drive to open.  Idles LOW.
pub const CMD_OPEN_DOOR_GPIO: i32 = 0;
/// Digital input, pull-down: HIGH while the door-is-open reed switch is closed.
pub const STATUS_DOOR_OPEN_GPIO: i32 = 1;
/// Digital output: HIGH pulse asks the drive to close.  Idles LOW.
pub const CMD_CLOSE_DOOR_GPIO: i32 = 2;
/// Digital input, pull-down: HIGH while the door-is-closed reed switch is closed.
pub const STATUS_DOOR_CLOSED_GPIO: i32 = 3;

// ---------------------------------------------------------------------------
// Panel I2C bus
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 8;
pub const I2C_SCL_GPIO: i32 = 9;
/// Bus clock for the panel expander.
pub const I2C_BAUDRATE_HZ: u32 = 100_000;

// ---------------------------------------------------------------------------
// MCP23008 panel expander
// ---------------------------------------------------------------------------

/// 7-bit address with A2..A0 strapped low.
pub const PANEL_EXPANDER_ADDR: u8 = 0x20;

/// Buttons are active-low with the expander's internal pull-ups.
pub const PANEL_BUTTON_CLOSE: u8 = 0;
pub const PANEL_BUTTON_INFO: u8 = 1;
pub const PANEL_BUTTON_OPEN: u8 = 2;

/// LEDs are active-high.
pub const PANEL_LED_CLOSED: u8 = 4;
pub const PANEL_LED_INFO: u8 = 5;
pub const PANEL_LED_OPEN: u8 = 6;
/// Piezo beeper, unused by the firmware but driven LOW at init.
pub const PANEL_BEEPER: u8 = 7;

/// IODIR mask: 1 = input.  Only the three buttons are inputs.
pub const PANEL_INPUT_MASK: u8 =
    (1 << PANEL_BUTTON_CLOSE) | (1 << PANEL_BUTTON_INFO) | (1 << PANEL_BUTTON_OPEN);
