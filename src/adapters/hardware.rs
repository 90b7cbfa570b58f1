//! Door drive adapter: bridges the four drive-interface GPIOs to [`DoorIoPort`].
//!
//! Generic over `embedded-hal` 1.0 digital traits: on target `main`
//! hands in `esp-idf-hal` `PinDriver`s, host tests hand in mocks.  This is
//! the only module that touches the drive interface.
//!
//! A failed input read counts as "inactive"; a failed output write is
//! logged and dropped.  Errors are logged once per failure streak so a
//! dead line does not flood the console at loop rate.

use embedded_hal::digital::{InputPin, OutputPin};
use log::warn;

use crate::app::commands::DoorCommand;
use crate::app::ports::{DoorIoPort, SensorLevels};

/// Concrete adapter over the two reed-switch inputs and two command outputs.
pub struct GpioDoorIo<OS, CS, OC, CC> {
    open_sensor: OS,
    closed_sensor: CS,
    open_cmd: OC,
    close_cmd: CC,
    read_errors: u32,
    write_errors: u32,
    read_failing: bool,
}

impl<OS, CS, OC, CC> GpioDoorIo<OS, CS, OC, CC>
where
    OS: InputPin,
    CS: InputPin,
    OC: OutputPin,
    CC: OutputPin,
{
    /// Outputs are expected to be configured and driven LOW already.
    pub fn new(open_sensor: OS, closed_sensor: CS, open_cmd: OC, close_cmd: CC) -> Self {
        Self {
            open_sensor,
            closed_sensor,
            open_cmd,
            close_cmd,
            read_errors: 0,
            write_errors: 0,
            read_failing: false,
        }
    }

    pub fn read_errors(&self) -> u32 {
        self.read_errors
    }

    pub fn write_errors(&self) -> u32 {
        self.write_errors
    }
}

fn read_active<P: InputPin>(pin: &mut P) -> Option<bool> {
    pin.is_high().ok()
}

fn drive<P: OutputPin>(pin: &mut P, high: bool) -> Result<(), P::Error> {
    if high { pin.set_high() } else { pin.set_low() }
}

// ── DoorIoPort implementation ─────────────────────────────────

impl<OS, CS, OC, CC> DoorIoPort for GpioDoorIo<OS, CS, OC, CC>
where
    OS: InputPin,
    CS: InputPin,
    OC: OutputPin,
    CC: OutputPin,
{
    fn read_sensors(&mut self) -> SensorLevels {
        let open = read_active(&mut self.open_sensor);
        let closed = read_active(&mut self.closed_sensor);

        let failing = open.is_none() || closed.is_none();
        if failing {
            self.read_errors = self.read_errors.wrapping_add(1);
            if !self.read_failing {
                warn!(
                    "DOOR | sensor read failed (open={:?}, closed={:?}), treating as inactive",
                    open, closed
                );
            }
        }
        self.read_failing = failing;

        SensorLevels {
            open_active: open.unwrap_or(false),
            closed_active: closed.unwrap_or(false),
        }
    }

    fn drive_output(&mut self, output: DoorCommand, high: bool) {
        let ok = match output {
            DoorCommand::Open => drive(&mut self.open_cmd, high).is_ok(),
            DoorCommand::Close => drive(&mut self.close_cmd, high).is_ok(),
        };
        if !ok {
            self.write_errors = self.write_errors.wrapping_add(1);
            warn!(
                "DOOR | {} output write failed (level={})",
                output.as_str(),
                if high { "HIGH" } else { "LOW" }
            );
        }
    }
}
