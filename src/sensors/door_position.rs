//! Door end-position sensing.
//!
//! Two reed switches on the rail, read through [`DoorIoPort`].  Both inputs
//! are pulled down and read HIGH while the magnet sits on the switch.  The
//! pair maps to a [`DoorStatus`] through [`DoorStatus::from_sensors`]; there
//! is no error path, contradictory input is itself a status.

use crate::app::ports::{DoorIoPort, SensorLevels};
use crate::fsm::DoorStatus;

/// Samples both end switches once per tick.
#[derive(Debug, Default)]
pub struct DoorPositionSensor {
    last_levels: SensorLevels,
    samples: u32,
}

impl DoorPositionSensor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read both inputs once and derive the door status.
    pub fn sense(&mut self, io: &mut impl DoorIoPort) -> DoorStatus {
        let levels = io.read_sensors();
        self.last_levels = levels;
        self.samples = self.samples.wrapping_add(1);
        DoorStatus::from_sensors(levels.open_active, levels.closed_active)
    }

    /// Raw levels from the most recent [`sense`](Self::sense).
    pub fn last_levels(&self) -> SensorLevels {
        self.last_levels
    }

    pub fn sample_count(&self) -> u32 {
        self.samples
    }
}
