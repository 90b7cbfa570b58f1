//! Sensor subsystem.
//!
//! The controller has exactly one sensed quantity, the door's end position.

pub mod door_position;

pub use door_position::DoorPositionSensor;
