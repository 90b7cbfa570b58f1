//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements         | Connects to                   |
//! |------------|--------------------|-------------------------------|
//! | `hardware` | DoorIoPort         | Drive interface GPIOs         |
//! | `hmi`      | HmiPort            | MCP23008 panel over I2C       |
//! | `mqtt`     | CommandPort        | Broker inbound slot           |
//! |            | EventSink          | Broker publishes              |
//! | `time`     |                    | ESP32 system timer            |
//! | `wifi`     |                    | ESP-IDF WiFi STA              |

pub mod hardware;
pub mod hmi;
pub mod mqtt;
pub mod time;
pub mod wifi;
