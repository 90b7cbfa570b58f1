//! Garage Door Controller Firmware: Main Entry Point
//!
//! Hexagonal architecture driven by one cooperative control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  GpioDoorIo        HmiAdapter       MqttAdapter   SystemClock  │
//! │  (DoorIoPort)      (HmiPort)        (Command+Sink)             │
//! │  WifiLink                                                      │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Sensing · Status table · Arbitration · Pulses         │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Loop order: clock → panel → controller → broker → WiFi → restart
//! check → watchdog → sleep.

use std::sync::Arc;

use anyhow::Result;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::gpio::{PinDriver, Pull};
use esp_idf_svc::hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::units::Hertz;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use log::{error, info, warn};

use gdc::adapters::hardware::GpioDoorIo;
use gdc::adapters::hmi::HmiAdapter;
use gdc::adapters::mqtt::{CommandSlot, EspMqttTransport, MqttAdapter};
use gdc::adapters::time::SystemClock;
use gdc::adapters::wifi::WifiLink;
use gdc::app::service::AppService;
use gdc::config::SystemConfig;
use gdc::drivers::mcp23008::Mcp23008;
use gdc::drivers::watchdog::Watchdog;
use gdc::error::{Error, IoError};
use gdc::pins;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Garage Door Controller v{}       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = SystemConfig::from_toml(include_str!("../gdc.toml")).unwrap_or_else(|e| {
        warn!("CONFIG | embedded config rejected ({}), using defaults", e);
        SystemConfig::default()
    });

    let mut watchdog = Watchdog::new(config.watchdog_timeout_ms);

    // ── 3. Drive interface ────────────────────────────────────
    let peripherals = Peripherals::take()?;

    let mut open_cmd = PinDriver::output(peripherals.pins.gpio0)?;
    let mut close_cmd = PinDriver::output(peripherals.pins.gpio2)?;
    open_cmd.set_low()?;
    close_cmd.set_low()?;

    let mut open_sensor = PinDriver::input(peripherals.pins.gpio1)?;
    let mut closed_sensor = PinDriver::input(peripherals.pins.gpio3)?;
    open_sensor.set_pull(Pull::Down)?;
    closed_sensor.set_pull(Pull::Down)?;

    let mut door_io = GpioDoorIo::new(open_sensor, closed_sensor, open_cmd, close_cmd);
    info!(
        "DOOR | outputs GPIO{}/GPIO{}, inputs GPIO{}/GPIO{}",
        pins::CMD_OPEN_DOOR_GPIO,
        pins::CMD_CLOSE_DOOR_GPIO,
        pins::STATUS_DOOR_OPEN_GPIO,
        pins::STATUS_DOOR_CLOSED_GPIO
    );

    // ── 4. Front panel ────────────────────────────────────────
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio8,
        peripherals.pins.gpio9,
        &I2cConfig::new().baudrate(Hertz(pins::I2C_BAUDRATE_HZ)),
    )?;
    let mut expander = Mcp23008::new(i2c, pins::PANEL_EXPANDER_ADDR);
    expander
        .init(pins::PANEL_INPUT_MASK)
        .map_err(|_| Error::Io(IoError::Expander))?;
    let mut hmi = HmiAdapter::new(expander, &config);

    // ── 5. Network ────────────────────────────────────────────
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    let mut wifi = match WifiLink::start(peripherals.modem, sysloop, nvs, &config.network) {
        Ok(link) => Some(link),
        Err(e) => {
            error!("WiFi: start failed ({}), running local-only", e);
            None
        }
    };

    let slot = Arc::new(CommandSlot::new(&config.mqtt.topic_prefix));
    let transport = EspMqttTransport::connect(&config, slot.clone())?;
    let mut bus = MqttAdapter::new(transport, slot, &config);

    // ── 6. Controller ─────────────────────────────────────────
    let clock = SystemClock::new();
    let mut app = AppService::new(&config);
    app.start(&mut bus);

    info!("System ready. Entering control loop.");

    loop {
        let now_ms = clock.now_ms();

        hmi.tick(now_ms);
        app.tick(now_ms, &mut door_io, &mut hmi, &mut bus);
        bus.tick(now_ms, clock.uptime_secs());

        if let Some(link) = wifi.as_mut() {
            link.maintain(now_ms);
        }

        if bus.is_restart_requested() {
            warn!("Restart requested over MQTT, rebooting");
            unsafe { esp_idf_svc::sys::esp_restart() };
        }

        watchdog.feed(now_ms);
        FreeRtos::delay_ms(config.control_loop_interval_ms);
    }
}
