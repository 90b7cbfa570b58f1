//! System configuration parameters
//!
//! All tunable parameters for the garage door controller.  The firmware
//! embeds `gdc.toml` at build time and parses it with [`SystemConfig::from_toml`];
//! any field missing from the document keeps its [`Default`] value.

use heapless::String;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const MAX_TOPIC_PREFIX_LEN: usize = 16;
pub const MAX_BROKER_URL_LEN: usize = 64;
pub const MAX_CLIENT_ID_LEN: usize = 32;
pub const MAX_CREDENTIAL_LEN: usize = 64;
pub const MAX_SSID_LEN: usize = 32;
pub const MAX_LABEL_LEN: usize = 32;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Door drive ---
    /// How long an open/close output is held HIGH (milliseconds)
    pub pulse_duration_ms: u32,
    /// Reject a command while the opposite output is still pulsing
    pub interlock_outputs: bool,

    // --- Panel ---
    /// Button sampling interval (milliseconds)
    pub button_debounce_ms: u32,
    /// Half-period of a blinking LED (milliseconds)
    pub led_blink_period_ms: u32,

    // --- Timing ---
    /// Control loop interval (milliseconds)
    pub control_loop_interval_ms: u32,
    /// Task watchdog timeout (milliseconds)
    pub watchdog_timeout_ms: u32,

    pub identity: IdentityConfig,
    pub network: NetworkConfig,
    pub mqtt: MqttConfig,
}

/// Published once per broker connection on `system/info`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub application: String<MAX_LABEL_LEN>,
    pub author: String<MAX_LABEL_LEN>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub ssid: String<MAX_SSID_LEN>,
    pub password: String<MAX_CREDENTIAL_LEN>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// e.g. `mqtt://192.168.1.10:1883`
    pub broker_url: String<MAX_BROKER_URL_LEN>,
    pub client_id: String<MAX_CLIENT_ID_LEN>,
    /// Empty means anonymous.
    pub username: String<MAX_CREDENTIAL_LEN>,
    pub password: String<MAX_CREDENTIAL_LEN>,
    /// First path segment of every topic
    pub topic_prefix: String<MAX_TOPIC_PREFIX_LEN>,
    pub keep_alive_secs: u16,
    /// Uptime + status publish interval (milliseconds)
    pub status_interval_ms: u32,
}

/// Copy `s` into a fixed-capacity string; empty if it does not fit.
pub(crate) fn fixed_str<const N: usize>(s: &str) -> String<N> {
    let mut out = String::new();
    if out.push_str(s).is_err() {
        out.clear();
    }
    out
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Door drive
            pulse_duration_ms: 500,
            interlock_outputs: false,

            // Panel
            button_debounce_ms: 100,
            led_blink_period_ms: 500,

            // Timing
            control_loop_interval_ms: 10,  // 100 Hz
            watchdog_timeout_ms: 30_000,

            identity: IdentityConfig::default(),
            network: NetworkConfig::default(),
            mqtt: MqttConfig::default(),
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            application: fixed_str("GarageDoorController"),
            author: fixed_str("smhex"),
        }
    }
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            broker_url: fixed_str("mqtt://192.168.1.2:1883"),
            client_id: fixed_str("arduino-gdc"),
            username: String::new(),
            password: String::new(),
            topic_prefix: fixed_str("gdc"),
            keep_alive_secs: 60,
            status_interval_ms: 1000,
        }
    }
}

impl SystemConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|e| {
            warn!("CONFIG | parse error: {}", e);
            ConfigError::Parse
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the control loop misbehave.
    /// Out-of-range values are refused, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(50..=5_000).contains(&self.pulse_duration_ms) {
            return Err(ConfigError::Invalid("pulse_duration_ms"));
        }
        if !(10..=1_000).contains(&self.button_debounce_ms) {
            return Err(ConfigError::Invalid("button_debounce_ms"));
        }
        if !(100..=5_000).contains(&self.led_blink_period_ms) {
            return Err(ConfigError::Invalid("led_blink_period_ms"));
        }
        // The loop period bounds the pulse resolution.
        if self.control_loop_interval_ms == 0
            || self.control_loop_interval_ms >= self.pulse_duration_ms
        {
            return Err(ConfigError::Invalid("control_loop_interval_ms"));
        }
        if self.watchdog_timeout_ms < 1_000
            || self.watchdog_timeout_ms <= self.control_loop_interval_ms
        {
            return Err(ConfigError::Invalid("watchdog_timeout_ms"));
        }
        self.mqtt.validate()
    }
}

impl MqttConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let prefix = self.topic_prefix.as_str();
        if prefix.is_empty()
            || prefix.ends_with('/')
            || prefix.contains(['#', '+'])
        {
            return Err(ConfigError::Invalid("mqtt.topic_prefix"));
        }
        if self.broker_url.is_empty() {
            return Err(ConfigError::Invalid("mqtt.broker_url"));
        }
        if self.status_interval_ms < 100 {
            return Err(ConfigError::Invalid("mqtt.status_interval_ms"));
        }
        Ok(())
    }
}
