//! WiFi station-mode link.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: [`WifiLink`] drives the ESP-IDF WiFi
//!   driver via `esp_idf_svc::wifi`.
//! - **all targets**: credential checks and the [`Backoff`] policy, so
//!   they are tested on the host.
//!
//! ## Reconnection policy
//!
//! On disconnect the link waits an exponential backoff (2 s → 4 s →
//! 8 s … capped at 60 s) before retrying.  Retries are non-blocking so
//! the door keeps working while the network is away.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialError {
    InvalidSsid,
    InvalidPassword,
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => {
                write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)")
            }
        }
    }
}

impl std::error::Error for CredentialError {}

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

pub fn validate_credentials(ssid: &str, password: &str) -> Result<(), CredentialError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(CredentialError::InvalidSsid);
    }
    if !password.is_empty() && !(8..=64).contains(&password.len()) {
        return Err(CredentialError::InvalidPassword);
    }
    Ok(())
}

const INITIAL_BACKOFF_MS: u32 = 2_000;
const MAX_BACKOFF_MS: u32 = 60_000;

/// Retry scheduler for a dropped link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    delay_ms: u32,
    last_attempt_ms: Option<u32>,
    attempts: u32,
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new()
    }
}

impl Backoff {
    pub fn new() -> Self {
        Self {
            delay_ms: INITIAL_BACKOFF_MS,
            last_attempt_ms: None,
            attempts: 0,
        }
    }

    /// Whether a retry is due at `now_ms`.  Records the attempt and
    /// doubles the next delay when it is.
    pub fn poll(&mut self, now_ms: u32) -> bool {
        let due = self
            .last_attempt_ms
            .is_none_or(|last| now_ms.wrapping_sub(last) >= self.delay_ms);
        if due {
            if self.last_attempt_ms.is_some() {
                self.delay_ms = (self.delay_ms * 2).min(MAX_BACKOFF_MS);
            }
            self.last_attempt_ms = Some(now_ms);
            self.attempts = self.attempts.wrapping_add(1);
        }
        due
    }

    /// Link is up again.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn delay_ms(&self) -> u32 {
        self.delay_ms
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

#[cfg(target_os = "espidf")]
pub use esp::WifiLink;

#[cfg(target_os = "espidf")]
mod esp {
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::hal::modem::Modem;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;
    use esp_idf_svc::wifi::{
        AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi,
    };
    use log::{info, warn};

    use super::{Backoff, validate_credentials};
    use crate::config::NetworkConfig;

    pub struct WifiLink {
        inner: BlockingWifi<EspWifi<'static>>,
        backoff: Backoff,
        was_up: bool,
    }

    impl WifiLink {
        /// Configure the station and start the first association attempt.
        /// Does not wait for an IP: the control loop must not block on the
        /// network.
        pub fn start(
            modem: Modem,
            sysloop: EspSystemEventLoop,
            nvs: EspDefaultNvsPartition,
            network: &NetworkConfig,
        ) -> anyhow::Result<Self> {
            validate_credentials(&network.ssid, &network.password)?;

            let esp_wifi = EspWifi::new(modem, sysloop.clone(), Some(nvs))?;
            let mut inner = BlockingWifi::wrap(esp_wifi, sysloop)?;

            let auth_method = if network.password.is_empty() {
                AuthMethod::None
            } else {
                AuthMethod::WPA2Personal
            };
            inner.set_configuration(&Configuration::Client(ClientConfiguration {
                ssid: network.ssid.clone(),
                password: network.password.clone(),
                auth_method,
                ..Default::default()
            }))?;
            inner.start()?;
            info!("WiFi: started, joining '{}'", network.ssid);

            if let Err(e) = inner.wifi_mut().connect() {
                warn!("WiFi: initial connect failed: {:?}", e);
            }

            Ok(Self {
                inner,
                backoff: Backoff::new(),
                was_up: false,
            })
        }

        pub fn is_connected(&self) -> bool {
            self.inner.is_connected().unwrap_or(false)
        }

        /// Retry association when the link is down and the backoff allows.
        pub fn maintain(&mut self, now_ms: u32) {
            let up = self.is_connected();
            if up {
                if !self.was_up {
                    info!("WiFi: connected");
                    self.backoff.reset();
                }
                self.was_up = true;
                return;
            }
            if self.was_up {
                warn!("WiFi: link lost");
                self.was_up = false;
            }
            if self.backoff.poll(now_ms) {
                info!(
                    "WiFi: reconnect attempt {} (next backoff {}ms)",
                    self.backoff.attempts(),
                    self.backoff.delay_ms()
                );
                if let Err(e) = self.inner.wifi_mut().connect() {
                    warn!("WiFi: connect failed: {:?}", e);
                }
            }
        }
    }
}
