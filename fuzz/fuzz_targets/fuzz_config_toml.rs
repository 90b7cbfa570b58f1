//! Fuzz target: configuration document parsing
//!
//! Drives `SystemConfig::from_toml` with arbitrary text and verifies:
//! - No panics, whatever the input
//! - Every accepted document also passes `validate()`
//!
//! cargo fuzz run fuzz_config_toml

#![no_main]

use gdc::config::SystemConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = SystemConfig::from_toml(text) {
        assert!(config.validate().is_ok());
        assert!(config.control_loop_interval_ms < config.pulse_duration_ms);
    }
});
