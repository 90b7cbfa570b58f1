//! Fuzz target: inbound `setnewdoorstate` payloads
//!
//! Feeds arbitrary bytes through the same path an MQTT message takes and
//! verifies:
//! - No panics under arbitrary byte inputs
//! - Anything that is not UTF-8 or exceeds the slot capacity is dropped
//! - Only the exact words `open` and `close` parse as commands
//!
//! cargo fuzz run fuzz_command_payload

#![no_main]

use gdc::app::commands::{DoorCommand, MAX_PAYLOAD_LEN, payload_from_bytes};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some(payload) = payload_from_bytes(data) else {
        assert!(data.len() > MAX_PAYLOAD_LEN || core::str::from_utf8(data).is_err());
        return;
    };
    assert_eq!(payload.as_bytes(), data);

    match DoorCommand::from_payload(&payload) {
        Ok(command) => assert_eq!(command.as_str().as_bytes(), data),
        Err(_) => assert!(data != b"open" && data != b"close"),
    }
});
