//! Command opcodes and the static command/response-length table.
//!
//! Opcodes 0x00-0x04 are the protocol's defined command set. Commands
//! absent from the response-length table expect no reply and are sent
//! fire-and-forget.

/// Query protocol version and feature flags.
pub const GET_DEVICE_INFO: u8 = 0x00;

/// Simulate a physical camera button. No response.
pub const CAMERA_CONTROL: u8 = 0x01;

/// Press a key on the simulated five-key OSD pad.
pub const KEY_SIMULATE_PRESS: u8 = 0x02;

/// Release the currently pressed key on the simulated pad.
pub const KEY_SIMULATE_RELEASE: u8 = 0x03;

/// Open or close an OSD control session.
pub const KEY_CONNECTION: u8 = 0x04;

/// Operations for [`CAMERA_CONTROL`].
pub mod camera_op {
    pub const SIMULATE_WIFI_BUTTON: u8 = 0x00;
    pub const SIMULATE_POWER_BUTTON: u8 = 0x01;
    pub const CHANGE_MODE: u8 = 0x02;
}

/// Key codes for [`KEY_SIMULATE_PRESS`].
pub mod key {
    pub const SET: u8 = 0x01;
    pub const LEFT: u8 = 0x02;
    pub const RIGHT: u8 = 0x03;
    pub const UP: u8 = 0x04;
    pub const DOWN: u8 = 0x05;
}

/// Operations for [`KEY_CONNECTION`].
pub mod connection_op {
    pub const OPEN: u8 = 0x01;
    pub const CLOSE: u8 = 0x02;
}

/// Expected response length for a command, in bytes.
///
/// Consulted at send time; commands not listed here return 0, meaning no
/// response is awaited.
pub fn expected_response_len(command: u8) -> usize {
    match command {
        GET_DEVICE_INFO => 5,
        KEY_SIMULATE_PRESS => 2,
        KEY_SIMULATE_RELEASE => 2,
        KEY_CONNECTION => 3,
        _ => 0,
    }
}

/// Human-readable name for a command opcode.
pub fn command_name(command: u8) -> &'static str {
    match command {
        GET_DEVICE_INFO => "GET_DEVICE_INFO",
        CAMERA_CONTROL => "CAMERA_CONTROL",
        KEY_SIMULATE_PRESS => "KEY_SIMULATE_PRESS",
        KEY_SIMULATE_RELEASE => "KEY_SIMULATE_RELEASE",
        KEY_CONNECTION => "KEY_CONNECTION",
        _ => "UNKNOWN",
    }
}

/// Parse a command name (as printed by [`command_name`]) or a numeric
/// opcode in decimal or `0x` hex form.
pub fn parse_command(input: &str) -> Option<u8> {
    match input {
        "GET_DEVICE_INFO" => return Some(GET_DEVICE_INFO),
        "CAMERA_CONTROL" => return Some(CAMERA_CONTROL),
        "KEY_SIMULATE_PRESS" => return Some(KEY_SIMULATE_PRESS),
        "KEY_SIMULATE_RELEASE" => return Some(KEY_SIMULATE_RELEASE),
        "KEY_CONNECTION" => return Some(KEY_CONNECTION),
        _ => {}
    }
    if let Some(hex) = input.strip_prefix("0x").or_else(|| input.strip_prefix("0X")) {
        return u8::from_str_radix(hex, 16).ok();
    }
    input.parse().ok()
}
