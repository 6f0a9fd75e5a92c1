//! Per-command convenience surface.
//!
//! Thin wrappers over [`Link`]: each picks a command opcode, payload,
//! timeout, and retry budget, and leaves parsing to the caller's handler.
//! [`parse_device_info`] decodes the one structured reply the protocol
//! defines.

use camlink_channel::Channel;
use camlink_frame::command;
use tracing::debug;

use crate::context::{Completion, Millis};
use crate::error::Result;
use crate::link::{Link, Request};

/// Device-info request timeout. Cameras can take several seconds to
/// answer while still booting.
pub const DEVICE_INFO_TIMEOUT_MS: Millis = 5000;

/// Timeout for OSD pad and session commands.
pub const KEY_ACTION_TIMEOUT_MS: Millis = 200;

/// Retry budget for OSD pad and session commands.
pub const KEY_ACTION_RETRIES: u8 = 1;

/// Feature bit: device can simulate its power button.
pub const FEATURE_SIMULATE_POWER_BUTTON: u16 = 1 << 0;
/// Feature bit: device can simulate its wifi button.
pub const FEATURE_SIMULATE_WIFI_BUTTON: u16 = 1 << 1;
/// Feature bit: device can switch modes on command.
pub const FEATURE_CHANGE_MODE: u16 = 1 << 2;
/// Feature bit: device supports the simulated five-key OSD pad.
pub const FEATURE_FIVE_KEY_OSD_CABLE: u16 = 1 << 3;

/// Protocol version and feature flags reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceInfo {
    pub protocol_version: u8,
    pub features: u16,
}

impl DeviceInfo {
    /// True if the device advertises `feature`.
    pub fn has(&self, feature: u16) -> bool {
        self.features & feature != 0
    }
}

/// Decode a device-info reply.
///
/// Field layout within the validated frame: protocol version at index 1,
/// feature flags split low/high across indices 2 and 3.
pub fn parse_device_info(response: &[u8]) -> Option<DeviceInfo> {
    if response.len() < 4 {
        return None;
    }
    let low = u16::from(response[2]);
    let high = u16::from(response[3]);
    Some(DeviceInfo {
        protocol_version: response[1],
        features: (high << 8) | low,
    })
}

impl<C: Channel> Link<C> {
    /// Ask the device for its protocol version and feature flags.
    ///
    /// The handler receives the raw completion; feed a successful response
    /// to [`parse_device_info`].
    pub fn request_device_info(
        &mut self,
        now: Millis,
        handler: impl FnOnce(Completion<'_>) + 'static,
    ) -> Result<()> {
        self.send_request(
            Request::new(command::GET_DEVICE_INFO)
                .timeout(DEVICE_INFO_TIMEOUT_MS)
                .on_complete(handler),
            now,
        )
    }

    /// Simulate a physical camera button. Fire-and-forget: no response is
    /// defined for this command.
    pub fn simulate_camera_button(&mut self, operation: u8) -> Result<()> {
        debug!(operation, "simulating camera button");
        self.send_command(command::CAMERA_CONTROL, &[operation])
    }

    /// Open an OSD control session. Required before any pad key events.
    pub fn open_osd_session(
        &mut self,
        now: Millis,
        handler: impl FnOnce(Completion<'_>) + 'static,
    ) -> Result<()> {
        self.osd_connection_event(command::connection_op::OPEN, now, handler)
    }

    /// Close the OSD control session when done driving the menu.
    pub fn close_osd_session(
        &mut self,
        now: Millis,
        handler: impl FnOnce(Completion<'_>) + 'static,
    ) -> Result<()> {
        self.osd_connection_event(command::connection_op::CLOSE, now, handler)
    }

    fn osd_connection_event(
        &mut self,
        operation: u8,
        now: Millis,
        handler: impl FnOnce(Completion<'_>) + 'static,
    ) -> Result<()> {
        self.send_request(
            Request::new(command::KEY_CONNECTION)
                .params(&[operation])
                .timeout(KEY_ACTION_TIMEOUT_MS)
                .retries(KEY_ACTION_RETRIES)
                .on_complete(handler),
            now,
        )
    }

    /// Press one key of the simulated five-key OSD pad.
    pub fn press_osd_key(
        &mut self,
        key: u8,
        now: Millis,
        handler: impl FnOnce(Completion<'_>) + 'static,
    ) -> Result<()> {
        self.send_request(
            Request::new(command::KEY_SIMULATE_PRESS)
                .params(&[key])
                .timeout(KEY_ACTION_TIMEOUT_MS)
                .retries(KEY_ACTION_RETRIES)
                .on_complete(handler),
            now,
        )
    }

    /// Release the currently pressed pad key.
    pub fn release_osd_key(
        &mut self,
        now: Millis,
        handler: impl FnOnce(Completion<'_>) + 'static,
    ) -> Result<()> {
        self.send_request(
            Request::new(command::KEY_SIMULATE_RELEASE)
                .timeout(KEY_ACTION_TIMEOUT_MS)
                .retries(KEY_ACTION_RETRIES)
                .on_complete(handler),
            now,
        )
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use camlink_channel::ScriptedChannel;
    use camlink_frame::crc::crc8_dvb_s2_update;
    use camlink_frame::PROTOCOL_HEADER;

    use super::*;
    use crate::context::Outcome;

    #[test]
    fn parse_device_info_extracts_fields() {
        let info = parse_device_info(&[0x00, 0x01, 0x0B, 0x01, 0x00]).unwrap();
        assert_eq!(info.protocol_version, 0x01);
        assert_eq!(info.features, 0x010B);
        assert!(info.has(FEATURE_SIMULATE_POWER_BUTTON));
        assert!(info.has(FEATURE_SIMULATE_WIFI_BUTTON));
        assert!(!info.has(FEATURE_CHANGE_MODE));
        assert!(info.has(FEATURE_FIVE_KEY_OSD_CABLE));
    }

    #[test]
    fn parse_device_info_rejects_short_responses() {
        assert!(parse_device_info(&[]).is_none());
        assert!(parse_device_info(&[0x00, 0x01, 0x0B]).is_none());
    }

    #[test]
    fn device_info_round_trip_through_engine() {
        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);

        let mut link = Link::new(ScriptedChannel::new());
        link.request_device_info(0, move |completion| {
            assert_eq!(completion.outcome, Outcome::Success);
            *sink.borrow_mut() = parse_device_info(completion.response);
        })
        .unwrap();

        let body = [PROTOCOL_HEADER, 0x01, 0x09, 0x00];
        let mut reply = body.to_vec();
        reply.push(crc8_dvb_s2_update(0, &body));
        link.channel_mut().queue(&reply);
        link.poll(100).unwrap();

        let info = seen.borrow().expect("handler should have parsed info");
        assert_eq!(info.protocol_version, 0x01);
        assert!(info.has(FEATURE_SIMULATE_POWER_BUTTON));
        assert!(info.has(FEATURE_FIVE_KEY_OSD_CABLE));
    }

    #[test]
    fn camera_button_is_fire_and_forget() {
        let mut link = Link::new(ScriptedChannel::new());
        link.simulate_camera_button(command::camera_op::SIMULATE_POWER_BUTTON)
            .unwrap();

        assert_eq!(link.pending(), 0);
        let written = link.channel_mut().take_written();
        assert_eq!(written[1], command::CAMERA_CONTROL);
        assert_eq!(written[2], command::camera_op::SIMULATE_POWER_BUTTON);
    }

    #[test]
    fn osd_session_commands_use_key_budget() {
        let mut link = Link::new(ScriptedChannel::new());
        link.open_osd_session(0, |_| {}).unwrap();
        assert_eq!(link.pending(), 1);

        let written = link.channel_mut().take_written();
        assert_eq!(written[1], command::KEY_CONNECTION);
        assert_eq!(written[2], command::connection_op::OPEN);

        // One retry, then timeout: exactly one retransmission.
        link.poll(KEY_ACTION_TIMEOUT_MS + 1).unwrap();
        assert_eq!(link.channel_mut().take_written(), written);
        link.poll(2 * KEY_ACTION_TIMEOUT_MS + 2).unwrap();
        assert_eq!(link.pending(), 0);
    }
}
