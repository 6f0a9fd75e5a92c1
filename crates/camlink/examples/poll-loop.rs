//! Minimal poll loop — drives a request through the engine against a
//! simulated device on the other end of an in-memory link.
//!
//! Run with:
//!   cargo run --example poll-loop --features engine

use camlink::channel::{Channel, InMemoryChannel};
use camlink::engine::{parse_device_info, Link, Outcome};
use camlink::frame::crc::crc8_dvb_s2_update;
use camlink::frame::{command, PROTOCOL_HEADER};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (port, mut device) = InMemoryChannel::pair();
    let mut link = Link::new(port);

    link.request_device_info(0, |completion| match completion.outcome {
        Outcome::Success => match parse_device_info(completion.response) {
            Some(info) => eprintln!(
                "device info: protocol v{}, features {:#06x}",
                info.protocol_version, info.features
            ),
            None => eprintln!("device info reply too short"),
        },
        other => eprintln!("request ended without a usable reply: {other:?}"),
    })?;

    // The "device": consume the request frame and answer with a valid
    // device-info reply. A real embedder replaces this with a serial port.
    while device.bytes_available()? > 0 {
        device.read_byte()?;
    }
    let body = [PROTOCOL_HEADER, 0x01, 0x0F, 0x00];
    let mut reply = body.to_vec();
    reply.push(crc8_dvb_s2_update(0, &body));
    device.write_all(&reply)?;

    // The embedder's scheduler: poll on a cadence with monotonic millis.
    for now in (0..50).step_by(10) {
        link.poll(now)?;
    }

    link.simulate_camera_button(command::camera_op::SIMULATE_POWER_BUTTON)?;
    eprintln!("power button frame queued on the wire");
    Ok(())
}
