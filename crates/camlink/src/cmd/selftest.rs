use std::cell::RefCell;
use std::rc::Rc;

use camlink_channel::{Channel, InMemoryChannel};
use camlink_engine::{parse_device_info, Link, Outcome, Request};
use camlink_frame::command::KEY_CONNECTION;
use camlink_frame::crc::{crc8_dvb_s2_update, crc8_poly31};
use camlink_frame::{validate_response, ProtocolVersion, PROTOCOL_HEADER};
use serde::Serialize;

use crate::cmd::SelftestArgs;
use crate::exit::{channel_error, link_error, CliError, CliResult, SELFTEST_FAILED, SUCCESS};
use crate::output::OutputFormat;

#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum CheckStatus {
    Pass,
    Fail,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    name: String,
    status: CheckStatus,
    detail: String,
}

#[derive(Debug, Serialize)]
struct SelftestOutput {
    checks: Vec<CheckResult>,
    overall: &'static str,
}

/// Run the whole stack — codec, queue, receive engine, supervisor —
/// against an in-memory device and report per-scenario results.
pub fn run(_args: SelftestArgs, format: OutputFormat) -> CliResult<i32> {
    let checks = vec![
        request_response_check(),
        checksum_detection_check(),
        retry_then_timeout_check(),
        legacy_framing_check(),
    ];

    let has_fail = checks.iter().any(|c| matches!(c.status, CheckStatus::Fail));
    let overall = if has_fail { "fail" } else { "pass" };
    let output = SelftestOutput { checks, overall };

    print_selftest(&output, format);

    if has_fail {
        Ok(SELFTEST_FAILED)
    } else {
        Ok(SUCCESS)
    }
}

fn check(name: &str, outcome: Result<String, CliError>) -> CheckResult {
    match outcome {
        Ok(detail) => CheckResult {
            name: name.to_string(),
            status: CheckStatus::Pass,
            detail,
        },
        Err(err) => CheckResult {
            name: name.to_string(),
            status: CheckStatus::Fail,
            detail: err.message,
        },
    }
}

fn expectation_failed(message: impl Into<String>) -> CliError {
    CliError::new(SELFTEST_FAILED, message)
}

fn device_info_reply() -> Vec<u8> {
    let body = [PROTOCOL_HEADER, 0x01, 0x0F, 0x00];
    let mut reply = body.to_vec();
    reply.push(crc8_dvb_s2_update(0, &body));
    reply
}

fn drain(device: &mut InMemoryChannel) -> Result<usize, CliError> {
    let mut bytes = 0usize;
    loop {
        let available = device
            .bytes_available()
            .map_err(|err| channel_error("device read", err))?;
        if available == 0 {
            return Ok(bytes);
        }
        device
            .read_byte()
            .map_err(|err| channel_error("device read", err))?;
        bytes += 1;
    }
}

fn request_response_check() -> CheckResult {
    let outcome = (|| {
        let (port, mut device) = InMemoryChannel::pair();
        let mut link = Link::new(port);
        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);

        link.request_device_info(0, move |completion| {
            if completion.outcome == Outcome::Success {
                *sink.borrow_mut() = parse_device_info(completion.response);
            }
        })
        .map_err(|err| link_error("send", err))?;

        drain(&mut device)?;
        device
            .write_all(&device_info_reply())
            .map_err(|err| channel_error("device write", err))?;
        link.poll(50).map_err(|err| link_error("poll", err))?;

        let info = seen
            .borrow()
            .ok_or_else(|| expectation_failed("no valid device info arrived"))?;
        Ok(format!(
            "protocol v{}, features {:#06x}",
            info.protocol_version, info.features
        ))
    })();
    check("request_response", outcome)
}

fn checksum_detection_check() -> CheckResult {
    let outcome = (|| {
        let (port, mut device) = InMemoryChannel::pair();
        let mut link = Link::new(port);
        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);

        link.request_device_info(0, move |completion| {
            *sink.borrow_mut() = Some(completion.outcome);
        })
        .map_err(|err| link_error("send", err))?;

        let mut reply = device_info_reply();
        reply[2] ^= 0x01;
        device
            .write_all(&reply)
            .map_err(|err| channel_error("device write", err))?;
        link.poll(50).map_err(|err| link_error("poll", err))?;

        match *seen.borrow() {
            Some(Outcome::ChecksumFailure) => Ok("single-bit corruption detected".to_string()),
            other => Err(expectation_failed(format!(
                "expected checksum failure, got {other:?}"
            ))),
        }
    })();
    check("checksum_detection", outcome)
}

fn retry_then_timeout_check() -> CheckResult {
    let outcome = (|| {
        let (port, mut device) = InMemoryChannel::pair();
        let mut link = Link::new(port);
        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);

        link.send_request(
            Request::new(KEY_CONNECTION)
                .params(&[0x01])
                .timeout(200)
                .retries(1)
                .on_complete(move |completion| {
                    *sink.borrow_mut() = Some(completion.outcome);
                }),
            0,
        )
        .map_err(|err| link_error("send", err))?;

        let frame_len = drain(&mut device)?;
        let mut retransmitted = 0usize;
        for now in [100u64, 201, 402] {
            link.poll(now).map_err(|err| link_error("poll", err))?;
            retransmitted += drain(&mut device)?;
        }

        match *seen.borrow() {
            Some(Outcome::TimedOut) if retransmitted == frame_len => {
                Ok("one retry transmitted, then timed out".to_string())
            }
            Some(Outcome::TimedOut) => Err(expectation_failed(format!(
                "expected {frame_len} retransmitted bytes, saw {retransmitted}"
            ))),
            other => Err(expectation_failed(format!("expected timeout, got {other:?}"))),
        }
    })();
    check("retry_then_timeout", outcome)
}

fn legacy_framing_check() -> CheckResult {
    let outcome = (|| {
        let crc = crc8_poly31(&[0x01, 0x02, 0x03, 0x99]);
        let mut frame = [0x01, 0x02, 0x03, crc, 0x99];
        validate_response(&mut frame, ProtocolVersion::Legacy)
            .map_err(|err| expectation_failed(format!("valid legacy frame rejected: {err}")))?;

        let mut tampered = [0x01, 0x02, 0x03, crc, 0x98];
        if validate_response(&mut tampered, ProtocolVersion::Legacy).is_ok() {
            return Err(expectation_failed("tampered legacy frame accepted"));
        }
        Ok("tail-swap checksum behaves".to_string())
    })();
    check("legacy_framing", outcome)
}

fn print_selftest(output: &SelftestOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(output).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("camlink selftest\n");
            for c in &output.checks {
                println!("  [{:>4}] {:<22} {}", status_text(c.status), c.name, c.detail);
            }
            if output.overall == "pass" {
                println!("\n  Result: all checks passed");
            } else {
                println!("\n  Result: one or more checks failed");
            }
        }
        OutputFormat::Raw => {
            println!("{}", output.overall);
        }
    }
}

fn status_text(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Pass => "PASS",
        CheckStatus::Fail => "FAIL",
    }
}
