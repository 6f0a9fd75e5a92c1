use camlink_frame::{command_name, encode_request, parse_command, MAX_FRAME_LEN};

use crate::cmd::{parse_hex, EncodeArgs};
use crate::exit::{frame_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_report, to_hex, FrameReport, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let command = parse_command(&args.command)
        .ok_or_else(|| CliError::new(USAGE, format!("unknown command: {}", args.command)))?;
    let params = parse_hex(&args.params)?;

    let mut buf = [0u8; MAX_FRAME_LEN];
    let len = encode_request(command, &params, &mut buf)
        .map_err(|err| frame_error("encode failed", err))?;

    let report = FrameReport {
        direction: "request",
        protocol: "v1",
        command: Some(command),
        command_name: Some(command_name(command)),
        length: len,
        checksum: "valid",
        bytes: to_hex(&buf[..len]),
    };
    print_report(&report, format);

    Ok(SUCCESS)
}

#[cfg(test)]
mod tests {
    use camlink_frame::command::GET_DEVICE_INFO;
    use camlink_frame::crc::crc8_dvb_s2_update;

    use super::*;

    #[test]
    fn encodes_named_command() {
        let args = EncodeArgs {
            command: "GET_DEVICE_INFO".to_string(),
            params: String::new(),
        };
        assert_eq!(run(args, OutputFormat::Raw).unwrap(), SUCCESS);
    }

    #[test]
    fn rejects_unknown_command_name() {
        let args = EncodeArgs {
            command: "NOT_A_COMMAND".to_string(),
            params: String::new(),
        };
        let err = run(args, OutputFormat::Raw).unwrap_err();
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn rejects_oversized_params() {
        let args = EncodeArgs {
            command: "0x01".to_string(),
            params: "00".repeat(62),
        };
        let err = run(args, OutputFormat::Raw).unwrap_err();
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn encoded_bytes_carry_valid_checksum() {
        let mut buf = [0u8; MAX_FRAME_LEN];
        let len = encode_request(GET_DEVICE_INFO, &[], &mut buf).unwrap();
        assert_eq!(crc8_dvb_s2_update(0, &buf[..len]), 0);
    }
}
