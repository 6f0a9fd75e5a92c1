use clap::{Args, Subcommand, ValueEnum};

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod selftest;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build a request frame for a command.
    Encode(EncodeArgs),
    /// Checksum-validate a response frame.
    Decode(DecodeArgs),
    /// Exercise the engine against a simulated device.
    Selftest(SelftestArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Selftest(args) => selftest::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Command name (e.g. GET_DEVICE_INFO) or opcode (e.g. 0x04).
    pub command: String,
    /// Parameter bytes as hex (e.g. 01ff).
    #[arg(long, default_value = "")]
    pub params: String,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Response frame bytes as hex.
    pub frame: String,
    /// Framing rule the response follows.
    #[arg(long, value_enum, default_value = "v1")]
    pub protocol: ProtocolArg,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ProtocolArg {
    V1,
    Legacy,
}

#[derive(Args, Debug, Default)]
pub struct SelftestArgs {}

#[derive(Args, Debug, Default)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse a hex string (optionally 0x-prefixed, whitespace tolerated) into
/// bytes.
pub(crate) fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let cleaned: String = input
        .trim()
        .trim_start_matches("0x")
        .trim_start_matches("0X")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    if cleaned.len() % 2 != 0 {
        return Err(CliError::new(
            USAGE,
            format!("hex input has odd length ({})", cleaned.len()),
        ));
    }

    (0..cleaned.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&cleaned[i..i + 2], 16)
                .map_err(|_| CliError::new(USAGE, format!("invalid hex byte: {}", &cleaned[i..i + 2])))
        })
        .collect()
}
