use std::fmt;

use camlink_channel::ChannelError;
use camlink_engine::LinkError;
use camlink_frame::FrameError;

pub const SUCCESS: i32 = 0;
pub const CHANNEL_ERROR: i32 = 3;
pub const SELFTEST_FAILED: i32 = 30;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn channel_error(context: &str, err: ChannelError) -> CliError {
    let code = match err {
        ChannelError::Io(_) | ChannelError::Closed => CHANNEL_ERROR,
        ChannelError::Empty => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    let code = match err {
        FrameError::ChecksumMismatch { .. } => DATA_INVALID,
        FrameError::ResponseLength { .. } => DATA_INVALID,
        FrameError::ParamsTooLong { .. } => USAGE,
        FrameError::BufferTooSmall { .. } => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn link_error(context: &str, err: LinkError) -> CliError {
    match err {
        LinkError::Channel(err) => channel_error(context, err),
        LinkError::Frame(err) => frame_error(context, err),
    }
}
