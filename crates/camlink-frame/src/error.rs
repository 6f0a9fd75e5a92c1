/// Errors that can occur during frame encoding/validation.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum FrameError {
    /// The parameter payload exceeds the frame budget.
    #[error("parameters too long ({len} bytes, max {max})")]
    ParamsTooLong { len: usize, max: usize },

    /// The destination buffer cannot hold the encoded frame.
    #[error("frame buffer too small (need {needed} bytes, have {capacity})")]
    BufferTooSmall { needed: usize, capacity: usize },

    /// The response has the wrong length for its framing rule.
    #[error("bad response length ({len} bytes, expected {expected})")]
    ResponseLength { len: usize, expected: usize },

    /// The response checksum does not match.
    #[error("checksum mismatch (expected {expected:#04x}, got {actual:#04x})")]
    ChecksumMismatch { expected: u8, actual: u8 },
}

pub type Result<T> = std::result::Result<T, FrameError>;
