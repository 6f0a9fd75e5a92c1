/// Errors that can occur in link operations.
///
/// Integrity failures, timeouts, and queue exhaustion are *not* errors:
/// they are delivered as [`Outcome`](crate::Outcome) values to the
/// request's completion handler (or, for a full queue, swallowed by
/// contract). Only channel I/O and encoding problems surface here.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// Channel-level error.
    #[error("channel error: {0}")]
    Channel(#[from] camlink_channel::ChannelError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] camlink_frame::FrameError),
}

pub type Result<T> = std::result::Result<T, LinkError>;
