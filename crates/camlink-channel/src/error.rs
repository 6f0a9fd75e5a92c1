/// Errors that can occur on a byte-stream channel.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// An I/O error occurred on the underlying port.
    #[error("channel I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A byte was requested while no bytes were available.
    #[error("read from empty channel")]
    Empty,

    /// The channel is no longer usable (peer endpoint dropped).
    #[error("channel closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, ChannelError>;
