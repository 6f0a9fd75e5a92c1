use crate::error::Result;

/// A full-duplex byte-stream link to a camera accessory.
///
/// This is the boundary between the protocol engine and the serial port.
/// The engine never blocks on reception: it asks how many bytes are
/// waiting, drains them one at a time, and writes whole frames. Port
/// discovery and configuration (typically 115200 8N1) happen elsewhere;
/// implementors wrap whatever handle they already own.
///
/// Implementations are used from a single thread and need not be `Send`.
pub trait Channel {
    /// Number of received bytes waiting to be read.
    fn bytes_available(&mut self) -> Result<usize>;

    /// Read the next waiting byte.
    ///
    /// Returns [`ChannelError::Empty`](crate::ChannelError::Empty) when no
    /// byte is waiting; callers are expected to check
    /// [`bytes_available`](Channel::bytes_available) first.
    fn read_byte(&mut self) -> Result<u8>;

    /// Write all of `bytes` to the link.
    fn write_all(&mut self, bytes: &[u8]) -> Result<()>;
}
