use std::cell::RefCell;
use std::rc::Rc;

use bytes::BytesMut;
use tracing::trace;

use crate::error::{ChannelError, Result};
use crate::traits::Channel;

/// One direction of an in-memory link.
type Direction = Rc<RefCell<BytesMut>>;

/// In-memory channel endpoint, connected to a twin created by
/// [`InMemoryChannel::pair`].
///
/// Bytes written on one endpoint become available on the other. Used by
/// tests, examples, and the CLI selftest to stand in for a serial port
/// with a simulated device on the far side.
pub struct InMemoryChannel {
    rx: Direction,
    tx: Direction,
}

impl InMemoryChannel {
    /// Create two connected endpoints.
    pub fn pair() -> (Self, Self) {
        let a_to_b: Direction = Rc::new(RefCell::new(BytesMut::new()));
        let b_to_a: Direction = Rc::new(RefCell::new(BytesMut::new()));

        let a = Self {
            rx: Rc::clone(&b_to_a),
            tx: Rc::clone(&a_to_b),
        };
        let b = Self {
            rx: a_to_b,
            tx: b_to_a,
        };
        (a, b)
    }
}

impl Channel for InMemoryChannel {
    fn bytes_available(&mut self) -> Result<usize> {
        Ok(self.rx.borrow().len())
    }

    fn read_byte(&mut self) -> Result<u8> {
        let mut rx = self.rx.borrow_mut();
        if rx.is_empty() {
            return Err(ChannelError::Empty);
        }
        Ok(rx.split_to(1)[0])
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        // Both endpoints hold a reference to each direction; a lone
        // reference means the twin was dropped.
        if Rc::strong_count(&self.tx) < 2 {
            return Err(ChannelError::Closed);
        }
        self.tx.borrow_mut().extend_from_slice(bytes);
        trace!(len = bytes.len(), "wrote to in-memory channel");
        Ok(())
    }
}

/// Scripted channel test double.
///
/// Serves pre-queued response bytes and records every write, so a test can
/// assert on transmitted frames and dribble replies in byte by byte.
#[derive(Default)]
pub struct ScriptedChannel {
    incoming: BytesMut,
    written: Vec<u8>,
}

impl ScriptedChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes to be served to subsequent reads.
    pub fn queue(&mut self, bytes: &[u8]) {
        self.incoming.extend_from_slice(bytes);
    }

    /// All bytes written so far, in order.
    pub fn written(&self) -> &[u8] {
        &self.written
    }

    /// Drain and return the recorded writes.
    pub fn take_written(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.written)
    }
}

impl Channel for ScriptedChannel {
    fn bytes_available(&mut self) -> Result<usize> {
        Ok(self.incoming.len())
    }

    fn read_byte(&mut self) -> Result<u8> {
        if self.incoming.is_empty() {
            return Err(ChannelError::Empty);
        }
        Ok(self.incoming.split_to(1)[0])
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.written.extend_from_slice(bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_carries_bytes_both_ways() {
        let (mut a, mut b) = InMemoryChannel::pair();

        a.write_all(b"ping").unwrap();
        assert_eq!(b.bytes_available().unwrap(), 4);
        let got: Vec<u8> = (0..4).map(|_| b.read_byte().unwrap()).collect();
        assert_eq!(got, b"ping");

        b.write_all(b"pong").unwrap();
        assert_eq!(a.bytes_available().unwrap(), 4);
        assert_eq!(a.read_byte().unwrap(), b'p');
    }

    #[test]
    fn read_from_empty_endpoint_fails() {
        let (mut a, _b) = InMemoryChannel::pair();
        assert_eq!(a.bytes_available().unwrap(), 0);
        assert!(matches!(a.read_byte(), Err(ChannelError::Empty)));
    }

    #[test]
    fn write_after_peer_dropped_fails() {
        let (mut a, b) = InMemoryChannel::pair();
        drop(b);
        assert!(matches!(a.write_all(b"x"), Err(ChannelError::Closed)));
    }

    #[test]
    fn buffered_bytes_survive_peer_drop() {
        let (mut a, mut b) = InMemoryChannel::pair();
        a.write_all(&[0xAA, 0xBB]).unwrap();
        drop(a);

        assert_eq!(b.bytes_available().unwrap(), 2);
        assert_eq!(b.read_byte().unwrap(), 0xAA);
        assert_eq!(b.read_byte().unwrap(), 0xBB);
    }

    #[test]
    fn scripted_channel_records_writes_and_serves_queue() {
        let mut channel = ScriptedChannel::new();
        channel.queue(&[1, 2, 3]);

        channel.write_all(&[9, 8]).unwrap();
        assert_eq!(channel.written(), &[9, 8]);

        assert_eq!(channel.bytes_available().unwrap(), 3);
        assert_eq!(channel.read_byte().unwrap(), 1);
        assert_eq!(channel.read_byte().unwrap(), 2);
        assert_eq!(channel.read_byte().unwrap(), 3);
        assert!(matches!(channel.read_byte(), Err(ChannelError::Empty)));

        assert_eq!(channel.take_written(), vec![9, 8]);
        assert!(channel.written().is_empty());
    }
}
