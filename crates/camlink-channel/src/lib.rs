//! Byte-stream channel abstraction for serial camera accessories.
//!
//! This is the lowest layer of camlink. The protocol engine talks to the
//! device through the [`Channel`] trait; opening and configuring the
//! underlying port (baud rate, framing, duplex) belongs to the embedder.
//! Everything else builds on top of the trait provided here.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{ChannelError, Result};
pub use memory::{InMemoryChannel, ScriptedChannel};
pub use traits::Channel;
