//! Request/response protocol engine for serial camera accessories.
//!
//! camlink speaks the framed, CRC-checked command protocol used by
//! camera-type accessories on a serial link: transmit a command
//! immediately, poll for the framed reply, retry on timeout, and hand the
//! validated response to a completion handler — all without blocking.
//!
//! # Crate Structure
//!
//! - [`channel`] — Byte-stream channel abstraction (the serial-port seam)
//! - [`frame`] — Wire framing, CRC validation, command table
//! - [`engine`] — Pending-request ring, receive/reassembly, timeout/retry
//!   supervisor, and the per-command device surface (behind the `engine`
//!   feature, on by default)

/// Re-export channel types.
pub mod channel {
    pub use camlink_channel::*;
}

/// Re-export frame types.
pub mod frame {
    pub use camlink_frame::*;
}

/// Re-export engine types (requires `engine` feature).
#[cfg(feature = "engine")]
pub mod engine {
    pub use camlink_engine::*;
}
