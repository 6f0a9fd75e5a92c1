//! Poll-driven request/response engine for serial camera accessories.
//!
//! This is the "just works" layer. A [`Link`] owns a
//! [`Channel`](camlink_channel::Channel) and a fixed-capacity queue of
//! in-flight requests. [`Link::send_request`] transmits immediately and
//! enqueues a waiting context; [`Link::poll`], called on a schedule by the
//! surrounding system, drains received bytes into the head context,
//! validates completed frames, retries or times out stalled requests, and
//! fires each request's completion handler exactly once. Nothing blocks:
//! the engine is single-threaded and cooperative throughout.

pub mod context;
pub mod device;
pub mod error;
pub mod link;
pub mod queue;

pub use context::{Completion, Millis, Outcome, RequestContext, ResponseHandler};
pub use device::{parse_device_info, DeviceInfo};
pub use error::{LinkError, Result};
pub use link::{Link, Request};
pub use queue::{PendingQueue, DEFAULT_PENDING_CAPACITY};
