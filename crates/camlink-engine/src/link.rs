use camlink_channel::Channel;
use camlink_frame::{command_name, encode_request, validate_response, ProtocolVersion, MAX_FRAME_LEN, MAX_PARAM_LEN};
use tracing::{debug, trace, warn};

use crate::context::{Completion, Millis, Outcome, RequestContext, ResponseHandler};
use crate::error::Result;
use crate::queue::PendingQueue;

/// Default per-attempt timeout when a request does not set one.
pub const DEFAULT_TIMEOUT_MS: Millis = 1000;

/// One command to send, with its response expectations.
///
/// ```no_run
/// # use camlink_engine::{Link, Request};
/// # use camlink_channel::InMemoryChannel;
/// # use camlink_frame::command;
/// # let (port, _device) = InMemoryChannel::pair();
/// # let mut link = Link::new(port);
/// let request = Request::new(command::KEY_CONNECTION)
///     .params(&[0x01])
///     .timeout(200)
///     .retries(1)
///     .on_complete(|completion| println!("{:?}", completion.outcome));
/// link.send_request(request, 0)?;
/// # Ok::<(), camlink_engine::LinkError>(())
/// ```
pub struct Request<'p> {
    pub command: u8,
    pub params: &'p [u8],
    /// Per-attempt timeout in milliseconds.
    pub timeout: Millis,
    /// Retransmissions allowed after the first attempt expires.
    pub max_retries: u8,
    pub version: ProtocolVersion,
    pub handler: Option<ResponseHandler>,
}

impl Request<'static> {
    pub fn new(command: u8) -> Self {
        Self {
            command,
            params: &[],
            timeout: DEFAULT_TIMEOUT_MS,
            max_retries: 0,
            version: ProtocolVersion::V1,
            handler: None,
        }
    }
}

impl<'p> Request<'p> {
    pub fn params<'q>(self, params: &'q [u8]) -> Request<'q> {
        Request {
            command: self.command,
            params,
            timeout: self.timeout,
            max_retries: self.max_retries,
            version: self.version,
            handler: self.handler,
        }
    }

    pub fn timeout(mut self, timeout: Millis) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn retries(mut self, max_retries: u8) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn version(mut self, version: ProtocolVersion) -> Self {
        self.version = version;
        self
    }

    pub fn on_complete(mut self, handler: impl FnOnce(Completion<'_>) + 'static) -> Self {
        self.handler = Some(Box::new(handler));
        self
    }
}

/// What the supervisor decided about the head context this tick.
enum HeadState {
    /// Queue empty; nothing to receive into.
    Idle,
    /// The head expired and was retransmitted; it must not receive bytes
    /// until the next poll.
    RetryInFlight,
    /// The head is live and eligible to receive.
    Receivable,
}

enum HeadAction {
    Retry {
        command: u8,
        params: [u8; MAX_PARAM_LEN],
        params_len: usize,
    },
    Expire,
}

/// Single-link request/response engine over a byte-stream channel.
///
/// All state lives here: the channel, the pending-request ring, and a
/// transmit scratch buffer reused per send. Every method runs to
/// completion on the caller's stack; completion handlers fire
/// synchronously from inside [`send_request`](Link::send_request) or
/// [`poll`](Link::poll). The caller supplies monotonic milliseconds to
/// both — the engine never reads a clock.
pub struct Link<C: Channel> {
    channel: C,
    queue: PendingQueue,
    scratch: [u8; MAX_FRAME_LEN],
}

impl<C: Channel> Link<C> {
    /// Engine over `channel` with the default queue capacity.
    pub fn new(channel: C) -> Self {
        Self::with_queue(channel, PendingQueue::new())
    }

    /// Engine over `channel` with an explicitly constructed ring.
    pub fn with_queue(channel: C, queue: PendingQueue) -> Self {
        Self {
            channel,
            queue,
            scratch: [0u8; MAX_FRAME_LEN],
        }
    }

    /// Number of requests currently awaiting responses.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Borrow the underlying channel.
    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    /// Consume the engine and return the channel.
    pub fn into_channel(self) -> C {
        self.channel
    }

    /// Transmit a command and track its response.
    ///
    /// Stale unread bytes are flushed first so a previous, abandoned
    /// exchange cannot corrupt this one. Commands the response table maps
    /// to zero bytes are fire-and-forget: nothing is enqueued and the
    /// handler (if any) completes immediately with
    /// [`Outcome::Success`] and an empty response. Otherwise the context
    /// is enqueued — if the ring is full the request is dropped silently
    /// by contract and its handler never fires — and the frame is
    /// transmitted regardless of queue state.
    pub fn send_request(&mut self, request: Request<'_>, now: Millis) -> Result<()> {
        self.flush_rx()?;

        let mut ctx = RequestContext::new(
            request.command,
            request.params,
            request.timeout,
            request.max_retries,
            request.version,
            request.handler,
            now,
        )?;

        if ctx.expected_len() == 0 {
            self.transmit(request.command, request.params)?;
            ctx.complete(Outcome::Success);
            return Ok(());
        }

        let command = ctx.command;
        let params = ctx.params;
        let params_len = ctx.params_len;

        if !self.queue.push(ctx) {
            warn!(
                command = command_name(command),
                "pending queue full; request dropped"
            );
        }
        self.transmit(command, &params[..params_len])
    }

    /// Transmit a command without tracking any response.
    pub fn send_command(&mut self, command: u8, params: &[u8]) -> Result<()> {
        self.transmit(command, params)
    }

    /// Drive reception and the timeout/retry supervisor.
    ///
    /// Call on a schedule (every few milliseconds is typical). Each tick:
    /// expired head contexts are retried or timed out first — a chain of
    /// already-expired heads resolves in one pass — then waiting bytes are
    /// drained one at a time into the head context. When the accumulated
    /// length matches the expected response length the frame is checksum-
    /// validated, the handler fires with success or checksum-failure, and
    /// the next context (which may already have bytes waiting) takes over.
    pub fn poll(&mut self, now: Millis) -> Result<()> {
        loop {
            match self.resolve_head(now)? {
                HeadState::Idle | HeadState::RetryInFlight => return Ok(()),
                HeadState::Receivable => {}
            }

            if self.channel.bytes_available()? == 0 {
                return Ok(());
            }
            let byte = self.channel.read_byte()?;

            let Some(ctx) = self.queue.front_mut() else {
                return Ok(());
            };
            if let Some(slot) = ctx.recv_buf.get_mut(ctx.recv_len) {
                *slot = byte;
                ctx.recv_len += 1;
            }

            if ctx.recv_len == ctx.expected_len {
                let outcome =
                    match validate_response(&mut ctx.recv_buf[..ctx.recv_len], ctx.version) {
                        Ok(()) => Outcome::Success,
                        Err(err) => {
                            debug!(
                                command = command_name(ctx.command),
                                %err,
                                "response failed validation"
                            );
                            Outcome::ChecksumFailure
                        }
                    };
                trace!(
                    command = command_name(ctx.command),
                    ?outcome,
                    "request completed"
                );
                // Callback fires before the context leaves the queue.
                ctx.complete(outcome);
                let _ = self.queue.pop_front();
            }
        }
    }

    /// Resolve expired head contexts until the head is live, the queue is
    /// empty, or a retry was just transmitted.
    fn resolve_head(&mut self, now: Millis) -> Result<HeadState> {
        loop {
            let action = match self.queue.front_mut() {
                None => return Ok(HeadState::Idle),
                Some(ctx) => {
                    if now <= ctx.deadline {
                        return Ok(HeadState::Receivable);
                    }
                    if ctx.retries_left > 0 {
                        HeadAction::Retry {
                            command: ctx.command,
                            params: ctx.params,
                            params_len: ctx.params_len,
                        }
                    } else {
                        HeadAction::Expire
                    }
                }
            };

            match action {
                HeadAction::Retry {
                    command,
                    params,
                    params_len,
                } => {
                    debug!(command = command_name(command), "deadline passed; resending");
                    self.transmit(command, &params[..params_len])?;
                    if let Some(ctx) = self.queue.front_mut() {
                        ctx.deadline = now + ctx.timeout;
                        ctx.retries_left -= 1;
                    }
                    return Ok(HeadState::RetryInFlight);
                }
                HeadAction::Expire => {
                    if let Some(ctx) = self.queue.front_mut() {
                        debug!(
                            command = command_name(ctx.command),
                            "retry budget exhausted; timing out"
                        );
                        ctx.complete(Outcome::TimedOut);
                    }
                    let _ = self.queue.pop_front();
                }
            }
        }
    }

    /// Encode into the shared scratch buffer and write to the channel.
    fn transmit(&mut self, command: u8, params: &[u8]) -> Result<()> {
        let len = encode_request(command, params, &mut self.scratch)?;
        self.channel.write_all(&self.scratch[..len])?;
        trace!(command = command_name(command), len, "frame transmitted");
        Ok(())
    }

    /// Drain unread bytes left over from a prior exchange.
    fn flush_rx(&mut self) -> Result<()> {
        let mut flushed = 0usize;
        while self.channel.bytes_available()? > 0 {
            let _ = self.channel.read_byte()?;
            flushed += 1;
        }
        if flushed > 0 {
            trace!(flushed, "discarded stale rx bytes");
        }
        Ok(())
    }
}
