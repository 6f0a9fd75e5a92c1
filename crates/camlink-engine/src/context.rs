use camlink_frame::{expected_response_len, FrameError, ProtocolVersion, MAX_FRAME_LEN, MAX_PARAM_LEN};

/// Milliseconds from a monotonic clock, supplied by the caller.
///
/// All deadlines are absolute values of this clock; the engine never reads
/// time itself.
pub type Millis = u64;

/// Where a request stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Still waiting for a complete response.
    Pending,
    /// A complete response arrived and passed its checksum.
    Success,
    /// A complete response arrived but failed its checksum. Not retried.
    ChecksumFailure,
    /// No complete, valid response within the retry budget.
    TimedOut,
}

impl Outcome {
    /// True once the request can no longer change state.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Outcome::Pending)
    }
}

/// Terminal view of a request, handed to its completion handler.
#[derive(Debug)]
pub struct Completion<'a> {
    /// The command this request carried.
    pub command: u8,
    /// Terminal outcome (never [`Outcome::Pending`]).
    pub outcome: Outcome,
    /// Bytes received so far: the complete frame on success or
    /// checksum-failure (for the legacy format the tail-byte swap
    /// performed during validation is visible here), possibly partial on
    /// timeout.
    pub response: &'a [u8],
}

/// Completion callback. Invoked exactly once, synchronously, on the poll
/// (or send) stack, at a terminal outcome — never on a retry.
pub type ResponseHandler = Box<dyn FnOnce(Completion<'_>)>;

/// Bookkeeping record for one in-flight request awaiting a response.
///
/// Parameters are copied in at construction; nothing aliases caller
/// buffers afterwards. Only the receive path grows `recv_len`, and only
/// the supervisor rewrites `deadline`/`retries_left`.
pub struct RequestContext {
    pub(crate) command: u8,
    pub(crate) params: [u8; MAX_PARAM_LEN],
    pub(crate) params_len: usize,
    pub(crate) expected_len: usize,
    pub(crate) version: ProtocolVersion,
    pub(crate) timeout: Millis,
    pub(crate) deadline: Millis,
    pub(crate) retries_left: u8,
    pub(crate) recv_buf: [u8; MAX_FRAME_LEN],
    pub(crate) recv_len: usize,
    pub(crate) outcome: Outcome,
    pub(crate) handler: Option<ResponseHandler>,
}

impl RequestContext {
    pub(crate) fn new(
        command: u8,
        params: &[u8],
        timeout: Millis,
        max_retries: u8,
        version: ProtocolVersion,
        handler: Option<ResponseHandler>,
        now: Millis,
    ) -> Result<Self, FrameError> {
        if params.len() > MAX_PARAM_LEN {
            return Err(FrameError::ParamsTooLong {
                len: params.len(),
                max: MAX_PARAM_LEN,
            });
        }

        let mut params_buf = [0u8; MAX_PARAM_LEN];
        params_buf[..params.len()].copy_from_slice(params);

        Ok(Self {
            command,
            params: params_buf,
            params_len: params.len(),
            expected_len: expected_response_len(command),
            version,
            timeout,
            deadline: now + timeout,
            retries_left: max_retries,
            recv_buf: [0u8; MAX_FRAME_LEN],
            recv_len: 0,
            outcome: Outcome::Pending,
            handler,
        })
    }

    /// The command opcode this request carries.
    pub fn command(&self) -> u8 {
        self.command
    }

    /// Expected response length from the static table; 0 means
    /// fire-and-forget.
    pub fn expected_len(&self) -> usize {
        self.expected_len
    }

    /// Bytes accumulated so far.
    pub fn received(&self) -> &[u8] {
        &self.recv_buf[..self.recv_len]
    }

    /// Absolute deadline for the current attempt.
    pub fn deadline(&self) -> Millis {
        self.deadline
    }

    /// Retries remaining in the budget.
    pub fn retries_left(&self) -> u8 {
        self.retries_left
    }

    /// Current outcome.
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Record the terminal outcome and fire the handler, if any.
    pub(crate) fn complete(&mut self, outcome: Outcome) {
        debug_assert!(outcome.is_terminal());
        self.outcome = outcome;
        if let Some(handler) = self.handler.take() {
            handler(Completion {
                command: self.command,
                outcome,
                response: &self.recv_buf[..self.recv_len],
            });
        }
    }
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("command", &self.command)
            .field("params_len", &self.params_len)
            .field("expected_len", &self.expected_len)
            .field("version", &self.version)
            .field("deadline", &self.deadline)
            .field("retries_left", &self.retries_left)
            .field("recv_len", &self.recv_len)
            .field("outcome", &self.outcome)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use camlink_frame::command::GET_DEVICE_INFO;

    use super::*;

    fn context(handler: Option<ResponseHandler>) -> RequestContext {
        RequestContext::new(GET_DEVICE_INFO, &[], 100, 0, ProtocolVersion::V1, handler, 0)
            .expect("context should build")
    }

    #[test]
    fn new_copies_params_and_consults_table() {
        let ctx = RequestContext::new(
            GET_DEVICE_INFO,
            &[0xAA, 0xBB],
            250,
            2,
            ProtocolVersion::V1,
            None,
            1_000,
        )
        .unwrap();

        assert_eq!(ctx.command(), GET_DEVICE_INFO);
        assert_eq!(&ctx.params[..ctx.params_len], &[0xAA, 0xBB]);
        assert_eq!(ctx.expected_len(), 5);
        assert_eq!(ctx.deadline(), 1_250);
        assert_eq!(ctx.retries_left(), 2);
        assert_eq!(ctx.outcome(), Outcome::Pending);
        assert!(ctx.received().is_empty());
    }

    #[test]
    fn new_rejects_oversized_params() {
        let params = [0u8; MAX_PARAM_LEN + 1];
        let err = RequestContext::new(0x01, &params, 100, 0, ProtocolVersion::V1, None, 0)
            .unwrap_err();
        assert!(matches!(err, FrameError::ParamsTooLong { .. }));
    }

    #[test]
    fn complete_fires_handler_once() {
        let fired = Rc::new(Cell::new(0u32));
        let seen = Rc::clone(&fired);
        let mut ctx = context(Some(Box::new(move |completion| {
            seen.set(seen.get() + 1);
            assert_eq!(completion.outcome, Outcome::TimedOut);
            assert_eq!(completion.command, GET_DEVICE_INFO);
        })));

        ctx.complete(Outcome::TimedOut);
        assert_eq!(fired.get(), 1);
        assert_eq!(ctx.outcome(), Outcome::TimedOut);

        // A second completion must not fire the handler again.
        ctx.complete(Outcome::TimedOut);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn complete_without_handler_records_outcome() {
        let mut ctx = context(None);
        ctx.complete(Outcome::Success);
        assert_eq!(ctx.outcome(), Outcome::Success);
    }
}
