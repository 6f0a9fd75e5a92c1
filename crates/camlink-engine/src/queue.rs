use crate::context::RequestContext;

/// Default number of in-flight request slots.
pub const DEFAULT_PENDING_CAPACITY: usize = 4;

/// Fixed-capacity FIFO ring of in-flight request contexts.
///
/// Capacity is fixed at construction and never grows; a push onto a full
/// ring fails without mutating anything. The ring owns its slot storage —
/// a popped context's slot is reused by a later push, there is no separate
/// deallocation step. Only the context at the head is ever received into
/// or retried.
pub struct PendingQueue {
    slots: Box<[Option<RequestContext>]>,
    head: usize,
    tail: usize,
    count: usize,
}

impl PendingQueue {
    /// Ring with [`DEFAULT_PENDING_CAPACITY`] slots.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_PENDING_CAPACITY)
    }

    /// Ring with an explicit capacity (minimum 1 slot).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self {
            slots: slots.into_boxed_slice(),
            head: 0,
            tail: 0,
            count: 0,
        }
    }

    /// Append a context. Returns `false`, leaving the ring untouched, when
    /// every slot is occupied — the caller must treat that as "request
    /// dropped", not queued.
    pub fn push(&mut self, ctx: RequestContext) -> bool {
        if self.count == self.slots.len() {
            return false;
        }
        self.slots[self.tail] = Some(ctx);
        self.tail += 1;
        if self.tail == self.slots.len() {
            self.tail = 0;
        }
        self.count += 1;
        true
    }

    /// The oldest pending context, if any.
    pub fn front_mut(&mut self) -> Option<&mut RequestContext> {
        if self.count == 0 {
            return None;
        }
        self.slots[self.head].as_mut()
    }

    /// Remove and return the oldest pending context.
    pub fn pop_front(&mut self) -> Option<RequestContext> {
        if self.count == 0 {
            return None;
        }
        let ctx = self.slots[self.head].take();
        self.head += 1;
        if self.head == self.slots.len() {
            self.head = 0;
        }
        self.count -= 1;
        ctx
    }

    /// Number of contexts currently queued.
    pub fn len(&self) -> usize {
        self.count
    }

    /// True when no contexts are queued.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Total slot count.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

impl Default for PendingQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use camlink_frame::ProtocolVersion;

    use super::*;

    fn context(command: u8) -> RequestContext {
        RequestContext::new(command, &[], 100, 0, ProtocolVersion::V1, None, 0)
            .expect("context should build")
    }

    #[test]
    fn pop_order_matches_push_order() {
        let mut queue = PendingQueue::with_capacity(8);
        for command in [0x10, 0x20, 0x30, 0x40] {
            assert!(queue.push(context(command)));
        }

        let popped: Vec<u8> = std::iter::from_fn(|| queue.pop_front())
            .map(|ctx| ctx.command())
            .collect();
        assert_eq!(popped, vec![0x10, 0x20, 0x30, 0x40]);
        assert!(queue.is_empty());
    }

    #[test]
    fn push_onto_full_ring_fails_and_preserves_contents() {
        let mut queue = PendingQueue::with_capacity(2);
        assert!(queue.push(context(0x01)));
        assert!(queue.push(context(0x02)));

        assert!(!queue.push(context(0x03)));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop_front().map(|c| c.command()), Some(0x01));
        assert_eq!(queue.pop_front().map(|c| c.command()), Some(0x02));
        assert_eq!(queue.pop_front().map(|c| c.command()), None);
    }

    #[test]
    fn indices_wrap_around_capacity() {
        let mut queue = PendingQueue::with_capacity(3);

        // Interleave pushes and pops so head/tail lap the slot array.
        for round in 0u8..10 {
            assert!(queue.push(context(round)));
            assert!(queue.push(context(round.wrapping_add(100))));
            assert_eq!(queue.pop_front().map(|c| c.command()), Some(round));
            assert_eq!(
                queue.pop_front().map(|c| c.command()),
                Some(round.wrapping_add(100))
            );
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn front_mut_exposes_head_without_removing() {
        let mut queue = PendingQueue::new();
        assert!(queue.front_mut().is_none());

        queue.push(context(0x42));
        assert_eq!(queue.front_mut().map(|c| c.command()), Some(0x42));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn empty_after_drain_regardless_of_index_positions() {
        let mut queue = PendingQueue::with_capacity(2);
        queue.push(context(0x01));
        queue.pop_front();
        queue.push(context(0x02));
        queue.pop_front();

        assert!(queue.is_empty());
        assert!(queue.front_mut().is_none());
        assert!(queue.pop_front().is_none());
    }

    #[test]
    fn zero_capacity_is_clamped_to_one() {
        let mut queue = PendingQueue::with_capacity(0);
        assert_eq!(queue.capacity(), 1);
        assert!(queue.push(context(0x01)));
        assert!(!queue.push(context(0x02)));
    }
}
