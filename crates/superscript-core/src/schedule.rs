//! Deterministic scheduling primitives.
//!
//! The analyzer runs on the host's UI thread and only ever defers work: a rebuild is coalesced to
//! human typing cadence and a few follow-ups (scroll capture, caret toggling) run once layout has
//! settled. Both are modelled as plain state machines driven by the host's clock, so hosts decide
//! how to wake up (timer, frame callback, event loop tick) and tests control time exactly.

use std::time::{Duration, Instant};

/// Which edge of a burst of calls fires a [`Debouncer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Fire on the first call of a burst; ignore the rest until the window is quiet.
    Leading,
    /// Fire once the window has elapsed after the last call of a burst.
    Trailing,
    /// Fire on the first call, and again after the burst if more calls arrived.
    Both,
}

impl Edge {
    fn leading(self) -> bool {
        matches!(self, Edge::Leading | Edge::Both)
    }

    fn trailing(self) -> bool {
        matches!(self, Edge::Trailing | Edge::Both)
    }
}

/// Coalesces calls that arrive within `window` of each other.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    edge: Edge,
    last_call: Option<Instant>,
    pending: bool,
}

impl Debouncer {
    /// Create a debouncer.
    pub fn new(window: Duration, edge: Edge) -> Self {
        Self {
            window,
            edge,
            last_call: None,
            pending: false,
        }
    }

    /// The coalescing window.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Register a call at `now`. Returns `true` if the caller should run the work immediately.
    pub fn call(&mut self, now: Instant) -> bool {
        let quiet = self
            .last_call
            .is_none_or(|last| now.saturating_duration_since(last) >= self.window);
        self.last_call = Some(now);

        if quiet && self.edge.leading() {
            self.pending = false;
            return true;
        }
        if self.edge.trailing() {
            self.pending = true;
        }
        false
    }

    /// Check the clock. Returns `true` if a trailing invocation is due now.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline() {
            Some(deadline) if now >= deadline => {
                self.pending = false;
                true
            }
            _ => false,
        }
    }

    /// When the pending trailing invocation becomes due, if any.
    ///
    /// A window too long to add to the clock never comes due.
    pub fn deadline(&self) -> Option<Instant> {
        if !self.pending {
            return None;
        }
        self.last_call.and_then(|last| last.checked_add(self.window))
    }

    /// Returns `true` if a trailing invocation is waiting.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Drop any pending trailing invocation.
    pub fn cancel(&mut self) {
        self.pending = false;
    }
}

#[derive(Debug, Clone)]
struct Deferred<T> {
    // `None` when the delay overflows the clock; such a task never runs.
    due: Option<Instant>,
    seq: u64,
    task: T,
}

/// A queue of tasks that become runnable after a delay.
#[derive(Debug, Clone)]
pub struct DeferredQueue<T> {
    tasks: Vec<Deferred<T>>,
    next_seq: u64,
}

impl<T> Default for DeferredQueue<T> {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            next_seq: 0,
        }
    }
}

impl<T> DeferredQueue<T> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` to become runnable `delay` after `now`.
    pub fn schedule(&mut self, task: T, delay: Duration, now: Instant) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.tasks.push(Deferred {
            due: now.checked_add(delay),
            seq,
            task,
        });
    }

    /// Remove and return every task due at `now`, ordered by due time then scheduling order.
    pub fn drain_due(&mut self, now: Instant) -> Vec<T> {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.tasks.drain(..).partition(|task| task.due.is_some_and(|due| due <= now));
        self.tasks = pending;
        due.sort_by_key(|task| (task.due, task.seq));
        due.into_iter().map(|task| task.task).collect()
    }

    /// The earliest due time, if any task is queued.
    pub fn next_due(&self) -> Option<Instant> {
        self.tasks.iter().filter_map(|task| task.due).min()
    }

    /// Number of queued tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns `true` if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Drop every queued task.
    pub fn clear(&mut self) {
        self.tasks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_leading_debounce_fires_once_per_burst() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(ms(20), Edge::Leading);
        assert!(debouncer.call(start));
        assert!(!debouncer.call(start + ms(5)));
        assert!(!debouncer.call(start + ms(15)));
        assert!(!debouncer.poll(start + ms(100)));
        assert!(debouncer.call(start + ms(100)));
    }

    #[test]
    fn test_trailing_debounce_waits_for_quiet_window() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(ms(20), Edge::Trailing);
        assert!(!debouncer.call(start));
        assert!(!debouncer.call(start + ms(10)));
        assert!(!debouncer.poll(start + ms(25)));
        assert_eq!(debouncer.deadline(), Some(start + ms(30)));
        assert!(debouncer.poll(start + ms(30)));
        assert!(!debouncer.poll(start + ms(40)));
    }

    #[test]
    fn test_both_edges() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(ms(20), Edge::Both);
        assert!(debouncer.call(start));
        assert!(!debouncer.is_pending());
        assert!(!debouncer.call(start + ms(5)));
        assert!(debouncer.is_pending());
        assert!(debouncer.poll(start + ms(25)));
    }

    #[test]
    fn test_deferred_queue_orders_by_due_time() {
        let start = Instant::now();
        let mut queue = DeferredQueue::new();
        queue.schedule("late", ms(50), start);
        queue.schedule("early", ms(0), start);
        queue.schedule("also-early", ms(0), start);

        assert_eq!(queue.drain_due(start), vec!["early", "also-early"]);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.next_due(), Some(start + ms(50)));
        assert!(queue.drain_due(start + ms(49)).is_empty());
        assert_eq!(queue.drain_due(start + ms(50)), vec!["late"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_overlong_delays_never_come_due() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::MAX, Edge::Trailing);
        assert!(!debouncer.call(start));
        assert!(debouncer.is_pending());
        assert_eq!(debouncer.deadline(), None);
        assert!(!debouncer.poll(start + ms(1_000)));

        let mut queue = DeferredQueue::new();
        queue.schedule("never", Duration::MAX, start);
        queue.schedule("soon", ms(5), start);
        assert_eq!(queue.next_due(), Some(start + ms(5)));
        assert_eq!(queue.drain_due(start + ms(5)), vec!["soon"]);
        assert_eq!(queue.next_due(), None);
        assert_eq!(queue.len(), 1);
    }
}
