//! Cancellable delayed callbacks.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;
use web_time::Instant;

/// Lifecycle of a scheduled callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    /// Waiting for its deadline
    Pending,
    /// Callback has run
    Fired,
    /// Cancelled before the deadline
    Cancelled,
}

/// Handle to a callback scheduled on a [`TimerQueue`].
///
/// The handle shares a state flag with the queue entry. The queue checks the
/// flag right before invoking the callback, so a cancelled timer never fires.
#[derive(Debug, Clone)]
pub struct Timer {
    id: u64,
    state: Rc<Cell<TimerState>>,
}

impl Timer {
    /// Prevent the callback from firing.
    ///
    /// No-op if the timer already fired or was already cancelled.
    pub fn cancel(&self) {
        if self.state.get() == TimerState::Pending {
            self.state.set(TimerState::Cancelled);
            log::trace!("Timer {}: cancelled", self.id);
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TimerState {
        self.state.get()
    }

    /// Whether the callback is still waiting to run.
    pub fn is_pending(&self) -> bool {
        self.state.get() == TimerState::Pending
    }
}

struct Entry<C> {
    id: u64,
    deadline: Instant,
    state: Rc<Cell<TimerState>>,
    callback: Box<dyn FnOnce(&mut C)>,
}

/// Single-threaded queue of delayed callbacks over a context `C`.
pub struct TimerQueue<C> {
    next_id: u64,
    entries: Vec<Entry<C>>,
}

impl<C> TimerQueue<C> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    /// Schedule `callback` to run once `wait` has elapsed after `now`.
    pub fn schedule<F>(&mut self, now: Instant, wait: Duration, callback: F) -> Timer
    where
        F: FnOnce(&mut C) + 'static,
    {
        let id = self.next_id;
        self.next_id += 1;

        let deadline = now + wait;
        let state = Rc::new(Cell::new(TimerState::Pending));
        self.entries.push(Entry {
            id,
            deadline,
            state: Rc::clone(&state),
            callback: Box::new(callback),
        });
        log::trace!("Timer {}: scheduled in {:?}", id, wait);

        Timer { id, state }
    }

    /// Run every pending callback whose deadline is at or before `now`,
    /// in deadline order. Returns how many fired.
    pub fn run_due(&mut self, now: Instant, ctx: &mut C) -> usize {
        let (mut due, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entries)
            .into_iter()
            .filter(|entry| entry.state.get() == TimerState::Pending)
            .partition(|entry| entry.deadline <= now);
        self.entries = rest;

        due.sort_by_key(|entry| (entry.deadline, entry.id));

        let mut fired = 0;
        for entry in due {
            if entry.state.get() != TimerState::Pending {
                continue;
            }
            entry.state.set(TimerState::Fired);
            log::trace!("Timer {}: fired", entry.id);
            (entry.callback)(ctx);
            fired += 1;
        }
        fired
    }

    /// Run every pending callback now, regardless of its deadline.
    ///
    /// Used when a caller needs the outcome of pending work before going on.
    pub fn flush(&mut self, ctx: &mut C) -> usize {
        let Some(last) = self
            .entries
            .iter()
            .filter(|entry| entry.state.get() == TimerState::Pending)
            .map(|entry| entry.deadline)
            .max()
        else {
            return 0;
        };
        self.run_due(last, ctx)
    }

    /// Earliest deadline among pending callbacks.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries
            .iter()
            .filter(|entry| entry.state.get() == TimerState::Pending)
            .map(|entry| entry.deadline)
            .min()
    }

    /// Time from `now` until the earliest pending deadline (zero if overdue).
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        self.next_deadline()
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Number of callbacks still waiting.
    pub fn pending(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.state.get() == TimerState::Pending)
            .count()
    }

    /// Whether no callback is waiting.
    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }
}

impl<C> Default for TimerQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for TimerQueue<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerQueue")
            .field("pending", &self.pending())
            .field("next_deadline", &self.next_deadline())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_fires_after_wait() {
        let t0 = Instant::now();
        let mut queue: TimerQueue<Vec<&'static str>> = TimerQueue::new();
        let mut events = Vec::new();

        let timer = queue.schedule(t0, ms(300), |events| events.push("fired"));
        assert!(timer.is_pending());
        assert_eq!(queue.run_due(t0 + ms(299), &mut events), 0);
        assert!(events.is_empty());

        assert_eq!(queue.run_due(t0 + ms(300), &mut events), 1);
        assert_eq!(events, vec!["fired"]);
        assert_eq!(timer.state(), TimerState::Fired);
        assert!(queue.is_idle());
    }

    #[test]
    fn test_cancel_prevents_fire() {
        let t0 = Instant::now();
        let mut queue: TimerQueue<u32> = TimerQueue::new();
        let mut count = 0;

        let timer = queue.schedule(t0, ms(100), |count| *count += 1);
        timer.cancel();
        assert_eq!(timer.state(), TimerState::Cancelled);
        assert_eq!(queue.run_due(t0 + ms(500), &mut count), 0);
        assert_eq!(count, 0);
        assert_eq!(queue.next_deadline(), None);
    }

    #[test]
    fn test_cancel_after_fire_and_twice_is_noop() {
        let t0 = Instant::now();
        let mut queue: TimerQueue<u32> = TimerQueue::new();
        let mut count = 0;

        let timer = queue.schedule(t0, ms(10), |count| *count += 1);
        queue.run_due(t0 + ms(10), &mut count);
        timer.cancel();
        timer.cancel();
        assert_eq!(timer.state(), TimerState::Fired);
        assert_eq!(queue.run_due(t0 + ms(1000), &mut count), 0);
        assert_eq!(count, 1);

        let other = queue.schedule(t0, ms(10), |count| *count += 1);
        other.cancel();
        other.cancel();
        assert_eq!(other.state(), TimerState::Cancelled);
    }

    #[test]
    fn test_fires_in_deadline_order() {
        let t0 = Instant::now();
        let mut queue: TimerQueue<Vec<u32>> = TimerQueue::new();
        let mut order = Vec::new();

        queue.schedule(t0, ms(30), |order| order.push(3));
        queue.schedule(t0, ms(10), |order| order.push(1));
        queue.schedule(t0, ms(20), |order| order.push(2));
        queue.schedule(t0, ms(20), |order| order.push(22));

        assert_eq!(queue.next_deadline(), Some(t0 + ms(10)));
        assert_eq!(queue.time_until_next(t0 + ms(4)), Some(ms(6)));
        assert_eq!(queue.run_due(t0 + ms(100), &mut order), 4);
        assert_eq!(order, vec![1, 2, 22, 3]);
    }

    #[test]
    fn test_flush_runs_pending_early() {
        let t0 = Instant::now();
        let mut queue: TimerQueue<Vec<u32>> = TimerQueue::new();
        let mut order = Vec::new();

        queue.schedule(t0, ms(500), |order| order.push(2));
        queue.schedule(t0, ms(300), |order| order.push(1));
        queue.schedule(t0, ms(100), |order| order.push(9)).cancel();

        assert_eq!(queue.flush(&mut order), 2);
        assert_eq!(order, vec![1, 2]);
        assert!(queue.is_idle());
        assert_eq!(queue.flush(&mut order), 0);
    }

    #[test]
    fn test_overdue_reports_zero_wait() {
        let t0 = Instant::now();
        let mut queue: TimerQueue<()> = TimerQueue::new();
        queue.schedule(t0, ms(10), |_| {});
        assert_eq!(queue.time_until_next(t0 + ms(50)), Some(Duration::ZERO));
        assert_eq!(queue.pending(), 1);
    }
}
