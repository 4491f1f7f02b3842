//! Trailing-edge debounce wrapper.

use std::fmt;
use std::rc::Rc;
use std::time::Duration;
use web_time::Instant;

use super::timer::{Timer, TimerQueue};

/// A function whose invocations are coalesced into one trailing call.
///
/// Every [`call`](Debounced::call) cancels the timer left by the previous
/// call and schedules a new one, so a burst of calls closer together than
/// `wait` runs the function once, with the arguments of the last call.
pub struct Debounced<C, A> {
    wait: Duration,
    timer: Option<Timer>,
    func: Rc<dyn Fn(&mut C, A)>,
}

impl<C: 'static, A: 'static> Debounced<C, A> {
    /// Wrap `func` so it only runs after `wait` without further calls.
    pub fn new<F>(wait: Duration, func: F) -> Self
    where
        F: Fn(&mut C, A) + 'static,
    {
        Self {
            wait,
            timer: None,
            func: Rc::new(func),
        }
    }

    /// Trigger the wrapped function with `args`, restarting the wait.
    pub fn call(&mut self, queue: &mut TimerQueue<C>, now: Instant, args: A) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }

        let func = Rc::clone(&self.func);
        self.timer = Some(queue.schedule(now, self.wait, move |ctx| func(ctx, args)));
    }

    /// Drop the pending call, if any.
    pub fn cancel(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
    }

    /// Whether a trailing call is still waiting.
    pub fn is_pending(&self) -> bool {
        self.timer.as_ref().is_some_and(Timer::is_pending)
    }
}

impl<C, A> fmt::Debug for Debounced<C, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debounced")
            .field("wait", &self.wait)
            .field("timer", &self.timer)
            .finish()
    }
}

/// Decorator form of [`Debounced::new`]: `debounce(wait)(func)`.
pub fn debounce<C, A, F>(wait: Duration) -> impl FnOnce(F) -> Debounced<C, A>
where
    C: 'static,
    A: 'static,
    F: Fn(&mut C, A) + 'static,
{
    move |func| Debounced::new(wait, func)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn recorder(wait: Duration) -> Debounced<Vec<u32>, u32> {
        debounce(wait)(|seen: &mut Vec<u32>, value: u32| seen.push(value))
    }

    #[test]
    fn test_burst_runs_once_with_last_args() {
        let t0 = Instant::now();
        let mut queue = TimerQueue::new();
        let mut seen = Vec::new();
        let mut record = recorder(ms(300));

        record.call(&mut queue, t0, 1);
        record.call(&mut queue, t0 + ms(100), 2);
        record.call(&mut queue, t0 + ms(200), 3);

        assert_eq!(queue.run_due(t0 + ms(499), &mut seen), 0);
        assert!(record.is_pending());
        assert_eq!(queue.run_due(t0 + ms(500), &mut seen), 1);
        assert_eq!(seen, vec![3]);
        assert!(!record.is_pending());

        assert_eq!(queue.run_due(t0 + ms(5000), &mut seen), 0);
        assert_eq!(seen, vec![3]);
    }

    #[test]
    fn test_spaced_calls_each_run() {
        let t0 = Instant::now();
        let mut queue = TimerQueue::new();
        let mut seen = Vec::new();
        let mut record = recorder(ms(300));

        for (i, value) in [10, 20, 30].into_iter().enumerate() {
            let at = t0 + ms(300 * i as u64);
            queue.run_due(at, &mut seen);
            record.call(&mut queue, at, value);
        }
        queue.run_due(t0 + ms(900), &mut seen);

        assert_eq!(seen, vec![10, 20, 30]);
    }

    #[test]
    fn test_at_most_one_live_timer() {
        let t0 = Instant::now();
        let mut queue = TimerQueue::new();
        let mut record = recorder(ms(50));

        for i in 0..10 {
            record.call(&mut queue, t0 + ms(i), i as u32);
        }
        assert_eq!(queue.pending(), 1);
        assert_eq!(queue.next_deadline(), Some(t0 + ms(59)));
    }

    #[test]
    fn test_cancel_drops_pending_call() {
        let t0 = Instant::now();
        let mut queue = TimerQueue::new();
        let mut seen = Vec::new();
        let mut record = recorder(ms(300));

        record.call(&mut queue, t0, 1);
        record.cancel();
        record.cancel();
        queue.run_due(t0 + ms(1000), &mut seen);
        assert!(seen.is_empty());
    }

    #[test]
    fn test_independent_wrappers_share_queue() {
        let t0 = Instant::now();
        let mut queue = TimerQueue::new();
        let mut seen = Vec::new();
        let mut fast = recorder(ms(100));
        let mut slow = recorder(ms(300));

        slow.call(&mut queue, t0, 1);
        fast.call(&mut queue, t0, 2);
        queue.run_due(t0 + ms(300), &mut seen);
        assert_eq!(seen, vec![2, 1]);
    }
}
