//! Delayed callbacks and trailing-edge debouncing.
//!
//! Nothing here owns a thread or a clock. A [`TimerQueue`] is polled by the
//! host event loop with the current [`web_time::Instant`]; callbacks run
//! inside [`TimerQueue::run_due`] on the caller's thread and receive a
//! mutable context value, so they can update state without shared ownership.
//!
//! ```rust,ignore
//! use tile_review::debounce::{debounce, TimerQueue};
//!
//! let mut queue: TimerQueue<Vec<u32>> = TimerQueue::new();
//! let mut record = debounce(Duration::from_millis(300))(|seen: &mut Vec<u32>, v: u32| seen.push(v));
//!
//! record.call(&mut queue, t0, 1);
//! record.call(&mut queue, t0 + Duration::from_millis(100), 2);
//! queue.run_due(t0 + Duration::from_millis(400), &mut seen); // seen == [2]
//! ```

mod debounced;
mod timer;

pub use debounced::{Debounced, debounce};
pub use timer::{Timer, TimerQueue, TimerState};
