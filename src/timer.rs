//! Timer - discrete-event callback scheduler.
//!
//! A priority-ordered one-shot/periodic callback queue driven by an injected
//! monotonic clock: the host calls [`Timer::tick`] with its notion of "now"
//! (seconds) once per animation frame, and due callbacks fire synchronously
//! inside that call.
//!
//! # API
//!
//! - `call_after(delay, cb)` - one-shot after `delay` seconds
//! - `call_at(abs_time, cb)` - one-shot at an absolute time
//! - `call_every(period, cb)` - periodic, re-armed after each firing
//! - `tick(now)` - fire everything due at `now`
//!
//! Scheduling with a non-positive delay is not an error; it means "due on
//! the very next tick". Periodic entries are re-armed at `now + period`
//! relative to the tick that fired them, so drift is tolerated rather than
//! corrected. Re-arming happens before any callback runs, and all callbacks
//! due in a tick are collected before the first one is invoked: a callback
//! that schedules more work can never fire that work in the same tick.

use std::collections::VecDeque;
use std::rc::Rc;

use tracing::trace;

/// Callback invoked by the timer, with the timer itself for rescheduling.
pub type TimerCallback = Rc<dyn Fn(&mut Timer)>;

// =============================================================================
// Pending entries
// =============================================================================

/// One pending key: all callbacks registered for the same
/// `(fire_at, period)` pair, fired FIFO.
struct Entry {
    fire_at: f64,
    period: f64,
    callbacks: VecDeque<TimerCallback>,
}

// =============================================================================
// Timer
// =============================================================================

/// Discrete-event scheduler. Single-threaded, driven by `tick`.
#[derive(Default)]
pub struct Timer {
    /// Pending entries, always sorted ascending by `fire_at`.
    pending: Vec<Entry>,
    /// The clock value of the most recent tick.
    elapsed: f64,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The scheduler's notion of "now": the last `tick` value seen.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Number of pending keys (not callbacks).
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Schedule `callback` once, `delay` seconds from now.
    ///
    /// A non-positive delay means "due on the very next tick".
    pub fn call_after(&mut self, delay: f64, callback: impl Fn(&mut Timer) + 'static) {
        self.insert(self.elapsed + delay.max(0.0), 0.0, Rc::new(callback));
    }

    /// Schedule `callback` once at an absolute clock time.
    pub fn call_at(&mut self, abs_time: f64, callback: impl Fn(&mut Timer) + 'static) {
        let delay = abs_time - self.elapsed;
        self.call_after(delay, callback);
    }

    /// Schedule `callback` every `period` seconds, starting one period from
    /// now. A non-positive period degenerates to a one-shot on the next tick.
    pub fn call_every(&mut self, period: f64, callback: impl Fn(&mut Timer) + 'static) {
        self.insert(
            self.elapsed + period.max(0.0),
            period.max(0.0),
            Rc::new(callback),
        );
    }

    /// Insert a callback under its `(fire_at, period)` key, keeping the
    /// pending list sorted ascending by fire time.
    fn insert(&mut self, fire_at: f64, period: f64, callback: TimerCallback) {
        if let Some(entry) = self
            .pending
            .iter_mut()
            .find(|e| e.fire_at == fire_at && e.period == period)
        {
            entry.callbacks.push_back(callback);
            return;
        }
        let pos = self.pending.partition_point(|e| e.fire_at <= fire_at);
        self.pending.insert(
            pos,
            Entry {
                fire_at,
                period,
                callbacks: VecDeque::from([callback]),
            },
        );
    }

    /// Advance the clock to `now` and fire everything due.
    ///
    /// Returns the number of callbacks invoked.
    pub fn tick(&mut self, now: f64) -> usize {
        self.elapsed = now;

        // Collect every due callback first. Periodic callbacks are re-armed
        // here, before anything is invoked, so a callback's own scheduling
        // cannot starve the re-arm.
        let mut due: Vec<TimerCallback> = Vec::new();
        while let Some(first) = self.pending.first_mut() {
            if first.fire_at > now {
                break;
            }
            let period = first.period;
            let callback = first.callbacks.pop_front();
            if first.callbacks.is_empty() {
                self.pending.remove(0);
            }
            let Some(callback) = callback else { continue };
            if period > 0.0 {
                self.insert(now + period, period, callback.clone());
            }
            due.push(callback);
        }

        if !due.is_empty() {
            trace!(now, fired = due.len(), "timer tick");
        }

        // Invoke in fire order. Reentrant scheduling lands in `pending` and
        // waits for a later tick.
        let fired = due.len();
        for callback in due {
            callback(self);
        }
        fired
    }

    /// Drop every pending entry and rewind the clock.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.elapsed = 0.0;
    }
}

// =============================================================================
// TESTS
// =============================================================================
