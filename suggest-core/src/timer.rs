//! Cancellable timers and the keystroke debounce built on them.
//!
//! Time is passed in explicitly (`now: Instant`) so the owner decides when a
//! tick happens; nothing here sleeps or spawns.

use std::time::{Duration, Instant};

/// Identifies one scheduled timer. Cancelling a handle that already fired or
/// was cancelled is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

#[derive(Debug)]
struct Scheduled<T> {
    handle: TimerHandle,
    due_at: Instant,
    payload: T,
}

#[derive(Debug)]
pub struct TimerQueue<T> {
    next_id: u64,
    pending: Vec<Scheduled<T>>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            pending: Vec::new(),
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, delay: Duration, now: Instant, payload: T) -> TimerHandle {
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        self.pending.push(Scheduled {
            handle,
            due_at: now + delay,
            payload,
        });
        handle
    }

    /// Returns true if the timer was still pending.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|task| task.handle != handle);
        self.pending.len() != before
    }

    /// Cancel whatever handle `slot` owns and leave it empty.
    pub fn cancel_slot(&mut self, slot: &mut Option<TimerHandle>) {
        if let Some(handle) = slot.take() {
            self.cancel(handle);
        }
    }

    /// Cancel every timer whose payload matches.
    pub fn cancel_where(&mut self, mut pred: impl FnMut(&T) -> bool) {
        self.pending.retain(|task| !pred(&task.payload));
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|task| task.handle == handle)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.iter().map(|task| task.due_at).min()
    }

    /// How long the owner may block before the next timer is due.
    pub fn poll_timeout(&self, now: Instant, default_timeout: Duration) -> Duration {
        self.next_deadline()
            .map_or(default_timeout, |due| {
                due.saturating_duration_since(now).min(default_timeout)
            })
    }

    /// Remove and return every timer due at `now`, earliest first. Timers due
    /// at the same instant fire in scheduling order.
    pub fn drain_due(&mut self, now: Instant) -> Vec<(TimerHandle, T)> {
        let mut due = Vec::new();
        let mut idx = 0usize;
        while idx < self.pending.len() {
            if self.pending[idx].due_at <= now {
                due.push(self.pending.swap_remove(idx));
            } else {
                idx += 1;
            }
        }
        due.sort_by_key(|task| (task.due_at, task.handle));
        due.into_iter()
            .map(|task| (task.handle, task.payload))
            .collect()
    }
}

/// Debounce delay for an input of `input_len` graphemes, counted after
/// trimming surrounding whitespace (the same length `min_len` is checked
/// against).
///
/// `t = 1 / (6 * (l - 0.7)) + 0.3` seconds for `l > 0`, `0.3` for an empty
/// input, then halved. Longer (more specific) queries settle faster.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn debounce_delay(input_len: usize) -> Duration {
    let seconds = if input_len > 0 {
        1.0 / (6.0 * (input_len as f64 - 0.7)) + 0.3
    } else {
        0.3
    };
    Duration::from_nanos((seconds * 1e9 / 2.0).round() as u64)
}

/// A single pending debounced action. Scheduling again replaces it.
#[derive(Debug, Default)]
pub struct Debouncer {
    pending: Option<TimerHandle>,
}

impl Debouncer {
    pub fn schedule<T>(
        &mut self,
        timers: &mut TimerQueue<T>,
        input_len: usize,
        now: Instant,
        payload: T,
    ) -> TimerHandle {
        timers.cancel_slot(&mut self.pending);
        let handle = timers.schedule(debounce_delay(input_len), now, payload);
        self.pending = Some(handle);
        handle
    }

    pub fn cancel<T>(&mut self, timers: &mut TimerQueue<T>) {
        timers.cancel_slot(&mut self.pending);
    }

    /// Called when `handle` fired. Returns false for a superseded timer.
    pub fn settle(&mut self, handle: TimerHandle) -> bool {
        if self.pending == Some(handle) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
