//! Injected-clock timers: debounce, throttle, and a keyed deadline queue.
//!
//! Nothing here touches a real clock. Callers pass `now_ms` in, which keeps
//! the controller deterministic under test; the browser host feeds it
//! `Date.now()` and wakes the controller at [`TimerQueue::next_deadline`].

#[cfg(test)]
#[path = "timing_test.rs"]
mod timing_test;

use std::collections::BTreeMap;

/// Trailing-edge debounce: only the last value pushed survives, and it becomes
/// ready once `wait_ms` passes without another push.
#[derive(Clone, Debug)]
pub struct Debounce<T> {
    wait_ms: f64,
    pending: Option<(T, f64)>,
}

impl<T> Debounce<T> {
    #[must_use]
    pub fn new(wait_ms: f64) -> Self {
        Self { wait_ms, pending: None }
    }

    /// Replace any pending value and restart the wait.
    pub fn push(&mut self, value: T, now_ms: f64) {
        self.pending = Some((value, now_ms + self.wait_ms));
    }

    /// When the pending value becomes ready, if there is one.
    #[must_use]
    pub fn deadline(&self) -> Option<f64> {
        self.pending.as_ref().map(|(_, at)| *at)
    }

    /// Take the pending value if its wait has elapsed.
    pub fn take_ready(&mut self, now_ms: f64) -> Option<T> {
        if self.pending.as_ref().is_some_and(|(_, at)| *at <= now_ms) {
            return self.pending.take().map(|(value, _)| value);
        }
        None
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

/// Leading-edge throttle: the first call passes, calls within the next
/// `limit_ms` are dropped.
#[derive(Clone, Copy, Debug)]
pub struct Throttle {
    limit_ms: f64,
    blocked_until: Option<f64>,
}

impl Throttle {
    #[must_use]
    pub fn new(limit_ms: f64) -> Self {
        Self { limit_ms, blocked_until: None }
    }

    /// Whether a call at `now_ms` may run; starts a new window if so.
    pub fn try_acquire(&mut self, now_ms: f64) -> bool {
        if self.blocked_until.is_some_and(|until| now_ms < until) {
            return false;
        }
        self.blocked_until = Some(now_ms + self.limit_ms);
        true
    }

    pub fn reset(&mut self) {
        self.blocked_until = None;
    }
}

/// Identity of a one-shot timer owned by the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimerKey {
    /// Hover grace period for a dropdown.
    HoverClose(usize),
    /// Delayed close after clicking a navigable entry in a dropdown.
    EntryClose(usize),
    /// Clear the live region after an announcement.
    AnnounceClear,
    /// Drop the invalid marker from a search form's input.
    SearchInvalid(usize),
}

/// Keyed one-shot deadlines. Arming an armed key replaces its deadline, so a
/// stale deadline can never fire.
#[derive(Clone, Debug, Default)]
pub struct TimerQueue {
    deadlines: BTreeMap<TimerKey, f64>,
}

impl TimerQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, key: TimerKey, now_ms: f64, delay_ms: f64) {
        self.deadlines.insert(key, now_ms + delay_ms);
    }

    /// Returns whether the key was armed.
    pub fn cancel(&mut self, key: TimerKey) -> bool {
        self.deadlines.remove(&key).is_some()
    }

    #[must_use]
    pub fn is_armed(&self, key: TimerKey) -> bool {
        self.deadlines.contains_key(&key)
    }

    #[must_use]
    pub fn deadline(&self, key: TimerKey) -> Option<f64> {
        self.deadlines.get(&key).copied()
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<f64> {
        self.deadlines.values().copied().reduce(f64::min)
    }

    /// Remove and return every key due at `now_ms`, earliest first.
    pub fn take_due(&mut self, now_ms: f64) -> Vec<TimerKey> {
        let mut due: Vec<(f64, TimerKey)> = self
            .deadlines
            .iter()
            .filter(|(_, at)| **at <= now_ms)
            .map(|(key, at)| (*at, *key))
            .collect();
        due.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        for (_, key) in &due {
            self.deadlines.remove(key);
        }
        due.into_iter().map(|(_, key)| key).collect()
    }

    pub fn clear(&mut self) {
        self.deadlines.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }
}

/// Earliest of optional deadlines.
#[must_use]
pub fn earliest(deadlines: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
    deadlines.into_iter().flatten().reduce(f64::min)
}
