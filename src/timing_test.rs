#![allow(clippy::float_cmp)]

use super::*;

// =============================================================
// Debounce
// =============================================================

#[test]
fn debounce_waits_for_quiet_period() {
    let mut debounce = Debounce::new(250.0);
    debounce.push(1, 0.0);
    assert_eq!(debounce.take_ready(249.0), None);
    assert_eq!(debounce.take_ready(250.0), Some(1));
    assert_eq!(debounce.take_ready(500.0), None);
}

#[test]
fn debounce_restarts_and_keeps_last_value() {
    let mut debounce = Debounce::new(250.0);
    debounce.push("first", 0.0);
    debounce.push("second", 200.0);
    assert_eq!(debounce.deadline(), Some(450.0));
    assert_eq!(debounce.take_ready(300.0), None);
    assert_eq!(debounce.take_ready(450.0), Some("second"));
}

#[test]
fn debounce_cancel_drops_pending() {
    let mut debounce = Debounce::new(10.0);
    debounce.push((), 0.0);
    debounce.cancel();
    assert_eq!(debounce.deadline(), None);
    assert_eq!(debounce.take_ready(100.0), None);
}

// =============================================================
// Throttle
// =============================================================

#[test]
fn throttle_drops_calls_inside_window() {
    let mut throttle = Throttle::new(16.0);
    assert!(throttle.try_acquire(0.0));
    assert!(!throttle.try_acquire(5.0));
    assert!(!throttle.try_acquire(15.9));
    assert!(throttle.try_acquire(16.0));
    assert!(!throttle.try_acquire(20.0));
}

#[test]
fn throttle_reset_reopens_immediately() {
    let mut throttle = Throttle::new(16.0);
    assert!(throttle.try_acquire(0.0));
    throttle.reset();
    assert!(throttle.try_acquire(1.0));
}

// =============================================================
// TimerQueue
// =============================================================

#[test]
fn arming_twice_replaces_deadline() {
    let mut timers = TimerQueue::new();
    timers.arm(TimerKey::HoverClose(0), 0.0, 150.0);
    timers.arm(TimerKey::HoverClose(0), 100.0, 150.0);
    assert_eq!(timers.len(), 1);
    assert!(timers.take_due(150.0).is_empty());
    assert_eq!(timers.take_due(250.0), vec![TimerKey::HoverClose(0)]);
    assert!(timers.is_empty());
}

#[test]
fn cancel_prevents_firing() {
    let mut timers = TimerQueue::new();
    timers.arm(TimerKey::AnnounceClear, 0.0, 10.0);
    assert!(timers.cancel(TimerKey::AnnounceClear));
    assert!(!timers.cancel(TimerKey::AnnounceClear));
    assert!(timers.take_due(1000.0).is_empty());
}

#[test]
fn take_due_orders_by_deadline() {
    let mut timers = TimerQueue::new();
    timers.arm(TimerKey::AnnounceClear, 0.0, 300.0);
    timers.arm(TimerKey::HoverClose(1), 0.0, 150.0);
    timers.arm(TimerKey::EntryClose(0), 0.0, 100.0);
    timers.arm(TimerKey::SearchInvalid(0), 0.0, 3000.0);
    assert_eq!(timers.next_deadline(), Some(100.0));
    assert_eq!(
        timers.take_due(300.0),
        vec![TimerKey::EntryClose(0), TimerKey::HoverClose(1), TimerKey::AnnounceClear]
    );
    assert!(timers.is_armed(TimerKey::SearchInvalid(0)));
    assert_eq!(timers.deadline(TimerKey::SearchInvalid(0)), Some(3000.0));
}

#[test]
fn clear_empties_queue() {
    let mut timers = TimerQueue::new();
    timers.arm(TimerKey::HoverClose(0), 0.0, 1.0);
    timers.clear();
    assert_eq!(timers.next_deadline(), None);
}

#[test]
fn earliest_skips_none() {
    assert_eq!(earliest([None, Some(5.0), Some(3.0)]), Some(3.0));
    assert_eq!(earliest([None, None]), None);
}
