//! Time sources, run tokens and deadline bookkeeping shared by the engine.
//!
//! Nothing here owns a thread or a runtime. Components read the current time
//! from a [`Clock`] and keep their pending work in a [`TimerQueue`] or
//! [`OneShot`]; the caller decides when to poll them.

use std::cell::Cell;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of "time since mount"
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall clock anchored at construction
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Manually advanced clock
///
/// Clones share the same time cell, so a test or simulator can keep one handle
/// and move time forward under every component built from the others.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    /// Jump to an absolute time; moving backwards is ignored
    pub fn set(&self, at: Duration) {
        if at > self.now.get() {
            self.now.set(at);
        }
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Identifies one run of a sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunToken(u64);

impl RunToken {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Issues run tokens; only the most recently issued one is current
#[derive(Debug, Default)]
pub struct TokenSource {
    current: u64,
    live: bool,
}

impl TokenSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retire the current token and hand out a fresh one
    pub fn issue(&mut self) -> RunToken {
        self.current += 1;
        self.live = true;
        RunToken(self.current)
    }

    /// Retire the current token without issuing another
    pub fn invalidate(&mut self) {
        self.live = false;
    }

    #[inline]
    pub fn is_current(&self, token: RunToken) -> bool {
        self.live && token.0 == self.current
    }
}

#[derive(Debug)]
struct Entry<T> {
    due: Duration,
    seq: u64,
    token: RunToken,
    payload: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Reversed so the max-heap pops the earliest deadline, then the oldest entry.
impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// A due timer popped from a [`TimerQueue`]
#[derive(Debug, Clone, PartialEq)]
pub struct Fired<T> {
    pub due: Duration,
    pub token: RunToken,
    pub payload: T,
}

/// Deadline-ordered timers tagged with the run that scheduled them
#[derive(Debug)]
pub struct TimerQueue<T> {
    heap: BinaryHeap<Entry<T>>,
    next_seq: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: Duration, token: RunToken, payload: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry {
            due,
            seq,
            token,
            payload,
        });
    }

    /// Earliest pending deadline
    pub fn next_due(&self) -> Option<Duration> {
        self.heap.peek().map(|e| e.due)
    }

    /// Pop the earliest timer if it is due at `now`
    pub fn pop_due(&mut self, now: Duration) -> Option<Fired<T>> {
        if self.next_due()? > now {
            return None;
        }
        self.heap.pop().map(|e| Fired {
            due: e.due,
            token: e.token,
            payload: e.payload,
        })
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

/// A single replaceable deadline
#[derive(Debug, Clone, Copy, Default)]
pub struct OneShot {
    due: Option<Duration>,
}

impl OneShot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm for `now + delay`, replacing any pending deadline
    pub fn arm(&mut self, now: Duration, delay: Duration) {
        self.due = Some(now + delay);
    }

    pub fn disarm(&mut self) {
        self.due = None;
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.due.is_some()
    }

    pub fn due(&self) -> Option<Duration> {
        self.due
    }

    /// Returns true exactly once, when the deadline has passed
    pub fn fire_if_due(&mut self, now: Duration) -> bool {
        match self.due {
            Some(due) if now >= due => {
                self.due = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new();
        let other = clock.clone();
        clock.advance_ms(250);
        assert_eq!(other.now(), ms(250));
        other.set(ms(100));
        assert_eq!(clock.now(), ms(250));
    }

    #[test]
    fn test_token_source_only_latest_is_current() {
        let mut tokens = TokenSource::new();
        let first = tokens.issue();
        assert!(tokens.is_current(first));
        let second = tokens.issue();
        assert!(!tokens.is_current(first));
        assert!(tokens.is_current(second));
        tokens.invalidate();
        assert!(!tokens.is_current(second));
        tokens.invalidate();
        assert!(!tokens.is_current(second));
    }

    #[test]
    fn test_timer_queue_orders_by_deadline_then_insertion() {
        let mut tokens = TokenSource::new();
        let token = tokens.issue();
        let mut queue = TimerQueue::new();
        queue.schedule(ms(500), token, "c");
        queue.schedule(ms(0), token, "a");
        queue.schedule(ms(500), token, "d");
        queue.schedule(ms(250), token, "b");

        assert!(queue.pop_due(ms(0)).is_some_and(|f| f.payload == "a"));
        assert!(queue.pop_due(ms(100)).is_none());

        let rest: Vec<_> = std::iter::from_fn(|| queue.pop_due(ms(1000)))
            .map(|f| f.payload)
            .collect();
        assert_eq!(rest, vec!["b", "c", "d"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_one_shot_rearm_replaces_deadline() {
        let mut shot = OneShot::new();
        shot.arm(ms(0), ms(100));
        shot.arm(ms(60), ms(100));
        assert!(!shot.fire_if_due(ms(120)));
        assert!(shot.fire_if_due(ms(160)));
        assert!(!shot.fire_if_due(ms(200)));
        assert!(!shot.is_armed());
    }
}
