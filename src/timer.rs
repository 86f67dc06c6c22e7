//! One-shot timers driven by the event loop.
//!
//! Nothing here sleeps: the loop asks for the next deadline, waits on it, and
//! then drains the expired handles back into the session as `TimerFired`
//! events.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Identifies one scheduled timer. Handles are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

/// Timer capability consumed by animators.
pub trait TimerService {
    fn schedule(&mut self, delay: Duration) -> TimerHandle;
    fn cancel(&mut self, handle: TimerHandle);
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    deadline: Instant,
    delay: Duration,
}

/// Deadline queue of pending one-shot timers.
#[derive(Debug, Default)]
pub struct Timers {
    next_id: u64,
    pending: HashMap<TimerHandle, Pending>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.contains_key(&handle)
    }

    /// Delay the timer was scheduled with, while it is still pending.
    pub fn delay(&self, handle: TimerHandle) -> Option<Duration> {
        self.pending.get(&handle).map(|p| p.delay)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|p| p.deadline).min()
    }

    /// Remove and return every timer due at `now`, earliest first.
    pub fn take_expired(&mut self, now: Instant) -> Vec<TimerHandle> {
        let mut due: Vec<(Instant, TimerHandle)> = self
            .pending
            .iter()
            .filter(|(_, p)| p.deadline <= now)
            .map(|(h, p)| (p.deadline, *h))
            .collect();
        due.sort();
        for (_, handle) in &due {
            self.pending.remove(handle);
        }
        due.into_iter().map(|(_, h)| h).collect()
    }
}

impl TimerService for Timers {
    fn schedule(&mut self, delay: Duration) -> TimerHandle {
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        self.pending.insert(
            handle,
            Pending {
                deadline: Instant::now() + delay,
                delay,
            },
        );
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.pending.remove(&handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_and_cancel() {
        let mut timers = Timers::new();
        let a = timers.schedule(Duration::from_millis(50));
        let b = timers.schedule(Duration::from_millis(10));
        assert_ne!(a, b);
        assert_eq!(timers.len(), 2);
        assert_eq!(timers.delay(a), Some(Duration::from_millis(50)));

        timers.cancel(a);
        assert!(!timers.is_pending(a));
        assert!(timers.is_pending(b));
        // Cancelling twice is harmless.
        timers.cancel(a);
        assert_eq!(timers.len(), 1);
    }

    #[test]
    fn test_take_expired_in_deadline_order() {
        let mut timers = Timers::new();
        let late = timers.schedule(Duration::from_millis(30));
        let early = timers.schedule(Duration::from_millis(5));
        let never = timers.schedule(Duration::from_secs(3600));

        let now = Instant::now() + Duration::from_millis(100);
        assert_eq!(timers.take_expired(now), vec![early, late]);
        assert!(timers.is_pending(never));
        assert!(timers.take_expired(now).is_empty());
    }

    #[test]
    fn test_next_deadline() {
        let mut timers = Timers::new();
        assert!(timers.next_deadline().is_none());
        timers.schedule(Duration::from_secs(10));
        let soon = Instant::now() + Duration::from_secs(1);
        timers.schedule(Duration::from_millis(1));
        assert!(timers.next_deadline().unwrap() <= soon);
    }
}
