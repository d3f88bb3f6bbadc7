//! Cancellable timers and the debounce policy built on them.
//!
//! A timer does not carry its task. When it elapses the host hands the
//! handle back to whoever scheduled it, which checks it is still the
//! current one before acting.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(pub u64);

pub trait Scheduler {
    /// Arrange for `handle` to be delivered back after `delay`
    fn schedule_after(&mut self, delay: Duration) -> TimerHandle;
    /// Drop a pending timer; unknown or already-fired handles are ignored
    fn cancel(&mut self, handle: TimerHandle);
}

/// Collapses bursts of triggers into one firing after a quiet period
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<TimerHandle>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Debouncer {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Cancel any pending timer and schedule a fresh one
    pub fn trigger<S: Scheduler>(&mut self, scheduler: &mut S) -> TimerHandle {
        self.cancel(scheduler);
        let handle = scheduler.schedule_after(self.delay);
        self.pending = Some(handle);
        handle
    }

    pub fn cancel<S: Scheduler>(&mut self, scheduler: &mut S) {
        if let Some(handle) = self.pending.take() {
            scheduler.cancel(handle);
        }
    }

    /// Accept an elapsed timer; only the most recent schedule returns true
    pub fn fire(&mut self, handle: TimerHandle) -> bool {
        if self.pending == Some(handle) {
            self.pending = None;
            true
        } else {
            false
        }
    }
}

/// Scheduler driven by explicit calls to `advance`, with virtual time
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    next_id: u64,
    timers: Vec<(Duration, TimerHandle)>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Move time forward and return the handles that came due, earliest first
    pub fn advance(&mut self, by: Duration) -> Vec<TimerHandle> {
        self.now += by;
        let now = self.now;
        let mut due: Vec<(Duration, TimerHandle)> = self
            .timers
            .iter()
            .copied()
            .filter(|(deadline, _)| *deadline <= now)
            .collect();
        self.timers.retain(|(deadline, _)| *deadline > now);
        due.sort();
        due.into_iter().map(|(_, handle)| handle).collect()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_after(&mut self, delay: Duration) -> TimerHandle {
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        self.timers.push((self.now + delay, handle));
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.timers.retain(|(_, h)| *h != handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUIET: Duration = Duration::from_millis(300);

    #[test]
    fn test_burst_fires_once() {
        let mut scheduler = ManualScheduler::new();
        let mut debouncer = Debouncer::new(QUIET);

        debouncer.trigger(&mut scheduler);
        scheduler.advance(Duration::from_millis(100));
        debouncer.trigger(&mut scheduler);
        scheduler.advance(Duration::from_millis(100));
        let last = debouncer.trigger(&mut scheduler);
        assert_eq!(scheduler.pending(), 1);

        assert!(scheduler.advance(Duration::from_millis(299)).is_empty());
        let due = scheduler.advance(Duration::from_millis(1));
        assert_eq!(due, vec![last]);
        assert!(debouncer.fire(last));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_stale_handle_is_rejected() {
        let mut scheduler = ManualScheduler::new();
        let mut debouncer = Debouncer::new(QUIET);
        let first = debouncer.trigger(&mut scheduler);
        let second = debouncer.trigger(&mut scheduler);
        assert!(!debouncer.fire(first));
        assert!(debouncer.fire(second));
        assert!(!debouncer.fire(second));
    }

    #[test]
    fn test_cancel_clears_pending() {
        let mut scheduler = ManualScheduler::new();
        let mut debouncer = Debouncer::new(QUIET);
        let handle = debouncer.trigger(&mut scheduler);
        debouncer.cancel(&mut scheduler);
        assert_eq!(scheduler.pending(), 0);
        assert!(!debouncer.fire(handle));
    }
}
