// Progress ticker: a cooperatively rescheduled delayed task
// Runs on the player's thread; the host loop fires it from FivePlayer::poll

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Progress report interval while playing
pub const PROGRESS_INTERVAL_MS: u64 = 200;

/// Time source for the ticker
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}

/// Single pending progress task.
///
/// At most one task is scheduled; restarting replaces it and cancelling an
/// idle ticker does nothing.
#[derive(Debug)]
pub struct ProgressTicker {
    interval: Duration,
    next_due: Option<Instant>,
}

impl ProgressTicker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    /// Schedule the task to fire immediately, replacing any pending one.
    pub fn restart(&mut self, now: Instant) {
        self.next_due = Some(now);
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    pub fn is_scheduled(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.next_due
    }

    /// Consume a due firing and reschedule one interval later.
    ///
    /// A host that fell behind gets one firing, not a burst of catch-up
    /// ticks.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if due <= now => {
                self.next_due = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }
}

impl Default for ProgressTicker {
    fn default() -> Self {
        Self::new(Duration::from_millis(PROGRESS_INTERVAL_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_immediately_then_every_interval() {
        let clock = ManualClock::new();
        let mut ticker = ProgressTicker::default();
        ticker.restart(clock.now());

        assert!(ticker.fire_if_due(clock.now()));
        assert!(!ticker.fire_if_due(clock.now()));

        clock.advance(Duration::from_millis(199));
        assert!(!ticker.fire_if_due(clock.now()));

        clock.advance(Duration::from_millis(1));
        assert!(ticker.fire_if_due(clock.now()));
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let clock = ManualClock::new();
        let mut ticker = ProgressTicker::default();
        ticker.cancel();
        assert!(!ticker.is_scheduled());

        ticker.restart(clock.now());
        ticker.cancel();
        ticker.cancel();
        assert!(!ticker.is_scheduled());
        assert!(!ticker.fire_if_due(clock.now()));
    }

    #[test]
    fn test_late_host_gets_single_firing() {
        let clock = ManualClock::new();
        let mut ticker = ProgressTicker::default();
        ticker.restart(clock.now());
        assert!(ticker.fire_if_due(clock.now()));

        clock.advance(Duration::from_millis(1000));
        assert!(ticker.fire_if_due(clock.now()));
        assert!(!ticker.fire_if_due(clock.now()));
    }
}
