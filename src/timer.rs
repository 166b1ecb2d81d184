use std::time::{Duration, Instant};

/// A repeating schedule polled from the event loop; the setInterval
/// analogue for a cooperative tick loop.
///
/// Components own their timer as an `Option<IntervalTimer>` and cancel it
/// by taking/dropping the handle, so a stopped timer can never fire again
/// and clearing it twice is a no-op. `poll` fires at most once per call
/// and reschedules from the observed time, so periods missed while the
/// loop was busy coalesce into a single firing instead of bursting to
/// catch up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalTimer {
    period: Duration,
    next_due: Instant,
}

impl IntervalTimer {
    /// Schedule the first firing one full period after `now`.
    pub fn starting_at(now: Instant, period: Duration) -> Self {
        Self {
            period,
            next_due: now + period,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Whether the timer would fire at `now`, without consuming the firing.
    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.next_due
    }

    /// Fire if due, rescheduling the next firing one period after `now`.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now >= self.next_due {
            self.next_due = now + self.period;
            true
        } else {
            false
        }
    }
}
