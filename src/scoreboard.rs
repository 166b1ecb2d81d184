use std::time::{Duration, Instant};

use crate::timer::IntervalTimer;

/// Resolution of the periodic countdown check. Expiry is detected within
/// one check interval of the true deadline.
pub const CHECK_INTERVAL: Duration = Duration::from_millis(50);

/// Tracks the round countdown and the score.
///
/// The countdown records a deadline at `start` and compares it against the
/// observed time whenever the 50ms check timer fires; it reports expiry
/// through `poll` exactly once per round.
#[derive(Debug, Clone)]
pub struct Scoreboard {
    duration: Duration,
    score: u32,
    deadline: Option<Instant>,
    check: Option<IntervalTimer>,
    remaining: Duration,
}

impl Scoreboard {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            score: 0,
            deadline: None,
            check: None,
            remaining: duration,
        }
    }

    /// Set the round duration for subsequent rounds. Rejected while a
    /// round is counting down; returns whether the duration was applied.
    pub fn configure(&mut self, duration: Duration) -> bool {
        if self.is_running() {
            return false;
        }
        self.duration = duration;
        self.remaining = duration;
        true
    }

    /// Begin the countdown. A no-op while already running, so the check
    /// timer can never be double-scheduled.
    pub fn start(&mut self, now: Instant) {
        if self.is_running() {
            return;
        }
        self.score = 0;
        self.remaining = self.duration;
        self.deadline = Some(now + self.duration);
        self.check = Some(IntervalTimer::starting_at(now, CHECK_INTERVAL));
    }

    /// Drive the periodic countdown check. Returns true exactly once per
    /// round, when a fired check observes the deadline has passed; the
    /// timers are cancelled before reporting, so no later poll can expire
    /// a second time.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(deadline) = self.deadline else {
            return false;
        };
        let Some(check) = self.check.as_mut() else {
            return false;
        };
        if !check.poll(now) {
            return false;
        }

        self.remaining = deadline.saturating_duration_since(now);
        if self.remaining == Duration::ZERO {
            self.stop();
            true
        } else {
            false
        }
    }

    /// Add to the score. The controller gates this on the round running.
    pub fn increment(&mut self, delta: u32) {
        self.score = self.score.saturating_add(delta);
    }

    /// Score back to 0 without touching the countdown.
    pub fn reset(&mut self) {
        self.score = 0;
    }

    /// Cancel the countdown check; safe to call when not running.
    pub fn stop(&mut self) {
        self.check = None;
        self.deadline = None;
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Remaining time as of the last fired check (the configured duration
    /// while idle).
    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.check.is_some()
    }
}
