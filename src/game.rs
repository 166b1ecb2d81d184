use std::time::{Duration, Instant};

use crate::config::{ConfigError, RoundConfig};
use crate::field::{MoleField, SlotId};
use crate::scoreboard::Scoreboard;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum RoundState {
    Idle,
    Running,
}

/// End-of-round tallies for the summary screen. Purely observational —
/// nothing here feeds back into scoring or rotation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundStats {
    /// Whack attempts on known slots while running, hit or miss.
    pub swings: u32,
    pub hits: u32,
    pub best_streak: u32,
    pub current_streak: u32,
}

impl RoundStats {
    pub fn accuracy(&self) -> f64 {
        if self.swings == 0 {
            0.0
        } else {
            (self.hits as f64 / self.swings as f64) * 100.0
        }
    }
}

/// The round controller: owns the [`Scoreboard`] and the [`MoleField`],
/// routes whacks between them, and is the only writer of [`RoundState`].
///
/// The two components never see each other; every interaction goes through
/// here, which is also where the expiry/rotation tie gets its fixed order.
#[derive(Debug, Clone)]
pub struct Game {
    config: RoundConfig,
    scoreboard: Scoreboard,
    field: MoleField,
    state: RoundState,
    game_over_visible: bool,
    stats: RoundStats,
    last_hit: Option<(SlotId, Instant)>,
    round_elapsed: Duration,
}

impl Game {
    pub fn new(config: RoundConfig) -> Self {
        Self {
            scoreboard: Scoreboard::new(config.duration),
            field: MoleField::new(&config),
            config,
            state: RoundState::Idle,
            game_over_visible: false,
            stats: RoundStats::default(),
            last_hit: None,
            round_elapsed: Duration::ZERO,
        }
    }

    /// Begin a round. A no-op while one is already running.
    pub fn start(&mut self, now: Instant) {
        if self.state == RoundState::Running {
            return;
        }
        self.game_over_visible = false;
        self.state = RoundState::Running;
        self.stats = RoundStats::default();
        self.last_hit = None;
        self.round_elapsed = Duration::ZERO;
        self.scoreboard.reset();
        self.field.start(now);
        self.scoreboard.start(now);
    }

    /// End the round: cancel both timers, clear the active set, show the
    /// game-over banner. Idempotent; also the explicit-abort path.
    pub fn stop(&mut self) {
        if self.state == RoundState::Running {
            self.round_elapsed = self.config.duration - self.scoreboard.remaining();
        }
        self.scoreboard.stop();
        self.field.stop();
        self.field.reset();
        self.state = RoundState::Idle;
        self.game_over_visible = true;
    }

    /// Route a whack at `slot`. Scores (and deactivates the slot, ahead of
    /// the next rotation) only when the round is running and the slot is
    /// active; everything else is silently ignored. Returns whether it hit.
    pub fn whack(&mut self, slot: SlotId, now: Instant) -> bool {
        if self.state != RoundState::Running {
            return false;
        }
        if slot == 0 || slot > self.field.target_count() {
            return false;
        }
        self.stats.swings += 1;
        if !self.field.is_active(slot) {
            self.stats.current_streak = 0;
            return false;
        }
        self.scoreboard.increment(1);
        self.field.deactivate(slot);
        self.stats.hits += 1;
        self.stats.current_streak += 1;
        self.stats.best_streak = self.stats.best_streak.max(self.stats.current_streak);
        self.last_hit = Some((slot, now));
        true
    }

    /// Drive both component timers from the event loop. The scoreboard is
    /// always polled first: when expiry and a rotation land on the same
    /// tick, the round ends and the tied rotation never runs.
    pub fn on_tick(&mut self, now: Instant) {
        if self.scoreboard.poll(now) {
            self.stop();
            return;
        }
        self.field.poll(now);
    }

    /// Swap in new round parameters. Only between rounds.
    pub fn configure(&mut self, config: RoundConfig) -> Result<(), ConfigError> {
        if self.state == RoundState::Running {
            return Err(ConfigError::RoundInProgress);
        }
        self.scoreboard.configure(config.duration);
        self.field.configure(&config);
        self.config = config;
        Ok(())
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RoundState::Running
    }

    pub fn score(&self) -> u32 {
        self.scoreboard.score()
    }

    pub fn remaining(&self) -> Duration {
        self.scoreboard.remaining()
    }

    pub fn game_over_visible(&self) -> bool {
        self.game_over_visible
    }

    pub fn stats(&self) -> &RoundStats {
        &self.stats
    }

    pub fn field(&self) -> &MoleField {
        &self.field
    }

    pub fn config(&self) -> &RoundConfig {
        &self.config
    }

    /// The most recent hit, for the UI's brief cell flash.
    pub fn last_hit(&self) -> Option<(SlotId, Instant)> {
        self.last_hit
    }

    /// Hit rate over the played portion of the last round.
    pub fn whacks_per_minute(&self) -> f64 {
        let secs = self.round_elapsed.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            (self.stats.hits as f64 / secs) * 60.0
        }
    }
}
