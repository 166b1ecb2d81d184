use std::collections::HashSet;
use std::time::{Duration, Instant};

use rand::Rng;

use crate::config::RoundConfig;
use crate::timer::IntervalTimer;

/// Identifier of a fixed target slot, 1-based like the digit key that
/// whacks it.
pub type SlotId = usize;

/// Size of the fixed slot pool. The digit-key row is the pool, so it
/// never grows; configuration only chooses how many of these are in play.
pub const SLOT_POOL_SIZE: usize = 9;

/// The rotating set of interactable target slots.
///
/// Owns all slot state: which slots exist (`1..=target_count`) and which
/// are currently active. Constructed from a validated [`RoundConfig`], so
/// `concurrency <= target_count` holds by the time sampling runs and the
/// rejection loop below always terminates.
#[derive(Debug, Clone)]
pub struct MoleField {
    target_count: usize,
    concurrency: usize,
    rotation_interval: Duration,
    active: HashSet<SlotId>,
    rotation: Option<IntervalTimer>,
}

impl MoleField {
    pub fn new(config: &RoundConfig) -> Self {
        Self {
            target_count: config.target_count,
            concurrency: config.concurrency,
            rotation_interval: config.rotation_interval,
            active: HashSet::new(),
            rotation: None,
        }
    }

    /// Adopt new sampling parameters. Logical parameters only — the key
    /// pool itself never resizes. Rejected while rotating; returns whether
    /// the parameters were applied.
    pub fn configure(&mut self, config: &RoundConfig) -> bool {
        if self.is_rotating() {
            return false;
        }
        self.target_count = config.target_count;
        self.concurrency = config.concurrency;
        self.rotation_interval = config.rotation_interval;
        true
    }

    /// Clear any active set, then begin rotating. The first active set
    /// appears one full interval after `now`. A no-op while already
    /// rotating, so a second rotation timer can never exist.
    pub fn start(&mut self, now: Instant) {
        if self.is_rotating() {
            return;
        }
        self.reset();
        self.rotation = Some(IntervalTimer::starting_at(now, self.rotation_interval));
    }

    /// Drive the rotation timer: each firing drops the current active set
    /// and generates a fresh one in the same step. Returns whether a
    /// rotation happened.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(rotation) = self.rotation.as_mut() else {
            return false;
        };
        if !rotation.poll(now) {
            return false;
        }
        self.rotate(&mut rand::thread_rng());
        true
    }

    fn rotate(&mut self, rng: &mut impl Rng) {
        self.active = generate_active_set(rng, self.target_count, self.concurrency);
    }

    /// Deactivate all currently active slots without altering the timer.
    pub fn reset(&mut self) {
        self.active.clear();
    }

    /// Deactivate a single slot — the whack-hit path, independent of the
    /// next rotation.
    pub fn deactivate(&mut self, slot: SlotId) {
        self.active.remove(&slot);
    }

    /// Cancel the rotation timer; safe to call when not rotating.
    pub fn stop(&mut self) {
        self.rotation = None;
    }

    pub fn is_active(&self, slot: SlotId) -> bool {
        self.active.contains(&slot)
    }

    pub fn active_slots(&self) -> &HashSet<SlotId> {
        &self.active
    }

    pub fn is_rotating(&self) -> bool {
        self.rotation.is_some()
    }

    pub fn target_count(&self) -> usize {
        self.target_count
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn rotation_interval(&self) -> Duration {
        self.rotation_interval
    }
}

/// Rejection sampling: draw uniformly from `[1, target_count]`, re-rolling
/// duplicates, until `concurrency` distinct slots are collected.
fn generate_active_set(
    rng: &mut impl Rng,
    target_count: usize,
    concurrency: usize,
) -> HashSet<SlotId> {
    let mut set = HashSet::with_capacity(concurrency);
    while set.len() < concurrency {
        set.insert(rng.gen_range(1..=target_count));
    }
    set
}
