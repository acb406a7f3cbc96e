#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic milestone system that opens the interstitial once per session.

use grid_snake_core::{Command, Event};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Score that triggers the interstitial.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MilestoneThreshold {
    /// The same score every session.
    Fixed(u32),
    /// A score drawn uniformly from `min..=max` whenever a session begins.
    Random {
        /// Lowest score that may be drawn.
        min: u32,
        /// Highest score that may be drawn.
        max: u32,
    },
}

impl MilestoneThreshold {
    /// Threshold used when nothing else is configured: a draw from one to six.
    pub const DEFAULT: Self = Self::Random { min: 1, max: 6 };

    fn roll(self, rng: &mut ChaCha8Rng) -> u32 {
        match self {
            Self::Fixed(score) => score,
            Self::Random { min, max } => {
                let (low, high) = if min <= max { (min, max) } else { (max, min) };
                rng.gen_range(low..=high)
            }
        }
    }
}

impl Default for MilestoneThreshold {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Configuration parameters required to construct the milestone system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    threshold: MilestoneThreshold,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided threshold and seed.
    #[must_use]
    pub const fn new(threshold: MilestoneThreshold, rng_seed: u64) -> Self {
        Self {
            threshold,
            rng_seed,
        }
    }
}

/// Pure system that requests the interstitial when the score reaches the target.
#[derive(Debug)]
pub struct Milestone {
    threshold: MilestoneThreshold,
    target: u32,
    armed: bool,
    rng: ChaCha8Rng,
}

impl Milestone {
    /// Creates a new milestone system and draws the first session's target.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
        let target = config.threshold.roll(&mut rng);
        debug!(target, "milestone target drawn");
        Self {
            threshold: config.threshold,
            target,
            armed: true,
            rng,
        }
    }

    /// Score that triggers the interstitial during the current session.
    #[must_use]
    pub fn target(&self) -> u32 {
        self.target
    }

    /// Reports whether the interstitial has yet to fire this session.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Consumes world events and emits the milestone trigger when due.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::GameRestarted | Event::GridConfigured { .. } => self.rearm(),
                Event::FoodEaten { score, .. } if self.armed && *score >= self.target => {
                    debug!(score, target = self.target, "milestone due");
                    self.armed = false;
                    out.push(Command::TriggerMilestone);
                }
                _ => {}
            }
        }
    }

    fn rearm(&mut self) {
        self.target = self.threshold.roll(&mut self.rng);
        self.armed = true;
        debug!(target = self.target, "milestone rearmed");
    }
}
