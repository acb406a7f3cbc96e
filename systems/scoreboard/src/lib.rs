#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Presentation-only scoreboard that derives the values shown on the HUD.
//!
//! Nothing computed here flows back into the world: the displayed score may be
//! replaced by an arbitrary joke value while the authoritative score keeps
//! counting food.

use std::time::Duration;

use grid_snake_core::Event;

/// Joke values shown instead of the literal score, indexed by `score % len`.
pub const CHAOTIC_SCORES: [u64; 11] = [
    1, 23, 64_586, 34, 999, 42, 1337, 69, 420, 8_675_309, 314_159,
];

/// Strategy used to turn the authoritative score into the displayed value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScoreStyle {
    /// Shows the score unchanged.
    Literal,
    /// Shows a value picked from a fixed table of joke numbers.
    #[default]
    Chaotic,
}

/// Pure system that tracks the score shown to the player.
#[derive(Clone, Debug)]
pub struct Scoreboard {
    style: ScoreStyle,
    table: Vec<u64>,
    displayed: u64,
}

impl Scoreboard {
    /// Creates a scoreboard using the built-in joke table.
    #[must_use]
    pub fn new(style: ScoreStyle) -> Self {
        Self {
            style,
            table: CHAOTIC_SCORES.to_vec(),
            displayed: 0,
        }
    }

    /// Replaces the joke table used by [`ScoreStyle::Chaotic`].
    #[must_use]
    pub fn with_table(mut self, table: Vec<u64>) -> Self {
        self.table = table;
        self
    }

    /// Value currently shown on the HUD.
    #[must_use]
    pub fn displayed(&self) -> u64 {
        self.displayed
    }

    /// Maps an authoritative score to the value shown to the player.
    ///
    /// A score of zero is always shown as zero. An empty table, or a zero
    /// entry, falls back to a thousand times the score.
    #[must_use]
    pub fn display_score(&self, score: u32) -> u64 {
        let score = u64::from(score);
        if score == 0 {
            return 0;
        }

        match self.style {
            ScoreStyle::Literal => score,
            ScoreStyle::Chaotic => {
                let picked = usize::try_from(score)
                    .ok()
                    .filter(|_| !self.table.is_empty())
                    .and_then(|score| self.table.get(score % self.table.len()))
                    .copied()
                    .unwrap_or(0);
                if picked == 0 {
                    score.saturating_mul(1_000)
                } else {
                    picked
                }
            }
        }
    }

    /// Consumes world events and refreshes the displayed value.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::FoodEaten { score, .. } => {
                    self.displayed = self.display_score(*score);
                }
                Event::GameRestarted | Event::GridConfigured { .. } => {
                    self.displayed = 0;
                }
                _ => {}
            }
        }
    }
}

impl Default for Scoreboard {
    fn default() -> Self {
        Self::new(ScoreStyle::default())
    }
}

/// Formats play time as zero-padded `MM:SS`; minutes keep growing past 99.
#[must_use]
pub fn format_play_time(elapsed: Duration) -> String {
    let seconds = elapsed.as_secs();
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
