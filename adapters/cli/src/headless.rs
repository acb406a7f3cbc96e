//! Windowless sessions driven by scripts.

use clap::ValueEnum;
use grid_snake_core::{Command, Event, GameSnapshot, Position};
use grid_snake_rendering::FrameInput;
use grid_snake_system_scoreboard::format_play_time;
use grid_snake_system_ticker::IntervalTimer;
use serde::Serialize;
use tracing::info;

use crate::simulation::Simulation;

/// Output encoding for the final report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Board drawn with characters followed by a summary.
    #[default]
    Text,
    /// Machine-readable report.
    Json,
}

/// Options controlling a headless run.
#[derive(Clone, Copy, Debug)]
pub(crate) struct HeadlessOptions {
    /// Dismiss interstitials as soon as they open.
    pub(crate) auto_acknowledge: bool,
    /// Pace steps with a wall-clock timer.
    pub(crate) realtime: bool,
}

/// Outcome of a headless run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub(crate) struct SimulationReport {
    pub(crate) seed: u64,
    pub(crate) steps: usize,
    pub(crate) displayed_score: u64,
    pub(crate) play_time: String,
    pub(crate) games_over: usize,
    pub(crate) milestones: usize,
    pub(crate) snapshot: GameSnapshot,
}

impl SimulationReport {
    /// Renders the board and summary as plain text.
    pub(crate) fn to_text(&self) -> String {
        let mut text = render_board(&self.snapshot);
        text.push_str(&format!(
            "state: {:?}\nscore: {} (shown as {})\nlength: {}\nplay time: {}\nsteps: {}\ngames over: {}\nmilestones: {}\nseed: {}\n",
            self.snapshot.state,
            self.snapshot.score,
            self.displayed_score,
            self.snapshot.len(),
            self.play_time,
            self.steps,
            self.games_over,
            self.milestones,
            self.seed,
        ));
        text
    }

    /// Renders the report as pretty-printed JSON.
    pub(crate) fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Replays `steps` against the simulation, one simulation interval per step.
pub(crate) fn run(
    simulation: &mut Simulation,
    steps: &[FrameInput],
    seed: u64,
    options: HeadlessOptions,
) -> SimulationReport {
    let interval = simulation.tick_interval();
    let timer = options.realtime.then(|| IntervalTimer::start(interval));
    let mut games_over = 0;
    let mut milestones = 0;
    let mut executed = 0;

    for step in steps {
        if let Some(timer) = &timer {
            if timer.wait().is_none() {
                break;
            }
        }

        let events = simulation.advance_frame(interval, *step);
        executed += 1;
        for event in &events {
            match event {
                Event::GameOver { score, reason } => {
                    games_over += 1;
                    info!(score, ?reason, "game over");
                }
                Event::MilestoneReached { score } => {
                    milestones += 1;
                    info!(score, "milestone reached");
                }
                _ => {}
            }
        }

        if options.auto_acknowledge && simulation.snapshot().interstitial_pending {
            info!("interstitial dismissed");
            let _ = simulation.apply(Command::AcknowledgeMilestone);
        }
    }

    let snapshot = simulation.snapshot();
    SimulationReport {
        seed,
        steps: executed,
        displayed_score: simulation.displayed_score(),
        play_time: format_play_time(snapshot.elapsed),
        games_over,
        milestones,
        snapshot,
    }
}

/// Draws the board with `@` for the head, `o` for the body and `*` for food.
pub(crate) fn render_board(snapshot: &GameSnapshot) -> String {
    let size = snapshot.grid_size.get();
    let mut board = String::new();

    for y in 0..size {
        for x in 0..size {
            let cell = Position::new(x, y);
            let symbol = if snapshot.head() == Some(cell) {
                '@'
            } else if snapshot.occupies(cell) {
                'o'
            } else if snapshot.food == Some(cell) {
                '*'
            } else {
                '.'
            };
            board.push(symbol);
        }
        board.push('\n');
    }

    board
}
