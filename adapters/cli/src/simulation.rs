//! Session driver that wires the world to the milestone, scoreboard and ticker systems.

use std::time::Duration;

use grid_snake_core::{Command, Event, GameSnapshot, GameState};
use grid_snake_rendering::{FrameInput, HudPresentation};
use grid_snake_system_milestone::{self as milestone, Milestone};
use grid_snake_system_scoreboard::{format_play_time, Scoreboard};
use grid_snake_system_ticker::Ticker;
use grid_snake_world::{self as world, query, World};
use tracing::debug;

use crate::config::GameConfig;

/// Decorrelates the milestone draws from food placement.
const MILESTONE_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Owns a world and every system that reacts to its events.
#[derive(Debug)]
pub(crate) struct Simulation {
    world: World,
    milestone: Milestone,
    scoreboard: Scoreboard,
    ticker: Ticker,
}

impl Simulation {
    /// Builds a fresh session from the resolved configuration.
    pub(crate) fn new(config: &GameConfig, seed: u64) -> Self {
        let world = World::new(world::Config::new(
            config.grid_size(),
            config.edge_policy,
            seed,
        ));
        let milestone = Milestone::new(milestone::Config::new(
            config.milestone.into(),
            seed ^ MILESTONE_SEED_SALT,
        ));
        debug!(seed, grid_size = config.grid_size, "simulation created");

        Self {
            world,
            milestone,
            scoreboard: Scoreboard::new(config.score_display.into()),
            ticker: Ticker::new(config.tick_interval()),
        }
    }

    /// Applies a command and every follow-up command emitted by the systems.
    pub(crate) fn apply(&mut self, command: Command) -> Vec<Event> {
        let mut log = Vec::new();
        let mut pending = vec![command];

        while !pending.is_empty() {
            let mut events = Vec::new();
            for command in pending.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }
            self.milestone.handle(&events, &mut pending);
            self.scoreboard.handle(&events);
            log.extend(events);
        }

        log
    }

    /// Translates a frame of player input into commands, then advances time.
    pub(crate) fn advance_frame(&mut self, frame_dt: Duration, input: FrameInput) -> Vec<Event> {
        let mut log = Vec::new();
        for command in self.commands_for(input) {
            log.extend(self.apply(command));
        }

        let mut ticks = Vec::new();
        self.ticker
            .handle(frame_dt, query::state(&self.world), &mut ticks);
        for tick in ticks {
            log.extend(self.apply(tick));
        }

        log
    }

    fn commands_for(&self, input: FrameInput) -> Vec<Command> {
        let snapshot_state = query::state(&self.world);
        let interstitial = query::snapshot(&self.world).interstitial_pending;
        let mut commands = Vec::new();

        if interstitial {
            if input.acknowledge {
                commands.push(Command::AcknowledgeMilestone);
            }
            return commands;
        }

        let steer = input
            .direction
            .map(|direction| Command::RequestDirection { direction });
        match snapshot_state {
            GameState::Over => {
                if input.restart {
                    commands.push(Command::Restart);
                }
            }
            GameState::NotStarted => commands.extend(steer),
            // Steering pressed in the same frame as the pause key is queued first.
            GameState::Running => {
                commands.extend(steer);
                if input.pause_toggle {
                    commands.push(Command::Pause);
                }
            }
            GameState::Paused => {
                if input.pause_toggle {
                    commands.push(Command::Resume);
                    commands.extend(steer);
                }
            }
        }

        commands
    }

    /// Current world snapshot.
    pub(crate) fn snapshot(&self) -> GameSnapshot {
        query::snapshot(&self.world)
    }

    /// Value currently shown in place of the score.
    pub(crate) fn displayed_score(&self) -> u64 {
        self.scoreboard.displayed()
    }

    /// Values for the heads-up display.
    pub(crate) fn hud(&self) -> HudPresentation {
        let snapshot = self.snapshot();
        HudPresentation::new(
            self.displayed_score(),
            format_play_time(snapshot.elapsed),
            snapshot.state,
        )
    }

    /// Interval between simulation steps.
    pub(crate) fn tick_interval(&self) -> Duration {
        self.ticker.interval()
    }

    /// Banner greeting the player.
    pub(crate) fn welcome_banner(&self) -> &'static str {
        query::welcome_banner(&self.world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MilestoneSetting, ScoreDisplay};
    use grid_snake_core::{Direction, Position};

    fn config() -> GameConfig {
        GameConfig {
            milestone: MilestoneSetting::Fixed { fixed: 1 },
            score_display: ScoreDisplay::Literal,
            ..GameConfig::default()
        }
    }

    fn steer(direction: Direction) -> FrameInput {
        FrameInput {
            direction: Some(direction),
            ..FrameInput::default()
        }
    }

    #[test]
    fn frame_input_starts_and_advances_the_snake() {
        let mut simulation = Simulation::new(&config(), 5);
        let interval = simulation.tick_interval();

        let events = simulation.advance_frame(interval, steer(Direction::Up));

        assert!(events.contains(&Event::StateChanged {
            from: GameState::NotStarted,
            to: GameState::Running,
        }));
        assert_eq!(simulation.snapshot().head(), Some(Position::new(10, 9)));
        assert_eq!(simulation.hud().state, GameState::Running);
    }

    #[test]
    fn milestone_pauses_until_acknowledged() {
        let mut simulation = Simulation::new(&config(), 5);
        let interval = simulation.tick_interval();
        let _ = simulation.apply(Command::PlaceFood {
            position: Position::new(11, 10),
        });

        let events = simulation.advance_frame(interval, steer(Direction::Right));
        assert!(events.contains(&Event::MilestoneReached { score: 1 }));
        assert!(simulation.snapshot().interstitial_pending);
        assert_eq!(simulation.displayed_score(), 1);

        let ignored = simulation.advance_frame(interval, steer(Direction::Down));
        assert!(ignored.is_empty());

        let resume = FrameInput {
            acknowledge: true,
            ..FrameInput::default()
        };
        let events = simulation.advance_frame(interval, resume);
        assert!(events.contains(&Event::MilestoneAcknowledged));
        assert_eq!(simulation.snapshot().state, GameState::Running);
    }

    #[test]
    fn pause_toggle_alternates() {
        let mut simulation = Simulation::new(&config(), 5);
        let interval = simulation.tick_interval();
        let _ = simulation.advance_frame(interval, steer(Direction::Right));

        let toggle = FrameInput {
            pause_toggle: true,
            ..FrameInput::default()
        };
        let _ = simulation.advance_frame(interval, toggle);
        assert_eq!(simulation.snapshot().state, GameState::Paused);
        let head = simulation.snapshot().head();

        let _ = simulation.advance_frame(interval * 4, FrameInput::default());
        assert_eq!(simulation.snapshot().head(), head);

        let _ = simulation.advance_frame(Duration::ZERO, toggle);
        assert_eq!(simulation.snapshot().state, GameState::Running);
    }

    #[test]
    fn steering_survives_a_pause_in_the_same_frame() {
        let mut simulation = Simulation::new(&config(), 5);
        let _ = simulation.apply(Command::PlaceFood {
            position: Position::new(0, 0),
        });
        let interval = simulation.tick_interval();
        let _ = simulation.advance_frame(interval, steer(Direction::Right));
        assert_eq!(simulation.snapshot().head(), Some(Position::new(11, 10)));

        let steer_and_pause = FrameInput {
            direction: Some(Direction::Down),
            pause_toggle: true,
            ..FrameInput::default()
        };
        let events = simulation.advance_frame(interval, steer_and_pause);
        assert!(events.contains(&Event::DirectionQueued {
            direction: Direction::Down,
        }));
        assert_eq!(simulation.snapshot().state, GameState::Paused);

        let resume = FrameInput {
            pause_toggle: true,
            ..FrameInput::default()
        };
        let _ = simulation.advance_frame(interval, resume);
        assert_eq!(simulation.snapshot().head(), Some(Position::new(11, 11)));
    }

    #[test]
    fn restart_only_after_game_over() {
        let mut simulation = Simulation::new(&config(), 5);
        let restart = FrameInput {
            restart: true,
            ..FrameInput::default()
        };
        assert!(simulation
            .advance_frame(Duration::ZERO, restart)
            .is_empty());
        assert_eq!(simulation.snapshot().state, GameState::NotStarted);
    }
}
