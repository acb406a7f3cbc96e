#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Grid Snake.

use std::{collections::VecDeque, time::Duration};

use grid_snake_core::{
    Command, Direction, DirectionRejection, EdgePolicy, Event, GameOverReason, GameState,
    GridSize, PlacementError, Position, TransitionRequest, DEFAULT_GRID_SIZE, WELCOME_BANNER,
};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

const FOOD_GENERATION_SEED: u64 = 0x42f0_e1eb_d4a5_3c21;
const OPENING_FOOD: Position = Position::new(15, 15);
const OPENING_DIRECTION: Direction = Direction::Right;

/// Configuration parameters required to construct the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    grid_size: GridSize,
    edge_policy: EdgePolicy,
    rng_seed: u64,
    opening_food: Option<Position>,
}

impl Config {
    /// Creates a configuration for the provided grid, edge policy and food seed.
    ///
    /// Sizes outside [`GridSize::MIN`]..=[`GridSize::MAX`] are clamped into range.
    #[must_use]
    pub const fn new(grid_size: GridSize, edge_policy: EdgePolicy, rng_seed: u64) -> Self {
        Self {
            grid_size: grid_size.clamped(),
            edge_policy,
            rng_seed,
            opening_food: Some(OPENING_FOOD),
        }
    }

    /// Overrides the cell that holds the food when a fresh grid is laid out.
    ///
    /// `None`, an out-of-bounds cell, or a cell under the snake falls back to
    /// a random free cell.
    #[must_use]
    pub const fn with_opening_food(mut self, opening_food: Option<Position>) -> Self {
        self.opening_food = opening_food;
        self
    }

    /// Number of cells along each side of the grid.
    #[must_use]
    pub const fn grid_size(&self) -> GridSize {
        self.grid_size
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_GRID_SIZE, EdgePolicy::Wrap, FOOD_GENERATION_SEED)
    }
}

/// Represents the authoritative Grid Snake world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: Config,
    snake: VecDeque<Position>,
    occupancy: OccupancyGrid,
    direction: Direction,
    pending_direction: Option<Direction>,
    food: Option<Position>,
    score: u32,
    state: GameState,
    elapsed: Duration,
    tick_index: u64,
    milestone_fired: bool,
    interstitial_pending: bool,
    rng: ChaCha8Rng,
}

impl World {
    /// Creates a new world laid out with the opening arrangement.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let mut world = Self {
            banner: WELCOME_BANNER,
            config,
            snake: VecDeque::new(),
            occupancy: OccupancyGrid::new(config.grid_size),
            direction: OPENING_DIRECTION,
            pending_direction: None,
            food: None,
            score: 0,
            state: GameState::NotStarted,
            elapsed: Duration::ZERO,
            tick_index: 0,
            milestone_fired: false,
            interstitial_pending: false,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        };
        let mut discarded = Vec::new();
        world.reset_session(FoodPlacement::Opening, &mut discarded);
        world
    }

    fn reset_session(&mut self, placement: FoodPlacement, out_events: &mut Vec<Event>) {
        let start = self.config.grid_size.center();
        self.snake.clear();
        self.snake.push_back(start);
        self.occupancy = OccupancyGrid::new(self.config.grid_size);
        self.occupancy.fill_with(&self.snake);
        self.direction = OPENING_DIRECTION;
        self.pending_direction = None;
        self.score = 0;
        self.elapsed = Duration::ZERO;
        self.tick_index = 0;
        self.milestone_fired = false;
        self.interstitial_pending = false;
        self.food = None;

        let opening = match placement {
            FoodPlacement::Opening => self
                .config
                .opening_food
                .filter(|cell| self.config.grid_size.contains(*cell))
                .filter(|cell| !self.occupancy.is_occupied(*cell)),
            FoodPlacement::Random => None,
        };

        match opening {
            Some(cell) => {
                self.food = Some(cell);
                out_events.push(Event::FoodPlaced { position: cell });
            }
            None => self.place_random_food(out_events),
        }
    }

    fn place_random_food(&mut self, out_events: &mut Vec<Event>) {
        let free_cells = self.occupancy.free_cells();
        self.food = free_cells.choose(&mut self.rng).copied();
        match self.food {
            Some(position) => {
                debug!(x = position.x(), y = position.y(), "food placed");
                out_events.push(Event::FoodPlaced { position });
            }
            None => {
                debug!("no free cell left for food");
                out_events.push(Event::FoodExhausted);
            }
        }
    }

    fn transition(&mut self, to: GameState, out_events: &mut Vec<Event>) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;
        debug!(?from, ?to, "state changed");
        out_events.push(Event::StateChanged { from, to });
    }

    fn ignore(&self, request: TransitionRequest, out_events: &mut Vec<Event>) {
        trace!(?request, state = ?self.state, "transition ignored");
        out_events.push(Event::TransitionIgnored {
            request,
            state: self.state,
        });
    }

    fn end_game(&mut self, reason: GameOverReason, out_events: &mut Vec<Event>) {
        debug!(?reason, score = self.score, "game over");
        self.pending_direction = None;
        self.transition(GameState::Over, out_events);
        out_events.push(Event::GameOver {
            score: self.score,
            reason,
        });
    }

    fn request_direction(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        match self.state {
            GameState::NotStarted => {
                let from = self.direction;
                self.direction = direction;
                if from != direction {
                    out_events.push(Event::DirectionChanged {
                        from,
                        to: direction,
                    });
                }
                self.transition(GameState::Running, out_events);
            }
            GameState::Running => {
                if self.direction.is_opposite(direction) {
                    trace!(?direction, current = ?self.direction, "reversal rejected");
                    out_events.push(Event::DirectionRejected {
                        requested: direction,
                        reason: DirectionRejection::Reversal,
                    });
                    return;
                }
                self.pending_direction = Some(direction);
                out_events.push(Event::DirectionQueued { direction });
            }
            GameState::Paused | GameState::Over => {
                out_events.push(Event::DirectionRejected {
                    requested: direction,
                    reason: DirectionRejection::Inactive,
                });
            }
        }
    }

    fn step(&mut self, out_events: &mut Vec<Event>) {
        if let Some(next) = self.pending_direction.take() {
            if self.direction.is_opposite(next) {
                out_events.push(Event::DirectionRejected {
                    requested: next,
                    reason: DirectionRejection::Reversal,
                });
            } else if next != self.direction {
                out_events.push(Event::DirectionChanged {
                    from: self.direction,
                    to: next,
                });
                self.direction = next;
            }
        }

        let Some(head) = self.snake.front().copied() else {
            return;
        };

        let Some(next_head) =
            self.config
                .edge_policy
                .advance(head, self.direction, self.config.grid_size)
        else {
            self.end_game(GameOverReason::Wall, out_events);
            return;
        };

        if self.occupancy.is_occupied(next_head) {
            self.end_game(GameOverReason::SelfCollision, out_events);
            return;
        }

        self.snake.push_front(next_head);
        self.occupancy.occupy(next_head);

        let ate = self.food == Some(next_head);
        if ate {
            self.score = self.score.saturating_add(1);
        } else if let Some(tail) = self.snake.pop_back() {
            self.occupancy.vacate(tail);
        }

        out_events.push(Event::SnakeAdvanced {
            from: head,
            to: next_head,
            grew: ate,
        });

        if ate {
            out_events.push(Event::FoodEaten {
                position: next_head,
                score: self.score,
            });
            self.place_random_food(out_events);
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureGrid { size, edge_policy } => {
            if let Err(reason) = size.validate() {
                trace!(size = size.get(), ?reason, "grid configuration rejected");
                out_events.push(Event::GridConfigurationRejected { size, reason });
                return;
            }
            world.config.grid_size = size;
            world.config.edge_policy = edge_policy;
            out_events.push(Event::GridConfigured { size, edge_policy });
            world.reset_session(FoodPlacement::Opening, out_events);
            world.transition(GameState::NotStarted, out_events);
        }
        Command::Tick { dt } => {
            if world.state != GameState::Running {
                return;
            }
            world.tick_index = world.tick_index.saturating_add(1);
            world.elapsed = world.elapsed.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });
            world.step(out_events);
        }
        Command::RequestDirection { direction } => {
            world.request_direction(direction, out_events);
        }
        Command::Pause => {
            if world.state == GameState::Running {
                world.transition(GameState::Paused, out_events);
            } else {
                world.ignore(TransitionRequest::Pause, out_events);
            }
        }
        Command::Resume => {
            if world.state == GameState::Paused && !world.interstitial_pending {
                world.transition(GameState::Running, out_events);
            } else {
                world.ignore(TransitionRequest::Resume, out_events);
            }
        }
        Command::Restart => {
            if world.state != GameState::Over {
                world.ignore(TransitionRequest::Restart, out_events);
                return;
            }
            out_events.push(Event::GameRestarted);
            world.reset_session(FoodPlacement::Random, out_events);
            world.transition(GameState::Running, out_events);
        }
        Command::PlaceFood { position } => {
            let reason = if !world.config.grid_size.contains(position) {
                Some(PlacementError::OutOfBounds)
            } else if world.occupancy.is_occupied(position) {
                Some(PlacementError::Occupied)
            } else {
                None
            };

            match reason {
                Some(reason) => {
                    trace!(?position, ?reason, "food placement rejected");
                    out_events.push(Event::FoodPlacementRejected { position, reason });
                }
                None => {
                    world.food = Some(position);
                    out_events.push(Event::FoodPlaced { position });
                }
            }
        }
        Command::TriggerMilestone => {
            if world.state != GameState::Running || world.milestone_fired {
                world.ignore(TransitionRequest::TriggerMilestone, out_events);
                return;
            }
            world.milestone_fired = true;
            world.interstitial_pending = true;
            debug!(score = world.score, "milestone reached");
            out_events.push(Event::MilestoneReached { score: world.score });
            world.transition(GameState::Paused, out_events);
        }
        Command::AcknowledgeMilestone => {
            if !world.interstitial_pending {
                world.ignore(TransitionRequest::AcknowledgeMilestone, out_events);
                return;
            }
            world.interstitial_pending = false;
            out_events.push(Event::MilestoneAcknowledged);
            if world.state == GameState::Paused {
                world.transition(GameState::Running, out_events);
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use grid_snake_core::{
        Direction, EdgePolicy, GameSnapshot, GameState, GridSize, Position,
    };

    use super::World;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Captures an immutable snapshot of the session for systems and renderers.
    #[must_use]
    pub fn snapshot(world: &World) -> GameSnapshot {
        GameSnapshot {
            segments: world.snake.iter().copied().collect(),
            food: world.food,
            score: world.score,
            state: world.state,
            direction: world.direction,
            pending_direction: world.pending_direction,
            elapsed: world.elapsed,
            tick_index: world.tick_index,
            grid_size: world.config.grid_size,
            edge_policy: world.config.edge_policy,
            interstitial_pending: world.interstitial_pending,
        }
    }

    /// Lifecycle state of the current session.
    #[must_use]
    pub fn state(world: &World) -> GameState {
        world.state
    }

    /// Number of food items eaten during the current session.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.score
    }

    /// Cell holding the food, if any.
    #[must_use]
    pub fn food(world: &World) -> Option<Position> {
        world.food
    }

    /// Cell occupied by the snake's head.
    #[must_use]
    pub fn head(world: &World) -> Option<Position> {
        world.snake.front().copied()
    }

    /// Snake segments ordered from head to tail.
    #[must_use]
    pub fn segments(world: &World) -> Vec<Position> {
        world.snake.iter().copied().collect()
    }

    /// Heading applied on the most recent tick.
    #[must_use]
    pub fn direction(world: &World) -> Direction {
        world.direction
    }

    /// Number of cells along each side of the grid.
    #[must_use]
    pub fn grid_size(world: &World) -> GridSize {
        world.config.grid_size
    }

    /// Edge policy in effect.
    #[must_use]
    pub fn edge_policy(world: &World) -> EdgePolicy {
        world.config.edge_policy
    }

    /// Enumerates the cells not covered by the snake in row-major order.
    #[must_use]
    pub fn free_cells(world: &World) -> Vec<Position> {
        world.occupancy.free_cells()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FoodPlacement {
    Opening,
    Random,
}

#[derive(Clone, Debug)]
struct OccupancyGrid {
    size: GridSize,
    cells: Vec<bool>,
}

impl OccupancyGrid {
    fn new(size: GridSize) -> Self {
        Self {
            size,
            cells: vec![false; size.cell_count()],
        }
    }

    fn fill_with(&mut self, segments: &VecDeque<Position>) {
        self.cells.fill(false);
        for segment in segments {
            self.occupy(*segment);
        }
    }

    fn is_occupied(&self, cell: Position) -> bool {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
            .unwrap_or(false)
    }

    fn occupy(&mut self, cell: Position) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.cells.get_mut(index) {
                *slot = true;
            }
        }
    }

    fn vacate(&mut self, cell: Position) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.cells.get_mut(index) {
                *slot = false;
            }
        }
    }

    fn free_cells(&self) -> Vec<Position> {
        self.size
            .positions()
            .filter(|cell| !self.is_occupied(*cell))
            .collect()
    }

    fn index(&self, cell: Position) -> Option<usize> {
        if self.size.contains(cell) {
            let row = usize::try_from(cell.y()).ok()?;
            let column = usize::try_from(cell.x()).ok()?;
            let width = usize::try_from(self.size.get()).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: Duration = Duration::from_millis(150);

    fn running_world(segments: &[Position], direction: Direction, food: Position) -> World {
        let mut world = World::default();
        world.snake = segments.iter().copied().collect();
        world.occupancy.fill_with(&world.snake);
        world.direction = direction;
        world.food = Some(food);
        world.state = GameState::Running;
        world
    }

    #[test]
    fn opening_layout_matches_defaults() {
        let world = World::default();
        assert_eq!(query::segments(&world), vec![Position::new(10, 10)]);
        assert_eq!(query::food(&world), Some(Position::new(15, 15)));
        assert_eq!(query::direction(&world), Direction::Right);
        assert_eq!(query::state(&world), GameState::NotStarted);
        assert_eq!(query::welcome_banner(&world), WELCOME_BANNER);
    }

    #[test]
    fn config_clamps_unsupported_grid_sizes() {
        let tiny = Config::new(GridSize::new(0), EdgePolicy::Wrap, 1);
        assert_eq!(tiny.grid_size(), GridSize::MIN);
        let huge = Config::new(GridSize::new(u32::MAX), EdgePolicy::Wall, 1);
        assert_eq!(huge.grid_size(), GridSize::MAX);

        let world = World::new(tiny);
        assert_eq!(query::grid_size(&world), GridSize::MIN);
        assert_eq!(query::segments(&world), vec![Position::new(1, 1)]);
    }

    #[test]
    fn turning_into_tail_leaves_snake_untouched() {
        let segments = [
            Position::new(5, 5),
            Position::new(6, 5),
            Position::new(6, 6),
            Position::new(5, 6),
        ];
        // Food sits under the tail so a food check would be observable.
        let mut world = running_world(&segments, Direction::Left, Position::new(5, 6));
        world.pending_direction = Some(Direction::Down);
        let mut events = Vec::new();

        apply(&mut world, Command::Tick { dt: TICK }, &mut events);

        assert_eq!(query::state(&world), GameState::Over);
        assert_eq!(query::segments(&world), segments.to_vec());
        assert_eq!(query::score(&world), 0, "food is not checked on collision");
        assert!(events.contains(&Event::GameOver {
            score: 0,
            reason: GameOverReason::SelfCollision,
        }));
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::SnakeAdvanced { .. })));
    }

    #[test]
    fn stale_reversal_in_queue_is_discarded_on_tick() {
        let segments = [Position::new(4, 4), Position::new(3, 4)];
        let mut world = running_world(&segments, Direction::Right, Position::new(0, 0));
        world.pending_direction = Some(Direction::Left);
        let mut events = Vec::new();

        apply(&mut world, Command::Tick { dt: TICK }, &mut events);

        assert_eq!(query::direction(&world), Direction::Right);
        assert_eq!(query::head(&world), Some(Position::new(5, 4)));
        assert!(events.contains(&Event::DirectionRejected {
            requested: Direction::Left,
            reason: DirectionRejection::Reversal,
        }));
    }

    #[test]
    fn filling_the_grid_exhausts_food() {
        let mut world = World::new(Config::new(GridSize::new(2), EdgePolicy::Wrap, 7));
        world.snake = [Position::new(1, 0), Position::new(0, 0), Position::new(0, 1)]
            .into_iter()
            .collect();
        world.occupancy.fill_with(&world.snake);
        world.direction = Direction::Down;
        world.food = Some(Position::new(1, 1));
        world.state = GameState::Running;
        let mut events = Vec::new();

        apply(&mut world, Command::Tick { dt: TICK }, &mut events);

        assert_eq!(query::segments(&world).len(), 4);
        assert_eq!(query::food(&world), None);
        assert!(events.contains(&Event::FoodExhausted));
    }

    #[test]
    fn occupancy_tracks_moving_snake() {
        let mut world = running_world(&[Position::new(1, 1)], Direction::Right, Position::new(9, 9));
        let mut events = Vec::new();

        apply(&mut world, Command::Tick { dt: TICK }, &mut events);

        assert!(world.occupancy.is_occupied(Position::new(2, 1)));
        assert!(!world.occupancy.is_occupied(Position::new(1, 1)));
        assert_eq!(query::free_cells(&world).len(), 399);
    }

    #[test]
    fn occupancy_ignores_out_of_bounds_cells() {
        let mut grid = OccupancyGrid::new(GridSize::new(3));
        grid.occupy(Position::new(3, 0));
        grid.vacate(Position::new(0, 7));
        assert!(!grid.is_occupied(Position::new(3, 0)));
        assert_eq!(grid.free_cells().len(), 9);
    }
}
