#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Grid Snake engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Grid Snake.";

/// Side length of the grid used when no explicit size is configured.
pub const DEFAULT_GRID_SIZE: GridSize = GridSize::new(20);

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Rebuilds the session on a square grid using the provided edge policy.
    ConfigureGrid {
        /// Number of cells along each side of the grid.
        size: GridSize,
        /// Behaviour applied when the snake crosses the grid boundary.
        edge_policy: EdgePolicy,
    },
    /// Advances the simulation by a single step.
    Tick {
        /// Duration of simulated time covered by the step.
        dt: Duration,
    },
    /// Requests that the snake turn on the next tick.
    RequestDirection {
        /// Heading the snake should adopt.
        direction: Direction,
    },
    /// Suspends a running game.
    Pause,
    /// Resumes a paused game unless an interstitial awaits acknowledgement.
    Resume,
    /// Starts a fresh session after the game ended.
    Restart,
    /// Places the food at an explicit cell.
    PlaceFood {
        /// Cell that should hold the food.
        position: Position,
    },
    /// Signals that the score milestone was reached and the interstitial should open.
    TriggerMilestone,
    /// Confirms that the interstitial was dismissed so play may continue.
    AcknowledgeMilestone,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// Confirms that the grid was rebuilt with a new configuration.
    GridConfigured {
        /// Number of cells along each side of the grid.
        size: GridSize,
        /// Edge policy now in effect.
        edge_policy: EdgePolicy,
    },
    /// Reports that a grid reconfiguration was rejected and the session kept.
    GridConfigurationRejected {
        /// Size that was requested.
        size: GridSize,
        /// Specific reason the size was refused.
        reason: GridSizeError,
    },
    /// Indicates that simulated play time advanced.
    TimeAdvanced {
        /// Duration of simulated time covered by the tick.
        dt: Duration,
    },
    /// Announces that the simulation moved between lifecycle states.
    StateChanged {
        /// State held before processing the command.
        from: GameState,
        /// State held after processing the command.
        to: GameState,
    },
    /// Confirms that a direction request was stored for the next tick.
    DirectionQueued {
        /// Heading waiting to be adopted.
        direction: Direction,
    },
    /// Reports that a direction request was discarded.
    DirectionRejected {
        /// Heading that was requested.
        requested: Direction,
        /// Specific reason the request was discarded.
        reason: DirectionRejection,
    },
    /// Confirms that a queued heading became the current heading.
    DirectionChanged {
        /// Heading held before the tick.
        from: Direction,
        /// Heading adopted for the tick.
        to: Direction,
    },
    /// Confirms that the snake's head moved by one cell.
    SnakeAdvanced {
        /// Cell the head occupied before moving.
        from: Position,
        /// Cell the head occupies after moving.
        to: Position,
        /// Whether the snake kept its tail because it ate.
        grew: bool,
    },
    /// Confirms that the snake ate the food.
    FoodEaten {
        /// Cell that held the food.
        position: Position,
        /// Score after counting the food.
        score: u32,
    },
    /// Confirms that food now sits at the provided cell.
    FoodPlaced {
        /// Cell holding the food.
        position: Position,
    },
    /// Reports that no free cell remains to hold food.
    FoodExhausted,
    /// Reports that an explicit food placement was rejected.
    FoodPlacementRejected {
        /// Cell requested for the food.
        position: Position,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Announces that the session ended.
    GameOver {
        /// Final score of the session.
        score: u32,
        /// Collision that ended the session.
        reason: GameOverReason,
    },
    /// Announces that the score milestone was reached; emitted once per session.
    MilestoneReached {
        /// Score at which the milestone fired.
        score: u32,
    },
    /// Confirms that the interstitial was dismissed.
    MilestoneAcknowledged,
    /// Confirms that a fresh session replaced a finished one.
    GameRestarted,
    /// Reports that a lifecycle command had no effect in the current state.
    TransitionIgnored {
        /// Lifecycle command that was ignored.
        request: TransitionRequest,
        /// State the world held when the command arrived.
        state: GameState,
    },
}

/// Lifecycle states of a game session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameState {
    /// Waiting for the first directional input.
    NotStarted,
    /// Ticks advance the snake.
    Running,
    /// Ticks are suspended until resumed.
    Paused,
    /// The session ended; only a restart leaves this state.
    Over,
}

/// Behaviour applied when the snake's head leaves the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgePolicy {
    /// Crossing an edge re-enters the grid on the opposite side.
    #[default]
    Wrap,
    /// Crossing an edge ends the game.
    Wall,
}

impl EdgePolicy {
    /// Computes the cell reached by moving one step from `from`.
    ///
    /// Returns `None` when the step leaves the grid under [`EdgePolicy::Wall`]
    /// or when the grid has no cells.
    #[must_use]
    pub fn advance(self, from: Position, direction: Direction, size: GridSize) -> Option<Position> {
        let side = i64::from(size.get());
        if side == 0 {
            return None;
        }

        let (dx, dy) = direction.offset();
        let x = i64::from(from.x()) + i64::from(dx);
        let y = i64::from(from.y()) + i64::from(dy);

        let (x, y) = match self {
            Self::Wrap => (x.rem_euclid(side), y.rem_euclid(side)),
            Self::Wall => {
                if !(0..side).contains(&x) || !(0..side).contains(&y) {
                    return None;
                }
                (x, y)
            }
        };

        Some(Position::new(
            u32::try_from(x).ok()?,
            u32::try_from(y).ok()?,
        ))
    }
}

/// Collision that ended a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOverReason {
    /// The head ran into the snake's own body.
    SelfCollision,
    /// The head left the grid while walls were enabled.
    Wall,
}

/// Reasons a direction request may be discarded by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DirectionRejection {
    /// The request would turn the moving snake back onto itself.
    Reversal,
    /// The game is paused or over, so steering is disabled.
    Inactive,
}

/// Reasons an explicit food placement may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The requested cell lies outside the grid.
    OutOfBounds,
    /// The requested cell is covered by the snake.
    Occupied,
}

/// Reasons a grid size falls outside the supported range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GridSizeError {
    /// Fewer than [`GridSize::MIN`] cells per side.
    TooSmall,
    /// More than [`GridSize::MAX`] cells per side.
    TooLarge,
}

/// Lifecycle commands that may be ignored by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionRequest {
    /// A [`Command::Pause`] request.
    Pause,
    /// A [`Command::Resume`] request.
    Resume,
    /// A [`Command::Restart`] request.
    Restart,
    /// A [`Command::TriggerMilestone`] request.
    TriggerMilestone,
    /// A [`Command::AcknowledgeMilestone`] request.
    AcknowledgeMilestone,
}

/// Cardinal headings available to the snake.
///
/// Rows grow downward, matching screen coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

impl Direction {
    /// Every heading in a fixed order.
    pub const ALL: [Direction; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// Unit offset applied to a position when stepping in this direction.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// Heading pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Reports whether `other` is the exact reverse of this heading.
    #[must_use]
    pub fn is_opposite(self, other: Direction) -> bool {
        self.opposite() == other
    }
}

/// Number of cells along each side of the square grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridSize(u32);

impl GridSize {
    /// Smallest grid the world accepts.
    pub const MIN: Self = Self(2);

    /// Largest grid the world accepts.
    pub const MAX: Self = Self(256);

    /// Creates a new grid size wrapper.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Checks that the size lies within [`GridSize::MIN`] and [`GridSize::MAX`].
    pub const fn validate(self) -> Result<Self, GridSizeError> {
        if self.0 < Self::MIN.0 {
            Err(GridSizeError::TooSmall)
        } else if self.0 > Self::MAX.0 {
            Err(GridSizeError::TooLarge)
        } else {
            Ok(self)
        }
    }

    /// Nearest size the world accepts.
    #[must_use]
    pub const fn clamped(self) -> Self {
        match self.validate() {
            Ok(size) => size,
            Err(GridSizeError::TooSmall) => Self::MIN,
            Err(GridSizeError::TooLarge) => Self::MAX,
        }
    }

    /// Retrieves the side length in cells.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Total number of cells contained in the grid.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let cells = u64::from(self.0) * u64::from(self.0);
        usize::try_from(cells).unwrap_or(usize::MAX)
    }

    /// Reports whether the position lies inside the grid.
    #[must_use]
    pub const fn contains(&self, position: Position) -> bool {
        position.x < self.0 && position.y < self.0
    }

    /// Central cell of the grid, rounding toward the origin on odd sizes.
    #[must_use]
    pub const fn center(&self) -> Position {
        Position::new(self.0 / 2, self.0 / 2)
    }

    /// Iterates over every cell in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let side = self.0;
        (0..side).flat_map(move |y| (0..side).map(move |x| Position::new(x, y)))
    }
}

impl Default for GridSize {
    fn default() -> Self {
        DEFAULT_GRID_SIZE
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    x: u32,
    y: u32,
}

impl Position {
    /// Creates a new grid position.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }
}

/// Immutable representation of a session's state used for queries and rendering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Snake segments ordered from head to tail.
    pub segments: Vec<Position>,
    /// Cell holding the food, absent once the snake fills the grid.
    pub food: Option<Position>,
    /// Number of food items eaten during the session.
    pub score: u32,
    /// Lifecycle state of the session.
    pub state: GameState,
    /// Heading applied on the most recent tick.
    pub direction: Direction,
    /// Heading queued for the next tick, if any.
    pub pending_direction: Option<Direction>,
    /// Simulated time spent running during the session.
    pub elapsed: Duration,
    /// Number of ticks processed while running.
    pub tick_index: u64,
    /// Number of cells along each side of the grid.
    pub grid_size: GridSize,
    /// Edge policy in effect.
    pub edge_policy: EdgePolicy,
    /// Whether the interstitial is open and awaits acknowledgement.
    pub interstitial_pending: bool,
}

impl GameSnapshot {
    /// Cell occupied by the snake's head.
    #[must_use]
    pub fn head(&self) -> Option<Position> {
        self.segments.first().copied()
    }

    /// Number of segments composing the snake.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Reports whether the snapshot holds no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Reports whether a snake segment covers the provided cell.
    #[must_use]
    pub fn occupies(&self, position: Position) -> bool {
        self.segments.contains(&position)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{
        Direction, EdgePolicy, GameSnapshot, GameState, GridSize, GridSizeError, Position,
        DEFAULT_GRID_SIZE,
    };

    #[test]
    fn opposite_directions_pair_up() {
        for direction in Direction::ALL {
            assert!(direction.is_opposite(direction.opposite()));
            assert!(!direction.is_opposite(direction));
            assert_eq!(direction.opposite().opposite(), direction);
        }
        assert!(!Direction::Up.is_opposite(Direction::Left));
    }

    #[test]
    fn wrap_policy_reenters_on_opposite_edge() {
        let size = GridSize::new(20);
        assert_eq!(
            EdgePolicy::Wrap.advance(Position::new(19, 4), Direction::Right, size),
            Some(Position::new(0, 4))
        );
        assert_eq!(
            EdgePolicy::Wrap.advance(Position::new(3, 0), Direction::Up, size),
            Some(Position::new(3, 19))
        );
        assert_eq!(
            EdgePolicy::Wrap.advance(Position::new(0, 7), Direction::Left, size),
            Some(Position::new(19, 7))
        );
    }

    #[test]
    fn wall_policy_rejects_out_of_bounds_steps() {
        let size = GridSize::new(5);
        assert_eq!(
            EdgePolicy::Wall.advance(Position::new(4, 2), Direction::Right, size),
            None
        );
        assert_eq!(
            EdgePolicy::Wall.advance(Position::new(2, 0), Direction::Up, size),
            None
        );
        assert_eq!(
            EdgePolicy::Wall.advance(Position::new(2, 2), Direction::Down, size),
            Some(Position::new(2, 3))
        );
    }

    #[test]
    fn empty_grid_has_no_reachable_cells() {
        let size = GridSize::new(0);
        assert_eq!(
            EdgePolicy::Wrap.advance(Position::new(0, 0), Direction::Down, size),
            None
        );
        assert_eq!(size.positions().count(), 0);
    }

    #[test]
    fn grid_size_bounds_are_enforced() {
        assert_eq!(GridSize::new(0).validate(), Err(GridSizeError::TooSmall));
        assert_eq!(GridSize::new(1).validate(), Err(GridSizeError::TooSmall));
        assert_eq!(GridSize::MIN.validate(), Ok(GridSize::MIN));
        assert_eq!(GridSize::MAX.validate(), Ok(GridSize::MAX));
        assert_eq!(
            GridSize::new(u32::MAX).validate(),
            Err(GridSizeError::TooLarge)
        );
        assert_eq!(DEFAULT_GRID_SIZE.validate(), Ok(DEFAULT_GRID_SIZE));

        assert_eq!(GridSize::new(0).clamped(), GridSize::MIN);
        assert_eq!(GridSize::new(u32::MAX).clamped(), GridSize::MAX);
        assert_eq!(GridSize::new(7).clamped(), GridSize::new(7));
    }

    #[test]
    fn grid_enumerates_cells_in_row_major_order() {
        let cells: Vec<Position> = GridSize::new(2).positions().collect();
        assert_eq!(
            cells,
            vec![
                Position::new(0, 0),
                Position::new(1, 0),
                Position::new(0, 1),
                Position::new(1, 1),
            ]
        );
        assert_eq!(DEFAULT_GRID_SIZE.cell_count(), 400);
        assert_eq!(DEFAULT_GRID_SIZE.center(), Position::new(10, 10));
    }

    #[test]
    fn snapshot_round_trips_through_bincode() {
        let snapshot = GameSnapshot {
            segments: vec![Position::new(3, 4), Position::new(2, 4)],
            food: Some(Position::new(9, 9)),
            score: 1,
            state: GameState::Paused,
            direction: Direction::Right,
            pending_direction: Some(Direction::Up),
            elapsed: Duration::from_millis(1_350),
            tick_index: 9,
            grid_size: GridSize::new(12),
            edge_policy: EdgePolicy::Wall,
            interstitial_pending: true,
        };

        let bytes = bincode::serialize(&snapshot).expect("serialize");
        let restored: GameSnapshot = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, snapshot);
        assert_eq!(restored.head(), Some(Position::new(3, 4)));
        assert!(restored.occupies(Position::new(2, 4)));
    }
}
