#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Grid Snake adapters.

use anyhow::Result as AnyResult;
use glam::Vec2;
use grid_snake_core::{Direction, EdgePolicy, GameSnapshot, GameState, GridSize, Position};
use std::time::Duration;
use thiserror::Error;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }

    /// Returns the same color with a replaced alpha channel.
    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self { alpha, ..self }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Most recent steering key pressed on this frame.
    pub direction: Option<Direction>,
    /// Whether a restart was requested on this frame.
    pub restart: bool,
    /// Whether the interstitial was dismissed on this frame.
    pub acknowledge: bool,
    /// Whether pause was toggled on this frame.
    pub pause_toggle: bool,
}

impl FrameInput {
    /// Reports whether the frame carried no player intent.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}

/// Colors used for the play field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    /// Fill behind the playable cells.
    pub field: Color,
    /// Color used when drawing grid lines.
    pub grid_line: Color,
    /// Fill of body segments.
    pub snake_body: Color,
    /// Fill of the head segment.
    pub snake_head: Color,
    /// Fill of the food cell.
    pub food: Color,
    /// Color used for HUD and overlay text.
    pub text: Color,
    /// Translucent fill dimming the field behind overlays.
    pub shade: Color,
}

impl Default for Palette {
    fn default() -> Self {
        let snake_body = Color::from_rgb_u8(0x2f, 0x95, 0x32);
        Self {
            field: Color::from_rgb_u8(0x12, 0x12, 0x16),
            grid_line: Color::from_rgb_u8(0x2a, 0x2a, 0x33),
            snake_body,
            snake_head: snake_body.lighten(0.35),
            food: Color::from_rgb_u8(0xc8, 0x2a, 0x36),
            text: Color::from_rgb_u8(0xee, 0xee, 0xee),
            shade: Color::from_rgb_u8(0, 0, 0).with_alpha(0.6),
        }
    }
}

/// Describes the square cell grid rendered by adapters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridPresentation {
    /// Number of cells along each edge.
    pub size: u32,
    /// Side length of a single cell expressed in world units.
    pub cell_length: f32,
    /// Whether the snake wraps around the edges instead of hitting a wall.
    pub wraps: bool,
}

impl GridPresentation {
    /// Number of cell rows reserved above the grid for the HUD.
    pub const HUD_CELL_LAYERS: u32 = 2;

    /// Creates a new grid descriptor.
    ///
    /// Returns an error when the grid has no cells or the cell length is not a
    /// positive finite number.
    pub fn new(size: GridSize, cell_length: f32, wraps: bool) -> Result<Self, RenderingError> {
        if size.get() == 0 {
            return Err(RenderingError::EmptyGrid);
        }
        if !cell_length.is_finite() || cell_length <= 0.0 {
            return Err(RenderingError::InvalidCellLength { cell_length });
        }

        Ok(Self {
            size: size.get(),
            cell_length,
            wraps,
        })
    }

    /// Calculates the total width of the grid.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.size as f32 * self.cell_length
    }

    /// Calculates the total height of the grid.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.size as f32 * self.cell_length
    }

    /// Height of the grid including the HUD band above it.
    #[must_use]
    pub fn bordered_height(&self) -> f32 {
        self.height() + Self::HUD_CELL_LAYERS as f32 * self.cell_length
    }

    /// Top-left corner of a cell relative to the grid origin.
    #[must_use]
    pub fn cell_origin(&self, position: Position) -> Vec2 {
        Vec2::new(
            position.x() as f32 * self.cell_length,
            position.y() as f32 * self.cell_length,
        )
    }

    /// Center of a cell relative to the grid origin.
    #[must_use]
    pub fn cell_center(&self, position: Position) -> Vec2 {
        self.cell_origin(position) + Vec2::splat(self.cell_length * 0.5)
    }
}

/// Single snake segment positioned on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SnakeCellPresentation {
    /// Cell occupied by the segment.
    pub position: Position,
    /// Whether this segment is the head.
    pub head: bool,
}

impl SnakeCellPresentation {
    /// Creates a new segment descriptor.
    #[must_use]
    pub const fn new(position: Position, head: bool) -> Self {
        Self { position, head }
    }
}

/// Values shown in the heads-up display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HudPresentation {
    /// Score shown to the player, which may differ from the authoritative one.
    pub score: u64,
    /// Formatted play time.
    pub play_time: String,
    /// Lifecycle state of the session.
    pub state: GameState,
}

impl HudPresentation {
    /// Creates a new HUD descriptor.
    #[must_use]
    pub fn new<T>(score: u64, play_time: T, state: GameState) -> Self
    where
        T: Into<String>,
    {
        Self {
            score,
            play_time: play_time.into(),
            state,
        }
    }
}

impl Default for HudPresentation {
    fn default() -> Self {
        Self::new(0, "00:00", GameState::NotStarted)
    }
}

/// Message layered over the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Overlay {
    /// Nothing is drawn over the grid.
    #[default]
    None,
    /// Session has not started yet.
    Ready,
    /// Session is paused by the player.
    Paused,
    /// Milestone interstitial awaiting acknowledgement.
    Interstitial,
    /// Session ended.
    GameOver {
        /// Score shown to the player when the session ended.
        score: u64,
    },
}

impl Overlay {
    /// Derives the overlay matching a world snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &GameSnapshot, displayed_score: u64) -> Self {
        if snapshot.interstitial_pending {
            return Self::Interstitial;
        }
        match snapshot.state {
            GameState::NotStarted => Self::Ready,
            GameState::Running => Self::None,
            GameState::Paused => Self::Paused,
            GameState::Over => Self::GameOver {
                score: displayed_score,
            },
        }
    }

    /// Text lines drawn for the overlay, headline first.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        match self {
            Self::None => Vec::new(),
            Self::Ready => vec![
                "Grid Snake".to_owned(),
                "Press an arrow key to start".to_owned(),
            ],
            Self::Paused => vec!["Paused".to_owned(), "Press P to resume".to_owned()],
            Self::Interstitial => vec![
                "Milestone reached!".to_owned(),
                "Press Enter, Space or click to continue".to_owned(),
            ],
            Self::GameOver { score } => vec![
                "Game over".to_owned(),
                format!("Score: {score}"),
                "Press R or Enter to restart".to_owned(),
            ],
        }
    }
}

/// Scene description combining the grid, snake, food and HUD.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Grid that composes the play area.
    pub grid: GridPresentation,
    /// Colors used for the play area.
    pub palette: Palette,
    /// Snake segments ordered head first.
    pub snake: Vec<SnakeCellPresentation>,
    /// Food cell, if any.
    pub food: Option<Position>,
    /// Heads-up display values.
    pub hud: HudPresentation,
    /// Message drawn over the grid.
    pub overlay: Overlay,
}

impl Scene {
    /// Creates an empty scene for the provided grid.
    #[must_use]
    pub fn new(grid: GridPresentation, palette: Palette) -> Self {
        Self {
            grid,
            palette,
            snake: Vec::new(),
            food: None,
            hud: HudPresentation::default(),
            overlay: Overlay::None,
        }
    }

    /// Replaces the dynamic content of the scene with a world snapshot.
    ///
    /// Grid geometry is kept; adapters rebuild the scene when the grid is
    /// reconfigured.
    pub fn refresh(&mut self, snapshot: &GameSnapshot, hud: HudPresentation) {
        self.snake.clear();
        self.snake.extend(
            snapshot
                .segments
                .iter()
                .enumerate()
                .map(|(index, position)| SnakeCellPresentation::new(*position, index == 0)),
        );
        self.food = snapshot.food;
        self.overlay = Overlay::from_snapshot(snapshot, hud.score);
        self.grid.wraps = snapshot.edge_policy == EdgePolicy::Wrap;
        self.hud = hud;
    }

    /// Head segment, if the snake has one.
    #[must_use]
    pub fn head(&self) -> Option<SnakeCellPresentation> {
        self.snake.iter().copied().find(|cell| cell.head)
    }

    /// Height of the entire scene including the HUD band.
    #[must_use]
    pub fn total_height(&self) -> f32 {
        self.grid.bordered_height()
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Grid Snake scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// input captured by the adapter, and refreshes the scene before it is
    /// drawn.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, Error, PartialEq)]
pub enum RenderingError {
    /// The grid must contain at least one cell.
    #[error("grid must contain at least one cell")]
    EmptyGrid,
    /// Cells need a positive, finite side length.
    #[error("cell_length must be positive and finite (received {cell_length})")]
    InvalidCellLength {
        /// Provided length that failed validation.
        cell_length: f32,
    },
}
