#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Grid Snake.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.

use anyhow::Result;
use glam::Vec2;
use grid_snake_core::{Direction, Position};
use grid_snake_rendering::{
    Color, FrameInput, GridPresentation, Overlay, Presentation, RenderingBackend, Scene,
};
use macroquad::input::{is_key_pressed, is_mouse_button_pressed, KeyCode, MouseButton};
use std::time::Duration;
use tracing::info;

/// Tracks clicks on the overlay so they are merged with keyboard input on the next frame.
#[doc(hidden)]
#[derive(Clone, Copy, Debug, Default)]
pub struct OverlayInputState {
    acknowledge_latched: bool,
}

impl OverlayInputState {
    /// Builds the frame input from the keys pressed this frame and any click
    /// latched on the previous one.
    ///
    /// Returns `None` when `Q` or `Escape` asks to leave the game loop.
    pub fn frame_input(&mut self, pressed: impl Fn(KeyCode) -> bool) -> Option<FrameInput> {
        let keyboard = KeyboardShortcuts::from_pressed(pressed);
        let clicked = self.take_acknowledge();
        if keyboard.quit_requested {
            return None;
        }
        Some(keyboard.frame_input(clicked))
    }

    fn take_acknowledge(&mut self) -> bool {
        let latched = self.acknowledge_latched;
        self.acknowledge_latched = false;
        latched
    }

    /// Records that the interstitial was clicked this frame.
    pub fn register_acknowledge(&mut self) {
        self.acknowledge_latched = true;
    }
}

/// Snapshot of edge-triggered keys observed during a single frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct KeyboardShortcuts {
    /// `Q` or `Escape` to quit the game loop.
    quit_requested: bool,
    /// Arrow keys or `WASD`; the last key in `Up, Down, Left, Right` order wins.
    direction: Option<Direction>,
    /// `R` or `Enter`.
    restart: bool,
    /// `Enter` or `Space`.
    acknowledge: bool,
    /// `P`.
    pause_toggle: bool,
}

const STEERING_KEYS: [(KeyCode, KeyCode, Direction); 4] = [
    (KeyCode::Up, KeyCode::W, Direction::Up),
    (KeyCode::Down, KeyCode::S, Direction::Down),
    (KeyCode::Left, KeyCode::A, Direction::Left),
    (KeyCode::Right, KeyCode::D, Direction::Right),
];

impl KeyboardShortcuts {
    fn from_pressed(pressed: impl Fn(KeyCode) -> bool) -> Self {
        let direction = STEERING_KEYS
            .iter()
            .filter(|(arrow, letter, _)| pressed(*arrow) || pressed(*letter))
            .map(|(_, _, direction)| *direction)
            .last();
        let enter = pressed(KeyCode::Enter);

        Self {
            quit_requested: pressed(KeyCode::Escape) || pressed(KeyCode::Q),
            direction,
            restart: pressed(KeyCode::R) || enter,
            acknowledge: enter || pressed(KeyCode::Space),
            pause_toggle: pressed(KeyCode::P),
        }
    }

    fn frame_input(self, clicked: bool) -> FrameInput {
        FrameInput {
            direction: self.direction,
            restart: self.restart,
            acknowledge: self.acknowledge || clicked,
            pause_toggle: self.pause_toggle,
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs frames-per-second once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
}

impl FpsCounter {
    /// Records a rendered frame and returns the average once a second has elapsed.
    fn record_frame(&mut self, frame: Duration) -> Option<f32> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let per_second = self.frames as f32 / self.elapsed.as_secs_f32();
        self.elapsed = Duration::ZERO;
        self.frames = 0;
        Some(per_second)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: 720,
            window_height: 800,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();
            let mut overlay_input = OverlayInputState::default();

            loop {
                let Some(input) = overlay_input.frame_input(is_key_pressed) else {
                    break;
                };

                macroquad::window::clear_background(background);

                let screen_width = macroquad::window::screen_width();
                let screen_height = macroquad::window::screen_height();

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                update_scene(frame_dt, input, &mut scene);

                let metrics = SceneMetrics::from_scene(&scene, screen_width, screen_height);
                draw_field(&scene, &metrics);
                draw_food(&scene, &metrics);
                draw_snake(&scene, &metrics);
                draw_hud(&scene, &metrics);
                draw_overlay(&scene, &metrics);

                if scene.overlay == Overlay::Interstitial
                    && is_mouse_button_pressed(MouseButton::Left)
                {
                    overlay_input.register_acknowledge();
                }

                if show_fps {
                    if let Some(per_second) = fps_counter.record_frame(frame_dt) {
                        info!(fps = per_second, "frame rate");
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

#[derive(Clone, Copy, Debug)]
struct SceneMetrics {
    scale: f32,
    offset_x: f32,
    offset_y: f32,
    grid_offset_y: f32,
    grid_side_scaled: f32,
    cell_step: f32,
}

impl SceneMetrics {
    fn from_scene(scene: &Scene, screen_width: f32, screen_height: f32) -> Self {
        let grid = scene.grid;
        let world_width = grid.width();
        let world_height = scene.total_height();
        let scale = if world_width <= f32::EPSILON || world_height <= f32::EPSILON {
            1.0
        } else {
            (screen_width / world_width).min(screen_height / world_height)
        };

        let scaled_width = world_width * scale;
        let scaled_height = world_height * scale;
        let offset_x = ((screen_width - scaled_width) * 0.5).max(0.0);
        let offset_y = ((screen_height - scaled_height) * 0.5).max(0.0);
        let cell_step = grid.cell_length * scale;
        let grid_offset_y = offset_y + GridPresentation::HUD_CELL_LAYERS as f32 * cell_step;

        Self {
            scale,
            offset_x,
            offset_y,
            grid_offset_y,
            grid_side_scaled: grid.width() * scale,
            cell_step,
        }
    }

    fn cell_origin(&self, grid: &GridPresentation, position: Position) -> Vec2 {
        let origin = grid.cell_origin(position) * self.scale;
        Vec2::new(self.offset_x + origin.x, self.grid_offset_y + origin.y)
    }

    fn grid_center(&self) -> Vec2 {
        Vec2::new(
            self.offset_x + self.grid_side_scaled * 0.5,
            self.grid_offset_y + self.grid_side_scaled * 0.5,
        )
    }
}

fn draw_field(scene: &Scene, metrics: &SceneMetrics) {
    let side = metrics.grid_side_scaled;
    let left = metrics.offset_x;
    let top = metrics.grid_offset_y;
    macroquad::shapes::draw_rectangle(left, top, side, side, to_macroquad_color(scene.palette.field));

    let line_color = to_macroquad_color(scene.palette.grid_line);
    for index in 0..=scene.grid.size {
        let step = index as f32 * metrics.cell_step;
        macroquad::shapes::draw_line(left + step, top, left + step, top + side, 1.0, line_color);
        macroquad::shapes::draw_line(left, top + step, left + side, top + step, 1.0, line_color);
    }

    if !scene.grid.wraps {
        let wall = to_macroquad_color(scene.palette.text);
        macroquad::shapes::draw_rectangle_lines(left, top, side, side, 4.0, wall);
    }
}

fn draw_food(scene: &Scene, metrics: &SceneMetrics) {
    let Some(food) = scene.food else {
        return;
    };
    let origin = metrics.cell_origin(&scene.grid, food);
    let radius = metrics.cell_step * 0.4;
    macroquad::shapes::draw_circle(
        origin.x + metrics.cell_step * 0.5,
        origin.y + metrics.cell_step * 0.5,
        radius,
        to_macroquad_color(scene.palette.food),
    );
}

fn draw_snake(scene: &Scene, metrics: &SceneMetrics) {
    let inset = metrics.cell_step * 0.05;
    let side = (metrics.cell_step - 2.0 * inset).max(0.0);
    let body = to_macroquad_color(scene.palette.snake_body);
    let head = to_macroquad_color(scene.palette.snake_head);

    // Tail first so the head stays on top.
    for cell in scene.snake.iter().rev() {
        let origin = metrics.cell_origin(&scene.grid, cell.position);
        let color = if cell.head { head } else { body };
        macroquad::shapes::draw_rectangle(origin.x + inset, origin.y + inset, side, side, color);
    }
}

fn draw_hud(scene: &Scene, metrics: &SceneMetrics) {
    let font_size = (metrics.cell_step * 0.9).max(12.0);
    let baseline = metrics.offset_y + metrics.cell_step * 1.3;
    let color = scene.palette.text;
    draw_label(
        &format!("Score: {}", scene.hud.score),
        metrics.offset_x + metrics.cell_step * 0.5,
        baseline,
        font_size,
        color,
    );

    let time = format!("Time: {}", scene.hud.play_time);
    let width = text_width(&time, font_size);
    draw_label(
        &time,
        metrics.offset_x + metrics.grid_side_scaled - width - metrics.cell_step * 0.5,
        baseline,
        font_size,
        color,
    );
}

fn draw_overlay(scene: &Scene, metrics: &SceneMetrics) {
    let lines = scene.overlay.lines();
    if lines.is_empty() {
        return;
    }

    let side = metrics.grid_side_scaled;
    macroquad::shapes::draw_rectangle(
        metrics.offset_x,
        metrics.grid_offset_y,
        side,
        side,
        to_macroquad_color(scene.palette.shade),
    );

    let center = metrics.grid_center();
    let headline_size = (metrics.cell_step * 1.6).max(20.0);
    let detail_size = (metrics.cell_step * 0.8).max(12.0);
    let line_gap = headline_size * 1.2;
    let mut baseline = center.y - line_gap * (lines.len() as f32 - 1.0) * 0.5;

    for (index, line) in lines.iter().enumerate() {
        let font_size = if index == 0 { headline_size } else { detail_size };
        let width = text_width(line, font_size);
        draw_label(line, center.x - width * 0.5, baseline, font_size, scene.palette.text);
        baseline += line_gap;
    }
}

fn draw_label(text: &str, x: f32, y: f32, font_size: f32, color: Color) {
    let _ = macroquad::text::draw_text(text, x, y, font_size, to_macroquad_color(color));
}

fn text_width(text: &str, font_size: f32) -> f32 {
    macroquad::text::measure_text(text, None, font_size.round() as u16, 1.0).width
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_snake_core::GridSize;
    use grid_snake_rendering::Palette;

    fn scene(size: u32) -> Scene {
        let grid = GridPresentation::new(GridSize::new(size), 16.0, true).expect("valid grid");
        Scene::new(grid, Palette::default())
    }

    #[test]
    fn keyboard_maps_arrows_and_letters() {
        let shortcuts = KeyboardShortcuts::from_pressed(|key| key == KeyCode::A);
        assert_eq!(shortcuts.direction, Some(Direction::Left));

        let shortcuts = KeyboardShortcuts::from_pressed(|key| key == KeyCode::Up);
        assert_eq!(shortcuts.direction, Some(Direction::Up));

        let shortcuts =
            KeyboardShortcuts::from_pressed(|key| key == KeyCode::Up || key == KeyCode::D);
        assert_eq!(shortcuts.direction, Some(Direction::Right));
    }

    #[test]
    fn enter_restarts_and_acknowledges() {
        let shortcuts = KeyboardShortcuts::from_pressed(|key| key == KeyCode::Enter);
        assert!(shortcuts.restart);
        assert!(shortcuts.acknowledge);
        assert!(!shortcuts.quit_requested);

        let space = KeyboardShortcuts::from_pressed(|key| key == KeyCode::Space);
        assert!(space.acknowledge);
        assert!(!space.restart);
    }

    #[test]
    fn quit_and_pause_keys() {
        assert!(KeyboardShortcuts::from_pressed(|key| key == KeyCode::Q).quit_requested);
        assert!(KeyboardShortcuts::from_pressed(|key| key == KeyCode::Escape).quit_requested);
        assert!(KeyboardShortcuts::from_pressed(|key| key == KeyCode::P).pause_toggle);
    }

    #[test]
    fn click_becomes_acknowledgement() {
        let input = KeyboardShortcuts::default().frame_input(true);
        assert!(input.acknowledge);
        assert!(KeyboardShortcuts::default().frame_input(false).is_idle());
    }

    #[test]
    fn scene_metrics_fit_grid_and_hud() {
        let scene = scene(10);
        let metrics = SceneMetrics::from_scene(&scene, 400.0, 600.0);

        assert!((metrics.grid_side_scaled - 400.0).abs() <= 1e-4);
        let total = metrics.grid_side_scaled
            + GridPresentation::HUD_CELL_LAYERS as f32 * metrics.cell_step;
        assert!(total <= 600.0 + 1e-4);
        assert!((metrics.offset_y * 2.0 + total - 600.0).abs() <= 1e-4);
    }

    #[test]
    fn cell_origin_offsets_below_hud() {
        let scene = scene(4);
        let metrics = SceneMetrics::from_scene(&scene, 64.0, 96.0);
        let origin = metrics.cell_origin(&scene.grid, Position::new(1, 0));

        assert!((origin.x - 16.0).abs() <= 1e-4);
        assert!((origin.y - 32.0).abs() <= 1e-4);
    }

    #[test]
    fn fps_counter_reports_once_per_second() {
        let mut counter = FpsCounter::default();
        for _ in 0..59 {
            assert!(counter.record_frame(Duration::from_millis(16)).is_none());
        }
        let fps = counter
            .record_frame(Duration::from_millis(100))
            .expect("a second has elapsed");
        assert!(fps > 50.0 && fps < 70.0);
    }
}
