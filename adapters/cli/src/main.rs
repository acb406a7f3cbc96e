#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Grid Snake experience.

mod config;
mod headless;
mod script;
mod simulation;

use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use grid_snake_core::EdgePolicy;
use grid_snake_rendering::{Color, GridPresentation, Palette, Presentation, RenderingBackend, Scene};
use grid_snake_rendering_macroquad::MacroquadBackend;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{
    config::{GameConfig, Overrides},
    headless::{HeadlessOptions, OutputFormat},
    simulation::Simulation,
};

const WINDOW_TITLE: &str = "Grid Snake";
const CELL_LENGTH: f32 = 32.0;

/// Classic snake on a square grid.
#[derive(Parser, Debug)]
#[command(name = "grid-snake")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of cells along each side of the grid
    #[arg(long)]
    grid_size: Option<u32>,

    /// Behaviour when the snake crosses the grid boundary
    #[arg(long, value_enum)]
    edge_policy: Option<EdgePolicyArg>,

    /// Milliseconds between simulation steps
    #[arg(long = "tick-ms")]
    tick_ms: Option<u64>,

    /// Seed for food placement and milestone draws
    #[arg(long)]
    seed: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Mode>,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Open a window and play (default)
    Play {
        /// Render as fast as possible instead of synchronising with the display
        #[arg(long)]
        no_vsync: bool,

        /// Log frames-per-second once per second
        #[arg(long)]
        show_fps: bool,
    },

    /// Replay an input script without a window and print the final board
    Simulate {
        /// Inline script, one symbol per step
        #[arg(long, conflicts_with = "script_file")]
        script: Option<String>,

        /// File containing the script
        #[arg(long)]
        script_file: Option<PathBuf>,

        /// Report encoding
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Pace steps in wall-clock time
        #[arg(long)]
        realtime: bool,

        /// Leave milestone interstitials open until the script acknowledges them
        #[arg(long)]
        hold_interstitial: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum EdgePolicyArg {
    /// Leaving one edge re-enters at the opposite edge
    Wrap,
    /// Leaving the grid ends the game
    Wall,
}

impl From<EdgePolicyArg> for EdgePolicy {
    fn from(arg: EdgePolicyArg) -> Self {
        match arg {
            EdgePolicyArg::Wrap => Self::Wrap,
            EdgePolicyArg::Wall => Self::Wall,
        }
    }
}

/// Entry point for the Grid Snake command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let overrides = Overrides {
        grid_size: cli.grid_size,
        edge_policy: cli.edge_policy.map(EdgePolicy::from),
        tick_interval_ms: cli.tick_ms,
        seed: cli.seed,
    };
    let config = GameConfig::load(cli.config.as_deref(), overrides)
        .context("failed to load game configuration")?;
    let seed = config.resolve_seed();
    info!(seed, grid_size = config.grid_size, edge_policy = ?config.edge_policy, "configuration resolved");

    match cli.command.unwrap_or(Mode::Play {
        no_vsync: false,
        show_fps: false,
    }) {
        Mode::Play { no_vsync, show_fps } => play(&config, seed, !no_vsync, show_fps),
        Mode::Simulate {
            script,
            script_file,
            format,
            realtime,
            hold_interstitial,
        } => {
            let source = match (script, script_file) {
                (Some(script), _) => script,
                (None, Some(path)) => fs::read_to_string(&path)
                    .with_context(|| format!("failed to read script {}", path.display()))?,
                (None, None) => bail!("simulate needs --script or --script-file"),
            };
            let steps = script::parse(&source).context("invalid script")?;
            let options = HeadlessOptions {
                auto_acknowledge: !hold_interstitial,
                realtime,
            };

            let mut simulation = Simulation::new(&config, seed);
            let report = headless::run(&mut simulation, &steps, seed, options);
            match format {
                OutputFormat::Text => print!("{}", report.to_text()),
                OutputFormat::Json => {
                    println!("{}", report.to_json().context("failed to encode report")?);
                }
            }
            Ok(())
        }
    }
}

fn play(config: &GameConfig, seed: u64, vsync: bool, show_fps: bool) -> Result<()> {
    let mut simulation = Simulation::new(config, seed);
    println!("{}", simulation.welcome_banner());

    let grid = GridPresentation::new(
        config.grid_size(),
        CELL_LENGTH,
        config.edge_policy == EdgePolicy::Wrap,
    )
    .context("invalid grid geometry")?;
    let mut scene = Scene::new(grid, Palette::default());
    scene.refresh(&simulation.snapshot(), simulation.hud());

    let presentation = Presentation::new(
        WINDOW_TITLE,
        Color::from_rgb_u8(0x08, 0x08, 0x0b),
        scene,
    );

    MacroquadBackend::new()
        .with_vsync(vsync)
        .with_show_fps(show_fps)
        .run(presentation, move |frame_dt, input, scene| {
            let _ = simulation.advance_frame(frame_dt, input);
            scene.refresh(&simulation.snapshot(), simulation.hud());
        })
}
