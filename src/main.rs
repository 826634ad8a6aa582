//! bonnie-lab: a first-person tile level with box collision
//!
//! Walk a player through a grid of wall blocks and sliding doors. Every
//! frame the player's box is moved, then pushed back out of any wall tile
//! or door it ended up inside.
//! - Levels are RON files with one glyph per tile, or images with one
//!   pixel per tile
//! - Settings are an optional RON file; missing fields keep their defaults

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod math;
mod world;
mod game;
mod input;
mod config;

use std::path::PathBuf;
use macroquad::prelude::*;
use tracing::{error, info};
use config::Settings;
use game::{draw_frame, FrameSnapshot, Runtime, World};
use input::InputState;
use world::{load_level_map, load_level_map_from_str, LevelMap, DEMO_LEVEL};

/// Command line options
#[cfg(not(target_arch = "wasm32"))]
#[derive(clap::Parser, Debug, Default)]
#[command(name = "bonnie-lab", version, about = "First-person tile level with box collision")]
struct Args {
    /// Level file (.ron, or .png/.gif/.bmp/.jpg image map). Defaults to the built-in demo level.
    level: Option<PathBuf>,

    /// Settings file (RON)
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Log every collision contact
    #[arg(long)]
    debug_collision: bool,
}

#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default)]
struct Args {
    level: Option<PathBuf>,
    settings: Option<PathBuf>,
    debug_collision: bool,
}

fn parse_args() -> Args {
    #[cfg(not(target_arch = "wasm32"))]
    {
        <Args as clap::Parser>::parse()
    }
    #[cfg(target_arch = "wasm32")]
    {
        Args::default()
    }
}

fn window_conf() -> Conf {
    Conf {
        window_title: format!("bonnie-lab v{}", VERSION),
        window_width: 1280,
        window_height: 720,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

fn load_map(args: &Args) -> Result<LevelMap, world::LevelError> {
    match &args.level {
        Some(path) => load_level_map(path),
        None => {
            info!("no level given, using built-in demo level");
            load_level_map_from_str(DEMO_LEVEL)
        }
    }
}

fn load_config(args: &Args) -> Result<Settings, config::ConfigError> {
    match &args.settings {
        Some(path) => config::load_settings(path),
        None => Ok(Settings::default()),
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    let args = parse_args();

    let level = if args.debug_collision {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();
    info!(version = VERSION, "starting");

    let settings = match load_config(&args) {
        Ok(settings) => settings,
        Err(e) => {
            error!("failed to load settings: {}", e);
            return;
        }
    };

    let map = match load_map(&args) {
        Ok(map) => map,
        Err(e) => {
            error!("failed to load level: {}", e);
            return;
        }
    };

    let world = match World::from_map(&map, &settings) {
        Ok(world) => world,
        Err(e) => {
            error!("invalid level '{}': {}", map.name, e);
            return;
        }
    };

    let mut runtime = Runtime::new(world);
    runtime.set_debug_collisions(args.debug_collision);

    let mut input = InputState::new();
    input.set_mouse_look(true);

    loop {
        let snapshot = input.poll();
        runtime.frame(get_time(), &snapshot);

        // Free the cursor while paused
        if input.mouse_look == runtime.paused {
            input.set_mouse_look(!runtime.paused);
        }

        let frame = FrameSnapshot::capture(&runtime.world, runtime.paused);
        draw_frame(&frame);

        next_frame().await
    }
}
