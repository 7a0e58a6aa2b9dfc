use std::path::PathBuf;

use anyhow::{Context, Result};
use bevy::{
    diagnostic::{FrameTimeDiagnosticsPlugin, LogDiagnosticsPlugin},
    prelude::*,
    window::WindowResolution,
};
use clap::Parser;
use torus_life::{
    camera::CamPlugin,
    config::LifeConfig,
    life::LifePlugin,
    simulation::{Simulation, SimulationPlugin},
};

/// Conway's Game of Life on a wrapping board.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// JSON config file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,
    /// cells per side
    #[arg(long)]
    size: Option<usize>,
    /// milliseconds between ticks
    #[arg(long)]
    interval: Option<u64>,
    /// starting pattern, e.g. glider, exploder, tub
    #[arg(long)]
    pattern: Option<String>,
    /// bring one random dead cell to life every tick
    #[arg(long)]
    random_life: bool,
    /// keep board state in this JSON file
    #[arg(long)]
    state_file: Option<PathBuf>,
    /// continue from the state file
    #[arg(long, requires = "state_file")]
    resume: bool,
    /// seed for random life
    #[arg(long)]
    seed: Option<u64>,
}

impl Args {
    fn into_config(self) -> Result<LifeConfig> {
        let mut config = match &self.config {
            Some(path) => LifeConfig::load(path)?,
            None => LifeConfig::default(),
        };
        if let Some(size) = self.size {
            config.grid_size = size;
        }
        if let Some(interval) = self.interval {
            config.tick_interval_ms = interval;
        }
        if self.pattern.is_some() {
            config.pattern = self.pattern;
        }
        config.random_life |= self.random_life;
        if self.state_file.is_some() {
            config.state_file = self.state_file;
        }
        config.resume |= self.resume;
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let config = Args::parse().into_config()?;
    let simulation = Simulation::from_config(&config).context("failed to open board state")?;

    App::new()
        .add_plugins(
            DefaultPlugins
                .set(ImagePlugin::default_nearest())
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "torus life".into(),
                        resizable: true,
                        focused: true,
                        present_mode: bevy::window::PresentMode::AutoNoVsync,
                        mode: bevy::window::WindowMode::Windowed,
                        resolution: WindowResolution::new(1000., 1000.),
                        ..default()
                    }),
                    ..default()
                }),
        )
        .add_plugins(MeshPickingPlugin)
        .add_plugins((FrameTimeDiagnosticsPlugin, LogDiagnosticsPlugin::default()))
        .insert_resource(simulation)
        .add_plugins((SimulationPlugin, CamPlugin, LifePlugin))
        .run();
    Ok(())
}
