//! Tick driver and player controls around a [`StateStore`].

use std::time::Duration;

use bevy::prelude::*;
use thiserror::Error;

use crate::{
    config::LifeConfig,
    engine,
    grid::{Grid, GridError},
    pattern::pattern_grid,
    store::{FileBackend, StateKey, StateStore, Status, StoreError},
    ticker::Ticker,
};

#[derive(Debug, Error)]
pub enum ControlError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Everything a player can ask of the board.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub enum Control {
    /// advance a single generation
    Tick,
    Start,
    Stop,
    /// reseed with the selected pattern and zero the generation counter
    Reset,
    /// select a pattern and show it right away, counters untouched
    SelectPattern(String),
    ToggleCell { row: usize, col: usize },
    SetGridSize(usize),
    SetTickInterval(u64),
    SetRandomLife(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub generation: u64,
    pub live_cells: usize,
    /// the tick left no live cell and ticking was stopped
    pub extinct: bool,
}

/// The running board: state, the single tick timer and the random source
/// used for random life.
#[derive(Resource)]
pub struct Simulation {
    store: StateStore,
    ticker: Ticker,
    rng: fastrand::Rng,
    selected_pattern: Option<String>,
}

impl Simulation {
    /// Opens the configured store (file or memory) and initializes it.
    pub fn from_config(config: &LifeConfig) -> Result<Self, StoreError> {
        let store = match &config.state_file {
            Some(path) => StateStore::new(FileBackend::open(path)?),
            None => StateStore::in_memory(),
        };
        Self::new(config, store)
    }

    /// Initializes `store` from `config`. With `config.resume` set and a
    /// readable generation already stored, the stored state is kept.
    /// Ticking is always stopped afterwards.
    pub fn new(config: &LifeConfig, mut store: StateStore) -> Result<Self, StoreError> {
        let rng = match config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        let resumable = matches!(store.get::<Grid>(StateKey::CurrentGeneration), Ok(Some(_)));

        if config.resume && resumable {
            info!(
                "resuming generation {} on a {n}x{n} grid",
                store.generation_count(),
                n = store.grid_size()
            );
            // rewrite the grid so a stale live count is refreshed
            let grid = store.current_generation();
            store.set_current_generation(&grid)?;
        } else {
            let size = config.grid_size;
            if size == 0 {
                return Err(StoreError::InvalidGridSize);
            }
            let initial = match &config.pattern {
                Some(name) => pattern_grid(name, size),
                None => Grid::empty(size),
            };
            store.set_current_generation(&initial)?;
            store.set_grid_size(size)?;
            store.set_tick_interval(config.tick_interval_ms)?;
            store.set_random_life(config.random_life.into())?;
            store.reset_generation_count()?;
        }
        store.set_activity(Status::Inactive)?;

        Ok(Self {
            store,
            ticker: Ticker::default(),
            rng,
            selected_pattern: config.pattern.clone(),
        })
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn grid(&self) -> Grid {
        self.store.current_generation()
    }

    pub fn selected_pattern(&self) -> Option<&str> {
        self.selected_pattern.as_deref()
    }

    /// True while the tick timer is armed.
    pub fn is_running(&self) -> bool {
        self.ticker.is_armed()
    }

    /// Advances one generation. Stops ticking when nothing is left alive.
    pub fn tick(&mut self) -> Result<TickReport, StoreError> {
        let grid = self.store.current_generation();
        let random_life = self.store.random_life().is_active();
        let next = engine::next_generation(&grid, random_life, &mut self.rng);

        let live_cells = self.store.set_current_generation(&next)?;
        let generation = self.store.increment_generation_count()?;
        debug!("generation {generation}: {live_cells} live cells");

        let extinct = live_cells == 0;
        if extinct {
            info!("no live cells left after generation {generation}");
            self.stop()?;
        }
        Ok(TickReport {
            generation,
            live_cells,
            extinct,
        })
    }

    /// Starts continuous ticking at the stored interval. A running timer is
    /// replaced rather than joined by a second one.
    pub fn start(&mut self) -> Result<(), StoreError> {
        let interval = self.store.tick_interval();
        self.ticker.arm(interval);
        self.store.set_activity(Status::Active)?;
        info!("ticking every {interval} ms");
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), StoreError> {
        if self.ticker.is_armed() {
            info!("ticking stopped");
        }
        self.ticker.disarm();
        self.store.set_activity(Status::Inactive)
    }

    pub fn select_pattern(&mut self, name: &str) -> Result<(), StoreError> {
        self.selected_pattern = Some(name.to_owned());
        let grid = pattern_grid(name, self.store.grid_size());
        self.store.set_current_generation(&grid).map(|_| ())
    }

    pub fn reset(&mut self) -> Result<(), StoreError> {
        let size = self.store.grid_size();
        let grid = match &self.selected_pattern {
            Some(name) => pattern_grid(name, size),
            None => Grid::empty(size),
        };
        self.store.set_current_generation(&grid)?;
        self.store.reset_generation_count()?;
        info!(
            "reset to {}",
            self.selected_pattern.as_deref().unwrap_or("an empty grid")
        );
        Ok(())
    }

    /// Flips one cell and returns whether it is now alive.
    pub fn toggle_cell(&mut self, row: usize, col: usize) -> Result<bool, ControlError> {
        let mut grid = self.store.current_generation();
        let alive = grid.toggle(row, col)?;
        self.store.set_current_generation(&grid)?;
        Ok(alive)
    }

    /// Resizes the board in place; the generation counter keeps counting.
    pub fn set_grid_size(&mut self, size: usize) -> Result<(), StoreError> {
        self.store.resize_grid(size)?;
        info!("grid resized to {size}x{size}");
        Ok(())
    }

    /// Stores the new interval and, when ticking, restarts the timer with it.
    pub fn set_tick_interval(&mut self, interval_ms: u64) -> Result<(), StoreError> {
        self.store.set_tick_interval(interval_ms)?;
        if self.store.activity().is_active() {
            self.start()?;
        }
        Ok(())
    }

    pub fn set_random_life(&mut self, enabled: bool) -> Result<(), StoreError> {
        self.store.set_random_life(enabled.into())
    }

    /// Lets `delta` pass on the tick timer, ticking when it comes due.
    pub fn update(&mut self, delta: Duration) -> Result<Option<TickReport>, StoreError> {
        if self.ticker.poll(delta) {
            self.tick().map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn apply(&mut self, control: Control) -> Result<Option<TickReport>, ControlError> {
        match control {
            Control::Tick => return Ok(Some(self.tick()?)),
            Control::Start => self.start()?,
            Control::Stop => self.stop()?,
            Control::Reset => self.reset()?,
            Control::SelectPattern(name) => self.select_pattern(&name)?,
            Control::ToggleCell { row, col } => {
                self.toggle_cell(row, col)?;
            }
            Control::SetGridSize(size) => self.set_grid_size(size)?,
            Control::SetTickInterval(ms) => self.set_tick_interval(ms)?,
            Control::SetRandomLife(enabled) => self.set_random_life(enabled)?,
        }
        Ok(None)
    }
}

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SimulationSet;

/// Headless systems: applies [`Control`] events, then drives the tick timer.
/// Expects a [`Simulation`] resource to be inserted by the app.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<Control>().add_systems(
            Update,
            (apply_controls, drive_ticks).chain().in_set(SimulationSet),
        );
    }
}

// ——> SYSTEMS

fn apply_controls(mut controls: EventReader<Control>, mut sim: ResMut<Simulation>) {
    for control in controls.read() {
        if let Err(err) = sim.apply(control.clone()) {
            warn!("{control:?} rejected: {err}");
        }
    }
}

fn drive_ticks(time: Res<Time>, mut sim: ResMut<Simulation>) {
    // only mark the resource changed when a tick actually ran
    let result = sim.bypass_change_detection().update(time.delta());
    match result {
        Ok(None) => {}
        Ok(Some(_)) => sim.set_changed(),
        Err(err) => {
            warn!("tick failed: {err}");
            sim.set_changed();
        }
    }
}
