pub mod camera;
pub mod config;
pub mod engine;
pub mod grid;
pub mod life;
pub mod pattern;
pub mod simulation;
pub mod store;
pub mod ticker;

pub mod prelude {
    use bevy::{color::Color, math::Vec2};

    pub const DEFAULT_GRID_SIZE: usize = 20;
    pub const GRID_SIZE_CHOICES: [usize; 3] = [10, 20, 50];
    pub const DEFAULT_TICK_INTERVAL_MS: u64 = 200;
    pub const TICK_INTERVAL_STEP_MS: u64 = 50;
    pub const MAX_TICK_INTERVAL_MS: u64 = 2000;
    /// shortest period the tick timer runs at, an interval of 0 is clamped to it
    pub const MIN_TIMER_INTERVAL_MS: u64 = 1;

    pub const BG_COLOR: Color = Color::srgb(0.0, 0.1, 0.3);
    pub const HUD_COLOR: Color = Color::srgb(0.9, 0.9, 0.9);
    pub const HUD_FONT_SIZE: f32 = 16.0;

    pub const BOARD_POS: Vec2 = Vec2::ZERO;
    /// the board keeps this size on screen whatever the grid size
    pub const BOARD_PIXEL_SIZE: f32 = 720.0;
    pub const BORDER_WIDTH_PX: f32 = 8.0;
    pub const BORDER_COLOR: Color = Color::srgb(1.0, 1.0, 1.0);

    pub const CELL_SCALE: f32 = 0.9;
    pub const CELL_ALIVE_COLOR: Color = Color::srgb(0.2, 1.0, 0.2);
    pub const CELL_DEAD_COLOR: Color = Color::srgb(0.05, 0.15, 0.4);
    pub const CELL_HOVERED_ALIVE_COLOR: Color = Color::srgb(0.2, 0.4, 1.0);
    pub const CELL_HOVERED_DEAD_COLOR: Color = Color::srgb(0.7, 0.1, 0.1);
}
