#![allow(clippy::type_complexity)]

use bevy::{math::vec2, picking::pointer::PointerButton, prelude::*};

use crate::{
    pattern::Pattern,
    prelude::*,
    simulation::{Control, Simulation, SimulationSet},
};

/// Draws the board held by [`Simulation`] and turns input into [`Control`]s.
pub struct LifePlugin;

impl Plugin for LifePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BoardView>()
            .add_systems(Startup, (load_meshes_and_materials, spawn_borders, spawn_hud).chain())
            .add_systems(
                Update,
                (
                    handle_kbd.before(SimulationSet),
                    (sync_board, update_hud).chain().after(SimulationSet),
                ),
            )
            .add_observer(toggle_cell_on_press)
            .add_observer(cells_set_mats_on::<Pointer<Over>>(true))
            .add_observer(cells_set_mats_on::<Pointer<Out>>(false));
    }
}

// ——> SYSTEMS

/// initialize meshes and materials in a resource
fn load_meshes_and_materials(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    // unit squares, sized through the transform scale
    let square = meshes.add(Rectangle::from_size(Vec2::ONE));
    commands.insert_resource(MeshAndMats {
        square,
        border: materials.add(ColorMaterial::from_color(BORDER_COLOR)),
        alive: materials.add(ColorMaterial::from_color(CELL_ALIVE_COLOR)),
        dead: materials.add(ColorMaterial::from_color(CELL_DEAD_COLOR)),
        hovered_alive: materials.add(ColorMaterial::from_color(CELL_HOVERED_ALIVE_COLOR)),
        hovered_dead: materials.add(ColorMaterial::from_color(CELL_HOVERED_DEAD_COLOR)),
    });
}

/// the frame around the board never changes size, so it is spawned once
fn spawn_borders(mut commands: Commands, meshes_and_mats: Res<MeshAndMats>) {
    let half = BOARD_PIXEL_SIZE * 0.5 + BORDER_WIDTH_PX * 0.5;
    let long = BOARD_PIXEL_SIZE + 2.0 * BORDER_WIDTH_PX;
    // (offset from the board center, size)
    let sides = [
        (vec2(-half, 0.0), vec2(BORDER_WIDTH_PX, long)),
        (vec2(half, 0.0), vec2(BORDER_WIDTH_PX, long)),
        (vec2(0.0, half), vec2(long, BORDER_WIDTH_PX)),
        (vec2(0.0, -half), vec2(long, BORDER_WIDTH_PX)),
    ];
    commands.spawn_batch(sides.map(|(offset, size)| {
        (
            Border,
            Mesh2d(meshes_and_mats.square.clone()),
            MeshMaterial2d(meshes_and_mats.border.clone()),
            Transform::from_translation((BOARD_POS + offset).extend(0.0)).with_scale(size.extend(1.0)),
        )
    }));
}

fn spawn_hud(mut commands: Commands) {
    commands.spawn((
        Hud,
        Text::new(""),
        TextFont {
            font_size: HUD_FONT_SIZE,
            ..default()
        },
        TextColor(HUD_COLOR),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(12.0),
            left: Val::Px(12.0),
            ..default()
        },
    ));
}

/// Mirrors the current generation onto the cell entities, respawning them
/// when the grid size changed.
fn sync_board(
    mut commands: Commands,
    sim: Res<Simulation>,
    meshes_and_mats: Res<MeshAndMats>,
    mut board: ResMut<BoardView>,
    mut cell_query: Query<(&mut MeshMaterial2d<ColorMaterial>, &Hover), With<Cell>>,
) {
    if !sim.is_changed() && board.layout.size == sim.store().grid_size() {
        return;
    }
    let grid = sim.grid();

    if board.layout.size != grid.size() {
        for entity in board.cells.drain(..) {
            commands.entity(entity).despawn();
        }
        let layout = BoardLayout::new(grid.size());
        let scale = Vec2::splat(layout.cell_px() * CELL_SCALE).extend(1.0);
        board.cells = (0..grid.size() * grid.size())
            .map(|idx| {
                let (row, col) = grid.idx_to_coord(idx);
                commands
                    .spawn((
                        Cell { row, col },
                        Mesh2d(meshes_and_mats.square.clone()),
                        MeshMaterial2d(meshes_and_mats.cell_mat(grid.is_alive(row, col), false)),
                        Transform::from_translation(layout.cell_translation(row, col)).with_scale(scale),
                    ))
                    .id()
            })
            .collect();
        board.layout = layout;
        debug!("board respawned at {0}x{0}", layout.size);
        return;
    }

    for (idx, entity) in board.cells.iter().enumerate() {
        if let Ok((mut material, hover)) = cell_query.get_mut(*entity) {
            let (row, col) = grid.idx_to_coord(idx);
            let target = meshes_and_mats.cell_mat(grid.is_alive(row, col), hover.0);
            if material.0 != target {
                material.0 = target;
            }
        }
    }
}

fn update_hud(sim: Res<Simulation>, mut hud: Query<&mut Text, With<Hud>>, mut shown: Local<bool>) {
    if *shown && !sim.is_changed() {
        return;
    }
    *shown = true;
    let store = sim.store();
    let status = format!(
        "generation {}   live cells {}\n{}   {}   {} ms   random life {}\n\
         [space] start/stop  [n] tick  [r] reset  [p] pattern  [l] random life\n\
         [up/down] speed  [1/2/3] size  [home] recenter",
        store.generation_count(),
        store.live_cell_count(),
        sim.selected_pattern().unwrap_or("empty"),
        if sim.is_running() { "running" } else { "stopped" },
        store.tick_interval(),
        if store.random_life().is_active() { "on" } else { "off" },
    );
    for mut text in hud.iter_mut() {
        text.0.clone_from(&status);
    }
}

fn handle_kbd(
    keyboard_input: Res<ButtonInput<KeyCode>>,
    sim: Res<Simulation>,
    mut controls: EventWriter<Control>,
) {
    let store = sim.store();
    if keyboard_input.just_pressed(KeyCode::Space) {
        controls.send(if sim.is_running() { Control::Stop } else { Control::Start });
    }
    if keyboard_input.just_pressed(KeyCode::KeyN) {
        controls.send(Control::Tick);
    }
    if keyboard_input.just_pressed(KeyCode::KeyR) {
        controls.send(Control::Reset);
    }
    if keyboard_input.just_pressed(KeyCode::KeyP) {
        let next = sim
            .selected_pattern()
            .and_then(Pattern::from_name)
            .map_or(Pattern::Glider, Pattern::next);
        controls.send(Control::SelectPattern(next.name().to_owned()));
    }
    if keyboard_input.just_pressed(KeyCode::KeyL) {
        controls.send(Control::SetRandomLife(!store.random_life().is_active()));
    }
    if keyboard_input.just_pressed(KeyCode::ArrowUp) {
        let faster = store.tick_interval().saturating_sub(TICK_INTERVAL_STEP_MS);
        controls.send(Control::SetTickInterval(faster));
    }
    if keyboard_input.just_pressed(KeyCode::ArrowDown) {
        let slower = (store.tick_interval() + TICK_INTERVAL_STEP_MS).min(MAX_TICK_INTERVAL_MS);
        controls.send(Control::SetTickInterval(slower));
    }
    for (key, size) in [KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3]
        .into_iter()
        .zip(GRID_SIZE_CHOICES)
    {
        if keyboard_input.just_pressed(key) {
            controls.send(Control::SetGridSize(size));
        }
    }
}

// ——> OBSERVERS

fn toggle_cell_on_press(
    trigger: Trigger<Pointer<Down>>,
    cell_query: Query<&Cell>,
    mut controls: EventWriter<Control>,
) {
    if trigger.event().button != PointerButton::Primary {
        return;
    }
    if let Ok(cell) = cell_query.get(trigger.entity()) {
        controls.send(Control::ToggleCell {
            row: cell.row,
            col: cell.col,
        });
    }
}

/// Returns an observer that records whether the pointer is over the targeted
/// cell and repaints it, with the hover colors when `hovered` is set.
fn cells_set_mats_on<E>(
    hovered: bool,
) -> impl Fn(
    Trigger<E>,
    Query<(&mut MeshMaterial2d<ColorMaterial>, &Cell, &mut Hover)>,
    Res<Simulation>,
    Res<MeshAndMats>,
) {
    move |trigger, mut query, sim, meshes_and_mats| {
        if let Ok((mut material, cell, mut hover)) = query.get_mut(trigger.entity()) {
            hover.0 = hovered;
            let grid = sim.grid();
            // the cell may outlive a shrink until the board is respawned
            let alive = grid.contains(cell.row, cell.col) && grid.is_alive(cell.row, cell.col);
            material.0 = meshes_and_mats.cell_mat(alive, hovered);
        }
    }
}

// ——> COMPONENTS

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
#[require(Mesh2d, Hover)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

/// set while the pointer is over the cell
#[derive(Component, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Hover(pub bool);

#[derive(Component)]
#[require(Mesh2d)]
struct Border;

#[derive(Component)]
struct Hud;

// ——> RESOURCES

/// hold handles for meshes and materials
#[derive(Resource, Clone)]
struct MeshAndMats {
    square: Handle<Mesh>,
    border: Handle<ColorMaterial>,
    alive: Handle<ColorMaterial>,
    dead: Handle<ColorMaterial>,
    hovered_alive: Handle<ColorMaterial>,
    hovered_dead: Handle<ColorMaterial>,
}

impl MeshAndMats {
    fn cell_mat(&self, alive: bool, hovered: bool) -> Handle<ColorMaterial> {
        match (alive, hovered) {
            (true, false) => self.alive.clone(),
            (false, false) => self.dead.clone(),
            (true, true) => self.hovered_alive.clone(),
            (false, true) => self.hovered_dead.clone(),
        }
    }
}

/// the cell entities currently on screen, indexed row-major
#[derive(Resource, Default)]
struct BoardView {
    layout: BoardLayout,
    cells: Vec<Entity>,
}

/// Screen placement of a board with `size` cells per side.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct BoardLayout {
    pub size: usize,
}

impl BoardLayout {
    pub fn new(size: usize) -> Self {
        Self { size }
    }

    /// side length of one cell in pixels
    #[inline]
    pub fn cell_px(&self) -> f32 {
        BOARD_PIXEL_SIZE / self.size.max(1) as f32
    }

    /// center of cell (row, col), row 0 at the top
    #[inline]
    pub fn cell_translation(&self, row: usize, col: usize) -> Vec3 {
        let half = BOARD_PIXEL_SIZE * 0.5;
        let cell = self.cell_px();
        vec2(
            BOARD_POS.x - half + (col as f32 + 0.5) * cell,
            BOARD_POS.y + half - (row as f32 + 0.5) * cell,
        )
        .extend(10.0)
    }
}

#[cfg(test)]
mod test {
    use bevy::math::vec3;

    use super::*;
    use crate::{config::LifeConfig, store::StateStore};

    fn test_mats() -> MeshAndMats {
        MeshAndMats {
            square: Handle::default(),
            border: Handle::weak_from_u128(1),
            alive: Handle::weak_from_u128(2),
            dead: Handle::weak_from_u128(3),
            hovered_alive: Handle::weak_from_u128(4),
            hovered_dead: Handle::weak_from_u128(5),
        }
    }

    fn material_of(app: &App, entity: Entity) -> Handle<ColorMaterial> {
        app.world()
            .get::<MeshMaterial2d<ColorMaterial>>(entity)
            .unwrap()
            .0
            .clone()
    }

    #[test]
    fn layout_works() {
        let layout = BoardLayout::new(8);
        assert_eq!(BOARD_PIXEL_SIZE / 8.0, layout.cell_px());

        let cell = layout.cell_px();
        let half = BOARD_PIXEL_SIZE * 0.5;
        assert_eq!(
            vec3(-half + cell * 0.5, half - cell * 0.5, 10.0),
            layout.cell_translation(0, 0)
        );
        assert_eq!(
            vec3(half - cell * 0.5, -half + cell * 0.5, 10.0),
            layout.cell_translation(7, 7)
        );
        // rows grow downwards, columns to the right
        assert!(layout.cell_translation(1, 0).y < layout.cell_translation(0, 0).y);
        assert!(layout.cell_translation(0, 1).x > layout.cell_translation(0, 0).x);
    }

    #[test]
    fn cell_materials_follow_state() {
        let mats = test_mats();
        assert_eq!(mats.cell_mat(true, false), mats.alive);
        assert_eq!(mats.cell_mat(false, false), mats.dead);
        assert_eq!(mats.cell_mat(true, true), mats.hovered_alive);
        assert_eq!(mats.cell_mat(false, true), mats.hovered_dead);
    }

    #[test]
    fn board_sync_keeps_hover_colors() {
        let sim = Simulation::new(
            &LifeConfig {
                grid_size: 4,
                seed: Some(1),
                ..LifeConfig::default()
            },
            StateStore::in_memory(),
        )
        .unwrap();
        let mats = test_mats();

        let mut app = App::new();
        app.insert_resource(sim)
            .insert_resource(mats.clone())
            .init_resource::<BoardView>()
            .add_systems(Update, sync_board);
        app.update();

        let cells = app.world().resource::<BoardView>().cells.clone();
        assert_eq!(cells.len(), 16);
        // cell (1, 1)
        let hovered = cells[5];
        app.world_mut().entity_mut(hovered).insert(Hover(true));
        app.world_mut()
            .resource_mut::<Simulation>()
            .toggle_cell(1, 1)
            .unwrap();
        app.update();

        assert_eq!(material_of(&app, hovered), mats.hovered_alive);
        assert_eq!(material_of(&app, cells[0]), mats.dead);
    }
}
