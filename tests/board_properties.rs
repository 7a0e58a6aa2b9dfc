use torus_life::{
    config::LifeConfig,
    engine::{live_neighbours, next_generation, step},
    grid::Grid,
    pattern::{pattern_grid, Pattern},
    simulation::{Control, Simulation},
    store::StateStore,
};

fn random_grid(rng: &mut fastrand::Rng, size: usize, density: u8) -> Grid {
    let rows = (0..size)
        .map(|_| (0..size).map(|_| u8::from(rng.u8(..100) < density)).collect())
        .collect();
    Grid::from_rows(rows).unwrap()
}

#[test]
fn glider_from_8_8_after_four_ticks() {
    let mut rng = fastrand::Rng::with_seed(0);
    let mut grid = pattern_grid("glider", 20);
    for _ in 0..4 {
        grid = next_generation(&grid, false, &mut rng);
    }

    let expected = Grid::from_rows(
        (0..20)
            .map(|r| {
                (0..20)
                    .map(|c| u8::from(matches!((r, c), (9, 10) | (10, 11) | (11, 9) | (11, 10) | (11, 11))))
                    .collect()
            })
            .collect(),
    )
    .unwrap();
    assert_eq!(grid, expected);
}

#[test]
fn still_lifes_are_fixed_points() {
    for name in ["block", "tub", "boat"] {
        let grid = pattern_grid(name, 20);
        assert_eq!(step(&grid), grid, "{name}");
    }
}

#[test]
fn births_and_deaths_follow_neighbour_counts() {
    let mut rng = fastrand::Rng::with_seed(2024);
    for density in [10, 35, 60, 90] {
        for size in [1, 2, 3, 7, 20] {
            let grid = random_grid(&mut rng, size, density);
            let next = step(&grid);
            for row in 0..size {
                for col in 0..size {
                    let n = live_neighbours(&grid, row, col);
                    if n == 3 {
                        assert!(next.is_alive(row, col));
                    }
                    if grid.is_alive(row, col) {
                        assert_eq!(next.is_alive(row, col), n == 2 || n == 3);
                    } else if n != 3 {
                        assert!(!next.is_alive(row, col));
                    }
                }
            }
        }
    }
}

#[test]
fn lone_corner_cell_sees_far_corner() {
    for size in [3, 10, 20, 50] {
        let mut grid = Grid::empty(size);
        grid.set(size - 1, size - 1, true).unwrap();
        assert_eq!(live_neighbours(&grid, 0, 0), 1, "size {size}");
    }
}

#[test]
fn live_count_tracks_every_grid_write() {
    let mut rng = fastrand::Rng::with_seed(77);
    let mut sim = Simulation::new(
        &LifeConfig {
            seed: Some(77),
            pattern: Some("exploder".into()),
            ..LifeConfig::default()
        },
        StateStore::in_memory(),
    )
    .unwrap();

    for _ in 0..300 {
        let size = sim.store().grid_size();
        let control = match rng.u8(..8) {
            0 | 1 => Control::Tick,
            2 => Control::ToggleCell {
                row: rng.usize(..size),
                col: rng.usize(..size),
            },
            3 => Control::SetGridSize([10, 20, 50][rng.usize(..3)]),
            4 => Control::SelectPattern(Pattern::ALL[rng.usize(..Pattern::ALL.len())].name().into()),
            5 => Control::SetRandomLife(rng.bool()),
            6 => Control::Reset,
            _ => Control::SetTickInterval(rng.u64(..500)),
        };
        sim.apply(control).unwrap();

        let grid = sim.grid();
        assert_eq!(sim.store().live_cell_count(), grid.live_count());
        assert_eq!(sim.store().grid_size(), grid.size());
    }
}
