use labyrinth_core::{CellCoord, GenerationConfig, Tile, TileKind};
use labyrinth_system_generation::{generate, Generated};
use labyrinth_world::query;

const SEEDS: [u64; 5] = [1, 7, 42, 1_337, 0xdead_beef];

fn generated(config: &GenerationConfig) -> Generated {
    generate(config).expect("configuration is valid")
}

fn seeded(seed: u64) -> GenerationConfig {
    GenerationConfig {
        seed,
        ..GenerationConfig::default()
    }
}

#[test]
fn outer_ring_is_always_wall() {
    for seed in SEEDS {
        let generated = generated(&seeded(seed));
        let view = query::labyrinth_view(&generated.world).expect("generation completed");
        let (width, height) = view.dimensions();

        let ring = (0..width)
            .flat_map(|x| [CellCoord::new(x, 0), CellCoord::new(x, height - 1)])
            .chain(
                (0..height).flat_map(|y| [CellCoord::new(0, y), CellCoord::new(width - 1, y)]),
            );
        for cell in ring {
            assert_eq!(view.tile(cell), Some(Tile::Wall), "seed {seed}: {cell:?} is not wall");
            assert!(!view.is_walkable(cell), "seed {seed}: {cell:?} is walkable");
        }
    }
}

#[test]
fn walkable_cells_are_never_wall() {
    for seed in SEEDS {
        let generated = generated(&seeded(seed));
        let view = query::labyrinth_view(&generated.world).expect("generation completed");

        assert!(!view.walkable().is_empty(), "seed {seed} produced no walkable cells");
        for cell in view.walkable().iter() {
            let kind = view.tile_kind(cell).expect("walkable cell lies inside the grid");
            assert_ne!(kind, TileKind::Wall, "seed {seed}: walkable {cell:?} is wall");
        }
    }
}

#[test]
fn every_non_wall_cell_is_walkable() {
    let generated = generated(&seeded(99));
    let view = query::labyrinth_view(&generated.world).expect("generation completed");

    for cell in view.bounds().cells() {
        let kind = view.tile_kind(cell).expect("cell lies inside the grid");
        assert_eq!(
            kind != TileKind::Wall,
            view.is_walkable(cell),
            "classification and walkability disagree at {cell:?}"
        );
    }
}

#[test]
fn same_seed_produces_identical_labyrinths() {
    for seed in SEEDS {
        let config = seeded(seed);
        let first = generated(&config);
        let second = generated(&config);
        let first_view = query::labyrinth_view(&first.world).expect("generation completed");
        let second_view = query::labyrinth_view(&second.world).expect("generation completed");

        let first_tiles: Vec<_> =
            first_view.bounds().cells().map(|cell| first_view.tile(cell)).collect();
        let second_tiles: Vec<_> =
            second_view.bounds().cells().map(|cell| second_view.tile(cell)).collect();
        assert_eq!(first_tiles, second_tiles, "seed {seed} tiles diverged");
        assert_eq!(
            first_view.walkable(),
            second_view.walkable(),
            "seed {seed} walkable sets diverged"
        );
        assert_eq!(first.report, second.report);
    }
}

#[test]
fn different_seeds_produce_different_labyrinths() {
    let first = generated(&seeded(3));
    let second = generated(&seeded(4));
    let first_view = query::labyrinth_view(&first.world).expect("generation completed");
    let second_view = query::labyrinth_view(&second.world).expect("generation completed");

    assert_ne!(first_view.walkable(), second_view.walkable());
}

#[test]
fn depth_zero_carves_one_room_filling_the_interior() {
    let config = GenerationConfig {
        max_depth: 0,
        width: 20,
        height: 12,
        ..GenerationConfig::default()
    };
    let generated = generated(&config);
    let view = query::labyrinth_view(&generated.world).expect("generation completed");

    assert_eq!(query::rooms(&generated.world).len(), 1);
    assert_eq!(query::corridor_count(&generated.world), 0);
    assert_eq!(generated.report.rooms, 1);
    assert_eq!(generated.report.tree_corridors + generated.report.extra_corridors, 0);

    let room = query::rooms(&generated.world)[0];
    assert_eq!((room.min_x(), room.max_x()), (1, 19));
    assert_eq!((room.min_y(), room.max_y()), (1, 11));
    assert_eq!(view.walkable().len(), 18 * 10);
    assert_eq!(view.tile_kind(CellCoord::new(1, 1)), Some(TileKind::RoomWallCorner));
    assert_eq!(view.tile_kind(CellCoord::new(10, 6)), Some(TileKind::Floor));
}

#[test]
fn depth_one_without_extras_yields_two_rooms_and_one_corridor() {
    for seed in SEEDS {
        let config = GenerationConfig {
            max_depth: 1,
            extra_corridor_chance: 0.0,
            ..seeded(seed)
        };
        let generated = generated(&config);

        assert_eq!(generated.report.abandoned_splits, 0);
        assert_eq!(query::rooms(&generated.world).len(), 2, "seed {seed}");
        assert_eq!(query::corridor_count(&generated.world), 1, "seed {seed}");
        assert_eq!(generated.report.extra_corridors, 0);
    }
}

#[test]
fn rooms_fit_inside_their_partitions() {
    for seed in SEEDS {
        let config = seeded(seed);
        let generated = generated(&config);
        let mut checked = 0;

        for (id, partition) in generated.tree.iter() {
            let Some(room) = partition.room() else {
                continue;
            };
            if partition.has_fallback_room() {
                continue;
            }
            let bounds = partition.bounds();
            let at = format!("seed {seed}, partition {}", id.index());
            assert!(room.min_x() > bounds.min_x() && room.max_x() < bounds.max_x(), "{at}");
            assert!(room.min_y() > bounds.min_y() && room.max_y() < bounds.max_y(), "{at}");
            assert!(room.width() >= config.min_room_width, "{at}: room {room:?} too narrow");
            assert!(room.height() >= config.min_room_height, "{at}: room {room:?} too short");
            assert!(room.contains(partition.anchor()), "{at}: room {room:?} misses the anchor");
            checked += 1;
        }

        let fallbacks = generated.report.fallback_rooms;
        assert_eq!(checked + fallbacks, generated.report.rooms, "seed {seed}");
        assert!(checked > fallbacks, "seed {seed}: {fallbacks} of {} rooms fell back", checked);
    }
}

#[test]
fn every_split_child_can_hold_a_minimum_room() {
    for seed in 0..20 {
        let config = seeded(seed);
        let generated = generated(&config);

        for (id, partition) in generated.tree.iter() {
            if partition.parent().is_none() {
                continue;
            }
            let bounds = partition.bounds();
            assert!(
                bounds.width() >= config.min_room_width + 2
                    && bounds.height() >= config.min_room_height + 2,
                "seed {seed}: partition {} is only {}x{}",
                id.index(),
                bounds.width(),
                bounds.height()
            );
        }
    }
}

#[test]
fn default_configuration_rarely_falls_back() {
    let runs = 40_u64;
    let mut runs_with_fallbacks = 0;
    let mut rooms = 0;
    for seed in 0..runs {
        let report = generated(&seeded(seed)).report;
        rooms += report.rooms;
        if report.fallback_rooms > 0 {
            runs_with_fallbacks += 1;
        }
    }

    assert!(rooms > 0);
    assert!(
        runs_with_fallbacks <= 4,
        "{runs_with_fallbacks} of {runs} runs placed a room by fallback"
    );
}

#[test]
fn only_unsplit_leaves_receive_rooms() {
    let generated = generated(&seeded(1_337));
    for (_, partition) in generated.tree.iter() {
        if partition.room().is_some() {
            assert!(partition.is_leaf());
            assert!(!partition.is_abandoned());
        }
    }
}

#[test]
fn walkable_space_is_connected() {
    for seed in SEEDS {
        let generated = generated(&seeded(seed));
        let view = query::labyrinth_view(&generated.world).expect("generation completed");
        let root = generated.tree.iter().next().map(|(_, root)| root.anchor());
        let start = root.expect("tree holds its root");
        let field = query::reachability(&generated.world, start).expect("generation completed");

        let fallback_rooms: Vec<_> = generated
            .tree
            .iter()
            .filter(|(_, partition)| partition.has_fallback_room())
            .filter_map(|(_, partition)| partition.room())
            .collect();
        let mut cut_off = view
            .walkable()
            .iter()
            .filter(|cell| !fallback_rooms.iter().any(|room| room.contains(*cell)))
            .filter(|cell| !field.is_reachable(*cell));

        assert_eq!(cut_off.next(), None, "seed {seed} left walkable cells disconnected");
        if fallback_rooms.is_empty() {
            assert_eq!(field.reached(), view.walkable().len(), "seed {seed}");
        }
    }
}
